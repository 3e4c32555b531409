use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AddressError;

/// Signaling transport carried in the `transport` URI parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    #[default]
    Udp,
    Tcp,
    Tls,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Udp => "udp",
            TransportType::Tcp => "tcp",
            TransportType::Tls => "tls",
        }
    }

    /// Case-insensitive lookup, `None` for anything but udp/tcp/tls.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "udp" => Some(TransportType::Udp),
            "tcp" => Some(TransportType::Tcp),
            "tls" => Some(TransportType::Tls),
            _ => None,
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    #[default]
    Sip,
    Sips,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Sip => "sip",
            Scheme::Sips => "sips",
        }
    }
}

/// A SIP address: URI plus optional display name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub scheme: Scheme,
    pub username: Option<String>,
    pub domain: String,
    pub port: Option<u16>,
    pub transport: Option<TransportType>,
    /// URI parameters other than `transport`, in their original order
    pub params: Vec<(String, Option<String>)>,
    pub display_name: Option<String>,
}

impl Address {
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let input = input.trim();

        let (display_name, uri) = match input.find('<') {
            Some(lt) => {
                let gt = input[lt..]
                    .find('>')
                    .map(|offset| lt + offset)
                    .ok_or_else(|| AddressError::Unterminated(input.to_string()))?;
                let name = input[..lt].trim().trim_matches('"').trim();
                let name = if name.is_empty() { None } else { Some(name.to_string()) };
                (name, input[lt + 1..gt].trim())
            }
            None => (None, input),
        };

        if uri.chars().any(char::is_whitespace) {
            return Err(AddressError::Whitespace(input.to_string()));
        }

        let (scheme, rest) = if let Some(rest) = strip_prefix_ignore_case(uri, "sips:") {
            (Scheme::Sips, rest)
        } else if let Some(rest) = strip_prefix_ignore_case(uri, "sip:") {
            (Scheme::Sip, rest)
        } else {
            return Err(AddressError::MissingScheme(input.to_string()));
        };

        let mut segments = rest.split(';');
        let main = segments.next().unwrap_or_default();

        let (username, host_port) = match main.rfind('@') {
            Some(at) => {
                // Drop a password embedded in the userinfo
                let user = main[..at].split(':').next().unwrap_or_default();
                let user = if user.is_empty() { None } else { Some(user.to_string()) };
                (user, &main[at + 1..])
            }
            None => (None, main),
        };

        let (domain, port) = split_host_port(host_port)?;
        if domain.is_empty() {
            return Err(AddressError::EmptyHost(input.to_string()));
        }

        let mut transport = None;
        let mut params = Vec::new();
        for segment in segments.filter(|s| !s.is_empty()) {
            let (key, value) = match segment.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (segment, None),
            };
            if key.eq_ignore_ascii_case("transport") {
                if let Some(parsed) = value.and_then(TransportType::from_name) {
                    transport = Some(parsed);
                    continue;
                }
            }
            params.push((key.to_string(), value.map(str::to_string)));
        }

        Ok(Self {
            scheme,
            username,
            domain: domain.to_string(),
            port,
            transport,
            params,
            display_name,
        })
    }

    /// The URI part alone, without display name.
    pub fn as_string_uri_only(&self) -> String {
        let mut uri = format!("{}:", self.scheme.as_str());
        if let Some(user) = &self.username {
            uri.push_str(user);
            uri.push('@');
        }
        uri.push_str(&self.domain);
        if let Some(port) = self.port {
            uri.push_str(&format!(":{}", port));
        }
        if let Some(transport) = self.transport {
            uri.push_str(&format!(";transport={}", transport));
        }
        for (key, value) in &self.params {
            match value {
                Some(value) => uri.push_str(&format!(";{}={}", key, value)),
                None => uri.push_str(&format!(";{}", key)),
            }
        }
        uri
    }

    /// Two addresses designate the same identity when their URIs match.
    pub fn weak_equal(&self, other: &Address) -> bool {
        self.scheme == other.scheme
            && self.username == other.username
            && self.domain.eq_ignore_ascii_case(&other.domain)
            && self.port == other.port
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "\"{}\" <{}>", name, self.as_string_uri_only()),
            None => f.write_str(&self.as_string_uri_only()),
        }
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

fn split_host_port(host_port: &str) -> Result<(&str, Option<u16>), AddressError> {
    let (host, port) = if host_port.starts_with('[') {
        match host_port.find(']') {
            Some(end) => {
                let rest = &host_port[end + 1..];
                (&host_port[..=end], rest.strip_prefix(':'))
            }
            None => return Err(AddressError::Unterminated(host_port.to_string())),
        }
    } else {
        match host_port.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        }
    };

    let port = match port {
        Some(port) => Some(
            port.parse::<u16>()
                .map_err(|_| AddressError::InvalidPort(port.to_string()))?,
        ),
        None => None,
    };

    Ok((host, port))
}

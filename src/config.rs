use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::TransportType;

pub const DOMAIN_VAR: &str = "SIP_LOGIN_DOMAIN";
pub const TRANSPORT_VAR: &str = "SIP_LOGIN_TRANSPORT";
pub const DIRECTORY_VAR: &str = "SIP_LOGIN_DIRECTORY";

/// Credentials known to the local registrar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub username: String,
    pub password: String,
    pub domain: String,
}

impl DirectoryEntry {
    /// Parse `user:password@domain`.
    pub fn parse(entry: &str) -> Option<Self> {
        let (credentials, domain) = entry.trim().rsplit_once('@')?;
        let (username, password) = credentials.split_once(':')?;
        if username.is_empty() || domain.is_empty() {
            return None;
        }
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
            domain: domain.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Domain pre-filled in the login form
    pub default_domain: String,
    pub default_transport: TransportType,
    pub directory: Vec<DirectoryEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_domain: "sip.example.org".to_string(),
            default_transport: TransportType::Udp,
            directory: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `SIP_LOGIN_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(domain) = lookup(DOMAIN_VAR) {
            self.default_domain = domain.trim().to_string();
        }

        if let Some(transport) = lookup(TRANSPORT_VAR) {
            match TransportType::from_name(&transport) {
                Some(transport) => self.default_transport = transport,
                None => warn!("Ignoring unknown transport '{}' in {}", transport, TRANSPORT_VAR),
            }
        }

        if let Some(directory) = lookup(DIRECTORY_VAR) {
            self.directory = directory
                .split(',')
                .filter(|entry| !entry.trim().is_empty())
                .filter_map(|entry| {
                    let parsed = DirectoryEntry::parse(entry);
                    if parsed.is_none() {
                        warn!("Ignoring malformed directory entry in {}", DIRECTORY_VAR);
                    }
                    parsed
                })
                .collect();
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let vars: HashMap<&str, &str> = [
            (DOMAIN_VAR, " voip.example.net "),
            (TRANSPORT_VAR, "TLS"),
            (DIRECTORY_VAR, "alice:wonderland@voip.example.net, broken ,bob:@voip.example.net"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.default_domain, "voip.example.net");
        assert_eq!(config.default_transport, TransportType::Tls);
        assert_eq!(config.directory.len(), 2);
        assert_eq!(config.directory[0].username, "alice");
        assert_eq!(config.directory[1].password, "");
    }

    #[test]
    fn unknown_transport_keeps_default() {
        let config = AppConfig::default()
            .with_overrides(|key| (key == TRANSPORT_VAR).then(|| "carrier-pigeon".to_string()));
        assert_eq!(config.default_transport, TransportType::Udp);
    }

    #[test]
    fn directory_entry_requires_user_and_domain() {
        assert!(DirectoryEntry::parse("alice@example.org").is_none());
        assert!(DirectoryEntry::parse(":pw@example.org").is_none());
        assert!(DirectoryEntry::parse("alice:pw@").is_none());
        assert_eq!(
            DirectoryEntry::parse("alice:p@ss@example.org").map(|e| e.password),
            Some("p@ss".to_string())
        );
    }
}

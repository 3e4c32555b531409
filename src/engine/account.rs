use std::fmt;
use uuid::Uuid;

use super::address::Address;

/// Why the engine ended a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Reason {
    #[default]
    None,
    NoResponse,
    Forbidden,
    Declined,
    NotFound,
    Busy,
    Unauthorized,
    IoError,
    ServerTimeout,
    Unknown,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Reason::None => "no reason",
            Reason::NoResponse => "no response",
            Reason::Forbidden => "forbidden",
            Reason::Declined => "declined",
            Reason::NotFound => "not found",
            Reason::Busy => "busy",
            Reason::Unauthorized => "unauthorized",
            Reason::IoError => "network error",
            Reason::ServerTimeout => "server timeout",
            Reason::Unknown => "unknown error",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegistrationState {
    #[default]
    None,
    Progress,
    Ok,
    Cleared,
    Failed,
    Refreshing,
}

/// Stored credentials used to answer registration challenges
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthInfo {
    pub username: String,
    pub user_id: Option<String>,
    pub password: Option<String>,
    pub realm: Option<String>,
    pub domain: String,
}

impl AuthInfo {
    pub fn new(
        username: impl Into<String>,
        user_id: Option<String>,
        password: Option<String>,
        realm: Option<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            user_id: user_id.filter(|id| !id.is_empty()),
            password: password.filter(|pw| !pw.is_empty()),
            realm,
            domain: domain.into(),
        }
    }

    pub fn matches(&self, username: &str, domain: &str) -> bool {
        self.username == username && self.domain.eq_ignore_ascii_case(domain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountParams {
    pub identity_address: Option<Address>,
    pub server_address: Option<Address>,
    pub register_enabled: bool,
    /// Dialing prefix digits, without a leading `+`
    pub international_prefix: Option<String>,
    pub international_prefix_iso_country_code: Option<String>,
}

impl Default for AccountParams {
    fn default() -> Self {
        Self {
            identity_address: None,
            server_address: None,
            register_enabled: true,
            international_prefix: None,
            international_prefix_iso_country_code: None,
        }
    }
}

/// Engine account handle; clones refer to the same account
#[derive(Debug, Clone)]
pub struct Account {
    id: Uuid,
    params: AccountParams,
}

impl Account {
    pub fn new(params: AccountParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            params,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn params(&self) -> &AccountParams {
        &self.params
    }

    /// URI-only rendering of the identity, used to tell accounts apart.
    pub fn identity(&self) -> Option<String> {
        self.params
            .identity_address
            .as_ref()
            .map(Address::as_string_uri_only)
    }

    pub fn same_identity(&self, other: &Account) -> bool {
        match (&self.params.identity_address, &other.params.identity_address) {
            (Some(a), Some(b)) => a.weak_equal(b),
            _ => false,
        }
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Account {}

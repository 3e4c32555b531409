use thiserror::Error;

/// Errors raised while parsing a SIP address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("missing sip: or sips: scheme in '{0}'")]
    MissingScheme(String),

    #[error("empty host in '{0}'")]
    EmptyHost(String),

    #[error("invalid port '{0}'")]
    InvalidPort(String),

    #[error("unterminated '<' in '{0}'")]
    Unterminated(String),

    #[error("unexpected whitespace in '{0}'")]
    Whitespace(String),
}

/// Errors reported by the communication engine or its execution context
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("an account with identity {0} already exists")]
    DuplicateAccount(String),

    #[error("unknown account {0}")]
    UnknownAccount(String),

    #[error("core context is no longer running")]
    CoreStopped,
}

/// Errors returned synchronously from a login submission
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("a registration is already in progress")]
    RegistrationInProgress,

    #[error("username and domain are required")]
    MissingFields,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

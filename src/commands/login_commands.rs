use sip_login::LoginForm;

/// Commands sent from UI to the login coroutine
#[derive(Debug, Clone)]
pub enum LoginCommand {
    /// Create the account described by the form and register it
    Submit { form: LoginForm },

    /// Forget the last outcome shown on screen
    Dismiss,
}

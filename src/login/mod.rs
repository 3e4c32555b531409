//! Account login: form state, identity composition and the registration flow.

pub mod flow;
pub mod form;
pub mod identity;

pub use flow::{registration_failure_message, AccountLoginFlow, LoginEvent, LoginUpdates};
pub use form::{LoginForm, LoginFormModel};

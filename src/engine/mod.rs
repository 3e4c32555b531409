//! Seam between the login layer and the communication engine.
//!
//! All engine mutations happen on the task owned by [`CoreContext`]. Listener
//! callbacks run on that same task and receive the engine mutably, so a
//! listener may deregister itself or roll back objects from inside a callback.

pub mod account;
pub mod address;
pub mod context;
pub mod local;

use std::sync::Arc;

pub use account::{Account, AccountParams, AuthInfo, Reason, RegistrationState};
pub use address::{Address, Scheme, TransportType};
pub use context::CoreContext;
pub use local::{AcceptAll, DirectoryRegistrar, LocalEngine, RegisterRequest, RegisterVerdict, Registrar};

use crate::error::EngineError;

/// Handle returned by [`Engine::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Observer of engine notifications
pub trait EngineListener: Send + Sync {
    fn on_account_registration_state_changed(
        &self,
        engine: &mut dyn Engine,
        account: &Account,
        state: RegistrationState,
        reason: Reason,
        message: &str,
    );
}

/// Operations the login layer needs from a SIP communication engine
pub trait Engine: Send {
    /// Parse a SIP URL into an address, `None` when it is not a valid address.
    fn interpret_url(&self, url: &str) -> Option<Address> {
        Address::parse(url).ok()
    }

    fn add_auth_info(&mut self, info: AuthInfo);

    fn remove_auth_info(&mut self, info: &AuthInfo);

    fn find_auth_info(&self, username: &str, domain: &str) -> Option<AuthInfo>;

    fn auth_infos(&self) -> Vec<AuthInfo>;

    fn create_account_params(&self) -> AccountParams {
        AccountParams::default()
    }

    fn create_account(&mut self, params: AccountParams) -> Account {
        Account::new(params)
    }

    /// Add the account and start registering it when its params ask for it.
    fn add_account(&mut self, account: &Account) -> Result<(), EngineError>;

    fn remove_account(&mut self, account: &Account);

    fn accounts(&self) -> Vec<Account>;

    fn registration_state(&self, account: &Account) -> Option<RegistrationState>;

    fn default_account(&self) -> Option<Account>;

    fn set_default_account(&mut self, account: &Account);

    fn add_listener(&mut self, listener: Arc<dyn EngineListener>) -> ListenerId;

    /// Returns false when the listener was not registered.
    fn remove_listener(&mut self, id: ListenerId) -> bool;

    fn listener_count(&self) -> usize;

    /// Deliver queued notifications to listeners.
    fn iterate(&mut self);
}

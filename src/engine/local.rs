use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    Account, Address, AuthInfo, Engine, EngineListener, ListenerId, Reason, RegistrationState,
};
use crate::config::DirectoryEntry;
use crate::error::EngineError;

/// What a registrar sees when an account starts registering
#[derive(Debug)]
pub struct RegisterRequest<'a> {
    pub identity: &'a Address,
    pub server: Option<&'a Address>,
    pub auth: Option<&'a AuthInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterVerdict {
    Accepted,
    Rejected(Reason),
    /// No answer yet; the outcome is reported later through
    /// [`LocalEngine::simulate_registration_state`].
    Pending,
}

/// Decides the outcome of a registration in the local engine
pub trait Registrar: Send {
    fn register(&mut self, request: &RegisterRequest<'_>) -> RegisterVerdict;
}

impl<F> Registrar for F
where
    F: FnMut(&RegisterRequest<'_>) -> RegisterVerdict + Send,
{
    fn register(&mut self, request: &RegisterRequest<'_>) -> RegisterVerdict {
        self(request)
    }
}

/// Accepts every registration
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Registrar for AcceptAll {
    fn register(&mut self, _request: &RegisterRequest<'_>) -> RegisterVerdict {
        RegisterVerdict::Accepted
    }
}

/// Registrar backed by a fixed list of `user@domain` credentials
#[derive(Debug, Default, Clone)]
pub struct DirectoryRegistrar {
    passwords: HashMap<(String, String), String>,
    domains: HashSet<String>,
}

impl DirectoryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(
        mut self,
        username: impl Into<String>,
        domain: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let domain = domain.into().to_ascii_lowercase();
        self.domains.insert(domain.clone());
        self.passwords
            .insert((username.into(), domain), password.into());
        self
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a DirectoryEntry>) -> Self {
        entries.into_iter().fold(Self::new(), |registrar, entry| {
            registrar.with_entry(&entry.username, &entry.domain, &entry.password)
        })
    }
}

impl Registrar for DirectoryRegistrar {
    fn register(&mut self, request: &RegisterRequest<'_>) -> RegisterVerdict {
        let domain = request.identity.domain.to_ascii_lowercase();
        if !self.domains.contains(&domain) {
            return RegisterVerdict::Rejected(Reason::IoError);
        }

        let Some(auth) = request.auth else {
            return RegisterVerdict::Rejected(Reason::Unauthorized);
        };

        let login = auth.user_id.clone().unwrap_or_else(|| auth.username.clone());
        match self.passwords.get(&(login, domain)) {
            Some(expected) if auth.password.as_deref() == Some(expected.as_str()) => {
                RegisterVerdict::Accepted
            }
            _ => RegisterVerdict::Rejected(Reason::Forbidden),
        }
    }
}

struct AccountSlot {
    account: Account,
    state: RegistrationState,
}

struct Notification {
    account: Account,
    state: RegistrationState,
    reason: Reason,
    message: String,
}

/// In-process engine keeping accounts and credentials in memory
pub struct LocalEngine {
    auth_infos: Vec<AuthInfo>,
    accounts: Vec<AccountSlot>,
    default_account: Option<Uuid>,
    listeners: BTreeMap<ListenerId, Arc<dyn EngineListener>>,
    next_listener_id: u64,
    pending: VecDeque<Notification>,
    registrar: Box<dyn Registrar>,
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new(AcceptAll)
    }
}

impl LocalEngine {
    pub fn new(registrar: impl Registrar + 'static) -> Self {
        Self {
            auth_infos: Vec::new(),
            accounts: Vec::new(),
            default_account: None,
            listeners: BTreeMap::new(),
            next_listener_id: 1,
            pending: VecDeque::new(),
            registrar: Box::new(registrar),
        }
    }

    /// Report a registration state change as if it came from the network.
    pub fn simulate_registration_state(
        &mut self,
        account: &Account,
        state: RegistrationState,
        reason: Reason,
        message: &str,
    ) -> Result<(), EngineError> {
        let slot = self
            .accounts
            .iter_mut()
            .find(|slot| slot.account == *account)
            .ok_or_else(|| EngineError::UnknownAccount(account.id().to_string()))?;
        slot.state = state;
        let account = slot.account.clone();
        self.notify(account, state, reason, message);
        Ok(())
    }

    fn notify(&mut self, account: Account, state: RegistrationState, reason: Reason, message: &str) {
        debug!(
            "Queue registration state {:?} ({}) for {:?}",
            state,
            reason,
            account.identity()
        );
        self.pending.push_back(Notification {
            account,
            state,
            reason,
            message: message.to_string(),
        });
    }

    fn set_state(&mut self, account: &Account, state: RegistrationState) {
        if let Some(slot) = self.accounts.iter_mut().find(|slot| slot.account == *account) {
            slot.state = state;
        }
    }

    fn start_registration(&mut self, account: &Account) {
        let params = account.params();
        let Some(identity) = params.identity_address.as_ref() else {
            return;
        };

        self.set_state(account, RegistrationState::Progress);
        self.notify(
            account.clone(),
            RegistrationState::Progress,
            Reason::None,
            "Registration in progress",
        );

        let username = identity.username.clone().unwrap_or_default();
        let auth = self.find_auth_info(&username, &identity.domain);
        let request = RegisterRequest {
            identity,
            server: params.server_address.as_ref(),
            auth: auth.as_ref(),
        };

        match self.registrar.register(&request) {
            RegisterVerdict::Accepted => {
                self.set_state(account, RegistrationState::Ok);
                self.notify(
                    account.clone(),
                    RegistrationState::Ok,
                    Reason::None,
                    "Registration successful",
                );
            }
            RegisterVerdict::Rejected(reason) => {
                self.set_state(account, RegistrationState::Failed);
                self.notify(
                    account.clone(),
                    RegistrationState::Failed,
                    reason,
                    &format!("Registration failed: {}", reason),
                );
            }
            RegisterVerdict::Pending => {}
        }
    }
}

impl Engine for LocalEngine {
    fn add_auth_info(&mut self, info: AuthInfo) {
        self.auth_infos
            .retain(|existing| !existing.matches(&info.username, &info.domain));
        self.auth_infos.push(info);
    }

    fn remove_auth_info(&mut self, info: &AuthInfo) {
        self.auth_infos
            .retain(|existing| !existing.matches(&info.username, &info.domain));
    }

    fn find_auth_info(&self, username: &str, domain: &str) -> Option<AuthInfo> {
        self.auth_infos
            .iter()
            .find(|info| info.matches(username, domain))
            .cloned()
    }

    fn auth_infos(&self) -> Vec<AuthInfo> {
        self.auth_infos.clone()
    }

    fn add_account(&mut self, account: &Account) -> Result<(), EngineError> {
        let identity = account.identity().unwrap_or_default();
        if self.accounts.iter().any(|slot| slot.account.same_identity(account)) {
            return Err(EngineError::DuplicateAccount(identity));
        }

        info!("Adding account {}", identity);
        self.accounts.push(AccountSlot {
            account: account.clone(),
            state: RegistrationState::None,
        });

        if account.params().register_enabled {
            self.start_registration(account);
        }
        Ok(())
    }

    fn remove_account(&mut self, account: &Account) {
        let Some(index) = self.accounts.iter().position(|slot| slot.account == *account) else {
            warn!("Tried to remove unknown account {:?}", account.identity());
            return;
        };

        let slot = self.accounts.remove(index);
        info!("Removed account {:?}", slot.account.identity());
        if self.default_account == Some(slot.account.id()) {
            self.default_account = None;
        }
        if slot.state == RegistrationState::Ok {
            self.notify(slot.account, RegistrationState::Cleared, Reason::None, "Unregistered");
        }
    }

    fn accounts(&self) -> Vec<Account> {
        self.accounts.iter().map(|slot| slot.account.clone()).collect()
    }

    fn registration_state(&self, account: &Account) -> Option<RegistrationState> {
        self.accounts
            .iter()
            .find(|slot| slot.account == *account)
            .map(|slot| slot.state)
    }

    fn default_account(&self) -> Option<Account> {
        let id = self.default_account?;
        self.accounts
            .iter()
            .find(|slot| slot.account.id() == id)
            .map(|slot| slot.account.clone())
    }

    fn set_default_account(&mut self, account: &Account) {
        if self.accounts.iter().any(|slot| slot.account == *account) {
            self.default_account = Some(account.id());
        } else {
            warn!("Cannot make unknown account {:?} the default", account.identity());
        }
    }

    fn add_listener(&mut self, listener: Arc<dyn EngineListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn iterate(&mut self) {
        while let Some(notification) = self.pending.pop_front() {
            let listeners: Vec<_> = self
                .listeners
                .iter()
                .map(|(id, listener)| (*id, Arc::clone(listener)))
                .collect();

            for (id, listener) in listeners {
                // Skip listeners removed by an earlier callback
                if !self.listeners.contains_key(&id) {
                    continue;
                }
                listener.on_account_registration_state_changed(
                    self,
                    &notification.account,
                    notification.state,
                    notification.reason,
                    &notification.message,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AccountParams;
    use std::sync::Mutex;

    fn account_for(identity: &str) -> Account {
        Account::new(AccountParams {
            identity_address: Some(Address::parse(identity).unwrap()),
            ..AccountParams::default()
        })
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(RegistrationState, Reason)>>,
    }

    impl EngineListener for Recorder {
        fn on_account_registration_state_changed(
            &self,
            _engine: &mut dyn Engine,
            _account: &Account,
            state: RegistrationState,
            reason: Reason,
            _message: &str,
        ) {
            self.seen.lock().unwrap().push((state, reason));
        }
    }

    #[test]
    fn accepted_registration_reports_progress_then_ok() {
        let mut engine = LocalEngine::default();
        let recorder = Arc::new(Recorder::default());
        engine.add_listener(recorder.clone());

        let account = account_for("sip:alice@example.org");
        engine.add_account(&account).unwrap();
        engine.iterate();

        assert_eq!(
            *recorder.seen.lock().unwrap(),
            vec![
                (RegistrationState::Progress, Reason::None),
                (RegistrationState::Ok, Reason::None)
            ]
        );
        assert_eq!(engine.registration_state(&account), Some(RegistrationState::Ok));
    }

    #[test]
    fn duplicate_identity_is_refused() {
        let mut engine = LocalEngine::default();
        engine.add_account(&account_for("sip:alice@example.org")).unwrap();
        let result = engine.add_account(&account_for("\"Alice\" <sip:alice@example.org>"));
        assert_eq!(
            result,
            Err(EngineError::DuplicateAccount("sip:alice@example.org".to_string()))
        );
    }

    #[test]
    fn removing_default_account_clears_default() {
        let mut engine = LocalEngine::default();
        let account = account_for("sip:alice@example.org");
        engine.add_account(&account).unwrap();
        engine.set_default_account(&account);
        assert_eq!(engine.default_account(), Some(account.clone()));

        engine.remove_account(&account);
        assert!(engine.default_account().is_none());
        assert!(engine.accounts().is_empty());
    }

    #[test]
    fn listener_removed_mid_dispatch_is_not_called() {
        struct RemoveOther {
            other: Mutex<Option<ListenerId>>,
        }

        impl EngineListener for RemoveOther {
            fn on_account_registration_state_changed(
                &self,
                engine: &mut dyn Engine,
                _account: &Account,
                _state: RegistrationState,
                _reason: Reason,
                _message: &str,
            ) {
                if let Some(id) = self.other.lock().unwrap().take() {
                    engine.remove_listener(id);
                }
            }
        }

        let mut engine = LocalEngine::default();
        let remover = Arc::new(RemoveOther {
            other: Mutex::new(None),
        });
        engine.add_listener(remover.clone());
        let recorder = Arc::new(Recorder::default());
        let recorder_id = engine.add_listener(recorder.clone());
        *remover.other.lock().unwrap() = Some(recorder_id);

        engine.add_account(&account_for("sip:alice@example.org")).unwrap();
        engine.iterate();

        assert!(recorder.seen.lock().unwrap().is_empty());
        assert_eq!(engine.listener_count(), 1);
    }

    #[test]
    fn directory_registrar_checks_credentials() {
        let mut registrar = DirectoryRegistrar::new().with_entry("alice", "Example.org", "wonderland");
        let identity = Address::parse("sip:alice@example.org").unwrap();

        let good = AuthInfo::new("alice", None, Some("wonderland".into()), None, "example.org");
        let bad = AuthInfo::new("alice", None, Some("hatter".into()), None, "example.org");

        let verdict = |registrar: &mut DirectoryRegistrar, auth: Option<&AuthInfo>| {
            registrar.register(&RegisterRequest {
                identity: &identity,
                server: None,
                auth,
            })
        };

        assert_eq!(verdict(&mut registrar, Some(&good)), RegisterVerdict::Accepted);
        assert_eq!(
            verdict(&mut registrar, Some(&bad)),
            RegisterVerdict::Rejected(Reason::Forbidden)
        );
        assert_eq!(
            verdict(&mut registrar, None),
            RegisterVerdict::Rejected(Reason::Unauthorized)
        );

        let elsewhere = Address::parse("sip:alice@example.net").unwrap();
        assert_eq!(
            registrar.register(&RegisterRequest {
                identity: &elsewhere,
                server: None,
                auth: Some(&good),
            }),
            RegisterVerdict::Rejected(Reason::IoError)
        );
    }

    #[test]
    fn pending_outcome_is_reported_later() {
        let mut engine = LocalEngine::new(|_: &RegisterRequest<'_>| RegisterVerdict::Pending);
        let recorder = Arc::new(Recorder::default());
        engine.add_listener(recorder.clone());

        let account = account_for("sip:bob@example.org");
        engine.add_account(&account).unwrap();
        engine.iterate();
        assert_eq!(engine.registration_state(&account), Some(RegistrationState::Progress));

        engine
            .simulate_registration_state(&account, RegistrationState::Failed, Reason::NotFound, "Not Found")
            .unwrap();
        engine.iterate();

        assert_eq!(
            recorder.seen.lock().unwrap().last(),
            Some(&(RegistrationState::Failed, Reason::NotFound))
        );
    }
}

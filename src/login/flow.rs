use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::{mpsc, watch};

use super::form::LoginForm;
use super::identity::{infer_identity, international_prefix_digits, server_uri};
use crate::engine::{
    Account, AuthInfo, CoreContext, Engine, EngineListener, ListenerId, Reason, RegistrationState,
    TransportType,
};
use crate::error::LoginError;
use crate::event_channel::EventChannel;

pub const BAD_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// One-shot outcome of a login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    Registered { identity: String },
    Failed { reason: Reason, message: String },
}

/// User-facing text for a failed registration.
pub fn registration_failure_message(reason: Reason) -> String {
    match reason {
        Reason::Forbidden => BAD_CREDENTIALS_MESSAGE.to_string(),
        other => format!("Registration failed: {}", other),
    }
}

/// UI side of the flow: progress flag and login events
pub struct LoginUpdates {
    pub in_progress: watch::Receiver<bool>,
    pub events: mpsc::UnboundedReceiver<LoginEvent>,
}

struct FlowShared {
    in_progress: watch::Sender<bool>,
    events: mpsc::UnboundedSender<LoginEvent>,
}

impl FlowShared {
    fn in_progress(&self) -> bool {
        *self.in_progress.borrow()
    }

    fn set_in_progress(&self, value: bool) {
        self.in_progress.send_replace(value);
    }

    /// Set the flag, false when another attempt already holds it.
    fn claim(&self) -> bool {
        self.in_progress
            .send_if_modified(|in_progress| !std::mem::replace(in_progress, true))
    }

    /// End an attempt that never got as far as a listener.
    fn abandon(&self, reason: Reason, message: String) {
        self.set_in_progress(false);
        self.emit(LoginEvent::Failed { reason, message });
    }

    fn emit(&self, event: LoginEvent) {
        if let Err(e) = self.events.send(event) {
            warn!("Dropping login event, nobody is listening: {:?}", e.0);
        }
    }
}

/// Everything derived from the form before touching the engine
#[derive(Debug, Clone)]
struct LoginRequest {
    identity: String,
    server: String,
    auth_id: Option<String>,
    password: Option<String>,
    display_name: Option<String>,
    transport: TransportType,
    international_prefix: Option<(String, String)>,
}

impl LoginRequest {
    fn from_form(form: &LoginForm) -> Self {
        let non_empty = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Self {
            identity: infer_identity(&form.username, &form.domain),
            server: server_uri(&form.domain),
            auth_id: non_empty(&form.auth_id),
            // Passwords are taken verbatim, spaces included
            password: (!form.password.is_empty()).then(|| form.password.clone()),
            display_name: non_empty(&form.display_name),
            transport: form.transport,
            international_prefix: international_prefix_digits(&form.international_prefix)
                .map(|digits| (digits.to_string(), form.iso_country_code.trim().to_string())),
        }
    }
}

/// Creates a SIP account from the login form and follows its registration.
pub struct AccountLoginFlow<E> {
    core: CoreContext<E>,
    shared: Arc<FlowShared>,
}

impl<E: Engine + 'static> AccountLoginFlow<E> {
    pub fn new(core: CoreContext<E>) -> (Self, LoginUpdates) {
        let (in_progress, in_progress_rx) = watch::channel(false);
        let events = EventChannel::new();

        let flow = Self {
            core,
            shared: Arc::new(FlowShared {
                in_progress,
                events: events.sender,
            }),
        };
        let updates = LoginUpdates {
            in_progress: in_progress_rx,
            events: events.receiver,
        };
        (flow, updates)
    }

    pub fn is_registration_in_progress(&self) -> bool {
        self.shared.in_progress()
    }

    /// Queue the login on the core task and return immediately.
    ///
    /// The outcome arrives later as a [`LoginEvent`].
    pub fn submit(&self, form: &LoginForm) -> Result<(), LoginError> {
        if !form.is_complete() {
            return Err(LoginError::MissingFields);
        }
        if !self.shared.claim() {
            return Err(LoginError::RegistrationInProgress);
        }

        let request = LoginRequest::from_form(form);
        info!("Submitting login for {}", request.identity);

        let shared = Arc::clone(&self.shared);
        let posted = self
            .core
            .post(move |engine: &mut E| start_registration(engine, request, shared));
        if let Err(e) = posted {
            self.shared.set_in_progress(false);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Runs on the core task with the in-progress flag already claimed by `submit`.
fn start_registration(engine: &mut dyn Engine, request: LoginRequest, shared: Arc<FlowShared>) {
    let Some(mut identity) = engine.interpret_url(&request.identity) else {
        error!("Cannot parse identity {}", request.identity);
        shared.abandon(
            Reason::Unknown,
            format!("Invalid SIP identity: {}", request.identity),
        );
        return;
    };

    let existing = engine.accounts().into_iter().find(|account| {
        account
            .params()
            .identity_address
            .as_ref()
            .is_some_and(|other| other.weak_equal(&identity))
    });
    if existing.is_some() {
        warn!("Account {} already exists", request.identity);
        shared.abandon(
            Reason::Unknown,
            format!("Account {} already exists", identity.as_string_uri_only()),
        );
        return;
    }

    // Credentials are keyed by user and domain only, so another account
    // (other port or scheme) may already own them
    let username = identity.username.clone().unwrap_or_default();
    if engine.find_auth_info(&username, &identity.domain).is_some() {
        warn!("Credentials for {}@{} already exist", username, identity.domain);
        shared.abandon(
            Reason::Unknown,
            format!("Credentials for {}@{} already exist", username, identity.domain),
        );
        return;
    }

    let auth_info = AuthInfo::new(
        username,
        request.auth_id,
        request.password,
        None,
        identity.domain.clone(),
    );
    engine.add_auth_info(auth_info.clone());

    let mut params = engine.create_account_params();
    if let Some(name) = request.display_name {
        identity.display_name = Some(name);
    }
    params.identity_address = Some(identity);

    match engine.interpret_url(&request.server) {
        Some(mut server) => {
            server.transport = Some(request.transport);
            params.server_address = Some(server);
        }
        None => warn!("Cannot parse server address {}", request.server),
    }

    if let Some((digits, iso_country_code)) = request.international_prefix {
        debug!("International prefix {} ({})", digits, iso_country_code);
        params.international_prefix = Some(digits);
        params.international_prefix_iso_country_code = Some(iso_country_code);
    }

    let account = engine.create_account(params);

    let pending = Arc::new(PendingRegistration {
        account: account.clone(),
        auth_info,
        shared,
        listener_id: OnceLock::new(),
        resolved: AtomicBool::new(false),
    });
    let listener_id = engine.add_listener(pending.clone());
    // Freshly created, so the cell is empty
    let _ = pending.listener_id.set(listener_id);

    if let Err(e) = engine.add_account(&account) {
        error!("Engine refused account {}: {}", request.identity, e);
        pending.fail(engine, Reason::Unknown, &e.to_string());
    }
}

/// Listener tracking the account created by one login attempt
struct PendingRegistration {
    account: Account,
    auth_info: AuthInfo,
    shared: Arc<FlowShared>,
    listener_id: OnceLock<ListenerId>,
    resolved: AtomicBool,
}

impl PendingRegistration {
    /// Clear the progress flag and deregister, once per attempt.
    fn finish(&self, engine: &mut dyn Engine) -> bool {
        if self.resolved.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.shared.set_in_progress(false);
        if let Some(id) = self.listener_id.get() {
            engine.remove_listener(*id);
        }
        true
    }

    fn succeed(&self, engine: &mut dyn Engine) {
        if !self.finish(engine) {
            return;
        }
        let identity = self.account.identity().unwrap_or_default();
        info!("Account {} registered", identity);
        engine.set_default_account(&self.account);
        self.shared.emit(LoginEvent::Registered { identity });
    }

    fn fail(&self, engine: &mut dyn Engine, reason: Reason, message: &str) {
        if !self.finish(engine) {
            return;
        }
        let text = registration_failure_message(reason);
        error!(
            "Registration of {:?} failed: {} ({})",
            self.account.identity(),
            reason,
            message
        );
        self.shared.emit(LoginEvent::Failed {
            reason,
            message: text,
        });

        engine.remove_auth_info(&self.auth_info);
        if engine.registration_state(&self.account).is_some() {
            engine.remove_account(&self.account);
        }
    }
}

impl EngineListener for PendingRegistration {
    fn on_account_registration_state_changed(
        &self,
        engine: &mut dyn Engine,
        account: &Account,
        state: RegistrationState,
        reason: Reason,
        message: &str,
    ) {
        if !account.same_identity(&self.account) {
            return;
        }

        match state {
            RegistrationState::Ok => self.succeed(engine),
            RegistrationState::Failed => self.fail(engine, reason, message),
            other => debug!("Registration of {:?} is {:?}", account.identity(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_gets_its_own_message() {
        assert_eq!(registration_failure_message(Reason::Forbidden), BAD_CREDENTIALS_MESSAGE);
        assert_eq!(
            registration_failure_message(Reason::NoResponse),
            "Registration failed: no response"
        );
    }

    #[test]
    fn request_is_derived_from_form() {
        let form = LoginForm {
            username: " alice ".into(),
            auth_id: "  ".into(),
            password: "pass word".into(),
            domain: "sip:example.org".into(),
            display_name: " Alice ".into(),
            transport: TransportType::Tls,
            international_prefix: "+33".into(),
            iso_country_code: "FR".into(),
        };
        let request = LoginRequest::from_form(&form);

        assert_eq!(request.identity, "sip:alice@example.org");
        assert_eq!(request.server, "sip:example.org");
        assert_eq!(request.auth_id, None);
        assert_eq!(request.password.as_deref(), Some("pass word"));
        assert_eq!(request.display_name.as_deref(), Some("Alice"));
        assert_eq!(
            request.international_prefix,
            Some(("33".to_string(), "FR".to_string()))
        );
    }
}

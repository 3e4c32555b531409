use dioxus::prelude::*;
use futures_util::StreamExt;
use log::{error, info};
use sip_login::engine::{CoreContext, DirectoryRegistrar, LocalEngine};
use sip_login::{AccountLoginFlow, AppConfig, LoginEvent, LoginForm, LoginFormModel};

use super::LoginScreen;
use crate::commands::LoginCommand;

/// What the login screen shows about the current attempt
#[derive(Clone, Debug, PartialEq)]
pub enum LoginStatus {
    Idle,
    Registering,
    Registered(String),
    Error(String),
}

pub fn App() -> Element {
    let config = use_hook(AppConfig::from_env);

    // Form fields and derived login button state
    let form = use_signal({
        let config = config.clone();
        move || LoginFormModel::new(LoginForm::from_config(&config))
    });
    let status = use_signal(|| LoginStatus::Idle);

    // The coroutine owns the core context and the login flow
    let login_coroutine = use_coroutine(move |mut rx: UnboundedReceiver<LoginCommand>| {
        let config = config.clone();
        async move {
            let mut status = status;
            let registrar = DirectoryRegistrar::from_entries(&config.directory);
            let core = CoreContext::start(LocalEngine::new(registrar));
            let (flow, mut updates) = AccountLoginFlow::new(core);

            loop {
                tokio::select! {
                    Some(command) = rx.next() => {
                        info!("Login coroutine: processing command {:?}", command);
                        match command {
                            LoginCommand::Submit { form } => match flow.submit(&form) {
                                Ok(()) => status.set(LoginStatus::Registering),
                                Err(e) => {
                                    error!("Failed to submit login: {}", e);
                                    status.set(LoginStatus::Error(e.to_string()));
                                }
                            },
                            LoginCommand::Dismiss => status.set(LoginStatus::Idle),
                        }
                    }
                    Some(event) = updates.events.recv() => {
                        info!("Login coroutine: received {:?}", event);
                        match event {
                            LoginEvent::Registered { identity } => {
                                status.set(LoginStatus::Registered(identity));
                            }
                            LoginEvent::Failed { message, .. } => {
                                status.set(LoginStatus::Error(message));
                            }
                        }
                    }
                    else => break,
                }
            }
        }
    });

    // Login handler
    let on_login = {
        let login_coroutine = login_coroutine.clone();

        move |_| {
            let submitted = form.read().form().clone();
            info!("Logging in as {} on {}", submitted.username, submitted.domain);
            login_coroutine.send(LoginCommand::Submit { form: submitted });
        }
    };

    let on_dismiss = {
        let login_coroutine = login_coroutine.clone();

        move |_| {
            login_coroutine.send(LoginCommand::Dismiss);
        }
    };

    rsx! {
        div {
            style: "
                font-family: sans-serif;
                min-height: 100vh;
                background: #F8FAFC;
                padding: 24px 20px;
                box-sizing: border-box;
            ",
            LoginScreen {
                form: form,
                status: status,
                on_login: on_login,
                on_dismiss: on_dismiss,
            }
        }
    }
}

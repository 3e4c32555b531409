use dioxus::prelude::*;
use sip_login::engine::TransportType;
use sip_login::LoginFormModel;

use super::LoginStatus;

const LABEL_STYLE: &str = "
    display: block;
    font-size: 0.875rem;
    font-weight: 500;
    color: #374151;
    margin-bottom: 8px;
";

const INPUT_STYLE: &str = "
    width: 100%;
    padding: 12px 16px;
    border: 1px solid #D1D5DB;
    border-radius: 6px;
    font-size: 0.875rem;
    background: white;
    color: #374151;
    box-sizing: border-box;
";

const TRANSPORTS: [TransportType; 3] = [TransportType::Udp, TransportType::Tcp, TransportType::Tls];

#[component]
pub fn LoginScreen(
    mut form: Signal<LoginFormModel>,
    status: Signal<LoginStatus>,
    on_login: EventHandler<()>,
    on_dismiss: EventHandler<()>,
) -> Element {
    let model = form.read().clone();
    let current = status.read().clone();

    let fields = model.form();
    let username = fields.username.clone();
    let auth_id = fields.auth_id.clone();
    let password = fields.password.clone();
    let domain = fields.domain.clone();
    let display_name = fields.display_name.clone();
    let transport = fields.transport;
    let prefix = fields.international_prefix.clone();
    let country = fields.iso_country_code.clone();

    let is_loading = matches!(current, LoginStatus::Registering);
    let can_login = model.login_enabled() && !is_loading;

    let (status_text, status_color, status_bg) = match &current {
        LoginStatus::Idle => ("Enter your SIP account details".to_string(), "#64748B", "#F8FAFC"),
        LoginStatus::Registering => ("Registering with server...".to_string(), "#D97706", "#FFFBEB"),
        LoginStatus::Registered(identity) => (format!("Registered as {}", identity), "#059669", "#F0FDF4"),
        LoginStatus::Error(message) => (message.clone(), "#DC2626", "#FEF2F2"),
    };
    let show_dismiss = matches!(current, LoginStatus::Error(_) | LoginStatus::Registered(_));

    rsx! {
        div {
            style: "
                background: white;
                border-radius: 12px;
                padding: 32px;
                box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1);
                border: 1px solid #E2E8F0;
            ",

            h2 {
                style: "font-size: 1.5rem; font-weight: 500; color: #1E293B; margin: 0 0 24px 0;",
                "SIP Account"
            }

            // Status indicator
            div {
                style: format!("
                    display: flex;
                    align-items: center;
                    justify-content: space-between;
                    padding: 8px 12px;
                    margin-bottom: 24px;
                    background: {};
                    border-radius: 16px;
                    border: 1px solid {}30;
                ", status_bg, status_color),

                span {
                    style: format!("font-weight: 500; color: {}; font-size: 0.875rem;", status_color),
                    "{status_text}"
                }

                if show_dismiss {
                    button {
                        style: "border: none; background: transparent; cursor: pointer; color: #64748B;",
                        onclick: move |_| on_dismiss.call(()),
                        "Dismiss"
                    }
                }
            }

            div {
                style: "display: flex; flex-direction: column; gap: 20px; margin-bottom: 32px;",

                div {
                    label { style: LABEL_STYLE, "Username" }
                    input {
                        style: INPUT_STYLE,
                        r#type: "text",
                        placeholder: "alice or alice@sip.example.org",
                        value: "{username}",
                        oninput: move |evt| form.write().set_username(evt.value()),
                        disabled: is_loading
                    }
                }

                div {
                    label { style: LABEL_STYLE, "Auth ID (optional)" }
                    input {
                        style: INPUT_STYLE,
                        r#type: "text",
                        value: "{auth_id}",
                        oninput: move |evt| form.write().set_auth_id(evt.value()),
                        disabled: is_loading
                    }
                }

                div {
                    label { style: LABEL_STYLE, "Password" }
                    input {
                        style: INPUT_STYLE,
                        r#type: "password",
                        value: "{password}",
                        oninput: move |evt| form.write().set_password(evt.value()),
                        disabled: is_loading
                    }
                }

                div {
                    label { style: LABEL_STYLE, "Domain" }
                    input {
                        style: INPUT_STYLE,
                        r#type: "text",
                        placeholder: "sip.example.org",
                        value: "{domain}",
                        oninput: move |evt| form.write().set_domain(evt.value()),
                        disabled: is_loading
                    }
                }

                div {
                    label { style: LABEL_STYLE, "Display name (optional)" }
                    input {
                        style: INPUT_STYLE,
                        r#type: "text",
                        value: "{display_name}",
                        oninput: move |evt| form.write().set_display_name(evt.value()),
                        disabled: is_loading
                    }
                }

                div {
                    label { style: LABEL_STYLE, "Transport" }
                    select {
                        style: INPUT_STYLE,
                        disabled: is_loading,
                        onchange: move |evt| {
                            if let Some(selected) = TransportType::from_name(&evt.value()) {
                                form.write().set_transport(selected);
                            }
                        },
                        for option_transport in TRANSPORTS {
                            option {
                                value: "{option_transport}",
                                selected: option_transport == transport,
                                "{option_transport}"
                            }
                        }
                    }
                }

                div {
                    style: "display: flex; gap: 12px;",
                    div {
                        style: "flex: 1;",
                        label { style: LABEL_STYLE, "International prefix" }
                        input {
                            style: INPUT_STYLE,
                            r#type: "text",
                            placeholder: "+33",
                            value: "{prefix}",
                            oninput: move |evt| {
                                let country = form.read().form().iso_country_code.clone();
                                form.write().set_international_prefix(evt.value(), country);
                            },
                            disabled: is_loading
                        }
                    }
                    div {
                        style: "flex: 1;",
                        label { style: LABEL_STYLE, "Country code" }
                        input {
                            style: INPUT_STYLE,
                            r#type: "text",
                            placeholder: "FR",
                            value: "{country}",
                            oninput: move |evt| {
                                let prefix = form.read().form().international_prefix.clone();
                                form.write().set_international_prefix(prefix, evt.value());
                            },
                            disabled: is_loading
                        }
                    }
                }
            }

            button {
                style: format!("
                    width: 100%;
                    padding: 14px 16px;
                    background: {};
                    color: white;
                    border: none;
                    border-radius: 6px;
                    font-size: 0.875rem;
                    font-weight: 500;
                    cursor: {};
                ",
                    if can_login { "#1E293B" } else { "#9CA3AF" },
                    if can_login { "pointer" } else { "not-allowed" }
                ),
                onclick: move |_| if can_login { on_login.call(()) },
                disabled: !can_login,
                if is_loading { "Logging in..." } else { "Login" }
            }
        }
    }
}

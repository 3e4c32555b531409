use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::engine::TransportType;

/// What the user entered on the login screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub auth_id: String,
    pub password: String,
    pub domain: String,
    pub display_name: String,
    pub transport: TransportType,
    pub international_prefix: String,
    pub iso_country_code: String,
}

impl LoginForm {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            domain: config.default_domain.clone(),
            transport: config.default_transport,
            ..Self::default()
        }
    }

    /// Username and domain are required; the password is not, since some
    /// authentication schemes do without one.
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.domain.trim().is_empty()
    }
}

/// Login form plus the derived state of the login button
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFormModel {
    form: LoginForm,
    login_enabled: bool,
}

impl LoginFormModel {
    pub fn new(form: LoginForm) -> Self {
        let login_enabled = form.is_complete();
        Self { form, login_enabled }
    }

    pub fn form(&self) -> &LoginForm {
        &self.form
    }

    pub fn login_enabled(&self) -> bool {
        self.login_enabled
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.form.username = username.into();
        self.update_login_enabled();
    }

    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.form.domain = domain.into();
        self.update_login_enabled();
    }

    pub fn set_auth_id(&mut self, auth_id: impl Into<String>) {
        self.form.auth_id = auth_id.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.form.password = password.into();
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.form.display_name = display_name.into();
    }

    pub fn set_transport(&mut self, transport: TransportType) {
        self.form.transport = transport;
    }

    pub fn set_international_prefix(&mut self, prefix: impl Into<String>, iso_country_code: impl Into<String>) {
        self.form.international_prefix = prefix.into();
        self.form.iso_country_code = iso_country_code.into();
    }

    fn update_login_enabled(&mut self) {
        self.login_enabled = self.form.is_complete();
    }
}

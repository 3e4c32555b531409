//! Account login layer of a SIP softphone.
//!
//! The communication engine itself sits behind the [`engine::Engine`] trait and
//! runs on a single background task ([`engine::CoreContext`]). The
//! [`login::AccountLoginFlow`] submits a new account to that engine and turns
//! the asynchronous registration outcome into one-shot UI events.

pub mod call_log;
pub mod config;
pub mod engine;
pub mod error;
pub mod event_channel;
pub mod login;

pub use config::AppConfig;
pub use engine::{CoreContext, Engine, LocalEngine};
pub use error::{AddressError, EngineError, LoginError};
pub use login::{AccountLoginFlow, LoginEvent, LoginForm, LoginFormModel, LoginUpdates};

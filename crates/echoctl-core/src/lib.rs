//! Action layer between `echoctl-api` and the CLI.
//!
//! - **[`ClientConfig`]**: how to reach the web console (API host, console
//!   origin, session cookie, TLS, timeout). [`connect()`](ClientConfig::connect)
//!   parses the session and returns an [`Account`](echoctl_api::Account).
//!
//! - **[`Dispatcher`]**: resolves the selected devices by display name and
//!   applies an [`Action`] to each one sequentially, collecting a
//!   [`DispatchReport`] in which every device succeeds or fails on its own.
//!
//! - **[`CoreError`]**: the small error surface the CLI maps to diagnostics
//!   and exit codes.

pub mod config;
pub mod dispatch;
pub mod error;

pub use config::{ClientConfig, TlsVerification, parse_url};
pub use dispatch::{
    Action, ActionOutput, DeviceOutcome, DeviceStatus, DispatchReport, Dispatcher,
};
pub use error::CoreError;

// Re-export the API types consumers need alongside the dispatcher.
pub use echoctl_api::{Account, Device, DeviceRecord, PlayerInfo, Station, VolumeLevel};

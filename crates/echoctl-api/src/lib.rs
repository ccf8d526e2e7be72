// echoctl-api: async client for the Echo web console API
//
// Session cookie + CSRF handling, a per-session GET cache, and typed
// wrappers for the device directory, linked services, TuneIn search and
// per-device player/queue/command endpoints.

pub mod account;
pub mod cache;
pub mod client;
pub mod command;
pub mod device;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use account::{Account, TUNE_IN};
pub use cache::ResponseCache;
pub use client::{
    DEFAULT_ACCEPT_LANGUAGE, DEFAULT_API_URL, DEFAULT_CONSOLE_URL, GetOptions, SessionClient,
};
pub use command::{DeviceCommand, VolumeLevel};
pub use device::Device;
pub use error::Error;
pub use models::{
    DeviceRecord, InfoText, LinkedService, PlayerInfo, PlayerVolume, Provider, QueueInfo,
    ServiceAccount, Station,
};
pub use session::Session;
pub use transport::{TlsMode, TransportConfig};

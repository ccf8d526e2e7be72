// Per-device endpoints
//
// Every call is scoped by the device's serial number and device type,
// passed as query parameters. Nothing is mirrored locally: reads always
// go to the network and writes are fire-and-parse.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::account::{Account, TUNE_IN};
use crate::client::{GetOptions, with_query};
use crate::command::{DeviceCommand, VolumeLevel};
use crate::error::Error;
use crate::models::{
    DeviceRecord, PlayerInfo, PlayerInfoResponse, QueueInfo, QueueInfoResponse, Station,
};

/// A controllable device bound to an [`Account`].
#[derive(Debug, Clone)]
pub struct Device {
    record: DeviceRecord,
    account: Account,
}

impl Device {
    pub(crate) fn new(record: DeviceRecord, account: Account) -> Self {
        Self { record, account }
    }

    /// The directory record this device was built from.
    pub fn record(&self) -> &DeviceRecord {
        &self.record
    }

    /// Display name (the owner-assigned account name).
    pub fn name(&self) -> &str {
        &self.record.account_name
    }

    pub fn serial_number(&self) -> &str {
        &self.record.serial_number
    }

    pub fn device_type(&self) -> &str {
        &self.record.device_type
    }

    /// `{endpoint}?deviceSerialNumber=..&deviceType=..[&extra..]`
    fn path(&self, endpoint: &str, extra: &[(&str, &str)]) -> String {
        let mut params = vec![
            ("deviceSerialNumber", self.serial_number()),
            ("deviceType", self.device_type()),
        ];
        params.extend_from_slice(extra);
        with_query(endpoint, &params)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current player state. `GET /api/np/player`
    pub async fn player_info(&self) -> Result<PlayerInfo, Error> {
        let path = self.path("/api/np/player", &[]);
        let resp: PlayerInfoResponse = self
            .account
            .client()
            .get(&path, &GetOptions::uncached())
            .await?;
        Ok(resp.player_info)
    }

    /// Current play queue. `GET /api/np/queue`
    pub async fn queue_info(&self) -> Result<QueueInfo, Error> {
        let path = self.path("/api/np/queue", &[]);
        let resp: QueueInfoResponse = self
            .account
            .client()
            .get(&path, &GetOptions::uncached())
            .await?;
        Ok(resp.queue_info)
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Post an arbitrary command payload. `POST /api/np/command`
    pub async fn command(&self, payload: &Value) -> Result<Value, Error> {
        let path = self.path("/api/np/command", &[]);
        debug!(device = self.name(), kind = ?payload.get("type"), "sending command");
        self.account.client().post(&path, Some(payload), None).await
    }

    /// Send one of the known transport commands.
    pub async fn send(&self, command: DeviceCommand) -> Result<Value, Error> {
        self.command(&command.payload()).await
    }

    /// Set the volume. The level is validated before anything is sent.
    pub async fn set_volume_level<L>(&self, level: L) -> Result<Value, Error>
    where
        L: TryInto<VolumeLevel, Error = Error>,
    {
        let level = level.try_into()?;
        self.send(DeviceCommand::Volume(level)).await
    }

    pub async fn pause(&self) -> Result<Value, Error> {
        self.send(DeviceCommand::Pause).await
    }

    pub async fn play(&self) -> Result<Value, Error> {
        self.send(DeviceCommand::Play).await
    }

    pub async fn next(&self) -> Result<Value, Error> {
        self.send(DeviceCommand::Next).await
    }

    pub async fn previous(&self) -> Result<Value, Error> {
        self.send(DeviceCommand::Previous).await
    }

    pub async fn set_shuffle(&self, enabled: bool) -> Result<Value, Error> {
        self.send(DeviceCommand::Shuffle(enabled)).await
    }

    pub async fn set_repeat(&self, enabled: bool) -> Result<Value, Error> {
        self.send(DeviceCommand::Repeat(enabled)).await
    }

    /// Queue a TuneIn station and start playing it.
    ///
    /// `POST /api/tunein/queue-and-play?..&guideId=..&mediaOwnerCustomerId=..`
    /// with an empty body.
    pub async fn tunein_queue_and_play(&self, station: &Station) -> Result<Value, Error> {
        let account = self.account.service_account(TUNE_IN).await?;
        let path = self.path(
            "/api/tunein/queue-and-play",
            &[
                ("guideId", station.id.as_str()),
                ("contentType", "station"),
                ("callSign", ""),
                ("mediaOwnerCustomerId", account.customer_id.as_str()),
            ],
        );
        debug!(device = self.name(), station = %station.id, "queueing TuneIn station");
        self.account.client().post(&path, None, None).await
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Multi-device action dispatch ──
//
// One logical action fans out over the selected devices strictly one
// after another: device N's request completes (or fails) before device
// N+1's starts. A failing device is recorded in the report and the loop
// moves on.

use serde::Serialize;
use serde_json::Value;
use strum::Display;
use tracing::{debug, info, warn};

use echoctl_api::{Account, Device, DeviceCommand, DeviceRecord, PlayerInfo, Station, VolumeLevel};

use crate::error::CoreError;

// ── Actions ──────────────────────────────────────────────────────────

/// A user-level action applied to every selected device.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    /// Print each device's playback status.
    List,
    /// Print each device's directory record.
    Info,
    Play,
    Pause,
    Next,
    Previous,
    Volume(VolumeLevel),
    Shuffle(bool),
    Repeat(bool),
    /// Search TuneIn once and play the first station on every device.
    #[strum(serialize = "tunein")]
    TuneIn(String),
}

// ── Results ──────────────────────────────────────────────────────────

/// Condensed player state shown by `list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub state: Option<String>,
    pub title: Option<String>,
    pub volume: Option<i64>,
}

impl From<PlayerInfo> for DeviceStatus {
    fn from(info: PlayerInfo) -> Self {
        Self {
            title: info.title().map(ToOwned::to_owned),
            volume: info.volume.as_ref().and_then(|v| v.volume),
            state: info.state,
        }
    }
}

/// What an action produced for one device.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutput {
    Status(DeviceStatus),
    Record(DeviceRecord),
    Sent { response: Value },
    Queued { station: String, response: Value },
}

/// Result of an action on a single device.
#[derive(Debug)]
pub struct DeviceOutcome {
    pub name: String,
    pub serial_number: String,
    pub result: Result<ActionOutput, CoreError>,
}

/// Ordered per-device results of one dispatch.
#[derive(Debug)]
pub struct DispatchReport {
    pub action: Action,
    /// Station resolved for a TuneIn action.
    pub station: Option<Station>,
    /// One entry per selected device, in selection order.
    pub outcomes: Vec<DeviceOutcome>,
}

impl DispatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &DeviceOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }
}

// ── Dispatcher ───────────────────────────────────────────────────────

/// The per-device work, prepared once before the loop.
enum Step {
    Status,
    Record,
    Command(DeviceCommand),
    QueueStation(Station),
}

impl Step {
    async fn apply(&self, device: &Device) -> Result<ActionOutput, CoreError> {
        let output = match self {
            Self::Status => ActionOutput::Status(device.player_info().await?.into()),
            Self::Record => ActionOutput::Record(device.record().clone()),
            Self::Command(command) => ActionOutput::Sent {
                response: device.send(*command).await?,
            },
            Self::QueueStation(station) => ActionOutput::Queued {
                station: station.id.clone(),
                response: device.tunein_queue_and_play(station).await?,
            },
        };
        Ok(output)
    }
}

/// Runs actions against devices of one account.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    account: Account,
}

impl Dispatcher {
    pub fn new(account: Account) -> Self {
        Self { account }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Resolve the target devices.
    ///
    /// With no names, every controllable device is selected. Otherwise the
    /// devices whose display name is listed, in directory order. Names that
    /// match nothing are logged; if nothing matches at all the selection
    /// fails with [`CoreError::DeviceNotFound`].
    pub async fn select(&self, names: &[String]) -> Result<Vec<Device>, CoreError> {
        let devices = self.account.devices().await?;
        if names.is_empty() {
            return Ok(devices);
        }

        for name in names {
            if !devices.iter().any(|d| d.name() == name) {
                warn!(device = %name, "no controllable device with this name");
            }
        }

        let selected: Vec<Device> = devices
            .into_iter()
            .filter(|d| names.iter().any(|n| n == d.name()))
            .collect();

        if selected.is_empty() {
            return Err(CoreError::DeviceNotFound {
                name: names.join(", "),
            });
        }
        Ok(selected)
    }

    /// Select devices by name, then run `action` on each.
    pub async fn run(&self, action: &Action, names: &[String]) -> Result<DispatchReport, CoreError> {
        let devices = self.select(names).await?;
        self.run_on(action, &devices).await
    }

    /// Run `action` on each of `devices`, sequentially.
    ///
    /// Fails as a whole only when the action cannot be prepared (e.g. the
    /// TuneIn search finds nothing); per-device failures end up in the
    /// report.
    pub async fn run_on(
        &self,
        action: &Action,
        devices: &[Device],
    ) -> Result<DispatchReport, CoreError> {
        let step = self.prepare(action).await?;
        let station = match &step {
            Step::QueueStation(station) => Some(station.clone()),
            _ => None,
        };

        let mut outcomes = Vec::with_capacity(devices.len());
        for device in devices {
            debug!(device = device.name(), %action, "applying action");
            let result = step.apply(device).await;
            if let Err(ref err) = result {
                warn!(device = device.name(), %action, error = %err, "action failed");
            }
            outcomes.push(DeviceOutcome {
                name: device.name().to_owned(),
                serial_number: device.serial_number().to_owned(),
                result,
            });
        }

        let report = DispatchReport {
            action: action.clone(),
            station,
            outcomes,
        };
        info!(
            %action,
            devices = report.outcomes.len(),
            failed = report.failure_count(),
            "dispatch finished"
        );
        Ok(report)
    }

    async fn prepare(&self, action: &Action) -> Result<Step, CoreError> {
        let step = match action {
            Action::List => Step::Status,
            Action::Info => Step::Record,
            Action::Play => Step::Command(DeviceCommand::Play),
            Action::Pause => Step::Command(DeviceCommand::Pause),
            Action::Next => Step::Command(DeviceCommand::Next),
            Action::Previous => Step::Command(DeviceCommand::Previous),
            Action::Volume(level) => Step::Command(DeviceCommand::Volume(*level)),
            Action::Shuffle(enabled) => Step::Command(DeviceCommand::Shuffle(*enabled)),
            Action::Repeat(enabled) => Step::Command(DeviceCommand::Repeat(*enabled)),
            Action::TuneIn(query) => Step::QueueStation(self.resolve_station(query).await?),
        };
        Ok(step)
    }

    /// First TuneIn search hit for `query`.
    async fn resolve_station(&self, query: &str) -> Result<Station, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "tunein station name is required".into(),
            });
        }

        let station = self
            .account
            .tunein_search(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "TuneIn station".into(),
                identifier: query.into(),
            })?;

        debug!(station = %station.id, name = ?station.name, "resolved TuneIn station");
        Ok(station)
    }
}

// Device command payloads
//
// Everything a device can be told to do goes through the single
// `/api/np/command` endpoint; the variant only changes the JSON body.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Error;

/// A volume level in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct VolumeLevel(u8);

impl VolumeLevel {
    pub const MAX: u8 = 100;

    pub fn new(level: i64) -> Result<Self, Error> {
        match u8::try_from(level) {
            Ok(level) if level <= Self::MAX => Ok(Self(level)),
            _ => Err(Error::validation(
                "volume level",
                format!("{level} is outside 0-{}", Self::MAX),
            )),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for VolumeLevel {
    fn default() -> Self {
        Self(50)
    }
}

impl fmt::Display for VolumeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<VolumeLevel> for u8 {
    fn from(level: VolumeLevel) -> Self {
        level.0
    }
}

impl TryFrom<i64> for VolumeLevel {
    type Error = Error;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl TryFrom<i32> for VolumeLevel {
    type Error = Error;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(level))
    }
}

impl TryFrom<&str> for VolumeLevel {
    type Error = Error;

    fn try_from(level: &str) -> Result<Self, Self::Error> {
        level.parse()
    }
}

impl FromStr for VolumeLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = s
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::validation("volume level", format!("'{s}' is not an integer")))?;
        Self::new(level)
    }
}

/// A transport command for a single device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Volume(VolumeLevel),
    Pause,
    Play,
    Next,
    Previous,
    Shuffle(bool),
    Repeat(bool),
}

impl DeviceCommand {
    /// The `type` discriminator the API expects.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Volume(_) => "VolumeLevelCommand",
            Self::Pause => "PauseCommand",
            Self::Play => "PlayCommand",
            Self::Next => "NextCommand",
            Self::Previous => "PreviousCommand",
            Self::Shuffle(_) => "ShuffleCommand",
            Self::Repeat(_) => "RepeatCommand",
        }
    }

    /// Wire payload for `/api/np/command`.
    pub fn payload(&self) -> Value {
        let kind = self.type_name();
        match *self {
            Self::Volume(level) => json!({
                "type": kind,
                "volumeLevel": level.get(),
                "contentFocusClientId": "Default",
            }),
            Self::Shuffle(enabled) => json!({
                "type": kind,
                "shuffle": enabled,
                "contentFocusClientId": null,
            }),
            Self::Repeat(enabled) => json!({
                "type": kind,
                "repeat": enabled,
                "contentFocusClientId": null,
            }),
            Self::Pause | Self::Play | Self::Next | Self::Previous => json!({
                "type": kind,
                "contentFocusClientId": null,
            }),
        }
    }
}

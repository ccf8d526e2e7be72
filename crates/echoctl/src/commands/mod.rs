//! Command dispatch: bridges CLI args -> core Actions -> output formatting.

pub mod actions;
pub mod config_cmd;

use echoctl_core::{Action, Dispatcher, VolumeLevel};

use crate::cli::{ColorMode, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Resolved output settings shared by all handlers.
#[derive(Debug, Clone, Copy)]
pub struct RenderOpts {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl RenderOpts {
    pub fn new(format: OutputFormat, color: ColorMode, quiet: bool) -> Self {
        Self {
            format,
            color: output::should_color(color),
            quiet,
        }
    }
}

/// Translate a device command into a core `Action`, validating its arguments
/// before any session is opened.
pub fn to_action(cmd: Command) -> Result<Action, CliError> {
    let action = match cmd {
        Command::List => Action::List,
        Command::Info => Action::Info,
        Command::Play => Action::Play,
        Command::Pause => Action::Pause,
        Command::Next => Action::Next,
        Command::Previous => Action::Previous,
        Command::Volume { level } => {
            let level = VolumeLevel::new(level).map_err(|e| CliError::Validation {
                field: "volume level".into(),
                reason: e.to_string(),
            })?;
            Action::Volume(level)
        }
        Command::Shuffle { state } => Action::Shuffle(state.enabled()),
        Command::Repeat { state } => Action::Repeat(state.enabled()),
        Command::TuneIn { name } => Action::TuneIn(name.join(" ")),
        Command::Config(_) | Command::Completions(_) => {
            return Err(CliError::Validation {
                field: "command".into(),
                reason: "not a device command".into(),
            });
        }
    };
    Ok(action)
}

/// Run an action on the selected devices and render the report.
pub async fn dispatch(
    action: Action,
    dispatcher: &Dispatcher,
    global: &GlobalOpts,
    opts: &RenderOpts,
) -> Result<(), CliError> {
    tracing::debug!(%action, devices = ?global.devices, "dispatching action");
    actions::handle(dispatcher, action, &global.devices, opts).await
}

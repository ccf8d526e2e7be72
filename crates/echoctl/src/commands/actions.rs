//! Device action handlers: list, info, and the playback commands.

use serde::Serialize;
use tabled::Tabled;

use echoctl_core::{
    Action, ActionOutput, CoreError, DeviceOutcome, DeviceRecord, DeviceStatus, DispatchReport,
    Dispatcher,
};

use crate::error::CliError;
use crate::output;

use super::RenderOpts;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Device")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Volume")]
    volume: String,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Device")]
    name: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "Online")]
    online: String,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Device")]
    name: String,
    #[tabled(rename = "Result")]
    result: String,
}

// ── Serializable views ──────────────────────────────────────────────

/// One line of `list`: status when the player could be read, else the error.
#[derive(Debug, Serialize)]
struct StatusEntry {
    name: String,
    serial_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<DeviceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Result of a command on one device.
#[derive(Debug, Serialize)]
struct ResultEntry<'a> {
    name: &'a str,
    serial_number: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    station: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StatusEntry {
    fn from_outcome(outcome: &DeviceOutcome) -> Self {
        let (status, error) = match &outcome.result {
            Ok(ActionOutput::Status(status)) => (Some(status.clone()), None),
            Ok(_) => (None, None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            name: outcome.name.clone(),
            serial_number: outcome.serial_number.clone(),
            status,
            error,
        }
    }

    /// `Kitchen: playing Morning Show`, or just the name when idle or unreadable.
    fn line(&self) -> String {
        let Some(status) = &self.status else {
            return self.name.clone();
        };
        let Some(state) = status.state.as_deref() else {
            return self.name.clone();
        };
        let title = status.title.as_deref().unwrap_or_default();
        format!("{}: {} {title}", self.name, state.to_lowercase())
            .trim_end()
            .to_owned()
    }

    fn row(&self, color: bool) -> StatusRow {
        let status = self.status.as_ref();
        let state = match (status.and_then(|s| s.state.as_deref()), &self.error) {
            (Some(state), _) => output::paint_state(state, color),
            (None, Some(_)) => output::paint_result(false, "unavailable", color),
            (None, None) => "-".into(),
        };
        StatusRow {
            name: self.name.clone(),
            state,
            title: status
                .and_then(|s| s.title.clone())
                .unwrap_or_else(|| "-".into()),
            volume: status
                .and_then(|s| s.volume)
                .map_or_else(|| "-".into(), |v| v.to_string()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dispatcher: &Dispatcher,
    action: Action,
    devices: &[String],
    opts: &RenderOpts,
) -> Result<(), CliError> {
    let report = dispatcher.run(&action, devices).await?;

    match action {
        Action::List => render_status(&report, opts),
        Action::Info => render_records(&report, opts),
        _ => render_results(&report, opts),
    }
}

fn render_status(report: &DispatchReport, opts: &RenderOpts) -> Result<(), CliError> {
    let entries: Vec<StatusEntry> = report.outcomes.iter().map(StatusEntry::from_outcome).collect();
    let out = output::render_list(
        opts.format,
        &entries,
        |e| e.row(opts.color),
        StatusEntry::line,
    )?;
    output::print_output(&out, opts.quiet);
    Ok(())
}

fn render_records(report: &DispatchReport, opts: &RenderOpts) -> Result<(), CliError> {
    let records: Vec<&DeviceRecord> = report
        .outcomes
        .iter()
        .filter_map(|o| match &o.result {
            Ok(ActionOutput::Record(record)) => Some(record),
            _ => None,
        })
        .collect();

    let out = output::render_list(
        opts.format,
        &records,
        |r| RecordRow {
            name: r.account_name.clone(),
            serial: r.serial_number.clone(),
            device_type: r.device_type.clone(),
            family: r.device_family.clone().unwrap_or_else(|| "-".into()),
            online: r
                .online
                .map_or_else(|| "-".into(), |online| if online { "yes" } else { "no" }.into()),
        },
        |r| format!("{}\t{}\t{}", r.account_name, r.serial_number, r.device_type),
    )?;
    output::print_output(&out, opts.quiet);
    report_failures(report)
}

fn render_results(report: &DispatchReport, opts: &RenderOpts) -> Result<(), CliError> {
    let station = report.station.as_ref();
    if let Some(station) = station {
        tracing::info!(
            station = %station.id,
            name = station.name.as_deref().unwrap_or_default(),
            "playing TuneIn station"
        );
    }

    let entries: Vec<ResultEntry<'_>> = report
        .outcomes
        .iter()
        .map(|o| ResultEntry {
            name: &o.name,
            serial_number: &o.serial_number,
            ok: o.result.is_ok(),
            station: station.map(|s| s.id.as_str()),
            error: o.result.as_ref().err().map(ToString::to_string),
        })
        .collect();

    let out = output::render_list(
        opts.format,
        &entries,
        |e| ResultRow {
            name: e.name.to_owned(),
            result: match e.error {
                None => output::paint_result(true, "ok", opts.color),
                Some(ref err) => output::paint_result(false, err, opts.color),
            },
        },
        |e| format!("{}: {}", e.name, if e.ok { "ok" } else { "failed" }),
    )?;
    output::print_output(&out, opts.quiet);
    report_failures(report)
}

/// Print each failed device to stderr and turn the failures into an exit error.
fn report_failures(report: &DispatchReport) -> Result<(), CliError> {
    let failed = report.failure_count();
    if failed == 0 {
        return Ok(());
    }
    for outcome in report.failures() {
        if let Err(ref err) = outcome.result {
            eprintln!("{}: {err}", outcome.name);
        }
    }

    // Every device rejected the session: report it as one auth failure.
    if failed == report.outcomes.len() {
        if let Some(Err(CoreError::AuthenticationFailed { message })) =
            report.outcomes.first().map(|o| &o.result)
        {
            if report
                .failures()
                .all(|o| matches!(o.result, Err(CoreError::AuthenticationFailed { .. })))
            {
                return Err(CliError::AuthFailed {
                    message: message.clone(),
                });
            }
        }
    }

    Err(CliError::DevicesFailed {
        action: report.action.to_string(),
        failed,
        total: report.outcomes.len(),
    })
}

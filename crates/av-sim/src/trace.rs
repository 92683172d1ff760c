//! CSV trace output.
//!
//! Records one row per agent per tick into a single CSV file.  Column
//! layout:
//!
//! `tick, agent_id, kind, row, col, x, y, heading_degrees, speed, state,
//! route_progress`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use av_agent::{AgentKind, AgentState};
use av_core::Tick;

use crate::error::SimResult;
use crate::observer::SimObserver;
use crate::snapshot::AgentSnapshot;

/// A [`SimObserver`] that appends every tick's snapshots to a CSV file.
///
/// Write failures inside the observer hooks cannot propagate, so the first
/// one is logged and remembered; [`finish`][CsvTraceObserver::finish]
/// surfaces it to the caller.
pub struct CsvTraceObserver {
    writer: Writer<File>,
    failed: Option<csv::Error>,
}

impl CsvTraceObserver {
    /// Create (or truncate) the trace file at `path` and write the header.
    pub fn create(path: &Path) -> SimResult<Self> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record([
            "tick",
            "agent_id",
            "kind",
            "row",
            "col",
            "x",
            "y",
            "heading_degrees",
            "speed",
            "state",
            "route_progress",
        ])?;
        Ok(Self { writer, failed: None })
    }

    /// Flush the file and report the first deferred write error, if any.
    pub fn finish(mut self) -> SimResult<()> {
        if let Some(err) = self.failed.take() {
            return Err(err.into());
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_row(&mut self, tick: Tick, snap: &AgentSnapshot) -> Result<(), csv::Error> {
        self.writer.write_record(&[
            tick.0.to_string(),
            snap.id.index().to_string(),
            kind_label(snap.kind).to_string(),
            snap.cell.row.to_string(),
            snap.cell.col.to_string(),
            format!("{:.3}", snap.pos.x),
            format!("{:.3}", snap.pos.y),
            format!("{:.0}", snap.heading_degrees),
            format!("{:.3}", snap.speed),
            state_label(snap.state).to_string(),
            format!("{:.3}", snap.route_progress),
        ])
    }
}

impl SimObserver for CsvTraceObserver {
    fn on_tick_end(&mut self, tick: Tick, snapshots: &[AgentSnapshot]) {
        if self.failed.is_some() {
            return;
        }
        for snap in snapshots {
            if let Err(err) = self.write_row(tick, snap) {
                log::error!("trace write failed at {tick}: {err}");
                self.failed = Some(err);
                return;
            }
        }
    }
}

fn kind_label(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Player => "player",
        AgentKind::Npc => "npc",
    }
}

fn state_label(state: AgentState) -> &'static str {
    match state {
        AgentState::Idle => "idle",
        AgentState::Moving => "moving",
        AgentState::Waiting => "waiting",
        AgentState::Recomputing => "recomputing",
        AgentState::Removed => "removed",
    }
}

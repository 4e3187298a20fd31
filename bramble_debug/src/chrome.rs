// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Phases become duration (`B`/`E`) pairs; every other event is an instant.
//! Events that carry no timestamp of their own are placed at the last
//! timestamp seen.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use bramble_core::time::{HostTime, Timebase};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last = HostTime(0);
    let at = |t: HostTime, last: &mut HostTime| {
        *last = t;
        ticks_to_us(t.ticks(), timebase)
    };

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::RenderRequest(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RenderRequest",
                    "cat": "Scheduler",
                    "ts": ticks_to_us(last.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "cycle": e.cycle,
                        "superseded": e.superseded,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Cycle",
                    "ts": at(e.timestamp, &mut last),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "cycle": e.cycle,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Cycle",
                    "ts": at(e.timestamp, &mut last),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "cycle": e.cycle,
                    }
                }));
            }
            RecordedEvent::UnitOfWork(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.kind),
                    "cat": "Unit",
                    "ts": at(e.timestamp, &mut last),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "cycle": e.cycle,
                        "fiber": e.fiber,
                    }
                }));
            }
            RecordedEvent::Yield(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Yield",
                    "cat": "Scheduler",
                    "ts": at(e.timestamp, &mut last),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "cycle": e.cycle,
                        "slice": e.slice,
                        "units": e.units,
                    }
                }));
            }
            RecordedEvent::Abort(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Abort",
                    "cat": "Scheduler",
                    "ts": ticks_to_us(last.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "cycle": e.cycle,
                        "reason": format!("{:?}", e.reason),
                        "units": e.units,
                    }
                }));
            }
            RecordedEvent::CycleSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "CycleSummary",
                    "cat": "Summary",
                    "ts": ticks_to_us(last.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "cycle": s.cycle,
                        "units": s.units,
                        "slices": s.slices,
                        "placements": s.placements,
                        "updates": s.updates,
                        "deletions": s.deletions,
                        "render_us": ticks_to_us(s.render_ticks, timebase),
                        "commit_us": ticks_to_us(s.commit_ticks, timebase),
                    }
                }));
            }
            RecordedEvent::EffectCounts {
                cycle,
                placements,
                updates,
                deletions,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "Effects",
                    "cat": "Rich",
                    "ts": ticks_to_us(last.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "cycle": cycle,
                        "placements": placements,
                        "updates": updates,
                        "deletions": deletions,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].
//!
//! Per-unit events are frequent; [`PrettyPrintSink::units`] turns them off
//! when only phase and cycle lines are wanted.

use std::io::Write;

use bramble_core::fiber::{Effect, FiberKindTag};
use bramble_core::time::{HostTime, Timebase};
use bramble_core::trace::{
    AbortEvent, AbortReason, CycleSummary, EffectRecord, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, RenderRequestEvent, TraceSink, UnitOfWorkEvent, YieldEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
    units: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .field("units", &self.units)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self::new(Box::new(std::io::stderr()), timebase)
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self::with_writer(writer, timebase)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self {
            writer,
            timebase,
            units: true,
        }
    }

    /// Sets whether a line is written for every unit of work.
    #[must_use]
    pub fn units(mut self, enabled: bool) -> Self {
        self.units = enabled;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Render => "render",
        PhaseKind::Commit => "commit",
    }
}

fn kind_name(kind: FiberKindTag) -> &'static str {
    match kind {
        FiberKindTag::Root => "root",
        FiberKindTag::Host => "host",
        FiberKindTag::Text => "text",
        FiberKindTag::Component => "component",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_render_request(&mut self, e: &RenderRequestEvent) {
        let superseded = if e.superseded { " (superseded previous)" } else { "" };
        let _ = writeln!(self.writer, "[request] cycle={}{superseded}", e.cycle);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] cycle={} {} at {:.1}µs",
            e.cycle,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] cycle={} {} at {:.1}µs",
            e.cycle,
            phase_name(e.phase),
            self.host_us(e.timestamp),
        );
    }

    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        if !self.units {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[unit] cycle={} fiber={} {}",
            e.cycle,
            e.fiber,
            kind_name(e.kind),
        );
    }

    fn on_yield(&mut self, e: &YieldEvent) {
        let _ = writeln!(
            self.writer,
            "[yield] cycle={} slice={} units={} at {:.1}µs",
            e.cycle,
            e.slice,
            e.units,
            self.host_us(e.timestamp),
        );
    }

    fn on_abort(&mut self, e: &AbortEvent) {
        let reason = match e.reason {
            AbortReason::ComponentError => "component error",
            AbortReason::Superseded => "superseded",
        };
        let _ = writeln!(
            self.writer,
            "[abort] cycle={} after {} units: {reason}",
            e.cycle, e.units,
        );
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] cycle={} units={} slices={} +{} ~{} -{} \
             render={:.1}µs commit={:.1}µs",
            s.cycle,
            s.units,
            s.slices,
            s.placements,
            s.updates,
            s.deletions,
            self.ticks_to_us(s.render_ticks),
            self.ticks_to_us(s.commit_ticks),
        );
    }

    fn on_effects(&mut self, cycle: u64, effects: &[EffectRecord]) {
        let count = |effect: Effect| effects.iter().filter(|r| r.effect == effect).count();
        let _ = writeln!(
            self.writer,
            "[effects] cycle={cycle} placement={} update={} deletion={}",
            count(Effect::Placement),
            count(Effect::Update),
            count(Effect::Deletion),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_yield() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MICROS);
        sink.on_yield(&YieldEvent {
            cycle: 2,
            slice: 1,
            units: 4,
            timestamp: HostTime(15),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[yield] cycle=2 slice=1 units=4 at 15.0µs\n");
    }

    #[test]
    fn unit_lines_can_be_muted() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS).units(false);
        sink.on_unit_of_work(&UnitOfWorkEvent {
            cycle: 1,
            fiber: 3,
            kind: FiberKindTag::Text,
            timestamp: HostTime(0),
        });
        sink.on_abort(&AbortEvent {
            cycle: 1,
            reason: AbortReason::Superseded,
            units: 1,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(!output.contains("[unit]"), "got: {output}");
        assert!(output.contains("superseded"), "got: {output}");
    }

    #[test]
    fn effects_are_counted_per_kind() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        let record = |effect| EffectRecord {
            fiber: 0,
            kind: FiberKindTag::Host,
            effect,
        };
        sink.on_effects(
            5,
            &[
                record(Effect::Placement),
                record(Effect::Update),
                record(Effect::Update),
            ],
        );
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[effects] cycle=5 placement=1 update=2 deletion=0\n");
    }
}

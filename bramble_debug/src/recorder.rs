// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each led by a one-byte
//! tag. [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! Effect records ([`on_effects`](TraceSink::on_effects)) store only the
//! per-effect counts.

use bramble_core::fiber::{Effect, FiberKindTag};
use bramble_core::time::HostTime;
use bramble_core::trace::{
    AbortEvent, AbortReason, CycleSummary, EffectRecord, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, RenderRequestEvent, TraceSink, UnitOfWorkEvent, YieldEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_RENDER_REQUEST: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_UNIT_OF_WORK: u8 = 4;
const TAG_YIELD: u8 = 5;
const TAG_ABORT: u8 = 6;
const TAG_CYCLE_SUMMARY: u8 = 7;
const TAG_EFFECT_COUNTS: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Render => 0,
            PhaseKind::Commit => 1,
        });
    }

    fn write_kind(&mut self, k: FiberKindTag) {
        self.write_u8(match k {
            FiberKindTag::Root => 0,
            FiberKindTag::Host => 1,
            FiberKindTag::Text => 2,
            FiberKindTag::Component => 3,
        });
    }

    fn write_reason(&mut self, r: AbortReason) {
        self.write_u8(match r {
            AbortReason::ComponentError => 0,
            AbortReason::Superseded => 1,
        });
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl TraceSink for RecorderSink {
    fn on_render_request(&mut self, e: &RenderRequestEvent) {
        self.write_u8(TAG_RENDER_REQUEST);
        self.write_u64(e.cycle);
        self.write_u8(u8::from(e.superseded));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.cycle);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.cycle);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        self.write_u8(TAG_UNIT_OF_WORK);
        self.write_u64(e.cycle);
        self.write_u32(e.fiber);
        self.write_kind(e.kind);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_yield(&mut self, e: &YieldEvent) {
        self.write_u8(TAG_YIELD);
        self.write_u64(e.cycle);
        self.write_u32(e.slice);
        self.write_u32(e.units);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_abort(&mut self, e: &AbortEvent) {
        self.write_u8(TAG_ABORT);
        self.write_u64(e.cycle);
        self.write_reason(e.reason);
        self.write_u32(e.units);
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        self.write_u8(TAG_CYCLE_SUMMARY);
        self.write_u64(s.cycle);
        self.write_u32(s.units);
        self.write_u32(s.slices);
        self.write_u32(s.placements);
        self.write_u32(s.updates);
        self.write_u32(s.deletions);
        self.write_u64(s.render_ticks);
        self.write_u64(s.commit_ticks);
    }

    fn on_effects(&mut self, cycle: u64, effects: &[EffectRecord]) {
        let count = |effect: Effect| count_u32(effects.iter().filter(|r| r.effect == effect).count());
        self.write_u8(TAG_EFFECT_COUNTS);
        self.write_u64(cycle);
        self.write_u32(count(Effect::Placement));
        self.write_u32(count(Effect::Update));
        self.write_u32(count(Effect::Deletion));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`RenderRequestEvent`].
    RenderRequest(RenderRequestEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`UnitOfWorkEvent`].
    UnitOfWork(UnitOfWorkEvent),
    /// A [`YieldEvent`].
    Yield(YieldEvent),
    /// An [`AbortEvent`].
    Abort(AbortEvent),
    /// A [`CycleSummary`].
    CycleSummary(CycleSummary),
    /// Effect counts applied by one commit.
    EffectCounts {
        /// Cycle counter.
        cycle: u64,
        /// Number of placements.
        placements: u32,
        /// Number of updates.
        updates: u32,
        /// Number of deletions.
        deletions: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Render,
            _ => PhaseKind::Commit,
        })
    }

    fn read_kind(&mut self) -> Option<FiberKindTag> {
        Some(match self.read_u8()? {
            0 => FiberKindTag::Root,
            1 => FiberKindTag::Host,
            2 => FiberKindTag::Text,
            _ => FiberKindTag::Component,
        })
    }

    fn read_reason(&mut self) -> Option<AbortReason> {
        Some(match self.read_u8()? {
            0 => AbortReason::ComponentError,
            _ => AbortReason::Superseded,
        })
    }

    fn decode_render_request(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RenderRequest(RenderRequestEvent {
            cycle: self.read_u64()?,
            superseded: self.read_u8()? != 0,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            cycle: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            cycle: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_unit_of_work(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::UnitOfWork(UnitOfWorkEvent {
            cycle: self.read_u64()?,
            fiber: self.read_u32()?,
            kind: self.read_kind()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_yield(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Yield(YieldEvent {
            cycle: self.read_u64()?,
            slice: self.read_u32()?,
            units: self.read_u32()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_abort(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Abort(AbortEvent {
            cycle: self.read_u64()?,
            reason: self.read_reason()?,
            units: self.read_u32()?,
        }))
    }

    fn decode_cycle_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CycleSummary(CycleSummary {
            cycle: self.read_u64()?,
            units: self.read_u32()?,
            slices: self.read_u32()?,
            placements: self.read_u32()?,
            updates: self.read_u32()?,
            deletions: self.read_u32()?,
            render_ticks: self.read_u64()?,
            commit_ticks: self.read_u64()?,
        }))
    }

    fn decode_effect_counts(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::EffectCounts {
            cycle: self.read_u64()?,
            placements: self.read_u32()?,
            updates: self.read_u32()?,
            deletions: self.read_u32()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_RENDER_REQUEST => self.decode_render_request(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_UNIT_OF_WORK => self.decode_unit_of_work(),
            TAG_YIELD => self.decode_yield(),
            TAG_ABORT => self.decode_abort(),
            TAG_CYCLE_SUMMARY => self.decode_cycle_summary(),
            TAG_EFFECT_COUNTS => self.decode_effect_counts(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> CycleSummary {
        CycleSummary {
            cycle: 4,
            units: 12,
            slices: 3,
            placements: 2,
            updates: 9,
            deletions: 1,
            render_ticks: 1500,
            commit_ticks: 40,
        }
    }

    #[test]
    fn a_recorded_slice_decodes_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_render_request(&RenderRequestEvent {
            cycle: 4,
            superseded: true,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            cycle: 4,
            phase: PhaseKind::Render,
            timestamp: HostTime(100),
        });
        rec.on_unit_of_work(&UnitOfWorkEvent {
            cycle: 4,
            fiber: 7,
            kind: FiberKindTag::Component,
            timestamp: HostTime(101),
        });
        rec.on_phase_end(&PhaseEndEvent {
            cycle: 4,
            phase: PhaseKind::Render,
            timestamp: HostTime(102),
        });
        rec.on_yield(&YieldEvent {
            cycle: 4,
            slice: 0,
            units: 1,
            timestamp: HostTime(102),
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 5);
        assert!(matches!(
            events[0],
            RecordedEvent::RenderRequest(RenderRequestEvent {
                cycle: 4,
                superseded: true
            })
        ));
        match &events[2] {
            RecordedEvent::UnitOfWork(e) => {
                assert_eq!(e.fiber, 7);
                assert_eq!(e.kind, FiberKindTag::Component);
                assert_eq!(e.timestamp, HostTime(101));
            }
            other => panic!("expected UnitOfWork, got {other:?}"),
        }
        match &events[3] {
            RecordedEvent::PhaseEnd(e) => assert_eq!(e.phase, PhaseKind::Render),
            other => panic!("expected PhaseEnd, got {other:?}"),
        }
        assert!(matches!(events[4], RecordedEvent::Yield(YieldEvent { units: 1, .. })));
    }

    #[test]
    fn summary_survives_recording() {
        let mut rec = RecorderSink::new();
        rec.on_cycle_summary(&sample_summary());
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::CycleSummary(s)] => assert_eq!(*s, sample_summary()),
            other => panic!("expected one CycleSummary, got {other:?}"),
        }
    }

    #[test]
    fn abort_reason_is_kept() {
        let mut rec = RecorderSink::new();
        rec.on_abort(&AbortEvent {
            cycle: 9,
            reason: AbortReason::ComponentError,
            units: 3,
        });
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::Abort(e)] => {
                assert_eq!(e.reason, AbortReason::ComponentError);
                assert_eq!(e.units, 3);
            }
            other => panic!("expected one Abort, got {other:?}"),
        }
    }

    #[test]
    fn effects_store_counts_only() {
        let mut rec = RecorderSink::new();
        let record = |fiber, effect| EffectRecord {
            fiber,
            kind: FiberKindTag::Host,
            effect,
        };
        rec.on_effects(
            2,
            &[
                record(1, Effect::Placement),
                record(2, Effect::Deletion),
                record(3, Effect::Deletion),
            ],
        );
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::EffectCounts {
                cycle,
                placements,
                updates,
                deletions,
            }] => {
                assert_eq!((*cycle, *placements, *updates, *deletions), (2, 1, 0, 2));
            }
            other => panic!("expected one EffectCounts, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_cycle_summary(&sample_summary());
        rec.on_cycle_summary(&sample_summary());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 1];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}

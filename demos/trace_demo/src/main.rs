// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless render loop that exercises the tracing and diagnostics pipeline.
//!
//! Renders a small todo list through several cycles against a
//! [`MemoryHost`], granting the renderer a few units of work per slice. Events
//! go to both a [`PrettyPrintSink`] and a [`RecorderSink`]; afterwards the
//! fiber tree and host markup are printed and a Chrome trace JSON file is
//! written.
//!
//! Simulated time is in microsecond ticks: each unit of work costs one tick
//! and the host runs for a frame between slices.

use std::fs::File;
use std::io::BufWriter;

use bramble_core::element::{Component, Element, PropValue, Props, component, element, text};
use bramble_core::memory::MemoryHost;
use bramble_core::scheduler::{SchedulerConfig, WorkStatus};
use bramble_core::time::{HostTime, Timebase};
use bramble_core::timing::UnitBudget;
use bramble_core::trace::{
    AbortEvent, CycleSummary, EffectRecord, PhaseBeginEvent, PhaseEndEvent, RenderRequestEvent,
    TraceSink, Tracer, UnitOfWorkEvent, YieldEvent,
};
use bramble_core::{ComponentError, Renderer};

use bramble_debug::pretty::PrettyPrintSink;
use bramble_debug::recorder::RecorderSink;

/// Units of work granted per slice.
const SLICE_UNITS: u32 = 4;
/// Host time between slices (one 60 Hz frame).
const FRAME_TICKS: u64 = 16_667;

/// Forwards every event to two sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_render_request(&mut self, e: &RenderRequestEvent) {
        self.pretty.on_render_request(e);
        self.recorder.on_render_request(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.pretty.on_phase_begin(e);
        self.recorder.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.pretty.on_phase_end(e);
        self.recorder.on_phase_end(e);
    }

    fn on_unit_of_work(&mut self, e: &UnitOfWorkEvent) {
        self.pretty.on_unit_of_work(e);
        self.recorder.on_unit_of_work(e);
    }

    fn on_yield(&mut self, e: &YieldEvent) {
        self.pretty.on_yield(e);
        self.recorder.on_yield(e);
    }

    fn on_abort(&mut self, e: &AbortEvent) {
        self.pretty.on_abort(e);
        self.recorder.on_abort(e);
    }

    fn on_cycle_summary(&mut self, s: &CycleSummary) {
        self.pretty.on_cycle_summary(s);
        self.recorder.on_cycle_summary(s);
    }

    fn on_effects(&mut self, cycle: u64, effects: &[EffectRecord]) {
        self.pretty.on_effects(cycle, effects);
        self.recorder.on_effects(cycle, effects);
    }
}

/// Drives the in-flight cycle slice by slice until it settles.
fn run_cycle(renderer: &mut Renderer, host: &mut MemoryHost, clock: &mut u64, sink: &mut Tee<'_>) {
    loop {
        let budget = UnitBudget::starting_at(SLICE_UNITS, HostTime(*clock));
        let status = renderer.work(host, &budget, &mut Tracer::new(sink));
        *clock += u64::from(SLICE_UNITS) + FRAME_TICKS;
        match status {
            Ok(WorkStatus::Yielded { .. }) => {}
            Ok(WorkStatus::Idle | WorkStatus::Committed(_)) => return,
            Err(err) => {
                println!("render failed: {err}");
                return;
            }
        }
    }
}

fn todo_list(item: &Component, todos: &[(&str, bool)]) -> Element {
    element(
        "main",
        Props::new().with("id", "app"),
        [
            element("h1", Props::new(), ["Todos".into()]),
            element(
                "ul",
                Props::new(),
                todos.iter().map(|&(label, done)| {
                    component(item, Props::new().with("label", label).with("done", done), [])
                }),
            ),
        ],
    )
}

fn main() {
    let timebase = Timebase::MICROS;

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()), timebase);
    let mut recorder = RecorderSink::new();
    let mut sink = Tee {
        pretty: &mut pretty,
        recorder: &mut recorder,
    };

    // -- host and renderer -------------------------------------------------
    let mut host = MemoryHost::new();
    let container = host.create_container("body");
    let mut renderer = Renderer::new(SchedulerConfig::headless());
    let mut clock: u64 = 1_000_000; // start at 1s

    let item = Component::new("TodoItem", |props| {
        let label = props.get("label").map(ToString::to_string).unwrap_or_default();
        let done = matches!(props.get("done"), Some(PropValue::Bool(true)));
        let class = if done { "done" } else { "open" };
        element(
            "li",
            Props::new()
                .with("class", class)
                .on("click", |e| println!("clicked {:?}", e.target)),
            [text(label)],
        )
    });

    // 1. Initial mount.
    renderer.render(
        todo_list(&item, &[("write reconciler", true), ("write tests", false)]),
        container,
    );
    run_cycle(&mut renderer, &mut host, &mut clock, &mut sink);

    // 2. Toggle an item and append one.
    renderer.render(
        todo_list(
            &item,
            &[("write reconciler", true), ("write tests", true), ("ship", false)],
        ),
        container,
    );
    run_cycle(&mut renderer, &mut host, &mut clock, &mut sink);

    // 3. A request superseded after one slice by a shorter list.
    renderer.render(
        todo_list(&item, &[("a", false), ("b", false), ("c", false), ("d", false)]),
        container,
    );
    let budget = UnitBudget::starting_at(SLICE_UNITS, HostTime(clock));
    let _ = renderer.work(&mut host, &budget, &mut Tracer::new(&mut sink));
    clock += u64::from(SLICE_UNITS) + FRAME_TICKS;
    renderer.render(todo_list(&item, &[("ship", false)]), container);
    run_cycle(&mut renderer, &mut host, &mut clock, &mut sink);

    // 4. A failing component aborts the cycle; the committed tree survives.
    let broken = Component::fallible("Broken", |_| Err(ComponentError::new("no data")));
    renderer.render(
        element("main", Props::new(), [component(&broken, Props::new(), [])]),
        container,
    );
    run_cycle(&mut renderer, &mut host, &mut clock, &mut sink);

    // -- results -----------------------------------------------------------
    if let Some(root) = renderer.current_root() {
        print!("{}", bramble_debug::tree::dump(renderer.store(), root));
    }
    println!("{}", host.to_markup(container));
    if let Some(&li) = host
        .children(container)
        .first()
        .and_then(|&main| host.children(main).get(1))
        .and_then(|&ul| host.children(ul).first())
    {
        host.dispatch(li, "click");
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    bramble_debug::chrome::export(recorder.as_bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({} cycles)", renderer.cycle());
}

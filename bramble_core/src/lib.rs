// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fiber tree, reconciler, and cooperative render scheduler.
//!
//! `bramble_core` turns immutable [`Element`](element::Element) descriptions
//! into minimal mutations of a live presentation tree. It is `no_std`
//! compatible (with `alloc`) and keeps fibers in an index-addressed arena
//! with generational handles, so every link between fibers is a lookup rather
//! than a shared reference.
//!
//! # Architecture
//!
//! Rendering is split into an interruptible *render phase* and an atomic
//! *commit phase*:
//!
//! ```text
//!   Renderer::render(element, container)
//!       │
//!       ▼
//!   wip root ──► Renderer::work(host, deadline) ──► perform_unit_of_work ─┐
//!                     ▲        │                         │               │
//!                     │        │ deadline expired        ▼               │
//!                     │        └──► WorkStatus::Yielded  reconcile_children
//!                     │                                  (PLACEMENT / UPDATE /
//!                     └──────────── next slice ◄──────── DELETION effects)
//!                                                                         │
//!   no units left ──► commit_root ──► HostTree mutations ──► current root ◄┘
//! ```
//!
//! **[`element`]**: The description builder: [`Element`](element::Element),
//! [`Props`](element::Props), [`Component`](element::Component).
//!
//! **[`fiber`]**: Struct-of-arrays fiber arena with generational
//! [`FiberId`](fiber::FiberId) handles.
//!
//! **[`backend`]**: The [`HostTree`](backend::HostTree) trait that
//! presentation backends implement.
//!
//! **[`adapter`]**: Creates and synchronizes presentation nodes from props.
//!
//! **[`reconcile`]**: Position-indexed diff of a fiber's children.
//!
//! **[`scheduler`]**: Cooperative work loop and its configuration.
//!
//! **[`commit`]**: Applies accumulated effects in one uninterrupted pass.
//!
//! **[`renderer`]**: The render session that owns all of the above state.
//!
//! **[`timing`]**: The [`Deadline`](timing::Deadline) a host grants for each
//! slice of work.
//!
//! **[`time`]**: Tick-based host time and durations.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! render-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! **[`memory`]**: A headless [`HostTree`](backend::HostTree) for tests and
//! tooling.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-fiber
//!   effect records emitted at commit.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod adapter;
pub mod backend;
pub mod commit;
pub mod element;
pub mod error;
pub mod fiber;
pub mod memory;
pub mod reconcile;
pub mod renderer;
pub mod scheduler;
pub mod time;
pub mod timing;
pub mod trace;

pub use element::{Component, Element, ElementType, Props, PropValue};
pub use error::{ComponentError, RenderError};
pub use renderer::Renderer;

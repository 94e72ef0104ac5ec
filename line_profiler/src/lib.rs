// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-source-line execution time profiling for embedded scripting VMs.
//!
//! The engine registers a line callback that forwards its execution context to
//! [`LineProfiler::on_line_boundary`]. The profiler resolves the executing function, keeps a
//! strong handle to it and adds the time elapsed since the previous boundary to the slot of the
//! line being entered. Results are grouped by source section, then by function, and can be read
//! through [`LineProfiler::profile_data`] or turned into a [`ProfileReport`].
//!
//! Everything runs synchronously on the engine's thread; there is no internal locking.
//!
//! ## Backend
//! With the `tracy` feature (on by default), [`TracyLineMirror`] mirrors entered lines as Tracy
//! zones via `tracy-client`.
//!
//! ## Example
//! ```ignore
//! use line_profiler::{LineProfiler, ProfileReport, DeclarationResolver};
//!
//! let mut profiler = LineProfiler::new();
//! profiler.start();
//! engine.execute_with_line_callback(|ctx| profiler.on_line_boundary(ctx))?;
//! let report = ProfileReport::from_store(profiler.profile_data(), &mut DeclarationResolver::default());
//! println!("{report}");
//!
//! // Before the engine replaces the module:
//! profiler.clear();
//! ```

mod clock;
mod host;
mod observer;
mod profiler;
mod report;
mod resolver;
mod store;
#[cfg(feature = "tracy")]
mod tracy;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use host::{
    ExecutionContext, FunctionHandle, FunctionIdentity, HostError, LinePosition, ScriptFunction,
};
pub use observer::{LineObserver, NoopObserver};
pub use profiler::{Limits, LineProfiler};
pub use report::{FunctionReport, HotLine, LineReport, ProfileReport, SectionReport};
pub use resolver::{DeclarationResolver, DefaultLabelResolver, LabelResolver};
pub use store::{FunctionRecord, LineTiming, Lines, ProfileStore, SectionRecord};
#[cfg(feature = "tracy")]
pub use tracy::TracyLineMirror;

// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The line-boundary aggregator.

use core::time::Duration;

use crate::clock::{Clock, MonotonicClock};
use crate::host::{ExecutionContext, FunctionHandle, FunctionIdentity};
use crate::observer::{LineObserver, NoopObserver};
use crate::store::ProfileStore;

/// Allocation limits for a [`LineProfiler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of line slots a single function may grow to.
    ///
    /// Boundaries whose line lies this many lines (or more) past the function's first line are
    /// ignored.
    pub max_line_span: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_line_span: 1 << 20,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct CachedRecord {
    section: usize,
    function: usize,
    identity: FunctionIdentity,
}

/// Attributes elapsed time to the source lines of executing script functions.
///
/// The engine calls [`on_line_boundary`](Self::on_line_boundary) whenever its current line
/// changes. Each accepted call adds the time elapsed since the previous accepted call (or since
/// [`set_start_time`](Self::set_start_time)) to the slot of the line being *entered*.
///
/// ## Lifecycle
///
/// - A new or [`clear`](Self::clear)ed profiler holds an empty store.
/// - [`start`](Self::start) / [`set_start_time`](Self::set_start_time) opens a timing window.
///   The store is kept, so repeated runs of the same module accumulate.
/// - [`clear`](Self::clear) must be called before the engine discards the module whose
///   functions were recorded. It drops every record and the function handles they retain.
///
/// Anomalous boundaries (no current function, non-positive line, no section, a function whose
/// declared line is unavailable) are ignored and do not move the time cursor.
pub struct LineProfiler<F, C: Clock = MonotonicClock, O = NoopObserver> {
    clock: C,
    limits: Limits,
    observer: O,
    start_time: C::Instant,
    last_time: C::Instant,
    store: ProfileStore<F>,
    last_record: Option<CachedRecord>,
}

impl<F: FunctionHandle> LineProfiler<F> {
    /// Creates a profiler timed by [`MonotonicClock`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock)
    }
}

impl<F: FunctionHandle> Default for LineProfiler<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FunctionHandle, C: Clock> LineProfiler<F, C> {
    /// Creates a profiler timed by `clock`.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        let now = clock.now();
        Self {
            clock,
            limits: Limits::default(),
            observer: NoopObserver,
            start_time: now,
            last_time: now,
            store: ProfileStore::new(),
            last_record: None,
        }
    }
}

impl<F, C, O> LineProfiler<F, C, O>
where
    F: FunctionHandle,
    C: Clock,
    O: LineObserver,
{
    /// Replaces the allocation limits.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the observer.
    #[must_use]
    pub fn with_observer<O2: LineObserver>(self, observer: O2) -> LineProfiler<F, C, O2> {
        LineProfiler {
            clock: self.clock,
            limits: self.limits,
            observer,
            start_time: self.start_time,
            last_time: self.last_time,
            store: self.store,
            last_record: self.last_record,
        }
    }

    /// Opens a timing window at `time` without touching accumulated data.
    pub fn set_start_time(&mut self, time: C::Instant) {
        self.start_time = time;
        self.last_time = time;
    }

    /// Opens a timing window at the clock's current reading.
    pub fn start(&mut self) {
        let now = self.clock.now();
        self.set_start_time(now);
    }

    /// Start of the current timing window.
    #[must_use]
    #[inline]
    pub fn start_time(&self) -> C::Instant {
        self.start_time
    }

    /// Time of the last accepted boundary (or of the window start).
    #[must_use]
    #[inline]
    pub fn last_time(&self) -> C::Instant {
        self.last_time
    }

    /// Read-only view of the accumulated data.
    #[must_use]
    #[inline]
    pub fn profile_data(&self) -> &ProfileStore<F> {
        &self.store
    }

    /// The profiler's clock.
    #[must_use]
    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current allocation limits.
    #[must_use]
    #[inline]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// The attached observer.
    #[must_use]
    #[inline]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Drops all recorded data and restarts the timing window at the current time.
    ///
    /// Every retained function handle is released before this returns.
    pub fn clear(&mut self) {
        let released = self.store.clear();
        self.last_record = None;
        self.start();
        self.observer.cleared();
        tracing::debug!(released, "cleared line profile");
    }

    /// Records a line boundary reported by the engine.
    ///
    /// This never fails; boundaries that cannot be attributed are ignored.
    pub fn on_line_boundary<X>(&mut self, context: &X)
    where
        X: ExecutionContext<Function = F> + ?Sized,
    {
        let Some(function) = context.current_function() else {
            return;
        };
        let position = context.position();
        let Some(section) = position.section else {
            return;
        };
        let line = match u32::try_from(position.line) {
            Ok(line) if line > 0 => line,
            _ => return,
        };

        let Some((s, f)) = self.resolve_record(section, function, line) else {
            return;
        };
        let Some(record) = self
            .store
            .section_at_mut(s)
            .and_then(|section| section.function_at_mut(f))
        else {
            return;
        };

        // Constructors report initializer lines before the body's first line.
        let line = line.max(record.first_line());
        let offset = line - record.first_line();
        if offset >= self.limits.max_line_span {
            tracing::trace!(
                section,
                line,
                first_line = record.first_line(),
                "line outside of profiling limits"
            );
            return;
        }

        let now = self.clock.now();
        let delta: Duration = self.clock.elapsed(self.last_time, now);
        self.last_time = now;
        record.accumulate(offset as usize, delta);

        self.observer.line_entered(section, record.identity(), line);
    }

    /// Returns `(section index, function index)` for `function` in `section`, creating records
    /// as needed.
    ///
    /// Returns `None` if the function's declared line is unavailable, or if the function is new
    /// and `line` already lies past [`Limits::max_line_span`]; no record is created then.
    fn resolve_record(
        &mut self,
        section: &str,
        function: &F,
        line: u32,
    ) -> Option<(usize, usize)> {
        let identity = function.identity();
        if let Some(cached) = self.last_record
            && cached.identity == identity
            && self
                .store
                .section_at(cached.section)
                .is_some_and(|s| s.name() == section)
        {
            return Some((cached.section, cached.function));
        }

        let existing = self.store.section_index(section);
        if let Some(s) = existing
            && let Some(f) = self
                .store
                .section_at(s)
                .and_then(|record| record.function_index(identity))
        {
            self.last_record = Some(CachedRecord {
                section: s,
                function: f,
                identity,
            });
            return Some((s, f));
        }

        let first_line = match function.declared_line() {
            Ok(line) => line,
            Err(err) => {
                tracing::debug!(
                    section,
                    function = %identity,
                    error = %err,
                    "skipping function without declared line"
                );
                return None;
            }
        };
        if line.saturating_sub(first_line) >= self.limits.max_line_span {
            tracing::trace!(
                section,
                line,
                first_line,
                "first line outside of profiling limits"
            );
            return None;
        }

        let s = existing.unwrap_or_else(|| self.store.section_index_or_insert(section));
        let f = self
            .store
            .section_at_mut(s)?
            .insert_function(function.clone(), first_line);
        tracing::debug!(
            section,
            function = %identity,
            declaration = function.declaration().as_deref().unwrap_or(""),
            first_line,
            "recording new function"
        );
        self.last_record = Some(CachedRecord {
            section: s,
            function: f,
            identity,
        });
        Some((s, f))
    }
}

impl<F, C: Clock, O> core::fmt::Debug for LineProfiler<F, C, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LineProfiler")
            .field("sections", &self.store.len())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted fake engine used by the `line_profiler` conformance tests.
//!
//! [`FakeVm`] owns a [`ManualClock`] and a [`LineProfiler`] timed by it. Each [`FakeVm::step`]
//! advances the clock by the cost of whatever ran since the previous boundary and then reports
//! the boundary, which is exactly what an interpreter's line callback observes.

use core::cell::Cell;
use core::time::Duration;
use std::rc::Rc;

use line_profiler::{
    Clock, ExecutionContext, FunctionHandle, HostError, LinePosition, LineProfiler, ManualClock,
    ScriptFunction,
};

/// A compiled script function.
#[derive(Debug)]
pub struct FakeFunction {
    name: Box<str>,
    declared_line: Option<u32>,
    discarded: Cell<bool>,
}

impl FakeFunction {
    /// A function declared at `declared_line`.
    #[must_use]
    pub fn new(name: &str, declared_line: u32) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            declared_line: Some(declared_line),
            discarded: Cell::new(false),
        })
    }

    /// A function the engine cannot locate in source.
    #[must_use]
    pub fn without_declaration(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            declared_line: None,
            discarded: Cell::new(false),
        })
    }

    /// Marks the owning module as discarded.
    pub fn discard(&self) {
        self.discarded.set(true);
    }

    /// Function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ScriptFunction for FakeFunction {
    fn declared_line(&self) -> Result<u32, HostError> {
        if self.discarded.get() {
            return Err(HostError::Discarded);
        }
        self.declared_line.ok_or(HostError::NoDeclaration)
    }

    fn declaration(&self) -> Option<String> {
        Some(format!("void {}()", self.name))
    }
}

/// Execution state at one boundary.
#[derive(Clone, Copy, Debug)]
pub struct FakeContext<'a> {
    /// Executing function, if any.
    pub function: Option<&'a Rc<FakeFunction>>,
    /// Reported position.
    pub position: LinePosition<'a>,
}

impl<'a> FakeContext<'a> {
    /// Context inside `function` at `line` of `section`.
    #[must_use]
    pub fn at(function: &'a Rc<FakeFunction>, section: &'a str, line: i32) -> Self {
        Self {
            function: Some(function),
            position: LinePosition::new(section, line),
        }
    }

    /// Context outside any user function (e.g. cleanup code).
    #[must_use]
    pub fn outside(section: &'a str, line: i32) -> Self {
        Self {
            function: None,
            position: LinePosition::new(section, line),
        }
    }
}

impl ExecutionContext for FakeContext<'_> {
    type Function = Rc<FakeFunction>;

    fn current_function(&self) -> Option<&Rc<FakeFunction>> {
        self.function
    }

    fn position(&self) -> LinePosition<'_> {
        self.position
    }
}

/// Fake engine driving a profiler with a manual clock.
#[derive(Debug)]
pub struct FakeVm {
    /// Shared with the profiler.
    pub clock: ManualClock,
    /// Profiler under test.
    pub profiler: LineProfiler<Rc<FakeFunction>, ManualClock>,
}

impl Default for FakeVm {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeVm {
    /// Creates an engine whose clock reads zero.
    #[must_use]
    pub fn new() -> Self {
        let clock = ManualClock::new();
        let profiler = LineProfiler::with_clock(clock.clone());
        Self { clock, profiler }
    }

    /// Starts a run at the current clock reading.
    pub fn begin_run(&mut self) {
        self.profiler.start();
    }

    /// Lets `cost` elapse, then reports `context`.
    pub fn step(&mut self, cost: Duration, context: &FakeContext<'_>) {
        self.clock.advance(cost);
        self.profiler.on_line_boundary(context);
    }

    /// Sets the clock to `at`, then reports `context`.
    pub fn step_at(&mut self, at: Duration, context: &FakeContext<'_>) {
        self.clock.set(at);
        self.profiler.on_line_boundary(context);
    }

    /// Slots recorded for `function` in `section`, or `None` if it was never recorded.
    #[must_use]
    pub fn slots(&self, section: &str, function: &Rc<FakeFunction>) -> Option<Vec<Duration>> {
        let record = self
            .profiler
            .profile_data()
            .section(section)?
            .function(function.identity())?;
        Some(record.line_durations().to_vec())
    }

    /// Time elapsed since the start of the current window, per the profiler's cursor.
    #[must_use]
    pub fn window_elapsed(&self) -> Duration {
        let clock = self.profiler.clock();
        clock.elapsed(self.profiler.start_time(), self.profiler.last_time())
    }
}

/// Shorthand for a nanosecond duration.
#[must_use]
pub fn ns(n: u64) -> Duration {
    Duration::from_nanos(n)
}

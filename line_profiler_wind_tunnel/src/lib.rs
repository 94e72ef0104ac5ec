// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixtures for the `line_profiler` wind-tunnel benchmarks.

use std::rc::Rc;

use line_profiler::{ExecutionContext, HostError, LinePosition, ScriptFunction};

/// Function stub declared at a fixed line.
#[derive(Debug)]
pub struct BenchFunction {
    declared_line: u32,
}

impl BenchFunction {
    /// Creates a function declared at `declared_line`.
    #[must_use]
    pub fn new(declared_line: u32) -> Rc<Self> {
        Rc::new(Self { declared_line })
    }
}

impl ScriptFunction for BenchFunction {
    fn declared_line(&self) -> Result<u32, HostError> {
        Ok(self.declared_line)
    }
}

/// Context reporting a fixed function and position.
#[derive(Clone, Copy, Debug)]
pub struct BenchContext<'a> {
    /// Executing function.
    pub function: Option<&'a Rc<BenchFunction>>,
    /// Section name.
    pub section: &'a str,
    /// Reported line.
    pub line: i32,
}

impl ExecutionContext for BenchContext<'_> {
    type Function = Rc<BenchFunction>;

    #[inline]
    fn current_function(&self) -> Option<&Rc<BenchFunction>> {
        self.function
    }

    #[inline]
    fn position(&self) -> LinePosition<'_> {
        LinePosition::new(self.section, self.line)
    }
}

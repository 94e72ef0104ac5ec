// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host side of the profiler: owns the module, runs it and reports line boundaries.

use core::fmt;
use std::hint::black_box;
use std::rc::Rc;
use std::time::Instant;

use line_profiler::{
    ExecutionContext, LineObserver, LinePosition, LineProfiler, MonotonicClock, NoopObserver,
    ProfileStore,
};

use crate::script::{DemoFunction, DemoModule, Statement};

const MAX_CALL_DEPTH: usize = 64;

/// Errors raised while running a module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DemoError {
    /// `execute` was called with no module loaded.
    NoModule,
    /// The entry point does not exist.
    UnknownEntry {
        /// Requested entry name.
        name: Box<str>,
    },
    /// A call statement referenced a function outside the module.
    UnknownCallee {
        /// Calling function.
        caller: Box<str>,
        /// Index that was called.
        callee: usize,
    },
    /// The call stack grew past [`MAX_CALL_DEPTH`].
    CallDepthExceeded,
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoModule => write!(f, "no module loaded"),
            Self::UnknownEntry { name } => write!(f, "unknown entry point: {name}"),
            Self::UnknownCallee { caller, callee } => {
                write!(f, "bad call target: caller={caller} callee={callee}")
            }
            Self::CallDepthExceeded => {
                write!(f, "call depth exceeded (max {MAX_CALL_DEPTH})")
            }
        }
    }
}

impl core::error::Error for DemoError {}

/// What the VM exposes to its line callback.
struct DemoContext<'a> {
    function: Option<&'a Rc<DemoFunction>>,
    section: &'a str,
    line: i32,
}

impl ExecutionContext for DemoContext<'_> {
    type Function = Rc<DemoFunction>;

    fn current_function(&self) -> Option<&Rc<DemoFunction>> {
        self.function
    }

    fn position(&self) -> LinePosition<'_> {
        LinePosition::new(self.section, self.line)
    }
}

struct Interpreter<'a, O> {
    profiler: &'a mut LineProfiler<Rc<DemoFunction>, MonotonicClock, O>,
    module: &'a DemoModule,
}

impl<O: LineObserver> Interpreter<'_, O> {
    fn call(&mut self, function: &Rc<DemoFunction>, depth: usize) -> Result<(), DemoError> {
        if depth >= MAX_CALL_DEPTH {
            return Err(DemoError::CallDepthExceeded);
        }
        let module = self.module;
        for statement in &function.body {
            self.profiler.on_line_boundary(&DemoContext {
                function: Some(function),
                section: &module.section,
                line: statement.line(),
            });
            match *statement {
                Statement::Work { iterations, .. } => {
                    spin(iterations);
                }
                Statement::Call { callee, .. } => {
                    let target = module.functions.get(callee).ok_or_else(|| {
                        DemoError::UnknownCallee {
                            caller: function.name.clone(),
                            callee,
                        }
                    })?;
                    self.call(target, depth + 1)?;
                }
                Statement::Synthetic => {}
            }
        }
        Ok(())
    }

    // Context cleanup runs outside any user function.
    fn finish(&mut self) {
        self.profiler.on_line_boundary(&DemoContext {
            function: None,
            section: &self.module.section,
            line: 0,
        });
    }
}

fn spin(iterations: u64) -> u64 {
    let mut acc = 0_u64;
    for i in 0..iterations {
        acc = black_box(acc.wrapping_mul(31).wrapping_add(i));
    }
    acc
}

/// A scripting engine with one module slot and a line profiler attached to its context.
#[derive(Debug)]
pub(crate) struct ScriptingSystem<O = NoopObserver> {
    profiler: LineProfiler<Rc<DemoFunction>, MonotonicClock, O>,
    module: Option<DemoModule>,
}

impl ScriptingSystem {
    pub(crate) fn new() -> Self {
        Self::with_observer(NoopObserver)
    }
}

impl<O: LineObserver> ScriptingSystem<O> {
    pub(crate) fn with_observer(observer: O) -> Self {
        Self {
            profiler: LineProfiler::new().with_observer(observer),
            module: None,
        }
    }

    pub(crate) fn profile_data(&self) -> &ProfileStore<Rc<DemoFunction>> {
        self.profiler.profile_data()
    }

    /// Replaces the loaded module.
    ///
    /// The profiler is cleared first: its records point at functions of the old module.
    pub(crate) fn set_module(&mut self, module: DemoModule) {
        self.profiler.clear();
        self.module = None;
        tracing::info!(
            section = &*module.section,
            functions = module.functions.len(),
            "module loaded"
        );
        self.module = Some(module);
    }

    /// Runs `entry` once; timings accumulate across calls.
    pub(crate) fn execute(&mut self, entry: &str) -> Result<(), DemoError> {
        let module = self.module.as_ref().ok_or(DemoError::NoModule)?;
        let function = module
            .function(entry)
            .ok_or_else(|| DemoError::UnknownEntry { name: entry.into() })?;

        let started = Instant::now();
        self.profiler.start();
        let mut interpreter = Interpreter {
            profiler: &mut self.profiler,
            module,
        };
        let result = interpreter.call(function, 0);
        interpreter.finish();
        tracing::debug!(entry, elapsed = ?started.elapsed(), ok = result.is_ok(), "run finished");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::{DemoError, ScriptingSystem};
    use crate::script::{DemoFunction, DemoModule, Statement, sample_module};
    use line_profiler::FunctionHandle;
    use std::rc::Rc;

    fn recursive_module() -> DemoModule {
        DemoModule {
            section: "Loop".into(),
            functions: vec![Rc::new(DemoFunction {
                name: "Forever".into(),
                declaration: "void Forever()".into(),
                declared_line: 1,
                body: vec![Statement::Call { line: 2, callee: 0 }],
            })],
        }
    }

    #[test]
    fn execute_without_module_fails() {
        let mut system = ScriptingSystem::new();
        assert_eq!(system.execute("Test"), Err(DemoError::NoModule));
    }

    #[test]
    fn unknown_entry_fails_without_recording() {
        let mut system = ScriptingSystem::new();
        system.set_module(sample_module(1, 1));
        assert_eq!(
            system.execute("Main"),
            Err(DemoError::UnknownEntry {
                name: "Main".into()
            })
        );
        assert!(system.profile_data().is_empty());
    }

    #[test]
    fn run_records_every_called_function() {
        let mut system = ScriptingSystem::new();
        system.set_module(sample_module(1, 1));
        system.execute("Test").unwrap();

        let section = system.profile_data().section("Script").unwrap();
        assert_eq!(section.len(), 3);

        // Discovery order follows execution order.
        let firsts: Vec<_> = section.functions().iter().map(|f| f.first_line()).collect();
        assert_eq!(firsts, vec![10, 1, 20]);

        // Test spans lines 10..=16, the synthetic statement adds no slot of its own.
        assert_eq!(section.functions()[0].line_durations().len(), 7);
        // The constructor's initializer line is clamped onto its first line.
        assert_eq!(section.functions()[2].line_durations().len(), 2);
    }

    #[test]
    fn repeated_runs_reuse_records() {
        let mut system = ScriptingSystem::new();
        system.set_module(sample_module(1, 1));
        system.execute("Test").unwrap();
        system.execute("Test").unwrap();
        assert_eq!(system.profile_data().function_count(), 3);
    }

    #[test]
    fn set_module_releases_old_functions() {
        let mut system = ScriptingSystem::new();
        system.set_module(sample_module(1, 1));
        system.execute("Test").unwrap();

        let old = Rc::downgrade(&system.module.as_ref().unwrap().functions[0]);
        system.set_module(sample_module(1, 2));
        assert!(old.upgrade().is_none());
        assert!(system.profile_data().is_empty());

        system.execute("Test").unwrap();
        let helper = &system.module.as_ref().unwrap().functions[0];
        let section = system.profile_data().section("Script").unwrap();
        assert!(section.function(helper.identity()).is_some());
    }

    #[test]
    fn runaway_recursion_is_stopped() {
        let mut system = ScriptingSystem::new();
        system.set_module(recursive_module());
        assert_eq!(system.execute("Forever"), Err(DemoError::CallDepthExceeded));
        // Partial data from the aborted run stays consistent.
        let record = &system.profile_data().sections()[0].functions()[0];
        assert_eq!(record.line_durations().len(), 2);
    }
}

// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A toy compiled module: one source section and a table of functions.

use std::rc::Rc;

use line_profiler::{HostError, ScriptFunction};

/// One executable statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Statement {
    /// Burns `iterations` rounds of arithmetic.
    Work { line: i32, iterations: u64 },
    /// Calls the function at `callee` in the module's function table.
    Call { line: i32, callee: usize },
    /// Compiler-generated code with no source line.
    Synthetic,
}

impl Statement {
    pub(crate) fn line(&self) -> i32 {
        match self {
            Self::Work { line, .. } | Self::Call { line, .. } => *line,
            Self::Synthetic => 0,
        }
    }
}

#[derive(Debug)]
pub(crate) struct DemoFunction {
    pub(crate) name: Box<str>,
    pub(crate) declaration: Box<str>,
    pub(crate) declared_line: u32,
    pub(crate) body: Vec<Statement>,
}

impl ScriptFunction for DemoFunction {
    fn declared_line(&self) -> Result<u32, HostError> {
        Ok(self.declared_line)
    }

    fn declaration(&self) -> Option<String> {
        Some(self.declaration.to_string())
    }
}

#[derive(Debug)]
pub(crate) struct DemoModule {
    pub(crate) section: Box<str>,
    pub(crate) functions: Vec<Rc<DemoFunction>>,
}

impl DemoModule {
    pub(crate) fn function(&self, name: &str) -> Option<&Rc<DemoFunction>> {
        self.functions.iter().find(|f| &*f.name == name)
    }
}

fn function(
    name: &str,
    declaration: &str,
    declared_line: u32,
    body: Vec<Statement>,
) -> Rc<DemoFunction> {
    Rc::new(DemoFunction {
        name: name.into(),
        declaration: declaration.into(),
        declared_line,
        body,
    })
}

/// Builds the sample module. `scale` multiplies every statement's work, `helper_weight` only
/// the helper's hot line (so a "recompiled" module can shift the hot spot).
pub(crate) fn sample_module(scale: u64, helper_weight: u64) -> DemoModule {
    use Statement::{Call, Synthetic, Work};

    let helper = function(
        "Helper",
        "int Helper()",
        1,
        vec![
            Work {
                line: 2,
                iterations: 50 * scale * helper_weight,
            },
            Work {
                line: 3,
                iterations: 2 * scale,
            },
        ],
    );
    // The initializer on line 18 runs before the body that starts on line 20.
    let point = function(
        "Point",
        "Point::Point()",
        20,
        vec![
            Work {
                line: 18,
                iterations: 3 * scale,
            },
            Work {
                line: 21,
                iterations: scale,
            },
        ],
    );
    let test = function(
        "Test",
        "void Test()",
        10,
        vec![
            Work {
                line: 11,
                iterations: 5 * scale,
            },
            Call {
                line: 12,
                callee: 0,
            },
            Work {
                line: 13,
                iterations: 20 * scale,
            },
            Call {
                line: 14,
                callee: 1,
            },
            Synthetic,
            Work {
                line: 16,
                iterations: scale,
            },
        ],
    );

    DemoModule {
        section: "Script".into(),
        functions: vec![helper, point, test],
    }
}

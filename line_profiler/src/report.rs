// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned snapshots of a [`ProfileStore`] for display layers.
//!
//! Lines without recorded time are left out. Formatting beyond the plain-text [`Display`]
//! rendering is left to embedders.
//!
//! [`Display`]: core::fmt::Display

use core::cmp::Reverse;
use core::fmt;
use core::time::Duration;
use std::string::String;
use std::vec::Vec;

use crate::host::{FunctionHandle, FunctionIdentity};
use crate::resolver::{LabelResolver, default_function_label};
use crate::store::ProfileStore;

/// A line with recorded time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineReport {
    /// Absolute source line.
    pub line: u32,
    /// Accumulated time.
    pub duration: Duration,
}

/// Report rows for one function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionReport {
    /// Identity of the function.
    pub identity: FunctionIdentity,
    /// Display label.
    pub label: String,
    /// Declared first line.
    pub first_line: u32,
    /// Lines with recorded time, in line order.
    pub lines: Vec<LineReport>,
}

impl FunctionReport {
    /// Sum over all lines.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.lines.iter().map(|l| l.duration).sum()
    }
}

/// Report rows for one source section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionReport {
    /// Section name.
    pub name: String,
    /// Functions in discovery order.
    pub functions: Vec<FunctionReport>,
}

/// One entry of [`ProfileReport::hottest_lines`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HotLine<'a> {
    /// Section the line belongs to.
    pub section: &'a str,
    /// Label of the function the line belongs to.
    pub function: &'a str,
    /// Absolute source line.
    pub line: u32,
    /// Accumulated time.
    pub duration: Duration,
}

/// Snapshot of a whole profile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileReport {
    /// Sections in discovery order.
    pub sections: Vec<SectionReport>,
}

impl ProfileReport {
    /// Builds a report from `store`, labelling functions through `resolver`.
    pub fn from_store<F, R>(store: &ProfileStore<F>, resolver: &mut R) -> Self
    where
        F: FunctionHandle,
        R: LabelResolver<F> + ?Sized,
    {
        let sections = store
            .sections()
            .iter()
            .map(|section| SectionReport {
                name: section.name().into(),
                functions: section
                    .functions()
                    .iter()
                    .map(|record| FunctionReport {
                        identity: record.identity(),
                        label: resolver
                            .function_label(record.function())
                            .unwrap_or_else(|| default_function_label(record.identity())),
                        first_line: record.first_line(),
                        lines: record
                            .lines()
                            .filter_map(|timing| {
                                Some(LineReport {
                                    line: timing.line,
                                    duration: timing.duration?,
                                })
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Self { sections }
    }

    /// Returns `true` if no line has recorded time.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections
            .iter()
            .flat_map(|s| &s.functions)
            .all(|f| f.lines.is_empty())
    }

    /// Sum over all sections.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.sections
            .iter()
            .flat_map(|s| &s.functions)
            .map(FunctionReport::total)
            .sum()
    }

    /// The `n` most expensive lines, most expensive first.
    ///
    /// Ties are ordered by section, function label and line.
    #[must_use]
    pub fn hottest_lines(&self, n: usize) -> Vec<HotLine<'_>> {
        let mut lines: Vec<HotLine<'_>> = self
            .sections
            .iter()
            .flat_map(|section| {
                section.functions.iter().flat_map(move |function| {
                    function.lines.iter().map(move |line| HotLine {
                        section: &section.name,
                        function: &function.label,
                        line: line.line,
                        duration: line.duration,
                    })
                })
            })
            .collect();
        lines.sort_by_key(|hot| (Reverse(hot.duration), hot.section, hot.function, hot.line));
        lines.truncate(n);
        lines
    }
}

impl fmt::Display for ProfileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "{}", section.name)?;
            for function in &section.functions {
                writeln!(f, "  {}", function.label)?;
                for line in &function.lines {
                    writeln!(f, "    {}: {} nanoseconds", line.line, line.duration.as_nanos())?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HotLine, LineReport, ProfileReport};
    use crate::clock::ManualClock;
    use crate::host::{ExecutionContext, HostError, LinePosition, ScriptFunction};
    use crate::profiler::LineProfiler;
    use crate::resolver::{DeclarationResolver, DefaultLabelResolver};
    use core::time::Duration;
    use std::rc::Rc;

    struct Func {
        name: &'static str,
        first_line: u32,
    }

    impl ScriptFunction for Func {
        fn declared_line(&self) -> Result<u32, HostError> {
            Ok(self.first_line)
        }

        fn declaration(&self) -> Option<String> {
            Some(self.name.into())
        }
    }

    struct Ctx<'a>(&'a Rc<Func>, &'a str, i32);

    impl ExecutionContext for Ctx<'_> {
        type Function = Rc<Func>;

        fn current_function(&self) -> Option<&Rc<Func>> {
            Some(self.0)
        }

        fn position(&self) -> LinePosition<'_> {
            LinePosition::new(self.1, self.2)
        }
    }

    fn ns(n: u64) -> Duration {
        Duration::from_nanos(n)
    }

    fn sample() -> ProfileReport {
        let clock = ManualClock::new();
        let mut profiler = LineProfiler::with_clock(clock.clone());
        let main = Rc::new(Func {
            name: "void Test()",
            first_line: 1,
        });
        let helper = Rc::new(Func {
            name: "int Helper()",
            first_line: 10,
        });

        profiler.start();
        for (func, line, cost) in [(&main, 1, 5), (&main, 3, 2), (&helper, 11, 9), (&main, 4, 2)] {
            clock.advance(ns(cost));
            profiler.on_line_boundary(&Ctx(func, "Script", line));
        }
        ProfileReport::from_store(profiler.profile_data(), &mut DeclarationResolver::default())
    }

    #[test]
    fn zero_slots_are_skipped() {
        let report = sample();
        let main = &report.sections[0].functions[0];
        assert_eq!(main.label, "void Test()");
        assert_eq!(
            main.lines,
            vec![
                LineReport {
                    line: 1,
                    duration: ns(5)
                },
                LineReport {
                    line: 3,
                    duration: ns(2)
                },
                LineReport {
                    line: 4,
                    duration: ns(2)
                },
            ]
        );
        assert_eq!(report.total(), ns(18));
    }

    #[test]
    fn hottest_lines_break_ties_deterministically() {
        let report = sample();
        let hot = report.hottest_lines(3);
        assert_eq!(
            hot,
            vec![
                HotLine {
                    section: "Script",
                    function: "int Helper()",
                    line: 11,
                    duration: ns(9)
                },
                HotLine {
                    section: "Script",
                    function: "void Test()",
                    line: 1,
                    duration: ns(5)
                },
                HotLine {
                    section: "Script",
                    function: "void Test()",
                    line: 3,
                    duration: ns(2)
                },
            ]
        );
    }

    #[test]
    fn display_renders_tree() {
        let text = sample().to_string();
        assert!(text.starts_with("Script\n  void Test()\n    1: 5 nanoseconds\n"));
        assert!(text.contains("  int Helper()\n    11: 9 nanoseconds\n"));
    }

    #[test]
    fn default_resolver_uses_identity_labels() {
        let mut profiler = LineProfiler::with_clock(ManualClock::new());
        let f = Rc::new(Func {
            name: "void Test()",
            first_line: 1,
        });
        profiler.on_line_boundary(&Ctx(&f, "Script", 1));
        let report = ProfileReport::from_store(profiler.profile_data(), &mut DefaultLabelResolver);
        assert!(report.sections[0].functions[0].label.starts_with("func:"));
        // The only boundary had no elapsed time, so nothing is reported.
        assert!(report.is_empty());
    }
}

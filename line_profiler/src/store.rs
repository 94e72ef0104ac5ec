// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accumulated line timings, grouped by source section and function.
//!
//! The store is owned by [`LineProfiler`](crate::LineProfiler) and only handed out by shared
//! reference. Sections and functions are kept in discovery order; `hashbrown` indices map
//! section names and [`FunctionIdentity`] values to positions so lookups with a borrowed name
//! never allocate.
//!
//! ## Invariants
//!
//! - A function record's first line is fixed at creation.
//! - Slot `i` of a record holds the time attributed to line `first_line + i`.
//! - Slot vectors only grow; they are dropped as a whole by [`ProfileStore::clear`].

use core::iter::Enumerate;
use core::slice;
use core::time::Duration;

use hashbrown::HashMap;

use crate::host::{FunctionHandle, FunctionIdentity};

/// Time attributed to one source line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineTiming {
    /// Absolute source line.
    pub line: u32,
    /// Accumulated time, or `None` if nothing was recorded for the line.
    pub duration: Option<Duration>,
}

/// Per-function line durations.
#[derive(Clone, Debug)]
pub struct FunctionRecord<F> {
    function: F,
    identity: FunctionIdentity,
    first_line: u32,
    line_durations: Vec<Duration>,
}

impl<F: FunctionHandle> FunctionRecord<F> {
    fn new(function: F, first_line: u32) -> Self {
        let identity = function.identity();
        Self {
            function,
            identity,
            first_line,
            line_durations: Vec::new(),
        }
    }
}

impl<F> FunctionRecord<F> {
    /// The retained function handle.
    #[must_use]
    #[inline]
    pub fn function(&self) -> &F {
        &self.function
    }

    /// Identity of the recorded function.
    #[must_use]
    #[inline]
    pub fn identity(&self) -> FunctionIdentity {
        self.identity
    }

    /// Declared first line of the function.
    #[must_use]
    #[inline]
    pub fn first_line(&self) -> u32 {
        self.first_line
    }

    /// Raw slots, indexed by offset from [`first_line`](Self::first_line).
    #[must_use]
    #[inline]
    pub fn line_durations(&self) -> &[Duration] {
        &self.line_durations
    }

    /// Iterates every slot with its absolute line number.
    ///
    /// Zero slots are reported with `duration: None`.
    pub fn lines(&self) -> Lines<'_> {
        Lines {
            first_line: self.first_line,
            slots: self.line_durations.iter().enumerate(),
        }
    }

    /// Sum of all slots.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.line_durations.iter().sum()
    }

    /// Adds `delta` to the slot at `index`, growing the slot vector with zeros as needed.
    #[inline]
    pub(crate) fn accumulate(&mut self, index: usize, delta: Duration) {
        if index >= self.line_durations.len() {
            self.line_durations.resize(index + 1, Duration::ZERO);
        }
        self.line_durations[index] += delta;
    }
}

/// Iterator over the lines of a [`FunctionRecord`].
#[derive(Clone, Debug)]
pub struct Lines<'a> {
    first_line: u32,
    slots: Enumerate<slice::Iter<'a, Duration>>,
}

impl Iterator for Lines<'_> {
    type Item = LineTiming;

    fn next(&mut self) -> Option<LineTiming> {
        let (offset, duration) = self.slots.next()?;
        let offset = u32::try_from(offset).unwrap_or(u32::MAX);
        Some(LineTiming {
            line: self.first_line.saturating_add(offset),
            duration: (!duration.is_zero()).then_some(*duration),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl ExactSizeIterator for Lines<'_> {}

/// Functions observed executing in one source section.
#[derive(Clone, Debug)]
pub struct SectionRecord<F> {
    name: Box<str>,
    functions: Vec<FunctionRecord<F>>,
    by_identity: HashMap<FunctionIdentity, usize>,
}

impl<F> SectionRecord<F> {
    fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
            by_identity: HashMap::new(),
        }
    }

    /// Section name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function records in discovery order.
    #[must_use]
    #[inline]
    pub fn functions(&self) -> &[FunctionRecord<F>] {
        &self.functions
    }

    /// Looks up the record for `identity`.
    #[must_use]
    pub fn function(&self, identity: FunctionIdentity) -> Option<&FunctionRecord<F>> {
        let &index = self.by_identity.get(&identity)?;
        self.functions.get(index)
    }

    /// Number of recorded functions.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` if no function has been recorded.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Sum over all functions in the section.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.functions.iter().map(FunctionRecord::total).sum()
    }

    #[inline]
    pub(crate) fn function_index(&self, identity: FunctionIdentity) -> Option<usize> {
        self.by_identity.get(&identity).copied()
    }

    #[inline]
    pub(crate) fn function_at_mut(&mut self, index: usize) -> Option<&mut FunctionRecord<F>> {
        self.functions.get_mut(index)
    }
}

impl<F: FunctionHandle> SectionRecord<F> {
    pub(crate) fn insert_function(&mut self, function: F, first_line: u32) -> usize {
        let record = FunctionRecord::new(function, first_line);
        let index = self.functions.len();
        self.by_identity.insert(record.identity, index);
        self.functions.push(record);
        index
    }
}

/// All accumulated profiling data, keyed by section name.
#[derive(Clone, Debug)]
pub struct ProfileStore<F> {
    sections: Vec<SectionRecord<F>>,
    by_name: HashMap<Box<str>, usize>,
}

impl<F> Default for ProfileStore<F> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<F> ProfileStore<F> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Section records in discovery order.
    #[must_use]
    #[inline]
    pub fn sections(&self) -> &[SectionRecord<F>] {
        &self.sections
    }

    /// Looks up a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&SectionRecord<F>> {
        let &index = self.by_name.get(name)?;
        self.sections.get(index)
    }

    /// Number of sections.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of function records across all sections.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.sections.iter().map(SectionRecord::len).sum()
    }

    #[inline]
    pub(crate) fn section_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Returns the index of the section named `name`, creating it if needed.
    pub(crate) fn section_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(&index) = self.by_name.get(name) {
            return index;
        }
        let index = self.sections.len();
        self.sections.push(SectionRecord::new(name));
        self.by_name.insert(name.into(), index);
        tracing::debug!(section = name, "discovered source section");
        index
    }

    #[inline]
    pub(crate) fn section_at_mut(&mut self, index: usize) -> Option<&mut SectionRecord<F>> {
        self.sections.get_mut(index)
    }

    #[inline]
    pub(crate) fn section_at(&self, index: usize) -> Option<&SectionRecord<F>> {
        self.sections.get(index)
    }

    /// Drops every record, releasing the retained function handles.
    ///
    /// Returns the number of function records that were dropped.
    pub(crate) fn clear(&mut self) -> usize {
        let released = self.function_count();
        self.sections.clear();
        self.by_name.clear();
        released
    }
}

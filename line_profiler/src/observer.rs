// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::host::FunctionIdentity;

/// Receives every line boundary the profiler accepts.
///
/// Observers run on the hot path, after the store has been updated. The default
/// [`NoopObserver`] compiles away entirely.
pub trait LineObserver {
    /// Called once a boundary has been attributed to `line` of `function` in `section`.
    fn line_entered(&mut self, section: &str, function: FunctionIdentity, line: u32);

    /// Called when the profiler is cleared.
    fn cleared(&mut self) {}
}

/// Observer that ignores everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopObserver;

impl LineObserver for NoopObserver {
    #[inline(always)]
    fn line_entered(&mut self, _section: &str, _function: FunctionIdentity, _line: u32) {}
}

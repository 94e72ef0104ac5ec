// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::string::String;

use crate::host::FunctionIdentity;
use crate::observer::LineObserver;

type BackendGuard = tracy_client::Span;

struct ActiveZone {
    // Keep the label alive for backends that may borrow it.
    label: String,
    guard: BackendGuard,
}

/// A [`LineObserver`] that mirrors entered lines as Tracy zones via `tracy-client`.
///
/// Each accepted boundary closes the previous zone and opens one named after the entered line,
/// with the section as source file. Nothing is emitted while no Tracy client is running.
#[derive(Default)]
pub struct TracyLineMirror {
    active: Option<ActiveZone>,
}

impl TracyLineMirror {
    /// Creates a mirror with no open zone.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a zone is open.
    #[must_use]
    pub fn has_open_zone(&self) -> bool {
        self.active.is_some()
    }

    fn start_zone(label: &str, section: &str, line: u32) -> Option<BackendGuard> {
        let client = tracy_client::Client::running()?;
        Some(client.span_alloc(Some(label), "script.line", section, line, 0))
    }

    fn close_zone(&mut self) {
        if let Some(zone) = self.active.take() {
            let ActiveZone {
                label: _label,
                guard: _guard,
            } = zone;
            let _ = (_label, _guard);
        }
    }
}

impl LineObserver for TracyLineMirror {
    fn line_entered(&mut self, section: &str, function: FunctionIdentity, line: u32) {
        // The previous zone must close before the next one opens so zones never nest.
        self.close_zone();
        if tracy_client::Client::running().is_none() {
            return;
        }
        let label = format!("{section}:{line} func:{function}");
        if let Some(guard) = Self::start_zone(&label, section, line) {
            self.active = Some(ActiveZone { label, guard });
        }
    }

    fn cleared(&mut self) {
        self.close_zone();
    }
}

impl core::fmt::Debug for TracyLineMirror {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TracyLineMirror")
            .field("open_zone", &self.active.as_ref().map(|z| z.label.as_str()))
            .finish()
    }
}

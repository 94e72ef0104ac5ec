// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract between the profiler and the scripting engine that drives it.
//!
//! The engine calls [`LineProfiler::on_line_boundary`](crate::LineProfiler::on_line_boundary)
//! with something implementing [`ExecutionContext`]. Function objects are exposed through
//! [`FunctionHandle`]: cloning a handle acquires a strong reference, dropping it releases one.
//! The profiler keeps one clone per recorded function until it is cleared, so handles stay valid
//! even if the owning module is torn down first.

use core::fmt;
use std::rc::Rc;
use std::string::String;
use std::sync::Arc;

/// Stable identity of a function object.
///
/// Two handles to the same function compare equal; identity is never derived from the
/// function's name, since overloads legitimately share names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionIdentity(pub u64);

impl FunctionIdentity {
    /// Identity of the allocation behind `rc`.
    #[must_use]
    #[inline]
    pub fn of_rc<T: ?Sized>(rc: &Rc<T>) -> Self {
        Self(Rc::as_ptr(rc).cast::<()>() as usize as u64)
    }

    /// Identity of the allocation behind `arc`.
    #[must_use]
    #[inline]
    pub fn of_arc<T: ?Sized>(arc: &Arc<T>) -> Self {
        Self(Arc::as_ptr(arc).cast::<()>() as usize as u64)
    }
}

impl fmt::Display for FunctionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Errors reported by the host while answering a profiler query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostError {
    /// The function has no declared source location.
    NoDeclaration,
    /// The function belongs to a module that has already been discarded.
    Discarded,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDeclaration => write!(f, "function has no declared source location"),
            Self::Discarded => write!(f, "function belongs to a discarded module"),
        }
    }
}

impl core::error::Error for HostError {}

/// A reference-counted handle to an engine function.
pub trait FunctionHandle: Clone {
    /// Identity used to key profiling records.
    fn identity(&self) -> FunctionIdentity;

    /// The source line the function's definition starts at.
    fn declared_line(&self) -> Result<u32, HostError>;

    /// Human-readable declaration, for display only.
    fn declaration(&self) -> Option<String> {
        None
    }
}

/// Engine function object that can be shared through [`Rc`] or [`Arc`].
///
/// Implementing this gives `Rc<T>` and `Arc<T>` a [`FunctionHandle`] impl keyed by allocation
/// address.
pub trait ScriptFunction {
    /// See [`FunctionHandle::declared_line`].
    fn declared_line(&self) -> Result<u32, HostError>;

    /// See [`FunctionHandle::declaration`].
    fn declaration(&self) -> Option<String> {
        None
    }
}

impl<T: ScriptFunction + ?Sized> FunctionHandle for Rc<T> {
    #[inline]
    fn identity(&self) -> FunctionIdentity {
        FunctionIdentity::of_rc(self)
    }

    fn declared_line(&self) -> Result<u32, HostError> {
        (**self).declared_line()
    }

    fn declaration(&self) -> Option<String> {
        (**self).declaration()
    }
}

impl<T: ScriptFunction + ?Sized> FunctionHandle for Arc<T> {
    #[inline]
    fn identity(&self) -> FunctionIdentity {
        FunctionIdentity::of_arc(self)
    }

    fn declared_line(&self) -> Result<u32, HostError> {
        (**self).declared_line()
    }

    fn declaration(&self) -> Option<String> {
        (**self).declaration()
    }
}

/// Raw position reported by the VM at a line boundary.
///
/// Nothing here is validated: `line` may be zero or negative for synthesized code and `section`
/// may be missing. The profiler ignores such positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinePosition<'a> {
    /// Current line number.
    pub line: i32,
    /// Name of the source section the line belongs to.
    pub section: Option<&'a str>,
}

impl<'a> LinePosition<'a> {
    /// Position in `section` at `line`.
    #[must_use]
    #[inline]
    pub const fn new(section: &'a str, line: i32) -> Self {
        Self {
            line,
            section: Some(section),
        }
    }

    /// Position with no mapped source line.
    pub const UNMAPPED: Self = Self {
        line: 0,
        section: None,
    };
}

/// Execution state visible to the profiler at a line boundary.
pub trait ExecutionContext {
    /// Engine function handle type.
    type Function: FunctionHandle;

    /// The function currently executing, or `None` outside user functions (e.g. cleanup code).
    fn current_function(&self) -> Option<&Self::Function>;

    /// The current source position.
    fn position(&self) -> LinePosition<'_>;
}

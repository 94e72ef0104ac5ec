// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use hashbrown::HashMap;
use std::string::String;

use crate::host::{FunctionHandle, FunctionIdentity};

/// Optional label resolver for report rows.
///
/// Return `None` to fall back to the default identity-based label.
pub trait LabelResolver<F> {
    /// Resolve a label for a recorded function.
    fn function_label(&mut self, _function: &F) -> Option<String> {
        None
    }
}

/// Default resolver that keeps stable identity-based labels.
#[derive(Default, Debug)]
pub struct DefaultLabelResolver;

impl<F> LabelResolver<F> for DefaultLabelResolver {}

/// Resolver that uses engine-provided declarations when available.
///
/// Labels are cached per function. Each cache entry retains a clone of the function handle, so
/// an identity in the cache cannot be reused by another function while the entry lives. Call
/// [`clear`](Self::clear) when the profiler is cleared to release those handles.
pub struct DeclarationResolver<F> {
    cache: HashMap<FunctionIdentity, (F, String)>,
}

impl<F> DeclarationResolver<F> {
    /// Creates a resolver with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Number of cached labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` if no label is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drops every cached label and the function handles retained with them.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl<F> Default for DeclarationResolver<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> core::fmt::Debug for DeclarationResolver<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeclarationResolver")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl<F: FunctionHandle> LabelResolver<F> for DeclarationResolver<F> {
    fn function_label(&mut self, function: &F) -> Option<String> {
        let identity = function.identity();
        if let Some((_, label)) = self.cache.get(&identity) {
            return Some(label.clone());
        }
        let label = function.declaration()?;
        self.cache.insert(identity, (function.clone(), label.clone()));
        Some(label)
    }
}

pub(crate) fn default_function_label(identity: FunctionIdentity) -> String {
    format!("func:{identity}")
}

#[cfg(test)]
mod tests {
    use super::{DeclarationResolver, DefaultLabelResolver, LabelResolver, default_function_label};
    use crate::host::{FunctionHandle, HostError, ScriptFunction};
    use core::cell::Cell;
    use std::rc::Rc;

    struct Named {
        declaration: Option<&'static str>,
        lookups: Cell<u32>,
    }

    impl ScriptFunction for Named {
        fn declared_line(&self) -> Result<u32, HostError> {
            Ok(1)
        }

        fn declaration(&self) -> Option<String> {
            self.lookups.set(self.lookups.get() + 1);
            self.declaration.map(String::from)
        }
    }

    #[test]
    fn declaration_resolver_caches_by_identity() {
        let f = Rc::new(Named {
            declaration: Some("void Test()"),
            lookups: Cell::new(0),
        });
        let mut resolver = DeclarationResolver::<Rc<Named>>::default();
        assert_eq!(resolver.function_label(&f).as_deref(), Some("void Test()"));
        assert_eq!(resolver.function_label(&f).as_deref(), Some("void Test()"));
        assert_eq!(f.lookups.get(), 1);
    }

    #[test]
    fn cached_labels_retain_handles_until_cleared() {
        let f = Rc::new(Named {
            declaration: Some("void Test()"),
            lookups: Cell::new(0),
        });
        let mut resolver = DeclarationResolver::<Rc<Named>>::new();
        assert!(resolver.function_label(&f).is_some());
        assert_eq!(Rc::strong_count(&f), 2);
        assert_eq!(resolver.len(), 1);

        resolver.clear();
        assert!(resolver.is_empty());
        assert_eq!(Rc::strong_count(&f), 1);
    }

    #[test]
    fn missing_declaration_falls_back() {
        let f = Rc::new(Named {
            declaration: None,
            lookups: Cell::new(0),
        });
        assert_eq!(
            DeclarationResolver::<Rc<Named>>::new().function_label(&f),
            None
        );
        assert_eq!(DefaultLabelResolver.function_label(&f), None);
        assert!(default_function_label(f.identity()).starts_with("func:0x"));
    }
}

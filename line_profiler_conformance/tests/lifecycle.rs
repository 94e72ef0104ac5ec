// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-run accumulation and clear-before-recompile behavior.

use std::rc::Rc;

use line_profiler::{DeclarationResolver, ProfileReport};
use line_profiler_conformance::{FakeContext, FakeFunction, FakeVm, ns};

#[test]
fn restarting_keeps_accumulated_data() {
    let f = FakeFunction::new("F", 1);
    let mut vm = FakeVm::new();

    vm.begin_run();
    vm.step(ns(2), &FakeContext::at(&f, "main", 1));
    vm.step(ns(3), &FakeContext::at(&f, "main", 2));

    // Time between runs is not attributed to anything.
    vm.clock.advance(ns(1_000));
    vm.begin_run();
    vm.step(ns(4), &FakeContext::at(&f, "main", 1));
    vm.step(ns(1), &FakeContext::at(&f, "main", 2));

    assert_eq!(vm.slots("main", &f), Some(vec![ns(6), ns(4)]));
    assert_eq!(vm.profiler.profile_data().function_count(), 1);
}

#[test]
fn clear_empties_the_store_and_releases_handles() {
    let f = FakeFunction::new("F", 1);
    let mut vm = FakeVm::new();
    vm.begin_run();
    vm.step(ns(2), &FakeContext::at(&f, "main", 1));
    assert_eq!(Rc::strong_count(&f), 2);

    vm.profiler.clear();
    assert!(vm.profiler.profile_data().is_empty());
    assert_eq!(Rc::strong_count(&f), 1);

    vm.begin_run();
    vm.step(ns(7), &FakeContext::at(&f, "main", 3));
    assert_eq!(vm.slots("main", &f), Some(vec![ns(0), ns(0), ns(7)]));
}

#[test]
fn recorded_handles_outlive_the_module() {
    let mut vm = FakeVm::new();
    let weak = {
        let module = vec![FakeFunction::new("Test", 1)];
        vm.begin_run();
        vm.step(ns(1), &FakeContext::at(&module[0], "Script", 1));
        Rc::downgrade(&module[0])
    };

    // The module is gone but the profiler still holds the function.
    assert!(weak.upgrade().is_some());
    let report = ProfileReport::from_store(
        vm.profiler.profile_data(),
        &mut DeclarationResolver::default(),
    );
    assert_eq!(report.sections[0].functions[0].label, "void Test()");

    vm.profiler.clear();
    assert!(weak.upgrade().is_none());
}

#[test]
fn recompiled_module_starts_fresh() {
    let mut vm = FakeVm::new();
    let old = FakeFunction::new("Test", 1);
    vm.begin_run();
    vm.step(ns(9), &FakeContext::at(&old, "Script", 2));

    // Host protocol: clear, then discard the old module, then build the new one.
    vm.profiler.clear();
    old.discard();
    drop(old);
    let new = FakeFunction::new("Test", 1);

    vm.begin_run();
    vm.step(ns(1), &FakeContext::at(&new, "Script", 1));
    assert_eq!(vm.slots("Script", &new), Some(vec![ns(1)]));
    assert_eq!(vm.profiler.profile_data().function_count(), 1);
}

#[test]
fn discarded_function_is_not_recorded() {
    let f = FakeFunction::new("F", 1);
    f.discard();
    let mut vm = FakeVm::new();
    vm.begin_run();
    vm.step(ns(1), &FakeContext::at(&f, "main", 1));
    assert!(vm.profiler.profile_data().is_empty());
}

#[test]
fn clear_is_safe_in_any_state() {
    let mut vm = FakeVm::new();
    vm.profiler.clear();
    vm.profiler.clear();
    vm.begin_run();
    vm.profiler.clear();
    assert!(vm.profiler.profile_data().is_empty());
}

#[test]
fn labels_follow_functions_across_a_recompile() {
    let mut vm = FakeVm::new();
    let mut resolver = DeclarationResolver::default();

    let old = FakeFunction::new("Old", 1);
    vm.begin_run();
    vm.step(ns(1), &FakeContext::at(&old, "Script", 1));
    let report = ProfileReport::from_store(vm.profiler.profile_data(), &mut resolver);
    assert_eq!(report.sections[0].functions[0].label, "void Old()");

    vm.profiler.clear();
    let weak = Rc::downgrade(&old);
    drop(old);
    let new = FakeFunction::new("New", 1);

    vm.begin_run();
    vm.step(ns(1), &FakeContext::at(&new, "Script", 1));
    let report = ProfileReport::from_store(vm.profiler.profile_data(), &mut resolver);
    assert_eq!(report.sections[0].functions[0].label, "void New()");

    resolver.clear();
    assert!(weak.upgrade().is_none());
}

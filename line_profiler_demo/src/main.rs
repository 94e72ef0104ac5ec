// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runs a small script module under the line profiler and prints where the time went.
//!
//! The module is executed several times so timings accumulate, then "recompiled" with a heavier
//! helper to show that the profile restarts from scratch when the module is replaced.

mod script;
mod system;

use std::process::ExitCode;

use clap::Parser;
use line_profiler::{DeclarationResolver, LineObserver, ProfileReport, TracyLineMirror};
use tracing_subscriber::EnvFilter;

use crate::script::sample_module;
use crate::system::{DemoError, ScriptingSystem};

#[derive(Parser, Debug)]
#[command(name = "line_profiler_demo")]
#[command(about = "Profile a sample script module line by line", long_about = None)]
struct Args {
    /// Number of runs per module
    #[arg(short, long, default_value_t = 3)]
    runs: u32,

    /// Number of hottest lines to list
    #[arg(short, long, default_value_t = 5)]
    top: usize,

    /// Work multiplier applied to every statement
    #[arg(short, long, default_value_t = 1_000)]
    scale: u64,

    /// Entry point to execute
    #[arg(short, long, default_value = "Test")]
    entry: String,

    /// Mirror entered lines as Tracy zones (the Tracy client itself may already be running)
    #[arg(long)]
    tracy: bool,
}

fn install_tracing() {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Ok(directive) = "line_profiler_demo=info".parse() {
        filter = filter.add_directive(directive);
    }
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn print_report<O: LineObserver>(system: &ScriptingSystem<O>, top: usize) {
    let report =
        ProfileReport::from_store(system.profile_data(), &mut DeclarationResolver::default());
    print!("{report}");
    println!("hottest lines (total {} ns):", report.total().as_nanos());
    for hot in report.hottest_lines(top) {
        println!(
            "  {}:{} in {}: {} ns",
            hot.section,
            hot.line,
            hot.function,
            hot.duration.as_nanos()
        );
    }
}

fn profile<O: LineObserver>(
    mut system: ScriptingSystem<O>,
    args: &Args,
) -> Result<(), DemoError> {
    for (label, helper_weight) in [("original", 1), ("recompiled", 4)] {
        system.set_module(sample_module(args.scale, helper_weight));
        for _ in 0..args.runs {
            system.execute(&args.entry)?;
        }
        println!("== {label} module, {} run(s) ==", args.runs);
        print_report(&system, args.top);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    install_tracing();

    let result = if args.tracy {
        let _client = tracy_client::Client::start();
        profile(ScriptingSystem::with_observer(TracyLineMirror::new()), &args)
    } else {
        profile(ScriptingSystem::new(), &args)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "script execution failed");
            eprintln!("line_profiler_demo: {error}");
            ExitCode::FAILURE
        }
    }
}

//! jdt-java-builder CLI
//!
//! `--persistent_worker` selects worker mode; any other argument vector is
//! treated as a single one-shot build request.

use clap::Parser;
use std::process;

use jdt_java_builder::{ArchiveCache, BuildCycle, EcjCompiler, WorkerLoop};

#[derive(Parser)]
#[command(name = "jdt-java-builder")]
#[command(about = "Bazel persistent-worker adapter for the JDT batch Java compiler", version)]
struct Cli {
    /// Service length-framed build requests over stdio until end-of-stream
    #[arg(long = "persistent_worker")]
    persistent_worker: bool,

    /// Build flags for a single one-shot request
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    flags: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    let compiler = EcjCompiler::default();

    if cli.persistent_worker {
        let mut worker = WorkerLoop::new(compiler);
        if let Err(e) = worker.run() {
            // Framing on the request stream is lost; nothing to do but die
            // loudly and let the orchestrator restart us.
            eprintln!("worker protocol failure: {e}");
            process::exit(1);
        }
        return;
    }

    let mut archives = ArchiveCache::new();
    let result = BuildCycle::new(&compiler, &mut archives).run(&cli.flags);
    eprint!("{}", result.output);
    process::exit(if result.ok { 0 } else { 1 });
}

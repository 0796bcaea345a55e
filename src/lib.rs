//! jdt-java-builder - Bazel adapter for the JDT batch Java compiler
//!
//! This crate implements a build-tool adapter that satisfies Java compile
//! requests from a build orchestrator, either one-shot or as a long-lived
//! persistent worker speaking a length-framed binary protocol on stdio.

pub mod builder;
pub mod command;
pub mod compiler;
pub mod extract;
pub mod jar;
pub mod options;
pub mod staging;
pub mod trim;
pub mod worker;

pub use builder::{BuildCycle, BuildError, BuildResult};
pub use compiler::{EcjCompiler, JavaCompiler};
pub use extract::ArchiveCache;
pub use options::ParsedOptions;
pub use staging::StagingLayout;
pub use worker::WorkerLoop;

//! Per-request build orchestration.
//!
//! One [`BuildCycle`] run stages directories, resolves sources, drives the
//! compiler, packages the deliverable jars and sidecar files, and bounds
//! the captured output. Everything a cycle holds is released when `run`
//! returns; only the archive cache outlives the request.

use std::fs;
use std::io;

use serde_json::json;

use crate::command;
use crate::compiler::JavaCompiler;
use crate::extract::{self, ArchiveCache, ExtractError};
use crate::jar::{self, JarError};
use crate::options::{OptionsError, ParsedOptions};
use crate::staging::{ConfigError, StagingLayout};
use crate::trim::{trim_to_byte_budget, DEFAULT_MAX_OUTPUT_BYTES};

/// Printed ahead of the diagnostics when `--jdt_debug` is set, so build
/// logs show which builder produced them.
const DEBUG_BANNER: &str = "><>< :: Using jdt-java-builder :: ><><\n\n";

/// Byte cap for the command line echoed into the debug header.
const MAX_COMMAND_LINE_DEBUG: usize = 1_000;

/// What one request cycle hands back to the caller.
///
/// In one-shot mode this becomes the process exit code plus stderr text;
/// in worker mode it is framed into a response message.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// True if the compile (or trivially empty request) succeeded.
    pub ok: bool,
    /// Bounded diagnostic text.
    pub output: String,
}

/// Request-fatal failures of the orchestration itself.
///
/// Compiler diagnostics are not errors; they travel inside a successful
/// [`BuildResult`] with `ok == false`.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Jar(#[from] JarError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One request's orchestration, borrowing the process-lifetime pieces.
pub struct BuildCycle<'a> {
    compiler: &'a dyn JavaCompiler,
    archives: &'a mut ArchiveCache,
}

impl<'a> BuildCycle<'a> {
    pub fn new(compiler: &'a dyn JavaCompiler, archives: &'a mut ArchiveCache) -> Self {
        Self { compiler, archives }
    }

    /// Run one request to completion.
    ///
    /// Never panics and never escalates: configuration and I/O failures
    /// come back as a failed result carrying the error message, so a
    /// persistent worker survives any single bad request.
    pub fn run(&mut self, args: &[String]) -> BuildResult {
        match self.try_run(args) {
            Ok(result) => result,
            Err(e) => BuildResult {
                ok: false,
                output: e.to_string(),
            },
        }
    }

    fn try_run(&mut self, args: &[String]) -> Result<BuildResult, BuildError> {
        let options = ParsedOptions::parse(args)?;

        // Config checks happen before any directory is touched: a request
        // missing its label must not leave a staging tree behind.
        let staging = StagingLayout::derive(&options)?;
        staging.initialize(options.native_header_output.is_some())?;

        let mut sources = options.source_files.clone();
        extract::extract_source_jars(
            self.archives,
            &options.source_jars,
            staging.source_jar_dir(),
            &mut sources,
        )?;

        let mut header = String::new();
        if options.jdt_debug {
            header.push_str(DEBUG_BANNER);
        }

        let mut captured_stdout = String::new();
        let mut captured_stderr = String::new();

        // Empty compilation units are a valid request shape (resource-only
        // targets): trivially successful, no compiler invocation.
        let ok = if sources.is_empty() {
            true
        } else {
            let command_line = command::assemble(&options, &sources, &staging);
            command::record(&staging, &command_line)?;

            let ok = self.compiler.compile(
                &command_line,
                &mut captured_stdout,
                &mut captured_stderr,
            );
            if !captured_stdout.is_empty() {
                captured_stdout.push('\n');
            }
            if !captured_stderr.is_empty() {
                captured_stderr.push('\n');
            }

            if options.jdt_debug {
                header.push_str("JDT command-line options: ");
                header.push_str(truncate_at_char_boundary(
                    &command_line,
                    MAX_COMMAND_LINE_DEBUG,
                ));
                if command_line.len() > MAX_COMMAND_LINE_DEBUG {
                    header.push_str(" ...");
                }
            }
            ok
        };

        if ok {
            self.package_outputs(&options, &staging)?;
        }
        // Annotation processors may have produced sources even when the
        // compile failed; preserve them either way.
        if let Some(gensrc_jar) = &options.generated_sources_output {
            jar::package_directory(
                staging.source_gen_dir(),
                gensrc_jar.as_ref(),
                options.compress_jar,
            )?;
        }

        self.write_sidecars(&options, ok)?;

        let budget = options
            .max_std_out_err_bytes
            .unwrap_or(DEFAULT_MAX_OUTPUT_BYTES);
        Ok(BuildResult {
            ok,
            output: trim_to_byte_budget(budget, &header, &captured_stdout, &captured_stderr),
        })
    }

    fn package_outputs(
        &self,
        options: &ParsedOptions,
        staging: &StagingLayout,
    ) -> Result<(), BuildError> {
        // derive() already guaranteed the output jar is present.
        let output_jar = options
            .output_jar
            .as_deref()
            .ok_or(ConfigError::MissingOutputJar)?;
        jar::package_directory(staging.class_dir(), output_jar.as_ref(), options.compress_jar)?;

        if let Some(native_jar) = &options.native_header_output {
            jar::package_directory(
                staging.native_header_dir(),
                native_jar.as_ref(),
                options.compress_jar,
            )?;
        }
        Ok(())
    }

    /// Sidecar files the orchestrator expects to exist.
    ///
    /// The dependency record carries no per-class edges (the compiler does
    /// not expose them), only the label and the outcome; callers check the
    /// file's existence, not its contents.
    fn write_sidecars(&self, options: &ParsedOptions, ok: bool) -> Result<(), BuildError> {
        if let Some(deps_path) = &options.output_deps_proto {
            let label = options
                .target_label
                .as_deref()
                .ok_or(ConfigError::MissingTargetLabel)?;
            let record = json!({ "rule_label": label, "success": ok });
            fs::write(deps_path, record.to_string())?;
        }
        if let Some(manifest_path) = &options.output_manifest_proto {
            fs::write(manifest_path, b"{}")?;
        }
        Ok(())
    }
}

/// Longest prefix of `text` that is at most `max` bytes and ends on a
/// char boundary.
fn truncate_at_char_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_boundary_truncation_is_safe() {
        assert_eq!(truncate_at_char_boundary("abcdef", 4), "abcd");
        assert_eq!(truncate_at_char_boundary("ab", 4), "ab");
        // 'é' is two bytes; cutting at 3 must back off to the boundary.
        assert_eq!(truncate_at_char_boundary("aéé", 3), "aé");
    }
}

//! Compiler command assembly.
//!
//! Turns a [`ParsedOptions`] plus the resolved source list into the single
//! command string handed to the batch compiler, and records it in the
//! staging tree for post-hoc debugging.

use std::fs;
use std::io;
use std::path::Path;

use crate::options::ParsedOptions;
use crate::staging::StagingLayout;

/// Separator for classpath-style path lists.
const PATH_LIST_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// File name of the command-line dump inside the staging root.
pub const COMMAND_DUMP_FILE: &str = "jdt.commandline";

/// Drop orchestrator-specific flags and apply language-level defaults.
///
/// Flags prefixed with `-Werror:` (per-check warning promotion) or `-Xep`
/// (lint configuration) are meaningful to the build system but not to the
/// compiler. If the remaining flags pin no language level, `-target 11`
/// (and `-source 11` when no source version is pinned either) is appended:
/// the compiler's own default is 1.5 and must never be silently inherited.
///
/// Idempotent: re-filtering the returned list appends no further defaults.
pub fn filter_build_tool_flags(javacopts: &[String]) -> Vec<String> {
    let mut filtered = Vec::with_capacity(javacopts.len() + 4);
    let mut has_source = false;
    let mut has_target = false;
    let mut has_release = false;

    for opt in javacopts {
        if is_build_tool_flag(opt) {
            continue;
        }
        if opt.eq_ignore_ascii_case("-source") {
            has_source = true;
        } else if opt.eq_ignore_ascii_case("-target") {
            has_target = true;
        } else if opt.eq_ignore_ascii_case("--release") {
            has_release = true;
        }
        filtered.push(opt.clone());
    }

    if !has_release && !has_target {
        filtered.push("-target".to_string());
        filtered.push("11".to_string());
        if !has_source {
            filtered.push("-source".to_string());
            filtered.push("11".to_string());
        }
    }
    filtered
}

fn is_build_tool_flag(opt: &str) -> bool {
    opt.starts_with("-Werror:") || opt.starts_with("-Xep")
}

/// Assemble the full compiler command for one request.
///
/// `sources` is the resolved list (explicit files plus extracted source-jar
/// entries) and must be non-empty; empty compilations never reach command
/// assembly.
pub fn assemble(
    options: &ParsedOptions,
    sources: &[String],
    staging: &StagingLayout,
) -> String {
    let mut parts: Vec<String> = filter_build_tool_flags(&options.javacopts);

    // Warnings are suppressed wholesale; diagnostics of interest surface
    // as errors.
    parts.push("-warn:none".to_string());

    parts.extend(sources.iter().cloned());
    parts.push("-d".to_string());
    parts.push(staging.class_dir().to_string_lossy().into_owned());
    parts.push("-s".to_string());
    parts.push(staging.source_gen_dir().to_string_lossy().into_owned());

    if !options.processor_names.is_empty() {
        if options.jdt_debug {
            parts.push("-XprintProcessorInfo".to_string());
            parts.push("-XprintRounds".to_string());
        }
        parts.push("-processor".to_string());
        parts.push(options.processor_names.join(","));
    }
    if !options.processor_path.is_empty() {
        let joined = options.processor_path.join(PATH_LIST_SEPARATOR);
        // -processorpath is ignored at language level 9+, where the module
        // spelling is expected instead; set both and let the compiler pick.
        parts.push("-processorpath".to_string());
        parts.push(joined.clone());
        parts.push("--processor-module-path".to_string());
        parts.push(joined);
    }

    if let Some(prefs) = &options.eclipse_preferences_file {
        if Path::new(prefs).exists() {
            parts.push("-properties".to_string());
            parts.push(prefs.clone());
        }
    }

    // Machine-parseable one-line diagnostics.
    parts.push("-Xemacs".to_string());

    if options.use_direct_deps_only && !options.direct_dependencies.is_empty() {
        parts.push("-classpath".to_string());
        parts.push(options.direct_dependencies.join(PATH_LIST_SEPARATOR));
    } else if !options.classpath.is_empty() {
        parts.push("-classpath".to_string());
        parts.push(options.classpath.join(PATH_LIST_SEPARATOR));
    }

    parts.join(" ")
}

/// Overwrite the staging tree's command dump, one argument per line.
pub fn record(staging: &StagingLayout, command: &str) -> io::Result<()> {
    fs::write(
        staging.root().join(COMMAND_DUMP_FILE),
        command.replace(' ', "\n"),
    )
}

//! Build request options.
//!
//! Parses the orchestrator's flag list into a [`ParsedOptions`] value. The
//! flag dialect is fixed by the calling build system: every setting is a
//! `--flag` token followed by zero or more values, where a multi-value flag
//! consumes tokens until the next recognized flag. Compiler flags passed
//! through `--javacopts` may therefore begin with `-` or `--` without being
//! mistaken for builder settings.

use std::collections::VecDeque;

/// Configuration derived from one build request's argument list.
///
/// Owned by exactly one in-flight build cycle.
#[derive(Debug, Clone, Default)]
pub struct ParsedOptions {
    /// Canonical target label, `//package:name`.
    pub target_label: Option<String>,
    /// Path of the class output jar.
    pub output_jar: Option<String>,
    /// Explicitly listed source files.
    pub source_files: Vec<String>,
    /// Archives whose `.java` entries are compiled alongside the sources.
    pub source_jars: Vec<String>,
    /// Full transitive compile classpath.
    pub classpath: Vec<String>,
    /// Direct-dependency subset of the classpath.
    pub direct_dependencies: Vec<String>,
    /// Compile against direct dependencies only.
    pub use_direct_deps_only: bool,
    /// Annotation processor class names.
    pub processor_names: Vec<String>,
    /// Classpath for annotation processors.
    pub processor_path: Vec<String>,
    /// Raw compiler flags, still carrying orchestrator-specific entries.
    pub javacopts: Vec<String>,
    /// Deflate jar entries instead of storing them.
    pub compress_jar: bool,
    /// Jar to receive generated JNI headers, if requested.
    pub native_header_output: Option<String>,
    /// Jar to receive annotation-processor generated sources, if requested.
    pub generated_sources_output: Option<String>,
    /// Dependency-manifest sidecar path, if requested.
    pub output_deps_proto: Option<String>,
    /// Compilation-manifest sidecar path, if requested.
    pub output_manifest_proto: Option<String>,
    /// Emit the debug banner and the assembled command line.
    pub jdt_debug: bool,
    /// Eclipse compiler preferences file, applied only if it exists.
    pub eclipse_preferences_file: Option<String>,
    /// Byte cap for the captured compiler output.
    pub max_std_out_err_bytes: Option<usize>,
}

/// Invalid command line reported back to the orchestrator.
///
/// These fail the offending request only; a persistent worker keeps
/// serving subsequent requests.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("{flag} requires a value")]
    MissingValue { flag: &'static str },

    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },
}

/// All flags the builder recognizes; anything else in flag position is an
/// error rather than silently dropped.
const KNOWN_FLAGS: &[&str] = &[
    "--target_label",
    "--output",
    "--sources",
    "--source_jars",
    "--classpath",
    "--direct_dependencies",
    "--use_direct_deps_only",
    "--processors",
    "--processorpath",
    "--javacopts",
    "--compress_jar",
    "--native_header_output",
    "--generated_sources_output",
    "--output_deps_proto",
    "--output_manifest_proto",
    "--jdt_debug",
    "--eclipse_preferences_file",
    "--max_std_out_err_bytes",
];

fn is_known_flag(token: &str) -> bool {
    KNOWN_FLAGS.contains(&token)
}

impl ParsedOptions {
    /// Parse one request's argument list.
    pub fn parse(args: &[String]) -> Result<Self, OptionsError> {
        let mut options = ParsedOptions::default();
        let mut tokens: VecDeque<&str> = args.iter().map(String::as_str).collect();

        while let Some(token) = tokens.pop_front() {
            match token {
                "--target_label" => {
                    options.target_label = Some(take_value(&mut tokens, "--target_label")?);
                }
                "--output" => {
                    options.output_jar = Some(take_value(&mut tokens, "--output")?);
                }
                "--sources" => take_values(&mut tokens, &mut options.source_files),
                "--source_jars" => take_values(&mut tokens, &mut options.source_jars),
                "--classpath" => take_values(&mut tokens, &mut options.classpath),
                "--direct_dependencies" => {
                    take_values(&mut tokens, &mut options.direct_dependencies)
                }
                "--use_direct_deps_only" => options.use_direct_deps_only = true,
                "--processors" => take_values(&mut tokens, &mut options.processor_names),
                "--processorpath" => take_values(&mut tokens, &mut options.processor_path),
                "--javacopts" => take_values(&mut tokens, &mut options.javacopts),
                "--compress_jar" => options.compress_jar = true,
                "--native_header_output" => {
                    options.native_header_output =
                        Some(take_value(&mut tokens, "--native_header_output")?);
                }
                "--generated_sources_output" => {
                    options.generated_sources_output =
                        Some(take_value(&mut tokens, "--generated_sources_output")?);
                }
                "--output_deps_proto" => {
                    options.output_deps_proto =
                        Some(take_value(&mut tokens, "--output_deps_proto")?);
                }
                "--output_manifest_proto" => {
                    options.output_manifest_proto =
                        Some(take_value(&mut tokens, "--output_manifest_proto")?);
                }
                "--jdt_debug" => options.jdt_debug = true,
                "--eclipse_preferences_file" => {
                    options.eclipse_preferences_file =
                        Some(take_value(&mut tokens, "--eclipse_preferences_file")?);
                }
                "--max_std_out_err_bytes" => {
                    let value = take_value(&mut tokens, "--max_std_out_err_bytes")?;
                    let parsed =
                        value
                            .parse::<usize>()
                            .map_err(|_| OptionsError::InvalidValue {
                                flag: "--max_std_out_err_bytes",
                                value: value.clone(),
                            })?;
                    options.max_std_out_err_bytes = Some(parsed);
                }
                other if other.starts_with("--") => {
                    return Err(OptionsError::UnknownOption(other.to_string()));
                }
                other => return Err(OptionsError::UnexpectedArgument(other.to_string())),
            }
        }

        Ok(options)
    }
}

/// Take exactly one value for a single-valued flag.
fn take_value(
    tokens: &mut VecDeque<&str>,
    flag: &'static str,
) -> Result<String, OptionsError> {
    match tokens.front() {
        Some(&token) if !is_known_flag(token) => {
            tokens.pop_front();
            Ok(token.to_string())
        }
        _ => Err(OptionsError::MissingValue { flag }),
    }
}

/// Take every token up to the next recognized flag.
fn take_values(tokens: &mut VecDeque<&str>, into: &mut Vec<String>) {
    while let Some(&token) = tokens.front() {
        if is_known_flag(token) {
            break;
        }
        tokens.pop_front();
        into.push(token.to_string());
    }
}

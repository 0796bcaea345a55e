//! Per-request staging directories.
//!
//! Every build cycle gets a scratch tree derived from the output jar path
//! and the target name: `<output-jar-sibling>/_jdt/<name>/{classes,
//! native_headers, sources, source_jars}`. The tree is recreated at the
//! start of each request and deliberately left in place afterwards so
//! downstream tooling can inspect it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::options::ParsedOptions;

/// Missing or malformed required settings.
///
/// Detected before any directory is created, so a misconfigured request
/// leaves no staging tree behind.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("--target_label is required")]
    MissingTargetLabel,

    #[error("--output is required")]
    MissingOutputJar,

    #[error("--target_label must be a canonical label (containing a `:`): {0}")]
    MalformedTargetLabel(String),
}

/// Scratch directory layout for one build cycle.
#[derive(Debug, Clone)]
pub struct StagingLayout {
    root: PathBuf,
    class_dir: PathBuf,
    native_header_dir: PathBuf,
    source_gen_dir: PathBuf,
    source_jar_dir: PathBuf,
}

impl StagingLayout {
    /// Derive the layout from the target label and output jar path.
    pub fn derive(options: &ParsedOptions) -> Result<Self, ConfigError> {
        let label = options
            .target_label
            .as_deref()
            .ok_or(ConfigError::MissingTargetLabel)?;
        let output_jar = options
            .output_jar
            .as_deref()
            .ok_or(ConfigError::MissingOutputJar)?;
        let colon = label
            .rfind(':')
            .ok_or_else(|| ConfigError::MalformedTargetLabel(label.to_string()))?;
        let name = &label[colon + 1..];

        let root = Path::new(output_jar).with_file_name("_jdt").join(name);
        Ok(Self {
            class_dir: root.join("classes"),
            native_header_dir: root.join("native_headers"),
            source_gen_dir: root.join("sources"),
            source_jar_dir: root.join("source_jars"),
            root,
        })
    }

    /// Recreate the staging directories for a fresh request.
    ///
    /// The native-header directory is only staged when a native-header
    /// output was actually requested.
    pub fn initialize(&self, with_native_headers: bool) -> io::Result<()> {
        recreate(&self.source_gen_dir)?;
        if with_native_headers {
            recreate(&self.native_header_dir)?;
        }
        recreate(&self.class_dir)?;
        recreate(&self.source_jar_dir)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn class_dir(&self) -> &Path {
        &self.class_dir
    }

    pub fn native_header_dir(&self) -> &Path {
        &self.native_header_dir
    }

    pub fn source_gen_dir(&self) -> &Path {
        &self.source_gen_dir
    }

    pub fn source_jar_dir(&self) -> &Path {
        &self.source_jar_dir
    }
}

/// Delete-then-create reset. Non-atomic, which is fine under the one
/// request at a time processing model.
fn recreate(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

//! Source archive extraction.
//!
//! Source jars arrive alongside plain source files; their `.java` entries
//! are expanded into the staging tree and compiled as ordinary sources.
//! Opened archives are cached for the whole process lifetime: a long-lived
//! worker sees the same toolchain source jars on every request, and each
//! request extracts into a fresh destination, so a stale handle can never
//! corrupt later output.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

/// Failures expanding a source archive. Fatal to the whole request; there
/// is no partial extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to open source jar {path}: {source}")]
    Open {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("failed to read entry from {path}: {source}")]
    Entry {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("source jar {path} contains an unsafe entry name: {entry}")]
    UnsafeEntryName { path: PathBuf, entry: String },

    #[error("I/O error extracting sources: {0}")]
    Io(#[from] io::Error),
}

/// Cache of opened source-jar archives, keyed by archive path.
///
/// Owned by the worker loop and passed by reference into each build cycle.
/// Entries are never evicted during normal operation; workers are recycled
/// by the orchestrator before handle leakage matters.
#[derive(Default)]
pub struct ArchiveCache {
    open: HashMap<PathBuf, ZipArchive<File>>,
}

impl ArchiveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of archives currently mounted.
    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Release hook, invoked after each request cycle.
    ///
    /// Intentionally a no-op today; the seam exists so an eviction policy
    /// can be added without changing the build cycle's shape.
    pub fn release(&mut self) {}

    fn open_archive(&mut self, path: &Path) -> Result<&mut ZipArchive<File>, ExtractError> {
        match self.open.entry(path.to_path_buf()) {
            Entry::Occupied(mounted) => Ok(mounted.into_mut()),
            Entry::Vacant(slot) => {
                let file = File::open(path).map_err(ExtractError::Io)?;
                let archive = ZipArchive::new(file).map_err(|source| ExtractError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(slot.insert(archive))
            }
        }
    }
}

/// Expand every `.java` entry of `source_jars` under `dest` and append the
/// extracted paths to `sources`.
///
/// Each archive's entries land under `<dest>/<archive-stem>/`, preserving
/// the entry's relative directory structure.
pub fn extract_source_jars(
    cache: &mut ArchiveCache,
    source_jars: &[String],
    dest: &Path,
    sources: &mut Vec<String>,
) -> Result<(), ExtractError> {
    for jar in source_jars {
        let jar_path = Path::new(jar);
        let stem = jar_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source_jar".to_string());
        let jar_dest = dest.join(stem);

        let archive = cache.open_archive(jar_path)?;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|source| ExtractError::Entry {
                path: jar_path.to_path_buf(),
                source,
            })?;
            if entry.is_dir() || !entry.name().ends_with(".java") {
                continue;
            }

            let relative = entry
                .enclosed_name()
                .ok_or_else(|| ExtractError::UnsafeEntryName {
                    path: jar_path.to_path_buf(),
                    entry: entry.name().to_string(),
                })?;
            let out_path = jar_dest.join(relative);
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out_file = File::create(&out_path)?;
            io::copy(&mut entry, &mut out_file)?;

            sources.push(out_path.to_string_lossy().into_owned());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_source_jar(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_java_entries_preserving_structure() {
        let tmp = tempfile::tempdir().unwrap();
        let jar = tmp.path().join("archive1.srcjar");
        write_source_jar(
            &jar,
            &[
                ("a/b/C.java", "class C {}"),
                ("a/readme.txt", "not a source"),
            ],
        );

        let dest = tmp.path().join("source_jars");
        let mut cache = ArchiveCache::new();
        let mut sources = vec!["Explicit.java".to_string()];
        extract_source_jars(
            &mut cache,
            &[jar.to_string_lossy().into_owned()],
            &dest,
            &mut sources,
        )
        .unwrap();

        let expected = dest.join("archive1").join("a/b/C.java");
        assert!(expected.is_file());
        assert_eq!(fs::read_to_string(&expected).unwrap(), "class C {}");
        assert_eq!(
            sources,
            vec![
                "Explicit.java".to_string(),
                expected.to_string_lossy().into_owned()
            ]
        );
        assert!(!dest.join("archive1/a/readme.txt").exists());
    }

    #[test]
    fn archive_handle_is_reused_across_requests() {
        let tmp = tempfile::tempdir().unwrap();
        let jar = tmp.path().join("tool.srcjar");
        write_source_jar(&jar, &[("T.java", "class T {}")]);
        let jars = vec![jar.to_string_lossy().into_owned()];

        let mut cache = ArchiveCache::new();
        for request in 0..2 {
            let dest = tmp.path().join(format!("req{request}"));
            let mut sources = Vec::new();
            extract_source_jars(&mut cache, &jars, &dest, &mut sources).unwrap();
            assert_eq!(sources.len(), 1);
            cache.release();
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_archive_fails_the_request() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = ArchiveCache::new();
        let mut sources = Vec::new();
        let err = extract_source_jars(
            &mut cache,
            &["no-such.srcjar".to_string()],
            tmp.path(),
            &mut sources,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }
}

//! Deliverable jar packaging.
//!
//! Packages a staging directory into a jar with normalized entry metadata:
//! entries are added in sorted path order with epoch-normalized timestamps
//! so the same class files always produce byte-identical jars.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Failures packaging a staging directory into a jar.
#[derive(Debug, thiserror::Error)]
pub enum JarError {
    #[error("I/O error packaging {jar}: {source}")]
    Io {
        jar: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive error packaging {jar}: {source}")]
    Archive {
        jar: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("walk error under {dir}: {source}")]
    Walk {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Package the contents of `dir` into a jar at `jar_path`.
///
/// `compress` selects Deflate over Stored for file entries. An empty
/// directory yields a valid empty jar; the output file is truncated first,
/// never appended to.
pub fn package_directory(dir: &Path, jar_path: &Path, compress: bool) -> Result<(), JarError> {
    let io_err = |source| JarError::Io {
        jar: jar_path.to_path_buf(),
        source,
    };
    let zip_err = |source| JarError::Archive {
        jar: jar_path.to_path_buf(),
        source,
    };

    let file = File::create(jar_path).map_err(io_err)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(if compress {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        })
        .last_modified_time(zip::DateTime::default());

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = entry.map_err(|source| JarError::Walk {
            dir: dir.to_path_buf(),
            source,
        })?;
        let relative = match entry.path().strip_prefix(dir) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel,
            _ => continue,
        };
        let name = entry_name(relative);

        if entry.file_type().is_dir() {
            writer
                .add_directory(format!("{name}/"), options)
                .map_err(zip_err)?;
        } else {
            writer.start_file(name, options).map_err(zip_err)?;
            let mut source = File::open(entry.path()).map_err(io_err)?;
            io::copy(&mut source, &mut writer).map_err(io_err)?;
        }
    }

    writer.finish().map_err(zip_err)?;
    Ok(())
}

/// Archive entry name with `/` separators regardless of platform.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

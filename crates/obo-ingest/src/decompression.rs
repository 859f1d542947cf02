//! Reading compressed and archived source files
//!
//! # Supported Formats
//!
//! - **Gzip** (.gz): Using flate2
//! - **Tar.gz** (.tar.gz, .tgz): Combined gzip + tar
//! - **Zip** (.zip): Using zip crate
//!
//! Plain files are opened as-is, so extractors can call [`open_maybe_gzip`]
//! without caring whether the download was compressed.

use crate::error::{IngestError, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Open a file for buffered reading, decompressing it if the name ends in
/// `.gz`
pub fn open_maybe_gzip(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let is_gzip = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("gz"));
    debug!(path = %path.display(), gzip = is_gzip, "Opening source file");
    if is_gzip {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read one entry of a gzip-compressed tar archive
///
/// `entry` is matched against the full path inside the archive.
pub fn read_tar_gz_entry<R: Read>(reader: R, entry: &str) -> Result<Vec<u8>> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    for item in archive.entries()? {
        let mut item = item?;
        let path = item.path()?.to_string_lossy().into_owned();
        if path.trim_start_matches("./") == entry {
            let mut contents = Vec::new();
            item.read_to_end(&mut contents)?;
            debug!(entry, bytes = contents.len(), "Extracted tar entry");
            return Ok(contents);
        }
    }
    Err(IngestError::MissingArchiveEntry(entry.to_string()))
}

/// Read one entry of a zip archive, by full path or by file name
pub fn read_zip_entry<R: Read + std::io::Seek>(reader: R, entry: &str) -> Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let index = (0..archive.len()).find(|&i| {
        archive.name_for_index(i).is_some_and(|name| {
            name == entry || name.rsplit('/').next().is_some_and(|file| file == entry)
        })
    });
    let Some(index) = index else {
        return Err(IngestError::MissingArchiveEntry(entry.to_string()));
    };
    let mut file = archive.by_index(index)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    debug!(entry, bytes = contents.len(), "Extracted zip entry");
    Ok(contents)
}

/// Read the only file entry of a zip archive, or the first one if several
pub fn read_first_zip_entry<R: Read + std::io::Seek>(reader: R) -> Result<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(reader)?;
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        debug!(entry = %name, bytes = contents.len(), "Extracted zip entry");
        return Ok((name, contents));
    }
    Err(IngestError::MissingArchiveEntry("<any file>".to_string()))
}

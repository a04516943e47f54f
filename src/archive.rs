//! Archive access for EPUB containers.
//!
//! The pipeline only needs two things from an archive: its entry names and
//! the bytes of an entry. [`Archive`] captures that, with lookup helpers
//! that tolerate the path-prefix mismatches common in NCX references.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::model::{is_path_suffix, normalize_path};

/// A container of named entries (an EPUB is a ZIP archive).
pub trait Archive {
    /// Entry names in archive order.
    fn names(&self) -> &[String];

    /// Read an entry by its exact name.
    fn read(&mut self, name: &str) -> Result<Vec<u8>>;

    /// Find the entry a reference path points to.
    ///
    /// Exact match on the normalized path wins; otherwise the first entry
    /// whose name ends with the path on a `/` boundary, then the first entry
    /// ending with it at all.
    fn resolve(&self, path: &str) -> Option<&str> {
        let wanted = normalize_path(path);
        if wanted.is_empty() {
            return None;
        }
        let names = self.names();
        let dir_suffix = format!("/{wanted}");

        names
            .iter()
            .find(|name| normalize_path(name) == wanted)
            .or_else(|| names.iter().find(|name| name.ends_with(&dir_suffix)))
            .or_else(|| names.iter().find(|name| is_path_suffix(name, &wanted)))
            .map(String::as_str)
    }

    /// First entry whose name ends with `suffix` (ASCII case-insensitive).
    fn find_by_suffix(&self, suffix: &str) -> Option<&str> {
        let suffix = suffix.to_ascii_lowercase();
        self.names()
            .iter()
            .find(|name| name.to_ascii_lowercase().ends_with(&suffix))
            .map(String::as_str)
    }

    /// Resolve a reference path and read the entry.
    fn read_resolved(&mut self, path: &str) -> Result<(String, Vec<u8>)> {
        let name = self
            .resolve(path)
            .map(str::to_string)
            .ok_or_else(|| Error::NotFound(format!("content file {path}")))?;
        let data = self.read(&name)?;
        Ok((name, data))
    }
}

/// A ZIP archive over any seekable reader.
pub struct ZipArchiveSource<R> {
    archive: ZipArchive<R>,
    names: Vec<String>,
}

impl ZipArchiveSource<File> {
    /// Open a ZIP file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> ZipArchiveSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let names = archive.file_names().map(str::to_string).collect();
        Ok(Self { archive, names })
    }
}

impl<R: Read + Seek> Archive for ZipArchiveSource<R> {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn read(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(Error::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        // The declared size comes from the archive and is not trusted
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// An in-memory archive, mostly useful for tests and pre-extracted books.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    names: Vec<String>,
    data: Vec<Vec<u8>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        let name = name.into();
        let data = data.into();
        match self.names.iter().position(|n| *n == name) {
            Some(i) => self.data[i] = data,
            None => {
                self.names.push(name);
                self.data.push(data);
            }
        }
    }

    pub fn with_entry(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }
}

impl Archive for MemoryArchive {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn read(&mut self, name: &str) -> Result<Vec<u8>> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.data.get(i))
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }
}

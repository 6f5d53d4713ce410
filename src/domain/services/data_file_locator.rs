//! Data File Locator
//!
//! Finds the IPv4 and IPv6 database files inside a data directory by
//! filename suffix.
//!
//! The directory is listed non-recursively and the names are scanned in
//! sorted order. For each family the first matching name wins and any later
//! candidates are ignored. A family with no matching file gets an empty
//! name; that only becomes an error when a lookup needs the file.

use crate::domain::errors::LookupError;
use crate::domain::ports::FileLayout;
use crate::domain::value_objects::AddressFamily;
use std::path::{Path, PathBuf};

/// Suffix of IP2Location IPv6 databases.
pub const IPV6_BIN_SUFFIX: &str = ".IPV6.BIN";
/// Suffix shared by all IP2Location databases.
pub const BIN_SUFFIX: &str = ".BIN";
/// Suffix of MaxMind databases.
pub const MMDB_SUFFIX: &str = ".mmdb";

/// Discovered data files for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFiles {
    pub directory: PathBuf,
    /// IPv4 database file name, empty when none was found
    pub ipv4: String,
    /// IPv6 database file name, empty when none was found
    pub ipv6: String,
}

impl DataFiles {
    pub fn new(directory: impl Into<PathBuf>, ipv4: impl Into<String>, ipv6: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            ipv4: ipv4.into(),
            ipv6: ipv6.into(),
        }
    }

    /// A directory with no usable files.
    pub fn unconfigured(directory: impl Into<PathBuf>) -> Self {
        Self::new(directory, String::new(), String::new())
    }

    /// File name configured for a family (may be empty).
    pub fn file_for(&self, family: AddressFamily) -> &str {
        match family {
            AddressFamily::Ipv4 => &self.ipv4,
            AddressFamily::Ipv6 => &self.ipv6,
        }
    }

    /// Full path of the database for a family, or `None` if no file was
    /// discovered for it.
    pub fn path_for(&self, family: AddressFamily) -> Option<PathBuf> {
        let name = self.file_for(family);
        if name.is_empty() {
            None
        } else {
            Some(self.directory.join(name))
        }
    }

    /// Both families have a file.
    pub fn is_complete(&self) -> bool {
        !self.ipv4.is_empty() && !self.ipv6.is_empty()
    }
}

/// List `directory` and pick the database files for `layout`.
pub fn discover(directory: &Path, layout: &FileLayout) -> Result<DataFiles, LookupError> {
    let entries = std::fs::read_dir(directory).map_err(|e| {
        LookupError::Configuration(format!(
            "cannot read data directory {}: {}",
            directory.display(),
            e
        ))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("skipping unreadable entry in {}: {}", directory.display(), e);
                continue;
            }
        };
        if !entry.path().is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();

    let (ipv4, ipv6) = select_files(names.iter().map(String::as_str), layout);

    tracing::debug!(
        "discovered data files in {}: ipv4={:?} ipv6={:?}",
        directory.display(),
        ipv4,
        ipv6
    );

    Ok(DataFiles::new(directory, ipv4, ipv6))
}

/// Pick `(ipv4, ipv6)` file names from a listing, first match wins.
pub fn select_files<'a, I>(names: I, layout: &FileLayout) -> (String, String)
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let names = names.into_iter();
    match layout {
        FileLayout::PerFamily {
            ipv6_suffix,
            generic_suffix,
        } => {
            let (v6, generic) = (*ipv6_suffix, *generic_suffix);
            let ipv6 = names.clone().find(|n| n.ends_with(v6)).unwrap_or_default();
            let ipv4 = names
                .clone()
                .find(|n| n.ends_with(generic) && !n.ends_with(v6))
                .unwrap_or_default();
            (ipv4.to_string(), ipv6.to_string())
        }
        FileLayout::DualStack { suffix } => {
            let suffix = *suffix;
            let both = names.clone().find(|n| n.ends_with(suffix)).unwrap_or_default();
            (both.to_string(), both.to_string())
        }
    }
}

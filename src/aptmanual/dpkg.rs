use std::{fs, path::{Path, PathBuf}, sync::OnceLock};

use pomsky_macro::pomsky;
use regex::Regex;

use super::{Error, PackageSet, PackageSource, Result};

const RE_STATUS_PACKAGE: &str = pomsky!(
    Start "Package: " [s]* :(![s]+)
);

/// Ensures the contained regex is only compiled once to avoid performance impact in loops.
/// Thread-safe due to usage of OnceLock
fn re_status_package() -> &'static Regex {
    static RE : OnceLock<Regex> = OnceLock::new();
    // There's a test ensuring this unwrap never panics: tests::test_status_package_regex_valid
    RE.get_or_init(|| Regex::new(RE_STATUS_PACKAGE).unwrap())
}

/// The dpkg status database, listing every package currently known to be installed.
#[derive(Debug, Clone)]
pub struct DpkgStatus {
    path: PathBuf,
}

impl DpkgStatus {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_owned() }
    }
}

impl PackageSource for DpkgStatus {
    fn packages(&self) -> Result<PackageSet> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|source| Error::StatusFileUnreadable { path: self.path.clone(), source })?;
        let installed = parse_status(&contents);
        log::debug!("{} packages in '{}'", installed.len(), self.path.display());
        Ok(installed)
    }
}

/// Collects the name of every `Package: ` stanza line.
/// Lines without a name after the prefix are ignored.
pub fn parse_status(contents: &str) -> PackageSet {
    let re = re_status_package();
    contents
        .lines()
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str().to_owned())
        .collect()
}

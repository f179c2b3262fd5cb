use std::collections::BTreeSet;

/// Configuration file and injected paths
pub mod config;
/// Reading the dpkg status database
pub mod dpkg;
/// Interaction with the apt-mark CLI
pub mod apt_mark;
/// Parsing of apt's install history logs
pub mod history;
/// Combining the package sources into the final report
pub mod report;
pub mod error;

pub use error::Error;
type Result<T> = std::result::Result<T, Error>;

pub type PackageId = String;

/// Default data structure for package names. Iterates in byte order.
pub type PackageSet = BTreeSet<PackageId>;

/// Anything that can produce a set of package names, be it a file, a command or a fixture.
pub trait PackageSource {
    fn packages(&self) -> Result<PackageSet>;
}

impl PackageSource for PackageSet {
    fn packages(&self) -> Result<PackageSet> {
        Ok(self.clone())
    }
}

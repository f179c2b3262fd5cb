use std::io::{self, Write};

use super::{PackageSet, PackageSource, Result};

/// Which sources decide whether an installed package counts as manually installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Marked manual by apt-mark or named on an install command line
    #[default]
    Default,
    /// Marked manual by apt-mark
    AptMark,
    /// Named on an install command line
    AptHistory,
}

/// Computes the manually installed packages for `mode`.
/// Only the sources the mode needs are read, and all of them are read before returning,
/// so a failing source never produces a partial result.
/// The result is always a subset of `installed`.
pub fn manual_packages(
    mode: Mode,
    installed: &impl PackageSource,
    apt_mark: &impl PackageSource,
    history: &impl PackageSource,
) -> Result<PackageSet> {
    let installed = installed.packages()?;
    let candidates = match mode {
        Mode::Default => {
            let mut candidates = history.packages()?;
            candidates.extend(apt_mark.packages()?);
            candidates
        }
        Mode::AptMark => apt_mark.packages()?,
        Mode::AptHistory => history.packages()?,
    };
    log::debug!("{} installed packages, {} candidates for {:?}", installed.len(), candidates.len(), mode);

    Ok(installed.intersection(&candidates).cloned().collect())
}

/// Writes one package per line in ascending byte order.
pub fn write_packages<W: Write>(out: &mut W, packages: &PackageSet) -> io::Result<()> {
    for package in packages {
        writeln!(out, "{}", package)?;
    }
    out.flush()
}

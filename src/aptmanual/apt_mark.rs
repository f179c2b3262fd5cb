use std::process::{Command, Stdio};

use super::{Error, PackageSet, PackageSource, Result};

/// apt's registry of manually marked packages, queried through `apt-mark showmanual`
/// or any command printing one package name per line.
#[derive(Debug, Clone)]
pub struct AptMark {
    command: Vec<String>,
}

impl AptMark {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

impl PackageSource for AptMark {
    /// Runs the command to completion. There is no timeout.
    fn packages(&self) -> Result<PackageSet> {
        let (program, args) = self.command.split_first().ok_or(Error::ManualCommandEmpty)?;
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::ManualCommandSpawn { command: self.command_line(), source })?;

        if !output.status.success() {
            return Err(Error::ManualCommandStatus {
                command: self.command_line(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|source| Error::ManualCommandOutput { command: self.command_line(), source })?;
        let manual = parse_manual(&stdout);
        log::debug!("{} packages marked manual by `{}`", manual.len(), self.command_line());
        Ok(manual)
    }
}

/// One package per line; blank lines are dropped.
pub fn parse_manual(output: &str) -> PackageSet {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_owned())
        .collect()
}

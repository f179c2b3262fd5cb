use std::{fs, io, path::{Path, PathBuf}};

use serde::Deserialize;

use crate::aptmanual;

use super::{apt_mark::AptMark, dpkg::DpkgStatus, history::AptHistory, Error};

pub const DEFAULT_STATUS_FILE: &str = "/var/lib/dpkg/status";
pub const DEFAULT_HISTORY_DIR: &str = "/var/log/apt";
pub const DEFAULT_MANUAL_COMMAND: [&str; 2] = ["apt-mark", "showmanual"];

/// What to do with a history log that cannot be read or decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnreadableLogPolicy {
    /// Abort the whole run.
    #[default]
    Fail,
    /// Log a warning and carry on with the remaining files.
    Skip,
}

/// Where the package sources live on this system.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub status_file: PathBuf,
    pub history_dir: PathBuf,
    /// Program followed by its arguments
    pub manual_command: Vec<String>,
    pub unreadable_logs: UnreadableLogPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            status_file: DEFAULT_STATUS_FILE.into(),
            history_dir: DEFAULT_HISTORY_DIR.into(),
            manual_command: DEFAULT_MANUAL_COMMAND.iter().map(|s| s.to_string()).collect(),
            unreadable_logs: UnreadableLogPolicy::default(),
        }
    }
}

impl Config {
    pub fn parse(s: &str) -> aptmanual::Result<Self> {
        let config: Self = toml::from_str(s)?;
        Ok(config)
    }

    /// Loads the config file at `path`.
    /// A missing file is an error if `required`, otherwise the defaults are used.
    pub fn load(path: &Path, required: bool) -> aptmanual::Result<Self> {
        match fs::read_to_string(path) {
            Ok(s) => Self::parse(&s),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if required {
                    Err(Error::ConfigFileNotFound { path: path.to_owned(), source: err })
                } else {
                    log::info!("No config file at '{}', using defaults", path.display());
                    Ok(Self::default())
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn dpkg_status(&self) -> DpkgStatus {
        DpkgStatus::new(&self.status_file)
    }

    pub fn apt_mark(&self) -> AptMark {
        AptMark::new(self.manual_command.clone())
    }

    pub fn apt_history(&self) -> AptHistory {
        AptHistory::new(&self.history_dir, self.unreadable_logs)
    }
}

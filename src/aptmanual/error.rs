use std::{io, path::PathBuf, process::ExitStatus, string::FromUtf8Error};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // input errors
    #[error("Failed to read package status file `{path}`")]
    StatusFileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read history log `{path}`")]
    HistoryLogUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to walk history directory `{path}`")]
    HistoryDirUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },


    // manual-mark command errors
    #[error("Manual package command is empty")]
    ManualCommandEmpty,
    #[error("Failed to run `{command}`")]
    ManualCommandSpawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    ManualCommandStatus {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Failed to parse `{command}` stdout as utf8")]
    ManualCommandOutput {
        command: String,
        #[source]
        source: FromUtf8Error,
    },


    // config errors
    #[error("Config file `{path}` not found")]
    ConfigFileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io {
        #[from]
        source: io::Error,
    },
    #[error("Failed to deserialize from toml")]
    DeserializeFailure {
        #[from]
        source: toml::de::Error,
    },
}

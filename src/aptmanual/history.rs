use std::{fs::{self, File}, io::{self, Read}, path::{Path, PathBuf}};

use flate2::read::GzDecoder;
use walkdir::WalkDir;

use super::{config::UnreadableLogPolicy, Error, PackageSet, PackageSource, Result};

const HISTORY_LOG_PREFIX: &str = "history.log";
const INSTALL_MARKER: &str = "apt install ";
/// Position of the first package in `Commandline: apt install <packages>`
const FIRST_PACKAGE_TOKEN: usize = 3;

/// How a history log file is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Plain,
    Gzip,
}

impl LogKind {
    /// Classifies a file by its last extension.
    /// `history.log` and rotated `history.log.1` are plain text, `history.log.2.gz` is gzip,
    /// anything else is not a history log.
    pub fn of(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        if !file_name.starts_with(HISTORY_LOG_PREFIX) {
            return None;
        }
        match path.extension()?.to_str()? {
            "log" => Some(Self::Plain),
            "gz" => Some(Self::Gzip),
            ext if !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_digit()) => Some(Self::Plain),
            _ => None,
        }
    }

    fn read(self, path: &Path) -> io::Result<String> {
        match self {
            Self::Plain => fs::read_to_string(path),
            Self::Gzip => {
                let mut contents = String::new();
                GzDecoder::new(File::open(path)?).read_to_string(&mut contents)?;
                Ok(contents)
            }
        }
    }
}

/// apt's install history under `/var/log/apt`, including rotated and compressed logs.
#[derive(Debug, Clone)]
pub struct AptHistory {
    dir: PathBuf,
    policy: UnreadableLogPolicy,
}

impl AptHistory {
    pub fn new(dir: impl AsRef<Path>, policy: UnreadableLogPolicy) -> Self {
        Self { dir: dir.as_ref().to_owned(), policy }
    }

    /// Applies the unreadable-log policy: `Ok(())` means the failure was skipped.
    fn tolerate(&self, err: Error) -> Result<()> {
        match self.policy {
            UnreadableLogPolicy::Fail => Err(err),
            UnreadableLogPolicy::Skip => {
                log::warn!("Skipping history log: {:#}", anyhow::Error::from(err));
                Ok(())
            }
        }
    }
}

impl PackageSource for AptHistory {
    fn packages(&self) -> Result<PackageSet> {
        let mut packages = PackageSet::new();

        for entry in WalkDir::new(&self.dir).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.depth() == 0 && err.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) {
                        log::debug!("History directory '{}' does not exist", self.dir.display());
                        continue;
                    }
                    self.tolerate(Error::HistoryDirUnreadable { path: self.dir.clone(), source: err })?;
                    continue;
                }
            };
            // symlinks are followed when read, so a dangling one is reported as unreadable
            let file_type = entry.file_type();
            if file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir()) {
                continue;
            }

            let path = entry.path();
            let Some(kind) = LogKind::of(path) else {
                log::debug!("Ignoring '{}'", path.display());
                continue;
            };

            match kind.read(path) {
                Ok(contents) => {
                    let found = parse_history(&contents);
                    log::debug!("{} packages in {:?} log '{}'", found.len(), kind, path.display());
                    packages.extend(found);
                }
                Err(source) => self.tolerate(Error::HistoryLogUnreadable { path: path.to_owned(), source })?,
            }
        }
        Ok(packages)
    }
}

/// Collects every token following `apt install` on install command lines.
/// Nothing is reconciled against later removals.
pub fn parse_history(contents: &str) -> PackageSet {
    contents
        .lines()
        .filter(|line| line.contains(INSTALL_MARKER))
        .flat_map(|line| line.split_whitespace().skip(FIRST_PACKAGE_TOKEN))
        .map(|token| token.to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    const HISTORY_LOG: &str =
r#"
Start-Date: 2023-07-12  17:20:01
Commandline: apt install htop
Requested-By: nico (1000)
Install: htop:amd64 (3.2.2-2)
End-Date: 2023-07-12  17:20:03

Start-Date: 2023-07-14  09:11:45
Commandline: apt install ripgrep fd-find
Requested-By: nico (1000)
Install: ripgrep:amd64 (13.0.0-4+b2), fd-find:amd64 (8.6.0-3)
End-Date: 2023-07-14  09:11:47

Start-Date: 2023-07-15  10:00:00
Commandline: apt remove htop
Remove: htop:amd64 (3.2.2-2)
End-Date: 2023-07-15  10:00:01

Start-Date: 2023-07-16  08:00:00
Commandline: /usr/bin/unattended-upgrade
Upgrade: libc6:amd64 (2.36-9, 2.36-9+deb12u1)
End-Date: 2023-07-16  08:00:30
"#;

    fn gzip(contents: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(contents.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    fn set(names: &[&str]) -> PackageSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_history() {
        // removed packages stay in the history set
        assert_eq!(set(&["fd-find", "htop", "ripgrep"]), parse_history(HISTORY_LOG));
    }

    #[test]
    fn test_parse_history_ignores_other_commands() {
        let parsed = parse_history("Commandline: apt-get install curl\nCommandline: apt installer\nCommandline: apt install \n");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_log_kind() {
        assert_eq!(LogKind::of(Path::new("/var/log/apt/history.log")), Some(LogKind::Plain));
        assert_eq!(LogKind::of(Path::new("/var/log/apt/history.log.3")), Some(LogKind::Plain));
        assert_eq!(LogKind::of(Path::new("/var/log/apt/history.log.12.gz")), Some(LogKind::Gzip));
        assert_eq!(LogKind::of(Path::new("/var/log/apt/history.log.old.backup")), None);
        assert_eq!(LogKind::of(Path::new("/var/log/apt/history.log.1a")), None);
        assert_eq!(LogKind::of(Path::new("/var/log/apt/term.log")), None);
        assert_eq!(LogKind::of(Path::new("/var/log/apt/term.log.1.gz")), None);
    }

    #[test]
    fn test_read_history_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("history.log"), "Commandline: apt install htop\n").unwrap();
        fs::write(dir.path().join("history.log.3"), "Commandline: apt install tmux git\n").unwrap();
        fs::write(dir.path().join("history.log.1.gz"), gzip("Commandline: apt install foo bar\n")).unwrap();
        fs::write(dir.path().join("history.log.old.backup"), "Commandline: apt install stale\n").unwrap();
        fs::write(dir.path().join("term.log"), "Commandline: apt install term\n").unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();
        fs::write(dir.path().join("archive").join("history.log.9"), "Commandline: apt install nested\n").unwrap();

        let packages = AptHistory::new(dir.path(), UnreadableLogPolicy::Fail).packages().unwrap();
        assert_eq!(set(&["bar", "foo", "git", "htop", "nested", "tmux"]), packages);
    }

    #[test]
    fn test_gzip_extracts_every_package() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("history.log.2.gz"), gzip(HISTORY_LOG)).unwrap();

        let packages = AptHistory::new(dir.path(), UnreadableLogPolicy::Fail).packages().unwrap();
        assert_eq!(set(&["fd-find", "htop", "ripgrep"]), packages);
    }

    #[test]
    fn test_corrupt_gzip_policy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("history.log"), "Commandline: apt install htop\n").unwrap();
        fs::write(dir.path().join("history.log.1.gz"), b"definitely not gzip").unwrap();

        let err = AptHistory::new(dir.path(), UnreadableLogPolicy::Fail).packages().unwrap_err();
        match err {
            Error::HistoryLogUnreadable { path, .. } => assert!(path.ends_with("history.log.1.gz")),
            other => panic!("unexpected error: {other:?}"),
        }

        let packages = AptHistory::new(dir.path(), UnreadableLogPolicy::Skip).packages().unwrap();
        assert_eq!(set(&["htop"]), packages);
    }

    #[test]
    fn test_invalid_utf8_policy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("history.log.1"), [0xff, 0xfe, b'\n']).unwrap();

        assert!(AptHistory::new(dir.path(), UnreadableLogPolicy::Fail).packages().is_err());
        assert!(AptHistory::new(dir.path(), UnreadableLogPolicy::Skip).packages().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_logs() {
        let dir = tempfile::tempdir().unwrap();
        let saved = dir.path().join("saved");
        let logs = dir.path().join("apt");
        fs::create_dir_all(&saved).unwrap();
        fs::create_dir(&logs).unwrap();
        fs::write(saved.join("history.txt"), "Commandline: apt install htop\n").unwrap();
        std::os::unix::fs::symlink(saved.join("history.txt"), logs.join("history.log")).unwrap();
        std::os::unix::fs::symlink(&saved, logs.join("history.log.d")).unwrap();

        let packages = AptHistory::new(&logs, UnreadableLogPolicy::Fail).packages().unwrap();
        assert_eq!(set(&["htop"]), packages);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_policy() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("history.log"), "Commandline: apt install htop\n").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.gz"), dir.path().join("history.log.1.gz")).unwrap();

        let err = AptHistory::new(dir.path(), UnreadableLogPolicy::Fail).packages().unwrap_err();
        match err {
            Error::HistoryLogUnreadable { path, .. } => assert!(path.ends_with("history.log.1.gz")),
            other => panic!("unexpected error: {other:?}"),
        }
        let packages = AptHistory::new(dir.path(), UnreadableLogPolicy::Skip).packages().unwrap();
        assert_eq!(set(&["htop"]), packages);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let packages = AptHistory::new(dir.path().join("apt"), UnreadableLogPolicy::Fail).packages().unwrap();
        assert!(packages.is_empty());
    }
}

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::aptmanual::report::Mode;

#[derive(Parser)]
#[command(author, version, about="List the packages that were manually installed on a Debian system")]
#[command(group(ArgGroup::new("mode").args(["default", "apt_mark", "apt_history"])))]
pub struct Cli {
    /// List installed packages marked manual by apt-mark or found in apt history logs (default)
    #[arg(long)]
    pub default: bool,

    /// List installed packages marked manual by `apt-mark showmanual`
    #[arg(long = "aptMark")]
    pub apt_mark: bool,

    /// List installed packages found on `apt install` lines of the apt history logs
    #[arg(long = "aptHistory")]
    pub apt_history: bool,

    #[arg(short, long, value_name="CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Override the dpkg status file
    #[arg(long, value_name="PATH")]
    pub status_file: Option<PathBuf>,

    /// Override the apt log directory
    #[arg(long, value_name="PATH")]
    pub history_dir: Option<PathBuf>,

    /// Skip history logs that cannot be read instead of failing
    #[arg(long)]
    pub skip_unreadable_logs: bool,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.apt_mark {
            Mode::AptMark
        } else if self.apt_history {
            Mode::AptHistory
        } else {
            Mode::default()
        }
    }
}

mod cli;
mod aptmanual;


use clap::Parser;
use aptmanual::{config::{Config, UnreadableLogPolicy}, report};
use directories::ProjectDirs;
use std::{path::PathBuf, env, io};
use anyhow::Context;
use cli::Cli;

fn main() -> std::result::Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = {
        // An explicitly requested config file has to exist, the default one is optional.
        let (config_path, required) = {
            if let Some(cli_config_override) = &cli.config {
                (cli_config_override.clone(), true)
            } else if let Ok(env_config_override) = env::var("APTMANUAL_CONFIG") {
                (PathBuf::from(env_config_override), true)
            } else {
                let default_project_dirs = ProjectDirs::from("", "", "aptmanual")
                    .context("Failed to compute ProjectDirs")?;
                (default_project_dirs.config_dir().join("config.toml"), false)
            }
        };
        log::info!("Loading config from '{}'", config_path.display());
        Config::load(&config_path, required)
            .with_context(|| format!("Failed to load config at '{}'", config_path.display()))?
    };

    if let Some(status_file) = cli.status_file.clone() {
        config.status_file = status_file;
    }
    if let Some(history_dir) = cli.history_dir.clone() {
        config.history_dir = history_dir;
    }
    if cli.skip_unreadable_logs {
        config.unreadable_logs = UnreadableLogPolicy::Skip;
    }

    let mode = cli.mode();
    log::info!("Listing manually installed packages ({:?})", mode);

    let manual = report::manual_packages(
        mode,
        &config.dpkg_status(),
        &config.apt_mark(),
        &config.apt_history(),
    ).context("Failed to determine manually installed packages")?;

    report::write_packages(&mut io::stdout().lock(), &manual).context("Failed to write package list")?;
    Ok(())
}

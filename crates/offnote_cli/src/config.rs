//! Runtime configuration resolved from flags and environment.

use anyhow::{anyhow, Result};
use clap::Args;
use offnote_core::{default_log_level, Theme};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "offnote.sqlite3";

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Note database file
    #[arg(long, global = true, env = "OFFNOTE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Directory for rolling log files (logging is off when unset)
    #[arg(long, global = true, env = "OFFNOTE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true, env = "OFFNOTE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// OS color-scheme preference used for first-run settings: light|dark
    #[arg(long, global = true, env = "OFFNOTE_SYSTEM_THEME", default_value = "light")]
    pub system_theme: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub system_theme: Theme,
}

impl AppConfig {
    pub fn resolve(opts: &GlobalOpts) -> Result<Self> {
        let system_theme = Theme::parse(&opts.system_theme).ok_or_else(|| {
            anyhow!(
                "unsupported system theme `{}`; expected light|dark",
                opts.system_theme
            )
        })?;
        let db_path = opts
            .db_path
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        Ok(Self {
            db_path,
            log_dir: opts.log_dir.clone(),
            log_level: opts
                .log_level
                .clone()
                .unwrap_or_else(|| default_log_level().to_string()),
            system_theme,
        })
    }
}

//! Where mailview reads its config and writes its logs.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const APP_NAME: &str = "mailview";
const CONFIG_FILE: &str = "config.toml";

/// Resolved config files and the state directory.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// `$XDG_CONFIG_HOME/mailview/config.toml`
    pub global_config: PathBuf,
    /// `./config.toml`, layered over the global file.
    pub local_config: PathBuf,
    /// `--config`, layered over everything else. Must exist when given.
    pub cli_config: Option<PathBuf>,
    /// `$XDG_STATE_HOME/mailview`, home of the log files.
    pub state_dir: PathBuf,
}

impl AppPaths {
    pub fn discover(cli_config: Option<PathBuf>) -> Result<Self> {
        let cwd = env::current_dir()
            .map_err(|e| Error::Path(format!("determining current directory: {e}")))?;
        Ok(Self {
            global_config: BaseDir::Config.resolve()?.join(CONFIG_FILE),
            local_config: cwd.join(CONFIG_FILE),
            cli_config: cli_config.as_deref().map(expand_path).transpose()?,
            state_dir: BaseDir::State.resolve()?,
        })
    }

    /// The file with the final say: `--config` when given, else the global file.
    pub fn active_config(&self) -> &Path {
        self.cli_config.as_deref().unwrap_or(&self.global_config)
    }

    /// Log file for a front end that owns the terminal.
    pub fn log_file(&self, program: &str) -> PathBuf {
        self.state_dir.join(format!("{program}.log"))
    }
}

/// XDG base directories mailview uses.
#[derive(Debug, Clone, Copy)]
enum BaseDir {
    Config,
    State,
}

impl BaseDir {
    fn env_var(self) -> &'static str {
        match self {
            BaseDir::Config => "XDG_CONFIG_HOME",
            BaseDir::State => "XDG_STATE_HOME",
        }
    }

    fn platform_dir(self) -> Option<PathBuf> {
        match self {
            BaseDir::Config => dirs::config_dir(),
            BaseDir::State => dirs::state_dir(),
        }
    }

    fn home_fallback(self) -> &'static [&'static str] {
        match self {
            BaseDir::Config => &[".config"],
            BaseDir::State => &[".local", "state"],
        }
    }

    /// `$XDG_*`, then the platform default, then a path under `$HOME`.
    fn resolve(self) -> Result<PathBuf> {
        let base = env::var_os(self.env_var())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.platform_dir())
            .or_else(|| {
                dirs::home_dir().map(|home| {
                    self.home_fallback()
                        .iter()
                        .fold(home, |path, part| path.join(part))
                })
            })
            .ok_or_else(|| {
                Error::Path(format!("unable to resolve {} or a home directory", self.env_var()))
            })?;
        Ok(base.join(APP_NAME))
    }
}

/// Expand `~` and `$VARS` in a user-supplied path. Non-UTF-8 paths pass through.
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let Some(text) = path.to_str() else {
        return Ok(path.to_path_buf());
    };
    let expanded =
        shellexpand::full(text).map_err(|e| Error::Path(format!("expanding {text}: {e}")))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

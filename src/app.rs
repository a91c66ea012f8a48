use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::{Config, vault_config_path};
use crate::error::{BlockrefError, Result};

pub struct AppContext {
    pub vault_root: PathBuf,
    /// File that `config set` and `config reset` write.
    pub config_path: PathBuf,
    pub config: Config,
    pub robot_mode: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let vault_root = match &cli.vault {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        if !vault_root.is_dir() {
            return Err(BlockrefError::VaultNotFound(vault_root));
        }

        let explicit = cli
            .config
            .clone()
            .or_else(|| std::env::var_os("BLOCKREF_CONFIG").map(PathBuf::from));
        let config = Config::load(explicit.as_deref(), &vault_root)?;
        let config_path = explicit.unwrap_or_else(|| vault_config_path(&vault_root));

        Ok(Self {
            vault_root,
            config_path,
            config,
            robot_mode: cli.robot,
        })
    }
}

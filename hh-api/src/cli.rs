//! Command-line arguments for the hh-api server
//!
//! Each option can also come from the environment; the TOML file and compiled
//! defaults fill whatever is left (see [`hh_common::config`]).

use std::path::PathBuf;

use clap::Parser;
use hh_common::config::ConfigOverrides;

#[derive(Parser, Debug, Clone)]
#[command(name = "hh-api")]
#[command(about = "Hobby Helper REST API", long_about = None)]
#[command(version)]
pub struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "HH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Folder holding the database
    #[arg(short, long, env = "HH_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Bind address
    #[arg(long, env = "HH_HOST")]
    pub host: Option<String>,

    /// HTTP port
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Token signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            root_folder: self.root_folder.clone(),
            host: self.host.clone(),
            port: self.port,
            jwt_secret: self.jwt_secret.clone(),
        }
    }
}

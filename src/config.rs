//! Layered configuration: CLI flags > environment variables > TOML file
//! > built-in defaults, mirroring the original `ovh/svfs` cobra/viper
//! precedence.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::error::{Result, SwiftFsError};

const MAX_SEGMENT_SIZE_MIB: u64 = 5120;

#[derive(Parser, Debug)]
#[command(name = "swiftfuse", about = "A FUSE filesystem over OpenStack Swift / hubiC")]
pub struct Cli {
    /// Path to a TOML config file, lowest-precedence source below env vars.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mount the filesystem.
    Mount(MountArgs),
    /// Print version information.
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct MountArgs {
    #[arg(long)]
    pub device: String,

    #[arg(long)]
    pub mountpoint: PathBuf,

    #[arg(long)]
    pub os_auth_url: Option<String>,
    #[arg(long)]
    pub os_username: Option<String>,
    #[arg(long)]
    pub os_password: Option<String>,
    #[arg(long)]
    pub os_tenant_name: Option<String>,
    #[arg(long)]
    pub os_region_name: Option<String>,
    #[arg(long)]
    pub os_auth_token: Option<String>,
    #[arg(long)]
    pub os_storage_url: Option<String>,
    #[arg(long)]
    pub os_auth_version: Option<u8>,
    #[arg(long)]
    pub os_container_name: Option<String>,
    #[arg(long)]
    pub os_segment_size: Option<u64>,
    #[arg(long)]
    pub os_connect_timeout: Option<u64>,
    #[arg(long)]
    pub os_request_timeout: Option<u64>,

    #[arg(long)]
    pub hubic_authorization: Option<String>,
    #[arg(long)]
    pub hubic_refresh_token: Option<String>,
    #[arg(long)]
    pub hubic_times: bool,

    #[arg(long)]
    pub default_uid: Option<u32>,
    #[arg(long)]
    pub default_gid: Option<u32>,
    #[arg(long)]
    pub default_mode: Option<u32>,
    #[arg(long)]
    pub allow_root: bool,
    #[arg(long)]
    pub allow_other: bool,
    #[arg(long)]
    pub default_permissions: bool,
    #[arg(long)]
    pub read_only: bool,

    #[arg(long)]
    pub readdir_concurrency: Option<u32>,
    #[arg(long)]
    pub readdir_extra_attributes: bool,
    #[arg(long)]
    pub block_size: Option<u32>,
    #[arg(long)]
    pub readahead_size: Option<u32>,
    #[arg(long)]
    pub transfer_mode: Option<u32>,

    #[arg(long)]
    pub cache_ttl: Option<u64>,
    #[arg(long)]
    pub cache_max_entries: Option<i64>,
    #[arg(long)]
    pub cache_max_access: Option<i64>,
}

/// Transfer-mode bitmask values (§6 / GLOSSARY).
pub mod transfer_mode {
    pub const SKIP_CREATE: u32 = 1;
    pub const SKIP_MKDIR: u32 = 2;
    pub const SKIP_RMDIR: u32 = 4;
    pub const SKIP_OPEN_READ: u32 = 8;
}

/// Resolved, validated configuration used by the rest of the crate.
/// Every field here has a concrete value; merging of CLI/env/file/default
/// happens once, in [`Config::load`].
#[derive(Debug, Clone)]
pub struct Config {
    pub device: String,
    pub mountpoint: PathBuf,

    pub os_auth_url: String,
    pub os_username: Option<String>,
    pub os_password: Option<String>,
    pub os_tenant_name: Option<String>,
    pub os_region_name: Option<String>,
    pub os_auth_token: Option<String>,
    pub os_storage_url: Option<String>,
    pub os_auth_version: u8,
    pub os_container_name: Option<String>,
    pub os_segment_size_mib: u64,
    pub os_connect_timeout_secs: u64,
    pub os_request_timeout_secs: u64,

    pub hubic_authorization: Option<String>,
    pub hubic_refresh_token: Option<String>,
    pub hubic_times: bool,

    pub default_uid: u32,
    pub default_gid: u32,
    pub default_mode: u32,
    pub allow_root: bool,
    pub allow_other: bool,
    pub default_permissions: bool,
    pub read_only: bool,

    pub readdir_concurrency: u32,
    pub readdir_extra_attributes: bool,
    pub block_size: u32,
    pub readahead_size_kib: u32,
    pub transfer_mode: u32,

    pub cache_ttl_secs: u64,
    pub cache_max_entries: i64,
    pub cache_max_access: i64,
}

/// Mirrors the subset of fields that may come from a TOML file or env vars.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct FileConfig {
    os_auth_url: Option<String>,
    os_username: Option<String>,
    os_password: Option<String>,
    os_tenant_name: Option<String>,
    os_region_name: Option<String>,
    os_auth_token: Option<String>,
    os_storage_url: Option<String>,
    os_domain: Option<String>,
    hubic_auth: Option<String>,
    hubic_token: Option<String>,
}

impl FileConfig {
    fn from_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SwiftFsError::InvalidConfig(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&text)
            .map_err(|e| SwiftFsError::InvalidConfig(format!("parsing {}: {e}", path.display())))
    }

    fn from_env() -> Self {
        FileConfig {
            os_auth_url: std::env::var("os_auth_url").ok(),
            os_username: std::env::var("os_username").ok(),
            os_password: std::env::var("os_password").ok(),
            os_tenant_name: std::env::var("os_tenant_name").ok(),
            os_region_name: std::env::var("os_region_name").ok(),
            os_auth_token: std::env::var("os_auth_token").ok(),
            os_storage_url: std::env::var("os_storage_url").ok(),
            os_domain: std::env::var("os_domain").ok(),
            hubic_auth: std::env::var("hubic_auth").ok(),
            hubic_token: std::env::var("hubic_token").ok(),
        }
    }

    fn merge_over(self, lower: FileConfig) -> FileConfig {
        FileConfig {
            os_auth_url: self.os_auth_url.or(lower.os_auth_url),
            os_username: self.os_username.or(lower.os_username),
            os_password: self.os_password.or(lower.os_password),
            os_tenant_name: self.os_tenant_name.or(lower.os_tenant_name),
            os_region_name: self.os_region_name.or(lower.os_region_name),
            os_auth_token: self.os_auth_token.or(lower.os_auth_token),
            os_storage_url: self.os_storage_url.or(lower.os_storage_url),
            os_domain: self.os_domain.or(lower.os_domain),
            hubic_auth: self.hubic_auth.or(lower.hubic_auth),
            hubic_token: self.hubic_token.or(lower.hubic_token),
        }
    }
}

impl Config {
    /// Merges CLI flags (highest precedence) over environment variables,
    /// over an optional TOML config file, over built-in defaults.
    pub fn load(args: &MountArgs, config_path: Option<&std::path::Path>) -> Result<Config> {
        let file_cfg = match config_path {
            Some(p) => FileConfig::from_file(p)?,
            None => FileConfig::default(),
        };
        let env_cfg = FileConfig::from_env().merge_over(file_cfg);

        let os_auth_url = args
            .os_auth_url
            .clone()
            .or(env_cfg.os_auth_url)
            .unwrap_or_else(|| "https://auth.cloud.ovh.net/v2.0".to_string());

        let cfg = Config {
            device: args.device.clone(),
            mountpoint: args.mountpoint.clone(),

            os_auth_url,
            os_username: args.os_username.clone().or(env_cfg.os_username),
            os_password: args.os_password.clone().or(env_cfg.os_password),
            os_tenant_name: args.os_tenant_name.clone().or(env_cfg.os_tenant_name),
            os_region_name: args.os_region_name.clone().or(env_cfg.os_region_name),
            os_auth_token: args.os_auth_token.clone().or(env_cfg.os_auth_token),
            os_storage_url: args.os_storage_url.clone().or(env_cfg.os_storage_url),
            os_auth_version: args.os_auth_version.unwrap_or(0),
            os_container_name: args.os_container_name.clone(),
            os_segment_size_mib: args.os_segment_size.unwrap_or(256),
            os_connect_timeout_secs: args.os_connect_timeout.unwrap_or(300),
            os_request_timeout_secs: args.os_request_timeout.unwrap_or(60),

            hubic_authorization: args.hubic_authorization.clone(),
            hubic_refresh_token: args.hubic_refresh_token.clone(),
            hubic_times: args.hubic_times,

            default_uid: args.default_uid.unwrap_or(0),
            default_gid: args.default_gid.unwrap_or(0),
            default_mode: args.default_mode.unwrap_or(0o700),
            allow_root: args.allow_root,
            allow_other: args.allow_other,
            default_permissions: args.default_permissions,
            read_only: args.read_only,

            readdir_concurrency: args.readdir_concurrency.unwrap_or(20),
            readdir_extra_attributes: args.readdir_extra_attributes,
            block_size: args.block_size.unwrap_or(4096),
            readahead_size_kib: args.readahead_size.unwrap_or(128),
            transfer_mode: args.transfer_mode.unwrap_or(0),

            cache_ttl_secs: args.cache_ttl.unwrap_or(60),
            cache_max_entries: args.cache_max_entries.unwrap_or(-1),
            cache_max_access: args.cache_max_access.unwrap_or(-1),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.os_segment_size_mib == 0 || self.os_segment_size_mib > MAX_SEGMENT_SIZE_MIB {
            return Err(SwiftFsError::InvalidConfig(format!(
                "os-segment-size must be in 1..={MAX_SEGMENT_SIZE_MIB} MiB, got {}",
                self.os_segment_size_mib
            )));
        }
        if self.readdir_concurrency == 0 {
            return Err(SwiftFsError::InvalidConfig(
                "readdir-concurrency must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn segment_size_bytes(&self) -> u64 {
        self.os_segment_size_mib * 1024 * 1024
    }
}

//! CLI entry point: resolves configuration, authenticates, and mounts.
//!
//! Component A (the real Swift/hubiC HTTP client) is external per the
//! specification; this binary wires up `MemoryStorageClient` behind the
//! same `StorageClient` trait so the rest of the stack is exercised
//! end-to-end. Swapping in a real HTTP-backed client means implementing
//! `StorageClient` and changing only the construction below.

use std::sync::Arc;

use clap::Parser;
use fuse3::path::prelude::Session;
use fuse3::MountOptions;
use swiftfuse::auth::{AutoAuthenticator, StaticTokenAuthenticator};
use swiftfuse::config::{Cli, Command, Config};
use swiftfuse::fs;
use swiftfuse::fuse_adapter::SwiftFuse;
use swiftfuse::pool::ConnectionPool;
use swiftfuse::storage::memory::MemoryStorageClient;
use swiftfuse::storage::StorageClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Version => {
            println!("swiftfuse {}", env!("CARGO_PKG_VERSION"));
            std::process::ExitCode::SUCCESS
        }
        Command::Mount(args) => match run_mount(&cli, args).await {
            Ok(()) => std::process::ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("swiftfuse: {e}");
                std::process::ExitCode::FAILURE
            }
        },
    }
}

async fn run_mount(cli: &Cli, args: swiftfuse::config::MountArgs) -> swiftfuse::Result<()> {
    let config = Config::load(&args, cli.config.as_deref())?;
    info!(mountpoint = %config.mountpoint.display(), "starting swiftfuse");

    let client: Arc<dyn StorageClient> = Arc::new(MemoryStorageClient::new());
    let pool_size = config.readdir_concurrency.max(1) as usize;
    let clients: Vec<Arc<dyn StorageClient>> = (0..pool_size).map(|_| client.clone()).collect();
    let pool = Arc::new(ConnectionPool::new(clients));

    let mut candidates: Vec<Box<dyn swiftfuse::auth::Authenticator>> = Vec::new();
    if let (Some(url), Some(token)) = (config.os_storage_url.clone(), config.os_auth_token.clone()) {
        candidates.push(Box::new(StaticTokenAuthenticator {
            storage_url: url,
            token,
        }));
    }
    let authenticator = AutoAuthenticator::new(candidates);

    let mountpoint = config.mountpoint.clone();
    let read_only = config.read_only;
    let allow_other = config.allow_other;
    let allow_root = config.allow_root;

    let ctx = fs::init(config, &authenticator, pool).await?;
    let fuse = SwiftFuse::new(ctx);

    let mut opts = MountOptions::default();
    opts.fs_name("swiftfuse");
    opts.read_only(read_only);
    opts.force_readdir_plus(false);
    if allow_other {
        opts.allow_other(true);
    }
    if allow_root {
        opts.allow_root(true);
    }

    let handle = Session::new(opts)
        .mount_with_unprivileged(fuse, &mountpoint)
        .await
        .map_err(|e| swiftfuse::SwiftFsError::Io(e.to_string()))?;

    handle.await.map_err(|e| swiftfuse::SwiftFsError::Io(e.to_string()))
}

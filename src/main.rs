use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use staticd::config::{self, AppState, Config, Overrides};
use staticd::{logger, server};

/// Static file server with conditional request support
#[derive(Debug, Parser)]
#[command(name = "staticd", version, about)]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, env = "STATICD_CONFIG", default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Directory to serve; replaces the first configured root
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        root: cli.root,
        port: cli.port,
    };
    let cfg = Config::load_with(&cli.config, &overrides)?;
    logger::init(&cfg.logging)?;

    // Worker threads default to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(cfg)?);
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&listener.local_addr()?, &state.config);
    server::serve(listener, state, server::shutdown_signal()).await?;
    Ok(())
}

use std::sync::Arc;

use static_mount::config::{AppState, Config};
use static_mount::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config path without extension, e.g. `config` for config.toml
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

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
    let listener = server::bind(addr)?;

    logger::log_server_start(&addr, &state.config);
    logger::log_mounts(&state.mounts);

    server::run(listener, state, server::shutdown_signal()).await;
    Ok(())
}

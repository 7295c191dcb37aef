use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::backend::HttpInstructionBackend;
use crate::catalog::Catalog;
use crate::form_state::FormSession;
use crate::kv_store::JsonFileStore;
use crate::path_utils::{get_base_dir, resolve_config_path, state_file_path};
use crate::server::{AppServer, AppState};

struct Args {
    config: Option<String>,
    port: Option<u16>,
    backend_url: Option<String>,
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args();
    let base_dir = get_base_dir();
    let config_path = resolve_config_path(args.config, &base_dir);

    let catalog = Catalog::load_or_built_in(&config_path)
        .with_context(|| format!("catalog error: {}", config_path.display()))?;
    let catalog = Arc::new(catalog);

    let state_path = state_file_path(&base_dir);
    let store = JsonFileStore::load(state_path.clone())
        .with_context(|| format!("state file error: {}", state_path.display()))?;
    let session = FormSession::hydrate(Box::new(store), &catalog);

    let backend_url = args
        .backend_url
        .unwrap_or_else(|| catalog.backend_base_url.clone());
    let backend = Arc::new(HttpInstructionBackend::new(backend_url.clone()));

    let preferred_port = args.port.unwrap_or(catalog.server_port);
    let state = Arc::new(AppState::new(session, catalog, backend));
    let mut server = AppServer::start(state, preferred_port).context("failed to start server")?;

    let url = format!("http://127.0.0.1:{}/", server.port());
    tracing::info!(%url, backend = %backend_url, "diagram instructions generator running");
    println!("Open {url} in your browser.");

    wait_for_shutdown()?;
    server.stop();
    Ok(())
}

fn wait_for_shutdown() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build shutdown runtime")?;
    runtime
        .block_on(tokio::signal::ctrl_c())
        .context("failed to wait for shutdown signal")?;
    Ok(())
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        port: None,
        backend_url: None,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = iter.next(),
            "--port" => args.port = iter.next().and_then(|v| v.parse().ok()),
            "--backend-url" => args.backend_url = iter.next(),
            _ => {}
        }
    }

    args
}

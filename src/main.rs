use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use strokedash::{build_router, AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(version, about = "strokedash")]
struct Args {
    /// Path to the stroke dataset CSV (overrides the config file)
    #[arg(long = "data")]
    data: Option<PathBuf>,

    /// Address to bind, host:port (overrides the config file)
    #[arg(long = "bind")]
    bind: Option<String>,

    /// Path to a TOML config file
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Disable permissive CORS on responses
    #[arg(long = "no-cors", action)]
    no_cors: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn resolve_config(args: &Args) -> Result<ServerConfig> {
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(data) = &args.data {
        config.data_path = data.clone();
    }
    if let Some(bind) = &args.bind {
        config.bind = bind.clone();
    }
    if args.no_cors {
        config.cors_allow_any = false;
    }
    Ok(config)
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(_) => return std::future::pending().await,
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    // The table is loaded exactly once; a load failure is fatal and the
    // server never binds.
    let table = strokedash::dataset::load(&config.data_path)?;
    info!(
        rows = table.height(),
        path = %config.data_path.display(),
        "dataset loaded"
    );

    let state = AppState::new(table);
    let app = build_router(state, config.cors_allow_any);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("strokedash listening on {}", config.bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;
    Ok(())
}

//! corefboard-web - Coreference evaluation leaderboard server
//!
//! Startup: resolve the data root, lay out its directories, open (or
//! create) the SQLite database, probe the Perl scoring environment, and
//! serve. A database that cannot be opened is logged and the server
//! continues on the in-memory demo store.

use anyhow::Result;
use clap::Parser;
use corefboard_common::config::{resolve_data_root, DataDirs, ROOT_ENV_VAR};
use corefboard_common::db::init_database;
use corefboard_web::scorer::{check_missing_perl_modules, check_perl_available};
use corefboard_web::store::Store;
use corefboard_web::{build_router, AppState};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "corefboard-web", about = "Coreference evaluation leaderboard server")]
struct Args {
    /// Data root folder (overrides environment and config file)
    #[arg(long, env = ROOT_ENV_VAR)]
    root_folder: Option<PathBuf>,

    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port
    #[arg(long, default_value_t = 8000, env = "COREFBOARD_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting corefboard-web v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let root = resolve_data_root(args.root_folder.as_deref());
    let dirs = DataDirs::ensure(root)?;
    info!("Data root: {}", dirs.root.display());

    let db_path = dirs.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            Some(pool)
        }
        Err(e) => {
            warn!("Database unavailable ({}); running on the demo store only", e);
            None
        }
    };

    if check_perl_available().await {
        let missing = check_missing_perl_modules().await;
        if missing.is_empty() {
            info!("✓ Perl scoring environment ready");
        } else {
            warn!(
                "Perl found but modules missing: {}. Scoring will fail until installed.",
                missing.join(", ")
            );
        }
    } else {
        warn!("Perl not found; scoring requests will be rejected");
    }

    let state = AppState::new(Store::new(pool), dirs);
    let app = build_router(state);

    let bind = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("corefboard-web listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app).await?;

    Ok(())
}

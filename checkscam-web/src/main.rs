//! checkscam-web - Community scam-reporting web service
//!
//! Single deployable module: serves the public UI and JSON API, owns the
//! SQLite database, and talks to the phone-validation providers and the
//! generative oracle during searches.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use checkscam_common::config::{
    self, database_path, load_toml_config, media_root, resolve_root_folder,
};
use checkscam_common::db::init_database;
use checkscam_web::services::{PhoneCheckConfig, PhoneCheckService, ScamOracle};
use checkscam_web::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "checkscam-web", about = "CheckScam community scam-reporting web service")]
struct Args {
    /// Root data folder (database + uploaded media)
    #[arg(long, env = "CHECKSCAM_ROOT_FOLDER")]
    root_folder: Option<String>,

    /// Listen port
    #[arg(long, default_value_t = 5810)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting CheckScam web service v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    // Root folder: CLI/env override -> TOML -> OS default
    let toml_config = load_toml_config();
    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    std::fs::create_dir_all(&root_folder)?;
    info!("Root folder: {}", root_folder.display());

    let media_dir = media_root(&root_folder);
    std::fs::create_dir_all(config::scam_images_dir(&root_folder))?;

    // Open or create the database
    let db_path = database_path(&root_folder);
    info!("Database: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    // Provider keys: Database -> ENV -> TOML. Missing keys degrade phone
    // checks to the default verdict instead of refusing to start.
    let numverify_api_key =
        checkscam_web::config::resolve_numverify_api_key(&pool, &toml_config).await?;
    let veriphone_api_key =
        checkscam_web::config::resolve_veriphone_api_key(&pool, &toml_config).await?;

    let phone_check = PhoneCheckService::new(PhoneCheckConfig {
        numverify_api_key,
        veriphone_api_key,
    });
    if phone_check.is_configured() {
        info!("Phone validators configured");
    }

    let oracle = ScamOracle::new()?;

    let state = AppState::new(pool, phone_check, oracle, media_dir);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("checkscam-web listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}

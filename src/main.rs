use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scribe::banner::{BannerInfo, print_banner};
use scribe::config::Settings;
use scribe::consts::{
    DEFAULT_ADMIN_API_URL, DEFAULT_AUTH_SERVER, DEFAULT_GITHUB_EXAMPLE_URL, DEFAULT_ROOMS_API_URL,
    SESSION_TTL_HOURS, default_db_path,
};
use scribe::controllers::ExampleRegistry;
use scribe::manifest::Manifest;
use scribe::server::{AppState, router};
use scribe::session::SessionStore;
use scribe::session::memory::MemorySessionStore;
use scribe::session::sqlite::SqliteSessionStore;

#[derive(Parser)]
#[command(
    name = "scribe",
    version,
    about = "A launcher for document-signing API examples."
)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, env = "SCRIBE_LISTEN", default_value = "127.0.0.1:3000")]
    listen: String,

    /// Public URL of this app (used for the OAuth redirect URI)
    #[arg(long, env = "SCRIBE_APP_URL", default_value = "http://localhost:3000")]
    app_url: String,

    /// SQLite database path for sessions (use :memory: for ephemeral)
    #[arg(short, long, env = "SCRIBE_DB")]
    db: Option<String>,

    /// Hours a session may sit idle before it is discarded
    #[arg(long, env = "SCRIBE_SESSION_TTL_HOURS", default_value_t = SESSION_TTL_HOURS)]
    session_ttl_hours: u64,

    /// OAuth integration key
    #[arg(long, env = "DS_CLIENT_ID")]
    client_id: String,

    /// OAuth secret key
    #[arg(long, env = "DS_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Account server
    #[arg(long, env = "DS_AUTH_SERVER", default_value = DEFAULT_AUTH_SERVER)]
    auth_server: String,

    /// Rooms API base URL
    #[arg(long, env = "DS_ROOMS_API_URL", default_value = DEFAULT_ROOMS_API_URL)]
    rooms_api_url: String,

    /// Admin API base URL
    #[arg(long, env = "DS_ADMIN_API_URL", default_value = DEFAULT_ADMIN_API_URL)]
    admin_api_url: String,

    /// Prefix for "view source" links
    #[arg(long, env = "SCRIBE_SOURCE_URL", default_value = DEFAULT_GITHUB_EXAMPLE_URL)]
    source_url: String,

    /// Prefix for documentation links (hidden when unset)
    #[arg(long, env = "SCRIBE_DOCUMENTATION")]
    documentation: Option<String>,

    /// Example manifest to use instead of the built-in one
    #[arg(long, env = "SCRIBE_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Open the launcher in a browser once listening
    #[arg(long, default_value_t = false)]
    open: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scribe=info")),
        )
        .init();

    let cli = Cli::parse();

    let settings = Settings {
        app_url: cli.app_url,
        client_id: cli.client_id,
        client_secret: cli.client_secret,
        auth_server: cli.auth_server,
        rooms_api_url: cli.rooms_api_url,
        admin_api_url: cli.admin_api_url,
        github_example_url: cli.source_url,
        documentation: cli.documentation,
        manifest_path: cli.manifest,
    };

    let manifest = Manifest::load(settings.manifest_path.as_deref())?;

    let db = match cli.db {
        Some(db) => db,
        None => {
            let path = default_db_path();
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            path.to_string_lossy().into_owned()
        }
    };
    let ttl = Duration::from_secs(cli.session_ttl_hours.saturating_mul(3600));
    let sessions: Arc<dyn SessionStore> = if db == ":memory:" {
        Arc::new(MemorySessionStore::new().with_ttl(ttl))
    } else {
        Arc::new(SqliteSessionStore::open(&db)?.with_ttl(ttl))
    };

    let examples = ExampleRegistry::new();

    print_banner(&BannerInfo {
        listen: &cli.listen,
        app_url: &settings.app_url,
        auth_server: &settings.auth_server,
        sessions: if db == ":memory:" { "ephemeral" } else { db.as_str() },
        examples: &examples.names(),
    });

    let state = Arc::new(AppState {
        settings,
        manifest,
        examples,
        sessions,
    });
    let app_url = state.settings.app_url.clone();

    let listener = tokio::net::TcpListener::bind(&cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    tracing::info!(addr = %cli.listen, "listening");

    if cli.open
        && let Err(e) = open::that(&app_url)
    {
        tracing::warn!(error = %e, "could not open a browser");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    println!("goodbye.");
    Ok(())
}

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::FixedOffset;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use pandu_api::app::router;
use pandu_api::auth::hash_password;
use pandu_api::state::AppStateInner;
use pandu_types::models::Role;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pandu=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("PANDU_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("PANDU_DB_PATH").unwrap_or_else(|_| "pandu.db".into());
    let host = std::env::var("PANDU_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PANDU_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Portal timezone, a fixed UTC offset in hours. Default is +7 (WIB).
    let tz_hours: i32 = std::env::var("PANDU_TZ_OFFSET_HOURS")
        .unwrap_or_else(|_| "7".into())
        .parse()?;
    let tz_offset = FixedOffset::east_opt(tz_hours * 3600)
        .ok_or_else(|| anyhow::anyhow!("invalid PANDU_TZ_OFFSET_HOURS: {tz_hours}"))?;

    // Who may append ledger entries: 'admin' (default) or 'moderator'.
    let ledger_write_role = match std::env::var("PANDU_LEDGER_WRITE_ROLE") {
        Ok(v) => Role::parse(&v)
            .ok_or_else(|| anyhow::anyhow!("invalid PANDU_LEDGER_WRITE_ROLE: {v}"))?,
        Err(_) => Role::Admin,
    };

    // Init database
    let db = pandu_db::Database::open(&PathBuf::from(&db_path))?;

    // Seed the root admin. It can never be deleted or demoted.
    let root_handle = std::env::var("PANDU_ROOT_HANDLE").unwrap_or_else(|_| "admin".into());
    let root_password = match std::env::var("PANDU_ROOT_PASSWORD") {
        Ok(v) => v,
        Err(_) => {
            warn!("PANDU_ROOT_PASSWORD not set, using the default bootstrap password");
            "admin123".into()
        }
    };
    db.ensure_root_admin(
        &root_handle,
        &hash_password(&root_password)?,
        "Administrator",
        chrono::Utc::now(),
    )?;

    // Shared state
    let state = Arc::new(AppStateInner {
        db,
        jwt_secret,
        tz_offset,
        ledger_write_role,
    });

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Pandu portal listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

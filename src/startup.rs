//! Application Startup
//!
//! Application building, server initialization, and the background invite
//! sweeper.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::application::services::InviteCodeEngine;
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    PgGuildRepository, PgInviteRepository, PgUserRepository,
};
use crate::presentation::http::routes;
use crate::presentation::middleware::create_cors_layer;
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        // Create snowflake generator
        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            0u64, // Default node_id
        ));

        // Create app state
        let state = AppState {
            db: db.clone(),
            snowflake,
            settings: Arc::new(settings.clone()),
        };

        // Advisory background sweep of expired invite codes. Redemption-time
        // checks stay authoritative whether or not this runs.
        spawn_invite_sweeper(db, settings.invites.sweep_interval_secs);

        crate::presentation::http::handlers::health::init_server_start();

        // Build router with middleware
        let router = routes::create_router(state).layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&settings.cors)),
        );

        // Bind to address
        let addr = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Spawn the periodic expired-invite sweeper.
fn spawn_invite_sweeper(db: PgPool, interval_secs: u64) {
    let engine = InviteCodeEngine::new(
        Arc::new(PgUserRepository::new(db.clone())),
        Arc::new(PgGuildRepository::new(db.clone())),
        Arc::new(PgInviteRepository::new(db)),
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            if let Err(e) = engine.sweep_expired().await {
                tracing::warn!("Invite sweep failed: {}", e);
            }
        }
    });
}

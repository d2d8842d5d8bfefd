use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use pubportal_auth::config::AuthConfig;
use pubportal_auth::infra::cache::RedisOtpStore;
use pubportal_auth::infra::db::DbCredentialStore;
use pubportal_auth::infra::ledger::{MemoryOtpStore, OtpBackend, spawn_otp_reaper};
use pubportal_auth::infra::mailer::{HttpMailer, LogMailer, Mailer};
use pubportal_auth::router::build_router;
use pubportal_auth::state::AppState;
use pubportal_auth::usecase::admin::BootstrapAdminUseCase;
use pubportal_auth_migration::{Migrator, MigratorTrait};
use pubportal_auth_types::token::SessionIssuer;
use pubportal_core::middleware::cors_layer;
use pubportal_core::tracing::init_tracing;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=info,sqlx=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(DEFAULT_LOG_FILTER);

    let config = AuthConfig::from_env()?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;
    let db = Arc::new(db);

    if let Some(email) = &config.bootstrap_admin_email {
        let usecase = BootstrapAdminUseCase {
            credentials: DbCredentialStore {
                db: Arc::clone(&db),
            },
        };
        if let Err(e) = usecase.execute(email).await {
            tracing::error!(error = %e, admin = %email, "failed to seed bootstrap admin");
        }
    }

    let otp_store = match &config.redis_url {
        Some(url) => {
            let pool = deadpool_redis::Config::from_url(url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .context("failed to create Redis pool")?;
            info!("otp ledger: redis");
            OtpBackend::Redis(RedisOtpStore { pool })
        }
        None => {
            let store = MemoryOtpStore::default();
            if let Some(every) = config.otp_reaper_interval {
                spawn_otp_reaper(store.clone(), every);
            }
            info!("otp ledger: in-memory");
            OtpBackend::Memory(store)
        }
    };

    let mailer = match &config.mail_relay_url {
        Some(url) => Mailer::Http(HttpMailer::new(
            url.clone(),
            config.mail_api_key.clone(),
            config.mail_from.clone(),
        )?),
        None => {
            tracing::warn!("MAIL_RELAY_URL not set, otp mails will only be logged");
            Mailer::Log(LogMailer)
        }
    };

    let state = AppState {
        db,
        otp_store,
        mailer,
        sessions: SessionIssuer::new(&config.jwt_secret),
    };

    let mut router = build_router(state);
    if !config.cors_allowed_origins.is_empty() {
        router = router.layer(cors_layer(&config.cors_allowed_origins));
    }

    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("auth service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

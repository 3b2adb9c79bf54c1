//! Server runner: wires configuration, database, cache, Orthanc client,
//! services, and per-facility change monitors into a running Axum app.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use bitpacs_auth::{JwtDecoder, JwtEncoder, PasswordHasher};
use bitpacs_cache::{keys, ReadThroughCache};
use bitpacs_core::config::AppConfig;
use bitpacs_core::error::AppError;
use bitpacs_core::AppResult;
use bitpacs_database::repositories::{StudyLogRepository, UserRepository};
use bitpacs_entity::user::Role;
use bitpacs_facility::{FacilityRegistry, RouteResolver};
use bitpacs_monitor::{ChangeMonitor, ChangesSource};
use bitpacs_pacs::types::ChangesFeed;
use bitpacs_pacs::OrthancClient;
use bitpacs_service::{AuthService, DashboardService, StudyLogService};

use crate::router::build_router;
use crate::state::AppState;

/// Changes feed source for one facility, backed by the shared client.
struct FacilityChangesSource {
    pacs: Arc<OrthancClient>,
    base_url: String,
}

#[async_trait]
impl ChangesSource for FacilityChangesSource {
    async fn fetch(&self, since: Option<u64>, limit: u32) -> AppResult<ChangesFeed> {
        self.pacs.get_changes(&self.base_url, since, limit).await
    }
}

/// Runs the BitPacs server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting BitPacs server...");

    // Database
    let db_pool = bitpacs_database::connect(&config.database).await?;
    bitpacs_database::migration::run_migrations(&db_pool).await?;

    // Repositories
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let study_log_repo = Arc::new(StudyLogRepository::new(db_pool.clone()));

    // Auth
    let password_hasher = PasswordHasher::new();
    let jwt_encoder = JwtEncoder::new(&config.auth);
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    seed_bootstrap_admin(&config, &user_repo, &password_hasher).await?;

    // Facility registry and routing
    let registry = Arc::new(FacilityRegistry::from_settings(&config.orthanc.facilities)?);
    let resolver = RouteResolver::new(Arc::clone(&registry));

    // Cache and upstream client
    let cache = Arc::new(ReadThroughCache::new(&config.cache));
    let pacs = Arc::new(OrthancClient::new(&config.orthanc)?);

    // Services
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repo),
        password_hasher,
        jwt_encoder,
    ));
    let dashboard_service = Arc::new(DashboardService::new(
        resolver,
        Arc::clone(&cache),
        Arc::clone(&pacs),
    ));
    let study_log_service = Arc::new(StudyLogService::new(
        Arc::clone(&study_log_repo) as Arc<dyn bitpacs_service::StudyLogStore>,
        Arc::clone(&user_repo) as Arc<dyn bitpacs_service::UserDirectory>,
    ));

    // Shutdown channel shared by the server and the monitors
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    spawn_change_monitors(&config, &registry, &pacs, &cache, &shutdown_rx);

    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool,
        registry,
        cache,
        jwt_decoder,
        auth_service,
        dashboard_service,
        study_log_service,
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("BitPacs server listening on {}", addr);

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let mut drain_watch = shutdown_rx.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // Drain open connections for at most the configured grace period
    // once shutdown begins; the select drops the server after that.
    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async move {
            while drain_watch.changed().await.is_ok() {
                if *drain_watch.borrow() {
                    break;
                }
            }
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(
                grace_seconds = grace.as_secs(),
                "Shutdown grace period elapsed; aborting remaining connections"
            );
        }
    }

    Ok(())
}

/// One monitor per real facility; a reload observation drops that
/// facility's cached listings so the next dashboard read refetches.
fn spawn_change_monitors(
    config: &AppConfig,
    registry: &Arc<FacilityRegistry>,
    pacs: &Arc<OrthancClient>,
    cache: &Arc<ReadThroughCache>,
    shutdown_rx: &watch::Receiver<bool>,
) {
    if !config.monitor.enabled {
        tracing::info!("Change monitors disabled by configuration");
        return;
    }

    for facility in registry.iter() {
        let source = Arc::new(FacilityChangesSource {
            pacs: Arc::clone(pacs),
            base_url: facility.upstream_base_url.clone(),
        });
        let monitor = ChangeMonitor::new(facility.key.clone(), source, &config.monitor);

        let cache = Arc::clone(cache);
        let prefix = keys::facility_prefix(&facility.key);
        let cancel = shutdown_rx.clone();
        tokio::spawn(async move {
            monitor
                .run(cancel, move || {
                    let cache = cache.clone();
                    let prefix = prefix.clone();
                    async move {
                        cache.invalidate_prefix(&prefix).await;
                    }
                })
                .await;
        });
    }
}

/// Creates the Master account on an empty users table, so a fresh
/// deployment can log in without manual SQL.
async fn seed_bootstrap_admin(
    config: &AppConfig,
    users: &UserRepository,
    hasher: &PasswordHasher,
) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (
        config.auth.bootstrap_admin_email.as_deref(),
        config.auth.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    if users.count().await? > 0 {
        return Ok(());
    }

    let hash = hasher.hash_password(password)?;
    let user = users
        .create(
            "Master",
            email,
            &hash,
            Role::Master,
            bitpacs_facility::SENTINEL_KEY,
        )
        .await?;
    tracing::info!(user_id = %user.id, email, "Bootstrap Master account created");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}

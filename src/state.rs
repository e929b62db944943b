use std::sync::Arc;

use liceum_auth::{Clock, SystemClock};
use liceum_config::{AuthCodeConfig, CorsConfig, EmailConfig, JwtConfig, ServerConfig};
use liceum_db::PgPool;

use crate::modules::auth::AuthService;
use crate::modules::events::{EventRepository, EventService, PgEventRepository};
use crate::utils::email::mailer_from_config;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub events: Arc<EventService>,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, events: Arc<EventService>, cors_config: CorsConfig) -> Self {
        Self {
            auth,
            events,
            cors_config,
        }
    }
}

pub fn init_event_service(
    db: PgPool,
    server_config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> EventService {
    let repo: Arc<dyn EventRepository> = Arc::new(PgEventRepository::new(db));
    EventService::new(repo, clock, server_config.cleanup_every)
}

/// Wires services from environment configuration.
pub fn init_app_state(db: PgPool, server_config: &ServerConfig) -> anyhow::Result<AppState> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mailer = mailer_from_config(&EmailConfig::from_env())?;

    let auth = AuthService::from_config(
        AuthCodeConfig::from_env(),
        &JwtConfig::from_env(),
        mailer,
        clock.clone(),
    );
    let events = init_event_service(db, server_config, clock);

    Ok(AppState::new(
        Arc::new(auth),
        Arc::new(events),
        CorsConfig::from_env(),
    ))
}

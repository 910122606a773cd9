use std::sync::Arc;
use std::time::Instant;

use crate::auth::JwtValidator;
use crate::config::Settings;
use crate::device::{DeviceRegistry, DeviceStore};
use crate::directory::UserDirectory;
use crate::notification::PushDispatcher;
use crate::postgres::PostgresPool;
use crate::provider::PushTransport;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub jwt_validator: Arc<JwtValidator>,
    pub registry: Arc<DeviceRegistry>,
    pub directory: Arc<dyn UserDirectory>,
    pub dispatcher: Arc<PushDispatcher>,
    pub postgres_pool: Option<PostgresPool>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        settings: Settings,
        device_store: Arc<dyn DeviceStore>,
        directory: Arc<dyn UserDirectory>,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        let jwt_validator = Arc::new(JwtValidator::new(&settings.jwt));
        let registry = Arc::new(DeviceRegistry::new(device_store, settings.push.clone()));
        let dispatcher = Arc::new(PushDispatcher::new(
            transport,
            directory.clone(),
            &settings.delivery,
        ));

        Self {
            settings: Arc::new(settings),
            jwt_validator,
            registry,
            directory,
            dispatcher,
            postgres_pool: None,
            start_time: Instant::now(),
        }
    }

    /// Attach the pool backing the stores, reported by the health endpoint.
    pub fn with_postgres_pool(mut self, pool: PostgresPool) -> Self {
        self.postgres_pool = Some(pool);
        self
    }
}

mod settings;

pub use settings::{
    ApiConfig, DatabaseConfig, DeliveryConfig, JwtConfig, MessagingConfig, OtelConfig, ProviderConfig,
    PushConfig, ServerConfig, Settings,
};

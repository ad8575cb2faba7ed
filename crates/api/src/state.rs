use sqlx::PgPool;

use crate::auth::{AuthConfig, JwtService};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    auth_config: AuthConfig,
    jwt_service: JwtService,
}

impl AppState {
    pub fn new(db: PgPool) -> anyhow::Result<Self> {
        Ok(Self::with_config(db, AuthConfig::from_env()?))
    }

    pub fn with_config(db: PgPool, auth_config: AuthConfig) -> Self {
        let jwt_service = JwtService::new(&auth_config);
        Self {
            db,
            auth_config,
            jwt_service,
        }
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth_config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}

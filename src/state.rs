use std::sync::Arc;

use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::jwt::JwtConfig;
use crate::modules::students::service::{PgStudentStore, StudentStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StudentStore>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

pub async fn init_app_state() -> AppState {
    AppState {
        store: Arc::new(PgStudentStore::new(init_db_pool().await)),
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
    }
}

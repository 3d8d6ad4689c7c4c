use axum::extract::FromRef;
use migration::MigratorTrait;
use sea_orm::prelude::*;

use crate::db::{self, DatabaseConfig};


#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub async fn new(db_url: &str) -> AppState {
        let db = db::set_up_db(
            DatabaseConfig::new(db_url.into())
        ).await.expect("Failed to set up database");
        migration::Migrator::up(&db, None).await.expect("Failed to run migrations");
        AppState { db }
    }

    pub async fn new_with_db(db: DatabaseConnection) -> AppState {
        migration::Migrator::up(&db, None).await.expect("Failed to run migrations");
        AppState { db }
    }

    pub async fn new_test_app() -> AppState {
        Self::new("sqlite::memory:").await
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(app_state: &AppState) -> DatabaseConnection {
        app_state.db.clone()
    }
}

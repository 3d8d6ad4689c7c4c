use sea_orm::{prelude::*, Database, Statement};

pub struct DatabaseConfig {
    url: String,
}

impl DatabaseConfig {
    pub fn new(url: String) -> DatabaseConfig {
        DatabaseConfig { url }
    }
}

/// Connects to the store. On sqlite, foreign key enforcement is off by
/// default and the membership cascade depends on it.
pub async fn set_up_db(config: DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.url.clone()).await?;

    match &db {
        DatabaseConnection::SqlxSqlitePoolConnection(_) => {
            db.execute(Statement::from_sql_and_values(
                db.get_database_backend(),
                "PRAGMA foreign_keys = ON;",
                vec![])
            ).await?;
        },
        _ => {}
    }

    Ok(db)
}

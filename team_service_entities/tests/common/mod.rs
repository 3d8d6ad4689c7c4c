use migration::MigratorTrait;
use sea_orm::{prelude::*, ActiveValue, Database, Statement};

/// An in-memory database with the full schema. With `with_mock_env`, two
/// tournaments (uuids 1 and 2) and five profiles (uuids 100–104, emails
/// `player<n>@example.com`) are seeded so foreign keys resolve.
pub async fn set_up_db(with_mock_env: bool) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    migration::Migrator::up(&db, None).await.unwrap();
    let _r = db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON;",
        vec![])
    ).await?;

    if with_mock_env {
        team_service_entities::schema::tournament::Entity::insert_many(vec![
            team_service_entities::schema::tournament::ActiveModel {
                uuid: ActiveValue::Set(Uuid::from_u128(1)),
                name: ActiveValue::Set("Spring Open".into()),
                status: ActiveValue::Set("open".into()),
                start_date: ActiveValue::Set(None),
            },
            team_service_entities::schema::tournament::ActiveModel {
                uuid: ActiveValue::Set(Uuid::from_u128(2)),
                name: ActiveValue::Set("Autumn Open".into()),
                status: ActiveValue::Set("open".into()),
                start_date: ActiveValue::Set(None),
            },
        ]).exec(&db).await?;

        let now = chrono::Utc::now().naive_utc();
        let profiles = (100u128..=104)
            .map(|n| team_service_entities::schema::profile::ActiveModel {
                uuid: ActiveValue::Set(Uuid::from_u128(n)),
                email: ActiveValue::Set(format!("player{}@example.com", n)),
                display_name: ActiveValue::Set(format!("Player {}", n)),
                first_name: ActiveValue::Set(Some("Player".into())),
                last_name: ActiveValue::Set(Some(format!("{}", n))),
                created_at: ActiveValue::Set(now),
            })
            .collect::<Vec<_>>();
        team_service_entities::schema::profile::Entity::insert_many(profiles).exec(&db).await?;
    }
    Ok(db)
}

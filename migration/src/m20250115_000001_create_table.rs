use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250115_000001_create_table"
    }
}


#[derive(Iden)]
pub enum Tournament {
    Table,
    Uuid,
    Name,
    Status,
    StartDate,
}


#[derive(Iden)]
pub enum Profile {
    Table,
    Uuid,
    Email,
    DisplayName,
    FirstName,
    LastName,
    CreatedAt,
}


#[derive(Iden)]
pub enum Team {
    Table,
    Uuid,
    Name,
    Description,
    TournamentId,
    CaptainId,
    ContactEmail,
    ContactPhone,
    Status,
    SkillLevel,
    Notes,
    CreatedAt,
    UpdatedAt,
}


#[derive(Iden)]
pub enum TeamMember {
    Table,
    TeamId,
    UserId,
    Role,
    Position,
    Status,
    JoinedAt,
}


#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {

        manager
        .create_table(
            sea_query::Table::create()
                .table(Tournament::Table)
                .if_not_exists()
                .col(ColumnDef::new(Tournament::Uuid).uuid().not_null().primary_key())
                .col(ColumnDef::new(Tournament::Name).string().not_null())
                .col(ColumnDef::new(Tournament::Status).string().not_null())
                .col(ColumnDef::new(Tournament::StartDate).date_time())
                .to_owned()
        ).await?;

        manager
        .create_table(
            sea_query::Table::create()
                .table(Profile::Table)
                .if_not_exists()
                .col(ColumnDef::new(Profile::Uuid).uuid().not_null().primary_key())
                .col(ColumnDef::new(Profile::Email).string().not_null().unique_key())
                .col(ColumnDef::new(Profile::DisplayName).string().not_null())
                .col(ColumnDef::new(Profile::FirstName).string())
                .col(ColumnDef::new(Profile::LastName).string())
                .col(ColumnDef::new(Profile::CreatedAt).date_time().not_null())
                .to_owned()
        ).await?;

        manager
        .create_table(
            sea_query::Table::create()
                .table(Team::Table)
                .if_not_exists()
                .col(ColumnDef::new(Team::Uuid).uuid().not_null().primary_key())
                .col(ColumnDef::new(Team::Name).string_len(255).not_null())
                .col(ColumnDef::new(Team::Description).text())
                .col(ColumnDef::new(Team::TournamentId).uuid().not_null())
                .col(ColumnDef::new(Team::CaptainId).uuid().not_null())
                .col(ColumnDef::new(Team::ContactEmail).string())
                .col(ColumnDef::new(Team::ContactPhone).string_len(20))
                .col(ColumnDef::new(Team::Status).string().not_null())
                .col(ColumnDef::new(Team::SkillLevel).string().not_null())
                .col(ColumnDef::new(Team::Notes).text())
                .col(ColumnDef::new(Team::CreatedAt).date_time().not_null())
                .col(ColumnDef::new(Team::UpdatedAt).date_time().not_null())
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-team-tournament")
                        .from_tbl(Team::Table)
                        .from_col(Team::TournamentId)
                        .to_tbl(Tournament::Table)
                        .to_col(Tournament::Uuid)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-team-captain")
                        .from_tbl(Team::Table)
                        .from_col(Team::CaptainId)
                        .to_tbl(Profile::Table)
                        .to_col(Profile::Uuid)
                        .on_delete(ForeignKeyAction::Restrict)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            IndexCreateStatement::new()
            .name("idx-team-tournament-id")
            .table(Team::Table)
            .col(Team::TournamentId)
            .to_owned()
        ).await?;

        // One name per tournament, enforced by the store.
        manager.create_index(
            IndexCreateStatement::new()
            .name("idx-team-tournament-name")
            .table(Team::Table)
            .col(Team::TournamentId)
            .col(Team::Name)
            .unique()
            .to_owned()
        ).await?;

        manager
        .create_table(
            sea_query::Table::create()
                .table(TeamMember::Table)
                .if_not_exists()
                .col(ColumnDef::new(TeamMember::TeamId).uuid().not_null())
                .col(ColumnDef::new(TeamMember::UserId).uuid().not_null())
                .col(ColumnDef::new(TeamMember::Role).string().not_null())
                .col(ColumnDef::new(TeamMember::Position).string())
                .col(ColumnDef::new(TeamMember::Status).string().not_null())
                .col(ColumnDef::new(TeamMember::JoinedAt).date_time().not_null())
                .primary_key(
                    Index::create()
                        .name("pk-team_member")
                        .col(TeamMember::TeamId)
                        .col(TeamMember::UserId)
                        .primary(),
                )
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-team_member-team")
                        .from_tbl(TeamMember::Table)
                        .from_col(TeamMember::TeamId)
                        .to_tbl(Team::Table)
                        .to_col(Team::Uuid)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-team_member-profile")
                        .from_tbl(TeamMember::Table)
                        .from_col(TeamMember::UserId)
                        .to_tbl(Profile::Table)
                        .to_col(Profile::Uuid)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            IndexCreateStatement::new()
            .name("idx-team_member-user_id")
            .table(TeamMember::Table)
            .col(TeamMember::UserId)
            .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(sea_query::Table::drop().table(TeamMember::Table).to_owned()).await?;
        manager.drop_table(sea_query::Table::drop().table(Team::Table).to_owned()).await?;
        manager.drop_table(sea_query::Table::drop().table(Profile::Table).to_owned()).await?;
        manager.drop_table(sea_query::Table::drop().table(Tournament::Table).to_owned()).await?;
        Ok(())
    }
}

use std::collections::HashMap;

use itertools::Itertools;
use sea_orm::prelude::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveValue, IntoActiveModel, PaginatorTrait, QueryOrder, QuerySelect, TransactionTrait};
use serde::{Serialize, Deserialize};

use crate::schema;

use super::member::{TeamMember, MEMBER_STATUS_ACTIVE};
use super::{decode_enum, validate_team_fields, DomainError, MemberRole, SkillLevel, TeamStatus};


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Team {
    pub uuid: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub tournament_id: Uuid,
    pub captain_id: Uuid,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub status: TeamStatus,
    pub skill_level: SkillLevel,
    pub notes: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// A team with its ordered roster and the minimal slice of its tournament.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct TeamWithRoster {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMember>,
    pub member_count: usize,
    pub tournament: Option<TournamentSummary>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct TournamentSummary {
    pub uuid: Uuid,
    pub name: String,
    pub status: String,
    pub start_date: Option<DateTime>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct NewTeam {
    pub name: String,
    pub description: Option<String>,
    pub tournament_id: Uuid,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub skill_level: SkillLevel,
    pub notes: Option<String>,
    pub captain_position: Option<String>,
}

impl NewTeam {
    pub fn new(name: String, tournament_id: Uuid) -> Self {
        NewTeam {
            name,
            description: None,
            tournament_id,
            contact_email: None,
            contact_phone: None,
            skill_level: SkillLevel::default(),
            notes: None,
            captain_position: None,
        }
    }
}

/// Partial update: a field is changed exactly when it is present.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Default)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub status: Option<TeamStatus>,
    pub skill_level: Option<SkillLevel>,
    pub notes: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Default)]
pub struct TeamFilters {
    pub name: Option<String>,
    pub status: Option<TeamStatus>,
    pub tournament_id: Option<Uuid>,
    pub skill_level: Option<SkillLevel>,
}

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 50;

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { page: 1, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl Pagination {
    pub fn clamped(self) -> Pagination {
        Pagination {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct TeamPage {
    pub teams: Vec<TeamWithRoster>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}


impl Team {
    pub fn from_model(model: schema::team::Model) -> Result<Team, DomainError> {
        Ok(Team {
            uuid: model.uuid,
            name: model.name,
            description: model.description,
            tournament_id: model.tournament_id,
            captain_id: model.captain_id,
            contact_email: model.contact_email,
            contact_phone: model.contact_phone,
            status: decode_enum(TeamStatus::parse, &model.status, "team status")?,
            skill_level: decode_enum(SkillLevel::parse, &model.skill_level, "skill level")?,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    /// Creates the team together with its captain membership as one unit:
    /// either both rows exist afterwards or neither does.
    pub async fn create<C>(db: &C, captain_id: Uuid, data: NewTeam) -> Result<TeamWithRoster, DomainError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let errors = validate_team_fields(
            Some(&data.name),
            data.contact_email.as_deref(),
            data.contact_phone.as_deref(),
        );
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        let now = chrono::Utc::now().naive_utc();
        let team_uuid = Uuid::new_v4();

        let txn = db.begin().await?;

        schema::team::ActiveModel {
            uuid: ActiveValue::Set(team_uuid),
            name: ActiveValue::Set(data.name.trim().to_string()),
            description: ActiveValue::Set(data.description),
            tournament_id: ActiveValue::Set(data.tournament_id),
            captain_id: ActiveValue::Set(captain_id),
            contact_email: ActiveValue::Set(data.contact_email),
            contact_phone: ActiveValue::Set(data.contact_phone),
            status: ActiveValue::Set(TeamStatus::Registered.as_str().to_string()),
            skill_level: ActiveValue::Set(data.skill_level.as_str().to_string()),
            notes: ActiveValue::Set(data.notes),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| DomainError::classify_write(e, DomainError::DuplicateName))?;

        schema::team_member::ActiveModel {
            team_id: ActiveValue::Set(team_uuid),
            user_id: ActiveValue::Set(captain_id),
            role: ActiveValue::Set(MemberRole::Captain.as_str().to_string()),
            position: ActiveValue::Set(data.captain_position),
            status: ActiveValue::Set(MEMBER_STATUS_ACTIVE.to_string()),
            joined_at: ActiveValue::Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| DomainError::classify_write(e, DomainError::DuplicateMembership))?;

        txn.commit().await?;

        Self::get(db, team_uuid).await
    }

    pub async fn get<C>(db: &C, uuid: Uuid) -> Result<TeamWithRoster, DomainError>
    where
        C: ConnectionTrait,
    {
        let model = schema::team::Entity::find_by_id(uuid)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound)?;
        let mut teams = Self::attach_rosters(db, vec![model]).await?;
        teams.pop().ok_or(DomainError::NotFound)
    }

    pub async fn update<C>(db: &C, uuid: Uuid, update: TeamUpdate) -> Result<TeamWithRoster, DomainError>
    where
        C: ConnectionTrait,
    {
        let errors = validate_team_fields(
            update.name.as_deref(),
            update.contact_email.as_deref(),
            update.contact_phone.as_deref(),
        );
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        let model = schema::team::Entity::find_by_id(uuid)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound)?;
        let mut active = model.into_active_model();

        if let Some(name) = update.name {
            active.name = ActiveValue::Set(name.trim().to_string());
        }
        if let Some(description) = update.description {
            active.description = ActiveValue::Set(Some(description));
        }
        if let Some(contact_email) = update.contact_email {
            active.contact_email = ActiveValue::Set(Some(contact_email));
        }
        if let Some(contact_phone) = update.contact_phone {
            active.contact_phone = ActiveValue::Set(Some(contact_phone));
        }
        if let Some(status) = update.status {
            active.status = ActiveValue::Set(status.as_str().to_string());
        }
        if let Some(skill_level) = update.skill_level {
            active.skill_level = ActiveValue::Set(skill_level.as_str().to_string());
        }
        if let Some(notes) = update.notes {
            active.notes = ActiveValue::Set(Some(notes));
        }
        // Refreshed even when nothing else changed.
        active.updated_at = ActiveValue::Set(chrono::Utc::now().naive_utc());

        active
            .update(db)
            .await
            .map_err(|e| DomainError::classify_write(e, DomainError::DuplicateName))?;

        Self::get(db, uuid).await
    }

    /// The store cascades membership deletion.
    pub async fn delete<C>(db: &C, uuid: Uuid) -> Result<(), DomainError>
    where
        C: ConnectionTrait,
    {
        let result = schema::team::Entity::delete_by_id(uuid).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    pub async fn list<C>(db: &C, filters: TeamFilters, pagination: Pagination) -> Result<TeamPage, DomainError>
    where
        C: ConnectionTrait,
    {
        let Pagination { page, limit } = pagination.clamped();

        let mut query = schema::team::Entity::find();
        if let Some(name) = &filters.name {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((schema::team::Entity, schema::team::Column::Name))))
                    .like(format!("%{}%", name.to_lowercase())),
            );
        }
        if let Some(status) = filters.status {
            query = query.filter(schema::team::Column::Status.eq(status.as_str()));
        }
        if let Some(tournament_id) = filters.tournament_id {
            query = query.filter(schema::team::Column::TournamentId.eq(tournament_id));
        }
        if let Some(skill_level) = filters.skill_level {
            query = query.filter(schema::team::Column::SkillLevel.eq(skill_level.as_str()));
        }

        let total = query.clone().count(db).await?;
        let models = query
            .order_by_desc(schema::team::Column::CreatedAt)
            .offset((page - 1) * limit)
            .limit(limit)
            .all(db)
            .await?;
        let teams = Self::attach_rosters(db, models).await?;

        Ok(TeamPage {
            teams,
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        })
    }

    /// Registration order: oldest first.
    pub async fn get_all_in_tournament<C>(db: &C, tournament_id: Uuid) -> Result<Vec<TeamWithRoster>, DomainError>
    where
        C: ConnectionTrait,
    {
        let models = schema::team::Entity::find()
            .filter(schema::team::Column::TournamentId.eq(tournament_id))
            .order_by_asc(schema::team::Column::CreatedAt)
            .all(db)
            .await?;
        Self::attach_rosters(db, models).await
    }

    /// Updates the captain reference only. Membership consistency stays with
    /// the caller.
    pub async fn set_captain<C>(db: &C, team_id: Uuid, user_id: Uuid) -> Result<TeamWithRoster, DomainError>
    where
        C: ConnectionTrait,
    {
        let model = schema::team::Entity::find_by_id(team_id)
            .one(db)
            .await?
            .ok_or(DomainError::NotFound)?;
        let mut active = model.into_active_model();
        active.captain_id = ActiveValue::Set(user_id);
        active.updated_at = ActiveValue::Set(chrono::Utc::now().naive_utc());
        active
            .update(db)
            .await
            .map_err(|e| DomainError::classify_write(e, DomainError::InvalidReference))?;

        Self::get(db, team_id).await
    }

    /// Removes every team of a tournament together with every membership, in
    /// one transaction. The existence and non-emptiness checks run inside the
    /// same transaction as the deletes. Returns the number of teams removed.
    pub async fn delete_all_in_tournament<C>(db: &C, tournament_id: Uuid) -> Result<u64, DomainError>
    where
        C: TransactionTrait,
    {
        let txn = db.begin().await?;

        let tournament = schema::tournament::Entity::find_by_id(tournament_id)
            .one(&txn)
            .await?;
        if tournament.is_none() {
            return Err(DomainError::TournamentNotFound);
        }

        let team_ids: Vec<Uuid> = schema::team::Entity::find()
            .filter(schema::team::Column::TournamentId.eq(tournament_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|t| t.uuid)
            .collect();
        if team_ids.is_empty() {
            return Err(DomainError::NoTeamsFound);
        }

        schema::team_member::Entity::delete_many()
            .filter(schema::team_member::Column::TeamId.is_in(team_ids))
            .exec(&txn)
            .await?;
        let deleted = schema::team::Entity::delete_many()
            .filter(schema::team::Column::TournamentId.eq(tournament_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(deleted.rows_affected)
    }

    /// Loads rosters, member profiles and tournament summaries for a batch of
    /// team rows in three queries, preserving the order of `models`.
    async fn attach_rosters<C>(db: &C, models: Vec<schema::team::Model>) -> Result<Vec<TeamWithRoster>, DomainError>
    where
        C: ConnectionTrait,
    {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let team_ids = models.iter().map(|m| m.uuid).collect_vec();
        let members = schema::team_member::Entity::find()
            .filter(schema::team_member::Column::TeamId.is_in(team_ids))
            .order_by_asc(schema::team_member::Column::Role)
            .order_by_asc(schema::team_member::Column::JoinedAt)
            .all(db)
            .await?;

        let profile_ids = members.iter().map(|m| m.user_id).unique().collect_vec();
        let profiles: HashMap<Uuid, _> = schema::profile::Entity::find()
            .filter(schema::profile::Column::Uuid.is_in(profile_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.uuid, super::profile::ProfileSummary::from_model(p)))
            .collect();

        let tournament_ids = models.iter().map(|m| m.tournament_id).unique().collect_vec();
        let tournaments: HashMap<Uuid, TournamentSummary> = schema::tournament::Entity::find()
            .filter(schema::tournament::Column::Uuid.is_in(tournament_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|t| {
                (
                    t.uuid,
                    TournamentSummary {
                        uuid: t.uuid,
                        name: t.name,
                        status: t.status,
                        start_date: t.start_date,
                    },
                )
            })
            .collect();

        let mut members_by_team: HashMap<Uuid, Vec<TeamMember>> = HashMap::new();
        for member in members {
            let profile = profiles.get(&member.user_id).cloned();
            members_by_team
                .entry(member.team_id)
                .or_default()
                .push(TeamMember::from_model(member, profile)?);
        }

        models
            .into_iter()
            .map(|model| {
                let tournament = tournaments.get(&model.tournament_id).cloned();
                let team = Team::from_model(model)?;
                let members = members_by_team.remove(&team.uuid).unwrap_or_default();
                Ok(TeamWithRoster {
                    member_count: members.len(),
                    members,
                    tournament,
                    team,
                })
            })
            .collect()
    }
}

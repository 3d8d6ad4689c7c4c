use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use sea_orm::prelude::*;
use sea_orm::{ActiveValue, QueryOrder};
use serde::{Serialize, Deserialize};

use crate::schema;

use super::{decode_enum, DomainError, MemberRole};

pub const MEMBER_STATUS_ACTIVE: &str = "active";


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct TeamMember {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub position: Option<String>,
    pub status: String,
    pub joined_at: DateTime,
    pub profile: Option<super::profile::ProfileSummary>,
}

/// One row of a batch insert.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct NewMember {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default)]
    pub position: Option<String>,
}

impl TeamMember {
    pub(crate) fn from_model(
        model: schema::team_member::Model,
        profile: Option<super::profile::ProfileSummary>,
    ) -> Result<Self, DomainError> {
        Ok(TeamMember {
            team_id: model.team_id,
            user_id: model.user_id,
            role: decode_enum(MemberRole::parse, &model.role, "member role")?,
            position: model.position,
            status: model.status,
            joined_at: model.joined_at,
            profile,
        })
    }

    pub async fn add<C>(
        db: &C,
        team_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
        position: Option<String>,
    ) -> Result<TeamMember, DomainError>
    where
        C: ConnectionTrait,
    {
        let model = schema::team_member::ActiveModel {
            team_id: ActiveValue::Set(team_id),
            user_id: ActiveValue::Set(user_id),
            role: ActiveValue::Set(role.as_str().to_string()),
            position: ActiveValue::Set(position),
            status: ActiveValue::Set(MEMBER_STATUS_ACTIVE.to_string()),
            joined_at: ActiveValue::Set(chrono::Utc::now().naive_utc()),
        }
        .insert(db)
        .await
        .map_err(|e| DomainError::classify_write(e, DomainError::DuplicateMembership))?;

        let profile = schema::profile::Entity::find_by_id(user_id).one(db).await?;
        Self::from_model(model, profile.map(super::profile::ProfileSummary::from_model))
    }

    /// Batch insert for one team. A single insert statement, so the store
    /// keeps it all-or-nothing; a duplicate user within the batch is rejected
    /// before the store is touched at all.
    pub async fn add_many<C>(
        db: &C,
        team_id: Uuid,
        players: Vec<NewMember>,
    ) -> Result<Vec<TeamMember>, DomainError>
    where
        C: ConnectionTrait,
    {
        if players.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        if players.iter().any(|p| !seen.insert(p.user_id)) {
            return Err(DomainError::DuplicateMembership);
        }

        let now = chrono::Utc::now().naive_utc();
        let rows = players
            .iter()
            .map(|p| schema::team_member::ActiveModel {
                team_id: ActiveValue::Set(team_id),
                user_id: ActiveValue::Set(p.user_id),
                role: ActiveValue::Set(p.role.as_str().to_string()),
                position: ActiveValue::Set(p.position.clone()),
                status: ActiveValue::Set(MEMBER_STATUS_ACTIVE.to_string()),
                joined_at: ActiveValue::Set(now),
            })
            .collect_vec();

        schema::team_member::Entity::insert_many(rows)
            .exec(db)
            .await
            .map_err(|e| DomainError::classify_write(e, DomainError::DuplicateMembership))?;

        let user_ids = players.iter().map(|p| p.user_id).collect_vec();
        Self::load_with_profiles(db, team_id, Some(user_ids)).await
    }

    pub async fn remove<C>(db: &C, team_id: Uuid, user_id: Uuid) -> Result<(), DomainError>
    where
        C: ConnectionTrait,
    {
        let result = schema::team_member::Entity::delete_by_id((team_id, user_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    /// Roster order: captains before players, then by join time.
    pub async fn get_all_in_team<C>(db: &C, team_id: Uuid) -> Result<Vec<TeamMember>, DomainError>
    where
        C: ConnectionTrait,
    {
        Self::load_with_profiles(db, team_id, None).await
    }

    async fn load_with_profiles<C>(
        db: &C,
        team_id: Uuid,
        only_users: Option<Vec<Uuid>>,
    ) -> Result<Vec<TeamMember>, DomainError>
    where
        C: ConnectionTrait,
    {
        let mut query = schema::team_member::Entity::find()
            .filter(schema::team_member::Column::TeamId.eq(team_id));
        if let Some(users) = only_users {
            query = query.filter(schema::team_member::Column::UserId.is_in(users));
        }
        let members = query
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

        members
            .into_iter()
            .map(|m| {
                let profile = profiles.get(&m.user_id).cloned();
                Self::from_model(m, profile)
            })
            .collect()
    }
}

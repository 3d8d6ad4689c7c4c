use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post, routing::delete};
use sea_orm::DatabaseConnection;
use sea_orm::prelude::Uuid;
use serde::{Serialize, Deserialize};

use team_service_entities::domain::member::{NewMember, TeamMember};
use team_service_entities::domain::MemberRole;

use crate::response::{APIError, MessageResponse};
use crate::state::AppState;


fn parse_role(value: Option<&str>) -> Result<MemberRole, APIError> {
    match value {
        None => Ok(MemberRole::default()),
        Some(value) => MemberRole::parse(value).ok_or_else(|| {
            APIError::from((
                StatusCode::BAD_REQUEST,
                format!("Invalid role. Allowed roles: {}", MemberRole::ALLOWED.join(", ")),
            ))
        }),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

pub async fn add_member_handler(
    State(db): State<DatabaseConnection>,
    Path(team_id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<TeamMember>), APIError> {
    let role = parse_role(request.role.as_deref())?;
    let member = TeamMember::add(&db, team_id, request.user_id, role, request.position).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddMembersRequest {
    pub players: Vec<AddMemberRequest>,
}

pub async fn add_members_handler(
    State(db): State<DatabaseConnection>,
    Path(team_id): Path<Uuid>,
    Json(request): Json<AddMembersRequest>,
) -> Result<(StatusCode, Json<Vec<TeamMember>>), APIError> {
    if request.players.is_empty() {
        return Err(APIError::from((StatusCode::BAD_REQUEST, "At least one player is required")));
    }

    let players = request
        .players
        .into_iter()
        .map(|p| {
            Ok(NewMember {
                user_id: p.user_id,
                role: parse_role(p.role.as_deref())?,
                position: p.position,
            })
        })
        .collect::<Result<Vec<_>, APIError>>()?;

    let members = TeamMember::add_many(&db, team_id, players).await?;
    Ok((StatusCode::CREATED, Json(members)))
}

pub async fn remove_member_handler(
    State(db): State<DatabaseConnection>,
    Path((team_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, APIError> {
    TeamMember::remove(&db, team_id, user_id).await?;
    Ok(Json(MessageResponse::new("Member removed successfully")))
}

pub async fn get_team_members_handler(
    State(db): State<DatabaseConnection>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<Vec<TeamMember>>, APIError> {
    let members = TeamMember::get_all_in_team(&db, team_id).await?;
    Ok(Json(members))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/teams/:team_id/members",
            get(get_team_members_handler).post(add_member_handler),
        )
        .route("/teams/:team_id/members/bulk", post(add_members_handler))
        .route("/teams/:team_id/members/:user_id", delete(remove_member_handler))
}

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use sea_orm::DatabaseConnection;
use sea_orm::prelude::Uuid;
use serde::{Serialize, Deserialize};

use team_service_entities::domain::team::{
    NewTeam, Pagination, Team, TeamFilters, TeamPage, TeamUpdate, TeamWithRoster, DEFAULT_PAGE_LIMIT,
};
use team_service_entities::domain::{SkillLevel, TeamStatus};

use crate::response::{APIError, MessageResponse};
use crate::state::AppState;


#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    pub captain_id: Uuid,
    pub name: String,
    pub tournament_id: Uuid,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub skill_level: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub captain_position: Option<String>,
}

pub(crate) fn parse_status(value: &str) -> Result<TeamStatus, APIError> {
    TeamStatus::parse(value).ok_or_else(|| {
        APIError::from((
            StatusCode::BAD_REQUEST,
            format!("Invalid status. Allowed statuses: {}", TeamStatus::ALLOWED.join(", ")),
        ))
    })
}

pub(crate) fn parse_skill_level(value: &str) -> Result<SkillLevel, APIError> {
    SkillLevel::parse(value).ok_or_else(|| {
        APIError::from((
            StatusCode::BAD_REQUEST,
            format!("Invalid skill level. Allowed levels: {}", SkillLevel::ALLOWED.join(", ")),
        ))
    })
}

pub async fn create_team_handler(
    State(db): State<DatabaseConnection>,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamWithRoster>), APIError> {
    let skill_level = match request.skill_level.as_deref() {
        Some(value) => parse_skill_level(value)?,
        None => SkillLevel::default(),
    };

    let team = Team::create(
        &db,
        request.captain_id,
        NewTeam {
            name: request.name,
            description: request.description,
            tournament_id: request.tournament_id,
            contact_email: request.contact_email,
            contact_phone: request.contact_phone,
            skill_level,
            notes: request.notes,
            captain_position: request.captain_position,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn get_team_handler(
    State(db): State<DatabaseConnection>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<TeamWithRoster>, APIError> {
    let team = Team::get(&db, team_id).await?;
    Ok(Json(team))
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTeamRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub skill_level: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn update_team_handler(
    State(db): State<DatabaseConnection>,
    Path(team_id): Path<Uuid>,
    Json(request): Json<UpdateTeamRequest>,
) -> Result<Json<TeamWithRoster>, APIError> {
    let status = request.status.as_deref().map(parse_status).transpose()?;
    let skill_level = request.skill_level.as_deref().map(parse_skill_level).transpose()?;

    let team = Team::update(
        &db,
        team_id,
        TeamUpdate {
            name: request.name,
            description: request.description,
            contact_email: request.contact_email,
            contact_phone: request.contact_phone,
            status,
            skill_level,
            notes: request.notes,
        },
    )
    .await?;

    Ok(Json(team))
}

pub async fn delete_team_handler(
    State(db): State<DatabaseConnection>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, APIError> {
    Team::delete(&db, team_id).await?;
    Ok(Json(MessageResponse::new("Team deleted successfully")))
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListTeamsQuery {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tournament_id: Option<Uuid>,
    #[serde(default)]
    pub skill_level: Option<String>,
}

pub async fn list_teams_handler(
    State(db): State<DatabaseConnection>,
    Query(query): Query<ListTeamsQuery>,
) -> Result<Json<TeamPage>, APIError> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let skill_level = query.skill_level.as_deref().map(parse_skill_level).transpose()?;

    let page = Team::list(
        &db,
        TeamFilters {
            name: query.name,
            status,
            tournament_id: query.tournament_id,
            skill_level,
        },
        Pagination {
            page: query.page.unwrap_or(1),
            limit: query.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        },
    )
    .await?;

    Ok(Json(page))
}

pub async fn get_teams_by_tournament_handler(
    State(db): State<DatabaseConnection>,
    Path(tournament_id): Path<Uuid>,
) -> Result<Json<Vec<TeamWithRoster>>, APIError> {
    let teams = Team::get_all_in_tournament(&db, tournament_id).await?;
    Ok(Json(teams))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTeamsByTournamentResponse {
    pub deleted_teams: u64,
}

pub async fn delete_teams_by_tournament_handler(
    State(db): State<DatabaseConnection>,
    Path(tournament_id): Path<Uuid>,
) -> Result<Json<DeleteTeamsByTournamentResponse>, APIError> {
    let deleted_teams = Team::delete_all_in_tournament(&db, tournament_id).await?;
    Ok(Json(DeleteTeamsByTournamentResponse { deleted_teams }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetCaptainRequest {
    pub user_id: Uuid,
}

pub async fn set_team_captain_handler(
    State(db): State<DatabaseConnection>,
    Path(team_id): Path<Uuid>,
    Json(request): Json<SetCaptainRequest>,
) -> Result<Json<TeamWithRoster>, APIError> {
    let team = Team::set_captain(&db, team_id, request.user_id).await?;
    Ok(Json(team))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/teams", post(create_team_handler).get(list_teams_handler))
        .route(
            "/teams/tournament/:tournament_id",
            get(get_teams_by_tournament_handler).delete(delete_teams_by_tournament_handler),
        )
        .route(
            "/teams/:team_id",
            get(get_team_handler).patch(update_team_handler).delete(delete_team_handler),
        )
        .route("/teams/:team_id/captain", axum::routing::patch(set_team_captain_handler))
}

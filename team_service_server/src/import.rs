use std::collections::HashMap;
use std::io::Cursor;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use calamine::{Data, Reader};
use itertools::Itertools;
use sea_orm::prelude::Uuid;
use sea_orm::{DatabaseConnection, EntityTrait, ColumnTrait, QueryFilter, TransactionTrait};
use serde::{Serialize, Deserialize};

use team_service_entities::domain::member::TeamMember;
use team_service_entities::domain::profile::Profile;
use team_service_entities::domain::team::{NewTeam, Team};
use team_service_entities::domain::{is_valid_email, MemberRole, TeamStatus};
use team_service_entities::schema;
use team_service_entities::DomainError;

use crate::response::{handle_error, APIError};
use crate::state::AppState;


pub const SUPPORTED_CONTENT_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
const REQUIRED_COLUMNS: [&str; 4] = ["Equipe", "Joueur", "Email", "Role"];


#[derive(Debug)]
pub enum ImportError {
    InvalidFile(String),
    Parse(String),
    Structure(Vec<String>),
    Domain(DomainError),
}

impl From<DomainError> for ImportError {
    fn from(err: DomainError) -> Self {
        ImportError::Domain(err)
    }
}

impl From<ImportError> for APIError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InvalidFile(message) | ImportError::Parse(message) => {
                APIError::from((StatusCode::BAD_REQUEST, message))
            }
            ImportError::Structure(errors) => APIError {
                message: "The file failed validation".to_string(),
                code: StatusCode::BAD_REQUEST,
                errors: Some(errors),
            },
            ImportError::Domain(err) => err.into(),
        }
    }
}


/// One normalized data row of the spreadsheet.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ImportRow {
    pub team_name: String,
    pub player_name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub teams_processed: usize,
    pub players_processed: usize,
    pub teams_created: usize,
    pub players_created: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CreatedTeam {
    pub id: Uuid,
    pub name: String,
    pub status: TeamStatus,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CreatedPlayer {
    pub id: Uuid,
    pub role: MemberRole,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ImportDetails {
    pub teams: Vec<CreatedTeam>,
    pub players: Vec<CreatedPlayer>,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub summary: ImportSummary,
    pub details: ImportDetails,
}


pub fn validate_upload(content_type: Option<&str>, size: usize) -> Result<(), ImportError> {
    if size == 0 {
        return Err(ImportError::InvalidFile("No file provided".to_string()));
    }
    let supported = content_type
        .map(|c| SUPPORTED_CONTENT_TYPES.contains(&c))
        .unwrap_or(false);
    if !supported {
        return Err(ImportError::InvalidFile(
            "Unsupported file format. Only Excel spreadsheets are accepted.".to_string(),
        ));
    }
    if size > MAX_FILE_SIZE {
        return Err(ImportError::InvalidFile("File too large. Maximum size: 5MB".to_string()));
    }
    Ok(())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        // Spreadsheet tools routinely store integer-looking values as floats.
        Data::Float(value) if value.fract() == 0.0 => format!("{}", *value as i64),
        other => other.to_string(),
    }
}

/// Reads the first sheet into one map per data row, keyed by the header
/// cells. Missing cells default to the empty string; rows with no content
/// at all are dropped.
pub fn parse_workbook(data: &[u8]) -> Result<Vec<HashMap<String, String>>, ImportError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| ImportError::Parse(format!("Could not read the workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::Parse("The workbook contains no sheets".to_string()))?
        .map_err(|e| ImportError::Parse(format!("Could not read the first sheet: {}", e)))?;

    if range.height() < 2 {
        return Err(ImportError::Parse(
            "The file must contain a header row and at least one data row".to_string(),
        ));
    }

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| cell_to_string(c).trim().to_string()).collect(),
        None => Vec::new(),
    };

    let data_rows = rows
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, header)| !header.is_empty())
                .map(|(index, header)| {
                    let value = row.get(index).map(cell_to_string).unwrap_or_default();
                    (header.clone(), value)
                })
                .collect::<HashMap<_, _>>()
        })
        .filter(|row| row.values().any(|value| !value.is_empty()))
        .collect_vec();

    Ok(data_rows)
}

/// Collects every structural problem at once: missing required columns and
/// per-row violations, numbered from row 2 (the header is row 1).
pub fn validate_structure(rows: &[HashMap<String, String>]) -> Vec<String> {
    let mut errors = Vec::new();

    if rows.is_empty() {
        errors.push("The file is empty or contains no data".to_string());
        return errors;
    }

    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !rows[0].contains_key(**column))
        .collect_vec();
    if !missing.is_empty() {
        errors.push(format!("Missing required columns: {}", missing.iter().join(", ")));
        errors.push(format!(
            "Available columns: {}",
            rows[0].keys().sorted().join(", ")
        ));
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = index + 2;

        let team = row.get("Equipe").map(|v| v.trim()).unwrap_or("");
        if team.is_empty() {
            errors.push(format!("Row {}: the team name is required", row_num));
        }
        let player = row.get("Joueur").map(|v| v.trim()).unwrap_or("");
        if player.is_empty() {
            errors.push(format!("Row {}: the player name is required", row_num));
        }
        let email = row.get("Email").map(|v| v.trim()).unwrap_or("");
        if email.is_empty() {
            errors.push(format!("Row {}: the email is required", row_num));
        } else if !is_valid_email(email) {
            errors.push(format!("Row {}: invalid email format ({})", row_num, email));
        }
        let role = row.get("Role").map(|v| v.trim()).unwrap_or("");
        if role.is_empty() {
            errors.push(format!("Row {}: the role is required", row_num));
        } else if !MemberRole::ALLOWED.contains(&role) {
            errors.push(format!(
                "Row {}: invalid role, must be \"captain\" or \"player\" (got: {})",
                row_num, role
            ));
        }
    }

    errors
}

pub fn normalize(rows: &[HashMap<String, String>]) -> Vec<ImportRow> {
    rows.iter()
        .map(|row| {
            let field = |name: &str| row.get(name).map(|v| v.trim().to_string()).unwrap_or_default();
            ImportRow {
                team_name: field("Equipe"),
                player_name: field("Joueur"),
                email: field("Email").to_lowercase(),
                role: field("Role"),
            }
        })
        .collect()
}

/// Partitions rows by team name, keeping the first-seen team order and the
/// row order within each team.
pub fn group_by_team(rows: Vec<ImportRow>) -> Vec<(String, Vec<ImportRow>)> {
    let mut order = Vec::new();
    let mut groups: HashMap<String, Vec<ImportRow>> = HashMap::new();
    for row in rows {
        if !groups.contains_key(&row.team_name) {
            order.push(row.team_name.clone());
        }
        groups.entry(row.team_name.clone()).or_default().push(row);
    }
    order
        .into_iter()
        .map(|name| {
            let rows = groups.remove(&name).unwrap_or_default();
            (name, rows)
        })
        .collect()
}

fn map_role(value: &str) -> MemberRole {
    match value.to_lowercase().as_str() {
        "capitaine" | "captain" => MemberRole::Captain,
        _ => MemberRole::Player,
    }
}

/// Drives the domain operations for a validated, normalized batch. The whole
/// batch runs in one transaction, so a failure on any team leaves the store
/// untouched. Existing teams are resolved by name, existing profiles by
/// email, and existing memberships are left as they are.
pub async fn materialize(
    db: &DatabaseConnection,
    tournament_id: Uuid,
    rows: Vec<ImportRow>,
) -> Result<ImportReport, ImportError> {
    let txn = db.begin().await.map_err(DomainError::from)?;

    let tournament = schema::tournament::Entity::find_by_id(tournament_id)
        .one(&txn)
        .await
        .map_err(DomainError::from)?;
    if tournament.is_none() {
        return Err(ImportError::Domain(DomainError::TournamentNotFound));
    }

    let total_rows = rows.len();
    let groups = group_by_team(rows);
    let teams_processed = groups.len();

    let mut teams_created = Vec::new();
    let mut players_created = Vec::new();
    let mut players_processed = 0;

    for (team_name, group_rows) in groups {
        let existing = schema::team::Entity::find()
            .filter(schema::team::Column::TournamentId.eq(tournament_id))
            .filter(schema::team::Column::Name.eq(team_name.clone()))
            .one(&txn)
            .await
            .map_err(DomainError::from)?;

        let team_id = match existing {
            Some(model) => model.uuid,
            None => {
                let captain_row = group_rows
                    .iter()
                    .find(|row| map_role(&row.role) == MemberRole::Captain)
                    .or_else(|| group_rows.first());
                let captain_row = match captain_row {
                    Some(row) => row,
                    None => continue,
                };

                let (captain, created) =
                    Profile::find_or_create_by_email(&txn, &captain_row.email, &captain_row.player_name).await?;
                if created {
                    players_created.push(CreatedPlayer { id: captain.uuid, role: map_role(&captain_row.role) });
                }

                let team = Team::create(&txn, captain.uuid, NewTeam::new(team_name.clone(), tournament_id)).await?;
                teams_created.push(CreatedTeam {
                    id: team.team.uuid,
                    name: team.team.name.clone(),
                    status: team.team.status,
                });
                team.team.uuid
            }
        };

        for row in &group_rows {
            players_processed += 1;

            let (profile, created) = Profile::find_or_create_by_email(&txn, &row.email, &row.player_name).await?;
            if created {
                players_created.push(CreatedPlayer { id: profile.uuid, role: map_role(&row.role) });
            }

            let membership = schema::team_member::Entity::find_by_id((team_id, profile.uuid))
                .one(&txn)
                .await
                .map_err(DomainError::from)?;
            if membership.is_none() {
                TeamMember::add(&txn, team_id, profile.uuid, map_role(&row.role), None).await?;
            }
        }
    }

    txn.commit().await.map_err(DomainError::from)?;

    Ok(ImportReport {
        summary: ImportSummary {
            total_rows,
            teams_processed,
            players_processed,
            teams_created: teams_created.len(),
            players_created: players_created.len(),
            errors: Vec::new(),
        },
        details: ImportDetails { teams: teams_created, players: players_created },
    })
}

/// The full pipeline: upload checks and parsing and validation run without
/// side effects; only a fully valid batch reaches the store.
pub async fn run_import(
    db: &DatabaseConnection,
    tournament_id: Uuid,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<ImportReport, ImportError> {
    validate_upload(content_type, data.len())?;
    let raw_rows = parse_workbook(data)?;
    let errors = validate_structure(&raw_rows);
    if !errors.is_empty() {
        return Err(ImportError::Structure(errors));
    }
    let rows = normalize(&raw_rows);
    materialize(db, tournament_id, rows).await
}

pub async fn import_teams_handler(
    State(db): State<DatabaseConnection>,
    Path(tournament_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, APIError> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(handle_error)? {
        if field.name() == Some("file") {
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(handle_error)?;
            file = Some((content_type, data));
            break;
        }
    }

    let (content_type, data) = file.ok_or_else(|| APIError::from((StatusCode::BAD_REQUEST, "No file provided")))?;
    let report = run_import(&db, tournament_id, content_type.as_deref(), &data).await?;
    Ok(Json(report))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/teams/tournament/:tournament_id/import", post(import_teams_handler))
        // The upload cap is enforced by validate_upload; the transport limit
        // only needs to be above it.
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024))
}


#[cfg(test)]
mod test {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn valid_row(team: &str, player: &str, email: &str, role: &str) -> HashMap<String, String> {
        row(&[("Equipe", team), ("Joueur", player), ("Email", email), ("Role", role)])
    }

    #[test]
    fn test_validate_upload_rejects_wrong_content_type() {
        let result = validate_upload(Some("text/csv"), 100);
        assert!(matches!(result, Err(ImportError::InvalidFile(_))));

        let result = validate_upload(None, 100);
        assert!(matches!(result, Err(ImportError::InvalidFile(_))));

        for content_type in SUPPORTED_CONTENT_TYPES {
            assert!(validate_upload(Some(content_type), 100).is_ok());
        }
    }

    #[test]
    fn test_validate_upload_rejects_oversized_and_empty_files() {
        let result = validate_upload(Some(SUPPORTED_CONTENT_TYPES[0]), MAX_FILE_SIZE + 1);
        assert!(matches!(result, Err(ImportError::InvalidFile(_))));

        let result = validate_upload(Some(SUPPORTED_CONTENT_TYPES[0]), 0);
        assert!(matches!(result, Err(ImportError::InvalidFile(_))));
    }

    #[test]
    fn test_parse_workbook_rejects_garbage() {
        let result = parse_workbook(b"this is not a spreadsheet");
        assert!(matches!(result, Err(ImportError::Parse(_))));
    }

    #[test]
    fn test_validate_structure_reports_missing_columns() {
        let rows = vec![row(&[("Equipe", "Falcons"), ("Joueur", "Marie Dubois"), ("Role", "captain")])];
        let errors = validate_structure(&rows);

        assert!(errors[0].contains("Missing required columns: Email"));
        // The row itself is also flagged for the missing email value.
        assert!(errors.iter().any(|e| e.contains("Row 2")));
    }

    #[test]
    fn test_validate_structure_numbers_rows_from_two() {
        let rows = vec![
            valid_row("Falcons", "Marie Dubois", "marie@example.com", "captain"),
            valid_row("Falcons", "Paul Petit", "not-an-email", "player"),
            valid_row("Falcons", "", "ines@example.com", "player"),
        ];
        let errors = validate_structure(&rows);

        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Row 3: invalid email format (not-an-email)"));
        assert!(errors[1].contains("Row 4: the player name is required"));
    }

    #[test]
    fn test_validate_structure_rejects_unknown_roles() {
        let rows = vec![valid_row("Falcons", "Marie Dubois", "marie@example.com", "coach")];
        let errors = validate_structure(&rows);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("invalid role"));
    }

    #[test]
    fn test_validate_structure_accepts_valid_rows() {
        let rows = vec![
            valid_row("Falcons", "Marie Dubois", "marie@example.com", "captain"),
            valid_row("Hawks", "Paul Petit", "paul@example.com", "player"),
        ];
        assert!(validate_structure(&rows).is_empty());
    }

    #[test]
    fn test_normalize_trims_and_lowercases_email() {
        let rows = vec![valid_row(" Falcons ", " Marie Dubois ", " Marie@Example.COM ", " captain ")];
        let normalized = normalize(&rows);

        assert_eq!(normalized[0].team_name, "Falcons");
        assert_eq!(normalized[0].player_name, "Marie Dubois");
        assert_eq!(normalized[0].email, "marie@example.com");
        assert_eq!(normalized[0].role, "captain");
    }

    #[test]
    fn test_group_by_team_preserves_first_seen_order() {
        let rows = vec![
            ImportRow { team_name: "Hawks".into(), player_name: "A".into(), email: "a@x.com".into(), role: "captain".into() },
            ImportRow { team_name: "Falcons".into(), player_name: "B".into(), email: "b@x.com".into(), role: "captain".into() },
            ImportRow { team_name: "Hawks".into(), player_name: "C".into(), email: "c@x.com".into(), role: "player".into() },
        ];
        let groups = group_by_team(rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Hawks");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[1].player_name, "C");
        assert_eq!(groups[1].0, "Falcons");
    }

    #[test]
    fn test_map_role_accepts_french_and_english_captains() {
        assert_eq!(map_role("capitaine"), MemberRole::Captain);
        assert_eq!(map_role("Capitaine"), MemberRole::Captain);
        assert_eq!(map_role("captain"), MemberRole::Captain);
        assert_eq!(map_role("player"), MemberRole::Player);
        assert_eq!(map_role("anything"), MemberRole::Player);
    }
}

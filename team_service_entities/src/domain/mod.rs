use lazy_static::lazy_static;
use regex::Regex;
use sea_orm::{DbErr, SqlErr};
use serde::{Serialize, Deserialize};
use thiserror::Error;

pub mod team;
pub mod member;
pub mod profile;


/// Every expected business failure of the domain layer. Store faults are
/// classified at this boundary; anything the store reports that has no
/// specific meaning here collapses into `Persistence`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("not found")]
    NotFound,
    #[error("a team with this name already exists in this tournament")]
    DuplicateName,
    #[error("this user is already a member of this team")]
    DuplicateMembership,
    #[error("invalid reference to a related record")]
    InvalidReference,
    #[error("tournament not found")]
    TournamentNotFound,
    #[error("no teams found for this tournament")]
    NoTeamsFound,
    #[error(transparent)]
    Persistence(#[from] DbErr),
}

impl DomainError {
    /// Maps a write failure onto the taxonomy. Unique-constraint violations
    /// mean different things depending on the call site, so the caller names
    /// the variant; foreign-key violations always mean a dangling reference.
    pub(crate) fn classify_write(err: DbErr, on_unique: DomainError) -> DomainError {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => on_unique,
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => DomainError::InvalidReference,
            _ => match err {
                DbErr::RecordNotFound(_) => DomainError::NotFound,
                other => DomainError::Persistence(other),
            },
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    #[default]
    Registered,
    Confirmed,
    Disqualified,
    Withdrawn,
}

impl TeamStatus {
    pub const ALLOWED: [&'static str; 4] = ["registered", "confirmed", "disqualified", "withdrawn"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Registered => "registered",
            TeamStatus::Confirmed => "confirmed",
            TeamStatus::Disqualified => "disqualified",
            TeamStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(value: &str) -> Option<TeamStatus> {
        match value {
            "registered" => Some(TeamStatus::Registered),
            "confirmed" => Some(TeamStatus::Confirmed),
            "disqualified" => Some(TeamStatus::Disqualified),
            "withdrawn" => Some(TeamStatus::Withdrawn),
            _ => None,
        }
    }
}


/// Canonical skill levels. The store only ever holds these lowercase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Debutant,
    #[default]
    Amateur,
    Intermediaire,
    Confirme,
    Expert,
    Professionnel,
}

impl SkillLevel {
    pub const ALLOWED: [&'static str; 6] = [
        "debutant", "amateur", "intermediaire", "confirme", "expert", "professionnel",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Debutant => "debutant",
            SkillLevel::Amateur => "amateur",
            SkillLevel::Intermediaire => "intermediaire",
            SkillLevel::Confirme => "confirme",
            SkillLevel::Expert => "expert",
            SkillLevel::Professionnel => "professionnel",
        }
    }

    pub fn parse(value: &str) -> Option<SkillLevel> {
        match value {
            "debutant" => Some(SkillLevel::Debutant),
            "amateur" => Some(SkillLevel::Amateur),
            "intermediaire" => Some(SkillLevel::Intermediaire),
            "confirme" => Some(SkillLevel::Confirme),
            "expert" => Some(SkillLevel::Expert),
            "professionnel" => Some(SkillLevel::Professionnel),
            _ => None,
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Captain,
    #[default]
    Player,
}

impl MemberRole {
    pub const ALLOWED: [&'static str; 2] = ["captain", "player"];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Captain => "captain",
            MemberRole::Player => "player",
        }
    }

    pub fn parse(value: &str) -> Option<MemberRole> {
        match value {
            "captain" => Some(MemberRole::Captain),
            "player" => Some(MemberRole::Player),
            _ => None,
        }
    }
}


lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Field-level checks shared by team creation and update. Only supplied
/// fields are checked; the messages are collected rather than failing on
/// the first violation.
pub fn validate_team_fields(
    name: Option<&str>,
    contact_email: Option<&str>,
    contact_phone: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(name) = name {
        let length = name.trim().chars().count();
        if length < 2 {
            errors.push("Team name must be at least 2 characters long".to_string());
        }
        if length > 255 {
            errors.push("Team name cannot exceed 255 characters".to_string());
        }
    }
    if let Some(email) = contact_email {
        if !email.is_empty() && !is_valid_email(email) {
            errors.push("Contact email is not a valid email address".to_string());
        }
    }
    if let Some(phone) = contact_phone {
        if phone.chars().count() > 20 {
            errors.push("Contact phone cannot exceed 20 characters".to_string());
        }
    }

    errors
}

pub(crate) fn decode_enum<T>(
    parse: fn(&str) -> Option<T>,
    value: &str,
    what: &str,
) -> Result<T, DomainError> {
    parse(value).ok_or_else(|| {
        DomainError::Persistence(DbErr::Type(format!("unexpected {} value in store: {}", what, value)))
    })
}

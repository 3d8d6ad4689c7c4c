use sea_orm::prelude::*;
use sea_orm::ActiveValue;
use serde::{Serialize, Deserialize};

use crate::schema;

use super::DomainError;


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Profile {
    pub uuid: Uuid,
    pub email: String,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// The slice of a profile that team and roster reads expose.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct ProfileSummary {
    pub uuid: Uuid,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
}

impl ProfileSummary {
    pub fn from_model(model: schema::profile::Model) -> Self {
        ProfileSummary {
            uuid: model.uuid,
            display_name: model.display_name,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
        }
    }
}

impl Profile {
    fn from_model(model: schema::profile::Model) -> Self {
        Profile {
            uuid: model.uuid,
            email: model.email,
            display_name: model.display_name,
            first_name: model.first_name,
            last_name: model.last_name,
        }
    }

    /// Resolves a profile by its (lowercased) email, creating it when absent.
    /// The display name is the full name as given; first and last name are
    /// split on whitespace. Returns the profile and whether it was created.
    pub async fn find_or_create_by_email<C>(
        db: &C,
        email: &str,
        full_name: &str,
    ) -> Result<(Profile, bool), DomainError>
    where
        C: ConnectionTrait,
    {
        let email = email.trim().to_lowercase();

        let existing = schema::profile::Entity::find()
            .filter(schema::profile::Column::Email.eq(email.clone()))
            .one(db)
            .await?;
        if let Some(model) = existing {
            return Ok((Self::from_model(model), false));
        }

        let (first_name, last_name) = split_full_name(full_name);
        let model = schema::profile::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            email: ActiveValue::Set(email),
            display_name: ActiveValue::Set(full_name.trim().to_string()),
            first_name: ActiveValue::Set(first_name),
            last_name: ActiveValue::Set(last_name),
            created_at: ActiveValue::Set(chrono::Utc::now().naive_utc()),
        }
        .insert(db)
        .await?;

        Ok((Self::from_model(model), true))
    }
}

fn split_full_name(name: &str) -> (Option<String>, Option<String>) {
    let mut parts = name.split_whitespace();
    let first = parts.next().map(str::to_string);
    let rest = parts.collect::<Vec<_>>().join(" ");
    let last = if rest.is_empty() { None } else { Some(rest) };
    (first, last)
}

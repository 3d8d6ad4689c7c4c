use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub tournament_id: Uuid,
    pub captain_id: Uuid,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub status: String,
    pub skill_level: String,
    pub notes: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Tournament,
    Captain,
    TeamMember,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Tournament => Entity::belongs_to(super::tournament::Entity)
                .from(Column::TournamentId)
                .to(super::tournament::Column::Uuid)
                .into(),
            Self::Captain => Entity::belongs_to(super::profile::Entity)
                .from(Column::CaptainId)
                .to(super::profile::Column::Uuid)
                .into(),
            Self::TeamMember => Entity::has_many(super::team_member::Entity).into(),
        }
    }
}

impl Related<super::tournament::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tournament.def()
    }
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

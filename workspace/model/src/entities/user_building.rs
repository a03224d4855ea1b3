use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a profile is tied to a building. Nearly every authorization decision
/// in the system reduces to a lookup of this value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    #[sea_orm(string_value = "owner")]
    Owner,
    #[sea_orm(string_value = "tenant")]
    Tenant,
}

impl Relationship {
    /// Parse the wire form (`"owner"` / `"tenant"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "tenant" => Some(Self::Tenant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Tenant => "tenant",
        }
    }
}

/// Relationship ledger row: one profile, one building, one relationship
/// kind. A profile holds at most one row per building, enforced by the
/// composite primary key and re-checked at the application layer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_buildings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub profile_id: i32,
    #[sea_orm(primary_key)]
    pub building_id: i32,
    pub relationship: Relationship,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ProfileId",
        to = "super::profile::Column::Id"
    )]
    Profile,
    #[sea_orm(
        belongs_to = "super::building::Entity",
        from = "Column::BuildingId",
        to = "super::building::Column::Id"
    )]
    Building,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::building::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Building.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

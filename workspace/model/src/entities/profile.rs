use sea_orm::entity::prelude::*;

/// Contact record owned 1:1 by a user, created automatically at
/// registration. Building ties hang off the profile, not the user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::user_building::Entity")]
    UserBuilding,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

/// Many-to-many to buildings through the relationship ledger.
impl Related<super::building::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_building::Relation::Building.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::user_building::Relation::Profile.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

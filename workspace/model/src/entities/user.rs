use sea_orm::entity::prelude::*;

/// A registered account holder. Credentials are stored as an argon2 hash,
/// never in clear text.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    #[sea_orm(default_value = "false")]
    pub is_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Every user carries exactly one profile.
    #[sea_orm(has_one = "super::profile::Entity")]
    Profile,
    /// Notices authored by this user. Deleting the user is blocked while
    /// any of these still reference an existing building.
    #[sea_orm(has_many = "super::notice::Entity")]
    Notice,
    /// Comments authored by this user; their tenant reference is nulled,
    /// not cascaded, when the user goes away.
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::notice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notice.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

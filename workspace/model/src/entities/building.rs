use sea_orm::entity::prelude::*;

/// Spatial reference of the stored point (Arc 1960 / UTM zone 37S).
/// The coordinate pair is kept as two plain columns; geometry encoding is
/// handled at the API boundary.
pub const SRID: u32 = 21037;

/// A rental building with its location and letting metadata.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "buildings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub longitude: f64,
    pub latitude: f64,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))", nullable)]
    pub rent: Option<Decimal>,
    pub payment_details: Option<String>,
    pub county: Option<String>,
    pub district: Option<String>,
    pub comment: Option<String>,
    #[sea_orm(default_value = "false")]
    pub occupancy: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_building::Entity")]
    UserBuilding,
    /// Notices protect the building: it cannot be deleted while any remain.
    #[sea_orm(has_many = "super::notice::Entity")]
    Notice,
    /// Comments die with the building.
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
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

/// Many-to-many to profiles through the relationship ledger.
impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_building::Relation::Profile.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::user_building::Relation::Building.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

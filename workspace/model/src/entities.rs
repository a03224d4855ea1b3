//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the rental-property management backend
//! here: identity (user, profile), the building registry, the relationship
//! ledger tying profiles to buildings, and the building-scoped
//! announcements (notice, comment).

pub mod building;
pub mod comment;
pub mod notice;
pub mod profile;
pub mod user;
pub mod user_building;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::building::Entity as Building;
    pub use super::comment::Entity as Comment;
    pub use super::notice::Entity as Notice;
    pub use super::profile::Entity as Profile;
    pub use super::user::Entity as User;
    pub use super::user_building::Entity as UserBuilding;
}

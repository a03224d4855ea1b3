use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(boolean(Users::IsAdmin).default(false))
                    .to_owned(),
            )
            .await?;

        // Create profiles table (1:1 with users)
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(pk_auto(Profiles::Id))
                    .col(integer_uniq(Profiles::UserId))
                    .col(string_null(Profiles::Phone))
                    .col(string_null(Profiles::Address))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_user")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create buildings table
        manager
            .create_table(
                Table::create()
                    .table(Buildings::Table)
                    .if_not_exists()
                    .col(pk_auto(Buildings::Id))
                    .col(double(Buildings::Longitude))
                    .col(double(Buildings::Latitude))
                    .col(decimal_null(Buildings::Rent).decimal_len(8, 2))
                    .col(string_null(Buildings::PaymentDetails))
                    .col(string_null(Buildings::County))
                    .col(string_null(Buildings::District))
                    .col(string_null(Buildings::Comment))
                    .col(boolean(Buildings::Occupancy).default(false))
                    .col(timestamp_with_time_zone(Buildings::CreatedAt))
                    .col(timestamp_with_time_zone(Buildings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create user_buildings table (relationship ledger join table)
        manager
            .create_table(
                Table::create()
                    .table(UserBuildings::Table)
                    .if_not_exists()
                    .col(integer(UserBuildings::ProfileId))
                    .col(integer(UserBuildings::BuildingId))
                    .col(string_len(UserBuildings::Relationship, 10))
                    .primary_key(
                        Index::create()
                            .name("pk_user_buildings")
                            .col(UserBuildings::ProfileId)
                            .col(UserBuildings::BuildingId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_buildings_profile")
                            .from(UserBuildings::Table, UserBuildings::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_buildings_building")
                            .from(UserBuildings::Table, UserBuildings::BuildingId)
                            .to(Buildings::Table, Buildings::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create notices table. Both references are protective: deleting
        // the author or the building is rejected while the notice exists.
        manager
            .create_table(
                Table::create()
                    .table(Notices::Table)
                    .if_not_exists()
                    .col(pk_auto(Notices::Id))
                    .col(integer(Notices::OwnerId))
                    .col(integer(Notices::BuildingId))
                    .col(string(Notices::Notice))
                    .col(timestamp_with_time_zone(Notices::CreatedAt))
                    .col(timestamp_with_time_zone(Notices::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notice_owner")
                            .from(Notices::Table, Notices::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notice_building")
                            .from(Notices::Table, Notices::BuildingId)
                            .to(Buildings::Table, Buildings::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create comments table. Author reference is nulled on user
        // deletion; the row dies with its building.
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(pk_auto(Comments::Id))
                    .col(integer_null(Comments::TenantId))
                    .col(integer(Comments::BuildingId))
                    .col(string(Comments::Comment))
                    .col(timestamp_with_time_zone(Comments::CreatedAt))
                    .col(timestamp_with_time_zone(Comments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_tenant")
                            .from(Comments::Table, Comments::TenantId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_building")
                            .from(Comments::Table, Comments::BuildingId)
                            .to(Buildings::Table, Buildings::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserBuildings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Buildings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    IsAdmin,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    UserId,
    Phone,
    Address,
}

#[derive(DeriveIden)]
enum Buildings {
    Table,
    Id,
    Longitude,
    Latitude,
    Rent,
    PaymentDetails,
    County,
    District,
    Comment,
    Occupancy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserBuildings {
    Table,
    ProfileId,
    BuildingId,
    Relationship,
}

#[derive(DeriveIden)]
enum Notices {
    Table,
    Id,
    OwnerId,
    BuildingId,
    Notice,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    TenantId,
    BuildingId,
    Comment,
    CreatedAt,
    UpdatedAt,
}

use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{
    music_track_like, post, post_like, quiz_attempt, role, role_permission, support_ticket,
};

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &["admin", "user"];

/// Default role-permission mappings seeded on startup.
///
/// Regular users carry no permission rows: their rights come from
/// authentication plus ownership checks in the handlers.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    ("admin", "post:moderate"),
    ("admin", "support:manage"),
    ("admin", "user:manage"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync cannot express composite indexes, so they are created
/// manually on startup. The unique ones are load-bearing — they are what
/// turns a like-toggle race into a catchable constraint violation and what
/// the quiz-attempt upsert conflicts against — so their failure aborts
/// startup. The plain listing indexes only warn.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One like per (user, post) — the ledger invariant.
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_post_like_user_post")
        .table(post_like::Entity)
        .col(post_like::Column::UserId)
        .col(post_like::Column::PostId)
        .to_string(PostgresQueryBuilder);
    db.execute_unprepared(&stmt).await?;
    info!("Ensured index idx_post_like_user_post exists");

    // One like per (user, track).
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_music_like_user_track")
        .table(music_track_like::Entity)
        .col(music_track_like::Column::UserId)
        .col(music_track_like::Column::TrackId)
        .to_string(PostgresQueryBuilder);
    db.execute_unprepared(&stmt).await?;
    info!("Ensured index idx_music_like_user_track exists");

    // One attempt per (user, group); the quiz submit upserts against this.
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_quiz_attempt_user_group")
        .table(quiz_attempt::Entity)
        .col(quiz_attempt::Column::UserId)
        .col(quiz_attempt::Column::EthnicGroupId)
        .to_string(PostgresQueryBuilder);
    db.execute_unprepared(&stmt).await?;
    info!("Ensured index idx_quiz_attempt_user_group exists");

    // Public feed: WHERE status = ? ORDER BY created_at DESC.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_post_status_created")
        .table(post::Entity)
        .col(post::Column::Status)
        .col(post::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);
    if let Err(e) = db.execute_unprepared(&stmt).await {
        tracing::warn!("Failed to create index idx_post_status_created: {}", e);
    }

    // Per-user ticket listing.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_ticket_user_created")
        .table(support_ticket::Entity)
        .col(support_ticket::Column::UserId)
        .col(support_ticket::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);
    if let Err(e) = db.execute_unprepared(&stmt).await {
        tracing::warn!("Failed to create index idx_ticket_user_created: {}", e);
    }

    Ok(())
}

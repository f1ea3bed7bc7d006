//! Database migration support.
//!
//! The chat schema is usually owned by whoever operates the database; these
//! embedded migrations create it for local setups and tests.

use sqlx::PgPool;
use tracing::info;

use crate::ChatError;

/// Apply the embedded `users`, `chats` and `messages` migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), ChatError> {
    let migrator = sqlx::migrate!("./migrations");
    info!(migrations = migrator.iter().count(), "applying chat schema");
    migrator.run(pool).await?;
    Ok(())
}

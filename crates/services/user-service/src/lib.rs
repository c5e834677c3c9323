//! User Service Library
//!
//! Owns the `users` table: the identity records the auth core reads and the
//! refresh-token hash column it writes. Embedded in the gateway process.

pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use common::DatabaseConfig;
use domain::SecretHasher;

use crate::infra::Database;
use crate::repository::UserStore;
use crate::service::UserManager;

pub use crate::repository::UserRepository;
pub use crate::service::UserService;

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &DatabaseConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(config).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status().await? {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Build the user service over a connected database.
pub fn user_service(db: &Database, hasher: SecretHasher) -> Arc<dyn UserService> {
    let repo = Arc::new(UserStore::new(db.get_connection()));
    Arc::new(UserManager::new(repo, hasher))
}

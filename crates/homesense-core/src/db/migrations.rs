use sqlx::sqlite::SqlitePool;
use std::fmt;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct Migration {
    version: i32,
    up: &'static str,
    down: &'static str,
}

impl Migration {
    pub const fn new(version: i32, up: &'static str, down: &'static str) -> Self {
        Self { version, up, down }
    }

    pub fn version(&self) -> i32 {
        self.version
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Migration {}", self.version)
    }
}

pub const MIGRATIONS: &[Migration] = &[
    Migration::new(
        1,
        r#"
        CREATE TABLE IF NOT EXISTS clients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            realtor_id TEXT NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            income REAL NOT NULL DEFAULT 0,
            monthly_debt REAL NOT NULL DEFAULT 0,
            savings REAL NOT NULL DEFAULT 0,
            credit_score INTEGER NOT NULL DEFAULT 700,
            preferences TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_clients_realtor ON clients(realtor_id, created_at);
        "#,
        r#"
        DROP INDEX IF EXISTS idx_clients_realtor;
        DROP TABLE IF EXISTS clients;
        "#,
    ),
    Migration::new(
        2,
        r#"
        CREATE TABLE IF NOT EXISTS analyses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            realtor_id TEXT NOT NULL,
            client_id INTEGER NOT NULL,
            url TEXT NOT NULL,
            listing_json TEXT NOT NULL,
            result_json TEXT NOT NULL,
            created_at DATETIME NOT NULL,
            FOREIGN KEY(client_id) REFERENCES clients(id)
        );

        CREATE INDEX IF NOT EXISTS idx_analyses_client ON analyses(realtor_id, client_id, created_at);
        "#,
        r#"
        DROP INDEX IF EXISTS idx_analyses_client;
        DROP TABLE IF EXISTS analyses;
        "#,
    ),
];

pub async fn apply_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            applied_at DATETIME NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    let applied_versions = applied_versions(pool).await?;

    for migration in MIGRATIONS {
        if !applied_versions.contains(&migration.version) {
            debug!("Applying {}", migration);
            sqlx::query(migration.up).execute(pool).await?;

            sqlx::query("INSERT INTO migrations (version, applied_at) VALUES (?, ?)")
                .bind(migration.version)
                .bind(chrono::Utc::now())
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}

/// Reverts every applied migration newer than `target_version`, newest first.
pub async fn rollback_migration(pool: &SqlitePool, target_version: i32) -> Result<(), sqlx::Error> {
    let applied_versions = applied_versions(pool).await?;

    for migration in MIGRATIONS.iter().rev() {
        if migration.version > target_version && applied_versions.contains(&migration.version) {
            debug!("Reverting {}", migration);
            sqlx::query(migration.down).execute(pool).await?;

            sqlx::query("DELETE FROM migrations WHERE version = ?")
                .bind(migration.version)
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}

pub async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar("SELECT version FROM migrations ORDER BY version")
        .fetch_all(pool)
        .await
}

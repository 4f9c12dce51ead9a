pub mod migrations;
pub mod queries;

pub use migrations::{applied_versions, apply_migrations, rollback_migration, MIGRATIONS};
pub use queries::{AnalysisQueryBuilder, ClientQueryBuilder};

use crate::{Analysis, Client, ClientProfile, HomesenseError, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

impl<'r> FromRow<'r, SqliteRow> for Client {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let credit_score: i64 = row.try_get("credit_score")?;

        Ok(Client {
            id: row.try_get("id")?,
            realtor_id: row.try_get("realtor_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            profile: ClientProfile {
                income: row.try_get("income")?,
                monthly_debt: row.try_get("monthly_debt")?,
                savings: row.try_get("savings")?,
                credit_score: u16::try_from(credit_score)
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            },
            preferences: row.try_get("preferences")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Analysis {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let listing_json: String = row.try_get("listing_json")?;
        let result_json: String = row.try_get("result_json")?;

        Ok(Analysis {
            id: row.try_get("id")?,
            realtor_id: row.try_get("realtor_id")?,
            client_id: row.try_get("client_id")?,
            url: row.try_get("url")?,
            listing: serde_json::from_str(&listing_json)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            result: serde_json::from_str(&result_json)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database file and applies pending migrations.
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if !db_path.exists() {
            fs::write(db_path, "")?;
        }

        let pool = SqlitePool::connect(&format!("sqlite:{}", db_path.to_string_lossy())).await?;
        apply_migrations(&pool).await?;
        info!("Opened database {}", db_path.display());

        Ok(Self { pool })
    }

    /// Private in-memory database, mostly for tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        apply_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create_client(&self, client: &mut Client) -> Result<()> {
        let name = client.name.trim().to_string();
        if name.is_empty() {
            return Err(HomesenseError::InvalidInput("Client name is required.".to_string()));
        }
        client.name = name;
        client.email = client.email.trim().to_string();
        client.phone = client.phone.trim().to_string();
        client.preferences = client.preferences.trim().to_string();
        client.notes = client.notes.trim().to_string();

        let id = sqlx::query(
            r#"
            INSERT INTO clients (
                realtor_id, name, email, phone, income, monthly_debt,
                savings, credit_score, preferences, notes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&client.realtor_id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.profile.income)
        .bind(client.profile.monthly_debt)
        .bind(client.profile.savings)
        .bind(i64::from(client.profile.credit_score))
        .bind(&client.preferences)
        .bind(&client.notes)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        client.id = Some(id);
        debug!("Created client {} for realtor {}", id, client.realtor_id);
        Ok(())
    }

    pub async fn get_client(&self, realtor_id: &str, id: i64) -> Result<Option<Client>> {
        let mut clients = ClientQueryBuilder::new()
            .with_realtor(realtor_id)
            .with_id(id)
            .execute(&self.pool)
            .await?;
        Ok(clients.pop())
    }

    /// Clients of one realtor, newest first.
    pub async fn list_clients(&self, realtor_id: &str) -> Result<Vec<Client>> {
        ClientQueryBuilder::new()
            .with_realtor(realtor_id)
            .newest_first()
            .execute(&self.pool)
            .await
    }

    /// Deletes a client and every analysis saved for it. Returns false when
    /// the realtor has no such client.
    pub async fn delete_client(&self, realtor_id: &str, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let removed_analyses = sqlx::query("DELETE FROM analyses WHERE client_id = ? AND realtor_id = ?")
            .bind(id)
            .bind(realtor_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let removed_clients = sqlx::query("DELETE FROM clients WHERE id = ? AND realtor_id = ?")
            .bind(id)
            .bind(realtor_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        debug!("Deleted client {} and {} analyses", id, removed_analyses);
        Ok(removed_clients > 0)
    }

    pub async fn save_analysis(&self, analysis: &mut Analysis) -> Result<()> {
        let listing_json = serde_json::to_string(&analysis.listing)?;
        let result_json = serde_json::to_string(&analysis.result)?;

        let id = sqlx::query(
            r#"
            INSERT INTO analyses (
                realtor_id, client_id, url, listing_json, result_json, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&analysis.realtor_id)
        .bind(analysis.client_id)
        .bind(&analysis.url)
        .bind(listing_json)
        .bind(result_json)
        .bind(analysis.created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        analysis.id = Some(id);
        Ok(())
    }

    /// Saved analyses for one client, newest first.
    pub async fn list_analyses(
        &self,
        realtor_id: &str,
        client_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Analysis>> {
        AnalysisQueryBuilder::new()
            .with_realtor(realtor_id)
            .with_client(client_id)
            .newest_first()
            .with_limit(limit)
            .execute(&self.pool)
            .await
    }
}

use crate::{Analysis, Client, Result};
use sqlx::{sqlite::SqlitePool, QueryBuilder, Sqlite};

pub struct ClientQueryBuilder<'a> {
    builder: QueryBuilder<'a, Sqlite>,
}

impl<'a> ClientQueryBuilder<'a> {
    pub fn new() -> Self {
        let builder = QueryBuilder::new("SELECT * FROM clients WHERE 1=1");
        Self { builder }
    }

    pub fn with_realtor(mut self, realtor_id: &'a str) -> Self {
        self.builder.push(" AND realtor_id = ");
        self.builder.push_bind(realtor_id);
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.builder.push(" AND id = ");
        self.builder.push_bind(id);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.builder.push(" ORDER BY created_at DESC, id DESC");
        self
    }

    pub async fn execute(mut self, pool: &SqlitePool) -> Result<Vec<Client>> {
        let rows = self.builder.build_query_as::<Client>().fetch_all(pool).await?;
        Ok(rows)
    }
}

impl Default for ClientQueryBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AnalysisQueryBuilder<'a> {
    builder: QueryBuilder<'a, Sqlite>,
}

impl<'a> AnalysisQueryBuilder<'a> {
    pub fn new() -> Self {
        let builder = QueryBuilder::new("SELECT * FROM analyses WHERE 1=1");
        Self { builder }
    }

    pub fn with_realtor(mut self, realtor_id: &'a str) -> Self {
        self.builder.push(" AND realtor_id = ");
        self.builder.push_bind(realtor_id);
        self
    }

    pub fn with_client(mut self, client_id: i64) -> Self {
        self.builder.push(" AND client_id = ");
        self.builder.push_bind(client_id);
        self
    }

    pub fn with_min_fit_score(mut self, min_fit_score: Option<u8>) -> Self {
        if let Some(min) = min_fit_score {
            self.builder.push(" AND CAST(json_extract(result_json, '$.fit_score') AS INTEGER) >= ");
            self.builder.push_bind(i64::from(min));
        }
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.builder.push(" ORDER BY created_at DESC, id DESC");
        self
    }

    pub fn with_limit(mut self, limit: Option<i64>) -> Self {
        if let Some(limit) = limit {
            self.builder.push(" LIMIT ");
            self.builder.push_bind(limit);
        }
        self
    }

    pub async fn execute(mut self, pool: &SqlitePool) -> Result<Vec<Analysis>> {
        let rows = self.builder.build_query_as::<Analysis>().fetch_all(pool).await?;
        Ok(rows)
    }
}

impl Default for AnalysisQueryBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

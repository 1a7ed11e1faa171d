use std::collections::HashMap;

use async_trait::async_trait;
use read_model::{ReadModel, Version};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::criteria::FindCriteria;
use crate::repository::ReadModelRepository;
use crate::{EntityId, Result, StorageError};

/// PostgreSQL-backed read model repository.
///
/// One row per (model_type, id) holding the latest version; data and
/// metadata are JSONB so criteria queries can use containment.
#[derive(Clone)]
pub struct PostgresReadModelRepository {
    pool: PgPool,
}

impl PostgresReadModelRepository {
    /// Creates a new PostgreSQL repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_model(row: PgRow) -> Result<ReadModel> {
        let data: HashMap<String, serde_json::Value> =
            serde_json::from_value(row.try_get::<serde_json::Value, _>("data")?)?;
        let metadata: HashMap<String, serde_json::Value> =
            serde_json::from_value(row.try_get::<serde_json::Value, _>("metadata")?)?;

        Ok(ReadModel::from_parts(
            EntityId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get::<String, _>("model_type")?,
            Version::new(row.try_get("version")?),
            row.try_get("created_at")?,
            row.try_get("updated_at")?,
            data,
            metadata,
        ))
    }
}

#[async_trait]
impl ReadModelRepository for PostgresReadModelRepository {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, model_type: &str, id: EntityId) -> Result<Option<ReadModel>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, model_type, version, created_at, updated_at, data, metadata
            FROM read_models
            WHERE model_type = $1 AND id = $2
            "#,
        )
        .bind(model_type)
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_model).transpose()
    }

    async fn find(&self, model_type: &str, criteria: &FindCriteria) -> Result<Vec<ReadModel>> {
        let mut sql = String::from(
            "SELECT id, model_type, version, created_at, updated_at, data, metadata \
             FROM read_models WHERE model_type = $1",
        );
        let mut param_count = 1;

        if !criteria.fields.is_empty() {
            param_count += 1;
            sql.push_str(&format!(" AND data @> ${param_count}"));
        }

        sql.push_str(" ORDER BY created_at ASC, id ASC");

        if criteria.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if criteria.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut query = sqlx::query(&sql).bind(model_type);
        if !criteria.fields.is_empty() {
            query = query.bind(criteria.fields_as_json());
        }
        if let Some(limit) = criteria.limit {
            query = query.bind(limit as i64);
        }
        if let Some(offset) = criteria.offset {
            query = query.bind(offset as i64);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_model).collect()
    }

    async fn save(&self, model: ReadModel) -> Result<ReadModel> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so concurrent writers serialize on the version check.
        let current: Option<i64> = sqlx::query_scalar(
            "SELECT version FROM read_models WHERE model_type = $1 AND id = $2 FOR UPDATE",
        )
        .bind(model.model_type())
        .bind(model.id().as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(current) = current.map(Version::new)
            && current >= model.version()
        {
            return Err(StorageError::VersionConflict {
                model_type: model.model_type().to_string(),
                id: model.id(),
                current,
                attempted: model.version(),
            });
        }

        let data = serde_json::to_value(model.data())?;
        let metadata = serde_json::to_value(model.metadata())?;

        sqlx::query(
            r#"
            INSERT INTO read_models (id, model_type, version, created_at, updated_at, data, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (model_type, id) DO UPDATE SET
                version = EXCLUDED.version,
                updated_at = EXCLUDED.updated_at,
                data = EXCLUDED.data,
                metadata = EXCLUDED.metadata
            "#,
        )
        .bind(model.id().as_uuid())
        .bind(model.model_type())
        .bind(model.version().as_i64())
        .bind(model.created_at())
        .bind(model.updated_at())
        .bind(data)
        .bind(metadata)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(model)
    }

    async fn delete(&self, model_type: &str, id: EntityId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM read_models WHERE model_type = $1 AND id = $2")
            .bind(model_type)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, model_type: &str) -> Result<usize> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM read_models WHERE model_type = $1")
                .bind(model_type)
                .fetch_one(&self.pool)
                .await?;

        Ok(count as usize)
    }
}

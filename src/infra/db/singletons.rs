use async_trait::async_trait;
use serde_json::{Map, Value};
use sitedesk_api_types::SingletonKind;
use sqlx::types::Json;
use time::OffsetDateTime;

use crate::{
    application::repos::{RepoError, SingletonRepo},
    domain::entities::SingletonRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct SingletonRow {
    kind: String,
    body: Value,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<SingletonRow> for SingletonRecord {
    type Error = RepoError;

    fn try_from(row: SingletonRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<SingletonKind>()
            .map_err(|err| RepoError::Integrity {
                message: err.to_string(),
            })?;
        if !row.body.is_object() {
            return Err(RepoError::Integrity {
                message: format!("singleton `{kind}` body is not a JSON object"),
            });
        }
        Ok(Self {
            kind,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl SingletonRepo for PostgresRepositories {
    async fn find(&self, kind: SingletonKind) -> Result<Option<SingletonRecord>, RepoError> {
        let row = sqlx::query_as::<_, SingletonRow>(
            r#"
            SELECT kind, body, created_at, updated_at
            FROM singleton_documents
            WHERE kind = $1
            "#,
        )
        .bind(kind.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(SingletonRecord::try_from).transpose()
    }

    async fn merge(
        &self,
        kind: SingletonKind,
        set: Map<String, Value>,
        unset: Vec<String>,
    ) -> Result<SingletonRecord, RepoError> {
        let row = sqlx::query_as::<_, SingletonRow>(
            r#"
            INSERT INTO singleton_documents (kind, body)
            VALUES ($1, $2)
            ON CONFLICT (kind) DO UPDATE SET
                body = (singleton_documents.body || EXCLUDED.body) - $3::text[],
                updated_at = now()
            RETURNING kind, body, created_at, updated_at
            "#,
        )
        .bind(kind.as_str())
        .bind(Json(set))
        .bind(unset)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        SingletonRecord::try_from(row)
    }

    async fn remove(&self, kind: SingletonKind) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM singleton_documents WHERE kind = $1")
            .bind(kind.as_str())
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

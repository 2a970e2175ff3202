//! Postgres-backed pass store.
//!
//! The `passes` table is keyed by token with a unique identifier column (see
//! `sql/schema.sql`). Admission is a single conditional `UPDATE` so two gates
//! scanning the same pass cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{error, info_span, Instrument};

use super::{
    error::StoreError,
    model::{Pass, PassStatus, RegistrantIdentity},
    store::PassStore,
};

const SELECT_COLUMNS: &str = "token, identifier, full_name, department, year_level, email, \
     status, issued_at, admitted_at, admitted_by";

#[derive(Debug, Clone)]
pub struct PgPassStore {
    pool: PgPool,
}

impl PgPassStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, column: &str, value: &str) -> Result<Option<Pass>, StoreError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM passes WHERE {column} = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(pass_from_row).transpose()
    }
}

#[async_trait]
impl PassStore for PgPassStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Pass>, StoreError> {
        self.fetch_one_where("identifier", identifier).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Pass>, StoreError> {
        self.fetch_one_where("token", token).await
    }

    async fn create(&self, pass: &Pass) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO passes
                (token, identifier, full_name, department, year_level, email, status, issued_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let identity = pass.identity();
        sqlx::query(query)
            .bind(pass.token())
            .bind(&identity.identifier)
            .bind(&identity.full_name)
            .bind(&identity.department)
            .bind(&identity.year_level)
            .bind(&identity.email)
            .bind(pass.status().as_str())
            .bind(pass.issued_at())
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn set_status(
        &self,
        token: &str,
        status: PassStatus,
        actor: &str,
    ) -> Result<(), StoreError> {
        if status != PassStatus::Used {
            return Err(StoreError::Conflict);
        }

        let query = r"
            UPDATE passes
            SET status = 'USED', admitted_at = NOW(), admitted_by = $2
            WHERE token = $1 AND status = 'ACTIVE'
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(token)
            .bind(actor)
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing matched: either the token is unknown or someone else consumed it first.
        match self.find_by_token(token).await? {
            Some(_) => Err(StoreError::Conflict),
            None => Err(StoreError::NotFound),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .map_err(map_sqlx_error)?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .map_err(map_sqlx_error)
    }
}

fn pass_from_row(row: &PgRow) -> Result<Pass, StoreError> {
    let decode = |err: sqlx::Error| StoreError::Corrupt(err.to_string());

    let status: String = row.try_get("status").map_err(decode)?;
    let issued_at: DateTime<Utc> = row.try_get("issued_at").map_err(decode)?;

    Pass::from_parts(
        row.try_get("token").map_err(decode)?,
        RegistrantIdentity {
            identifier: row.try_get("identifier").map_err(decode)?,
            full_name: row.try_get("full_name").map_err(decode)?,
            department: row.try_get("department").map_err(decode)?,
            year_level: row.try_get("year_level").map_err(decode)?,
            email: row.try_get("email").map_err(decode)?,
        },
        status.parse()?,
        issued_at,
        row.try_get("admitted_at").map_err(decode)?,
        row.try_get("admitted_by").map_err(decode)?,
    )
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        return StoreError::AlreadyExists;
    }
    error!("Database error: {err}");
    StoreError::Unavailable(err.to_string())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_are_unavailable() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn select_covers_every_column() {
        for column in [
            "token",
            "identifier",
            "full_name",
            "department",
            "year_level",
            "email",
            "status",
            "issued_at",
            "admitted_at",
            "admitted_by",
        ] {
            assert!(SELECT_COLUMNS.contains(column), "{column}");
        }
    }
}

//! PostgreSQL-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (invalid enum text) | `22P02` | `Domain(Validation)` |
//! | anything else | any | `Backend` |

use core::str::FromStr;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use firmreg_auth::{Role, User};
use firmreg_companies::{Company, CompanyChange, CompanyKind, CompanyPatch, NewCompany};
use firmreg_core::{CompanyId, DomainError, UserId};

use super::{CompanyStore, StoreError, UserStore};

const COMPANY_COLUMNS: &str =
    r#"id, name, description, amount_of_employees, registered, "type"::text AS kind, created_at, updated_at"#;

#[derive(Debug, Clone)]
pub struct PostgresCompanyStore {
    pool: PgPool,
}

impl PostgresCompanyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyStore for PostgresCompanyStore {
    #[instrument(skip(self, company), fields(name = %company.name), err)]
    async fn create(&self, company: NewCompany) -> Result<Company, StoreError> {
        let company = company.into_company(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO companies
                (id, name, description, amount_of_employees, registered, "type", created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6::company_type, $7, $8)
            "#,
        )
        .bind(company.id.as_uuid())
        .bind(&company.name)
        .bind(&company.description)
        .bind(company.amount_of_employees)
        .bind(company.registered)
        .bind(company.kind.as_str())
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_company", e))?;

        Ok(company)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get(&self, id: CompanyId) -> Result<Company, StoreError> {
        let row = sqlx::query(&format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_company", e))?
            .ok_or(StoreError::NotFound)?;

        company_from_row(&row)
    }

    #[instrument(skip(self, patch), fields(id = %id, fields = ?patch.fields()), err)]
    async fn update(&self, id: CompanyId, patch: &CompanyPatch) -> Result<Company, StoreError> {
        // Reject unknown types before touching the row.
        let kind = patch.kind().map(CompanyKind::from_str).transpose()?;

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE companies SET ");
        let mut set = qb.separated(", ");
        for change in patch.changes() {
            match change {
                CompanyChange::Description(v) => {
                    set.push("description = ").push_bind_unseparated(v.clone());
                }
                CompanyChange::AmountOfEmployees(v) => {
                    set.push("amount_of_employees = ").push_bind_unseparated(*v);
                }
                CompanyChange::Registered(v) => {
                    set.push("registered = ").push_bind_unseparated(*v);
                }
                CompanyChange::Kind(_) => {}
            }
        }
        if let Some(kind) = kind {
            set.push(r#""type" = "#)
                .push_bind_unseparated(kind.as_str())
                .push_unseparated("::company_type");
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());

        qb.push(" WHERE id = ")
            .push_bind(*id.as_uuid())
            .push(" RETURNING ")
            .push(COMPANY_COLUMNS);

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_company", e))?
            .ok_or(StoreError::NotFound)?;

        company_from_row(&row)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&self, id: CompanyId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_company", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), fields(username = %user.username), err)]
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user", e))?;

        row.as_ref().map(user_from_row).transpose()
    }
}

fn company_from_row(row: &PgRow) -> Result<Company, StoreError> {
    let decode = |e: sqlx::Error| StoreError::backend("decode_company", e.to_string());

    let kind: String = row.try_get("kind").map_err(decode)?;
    let kind = CompanyKind::from_str(&kind)
        .map_err(|e| StoreError::backend("decode_company", e.to_string()))?;

    Ok(Company {
        id: CompanyId::from_uuid(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        amount_of_employees: row.try_get("amount_of_employees").map_err(decode)?,
        registered: row.try_get("registered").map_err(decode)?,
        kind,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(decode)?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let decode = |e: sqlx::Error| StoreError::backend("decode_user", e.to_string());

    let role: String = row.try_get("role").map_err(decode)?;
    let role = Role::from_str(&role).map_err(|e| StoreError::backend("decode_user", e.to_string()))?;

    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(decode)?),
        username: row.try_get("username").map_err(decode)?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        role,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
    })
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => return StoreError::Conflict(db_err.message().to_string()),
            Some("22P02") => {
                return StoreError::Domain(DomainError::validation(db_err.message().to_string()));
            }
            _ => {}
        }
    }
    tracing::error!(operation, error = %err, "database operation failed");
    StoreError::backend(operation, err.to_string())
}

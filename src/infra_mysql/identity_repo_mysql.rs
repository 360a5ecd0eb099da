use super::util::{is_dup_key, store_error};
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

#[derive(Clone)]
pub struct MySqlIdentityRepo {
    pool: MySqlPool,
}

impl MySqlIdentityRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlIdentityRepo { pool }
    }

    pub async fn connect(dsn: &str) -> anyhow::Result<Self> {
        let pool = MySqlPool::connect(dsn).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_identity(row: MySqlRow) -> Result<Identity, RepoError> {
        let read = |e: sqlx::Error| store_error("decode identity row", e);

        Ok(Identity {
            id: SubjectId(row.try_get::<i64, _>("id").map_err(read)?),
            name: row.try_get("name").map_err(read)?,
            gmail: row.try_get("gmail").map_err(read)?,
            password_hash: row.try_get("password").map_err(read)?,
            is_admin: row.try_get("is_admin").map_err(read)?,
            created_by: row
                .try_get::<Option<i64>, _>("created_by")
                .map_err(read)?
                .map(SubjectId),
        })
    }
}

#[async_trait::async_trait]
impl IdentityRepo for MySqlIdentityRepo {
    async fn find_by_id(&self, id: SubjectId) -> Result<Option<Identity>, RepoError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, name, gmail, password, is_admin, created_by
FROM users
WHERE id = ?
"#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("query identity by id", e))?;

        row_opt.map(Self::row_to_identity).transpose()
    }

    async fn find_by_gmail(&self, gmail: &str) -> Result<Option<Identity>, RepoError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, name, gmail, password, is_admin, created_by
FROM users
WHERE gmail = ?
"#,
        )
        .bind(gmail)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("query identity by gmail", e))?;

        row_opt.map(Self::row_to_identity).transpose()
    }

    async fn save(&self, identity: NewIdentity) -> Result<Identity, RepoError> {
        let result = sqlx::query(
            r#"
INSERT INTO users (name, gmail, password, is_admin, created_by)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(identity.name.as_deref())
        .bind(&identity.gmail)
        .bind(&identity.password_hash)
        .bind(identity.is_admin)
        .bind(identity.created_by.map(|id| id.0))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                RepoError::DuplicateKey(identity.gmail.clone())
            } else {
                store_error("insert identity", e)
            }
        })?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| RepoError::Store(format!("identity id out of range: {e}")))?;
        Ok(identity.with_id(SubjectId(id)))
    }

    async fn update(&self, id: SubjectId, changes: IdentityChanges) -> Result<Identity, RepoError> {
        let gmail = changes.gmail.clone();
        sqlx::query(
            r#"
UPDATE users
SET name = COALESCE(?, name),
    gmail = COALESCE(?, gmail),
    password = COALESCE(?, password)
WHERE id = ?
"#,
        )
        .bind(changes.name)
        .bind(changes.gmail)
        .bind(changes.password_hash)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                RepoError::DuplicateKey(gmail.unwrap_or_default())
            } else {
                store_error("update identity", e)
            }
        })?;

        self.find_by_id(id).await?.ok_or(RepoError::NotFound)
    }

    async fn list_all(&self) -> Result<Vec<Identity>, RepoError> {
        let rows: Vec<MySqlRow> = sqlx::query(
            r#"
SELECT id, name, gmail, password, is_admin, created_by
FROM users
ORDER BY id
"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("list identities", e))?;

        rows.into_iter().map(Self::row_to_identity).collect()
    }
}

use sqlx::mysql::MySqlDatabaseError;

/// MySQL `ER_DUP_ENTRY`.
const ER_DUP_ENTRY: u16 = 1062;

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == ER_DUP_ENTRY;
        }
    }

    false
}

pub fn store_error(context: &str, err: sqlx::Error) -> crate::domain_port::RepoError {
    crate::domain_port::RepoError::Store(format!("{context}: {err}"))
}

use async_trait::async_trait;
use autoredirect_core::error::Result;
use autoredirect_core::{
    ArticleRepository, ArticleSnapshot, NewRedirect, RedirectField, RedirectRecord,
    RedirectRepository, StorageError,
};
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::trace;

const CONTENT_DDL: &str = include_str!("../ddl/mysql/content.sql");
const REDIRECT_LINKS_DDL: &str = include_str!("../ddl/mysql/redirect_links.sql");

/// `DATETIME` layout used for `created_date` and `modified_date`, always UTC.
const SQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// MySQL implementation of the article and redirect repository contracts.
///
/// Articles are read from the `content` table and redirects live in
/// `redirect_links`. Every operation is a single statement; nothing here opens
/// a transaction spanning several calls.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Creates the `content` and `redirect_links` tables if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        for ddl in [CONTENT_DDL, REDIRECT_LINKS_DDL] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        Ok(())
    }
}

fn format_sql_datetime(ts: Timestamp) -> String {
    ts.strftime(SQL_DATETIME_FORMAT).to_string()
}

fn parse_sql_datetime(raw: &str) -> Result<Timestamp> {
    DateTime::strptime(SQL_DATETIME_FORMAT, raw)
        .and_then(|dt| dt.to_zoned(TimeZone::UTC))
        .map(|zoned| zoned.timestamp())
        .map_err(|e| StorageError::InvalidData(format!("invalid datetime '{raw}': {e}")))
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn redirect_from_row(row: &MySqlRow) -> Result<RedirectRecord> {
    let created_raw: String = row.try_get("created_date").map_err(map_sqlx_error)?;
    let modified_raw: String = row.try_get("modified_date").map_err(map_sqlx_error)?;

    Ok(RedirectRecord {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        old_url: row.try_get("old_url").map_err(map_sqlx_error)?,
        new_url: row.try_get("new_url").map_err(map_sqlx_error)?,
        published: row.try_get("published").map_err(map_sqlx_error)?,
        status_code: row.try_get("header").map_err(map_sqlx_error)?,
        created_at: parse_sql_datetime(&created_raw)?,
        modified_at: parse_sql_datetime(&modified_raw)?,
    })
}

const SELECT_REDIRECTS: &str = r#"
    SELECT id, old_url, new_url, published, header,
           DATE_FORMAT(created_date, '%Y-%m-%d %H:%i:%s') AS created_date,
           DATE_FORMAT(modified_date, '%Y-%m-%d %H:%i:%s') AS modified_date
    FROM redirect_links
"#;

#[async_trait]
impl ArticleRepository for MySqlRepository {
    async fn find_article(&self, id: u64) -> Result<Option<ArticleSnapshot>> {
        let row = sqlx::query(
            r#"
            SELECT id, alias, catid, language
            FROM content
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ArticleSnapshot {
            id: row.try_get("id").map_err(map_sqlx_error)?,
            alias: row.try_get("alias").map_err(map_sqlx_error)?,
            catid: row.try_get("catid").map_err(map_sqlx_error)?,
            language: row.try_get("language").map_err(map_sqlx_error)?,
        }))
    }

    async fn update_alias(&self, id: u64, alias: &str) -> Result<bool> {
        let exists = sqlx::query("SELECT 1 FROM content WHERE id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .is_some();
        if !exists {
            return Ok(false);
        }

        sqlx::query("UPDATE content SET alias = ? WHERE id = ?")
            .bind(alias)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(true)
    }
}

#[async_trait]
impl RedirectRepository for MySqlRepository {
    async fn delete_by_old_url(&self, old_url: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM redirect_links WHERE old_url = ?")
            .bind(old_url)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        trace!(old_url, rows = result.rows_affected(), "deleted redirects by old url");
        Ok(result.rows_affected())
    }

    async fn update_redirects(
        &self,
        field: RedirectField,
        current: &str,
        replacement: &str,
        now: Timestamp,
    ) -> Result<u64> {
        // Column names come from `RedirectField`, never from input.
        let column = field.column();
        let statement = format!(
            "UPDATE redirect_links SET {column} = ?, modified_date = ? WHERE {column} = ?"
        );

        let result = sqlx::query(&statement)
            .bind(replacement)
            .bind(format_sql_datetime(now))
            .bind(current)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        trace!(%field, current, replacement, rows = result.rows_affected(), "updated redirects");
        Ok(result.rows_affected())
    }

    async fn insert(&self, redirect: NewRedirect) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO redirect_links
              (old_url, new_url, published, header, created_date, modified_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(redirect.old_url)
        .bind(redirect.new_url)
        .bind(redirect.published)
        .bind(redirect.status_code)
        .bind(format_sql_datetime(redirect.created_at))
        .bind(format_sql_datetime(redirect.modified_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete_self_redirects(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM redirect_links WHERE old_url = new_url")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn list(&self) -> Result<Vec<RedirectRecord>> {
        let statement = format!("{SELECT_REDIRECTS} ORDER BY id");
        let rows = sqlx::query(&statement)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(redirect_from_row).collect()
    }

    async fn find_by_old_url(&self, old_url: &str) -> Result<Vec<RedirectRecord>> {
        let statement = format!("{SELECT_REDIRECTS} WHERE old_url = ? ORDER BY id");
        let rows = sqlx::query(&statement)
            .bind(old_url)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(redirect_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_round_trips_at_second_precision() {
        let ts = Timestamp::from_second(1_700_000_000).unwrap();

        let raw = format_sql_datetime(ts);
        assert_eq!(raw, "2023-11-14 22:13:20");
        assert_eq!(parse_sql_datetime(&raw).unwrap(), ts);
    }

    #[test]
    fn malformed_datetime_is_invalid_data() {
        let err = parse_sql_datetime("yesterday").unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[test]
    fn pool_timeout_maps_to_timeout() {
        let err = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StorageError::Timeout(_)));
    }
}

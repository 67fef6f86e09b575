use async_trait::async_trait;
use onepass_core::resource::Result;
use onepass_core::{CatalogError, Resource, ResourceCatalog, ResourceId, ResourceLookup};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::debug;

/// MySQL implementation of the resource catalog.
///
/// Reads the `products` table (see `ddl/mysql/products.sql`). Every lookup
/// hits the database, so a resource deleted or retargeted after a link was
/// issued is observed at redemption.
#[derive(Debug, Clone)]
pub struct MySqlCatalog {
    pool: MySqlPool,
}

impl MySqlCatalog {
    /// Creates a catalog from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a catalog by opening a new MySQL connection pool.
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
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> CatalogError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => CatalogError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => CatalogError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => CatalogError::InvalidData(message),
        _ => CatalogError::Query(message),
    }
}

/// Escapes `LIKE` wildcards so the filter matches literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn decode_row(row: &MySqlRow) -> Result<Resource> {
    Ok(Resource {
        id: ResourceId(row.try_get("product_id").map_err(map_sqlx_error)?),
        name: row.try_get("product_name").map_err(map_sqlx_error)?,
        target_location: row.try_get("launch_url").map_err(map_sqlx_error)?,
    })
}

#[async_trait]
impl ResourceLookup for MySqlCatalog {
    async fn get(&self, id: ResourceId) -> Result<Option<Resource>> {
        let row = sqlx::query(
            r#"
            SELECT product_id, product_name, launch_url
            FROM products
            WHERE product_id = ?
            LIMIT 1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(decode_row).transpose()
    }
}

#[async_trait]
impl ResourceCatalog for MySqlCatalog {
    async fn list(&self, name_filter: Option<&str>) -> Result<Vec<Resource>> {
        let rows = match name_filter {
            Some(needle) => {
                sqlx::query(
                    r#"
                    SELECT product_id, product_name, launch_url
                    FROM products
                    WHERE LOWER(product_name) LIKE ?
                    ORDER BY product_id
                    "#,
                )
                .bind(like_pattern(needle))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT product_id, product_name, launch_url
                    FROM products
                    ORDER BY product_id
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;

        rows.iter().map(decode_row).collect()
    }

    async fn insert(&self, resource: Resource) -> Result<()> {
        let id = resource.id;
        let result = sqlx::query(
            r#"
            INSERT INTO products (product_id, product_name, launch_url)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(id.0)
        .bind(resource.name)
        .bind(resource.target_location)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(resource_id = %id, "Inserted resource");
                Ok(())
            }
            Err(err) if is_unique_violation(&err) => Err(CatalogError::Conflict(id.to_string())),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete(&self, id: ResourceId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

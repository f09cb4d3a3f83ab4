//! SQLite metadata index. Runtime-checked `sqlx::query`/
//! `query_as` rather than the compile-time `query!` macro family the
//! teacher's `verifier_dal` uses — the CAS must build standalone against
//! an index file that often does not exist yet, and the macro family
//! needs a live `DATABASE_URL` at build time (see DESIGN.md).

use crate::error::StoreError;
use crate::metadata::{ObjectRecord, PutMetadata, StoreQuery};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

pub struct MetadataIndex {
    pool: SqlitePool,
}

impl MetadataIndex {
    pub async fn connect(index_path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", index_path.display()))
            .map_err(|e| StoreError::StoragePrecondition(format!("invalid index path: {e}")))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(8).connect_with(options).await?;
        let index = MetadataIndex { pool };
        index.init_schema().await?;
        Ok(index)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS objects (
                handle TEXT PRIMARY KEY,
                name TEXT,
                shader_stage TEXT,
                entry_point TEXT,
                workgroup_x INTEGER NOT NULL DEFAULT 1,
                workgroup_y INTEGER NOT NULL DEFAULT 1,
                workgroup_z INTEGER NOT NULL DEFAULT 1,
                size INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                metadata_json TEXT NOT NULL DEFAULT '{}'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_stage ON objects(shader_stage)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_workgroup ON objects(workgroup_x, workgroup_y, workgroup_z)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts the row for `handle` or, if it already exists, upserts it
    /// in place (preserving `rowid`, so `list`'s insertion order is
    /// stable across an idempotent re-`put`). Last writer wins over rows
    /// with equal handle.
    pub async fn upsert(&self, handle: &str, size: i64, created_at: &str, meta: &PutMetadata) -> Result<(), StoreError> {
        let (wx, wy, wz) = meta.workgroup.unwrap_or((1, 1, 1));
        let metadata_json = meta.extra.to_string();
        sqlx::query(
            r#"
            INSERT INTO objects
                (handle, name, shader_stage, entry_point, workgroup_x, workgroup_y, workgroup_z, size, created_at, metadata_json)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(handle) DO UPDATE SET
                name = excluded.name,
                shader_stage = excluded.shader_stage,
                entry_point = excluded.entry_point,
                workgroup_x = excluded.workgroup_x,
                workgroup_y = excluded.workgroup_y,
                workgroup_z = excluded.workgroup_z,
                size = excluded.size,
                metadata_json = excluded.metadata_json
            "#,
        )
        .bind(handle)
        .bind(&meta.name)
        .bind(&meta.shader_stage)
        .bind(&meta.entry_point)
        .bind(wx)
        .bind(wy)
        .bind(wz)
        .bind(size)
        .bind(created_at)
        .bind(metadata_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn query(&self, filter: &StoreQuery) -> Result<Vec<ObjectRecord>, StoreError> {
        let mut sql = String::from("SELECT * FROM objects WHERE 1=1");
        if filter.name.is_some() {
            sql.push_str(" AND name LIKE ?");
        }
        if filter.shader_stage.is_some() {
            sql.push_str(" AND shader_stage = ?");
        }
        if filter.workgroup.is_some() {
            sql.push_str(" AND workgroup_x = ? AND workgroup_y = ? AND workgroup_z = ?");
        }
        sql.push_str(" ORDER BY handle ASC LIMIT ?");

        let mut query = sqlx::query_as::<_, ObjectRecord>(&sql);
        if let Some(name) = &filter.name {
            query = query.bind(format!("%{name}%"));
        }
        if let Some(stage) = &filter.shader_stage {
            query = query.bind(stage);
        }
        if let Some((x, y, z)) = filter.workgroup {
            query = query.bind(x).bind(y).bind(z);
        }
        query = query.bind(filter.limit);

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Handles in insertion order, indexed by `rowid`.
    pub async fn list(&self, limit: i64) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT handle FROM objects ORDER BY rowid ASC LIMIT ?").bind(limit).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(h,)| h).collect())
    }

    pub async fn stats(&self) -> Result<(i64, i64), StoreError> {
        let row: (i64, Option<i64>) = sqlx::query_as("SELECT COUNT(*), SUM(size) FROM objects").fetch_one(&self.pool).await?;
        Ok((row.0, row.1.unwrap_or(0)))
    }
}

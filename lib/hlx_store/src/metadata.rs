//! Metadata carried alongside a stored object and the rows the index
//! returns. Grounded in `shaderdb.py`'s `add_shader`
//! keyword arguments and its `shaders` table schema.

use serde_json::Value as Json;

/// Metadata supplied on `put`. All fields optional — a bare CAS blob
/// with no shader-specific metadata is a valid put.
#[derive(Debug, Clone, Default)]
pub struct PutMetadata {
    pub name: Option<String>,
    pub shader_stage: Option<String>,
    pub entry_point: Option<String>,
    pub workgroup: Option<(i64, i64, i64)>,
    pub extra: Json,
}

/// A row as returned by `query`/`list`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ObjectRecord {
    pub handle: String,
    pub name: Option<String>,
    pub shader_stage: Option<String>,
    pub entry_point: Option<String>,
    pub workgroup_x: i64,
    pub workgroup_y: i64,
    pub workgroup_z: i64,
    pub size: i64,
    pub created_at: String,
    pub metadata_json: String,
}

impl ObjectRecord {
    pub fn workgroup(&self) -> (i64, i64, i64) {
        (self.workgroup_x, self.workgroup_y, self.workgroup_z)
    }

    pub fn extra(&self) -> Json {
        serde_json::from_str(&self.metadata_json).unwrap_or(Json::Null)
    }
}

/// Filter accepted by `query`: `{name?, stage?, workgroup_xyz?, limit}`.
#[derive(Debug, Clone)]
pub struct StoreQuery {
    pub name: Option<String>,
    pub shader_stage: Option<String>,
    pub workgroup: Option<(i64, i64, i64)>,
    pub limit: i64,
}

impl Default for StoreQuery {
    fn default() -> Self {
        StoreQuery { name: None, shader_stage: None, workgroup: None, limit: 100 }
    }
}

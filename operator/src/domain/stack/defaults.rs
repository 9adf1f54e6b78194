use crate::domain::stack::entities::RAGmeSpec;

pub const DEFAULT_VERSION: &str = "latest";
pub const DEFAULT_IMAGE_TAG: &str = "latest";
pub const DEFAULT_PULL_POLICY: &str = "IfNotPresent";
pub const DEFAULT_API_REPLICAS: i32 = 2;
pub const DEFAULT_MCP_REPLICAS: i32 = 2;
pub const DEFAULT_AGENT_REPLICAS: i32 = 1;
pub const DEFAULT_FRONTEND_REPLICAS: i32 = 2;
pub const DEFAULT_MINIO_STORAGE_SIZE: &str = "10Gi";
pub const DEFAULT_WEAVIATE_STORAGE_SIZE: &str = "10Gi";
pub const DEFAULT_SHARED_VOLUME_SIZE: &str = "5Gi";
pub const DEFAULT_VECTOR_DB_TYPE: &str = "milvus";
pub const DEFAULT_SESSION_SECRET: &str = "ragme-default-session-secret-change-me";
pub const DEFAULT_SESSION_MAX_AGE_SECONDS: i32 = 86400;
pub const DEFAULT_SESSION_SAME_SITE: &str = "lax";

fn default_str(field: &mut String, value: &str) {
    if field.is_empty() {
        *field = value.to_string();
    }
}

fn default_int(field: &mut i32, value: i32) {
    if *field == 0 {
        *field = value;
    }
}

/// Fills every zero-valued optional field in place.
///
/// Only the in-memory copy used by the current pass is touched; the stored
/// object keeps whatever the user wrote.
pub fn apply_defaults(spec: &mut RAGmeSpec) {
    default_str(&mut spec.version, DEFAULT_VERSION);

    default_str(&mut spec.images.tag, DEFAULT_IMAGE_TAG);
    default_str(&mut spec.images.pull_policy, DEFAULT_PULL_POLICY);

    default_int(&mut spec.replicas.api, DEFAULT_API_REPLICAS);
    default_int(&mut spec.replicas.mcp, DEFAULT_MCP_REPLICAS);
    default_int(&mut spec.replicas.agent, DEFAULT_AGENT_REPLICAS);
    default_int(&mut spec.replicas.frontend, DEFAULT_FRONTEND_REPLICAS);

    default_str(
        &mut spec.storage.minio.storage_size,
        DEFAULT_MINIO_STORAGE_SIZE,
    );
    default_str(
        &mut spec.storage.shared_volume.size,
        DEFAULT_SHARED_VOLUME_SIZE,
    );

    default_str(&mut spec.vector_db.db_type, DEFAULT_VECTOR_DB_TYPE);
    default_str(
        &mut spec.vector_db.weaviate.storage_size,
        DEFAULT_WEAVIATE_STORAGE_SIZE,
    );

    let session = &mut spec.authentication.session;
    default_str(&mut session.secret_key, DEFAULT_SESSION_SECRET);
    default_int(&mut session.max_age_seconds, DEFAULT_SESSION_MAX_AGE_SECONDS);
    default_str(&mut session.same_site, DEFAULT_SESSION_SAME_SITE);
}

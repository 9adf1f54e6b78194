use std::fmt;

use k8s_openapi::api::{apps::v1::Deployment, core::v1::PersistentVolumeClaim, core::v1::Service};
use kube::{CustomResource, api::ObjectMeta};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Desired state of one RAGme application stack.
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "ragme.io",
    version = "v1",
    kind = "RAGme",
    plural = "ragmes",
    namespaced,
    status = "RAGmeStatus",
    printcolumn = r#"{"name":"Version", "type":"string", "jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RAGmeSpec {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub images: ImageSpec,
    #[serde(default)]
    pub replicas: ReplicaSpec,
    #[serde(default)]
    pub storage: StorageSpec,
    #[serde(default, rename = "vectorDB")]
    pub vector_db: VectorDbSpec,
    #[serde(default)]
    pub authentication: AuthenticationSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    /// Registry prefix for the application images, e.g. `ghcr.io/ragme-io`.
    #[serde(default)]
    pub registry: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub pull_policy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ReplicaSpec {
    #[serde(default)]
    pub api: i32,
    #[serde(default)]
    pub mcp: i32,
    #[serde(default)]
    pub agent: i32,
    #[serde(default)]
    pub frontend: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    #[serde(default)]
    pub minio: MinioSpec,
    #[serde(default)]
    pub shared_volume: SharedVolumeSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MinioSpec {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub storage_size: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharedVolumeSpec {
    #[serde(default)]
    pub size: String,
    /// Storage class of the shared claim; the cluster default is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct VectorDbSpec {
    #[serde(default, rename = "type")]
    pub db_type: String,
    #[serde(default)]
    pub weaviate: WeaviateSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeaviateSpec {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub storage_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct AuthenticationSpec {
    #[serde(default)]
    pub oauth: OAuthSpec,
    #[serde(default)]
    pub session: SessionSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct OAuthSpec {
    #[serde(default)]
    pub google: OAuthProviderSpec,
    #[serde(default)]
    pub github: OAuthProviderSpec,
    #[serde(default)]
    pub apple: OAuthProviderSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct OAuthProviderSpec {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, rename = "clientID")]
    pub client_id: String,
    #[serde(default, rename = "clientSecret")]
    pub client_secret: String,
    #[serde(default, rename = "redirectURI")]
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSpec {
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub max_age_seconds: i32,
    #[serde(default)]
    pub same_site: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RAGmeStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<StackPhase>,
    /// Generation of the spec read by the pass that wrote this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    /// RFC 3339 timestamp of the last phase write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconcile_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum StackPhase {
    Reconciling,
    Ready,
}

impl fmt::Display for StackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackPhase::Reconciling => write!(f, "Reconciling"),
            StackPhase::Ready => write!(f, "Ready"),
        }
    }
}

/// What the convergence engine did for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAction {
    Create,
    Update,
    NoOp,
}

/// Result of one reconcile pass, consumed by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The stack no longer exists; ownership cascade takes care of children.
    Deleted,
    Converged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    VolumeClaim,
    Deployment,
    Service,
}

impl ResourceKind {
    /// Deployments are rewritten on every pass; claims and services are left
    /// alone once they exist.
    pub fn is_mutable(&self) -> bool {
        matches!(self, ResourceKind::Deployment)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::VolumeClaim => write!(f, "PersistentVolumeClaim"),
            ResourceKind::Deployment => write!(f, "Deployment"),
            ResourceKind::Service => write!(f, "Service"),
        }
    }
}

/// A child object produced by the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagedResource {
    VolumeClaim(PersistentVolumeClaim),
    Deployment(Deployment),
    Service(Service),
}

impl ManagedResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ManagedResource::VolumeClaim(_) => ResourceKind::VolumeClaim,
            ManagedResource::Deployment(_) => ResourceKind::Deployment,
            ManagedResource::Service(_) => ResourceKind::Service,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            ManagedResource::VolumeClaim(pvc) => &pvc.metadata,
            ManagedResource::Deployment(deployment) => &deployment.metadata,
            ManagedResource::Service(service) => &service.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            ManagedResource::VolumeClaim(pvc) => &mut pvc.metadata,
            ManagedResource::Deployment(deployment) => &mut deployment.metadata,
            ManagedResource::Service(service) => &mut service.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.metadata().namespace.as_deref().unwrap_or_default()
    }
}

/// The four application-service roles, reconciled in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Api,
    Mcp,
    Agent,
    Frontend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleParams {
    pub component: &'static str,
    /// Container port, `None` for roles that expose nothing.
    pub port: Option<i32>,
    pub image_suffix: &'static str,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Api, Role::Mcp, Role::Agent, Role::Frontend];

    pub fn params(&self) -> RoleParams {
        match self {
            Role::Api => RoleParams {
                component: "api",
                port: Some(8021),
                image_suffix: "api",
            },
            Role::Mcp => RoleParams {
                component: "mcp",
                port: Some(8022),
                image_suffix: "mcp",
            },
            Role::Agent => RoleParams {
                component: "agent",
                port: None,
                image_suffix: "agent",
            },
            Role::Frontend => RoleParams {
                component: "frontend",
                port: Some(8020),
                image_suffix: "frontend",
            },
        }
    }

    pub fn replicas(&self, replicas: &ReplicaSpec) -> i32 {
        match self {
            Role::Api => replicas.api,
            Role::Mcp => replicas.mcp,
            Role::Agent => replicas.agent,
            Role::Frontend => replicas.frontend,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.params().component)
    }
}

/// One step of a reconcile pass. Steps run strictly in [`Subsystem::pass_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    SharedStorage,
    ObjectStore,
    VectorDatabase,
    Application(Role),
}

impl Subsystem {
    pub fn pass_order() -> Vec<Subsystem> {
        let mut order = vec![
            Subsystem::SharedStorage,
            Subsystem::ObjectStore,
            Subsystem::VectorDatabase,
        ];
        order.extend(Role::ALL.into_iter().map(Subsystem::Application));
        order
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subsystem::SharedStorage => write!(f, "shared storage"),
            Subsystem::ObjectStore => write!(f, "minio"),
            Subsystem::VectorDatabase => write!(f, "vector database"),
            Subsystem::Application(role) => write!(f, "{role} service"),
        }
    }
}

use k8s_openapi::{
    NamespaceResourceScope,
    api::{
        apps::v1::Deployment,
        core::v1::{PersistentVolumeClaim, Service},
    },
};
use kube::{
    Api, Client, Resource, ResourceExt,
    api::{Patch, PatchParams, PostParams},
};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::{
    error::OperatorError,
    stack::{
        entities::{ManagedResource, RAGme, RAGmeStatus, ResourceKind},
        ports::ClusterRepository,
    },
};

pub const FIELD_MANAGER: &str = "ragme-operator";

#[derive(Clone)]
pub struct K8sClusterRepository {
    client: Client,
}

impl K8sClusterRepository {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        }
    }
}

fn api_error(action: &str, kind: ResourceKind, name: &str, e: kube::Error) -> OperatorError {
    error!("failed to {} {} {}: {}", action, kind, name, e);
    OperatorError::from(e)
}

impl ClusterRepository for K8sClusterRepository {
    async fn get_stack(&self, namespace: &str, name: &str) -> Result<Option<RAGme>, OperatorError> {
        self.namespaced::<RAGme>(namespace)
            .get_opt(name)
            .await
            .map_err(|e| {
                error!("failed to fetch stack {}/{}: {}", namespace, name, e);
                OperatorError::from(e)
            })
    }

    async fn update_status(&self, stack: &RAGme, status: &RAGmeStatus) -> Result<(), OperatorError> {
        let namespace = stack
            .namespace()
            .ok_or_else(|| OperatorError::InvalidSpec {
                message: format!("stack {} has no namespace", stack.name_any()),
            })?;
        let patch = json!({ "status": status });

        self.namespaced::<RAGme>(&namespace)
            .patch_status(
                &stack.name_any(),
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(&patch),
            )
            .await
            .map_err(|e| {
                error!("failed to patch status of {}/{}: {}", namespace, stack.name_any(), e);
                OperatorError::from(e)
            })?;

        debug!(phase = ?status.phase, "stack status updated");
        Ok(())
    }

    async fn get_resource(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ManagedResource>, OperatorError> {
        let found = match kind {
            ResourceKind::VolumeClaim => self
                .namespaced::<PersistentVolumeClaim>(namespace)
                .get_opt(name)
                .await
                .map(|pvc| pvc.map(ManagedResource::VolumeClaim)),
            ResourceKind::Deployment => self
                .namespaced::<Deployment>(namespace)
                .get_opt(name)
                .await
                .map(|deployment| deployment.map(ManagedResource::Deployment)),
            ResourceKind::Service => self
                .namespaced::<Service>(namespace)
                .get_opt(name)
                .await
                .map(|service| service.map(ManagedResource::Service)),
        };

        found.map_err(|e| api_error("get", kind, name, e))
    }

    async fn create_resource(&self, resource: &ManagedResource) -> Result<(), OperatorError> {
        let namespace = resource.namespace();
        let params = Self::post_params();

        let created = match resource {
            ManagedResource::VolumeClaim(pvc) => self
                .namespaced::<PersistentVolumeClaim>(namespace)
                .create(&params, pvc)
                .await
                .map(|_| ()),
            ManagedResource::Deployment(deployment) => self
                .namespaced::<Deployment>(namespace)
                .create(&params, deployment)
                .await
                .map(|_| ()),
            ManagedResource::Service(service) => self
                .namespaced::<Service>(namespace)
                .create(&params, service)
                .await
                .map(|_| ()),
        };

        created.map_err(|e| api_error("create", resource.kind(), resource.name(), e))
    }

    async fn update_resource(&self, resource: &ManagedResource) -> Result<(), OperatorError> {
        let namespace = resource.namespace();
        let name = resource.name();
        let params = Self::post_params();

        let replaced = match resource {
            ManagedResource::VolumeClaim(pvc) => self
                .namespaced::<PersistentVolumeClaim>(namespace)
                .replace(name, &params, pvc)
                .await
                .map(|_| ()),
            ManagedResource::Deployment(deployment) => self
                .namespaced::<Deployment>(namespace)
                .replace(name, &params, deployment)
                .await
                .map(|_| ()),
            ManagedResource::Service(service) => self
                .namespaced::<Service>(namespace)
                .replace(name, &params, service)
                .await
                .map(|_| ()),
        };

        replaced.map_err(|e| api_error("update", resource.kind(), name, e))
    }
}

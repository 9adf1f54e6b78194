use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use kube::api::ObjectMeta;

use crate::domain::{
    common::services::Service,
    error::OperatorError,
    stack::{
        entities::{
            AuthenticationSpec, ImageSpec, ManagedResource, MinioSpec, OAuthProviderSpec,
            OAuthSpec, RAGme, RAGmeSpec, RAGmeStatus, ReplicaSpec, ResourceKind, SessionSpec,
            SharedVolumeSpec, StackPhase, StorageSpec, VectorDbSpec, WeaviateSpec,
        },
        ports::ClusterRepository,
    },
};

/// A spec with every field set and both optional subsystems enabled.
pub fn create_full_stack_spec() -> RAGmeSpec {
    RAGmeSpec {
        version: "1.0.0".to_string(),
        images: ImageSpec {
            registry: "ghcr.io/ragme-io".to_string(),
            tag: "v1.0.0".to_string(),
            pull_policy: "Always".to_string(),
        },
        replicas: ReplicaSpec {
            api: 2,
            mcp: 2,
            agent: 1,
            frontend: 2,
        },
        storage: StorageSpec {
            minio: MinioSpec {
                enabled: true,
                storage_size: "20Gi".to_string(),
                access_key: "minio-access".to_string(),
                secret_key: "minio-secret".to_string(),
            },
            shared_volume: SharedVolumeSpec {
                size: "2Gi".to_string(),
                storage_class: Some("standard".to_string()),
            },
        },
        vector_db: VectorDbSpec {
            db_type: "weaviate".to_string(),
            weaviate: WeaviateSpec {
                enabled: true,
                storage_size: "8Gi".to_string(),
            },
        },
        authentication: AuthenticationSpec {
            oauth: OAuthSpec {
                google: OAuthProviderSpec {
                    enabled: true,
                    client_id: "google-id".to_string(),
                    client_secret: "google-secret".to_string(),
                    redirect_uri: "https://ragme.example.com/auth/google/callback".to_string(),
                },
                github: OAuthProviderSpec::default(),
                apple: OAuthProviderSpec::default(),
            },
            session: SessionSpec {
                secret_key: "session-secret".to_string(),
                max_age_seconds: 3600,
                same_site: "strict".to_string(),
            },
        },
    }
}

/// A stored stack, as the API server would return it.
pub fn create_stack(name: &str, namespace: &str, spec: RAGmeSpec) -> RAGme {
    let mut stack = RAGme::new(name, spec);
    stack.metadata = ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        uid: Some(format!("uid-{namespace}-{name}")),
        generation: Some(1),
        ..Default::default()
    };
    stack
}

pub fn create_stack_without_uid(name: &str, namespace: &str) -> RAGme {
    let mut stack = create_stack(name, namespace, RAGmeSpec::default());
    stack.metadata.uid = None;
    stack
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    GetStack,
    UpdateStatus(StackPhase),
    GetResource(ResourceKind, String),
    Create(ResourceKind, String),
    Update(ResourceKind, String),
}

#[derive(Default)]
struct FakeState {
    stacks: BTreeMap<(String, String), RAGme>,
    resources: BTreeMap<(ResourceKind, String, String), ManagedResource>,
    calls: Vec<FakeCall>,
    failing_creates: Vec<String>,
    failing_phase: Option<StackPhase>,
}

/// In-memory cluster store recording every call made against it.
#[derive(Default)]
pub struct InMemoryCluster {
    state: Mutex<FakeState>,
}

impl InMemoryCluster {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn insert_stack(&self, stack: RAGme) {
        let key = (
            stack.metadata.namespace.clone().unwrap_or_default(),
            stack.metadata.name.clone().unwrap_or_default(),
        );
        self.lock().stacks.insert(key, stack);
    }

    pub fn edit_stack(&self, namespace: &str, name: &str, edit: impl FnOnce(&mut RAGmeSpec)) {
        let mut state = self.lock();
        let stack = state
            .stacks
            .get_mut(&(namespace.to_string(), name.to_string()))
            .unwrap();
        edit(&mut stack.spec);
        stack.metadata.generation = stack.metadata.generation.map(|g| g + 1);
    }

    pub fn delete_stack(&self, namespace: &str, name: &str) {
        self.lock()
            .stacks
            .remove(&(namespace.to_string(), name.to_string()));
    }

    pub fn stored_stack(&self, namespace: &str, name: &str) -> Option<RAGme> {
        self.lock()
            .stacks
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn stored_status(&self, namespace: &str, name: &str) -> Option<RAGmeStatus> {
        self.stored_stack(namespace, name).and_then(|s| s.status)
    }

    pub fn fail_create_of(&self, name: &str) {
        self.lock().failing_creates.push(name.to_string());
    }

    /// Rejects status writes that carry `phase`. The attempt is still recorded.
    pub fn fail_status_of(&self, phase: StackPhase) {
        self.lock().failing_phase = Some(phase);
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn phase_history(&self) -> Vec<StackPhase> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                FakeCall::UpdateStatus(phase) => Some(phase),
                _ => None,
            })
            .collect()
    }

    pub fn resources(&self) -> Vec<ManagedResource> {
        self.lock().resources.values().cloned().collect()
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.lock()
            .resources
            .keys()
            .filter(|(k, _, _)| *k == kind)
            .count()
    }

    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        self.lock()
            .resources
            .keys()
            .any(|(k, _, n)| *k == kind && n == name)
    }

    pub fn replicas(&self, deployment: &str) -> Option<i32> {
        self.lock()
            .resources
            .iter()
            .find_map(|((kind, _, name), resource)| match resource {
                ManagedResource::Deployment(d)
                    if *kind == ResourceKind::Deployment && name == deployment =>
                {
                    d.spec.as_ref().and_then(|s| s.replicas)
                }
                _ => None,
            })
    }

    fn key(resource: &ManagedResource) -> (ResourceKind, String, String) {
        (
            resource.kind(),
            resource.namespace().to_string(),
            resource.name().to_string(),
        )
    }
}

impl ClusterRepository for InMemoryCluster {
    async fn get_stack(&self, namespace: &str, name: &str) -> Result<Option<RAGme>, OperatorError> {
        let mut state = self.lock();
        state.calls.push(FakeCall::GetStack);
        Ok(state
            .stacks
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn update_status(&self, stack: &RAGme, status: &RAGmeStatus) -> Result<(), OperatorError> {
        let mut state = self.lock();
        if let Some(phase) = status.phase {
            state.calls.push(FakeCall::UpdateStatus(phase));
        }
        if status.phase.is_some() && status.phase == state.failing_phase {
            return Err(OperatorError::ApiError {
                message: "simulated status failure".to_string(),
            });
        }
        let key = (
            stack.metadata.namespace.clone().unwrap_or_default(),
            stack.metadata.name.clone().unwrap_or_default(),
        );
        match state.stacks.get_mut(&key) {
            Some(stored) => {
                stored.status = Some(status.clone());
                Ok(())
            }
            None => Err(OperatorError::ApiError {
                message: "stack not found".to_string(),
            }),
        }
    }

    async fn get_resource(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ManagedResource>, OperatorError> {
        let mut state = self.lock();
        state.calls.push(FakeCall::GetResource(kind, name.to_string()));
        Ok(state
            .resources
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_resource(&self, resource: &ManagedResource) -> Result<(), OperatorError> {
        let mut state = self.lock();
        let key = Self::key(resource);
        state
            .calls
            .push(FakeCall::Create(resource.kind(), key.2.clone()));
        if state.failing_creates.contains(&key.2) {
            return Err(OperatorError::ApiError {
                message: format!("simulated create failure for {}", key.2),
            });
        }
        if state.resources.contains_key(&key) {
            return Err(OperatorError::ApiError {
                message: format!("{} already exists", key.2),
            });
        }
        state.resources.insert(key, resource.clone());
        Ok(())
    }

    async fn update_resource(&self, resource: &ManagedResource) -> Result<(), OperatorError> {
        let mut state = self.lock();
        let key = Self::key(resource);
        state
            .calls
            .push(FakeCall::Update(resource.kind(), key.2.clone()));
        if !state.resources.contains_key(&key) {
            return Err(OperatorError::ApiError {
                message: format!("{} not found", key.2),
            });
        }
        state.resources.insert(key, resource.clone());
        Ok(())
    }
}

/// Service over an in-memory cluster already holding one stack.
pub fn fake_service_with_stack(
    name: &str,
    namespace: &str,
    spec: RAGmeSpec,
) -> Service<InMemoryCluster> {
    let cluster = InMemoryCluster::default();
    cluster.insert_stack(create_stack(name, namespace, spec));
    Service::new(cluster)
}

pub mod scenarios {
    use crate::domain::{
        common::{services::Service, testing::TestServiceBuilder},
        error::OperatorError,
        stack::{
            entities::RAGmeSpec,
            ports::MockClusterRepository,
            test_helpers::{create_full_stack_spec, create_stack, create_stack_without_uid},
        },
    };

    pub fn customize<F>(configurator: F) -> Service<MockClusterRepository>
    where
        F: FnOnce(&mut MockClusterRepository),
    {
        TestServiceBuilder::new()
            .customize_cluster_repository(configurator)
            .build()
    }

    /// Scenario: the stack has been deleted
    pub fn stack_not_found() -> Service<MockClusterRepository> {
        customize(|mock| {
            mock.expect_get_stack()
                .returning(|_, _| Box::pin(async move { Ok(None) }));
            mock.expect_update_status().times(0);
            mock.expect_create_resource().times(0);
        })
    }

    /// Scenario: reading the stack fails
    pub fn stack_fetch_fails() -> Service<MockClusterRepository> {
        customize(|mock| {
            mock.expect_get_stack().returning(|_, _| {
                Box::pin(async move {
                    Err(OperatorError::ApiError {
                        message: "Simulated failure".to_string(),
                    })
                })
            });
            mock.expect_update_status().times(0);
        })
    }

    /// Scenario: the status subresource rejects every write
    pub fn status_update_fails() -> Service<MockClusterRepository> {
        customize(|mock| {
            mock.expect_get_stack().returning(|_, _| {
                Box::pin(async move {
                    Ok(Some(create_stack("demo", "default", create_full_stack_spec())))
                })
            });
            mock.expect_update_status().times(1).returning(|_, _| {
                Box::pin(async move {
                    Err(OperatorError::ApiError {
                        message: "Simulated failure".to_string(),
                    })
                })
            });
            mock.expect_get_resource().times(0);
            mock.expect_create_resource().times(0);
        })
    }

    /// Scenario: the stack was never persisted and has no uid
    pub fn stack_without_uid() -> Service<MockClusterRepository> {
        customize(|mock| {
            mock.expect_get_stack().returning(|_, _| {
                Box::pin(async move { Ok(Some(create_stack_without_uid("demo", "default"))) })
            });
            mock.expect_update_status().times(0);
            mock.expect_get_resource().times(0);
            mock.expect_create_resource().times(0);
        })
    }

    /// Scenario: an empty cluster where creating `failing` is rejected
    pub fn create_fails_for(failing: &str) -> Service<MockClusterRepository> {
        let failing = failing.to_string();
        customize(move |mock| {
            mock.expect_get_stack().returning(|_, _| {
                Box::pin(async move {
                    Ok(Some(create_stack("demo", "default", RAGmeSpec::default())))
                })
            });
            mock.expect_update_status()
                .returning(|_, _| Box::pin(async move { Ok(()) }));
            mock.expect_get_resource()
                .returning(|_, _, _| Box::pin(async move { Ok(None) }));
            mock.expect_create_resource().returning(move |resource| {
                let result = if resource.name() == failing {
                    Err(OperatorError::ApiError {
                        message: "Simulated failure".to_string(),
                    })
                } else {
                    Ok(())
                };
                Box::pin(async move { result })
            });
        })
    }
}

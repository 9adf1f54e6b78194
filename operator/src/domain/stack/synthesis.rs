use std::collections::BTreeMap;

use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::{
            Container, ContainerPort, EmptyDirVolumeSource, EnvVar, HTTPGetAction,
            PersistentVolumeClaim, PersistentVolumeClaimSpec, PersistentVolumeClaimVolumeSource,
            PodSpec, PodTemplateSpec, Probe, Service, ServicePort, ServiceSpec, Volume,
            VolumeMount, VolumeResourceRequirements,
        },
    },
    apimachinery::pkg::{
        api::resource::Quantity, apis::meta::v1::LabelSelector, util::intstr::IntOrString,
    },
};
use kube::api::ObjectMeta;

use crate::domain::stack::entities::{
    ManagedResource, OAuthProviderSpec, RAGmeSpec, Role, Subsystem,
};

pub const APP_LABEL_VALUE: &str = "ragme";

pub const MINIO_IMAGE: &str = "minio/minio:latest";
pub const MINIO_API_PORT: i32 = 9000;
pub const MINIO_CONSOLE_PORT: i32 = 9001;

pub const WEAVIATE_IMAGE: &str = "semitechnologies/weaviate:1.25.0";
pub const WEAVIATE_HTTP_PORT: i32 = 8080;
pub const SUPPORTED_VECTOR_DB: &str = "weaviate";

const SHARED_COMPONENT: &str = "shared";
const MINIO_COMPONENT: &str = "minio";
const WEAVIATE_COMPONENT: &str = "weaviate";

const LOGS_VOLUME: &str = "logs";
const LOGS_MOUNT_PATH: &str = "/app/logs";
const SHARED_VOLUME: &str = "shared";
const WATCH_DIRECTORY: &str = "/app/watch_directory";

/// `{instance}-{component}`.
pub fn resource_name(instance: &str, component: &str) -> String {
    format!("{instance}-{component}")
}

pub fn claim_name(instance: &str, component: &str) -> String {
    format!("{instance}-{component}-pvc")
}

/// Label set used both on created objects and as their selector.
pub fn component_labels(instance: &str, component: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app".to_string(), APP_LABEL_VALUE.to_string()),
        ("component".to_string(), component.to_string()),
        ("instance".to_string(), instance.to_string()),
    ])
}

fn env(name: &str, value: impl Into<String>) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.into()),
        ..Default::default()
    }
}

fn http_check(path: &str, port: i32, initial_delay_seconds: i32) -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some(path.to_string()),
            port: IntOrString::Int(port),
            ..Default::default()
        }),
        initial_delay_seconds: Some(initial_delay_seconds),
        period_seconds: Some(10),
        ..Default::default()
    }
}

fn container_port(name: &str, port: i32) -> ContainerPort {
    ContainerPort {
        name: Some(name.to_string()),
        container_port: port,
        protocol: Some("TCP".to_string()),
        ..Default::default()
    }
}

fn service_port(name: &str, port: i32) -> ServicePort {
    ServicePort {
        name: Some(name.to_string()),
        port,
        target_port: Some(IntOrString::Int(port)),
        protocol: Some("TCP".to_string()),
        ..Default::default()
    }
}

/// Pure builder of every child object a stack needs.
///
/// Output depends only on the instance name, namespace and the defaulted
/// spec, so re-synthesizing the same stack always yields the same objects.
pub struct Synthesizer<'a> {
    instance: &'a str,
    namespace: &'a str,
    spec: &'a RAGmeSpec,
}

impl<'a> Synthesizer<'a> {
    pub fn new(instance: &'a str, namespace: &'a str, spec: &'a RAGmeSpec) -> Self {
        Self {
            instance,
            namespace,
            spec,
        }
    }

    /// Objects for one pass step, in creation order. Disabled subsystems
    /// yield nothing.
    pub fn resources_for(&self, subsystem: Subsystem) -> Vec<ManagedResource> {
        match subsystem {
            Subsystem::SharedStorage => vec![self.shared_volume_claim()],
            Subsystem::ObjectStore => self.minio_resources(),
            Subsystem::VectorDatabase => self.vector_db_resources(),
            Subsystem::Application(role) => self.role_resources(role),
        }
    }

    fn metadata(&self, name: String, component: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name),
            namespace: Some(self.namespace.to_string()),
            labels: Some(component_labels(self.instance, component)),
            ..Default::default()
        }
    }

    fn volume_claim(
        &self,
        component: &str,
        access_mode: &str,
        size: &str,
        storage_class: Option<String>,
    ) -> PersistentVolumeClaim {
        PersistentVolumeClaim {
            metadata: self.metadata(claim_name(self.instance, component), component),
            spec: Some(PersistentVolumeClaimSpec {
                access_modes: Some(vec![access_mode.to_string()]),
                resources: Some(VolumeResourceRequirements {
                    requests: Some(BTreeMap::from([(
                        "storage".to_string(),
                        Quantity(size.to_string()),
                    )])),
                    ..Default::default()
                }),
                storage_class_name: storage_class,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn deployment(&self, component: &str, replicas: i32, pod: PodSpec) -> Deployment {
        let labels = component_labels(self.instance, component);
        Deployment {
            metadata: self.metadata(resource_name(self.instance, component), component),
            spec: Some(DeploymentSpec {
                replicas: Some(replicas),
                selector: LabelSelector {
                    match_labels: Some(labels.clone()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..Default::default()
                    }),
                    spec: Some(pod),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn service(&self, component: &str, ports: Vec<ServicePort>) -> Service {
        Service {
            metadata: self.metadata(resource_name(self.instance, component), component),
            spec: Some(ServiceSpec {
                selector: Some(component_labels(self.instance, component)),
                ports: Some(ports),
                type_: Some("ClusterIP".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn claim_volume(name: &str, claim: String) -> Volume {
        Volume {
            name: name.to_string(),
            persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                claim_name: claim,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn mount(name: &str, path: &str) -> VolumeMount {
        VolumeMount {
            name: name.to_string(),
            mount_path: path.to_string(),
            ..Default::default()
        }
    }

    pub fn shared_volume_claim(&self) -> ManagedResource {
        let shared = &self.spec.storage.shared_volume;
        ManagedResource::VolumeClaim(self.volume_claim(
            SHARED_COMPONENT,
            "ReadWriteMany",
            &shared.size,
            shared.storage_class.clone(),
        ))
    }

    pub fn minio_resources(&self) -> Vec<ManagedResource> {
        let minio = &self.spec.storage.minio;
        if !minio.enabled {
            return Vec::new();
        }

        let claim = self.volume_claim(MINIO_COMPONENT, "ReadWriteOnce", &minio.storage_size, None);

        let container = Container {
            name: MINIO_COMPONENT.to_string(),
            image: Some(MINIO_IMAGE.to_string()),
            args: Some(vec![
                "server".to_string(),
                "/data".to_string(),
                "--console-address".to_string(),
                format!(":{MINIO_CONSOLE_PORT}"),
            ]),
            env: Some(vec![
                env("MINIO_ROOT_USER", minio.access_key.as_str()),
                env("MINIO_ROOT_PASSWORD", minio.secret_key.as_str()),
            ]),
            ports: Some(vec![
                container_port("api", MINIO_API_PORT),
                container_port("console", MINIO_CONSOLE_PORT),
            ]),
            volume_mounts: Some(vec![Self::mount("data", "/data")]),
            liveness_probe: Some(http_check("/minio/health/live", MINIO_API_PORT, 30)),
            readiness_probe: Some(http_check("/minio/health/ready", MINIO_API_PORT, 10)),
            ..Default::default()
        };
        let pod = PodSpec {
            containers: vec![container],
            volumes: Some(vec![Self::claim_volume(
                "data",
                claim_name(self.instance, MINIO_COMPONENT),
            )]),
            ..Default::default()
        };

        vec![
            ManagedResource::VolumeClaim(claim),
            ManagedResource::Deployment(self.deployment(MINIO_COMPONENT, 1, pod)),
            ManagedResource::Service(self.service(
                MINIO_COMPONENT,
                vec![
                    service_port("api", MINIO_API_PORT),
                    service_port("console", MINIO_CONSOLE_PORT),
                ],
            )),
        ]
    }

    fn weaviate_active(&self) -> bool {
        self.spec.vector_db.db_type == SUPPORTED_VECTOR_DB && self.spec.vector_db.weaviate.enabled
    }

    pub fn vector_db_resources(&self) -> Vec<ManagedResource> {
        if !self.weaviate_active() {
            return Vec::new();
        }
        let weaviate = &self.spec.vector_db.weaviate;

        let claim = self.volume_claim(
            WEAVIATE_COMPONENT,
            "ReadWriteOnce",
            &weaviate.storage_size,
            None,
        );

        let container = Container {
            name: WEAVIATE_COMPONENT.to_string(),
            image: Some(WEAVIATE_IMAGE.to_string()),
            env: Some(vec![
                env("QUERY_DEFAULTS_LIMIT", "25"),
                env("AUTHENTICATION_ANONYMOUS_ACCESS_ENABLED", "true"),
                env("PERSISTENCE_DATA_PATH", "/var/lib/weaviate"),
                env("DEFAULT_VECTORIZER_MODULE", "none"),
                env("ENABLE_MODULES", ""),
                env("CLUSTER_HOSTNAME", "node1"),
            ]),
            ports: Some(vec![container_port("http", WEAVIATE_HTTP_PORT)]),
            volume_mounts: Some(vec![Self::mount("data", "/var/lib/weaviate")]),
            liveness_probe: Some(http_check("/v1/.well-known/live", WEAVIATE_HTTP_PORT, 30)),
            readiness_probe: Some(http_check("/v1/.well-known/ready", WEAVIATE_HTTP_PORT, 10)),
            ..Default::default()
        };
        let pod = PodSpec {
            containers: vec![container],
            volumes: Some(vec![Self::claim_volume(
                "data",
                claim_name(self.instance, WEAVIATE_COMPONENT),
            )]),
            ..Default::default()
        };

        vec![
            ManagedResource::VolumeClaim(claim),
            ManagedResource::Deployment(self.deployment(WEAVIATE_COMPONENT, 1, pod)),
            ManagedResource::Service(self.service(
                WEAVIATE_COMPONENT,
                vec![service_port("http", WEAVIATE_HTTP_PORT)],
            )),
        ]
    }

    fn role_image(&self, role: Role) -> String {
        let images = &self.spec.images;
        let repository = format!("ragme-{}", role.params().image_suffix);
        if images.registry.is_empty() {
            format!("{repository}:{}", images.tag)
        } else {
            format!(
                "{}/{repository}:{}",
                images.registry.trim_end_matches('/'),
                images.tag
            )
        }
    }

    fn service_url(&self, role: Role) -> Option<String> {
        let params = role.params();
        params.port.map(|port| {
            format!(
                "http://{}:{port}",
                resource_name(self.instance, params.component)
            )
        })
    }

    /// Environment shared by every application role.
    pub fn base_env(&self) -> Vec<EnvVar> {
        let mut vars = vec![env("RAGME_VERSION", self.spec.version.as_str())];

        for (name, role) in [
            ("RAGME_API_URL", Role::Api),
            ("RAGME_MCP_URL", Role::Mcp),
            ("RAGME_FRONTEND_URL", Role::Frontend),
        ] {
            if let Some(url) = self.service_url(role) {
                vars.push(env(name, url));
            }
        }

        vars.push(env("VECTOR_DB_TYPE", self.spec.vector_db.db_type.as_str()));
        if self.weaviate_active() {
            vars.push(env(
                "WEAVIATE_URL",
                format!(
                    "http://{}:{WEAVIATE_HTTP_PORT}",
                    resource_name(self.instance, WEAVIATE_COMPONENT)
                ),
            ));
        }

        let minio = &self.spec.storage.minio;
        if minio.enabled {
            vars.push(env(
                "MINIO_ENDPOINT",
                format!(
                    "{}:{MINIO_API_PORT}",
                    resource_name(self.instance, MINIO_COMPONENT)
                ),
            ));
            vars.push(env("MINIO_ACCESS_KEY", minio.access_key.as_str()));
            vars.push(env("MINIO_SECRET_KEY", minio.secret_key.as_str()));
        }

        vars.push(env("WATCH_DIRECTORY", WATCH_DIRECTORY));
        vars
    }

    fn oauth_env(prefix: &str, provider: &OAuthProviderSpec) -> Vec<EnvVar> {
        if !provider.enabled {
            return Vec::new();
        }
        vec![
            env(&format!("{prefix}_OAUTH_CLIENT_ID"), provider.client_id.as_str()),
            env(
                &format!("{prefix}_OAUTH_CLIENT_SECRET"),
                provider.client_secret.as_str(),
            ),
            env(
                &format!("{prefix}_OAUTH_REDIRECT_URI"),
                provider.redirect_uri.as_str(),
            ),
        ]
    }

    fn role_env(&self) -> Vec<EnvVar> {
        let mut vars = self.base_env();

        let oauth = &self.spec.authentication.oauth;
        vars.extend(Self::oauth_env("GOOGLE", &oauth.google));
        vars.extend(Self::oauth_env("GITHUB", &oauth.github));
        vars.extend(Self::oauth_env("APPLE", &oauth.apple));

        let session = &self.spec.authentication.session;
        if !session.secret_key.is_empty() {
            vars.push(env("SESSION_SECRET_KEY", session.secret_key.as_str()));
            vars.push(env(
                "SESSION_MAX_AGE",
                session.max_age_seconds.to_string(),
            ));
            vars.push(env("SESSION_SAME_SITE", session.same_site.as_str()));
        }
        vars
    }

    /// Deployment for `role`, plus a service when the role exposes a port.
    pub fn role_resources(&self, role: Role) -> Vec<ManagedResource> {
        let params = role.params();

        let mut container = Container {
            name: params.component.to_string(),
            image: Some(self.role_image(role)),
            image_pull_policy: Some(self.spec.images.pull_policy.clone()),
            env: Some(self.role_env()),
            volume_mounts: Some(vec![
                Self::mount(LOGS_VOLUME, LOGS_MOUNT_PATH),
                Self::mount(SHARED_VOLUME, WATCH_DIRECTORY),
            ]),
            ..Default::default()
        };
        if let Some(port) = params.port {
            container.ports = Some(vec![container_port("http", port)]);
            container.liveness_probe = Some(http_check("/health", port, 30));
            container.readiness_probe = Some(http_check("/ready", port, 10));
        }

        let pod = PodSpec {
            containers: vec![container],
            volumes: Some(vec![
                Volume {
                    name: LOGS_VOLUME.to_string(),
                    empty_dir: Some(EmptyDirVolumeSource::default()),
                    ..Default::default()
                },
                Self::claim_volume(SHARED_VOLUME, claim_name(self.instance, SHARED_COMPONENT)),
            ]),
            ..Default::default()
        };

        let mut resources = vec![ManagedResource::Deployment(self.deployment(
            params.component,
            role.replicas(&self.spec.replicas),
            pod,
        ))];
        if let Some(port) = params.port {
            resources.push(ManagedResource::Service(
                self.service(params.component, vec![service_port("http", port)]),
            ));
        }
        resources
    }
}

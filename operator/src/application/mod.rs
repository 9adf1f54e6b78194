use std::sync::Arc;

use kube::Client;
use tracing::{debug, error, info};

use crate::{
    application::stack::controller::run_stack_controller,
    domain::{
        common::{OperatorConfig, services::Service},
        error::OperatorError,
    },
    infrastructure::stack::repositories::k8s::K8sClusterRepository,
};

pub mod logging;
pub mod stack;

pub type OperatorService = Service<K8sClusterRepository>;
pub struct OperatorApp;

pub fn create_service(client: Client) -> OperatorService {
    let cluster_repository = K8sClusterRepository::new(client);

    Service::new(cluster_repository)
}

impl OperatorApp {
    pub async fn run(config: OperatorConfig) -> Result<(), OperatorError> {
        debug!("initializing kubernetes client...");
        let client = Client::try_default().await.map_err(|e| {
            error!("unable to create the Kubernetes client: {:?}", e);
            OperatorError::InternalServerError {
                message: format!("Kubernetes client error: {}", e),
            }
        })?;

        info!("kubernetes client initialized");

        let service = Arc::new(create_service(client.clone()));
        info!("service initialized");

        info!(
            namespace = config.namespace.as_deref().unwrap_or("*"),
            concurrency = config.concurrency,
            "stack controller starting"
        );
        run_stack_controller(client, service, config).await;

        info!("stack controller has stopped");
        Ok(())
    }
}

use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    common::services::Service,
    error::OperatorError,
    stack::{
        defaults::apply_defaults,
        entities::{
            ManagedResource, RAGme, RAGmeStatus, ReconcileOutcome, ResourceAction, StackPhase,
            Subsystem,
        },
        ownership::{owner_reference, stamp_owner},
        ports::{ClusterRepository, StackService},
        synthesis::Synthesizer,
    },
};

/// Moves the mutable part of `desired` onto the stored object so that the
/// update carries the server's metadata (resource version, uid, ...).
fn overwrite_spec(
    existing: ManagedResource,
    desired: ManagedResource,
) -> Result<ManagedResource, OperatorError> {
    match (existing, desired) {
        (ManagedResource::Deployment(mut existing), ManagedResource::Deployment(desired)) => {
            existing.spec = desired.spec;
            Ok(ManagedResource::Deployment(existing))
        }
        (existing, desired) => Err(OperatorError::InternalServerError {
            message: format!(
                "cannot overwrite {} {} with {}",
                existing.kind(),
                existing.name(),
                desired.kind()
            ),
        }),
    }
}

impl<C> Service<C>
where
    C: ClusterRepository,
{
    /// Convergence engine: get, then create, update or leave alone.
    pub async fn converge_resource(
        &self,
        mut desired: ManagedResource,
        owner: &OwnerReference,
    ) -> Result<ResourceAction, OperatorError> {
        let kind = desired.kind();
        let existing = self
            .cluster_repository
            .get_resource(kind, desired.namespace(), desired.name())
            .await?;

        match existing {
            None => {
                stamp_owner(&mut desired, owner)?;
                debug!(%kind, name = desired.name(), "creating resource");
                self.cluster_repository.create_resource(&desired).await?;
                Ok(ResourceAction::Create)
            }
            Some(mut existing) if kind.is_mutable() => {
                stamp_owner(&mut existing, owner)?;
                let updated = overwrite_spec(existing, desired)?;
                debug!(%kind, name = updated.name(), "updating resource");
                self.cluster_repository.update_resource(&updated).await?;
                Ok(ResourceAction::Update)
            }
            Some(_) => {
                debug!(%kind, name = desired.name(), "resource exists, leaving untouched");
                Ok(ResourceAction::NoOp)
            }
        }
    }

    async fn reconcile_subsystem(
        &self,
        synthesizer: &Synthesizer<'_>,
        subsystem: Subsystem,
        owner: &OwnerReference,
    ) -> Result<(), OperatorError> {
        for resource in synthesizer.resources_for(subsystem) {
            self.converge_resource(resource, owner)
                .await
                .map_err(|e| OperatorError::subsystem(subsystem, e))?;
        }
        Ok(())
    }

    async fn write_phase(&self, stack: &RAGme, phase: StackPhase) -> Result<(), OperatorError> {
        let status = RAGmeStatus {
            phase: Some(phase),
            observed_generation: stack.metadata.generation,
            last_reconcile_time: Some(Utc::now().to_rfc3339()),
        };

        self.cluster_repository
            .update_status(stack, &status)
            .await
            .map_err(|e| OperatorError::StatusUpdateError {
                message: e.to_string(),
            })
    }
}

impl<C> StackService for Service<C>
where
    C: ClusterRepository,
{
    #[instrument(skip(self))]
    async fn reconcile_stack(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ReconcileOutcome, OperatorError> {
        if namespace.is_empty() || name.is_empty() {
            return Err(OperatorError::InvalidSpec {
                message: "Stack namespace and name cannot be empty".into(),
            });
        }

        let Some(stack) = self.cluster_repository.get_stack(namespace, name).await? else {
            info!("stack not found, assuming it was deleted");
            return Ok(ReconcileOutcome::Deleted);
        };

        let mut spec = stack.spec.clone();
        apply_defaults(&mut spec);
        let owner = owner_reference(&stack)?;

        self.write_phase(&stack, StackPhase::Reconciling).await?;

        let synthesizer = Synthesizer::new(name, namespace, &spec);
        for subsystem in Subsystem::pass_order() {
            if let Err(e) = self.reconcile_subsystem(&synthesizer, subsystem, &owner).await {
                warn!(%subsystem, error = %e, "reconcile pass aborted");
                return Err(e);
            }
        }

        self.write_phase(&stack, StackPhase::Ready).await?;
        info!("stack converged");

        Ok(ReconcileOutcome::Converged)
    }
}

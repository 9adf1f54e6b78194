use crate::domain::{
    error::OperatorError,
    stack::entities::{ManagedResource, RAGme, RAGmeStatus, ReconcileOutcome, ResourceKind},
};

#[cfg_attr(test, mockall::automock)]
pub trait StackService: Send + Sync {
    /// Runs one full reconcile pass for the stack `namespace/name`.
    fn reconcile_stack(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<ReconcileOutcome, OperatorError>> + Send;
}

/// Platform access used by a reconcile pass. Every call is a single-object
/// read or write; nothing here spans more than one resource.
#[cfg_attr(test, mockall::automock)]
pub trait ClusterRepository: Send + Sync {
    /// Latest stored version of the stack, `None` once it has been deleted.
    fn get_stack(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<RAGme>, OperatorError>> + Send;

    fn update_status(
        &self,
        stack: &RAGme,
        status: &RAGmeStatus,
    ) -> impl Future<Output = Result<(), OperatorError>> + Send;

    fn get_resource(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<ManagedResource>, OperatorError>> + Send;

    fn create_resource(
        &self,
        resource: &ManagedResource,
    ) -> impl Future<Output = Result<(), OperatorError>> + Send;

    fn update_resource(
        &self,
        resource: &ManagedResource,
    ) -> impl Future<Output = Result<(), OperatorError>> + Send;
}

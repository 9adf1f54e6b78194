use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Resource, ResourceExt};

use crate::domain::{
    error::OperatorError,
    stack::entities::{ManagedResource, RAGme},
};

/// Controller reference pointing at `stack`. Requires the stack to have been
/// persisted, i.e. to carry a uid.
pub fn owner_reference(stack: &RAGme) -> Result<OwnerReference, OperatorError> {
    stack
        .controller_owner_ref(&())
        .ok_or_else(|| OperatorError::OwnerReferenceError {
            message: format!("stack {} has no uid", stack.name_any()),
        })
}

/// Attaches `owner` to `resource` before it is created or overwritten. A
/// stored object that lacks the reference is adopted.
///
/// A resource already controlled by another object is rejected: only one
/// controller reference may exist per object.
pub fn stamp_owner(
    resource: &mut ManagedResource,
    owner: &OwnerReference,
) -> Result<(), OperatorError> {
    let name = resource.name().to_string();
    let references = resource
        .metadata_mut()
        .owner_references
        .get_or_insert_with(Vec::new);

    if let Some(other) = references
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != owner.uid)
    {
        return Err(OperatorError::OwnerReferenceError {
            message: format!(
                "{name} is already controlled by {} {}",
                other.kind, other.name
            ),
        });
    }

    if !references.iter().any(|r| r.uid == owner.uid) {
        references.push(owner.clone());
    }
    Ok(())
}

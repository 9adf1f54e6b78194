use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("Internal server error: {message}")]
    InternalServerError { message: String },

    #[error("Invalid spec: {message}")]
    InvalidSpec { message: String },

    #[error("Kubernetes API error: {message}")]
    ApiError { message: String },

    #[error("Failed to update stack status: {message}")]
    StatusUpdateError { message: String },

    #[error("Failed to set owner reference: {message}")]
    OwnerReferenceError { message: String },

    #[error("Failed to reconcile {subsystem}: {source}")]
    SubsystemError {
        subsystem: String,
        #[source]
        source: Box<OperatorError>,
    },

    #[error("Reconcile pass exceeded its {seconds}s deadline")]
    Timeout { seconds: u64 },
}

impl OperatorError {
    pub fn subsystem(subsystem: impl ToString, source: OperatorError) -> Self {
        OperatorError::SubsystemError {
            subsystem: subsystem.to_string(),
            source: Box::new(source),
        }
    }
}

impl From<kube::Error> for OperatorError {
    fn from(error: kube::Error) -> Self {
        OperatorError::ApiError {
            message: error.to_string(),
        }
    }
}

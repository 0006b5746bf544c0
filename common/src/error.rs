use thiserror::Error;

/// Structural faults in the job result document. Malformed leaf values are
/// never reported here.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("job document must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("job document has no {0} list")]
    MissingField(&'static str),
    #[error("job document field {field} must be a list, got {kind}")]
    NotAnArray {
        field: &'static str,
        kind: &'static str,
    },
}

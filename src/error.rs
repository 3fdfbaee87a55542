use thiserror::Error;

/// Errors surfaced by the event model, the consumer models, and the subscription plumbing.
///
/// Construction-time validation errors (`InvalidArgument`) are returned synchronously to the
/// caller. Mapping and listener errors encountered on the dispatch path are logged and do not
/// propagate here; see `spec.md` section 7 for the full propagation policy.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown wire event kind: {0}")]
    UnknownEvent(String),

    #[error("feed error: {0}")]
    FeedError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("operation on a closed subscription or publisher")]
    InvalidState,
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Errors that can occur while partitioning ranges or rendering zone text.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// A declared range endpoint was not a valid dotted IPv4 address.
    #[error("invalid IPv4 address '{0}' in range declaration")]
    InvalidAddress(String),
    /// An extension has records to render but no zone metadata entry.
    #[error("no zone metadata for extension '{0}'")]
    MissingZoneMeta(String),
    /// A range group carried no extensions; cannot pick SOA parameters.
    #[error("range group for {0} has no extensions")]
    EmptyGroup(String),
}

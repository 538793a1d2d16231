use thiserror::Error;

/// Error type for event store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("i/o error on {collection}: {source}")]
    Io {
        collection: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {collection} document: {source}")]
    Serialize {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("corrupt {collection} document at line {line}: {source}")]
    Corrupt {
        collection: &'static str,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

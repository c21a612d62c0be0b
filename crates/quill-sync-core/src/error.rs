use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncCoreError {
    #[error("CBOR encode error: {0}")]
    CborEncode(String),

    #[error("CBOR decode error: {0}")]
    CborDecode(String),

    #[error("path does not belong to a managed item: {0}")]
    NotASystemPath(String),

    #[error("unknown item type: {0}")]
    UnknownItemType(String),
}

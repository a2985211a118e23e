//! Payload types for remote API requests.

/// One file of a ticket upload. `file_name` is the path relative to the
/// upload root, `/`-separated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPart {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct CodeExchangeRequest<'a> {
    pub(super) code: &'a str,
}

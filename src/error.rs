use thiserror::Error;

/// Failures that abort a run and are surfaced to the user.
///
/// Per-member fetch failures never appear here: a single member failing must
/// not abort the batch, it only shrinks the sample. Cancellation is not an
/// error either; it is a distinct run outcome.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("could not fetch the member list for group `{group}`")]
    Resolution {
        group: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no Steam API key; pass --api-key or create steam_api_key.secret")]
    MissingApiKey,

    #[error("group identifier is empty")]
    EmptyGroupId,
}

use thiserror::Error;

use crate::api_client::ApiError;
use crate::models::profile::{Section, UnknownSection};
use crate::store::StoreError;

/// Application-level error type for commands that act on the API directly.
/// Profile fetches never produce one of these: their failures are recorded as state.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No user is logged in on this device")]
    NoSubject,

    #[error(transparent)]
    UnknownSection(#[from] UnknownSection),

    #[error("Entries of section '{0}' cannot be removed")]
    NotRemovable(Section),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

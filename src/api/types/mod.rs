//! API wire types

mod ask;
mod error;

pub use ask::{AskMeta, AskRequest, AskResponse};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};

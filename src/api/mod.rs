//! HTTP surface

pub mod ask;
pub mod health;
pub mod router;
pub mod state;
pub mod stats;
pub mod types;

pub use router::create_router;
pub use state::AppState;

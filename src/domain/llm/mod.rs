//! Generative model boundary

mod provider;

pub use provider::GenerativeModel;

#[cfg(test)]
pub use provider::mock::MockGenerativeModel;

//! Statistics tracking

mod tracker;

pub use tracker::StatsTracker;

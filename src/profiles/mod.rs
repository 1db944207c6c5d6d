//! Seeded synthetic profiles for load and renewable resources.

/// Flat data-center demand.
pub mod load;
/// Half-cosine solar capacity factor.
pub mod solar;
pub mod types;
/// Autoregressive wind capacity factor.
pub mod wind;

pub use load::DataCenterLoad;
pub use solar::SolarProfile;
pub use types::Profile;
pub use wind::WindProfile;

//! Settings for filemeta.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod filemeta_config;
pub mod gate_settings;
pub mod policy_settings;

pub use filemeta_config::{CliOverrides, FilemetaConfig};
pub use gate_settings::GateSettings;
pub use policy_settings::PolicySettings;

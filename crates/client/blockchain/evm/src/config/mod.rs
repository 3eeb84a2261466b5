//! EVM configuration and deployment.

pub mod deployment;
pub mod network;

// Re-export commonly used items
pub use deployment::{ContractArtifacts, DeploymentInfo};
pub use network::{ConfigError, EvmConfig};

pub mod config;
pub mod error;
pub mod normalize;
pub mod policy;
pub mod types;

pub use config::Config;
pub use error::ClaimPulseError;
pub use normalize::*;
pub use policy::*;
pub use types::*;

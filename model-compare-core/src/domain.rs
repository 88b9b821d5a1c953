pub mod ids;
pub mod config;
pub mod samples;
pub mod descriptive;

pub use ids::*;
pub use config::*;
pub use samples::*;
pub use descriptive::*;

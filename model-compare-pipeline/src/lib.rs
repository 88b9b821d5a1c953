pub mod aggregator;
pub mod executor;
pub mod pipeline;
pub mod report;

pub use aggregator::*;
pub use executor::*;
pub use pipeline::*;
pub use report::*;

mod checks;
pub mod distributions;
pub mod nonparametric;
pub mod normality;
pub mod parametric;
pub mod ranks;
pub mod results;
pub mod suite;
pub mod tukey;
pub mod variance;

pub use nonparametric::*;
pub use normality::*;
pub use parametric::*;
pub use results::*;
pub use suite::*;
pub use tukey::*;
pub use variance::*;

/// Statistic and p-value of a test, before any verdict is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawStatistic {
    pub statistic: f64,
    pub p_value: f64,
}

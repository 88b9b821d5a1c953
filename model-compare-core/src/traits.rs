use crate::domain::Scores;
use crate::error::Result;

/// Supplier of already-computed resampled metric values.
///
/// Resampling and metric computation happen outside this workspace; anything
/// that can hand over a `Scores` value (a file, an in-memory fixture, a remote
/// store) plugs in here.
pub trait ScoreSource {
    fn load_scores(&self) -> Result<Scores>;
}

impl ScoreSource for Scores {
    fn load_scores(&self) -> Result<Scores> {
        Ok(self.clone())
    }
}

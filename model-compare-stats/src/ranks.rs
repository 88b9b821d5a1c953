//! Rank helpers shared by the rank-based tests.

/// Sort `(value, group)` pairs ascending and return them with the 1-based
/// average rank of each position. Tied values share the mean of their ranks.
pub fn rank_with_groups(mut observations: Vec<(f64, usize)>) -> (Vec<(f64, usize)>, Vec<f64>) {
    observations.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut ranks = vec![0.0; observations.len()];
    let mut i = 0;
    while i < observations.len() {
        let mut j = i;
        while j < observations.len() && observations[j].0 == observations[i].0 {
            j += 1;
        }
        let rank = (i + j + 1) as f64 / 2.0;
        for r in ranks.iter_mut().take(j).skip(i) {
            *r = rank;
        }
        i = j;
    }

    (observations, ranks)
}

/// Σ (t³ − t) over runs of tied values in an already sorted sequence.
pub fn tie_term(sorted: &[(f64, usize)]) -> f64 {
    let mut total = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j].0 == sorted[i].0 {
            j += 1;
        }
        let t = (j - i) as f64;
        total += t * t * t - t;
        i = j;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_ranks_with_ties() {
        let (sorted, ranks) = rank_with_groups(vec![(3.0, 0), (1.0, 1), (3.0, 1), (2.0, 0)]);

        assert_eq!(sorted[0].0, 1.0);
        assert_eq!(ranks, vec![1.0, 2.0, 3.5, 3.5]);
    }

    #[test]
    fn test_tie_term() {
        let (sorted, _) = rank_with_groups(vec![(1.0, 0), (1.0, 0), (1.0, 1), (2.0, 1)]);
        assert_eq!(tie_term(&sorted), 24.0);
    }

    #[test]
    fn test_no_ties() {
        let (sorted, ranks) = rank_with_groups(vec![(5.0, 0), (4.0, 0)]);
        assert_eq!(ranks, vec![1.0, 2.0]);
        assert_eq!(tie_term(&sorted), 0.0);
    }
}

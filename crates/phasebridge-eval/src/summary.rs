/// Spread of the total rewards over a set of episodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl RewardSummary {
    /// Summarizes `rewards`, or returns `None` if there are none.
    ///
    /// ```
    /// # use phasebridge_eval::summary::RewardSummary;
    /// let summary = RewardSummary::new([4.0, 1.0, 7.0]).unwrap();
    /// assert_eq!(summary.min, 1.0);
    /// assert_eq!(summary.max, 7.0);
    /// assert_eq!(summary.mean, 4.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(rewards: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for reward in rewards {
            count += 1;
            min = min.min(reward);
            max = max.max(reward);
            sum += reward;
        }
        if count == 0 {
            return None;
        }
        Some(Self {
            count,
            min,
            max,
            mean: sum / count as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(RewardSummary::new([]), None);
    }

    #[test]
    fn test_single() {
        let summary = RewardSummary::new([-2.5]).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.min, -2.5);
        assert_eq!(summary.max, -2.5);
        assert_eq!(summary.mean, -2.5);
    }

    #[test]
    fn test_mixed_signs() {
        let summary = RewardSummary::new([1.0, -3.0, 5.0, 1.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.min, -3.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.mean, 1.0);
    }
}

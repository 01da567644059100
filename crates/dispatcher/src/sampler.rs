//! Discard-ratio sampler

use crate::error::DispatcherError;

/// Per-route forwarding gate
///
/// With ratio `R > 0` exactly one record in every `R` consecutive calls is
/// forwarded (the `R`-th). Ratios 0 and 1 forward everything.
#[derive(Debug, Clone)]
pub struct Sampler {
    ratio: u64,
    counter: u64,
}

impl Sampler {
    /// Create a sampler; a negative ratio is a configuration error
    pub fn new(discard_ratio: i64) -> Result<Self, DispatcherError> {
        let ratio = u64::try_from(discard_ratio)
            .map_err(|_| DispatcherError::InvalidDiscardRatio {
                ratio: discard_ratio,
            })?;
        Ok(Self { ratio, counter: 0 })
    }

    /// Sampler that forwards every record
    pub fn forward_all() -> Self {
        Self {
            ratio: 0,
            counter: 0,
        }
    }

    pub fn ratio(&self) -> u64 {
        self.ratio
    }

    /// Count a record and decide whether it is forwarded
    pub fn should_forward(&mut self) -> bool {
        self.counter += 1;

        if self.ratio == 0 || self.counter % self.ratio == 0 {
            self.counter = 0;
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarded_calls(ratio: i64, calls: usize) -> Vec<usize> {
        let mut sampler = Sampler::new(ratio).unwrap();
        (1..=calls).filter(|_| sampler.should_forward()).collect()
    }

    #[test]
    fn test_ratio_three_forwards_every_third() {
        assert_eq!(forwarded_calls(3, 6), vec![3, 6]);
    }

    #[test]
    fn test_zero_and_one_forward_everything() {
        assert_eq!(forwarded_calls(0, 4), vec![1, 2, 3, 4]);
        assert_eq!(forwarded_calls(1, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_forward_counts_over_fifteen_records() {
        assert_eq!(forwarded_calls(3, 15).len(), 5);
        assert_eq!(forwarded_calls(5, 15).len(), 3);
    }

    #[test]
    fn test_negative_ratio_rejected() {
        let err = Sampler::new(-1).unwrap_err();
        assert!(matches!(err, DispatcherError::InvalidDiscardRatio { ratio: -1 }));
        assert!(err.is_config());
    }

    #[test]
    fn test_forward_all() {
        let mut sampler = Sampler::forward_all();
        assert_eq!(sampler.ratio(), 0);
        assert!((0..10).all(|_| sampler.should_forward()));
    }
}

//! Response classification.

use contracts::AcceptableStatusSet;

/// Verdict on a received HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success,
    Failure,
}

impl Classification {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Classifies a status code for a destination.
///
/// 2xx always succeeds; anything else succeeds only if whitelisted in
/// `acceptable`.
pub fn classify(status_code: u16, acceptable: &AcceptableStatusSet) -> Classification {
    if (200..=299).contains(&status_code) || acceptable.contains(status_code) {
        Classification::Success
    } else {
        Classification::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelisted_statuses_succeed() {
        let acceptable = AcceptableStatusSet::from([204, 400]);
        assert_eq!(classify(204, &acceptable), Classification::Success);
        assert_eq!(classify(400, &acceptable), Classification::Success);
    }

    #[test]
    fn other_statuses_fail() {
        let acceptable = AcceptableStatusSet::from([204, 400]);
        assert_eq!(classify(500, &acceptable), Classification::Failure);
        assert_eq!(classify(404, &acceptable), Classification::Failure);
        assert_eq!(classify(301, &acceptable), Classification::Failure);
    }

    #[test]
    fn success_range_ignores_set() {
        let empty = AcceptableStatusSet::new();
        assert_eq!(classify(200, &empty), Classification::Success);
        assert_eq!(classify(299, &empty), Classification::Success);
        assert_eq!(classify(199, &empty), Classification::Failure);
        assert_eq!(classify(300, &empty), Classification::Failure);
    }
}

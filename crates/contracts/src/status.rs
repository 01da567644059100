//! AcceptableStatusSet - non-2xx statuses a destination treats as delivered

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Set of HTTP status codes accepted as successful delivery
///
/// 2xx is always accepted by the classifier; this set whitelists extra codes
/// such as OpenTSDB's `400` for duplicate points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceptableStatusSet(BTreeSet<u16>);

impl AcceptableStatusSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-delimited list such as `"204,400"`
    ///
    /// # Errors
    /// Returns `ConfigParse` if any entry is not a status code.
    pub fn parse_list(list: &str) -> Result<Self, ContractError> {
        list.split(',')
            .map(|entry| {
                let entry = entry.trim();
                entry.parse::<u16>().map_err(|e| ContractError::ConfigParse {
                    message: format!("invalid status code '{entry}' in '{list}'"),
                    source: Some(Box::new(e)),
                })
            })
            .collect()
    }

    pub fn contains(&self, status: u16) -> bool {
        self.0.contains(&status)
    }

    pub fn insert(&mut self, status: u16) -> bool {
        self.0.insert(status)
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<u16> for AcceptableStatusSet {
    fn from_iter<T: IntoIterator<Item = u16>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[u16; N]> for AcceptableStatusSet {
    fn from(codes: [u16; N]) -> Self {
        codes.into_iter().collect()
    }
}

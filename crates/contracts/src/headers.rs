//! HeaderSet - request headers attached to every delivery
//!
//! Maps a header name to its ordered values. A name may carry several
//! values; their order is reproduced on the wire, the order of names is not.
//! Names are case-insensitive and stored lowercased, so `X-Tag` and `x-tag`
//! lines feed one value list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Lowercased header name -> ordered values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderSet(BTreeMap<String, Vec<String>>);

impl HeaderSet {
    /// Create an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `"Name: value"` lines
    ///
    /// Text before the first `:` is the name, the trimmed remainder the value.
    ///
    /// # Errors
    /// Returns `ConfigParse` for a line without `:` or with an empty name.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut headers = Self::new();
        for line in lines {
            headers.push_line(line.as_ref())?;
        }
        Ok(headers)
    }

    /// Parse and append a single `"Name: value"` line
    pub fn push_line(&mut self, line: &str) -> Result<(), ContractError> {
        let (name, value) = line.split_once(':').ok_or_else(|| {
            ContractError::config_parse(format!("unable to parse header '{line}'"))
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(ContractError::config_parse(format!(
                "header '{line}' has an empty name"
            )));
        }

        self.append(name, value.trim());
        Ok(())
    }

    /// Append a value to a header, keeping earlier values
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.0
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Values of a header, in insertion order
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(&name.to_ascii_lowercase()).map(Vec::as_slice)
    }

    /// Iterate over `(lowercased name, values)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct header names
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

use crate::error::{RegionmaskError, Result};
use crate::models::region::Region;
use crate::models::regions::Regions;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Identifier of a region: its number, or its name or abbreviation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegionKey {
    Number(u32),
    /// A name or an abbreviation
    Label(String),
}

impl From<u32> for RegionKey {
    fn from(number: u32) -> Self {
        RegionKey::Number(number)
    }
}

impl From<&str> for RegionKey {
    fn from(label: &str) -> Self {
        RegionKey::Label(label.to_string())
    }
}

impl From<String> for RegionKey {
    fn from(label: String) -> Self {
        RegionKey::Label(label)
    }
}

impl From<&String> for RegionKey {
    fn from(label: &String) -> Self {
        RegionKey::Label(label.clone())
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKey::Number(number) => write!(f, "{}", number),
            RegionKey::Label(label) => write!(f, "'{}'", label),
        }
    }
}

/// Argument of [`Regions::item`]: one key selects a region, a list selects a subset
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    One(RegionKey),
    Many(Vec<RegionKey>),
}

impl From<RegionKey> for Selector {
    fn from(key: RegionKey) -> Self {
        Selector::One(key)
    }
}

impl From<u32> for Selector {
    fn from(number: u32) -> Self {
        Selector::One(number.into())
    }
}

impl From<&str> for Selector {
    fn from(label: &str) -> Self {
        Selector::One(label.into())
    }
}

impl From<String> for Selector {
    fn from(label: String) -> Self {
        Selector::One(label.into())
    }
}

impl<K: Into<RegionKey>> From<Vec<K>> for Selector {
    fn from(keys: Vec<K>) -> Self {
        Selector::Many(keys.into_iter().map(Into::into).collect())
    }
}

/// Result of [`Regions::item`]
#[derive(Debug, Clone)]
pub enum Selection {
    Region(Arc<Region>),
    Regions(Regions),
}

impl Selection {
    pub fn into_region(self) -> Option<Arc<Region>> {
        match self {
            Selection::Region(region) => Some(region),
            Selection::Regions(_) => None,
        }
    }

    pub fn into_regions(self) -> Option<Regions> {
        match self {
            Selection::Region(_) => None,
            Selection::Regions(regions) => Some(regions),
        }
    }
}

/// Per-region input given either positionally or keyed by region number
#[derive(Debug, Clone, PartialEq)]
pub enum RegionInput<T> {
    /// Aligned with the region numbers
    Positional(Vec<T>),
    ByNumber(BTreeMap<u32, T>),
}

impl<T> RegionInput<T> {
    pub fn len(&self) -> usize {
        match self {
            RegionInput::Positional(values) => values.len(),
            RegionInput::ByNumber(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert the values with `f`, keeping the layout
    pub fn map<U>(self, f: impl Fn(T) -> U) -> RegionInput<U> {
        match self {
            RegionInput::Positional(values) => {
                RegionInput::Positional(values.into_iter().map(f).collect())
            }
            RegionInput::ByNumber(values) => {
                RegionInput::ByNumber(values.into_iter().map(|(k, v)| (k, f(v))).collect())
            }
        }
    }

    /// Normalize to one value per entry of `numbers`, in the order of `numbers`.
    ///
    /// Positional input must have the same length as `numbers`; keyed input
    /// must have exactly the keys in `numbers`.
    pub fn align(self, numbers: &[u32], what: &str) -> Result<Vec<T>> {
        match self {
            RegionInput::Positional(values) => {
                if values.len() != numbers.len() {
                    return Err(RegionmaskError::SizeMismatch {
                        what: what.to_string(),
                        expected: numbers.len(),
                        found: values.len(),
                    });
                }
                Ok(values)
            }
            RegionInput::ByNumber(mut values) => {
                let mut missing = Vec::new();
                let mut aligned = Vec::with_capacity(numbers.len());
                for number in numbers {
                    match values.remove(number) {
                        Some(value) => aligned.push(value),
                        None => missing.push(*number),
                    }
                }

                if !missing.is_empty() || !values.is_empty() {
                    let unexpected: Vec<u32> = values.keys().copied().collect();
                    return Err(RegionmaskError::KeyMismatch {
                        what: what.to_string(),
                        reason: format!(
                            "missing numbers {:?}, unexpected numbers {:?}",
                            missing, unexpected
                        ),
                    });
                }

                Ok(aligned)
            }
        }
    }
}

impl<T> From<Vec<T>> for RegionInput<T> {
    fn from(values: Vec<T>) -> Self {
        RegionInput::Positional(values)
    }
}

impl<T> From<BTreeMap<u32, T>> for RegionInput<T> {
    fn from(values: BTreeMap<u32, T>) -> Self {
        RegionInput::ByNumber(values)
    }
}

impl<T> From<HashMap<u32, T>> for RegionInput<T> {
    fn from(values: HashMap<u32, T>) -> Self {
        RegionInput::ByNumber(values.into_iter().collect())
    }
}

impl<T> FromIterator<(u32, T)> for RegionInput<T> {
    fn from_iter<I: IntoIterator<Item = (u32, T)>>(iter: I) -> Self {
        RegionInput::ByNumber(iter.into_iter().collect())
    }
}

/// Fill in `"{prefix}{number}"` for names or abbrevs that were not given
pub(crate) fn sanitize_labels(
    labels: Option<RegionInput<String>>,
    numbers: &[u32],
    what: &str,
    prefix: &str,
) -> Result<Vec<String>> {
    match labels {
        Some(labels) => labels.align(numbers, what),
        None => Ok(numbers.iter().map(|n| format!("{}{}", prefix, n)).collect()),
    }
}

/// Check that no region number is used twice
pub(crate) fn check_unique_numbers(numbers: &[u32]) -> Result<()> {
    let mut seen = HashSet::with_capacity(numbers.len());
    for number in numbers {
        if !seen.insert(*number) {
            return Err(RegionmaskError::DuplicateNumber { number: *number });
        }
    }
    Ok(())
}

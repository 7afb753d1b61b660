//! Method prioritization.
//!
//! Pure ordering logic - no I/O.

use crate::error::{KeepAwakeError, KeepAwakeResult};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Token standing for "all methods not named elsewhere".
pub const WILDCARD: &str = "*";

/// One entry of a priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityItem {
    /// A single method name.
    Name(String),
    /// Methods of equal priority; they keep their original relative order.
    Group(Vec<String>),
    /// All remaining methods, in original order.
    Wildcard,
}

impl PriorityItem {
    fn names(&self) -> &[String] {
        match self {
            PriorityItem::Name(name) => std::slice::from_ref(name),
            PriorityItem::Group(names) => names,
            PriorityItem::Wildcard => &[],
        }
    }
}

/// User-supplied ordering of candidate methods.
///
/// Items earlier in the list are tried first. Without an explicit wildcard,
/// one is implied at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityOrder {
    items: Vec<PriorityItem>,
}

impl PriorityOrder {
    pub fn new(items: Vec<PriorityItem>) -> Self {
        Self { items }
    }

    /// Flat list of names where `"*"` is the wildcard.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items = names
            .into_iter()
            .map(|name| match name.as_ref() {
                WILDCARD => PriorityItem::Wildcard,
                other => PriorityItem::Name(other.to_string()),
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[PriorityItem] {
        &self.items
    }

    /// Reject orders with more than one wildcard or repeated names.
    pub fn validate(&self) -> KeepAwakeResult<()> {
        let wildcards = self
            .items
            .iter()
            .filter(|item| matches!(item, PriorityItem::Wildcard))
            .count();
        if wildcards > 1 {
            return Err(KeepAwakeError::InvalidPriority(format!(
                "the wildcard \"{WILDCARD}\" may only be used once"
            )));
        }

        let mut seen = HashSet::new();
        for name in self.items.iter().flat_map(PriorityItem::names) {
            if name == WILDCARD {
                return Err(KeepAwakeError::InvalidPriority(format!(
                    "the wildcard \"{WILDCARD}\" cannot be part of a group"
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(KeepAwakeError::InvalidPriority(format!(
                    "method \"{name}\" is listed more than once"
                )));
            }
        }

        Ok(())
    }

    /// Bucket index per named method, and the wildcard's bucket.
    fn buckets(&self) -> (HashMap<&str, usize>, usize) {
        let mut by_name = HashMap::new();
        let mut wildcard = None;

        for (index, item) in self.items.iter().enumerate() {
            if matches!(item, PriorityItem::Wildcard) {
                wildcard.get_or_insert(index);
                continue;
            }
            for name in item.names() {
                by_name.entry(name.as_str()).or_insert(index);
            }
        }

        (by_name, wildcard.unwrap_or(self.items.len()))
    }
}

impl FromStr for PriorityOrder {
    type Err = KeepAwakeError;

    /// Parse `a+b,*,c`: items separated by commas, group members by `+`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut items = Vec::new();

        for raw in s.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let members: Vec<String> = raw
                .split('+')
                .map(str::trim)
                .filter(|member| !member.is_empty())
                .map(str::to_string)
                .collect();

            let item = match members.as_slice() {
                [] => continue,
                [single] if single == WILDCARD => PriorityItem::Wildcard,
                [single] => PriorityItem::Name(single.clone()),
                _ => PriorityItem::Group(members),
            };
            items.push(item);
        }

        let order = Self { items };
        order.validate()?;
        Ok(order)
    }
}

/// Order `candidates` by `priority`, keyed by `name_of`.
///
/// Total and deterministic: every candidate appears exactly once, names not
/// present among the candidates are ignored, and ties keep original order.
pub fn order_by_priority<T, F>(candidates: Vec<T>, priority: Option<&PriorityOrder>, name_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let Some(priority) = priority else {
        return candidates;
    };

    let (by_name, wildcard) = priority.buckets();
    let mut keyed: Vec<(usize, T)> = candidates
        .into_iter()
        .map(|candidate| {
            let bucket = by_name
                .get(name_of(&candidate))
                .copied()
                .unwrap_or(wildcard);
            (bucket, candidate)
        })
        .collect();

    // Stable: equal buckets keep the original candidate order.
    keyed.sort_by_key(|(bucket, _)| *bucket);
    keyed.into_iter().map(|(_, candidate)| candidate).collect()
}

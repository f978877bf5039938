//! Dashboard grouping of instances into production and development lists.
//!
//! Every function here borrows its input and returns new vectors of
//! references, so calling them on each redraw is cheap and side-effect free.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::instance::{Instance, InstanceKind, derived_production_name};

/// Filter key that keeps every production instance.
pub const ALL_FILTER_KEY: &str = "all";

/// Production and development instances after classification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Partitioned<'a> {
    pub production: Vec<&'a Instance>,
    pub development: Vec<&'a Instance>,
}

impl Partitioned<'_> {
    pub fn is_empty(&self) -> bool {
        self.production.is_empty() && self.development.is_empty()
    }

    pub fn len(&self) -> usize {
        self.production.len() + self.development.len()
    }
}

/// Typed form of the production filter key used by the dashboard selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductionFilter {
    #[default]
    All,
    Named(String),
}

impl ProductionFilter {
    pub fn as_key(&self) -> &str {
        match self {
            Self::All => ALL_FILTER_KEY,
            Self::Named(name) => name,
        }
    }
}

impl FromStr for ProductionFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_FILTER_KEY {
            Ok(Self::All)
        } else {
            Ok(Self::Named(s.to_string()))
        }
    }
}

/// Split instances by their `type`. Instances of an unknown type land in
/// neither list.
pub fn separate_by_type(instances: &[Instance]) -> Partitioned<'_> {
    let mut out = Partitioned::default();
    for instance in instances {
        match instance.kind {
            InstanceKind::Production => out.production.push(instance),
            InstanceKind::Development => out.development.push(instance),
            InstanceKind::Unknown => {}
        }
    }
    out
}

/// Narrow both lists to one production instance and the development
/// instances derived from it.
///
/// The two lists are filtered independently: a development instance is kept
/// when its database names `filter_key` as its production instance, whether or
/// not that production instance is present in `production`.
pub fn filter_by_production_instance<'a>(
    production: &[&'a Instance],
    development: &[&'a Instance],
    filter_key: &str,
) -> Partitioned<'a> {
    if filter_key == ALL_FILTER_KEY {
        return Partitioned {
            production: production.to_vec(),
            development: development.to_vec(),
        };
    }

    Partitioned {
        production: production
            .iter()
            .copied()
            .filter(|i| i.name == filter_key)
            .collect(),
        development: development
            .iter()
            .copied()
            .filter(|i| derived_production_name(i) == Some(filter_key))
            .collect(),
    }
}

/// Case-insensitive substring search over name, domain and database.
/// A blank term keeps everything.
pub fn filter_by_search_term<'a>(instances: &[&'a Instance], term: &str) -> Vec<&'a Instance> {
    if term.trim().is_empty() {
        return instances.to_vec();
    }

    let needle = term.to_lowercase();
    let contains = |field: Option<&str>| {
        field
            .map(|value| value.to_lowercase().contains(&needle))
            .unwrap_or(false)
    };

    instances
        .iter()
        .copied()
        .filter(|i| {
            contains(Some(i.name.as_str()))
                || contains(i.domain.as_deref())
                || contains(i.database.as_deref())
        })
        .collect()
}

/// Type separation, then production filter, then search on each list.
pub fn apply_all_filters<'a>(
    instances: &'a [Instance],
    filter_key: &str,
    term: &str,
) -> Partitioned<'a> {
    let by_type = separate_by_type(instances);
    let by_production =
        filter_by_production_instance(&by_type.production, &by_type.development, filter_key);

    Partitioned {
        production: filter_by_search_term(&by_production.production, term),
        development: filter_by_search_term(&by_production.development, term),
    }
}

/// Names offered by the production filter selector, sorted and deduplicated.
pub fn production_names(instances: &[Instance]) -> Vec<&str> {
    instances
        .iter()
        .filter(|i| i.is_production())
        .map(|i| i.name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

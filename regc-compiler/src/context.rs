// Run-level compilation state

use crate::type_catalog::TypeCatalog;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Dimensions with a fixed position in allocation routine interfaces
pub const STANDARD_DIMENSION_ORDER: &[(&str, usize)] = &[
    ("horizontal_dimension", 1),
    ("vertical_layer_dimension", 2),
    ("vertical_interface_dimension", 3),
    ("number_of_constituents", 4),
];

/// Ranking of dimension names for routine argument lists.
///
/// Names outside the standard table are ranked in the order they are
/// first seen during the run, so later scopes see the same order.
#[derive(Debug, Clone)]
pub struct DimensionOrder {
    ranks: HashMap<String, usize>,
    next_rank: usize,
}

impl Default for DimensionOrder {
    fn default() -> Self {
        let ranks: HashMap<String, usize> = STANDARD_DIMENSION_ORDER
            .iter()
            .map(|(name, rank)| (name.to_string(), *rank))
            .collect();
        Self {
            next_rank: ranks.len() + 1,
            ranks,
        }
    }
}

impl DimensionOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank of `name`, assigning the next free rank to new names
    pub fn rank(&mut self, name: &str) -> usize {
        if let Some(rank) = self.ranks.get(name) {
            return *rank;
        }
        let rank = self.next_rank;
        self.next_rank += 1;
        self.ranks.insert(name.to_string(), rank);
        rank
    }

    /// `dimensions` sorted by rank
    pub fn sort<'a, I>(&mut self, dimensions: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut ranked: Vec<(usize, String)> = dimensions
            .into_iter()
            .map(|name| (self.rank(name), name.clone()))
            .collect();
        ranked.sort();
        ranked.into_iter().map(|(_, name)| name).collect()
    }
}

/// Configuration items from the `--config` option
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    items: IndexMap<String, String>,
}

impl RegistryConfig {
    /// Parse comma-separated `key=value` items. A bare key is set to `True`.
    pub fn parse(text: &str) -> Self {
        let items = text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| match item.split_once('=') {
                Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
                None => (item.to_string(), "True".to_string()),
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

}

/// State shared by every scope of one compilation run
#[derive(Debug, Clone)]
pub struct CompileContext {
    pub catalog: TypeCatalog,
    pub dimension_order: DimensionOrder,
    /// Active dycore, lower-cased
    pub dycore: String,
    pub config: RegistryConfig,
}

impl CompileContext {
    pub fn new(dycore: &str, config: RegistryConfig) -> Self {
        Self {
            catalog: TypeCatalog::new(),
            dimension_order: DimensionOrder::new(),
            dycore: dycore.to_lowercase(),
            config,
        }
    }
}

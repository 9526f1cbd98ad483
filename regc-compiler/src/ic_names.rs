// Initial-condition (IC) name tables
//
// Maps each variable that can be read from an IC file to the names it may
// have in that file, as two fixed-width character tables.

use crate::errors::RegistryResult;
use crate::scope_unit::ScopeUnit;
use crate::type_catalog::TypeCatalog;
use crate::variable::RegistryVar;
use regc_formatter::rules::pad_right;
use std::collections::HashSet;

/// One table row: a standard name and its IC file aliases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcEntry {
    pub standard_name: String,
    pub aliases: Vec<String>,
}

/// Fixed-width name tables of one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTables {
    pub entries: Vec<IcEntry>,
    /// Longest standard name
    pub std_name_len: usize,
    /// Longest alias
    pub ic_name_len: usize,
    /// Most aliases of any entry
    pub max_aliases: usize,
}

impl NameTables {
    /// Collect entries from DDT members, scope variables and their array
    /// elements. `None` when nothing declares IC names.
    pub fn build(unit: &ScopeUnit, catalog: &TypeCatalog) -> RegistryResult<Option<Self>> {
        let mut candidates: Vec<&dyn RegistryVar> = Vec::new();
        let mut variables = Vec::new();
        for ddt in unit.aggregates(catalog)? {
            variables.extend(ddt.variable_list(catalog));
        }
        variables.extend(unit.dictionary().variables());

        candidates.extend(variables.iter().map(|v| *v as &dyn RegistryVar));
        for variable in variables.iter().copied() {
            candidates.extend(variable.elements().iter().map(|e| e as &dyn RegistryVar));
        }

        let mut seen = HashSet::new();
        let entries: Vec<IcEntry> = candidates
            .into_iter()
            .filter_map(|var| {
                let aliases = var.ic_names()?;
                seen.insert(var.standard_name().to_lowercase())
                    .then(|| IcEntry {
                        standard_name: var.standard_name().to_string(),
                        aliases: aliases.to_vec(),
                    })
            })
            .collect();

        if entries.is_empty() {
            log::info!(
                "No IC file input names declared in {}, so no input variable name array will be created.",
                unit.name()
            );
            return Ok(None);
        }
        if entries.iter().all(|e| e.standard_name.is_empty()) {
            log::info!(
                "No variable standard names were found that contain IC file input names in {}, \
                 so no input variable name array will be created.",
                unit.name()
            );
            return Ok(None);
        }

        let std_name_len = entries.iter().map(|e| e.standard_name.len()).max().unwrap_or(0);
        let ic_name_len = entries
            .iter()
            .flat_map(|e| e.aliases.iter().map(String::len))
            .max()
            .unwrap_or(0);
        let max_aliases = entries.iter().map(|e| e.aliases.len()).max().unwrap_or(0);
        Ok(Some(Self {
            entries,
            std_name_len,
            ic_name_len,
            max_aliases,
        }))
    }

    /// Number of rows (`ic_var_num`)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Quoted standard names, each padded to `std_name_len`
    pub fn standard_name_cells(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("'{}'", pad_right(&e.standard_name, self.std_name_len)))
            .collect()
    }

    /// One row per entry: `max_aliases` quoted aliases padded to
    /// `ic_name_len`, blank entries filling short rows
    pub fn alias_rows(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                (0..self.max_aliases)
                    .map(|i| {
                        let alias = e.aliases.get(i).map(String::as_str).unwrap_or("");
                        format!("'{}'", pad_right(alias, self.ic_name_len))
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect()
    }
}

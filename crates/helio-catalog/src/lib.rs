//! Helio variable catalog
//!
//! Every value a proposal/contract/e-mail template may reference is registered
//! here exactly once, under two spellings:
//!
//! - the canonical key, `{{group.field}}` (current templates)
//! - the legacy key, `[field]` (templates authored before the dotted scheme)
//!
//! Both spellings stay supported indefinitely. The catalog is built once per
//! process ([`Catalog::builtin`]) and is read-only afterwards, so it can be
//! shared freely between threads.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

mod entries;
pub mod replace;

pub use entries::builtin_entries;
pub use replace::{dotted_key, flatten_key, normalize_key, replace_variables, VariableSource};

/// Bumped whenever an entry is added, renamed or retired.
pub const CATALOG_VERSION: &str = "2025.3";

// ============================================================================
// Entry types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Entrada,
    SistemaSolar,
    Financeiro,
    ContaEnergia,
    Comercial,
    Cliente,
    Tabelas,
    Series,
    Premissas,
    Cdd,
    Customizada,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Entrada,
        Category::SistemaSolar,
        Category::Financeiro,
        Category::ContaEnergia,
        Category::Comercial,
        Category::Cliente,
        Category::Tabelas,
        Category::Series,
        Category::Premissas,
        Category::Cdd,
        Category::Customizada,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Entrada => "entrada",
            Category::SistemaSolar => "sistema_solar",
            Category::Financeiro => "financeiro",
            Category::ContaEnergia => "conta_energia",
            Category::Comercial => "comercial",
            Category::Cliente => "cliente",
            Category::Tabelas => "tabelas",
            Category::Series => "series",
            Category::Premissas => "premissas",
            Category::Cdd => "cdd",
            Category::Customizada => "customizada",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which document kinds an entry is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliesTo {
    Proposta,
    Contrato,
    Email,
    Todos,
}

impl AppliesTo {
    /// `Todos` covers every document kind.
    pub fn covers(self, kind: AppliesTo) -> bool {
        self == AppliesTo::Todos || kind == AppliesTo::Todos || self == kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVariable {
    pub canonical_key: String,
    pub legacy_key: String,
    pub label: String,
    pub description: String,
    pub category: Category,
    pub applies_to: AppliesTo,
    pub unit: String,
    pub example: String,
    /// Value is a keyed collection (e.g. month → number), not a scalar.
    pub is_series: bool,
    /// Registered for template authors, but nothing resolves it yet.
    pub not_implemented: bool,
}

impl CatalogVariable {
    /// Canonical key without the surrounding braces (`cliente.nome`).
    pub fn dotted_key(&self) -> &str {
        dotted_key(&self.canonical_key).unwrap_or(&self.canonical_key)
    }

    /// Legacy key without the surrounding brackets (`cliente_nome`).
    pub fn legacy_name(&self) -> &str {
        self.legacy_key
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(&self.legacy_key)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Catalog construction defects. These are authoring bugs in the entry table,
/// never per-request failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("canonical key {0:?} must have the form {{{{group.field}}}}")]
    MalformedCanonical(String),
    #[error("legacy key {0:?} must have the form [field]")]
    MalformedLegacy(String),
    #[error("duplicate canonical key {0:?}")]
    DuplicateCanonical(String),
    #[error("duplicate legacy key {0:?}")]
    DuplicateLegacy(String),
    #[error("catalog is empty")]
    Empty,
}

// ============================================================================
// Catalog
// ============================================================================

/// Immutable registry with canonical ↔ legacy aliasing.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogVariable>,
    canonical_to_legacy: HashMap<String, String>,
    legacy_to_canonical: HashMap<String, String>,
    by_canonical: HashMap<String, usize>,
    by_legacy: HashMap<String, usize>,
}

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    /// The process-wide catalog, built on first use.
    pub fn builtin() -> &'static Catalog {
        BUILTIN.get_or_init(|| {
            Catalog::from_entries(builtin_entries())
                .unwrap_or_else(|err| panic!("builtin variable catalog is malformed: {err}"))
        })
    }

    /// Validate `entries` and build the alias and entity maps.
    pub fn from_entries(entries: Vec<CatalogVariable>) -> Result<Catalog, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut canonical_to_legacy = HashMap::with_capacity(entries.len());
        let mut legacy_to_canonical = HashMap::with_capacity(entries.len());
        let mut by_canonical = HashMap::with_capacity(entries.len());
        let mut by_legacy = HashMap::with_capacity(entries.len());

        for (idx, entry) in entries.iter().enumerate() {
            if !is_canonical_form(&entry.canonical_key) {
                return Err(CatalogError::MalformedCanonical(entry.canonical_key.clone()));
            }
            if !is_legacy_form(&entry.legacy_key) {
                return Err(CatalogError::MalformedLegacy(entry.legacy_key.clone()));
            }
            if by_canonical.insert(entry.canonical_key.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateCanonical(entry.canonical_key.clone()));
            }
            if by_legacy.insert(entry.legacy_key.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateLegacy(entry.legacy_key.clone()));
            }
            canonical_to_legacy.insert(entry.canonical_key.clone(), entry.legacy_key.clone());
            legacy_to_canonical.insert(entry.legacy_key.clone(), entry.canonical_key.clone());
        }

        tracing::debug!(
            entries = entries.len(),
            version = CATALOG_VERSION,
            "variable catalog built"
        );

        Ok(Catalog {
            entries,
            canonical_to_legacy,
            legacy_to_canonical,
            by_canonical,
            by_legacy,
        })
    }

    pub fn entries(&self) -> &[CatalogVariable] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map any key spelling to its canonical form; unknown keys pass through.
    pub fn to_canonical<'a>(&'a self, key: &'a str) -> &'a str {
        if self.canonical_to_legacy.contains_key(key) {
            return key;
        }
        if let Some(canonical) = self.legacy_to_canonical.get(key) {
            return canonical;
        }
        let wrapped = format!("[{key}]");
        if let Some(canonical) = self.legacy_to_canonical.get(&wrapped) {
            return canonical;
        }
        key
    }

    /// Map any key spelling to its legacy form; unknown keys pass through.
    pub fn to_legacy<'a>(&'a self, key: &'a str) -> &'a str {
        if self.legacy_to_canonical.contains_key(key) {
            return key;
        }
        if let Some(legacy) = self.canonical_to_legacy.get(key) {
            return legacy;
        }
        let wrapped = format!("{{{{{key}}}}}");
        if let Some(legacy) = self.canonical_to_legacy.get(&wrapped) {
            return legacy;
        }
        key
    }

    pub fn find_variable(&self, key: &str) -> Option<&CatalogVariable> {
        self.by_canonical
            .get(key)
            .or_else(|| self.by_legacy.get(key))
            .map(|&idx| &self.entries[idx])
    }

    pub fn by_category(&self, category: Category) -> Vec<&CatalogVariable> {
        self.entries
            .iter()
            .filter(|v| v.category == category)
            .collect()
    }

    /// Entries usable in documents of `kind`.
    pub fn for_document(&self, kind: AppliesTo) -> Vec<&CatalogVariable> {
        self.entries
            .iter()
            .filter(|v| v.applies_to.covers(kind))
            .collect()
    }

    /// Case-insensitive substring search over label, description and both keys.
    pub fn search(&self, query: &str) -> Vec<&CatalogVariable> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|v| {
                [
                    v.label.as_str(),
                    v.description.as_str(),
                    v.canonical_key.as_str(),
                    v.legacy_key.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Set of every canonical key (used by the auditor).
    pub fn canonical_keys(&self) -> HashSet<&str> {
        self.entries.iter().map(|v| v.canonical_key.as_str()).collect()
    }
}

fn is_canonical_form(key: &str) -> bool {
    match dotted_key(key) {
        Some(inner) => {
            inner.contains('.')
                && !inner.starts_with('.')
                && !inner.ends_with('.')
                && inner
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
        }
        None => false,
    }
}

fn is_legacy_form(key: &str) -> bool {
    match key.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => {
            !inner.is_empty()
                && inner
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        None => false,
    }
}

//! Proposal variable resolution
//!
//! Turns a [`ProposalResolverContext`] into the flat key → string map that
//! document, PDF and e-mail templates consume. Every catalog entry is resolved
//! in declaration order through three tiers:
//!
//! 1. the frozen `finalSnapshot` of a locked proposal version
//!    (direct path, then `outputs.*`, then `inputs.*`)
//! 2. live computation from the structured context
//! 3. the free-form `extras` map
//!
//! The first present, non-empty value wins. Unresolved entries get the
//! placeholder (`"-"`) and are reported in `fallbacks`; unresolved *required*
//! entries are also reported in `missing_required` and block final document
//! generation (`canGeneratePdf`). Resolution itself never fails.

use std::collections::{BTreeMap, BTreeSet};

use helio_catalog::{flatten_key, Catalog, CatalogVariable};
use helio_tariff::Precisao;
use serde::{Deserialize, Serialize};

pub mod context;
pub mod format;
mod handlers;
pub mod snapshot;

pub use context::*;
pub use handlers::{handled_keys, ALERTA_ESTIMADO_TEXTO, VIDA_UTIL_MAXIMA};

use handlers::{handler_for, Scope};

/// Dotted keys without which a document may be previewed but not finalized.
pub const REQUIRED_KEYS: [&str; 4] = [
    "cliente.nome",
    "entrada.consumo_mensal",
    "sistema_solar.potencia_sistema",
    "financeiro.preco_total",
];

pub const DEFAULT_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Dotted keys that gate `canGeneratePdf`.
    pub required: BTreeSet<String>,
    /// Stored for every variable that could not be resolved.
    pub placeholder: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            required: REQUIRED_KEYS.iter().map(|k| k.to_string()).collect(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Replace the required set. Keys may be given in any spelling the
    /// catalog understands (`{{a.b}}`, `a_b`, `[b]`).
    pub fn with_required<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.required = keys
            .into_iter()
            .map(|k| helio_catalog::normalize_key(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverResult {
    /// Every resolved value under both its dotted and its flattened key.
    pub variables: BTreeMap<String, String>,
    /// Required dotted keys that fell back to the placeholder.
    pub missing_required: Vec<String>,
    /// Dotted keys that fell back to the placeholder, declaration order.
    pub fallbacks: Vec<String>,
    #[serde(rename = "canGeneratePdf")]
    pub can_generate_pdf: bool,
    pub precisao: Precisao,
}

impl ResolverResult {
    /// Value for any key spelling.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables
            .get(key)
            .or_else(|| self.variables.get(&helio_catalog::normalize_key(key)))
            .map(String::as_str)
    }
}

/// Resolver bound to a catalog and a configuration.
#[derive(Debug, Clone)]
pub struct ProposalResolver<'c> {
    catalog: &'c Catalog,
    config: ResolverConfig,
}

impl Default for ProposalResolver<'static> {
    fn default() -> Self {
        ProposalResolver::new(Catalog::builtin(), ResolverConfig::default())
    }
}

impl<'c> ProposalResolver<'c> {
    pub fn new(catalog: &'c Catalog, config: ResolverConfig) -> Self {
        ProposalResolver { catalog, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn resolve(&self, ctx: &ProposalResolverContext) -> ResolverResult {
        let precisao = resolve_precisao(ctx);
        let scope = Scope::new(ctx, precisao);

        let mut variables = BTreeMap::new();
        let mut missing_required = Vec::new();
        let mut fallbacks = Vec::new();

        for entry in self.catalog.entries() {
            let dotted = entry.dotted_key();
            let flat = flatten_key(dotted);

            let value = match resolve_entry(entry, &scope) {
                Some(value) => value,
                None => {
                    if self.config.required.contains(dotted) {
                        missing_required.push(dotted.to_string());
                    }
                    tracing::trace!(key = %dotted, "variable fell back to placeholder");
                    fallbacks.push(dotted.to_string());
                    self.config.placeholder.clone()
                }
            };

            variables.insert(flat, value.clone());
            variables.insert(dotted.to_string(), value);
        }

        // Required keys outside the catalog can never resolve.
        for key in &self.config.required {
            if self.catalog.find_variable(&format!("{{{{{key}}}}}")).is_none() {
                tracing::warn!(key = %key, "required key is not registered in the catalog");
                missing_required.push(key.clone());
            }
        }

        let can_generate_pdf = missing_required.is_empty();
        tracing::debug!(
            resolved = self.catalog.len() - fallbacks.len(),
            fallbacks = fallbacks.len(),
            missing_required = missing_required.len(),
            precisao = %precisao,
            can_generate_pdf,
            "resolved proposal variables"
        );

        ResolverResult {
            variables,
            missing_required,
            fallbacks,
            can_generate_pdf,
            precisao,
        }
    }
}

/// Snapshot, then live handler, then extras.
fn resolve_entry(entry: &CatalogVariable, scope: &Scope<'_>) -> Option<String> {
    let dotted = entry.dotted_key();
    let ctx = scope.ctx;

    if let Some(value) = ctx
        .final_snapshot
        .as_ref()
        .and_then(|snap| snapshot::snapshot_value(snap, dotted))
    {
        return Some(value);
    }

    if let Some(value) = handler_for(dotted).and_then(|handler| handler(scope)) {
        return Some(value);
    }

    [dotted, flatten_key(dotted).as_str(), entry.legacy_name()]
        .iter()
        .find_map(|key| ctx.extras.get(*key).and_then(format::json_display))
}

/// `tariffVersion.precisao`, then `gdResult.precisao`, then unknown.
pub fn resolve_precisao(ctx: &ProposalResolverContext) -> Precisao {
    ctx.tariff_version
        .as_ref()
        .and_then(|t| t.precisao)
        .or_else(|| ctx.gd_result.as_ref().and_then(|g| g.precisao))
        .unwrap_or_default()
}

/// Resolve against the builtin catalog with the default configuration.
pub fn resolve_proposal_variables(ctx: &ProposalResolverContext) -> ResolverResult {
    ProposalResolver::default().resolve(ctx)
}

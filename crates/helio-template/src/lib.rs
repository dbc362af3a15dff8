//! Template variable extraction and catalog audit
//!
//! Stored templates reference variables in two syntaxes (`{{group.field}}` and
//! `[field]`). The auditor scans a template, resolves every reference against
//! the [`Catalog`] and reports:
//!
//! - **unregistered** references (used in a template, unknown to the catalog)
//! - **orphaned** entries (known to the catalog, used by no template)
//!
//! This is an authoring/CI tool; it is not on the proposal rendering path.
//! Scanning is regex based: an unterminated `{{` or `[` never matches.

use helio_catalog::replace::{bracket_pattern, mustache_pattern};
use helio_catalog::{Catalog, CatalogVariable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Syntax {
    Mustache,
    Bracket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedVariable {
    /// Substring as it appears in the template.
    pub raw: String,
    /// Canonical form used for cross-checking (raw when unresolvable).
    pub canonical: String,
    pub syntax: Syntax,
    pub registered: bool,
    pub variable: Option<CatalogVariable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateAuditResult {
    pub variables: Vec<ExtractedVariable>,
    pub unregistered: Vec<String>,
    pub orphaned: Vec<CatalogVariable>,
    pub total: usize,
    pub registered_count: usize,
    pub unregistered_count: usize,
}

impl TemplateAuditResult {
    /// Canonical forms used by this template, in order of first appearance.
    pub fn used_canonical(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.canonical.as_str())
    }
}

/// A named template, as stored by the template collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSource {
    pub name: String,
    pub content: String,
}

impl TemplateSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        TemplateSource {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTemplateAudit {
    pub name: String,
    pub audit: TemplateAuditResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiTemplateAudit {
    pub per_template: Vec<NamedTemplateAudit>,
    /// Entries no template uses.
    pub global_orphaned: Vec<CatalogVariable>,
    /// Unknown references across all templates, first appearance order.
    pub global_unregistered: Vec<String>,
}

/// Audits templates against one catalog.
#[derive(Debug, Clone, Copy)]
pub struct TemplateAuditor<'c> {
    catalog: &'c Catalog,
}

impl Default for TemplateAuditor<'static> {
    fn default() -> Self {
        TemplateAuditor::new(Catalog::builtin())
    }
}

impl<'c> TemplateAuditor<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        TemplateAuditor { catalog }
    }

    pub fn extract(&self, template: &str) -> Vec<ExtractedVariable> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();

        for m in mustache_pattern().find_iter(template) {
            let raw = m.as_str();
            if !seen.insert(raw) {
                continue;
            }
            let variable = self.catalog.find_variable(raw).cloned();
            out.push(ExtractedVariable {
                raw: raw.to_string(),
                canonical: raw.to_string(),
                syntax: Syntax::Mustache,
                registered: variable.is_some(),
                variable,
            });
        }

        for m in bracket_pattern().find_iter(template) {
            let raw = m.as_str();
            if !seen.insert(raw) {
                continue;
            }
            let canonical = self.catalog.to_canonical(raw);
            let variable = self
                .catalog
                .find_variable(raw)
                .or_else(|| self.catalog.find_variable(canonical))
                .cloned();
            out.push(ExtractedVariable {
                raw: raw.to_string(),
                canonical: canonical.to_string(),
                syntax: Syntax::Bracket,
                registered: variable.is_some(),
                variable,
            });
        }

        out
    }

    pub fn audit(&self, template: &str) -> TemplateAuditResult {
        let variables = self.extract(template);
        let used: HashSet<&str> = variables.iter().map(|v| v.canonical.as_str()).collect();
        let orphaned = self.orphans(&used);
        let unregistered: Vec<String> = variables
            .iter()
            .filter(|v| !v.registered)
            .map(|v| v.raw.clone())
            .collect();

        let total = variables.len();
        let unregistered_count = unregistered.len();
        TemplateAuditResult {
            variables,
            unregistered,
            orphaned,
            total,
            registered_count: total - unregistered_count,
            unregistered_count,
        }
    }

    pub fn audit_many(&self, templates: &[TemplateSource]) -> MultiTemplateAudit {
        let per_template: Vec<NamedTemplateAudit> = templates
            .iter()
            .map(|t| NamedTemplateAudit {
                name: t.name.clone(),
                audit: self.audit(&t.content),
            })
            .collect();

        let mut used: HashSet<&str> = HashSet::new();
        let mut seen_unregistered: HashSet<&str> = HashSet::new();
        let mut global_unregistered = Vec::new();
        for named in &per_template {
            used.extend(named.audit.used_canonical());
            for key in &named.audit.unregistered {
                if seen_unregistered.insert(key.as_str()) {
                    global_unregistered.push(key.clone());
                }
            }
        }
        let global_orphaned = self.orphans(&used);

        tracing::debug!(
            templates = per_template.len(),
            orphaned = global_orphaned.len(),
            unregistered = global_unregistered.len(),
            "audited templates"
        );

        MultiTemplateAudit {
            per_template,
            global_orphaned,
            global_unregistered,
        }
    }

    fn orphans(&self, used: &HashSet<&str>) -> Vec<CatalogVariable> {
        self.catalog
            .entries()
            .iter()
            .filter(|v| {
                !used.contains(v.canonical_key.as_str()) && !used.contains(v.legacy_key.as_str())
            })
            .cloned()
            .collect()
    }
}

/// Extract with the builtin catalog.
pub fn extract_template_variables(template: &str) -> Vec<ExtractedVariable> {
    TemplateAuditor::default().extract(template)
}

/// Audit one template with the builtin catalog.
pub fn audit_template(template: &str) -> TemplateAuditResult {
    TemplateAuditor::default().audit(template)
}

/// Audit several templates with the builtin catalog.
pub fn audit_multiple_templates(templates: &[TemplateSource]) -> MultiTemplateAudit {
    TemplateAuditor::default().audit_many(templates)
}

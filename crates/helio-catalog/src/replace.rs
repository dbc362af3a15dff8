//! Placeholder syntax helpers and literal substitution.
//!
//! Two surface syntaxes are recognised:
//!
//! - mustache: `{{group.field}}`
//! - legacy bracket: `[field]`
//!
//! Scanning is regex based. An unterminated `{{` or `[` simply never matches.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use crate::Catalog;

static MUSTACHE: OnceLock<Regex> = OnceLock::new();
static BRACKET: OnceLock<Regex> = OnceLock::new();

/// `{{...}}` with no nested braces.
pub fn mustache_pattern() -> &'static Regex {
    MUSTACHE.get_or_init(|| Regex::new(r"\{\{[^{}]+\}\}").unwrap())
}

/// `[...]` with no nested brackets.
pub fn bracket_pattern() -> &'static Regex {
    BRACKET.get_or_init(|| Regex::new(r"\[[^\[\]]+\]").unwrap())
}

/// `{{cliente.nome}}` → `cliente.nome`. `None` when `key` is not mustache.
pub fn dotted_key(key: &str) -> Option<&str> {
    key.strip_prefix("{{")
        .and_then(|s| s.strip_suffix("}}"))
        .map(str::trim)
}

/// `alerta.estimado.texto_pdf` → `alerta_estimado_texto_pdf`.
pub fn flatten_key(dotted: &str) -> String {
    dotted.replace('.', "_")
}

/// Anything a resolved variable map can be read from.
pub trait VariableSource {
    fn lookup(&self, key: &str) -> Option<&str>;
}

impl VariableSource for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl VariableSource for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl<T: VariableSource + ?Sized> VariableSource for &T {
    fn lookup(&self, key: &str) -> Option<&str> {
        (**self).lookup(key)
    }
}

impl Catalog {
    /// Substitute placeholders in `text` from `context`.
    ///
    /// Pass 1 replaces `{{group.field}}` by `context[group.field]` or
    /// `context[group_field]`. Pass 2 replaces `[field]` by `context[field]`,
    /// falling back to the dotted key of the catalog entry the legacy key
    /// aliases. Anything unmatched is left verbatim.
    pub fn replace_variables<S: VariableSource + ?Sized>(&self, text: &str, context: &S) -> String {
        let first = mustache_pattern().replace_all(text, |caps: &regex::Captures<'_>| {
            let raw = &caps[0];
            let dotted = dotted_key(raw).unwrap_or(raw);
            context
                .lookup(dotted)
                .or_else(|| context.lookup(&flatten_key(dotted)))
                .map(str::to_string)
                .unwrap_or_else(|| raw.to_string())
        });

        bracket_pattern()
            .replace_all(&first, |caps: &regex::Captures<'_>| {
                let raw = &caps[0];
                let name = &raw[1..raw.len() - 1];
                context
                    .lookup(name)
                    .or_else(|| {
                        let canonical = self.to_canonical(raw);
                        dotted_key(canonical).and_then(|dotted| context.lookup(dotted))
                    })
                    .map(str::to_string)
                    .unwrap_or_else(|| raw.to_string())
            })
            .into_owned()
    }

    /// Map any key spelling (`{{a.b}}`, `a.b`, `a_b`, `[b]`, `b`) to the
    /// dotted key of the matching entry. Unknown keys pass through trimmed.
    pub fn normalize_key(&self, key: &str) -> String {
        let key = key.trim();
        if let Some(dotted) = dotted_key(key) {
            return dotted.to_string();
        }
        if key.contains('.') {
            return key.to_string();
        }
        let canonical = self.to_canonical(key);
        if let Some(dotted) = dotted_key(canonical) {
            return dotted.to_string();
        }
        if let Some(entry) = self
            .entries()
            .iter()
            .find(|v| flatten_key(v.dotted_key()) == key)
        {
            return entry.dotted_key().to_string();
        }
        key.to_string()
    }
}

/// [`Catalog::replace_variables`] against the builtin catalog.
pub fn replace_variables<S: VariableSource + ?Sized>(text: &str, context: &S) -> String {
    Catalog::builtin().replace_variables(text, context)
}

/// [`Catalog::normalize_key`] against the builtin catalog.
pub fn normalize_key(key: &str) -> String {
    Catalog::builtin().normalize_key(key)
}

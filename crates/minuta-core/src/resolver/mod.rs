//! Placeholder resolution against the extracted document corpus.
//!
//! Each catalog token is resolved independently: its bare label is searched
//! for case-insensitively, and the text following the next colon (up to the
//! end of that line) becomes the value. Tokens with no match resolve to the
//! configured sentinel. Resolution never fails once the resolver is built.

pub mod patterns;

use chrono::{Local, NaiveDate};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::catalog::{CatalogEntry, PlaceholderCatalog, PlaceholderKind, PlaceholderToken};
use crate::error::CatalogError;
use crate::models::config::ResolverConfig;

use patterns::{compile_label_pattern, is_placeholder_value};

/// Date format used for date placeholders.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// The value resolved for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ResolvedValue {
    /// A value found in the corpus (or computed, for date placeholders).
    Found(String),
    /// No usable value; filled with the sentinel.
    NotFound,
}

impl ResolvedValue {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Text to substitute for this value.
    pub fn fill_text<'a>(&'a self, sentinel: &'a str) -> &'a str {
        match self {
            Self::Found(value) => value,
            Self::NotFound => sentinel,
        }
    }
}

/// A token paired with its resolved value.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedVariable {
    pub token: PlaceholderToken,
    pub value: ResolvedValue,
}

/// Mapping from every catalog token to its value, in catalog order.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    variables: Vec<ResolvedVariable>,
    sentinel: String,
}

impl Resolution {
    pub fn variables(&self) -> &[ResolvedVariable] {
        &self.variables
    }

    /// Value resolved for a token.
    pub fn get(&self, token: &str) -> Option<&ResolvedValue> {
        self.variables
            .iter()
            .find(|v| v.token.as_str() == token)
            .map(|v| &v.value)
    }

    /// Text that replaces a token, sentinel included.
    pub fn fill_text(&self, token: &str) -> Option<&str> {
        self.get(token).map(|v| v.fill_text(&self.sentinel))
    }

    /// `(token, replacement)` pairs for every catalog token.
    pub fn replacements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|v| (v.token.as_str(), v.value.fill_text(&self.sentinel)))
    }

    pub fn found_count(&self) -> usize {
        self.variables.iter().filter(|v| v.value.is_found()).count()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

struct LabelRule {
    entry: CatalogEntry,
    pattern: Regex,
}

/// Resolves catalog placeholders from corpus text.
///
/// Patterns are compiled once from the injected catalog; the resolver holds no
/// mutable state and can be shared across requests.
pub struct VariableResolver {
    rules: Vec<LabelRule>,
    config: ResolverConfig,
}

impl VariableResolver {
    /// Compile search patterns for every catalog entry.
    pub fn new(catalog: &PlaceholderCatalog, config: ResolverConfig) -> Result<Self, CatalogError> {
        config.gap.check().map_err(CatalogError::Settings)?;

        let rules = catalog
            .iter()
            .map(|entry| {
                let pattern = compile_label_pattern(&entry.label, config.gap).map_err(|e| {
                    CatalogError::Pattern {
                        token: entry.token.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(LabelRule {
                    entry: entry.clone(),
                    pattern,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        debug!("Compiled {} placeholder patterns ({:?} gap)", rules.len(), config.gap);

        Ok(Self { rules, config })
    }

    /// Resolve every catalog token using today's date for date placeholders.
    pub fn resolve(&self, corpus: &str) -> Resolution {
        self.resolve_on(corpus, Local::now().date_naive())
    }

    /// Resolve every catalog token with an explicit drafting date.
    pub fn resolve_on(&self, corpus: &str, today: NaiveDate) -> Resolution {
        let variables: Vec<ResolvedVariable> = self
            .rules
            .iter()
            .map(|rule| ResolvedVariable {
                token: rule.entry.token.clone(),
                value: self.resolve_rule(rule, corpus, today),
            })
            .collect();

        let resolution = Resolution {
            variables,
            sentinel: self.config.sentinel.clone(),
        };

        info!(
            "Resolved {}/{} placeholders from {} chars of text",
            resolution.found_count(),
            resolution.len(),
            corpus.len()
        );

        resolution
    }

    fn resolve_rule(&self, rule: &LabelRule, corpus: &str, today: NaiveDate) -> ResolvedValue {
        if rule.entry.kind == PlaceholderKind::CurrentDate {
            return ResolvedValue::Found(today.format(DATE_FORMAT).to_string());
        }

        let Some(caps) = rule.pattern.captures(corpus) else {
            trace!("No match for {}", rule.entry.token);
            return ResolvedValue::NotFound;
        };

        let value = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();

        if self.config.reject_blank_values && is_placeholder_value(value) {
            debug!("Discarding filler value {:?} for {}", value, rule.entry.token);
            return ResolvedValue::NotFound;
        }

        debug!("Resolved {} = {:?}", rule.entry.token, value);
        ResolvedValue::Found(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LAVRATURA_DATE_TOKEN;
    use crate::models::config::{GapPolicy, NOT_FOUND_SENTINEL};
    use pretty_assertions::assert_eq;

    fn resolver(tokens: &[&str]) -> VariableResolver {
        let catalog = PlaceholderCatalog::from_tokens(tokens.iter().copied()).unwrap();
        VariableResolver::new(&catalog, ResolverConfig::default()).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_labeled_value_is_trimmed() {
        let resolver = resolver(&["¿nome do falecido>"]);
        let resolution = resolver.resolve_on("Nome do falecido:   João da Silva  \nCPF: 1", date());

        assert_eq!(
            resolution.get("¿nome do falecido>"),
            Some(&ResolvedValue::Found("João da Silva".into()))
        );
    }

    #[test]
    fn test_absent_tokens_get_sentinel() {
        let resolver = resolver(&["¿placa>", "¿renavam>"]);
        let resolution = resolver.resolve_on("Documento sem os campos esperados.", date());

        assert_eq!(resolution.len(), 2);
        assert_eq!(resolution.found_count(), 0);
        for (_, text) in resolution.replacements() {
            assert_eq!(text, NOT_FOUND_SENTINEL);
        }
    }

    #[test]
    fn test_every_builtin_token_resolved_once() {
        let catalog = PlaceholderCatalog::builtin();
        let resolver = VariableResolver::new(&catalog, ResolverConfig::default()).unwrap();
        let resolution = resolver.resolve_on("", date());

        assert_eq!(resolution.len(), catalog.len());
        let tokens: Vec<&str> = resolution.variables().iter().map(|v| v.token.as_str()).collect();
        let expected: Vec<&str> = catalog.iter().map(|e| e.token.as_str()).collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_first_match_in_corpus_wins() {
        let resolver = resolver(&["¿cartorio>"]);
        let corpus = "=== Documento a.pdf ===\ncartorio: 1º Ofício\n=== Documento b.pdf ===\ncartorio: 2º Ofício\n";
        let resolution = resolver.resolve_on(corpus, date());

        assert_eq!(resolution.fill_text("¿cartorio>"), Some("1º Ofício"));
    }

    #[test]
    fn test_filler_values_rejected() {
        let resolver = resolver(&["¿nirf>", "¿validade>"]);
        let resolution = resolver.resolve_on("NIRF: N/A\nvalidade: 30 dias", date());

        assert_eq!(resolution.get("¿nirf>"), Some(&ResolvedValue::NotFound));
        assert_eq!(resolution.fill_text("¿validade>"), Some("30 dias"));
    }

    #[test]
    fn test_filler_values_kept_when_configured() {
        let catalog = PlaceholderCatalog::from_tokens(["¿nirf>"]).unwrap();
        let config = ResolverConfig {
            reject_blank_values: false,
            ..ResolverConfig::default()
        };
        let resolver = VariableResolver::new(&catalog, config).unwrap();

        let resolution = resolver.resolve_on("NIRF: N/A", date());
        assert_eq!(resolution.fill_text("¿nirf>"), Some("N/A"));
    }

    #[test]
    fn test_date_placeholder_uses_reference_date() {
        let resolver = resolver(&[LAVRATURA_DATE_TOKEN]);
        let resolution = resolver.resolve_on("", date());

        assert_eq!(resolution.fill_text(LAVRATURA_DATE_TOKEN), Some("09/03/2024"));
    }

    #[test]
    fn test_same_line_gap_policy() {
        let catalog = PlaceholderCatalog::from_tokens(["¿regime>"]).unwrap();
        let config = ResolverConfig {
            gap: GapPolicy::SameLine,
            ..ResolverConfig::default()
        };
        let strict = VariableResolver::new(&catalog, config).unwrap();

        let corpus = "regime de bens adotado\nobservação: nenhuma";
        assert_eq!(
            strict.resolve_on(corpus, date()).get("¿regime>"),
            Some(&ResolvedValue::NotFound)
        );

        let unbounded = resolver(&["¿regime>"]);
        assert_eq!(
            unbounded.resolve_on(corpus, date()).fill_text("¿regime>"),
            Some("nenhuma")
        );
    }

    #[test]
    fn test_custom_sentinel() {
        let catalog = PlaceholderCatalog::from_tokens(["¿cor>"]).unwrap();
        let config = ResolverConfig {
            sentinel: "???".into(),
            ..ResolverConfig::default()
        };
        let resolver = VariableResolver::new(&catalog, config).unwrap();
        assert_eq!(resolver.resolve_on("", date()).fill_text("¿cor>"), Some("???"));
    }

    #[test]
    fn test_oversized_gap_rejected() {
        let catalog = PlaceholderCatalog::from_tokens(["¿placa>"]).unwrap();
        let config = ResolverConfig {
            gap: GapPolicy::MaxChars(100_000),
            ..ResolverConfig::default()
        };

        assert!(matches!(
            VariableResolver::new(&catalog, config),
            Err(CatalogError::Settings(_))
        ));
    }
}

//! Placeholder catalog: the fixed, ordered set of tokens the resolver fills.
//!
//! Tokens are wrapped in `¿` and `>`; the text between them is the bare label
//! searched for in document text. A catalog is built once at startup and
//! shared read-only.

mod builtin;

pub use builtin::{BUILTIN_TOKENS, LAVRATURA_DATE_TOKEN};

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::CatalogError;
use crate::models::config::CatalogConfig;

/// Opening delimiter of every token.
pub const TOKEN_OPEN: char = '¿';

/// Closing delimiter of every token.
pub const TOKEN_CLOSE: char = '>';

lazy_static! {
    /// Anything shaped like a token inside a template.
    static ref TEMPLATE_TOKEN: Regex = Regex::new(r"¿[^¿>\n]+>").unwrap();
}

/// A validated, delimiter-wrapped placeholder token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PlaceholderToken(String);

impl PlaceholderToken {
    /// Validate a raw token string.
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let inner = raw
            .strip_prefix(TOKEN_OPEN)
            .and_then(|rest| rest.strip_suffix(TOKEN_CLOSE))
            .ok_or_else(|| CatalogError::Malformed(raw.to_string()))?;

        if inner.trim().is_empty() || inner.contains(TOKEN_OPEN) || inner.contains(TOKEN_CLOSE) {
            return Err(CatalogError::Malformed(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    /// The full token, delimiters included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token text with its delimiters stripped.
    pub fn bare_label(&self) -> &str {
        let inner = &self.0[TOKEN_OPEN.len_utf8()..self.0.len() - TOKEN_CLOSE.len_utf8()];
        inner.trim()
    }
}

impl fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a placeholder gets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    /// Searched for in the document corpus.
    Extracted,
    /// Filled with the drafting date.
    CurrentDate,
}

/// One catalog record.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub token: PlaceholderToken,
    /// Bare label used as the search anchor.
    pub label: String,
    pub kind: PlaceholderKind,
}

impl CatalogEntry {
    fn new(token: PlaceholderToken) -> Self {
        let kind = if token.as_str() == LAVRATURA_DATE_TOKEN {
            PlaceholderKind::CurrentDate
        } else {
            PlaceholderKind::Extracted
        };
        Self {
            label: token.bare_label().to_string(),
            token,
            kind,
        }
    }
}

/// Ordered, immutable collection of placeholder tokens.
#[derive(Debug, Clone)]
pub struct PlaceholderCatalog {
    entries: Vec<CatalogEntry>,
}

impl PlaceholderCatalog {
    /// The built-in notarial catalog.
    pub fn builtin() -> Self {
        // BUILTIN_TOKENS is validated by tests
        Self::from_tokens(BUILTIN_TOKENS.iter().copied())
            .unwrap_or_else(|e| panic!("built-in catalog is invalid: {e}"))
    }

    /// Build a catalog from raw tokens, preserving their order.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for raw in tokens {
            let token = PlaceholderToken::parse(raw.as_ref())?;
            if !seen.insert(token.clone()) {
                return Err(CatalogError::Duplicate(token.0));
            }
            entries.push(CatalogEntry::new(token));
        }

        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self { entries })
    }

    /// Load a catalog from a JSON array of token strings.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Load(format!("{}: {}", path.display(), e)))?;
        let tokens: Vec<String> = serde_json::from_str(&content)
            .map_err(|e| CatalogError::Load(format!("{}: {}", path.display(), e)))?;

        let catalog = Self::from_tokens(tokens)?;
        debug!("Loaded {} placeholder tokens from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// The configured catalog, or the built-in one.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        match &config.path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its full token.
    pub fn get(&self, token: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.token.as_str() == token)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.get(token).is_some()
    }
}

/// Token-shaped markers found in a template, in order of first appearance.
pub fn scan_template_tokens(template: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    TEMPLATE_TOKEN
        .find_iter(template)
        .map(|m| m.as_str())
        .filter(|t| seen.insert(*t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = PlaceholderCatalog::from_tokens(BUILTIN_TOKENS.iter().copied()).unwrap();
        assert_eq!(catalog.len(), BUILTIN_TOKENS.len());
        assert_eq!(
            catalog.entries()[0].token.as_str(),
            "¿nome_do_\"de_cujus\">"
        );
    }

    #[test]
    fn test_bare_label() {
        let token = PlaceholderToken::parse("¿nome_do(a)_viuvo(a)>").unwrap();
        assert_eq!(token.bare_label(), "nome_do(a)_viuvo(a)");

        let token = PlaceholderToken::parse("¿cidade]>").unwrap();
        assert_eq!(token.bare_label(), "cidade]");
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(
            PlaceholderToken::parse("nome"),
            Err(CatalogError::Malformed(_))
        ));
        assert!(PlaceholderToken::parse("¿>").is_err());
        assert!(PlaceholderToken::parse("¿  >").is_err());
        assert!(PlaceholderToken::parse("¿a>b>").is_err());
    }

    #[test]
    fn test_duplicates_and_empty() {
        let result = PlaceholderCatalog::from_tokens(["¿a>", "¿b>", "¿a>"]);
        assert!(matches!(result, Err(CatalogError::Duplicate(t)) if t == "¿a>"));

        let result = PlaceholderCatalog::from_tokens(Vec::<String>::new());
        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn test_date_token_kind() {
        let catalog = PlaceholderCatalog::builtin();
        assert_eq!(
            catalog.get(LAVRATURA_DATE_TOKEN).map(|e| e.kind),
            Some(PlaceholderKind::CurrentDate)
        );
        assert_eq!(
            catalog.get("¿placa>").map(|e| e.kind),
            Some(PlaceholderKind::Extracted)
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"["¿nome>", "¿cpf>"]"#).unwrap();

        let catalog = PlaceholderCatalog::from_file(&path).unwrap();
        let labels: Vec<&str> = catalog.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["nome", "cpf"]);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            PlaceholderCatalog::from_file(&path),
            Err(CatalogError::Load(_))
        ));
    }

    #[test]
    fn test_scan_template_tokens() {
        let template = "Falecido ¿nome>, CPF ¿cpf>; novamente ¿nome>. Sem token > aqui.";
        assert_eq!(scan_template_tokens(template), vec!["¿nome>", "¿cpf>"]);
    }
}

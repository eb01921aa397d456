//! Template filling: literal, global replacement of resolved placeholders.

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::scan_template_tokens;
use crate::resolver::Resolution;

/// A filled draft ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct FilledTemplate {
    /// Template text with every catalog token replaced.
    pub text: String,
    /// Values used for the replacement.
    pub resolution: Resolution,
    /// Token-shaped markers in the template that the catalog does not know.
    pub unrecognized_tokens: Vec<String>,
}

/// Replace every occurrence of each resolved token in `template`.
///
/// Tokens are matched as plain substrings. Tokens absent from the template
/// leave it untouched.
pub fn fill(template: &str, resolution: &Resolution) -> String {
    let mut text = template.to_string();
    for (token, value) in resolution.replacements() {
        if text.contains(token) {
            text = text.replace(token, value);
        }
    }
    text
}

/// Fill `template` and collect markers the catalog does not cover.
pub fn fill_template(template: &str, resolution: Resolution) -> FilledTemplate {
    let unrecognized_tokens: Vec<String> = scan_template_tokens(template)
        .into_iter()
        .filter(|token| resolution.get(token).is_none())
        .map(str::to_string)
        .collect();

    if !unrecognized_tokens.is_empty() {
        warn!(
            "Template contains {} unknown placeholder(s): {}",
            unrecognized_tokens.len(),
            unrecognized_tokens.join(", ")
        );
    }

    let text = fill(template, &resolution);
    debug!("Filled template: {} -> {} chars", template.len(), text.len());

    FilledTemplate {
        text,
        resolution,
        unrecognized_tokens,
    }
}

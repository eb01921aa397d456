//! Label-anchored search patterns.

use regex::{Regex, RegexBuilder};

use crate::models::config::GapPolicy;

/// Captured values that carry no information.
pub const PLACEHOLDER_VALUES: &[&str] = &["N/A", "NA", "undefined", "null", "-"];

/// Regex source for a label followed, after a gap, by `:` and a value that
/// runs to the end of its line.
pub fn label_pattern(label: &str, gap: GapPolicy) -> String {
    let gap = match gap {
        GapPolicy::Unbounded => "(?s:.*?)".to_string(),
        GapPolicy::SameLine => "[^\n]*?".to_string(),
        GapPolicy::MaxChars(max) => format!("(?s:.{{0,{max}}}?)"),
    };
    format!(r"{}{}:\s*(.*)", regex::escape(label), gap)
}

/// Compile the case-insensitive search pattern for a label.
pub fn compile_label_pattern(label: &str, gap: GapPolicy) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&label_pattern(label, gap))
        .case_insensitive(true)
        .size_limit(32 * (1 << 20))
        .build()
}

/// Whether a trimmed capture is empty or a filler such as `N/A`.
pub fn is_placeholder_value(value: &str) -> bool {
    value.is_empty() || PLACEHOLDER_VALUES.contains(&value)
}

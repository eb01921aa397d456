//! Uploaded documents and the per-request text corpus built from them.

use serde::{Deserialize, Serialize};

/// An uploaded document awaiting extraction.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Original file name, used in corpus headers and logs.
    pub name: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Which path produced a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Embedded text layer.
    Direct,
    /// Page images run through OCR.
    Ocr,
    /// Neither path produced text.
    Failed,
}

/// Best-effort text for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentText {
    /// Extracted text, possibly empty.
    pub text: String,
    /// Path that produced `text`.
    pub method: ExtractionMethod,
    /// Failure description when no usable text came out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl DocumentText {
    pub fn direct(text: String) -> Self {
        Self {
            text,
            method: ExtractionMethod::Direct,
            failure: None,
        }
    }

    pub fn ocr(text: String) -> Self {
        Self {
            text,
            method: ExtractionMethod::Ocr,
            failure: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            method: ExtractionMethod::Failed,
            failure: Some(reason.into()),
        }
    }
}

/// Extracted text tagged with its originating document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    pub source_name: String,
    #[serde(flatten)]
    pub content: DocumentText,
}

/// Concatenation of every document's text for one request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusText {
    sections: Vec<ExtractedText>,
    text: String,
}

impl CorpusText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document section: a header line naming the source, then its
    /// text, or an error marker when `annotate_failures` is set and the
    /// document produced nothing.
    ///
    /// Header and marker never contain `:`, so a label search cannot take
    /// its value from them.
    pub fn push(&mut self, section: ExtractedText, annotate_failures: bool) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        let name = without_colons(&section.source_name);
        self.text.push_str(&format!("=== Documento {} ===\n", name));

        match &section.content.failure {
            Some(reason) if annotate_failures => {
                self.text.push_str(&format!(
                    "[Erro ao processar arquivo {} - {}]\n",
                    name,
                    without_colons(reason)
                ));
            }
            _ => {
                self.text.push_str(&section.content.text);
                if !section.content.text.ends_with('\n') {
                    self.text.push('\n');
                }
            }
        }

        self.sections.push(section);
    }

    /// The concatenated corpus.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Per-document sections in submission order.
    pub fn sections(&self) -> &[ExtractedText] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn without_colons(text: &str) -> String {
    text.replace(": ", " - ").replace(':', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn section(name: &str, content: DocumentText) -> ExtractedText {
        ExtractedText {
            source_name: name.to_string(),
            content,
        }
    }

    #[test]
    fn test_corpus_sections_in_order() {
        let mut corpus = CorpusText::new();
        corpus.push(section("a.pdf", DocumentText::direct("Nome: Ana".into())), true);
        corpus.push(section("b.pdf", DocumentText::ocr("Nome: Bia\n".into())), true);

        assert_eq!(
            corpus.as_str(),
            "=== Documento a.pdf ===\nNome: Ana\n\n=== Documento b.pdf ===\nNome: Bia\n"
        );
        assert_eq!(corpus.sections().len(), 2);
    }

    #[test]
    fn test_failure_marker_is_optional() {
        let mut annotated = CorpusText::new();
        annotated.push(section("x.pdf", DocumentText::failed("corrupt")), true);
        assert!(annotated.as_str().contains("[Erro ao processar arquivo x.pdf - corrupt]"));

        let mut plain = CorpusText::new();
        plain.push(section("x.pdf", DocumentText::failed("corrupt")), false);
        assert_eq!(plain.as_str(), "=== Documento x.pdf ===\n\n");
    }

    #[test]
    fn test_header_and_marker_have_no_colons() {
        let mut corpus = CorpusText::new();
        corpus.push(
            section(
                "scan:01.pdf",
                DocumentText::failed("failed to parse PDF: invalid file header; OCR error: missing"),
            ),
            true,
        );

        assert_eq!(
            corpus.as_str(),
            "=== Documento scan 01.pdf ===\n[Erro ao processar arquivo scan 01.pdf - failed to parse PDF - invalid file header; OCR error - missing]\n"
        );
        assert!(!corpus.as_str().contains(':'));
    }
}

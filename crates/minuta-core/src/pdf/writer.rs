//! Plain-text to PDF rendering with lopdf.
//!
//! The draft is set in Courier, a standard font every viewer carries, so no
//! font program is embedded and line wrapping can be done by column count.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use tracing::debug;

use crate::error::RenderError;
use crate::models::config::RenderConfig;

/// Courier glyph advance, in thousandths of the font size.
const COURIER_ADVANCE: i64 = 600;

/// Spaces substituted for a tab character.
const TAB_WIDTH: usize = 4;

/// Renders filled drafts as paginated PDF documents.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    config: RenderConfig,
}

impl PdfWriter {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Characters that fit on one line.
    pub fn columns(&self) -> usize {
        let c = &self.config;
        if c.font_size <= 0 {
            return 0;
        }
        let usable = (c.page_width - 2 * c.margin).max(0);
        (usable * 1000 / (c.font_size * COURIER_ADVANCE)) as usize
    }

    /// Lines that fit on one page.
    pub fn lines_per_page(&self) -> usize {
        let c = &self.config;
        if c.line_height <= 0 {
            return 0;
        }
        ((c.page_height - 2 * c.margin).max(0) / c.line_height) as usize
    }

    /// Split `text` into pages of wrapped lines.
    ///
    /// Line breaks in the input are kept. An empty text still yields one
    /// (blank) page.
    pub fn layout(&self, text: &str) -> Result<Vec<Vec<String>>, RenderError> {
        let columns = self.columns();
        let per_page = self.lines_per_page();
        if columns == 0 || per_page == 0 {
            return Err(RenderError::Layout(format!(
                "{}x{} page with margin {} leaves no room for {}pt text",
                self.config.page_width, self.config.page_height, self.config.margin, self.config.font_size
            )));
        }

        let lines: Vec<String> = text
            .lines()
            .flat_map(|line| wrap_line(&line.replace('\t', &" ".repeat(TAB_WIDTH)), columns))
            .collect();

        if lines.is_empty() {
            return Ok(vec![Vec::new()]);
        }

        Ok(lines.chunks(per_page).map(<[String]>::to_vec).collect())
    }

    /// Render `text` as a complete PDF file.
    pub fn render_text(&self, text: &str) -> Result<Vec<u8>, RenderError> {
        let pages = self.layout(text)?;
        let c = &self.config;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for lines in &pages {
            let content = self.page_content(lines);
            let encoded = content
                .encode()
                .map_err(|e| RenderError::Encode(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(c.page_width),
                    Object::Integer(c.page_height),
                ],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if c.compress {
            doc.compress();
        }

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| RenderError::Write(e.to_string()))?;

        debug!("Rendered {} page(s), {} bytes", page_count, output.len());
        Ok(output)
    }

    fn page_content(&self, lines: &[String]) -> Content {
        let c = &self.config;
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), Object::Integer(c.font_size)]),
            Operation::new("TL", vec![Object::Integer(c.line_height)]),
            Operation::new(
                "Td",
                vec![
                    Object::Integer(c.margin),
                    Object::Integer(c.page_height - c.margin - c.font_size),
                ],
            ),
        ];

        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(line))],
            ));
        }

        operations.push(Operation::new("ET", vec![]));
        Content { operations }
    }
}

/// Break a line into chunks of at most `width` characters, preferring spaces.
///
/// Trailing whitespace is dropped; leading indentation of the first chunk
/// is kept.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = line.trim_end().chars().collect();
    if width == 0 || chars.len() <= width {
        return vec![chars.into_iter().collect()];
    }

    let mut wrapped = Vec::new();
    let mut rest: &[char] = &chars;

    while rest.len() > width {
        // One extra char so a space right at the limit can be the break
        let window = &rest[..=width];
        let (head, tail) = match window.iter().rposition(|&ch| ch == ' ') {
            Some(i) if i > 0 => (&rest[..i], &rest[i + 1..]),
            _ => (&rest[..width], &rest[width..]),
        };
        wrapped.push(head.iter().collect::<String>().trim_end().to_string());

        rest = tail;
        while rest.first() == Some(&' ') {
            rest = &rest[1..];
        }
    }

    if !rest.is_empty() {
        wrapped.push(rest.iter().collect());
    }
    wrapped
}

/// Encode text for a WinAnsiEncoding font. Unmappable characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        ' '..='~' => ch as u8,
        '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

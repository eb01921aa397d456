//! PDF text and page-image reading using lopdf and pdf-extract.

use std::panic::{AssertUnwindSafe, catch_unwind};

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF reader backed by lopdf for structure and pdf-extract for text.
pub struct PdfReader {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfReader {
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Convenience: create a reader and load `data` into it.
    pub fn open(data: &[u8]) -> Result<Self> {
        let mut reader = Self::new();
        reader.load(data)?;
        Ok(reader)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))
    }

    /// Resources dictionary for a page, following `/Parent` inheritance.
    fn page_resources(&self, doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
        let mut node_id = page_id;
        loop {
            let node = doc.get_object(node_id).ok()?.as_dict().ok()?;
            if let Ok(resources) = node.get(b"Resources") {
                if let Ok((_, Object::Dictionary(dict))) = doc.dereference(resources) {
                    return Some(dict.clone());
                }
            }
            node_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        }
    }

    /// Every image XObject in the document, in object order.
    fn all_images(&self, doc: &Document) -> Vec<DynamicImage> {
        let images: Vec<DynamicImage> = doc
            .objects
            .values()
            .filter_map(|object| match object {
                Object::Stream(stream) => decode_image_stream(doc, stream),
                _ => None,
            })
            .collect();
        debug!("Found {} images in document", images.len());
        images
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfReader {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Registry certificates are often "protected" with an empty user password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_texts(&self) -> Result<Vec<String>> {
        self.document()?;

        // pdf-extract panics on some malformed font programs
        let pages = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
        }))
        .map_err(|_| PdfError::TextExtraction("text extractor panicked".to_string()))?
        .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        trace!("Extracted text layer from {} pages", pages.len());
        Ok(pages)
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let page_id = *doc.get_pages().get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        if let Some(resources) = self.page_resources(doc, page_id) {
            if let Ok((_, Object::Dictionary(xobjects))) =
                resources.get(b"XObject").and_then(|x| doc.dereference(x))
            {
                for (_name, reference) in xobjects.iter() {
                    if let Ok((_, Object::Stream(stream))) = doc.dereference(reference) {
                        if let Some(img) = decode_image_stream(doc, stream) {
                            images.push(img);
                        }
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }

    fn render_page(&self, page: u32) -> Result<DynamicImage> {
        let images = self.extract_images(page)?;

        // A scanned page is usually one full-page image; take the largest
        if let Some(largest) = images
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()))
        {
            return Ok(largest);
        }

        // Some scanners attach images outside the page resources
        let doc = self.document()?;
        let mut all = self.all_images(doc);
        let index = page.saturating_sub(1) as usize;
        if index < all.len() {
            return Ok(all.swap_remove(index));
        }

        Err(PdfError::ImageExtraction(format!(
            "no image found for page {}",
            page
        )))
    }
}

/// Decode an image XObject stream into pixels, when the encoding is supported.
fn decode_image_stream(doc: &Document, stream: &Stream) -> Option<DynamicImage> {
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
    trace!("Found image object: {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(filters) => filters.last().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode" | b"CCITTFaxDecode" | b"JBIG2Decode") => {
            trace!("Skipping unsupported image filter");
            return None;
        }
        _ => {}
    }

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| doc.dereference(o).ok())
        .and_then(|(_, o)| match o {
            Object::Name(name) => Some(name.clone()),
            Object::Array(items) => items.first().and_then(|o| o.as_name().ok()).map(<[u8]>::to_vec),
            _ => None,
        })
        .unwrap_or_else(|| b"DeviceRGB".to_vec());

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    let pixels = (width as usize) * (height as usize);

    match color_space.as_slice() {
        b"DeviceGray" | b"G" | b"CalGray" if data.len() >= pixels => {
            GrayImage::from_raw(width, height, data[..pixels].to_vec()).map(DynamicImage::ImageLuma8)
        }
        b"DeviceRGB" | b"RGB" | b"CalRGB" if data.len() >= pixels * 3 => {
            RgbImage::from_raw(width, height, data[..pixels * 3].to_vec())
                .map(DynamicImage::ImageRgb8)
        }
        other => {
            trace!(
                "Could not decode image: colorspace={}, data_len={}",
                String::from_utf8_lossy(other),
                data.len()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_new() {
        let reader = PdfReader::new();
        assert!(reader.document.is_none());
        assert_eq!(reader.page_count(), 0);
        assert!(reader.extract_page_texts().is_err());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let result = PdfReader::open(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_invalid_page() {
        let pdf = crate::pdf::PdfWriter::default().render_text("linha").unwrap();
        let reader = PdfReader::open(&pdf).unwrap();
        assert_eq!(reader.page_count(), 1);
        assert!(matches!(reader.extract_images(7), Err(PdfError::InvalidPage(7))));
        assert!(reader.render_page(1).is_err());
    }
}

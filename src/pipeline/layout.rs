//! Layout extractor: turn a document into model-ready text.
//!
//! Two variants, selected by document kind:
//!
//! * **Image** — the layout-analysis service returns detected
//!   [`TextRegion`]s; LINE and WORD regions are rendered as a flat CSV
//!   table (one row per region, input order preserved) so the model sees
//!   both the text and its position on the page. Other region kinds carry
//!   structure the extraction prompt does not use and are dropped.
//!
//! * **PDF** — native-text PDFs skip layout analysis entirely: per-page
//!   text is extracted in page order and concatenated, one newline after
//!   each page, with no geometric information retained.
//!
//! Both variants are pure given their inputs; zero usable content produces
//! an empty representation rather than an error, and the pipeline sends the
//! prompt anyway — the recoverer's empty-list floor absorbs whatever the
//! model does with an empty document.

use crate::error::ExtractError;
use crate::event::{RegionKind, TextRegion};
use pdf::file::FileOptions;
use tracing::debug;

/// Header of the tabular representation.
const TABLE_HEADER: [&str; 7] = [
    "Type",
    "Text",
    "Confidence",
    "Left",
    "Top",
    "Width",
    "Height",
];

/// Render detected text regions as the CSV tabular representation.
///
/// Filters to LINE and WORD kinds; emits one row per region in input order.
/// Geometry and confidence default to 0 upstream when the analysis service
/// omits them, so every row always has all seven columns.
pub fn regions_to_table(regions: &[TextRegion]) -> Result<String, ExtractError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(TABLE_HEADER)
        .map_err(|e| ExtractError::Internal(format!("csv write: {e}")))?;

    let mut rows = 0usize;
    for region in regions {
        if !matches!(region.kind, RegionKind::Line | RegionKind::Word) {
            continue;
        }
        writer
            .write_record([
                region.kind.label(),
                region.text.as_str(),
                region.confidence.to_string().as_str(),
                region.left.to_string().as_str(),
                region.top.to_string().as_str(),
                region.width.to_string().as_str(),
                region.height.to_string().as_str(),
            ])
            .map_err(|e| ExtractError::Internal(format!("csv write: {e}")))?;
        rows += 1;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExtractError::Internal(format!("csv flush: {e}")))?;
    debug!("Tabular representation: {} rows", rows);

    String::from_utf8(bytes).map_err(|e| ExtractError::Internal(format!("csv utf8: {e}")))
}

/// Concatenate per-page text in page order, one newline after each page.
pub fn concat_page_texts(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }
    text
}

/// Extract per-page text from PDF bytes.
///
/// Walks each page's content stream and collects text-draw operations.
/// Pages with no text contribute an empty string so page order survives
/// into the concatenated output.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    let file = FileOptions::cached()
        .load(bytes)
        .map_err(|e| ExtractError::PdfParse(e.to_string()))?;
    let resolver = file.resolver();

    let mut pages = Vec::new();
    for page_num in 0..file.num_pages() {
        let page = file
            .get_page(page_num)
            .map_err(|e| ExtractError::PdfParse(e.to_string()))?;

        let mut page_text = String::new();
        if let Some(content) = &page.contents {
            let operations = content
                .operations(&resolver)
                .map_err(|e| ExtractError::PdfParse(e.to_string()))?;
            for op in operations.iter() {
                if let pdf::content::Op::TextDraw { text } = op {
                    page_text.push_str(&text.to_string_lossy());
                }
            }
        }
        pages.push(page_text);
    }

    debug!("Extracted text from {} PDF pages", pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(kind: RegionKind, text: &str) -> TextRegion {
        TextRegion {
            kind,
            text: text.to_string(),
            confidence: 0.99,
            left: 0.1,
            top: 0.2,
            width: 0.3,
            height: 0.05,
        }
    }

    #[test]
    fn table_filters_to_line_and_word() {
        let regions = vec![
            region(RegionKind::Line, "Meeting Friday"),
            region(RegionKind::Other, "cell contents"),
            region(RegionKind::Word, "Meeting"),
            region(RegionKind::Other, "table"),
            region(RegionKind::Word, "Friday"),
        ];
        let table = regions_to_table(&regions).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        // Header + one row per LINE/WORD region, in input order.
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Type,Text,Confidence,Left,Top,Width,Height");
        assert!(lines[1].starts_with("LINE,Meeting Friday,"));
        assert!(lines[2].starts_with("WORD,Meeting,"));
        assert!(lines[3].starts_with("WORD,Friday,"));
        assert!(!table.contains("cell contents"));
    }

    #[test]
    fn table_row_carries_geometry() {
        let table = regions_to_table(&[region(RegionKind::Line, "x")]).unwrap();
        assert!(table.contains("LINE,x,0.99,0.1,0.2,0.3,0.05"));
    }

    #[test]
    fn table_quotes_embedded_commas() {
        let table = regions_to_table(&[region(RegionKind::Line, "Jan 5, 2025")]).unwrap();
        assert!(table.contains("\"Jan 5, 2025\""));
    }

    #[test]
    fn table_defaults_render_as_zero() {
        let r = TextRegion {
            kind: RegionKind::Word,
            text: "x".into(),
            confidence: 0.0,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
        };
        let table = regions_to_table(&[r]).unwrap();
        assert!(table.contains("WORD,x,0,0,0,0,0"));
    }

    #[test]
    fn empty_regions_yield_header_only() {
        let table = regions_to_table(&[]).unwrap();
        assert_eq!(table.lines().count(), 1);
    }

    #[test]
    fn pages_concatenate_in_order_with_newlines() {
        let pages = vec!["page one".to_string(), "page two".to_string()];
        assert_eq!(concat_page_texts(&pages), "page one\npage two\n");
    }

    #[test]
    fn empty_pages_concatenate_to_empty_lines() {
        assert_eq!(concat_page_texts(&[String::new()]), "\n");
        assert_eq!(concat_page_texts(&[]), "");
    }

    #[test]
    fn garbage_pdf_bytes_fail_to_parse() {
        let err = extract_pdf_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::PdfParse(_)));
    }
}

//! Encode a [`ReportDocument`] as PDF bytes with `lopdf`.
//!
//! Only the two standard Helvetica faces are used, so no font program is
//! embedded. Text goes through WinAnsiEncoding, which covers French accents,
//! `€` and `•`; characters outside it are replaced by `?`.

use super::layout::{DrawOp, ReportDocument, Rgb, PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::ContractReaderError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

const PT_PER_MM: f32 = 72.0 / 25.4;

fn pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

fn real(value: f32) -> Object {
    value.into()
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![
        real(color.0 as f32 / 255.0),
        real(color.1 as f32 / 255.0),
        real(color.2 as f32 / 255.0),
    ]
}

/// Map a Unicode string onto WinAnsiEncoding (Windows-1252) bytes.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            'Œ' => 0x8c,
            'œ' => 0x9c,
            'Ÿ' => 0x9f,
            _ => b'?',
        })
        .collect()
}

fn page_content(ops: &[DrawOp]) -> Content {
    let mut operations = Vec::new();
    for op in ops {
        match op {
            DrawOp::FillRect { x, y, w, h, color } => {
                operations.push(Operation::new("rg", color_operands(*color)));
                operations.push(Operation::new(
                    "re",
                    vec![
                        real(pt(*x)),
                        real(pt(PAGE_HEIGHT - y - h)),
                        real(pt(*w)),
                        real(pt(*h)),
                    ],
                ));
                operations.push(Operation::new("f", vec![]));
            }
            DrawOp::Text {
                x,
                y,
                size,
                bold,
                color,
                text,
            } => {
                let font = if *bold { "F2" } else { "F1" };
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("rg", color_operands(*color)));
                operations.push(Operation::new("Tf", vec![font.into(), real(*size)]));
                operations.push(Operation::new(
                    "Td",
                    vec![real(pt(*x)), real(pt(PAGE_HEIGHT - y))],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
        }
    }
    Content { operations }
}

fn font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Encode `report` as a complete PDF file.
pub fn encode(report: &ReportDocument) -> Result<Vec<u8>, ContractReaderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(report.pages.len());
    for page in &report.pages {
        let content = page_content(&page.ops)
            .encode()
            .map_err(|e| ContractReaderError::ReportGeneration(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), real(pt(PAGE_WIDTH)), real(pt(PAGE_HEIGHT))],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(win_ansi(&report.title), StringFormat::Literal),
        "Producer" => Object::string_literal("contract-reader"),
    });
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ContractReaderError::ReportGeneration(e.to_string()))?;
    debug!(pages = report.pages.len(), bytes = bytes.len(), "Encoded report PDF");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::layout::{ReportPage, palette};

    fn sample() -> ReportDocument {
        ReportDocument {
            title: "BAIL".into(),
            pages: vec![
                ReportPage {
                    ops: vec![
                        DrawOp::FillRect {
                            x: 0.0,
                            y: 0.0,
                            w: 210.0,
                            h: 20.0,
                            color: palette::PRIMARY,
                        },
                        DrawOp::Text {
                            x: 15.0,
                            y: 40.0,
                            size: 18.0,
                            bold: true,
                            color: palette::PRIMARY,
                            text: "Résumé • 5000 €".into(),
                        },
                    ],
                },
                ReportPage::default(),
            ],
        }
    }

    #[test]
    fn encodes_a_loadable_pdf() {
        let bytes = encode(&sample()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn win_ansi_maps_french_text() {
        assert_eq!(win_ansi("é"), vec![0xe9]);
        assert_eq!(win_ansi("€•"), vec![0x80, 0x95]);
        assert_eq!(win_ansi("✓"), vec![b'?']);
    }

    #[test]
    fn coordinates_flip_to_pdf_space() {
        let content = page_content(&[DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            w: 210.0,
            h: 20.0,
            color: palette::PRIMARY,
        }]);
        let re = &content.operations[1];
        assert_eq!(re.operator, "re");
        let y = re.operands[1].as_float().unwrap();
        assert!((y - pt(277.0)).abs() < 0.01);
    }
}

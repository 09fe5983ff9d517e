//! PDF backend for voucher layouts
//!
//! Draws a `VoucherDocument` onto a single page sized to the voucher, using
//! the standard Courier faces so no font data has to be embedded. Layout
//! coordinates are millimetres from the top-left; PDF user space is points
//! from the bottom-left.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::render::{FontStyle, VoucherDocument, VoucherElement};

const PT_PER_MM: f32 = 72.0 / 25.4;
const RULE_WIDTH_PT: f32 = 0.5;

fn font_resource(style: FontStyle) -> &'static str {
    match style {
        FontStyle::Normal => "F1",
        FontStyle::Bold => "F2",
        FontStyle::Italic => "F3",
    }
}

fn base_font(style: FontStyle) -> &'static str {
    match style {
        FontStyle::Normal => "Courier",
        FontStyle::Bold => "Courier-Bold",
        FontStyle::Italic => "Courier-Oblique",
    }
}

fn pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Content stream operations for every element of `doc`
fn operations(doc: &VoucherDocument) -> Vec<Operation> {
    let flip = |y: f32| pt(doc.height_mm - y);
    let mut ops = Vec::with_capacity(doc.elements.len() * 5);

    for element in &doc.elements {
        match element {
            VoucherElement::Text { text, x, y, style } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![font_resource(*style).into(), doc.font_size_pt.into()],
                ));
                ops.push(Operation::new("Td", vec![pt(*x).into(), flip(*y).into()]));
                ops.push(Operation::new("Tj", vec![Object::string_literal(text.as_str())]));
                ops.push(Operation::new("ET", vec![]));
            }
            VoucherElement::Rule { x1, x2, y } => {
                ops.push(Operation::new("w", vec![RULE_WIDTH_PT.into()]));
                ops.push(Operation::new("m", vec![pt(*x1).into(), flip(*y).into()]));
                ops.push(Operation::new("l", vec![pt(*x2).into(), flip(*y).into()]));
                ops.push(Operation::new("S", vec![]));
            }
        }
    }
    ops
}

/// Render `doc` as a one-page PDF
pub fn to_pdf_bytes(doc: &VoucherDocument) -> Result<Vec<u8>, lopdf::Error> {
    let mut pdf = Document::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for style in [FontStyle::Normal, FontStyle::Bold, FontStyle::Italic] {
        let font_id = pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font(style),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font_resource(style), font_id);
    }
    let resources_id = pdf.add_object(dictionary! { "Font" => fonts });

    let content = Content {
        operations: operations(doc),
    };
    let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = pdf.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), pt(doc.width_mm).into(), pt(doc.height_mm).into()],
        }),
    );
    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.compress();

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentRecord;
    use crate::render::VoucherRenderer;

    fn shown_text(bytes: &[u8]) -> Vec<(String, String)> {
        let pdf = Document::load_mem(bytes).unwrap();
        let pages = pdf.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = pages[&1];
        let content = Content::decode(&pdf.get_page_content(page_id).unwrap()).unwrap();

        let mut font = String::new();
        let mut shown = Vec::new();
        for op in content.operations {
            match op.operator.as_str() {
                "Tf" => font = String::from_utf8_lossy(op.operands[0].as_name().unwrap()).into_owned(),
                "Tj" => {
                    let text = op.operands[0].as_str().unwrap();
                    shown.push((font.clone(), String::from_utf8_lossy(text).into_owned()));
                }
                _ => {}
            }
        }
        shown
    }

    #[test]
    fn test_pdf_draws_every_text_line_in_order() {
        let doc = VoucherRenderer::default().render(&StudentRecord::new(1001, "Ayesha Khan", 1));
        let bytes = to_pdf_bytes(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let shown = shown_text(&bytes);
        let lines: Vec<&str> = shown.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "Bano Qabil 3.0");
        assert_eq!(lines[2], "Student ID: 1001");
        assert_eq!(lines[3], "Name: Ayesha Khan");
        assert_eq!(lines[9], "Bano Qabil 3.0!");

        // Header bold, student block regular, notice oblique
        assert_eq!(shown[0].0, "F2");
        assert_eq!(shown[2].0, "F1");
        assert_eq!(shown[5].0, "F3");
    }

    #[test]
    fn test_pdf_page_matches_voucher_size() {
        let doc = VoucherRenderer::default().render(&StudentRecord::id_only("BQ-77"));
        let pdf = Document::load_mem(&to_pdf_bytes(&doc).unwrap()).unwrap();
        let media_box = pdf
            .objects
            .values()
            .filter_map(|object| object.as_dict().ok())
            .find(|dict| dict.get(b"Type").and_then(Object::as_name).ok() == Some(b"Pages".as_slice()))
            .and_then(|pages| pages.get(b"MediaBox").ok())
            .and_then(|media_box| media_box.as_array().ok())
            .unwrap()
            .clone();

        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!((width - 80.0 * PT_PER_MM).abs() < 0.01);
        assert!((height - 100.0 * PT_PER_MM).abs() < 0.01);
    }

    #[test]
    fn test_layout_y_is_flipped_to_pdf_space() {
        let doc = VoucherRenderer::default().render(&StudentRecord::new(1001, "Ayesha Khan", 1));
        let first_td = operations(&doc)
            .into_iter()
            .find(|op| op.operator == "Td")
            .unwrap();
        let y = first_td.operands[1].as_float().unwrap();
        assert!((y - (100.0 - 10.0) * PT_PER_MM).abs() < 0.01);
    }

    #[test]
    fn test_rules_are_stroked() {
        let doc = VoucherRenderer::default().render(&StudentRecord::new(1001, "Ayesha Khan", 1));
        let strokes = operations(&doc).iter().filter(|op| op.operator == "S").count();
        assert_eq!(strokes, 2);
    }
}

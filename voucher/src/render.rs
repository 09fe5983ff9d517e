//! Voucher rendering
//!
//! Lays out the fixed 80 × 100 mm graduation voucher: a bold header, the
//! student block between two rules, an italic notice, and a bold sign-off.
//! Every text line is centered using courier metrics. Downloads draw the layout
//! as a PDF; printing flattens it into thermal-printer text.

use serde::Serialize;

use crate::models::StudentRecord;

pub const PAGE_WIDTH_MM: f32 = 80.0;
pub const PAGE_HEIGHT_MM: f32 = 100.0;
pub const FONT_FAMILY: &str = "courier";
pub const FONT_SIZE_PT: f32 = 10.0;
pub const DEFAULT_EVENT_TITLE: &str = "Bano Qabil 3.0";

const MM_PER_PT: f32 = 25.4 / 72.0;
/// Courier advance width in em
const COURIER_ADVANCE_EM: f32 = 0.6;
const RULE_START_MM: f32 = 5.0;
const RULE_END_MM: f32 = 75.0;
const TOP_MARGIN_MM: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
}

/// One drawable element, positioned in millimetres from the top-left corner
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VoucherElement {
    Text {
        text: String,
        x: f32,
        y: f32,
        style: FontStyle,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
    },
}

/// A rendered voucher, ready for a page backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoucherDocument {
    pub width_mm: f32,
    pub height_mm: f32,
    pub font_family: &'static str,
    pub font_size_pt: f32,
    pub student_id: String,
    pub elements: Vec<VoucherElement>,
}

/// Width of `text` in millimetres at the voucher font size
pub fn text_width_mm(text: &str) -> f32 {
    text.chars().count() as f32 * char_width_mm()
}

fn char_width_mm() -> f32 {
    COURIER_ADVANCE_EM * FONT_SIZE_PT * MM_PER_PT
}

/// Keep ids usable as file names
fn file_safe(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Builds voucher layouts. Holds the event title printed in the header and
/// sign-off.
#[derive(Debug, Clone)]
pub struct VoucherRenderer {
    event_title: String,
}

impl Default for VoucherRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_TITLE)
    }
}

/// Cursor that appends elements top to bottom
struct Layout {
    y: f32,
    style: FontStyle,
    elements: Vec<VoucherElement>,
}

impl Layout {
    fn centered(&mut self, text: impl Into<String>, advance: f32) {
        let text = text.into();
        let x = (PAGE_WIDTH_MM - text_width_mm(&text)) / 2.0;
        self.elements.push(VoucherElement::Text {
            text,
            x,
            y: self.y,
            style: self.style,
        });
        self.y += advance;
    }

    fn rule(&mut self, advance: f32) {
        self.elements.push(VoucherElement::Rule {
            x1: RULE_START_MM,
            x2: RULE_END_MM,
            y: self.y,
        });
        self.y += advance;
    }
}

impl VoucherRenderer {
    pub fn new(event_title: impl Into<String>) -> Self {
        Self {
            event_title: event_title.into(),
        }
    }

    pub fn event_title(&self) -> &str {
        &self.event_title
    }

    pub fn render(&self, record: &StudentRecord) -> VoucherDocument {
        let mut layout = Layout {
            y: TOP_MARGIN_MM,
            style: FontStyle::Bold,
            elements: Vec::with_capacity(12),
        };

        layout.centered(self.event_title.as_str(), 5.0);
        layout.centered("Graduation Ceremony", 6.0);

        layout.style = FontStyle::Normal;
        layout.rule(4.0);
        layout.centered(format!("Student ID: {}", record.id), 5.0);
        layout.centered(format!("Name: {}", record.name().unwrap_or("")), 5.0);
        layout.centered(format!("Serial No: {}", record.serial_label()), 6.0);
        layout.rule(4.0);

        layout.style = FontStyle::Italic;
        layout.centered("Please keep this token safe.", 4.0);
        layout.centered("It is required to collect", 4.0);
        layout.centered("your certificate.", 6.0);

        layout.style = FontStyle::Bold;
        layout.centered("Thanks for being part of", 4.0);
        layout.centered(format!("{}!", self.event_title), 2.0);

        VoucherDocument {
            width_mm: PAGE_WIDTH_MM,
            height_mm: PAGE_HEIGHT_MM,
            font_family: FONT_FAMILY,
            font_size_pt: FONT_SIZE_PT,
            student_id: record.id_string(),
            elements: layout.elements,
        }
    }
}

impl VoucherDocument {
    /// Download name, e.g. `voucher_1001.pdf`
    pub fn file_name(&self) -> String {
        format!("voucher_{}.pdf", file_safe(&self.student_id))
    }

    /// Draw the layout as a one-page PDF
    pub fn to_pdf(&self) -> Result<Vec<u8>, lopdf::Error> {
        crate::pdf::to_pdf_bytes(self)
    }

    /// Number of monospace columns that fit across the page
    pub fn columns(&self) -> usize {
        (self.width_mm / char_width_mm()).floor() as usize
    }

    /// Flatten the layout into fixed-width lines for a thermal printer.
    /// Lines are centered within `columns()`; rules become dashes spanning the
    /// rule's width.
    pub fn to_thermal_text(&self) -> String {
        let columns = self.columns();
        let char_width = char_width_mm();
        let mut out = String::new();

        for element in &self.elements {
            let line = match element {
                VoucherElement::Text { text, .. } => {
                    let len = text.chars().count();
                    let pad = columns.saturating_sub(len) / 2;
                    format!("{}{}", " ".repeat(pad), text)
                }
                VoucherElement::Rule { x1, x2, .. } => {
                    let width = (((x2 - x1) / char_width).round() as usize).min(columns);
                    let pad = columns.saturating_sub(width) / 2;
                    format!("{}{}", " ".repeat(pad), "-".repeat(width))
                }
            };
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

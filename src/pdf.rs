use std::io::{BufWriter, Cursor};

use printpdf::*;

use crate::aggregate::TOP_CATEGORIES;
use crate::error::{DashError, Result};
use crate::filter::FilterSpec;
use crate::fmt::{amount, label_list};

pub const REPORT_FILE_NAME: &str = "expense_report.pdf";
pub const REPORT_MEDIA_TYPE: &str = "application/pdf";

// US Letter dimensions (mm)
const PAGE_W: f32 = 215.9;
const PAGE_H: f32 = 279.4;
const MARGIN_TOP: f32 = 14.8;
const MARGIN_LEFT: f32 = 35.3;
const INDENT: f32 = 42.3;
const ROW_H: f32 = 7.05;
const FONT_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 16.0;

/// Single-page text writer. Lines that pass the bottom edge are drawn off-page.
struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DashError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| DashError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            page,
            layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        let layer = self.doc.get_page(self.page).get_layer(self.layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn line(&mut self, s: &str) {
        self.text(s, MARGIN_LEFT, FONT_SIZE, false);
        self.y += ROW_H;
    }

    fn indented_line(&mut self, s: &str) {
        self.text(s, INDENT, FONT_SIZE, false);
        self.y += ROW_H;
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| DashError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| DashError::Pdf(e.to_string()))
    }
}

enum ReportLine {
    Text(String),
    Item(String),
    Blank,
}

impl ReportLine {
    #[cfg(test)]
    fn plain(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Item(s) => format!("  {s}"),
            Self::Blank => String::new(),
        }
    }
}

/// Report body below the title, top to bottom.
fn report_lines(spec: &FilterSpec, top_categories: &[(String, f64)]) -> Vec<ReportLine> {
    let mut lines = vec![
        ReportLine::Text(format!(
            "Price Range: {} - {}",
            amount(spec.price_min()),
            amount(spec.price_max())
        )),
        ReportLine::Text(format!("Selected Months: {}", label_list(&spec.selected_dates()))),
        ReportLine::Text(format!("Selected Modules: {}", label_list(&spec.selected_modules()))),
        ReportLine::Blank,
        ReportLine::Text(format!("Top {TOP_CATEGORIES} Categories:")),
    ];
    lines.extend(
        top_categories
            .iter()
            .map(|(module, total)| ReportLine::Item(format!("{module}: {}", amount(*total)))),
    );
    lines.push(ReportLine::Blank);
    lines.push(ReportLine::Text(
        "Thank you for using the Expense Dashboard!".to_string(),
    ));
    lines
}

/// Render the filter summary and top categories. The returned cursor is at offset 0.
pub fn render_report(spec: &FilterSpec, top_categories: &[(String, f64)]) -> Result<Cursor<Vec<u8>>> {
    let mut pdf = PdfWriter::new("Expense Report")?;
    pdf.text("Expense Report", MARGIN_LEFT, TITLE_SIZE, true);
    pdf.y += ROW_H * 1.5;

    for line in report_lines(spec, top_categories) {
        match line {
            ReportLine::Text(s) => pdf.line(&s),
            ReportLine::Item(s) => pdf.indented_line(&s),
            ReportLine::Blank => pdf.blank_row(),
        }
    }

    Ok(Cursor::new(pdf.to_bytes()?))
}

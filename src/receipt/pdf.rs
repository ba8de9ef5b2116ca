//! A4 receipt document.
//!
//! Output depends only on the [`Receipt`]: no creation dates, no random
//! document id, so the same receipt always yields the same bytes.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use super::Receipt;
use crate::billing::format_money;
use crate::error::{AppError, AppResult};

const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN_X: f32 = 47.5;
const TOP: f32 = PAGE_H - 56.0;
const BOTTOM: f32 = 56.0;

const COL_WIDTHS: [f32; 4] = [100.0, 150.0, 150.0, 100.0];
const HEADER_ROW_H: f32 = 24.0;
const ROW_H: f32 = 18.0;
const CELL_FONT: f32 = 9.0;

const TABLE_HEADERS: [&str; 4] = ["Billing Date", "Billing Type", "Billing Ref", "Billing Amount"];

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }
}

type Rgb = (f32, f32, f32);

const BLACK: Rgb = (0.0, 0.0, 0.0);
const WHITESMOKE: Rgb = (0.96, 0.96, 0.96);
const GREY: Rgb = (0.5, 0.5, 0.5);
const BEIGE: Rgb = (0.96, 0.96, 0.86);

fn real(v: f32) -> Object {
    Object::Real(v.into())
}

fn rgb_operands((r, g, b): Rgb) -> Vec<Object> {
    vec![real(r), real(g), real(b)]
}

/// Base-14 fonts are declared with WinAnsiEncoding; characters that code
/// page has no slot for become '?'.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi).collect()
}

fn win_ansi(c: char) -> u8 {
    match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        // C1 controls have no glyph in WinAnsi
        '\u{0080}'..='\u{009F}' => b'?',
        c if (c as u32) < 0x100 => c as u32 as u8,
        _ => b'?',
    }
}

/// Rough Helvetica advance widths, good enough for centring and clipping.
fn text_width(text: &str, size: f32) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
            ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '-' | '/' => 0.33,
            'm' | 'w' | 'M' | 'W' => 0.83,
            '0'..='9' | '$' => 0.556,
            c if c.is_ascii_uppercase() => 0.67,
            _ => 0.52,
        })
        .sum();
    em * size
}

fn fit(text: &str, size: f32, width: f32) -> String {
    if text_width(text, size) <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        out.push(c);
        if text_width(&out, size) + text_width("...", size) > width {
            out.pop();
            break;
        }
    }
    out.push_str("...");
    out
}

struct Pages {
    done: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl Pages {
    fn new() -> Self {
        Self { done: Vec::new(), ops: Vec::new(), y: TOP }
    }

    fn break_page(&mut self) {
        let ops = std::mem::take(&mut self.ops);
        self.done.push(ops);
        self.y = TOP;
    }

    fn ensure(&mut self, height: f32) -> bool {
        if self.y - height < BOTTOM {
            self.break_page();
            true
        } else {
            false
        }
    }

    fn skip(&mut self, height: f32) {
        self.y -= height;
    }

    fn text_at(&mut self, font: Font, size: f32, x: f32, y: f32, color: Rgb, text: &str) {
        self.ops.push(Operation::new("rg", rgb_operands(color)));
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.resource().as_bytes().to_vec()), real(size)],
        ));
        self.ops.push(Operation::new("Td", vec![real(x), real(y)]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_text(text))],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    /// Writes one line at the cursor and moves below it.
    fn line(&mut self, font: Font, size: f32, text: &str) {
        let leading = size * 1.4;
        self.ensure(leading);
        self.y -= size;
        let y = self.y;
        self.text_at(font, size, MARGIN_X, y, BLACK, text);
        self.y -= leading - size;
    }

    fn centred_line(&mut self, font: Font, size: f32, text: &str) {
        let leading = size * 1.4;
        self.ensure(leading);
        self.y -= size;
        let x = (PAGE_W - text_width(text, size)) / 2.0;
        let y = self.y;
        self.text_at(font, size, x.max(MARGIN_X), y, BLACK, text);
        self.y -= leading - size;
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb) {
        self.ops.push(Operation::new("rg", rgb_operands(fill)));
        self.ops.push(Operation::new("re", vec![real(x), real(y), real(w), real(h)]));
        self.ops.push(Operation::new("f", vec![]));
        self.ops.push(Operation::new("RG", rgb_operands(BLACK)));
        self.ops.push(Operation::new("w", vec![real(1.0)]));
        self.ops.push(Operation::new("re", vec![real(x), real(y), real(w), real(h)]));
        self.ops.push(Operation::new("S", vec![]));
    }

    fn table_row(&mut self, cells: [&str; 4], height: f32, font: Font, fill: Rgb, ink: Rgb) {
        let bottom = self.y - height;
        let mut x = MARGIN_X;
        for (cell, width) in cells.iter().zip(COL_WIDTHS) {
            self.rect(x, bottom, width, height, fill);
            let text = fit(cell, CELL_FONT, width - 8.0);
            let tx = x + (width - text_width(&text, CELL_FONT)) / 2.0;
            let ty = bottom + (height - CELL_FONT) / 2.0 + 1.5;
            self.text_at(font, CELL_FONT, tx, ty, ink, &text);
            x += width;
        }
        self.y = bottom;
    }

    fn header_row(&mut self) {
        self.table_row(TABLE_HEADERS, HEADER_ROW_H, Font::Bold, GREY, WHITESMOKE);
    }

    fn body_row(&mut self, cells: [&str; 4]) {
        if self.ensure(ROW_H) {
            self.header_row();
        }
        self.table_row(cells, ROW_H, Font::Regular, BEIGE, BLACK);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.done.is_empty() {
            self.break_page();
        }
        self.done
    }
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_string())
}

/// Content stream operations, one vector per page.
fn layout(receipt: &Receipt) -> Vec<Vec<Operation>> {
    let mut pages = Pages::new();

    pages.centred_line(Font::Bold, 20.0, &receipt.clinic.name);
    pages.skip(6.0);
    pages.line(Font::Regular, 10.0, &receipt.clinic.address);
    pages.line(Font::Regular, 10.0, &format!("Phone: {}", receipt.clinic.phone));
    pages.skip(20.0);

    pages.line(Font::Bold, 14.0, "Invoice Details");
    pages.line(
        Font::Regular,
        10.0,
        &format!("Invoice Number: {}", receipt.invoice.number),
    );
    pages.line(
        Font::Regular,
        10.0,
        &format!("Invoice Date Issued: {}", date_or_dash(receipt.invoice.date)),
    );
    let period = match &receipt.pay_period {
        Some(p) => format!("{} to {}", p.start, p.end),
        None => "-".to_string(),
    };
    pages.line(Font::Regular, 10.0, &format!("Payment Period: {period}"));
    let doctor = match &receipt.doctor {
        Some(d) => format!("{} (ABN: {})", d.name, d.abn),
        None => "-".to_string(),
    };
    pages.line(Font::Regular, 10.0, &format!("Doctor: {doctor}"));
    pages.skip(20.0);

    pages.line(Font::Bold, 14.0, "Billing Details");
    pages.skip(4.0);
    pages.ensure(HEADER_ROW_H + ROW_H);
    pages.header_row();
    for line in &receipt.billings {
        let date = date_or_dash(line.date);
        let amount = format_money(line.amount);
        pages.body_row([&date, &line.billing_type, &line.reference, &amount]);
    }
    let total = format_money(receipt.totals.total_billing);
    pages.body_row(["", "", "Total Billing Amount:", &total]);
    pages.skip(20.0);

    // keep the summary block together
    pages.ensure(110.0);
    pages.line(Font::Bold, 14.0, "Discounts and Net Payment");
    let t = &receipt.totals;
    pages.line(
        Font::Regular,
        10.0,
        &format!("Facility Fee: {}", format_money(t.facility_fee_amount)),
    );
    pages.line(Font::Regular, 10.0, &format!("GST: {}", format_money(t.gst_amount)));
    pages.line(
        Font::Regular,
        10.0,
        &format!("Total Deductions: {}", format_money(t.total_deductions)),
    );
    pages.line(
        Font::Bold,
        12.0,
        &format!("Net Payment: {}", format_money(t.net_payment)),
    );
    pages.skip(40.0);

    pages.line(Font::Italic, 10.0, "Thank you for your business!");

    pages.finish()
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

pub fn render(receipt: &Receipt) -> AppResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(font("Helvetica"));
    let bold = doc.add_object(font("Helvetica-Bold"));
    let italic = doc.add_object(font("Helvetica-Oblique"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
            "F3" => italic,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in layout(receipt) {
        let encoded = Content { operations }
            .encode()
            .map_err(|e| AppError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(page_count),
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_W as i64),
            Object::Integer(PAGE_H as i64),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf).map_err(|e| AppError::Pdf(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClinicDetails;
    use crate::receipt::tests::{billing, doctor, invoice, period};
    use rust_decimal_macros::dec;

    fn receipt(lines: usize) -> Receipt {
        let billings: Vec<_> = (1..=lines as u64).map(|i| billing(i, dec!(10.50))).collect();
        Receipt::build(
            &ClinicDetails::default(),
            &invoice(Some(dec!(5))),
            Some(&doctor()),
            Some(&period()),
            &billings,
        )
    }

    fn page_strings(pages: &[Vec<Operation>]) -> Vec<Vec<String>> {
        pages
            .iter()
            .map(|ops| {
                ops.iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| match op.operands.first() {
                        Some(Object::String(bytes, _)) => {
                            Some(String::from_utf8_lossy(bytes).into_owned())
                        }
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn same_receipt_same_bytes() {
        let r = receipt(3);
        let first = render(&r).unwrap();
        let second = render(&r).unwrap();
        assert!(first.starts_with(b"%PDF-1.5"));
        assert_eq!(first, second);
    }

    #[test]
    fn different_receipts_differ() {
        assert_ne!(render(&receipt(2)).unwrap(), render(&receipt(3)).unwrap());
    }

    #[test]
    fn lays_out_sections_in_order() {
        let pages = layout(&receipt(2));
        assert_eq!(pages.len(), 1);

        let text = &page_strings(&pages)[0];
        let pos = |needle: &str| {
            text.iter()
                .position(|t| t == needle)
                .unwrap_or_else(|| panic!("missing {needle:?} in {text:?}"))
        };

        assert_eq!(text[0], "Griffith Medical Centre");
        assert!(pos("Invoice Details") < pos("Billing Details"));
        assert!(pos("Billing Amount") < pos("Total Billing Amount:"));
        assert!(pos("Total Billing Amount:") < pos("Discounts and Net Payment"));
        assert_eq!(text[pos("Total Billing Amount:") + 1], "$21.00");
        // 21.00 - (2.10 + 5.00)
        pos("Net Payment: $13.90");
        pos("Doctor: Jane Citizen (ABN: 51 824 753 556)");
        pos("Thank you for your business!");
    }

    #[test]
    fn long_tables_continue_with_repeated_header() {
        let pages = layout(&receipt(80));
        assert!(pages.len() >= 2);

        let strings = page_strings(&pages);
        assert!(strings[1].iter().any(|t| t == "Billing Date"));
        assert!(strings.last().unwrap().iter().any(|t| t == "Thank you for your business!"));

        let bytes = render(&receipt(80)).unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), pages.len());
    }

    #[test]
    fn overlong_cells_are_clipped() {
        let clipped = fit(&"x".repeat(200), CELL_FONT, 100.0);
        assert!(clipped.ends_with("..."));
        assert!(text_width(&clipped, CELL_FONT) <= 100.0);
    }

    #[test]
    fn non_latin_text_is_replaced() {
        assert_eq!(encode_text("Zoë 医"), b"Zo\xeb ?".to_vec());
    }

    #[test]
    fn typographic_punctuation_uses_win_ansi_slots() {
        assert_eq!(encode_text("€–\u{85}é"), vec![0x80, 0x96, b'?', 0xE9]);
        assert_eq!(encode_text("O’Brien — “Dr”"), b"O\x92Brien \x97 \x93Dr\x94".to_vec());
    }
}

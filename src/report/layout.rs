//! Page layout: [`NormalizedSummary`] → pages of draw operations.
//!
//! Coordinates are millimetres on an A4 page, measured from the top-left
//! corner; [`super::pdf`] flips them into PDF points. Layout is a pure
//! function of the summary and the options, so tests can assert on the
//! resulting [`ReportDocument`] without decoding any PDF.
//!
//! ## Flow
//!
//! Sections are stacked top to bottom in a fixed order. Each section's height
//! is `header + lines × line height + padding`, computed *before* drawing:
//!
//! - if it fits in the space left on the page, it is drawn there;
//! - if it does not fit but would fit on an empty page, a new page starts;
//! - if it is taller than an empty page, it is split between items and the
//!   remainder continues on the next page under a `(suite)` heading.

use super::wrap::{collapse_whitespace, truncate_chars, wrap};
use crate::config::{ClientConfig, Language};
use crate::i18n::Messages;
use crate::normalize::NormalizedSummary;

// ── Geometry (mm) ────────────────────────────────────────────────────────────

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
const HEADER_HEIGHT: f32 = 20.0;
const MARGIN_X: f32 = 15.0;
const CONTENT_WIDTH: f32 = 180.0;
const TITLE_Y: f32 = 40.0;
const TITLE_LINE: f32 = 8.0;
const CONTINUATION_TOP: f32 = 28.0;
const CONTENT_BOTTOM: f32 = 280.0;
const FOOTER_Y: f32 = 287.0;
const SECTION_HEADER: f32 = 12.0;
const SECTION_PADDING: f32 = 4.0;
const SECTION_GAP: f32 = 6.0;
const LINE_HEIGHT: f32 = 6.0;
const TEXT_INDENT: f32 = 5.0;
const BULLET_INDENT: f32 = 4.0;

const TITLE_COLUMNS: usize = 50;
/// The title never pushes the first section below this many lines.
const TITLE_MAX_LINES: usize = 3;
/// Wrap width for list entries (risks, parties).
pub const ITEM_COLUMNS: usize = 90;
/// Wrap width for the executive summary.
pub const SUMMARY_COLUMNS: usize = 100;

/// Marker in front of each risk entry.
pub const BULLET: &str = "• ";

// ── Palette ──────────────────────────────────────────────────────────────────

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub mod palette {
    use super::Rgb;

    pub const PRIMARY: Rgb = Rgb(30, 41, 59);
    pub const SECONDARY: Rgb = Rgb(71, 85, 105);
    pub const TEXT: Rgb = Rgb(51, 65, 85);
    pub const MUTED: Rgb = Rgb(100, 116, 139);
    pub const SUCCESS: Rgb = Rgb(34, 197, 94);
    pub const WARNING: Rgb = Rgb(251, 146, 60);
    pub const DANGER: Rgb = Rgb(239, 68, 68);
    pub const BACKGROUND: Rgb = Rgb(248, 250, 252);
    pub const BORDER: Rgb = Rgb(226, 232, 240);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

// ── Output ───────────────────────────────────────────────────────────────────

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: Rgb,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPage {
    pub ops: Vec<DrawOp>,
}

impl ReportPage {
    /// Text of every text op on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::FillRect { .. } => None,
        })
    }
}

/// A laid-out report, ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub pages: Vec<ReportPage>,
}

impl ReportDocument {
    /// Text of every text op in the document, page by page.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(ReportPage::texts)
    }
}

/// Knobs that affect layout.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub language: Language,
    pub summary_char_budget: usize,
    pub summary_max_lines: usize,
    /// Date printed in the header band.
    pub date: String,
}

impl LayoutOptions {
    pub fn from_config(config: &ClientConfig, date: impl Into<String>) -> Self {
        Self {
            language: config.language,
            summary_char_budget: config.summary_char_budget,
            summary_max_lines: config.summary_max_lines,
            date: date.into(),
        }
    }
}

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Line {
    text: String,
    indent: f32,
    color: Rgb,
}

impl Line {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            indent: 0.0,
            color: palette::TEXT,
        }
    }

    fn colored(text: impl Into<String>, color: Rgb) -> Self {
        Self {
            text: text.into(),
            indent: 0.0,
            color,
        }
    }
}

/// A titled block; items are the unit a split may not cut through.
#[derive(Debug, Clone)]
struct Section {
    heading: String,
    items: Vec<Vec<Line>>,
}

impl Section {
    fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            items: Vec::new(),
        }
    }

    fn line(mut self, line: Line) -> Self {
        self.items.push(vec![line]);
        self
    }
}

fn section_height(lines: usize) -> f32 {
    SECTION_HEADER + lines as f32 * LINE_HEIGHT + SECTION_PADDING
}

fn line_count(items: &[Vec<Line>]) -> usize {
    items.iter().map(Vec::len).sum()
}

/// Wrap `text` as one list item, first line prefixed with `marker` and
/// continuation lines indented under it.
fn wrapped_item(text: &str, marker: &str, color: Rgb) -> Vec<Line> {
    let columns = ITEM_COLUMNS.saturating_sub(marker.chars().count());
    let mut lines: Vec<Line> = wrap(text, columns)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                Line::colored(format!("{marker}{chunk}"), color)
            } else {
                Line {
                    text: chunk,
                    indent: if marker.is_empty() { 0.0 } else { BULLET_INDENT },
                    color,
                }
            }
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::colored(marker.trim_end(), color));
    }
    lines
}

fn build_sections(summary: &NormalizedSummary, options: &LayoutOptions) -> Vec<Section> {
    let m = options.language.messages();
    let mut sections = Vec::new();

    // Classification, with governance alongside.
    let c = &summary.classification;
    let mut classification = Section::new(m.classification)
        .line(Line::plain(format!("{} {}", m.family, c.family)))
        .line(Line::plain(format!("{} {}", m.kind, c.kind)));
    if let Some(confidence) = c.confidence {
        classification = classification.line(Line::plain(format!(
            "{} {:.0}%",
            m.confidence,
            confidence * 100.0
        )));
    }
    classification
        .items
        .push(wrapped_item(&format!("{}: {}", m.applicable_law, summary.applicable_law), "", palette::TEXT));
    if let Some(jurisdiction) = &summary.jurisdiction {
        classification
            .items
            .push(wrapped_item(&format!("{}: {}", m.jurisdiction, jurisdiction), "", palette::TEXT));
    }
    sections.push(classification);

    // Parties.
    let mut parties = Section::new(m.parties);
    if summary.parties.is_empty() {
        parties = parties.line(Line::colored(m.no_parties, palette::MUTED));
    } else {
        for party in &summary.parties {
            parties.items.push(wrapped_item(
                &format!("{}: {}", party.role.to_uppercase(), party.name),
                "",
                palette::TEXT,
            ));
        }
    }
    sections.push(parties);

    // Data privacy.
    let (status, color) = if summary.rgpd_compliant {
        (m.compliant, palette::SUCCESS)
    } else {
        (m.non_compliant, palette::DANGER)
    };
    sections.push(
        Section::new(m.privacy).line(Line::colored(format!("{} {}", m.status, status), color)),
    );

    // Risks, only when there are some.
    if !summary.risks.is_empty() {
        let mut risks = Section::new(m.risks);
        for risk in &summary.risks {
            risks.items.push(wrapped_item(risk, BULLET, palette::TEXT));
        }
        sections.push(risks);
    }

    // Money.
    let f = &summary.financial;
    sections.push(
        Section::new(m.financial)
            .line(Line::plain(format!("{} {}", m.amount, f.display_amount())))
            .line(Line::plain(format!("{} {}", m.model, f.model))),
    );

    // Executive summary.
    let mut exec = Section::new(m.summary);
    for line in summary_lines(summary.executive_summary.as_deref(), options, m) {
        exec.items.push(vec![line]);
    }
    sections.push(exec);

    sections
}

/// Executive summary: collapsed, cut to the character budget, wrapped, cut to
/// the line budget, then followed by the truncation marker if anything was
/// dropped.
fn summary_lines(text: Option<&str>, options: &LayoutOptions, m: &Messages) -> Vec<Line> {
    let collapsed = text.map(collapse_whitespace).unwrap_or_default();
    if collapsed.is_empty() {
        return vec![Line::colored(m.summary_missing, palette::MUTED)];
    }
    let (kept, cut) = truncate_chars(&collapsed, options.summary_char_budget);
    let mut wrapped = wrap(kept, SUMMARY_COLUMNS);
    let too_long = wrapped.len() > options.summary_max_lines;
    wrapped.truncate(options.summary_max_lines);

    let mut lines: Vec<Line> = wrapped.into_iter().map(Line::plain).collect();
    if cut || too_long {
        lines.push(Line::colored(m.summary_truncated, palette::MUTED));
    }
    lines
}

/// The wrapped title, cut to [`TITLE_MAX_LINES`] with an ellipsis.
fn title_lines(title: &str) -> Vec<String> {
    let mut lines = wrap(title, TITLE_COLUMNS);
    if lines.len() > TITLE_MAX_LINES {
        lines.truncate(TITLE_MAX_LINES);
        if let Some(last) = lines.last_mut() {
            let cut = format!("{}…", truncate_chars(last, TITLE_COLUMNS - 1).0.trim_end());
            *last = cut;
        }
    }
    lines
}

// ── Placement ────────────────────────────────────────────────────────────────

struct Cursor {
    pages: Vec<ReportPage>,
    y: f32,
}

impl Cursor {
    fn page(&mut self) -> &mut ReportPage {
        if self.pages.is_empty() {
            self.pages.push(ReportPage::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn remaining(&self) -> f32 {
        CONTENT_BOTTOM - self.y
    }

    fn at_page_top(&self) -> bool {
        self.y <= CONTINUATION_TOP
    }

    fn new_page(&mut self) {
        self.pages.push(ReportPage::default());
        self.y = CONTINUATION_TOP;
    }

    fn draw_section(&mut self, heading: &str, items: &[Vec<Line>]) {
        let height = section_height(line_count(items));
        let top = self.y;
        let page = self.page();
        page.ops.push(DrawOp::FillRect {
            x: MARGIN_X,
            y: top,
            w: CONTENT_WIDTH,
            h: height,
            color: palette::BACKGROUND,
        });
        page.ops.push(DrawOp::FillRect {
            x: MARGIN_X,
            y: top,
            w: CONTENT_WIDTH,
            h: 0.3,
            color: palette::BORDER,
        });
        page.ops.push(DrawOp::Text {
            x: MARGIN_X + TEXT_INDENT,
            y: top + 8.0,
            size: 11.0,
            bold: true,
            color: palette::PRIMARY,
            text: heading.to_string(),
        });
        let mut baseline = top + SECTION_HEADER + 2.0;
        for line in items.iter().flatten() {
            page.ops.push(DrawOp::Text {
                x: MARGIN_X + TEXT_INDENT + line.indent,
                y: baseline,
                size: 10.0,
                bold: false,
                color: line.color,
                text: line.text.clone(),
            });
            baseline += LINE_HEIGHT;
        }
        self.y = top + height + SECTION_GAP;
    }

    fn place(&mut self, section: Section, continued: &str) {
        let page_capacity = CONTENT_BOTTOM - CONTINUATION_TOP;
        let total = section_height(line_count(&section.items));
        if total > self.remaining() && total <= page_capacity {
            self.new_page();
        }

        let mut heading = section.heading;
        let mut items = section.items;
        loop {
            if section_height(line_count(&items)) <= self.remaining() {
                self.draw_section(&heading, &items);
                return;
            }

            let mut fit = 0;
            while fit < items.len()
                && section_height(line_count(&items[..=fit])) <= self.remaining()
            {
                fit += 1;
            }

            if fit == 0 {
                if !self.at_page_top() {
                    self.new_page();
                    continue;
                }
                // A single item taller than a page: cut it between lines.
                let room = ((self.remaining() - SECTION_HEADER - SECTION_PADDING) / LINE_HEIGHT)
                    .floor()
                    .max(1.0) as usize;
                let len = items[0].len();
                let rest = items[0].split_off(room.min(len));
                if !rest.is_empty() {
                    items.insert(1, rest);
                }
                fit = 1;
            }

            let remainder = items.split_off(fit);
            self.draw_section(&heading, &items);
            if remainder.is_empty() {
                return;
            }
            items = remainder;
            if !heading.ends_with(continued) {
                heading = format!("{heading} {continued}");
            }
            self.new_page();
        }
    }
}

/// Lay out a report for `summary`.
pub fn layout(summary: &NormalizedSummary, options: &LayoutOptions) -> ReportDocument {
    let m = options.language.messages();
    let mut cursor = Cursor {
        pages: vec![ReportPage::default()],
        y: TITLE_Y,
    };

    // Header band.
    let page = cursor.page();
    page.ops.push(DrawOp::FillRect {
        x: 0.0,
        y: 0.0,
        w: PAGE_WIDTH,
        h: HEADER_HEIGHT,
        color: palette::PRIMARY,
    });
    page.ops.push(DrawOp::Text {
        x: MARGIN_X,
        y: 13.0,
        size: 14.0,
        bold: true,
        color: palette::WHITE,
        text: m.report_heading.to_string(),
    });
    page.ops.push(DrawOp::Text {
        x: PAGE_WIDTH - MARGIN_X - 25.0,
        y: 13.0,
        size: 9.0,
        bold: false,
        color: palette::WHITE,
        text: options.date.clone(),
    });

    // Title.
    let title = summary.object.to_uppercase();
    let mut baseline = TITLE_Y;
    for line in title_lines(&title) {
        page.ops.push(DrawOp::Text {
            x: MARGIN_X,
            y: baseline,
            size: 18.0,
            bold: true,
            color: palette::PRIMARY,
            text: line,
        });
        baseline += TITLE_LINE;
    }
    page.ops.push(DrawOp::Text {
        x: MARGIN_X,
        y: baseline,
        size: 9.0,
        bold: false,
        color: palette::MUTED,
        text: m.object.to_string(),
    });
    cursor.y = baseline + 6.0;

    for section in build_sections(summary, options) {
        cursor.place(section, m.continued);
    }

    // Footer on every page.
    for (index, page) in cursor.pages.iter_mut().enumerate() {
        page.ops.push(DrawOp::FillRect {
            x: 0.0,
            y: FOOTER_Y,
            w: PAGE_WIDTH,
            h: PAGE_HEIGHT - FOOTER_Y,
            color: palette::PRIMARY,
        });
        page.ops.push(DrawOp::Text {
            x: MARGIN_X,
            y: FOOTER_Y + 6.0,
            size: 8.0,
            bold: false,
            color: palette::WHITE,
            text: m.footer.to_string(),
        });
        page.ops.push(DrawOp::Text {
            x: PAGE_WIDTH - MARGIN_X - 15.0,
            y: FOOTER_Y + 6.0,
            size: 8.0,
            bold: false,
            color: palette::WHITE,
            text: format!("{} {}", m.page, index + 1),
        });
    }

    ReportDocument {
        title,
        pages: cursor.pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::result::AnalysisResult;
    use serde_json::{json, Value};

    fn options() -> LayoutOptions {
        LayoutOptions::from_config(&ClientConfig::default(), "01/01/2025")
    }

    fn doc(v: Value) -> ReportDocument {
        let summary = normalize(&AnalysisResult::from_value(v).unwrap());
        layout(&summary, &options())
    }

    fn section_texts(doc: &ReportDocument) -> Vec<String> {
        doc.texts().map(str::to_string).collect()
    }

    #[test]
    fn sections_in_fixed_order() {
        let d = doc(json!({
            "contract": {"object": "Prestation"},
            "risks_red_flags": ["r"],
            "summary_plain": "Court."
        }));
        let texts = section_texts(&d);
        let pos = |needle: &str| texts.iter().position(|t| t == needle).unwrap();
        assert!(pos("CLASSIFICATION") < pos("PARTIES CONTRACTUELLES"));
        assert!(pos("PARTIES CONTRACTUELLES") < pos("CONFORMITÉ RGPD"));
        assert!(pos("CONFORMITÉ RGPD") < pos("FACTEURS DE RISQUE"));
        assert!(pos("FACTEURS DE RISQUE") < pos("ASPECTS FINANCIERS"));
        assert!(pos("ASPECTS FINANCIERS") < pos("RÉSUMÉ EXÉCUTIF"));
        assert_eq!(d.title, "PRESTATION");
    }

    #[test]
    fn risks_section_omitted_when_empty() {
        let d = doc(json!({"risks_red_flags": []}));
        assert!(!section_texts(&d).iter().any(|t| t == "FACTEURS DE RISQUE"));
    }

    #[test]
    fn risk_bullets_keep_input_order() {
        let d = doc(json!({"risks_red_flags": ["premier", "second"]}));
        let bullets: Vec<_> = d.texts().filter(|t| t.starts_with(BULLET)).collect();
        assert_eq!(bullets, vec!["• premier", "• second"]);
    }

    #[test]
    fn long_risk_wraps_without_repeating_marker() {
        let long = "mot ".repeat(60);
        let d = doc(json!({"risks_red_flags": [long]}));
        let bullets = d.texts().filter(|t| t.starts_with(BULLET)).count();
        assert_eq!(bullets, 1);
        assert!(d.texts().all(|t| t.chars().count() <= ITEM_COLUMNS || !t.starts_with("mot")));
    }

    #[test]
    fn empty_parties_render_placeholder() {
        let d = doc(json!({"classification": {"family": "bail"}}));
        assert!(d.texts().any(|t| t == "Aucune partie identifiée"));
    }

    #[test]
    fn summary_is_truncated_with_marker() {
        let long = "clause ".repeat(200);
        let d = doc(json!({"summary_plain": long}));
        let texts = section_texts(&d);
        let start = texts.iter().position(|t| t == "RÉSUMÉ EXÉCUTIF").unwrap();
        let marker = texts
            .iter()
            .position(|t| t.starts_with("[...]"))
            .unwrap();
        assert!(marker - start - 1 <= 8);
        let kept: usize = texts[start + 1..marker].iter().map(|t| t.chars().count()).sum();
        assert!(kept <= 600);
    }

    #[test]
    fn short_summary_has_no_marker() {
        let d = doc(json!({"summary_plain": "Bail de neuf ans."}));
        assert!(!d.texts().any(|t| t.starts_with("[...]")));
        assert!(d.texts().any(|t| t == "Bail de neuf ans."));
    }

    #[test]
    fn many_risks_paginate_with_continuation_heading() {
        let risks: Vec<String> = (0..60).map(|i| format!("Risque numéro {i}")).collect();
        let d = doc(json!({"risks_red_flags": risks}));
        assert!(d.pages.len() >= 2);
        assert!(d.texts().any(|t| t == "FACTEURS DE RISQUE (suite)"));
        let bullets = d.texts().filter(|t| t.starts_with(BULLET)).count();
        assert_eq!(bullets, 60);
        for (i, page) in d.pages.iter().enumerate() {
            let label = format!("Page {}", i + 1);
            assert!(page.texts().any(|t| t == label));
            assert!(page.texts().any(|t| t == "Confidentiel • Usage interne uniquement"));
        }
    }

    #[test]
    fn sections_never_cross_the_footer() {
        let risks: Vec<String> = (0..60).map(|i| format!("Risque {i}")).collect();
        let d = doc(json!({"risks_red_flags": risks, "parties": {"list": ["A", "B", "C"]}}));
        for page in &d.pages {
            for op in &page.ops {
                if let DrawOp::FillRect { y, h, color, .. } = op {
                    if *color == palette::BACKGROUND {
                        assert!(y + h <= CONTENT_BOTTOM + 0.01, "box ends at {}", y + h);
                    }
                }
            }
        }
    }

    #[test]
    fn long_title_stays_above_the_footer() {
        let object = "Contrat de prestation ".repeat(150);
        let d = doc(json!({"contract": {"object": object}}));

        let title_lines: Vec<&str> = d.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { size, text, .. } if *size == 18.0 => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(title_lines.len(), TITLE_MAX_LINES);
        assert!(title_lines[TITLE_MAX_LINES - 1].ends_with('…'));
        assert!(title_lines.iter().all(|l| l.chars().count() <= TITLE_COLUMNS));

        for page in &d.pages {
            let below: Vec<&str> = page
                .ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { y, text, .. } if *y > CONTENT_BOTTOM => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            // Only the footer line and the page number sit below the content area.
            assert_eq!(below.len(), 2, "{below:?}");
            assert!(below.contains(&"Confidentiel • Usage interne uniquement"));
        }
    }

    #[test]
    fn short_title_is_not_cut() {
        let d = doc(json!({"contract": {"object": "Bail commercial"}}));
        assert!(d.pages[0].texts().any(|t| t == "BAIL COMMERCIAL"));
        assert!(!d.texts().any(|t| t.ends_with('…')));
    }

    #[test]
    fn english_labels() {
        let summary = normalize(&AnalysisResult::from_value(json!({})).unwrap());
        let mut opts = options();
        opts.language = Language::En;
        let d = layout(&summary, &opts);
        assert!(d.texts().any(|t| t == "CONTRACTING PARTIES"));
        assert!(d.texts().any(|t| t == "Page 1"));
    }
}

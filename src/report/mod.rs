//! Rendering a [`crate::normalize::NormalizedSummary`] for people.
//!
//! ## Data Flow
//!
//! ```text
//! NormalizedSummary ──▶ layout ──▶ pdf ──▶ download (save / fallback)
//!         │            (draw ops)  (lopdf)
//!         └──────────▶ text (screen)
//! ```
//!
//! 1. [`wrap`]: fixed-column word wrap shared by layout and text
//! 2. [`layout`]: sections, measured heights and page breaks as
//!    [`layout::DrawOp`]s in millimetres
//! 3. [`pdf`]: encode the draw ops as a PDF
//! 4. [`text`]: the on-screen summary, same content and order
//! 5. [`download`]: link-first report acquisition with local fallback, and
//!    atomic saving
//!
//! Rendering never performs network I/O; only [`download`] does.

pub mod download;
pub mod layout;
pub mod pdf;
pub mod text;
pub mod wrap;

pub use download::{
    generate_report, obtain_report, obtain_report_for, save_report, Report, ReportOrigin,
};
pub use layout::{layout, DrawOp, LayoutOptions, ReportDocument, ReportPage};
pub use text::render_text;

//! Paginated document output.
//!
//! The renderer speaks in blocks (paragraphs and fixed grid tables) through
//! the [`DocumentWriter`] trait; [`PdfWriter`] lays them out on US Letter
//! pages and serializes them with `lopdf`.
//!
//! - **Model**: [`Paragraph`], [`Table`], [`Cell`] and friends
//! - **Writer**: the [`DocumentWriter`] capability + [`WriteError`]
//! - **Metrics**: Helvetica advance widths for centering and wrapping
//! - **PDF**: [`PdfWriter`]

mod metrics;
pub mod model;
pub mod pdf;
pub mod writer;

pub use metrics::text_width;
pub use model::{Alignment, Block, Cell, ImageBlock, Paragraph, Table, TextStyle};
pub use pdf::{PageSetup, PdfWriter};
pub use writer::{DocumentWriter, WriteError};

//! # Photo Grid
//!
//! Arrange photos into fixed grid pages with titles and captions, then export
//! the result as a paginated PDF ready for printing.
//!
//! # Architecture: Edit, Then Render
//!
//! All editing happens on an in-memory [`session::Session`] that is persisted
//! as a JSON project file between commands. Export is a single pass over that
//! state:
//!
//! ```text
//! 1. Edit      add / assign / caption / title / layout  →  project.json
//! 2. Compress  placed photos  →  downscaled JPEG bytes   (parallel)
//! 3. Render    pages + tables →  Documents/<name>.pdf
//! ```
//!
//! The pure parts (slot arithmetic, the assignment store, layout
//! reconciliation, caption policy) never touch the filesystem, so their
//! tests run without fixtures. Image decoding and document output sit behind
//! the [`imaging::ImageBackend`] and [`document::DocumentWriter`] traits and
//! are swapped for recording mocks in the render tests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`slots`] | Ordinal ↔ (page, slot) arithmetic |
//! | [`store`] | Photo sequence, slot assignments and captions |
//! | [`layout`] | Grid modes, their geometry, and reassignment on mode change |
//! | [`captions`] | Default caption text and prefix application |
//! | [`session`] | Editable project state and every user command |
//! | [`imaging`] | Decode, downscale and re-encode photos for embedding |
//! | [`document`] | Paragraph/table document model and the PDF writer |
//! | [`render`] | Session → document export with per-photo fallbacks |
//! | [`project`] | JSON project file persistence |
//! | [`config`] | `settings.toml` loading, validation and saving |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fixed Grids
//!
//! Pages hold either two photos stacked vertically (`2x1`) or four in a
//! square (`2x2`). Photos are placed in reading order, so a photo's position
//! in the sequence determines its default page and slot. Switching modes
//! re-flows every placed photo through the new grid in reading order, and
//! each photo keeps its caption. Only changing the caption prefix renumbers
//! captions.
//!
//! ## Embedded Photos Are Downscaled
//!
//! Camera originals are far larger than a printed grid cell needs. Every
//! photo is re-encoded as a JPEG no larger than 1600 px on its long edge
//! before embedding, which keeps exported documents small enough to email.
//!
//! ## Failures Stay Local
//!
//! A photo that cannot be decoded or embedded becomes a text placeholder in
//! its cell; the rest of the document is still written. Only a failure to
//! write the output file aborts an export.

pub mod captions;
pub mod config;
pub mod document;
pub mod imaging;
pub mod layout;
pub mod output;
pub mod project;
pub mod render;
pub mod session;
pub mod slots;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

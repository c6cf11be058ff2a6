//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every slot leads with its position and the photo's file name, with the
//! caption as secondary context. Full paths only appear where the user needs
//! to trace a photo back to disk.
//!
//! # Output Format
//!
//! ## Page preview (`show`)
//!
//! ```text
//! Page 1/2: Ground floor [2x2, prefix "Photo"]
//!     001 dawn.jpg
//!         Caption: Photo 1
//!     002 (empty)
//! ```
//!
//! ## Export progress
//!
//! ```text
//! Rendering 5 photos on 2 pages
//!     page 1 slot 1 dawn.jpg: 1600x1200
//!     page 1 slot 2 broken.jpg: placeholder (Processing failed: ...)
//! Page 1 done (4 photos)
//! Exported 2 pages to Documents/photo_grid_20260101_120000.pdf (4 images, 1 placeholder)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::render::{RenderEvent, RenderSummary};
use crate::session::{Session, SlotView};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Session views
// ============================================================================

/// Format the slots of one page as returned by [`Session::preview_page`].
pub fn format_page(session: &Session, page: usize, slots: &[SlotView]) -> Vec<String> {
    let mut lines = vec![format!(
        "Page {}/{}: {} [{}, prefix \"{}\"]",
        page + 1,
        session.page_count(),
        session.title(page),
        session.layout(),
        session.caption_prefix()
    )];
    for view in slots {
        let index = format_index(view.slot + 1);
        match &view.photo {
            Some(photo) => {
                lines.push(format!("{}{} {}", indent(1), index, photo.name()));
                if let Some(caption) = &view.caption {
                    lines.push(format!("{}Caption: {}", indent(2), caption));
                }
            }
            None => lines.push(format!("{}{} (empty)", indent(1), index)),
        }
    }
    lines
}

pub fn print_page(session: &Session, page: usize, slots: &[SlotView]) {
    for line in format_page(session, page, slots) {
        println!("{}", line);
    }
}

/// One-line project overview.
pub fn format_overview(session: &Session) -> String {
    let unplaced = session
        .store()
        .sequence()
        .iter()
        .filter(|p| session.store().coordinate_of(p).is_none())
        .count();
    format!(
        "{} layout, {}, {} placed, {} unplaced, {}",
        session.layout(),
        plural(session.store().sequence().len(), "photo"),
        session.store().len(),
        unplaced,
        plural(session.page_count(), "page")
    )
}

// ============================================================================
// Export output
// ============================================================================

/// Format a single render progress event as display lines.
pub fn format_render_event(event: &RenderEvent) -> Vec<String> {
    match event {
        RenderEvent::Started { pages, photos } => vec![format!(
            "Rendering {} on {}",
            plural(*photos, "photo"),
            plural(*pages, "page")
        )],
        RenderEvent::PhotoCompressed {
            coord,
            photo,
            width,
            height,
        } => vec![format!(
            "{}{} {}: {}x{}",
            indent(1),
            coord,
            photo.name(),
            width,
            height
        )],
        RenderEvent::PhotoFailed {
            coord,
            photo,
            error,
        } => vec![
            format!("{}{} {}: placeholder ({})", indent(1), coord, photo.name(), error),
            format!("{}Source: {}", indent(2), photo),
        ],
        RenderEvent::SectionSkipped { section, error } => {
            vec![format!("Skipped {}: {}", section, error)]
        }
        RenderEvent::PageRendered { page, photos } => {
            vec![format!("Page {} done ({})", page + 1, plural(*photos, "photo"))]
        }
        RenderEvent::Finished { .. } => Vec::new(),
    }
}

/// Format the closing line of an export.
pub fn format_summary(summary: &RenderSummary, path: &Path) -> String {
    let mut line = format!(
        "Exported {} to {} ({}",
        plural(summary.pages, "page"),
        path.display(),
        plural(summary.images, "image")
    );
    if summary.placeholders > 0 {
        line.push_str(&format!(", {}", plural(summary.placeholders, "placeholder")));
    }
    line.push(')');
    line
}

pub fn print_summary(summary: &RenderSummary, path: &Path) {
    println!("{}", format_summary(summary, path));
}

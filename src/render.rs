//! Document rendering: session state in, paginated document out.
//!
//! ```text
//! gap-fill → header/footer → compress (parallel) → per page: title + grid table → finish
//! ```
//!
//! Only the final write is fatal. A photo that cannot be decoded becomes a
//! text placeholder in its cell, and a header or footer the writer rejects
//! is left out; both are logged and reported as [`RenderEvent`]s.
//!
//! Rendering takes the session mutably for its whole duration, so no user
//! command can change assignments halfway through an export.

use crate::config::Settings;
use crate::document::{
    Alignment, Block, Cell, DocumentWriter, ImageBlock, Paragraph, Table, TextStyle, WriteError,
};
use crate::imaging::{
    BackendError, CompressParams, CompressedImage, Dimensions, ImageBackend, display_size,
};
use crate::session::Session;
use crate::slots::{Coordinate, grid_position};
use crate::store::PhotoRef;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Header line size in points.
pub const HEADER_FONT_SIZE: f32 = 10.0;
/// Footer line size in points.
pub const FOOTER_FONT_SIZE: f32 = 9.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Document write failed: {0}")]
    Write(#[from] WriteError),
}

/// Progress reported while rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Started {
        pages: usize,
        photos: usize,
    },
    PhotoCompressed {
        coord: Coordinate,
        photo: PhotoRef,
        width: u32,
        height: u32,
    },
    PhotoFailed {
        coord: Coordinate,
        photo: PhotoRef,
        error: String,
    },
    SectionSkipped {
        section: &'static str,
        error: String,
    },
    PageRendered {
        page: usize,
        photos: usize,
    },
    Finished {
        path: PathBuf,
        pages: usize,
    },
}

/// What a finished render produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSummary {
    /// Pages in the written document (at least one).
    pub pages: usize,
    /// Photos embedded as images.
    pub images: usize,
    /// Photos replaced by a text placeholder.
    pub placeholders: usize,
}

/// Placeholder text for a photo that could not be embedded.
pub fn placeholder_text(photo: &PhotoRef) -> String {
    format!("image unavailable: {}", photo.name())
}

fn emit(events: &Option<Sender<RenderEvent>>, event: RenderEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}

/// Render `session` into `writer` and finish the document at `target`.
pub fn render(
    session: &mut Session,
    settings: &Settings,
    backend: &impl ImageBackend,
    writer: &mut impl DocumentWriter,
    target: &Path,
    events: Option<Sender<RenderEvent>>,
) -> Result<RenderSummary, RenderError> {
    let filled = session.fill_gaps();
    if filled > 0 {
        tracing::debug!(filled, "gap-fill placed photos");
    }

    write_header(settings, writer, &events);
    write_footer(settings, writer, &events);

    let entries: Vec<(Coordinate, PhotoRef)> = session
        .store()
        .entries()
        .map(|e| (e.coord, e.photo.clone()))
        .collect();
    let mut pages: Vec<usize> = entries.iter().map(|(c, _)| c.page).collect();
    pages.dedup();
    emit(
        &events,
        RenderEvent::Started {
            pages: pages.len(),
            photos: entries.len(),
        },
    );

    let params = CompressParams::default();
    let compressed: Vec<Result<(Dimensions, CompressedImage), BackendError>> = entries
        .par_iter()
        .map(|(_, photo)| -> Result<_, BackendError> {
            let source = backend.identify(photo.path())?;
            let image = backend.compress(photo.path(), &params)?;
            Ok((source, image))
        })
        .collect();

    let geometry = session.layout().geometry();
    let title_style = settings.title.style();
    let caption_style = settings.caption.style();
    let bounds = (geometry.max_image_width, geometry.max_image_height);

    let mut summary = RenderSummary::default();
    let mut results = entries.into_iter().zip(compressed).peekable();

    for (i, &page) in pages.iter().enumerate() {
        if i > 0 {
            writer.add_page_break()?;
        }
        writer.add_paragraph(
            Paragraph::new(session.title(page), title_style)
                .aligned(Alignment::Center)
                .space_after(geometry.title_space_after)
                .max_lines(1),
        )?;

        let mut table = Table::new(
            geometry.rows,
            geometry.cols,
            geometry.column_width,
            geometry.row_height,
        );
        let mut on_page = 0;
        while let Some(((coord, photo), result)) = results.next_if(|((c, _), _)| c.page == page) {
            let mut cell = Cell::empty();
            let checked = result.map_err(|e| e.to_string()).and_then(|(source, image)| {
                writer
                    .check_image(&image)
                    .map(|()| (source, image))
                    .map_err(|e| e.to_string())
            });
            match checked {
                Ok((source, image)) => {
                    let (width, height) = display_size((source.width, source.height), bounds);
                    emit(
                        &events,
                        RenderEvent::PhotoCompressed {
                            coord,
                            photo: photo.clone(),
                            width: image.width,
                            height: image.height,
                        },
                    );
                    cell.blocks.push(Block::Image(ImageBlock {
                        image,
                        width,
                        height,
                    }));
                    summary.images += 1;
                }
                Err(error) => {
                    tracing::warn!(%coord, photo = %photo, %error, "photo replaced by placeholder");
                    emit(
                        &events,
                        RenderEvent::PhotoFailed {
                            coord,
                            photo: photo.clone(),
                            error,
                        },
                    );
                    cell.blocks.push(Block::Text(Paragraph::new(
                        placeholder_text(&photo),
                        caption_style,
                    )));
                    summary.placeholders += 1;
                }
            }
            cell.blocks.push(Block::Text(
                Paragraph::new(session.caption_for(coord), caption_style)
                    .space_before(geometry.caption_space_before),
            ));

            let (row, col) = grid_position(coord.slot, geometry.cols);
            if let Some(slot) = table.cell_mut(row, col) {
                *slot = cell;
            }
            on_page += 1;
        }
        writer.add_table(table)?;
        emit(
            &events,
            RenderEvent::PageRendered {
                page,
                photos: on_page,
            },
        );
    }

    writer.finish(target)?;
    summary.pages = pages.len().max(1);
    tracing::info!(
        path = %target.display(),
        pages = summary.pages,
        images = summary.images,
        placeholders = summary.placeholders,
        "document exported"
    );
    emit(
        &events,
        RenderEvent::Finished {
            path: target.to_path_buf(),
            pages: summary.pages,
        },
    );
    Ok(summary)
}

fn write_header(
    settings: &Settings,
    writer: &mut impl DocumentWriter,
    events: &Option<Sender<RenderEvent>>,
) {
    let text = settings.header.text.trim();
    if text.is_empty() {
        return;
    }
    let header = Paragraph::new(text, TextStyle::plain(HEADER_FONT_SIZE)).aligned(Alignment::Center);
    if let Err(e) = writer.set_header(header) {
        tracing::warn!(error = %e, "header omitted");
        emit(
            events,
            RenderEvent::SectionSkipped {
                section: "header",
                error: e.to_string(),
            },
        );
    }
}

fn write_footer(
    settings: &Settings,
    writer: &mut impl DocumentWriter,
    events: &Option<Sender<RenderEvent>>,
) {
    let lines: Vec<Paragraph> = [&settings.footer.line1, &settings.footer.line2]
        .into_iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(|line| Paragraph::new(line, TextStyle::plain(FOOTER_FONT_SIZE)).aligned(Alignment::Left))
        .collect();
    if lines.is_empty() {
        return;
    }
    if let Err(e) = writer.set_footer(lines) {
        tracing::warn!(error = %e, "footer omitted");
        emit(
            events,
            RenderEvent::SectionSkipped {
                section: "footer",
                error: e.to_string(),
            },
        );
    }
}

//! The document-writing capability the renderer draws through.

use super::model::{Paragraph, Table};
use crate::imaging::CompressedImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid content: {0}")]
    InvalidContent(String),
    #[error("Failed to serialize document: {0}")]
    Serialize(String),
}

/// Sink for paginated block content.
///
/// Header and footer apply to every page. Content flows top to bottom and
/// continues on a new page when it no longer fits. Nothing reaches the
/// filesystem before [`finish`](Self::finish).
pub trait DocumentWriter {
    /// Whether `image` can be embedded. Tables must only carry images that
    /// passed this check.
    fn check_image(&self, image: &CompressedImage) -> Result<(), WriteError>;

    fn set_header(&mut self, header: Paragraph) -> Result<(), WriteError>;

    /// Footer lines, drawn top to bottom above the bottom edge.
    fn set_footer(&mut self, lines: Vec<Paragraph>) -> Result<(), WriteError>;

    fn add_paragraph(&mut self, paragraph: Paragraph) -> Result<(), WriteError>;

    fn add_table(&mut self, table: Table) -> Result<(), WriteError>;

    fn add_page_break(&mut self) -> Result<(), WriteError>;

    /// Write the finished document to `path`.
    fn finish(&mut self, path: &Path) -> Result<(), WriteError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::document::model::Block;
    use std::collections::HashSet;
    use std::path::PathBuf;

    /// Writer that records calls instead of producing a file.
    #[derive(Default)]
    pub struct RecordingWriter {
        pub calls: Vec<WriterCall>,
        /// Calls (by name) that fail with `InvalidContent`.
        pub failing: HashSet<&'static str>,
        /// Image sizes `check_image` rejects.
        pub rejected_images: HashSet<(u32, u32)>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum WriterCall {
        Header(String),
        Footer(Vec<String>),
        Paragraph(String),
        Table {
            rows: usize,
            cols: usize,
            /// Per cell: texts in order, with images shown as `[image WxH]`.
            cells: Vec<Vec<String>>,
        },
        PageBreak,
        Finish(PathBuf),
    }

    impl RecordingWriter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(mut self, call: &'static str) -> Self {
            self.failing.insert(call);
            self
        }

        pub fn rejecting_image(mut self, width: u32, height: u32) -> Self {
            self.rejected_images.insert((width, height));
            self
        }

        fn check(&self, call: &'static str) -> Result<(), WriteError> {
            if self.failing.contains(call) {
                Err(WriteError::InvalidContent(format!("{call} rejected")))
            } else {
                Ok(())
            }
        }

        pub fn tables(&self) -> Vec<&WriterCall> {
            self.calls
                .iter()
                .filter(|c| matches!(c, WriterCall::Table { .. }))
                .collect()
        }

        pub fn count(&self, pred: impl Fn(&WriterCall) -> bool) -> usize {
            self.calls.iter().filter(|c| pred(c)).count()
        }
    }

    impl DocumentWriter for RecordingWriter {
        fn check_image(&self, image: &CompressedImage) -> Result<(), WriteError> {
            if self.rejected_images.contains(&image.dimensions()) {
                Err(WriteError::InvalidContent(format!(
                    "image {}x{} rejected",
                    image.width, image.height
                )))
            } else {
                Ok(())
            }
        }

        fn set_header(&mut self, header: Paragraph) -> Result<(), WriteError> {
            self.check("header")?;
            self.calls.push(WriterCall::Header(header.text));
            Ok(())
        }

        fn set_footer(&mut self, lines: Vec<Paragraph>) -> Result<(), WriteError> {
            self.check("footer")?;
            self.calls
                .push(WriterCall::Footer(lines.into_iter().map(|p| p.text).collect()));
            Ok(())
        }

        fn add_paragraph(&mut self, paragraph: Paragraph) -> Result<(), WriteError> {
            self.check("paragraph")?;
            self.calls.push(WriterCall::Paragraph(paragraph.text));
            Ok(())
        }

        fn add_table(&mut self, table: Table) -> Result<(), WriteError> {
            self.check("table")?;
            let cells = table
                .cells
                .iter()
                .map(|cell| {
                    cell.blocks
                        .iter()
                        .map(|b| match b {
                            Block::Image(img) => {
                                format!("[image {}x{}]", img.image.width, img.image.height)
                            }
                            Block::Text(p) => p.text.clone(),
                        })
                        .collect()
                })
                .collect();
            self.calls.push(WriterCall::Table {
                rows: table.rows,
                cols: table.cols,
                cells,
            });
            Ok(())
        }

        fn add_page_break(&mut self) -> Result<(), WriteError> {
            self.check("page_break")?;
            self.calls.push(WriterCall::PageBreak);
            Ok(())
        }

        fn finish(&mut self, path: &Path) -> Result<(), WriteError> {
            self.check("finish")?;
            self.calls.push(WriterCall::Finish(path.to_path_buf()));
            Ok(())
        }
    }
}

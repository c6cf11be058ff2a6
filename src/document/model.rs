//! Block-level content handed to a [`DocumentWriter`](super::DocumentWriter).
//!
//! All lengths are in points (1/72 inch).

use crate::imaging::CompressedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    Left,
    #[default]
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub underline: bool,
}

impl TextStyle {
    pub fn plain(size: f32) -> Self {
        Self {
            size,
            bold: false,
            underline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
    pub alignment: Alignment,
    pub space_before: f32,
    pub space_after: f32,
    /// Wrapped lines beyond this are dropped and the last kept line ends
    /// in an ellipsis.
    pub max_lines: Option<usize>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            alignment: Alignment::Center,
            space_before: 0.0,
            space_after: 0.0,
            max_lines: None,
        }
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn space_before(mut self, points: f32) -> Self {
        self.space_before = points;
        self
    }

    pub fn space_after(mut self, points: f32) -> Self {
        self.space_after = points;
        self
    }

    pub fn max_lines(mut self, lines: usize) -> Self {
        self.max_lines = Some(lines.max(1));
        self
    }

    /// Line height used for layout.
    pub fn line_height(&self) -> f32 {
        self.style.size * 1.2
    }
}

/// An embedded JPEG drawn at a fixed display size.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub image: CompressedImage,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Image(ImageBlock),
    Text(Paragraph),
}

/// One table cell: blocks stacked top to bottom, centered as a group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub blocks: Vec<Block>,
}

impl Cell {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A fixed grid with explicit column widths and row height.
///
/// `cells` is row-major and always holds `rows * cols` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub rows: usize,
    pub cols: usize,
    pub column_width: f32,
    pub row_height: f32,
    pub cells: Vec<Cell>,
}

impl Table {
    pub fn new(rows: usize, cols: usize, column_width: f32, row_height: f32) -> Self {
        Self {
            rows,
            cols,
            column_width,
            row_height,
            cells: vec![Cell::empty(); rows * cols],
        }
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        if row < self.rows && col < self.cols {
            self.cells.get_mut(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn width(&self) -> f32 {
        self.column_width * self.cols as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_cells_are_row_major() {
        let mut table = Table::new(2, 2, 100.0, 50.0);
        table
            .cell_mut(1, 0)
            .unwrap()
            .blocks
            .push(Block::Text(Paragraph::new("x", TextStyle::plain(10.0))));

        assert!(!table.cells[2].is_empty());
        assert!(table.cell(0, 1).unwrap().is_empty());
        assert!(table.cell_mut(2, 0).is_none());
        assert!(table.cell(0, 2).is_none());
        assert_eq!(table.width(), 200.0);
    }

    #[test]
    fn paragraph_builder_sets_spacing() {
        let p = Paragraph::new("Title", TextStyle::plain(14.0))
            .aligned(Alignment::Left)
            .space_before(2.0)
            .space_after(4.0);
        assert_eq!(p.alignment, Alignment::Left);
        assert_eq!(p.space_before, 2.0);
        assert_eq!(p.space_after, 4.0);
        assert!((p.line_height() - 16.8).abs() < 0.001);
    }
}

//! PDF output through `lopdf`.
//!
//! Pages are US Letter with fixed margins. Text uses the standard
//! Helvetica and Helvetica-Bold fonts (WinAnsi encoding), so no font data is
//! embedded; photos are embedded as-is as `DCTDecode` image XObjects.
//!
//! Content is laid out as it arrives. Paragraphs and table rows that do not
//! fit in the remaining space move to a fresh page. Header and footer are
//! stamped onto every page when the document is finished, and the whole
//! file is serialized in memory before a single write to the target path.

use super::metrics::{clamp_lines, encode_win_ansi, text_width, wrap};
use super::model::{Alignment, Block, Cell, ImageBlock, Paragraph, Table, TextStyle};
use super::writer::{DocumentWriter, WriteError};
use crate::imaging::CompressedImage;
use crate::layout::POINTS_PER_INCH;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::path::Path;

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Distance from the top edge to the top of the header line.
    pub header_distance: f32,
    /// Distance from the bottom edge to the last footer baseline.
    pub footer_distance: f32,
}

impl Default for PageSetup {
    /// US Letter, 0.8 in top/bottom and 0.5 in side margins.
    fn default() -> Self {
        Self {
            width: 8.5 * POINTS_PER_INCH,
            height: 11.0 * POINTS_PER_INCH,
            margin_top: 0.8 * POINTS_PER_INCH,
            margin_bottom: 0.8 * POINTS_PER_INCH,
            margin_left: 0.5 * POINTS_PER_INCH,
            margin_right: 0.5 * POINTS_PER_INCH,
            header_distance: 0.5 * POINTS_PER_INCH,
            footer_distance: 0.5 * POINTS_PER_INCH,
        }
    }
}

impl PageSetup {
    fn content_top(&self) -> f32 {
        self.height - self.margin_top
    }

    fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }
}

#[derive(Default)]
struct PageContent {
    ops: Vec<Operation>,
    images: Vec<(String, ObjectId)>,
}

/// [`DocumentWriter`] producing a PDF file.
pub struct PdfWriter {
    doc: Document,
    setup: PageSetup,
    header: Option<Paragraph>,
    footer: Vec<Paragraph>,
    pages: Vec<PageContent>,
    current: PageContent,
    /// Top of the free space on the current page, in PDF coordinates.
    cursor: f32,
    image_count: usize,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new(PageSetup::default())
    }
}

impl PdfWriter {
    pub fn new(setup: PageSetup) -> Self {
        Self {
            doc: Document::with_version("1.5"),
            setup,
            header: None,
            footer: Vec::new(),
            pages: Vec::new(),
            current: PageContent::default(),
            cursor: setup.content_top(),
            image_count: 0,
        }
    }

    /// Pages started so far, including the one being filled.
    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor = self.setup.content_top();
    }

    /// Start a new page when `height` no longer fits, unless this page is blank.
    fn ensure_room(&mut self, height: f32) {
        let blank = self.current.ops.is_empty();
        if !blank && self.cursor - height < self.setup.margin_bottom {
            self.new_page();
        }
    }

    fn register_image(&mut self, block: ImageBlock) -> Result<String, WriteError> {
        check_jpeg(&block.image)?;
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => block.image.width as i64,
                "Height" => block.image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
                "Filter" => "DCTDecode",
            },
            block.image.jpeg,
        )
        .with_compression(false);
        let id = self.doc.add_object(stream);
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);
        self.current.images.push((name.clone(), id));
        Ok(name)
    }

    /// Draw one table cell, vertically centered in its row.
    ///
    /// Each text block may take at most half the row. Images shrink, keeping
    /// their aspect ratio, when image and text together would overflow it.
    fn draw_cell(
        &mut self,
        cell: Cell,
        x: f32,
        top: f32,
        width: f32,
        height: f32,
    ) -> Result<(), WriteError> {
        enum Laid {
            Image(ImageBlock),
            Text(Paragraph, Vec<String>),
        }

        let mut laid = Vec::with_capacity(cell.blocks.len());
        let mut image_height = 0.0;
        let mut text_height = 0.0;
        for block in cell.blocks {
            match block {
                Block::Image(img) => {
                    image_height += img.height;
                    laid.push(Laid::Image(img));
                }
                Block::Text(p) => {
                    check_style(&p.style)?;
                    let room = ((height / 2.0 - p.space_before - p.space_after) / p.line_height())
                        .floor()
                        .max(1.0) as usize;
                    let limit = p.max_lines.map_or(room, |n| n.min(room));
                    let lines = fit_lines(&p, width, Some(limit));
                    text_height +=
                        p.space_before + lines.len() as f32 * p.line_height() + p.space_after;
                    laid.push(Laid::Text(p, lines));
                }
            }
        }

        let scale = if image_height > 0.0 && image_height + text_height > height {
            ((height - text_height) / image_height).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let content_height = image_height * scale + text_height;
        let mut y = top - ((height - content_height) / 2.0).max(0.0);

        for block in laid {
            match block {
                Laid::Image(img) => {
                    let (w, h) = (img.width * scale, img.height * scale);
                    let name = self.register_image(img)?;
                    let left = x + (width - w) / 2.0;
                    self.current.ops.extend(image_ops(&name, left, y - h, w, h));
                    y -= h;
                }
                Laid::Text(p, lines) => {
                    y -= p.space_before;
                    for line in lines {
                        let baseline = y - p.line_height() * 0.8;
                        self.current
                            .ops
                            .extend(text_ops(&line, p.style, p.alignment, x, width, baseline));
                        y -= p.line_height();
                    }
                    y -= p.space_after;
                }
            }
        }
        Ok(())
    }

    fn decoration_ops(&self) -> Vec<Operation> {
        let setup = &self.setup;
        let mut ops = Vec::new();
        if let Some(header) = &self.header {
            let baseline = setup.height - setup.header_distance - header.style.size;
            ops.extend(text_ops(
                &header.text,
                header.style,
                header.alignment,
                setup.margin_left,
                setup.content_width(),
                baseline,
            ));
        }
        let mut baseline = setup.footer_distance;
        for line in self.footer.iter().rev() {
            ops.extend(text_ops(
                &line.text,
                line.style,
                line.alignment,
                setup.margin_left,
                setup.content_width(),
                baseline,
            ));
            baseline += line.line_height();
        }
        ops
    }
}

fn check_style(style: &TextStyle) -> Result<(), WriteError> {
    if style.size > 0.0 && style.size.is_finite() {
        Ok(())
    } else {
        Err(WriteError::InvalidContent(format!(
            "font size must be positive, got {}",
            style.size
        )))
    }
}

/// Baseline JPEG data starts with an SOI marker and has a non-zero size.
fn check_jpeg(image: &CompressedImage) -> Result<(), WriteError> {
    if image.jpeg.is_empty() {
        return Err(WriteError::InvalidContent("empty image data".into()));
    }
    if !image.jpeg.starts_with(&[0xFF, 0xD8]) {
        return Err(WriteError::InvalidContent("image data is not a JPEG".into()));
    }
    if image.width == 0 || image.height == 0 {
        return Err(WriteError::InvalidContent(format!(
            "image has no area ({}x{})",
            image.width, image.height
        )));
    }
    Ok(())
}

/// Wrap a paragraph to `width`, honoring the tighter of `limit` and its own
/// `max_lines`.
fn fit_lines(p: &Paragraph, width: f32, limit: Option<usize>) -> Vec<String> {
    let lines = wrap(&p.text, p.style.size, p.style.bold, width);
    match limit.or(p.max_lines) {
        Some(max) => clamp_lines(lines, max, p.style.size, p.style.bold, width),
        None => lines,
    }
}

fn font_name(bold: bool) -> &'static str {
    if bold { "F2" } else { "F1" }
}

/// One line of text placed inside the horizontal band `[left, left + width]`.
fn text_ops(
    text: &str,
    style: TextStyle,
    alignment: Alignment,
    left: f32,
    width: f32,
    baseline: f32,
) -> Vec<Operation> {
    let line_width = text_width(text, style.size, style.bold);
    let x = match alignment {
        Alignment::Left => left,
        Alignment::Center => left + (width - line_width) / 2.0,
    };

    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font_name(style.bold).into(), style.size.into()]),
        Operation::new("Td", vec![x.into(), baseline.into()]),
        Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(text))]),
        Operation::new("ET", vec![]),
    ];
    if style.underline && line_width > 0.0 {
        let thickness = (style.size / 20.0).max(0.5);
        ops.push(Operation::new(
            "re",
            vec![
                x.into(),
                (baseline - style.size * 0.12).into(),
                line_width.into(),
                thickness.into(),
            ],
        ));
        ops.push(Operation::new("f", vec![]));
    }
    ops
}

fn image_ops(name: &str, x: f32, y: f32, w: f32, h: f32) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![w.into(), 0.0_f32.into(), 0.0_f32.into(), h.into(), x.into(), y.into()],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

fn font_dict(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

impl DocumentWriter for PdfWriter {
    fn check_image(&self, image: &CompressedImage) -> Result<(), WriteError> {
        check_jpeg(image)
    }

    fn set_header(&mut self, header: Paragraph) -> Result<(), WriteError> {
        check_style(&header.style)?;
        self.header = Some(header);
        Ok(())
    }

    fn set_footer(&mut self, lines: Vec<Paragraph>) -> Result<(), WriteError> {
        for line in &lines {
            check_style(&line.style)?;
        }
        self.footer = lines;
        Ok(())
    }

    fn add_paragraph(&mut self, paragraph: Paragraph) -> Result<(), WriteError> {
        check_style(&paragraph.style)?;
        let width = self.setup.content_width();
        let left = self.setup.margin_left;
        let style = paragraph.style;
        let line_height = paragraph.line_height();

        self.ensure_room(paragraph.space_before + line_height);
        self.cursor -= paragraph.space_before;
        for line in fit_lines(&paragraph, width, None) {
            self.ensure_room(line_height);
            let baseline = self.cursor - line_height * 0.8;
            let ops = text_ops(&line, style, paragraph.alignment, left, width, baseline);
            self.current.ops.extend(ops);
            self.cursor -= line_height;
        }
        self.cursor -= paragraph.space_after;
        Ok(())
    }

    fn add_table(&mut self, table: Table) -> Result<(), WriteError> {
        if table.cells.len() != table.rows * table.cols {
            return Err(WriteError::InvalidContent(format!(
                "table has {} cells, expected {}",
                table.cells.len(),
                table.rows * table.cols
            )));
        }
        let left = self.setup.margin_left + (self.setup.content_width() - table.width()) / 2.0;
        let (cols, column_width, row_height) = (table.cols, table.column_width, table.row_height);

        let mut cells = table.cells.into_iter();
        for _ in 0..table.rows {
            self.ensure_room(row_height);
            let top = self.cursor;
            for col in 0..cols {
                if let Some(cell) = cells.next() {
                    let x = left + col as f32 * column_width;
                    self.draw_cell(cell, x, top, column_width, row_height)?;
                }
            }
            self.cursor -= row_height;
        }
        Ok(())
    }

    fn add_page_break(&mut self) -> Result<(), WriteError> {
        self.new_page();
        Ok(())
    }

    fn finish(&mut self, path: &Path) -> Result<(), WriteError> {
        let decoration = self.decoration_ops();
        let mut pages = std::mem::take(&mut self.pages);
        pages.push(std::mem::take(&mut self.current));
        self.cursor = self.setup.content_top();

        let mut doc = std::mem::replace(&mut self.doc, Document::with_version("1.5"));
        let regular = doc.add_object(font_dict("Helvetica"));
        let bold = doc.add_object(font_dict("Helvetica-Bold"));
        let pages_id = doc.new_object_id();

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in pages {
            let mut operations = decoration.clone();
            operations.extend(page.ops);
            let encoded = Content { operations }
                .encode()
                .map_err(|e| WriteError::Serialize(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

            let mut xobjects = Dictionary::new();
            for (name, id) in page.images {
                xobjects.set(name, id);
            }
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! {
                        "F1" => regular,
                        "F2" => bold,
                    },
                    "XObject" => xobjects,
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![
                    0_i64.into(),
                    0_i64.into(),
                    self.setup.width.into(),
                    self.setup.height.into(),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal(concat!("photo-grid ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| WriteError::Serialize(e.to_string()))?;
        std::fs::write(path, bytes)?;

        tracing::debug!(path = %path.display(), pages = count, "pdf written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> Paragraph {
        Paragraph::new(text, TextStyle::plain(10.0))
    }

    fn load_pages(path: &Path) -> usize {
        Document::load(path).unwrap().get_pages().len()
    }

    fn photo_cell(w: f32, h: f32) -> Cell {
        Cell {
            blocks: vec![
                Block::Image(ImageBlock {
                    image: CompressedImage {
                        jpeg: vec![0xFF, 0xD8, 0xFF, 0xD9],
                        width: 4,
                        height: 3,
                    },
                    width: w,
                    height: h,
                }),
                Block::Text(body("Photo 1").space_before(2.0)),
            ],
        }
    }

    #[test]
    fn default_page_is_us_letter() {
        let setup = PageSetup::default();
        assert_eq!((setup.width, setup.height), (612.0, 792.0));
        assert!((setup.margin_top - 57.6).abs() < 0.001);
        assert_eq!(setup.margin_left, 36.0);
        assert!((setup.content_width() - 540.0).abs() < 0.001);
    }

    #[test]
    fn empty_document_has_one_page() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("empty.pdf");

        let mut writer = PdfWriter::default();
        writer.set_header(body("Site report")).unwrap();
        writer.finish(&path).unwrap();

        assert_eq!(load_pages(&path), 1);
    }

    #[test]
    fn page_breaks_start_new_pages() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("three.pdf");

        let mut writer = PdfWriter::default();
        writer.add_paragraph(body("one")).unwrap();
        writer.add_page_break().unwrap();
        writer.add_paragraph(body("two")).unwrap();
        writer.add_page_break().unwrap();
        writer.add_paragraph(body("three")).unwrap();
        assert_eq!(writer.page_count(), 3);
        writer.finish(&path).unwrap();

        assert_eq!(load_pages(&path), 3);
    }

    #[test]
    fn overflowing_paragraphs_continue_on_next_page() {
        let mut writer = PdfWriter::default();
        for i in 0..80 {
            writer.add_paragraph(body(&format!("line {i}"))).unwrap();
        }
        // 80 lines of 12pt exceed the 676.8pt content height.
        assert_eq!(writer.page_count(), 2);
    }

    #[test]
    fn table_rows_that_do_not_fit_move_to_next_page() {
        let mut writer = PdfWriter::default();
        writer.add_paragraph(body("Title")).unwrap();
        let mut table = Table::new(2, 2, 255.6, 288.0);
        *table.cell_mut(0, 0).unwrap() = photo_cell(200.0, 150.0);
        *table.cell_mut(1, 1).unwrap() = photo_cell(150.0, 200.0);
        writer.add_table(table).unwrap();
        assert_eq!(writer.page_count(), 1);

        let mut second = Table::new(2, 1, 540.0, 288.0);
        *second.cell_mut(0, 0).unwrap() = photo_cell(300.0, 200.0);
        writer.add_table(second).unwrap();
        assert_eq!(writer.page_count(), 2);
    }

    #[test]
    fn images_are_embedded_as_xobjects() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("grid.pdf");

        let mut writer = PdfWriter::default();
        let mut table = Table::new(2, 2, 255.6, 288.0);
        *table.cell_mut(0, 0).unwrap() = photo_cell(200.0, 150.0);
        *table.cell_mut(0, 1).unwrap() = photo_cell(200.0, 150.0);
        writer.add_table(table).unwrap();
        writer.finish(&path).unwrap();

        let doc = Document::load(&path).unwrap();
        let images = doc
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .filter(|s| {
                s.dict
                    .get(b"Subtype")
                    .and_then(|v| v.as_name())
                    .is_ok_and(|n| n == b"Image")
            })
            .count();
        assert_eq!(images, 2);
    }

    #[test]
    fn zero_font_size_is_rejected() {
        let mut writer = PdfWriter::default();
        let err = writer
            .add_paragraph(Paragraph::new("x", TextStyle::plain(0.0)))
            .unwrap_err();
        assert!(matches!(err, WriteError::InvalidContent(_)));
    }

    #[test]
    fn mismatched_table_is_rejected() {
        let mut writer = PdfWriter::default();
        let mut table = Table::new(2, 2, 100.0, 100.0);
        table.cells.pop();
        assert!(matches!(
            writer.add_table(table),
            Err(WriteError::InvalidContent(_))
        ));
    }

    #[test]
    fn unwritable_target_leaves_no_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing-dir").join("out.pdf");

        let mut writer = PdfWriter::default();
        writer.add_paragraph(body("x")).unwrap();
        let err = writer.finish(&path).unwrap_err();

        assert!(matches!(err, WriteError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn underline_adds_a_rule() {
        let style = TextStyle {
            size: 14.0,
            bold: true,
            underline: true,
        };
        let ops = text_ops("Title", style, Alignment::Center, 36.0, 540.0, 700.0);
        assert!(ops.iter().any(|op| op.operator == "re"));
        assert!(ops.iter().any(|op| op.operator == "Tf"
            && op.operands.first().and_then(|o| o.as_name().ok()) == Some(b"F2".as_slice())));
    }

    #[test]
    fn centered_text_is_centered() {
        let ops = text_ops("abc", TextStyle::plain(10.0), Alignment::Center, 0.0, 100.0, 0.0);
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        let x = td.operands[0].as_float().unwrap();
        let expected = (100.0 - text_width("abc", 10.0, false)) / 2.0;
        assert!((x - expected).abs() < 0.001);
    }

    fn text_count(writer: &PdfWriter) -> usize {
        writer.current.ops.iter().filter(|op| op.operator == "Tj").count()
    }

    fn title(text: &str, size: f32) -> Paragraph {
        Paragraph::new(
            text,
            TextStyle {
                size,
                bold: true,
                underline: true,
            },
        )
        .space_after(4.0)
        .max_lines(1)
    }

    #[test]
    fn max_lines_truncates_long_paragraph() {
        let mut writer = PdfWriter::default();
        writer
            .add_paragraph(title(&"North elevation ".repeat(12), 14.0))
            .unwrap();
        assert_eq!(text_count(&writer), 1);
    }

    #[test]
    fn largest_title_and_full_grid_share_one_page() {
        let mut writer = PdfWriter::default();
        writer
            .add_paragraph(title(&"Basement ".repeat(20), 72.0))
            .unwrap();
        let mut table = Table::new(2, 2, 255.6, 288.0);
        for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            *table.cell_mut(row, col).unwrap() = photo_cell(200.0, 150.0);
        }
        writer.add_table(table).unwrap();
        assert_eq!(writer.page_count(), 1);
    }

    #[test]
    fn oversized_cell_content_stays_inside_its_row() {
        let mut writer = PdfWriter::default();
        let top = writer.cursor;
        let row_height = 288.0;
        let mut cell = photo_cell(240.0, 280.0);
        cell.blocks[1] = Block::Text(
            Paragraph::new("crack ".repeat(200), TextStyle::plain(10.0)).space_before(2.0),
        );
        let mut table = Table::new(1, 1, 540.0, row_height);
        *table.cell_mut(0, 0).unwrap() = cell;

        writer.add_table(table).unwrap();

        let bottom = top - row_height;
        for op in &writer.current.ops {
            let y = match op.operator.as_str() {
                "Td" => op.operands[1].as_float().unwrap(),
                "cm" => op.operands[5].as_float().unwrap(),
                _ => continue,
            };
            assert!(y >= bottom - 0.01, "{} at {y} is below the row ({bottom})", op.operator);
        }
        assert!(text_count(&writer) > 1);
    }

    #[test]
    fn check_image_rejects_unusable_data() {
        let writer = PdfWriter::default();
        let jpeg = |bytes: Vec<u8>, width, height| CompressedImage {
            jpeg: bytes,
            width,
            height,
        };
        assert!(writer.check_image(&jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9], 4, 3)).is_ok());
        assert!(writer.check_image(&jpeg(Vec::new(), 4, 3)).is_err());
        assert!(writer.check_image(&jpeg(b"GIF89a".to_vec(), 4, 3)).is_err());
        assert!(writer.check_image(&jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9], 0, 3)).is_err());
    }
}

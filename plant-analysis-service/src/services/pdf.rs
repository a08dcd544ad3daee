//! PDF layout for analysis reports.
//!
//! Rendering is synchronous and CPU bound; callers run it on the blocking pool.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use oxidize_pdf::graphics::Image;
use oxidize_pdf::{Document, Font, Page, PdfError};
use std::path::Path;
use thiserror::Error;

pub const REPORT_TITLE: &str = "Plant Analysis Report";

// US Letter with one-inch margins.
const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 72.0;
const TEXT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f64 = 24.0;
const BODY_SIZE: f64 = 14.0;
const LINE_SPACING: f64 = 1.2;

/// Box the photo is fitted into, in points.
const IMAGE_BOX: (f64, f64) = (500.0, 300.0);

/// Pixels kept per point of the image box when downscaling.
const IMAGE_PIXELS_PER_POINT: f64 = 2.0;

const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything that goes into one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportContent<'a> {
    pub body: &'a str,
    /// Already formatted for display.
    pub date: &'a str,
    /// Decoded image file to embed below the text.
    pub image: Option<&'a Path>,
}

/// Render the report and return the finished PDF bytes.
pub fn render(content: &ReportContent<'_>) -> Result<Vec<u8>, RenderError> {
    let mut layout = Layout::new();

    layout.centered_line(REPORT_TITLE, TITLE_SIZE)?;
    layout.move_down(TITLE_SIZE);
    layout.line(&format!("Date: {}", content.date), BODY_SIZE)?;
    layout.move_down(BODY_SIZE);

    for line in wrap_text(content.body, BODY_SIZE, TEXT_WIDTH) {
        layout.line(&line, BODY_SIZE)?;
    }

    if let Some(path) = content.image {
        let bytes = std::fs::read(path)?;
        let embedded = prepare_image(&bytes)?;
        layout.move_down(BODY_SIZE);
        layout.image(embedded)?;
    }

    Ok(layout.finish()?)
}

/// Tracks the write position while pages fill up.
struct Layout {
    doc: Document,
    page: Page,
    /// Top of the next line, in PDF user space (origin bottom left).
    cursor: f64,
    image_count: usize,
}

impl Layout {
    fn new() -> Self {
        let mut doc = Document::new();
        doc.set_title(REPORT_TITLE);

        Self {
            doc,
            page: Page::new(PAGE_WIDTH, PAGE_HEIGHT),
            cursor: PAGE_HEIGHT - MARGIN,
            image_count: 0,
        }
    }

    fn ensure_room(&mut self, height: f64) {
        if self.cursor - height < MARGIN {
            let full = std::mem::replace(&mut self.page, Page::new(PAGE_WIDTH, PAGE_HEIGHT));
            self.doc.add_page(full);
            self.cursor = PAGE_HEIGHT - MARGIN;
        }
    }

    fn move_down(&mut self, font_size: f64) {
        self.cursor -= font_size * LINE_SPACING;
    }

    fn write_at(&mut self, x: f64, text: &str, font_size: f64) -> Result<(), PdfError> {
        self.ensure_room(font_size * LINE_SPACING);

        if !text.is_empty() {
            let baseline = self.cursor - font_size;
            self.page
                .text()
                .set_font(Font::Helvetica, font_size)
                .at(x, baseline)
                .write(text)?;
        }

        self.move_down(font_size);
        Ok(())
    }

    fn line(&mut self, text: &str, font_size: f64) -> Result<(), PdfError> {
        self.write_at(MARGIN, text, font_size)
    }

    fn centered_line(&mut self, text: &str, font_size: f64) -> Result<(), PdfError> {
        let slack = (TEXT_WIDTH - text_width(text, font_size)).max(0.0);
        self.write_at(MARGIN + slack / 2.0, text, font_size)
    }

    fn image(&mut self, embedded: EmbeddedImage) -> Result<(), PdfError> {
        let (box_width, box_height) = IMAGE_BOX;
        self.ensure_room(box_height);

        let (width, height) = fit_within(embedded.width, embedded.height, box_width, box_height);
        let x = MARGIN + (box_width - width) / 2.0;
        let y = self.cursor - (box_height - height) / 2.0 - height;

        self.image_count += 1;
        let name = format!("Im{}", self.image_count);
        self.page.add_image(name.clone(), embedded.image);
        self.page.draw_image(&name, x, y, width, height)?;

        self.cursor -= box_height;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, PdfError> {
        let Layout { mut doc, page, .. } = self;
        doc.add_page(page);

        let mut bytes = Vec::new();
        doc.write(&mut bytes)?;
        Ok(bytes)
    }
}

struct EmbeddedImage {
    image: Image,
    /// Source dimensions, used for the aspect ratio.
    width: f64,
    height: f64,
}

/// Decode PNG or JPEG bytes (format sniffed from content), shrink to what the
/// image box can show and re-encode as baseline JPEG for embedding.
fn prepare_image(bytes: &[u8]) -> Result<EmbeddedImage, RenderError> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = (decoded.width(), decoded.height());

    let max_width = (IMAGE_BOX.0 * IMAGE_PIXELS_PER_POINT) as u32;
    let max_height = (IMAGE_BOX.1 * IMAGE_PIXELS_PER_POINT) as u32;
    let scaled = if width > max_width || height > max_height {
        decoded.thumbnail(max_width, max_height)
    } else {
        decoded
    };

    let rgb = if scaled.color().has_alpha() {
        flatten_on_white(&scaled)
    } else {
        scaled.to_rgb8()
    };

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(&rgb)?;
    tracing::debug!(
        source_width = width,
        source_height = height,
        jpeg_bytes = jpeg.len(),
        "Prepared report image"
    );

    Ok(EmbeddedImage {
        image: Image::from_jpeg_data(jpeg)?,
        width: f64::from(width),
        height: f64::from(height),
    })
}

/// Composite transparent pixels over a white page instead of black.
fn flatten_on_white(source: &DynamicImage) -> RgbImage {
    let rgba = source.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Largest size with the source aspect ratio that fits the box. Small images
/// are scaled up.
fn fit_within(width: f64, height: f64, box_width: f64, box_height: f64) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = (box_width / width).min(box_height / height);
    (width * scale, height * scale)
}

/// Approximate Helvetica advance width, in ems.
fn glyph_width(c: char) -> f64 {
    match c {
        'i' | 'j' | 'l' => 0.222,
        ' ' | 'f' | 't' | 'I' | '!' | '.' | ',' | ':' | ';' | '\'' | '|' | '/' => 0.278,
        'r' | '(' | ')' | '-' | '[' | ']' => 0.333,
        'm' | 'M' => 0.833,
        'w' => 0.722,
        'W' => 0.944,
        'A'..='Z' => 0.667,
        _ => 0.556,
    }
}

fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().map(glyph_width).sum::<f64>() * font_size
}

/// Greedy word wrap that keeps the text as written. Runs of spaces and a
/// paragraph's leading indentation survive; only the whitespace at a wrap
/// point is dropped. Newlines start new lines, blank lines are kept and
/// words wider than a whole line are broken between characters.
fn wrap_text(text: &str, font_size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut rest = paragraph.trim_start();
        let mut current = paragraph[..paragraph.len() - rest.len()].to_string();
        let mut gap = "";

        while !rest.is_empty() {
            let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (word, after) = rest.split_at(word_end);
            rest = after.trim_start();
            let next_gap = &after[..after.len() - rest.len()];

            let candidate = format!("{}{}{}", current, gap, word);
            if text_width(&candidate, font_size) <= max_width {
                current = candidate;
            } else {
                // Indentation alone never becomes a line of its own.
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }

                for c in word.chars() {
                    current.push(c);
                    if text_width(&current, font_size) > max_width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    }
                }
            }

            gap = next_gap;
        }

        if text_width(&current, font_size) + text_width(gap, font_size) <= max_width {
            current.push_str(gap);
        }
        lines.push(current);
    }

    lines
}

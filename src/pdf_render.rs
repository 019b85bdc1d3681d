// `printpdf` backend for `ReportDocument` plus the optional logo asset.

use crate::error::ReportError;
use crate::layout::{DrawOp, ReportDocument, RgbColor, PAGE_HEIGHT, PAGE_WIDTH};
use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
    Rect, Rgb,
};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const IMAGE_DPI: f32 = 300.0;
const LOGO_MAX_HEIGHT: f32 = 18.0;

/// Decoded logo, drawn wherever a page carries a [`DrawOp::Logo`].
#[derive(Debug, Clone)]
pub struct LogoAsset {
    image: DynamicImage,
}

impl LogoAsset {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReportError> {
        let image = image_crate::load_from_memory(bytes)
            .map_err(|e| ReportError::Pdf(format!("logo decode error: {e}")))?;
        Ok(Self { image })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Loads the logo on a worker thread, giving up after `timeout`.
///
/// A missing, broken or slow asset is logged and yields `None`; report
/// generation carries on without it.
pub fn load_logo(path: &Path, timeout: Duration) -> Option<LogoAsset> {
    let (tx, rx) = mpsc::channel();
    let owned: PathBuf = path.to_path_buf();
    thread::spawn(move || {
        let result = std::fs::read(&owned)
            .map_err(ReportError::from)
            .and_then(|bytes| LogoAsset::from_bytes(&bytes));
        // receiver may be gone after a timeout
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(logo)) => {
            let (w, h) = logo.dimensions();
            tracing::debug!(path = %path.display(), width = w, height = h, "logo loaded");
            Some(logo)
        }
        Ok(Err(e)) => {
            tracing::warn!(path = %path.display(), error = %e, "could not load logo, continuing without it");
            None
        }
        Err(_) => {
            tracing::warn!(
                path = %path.display(),
                timeout_ms = timeout.as_millis() as u64,
                "logo load timed out, continuing without it"
            );
            None
        }
    }
}

fn to_color(c: RgbColor) -> Color {
    Color::Rgb(Rgb::new(c.r as f32 / 255.0, c.g as f32 / 255.0, c.b as f32 / 255.0, None))
}

/// PDF space has its origin at the bottom-left corner.
fn flip(y: f32) -> Mm {
    Mm(PAGE_HEIGHT - y)
}

fn draw_logo(layer: &PdfLayerReference, logo: &LogoAsset, x: f32, y: f32, w: f32) {
    let (px_w, px_h) = logo.dimensions();
    if px_w == 0 || px_h == 0 {
        return;
    }
    let native_w = px_w as f32 / IMAGE_DPI * 25.4;
    let native_h = px_h as f32 / IMAGE_DPI * 25.4;
    let scale = (w / native_w).min(LOGO_MAX_HEIGHT / native_h);
    let height = native_h * scale;
    Image::from_dynamic_image(&logo.image).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(flip(y + height)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );
}

fn draw_op(
    layer: &PdfLayerReference,
    op: &DrawOp,
    font: &IndirectFontRef,
    bold_font: &IndirectFontRef,
    logo: Option<&LogoAsset>,
) {
    match op {
        DrawOp::Text { x, y, size, bold, color, text } => {
            layer.set_fill_color(to_color(*color));
            let f = if *bold { bold_font } else { font };
            layer.use_text(text.as_str(), *size, Mm(*x), flip(*y), f);
        }
        DrawOp::Rect { x, y, w, h, fill } => {
            if *w <= 0.0 || *h <= 0.0 {
                return;
            }
            layer.set_fill_color(to_color(*fill));
            layer.add_rect(Rect::new(Mm(*x), flip(*y + *h), Mm(*x + *w), flip(*y)));
        }
        DrawOp::Line { x1, y1, x2, y2, color, thickness } => {
            layer.set_outline_color(to_color(*color));
            layer.set_outline_thickness(*thickness);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), flip(*y1)), false),
                    (Point::new(Mm(*x2), flip(*y2)), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Logo { x, y, w } => {
            if let Some(logo) = logo {
                draw_logo(layer, logo, *x, *y, *w);
            }
        }
    }
}

/// Renders every page of `doc` and returns the PDF bytes.
pub fn render_pdf(doc: &ReportDocument, logo: Option<&LogoAsset>) -> Result<Vec<u8>, ReportError> {
    let (pdf, first_page, first_layer) =
        PdfDocument::new(&doc.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
    let bold = pdf
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;

    for (idx, page) in doc.pages.iter().enumerate() {
        let (page_idx, layer_idx) = if idx == 0 {
            (first_page, first_layer)
        } else {
            pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {}", idx + 1))
        };
        let layer = pdf.get_page(page_idx).get_layer(layer_idx);
        for op in &page.ops {
            draw_op(&layer, op, &font, &bold, logo);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    pdf.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("buffer error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{palette, PageBuilder};
    use std::io::Write;

    fn sample_doc() -> ReportDocument {
        let mut b = PageBuilder::new();
        b.start_page();
        b.push(DrawOp::Logo { x: 15.0, y: 5.0, w: 18.0 });
        b.heading("Overview");
        b.bar(15.0, 40.0, 100.0, 4.0, 42.0, palette::GREEN);
        b.start_page();
        b.text(15.0, 30.0, 10.0, true, palette::TEXT, "Second page");
        b.finish("Test Report")
    }

    #[test]
    fn renders_pdf_bytes() {
        let bytes = render_pdf(&sample_doc(), None).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[cfg(unix)]
    #[test]
    fn slow_logo_source_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let fifo = dir.path().join("logo.png");
        // opening a fifo with no writer blocks the reader forever
        let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());

        let started = std::time::Instant::now();
        let logo = load_logo(&fifo, Duration::from_millis(200));
        assert!(logo.is_none());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn missing_logo_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let logo = load_logo(&dir.path().join("nope.png"), Duration::from_secs(2));
        assert!(logo.is_none());
    }

    #[test]
    fn corrupt_logo_is_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a png").unwrap();
        assert!(load_logo(file.path(), Duration::from_secs(2)).is_none());
    }

    #[test]
    fn logo_is_embedded_when_present() {
        let mut png = Vec::new();
        let img = image_crate::RgbImage::from_pixel(4, 4, image_crate::Rgb([128, 0, 0]));
        DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image_crate::ImageOutputFormat::Png)
            .unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&png).unwrap();

        let logo = load_logo(file.path(), Duration::from_secs(2)).unwrap();
        assert_eq!(logo.dimensions(), (4, 4));
        let with_logo = render_pdf(&sample_doc(), Some(&logo)).unwrap();
        let without = render_pdf(&sample_doc(), None).unwrap();
        assert!(with_logo.len() > without.len());
    }
}

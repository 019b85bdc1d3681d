// Backend-free page model.
//
// Builders place `DrawOp`s on `Page`s using millimetre coordinates
// measured from the top-left corner of an A4 sheet. The PDF renderer flips
// them into PDF space; tests inspect them directly.

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN_X: f32 = 15.0;
pub const MARGIN_TOP: f32 = 15.0;
/// Space kept free for the page footer.
pub const MARGIN_BOTTOM: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub mod palette {
    use super::RgbColor;

    pub const CRIMSON: RgbColor = RgbColor::new(128, 0, 0);
    pub const TEXT: RgbColor = RgbColor::new(33, 37, 41);
    pub const MUTED: RgbColor = RgbColor::new(108, 117, 125);
    pub const TRACK: RgbColor = RgbColor::new(233, 236, 239);
    pub const PANEL: RgbColor = RgbColor::new(248, 249, 250);
    pub const WHITE: RgbColor = RgbColor::new(255, 255, 255);
    pub const GREEN: RgbColor = RgbColor::new(40, 167, 69);
    pub const BLUE: RgbColor = RgbColor::new(0, 123, 255);
    pub const AMBER: RgbColor = RgbColor::new(255, 193, 7);
    pub const RED: RgbColor = RgbColor::new(220, 53, 69);
    pub const TEAL: RgbColor = RgbColor::new(23, 162, 184);
    pub const PURPLE: RgbColor = RgbColor::new(111, 66, 193);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: RgbColor,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: RgbColor,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: RgbColor,
        thickness: f32,
    },
    /// Placeholder for the optional logo; skipped when no asset is loaded.
    Logo { x: f32, y: f32, w: f32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

#[cfg(test)]
impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub pages: Vec<Page>,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Stamps `Page X of Y` on every page.
    pub fn add_page_numbers(&mut self) {
        let total = self.pages.len();
        for (idx, page) in self.pages.iter_mut().enumerate() {
            page.ops.push(DrawOp::Line {
                x1: MARGIN_X,
                y1: PAGE_HEIGHT - 14.0,
                x2: PAGE_WIDTH - MARGIN_X,
                y2: PAGE_HEIGHT - 14.0,
                color: palette::TRACK,
                thickness: 0.5,
            });
            page.ops.push(DrawOp::Text {
                x: PAGE_WIDTH - MARGIN_X - 22.0,
                y: PAGE_HEIGHT - 9.0,
                size: 8.0,
                bold: false,
                color: palette::MUTED,
                text: format!("Page {} of {}", idx + 1, total),
            });
        }
    }
}

/// Vertical position on the current page, measured downward from the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCursor {
    pub y: f32,
    top: f32,
    bottom: f32,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(MARGIN_TOP, PAGE_HEIGHT - MARGIN_BOTTOM)
    }
}

impl PageCursor {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { y: top, top, bottom }
    }

    pub fn advance(&mut self, dy: f32) -> f32 {
        self.y += dy;
        self.y
    }

    pub fn remaining(&self) -> f32 {
        (self.bottom - self.y).max(0.0)
    }

    pub fn fits(&self, min_space: f32) -> bool {
        self.remaining() >= min_space
    }

    pub fn reset(&mut self) {
        self.y = self.top;
    }
}

/// Accumulates pages; the last page is the one being drawn on.
#[derive(Debug, Default)]
pub struct PageBuilder {
    pages: Vec<Page>,
    pub cursor: PageCursor,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor.reset();
    }

    /// Starts a new page when fewer than `min_space` millimetres remain.
    pub fn new_page_if_needed(&mut self, min_space: f32) -> bool {
        if self.pages.is_empty() || !self.cursor.fits(min_space) {
            self.start_page();
            return true;
        }
        false
    }

    pub fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.start_page();
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    pub fn text(&mut self, x: f32, y: f32, size: f32, bold: bool, color: RgbColor, text: impl Into<String>) {
        self.push(DrawOp::Text { x, y, size, bold, color, text: text.into() });
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: RgbColor) {
        self.push(DrawOp::Rect { x, y, w: w.max(0.0), h: h.max(0.0), fill });
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: RgbColor, thickness: f32) {
        self.push(DrawOp::Line { x1, y1, x2, y2, color, thickness });
    }

    /// Horizontal progress bar: grey track with a `pct`-wide fill.
    pub fn bar(&mut self, x: f32, y: f32, w: f32, h: f32, pct: f64, fill: RgbColor) {
        self.rect(x, y, w, h, palette::TRACK);
        let filled = (w as f64 * pct.clamp(0.0, 100.0) / 100.0) as f32;
        if filled > 0.0 {
            self.rect(x, y, filled, h, fill);
        }
    }

    /// Section heading at the cursor with an underline; advances past it.
    pub fn heading(&mut self, text: impl Into<String>) {
        let y = self.cursor.y;
        self.text(MARGIN_X, y + 5.0, 12.0, true, palette::CRIMSON, text);
        self.line(MARGIN_X, y + 7.0, PAGE_WIDTH - MARGIN_X, y + 7.0, palette::CRIMSON, 0.6);
        self.cursor.advance(11.0);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn finish(self, title: impl Into<String>) -> ReportDocument {
        let mut doc = ReportDocument { title: title.into(), pages: self.pages };
        doc.add_page_numbers();
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tracks_remaining_space() {
        let mut c = PageCursor::new(10.0, 100.0);
        assert_eq!(c.remaining(), 90.0);
        c.advance(85.0);
        assert!(c.fits(5.0));
        assert!(!c.fits(5.1));
        c.advance(50.0);
        assert_eq!(c.remaining(), 0.0);
        c.reset();
        assert_eq!(c.y, 10.0);
    }

    #[test]
    fn new_page_only_when_space_runs_out() {
        let mut b = PageBuilder::new();
        assert!(b.new_page_if_needed(10.0));
        assert!(!b.new_page_if_needed(10.0));
        b.cursor.advance(PAGE_HEIGHT);
        assert!(b.new_page_if_needed(10.0));
        assert_eq!(b.page_count(), 2);
        assert_eq!(b.cursor.y, MARGIN_TOP);
    }

    #[test]
    fn push_without_page_opens_one() {
        let mut b = PageBuilder::new();
        b.text(0.0, 0.0, 10.0, false, palette::TEXT, "hello");
        assert_eq!(b.page_count(), 1);
    }

    #[test]
    fn bar_fill_is_clamped() {
        let mut b = PageBuilder::new();
        b.bar(0.0, 0.0, 100.0, 4.0, 150.0, palette::GREEN);
        b.bar(0.0, 0.0, 100.0, 4.0, 0.0, palette::GREEN);
        let doc = b.finish("t");
        let widths: Vec<f32> = doc.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { w, fill, .. } if *fill == palette::GREEN => Some(*w),
                _ => None,
            })
            .collect();
        assert_eq!(widths, vec![100.0]);
    }

    #[test]
    fn finish_numbers_every_page() {
        let mut b = PageBuilder::new();
        b.start_page();
        b.start_page();
        b.start_page();
        let doc = b.finish("t");
        assert!(doc.pages[0].contains_text("Page 1 of 3"));
        assert!(doc.pages[2].contains_text("Page 3 of 3"));
    }
}

use std::path::Path;

use chrono::NaiveDate;
use egui::Color32;
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut, draw_text_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use rusttype::{Font, Scale};

use crate::error::ExportError;
use crate::model::{Granularity, ItemShape, TimelineGeometry, TimelineLayout, TimelineWindow};
use crate::ui::theme;

use super::Exporter;

/// Rasterises the timeline: label column, dated header and lanes.
pub struct PngExporter {
    pub header_height: u32,
    pub row_height: u32,
    pub label_width: u32,
    font: Option<Font<'static>>,
}

impl Default for PngExporter {
    fn default() -> Self {
        let font = bundled_font();
        if font.is_none() {
            tracing::warn!("no font for image export; labels will be omitted");
        }
        Self {
            header_height: theme::HEADER_HEIGHT as u32,
            row_height: (theme::ROW_HEIGHT + theme::ROW_GAP) as u32,
            label_width: TimelineGeometry::default().label_column_width as u32,
            font,
        }
    }
}

/// The proportional face egui ships with, so exports need no font file.
fn bundled_font() -> Option<Font<'static>> {
    let fonts = egui::FontDefinitions::default();
    let name = fonts.families.get(&egui::FontFamily::Proportional)?.first()?;
    let data = fonts.font_data.get(name)?;
    Font::try_from_vec(data.font.to_vec())
}

fn rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_array())
}

/// Filled rectangle; zero-sized or off-canvas rectangles are skipped.
fn fill(canvas: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Color32) {
    let (w, h) = (w.round() as i64, h.round() as i64);
    if w <= 0 || h <= 0 {
        return;
    }
    let rect = Rect::at(x.round() as i32, y.round() as i32).of_size(w as u32, h as u32);
    draw_filled_rect_mut(canvas, rect, rgba(color));
}

fn column_label(window: &TimelineWindow, start: NaiveDate) -> String {
    match window.granularity {
        Granularity::Day => start.format("%d").to_string(),
        Granularity::Week => start.format("W%V").to_string(),
        Granularity::Month => start.format("%b %Y").to_string(),
    }
}

/// Cut `text` to roughly `width` pixels at the given font size.
fn fit(text: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * 0.55)).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

impl PngExporter {
    fn text(&self, canvas: &mut RgbaImage, x: f32, y: f32, size: f32, color: Color32, text: &str) {
        if let Some(font) = &self.font {
            draw_text_mut(canvas, rgba(color), x as i32, y as i32, Scale::uniform(size), font, text);
        }
    }

    pub fn render(&self, layout: &TimelineLayout<'_>) -> RgbaImage {
        let label = self.label_width as f32;
        let content_width = layout.content_width.ceil().max(1.0);
        let width = (label + content_width) as u32;
        let height = self.header_height + self.row_height * layout.lanes.len().max(1) as u32;
        let mut canvas = RgbaImage::from_pixel(width, height, rgba(theme::BG_DARK));
        let (header, row) = (self.header_height as f32, self.row_height as f32);

        fill(&mut canvas, 0.0, 0.0, width as f32, header, theme::BG_HEADER);
        for (i, _) in layout.lanes.iter().enumerate().filter(|(i, _)| i % 2 == 1) {
            fill(&mut canvas, label, header + i as f32 * row, content_width, row, theme::BG_ROW_ALT);
        }

        for column in layout.window.columns() {
            let x = label + column.left;
            draw_line_segment_mut(&mut canvas, (x, header), (x, height as f32), rgba(theme::GRID_LINE));
            if column.width >= 24.0 {
                let text = fit(&column_label(&layout.window, column.start), column.width - 4.0, 12.0);
                self.text(&mut canvas, x + 3.0, header / 2.0 - 6.0, 12.0, theme::TEXT_SECONDARY, &text);
            }
        }

        for (i, lane) in layout.lanes.iter().enumerate() {
            let top = header + i as f32 * row + theme::BAR_INSET;
            let bar_height = row - theme::BAR_INSET * 2.0;
            for placed in &lane.items {
                let color = theme::item_color(placed.item);
                match placed.shape {
                    ItemShape::Bar | ItemShape::Block => {
                        // Keep items that start before the window out of the label column.
                        let left = placed.rect.left.max(0.0);
                        let right = (placed.rect.left + placed.rect.width).min(content_width);
                        fill(&mut canvas, label + left, top, right - left, bar_height, color);
                    }
                    ItemShape::Diamond => {
                        if !(0.0..=content_width).contains(&placed.rect.center()) {
                            continue;
                        }
                        let cx = (label + placed.rect.center()).round() as i32;
                        let cy = (top + bar_height / 2.0).round() as i32;
                        let r = (placed.rect.width / 2.0).round().max(2.0) as i32;
                        let points = [
                            Point::new(cx, cy - r),
                            Point::new(cx + r, cy),
                            Point::new(cx, cy + r),
                            Point::new(cx - r, cy),
                        ];
                        draw_polygon_mut(&mut canvas, &points, rgba(color));
                    }
                }
            }
        }

        if layout.today_visible() {
            let x = label + layout.today;
            draw_line_segment_mut(&mut canvas, (x, 0.0), (x, height as f32), rgba(theme::TODAY_LINE));
        }

        // Label column last so nothing overdraws it.
        fill(&mut canvas, 0.0, header, label, height as f32 - header, theme::BG_LABELS);
        draw_line_segment_mut(&mut canvas, (label, 0.0), (label, height as f32), rgba(theme::BORDER_SUBTLE));
        for (i, lane) in layout.lanes.iter().enumerate() {
            let color = if lane.key.is_unassigned() {
                theme::TEXT_DIM
            } else {
                theme::TEXT_SECONDARY
            };
            let y = header + i as f32 * row + row / 2.0 - 7.0;
            self.text(&mut canvas, 8.0, y, 14.0, color, &fit(&lane.title, label - 16.0, 14.0));
        }
        let window = &layout.window;
        let span = format!("{} – {}", window.start.format("%d %b %Y"), window.end.format("%d %b %Y"));
        self.text(&mut canvas, 8.0, header / 2.0 - 7.0, 14.0, theme::TEXT_PRIMARY, &fit(&span, label - 16.0, 14.0));

        canvas
    }
}

impl Exporter for PngExporter {
    fn name(&self) -> &'static str {
        "PNG"
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn write(&self, layout: &TimelineLayout<'_>, path: &Path) -> Result<(), ExportError> {
        let canvas = self.render(layout);
        canvas.save_with_format(path, ImageFormat::Png)?;
        tracing::info!(
            path = %path.display(),
            width = canvas.width(),
            height = canvas.height(),
            "rendered timeline image"
        );
        Ok(())
    }
}

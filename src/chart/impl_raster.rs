use crate::chart::interface::{ChartError, ChartRenderer, ChartSpec};
use crate::library::logger::interface::Logger;
use ab_glyph::FontVec;
use image::{imageops, DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use std::io::Cursor;
use std::path::Path;

// 4x3 inches at 100 DPI
const WIDTH: u32 = 400;
const HEIGHT: u32 = 300;

const PLOT_LEFT: i32 = 70;
const PLOT_RIGHT: i32 = 385;
const PLOT_TOP: i32 = 35;
const PLOT_BOTTOM: i32 = 255;

const TICK_LENGTH: f32 = 4.0;
const Y_TICKS: u32 = 5;
const BAR_WIDTH: f32 = 0.8;
const X_MARGIN: f32 = 0.6;
const CROP_PAD: u32 = 10;

const TITLE_SCALE: f32 = 15.0;
const LABEL_SCALE: f32 = 13.0;
const TICK_SCALE: f32 = 11.0;

const BACKGROUND_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

const SYSTEM_FONT_PATHS: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws bar charts with `imageproc`. Text is skipped when no font is loaded.
pub struct ChartRendererRaster {
    font: Option<FontVec>,
}

impl ChartRendererRaster {
    pub fn new(font: Option<FontVec>) -> Self {
        Self { font }
    }

    pub fn with_font_path(font_path: &Path) -> Result<Self, ChartError> {
        let font_data = std::fs::read(font_path).map_err(|e| {
            ChartError::Render(format!("failed to read font {}: {}", font_path.display(), e))
        })?;
        let font = FontVec::try_from_vec(font_data).map_err(|_| {
            ChartError::Render(format!("failed to parse font {}", font_path.display()))
        })?;
        Ok(Self::new(Some(font)))
    }

    pub fn with_system_font(logger: &dyn Logger) -> Self {
        for path in SYSTEM_FONT_PATHS {
            if let Ok(font_data) = std::fs::read(path) {
                if let Ok(font) = FontVec::try_from_vec(font_data) {
                    logger.info(&format!("Loaded chart font: {}", path));
                    return Self::new(Some(font));
                }
            }
        }

        logger.warn("No system font found, chart text will be skipped");
        Self::new(None)
    }

    fn draw_bars(&self, canvas: &mut RgbImage, chart: &ChartSpec, y_min: f32, y_max: f32) {
        let plot_width = (PLOT_RIGHT - PLOT_LEFT) as f32;
        let plot_height = (PLOT_BOTTOM - PLOT_TOP) as f32;
        let span = (chart.bars.len().max(1) - 1) as f32 + 2.0 * X_MARGIN;

        for (i, bar) in chart.bars.iter().enumerate() {
            let center = bar_center(i, span);
            let left = center - BAR_WIDTH / 2.0 * plot_width / span;
            let right = center + BAR_WIDTH / 2.0 * plot_width / span;

            let value = if bar.value.is_finite() {
                bar.value.clamp(y_min, y_max)
            } else {
                y_min
            };
            let top = PLOT_BOTTOM as f32 - (value - y_min) / (y_max - y_min) * plot_height;

            let width = (right - left).round() as u32;
            let height = (PLOT_BOTTOM as f32 - top).round() as u32;
            if width > 0 && height > 0 {
                draw_filled_rect_mut(
                    canvas,
                    Rect::at(left.round() as i32, PLOT_BOTTOM - height as i32).of_size(width, height),
                    Rgb(bar.color),
                );
            }

            draw_line_segment_mut(
                canvas,
                (center, PLOT_BOTTOM as f32),
                (center, PLOT_BOTTOM as f32 + TICK_LENGTH),
                AXIS_COLOR,
            );

            if let Some(font) = &self.font {
                let (text_width, _) = text_size(TICK_SCALE, font, &bar.label);
                draw_text_mut(
                    canvas,
                    AXIS_COLOR,
                    center.round() as i32 - text_width as i32 / 2,
                    PLOT_BOTTOM + TICK_LENGTH as i32 + 3,
                    TICK_SCALE,
                    font,
                    &bar.label,
                );
            }
        }
    }

    /// Returns the x coordinate left of the widest tick label.
    fn draw_y_axis(&self, canvas: &mut RgbImage, y_min: f32, y_max: f32) -> i32 {
        let plot_height = (PLOT_BOTTOM - PLOT_TOP) as f32;
        let mut leftmost = PLOT_LEFT - TICK_LENGTH as i32;

        for k in 0..=Y_TICKS {
            let fraction = k as f32 / Y_TICKS as f32;
            let y = PLOT_BOTTOM as f32 - fraction * plot_height;
            draw_line_segment_mut(
                canvas,
                (PLOT_LEFT as f32 - TICK_LENGTH, y),
                (PLOT_LEFT as f32, y),
                AXIS_COLOR,
            );

            if let Some(font) = &self.font {
                let label = format!("{:.1}", y_min + fraction * (y_max - y_min));
                let (text_width, text_height) = text_size(TICK_SCALE, font, &label);
                let x = PLOT_LEFT - TICK_LENGTH as i32 - 3 - text_width as i32;
                draw_text_mut(
                    canvas,
                    AXIS_COLOR,
                    x,
                    y.round() as i32 - text_height as i32 / 2,
                    TICK_SCALE,
                    font,
                    &label,
                );
                leftmost = leftmost.min(x);
            }
        }

        leftmost
    }

    fn draw_titles(&self, canvas: &mut RgbImage, chart: &ChartSpec, y_label_right: i32) {
        let Some(font) = &self.font else {
            return;
        };

        let (title_width, title_height) = text_size(TITLE_SCALE, font, &chart.title);
        let plot_center = (PLOT_LEFT + PLOT_RIGHT) / 2;
        draw_text_mut(
            canvas,
            AXIS_COLOR,
            plot_center - title_width as i32 / 2,
            PLOT_TOP - title_height as i32 - 10,
            TITLE_SCALE,
            font,
            &chart.title,
        );

        let (label_width, label_height) = text_size(LABEL_SCALE, font, &chart.y_label);
        if label_width == 0 || label_height == 0 {
            return;
        }
        // Drawn horizontally, then turned to read bottom to top.
        let mut label = RgbImage::from_pixel(label_width + 2, label_height + 4, BACKGROUND_COLOR);
        draw_text_mut(&mut label, AXIS_COLOR, 1, 0, LABEL_SCALE, font, &chart.y_label);
        let rotated = imageops::rotate270(&label);

        let x = (y_label_right - 6 - rotated.width() as i32).max(0);
        let y = (PLOT_TOP + PLOT_BOTTOM) / 2 - rotated.height() as i32 / 2;
        imageops::overlay(canvas, &rotated, x.into(), y.into());
    }
}

impl ChartRenderer for ChartRendererRaster {
    fn render(&self, chart: &ChartSpec) -> Result<Vec<u8>, ChartError> {
        let (y_min, y_max) = chart.y_range;
        if !(y_min.is_finite() && y_max.is_finite() && y_min < y_max) {
            return Err(ChartError::Render(format!(
                "invalid y range {:?}",
                chart.y_range
            )));
        }

        let mut canvas = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND_COLOR);

        self.draw_bars(&mut canvas, chart, y_min, y_max);
        let tick_labels_left = self.draw_y_axis(&mut canvas, y_min, y_max);
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(PLOT_LEFT, PLOT_TOP).of_size(
                (PLOT_RIGHT - PLOT_LEFT + 1) as u32,
                (PLOT_BOTTOM - PLOT_TOP + 1) as u32,
            ),
            AXIS_COLOR,
        );
        self.draw_titles(&mut canvas, chart, tick_labels_left);

        let cropped = crop_to_content(&canvas, CROP_PAD);

        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(cropped)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| ChartError::Render(e.to_string()))?;

        Ok(bytes)
    }
}

fn bar_center(index: usize, span: f32) -> f32 {
    let plot_width = (PLOT_RIGHT - PLOT_LEFT) as f32;
    PLOT_LEFT as f32 + (index as f32 + X_MARGIN) / span * plot_width
}

/// Crops to the bounding box of non-background pixels plus `pad`, clamped to the canvas.
fn crop_to_content(canvas: &RgbImage, pad: u32) -> RgbImage {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in canvas.enumerate_pixels() {
        if *pixel == BACKGROUND_COLOR {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    let Some((x0, y0, x1, y1)) = bounds else {
        return canvas.clone();
    };

    let left = x0.saturating_sub(pad);
    let top = y0.saturating_sub(pad);
    let right = (x1 + pad).min(canvas.width() - 1);
    let bottom = (y1 + pad).min(canvas.height() - 1);

    imageops::crop_imm(canvas, left, top, right - left + 1, bottom - top + 1).to_image()
}

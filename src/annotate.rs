//! Rendering of retained detections onto a copy of the source image.
//!
//! Each detection is drawn as a hollow rectangle in its assigned color,
//! with a filled tag above the top-left corner sized to the measured label
//! text, and the label itself in white on top of the tag. Coordinates are
//! passed through unclamped; the drawing primitives clip anything that
//! falls outside the canvas.

use ab_glyph::{Font, FontRef, FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::config::DetectionConfig;
use crate::detection::Detection;

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Candidate system font files tried before falling back to the embedded
/// font, in order.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "arial.ttf",
];

const EMBEDDED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

enum LabelFont {
    System(FontVec),
    Embedded(FontRef<'static>),
}

impl LabelFont {
    /// Font resolution cascade: a named system font file first, then the
    /// embedded fallback. Both support arbitrary pixel scales, so the
    /// requested size is honored wherever resolution lands. A failure at
    /// any step falls through to the next; `None` (embedded font data
    /// unparseable) only disables label tags, never the boxes.
    fn resolve() -> Option<LabelFont> {
        for path in SYSTEM_FONT_PATHS {
            if let Ok(data) = std::fs::read(path) {
                match FontVec::try_from_vec(data) {
                    Ok(font) => return Some(LabelFont::System(font)),
                    Err(err) => {
                        tracing::warn!(path, %err, "skipping unparseable system font");
                    }
                }
            }
        }

        match FontRef::try_from_slice(EMBEDDED_FONT) {
            Ok(font) => Some(LabelFont::Embedded(font)),
            Err(err) => {
                tracing::warn!(%err, "embedded font unavailable, labels will not be drawn");
                None
            }
        }
    }
}

/// Draws labeled bounding boxes for retained detections.
///
/// Stateless apart from the resolved font; construct once per run and call
/// [`Annotator::annotate`] with the detections to render.
pub struct Annotator {
    line_width: u32,
    scale: PxScale,
    font: Option<LabelFont>,
}

impl Annotator {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            line_width: config.line_width(),
            scale: PxScale::from(config.font_size() as f32),
            font: LabelFont::resolve(),
        }
    }

    /// Renders every detection, in order, onto a copy of `image`. The
    /// caller's image is never mutated; an empty detection list returns an
    /// unchanged copy.
    pub fn annotate(&self, image: &DynamicImage, detections: &[Detection]) -> RgbImage {
        let mut canvas = image.to_rgb8();

        for det in detections {
            self.draw_detection(&mut canvas, det);
        }

        canvas
    }

    fn draw_detection(&self, canvas: &mut RgbImage, det: &Detection) {
        let [x0, y0, x1, y1] = det.corners();
        let (x0, y0, x1, y1) = (x0 as i32, y0 as i32, x1 as i32, y1 as i32);
        let color = det.color.rgb();

        self.draw_box_outline(canvas, x0, y0, x1, y1, color);

        match &self.font {
            Some(LabelFont::System(font)) => {
                self.draw_label_tag(canvas, x0, y0, &det.label, color, font)
            }
            Some(LabelFont::Embedded(font)) => {
                self.draw_label_tag(canvas, x0, y0, &det.label, color, font)
            }
            None => {}
        }
    }

    // Nested one-pixel rectangles shrinking inward make up the stroke.
    fn draw_box_outline(
        &self,
        canvas: &mut RgbImage,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Rgb<u8>,
    ) {
        for inset in 0..self.line_width as i32 {
            // inclusive corners, matching [x0, y0, x1, y1] pixel bounds
            let width = x1 - x0 + 1 - 2 * inset;
            let height = y1 - y0 + 1 - 2 * inset;
            if width <= 0 || height <= 0 {
                break;
            }
            let rect = Rect::at(x0 + inset, y0 + inset).of_size(width as u32, height as u32);
            draw_hollow_rect_mut(canvas, rect, color);
        }
    }

    // The tag sits immediately above the box's top-left corner and may
    // extend past the image's top edge; the primitives clip it there.
    fn draw_label_tag(
        &self,
        canvas: &mut RgbImage,
        x0: i32,
        y0: i32,
        label: &str,
        color: Rgb<u8>,
        font: &impl Font,
    ) {
        let (text_width, text_height) = text_size(self.scale, font, label);
        if text_width == 0 || text_height == 0 {
            return;
        }

        let tag_top = y0 - text_height as i32;
        let tag = Rect::at(x0, tag_top).of_size(text_width, text_height);
        draw_filled_rect_mut(canvas, tag, color);
        draw_text_mut(canvas, TEXT_COLOR, x0, tag_top, self.scale, font, label);
    }
}

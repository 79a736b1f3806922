//! Letterbox compositing onto a fixed-size canvas.

use image::imageops::{self, FilterType};
use image::{Rgb as Pixel, RgbImage};

use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::color::Rgb;
use crate::shared::frame::Frame;

/// Placement of a scaled frame on a canvas: `(x, y, width, height)`.
pub fn letterbox_rect(source: (u32, u32), canvas: (u32, u32)) -> (u32, u32, u32, u32) {
    let (sw, sh) = (source.0.max(1) as f64, source.1.max(1) as f64);
    let (cw, ch) = (canvas.0, canvas.1);
    let scale = (cw as f64 / sw).min(ch as f64 / sh);
    let w = ((sw * scale).round() as u32).clamp(1, cw.max(1));
    let h = ((sh * scale).round() as u32).clamp(1, ch.max(1));
    ((cw.saturating_sub(w)) / 2, (ch.saturating_sub(h)) / 2, w, h)
}

/// A canvas showing only the background colour.
pub fn background(canvas: (u32, u32), color: Rgb) -> Frame {
    Frame::filled(canvas.0, canvas.1, color)
}

/// Scales `frame` to fit `canvas` with its aspect ratio preserved, centred,
/// with `color` filling the bars. The result keeps the frame's index.
pub fn letterbox(frame: &Frame, canvas: (u32, u32), color: Rgb) -> Frame {
    let Some(source) = frame.to_rgb_image() else {
        return background(canvas, color).with_index(frame.index());
    };
    let (x, y, w, h) = letterbox_rect((frame.width(), frame.height()), canvas);

    let scaled = if (w, h) == source.dimensions() {
        source
    } else {
        imageops::resize(&source, w, h, FilterType::Triangle)
    };
    if (w, h) == canvas {
        return Frame::from_rgb_image(scaled, frame.index());
    }

    let mut out = RgbImage::from_pixel(canvas.0, canvas.1, Pixel(color.0));
    imageops::overlay(&mut out, &scaled, x as i64, y as i64);
    Frame::from_rgb_image(out, frame.index())
}

/// Draws the outline of `face` onto `frame`. The box is clipped to the frame.
/// A frame whose buffer does not match its size comes back untouched.
pub fn draw_face_box(frame: Frame, face: &DetectedFace, color: Rgb, thickness: u32) -> Frame {
    let Some(mut image) = frame.to_rgb_image() else {
        return frame;
    };
    let index = frame.index();
    let (fw, fh) = image.dimensions();
    let scaled = DetectedFace {
        frame_width_px: fw,
        frame_height_px: fh,
        ..face.clone()
    };
    let (x, y, w, h) = scaled.pixel_rect();
    if w == 0 || h == 0 {
        return Frame::from_rgb_image(image, index);
    }

    let pixel = Pixel(color.0);
    let t = thickness.max(1);
    for py in y..(y + h).min(fh) {
        for px in x..(x + w).min(fw) {
            let on_edge = px < x + t || px + t >= x + w || py < y + t || py + t >= y + h;
            if on_edge {
                image.put_pixel(px, py, pixel);
            }
        }
    }
    Frame::from_rgb_image(image, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::square_into_square((256, 256), (1200, 1200), (0, 0, 1200, 1200))]
    #[case::wide_into_square((400, 200), (1200, 1200), (0, 300, 1200, 600))]
    #[case::tall_into_wide((100, 200), (1920, 1080), (690, 0, 540, 1080))]
    #[case::same_aspect((640, 480), (320, 240), (0, 0, 320, 240))]
    fn test_letterbox_rect(
        #[case] source: (u32, u32),
        #[case] canvas: (u32, u32),
        #[case] expected: (u32, u32, u32, u32),
    ) {
        assert_eq!(letterbox_rect(source, canvas), expected);
    }

    #[test]
    fn test_letterbox_fills_bars_with_background() {
        let frame = Frame::filled(40, 20, Rgb([200, 10, 10])).with_index(7);
        let out = letterbox(&frame, (40, 40), Rgb::WHITE);

        assert_eq!((out.width(), out.height()), (40, 40));
        assert_eq!(out.index(), 7);
        assert_eq!(out.pixel(20, 0), Rgb::WHITE);
        assert_eq!(out.pixel(20, 39), Rgb::WHITE);
        assert_eq!(out.pixel(20, 20), Rgb([200, 10, 10]));
    }

    #[test]
    fn test_letterbox_exact_size_is_unchanged() {
        let frame = Frame::filled(8, 6, Rgb::GRAY);
        let out = letterbox(&frame, (8, 6), Rgb::BLACK);
        assert_eq!(out, frame);
    }

    #[test]
    fn test_background_is_uniform() {
        let canvas = background((4, 3), Rgb::GRAY);
        assert!(canvas.data().iter().all(|&v| v == 128));
    }

    #[test]
    fn test_face_box_outline_only() {
        let frame = Frame::filled(20, 20, Rgb::BLACK);
        let face = DetectedFace {
            relative_x: 0.25,
            relative_y: 0.25,
            relative_width: 0.5,
            relative_height: 0.5,
            frame_width_px: 640,
            frame_height_px: 480,
            score: 0.9,
        };
        let out = draw_face_box(frame, &face, Rgb([0, 255, 0]), 1);

        assert_eq!(out.pixel(5, 5), Rgb([0, 255, 0]));
        assert_eq!(out.pixel(14, 14), Rgb([0, 255, 0]));
        assert_eq!(out.pixel(10, 10), Rgb::BLACK);
        assert_eq!(out.pixel(2, 2), Rgb::BLACK);
    }

    #[test]
    fn test_face_box_on_short_buffer_keeps_frame() {
        let frame = Frame::from_raw_parts(vec![7; 10], 4, 4, 3);
        let face = DetectedFace {
            relative_x: 0.0,
            relative_y: 0.0,
            relative_width: 1.0,
            relative_height: 1.0,
            frame_width_px: 4,
            frame_height_px: 4,
            score: 0.9,
        };
        let out = draw_face_box(frame.clone(), &face, Rgb([0, 255, 0]), 1);
        assert_eq!(out, frame);
        assert_eq!((out.width(), out.height()), (4, 4));
    }
}

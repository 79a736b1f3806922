use image::RgbImage;
use ndarray::ArrayView3;

use crate::shared::color::Rgb;

/// A single RGB frame: tightly packed 8-bit pixels in row-major order.
///
/// Camera captures, decoded sequence frames and composited canvases all
/// share this type. Format conversion happens at I/O boundaries only.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub const CHANNELS: usize = 3;

    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * Self::CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// Builds a frame without checking the buffer length.
    #[cfg(test)]
    pub(crate) fn from_raw_parts(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// A frame of the given size with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let pixels = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixels * Self::CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&color.0);
        }
        Self::new(data, width, height, 0)
    }

    pub fn from_rgb_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Position of this frame in its sequence (or capture counter for camera frames).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let offset = ((y as usize) * (self.width as usize) + x as usize) * Self::CHANNELS;
        Rgb([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ])
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, Self::CHANNELS),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    pub fn into_rgb_image(self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data)
    }

    /// Expands to RGBA with an opaque alpha channel, as GUI toolkits expect.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.data.len() / Self::CHANNELS * 4);
        for px in self.data.chunks_exact(Self::CHANNELS) {
            rgba.extend_from_slice(px);
            rgba.push(u8::MAX);
        }
        rgba
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_filled_sets_every_pixel() {
        let frame = Frame::filled(3, 2, Rgb([10, 20, 30]));
        assert_eq!(frame.data().len(), 18);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(frame.pixel(x, y), Rgb([10, 20, 30]));
            }
        }
    }

    #[test]
    fn test_with_index_relabels() {
        let frame = Frame::filled(1, 1, Rgb::BLACK).with_index(7);
        assert_eq!(frame.index(), 7);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_rgb_image_round_trip_keeps_pixels() {
        let frame = Frame::filled(4, 3, Rgb([1, 2, 3]));
        let image = frame.to_rgb_image().unwrap();
        assert_eq!(image.dimensions(), (4, 3));
        let back = Frame::from_rgb_image(image, 9);
        assert_eq!(back.data(), frame.data());
        assert_eq!(back.index(), 9);
    }

    #[test]
    fn test_to_rgba_appends_opaque_alpha() {
        let frame = Frame::filled(2, 1, Rgb([5, 6, 7]));
        assert_eq!(frame.to_rgba(), vec![5, 6, 7, 255, 5, 6, 7, 255]);
    }
}

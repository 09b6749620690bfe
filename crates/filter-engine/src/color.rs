//! Full-strength grayscale and sepia as 3x3 color matrices.

use image::RgbaImage;

/// Row-major RGB transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [[f32; 3]; 3]);

/// Rec. 709 luma weights in every row.
pub const GRAYSCALE: ColorMatrix = ColorMatrix([
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
]);

pub const SEPIA: ColorMatrix = ColorMatrix([
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
]);

impl ColorMatrix {
    pub fn transform(&self, rgb: [u8; 3]) -> [u8; 3] {
        let [r, g, b] = rgb.map(|c| c as f32);
        self.0.map(|row| (row[0] * r + row[1] * g + row[2] * b).round().clamp(0.0, 255.0) as u8)
    }

    pub fn apply(&self, img: &mut RgbaImage) {
        for px in img.pixels_mut() {
            let [r, g, b] = self.transform([px[0], px[1], px[2]]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }
}

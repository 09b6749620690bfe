//! Brightness and contrast as a per-channel lookup table.
//!
//! Brightness multiplies each channel by `b = pct / 100`. Contrast then
//! scales around mid-gray: `(v - 0.5) * c + 0.5`. Both run on normalized
//! values and clamp to `[0, 1]`. Alpha is never touched.

use image::RgbaImage;

/// Precomputed 8-bit tone curve.
#[derive(Clone)]
pub struct ToneCurve {
    lut: [u8; 256],
    identity: bool,
}

impl ToneCurve {
    pub fn new(brightness_pct: u16, contrast_pct: u16) -> Self {
        let b = brightness_pct as f32 / 100.0;
        let c = contrast_pct as f32 / 100.0;
        let mut lut = [0u8; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            let v = i as f32 / 255.0;
            let v = (v * b).clamp(0.0, 1.0);
            let v = ((v - 0.5) * c + 0.5).clamp(0.0, 1.0);
            *slot = (v * 255.0).round() as u8;
        }
        Self {
            lut,
            identity: brightness_pct == 100 && contrast_pct == 100,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn map(&self, value: u8) -> u8 {
        self.lut[value as usize]
    }

    pub fn apply(&self, img: &mut RgbaImage) {
        if self.identity {
            return;
        }
        for px in img.pixels_mut() {
            px[0] = self.lut[px[0] as usize];
            px[1] = self.lut[px[1] as usize];
            px[2] = self.lut[px[2] as usize];
        }
    }
}

impl std::fmt::Debug for ToneCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneCurve")
            .field("identity", &self.identity)
            .field("mid", &self.lut[128])
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_curve() {
        let curve = ToneCurve::new(100, 100);
        assert!(curve.is_identity());
        for v in 0..=255u8 {
            assert_eq!(curve.map(v), v);
        }
    }

    #[test]
    fn test_zero_brightness_is_black() {
        let curve = ToneCurve::new(0, 100);
        assert_eq!(curve.map(255), 0);
        assert_eq!(curve.map(17), 0);
    }

    #[test]
    fn test_double_brightness_saturates() {
        let curve = ToneCurve::new(200, 100);
        assert_eq!(curve.map(100), 200);
        assert_eq!(curve.map(200), 255);
    }

    #[test]
    fn test_zero_contrast_is_mid_gray() {
        let curve = ToneCurve::new(100, 0);
        assert_eq!(curve.map(0), 128);
        assert_eq!(curve.map(255), 128);
    }

    #[test]
    fn test_brightness_applies_before_contrast() {
        // 50% brightness then 200% contrast: 1.0 -> 0.5 -> 0.5.
        let curve = ToneCurve::new(50, 200);
        assert_eq!(curve.map(255), 128);
    }
}

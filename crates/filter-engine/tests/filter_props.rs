use boothcam_filter_engine::{apply_filters, ToneCurve};
use boothcam_scene_model::filter::{FilterKind, FilterSettings};
use image::{Rgba, RgbaImage};
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = FilterKind> {
    prop_oneof![
        Just(FilterKind::None),
        Just(FilterKind::Grayscale),
        Just(FilterKind::Sepia),
        Just(FilterKind::Blur),
    ]
}

fn noise(seed: u32, w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        let v = (x * 31 + y * 17).wrapping_add(seed).wrapping_mul(2_654_435_761);
        Rgba([v as u8, (v >> 8) as u8, (v >> 16) as u8, 255])
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn filtering_is_deterministic(
        seed in any::<u32>(),
        kind in kind_strategy(),
        brightness in 0u16..=200,
        contrast in 0u16..=200,
    ) {
        let src = noise(seed, 16, 12);
        let settings = FilterSettings::new(kind, brightness, contrast);
        let a = apply_filters(&src, &settings);
        let b = apply_filters(&src, &settings);
        prop_assert_eq!(a.dimensions(), src.dimensions());
        prop_assert!(a == b);
    }

    #[test]
    fn brightness_is_monotonic(v in any::<u8>(), lo in 0u16..=200, step in 0u16..=50) {
        let hi = (lo + step).min(200);
        prop_assert!(ToneCurve::new(lo, 100).map(v) <= ToneCurve::new(hi, 100).map(v));
    }

    #[test]
    fn grayscale_output_is_neutral(seed in any::<u32>(), brightness in 0u16..=200) {
        let src = noise(seed, 8, 8);
        let out = apply_filters(&src, &FilterSettings::new(FilterKind::Grayscale, brightness, 100));
        for px in out.pixels() {
            prop_assert_eq!(px[0], px[1]);
            prop_assert_eq!(px[1], px[2]);
        }
    }
}

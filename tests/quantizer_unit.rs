//! Unit tests for color quantization through the public API.

use ansicast::color::{nearest, ColorDepth, Quantizer, Rgb, TermColor, ANSI16, XTERM256};

#[test]
fn test_dark_gray_same_with_and_without_cache() {
    let c = Rgb::new(10, 10, 10);
    for depth in [ColorDepth::Ansi16, ColorDepth::Xterm256, ColorDepth::TrueColor] {
        let mut cached = Quantizer::new(depth, true);
        let mut uncached = Quantizer::new(depth, false);
        let first = cached.quantize(c);
        assert_eq!(first, uncached.quantize(c));
        // Second lookup is a cache hit for indexed depths
        assert_eq!(first, cached.quantize(c));
    }
}

#[test]
fn test_palette_stable_over_1000_calls() {
    let mut q = Quantizer::new(ColorDepth::Xterm256, true);
    let c = Rgb::new(123, 45, 210);
    let first = q.quantize(c);
    for _ in 0..1000 {
        assert_eq!(q.quantize(c), first);
    }
    let stats = q.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1000);
}

#[test]
fn test_indexed_ranges_per_depth() {
    let mut ansi = Quantizer::new(ColorDepth::Ansi16, true);
    let mut xterm = Quantizer::new(ColorDepth::Xterm256, true);
    for r in (0..=255u16).step_by(51) {
        for g in (0..=255u16).step_by(51) {
            for b in (0..=255u16).step_by(51) {
                let c = Rgb::new(r as u8, g as u8, b as u8);
                match ansi.quantize(c) {
                    TermColor::Indexed(i) => assert!(i < 16),
                    other => panic!("unexpected {:?}", other),
                }
                match xterm.quantize(c) {
                    TermColor::Indexed(i) => assert!(i >= 16),
                    other => panic!("unexpected {:?}", other),
                }
            }
        }
    }
}

#[test]
fn test_cube_colors_map_to_themselves() {
    // Web-safe cube values are exact entries in the fixed 256-color range
    for i in 16..232usize {
        assert_eq!(
            nearest(ColorDepth::Xterm256, XTERM256[i]),
            TermColor::Indexed(i as u8),
            "index {}",
            i
        );
    }
}

#[test]
fn test_ansi16_entries_map_to_themselves() {
    for (i, c) in ANSI16.iter().enumerate() {
        assert_eq!(nearest(ColorDepth::Ansi16, *c), TermColor::Indexed(i as u8));
    }
}

#[test]
fn test_truecolor_is_identity() {
    let mut q = Quantizer::new(ColorDepth::TrueColor, true);
    let c = Rgb::new(1, 254, 77);
    assert_eq!(q.quantize(c), TermColor::Rgb(c));
}

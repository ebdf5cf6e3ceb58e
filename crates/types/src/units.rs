//! Unit conversions between CSS pixels and document units.

pub const PT_PER_PX: f32 = 0.75;
pub const PX_PER_INCH: f32 = 96.0;
pub const PT_PER_INCH: f32 = 72.0;
pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_PX: i64 = EMU_PER_INCH / PX_PER_INCH as i64;
pub const EMU_PER_PT: i64 = 12_700;
pub const MM_PER_INCH: f32 = 25.4;

pub fn px_to_pt(px: f32) -> f32 {
    px * PT_PER_PX
}

pub fn px_to_in(px: f32) -> f32 {
    px / PX_PER_INCH
}

pub fn px_to_emu(px: f32) -> i64 {
    (px as f64 * EMU_PER_PX as f64).round() as i64
}

pub fn pt_to_emu(pt: f32) -> i64 {
    (pt as f64 * EMU_PER_PT as f64).round() as i64
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm / MM_PER_INCH * PT_PER_INCH
}

/// Font sizes in DrawingML are hundredths of a point.
pub fn pt_to_centipoints(pt: f32) -> u32 {
    (pt * 100.0).round().max(100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_converts_to_widescreen_slide() {
        assert!((px_to_in(1280.0) - 13.333).abs() < 1e-3);
        assert_eq!(px_to_in(720.0), 7.5);
        assert_eq!(px_to_emu(1280.0), 12_192_000);
        assert_eq!(px_to_emu(720.0), 6_858_000);
    }

    #[test]
    fn px_to_pt_is_three_quarters() {
        assert_eq!(px_to_pt(16.0), 12.0);
        assert_eq!(pt_to_centipoints(12.0), 1200);
        assert!((mm_to_pt(10.0) - 28.3465).abs() < 1e-3);
    }
}

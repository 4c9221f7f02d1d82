//! Fixed-point constants and scalar pixel math shared by every backend.
//!
//! All color conversions run in integer fixed point. The weights are the
//! BT.601 studio-swing coefficients scaled by `1 << WEIGHT_SHIFT` and rounded
//! to the nearest integer; the gray weights are chosen so they sum to exactly
//! `1 << BGR_TO_GRAY_SHIFT`, which keeps a uniform gray image exactly uniform
//! after conversion. The vector backends use the same constants in 32-bit
//! lanes, so scalar and vector outputs agree bit for bit.

/// Shift applied after the weighted BGR sum in the gray conversion.
pub const BGR_TO_GRAY_SHIFT: i32 = 14;
pub const BGR_TO_GRAY_ROUND: i32 = 1 << (BGR_TO_GRAY_SHIFT - 1);

// 0.114, 0.587, 0.299 scaled by 1 << 14; the sum is exactly 16384.
pub const BLUE_TO_GRAY: i32 = 1868;
pub const GREEN_TO_GRAY: i32 = 9617;
pub const RED_TO_GRAY: i32 = 4899;

/// Shift applied after the weighted sums of the BGR -> YUV conversion.
pub const BGR_TO_YUV_SHIFT: i32 = 14;
pub const BGR_TO_YUV_ROUND: i32 = 1 << (BGR_TO_YUV_SHIFT - 1);

/// Studio-swing luma offset: black maps to Y = 16.
pub const Y_ADJUST: i32 = 16;
/// Chroma zero point: neutral colors map to U = V = 128.
pub const UV_ADJUST: i32 = 128;

// 0.098, 0.504, 0.257 scaled by 1 << 14.
pub const BLUE_TO_Y: i32 = 1606;
pub const GREEN_TO_Y: i32 = 8258;
pub const RED_TO_Y: i32 = 4211;

// 0.439, -0.291, -0.148 scaled by 1 << 14.
pub const BLUE_TO_U: i32 = 7193;
pub const GREEN_TO_U: i32 = -4768;
pub const RED_TO_U: i32 = -2425;

// -0.071, -0.368, 0.439 scaled by 1 << 14.
pub const BLUE_TO_V: i32 = -1163;
pub const GREEN_TO_V: i32 = -6029;
pub const RED_TO_V: i32 = 7193;

/// Rounding average of two bytes.
#[inline(always)]
pub const fn average2(a: u8, b: u8) -> u8 {
    ((a as u16 + b as u16 + 1) >> 1) as u8
}

/// Rounding average of a 2x2 block.
#[inline(always)]
pub const fn average4(a: u8, b: u8, c: u8, d: u8) -> u8 {
    ((a as u16 + b as u16 + c as u16 + d as u16 + 2) >> 2) as u8
}

/// Rounding division by 16, the final step of the 3x3 Gaussian.
#[inline(always)]
pub const fn divide_by_16(value: u16) -> u16 {
    (value + 8) >> 4
}

#[inline(always)]
pub fn restrict_range(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[inline(always)]
pub fn bgr_to_gray(blue: i32, green: i32, red: i32) -> u8 {
    // The weights sum to 1 << 14, so the result never exceeds 255.
    ((BLUE_TO_GRAY * blue + GREEN_TO_GRAY * green + RED_TO_GRAY * red + BGR_TO_GRAY_ROUND)
        >> BGR_TO_GRAY_SHIFT) as u8
}

#[inline(always)]
pub fn bgr_to_y(blue: i32, green: i32, red: i32) -> u8 {
    restrict_range(
        Y_ADJUST
            + ((BLUE_TO_Y * blue + GREEN_TO_Y * green + RED_TO_Y * red + BGR_TO_YUV_ROUND)
                >> BGR_TO_YUV_SHIFT),
    )
}

#[inline(always)]
pub fn bgr_to_u(blue: i32, green: i32, red: i32) -> u8 {
    restrict_range(
        UV_ADJUST
            + ((BLUE_TO_U * blue + GREEN_TO_U * green + RED_TO_U * red + BGR_TO_YUV_ROUND)
                >> BGR_TO_YUV_SHIFT),
    )
}

#[inline(always)]
pub fn bgr_to_v(blue: i32, green: i32, red: i32) -> u8 {
    restrict_range(
        UV_ADJUST
            + ((BLUE_TO_V * blue + GREEN_TO_V * green + RED_TO_V * red + BGR_TO_YUV_ROUND)
                >> BGR_TO_YUV_SHIFT),
    )
}

/// Polynomial approximation of the logistic function, accurate to about
/// 2.3e-3 over the whole axis. Evaluation order matters: the vector backends
/// replicate it operation for operation so the outputs match exactly.
#[inline(always)]
pub fn rough_sigmoid(value: f32) -> f32 {
    let x = value.abs();
    let x2 = x * x;
    let e = 1.0 + x + x2 * 0.5417 + x2 * x2 * 0.1460;
    let exp = if value > 0.0 { 1.0 / e } else { e };
    1.0 / (1.0 + exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_weights_sum_to_unity() {
        assert_eq!(BLUE_TO_GRAY + GREEN_TO_GRAY + RED_TO_GRAY, 1 << BGR_TO_GRAY_SHIFT);
    }

    #[test]
    fn uniform_gray_is_preserved() {
        for v in 0..=255 {
            assert_eq!(bgr_to_gray(v, v, v), v as u8);
        }
    }

    #[test]
    fn black_maps_to_studio_swing_zero() {
        assert_eq!(bgr_to_y(0, 0, 0), 16);
        assert_eq!(bgr_to_u(0, 0, 0), 128);
        assert_eq!(bgr_to_v(0, 0, 0), 128);
    }

    #[test]
    fn white_luma_is_clamped_range() {
        let y = bgr_to_y(255, 255, 255);
        assert!(y >= 230 && y <= 240, "y = {y}");
    }

    #[test]
    fn averages_round_to_nearest() {
        assert_eq!(average2(0, 1), 1);
        assert_eq!(average2(255, 255), 255);
        assert_eq!(average4(0, 0, 0, 1), 0);
        assert_eq!(average4(0, 1, 1, 1), 1);
        assert_eq!(average4(255, 255, 255, 255), 255);
        assert_eq!(divide_by_16(4080), 255);
        assert_eq!(divide_by_16(7), 0);
        assert_eq!(divide_by_16(8), 1);
    }

    #[test]
    fn rough_sigmoid_tracks_exact_sigmoid() {
        let mut x = -10.0f32;
        while x <= 10.0 {
            let exact = 1.0 / (1.0 + (-x).exp());
            assert!((rough_sigmoid(x) - exact).abs() < 2.4e-3, "x = {x}");
            x += 0.01;
        }
    }

    #[test]
    fn rough_sigmoid_is_symmetric() {
        for x in [0.1f32, 0.5, 1.0, 3.0, 7.5] {
            let p = rough_sigmoid(x);
            let n = rough_sigmoid(-x);
            assert!((p + n - 1.0).abs() < 1e-6);
        }
    }
}

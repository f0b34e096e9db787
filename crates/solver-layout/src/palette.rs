//! Linear RGB vertex colors.

use crate::types::Vec3;

pub const RED: Vec3 = [1.0, 0.0, 0.0];
pub const GREEN: Vec3 = [0.0, 1.0, 0.0];
pub const BLUE: Vec3 = [0.0, 0.0, 1.0];
pub const YELLOW: Vec3 = [1.0, 1.0, 0.0];
pub const CYAN: Vec3 = [0.0, 1.0, 1.0];
pub const MAGENTA: Vec3 = [1.0, 0.0, 1.0];
pub const WHITE: Vec3 = grey(1.0);
pub const BLACK: Vec3 = grey(0.0);

/// Uniform grey; `level` is clamped to `[0, 1]`.
#[inline]
pub const fn grey(level: f32) -> Vec3 {
    let l = if level < 0.0 {
        0.0
    } else if level > 1.0 {
        1.0
    } else {
        level
    };
    [l, l, l]
}

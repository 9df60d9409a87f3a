//! Additional math helpers layered on top of `glam`.

use glam::Vec3;

/// `(a × b) × c`: with `a = c = edge` and `b = towards`, the component of
/// `towards` perpendicular to `edge`.
pub fn triple_cross(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    a.cross(b).cross(c)
}

/// Some vector perpendicular to `v` (zero if `v` is zero).
pub fn any_perpendicular(v: Vec3) -> Vec3 {
    let helper = if v.x.abs() < 0.577 { Vec3::X } else { Vec3::Y };
    v.cross(helper)
}

/// Unit vector along `axis` (0, 1 or 2) pointing in the direction of `sign`.
pub fn axis_direction(axis: usize, sign: f32) -> Vec3 {
    let mut v = Vec3::ZERO;
    v[axis] = if sign < 0.0 { -1.0 } else { 1.0 };
    v
}

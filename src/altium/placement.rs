//! Composes a 3-D placement (origin, axis, ref_dir) from a model's Euler
//! rotation triple and a per-instance 2-D offset, for the ISO 10303-214
//! `axis_placement` convention used by the STEP sink.

use super::model::ModelInfo;
use super::params::ParameterList;

/// 0.41148 mm expressed in mil (0.41148 / 0.0254), added to `origin.z` when
/// `BODYPROJECTION` mirrors the body to the opposite board side.
const BODY_PROJECTION_THICKNESS_MIL: f64 = 0.41148 / 0.0254;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub origin: Vec3,
    pub axis: Vec3,
    pub ref_dir: Vec3,
}

/// The "backwards" 2-D rotation: clockwise in the rotated plane, not the
/// conventional counter-clockwise. This sign convention is part of the
/// contract — matching the proprietary tool's placement requires it
/// exactly, not the textbook rotation matrix.
fn rotate(a: f64, b: f64, theta_deg: f64) -> (f64, f64) {
    let theta = theta_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    (a * cos + b * sin, -a * sin + b * cos)
}

/// Composes the placement for one model instance.
///
/// Rotation order is X, then Y, then Z, applied to both `axis` and
/// `ref_dir`. Whether this order is correct when more than one of
/// rot_x/rot_y/rot_z is simultaneously non-zero was flagged by the
/// original author as untested; this implementation does not second-guess
/// that and applies the documented order unconditionally.
#[must_use]
pub fn compose_placement(info: &ModelInfo, instance: &ParameterList) -> Placement {
    let mut origin = Vec3::new(0.0, 0.0, 0.0);
    let mut axis = Vec3::new(0.0, 0.0, 1.0);
    let mut ref_dir = Vec3::new(1.0, 0.0, 0.0);

    // rot_x: applied to (y, z)
    let (ay, az) = rotate(axis.y, axis.z, info.rot_x);
    let (ry, rz) = rotate(ref_dir.y, ref_dir.z, info.rot_x);
    axis.y = ay;
    axis.z = az;
    ref_dir.y = ry;
    ref_dir.z = rz;

    // rot_y: applied to (z, x)
    let (az, ax) = rotate(axis.z, axis.x, info.rot_y);
    let (rz, rx) = rotate(ref_dir.z, ref_dir.x, info.rot_y);
    axis.z = az;
    axis.x = ax;
    ref_dir.z = rz;
    ref_dir.x = rx;

    // rot_z: applied to (x, y)
    let (ax, ay) = rotate(axis.x, axis.y, info.rot_z);
    let (rx, ry) = rotate(ref_dir.x, ref_dir.y, info.rot_z);
    axis.x = ax;
    axis.y = ay;
    ref_dir.x = rx;
    ref_dir.y = ry;

    origin.x += instance.get_double("MODEL.2D.X");
    origin.y -= instance.get_double("MODEL.2D.Y");
    origin.z -= instance.get_double("MODEL.3D.DZ");
    axis.z = -axis.z;
    ref_dir.z = -ref_dir.z;

    if instance.get_bool("BODYPROJECTION") {
        origin.y = -origin.y;
        origin.z = -origin.z;
        axis.y = -axis.y;
        axis.z = -axis.z;
        ref_dir.y = -ref_dir.y;
        ref_dir.z = -ref_dir.z;
        origin.z += BODY_PROJECTION_THICKNESS_MIL;
    }

    Placement { origin, axis, ref_dir }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_with_rotation(rot_x: f64, rot_y: f64, rot_z: f64) -> ModelInfo {
        ModelInfo {
            id: "M".into(),
            rot_x,
            rot_y,
            rot_z,
            d_x: 0,
            d_y: 0,
            d_z: 0,
            checksum: 0,
            embed: true,
            filename: "m.step".into(),
        }
    }

    /// Invariant #3: zero rotation, no body projection, zero offsets.
    #[test]
    fn identity_composition_flips_axis_z_unconditionally() {
        let info = info_with_rotation(0.0, 0.0, 0.0);
        let instance = ParameterList::parse("BODYPROJECTION=F");
        let p = compose_placement(&info, &instance);
        assert_eq!(p.axis, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(p.ref_dir, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(p.origin, Vec3::new(0.0, 0.0, 0.0));
    }

    /// S5: rot_z=90, MODEL.2D.X=10, MODEL.2D.Y=20.
    #[test]
    fn s5_placement_composition_scenario() {
        let info = info_with_rotation(0.0, 0.0, 90.0);
        let instance = ParameterList::parse(
            "MODEL.2D.X=10|MODEL.2D.Y=20|MODEL.3D.DZ=0|BODYPROJECTION=F",
        );
        let p = compose_placement(&info, &instance);

        assert!((p.ref_dir.x - 0.0).abs() < 1e-9);
        assert!((p.ref_dir.y - -1.0).abs() < 1e-9);
        assert!((p.ref_dir.z - 0.0).abs() < 1e-9);

        assert!((p.axis.x - 0.0).abs() < 1e-9);
        assert!((p.axis.y - 0.0).abs() < 1e-9);
        assert!((p.axis.z - -1.0).abs() < 1e-9);

        assert!((p.origin.x - 10.0).abs() < 1e-9);
        assert!((p.origin.y - -20.0).abs() < 1e-9);
        assert!((p.origin.z - 0.0).abs() < 1e-9);
    }

    #[test]
    fn body_projection_flips_and_offsets() {
        let info = info_with_rotation(0.0, 0.0, 0.0);
        let instance = ParameterList::parse("BODYPROJECTION=T");
        let p = compose_placement(&info, &instance);
        assert!((p.origin.z - BODY_PROJECTION_THICKNESS_MIL).abs() < 1e-9);
        assert_eq!(p.axis.y, -0.0);
    }
}

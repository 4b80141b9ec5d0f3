//! Propeller spin driven by wall-clock time.
//!
//! The spin angle is recomputed from elapsed time every frame, never
//! accumulated, so it cannot drift.

use crate::hierarchy::PlacedModel;
use crate::transform::spin_matrix;

/// Spin angle in degrees after `elapsed` seconds at `rpm`.
///
/// `(elapsed · rpm / 60 · 360) mod 360`; the remainder keeps the sign of
/// `elapsed`, so non-negative time always lands in `[0, 360)`.
pub fn spin_angle(elapsed: f64, rpm: f32) -> f32 {
    let degrees = (elapsed * rpm as f64 / 60.0 * 360.0 % 360.0) as f32;
    // f32 rounding can push 359.99999... up to a full turn.
    if degrees >= 360.0 { 0.0 } else { degrees }
}

/// Spins one part of a placed model about its own hub.
///
/// Appends `translate(+c) · Rz(θ) · translate(-c)` to the part's transform,
/// where `c` is the centroid of the part's untransformed local box. The part
/// keeps following the body and turns independently on top of it.
///
/// `propeller_index` must name a part; [`Propeller::attach`](crate::Propeller::attach)
/// checks that at load time.
pub fn apply_propeller_spin(
    placed: &mut PlacedModel<'_>,
    propeller_index: usize,
    rpm: f32,
    elapsed: f64,
) {
    let angle = spin_angle(elapsed, rpm);
    let part = &mut placed.model_mut().parts_mut()[propeller_index];
    let hub = part.bounds.centroid();
    part.transform *= spin_matrix(hub, angle);
    log::trace!("propeller '{}' at {:.2} deg", part.name, angle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attitude::{Attitude, AttitudeComposer, Rotation, SceneMode};
    use crate::geometry::{BoundingBox, Model, SubGeometry};
    use crate::hierarchy::place_model;
    use glam::{Mat4, Vec3};

    fn aircraft() -> Model {
        Model::new(vec![
            SubGeometry::new(
                "propeller",
                BoundingBox::new(Vec3::new(0.0, 0.0, 3.8), Vec3::new(2.0, 2.0, 4.0)),
            ),
            SubGeometry::new(
                "body",
                BoundingBox::new(Vec3::new(0.5, 0.5, 0.0), Vec3::new(1.5, 1.5, 3.8)),
            ),
        ])
        .unwrap()
    }

    fn wrapped_diff(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn six_hundred_rpm_completes_a_turn_in_a_tenth() {
        let angle = spin_angle(0.1, 600.0);
        assert!(wrapped_diff(angle, 0.0) < 1e-3, "{angle}");
    }

    #[test]
    fn quarter_turn() {
        let angle = spin_angle(0.25, 60.0);
        assert!((angle - 90.0).abs() < 1e-4);
    }

    #[test]
    fn angle_is_periodic_in_one_revolution() {
        for rpm in [1.0f32, 37.5, 120.0, 900.0, 1200.0] {
            let period = 60.0 / rpm as f64;
            for i in 0..20 {
                let t = i as f64 * 0.173;
                let diff = wrapped_diff(spin_angle(t, rpm), spin_angle(t + period, rpm));
                assert!(diff < 1e-2, "rpm {rpm} t {t}: {diff}");
            }
        }
    }

    #[test]
    fn angle_stays_in_range_for_non_negative_time() {
        for i in 0..1000 {
            let angle = spin_angle(i as f64 * 0.0137, 777.0);
            assert!((0.0..360.0).contains(&angle), "{angle}");
        }
    }

    #[test]
    fn zero_rpm_leaves_transform_unchanged() {
        let mut model = aircraft();
        let rotation = AttitudeComposer::compose(
            SceneMode::Quaternion,
            Attitude::new(12.0, 34.0, 56.0),
            None,
        );
        let mut placed = place_model(&mut model, 1.0, &rotation);
        let before = placed.transforms()[0];

        for t in [0.0, 1.5, 1234.5] {
            apply_propeller_spin(&mut placed, 0, 0.0, t);
            assert!(placed.transforms()[0].abs_diff_eq(before, 1e-5));
        }
    }

    #[test]
    fn spin_only_touches_the_propeller() {
        let mut model = aircraft();
        let mut placed = place_model(&mut model, 1.0, &Rotation::IDENTITY);
        let body_before = placed.transforms()[1];

        apply_propeller_spin(&mut placed, 0, 600.0, 0.025);

        let transforms = placed.transforms();
        assert_eq!(transforms[1], body_before);
        assert!(!transforms[0].abs_diff_eq(body_before, 1e-3));
    }

    #[test]
    fn spin_turns_about_the_hub() {
        let mut model = aircraft();
        let mut placed = place_model(&mut model, 1.0, &Rotation::IDENTITY);
        let body = placed.transforms()[1];

        // 60 rpm for 0.25 s: a quarter turn.
        apply_propeller_spin(&mut placed, 0, 60.0, 0.25);
        let prop = placed.transforms()[0];

        let hub = Vec3::new(1.0, 1.0, 3.9);
        assert!(prop.transform_point3(hub).abs_diff_eq(body.transform_point3(hub), 1e-5));

        let tip = Vec3::new(2.0, 1.0, 3.9);
        let expected = body * Mat4::from_translation(hub) * Mat4::from_rotation_z(90f32.to_radians());
        let expected_tip = expected.transform_point3(tip - hub);
        assert!(prop.transform_point3(tip).abs_diff_eq(expected_tip, 1e-5));
    }
}

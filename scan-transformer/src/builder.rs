use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use crate::rigid::{compose, rigid_transform, RotationAxis};

/// One angle/axis/translation entry of a scan's pose, as it appears in the
/// scan table. `axis` is the raw label so that unknown axes keep their
/// permissive identity-rotation behavior instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformStep {
    pub angle_degrees: f64,
    pub axis: String,
    pub translation: [f64; 3],
}

impl TransformStep {
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let [x, y, z] = self.translation;
        rigid_transform(
            self.angle_degrees,
            x,
            y,
            z,
            RotationAxis::from_label(&self.axis),
        )
    }
}

pub trait TransformBuilder {
    fn build(&self) -> Matrix4<f64>;
}

/// Builds a scan's net transform from its ordered step list. Steps are
/// listed in matrix-product order: `steps[0] * steps[1] * ...`, so the
/// last-listed step acts on the points first.
pub struct RigidTransformBuilder {
    pub steps: Vec<TransformStep>,
}

impl RigidTransformBuilder {
    pub fn new(steps: Vec<TransformStep>) -> Self {
        Self { steps }
    }
}

impl TransformBuilder for RigidTransformBuilder {
    fn build(&self) -> Matrix4<f64> {
        let matrices: Vec<Matrix4<f64>> =
            self.steps.iter().map(TransformStep::to_matrix).collect();
        compose(&matrices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    fn step(angle_degrees: f64, axis: &str, translation: [f64; 3]) -> TransformStep {
        TransformStep {
            angle_degrees,
            axis: axis.to_string(),
            translation,
        }
    }

    #[test]
    fn empty_step_list_builds_identity() {
        let builder = RigidTransformBuilder::new(vec![]);
        assert_relative_eq!(builder.build(), Matrix4::identity(), epsilon = 1e-15);
    }

    #[test]
    fn two_step_pose_matches_manual_product() {
        // The two-rotation scans: Z rotation with translation, applied after
        // a 90-degree X rotation.
        let builder = RigidTransformBuilder::new(vec![
            step(180.0, "Z", [94.0, 92.0, 40.0]),
            step(-90.0, "X", [0.0, 0.0, 0.0]),
        ]);

        let expected = crate::rigid::rigid_transform(
            180.0,
            94.0,
            92.0,
            40.0,
            Some(RotationAxis::Z),
        ) * crate::rigid::rotation_about(-90.0, RotationAxis::X);

        assert_relative_eq!(builder.build(), expected, epsilon = 1e-12);
    }

    #[test]
    fn zero_angle_placeholder_step_is_a_no_op() {
        // A zero-angle Y step between two others must not change the product.
        let with_placeholder = RigidTransformBuilder::new(vec![
            step(180.0, "Z", [109.0, 360.0, -127.0]),
            step(0.0, "Y", [0.0, 0.0, 0.0]),
            step(90.0, "X", [0.0, 0.0, 0.0]),
        ]);
        let without = RigidTransformBuilder::new(vec![
            step(180.0, "Z", [109.0, 360.0, -127.0]),
            step(90.0, "X", [0.0, 0.0, 0.0]),
        ]);

        let p = Vector4::new(3.0, -7.0, 11.0, 1.0);
        assert_relative_eq!(
            with_placeholder.build() * p,
            without.build() * p,
            epsilon = 1e-9
        );
    }

    #[test]
    fn step_deserializes_from_scan_table_json() {
        let json = r#"{ "angle_degrees": 30.0, "axis": "Y", "translation": [38.0, -18.0, 15.0] }"#;
        let step: TransformStep = serde_json::from_str(json).unwrap();
        assert_eq!(step.axis, "Y");

        let m = step.to_matrix();
        assert_eq!(m[(0, 3)], 38.0);
        assert_eq!(m[(1, 3)], -18.0);
        assert_eq!(m[(2, 3)], 15.0);
    }
}

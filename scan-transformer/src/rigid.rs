use nalgebra::Matrix4;

/// Axis the rotation acts about. Labels are matched case-insensitively;
/// anything else falls back to the identity rotation (see
/// [`rigid_transform`]), which is deliberate: legacy scan tables carry
/// placeholder axis entries for zero-angle steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

impl RotationAxis {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            l if l.eq_ignore_ascii_case("x") => Some(RotationAxis::X),
            l if l.eq_ignore_ascii_case("y") => Some(RotationAxis::Y),
            l if l.eq_ignore_ascii_case("z") => Some(RotationAxis::Z),
            _ => None,
        }
    }
}

/// Right-handed rotation by `angle_degrees` about `axis`, as a homogeneous
/// 4x4 matrix. The same sign convention is used for all three axes:
/// X rotates the (Y,Z) plane, Y rotates the (Z,X) plane, Z the (X,Y) plane.
pub fn rotation_about(angle_degrees: f64, axis: RotationAxis) -> Matrix4<f64> {
    let theta = angle_degrees.to_radians();
    let (sin, cos) = theta.sin_cos();

    let mut m = Matrix4::identity();
    match axis {
        RotationAxis::X => {
            m[(1, 1)] = cos;
            m[(1, 2)] = -sin;
            m[(2, 1)] = sin;
            m[(2, 2)] = cos;
        }
        RotationAxis::Y => {
            m[(0, 0)] = cos;
            m[(0, 2)] = sin;
            m[(2, 0)] = -sin;
            m[(2, 2)] = cos;
        }
        RotationAxis::Z => {
            m[(0, 0)] = cos;
            m[(0, 1)] = -sin;
            m[(1, 0)] = sin;
            m[(1, 1)] = cos;
        }
    }
    m
}

/// Rigid transform from angle/axis/translation parameters.
///
/// `axis == None` means the scan table named an unknown axis: the rotation
/// degrades to identity and the translation is still applied. This is a
/// documented permissive default, not an error.
pub fn rigid_transform(
    angle_degrees: f64,
    x: f64,
    y: f64,
    z: f64,
    axis: Option<RotationAxis>,
) -> Matrix4<f64> {
    let mut m = match axis {
        Some(axis) => rotation_about(angle_degrees, axis),
        None => Matrix4::identity(),
    };
    m[(0, 3)] = x;
    m[(1, 3)] = y;
    m[(2, 3)] = z;
    m
}

/// Matrix product of `transforms` in the listed order. The last-listed
/// transform is the one applied to a point first, so a two-step pose is
/// written `[second_motion, first_motion]`. A single-element list is
/// returned unchanged; an empty list composes to the identity.
pub fn compose(transforms: &[Matrix4<f64>]) -> Matrix4<f64> {
    transforms
        .iter()
        .fold(Matrix4::identity(), |acc, t| acc * t)
}

pub mod builder;
pub mod rigid;
pub mod runner;

pub use builder::{RigidTransformBuilder, TransformBuilder, TransformStep};
pub use rigid::{compose, rigid_transform, rotation_about, RotationAxis};
pub use runner::{CloudTransformer, Transformer};

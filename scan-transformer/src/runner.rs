use nalgebra::{Matrix4, Vector4};
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

use scan_core::pointcloud::point::{Point, PointCloud};

pub trait Transformer {
    fn execute(&self, point_cloud: &PointCloud) -> PointCloud;
}

/// Applies one homogeneous transform to every point of a cloud, producing a
/// fresh cloud with the same point count and order.
pub struct CloudTransformer {
    transform: Matrix4<f64>,
}

impl CloudTransformer {
    pub fn new(transform: Matrix4<f64>) -> Self {
        Self { transform }
    }
}

impl Transformer for CloudTransformer {
    fn execute(&self, point_cloud: &PointCloud) -> PointCloud {
        let points: Vec<Point> = point_cloud
            .points
            .par_iter()
            .map(|p| {
                let v = self.transform * Vector4::new(p.x, p.y, p.z, 1.0);
                Point::new(v.x, v.y, v.z)
            })
            .collect();

        PointCloud::new(points)
    }
}

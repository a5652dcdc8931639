use crate::pointcloud::point::PointCloud;

/// Drops points with any non-finite coordinate, preserving the order of the
/// remaining points. Applying it to an already clean cloud is a no-op.
pub fn remove_non_finite(cloud: &PointCloud) -> PointCloud {
    let points = cloud
        .points
        .iter()
        .filter(|p| p.is_finite())
        .copied()
        .collect();
    PointCloud::new(points)
}

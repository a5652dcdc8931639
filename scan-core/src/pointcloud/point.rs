use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// Axis-aligned extent of the cloud, tracked so the merge stage can extend it
// without rescanning every point.
#[derive(Debug, Clone)]
pub struct BoundingVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Default for BoundingVolume {
    fn default() -> Self {
        BoundingVolume {
            min: [f64::MAX, f64::MAX, f64::MAX],
            max: [f64::MIN, f64::MIN, f64::MIN],
        }
    }
}

impl BoundingVolume {
    pub fn expand(&mut self, point: &Point) {
        self.max[0] = self.max[0].max(point.x);
        self.max[1] = self.max[1].max(point.y);
        self.max[2] = self.max[2].max(point.z);
        self.min[0] = self.min[0].min(point.x);
        self.min[1] = self.min[1].min(point.y);
        self.min[2] = self.min[2].min(point.z);
    }

    pub fn merge(&mut self, other: &BoundingVolume) {
        for i in 0..3 {
            self.max[i] = self.max[i].max(other.max[i]);
            self.min[i] = self.min[i].min(other.min[i]);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub point_count: usize,
    pub bounding_volume: BoundingVolume,
}

#[derive(Debug, Clone)]
pub struct PointCloud {
    pub points: Vec<Point>,
    pub metadata: Metadata,
}

impl PointCloud {
    pub fn new(points: Vec<Point>) -> Self {
        let mut bounding_volume = BoundingVolume::default();
        for point in &points {
            bounding_volume.expand(point);
        }

        let metadata = Metadata {
            point_count: points.len(),
            bounding_volume,
        };

        PointCloud { points, metadata }
    }

    pub fn empty() -> Self {
        PointCloud::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_volume_covers_all_points() {
        let cloud = PointCloud::new(vec![
            Point::new(-1.0, 2.0, 0.5),
            Point::new(3.0, -4.0, 0.0),
            Point::new(0.0, 0.0, 7.0),
        ]);

        assert_eq!(cloud.metadata.point_count, 3);
        assert_eq!(cloud.metadata.bounding_volume.min, [-1.0, -4.0, 0.0]);
        assert_eq!(cloud.metadata.bounding_volume.max, [3.0, 2.0, 7.0]);
    }

    #[test]
    fn empty_cloud_has_zero_count() {
        let cloud = PointCloud::empty();
        assert!(cloud.is_empty());
        assert_eq!(cloud.metadata.point_count, 0);
    }
}

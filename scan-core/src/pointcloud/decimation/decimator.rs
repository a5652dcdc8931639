use std::collections::HashMap;

use crate::error::Error;
use crate::pointcloud::point::Point;

pub trait PointCloudDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point>;
}

/// Voxel-grid decimator: buckets points into cubic cells of edge
/// `cell_size` and keeps one centroid per non-empty cell.
pub struct VoxelGridDecimator {
    cell_size: f64,
}

impl VoxelGridDecimator {
    pub fn new(cell_size: f64) -> Result<Self, Error> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::invalid_parameter(
                "cell_size",
                format!("must be finite and > 0, got {}", cell_size),
            ));
        }
        Ok(VoxelGridDecimator { cell_size })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_index(&self, point: &Point) -> (i64, i64, i64) {
        (
            (point.x / self.cell_size).floor() as i64,
            (point.y / self.cell_size).floor() as i64,
            (point.z / self.cell_size).floor() as i64,
        )
    }
}

#[derive(Default)]
struct CellAccumulator {
    sum_x: f64,
    sum_y: f64,
    sum_z: f64,
    count: usize,
}

impl CellAccumulator {
    fn push(&mut self, point: &Point) {
        self.sum_x += point.x;
        self.sum_y += point.y;
        self.sum_z += point.z;
        self.count += 1;
    }

    fn centroid(&self) -> Point {
        let n = self.count as f64;
        Point::new(self.sum_x / n, self.sum_y / n, self.sum_z / n)
    }
}

impl PointCloudDecimator for VoxelGridDecimator {
    fn decimate(&self, points: &[Point]) -> Vec<Point> {
        let mut cells: HashMap<(i64, i64, i64), CellAccumulator> = HashMap::new();

        for point in points {
            cells.entry(self.cell_index(point)).or_default().push(point);
        }

        // Emit in cell-key order so repeated runs produce identical files.
        // Consumers must still treat the ordering as unspecified.
        let mut keys: Vec<(i64, i64, i64)> = cells.keys().copied().collect();
        keys.sort_unstable();

        keys.iter().map(|key| cells[key].centroid()).collect()
    }
}

use crate::pointcloud::point::PointCloud;

/// Appends all of `source`'s points after `target`'s existing points,
/// preserving `source`'s internal order. Pure concatenation: any density
/// control must already have happened upstream.
pub fn merge_into(target: &mut PointCloud, source: &PointCloud) {
    target.points.extend_from_slice(&source.points);
    target.metadata.point_count = target.points.len();
    target
        .metadata
        .bounding_volume
        .merge(&source.metadata.bounding_volume);
}

/// Folds `sources` into `base` in the listed order. The merge order is an
/// explicit parameter of the pipeline, not incidental to execution order.
pub fn merge_all(base: PointCloud, sources: &[PointCloud]) -> PointCloud {
    sources.iter().fold(base, |mut acc, source| {
        merge_into(&mut acc, source);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointcloud::point::Point;

    fn cloud(coords: &[(f64, f64, f64)]) -> PointCloud {
        PointCloud::new(coords.iter().map(|&(x, y, z)| Point::new(x, y, z)).collect())
    }

    #[test]
    fn merge_preserves_target_prefix_and_source_order() {
        let mut target = cloud(&[(0.0, 0.0, 0.0), (1.0, 1.0, 1.0)]);
        let source = cloud(&[(2.0, 2.0, 2.0), (3.0, 3.0, 3.0), (4.0, 4.0, 4.0)]);

        merge_into(&mut target, &source);

        assert_eq!(target.len(), 5);
        assert_eq!(target.metadata.point_count, 5);
        assert_eq!(target.points[0], Point::new(0.0, 0.0, 0.0));
        assert_eq!(target.points[1], Point::new(1.0, 1.0, 1.0));
        assert_eq!(target.points[2], Point::new(2.0, 2.0, 2.0));
        assert_eq!(target.points[4], Point::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn sizes_add_across_repeated_merges() {
        let a = cloud(&[(0.0, 0.0, 0.0)]);
        let b = cloud(&[(1.0, 0.0, 0.0), (2.0, 0.0, 0.0)]);
        let c = cloud(&[(3.0, 0.0, 0.0), (4.0, 0.0, 0.0), (5.0, 0.0, 0.0)]);

        let merged = merge_all(a.clone(), &[b.clone(), c.clone()]);
        assert_eq!(merged.len(), a.len() + b.len() + c.len());
    }

    #[test]
    fn merge_is_associative_over_concatenation() {
        let a = cloud(&[(0.0, 0.0, 0.0)]);
        let b = cloud(&[(1.0, 0.0, 0.0)]);
        let c = cloud(&[(2.0, 0.0, 0.0)]);

        let left = merge_all(a.clone(), &[b.clone(), c.clone()]);

        let mut bc = b.clone();
        merge_into(&mut bc, &c);
        let right = merge_all(a, &[bc]);

        assert_eq!(left.points, right.points);
    }

    #[test]
    fn bounding_volume_extends_on_merge() {
        let mut target = cloud(&[(0.0, 0.0, 0.0)]);
        let source = cloud(&[(10.0, -5.0, 2.0)]);
        merge_into(&mut target, &source);

        assert_eq!(target.metadata.bounding_volume.max[0], 10.0);
        assert_eq!(target.metadata.bounding_volume.min[1], -5.0);
    }
}

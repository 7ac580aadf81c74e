use ndarray::prelude::*;

use crate::bounds::{Box3Df, Sphere3Df};
use crate::error::CloudError;

/// Unordered set of 3D points.
#[derive(Clone, Debug)]
pub struct PointCloud {
    /// Positions. Shape is (Nx3).
    pub points: Array2<f32>,
    /// Optional RGB colors. Shape is (Nx3).
    pub colors: Option<Array2<u8>>,
}

impl PointCloud {
    /// Wraps a position array.
    ///
    /// # Arguments
    ///
    /// * `points`: (N x 3) array with the positions.
    pub fn from_points(points: Array2<f32>) -> Result<Self, CloudError> {
        if points.ncols() != 3 {
            return Err(CloudError::invalid_parameter(format!(
                "points must have shape (N, 3), got {:?}",
                points.shape()
            )));
        }
        Ok(Self {
            points,
            colors: None,
        })
    }

    pub fn with_colors(mut self, colors: Array2<u8>) -> Result<Self, CloudError> {
        if colors.shape() != self.points.shape() {
            return Err(CloudError::invalid_parameter(format!(
                "colors shape {:?} does not match points shape {:?}",
                colors.shape(),
                self.points.shape()
            )));
        }
        self.colors = Some(colors);
        Ok(self)
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            points: Array2::<f32>::zeros((len, 3)),
            colors: None,
        }
    }

    /// Sets every point to the same color.
    pub fn paint_uniform_color(&mut self, rgb: [u8; 3]) {
        let mut colors = Array2::<u8>::zeros((self.len(), 3));
        colors.axis_iter_mut(Axis(0)).for_each(|mut color| {
            color.assign(&ndarray::aview1(&rgb));
        });
        self.colors = Some(colors);
    }

    pub fn len(&self) -> usize {
        self.points.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounding_box(&self) -> Box3Df {
        Box3Df::from_points(&self.points.view())
    }

    pub fn bounding_sphere(&self) -> Sphere3Df {
        Sphere3Df::from_points(&self.points.view())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array2};
    use rstest::*;

    use super::PointCloud;
    use crate::error::CloudError;

    #[fixture]
    fn sample_pcl1() -> PointCloud {
        PointCloud::from_points(array![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0]
        ])
        .unwrap()
    }

    #[rstest]
    fn test_point_cloud_len(sample_pcl1: PointCloud) {
        assert_eq!(sample_pcl1.len(), 4);
        assert!(!sample_pcl1.is_empty());
        assert!(sample_pcl1.colors.is_none());
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let result = PointCloud::from_points(Array2::<f32>::zeros((10, 2)));
        assert!(matches!(result, Err(CloudError::InvalidParameter(_))));
    }

    #[rstest]
    fn test_colors_must_match(sample_pcl1: PointCloud) {
        let result = sample_pcl1.clone().with_colors(Array2::<u8>::zeros((3, 3)));
        assert!(matches!(result, Err(CloudError::InvalidParameter(_))));

        let colored = sample_pcl1.with_colors(Array2::<u8>::zeros((4, 3))).unwrap();
        assert_eq!(colored.colors.unwrap().nrows(), 4);
    }

    #[rstest]
    fn test_paint_uniform_color(mut sample_pcl1: PointCloud) {
        sample_pcl1.paint_uniform_color([255, 128, 0]);
        let colors = sample_pcl1.colors.unwrap();
        assert_eq!(colors.nrows(), 4);
        for color in colors.outer_iter() {
            assert_eq!(color.to_vec(), vec![255, 128, 0]);
        }
    }

    #[rstest]
    fn test_bounds(sample_pcl1: PointCloud) {
        let bbox = sample_pcl1.bounding_box();
        assert_eq!(bbox.min, nalgebra::Vector3::zeros());
        assert_eq!(bbox.max, nalgebra::Vector3::repeat(1.0));
        assert!(!sample_pcl1.bounding_sphere().is_empty());
        assert!(PointCloud::zeros(0).bounding_sphere().is_empty());
    }
}

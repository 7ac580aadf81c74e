use nalgebra::{ClosedAdd, ClosedSub, Scalar, Vector3};
use ndarray::{ArrayView2, Axis};
use num::Zero;

/// Axis aligned box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Box3D<T>
where
    T: Scalar + Zero + ClosedAdd + ClosedSub + Copy,
{
    pub min: Vector3<T>,
    pub max: Vector3<T>,
}

impl<T> Box3D<T>
where
    T: Scalar + Zero + ClosedAdd + ClosedSub + Copy + PartialOrd,
{
    pub fn new(min: Vector3<T>, max: Vector3<T>) -> Self {
        Self { min, max }
    }

    pub fn size(&self) -> Vector3<T> {
        self.max - self.min
    }

    /// A box is empty when any of its axis has `min > max`.
    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(self.max.iter()).any(|(lo, hi)| lo > hi)
    }

    /// Whether `point` is inside the box. The max side is exclusive,
    /// matching the `[min, max)` ranges used for sampling.
    pub fn contains(&self, point: &Vector3<T>) -> bool {
        (0..3).all(|i| self.min[i] <= point[i] && point[i] < self.max[i])
    }
}

pub type Box3Df = Box3D<f32>;

impl Box3Df {
    pub fn empty() -> Self {
        Self {
            min: Vector3::repeat(f32::INFINITY),
            max: Vector3::repeat(f32::NEG_INFINITY),
        }
    }

    /// The `[0, 1)` cube.
    pub fn unit() -> Self {
        Self {
            min: Vector3::zeros(),
            max: Vector3::repeat(1.0),
        }
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// Bounds of a (N x 3) point array. Returns an empty box for no points.
    pub fn from_points(points: &ArrayView2<f32>) -> Self {
        points
            .axis_iter(Axis(0))
            .fold(Self::empty(), |mut bounds, point| {
                for i in 0..3 {
                    bounds.min[i] = bounds.min[i].min(point[i]);
                    bounds.max[i] = bounds.max[i].max(point[i]);
                }
                bounds
            })
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;
    use ndarray::array;

    use super::Box3Df;

    #[test]
    fn test_from_points() {
        let points = array![[0.5, 0.1, 0.9], [0.2, 0.7, 0.3], [0.4, 0.4, 0.0]];
        let bounds = Box3Df::from_points(&points.view());
        assert_eq!(bounds.min, Vector3::new(0.2, 0.1, 0.0));
        assert_eq!(bounds.max, Vector3::new(0.5, 0.7, 0.9));
        assert!(!bounds.is_empty());
    }

    #[test]
    fn test_empty() {
        assert!(Box3Df::empty().is_empty());
        assert!(Box3Df::from_points(&ndarray::Array2::<f32>::zeros((0, 3)).view()).is_empty());
        assert!(!Box3Df::unit().is_empty());
    }

    #[test]
    fn test_contains_is_half_open() {
        let unit = Box3Df::unit();
        assert!(unit.contains(&Vector3::new(0.0, 0.0, 0.0)));
        assert!(unit.contains(&Vector3::new(0.999, 0.5, 0.25)));
        assert!(!unit.contains(&Vector3::new(1.0, 0.5, 0.5)));
        assert!(!unit.contains(&Vector3::new(0.5, -0.01, 0.5)));
    }

    #[test]
    fn test_size_and_center() {
        let bounds = Box3Df::new(Vector3::new(-1.0, 0.0, 2.0), Vector3::new(1.0, 1.0, 3.0));
        assert_eq!(bounds.size(), Vector3::new(2.0, 1.0, 1.0));
        assert_eq!(bounds.center(), Vector3::new(0.0, 0.5, 2.5));
    }
}

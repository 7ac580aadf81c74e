use nalgebra::Vector3;
use ndarray::{ArrayView2, Axis};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere3Df {
    pub center: Vector3<f32>,
    pub radius: f32,
}

impl Sphere3Df {
    pub fn empty() -> Self {
        Self {
            center: Vector3::zeros(),
            radius: -1.0,
        }
    }

    /// Sphere centered at the points' centroid enclosing all of them.
    ///
    /// # Arguments
    ///
    /// * `points`: (N x 3) array of positions.
    pub fn from_points(points: &ArrayView2<f32>) -> Self {
        Self::from_point_iter(
            points
                .axis_iter(Axis(0))
                .map(|p| Vector3::new(p[0], p[1], p[2])),
        )
    }

    pub fn from_point_iter<I>(point_iter: I) -> Self
    where
        I: Iterator<Item = Vector3<f32>> + Clone,
    {
        let mut count = 0;
        let sum = point_iter.clone().fold(Vector3::<f64>::zeros(), |sum, p| {
            count += 1;
            sum + nalgebra::convert::<_, Vector3<f64>>(p)
        });
        if count == 0 {
            return Self::empty();
        }

        let center: Vector3<f32> = nalgebra::convert(sum / count as f64);
        let radius = point_iter
            .map(|p| (p - center).norm_squared())
            .fold(0.0f32, f32::max)
            .sqrt();

        Self { center, radius }
    }

    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    /// Smallest sphere along the centers' axis that encloses both spheres.
    pub fn add(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        let axis = other.center - self.center;
        let distance = axis.norm();
        if distance + other.radius <= self.radius {
            return *self;
        }
        if distance + self.radius <= other.radius {
            return *other;
        }

        let radius = (distance + self.radius + other.radius) * 0.5;
        let center = self.center + axis * ((radius - self.radius) / distance);
        Self { center, radius }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use ndarray::array;

    use super::Sphere3Df;

    #[test]
    fn test_from_points_encloses_all() {
        let points = array![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 1.0, 0.0]];
        let sphere = Sphere3Df::from_points(&points.view());

        assert_relative_eq!(sphere.center.x, 1.0);
        assert_relative_eq!(sphere.center.y, 1.0 / 3.0, epsilon = 1e-6);
        for p in points.outer_iter() {
            let p = Vector3::new(p[0], p[1], p[2]);
            assert!((p - sphere.center).norm() <= sphere.radius + 1e-6);
        }
    }

    #[test]
    fn test_empty_input() {
        let points = ndarray::Array2::<f32>::zeros((0, 3));
        assert!(Sphere3Df::from_points(&points.view()).is_empty());
    }

    #[test]
    fn test_add() {
        let a = Sphere3Df {
            center: Vector3::new(0.0, 0.0, 0.0),
            radius: 1.0,
        };
        let b = Sphere3Df {
            center: Vector3::new(4.0, 0.0, 0.0),
            radius: 1.0,
        };
        let union = a.add(&b);
        assert_relative_eq!(union.center.x, 2.0);
        assert_relative_eq!(union.radius, 3.0);

        assert_eq!(Sphere3Df::empty().add(&a), a);
        assert_eq!(a.add(&Sphere3Df::empty()), a);

        let inner = Sphere3Df {
            center: Vector3::new(0.2, 0.0, 0.0),
            radius: 0.5,
        };
        assert_eq!(a.add(&inner), a);
    }
}

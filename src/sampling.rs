use nalgebra::Vector3;
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bounds::Box3Df;
use crate::error::CloudError;
use crate::pointcloud::PointCloud;

pub const DEFAULT_NUM_POINTS: usize = 1000;

/// Largest sample accepted, 1.2 GB of coordinates.
pub const MAX_NUM_POINTS: usize = 100_000_000;

/// Samples points independently and uniformly inside a box.
///
/// Every component lies in the half-open range `[bounds.min, bounds.max)`.
/// Without a seed the samples come from OS entropy and differ on every run.
#[derive(Clone, Debug)]
pub struct UniformSampler {
    pub num_points: usize,
    pub bounds: Box3Df,
    pub seed: Option<u64>,
}

impl Default for UniformSampler {
    fn default() -> Self {
        Self {
            num_points: DEFAULT_NUM_POINTS,
            bounds: Box3Df::unit(),
            seed: None,
        }
    }
}

impl UniformSampler {
    pub fn new(num_points: usize) -> Self {
        Self {
            num_points,
            ..Default::default()
        }
    }

    pub fn bounds(mut self, bounds: Box3Df) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn distributions(&self) -> Result<[Uniform<f32>; 3], CloudError> {
        let (min, max) = (self.bounds.min, self.bounds.max);
        // `Uniform::new` panics when `max - min` overflows.
        if (0..3).any(|i| !(min[i] < max[i] && (max[i] - min[i]).is_finite())) {
            return Err(CloudError::invalid_parameter(format!(
                "sampling bounds must be finite with min < max on every axis, got min={:?} max={:?}",
                min.as_slice(),
                max.as_slice()
            )));
        }
        Ok([
            Uniform::new(min[0], max[0]),
            Uniform::new(min[1], max[1]),
            Uniform::new(min[2], max[2]),
        ])
    }

    /// Draws a (num_points x 3) array using the sampler's seed, or OS entropy if unset.
    pub fn sample(&self) -> Result<Array2<f32>, CloudError> {
        match self.seed {
            Some(seed) => self.sample_using(&mut StdRng::seed_from_u64(seed)),
            None => self.sample_using(&mut rand::thread_rng()),
        }
    }

    pub fn sample_using<R>(&self, rng: &mut R) -> Result<Array2<f32>, CloudError>
    where
        R: Rng + ?Sized,
    {
        if self.num_points > MAX_NUM_POINTS {
            return Err(CloudError::invalid_parameter(format!(
                "cannot sample {} points, the limit is {}",
                self.num_points, MAX_NUM_POINTS
            )));
        }
        let distributions = self.distributions()?;
        let mut points = Array2::<f32>::zeros((self.num_points, 3));
        for (mut column, distribution) in points.axis_iter_mut(Axis(1)).zip(distributions) {
            column.assign(&Array1::random_using(self.num_points, distribution, &mut *rng));
        }
        Ok(points)
    }

    pub fn sample_point_cloud(&self) -> Result<PointCloud, CloudError> {
        let points = self.sample()?;
        log::info!(
            "Sampled {} points in [{:?}, {:?})",
            points.nrows(),
            self.bounds.min.as_slice(),
            self.bounds.max.as_slice()
        );
        PointCloud::from_points(points)
    }
}

/// `num_points` random points in the unit cube.
pub fn random_point_cloud(num_points: usize) -> Result<PointCloud, CloudError> {
    UniformSampler::new(num_points).sample_point_cloud()
}

/// Convenience for a cube spanning `[min, max)` on all axes.
pub fn cube_bounds(min: f32, max: f32) -> Box3Df {
    Box3Df::new(Vector3::repeat(min), Vector3::repeat(max))
}

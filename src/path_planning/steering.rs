//! Steering models for the RRT planner
//!
//! `EuclideanSteering` moves a point robot along straight lines.
//! `DubinsSteering` moves a forward-only car with a minimum turning radius
//! along shortest curvature-constrained paths supplied by a `CurvatureOracle`.

use std::f64::consts::PI;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::common::{
    Configuration, CurvatureOracle, LineSegment, Obstacles, Point2D, Pose2D, RoboticsError,
    RoboticsResult, SteeringModel,
};
use crate::path_planning::collision::{polyline_is_free, segment_is_free};
use crate::path_planning::dubins_path::DubinsCurves;

macro_rules! debug_assert_dimension {
    ($model:expr, $($q:expr),+) => {
        $(debug_assert_eq!(
            $q.len(),
            $model.dimension(),
            "configuration has the wrong number of components"
        );)+
    };
}

/// Straight-line steering for a 2D point robot
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanSteering;

impl EuclideanSteering {
    pub fn new() -> Self {
        EuclideanSteering
    }
}

impl SteeringModel for EuclideanSteering {
    fn dimension(&self) -> usize {
        2
    }

    fn distance(&self, x1: &Configuration, x2: &Configuration) -> f64 {
        debug_assert_dimension!(self, x1, x2);
        (x1 - x2).norm()
    }

    fn steer_towards(&self, x: &Configuration, y: &Configuration, eps: f64) -> Configuration {
        debug_assert_dimension!(self, x, y);
        if self.distance(x, y) < eps {
            return y.clone();
        }
        let theta = (y[1] - x[1]).atan2(y[0] - x[0]);
        DVector::from_vec(vec![x[0] + eps * theta.cos(), x[1] + eps * theta.sin()])
    }

    fn is_free_motion(&self, obstacles: &Obstacles, x1: &Configuration, x2: &Configuration) -> bool {
        debug_assert_dimension!(self, x1, x2);
        let motion = LineSegment::new(
            Point2D::from_configuration(x1),
            Point2D::from_configuration(x2),
        );
        segment_is_free(&motion, obstacles)
    }

    fn trajectory(&self, x1: &Configuration, x2: &Configuration) -> Vec<Configuration> {
        vec![x1.clone(), x2.clone()]
    }
}

/// Configuration for Dubins steering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DubinsConfig {
    /// Minimum turning radius of the car
    pub turning_radius: f64,
    /// Angular step for collision sampling, scaled by the turning radius
    pub collision_resolution: f64,
    /// Angular step for trajectories handed to renderers
    pub render_resolution: f64,
    /// Radius inflation used when steering a bounded step. Sampling at exactly
    /// the kinematic limit can miss the point at arc length eps by rounding.
    pub steer_radius_factor: f64,
}

impl Default for DubinsConfig {
    fn default() -> Self {
        Self {
            turning_radius: 0.5,
            collision_resolution: PI / 6.0,
            render_resolution: PI / 24.0,
            steer_radius_factor: 1.001,
        }
    }
}

impl DubinsConfig {
    pub fn with_turning_radius(turning_radius: f64) -> Self {
        Self {
            turning_radius,
            ..Default::default()
        }
    }

    fn validate(&self) -> RoboticsResult<()> {
        if !(self.turning_radius > 0.0) || !self.turning_radius.is_finite() {
            return Err(RoboticsError::InvalidParameter(format!(
                "turning_radius must be positive and finite, got {}",
                self.turning_radius
            )));
        }
        if !(self.collision_resolution > 0.0) || !(self.render_resolution > 0.0) {
            return Err(RoboticsError::InvalidParameter(
                "sampling resolutions must be positive".to_string(),
            ));
        }
        if !(self.steer_radius_factor >= 1.0) {
            return Err(RoboticsError::InvalidParameter(format!(
                "steer_radius_factor must be at least 1, got {}",
                self.steer_radius_factor
            )));
        }
        Ok(())
    }
}

/// Curvature-constrained steering for a car with configurations (x, y, yaw)
#[derive(Debug, Clone)]
pub struct DubinsSteering<O = DubinsCurves> {
    config: DubinsConfig,
    oracle: O,
}

impl DubinsSteering<DubinsCurves> {
    pub fn new(turning_radius: f64) -> RoboticsResult<Self> {
        Self::with_config(DubinsConfig::with_turning_radius(turning_radius))
    }

    pub fn with_config(config: DubinsConfig) -> RoboticsResult<Self> {
        Self::with_oracle(config, DubinsCurves)
    }
}

impl<O: CurvatureOracle> DubinsSteering<O> {
    pub fn with_oracle(config: DubinsConfig, oracle: O) -> RoboticsResult<Self> {
        config.validate()?;
        Ok(DubinsSteering { config, oracle })
    }

    pub fn config(&self) -> &DubinsConfig {
        &self.config
    }

    pub fn turning_radius(&self) -> f64 {
        self.config.turning_radius
    }

    /// Waypoints from x1 to x2 at the given angular resolution, x2 appended
    fn sampled_motion(&self, x1: &Configuration, x2: &Configuration, resolution: f64) -> Vec<Pose2D> {
        let r = self.config.turning_radius;
        let to = Pose2D::from_configuration(x2);
        let mut poses = self
            .oracle
            .path_sample(&Pose2D::from_configuration(x1), &to, r, r * resolution);
        poses.push(to);
        poses
    }
}

impl<O: CurvatureOracle> SteeringModel for DubinsSteering<O> {
    fn dimension(&self) -> usize {
        3
    }

    fn distance(&self, x1: &Configuration, x2: &Configuration) -> f64 {
        debug_assert_dimension!(self, x1, x2);
        self.oracle.path_length(
            &Pose2D::from_configuration(x1),
            &Pose2D::from_configuration(x2),
            self.config.turning_radius,
        )
    }

    fn steer_towards(&self, x: &Configuration, y: &Configuration, eps: f64) -> Configuration {
        debug_assert_dimension!(self, x, y);
        if self.distance(x, y) < eps {
            return y.clone();
        }
        let radius = self.config.turning_radius * self.config.steer_radius_factor;
        let samples = self.oracle.path_sample(
            &Pose2D::from_configuration(x),
            &Pose2D::from_configuration(y),
            radius,
            eps,
        );
        // samples[0] is x itself; the next one sits at arc length eps
        match samples.get(1) {
            Some(pose) => pose.to_configuration(),
            None => y.clone(),
        }
    }

    fn is_free_motion(&self, obstacles: &Obstacles, x1: &Configuration, x2: &Configuration) -> bool {
        debug_assert_dimension!(self, x1, x2);
        let points: Vec<Point2D> = self
            .sampled_motion(x1, x2, self.config.collision_resolution)
            .iter()
            .map(Pose2D::position)
            .collect();
        polyline_is_free(&points, obstacles)
    }

    fn trajectory(&self, x1: &Configuration, x2: &Configuration) -> Vec<Configuration> {
        self.sampled_motion(x1, x2, self.config.render_resolution)
            .iter()
            .map(Pose2D::to_configuration)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn q2(x: f64, y: f64) -> Configuration {
        DVector::from_vec(vec![x, y])
    }

    fn q3(x: f64, y: f64, yaw: f64) -> Configuration {
        DVector::from_vec(vec![x, y, yaw])
    }

    fn wall(x1: f64, y1: f64, x2: f64, y2: f64) -> Obstacles {
        Obstacles::from_segments(vec![LineSegment::from(((x1, y1), (x2, y2)))])
    }

    #[test]
    fn test_euclidean_distance_is_symmetric() {
        let s = EuclideanSteering::new();
        let a = q2(0.0, 0.0);
        let b = q2(3.0, 4.0);
        assert_relative_eq!(s.distance(&a, &b), 5.0);
        assert_eq!(s.distance(&a, &b), s.distance(&b, &a));
    }

    #[test]
    fn test_euclidean_steer_within_eps_returns_target() {
        let s = EuclideanSteering::new();
        let y = q2(1.0, 1.0);
        assert_eq!(s.steer_towards(&q2(0.0, 0.0), &y, 2.0), y);
    }

    #[test]
    fn test_euclidean_steer_bounded_step() {
        let s = EuclideanSteering::new();
        let x = q2(0.0, 0.0);
        let x_new = s.steer_towards(&x, &q2(10.0, 0.0), 1.5);
        assert_relative_eq!(x_new[0], 1.5, epsilon = 1e-12);
        assert_relative_eq!(x_new[1], 0.0, epsilon = 1e-12);

        let x_new = s.steer_towards(&x, &q2(-3.0, -4.0), 1.0);
        assert_relative_eq!(s.distance(&x, &x_new), 1.0, epsilon = 1e-12);
        assert_relative_eq!(x_new[0], -0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_euclidean_steer_coincident() {
        let s = EuclideanSteering::new();
        let x = q2(2.0, 2.0);
        let x_new = s.steer_towards(&x, &x, 0.5);
        assert_eq!(x_new, x);
        assert!(x_new.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_euclidean_free_motion() {
        let s = EuclideanSteering::new();
        let obstacles = wall(0.0, 1.0, 1.0, 0.0);
        assert!(!s.is_free_motion(&obstacles, &q2(0.0, 0.0), &q2(1.0, 1.0)));
        assert!(s.is_free_motion(&obstacles, &q2(0.0, 0.0), &q2(0.2, 0.2)));
        assert!(s.is_free_motion(&Obstacles::new(), &q2(0.0, 0.0), &q2(1.0, 1.0)));
    }

    #[test]
    fn test_dubins_rejects_bad_radius() {
        assert!(matches!(
            DubinsSteering::new(0.0),
            Err(RoboticsError::InvalidParameter(_))
        ));
        assert!(DubinsSteering::new(f64::NAN).is_err());
        let config = DubinsConfig {
            steer_radius_factor: 0.9,
            ..Default::default()
        };
        assert!(DubinsSteering::with_config(config).is_err());
    }

    #[test]
    fn test_dubins_distance_is_asymmetric() {
        let s = DubinsSteering::new(1.0).unwrap();
        let a = q3(0.0, 0.0, 0.0);
        let b = q3(1.0, 0.0, 0.0);
        assert_relative_eq!(s.distance(&a, &b), 1.0, epsilon = 1e-9);
        assert!(s.distance(&b, &a) > 1.0 + 1e-3);
    }

    #[test]
    fn test_dubins_distance_dominates_euclidean() {
        let mut rng = ChaChaRng::seed_from_u64(42);
        for _ in 0..200 {
            let r = rng.gen_range(0.1..3.0);
            let s = DubinsSteering::new(r).unwrap();
            let a = q3(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(0.0..2.0 * PI));
            let b = q3(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(0.0..2.0 * PI));
            let euclid = Point2D::from_configuration(&a).distance(&Point2D::from_configuration(&b));
            assert!(s.distance(&a, &b) >= euclid - 1e-9);
        }
    }

    #[test]
    fn test_dubins_steer_turn_around_in_place() {
        let r = 0.5;
        let eps = 0.3;
        let s = DubinsSteering::new(r).unwrap();
        let x = q3(1.0, 1.0, 0.0);
        let y = q3(1.0, 1.0, PI);

        let x_new = s.steer_towards(&x, &y, eps);
        assert_eq!(x_new.len(), 3);
        assert!(x_new.iter().all(|v| v.is_finite()));
        assert_ne!(x_new, y);
        assert!(s.distance(&x, &x_new) <= eps + 1e-6);
        let moved = Point2D::from_configuration(&x).distance(&Point2D::from_configuration(&x_new));
        assert!(moved <= eps + 1e-9);
        assert!(moved > 0.0);
    }

    #[test]
    fn test_dubins_steer_within_eps_returns_target() {
        let s = DubinsSteering::new(1.0).unwrap();
        let y = q3(0.5, 0.0, 0.0);
        assert_eq!(s.steer_towards(&q3(0.0, 0.0, 0.0), &y, 1.0), y);
    }

    #[test]
    fn test_dubins_steer_straight_ahead() {
        let s = DubinsSteering::new(1.0).unwrap();
        let x_new = s.steer_towards(&q3(0.0, 0.0, 0.0), &q3(5.0, 0.0, 0.0), 2.0);
        assert_relative_eq!(x_new[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(x_new[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dubins_free_motion() {
        let s = DubinsSteering::new(0.5).unwrap();
        let obstacles = wall(2.0, -1.0, 2.0, 1.0);
        assert!(!s.is_free_motion(&obstacles, &q3(0.0, 0.0, 0.0), &q3(4.0, 0.0, 0.0)));
        assert!(s.is_free_motion(&obstacles, &q3(0.0, 0.0, 0.0), &q3(1.5, 0.0, 0.0)));
        // endpoint is appended, so touching the wall at the goal is a collision
        assert!(!s.is_free_motion(&obstacles, &q3(0.0, 0.0, 0.0), &q3(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_dubins_trajectory_endpoints() {
        let s = DubinsSteering::new(0.5).unwrap();
        let x1 = q3(0.0, 0.0, 0.0);
        let x2 = q3(2.0, 2.0, PI / 2.0);
        let traj = s.trajectory(&x1, &x2);
        assert!(traj.len() > 2);
        assert_relative_eq!(traj[0][0], 0.0, epsilon = 1e-12);
        assert_eq!(traj.last(), Some(&x2));
    }

    #[test]
    #[should_panic(expected = "wrong number of components")]
    #[cfg(debug_assertions)]
    fn test_euclidean_rejects_wrong_dimension() {
        EuclideanSteering::new().distance(&q2(0.0, 0.0), &q3(1.0, 0.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "wrong number of components")]
    #[cfg(debug_assertions)]
    fn test_dubins_rejects_wrong_dimension() {
        let s = DubinsSteering::new(1.0).unwrap();
        s.steer_towards(&q2(0.0, 0.0), &q3(1.0, 0.0, 0.0), 0.5);
    }

    /// Straight-line oracle that ignores headings
    struct LineOracle;

    impl CurvatureOracle for LineOracle {
        fn path_length(&self, from: &Pose2D, to: &Pose2D, _r: f64) -> f64 {
            from.position().distance(&to.position())
        }

        fn path_sample(&self, from: &Pose2D, to: &Pose2D, _r: f64, step: f64) -> Vec<Pose2D> {
            let length = self.path_length(from, to, 0.0);
            let yaw = (to.y - from.y).atan2(to.x - from.x);
            let mut poses = Vec::new();
            let mut s = 0.0;
            while s < length {
                poses.push(Pose2D::new(from.x + s * yaw.cos(), from.y + s * yaw.sin(), yaw));
                s += step;
            }
            poses
        }
    }

    #[test]
    fn test_custom_oracle() {
        let s = DubinsSteering::with_oracle(DubinsConfig::with_turning_radius(1.0), LineOracle).unwrap();
        let a = q3(0.0, 0.0, 0.0);
        let b = q3(0.0, 3.0, 0.0);
        assert_relative_eq!(s.distance(&a, &b), 3.0);
        let x_new = s.steer_towards(&a, &b, 1.0);
        assert_relative_eq!(x_new[1], 1.0, epsilon = 1e-12);
    }
}

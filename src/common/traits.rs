//! Common traits defining interfaces for sampling-based planning

use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::common::types::*;

/// Shortest curvature-constrained paths between two poses.
///
/// Any conforming generator can be plugged into `DubinsSteering`.
pub trait CurvatureOracle {
    /// Length of the shortest path from `from` to `to` at the given turning radius
    fn path_length(&self, from: &Pose2D, to: &Pose2D, turning_radius: f64) -> f64;

    /// Waypoints along the shortest path, spaced `step_size` apart in arc length.
    ///
    /// Sampling starts at `from` and stops at or just before `to`; callers
    /// append `to` themselves when the exact endpoint is needed.
    fn path_sample(
        &self,
        from: &Pose2D,
        to: &Pose2D,
        turning_radius: f64,
        step_size: f64,
    ) -> Vec<Pose2D>;
}

/// Kinematic rule set used by the RRT planner: distance metric, nearest
/// neighbour, bounded steering and collision-checked motion.
///
/// `distance` need not be symmetric, so argument order matters everywhere:
/// the first argument is where the motion starts.
///
/// Every configuration passed in must have exactly `dimension()` components.
/// Implementations index components directly and may panic otherwise;
/// `RRTPlanner` checks the problem dimension once before solving.
pub trait SteeringModel {
    /// Number of components in a configuration for this model
    fn dimension(&self) -> usize;

    /// Steering cost from `x1` to `x2`
    fn distance(&self, x1: &Configuration, x2: &Configuration) -> f64;

    /// Index of the node with the smallest steering cost to `x`.
    ///
    /// Ties go to the smallest index. Returns `None` for an empty slice.
    fn find_nearest(&self, nodes: &[Configuration], x: &Configuration) -> Option<usize> {
        nodes
            .iter()
            .map(|v| OrderedFloat(self.distance(v, x)))
            .position_min()
    }

    /// `y` itself if it is closer than `eps`, otherwise the configuration
    /// reached after travelling exactly `eps` from `x` towards `y`.
    fn steer_towards(&self, x: &Configuration, y: &Configuration, eps: f64) -> Configuration;

    /// Whether the connecting motion from `x1` to `x2` avoids every wall
    fn is_free_motion(&self, obstacles: &Obstacles, x1: &Configuration, x2: &Configuration)
        -> bool;

    /// Densely sampled motion from `x1` to `x2`, both endpoints included.
    fn trajectory(&self, x1: &Configuration, x2: &Configuration) -> Vec<Configuration>;
}

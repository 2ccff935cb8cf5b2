//! RustRRT - sampling-based motion planning with pluggable steering
//!
//! This crate grows a Rapidly-exploring Random Tree between two
//! configurations among line-segment walls, for a straight-line point robot
//! or a curvature-limited (Dubins) car.

// Core modules
pub mod common;

// Algorithm modules
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Configuration, LineSegment, Obstacles, Point2D, Pose2D};
pub use common::{CurvatureOracle, SteeringModel};
pub use common::{RoboticsError, RoboticsResult};
pub use path_planning::{
    DubinsConfig, DubinsCurves, DubinsSteering, EuclideanSteering, PlanningProblem, RRTConfig,
    RRTPlanner, RRTSolution, RRTTree,
};

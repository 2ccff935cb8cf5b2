//! Error types for rust_rrt

use thiserror::Error;

/// Main error type for planner construction and parameter validation.
///
/// Failing to find a path is not an error; see `RRTSolution::success`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoboticsError {
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// State-space bounds, init, goal or steering model disagree on dimension
    #[error("Dimension mismatch: {what} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Obstacle that is not a proper 2-point segment
    #[error("Malformed obstacle: {0}")]
    MalformedObstacle(String),
}

/// Result type alias for robotics operations
pub type RoboticsResult<T> = Result<T, RoboticsError>;

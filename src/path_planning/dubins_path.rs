// Dubins curvature oracle
//
// Shortest forward-only paths with a bounded turning radius, computed by the
// `dubins_paths` crate and exposed through `CurvatureOracle`.

use std::f64::consts::PI;

use dubins_paths::{DubinsPath, FloatType, PosRot};

use crate::common::{CurvatureOracle, Pose2D};

/// Wrap an angle to [0, 2pi)
pub fn mod2pi(theta: f64) -> f64 {
    let v = theta.rem_euclid(2.0 * PI);
    if v >= 2.0 * PI {
        0.0
    } else {
        v
    }
}

fn to_posrot(pose: &Pose2D) -> PosRot {
    [pose.x as FloatType, pose.y as FloatType, pose.yaw as FloatType].into()
}

fn from_posrot(q: &PosRot) -> Pose2D {
    Pose2D::new(q.x() as f64, q.y() as f64, mod2pi(q.rot() as f64))
}

fn is_coincident(from: &Pose2D, to: &Pose2D) -> bool {
    from.x == to.x && from.y == to.y && mod2pi(from.yaw - to.yaw) == 0.0
}

/// `CurvatureOracle` backed by `dubins_paths`.
///
/// Coincident poses give a zero-length path with no samples. A bad radius or
/// a query the solver rejects gives an infinite length and no samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct DubinsCurves;

impl DubinsCurves {
    fn shortest(&self, from: &Pose2D, to: &Pose2D, turning_radius: f64) -> Option<DubinsPath> {
        if !(turning_radius > 0.0) || !turning_radius.is_finite() {
            return None;
        }
        DubinsPath::shortest_from(to_posrot(from), to_posrot(to), turning_radius as FloatType).ok()
    }
}

impl CurvatureOracle for DubinsCurves {
    fn path_length(&self, from: &Pose2D, to: &Pose2D, turning_radius: f64) -> f64 {
        if turning_radius > 0.0 && is_coincident(from, to) {
            return 0.0;
        }
        self.shortest(from, to, turning_radius)
            .map(|path| path.length() as f64)
            .unwrap_or(f64::INFINITY)
    }

    /// Poses at arc lengths 0, step, 2*step, ... strictly below the path length
    fn path_sample(
        &self,
        from: &Pose2D,
        to: &Pose2D,
        turning_radius: f64,
        step_size: f64,
    ) -> Vec<Pose2D> {
        if is_coincident(from, to) {
            return Vec::new();
        }
        let path = match self.shortest(from, to, turning_radius) {
            Some(path) => path,
            None => return Vec::new(),
        };
        if !(step_size > 0.0) {
            return vec![from_posrot(&path.sample(0.0))];
        }

        let length = path.length() as f64;
        let mut poses = Vec::with_capacity((length / step_size).ceil() as usize + 1);
        let mut s = 0.0;
        while s < length {
            poses.push(from_posrot(&path.sample(s as FloatType)));
            s += step_size;
        }
        poses
    }
}

//! RRT (Rapidly-exploring Random Tree) path planning algorithm
//!
//! Sampling-based planner that grows a tree from the initial configuration
//! by repeatedly sampling the state space, steering the nearest node a
//! bounded distance towards the sample, and keeping the new node only if the
//! connecting motion is collision free. Distance, steering and collision
//! checking all come from a `SteeringModel`, so the same loop serves both the
//! point robot and the Dubins car.
//!
//! The goal counts as reached only when a newly added node is exactly equal
//! to the goal configuration. This happens when the goal was sampled and
//! steering returned it verbatim because it was within `eps`.

use std::convert::TryFrom;

use log::{debug, info, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::common::{Configuration, Obstacles, RoboticsError, RoboticsResult, SteeringModel};

/// Configuration for RRT planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RRTConfig {
    /// Maximum steering distance per extension
    pub eps: f64,
    /// Maximum iterations, also the node capacity of the tree
    pub max_iters: usize,
    /// Probability of sampling the goal instead of a uniform state
    pub goal_bias: f64,
}

impl Default for RRTConfig {
    fn default() -> Self {
        Self {
            eps: 1.0,
            max_iters: 1000,
            goal_bias: 0.05,
        }
    }
}

impl RRTConfig {
    pub fn new(eps: f64, max_iters: usize, goal_bias: f64) -> Self {
        Self {
            eps,
            max_iters,
            goal_bias,
        }
    }

    fn validate(&self) -> RoboticsResult<()> {
        if !(self.eps > 0.0) || !self.eps.is_finite() {
            return Err(RoboticsError::InvalidParameter(format!(
                "eps must be positive and finite, got {}",
                self.eps
            )));
        }
        if self.max_iters == 0 {
            return Err(RoboticsError::InvalidParameter(
                "max_iters must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.goal_bias) {
            return Err(RoboticsError::InvalidParameter(format!(
                "goal_bias must lie in [0, 1], got {}",
                self.goal_bias
            )));
        }
        Ok(())
    }
}

/// Fixed-capacity tree of configurations linked by parent indices.
///
/// Node 0 is the root and has no parent; every other node's parent has a
/// smaller index, so walking parents always terminates at the root.
/// Deserialization checks the same invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct RRTTree {
    nodes: Vec<Configuration>,
    parents: Vec<Option<usize>>,
    capacity: usize,
}

impl RRTTree {
    /// Tree holding only `root`, with room for `capacity` nodes in total
    pub fn new(root: Configuration, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut nodes = Vec::with_capacity(capacity);
        let mut parents = Vec::with_capacity(capacity);
        nodes.push(root);
        parents.push(None);
        RRTTree {
            nodes,
            parents,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree holds at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= self.capacity
    }

    pub fn root(&self) -> &Configuration {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> &[Configuration] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&Configuration> {
        self.nodes.get(index)
    }

    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    /// Parent of `index`; `None` for the root or an index past the end
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    /// Parent table with -1 marking the root
    pub fn parent_indices(&self) -> Vec<i64> {
        self.parents
            .iter()
            .map(|p| p.map_or(-1, |i| i as i64))
            .collect()
    }

    /// (parent, child) index pairs, one per non-root node
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter_map(|(child, parent)| parent.map(|p| (p, child)))
    }

    /// Append `node` under `parent`. Refused when full or when `parent`
    /// does not exist yet.
    fn push(&mut self, node: Configuration, parent: usize) -> Option<usize> {
        if self.is_full() || parent >= self.nodes.len() {
            return None;
        }
        self.nodes.push(node);
        self.parents.push(Some(parent));
        Some(self.nodes.len() - 1)
    }

    /// Configurations from the root down to `index`
    pub fn path_to_root(&self, index: usize) -> Vec<Configuration> {
        let mut path = Vec::new();
        let mut node_index = if index < self.nodes.len() { Some(index) } else { None };

        while let Some(i) = node_index {
            path.push(self.nodes[i].clone());
            node_index = self.parents[i];
        }

        path.reverse();
        path
    }
}

#[derive(Deserialize)]
struct RawTree {
    nodes: Vec<Configuration>,
    parents: Vec<Option<usize>>,
    capacity: usize,
}

impl TryFrom<RawTree> for RRTTree {
    type Error = RoboticsError;

    fn try_from(raw: RawTree) -> RoboticsResult<Self> {
        if raw.parents.len() != raw.nodes.len() {
            return Err(RoboticsError::DimensionMismatch {
                what: "tree parents".to_string(),
                expected: raw.nodes.len(),
                actual: raw.parents.len(),
            });
        }
        if raw.nodes.is_empty() || raw.parents[0].is_some() {
            return Err(RoboticsError::InvalidParameter(
                "tree must start with a root without parent".to_string(),
            ));
        }
        if raw.nodes.len() > raw.capacity {
            return Err(RoboticsError::InvalidParameter(format!(
                "tree holds {} nodes but capacity is {}",
                raw.nodes.len(),
                raw.capacity
            )));
        }
        let dim = raw.nodes[0].len();
        if let Some(node) = raw.nodes.iter().find(|n| n.len() != dim) {
            return Err(RoboticsError::DimensionMismatch {
                what: "tree node".to_string(),
                expected: dim,
                actual: node.len(),
            });
        }
        for (i, parent) in raw.parents.iter().enumerate().skip(1) {
            match parent {
                Some(p) if *p < i => {}
                _ => {
                    return Err(RoboticsError::InvalidParameter(format!(
                        "node {} has parent {:?}, expected an earlier node",
                        i, parent
                    )))
                }
            }
        }

        Ok(RRTTree {
            nodes: raw.nodes,
            parents: raw.parents,
            capacity: raw.capacity,
        })
    }
}

/// Outcome of one `solve` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RRTSolution {
    /// Whether a node equal to the goal was added
    pub success: bool,
    pub tree: RRTTree,
    /// Root-to-goal configurations, present only on success
    pub path: Option<Vec<Configuration>>,
    /// Iterations actually run
    pub iterations: usize,
}

impl RRTSolution {
    /// Densified solution path for rendering, or `None` without a solution
    pub fn path_trajectory<S: SteeringModel>(&self, steering: &S) -> Option<Vec<Configuration>> {
        let path = self.path.as_ref()?;
        let mut trajectory: Vec<Configuration> = path.iter().take(1).cloned().collect();
        for w in path.windows(2) {
            trajectory.extend(steering.trajectory(&w[0], &w[1]).into_iter().skip(1));
        }
        Some(trajectory)
    }

    /// Densified motion of every tree edge, in node order
    pub fn tree_trajectories<S: SteeringModel>(&self, steering: &S) -> Vec<Vec<Configuration>> {
        self.tree
            .edges()
            .map(|(parent, child)| {
                steering.trajectory(&self.tree.nodes()[parent], &self.tree.nodes()[child])
            })
            .collect()
    }
}

/// A single-query planning problem: state-space box, endpoints and walls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProblem")]
pub struct PlanningProblem {
    statespace_lo: Configuration,
    statespace_hi: Configuration,
    x_init: Configuration,
    x_goal: Configuration,
    obstacles: Obstacles,
}

impl PlanningProblem {
    pub fn new(
        statespace_lo: Configuration,
        statespace_hi: Configuration,
        x_init: Configuration,
        x_goal: Configuration,
        obstacles: Obstacles,
    ) -> RoboticsResult<Self> {
        let dim = statespace_lo.len();
        if dim == 0 {
            return Err(RoboticsError::InvalidParameter(
                "state space must have at least one dimension".to_string(),
            ));
        }
        for (what, q) in &[
            ("statespace_hi", &statespace_hi),
            ("x_init", &x_init),
            ("x_goal", &x_goal),
        ] {
            if q.len() != dim {
                return Err(RoboticsError::DimensionMismatch {
                    what: what.to_string(),
                    expected: dim,
                    actual: q.len(),
                });
            }
            if q.iter().any(|v| !v.is_finite()) {
                return Err(RoboticsError::InvalidParameter(format!(
                    "{} has non-finite components",
                    what
                )));
            }
        }
        for (i, (lo, hi)) in statespace_lo.iter().zip(statespace_hi.iter()).enumerate() {
            if !lo.is_finite() || !(lo <= hi) || !(hi - lo).is_finite() {
                return Err(RoboticsError::InvalidParameter(format!(
                    "bad bounds for dimension {}: [{}, {}]",
                    i, lo, hi
                )));
            }
        }

        Ok(PlanningProblem {
            statespace_lo,
            statespace_hi,
            x_init,
            x_goal,
            obstacles,
        })
    }

    pub fn dimension(&self) -> usize {
        self.statespace_lo.len()
    }

    pub fn statespace_lo(&self) -> &Configuration {
        &self.statespace_lo
    }

    pub fn statespace_hi(&self) -> &Configuration {
        &self.statespace_hi
    }

    pub fn x_init(&self) -> &Configuration {
        &self.x_init
    }

    pub fn x_goal(&self) -> &Configuration {
        &self.x_goal
    }

    pub fn obstacles(&self) -> &Obstacles {
        &self.obstacles
    }
}

#[derive(Deserialize)]
struct RawProblem {
    statespace_lo: Configuration,
    statespace_hi: Configuration,
    x_init: Configuration,
    x_goal: Configuration,
    obstacles: Obstacles,
}

impl TryFrom<RawProblem> for PlanningProblem {
    type Error = RoboticsError;

    fn try_from(raw: RawProblem) -> RoboticsResult<Self> {
        PlanningProblem::new(
            raw.statespace_lo,
            raw.statespace_hi,
            raw.x_init,
            raw.x_goal,
            raw.obstacles,
        )
    }
}

/// RRT path planner
pub struct RRTPlanner<S, R = ChaChaRng> {
    problem: PlanningProblem,
    steering: S,
    rng: R,
    samplers: Vec<Uniform<f64>>,
}

impl<S: SteeringModel> RRTPlanner<S, ChaChaRng> {
    /// Planner with an entropy-seeded generator
    pub fn new(problem: PlanningProblem, steering: S) -> RoboticsResult<Self> {
        Self::with_rng(problem, steering, ChaChaRng::from_entropy())
    }

    /// Planner whose runs are reproducible for a given seed
    pub fn with_seed(problem: PlanningProblem, steering: S, seed: u64) -> RoboticsResult<Self> {
        Self::with_rng(problem, steering, ChaChaRng::seed_from_u64(seed))
    }
}

impl<S: SteeringModel, R: Rng> RRTPlanner<S, R> {
    pub fn with_rng(problem: PlanningProblem, steering: S, rng: R) -> RoboticsResult<Self> {
        if steering.dimension() != problem.dimension() {
            return Err(RoboticsError::DimensionMismatch {
                what: "planning problem".to_string(),
                expected: steering.dimension(),
                actual: problem.dimension(),
            });
        }

        let samplers = problem
            .statespace_lo
            .iter()
            .zip(problem.statespace_hi.iter())
            .map(|(&lo, &hi)| Uniform::new_inclusive(lo, hi))
            .collect();

        debug!(
            "[RRT] planner ready: dim={} obstacles={}",
            problem.dimension(),
            problem.obstacles.len()
        );

        Ok(RRTPlanner {
            problem,
            steering,
            rng,
            samplers,
        })
    }

    pub fn problem(&self) -> &PlanningProblem {
        &self.problem
    }

    pub fn steering(&self) -> &S {
        &self.steering
    }

    /// Grow a tree from `x_init` until it contains `x_goal` or `max_iters`
    /// iterations have run. Exhaustion is reported through
    /// `RRTSolution::success`, not as an error.
    pub fn solve(&mut self, eps: f64, max_iters: usize, goal_bias: f64) -> RoboticsResult<RRTSolution> {
        self.solve_with_config(&RRTConfig::new(eps, max_iters, goal_bias))
    }

    pub fn solve_with_config(&mut self, config: &RRTConfig) -> RoboticsResult<RRTSolution> {
        config.validate()?;

        let mut tree = RRTTree::new(self.problem.x_init.clone(), config.max_iters);
        let mut path = None;
        let mut iterations = 0;

        for k in 0..config.max_iters {
            iterations = k + 1;

            let x_rand = self.sample(config.goal_bias);
            let idx_near = match self.steering.find_nearest(tree.nodes(), &x_rand) {
                Some(i) => i,
                None => break,
            };
            let x_near = &tree.nodes()[idx_near];
            let x_new = self.steering.steer_towards(x_near, &x_rand, config.eps);

            if !self
                .steering
                .is_free_motion(&self.problem.obstacles, x_near, &x_new)
            {
                debug!("[RRT] iter {}: extension from node {} rejected", k, idx_near);
                continue;
            }

            let reached_goal = x_new == self.problem.x_goal;
            let idx_new = match tree.push(x_new, idx_near) {
                Some(i) => i,
                None => {
                    debug!("[RRT] iter {}: tree full at {} nodes", k, tree.len());
                    break;
                }
            };
            trace!("[RRT] iter {}: added node {} under {}", k, idx_new, idx_near);

            if reached_goal {
                path = Some(tree.path_to_root(idx_new));
                break;
            }
        }

        let success = path.is_some();
        if success {
            info!(
                "[RRT] goal reached after {} iterations, tree size {}",
                iterations,
                tree.len()
            );
        } else {
            info!(
                "[RRT] no path after {} iterations, tree size {}",
                iterations,
                tree.len()
            );
        }

        Ok(RRTSolution {
            success,
            tree,
            path,
            iterations,
        })
    }

    /// Goal with probability `goal_bias`, otherwise uniform over the bounds
    fn sample(&mut self, goal_bias: f64) -> Configuration {
        let z: f64 = self.rng.gen();
        if z < goal_bias {
            return self.problem.x_goal.clone();
        }

        let mut values = Vec::with_capacity(self.samplers.len());
        for sampler in &self.samplers {
            values.push(sampler.sample(&mut self.rng));
        }
        Configuration::from_vec(values)
    }
}

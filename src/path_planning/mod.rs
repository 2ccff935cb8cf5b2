// Path Planning algorithms module

pub mod collision;
pub mod dubins_path;
pub mod steering;
pub mod rrt;

pub use collision::*;
pub use dubins_path::DubinsCurves;
pub use steering::*;
pub use rrt::*;

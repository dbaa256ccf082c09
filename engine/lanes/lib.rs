mod common;
mod compile;
mod config;
mod junction;
mod lane;
mod lane_graph;
mod validate;
mod walk;

pub use common::Error;
pub use compile::{compile, components, Compiled};
pub use config::{CompileConfig, ComponentPolicy, Error as ConfigError};
pub use junction::{resolve_junctions, EdgeWeights};
pub use lane::{LaneNameError, LaneNode, LaneSide, SIDES};
pub use lane_graph::LaneGraph;
pub use validate::{check, DeadEnd, LaneIssue, LaneReport};
pub use walk::{Junction, Walk};

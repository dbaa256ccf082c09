mod adjacency;
mod codec;
mod common;
mod geometry;
mod layout;
mod map;
mod validate;

pub use adjacency::{Adjacency, Link, Side};
pub use codec::{from_json, payload_type, read_file, to_json, write_file, MAP_DATA, MAP_LAYOUT};
pub use common::Error;
pub use geometry::{sort_right_to_left, turn_order, Key, Positions};
pub use layout::Layout;
pub use map::TrackMap;
pub use validate::{Issue, Report, MAX_DEGREE};

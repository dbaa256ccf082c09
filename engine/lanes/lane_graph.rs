use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use track::{Adjacency, Link};

use crate::lane::LaneNode;

/**
 * Directed lane graph produced by the compiler. Each lane maps to its ordered outgoing
 * connections; at junctions the cross-connections of an entry lane come right to left.
 *
 * It is written in the same envelope and shape as the map it was compiled from, keyed by lane
 * name.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneGraph {
    adjacency: Adjacency<LaneNode>,
}

impl LaneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_lane(&mut self, lane: LaneNode) -> bool {
        self.adjacency.add_node(lane)
    }

    /** Adds the connection unless it already exists. Returns whether it was added. */
    pub fn connect(&mut self, from: &LaneNode, to: &LaneNode, weight: u32) -> bool {
        if self.adjacency.has_link(from, to) {
            return false;
        }
        self.adjacency.push_link(from, to.clone(), weight);
        true
    }

    /** Returns whether there was a connection to remove. */
    pub fn disconnect(&mut self, from: &LaneNode, to: &LaneNode) -> bool {
        self.adjacency.remove_link(from, to)
    }

    pub fn contains(&self, lane: &LaneNode) -> bool {
        self.adjacency.contains(lane)
    }

    pub fn has_connection(&self, from: &LaneNode, to: &LaneNode) -> bool {
        self.adjacency.has_link(from, to)
    }

    pub fn weight(&self, from: &LaneNode, to: &LaneNode) -> Option<u32> {
        self.adjacency.link_weight(from, to)
    }

    pub fn successors(&self, lane: &LaneNode) -> &[Link<LaneNode>] {
        self.adjacency.links(lane)
    }

    pub fn lanes(&self) -> impl Iterator<Item = &LaneNode> + '_ {
        self.adjacency.nodes()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LaneNode, &[Link<LaneNode>])> + '_ {
        self.adjacency.iter()
    }

    pub fn lane_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn connection_count(&self) -> usize {
        self.adjacency.link_count()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn load(data: &str) -> Result<Self, track::Error> {
        track::from_json(track::MAP_DATA, data)
    }

    pub fn load_file(path: &Path) -> Result<Self, track::Error> {
        track::read_file(track::MAP_DATA, path)
    }

    pub fn dump(&self) -> Result<String, track::Error> {
        track::to_json(track::MAP_DATA, self)
    }

    pub fn dump_file(&self, path: &Path) -> Result<(), track::Error> {
        track::write_file(track::MAP_DATA, self, path)
    }

    /** Writes the graph formatted as dot. */
    pub fn dump_dot<W>(&self, write: &mut W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        let mut graph = petgraph::Graph::<String, u32>::new();
        let indices: HashMap<&LaneNode, petgraph::graph::NodeIndex> = self
            .lanes()
            .map(|lane| (lane, graph.add_node(lane.to_string())))
            .collect();
        for (lane, links) in self.iter() {
            for link in links {
                graph.add_edge(indices[lane], indices[&link.target], link.weight);
            }
        }
        let dot = petgraph::dot::Dot::new(&graph);
        write!(write, "{}", dot)?;
        Ok(())
    }
}

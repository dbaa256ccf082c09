use std::collections::{HashMap, HashSet, VecDeque};

use track::{Positions, TrackMap, MAX_DEGREE};

use crate::common::Error;
use crate::lane::{LaneNode, SIDES};
use crate::lane_graph::LaneGraph;

/** A degree-3 node, with its neighbors in the order they were first seen. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junction {
    pub node: String,
    /** The neighbor the walk arrived from, then the onward neighbors right to left. */
    pub order: Vec<String>,
}

struct Frame {
    current: String,
    reversed: bool,
    candidates: Vec<String>,
    cursor: usize,
}

fn edge_key(a: &str, b: &str) -> (String, String) {
    if a < b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/**
 * Depth-first walk over the map that splits every node into two lanes and wires the lanes of
 * neighboring nodes together.
 *
 * The walk keeps a single direction flag. Going from `current` on to `next`, the lanes are wired
 * `next1 -> current1` and `current2 -> next2`, or the other way around when the flag is set. The
 * flag of a node flips after each neighbor it descends into, so the second road out of a node
 * runs the opposite way from the first.
 */
pub struct Walk<'a, P: Positions + ?Sized> {
    map: &'a TrackMap,
    positions: &'a P,
    graph: LaneGraph,
    visited: HashSet<LaneNode>,
    wired: HashSet<(String, String)>,
    /** Edges passed over because both ends were already visited, with the flag at the time. */
    skipped: Vec<(String, String, bool)>,
    junctions: Vec<Junction>,
    recorded: HashSet<String>,
    stack: Vec<Frame>,
}

impl<'a, P: Positions + ?Sized> Walk<'a, P> {
    pub fn new(map: &'a TrackMap, positions: &'a P) -> Self {
        Self {
            map,
            positions,
            graph: LaneGraph::new(),
            visited: HashSet::new(),
            wired: HashSet::new(),
            skipped: Vec::new(),
            junctions: Vec::new(),
            recorded: HashSet::new(),
            stack: Vec::new(),
        }
    }

    /** Whether both lanes of the node have been visited. */
    pub fn is_visited(&self, node: &str) -> bool {
        SIDES
            .iter()
            .all(|side| self.visited.contains(&LaneNode::new(node, *side)))
    }

    /**
     * Wires the start edge as `previous2 -> start2` and `start1 -> previous1`, then walks away
     * from it on both ends: first on through `start`, then back out through `previous`.
     */
    pub fn walk_from(&mut self, previous: &str, start: &str) -> Result<(), Error> {
        let weight = self.weight(previous, start)?;
        for node in [previous, start] {
            for side in SIDES {
                self.graph.add_lane(LaneNode::new(node, *side));
            }
        }
        self.graph
            .connect(&LaneNode::two(previous), &LaneNode::two(start), weight);
        self.graph
            .connect(&LaneNode::one(start), &LaneNode::one(previous), weight);
        self.wired.insert(edge_key(previous, start));

        self.visit(previous, start, false);
        self.run()?;
        self.visit(start, previous, true);
        self.run()
    }

    /**
     * Wires every edge the walk passed over, in the orientation it would have had if the walk
     * had taken it the first time it was passed over.
     */
    pub fn close_segments(&mut self) -> Result<(), Error> {
        let skipped = std::mem::take(&mut self.skipped);
        for (current, next, reversed) in skipped {
            if self.wired.contains(&edge_key(&current, &next)) {
                continue;
            }
            log::debug!("Closing segment {}-{}", current, next);
            self.wire(&current, &next, reversed)?;
        }
        Ok(())
    }

    /**
     * Makes sure every node that is not a dead end can be both entered and left.
     *
     * The direction flag alone cannot guarantee this once the walk meets a node it has already
     * wired, as happens on a cycle through a junction or back to the start edge. A road's
     * direction is the way its lane two runs. For each node whose roads all run one way, this
     * follows roads that way until it reaches a node with a second road running the other way,
     * or a dead end, and turns the whole path around. Nodes inside the path keep one road each
     * way, so every reversal fixes one node without breaking another.
     */
    pub fn balance(&mut self) {
        let nodes: Vec<&'a str> = self
            .map
            .node_names()
            .filter(|node| self.map.degree(node) > 1)
            .collect();
        for node in nodes {
            for outward in [true, false] {
                if !self.roads(node, !outward).is_empty() {
                    continue;
                }
                match self.unbalanced_path(node, outward) {
                    Some(path) => {
                        log::debug!("Turning around {}", path.join(" - "));
                        for pair in path.windows(2) {
                            self.turn_around(pair[0], pair[1]);
                        }
                    }
                    None => log::warn!("No way to balance the lanes of {}", node),
                }
            }
        }
    }

    pub fn finish(self) -> (LaneGraph, Vec<Junction>) {
        (self.graph, self.junctions)
    }

    /** Whether the road between the two nodes was wired to run from `a` to `b`. */
    fn runs(&self, a: &str, b: &str) -> bool {
        self.graph
            .has_connection(&LaneNode::two(a), &LaneNode::two(b))
    }

    /** The neighbors whose roads run away from the node, or towards it. */
    fn roads(&self, node: &str, outward: bool) -> Vec<&'a str> {
        self.map
            .neighbors(node)
            .iter()
            .map(|link| link.target.as_str())
            .filter(|neighbor| {
                if outward {
                    self.runs(node, neighbor)
                } else {
                    self.runs(neighbor, node)
                }
            })
            .collect()
    }

    /**
     * Breadth first along roads running `outward` from the node, to the nearest node that can
     * spare a road running the same way.
     */
    fn unbalanced_path(&self, from: &'a str, outward: bool) -> Option<Vec<&'a str>> {
        let mut parents: HashMap<&'a str, &'a str> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            if current != from
                && (self.map.degree(current) == 1 || self.roads(current, !outward).len() > 1)
            {
                let mut path = vec![current];
                while let Some(parent) = path.last().and_then(|last| parents.get(last)).copied() {
                    path.push(parent);
                }
                path.reverse();
                return Some(path);
            }
            for neighbor in self.roads(current, outward) {
                if neighbor != from && !parents.contains_key(neighbor) {
                    parents.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }
        None
    }

    fn turn_around(&mut self, a: &str, b: &str) {
        let (from, to) = if self.runs(a, b) { (a, b) } else { (b, a) };
        let weight = self
            .graph
            .weight(&LaneNode::two(from), &LaneNode::two(to))
            .unwrap_or_default();
        self.graph
            .disconnect(&LaneNode::two(from), &LaneNode::two(to));
        self.graph
            .disconnect(&LaneNode::one(to), &LaneNode::one(from));
        self.graph
            .connect(&LaneNode::two(to), &LaneNode::two(from), weight);
        self.graph
            .connect(&LaneNode::one(from), &LaneNode::one(to), weight);
    }

    fn weight(&self, a: &str, b: &str) -> Result<u32, Error> {
        self.map
            .weight(a, b)
            .ok_or_else(|| Error::MissingEdgeWeight(a.to_string(), b.to_string()))
    }

    fn visit(&mut self, previous: &str, current: &str, reversed: bool) {
        log::debug!("Visiting {} from {}", current, previous);

        let candidates: Vec<String> = track::sort_right_to_left(
            self.positions,
            previous,
            current,
            self.map
                .neighbors(current)
                .iter()
                .map(|link| link.target.as_str())
                .filter(|neighbor| *neighbor != previous),
        )
        .into_iter()
        .map(String::from)
        .collect();

        if self.map.degree(current) == MAX_DEGREE && self.recorded.insert(current.to_string()) {
            log::debug!("Junction at {}", current);
            self.junctions.push(Junction {
                node: current.to_string(),
                order: std::iter::once(previous.to_string())
                    .chain(candidates.iter().cloned())
                    .collect(),
            });
        }

        if self.is_visited(current) {
            log::debug!("Already visited {}", current);
            return;
        }
        for side in SIDES {
            let lane = LaneNode::new(current, *side);
            self.graph.add_lane(lane.clone());
            self.visited.insert(lane);
        }

        self.stack.push(Frame {
            current: current.to_string(),
            reversed,
            candidates,
            cursor: 0,
        });
    }

    fn run(&mut self) -> Result<(), Error> {
        while let Some(frame) = self.stack.last_mut() {
            if frame.cursor >= frame.candidates.len() {
                self.stack.pop();
                continue;
            }
            let next = frame.candidates[frame.cursor].clone();
            frame.cursor += 1;
            let current = frame.current.clone();
            let reversed = frame.reversed;

            if self.is_visited(&next) {
                log::debug!("Skipping {} from {}", next, current);
                self.skipped.push((current, next, reversed));
                continue;
            }

            self.wire(&current, &next, reversed)?;
            // the child keeps the flag it was wired with
            if let Some(frame) = self.stack.last_mut() {
                frame.reversed = !frame.reversed;
            }
            log::debug!("Swapping direction at {}", current);
            self.visit(&current, &next, reversed);
        }
        Ok(())
    }

    fn wire(&mut self, current: &str, next: &str, reversed: bool) -> Result<(), Error> {
        let weight = self.weight(current, next)?;
        if reversed {
            self.graph
                .connect(&LaneNode::one(current), &LaneNode::one(next), weight);
            self.graph
                .connect(&LaneNode::two(next), &LaneNode::two(current), weight);
        } else {
            self.graph
                .connect(&LaneNode::one(next), &LaneNode::one(current), weight);
            self.graph
                .connect(&LaneNode::two(current), &LaneNode::two(next), weight);
        }
        self.wired.insert(edge_key(current, next));
        Ok(())
    }
}

#[cfg(test)]
mod walk_tests {
    use crate::lane::LaneNode;
    use crate::walk::Walk;
    use track::{Side, TrackMap};

    fn map(edges: &[(&str, &str, u32)]) -> TrackMap {
        let mut map = TrackMap::new();
        for (a, b, weight) in edges {
            map.connect(a, b, *weight, Side::Back);
        }
        map
    }

    fn successors(graph: &crate::LaneGraph, lane: &str) -> Vec<(String, u32)> {
        let lane: LaneNode = lane.parse().unwrap();
        graph
            .successors(&lane)
            .iter()
            .map(|link| (link.target.to_string(), link.weight))
            .collect()
    }

    #[test]
    fn flag_flips_between_branches() {
        // B is walked from A, and its two onward roads run opposite ways
        let map = map(&[("A", "B", 1), ("B", "C", 2), ("B", "D", 3)]);
        let mut walk = Walk::new(&map, &());
        walk.walk_from("A", "B").unwrap();
        let (graph, junctions) = walk.finish();

        assert_eq!(successors(&graph, "C1"), vec![("B1".to_string(), 2)]);
        assert_eq!(successors(&graph, "B2"), vec![("C2".to_string(), 2)]);
        assert_eq!(successors(&graph, "B1"), vec![("A1".to_string(), 1), ("D1".to_string(), 3)]);
        assert_eq!(successors(&graph, "D2"), vec![("B2".to_string(), 3)]);

        assert_eq!(junctions.len(), 1);
        assert_eq!(junctions[0].node, "B");
        assert_eq!(junctions[0].order, vec!["A", "C", "D"]);
    }

    #[test]
    fn start_in_the_middle_covers_both_ways() {
        let map = map(&[("B", "A", 1), ("B", "C", 2)]);
        let mut walk = Walk::new(&map, &());
        walk.walk_from("B", "A").unwrap();
        assert!(walk.is_visited("A"));
        assert!(walk.is_visited("B"));
        assert!(walk.is_visited("C"));
        let (graph, _) = walk.finish();
        assert_eq!(successors(&graph, "B2"), vec![("A2".to_string(), 1)]);
        assert_eq!(successors(&graph, "B1"), vec![("C1".to_string(), 2)]);
        assert_eq!(successors(&graph, "C2"), vec![("B2".to_string(), 2)]);
        assert_eq!(successors(&graph, "A1"), vec![("B1".to_string(), 1)]);
    }

    #[test]
    fn cycle_is_closed() {
        let map = map(&[("A", "B", 1), ("B", "C", 1), ("C", "D", 1), ("D", "A", 1)]);
        let mut walk = Walk::new(&map, &());
        walk.walk_from("A", "B").unwrap();
        walk.close_segments().unwrap();
        let (graph, junctions) = walk.finish();
        assert!(junctions.is_empty());
        // one lane each way around the loop
        assert_eq!(graph.connection_count(), 8);
        for (from, to) in [("A2", "B2"), ("B2", "C2"), ("C2", "D2"), ("D2", "A2")] {
            assert_eq!(successors(&graph, from), vec![(to.to_string(), 1)]);
        }
    }

    #[test]
    fn balance_turns_around_one_way_nodes() {
        // the walk comes back to A through the junction at B, with A only able to leave
        let map = map(&[("A", "B", 4), ("A", "C", 3), ("B", "D", 5), ("B", "C", 2)]);
        let mut walk = Walk::new(&map, &());
        walk.walk_from("A", "B").unwrap();
        walk.close_segments().unwrap();
        walk.balance();
        let (graph, _) = walk.finish();

        assert_eq!(successors(&graph, "A1"), vec![("B1".to_string(), 4)]);
        assert_eq!(successors(&graph, "A2"), vec![("C2".to_string(), 3)]);
        assert_eq!(successors(&graph, "B2"), vec![("D2".to_string(), 5), ("A2".to_string(), 4)]);
        assert_eq!(successors(&graph, "C1"), vec![("A1".to_string(), 3)]);
        assert_eq!(successors(&graph, "B1"), vec![("C1".to_string(), 2)]);
        assert_eq!(successors(&graph, "C2"), vec![("B2".to_string(), 2)]);
    }
}

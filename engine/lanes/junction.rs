use std::collections::HashMap;

use track::{Positions, TrackMap};

use crate::common::Error;
use crate::lane::{LaneNode, SIDES};
use crate::lane_graph::LaneGraph;
use crate::walk::Junction;

/** Weights of every edge of the map, in both directions. */
pub struct EdgeWeights(HashMap<(String, String), u32>);

impl EdgeWeights {
    pub fn new(map: &TrackMap) -> Self {
        let mut weights = HashMap::new();
        for (a, b, weight) in map.edges() {
            weights.insert((a.to_string(), b.to_string()), weight);
            weights.insert((b.to_string(), a.to_string()), weight);
        }
        Self(weights)
    }

    pub fn get(&self, a: &str, b: &str) -> Result<u32, Error> {
        self.0
            .get(&(a.to_string(), b.to_string()))
            .copied()
            .ok_or_else(|| Error::MissingEdgeWeight(a.to_string(), b.to_string()))
    }
}

/** The lanes of one neighbor that lead into and out of the junction. */
#[derive(Debug, Default)]
struct Approach {
    entry: Option<LaneNode>,
    exit: Option<LaneNode>,
}

struct Plan<'j> {
    junction: &'j Junction,
    approaches: HashMap<String, Approach>,
}

/**
 * Looks up, for each neighbor of the junction, the lane that feeds into one of the junction's
 * lanes (its entry) and the lane one of the junction's lanes feeds into (its exit).
 */
fn plan<'j>(graph: &LaneGraph, map: &TrackMap, junction: &'j Junction) -> Plan<'j> {
    let node = junction.node.as_str();
    let mut approaches = HashMap::new();
    for road in map.neighbors(node) {
        let neighbor = road.target.as_str();
        let mut approach = Approach::default();
        for side in SIDES {
            let lane = LaneNode::new(neighbor, *side);
            if approach.entry.is_none()
                && graph
                    .successors(&lane)
                    .iter()
                    .any(|link| link.target.is_on(node))
            {
                approach.entry = Some(lane.clone());
            }
            if approach.exit.is_none()
                && SIDES
                    .iter()
                    .any(|side| graph.has_connection(&LaneNode::new(node, *side), &lane))
            {
                approach.exit = Some(lane);
            }
        }
        approaches.insert(neighbor.to_string(), approach);
    }
    Plan {
        junction,
        approaches,
    }
}

/**
 * Adds the direct movements through every junction: each neighbor's entry lane is connected to
 * the exit lanes of the other two neighbors, never back to its own. The cost of a movement is
 * the weight of the road in plus the weight of the road out, and a sum that does not fit in a
 * weight is an error.
 *
 * Movements bypass the junction's own lanes. Those keep only the connections the walk gave
 * them, so a route through a junction either stops at it or goes straight past it.
 *
 * Entries are handled in the order the walk first saw the neighbors, and the exits of an entry
 * are appended from rightmost to leftmost as seen when approaching from that neighbor. All lanes
 * are looked up before anything is added, so movements through one junction never count as
 * entries to another.
 */
pub fn resolve_junctions<P: Positions + ?Sized>(
    graph: &mut LaneGraph,
    map: &TrackMap,
    positions: &P,
    junctions: &[Junction],
    weights: &EdgeWeights,
) -> Result<(), Error> {
    let walked: &LaneGraph = graph;
    let plans: Vec<Plan> = junctions
        .iter()
        .map(|junction| plan(walked, map, junction))
        .collect();

    for plan in plans.iter() {
        let node = plan.junction.node.as_str();
        for from in plan.junction.order.iter() {
            let entry = match plan.approaches.get(from).and_then(|a| a.entry.as_ref()) {
                Some(entry) => entry,
                None => {
                    log::warn!("No lane from {} into junction {}", from, node);
                    continue;
                }
            };
            let exits = track::sort_right_to_left(
                positions,
                from,
                node,
                map.neighbors(node)
                    .iter()
                    .map(|link| link.target.as_str())
                    .filter(|to| *to != from.as_str()),
            );
            for to in exits {
                let exit = match plan.approaches.get(to).and_then(|a| a.exit.as_ref()) {
                    Some(exit) => exit,
                    None => {
                        log::warn!("No lane from junction {} out to {}", node, to);
                        continue;
                    }
                };
                let weight = weights
                    .get(from, node)?
                    .checked_add(weights.get(node, to)?)
                    .ok_or_else(|| {
                        Error::WeightOverflow(from.clone(), node.to_string(), to.to_string())
                    })?;
                if graph.connect(entry, exit, weight) {
                    log::debug!("Junction {}: {} -> {} ({})", node, entry, exit, weight);
                }
            }
        }
    }
    Ok(())
}

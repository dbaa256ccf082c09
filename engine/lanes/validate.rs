use std::collections::HashSet;

use track::TrackMap;

use crate::lane::{LaneNode, SIDES};
use crate::lane_graph::LaneGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaneIssue {
    /** A map node the compiler never reached. */
    UntraversedNode { node: String },
    /** A lane nothing leaves from. */
    OrphanLane { lane: LaneNode },
    /** A lane nothing leads into. */
    StrandedLane { lane: LaneNode },
    /** A lane whose name is also the name of a node of the map. */
    NameCollision { lane: LaneNode },
}

impl std::fmt::Display for LaneIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use LaneIssue::*;
        match self {
            UntraversedNode { node } => write!(f, "{} has no lanes", node),
            OrphanLane { lane } => write!(f, "{} has no outgoing connection", lane),
            StrandedLane { lane } => write!(f, "{} has no incoming connection", lane),
            NameCollision { lane } => write!(f, "lane {} has the name of a map node", lane),
        }
    }
}

/** The two lanes of a node at the end of a road. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadEnd {
    pub node: String,
    /** Leads into the dead end, and nowhere after it. */
    pub sink: LaneNode,
    /** Leads away from the dead end. */
    pub source: LaneNode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneReport {
    pub issues: Vec<LaneIssue>,
    pub dead_ends: Vec<DeadEnd>,
    /** Junction nodes in the order the walk found them. */
    pub junctions: Vec<String>,
}

impl LaneReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl std::fmt::Display for LaneReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.issues.is_empty() {
            write!(f, "no issues")?;
        } else {
            write!(f, "{} issues:", self.issues.len())?;
            for issue in &self.issues {
                write!(f, "\n  {}", issue)?;
            }
        }
        if !self.junctions.is_empty() {
            write!(f, "\njunctions: {}", self.junctions.join(", "))?;
        }
        if !self.dead_ends.is_empty() {
            use itertools::Itertools;
            write!(
                f,
                "\ndead ends: {}",
                self.dead_ends
                    .iter()
                    .map(|dead_end| format!(
                        "{} ({} in, {} out)",
                        dead_end.node, dead_end.sink, dead_end.source
                    ))
                    .join(", ")
            )?;
        }
        Ok(())
    }
}

/**
 * Checks a compiled lane graph against the map it came from. Nothing is corrected.
 *
 * Dead ends have one lane with no way out and one with no way in; they are listed separately
 * instead of being reported as orphaned or stranded.
 */
pub fn check(map: &TrackMap, graph: &LaneGraph, junctions: Vec<String>) -> LaneReport {
    let mut report = LaneReport {
        junctions,
        ..Default::default()
    };

    let incoming: HashSet<&LaneNode> = graph
        .iter()
        .flat_map(|(_, links)| links.iter().map(|link| &link.target))
        .collect();

    for node in map.node_names() {
        let lanes: Vec<LaneNode> = SIDES
            .iter()
            .map(|side| LaneNode::new(node, *side))
            .filter(|lane| graph.contains(lane))
            .collect();
        if lanes.is_empty() {
            report.issues.push(LaneIssue::UntraversedNode {
                node: node.to_string(),
            });
            continue;
        }

        if map.degree(node) == 1 {
            let sink = lanes
                .iter()
                .find(|lane| graph.successors(lane).is_empty());
            let source = lanes.iter().find(|lane| !incoming.contains(lane));
            if let (Some(sink), Some(source)) = (sink, source) {
                if sink != source {
                    report.dead_ends.push(DeadEnd {
                        node: node.to_string(),
                        sink: sink.clone(),
                        source: source.clone(),
                    });
                    continue;
                }
            }
        }

        for lane in lanes {
            if graph.successors(&lane).is_empty() {
                report
                    .issues
                    .push(LaneIssue::OrphanLane { lane: lane.clone() });
            }
            if !incoming.contains(&lane) {
                report
                    .issues
                    .push(LaneIssue::StrandedLane { lane: lane.clone() });
            }
        }
    }

    for lane in graph.lanes() {
        if map.contains(&lane.to_string()) {
            report
                .issues
                .push(LaneIssue::NameCollision { lane: lane.clone() });
        }
    }

    report
}

use std::collections::{HashMap, HashSet};

use petgraph::graph::UnGraph;
use petgraph::visit::Bfs;
use track::{Positions, TrackMap};

use crate::common::Error;
use crate::config::{CompileConfig, ComponentPolicy};
use crate::junction::{resolve_junctions, EdgeWeights};
use crate::lane_graph::LaneGraph;
use crate::validate::{self, LaneReport};
use crate::walk::Walk;

#[derive(Debug, Clone)]
pub struct Compiled {
    pub graph: LaneGraph,
    pub report: LaneReport,
}

/**
 * Connected pieces of the map. Each piece lists its nodes breadth first from its earliest node,
 * and the pieces come in the order of their earliest nodes.
 */
pub fn components(map: &TrackMap) -> Vec<Vec<&str>> {
    let mut graph = UnGraph::<&str, u32>::new_undirected();
    let indices: HashMap<&str, _> = map
        .node_names()
        .map(|name| (name, graph.add_node(name)))
        .collect();
    for (a, b, weight) in map.edges() {
        graph.add_edge(indices[a], indices[b], weight);
    }

    let mut seen = HashSet::new();
    let mut components = Vec::new();
    for index in graph.node_indices() {
        if seen.contains(&index) {
            continue;
        }
        let mut component = Vec::new();
        let mut bfs = Bfs::new(&graph, index);
        while let Some(found) = bfs.next(&graph) {
            seen.insert(found);
            component.push(graph[found]);
        }
        components.push(component);
    }
    components
}

/**
 * Compiles the undirected map into a directed lane graph.
 *
 * Every node becomes two lanes, one per travel direction, wired together by a depth-first walk
 * from the start edge. Edges the walk never took are wired afterwards, roads are turned around
 * where a node could otherwise only be entered or only be left, and every junction gets direct
 * movements from each road in to the other two roads out. The map is checked first and
 * rejected if any node is unconnected or has more than three roads.
 *
 * Positions only affect ordering: onward roads are taken and listed right to left. Without them
 * the order of the map's adjacency lists is used.
 */
pub fn compile<P: Positions + ?Sized>(
    map: &TrackMap,
    positions: &P,
    config: &CompileConfig,
) -> Result<Compiled, Error> {
    if map.is_empty() {
        return Err(Error::EmptyMap);
    }
    let map_report = map.validate();
    if !map_report.is_complete() {
        return Err(Error::InvalidMap(map_report));
    }

    let components = components(map);
    if components.len() > 1 && config.components == ComponentPolicy::Reject {
        return Err(Error::UnsupportedTopology(components.len()));
    }

    let start = match &config.start {
        Some((previous, start)) => {
            if !map.has_edge(previous, start) {
                return Err(Error::UnknownStartEdge(previous.clone(), start.clone()));
            }
            Some((previous.as_str(), start.as_str()))
        }
        None => None,
    };

    let mut walk = Walk::new(map, positions);
    for component in components.iter() {
        let (previous, next) = match start {
            Some((previous, next)) if component.contains(&previous) => (previous, next),
            _ => {
                let first = component[0];
                match map.neighbors(first).first() {
                    Some(link) => (first, link.target.as_str()),
                    None => continue,
                }
            }
        };
        log::debug!("Starting walk at {}-{}", previous, next);
        walk.walk_from(previous, next)?;
    }
    walk.close_segments()?;
    walk.balance();

    let (mut graph, junctions) = walk.finish();
    resolve_junctions(
        &mut graph,
        map,
        positions,
        &junctions,
        &EdgeWeights::new(map),
    )?;

    let report = validate::check(
        map,
        &graph,
        junctions.into_iter().map(|junction| junction.node).collect(),
    );
    if !report.is_clean() {
        log::warn!("Lane graph has issues: {}", report);
    }

    if config.dead_end_turnaround {
        for dead_end in report.dead_ends.iter() {
            log::debug!("Turning around at {}", dead_end.node);
            graph.connect(&dead_end.sink, &dead_end.source, 0);
        }
    }

    Ok(Compiled { graph, report })
}

#[cfg(test)]
mod compile_tests {
    use crate::compile::*;
    use track::Side;

    #[test]
    fn components_in_map_order() {
        let mut map = TrackMap::new();
        map.connect("A", "B", 1, Side::Back);
        map.connect("X", "Y", 1, Side::Back);
        map.connect("B", "C", 1, Side::Back);
        assert_eq!(components(&map), vec![vec!["A", "B", "C"], vec!["X", "Y"]]);
    }

    #[test]
    fn empty_map() {
        assert!(matches!(
            compile(&TrackMap::new(), &(), &CompileConfig::default()),
            Err(Error::EmptyMap)
        ));
    }

    #[test]
    fn unknown_start_edge() {
        let mut map = TrackMap::new();
        map.connect("A", "B", 1, Side::Back);
        map.connect("B", "C", 1, Side::Back);
        let config = CompileConfig {
            start: Some(("A".to_string(), "C".to_string())),
            ..Default::default()
        };
        assert!(matches!(
            compile(&map, &(), &config),
            Err(Error::UnknownStartEdge(_, _))
        ));
    }
}

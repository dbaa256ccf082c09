use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::adjacency::{Adjacency, Link, Side};
use crate::codec::{self, MAP_DATA};
use crate::common::Error;
use crate::geometry::{Key, Positions};

/**
 * Undirected, weighted track map as drawn by the operator. Nodes are named intersections or
 * stops, edges are road segments with an integer travel cost.
 *
 * Every edge is stored in both endpoints' adjacency lists. The order of a node's list records
 * when (and on which side) each neighbor was attached, and is kept through serialization.
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMap {
    adjacency: Adjacency<String>,
    positions: HashMap<String, Key>,
}

impl TrackMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(data: &str) -> Result<Self, Error> {
        codec::from_json(MAP_DATA, data)
    }

    pub fn load_file(path: &Path) -> Result<Self, Error> {
        codec::read_file(MAP_DATA, path)
    }

    pub fn dump(&self) -> Result<String, Error> {
        codec::to_json(MAP_DATA, self)
    }

    pub fn dump_file(&self, path: &Path) -> Result<(), Error> {
        codec::write_file(MAP_DATA, self, path)
    }

    pub fn add_node(&mut self, name: &str) -> bool {
        if !self.adjacency.add_node(name.to_string()) {
            log::warn!("Node {} already exists", name);
            return false;
        }
        true
    }

    /**
     * Adds an undirected edge, creating missing endpoints. The edge goes at the front or back of
     * both adjacency lists according to `side`. Duplicate edges, self-loops and zero weights are
     * skipped with a warning. Returns whether an edge was added.
     */
    pub fn connect(&mut self, a: &str, b: &str, weight: u32, side: Side) -> bool {
        if a == b {
            log::warn!("Skipping self-loop on {}", a);
            return false;
        }
        if weight == 0 {
            log::warn!("Skipping zero-weight edge {}-{}", a, b);
            return false;
        }
        if self.adjacency.has_link(&a.to_string(), &b.to_string()) {
            log::warn!("Edge {}-{} already exists", a, b);
            return false;
        }
        self.adjacency
            .insert_link(&a.to_string(), b.to_string(), weight, side);
        self.adjacency
            .insert_link(&b.to_string(), a.to_string(), weight, side);
        true
    }

    /** Sets the weight of an existing edge. A weight of zero removes the edge. */
    pub fn set_weight(&mut self, a: &str, b: &str, weight: u32) -> Result<(), Error> {
        if !self.has_edge(a, b) {
            return Err(Error::UnknownEdge(a.to_string(), b.to_string()));
        }
        if weight == 0 {
            self.disconnect(a, b);
        } else {
            self.adjacency
                .set_link_weight(&a.to_string(), &b.to_string(), weight);
            self.adjacency
                .set_link_weight(&b.to_string(), &a.to_string(), weight);
        }
        Ok(())
    }

    pub fn disconnect(&mut self, a: &str, b: &str) -> bool {
        let removed = self.adjacency.remove_link(&a.to_string(), &b.to_string());
        self.adjacency.remove_link(&b.to_string(), &a.to_string()) || removed
    }

    /** Removes a node with all of its edges and its position. */
    pub fn remove_node(&mut self, name: &str) -> bool {
        let name = name.to_string();
        match self.adjacency.remove_node(&name) {
            Some(links) => {
                for link in links {
                    self.adjacency.remove_link(&link.target, &name);
                }
                self.positions.remove(&name);
                true
            }
            None => false,
        }
    }

    pub fn rename_node(&mut self, old: &str, new: &str) -> Result<(), Error> {
        if !self.contains(old) {
            return Err(Error::UnknownNode(old.to_string()));
        }
        if self.contains(new) {
            return Err(Error::NameInUse(new.to_string()));
        }
        self.adjacency.rename_node(&old.to_string(), new.to_string());
        if let Some(key) = self.positions.remove(old) {
            self.positions.insert(new.to_string(), key);
        }
        Ok(())
    }

    pub fn set_position(&mut self, name: &str, key: Key) -> Result<(), Error> {
        if !self.contains(name) {
            return Err(Error::UnknownNode(name.to_string()));
        }
        self.positions.insert(name.to_string(), key);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adjacency.contains(&name.to_string())
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.adjacency.has_link(&a.to_string(), &b.to_string())
    }

    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        self.adjacency.link_weight(&a.to_string(), &b.to_string())
    }

    pub fn degree(&self, name: &str) -> usize {
        self.adjacency.degree(&name.to_string())
    }

    pub fn neighbors(&self, name: &str) -> &[Link<String>] {
        self.adjacency.links(&name.to_string())
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.adjacency.nodes().map(|name| name.as_str())
    }

    /** Each undirected edge once, in the order it is first seen walking the adjacency lists. */
    pub fn edges(&self) -> Vec<(&str, &str, u32)> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for (node, links) in self.adjacency.iter() {
            for link in links {
                if seen.contains(&(link.target.as_str(), node.as_str())) {
                    continue;
                }
                seen.insert((node.as_str(), link.target.as_str()));
                edges.push((node.as_str(), link.target.as_str(), link.weight));
            }
        }
        edges
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn adjacency(&self) -> &Adjacency<String> {
        &self.adjacency
    }

    /**
     * Builds a map from raw adjacency lists as they appear in a file, keeping the list order.
     * Lists are expected to be symmetric: a missing reverse entry is added at the back, and if
     * the two directions disagree on weight, the first one seen wins. Both are logged. A zero
     * weight in either direction deletes the edge, as setting a weight to zero does.
     */
    pub fn from_adjacency(raw: Adjacency<String>) -> Self {
        let mut deleted = HashSet::new();
        for (node, links) in raw.iter() {
            for link in links.iter().filter(|link| link.weight == 0) {
                log::warn!("Skipping zero-weight edge {}-{}", node, link.target);
                deleted.insert((node.as_str(), link.target.as_str()));
                deleted.insert((link.target.as_str(), node.as_str()));
            }
        }

        let mut adjacency = Adjacency::new();
        for node in raw.nodes() {
            adjacency.add_node(node.clone());
        }
        for (node, links) in raw.iter() {
            for link in links {
                if link.target == *node {
                    log::warn!("Skipping self-loop on {}", node);
                } else if deleted.contains(&(node.as_str(), link.target.as_str())) {
                    continue;
                } else if adjacency.has_link(node, &link.target) {
                    log::warn!("Skipping duplicate edge {}-{}", node, link.target);
                } else {
                    adjacency.push_link(node, link.target.clone(), link.weight);
                }
            }
        }

        // second pass, now that every forward entry is in place
        let mut fixes = Vec::new();
        for (node, links) in adjacency.iter() {
            for link in links {
                match adjacency.link_weight(&link.target, node) {
                    Some(weight) if weight == link.weight => (),
                    Some(weight) => {
                        // the reverse entry may already have been overruled by this one
                        if !fixes.iter().any(|(a, b, _)| a == node && b == &link.target) {
                            log::warn!(
                                "Edge {}-{} has weight {} but {}-{} has weight {}, using {}",
                                node,
                                link.target,
                                link.weight,
                                link.target,
                                node,
                                weight,
                                link.weight
                            );
                            fixes.push((link.target.clone(), node.clone(), Some(link.weight)));
                        }
                    }
                    None => {
                        log::warn!(
                            "Edge {}-{} has no reverse entry, adding it",
                            node,
                            link.target
                        );
                        fixes.push((link.target.clone(), node.clone(), None));
                    }
                }
            }
        }
        for (from, to, weight) in fixes {
            match weight {
                Some(weight) => {
                    adjacency.set_link_weight(&from, &to, weight);
                }
                None => {
                    let weight = adjacency.link_weight(&to, &from).unwrap_or(1);
                    adjacency.push_link(&from, to, weight);
                }
            }
        }

        Self {
            adjacency,
            positions: HashMap::new(),
        }
    }
}

impl Positions for TrackMap {
    fn position(&self, node: &str) -> Option<Key> {
        self.positions.get(node).copied()
    }
}

impl Serialize for TrackMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.adjacency.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TrackMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_adjacency(Adjacency::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod map_tests {
    use crate::adjacency::Side;
    use crate::geometry::{Key, Positions};
    use crate::map::TrackMap;

    fn targets(map: &TrackMap, node: &str) -> Vec<String> {
        map.neighbors(node)
            .iter()
            .map(|link| link.target.clone())
            .collect()
    }

    #[test]
    fn connect_is_symmetric() {
        let mut map = TrackMap::new();
        assert!(map.connect("A", "B", 3, Side::Back));
        assert_eq!(map.weight("A", "B"), Some(3));
        assert_eq!(map.weight("B", "A"), Some(3));
        assert_eq!(map.node_count(), 2);
        assert_eq!(map.edge_count(), 1);
    }

    #[test]
    fn duplicates_and_self_loops_are_skipped() {
        let mut map = TrackMap::new();
        assert!(map.connect("A", "B", 3, Side::Back));
        assert!(!map.connect("B", "A", 5, Side::Back));
        assert!(!map.connect("A", "A", 1, Side::Back));
        assert!(!map.connect("A", "C", 0, Side::Back));
        assert_eq!(map.weight("A", "B"), Some(3));
        assert_eq!(map.degree("A"), 1);
        assert!(!map.contains("C"));
        assert!(!map.add_node("A"));
    }

    #[test]
    fn insertion_side() {
        let mut map = TrackMap::new();
        map.connect("B", "A", 1, Side::Back);
        map.connect("B", "C", 1, Side::Back);
        map.connect("B", "D", 1, Side::Front);
        assert_eq!(targets(&map, "B"), vec!["D", "A", "C"]);
    }

    #[test]
    fn zero_weight_deletes() {
        let mut map = TrackMap::new();
        map.connect("A", "B", 3, Side::Back);
        map.set_weight("A", "B", 7).unwrap();
        assert_eq!(map.weight("B", "A"), Some(7));
        map.set_weight("B", "A", 0).unwrap();
        assert!(!map.has_edge("A", "B"));
        assert!(!map.has_edge("B", "A"));
        assert!(map.contains("A"));
        assert!(map.set_weight("A", "B", 1).is_err());
    }

    #[test]
    fn remove_node_drops_edges() {
        let mut map = TrackMap::new();
        map.connect("A", "B", 1, Side::Back);
        map.connect("B", "C", 1, Side::Back);
        map.set_position("B", Key::new(1.0, 2.0)).unwrap();
        assert!(map.remove_node("B"));
        assert!(!map.remove_node("B"));
        assert_eq!(map.degree("A"), 0);
        assert_eq!(map.degree("C"), 0);
        assert_eq!(map.position("B"), None);
    }

    #[test]
    fn rename() {
        let mut map = TrackMap::new();
        map.connect("A", "B", 1, Side::Back);
        map.connect("B", "C", 2, Side::Back);
        map.set_position("B", Key::new(1.0, 2.0)).unwrap();
        assert!(map.rename_node("B", "C").is_err());
        assert!(map.rename_node("X", "Y").is_err());
        map.rename_node("B", "Z").unwrap();
        assert_eq!(map.weight("A", "Z"), Some(1));
        assert_eq!(map.weight("C", "Z"), Some(2));
        assert_eq!(map.position("Z"), Some(Key::new(1.0, 2.0)));
        assert!(map.set_position("B", Key::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn edges_once_each() {
        let mut map = TrackMap::new();
        map.connect("A", "B", 1, Side::Back);
        map.connect("B", "C", 2, Side::Back);
        map.connect("C", "A", 3, Side::Back);
        assert_eq!(
            map.edges(),
            vec![("A", "B", 1), ("A", "C", 3), ("B", "C", 2)]
        );
    }

    #[test]
    fn deserialize_keeps_list_order() {
        let map: TrackMap = serde_json::from_str(
            r#"{"A": [{"B": 1}], "B": [{"C": 2}, {"A": 1}], "C": [{"B": 2}]}"#,
        )
        .unwrap();
        assert_eq!(targets(&map, "B"), vec!["C", "A"]);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"A":[{"B":1}],"B":[{"C":2},{"A":1}],"C":[{"B":2}]}"#
        );
    }

    #[test]
    fn dump_matches_editor_output() {
        let mut map = TrackMap::new();
        map.connect("A", "B", 1, Side::Back);
        map.connect("A", "K", 5, Side::Back);
        let data = map.dump().unwrap();
        assert_eq!(
            data,
            r#"{"MapData": {"A": [{"B": 1}, {"K": 5}], "B": [{"A": 1}], "K": [{"A": 5}]}}"#
        );
        assert_eq!(TrackMap::load(&data).unwrap(), map);
        assert!(TrackMap::load(r#"{"MapLayout": {}}"#).is_err());
    }

    #[test]
    fn deserialize_repairs_asymmetry() {
        let map: TrackMap = serde_json::from_str(
            r#"{"A": [{"B": 1}, {"C": 4}], "B": [{"A": 2}], "C": [], "D": []}"#,
        )
        .unwrap();
        // first seen wins
        assert_eq!(map.weight("B", "A"), Some(1));
        assert_eq!(map.weight("C", "A"), Some(4));
        assert!(map.contains("D"));
        assert_eq!(map.degree("D"), 0);
    }

    #[test]
    fn zero_weight_in_file_deletes_both_directions() {
        let map = TrackMap::load(
            r#"{"MapData": {"A": [{"B": 0}, {"C": 2}], "B": [{"A": 3}], "C": [{"A": 2}]}}"#,
        )
        .unwrap();
        assert!(!map.has_edge("A", "B"));
        assert!(!map.has_edge("B", "A"));
        assert_eq!(map.weight("A", "C"), Some(2));
        assert_eq!(map.degree("B"), 0);
        assert_eq!(map.edge_count(), 1);
    }
}

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/**
 * Where a new link is placed in a node's list. The list order is the only record of which side
 * of a node a neighbor was attached on, so it has to be kept stable.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link<N> {
    pub target: N,
    pub weight: u32,
}

impl<N> Link<N> {
    pub fn new(target: N, weight: u32) -> Self {
        Self { target, weight }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry<N> {
    node: N,
    links: Vec<Link<N>>,
}

/**
 * Ordered adjacency lists: nodes are kept in insertion order, and each node owns an ordered list
 * of weighted links to other nodes. Links are directed; undirected graphs store both directions.
 *
 * This is the representation behind both the drawn track map and the compiled lane graph.
 */
#[derive(Debug, Clone)]
pub struct Adjacency<N: Clone + Eq + Hash> {
    entries: Vec<Entry<N>>,
    index: HashMap<N, usize>,
}

impl<N: Clone + Eq + Hash> Default for Adjacency<N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<N: Clone + Eq + Hash> PartialEq for Adjacency<N> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<N: Clone + Eq + Hash> Eq for Adjacency<N> {}

impl<N: Clone + Eq + Hash> Adjacency<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /** Returns false if the node was already present. */
    pub fn add_node(&mut self, node: N) -> bool {
        if self.index.contains_key(&node) {
            return false;
        }
        self.index.insert(node.clone(), self.entries.len());
        self.entries.push(Entry {
            node,
            links: Vec::new(),
        });
        true
    }

    /**
     * Removes the node and its own links. Links from other nodes pointing at it are left alone;
     * callers that keep the graph symmetric have to clean those up themselves.
     */
    pub fn remove_node(&mut self, node: &N) -> Option<Vec<Link<N>>> {
        let position = self.index.remove(node)?;
        let entry = self.entries.remove(position);
        self.reindex();
        Some(entry.links)
    }

    pub fn rename_node(&mut self, old: &N, new: N) -> bool {
        if self.index.contains_key(&new) {
            return false;
        }
        let position = match self.index.remove(old) {
            Some(position) => position,
            None => return false,
        };
        self.entries[position].node = new.clone();
        self.index.insert(new.clone(), position);
        for entry in self.entries.iter_mut() {
            for link in entry.links.iter_mut() {
                if link.target == *old {
                    link.target = new.clone();
                }
            }
        }
        true
    }

    /** Appends or prepends a directed link, creating both nodes if needed. */
    pub fn insert_link(&mut self, from: &N, to: N, weight: u32, side: Side) {
        self.add_node(from.clone());
        self.add_node(to.clone());
        let links = &mut self.entries[self.index[from]].links;
        match side {
            Side::Front => links.insert(0, Link::new(to, weight)),
            Side::Back => links.push(Link::new(to, weight)),
        }
    }

    pub fn push_link(&mut self, from: &N, to: N, weight: u32) {
        self.insert_link(from, to, weight, Side::Back)
    }

    /** O(n), but the lists should be very small */
    pub fn remove_link(&mut self, from: &N, to: &N) -> bool {
        match self.index.get(from) {
            Some(position) => {
                let links = &mut self.entries[*position].links;
                let before = links.len();
                links.retain(|link| link.target != *to);
                links.len() != before
            }
            None => false,
        }
    }

    pub fn set_link_weight(&mut self, from: &N, to: &N, weight: u32) -> bool {
        let position = match self.index.get(from) {
            Some(position) => *position,
            None => return false,
        };
        match self.entries[position]
            .links
            .iter_mut()
            .find(|link| link.target == *to)
        {
            Some(link) => {
                link.weight = weight;
                true
            }
            None => false,
        }
    }

    pub fn links(&self, node: &N) -> &[Link<N>] {
        match self.index.get(node) {
            Some(position) => &self.entries[*position].links,
            None => &[],
        }
    }

    pub fn has_link(&self, from: &N, to: &N) -> bool {
        self.links(from).iter().any(|link| link.target == *to)
    }

    pub fn link_weight(&self, from: &N, to: &N) -> Option<u32> {
        self.links(from)
            .iter()
            .find(|link| link.target == *to)
            .map(|link| link.weight)
    }

    pub fn degree(&self, node: &N) -> usize {
        self.links(node).len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.entries.iter().map(|entry| &entry.node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&N, &[Link<N>])> + '_ {
        self.entries
            .iter()
            .map(|entry| (&entry.node, entry.links.as_slice()))
    }

    pub fn link_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.links.len()).sum()
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.node.clone(), position))
            .collect();
    }
}

/*
 * On disk, adjacency lists look like `{"A": [{"B": 1}, {"C": 2}], ...}`: one key per node, each
 * link a mapping with a single entry. Node names go through Display/FromStr so that structured
 * node types can share the format.
 */

struct DisplayKey<'a, N>(&'a N);

impl<'a, N: Display> Serialize for DisplayKey<'a, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self.0)
    }
}

struct LinkEntry<'a, N>(&'a Link<N>);

impl<'a, N: Display> Serialize for LinkEntry<'a, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&DisplayKey(&self.0.target), &self.0.weight)?;
        map.end()
    }
}

struct LinkList<'a, N>(&'a [Link<N>]);

impl<'a, N: Display> Serialize for LinkList<'a, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(LinkEntry))
    }
}

impl<N: Clone + Eq + Hash + Display> Serialize for Adjacency<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&DisplayKey(&entry.node), &LinkList(&entry.links))?;
        }
        map.end()
    }
}

/** A `{name: weight}` mapping with exactly one entry. */
struct RawLink(String, u32);

impl<'de> Deserialize<'de> for RawLink {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawLinkVisitor;

        impl<'de> Visitor<'de> for RawLinkVisitor {
            type Value = RawLink;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a mapping with a single neighbor: weight entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawLink, A::Error> {
                let (target, weight) = map
                    .next_entry::<String, u32>()?
                    .ok_or_else(|| <A::Error as de::Error>::invalid_length(0, &self))?;
                if map.next_key::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(RawLink(target, weight))
            }
        }

        deserializer.deserialize_map(RawLinkVisitor)
    }
}

fn parse_node<N, E>(name: &str) -> Result<N, E>
where
    N: FromStr,
    N::Err: Display,
    E: de::Error,
{
    name.parse::<N>()
        .map_err(|err| E::custom(format!("invalid node name {:?}: {}", name, err)))
}

impl<'de, N> Deserialize<'de> for Adjacency<N>
where
    N: Clone + Eq + Hash + FromStr,
    N::Err: Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AdjacencyVisitor<N>(PhantomData<N>);

        impl<'de, N> Visitor<'de> for AdjacencyVisitor<N>
        where
            N: Clone + Eq + Hash + FromStr,
            N::Err: Display,
        {
            type Value = Adjacency<N>;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a mapping from node name to a list of links")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Adjacency<N>, A::Error> {
                // keys first, so node order follows the document and not link targets
                let mut adjacency = Adjacency::new();
                let mut pending = Vec::new();
                while let Some((name, links)) = map.next_entry::<String, Vec<RawLink>>()? {
                    let node: N = parse_node::<N, A::Error>(&name)?;
                    if !adjacency.add_node(node.clone()) {
                        return Err(de::Error::custom(format!("duplicate node {:?}", name)));
                    }
                    pending.push((node, links));
                }

                for (node, links) in pending {
                    for RawLink(target, weight) in links {
                        let target = parse_node::<N, A::Error>(&target)?;
                        adjacency.push_link(&node, target, weight);
                    }
                }
                Ok(adjacency)
            }
        }

        deserializer.deserialize_map(AdjacencyVisitor(PhantomData))
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::{self, MAP_LAYOUT};
use crate::common::Error;
use crate::geometry::{Key, Positions};
use crate::map::TrackMap;

/**
 * Node positions kept next to a map file, since the map format itself only carries adjacency.
 * Stored on disk as `{"MapLayout": {"A": [x, y], ...}}`.
 */
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    positions: BTreeMap<String, (f64, f64)>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /** Captures the positions of every placed node of the map. */
    pub fn from_map(map: &TrackMap) -> Self {
        let mut layout = Self::new();
        for name in map.node_names() {
            if let Some(key) = map.position(name) {
                layout.insert(name, key);
            }
        }
        layout
    }

    pub fn insert(&mut self, name: &str, key: Key) {
        self.positions.insert(name.to_string(), (key.x, key.y));
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn load(data: &str) -> Result<Self, Error> {
        codec::from_json(MAP_LAYOUT, data)
    }

    pub fn load_file(path: &Path) -> Result<Self, Error> {
        codec::read_file(MAP_LAYOUT, path)
    }

    pub fn dump(&self) -> Result<String, Error> {
        codec::to_json(MAP_LAYOUT, self)
    }

    pub fn dump_file(&self, path: &Path) -> Result<(), Error> {
        codec::write_file(MAP_LAYOUT, self, path)
    }
}

impl Positions for Layout {
    fn position(&self, node: &str) -> Option<Key> {
        self.positions.get(node).map(|(x, y)| Key::new(*x, *y))
    }
}

impl TrackMap {
    /**
     * Places the map's nodes according to the layout. Returns the layout entries that name no
     * node of this map; those are skipped.
     */
    pub fn apply_layout(&mut self, layout: &Layout) -> Vec<String> {
        let mut unknown = Vec::new();
        for (name, (x, y)) in layout.positions.iter() {
            if self.set_position(name, Key::new(*x, *y)).is_err() {
                log::warn!("Layout places {}, which is not in the map", name);
                unknown.push(name.clone());
            }
        }
        unknown
    }
}

#[cfg(test)]
mod layout_tests {
    use crate::adjacency::Side;
    use crate::geometry::{Key, Positions};
    use crate::layout::Layout;
    use crate::map::TrackMap;

    #[test]
    fn load_and_dump() {
        let layout = Layout::load(r#"{"MapLayout": {"A": [-180.0, 180.0], "B": [0, 90.5]}}"#)
            .unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.position("B"), Some(Key::new(0.0, 90.5)));
        assert_eq!(
            layout.dump().unwrap(),
            r#"{"MapLayout": {"A": [-180.0, 180.0], "B": [0.0, 90.5]}}"#
        );
    }

    #[test]
    fn apply_to_map() {
        let mut map = TrackMap::new();
        map.connect("A", "B", 1, Side::Back);
        let mut layout = Layout::new();
        layout.insert("A", Key::new(1.0, 2.0));
        layout.insert("Z", Key::new(3.0, 4.0));
        assert_eq!(map.apply_layout(&layout), vec!["Z".to_string()]);
        assert_eq!(map.position("A"), Some(Key::new(1.0, 2.0)));
        assert_eq!(map.position("B"), None);
        assert_eq!(Layout::from_map(&map).len(), 1);
    }
}

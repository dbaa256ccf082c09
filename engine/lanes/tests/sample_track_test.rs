use lanes::{compile, CompileConfig, LaneGraph};
use test_util::workspace_file;
use track::{Layout, TrackMap};

fn load_sample() -> TrackMap {
    test_util::init_logging();
    let mut map = TrackMap::load_file(&workspace_file("maps/track.json")).unwrap();
    let layout = Layout::load_file(&workspace_file("maps/track_layout.json")).unwrap();
    assert!(map.apply_layout(&layout).is_empty());
    map
}

#[test]
fn sample_map_is_complete() {
    let map = load_sample();
    assert_eq!(map.node_count(), 13);
    assert_eq!(map.edge_count(), 16);
    let report = map.validate();
    assert!(report.is_complete());
    assert!(!report.is_simple());
    assert_eq!(report.junctions, vec!["B", "C", "H", "I", "L", "M"]);
}

#[test]
fn sample_map_round_trip() {
    let data = std::fs::read_to_string(workspace_file("maps/track.json")).unwrap();
    assert_eq!(TrackMap::load(&data).unwrap().dump().unwrap(), data);

    let data = std::fs::read_to_string(workspace_file("maps/track_layout.json")).unwrap();
    assert_eq!(Layout::load(&data).unwrap().dump().unwrap(), data);
}

#[test]
fn sample_map_compiles() {
    let map = load_sample();
    let config = CompileConfig::load_file(&workspace_file("config/default.toml")).unwrap();
    let compiled = compile(&map, &map, &config).unwrap();

    assert!(compiled.report.is_clean(), "{}", compiled.report);
    assert!(compiled.report.dead_ends.is_empty());
    assert_eq!(
        compiled.report.junctions,
        vec!["B", "C", "H", "I", "M", "L"]
    );
    assert_eq!(compiled.graph.lane_count(), 26);
    assert_eq!(compiled.graph.connection_count(), 64);

    let expected = std::fs::read_to_string(workspace_file("maps/track_lanes.json")).unwrap();
    assert_eq!(compiled.graph.dump().unwrap(), expected);
    assert_eq!(LaneGraph::load(&expected).unwrap(), compiled.graph);
}

#[test]
fn sample_map_compiles_without_layout() {
    let data = std::fs::read_to_string(workspace_file("maps/track.json")).unwrap();
    let map = TrackMap::load(&data).unwrap();
    let compiled = compile(&map, &(), &CompileConfig::default()).unwrap();
    assert!(compiled.report.is_clean(), "{}", compiled.report);
    assert_eq!(compiled.graph.lane_count(), 26);
}

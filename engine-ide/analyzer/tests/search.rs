use std::cell::RefCell;

use analyzer::search::{self, ItemKind, NavigationTarget};
use analyzer::{Analyzer, locate};
use cancelling::CancelToken;
use files::{FileId, FileKind};
use hoogle::{HoogleError, SearchOracle};
use syntax::NodeId;

const REGISTRY: &str = "\
module Data.Registry where

newtype Registry = Registry [String]

register :: String -> Registry -> Registry
register name (Registry names) = Registry (name : names)
";

struct FauxOracle {
    lines: Vec<String>,
}

impl FauxOracle {
    fn new(lines: &[&str]) -> FauxOracle {
        FauxOracle { lines: lines.iter().map(|line| line.to_string()).collect() }
    }
}

impl SearchOracle for FauxOracle {
    fn search(&self, _pattern: &str, limit: usize) -> Result<Vec<String>, HoogleError> {
        Ok(self.lines.iter().take(limit).cloned().collect())
    }
}

#[derive(Default)]
struct RecordingOracle {
    seen: RefCell<Vec<String>>,
}

impl SearchOracle for RecordingOracle {
    fn search(&self, pattern: &str, _limit: usize) -> Result<Vec<String>, HoogleError> {
        self.seen.borrow_mut().push(pattern.to_string());
        Ok(Vec::new())
    }
}

struct FailingOracle;

impl SearchOracle for FailingOracle {
    fn search(&self, _pattern: &str, _limit: usize) -> Result<Vec<String>, HoogleError> {
        Err(HoogleError::Failed { status: "exit status: 1".into(), stderr: "boom".into() })
    }
}

fn fixture() -> Analyzer {
    let analyzer = Analyzer::default();
    analyzer.engine.insert_file("src/Data/Registry.hs", FileKind::Project, REGISTRY);
    analyzer
}

fn node_at(analyzer: &Analyzer, file: FileId, line: u32, column: u32) -> NodeId {
    let content = analyzer.engine.content(file);
    let parsed = analyzer.engine.parsed(file);
    let offset = locate::position_to_offset(&content, line, column).unwrap();
    parsed.tree().node_at_offset(offset).unwrap()
}

#[test]
fn oracle_lines_become_ranked_navigation_items() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let registry = analyzer.engine.file_id("src/Data/Registry.hs").unwrap();
    let oracle = FauxOracle::new(&[
        "module Data.Registry",
        "package base",
        "Data.Registry register :: String -> Registry -> Registry",
    ]);

    let items = search::by_pattern(&analyzer, &oracle, "register", false, &token);
    assert_eq!(items.len(), 3);

    assert_eq!(items[0].name, "Data.Registry");
    assert_eq!(items[0].location, "Data.Registry");
    assert_eq!(items[0].kind, ItemKind::Module);
    assert_eq!(items[0].sort_key, "00 Data.Registry");
    assert_eq!(items[0].target, Some(NavigationTarget::File { file: registry }));

    assert_eq!(items[1].name, "base");
    assert_eq!(items[1].kind, ItemKind::Package);
    assert_eq!(items[1].sort_key, "01 base");
    assert_eq!(items[1].target, None);

    assert_eq!(items[2].name, "register");
    assert_eq!(items[2].location, "Data.Registry");
    assert_eq!(items[2].kind, ItemKind::Declaration);
    assert_eq!(items[2].sort_key, "02 register");
    let equation = node_at(&analyzer, registry, 6, 1);
    assert_eq!(items[2].target, Some(NavigationTarget::Element { file: registry, node: equation }));
}

#[test]
fn unknown_locations_stay_placeholders() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let oracle = FauxOracle::new(&[
        "module No.Such.Module",
        "No.Such.Module mystery :: Int",
        "Data.Registry data",
    ]);

    let items = search::by_pattern(&analyzer, &oracle, "mystery", false, &token);
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].kind, ItemKind::Module);
    assert_eq!(items[0].target, None);
    assert_eq!(items[1].kind, ItemKind::Declaration);
    assert_eq!(items[1].name, "mystery");
    assert_eq!(items[1].target, None);
    // A declaration keyword with nothing after it has no name to carry.
    assert_eq!(items[2].kind, ItemKind::Declaration);
    assert_eq!(items[2].name, "data");
    assert_eq!(items[2].target, None);
}

#[test]
fn unrecognized_lines_survive_as_unknown_items() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let oracle = FauxOracle::new(&["No results found"]);

    let items = search::by_pattern(&analyzer, &oracle, "gone", false, &token);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, ItemKind::Unknown);
    assert_eq!(items[0].name, "No results found");
    assert_eq!(items[0].location, "");
    assert_eq!(items[0].target, None);
}

#[test]
fn project_scope_appends_configured_packages() {
    let mut analyzer = fixture();
    analyzer.settings.project_packages =
        vec!["registry-core".to_string(), "registry-app".to_string()];
    let token = CancelToken::new();
    let oracle = RecordingOracle::default();

    search::by_pattern(&analyzer, &oracle, "register", true, &token);
    search::by_pattern(&analyzer, &oracle, "register", false, &token);
    let seen = oracle.seen.borrow();
    assert_eq!(seen[0], "register +registry-core +registry-app");
    assert_eq!(seen[1], "register");
}

#[test]
fn results_stop_at_the_oracle_bound() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let lines: Vec<String> = (0..40).map(|_| "module Data.Registry".to_string()).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let oracle = FauxOracle::new(&refs);

    let items = search::by_pattern(&analyzer, &oracle, "Registry", false, &token);
    assert_eq!(items.len(), search::RESULTS_LIMIT);
    assert_eq!(items.last().unwrap().sort_key, "24 Data.Registry");
}

#[test]
fn oracle_failures_collapse_to_no_results() {
    let analyzer = fixture();
    let token = CancelToken::new();
    assert!(search::by_pattern(&analyzer, &FailingOracle, "register", false, &token).is_empty());
}

#[test]
fn cancelled_searches_collapse_to_no_results() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let oracle = FauxOracle::new(&["module Data.Registry"]);
    token.cancel();
    assert!(search::by_pattern(&analyzer, &oracle, "register", false, &token).is_empty());
}

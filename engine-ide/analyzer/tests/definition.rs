use analyzer::definition::{self, Resolution};
use analyzer::{Analyzer, NameInfo, NoInfo, locate};
use cancelling::CancelToken;
use files::{FileId, FileKind};
use syntax::{NodeId, NodeKind};

const MAIN: &str = "\
module Main where

import Data.Registry (register, Registry)
import qualified Data.Registry.Entry as Entry
import qualified Control.Monad

main :: IO ()
main = register Entry.entry

spin :: IO ()
spin = Control.Monad.forever main
";

const REGISTRY: &str = "\
module Data.Registry where

newtype Registry = Registry [String]

register :: String -> Registry -> Registry
register name (Registry names) = Registry (name : names)
";

const ENTRY: &str = "\
module Data.Registry.Entry where

entry :: Int
entry = 0
";

const MONAD: &str = "\
module Control.Monad where

forever :: m a -> m b
forever act = act >> forever act
";

const LOST: &str = "\
module Lost where

broken = missing
";

const DIRECT: &str = "\
module Direct where

import Data.Registry.Entry

value = Data.Registry.Entry.entry
";

const AMBIG: &str = "\
module Ambig where

import Data.Registry as R
import Data.Registry.Entry as R

value = R.register
";

const SIG: &str = "\
module Sig where

helper :: Int -> Int

value = helper 1
";

fn fixture() -> Analyzer {
    let analyzer = Analyzer::default();
    for (path, kind, source) in [
        ("src/Main.hs", FileKind::Project, MAIN),
        ("src/Data/Registry.hs", FileKind::Project, REGISTRY),
        ("src/Data/Registry/Entry.hs", FileKind::Project, ENTRY),
        ("lib/Control/Monad.hs", FileKind::Library, MONAD),
        ("src/Lost.hs", FileKind::Project, LOST),
        ("src/Direct.hs", FileKind::Project, DIRECT),
        ("src/Ambig.hs", FileKind::Project, AMBIG),
        ("src/Sig.hs", FileKind::Project, SIG),
    ] {
        analyzer.engine.insert_file(path, kind, source);
    }
    analyzer
}

fn file(analyzer: &Analyzer, path: &str) -> FileId {
    analyzer.engine.file_id(path).unwrap()
}

/// The deepest node at a 1-based position, for picking occurrences out of
/// the fixture sources.
fn node_at(analyzer: &Analyzer, file: FileId, line: u32, column: u32) -> NodeId {
    let content = analyzer.engine.content(file);
    let parsed = analyzer.engine.parsed(file);
    let offset = locate::position_to_offset(&content, line, column).unwrap();
    parsed.tree().node_at_offset(offset).unwrap()
}

fn element(analyzer: &Analyzer, path: &str, line: u32, column: u32) -> Resolution {
    let file = file(analyzer, path);
    Resolution::Element { file, node: node_at(analyzer, file, line, column) }
}

#[test]
fn plain_names_resolve_through_exposing_imports() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    let occurrence = node_at(&analyzer, main, 8, 8);
    let resolved = definition::resolve(&analyzer, main, occurrence, &token);
    assert_eq!(resolved, Some(element(&analyzer, "src/Data/Registry.hs", 6, 1)));
}

#[test]
fn resolution_by_position_finds_the_same_element() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    // Column 10 sits in the middle of `register`.
    let resolved = definition::resolve_at(&analyzer, main, 8, 10, &token);
    assert_eq!(resolved, Some(element(&analyzer, "src/Data/Registry.hs", 6, 1)));
}

#[test]
fn plain_occurrences_match_the_direct_lookup() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    // `main` in `spin`'s body: no import, signature or qualifier context.
    let occurrence = node_at(&analyzer, main, 11, 30);
    let resolved = definition::resolve(&analyzer, main, occurrence, &token);

    let engine = &analyzer.engine;
    let infos = resolving::name_infos(engine, engine, main, None, "main", &token).unwrap();
    let [NameInfo::Project { file, position, .. }] = infos.as_slice() else {
        panic!("expected one project info, got {infos:?}");
    };
    let node = locate::identifier_by_location(
        engine,
        *file,
        position.line,
        position.column,
        "main",
        &token,
    )
    .unwrap();
    assert_eq!(resolved, Some(Resolution::Element { file: *file, node }));
}

#[test]
fn qualified_names_resolve_through_their_alias() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    let occurrence = node_at(&analyzer, main, 8, 23);
    let resolved = definition::resolve(&analyzer, main, occurrence, &token);
    assert_eq!(resolved, Some(element(&analyzer, "src/Data/Registry/Entry.hs", 4, 1)));
}

#[test]
fn qualifier_occurrences_land_on_the_import_alias() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    let occurrence = node_at(&analyzer, main, 8, 17);
    let resolved = definition::resolve(&analyzer, main, occurrence, &token);
    assert_eq!(resolved, Some(element(&analyzer, "src/Main.hs", 4, 41)));
    let Some(Resolution::Element { file, node }) = resolved else {
        panic!("expected an element");
    };
    let parsed = analyzer.engine.parsed(file);
    assert_eq!(parsed.tree().kind(node), NodeKind::Qualifier);
}

#[test]
fn unmatched_qualifiers_fall_back_to_the_module() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let direct = file(&analyzer, "src/Direct.hs");
    // `import Data.Registry.Entry` is neither qualified nor aliased, so no
    // import answers to the qualifier and the module map decides.
    let resolved = definition::resolve_at(&analyzer, direct, 5, 9, &token);
    let entry = file(&analyzer, "src/Data/Registry/Entry.hs");
    assert_eq!(resolved, Some(Resolution::File { file: entry }));
}

#[test]
fn ambiguous_qualifiers_resolve_to_nothing() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let ambig = file(&analyzer, "src/Ambig.hs");
    assert_eq!(definition::resolve_at(&analyzer, ambig, 6, 9, &token), None);
}

#[test]
fn module_ids_resolve_to_their_file() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    let registry = file(&analyzer, "src/Data/Registry.hs");
    let import = node_at(&analyzer, main, 3, 8);
    assert_eq!(
        definition::resolve(&analyzer, main, import, &token),
        Some(Resolution::File { file: registry })
    );
    let header = node_at(&analyzer, main, 1, 8);
    assert_eq!(
        definition::resolve(&analyzer, main, header, &token),
        Some(Resolution::File { file: main })
    );
}

#[test]
fn import_list_items_point_into_the_imported_module() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    let value_item = node_at(&analyzer, main, 3, 23);
    assert_eq!(
        definition::resolve(&analyzer, main, value_item, &token),
        Some(element(&analyzer, "src/Data/Registry.hs", 6, 1))
    );
    let type_item = node_at(&analyzer, main, 3, 33);
    assert_eq!(
        definition::resolve(&analyzer, main, type_item, &token),
        Some(element(&analyzer, "src/Data/Registry.hs", 3, 9))
    );
}

#[test]
fn signature_names_jump_to_the_equation_below() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let registry = file(&analyzer, "src/Data/Registry.hs");
    let occurrence = node_at(&analyzer, registry, 5, 1);
    let resolved = definition::resolve(&analyzer, registry, occurrence, &token);
    assert_eq!(resolved, Some(element(&analyzer, "src/Data/Registry.hs", 6, 1)));
}

#[test]
fn signatures_without_equations_answer_for_themselves() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let sig = file(&analyzer, "src/Sig.hs");
    let occurrence = node_at(&analyzer, sig, 3, 1);
    let resolved = definition::resolve(&analyzer, sig, occurrence, &token);
    assert_eq!(resolved, Some(Resolution::Element { file: sig, node: occurrence }));
}

#[test]
fn library_names_resolve_to_declaration_headers() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    let occurrence = node_at(&analyzer, main, 11, 22);
    let resolved = definition::resolve(&analyzer, main, occurrence, &token);
    assert_eq!(resolved, Some(element(&analyzer, "lib/Control/Monad.hs", 3, 1)));
}

#[test]
fn lookups_that_complete_empty_report_the_failure() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let lost = file(&analyzer, "src/Lost.hs");
    let occurrence = node_at(&analyzer, lost, 3, 10);
    let resolved = definition::resolve(&analyzer, lost, occurrence, &token);
    let Some(Resolution::Failed(NoInfo::NoInfoAvailable { name, .. })) = resolved else {
        panic!("expected a reported failure, got {resolved:?}");
    };
    assert_eq!(name, "missing");
}

#[test]
fn cancelled_requests_resolve_to_nothing() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    let occurrence = node_at(&analyzer, main, 8, 8);
    token.cancel();
    assert_eq!(definition::resolve(&analyzer, main, occurrence, &token), None);
    assert_eq!(definition::resolve_at(&analyzer, main, 8, 8, &token), None);
}

#[test]
fn resolution_is_stable_across_repeated_queries() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    let occurrence = node_at(&analyzer, main, 8, 8);
    let first = definition::resolve(&analyzer, main, occurrence, &token);
    let second = definition::resolve(&analyzer, main, occurrence, &token);
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn non_reference_nodes_resolve_to_nothing() {
    let analyzer = fixture();
    let token = CancelToken::new();
    let main = file(&analyzer, "src/Main.hs");
    let parsed = analyzer.engine.parsed(main);
    let root = parsed.tree().root();
    assert_eq!(definition::resolve(&analyzer, main, root, &token), None);
}

//! Symbol search backed by an external search oracle.

use cancelling::CancelToken;
use files::FileId;
use hoogle::{ResultLine, SearchOracle};
use resolving::ModuleIndex;
use smol_str::SmolStr;
use syntax::NodeId;

use crate::{Analyzer, definition, locate};

/// The oracle is never asked for more than this many results.
pub const RESULTS_LIMIT: usize = 25;

/// What a navigation item points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTarget {
    Element { file: FileId, node: NodeId },
    File { file: FileId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Module,
    Package,
    Declaration,
    Unknown,
}

/// One row of the goto-symbol popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationItem {
    pub name: SmolStr,
    /// Where the item claims to live, usually its module.
    pub location: String,
    pub kind: ItemKind,
    /// Embeds the oracle's rank, so sorting by this key downstream
    /// reproduces the oracle's order.
    pub sort_key: String,
    /// `None` marks a presentation-only placeholder.
    pub target: Option<NavigationTarget>,
}

/// Searches the oracle for `pattern` and resolves what it can.
///
/// With `project_scope` the query is narrowed to the configured project
/// packages. Oracle failures and cancellation both collapse to no results.
pub fn by_pattern(
    analyzer: &Analyzer,
    oracle: &impl SearchOracle,
    pattern: &str,
    project_scope: bool,
    token: &CancelToken,
) -> Vec<NavigationItem> {
    if token.guard().is_none() {
        return Vec::new();
    }
    let pattern = if project_scope {
        scoped_pattern(pattern, &analyzer.settings.project_packages)
    } else {
        pattern.to_string()
    };
    let lines = match oracle.search(&pattern, RESULTS_LIMIT) {
        Ok(lines) => lines,
        Err(error) => {
            tracing::warn!("Symbol search for '{pattern}' failed: {error}");
            return Vec::new();
        }
    };
    let mut items = Vec::new();
    for (rank, line) in lines.iter().take(RESULTS_LIMIT).enumerate() {
        if token.guard().is_none() {
            return Vec::new();
        }
        items.push(line_item(analyzer, rank, line, token));
    }
    items
}

fn scoped_pattern(pattern: &str, packages: &[String]) -> String {
    let mut scoped = String::from(pattern);
    for package in packages {
        scoped.push_str(" +");
        scoped.push_str(package);
    }
    scoped
}

fn line_item(analyzer: &Analyzer, rank: usize, line: &str, token: &CancelToken) -> NavigationItem {
    let classified = ResultLine::classify(line);
    match &classified {
        ResultLine::Module { module } => NavigationItem {
            name: module.clone(),
            location: module.to_string(),
            kind: ItemKind::Module,
            sort_key: sort_key(rank, module),
            target: module_target(analyzer, module, token),
        },
        ResultLine::Package { package } => NavigationItem {
            name: package.clone(),
            location: package.to_string(),
            kind: ItemKind::Package,
            sort_key: sort_key(rank, package),
            target: None,
        },
        ResultLine::Declaration { module, declaration } => match classified.declared_name() {
            Some(name) => NavigationItem {
                name: SmolStr::new(name),
                location: module.to_string(),
                kind: ItemKind::Declaration,
                sort_key: sort_key(rank, name),
                target: declaration_target(analyzer, module, name, token),
            },
            None => NavigationItem {
                name: SmolStr::new(declaration),
                location: module.to_string(),
                kind: ItemKind::Declaration,
                sort_key: sort_key(rank, declaration),
                target: None,
            },
        },
        ResultLine::Unrecognized { line } => NavigationItem {
            name: SmolStr::new(line),
            location: String::new(),
            kind: ItemKind::Unknown,
            sort_key: sort_key(rank, line),
            target: None,
        },
    }
}

fn module_target(
    analyzer: &Analyzer,
    module: &str,
    token: &CancelToken,
) -> Option<NavigationTarget> {
    let files = analyzer.engine.files_for_module(module, token).ok()?;
    let file = files.first().copied()?;
    Some(NavigationTarget::File { file })
}

/// Resolution through name infos first, then a direct lookup by module and
/// name; a declaration neither finds stays a placeholder.
fn declaration_target(
    analyzer: &Analyzer,
    module: &str,
    name: &str,
    token: &CancelToken,
) -> Option<NavigationTarget> {
    let engine = &analyzer.engine;
    let resolved = resolving::module_name_infos(engine, engine, module, name, token)
        .ok()
        .and_then(|infos| {
            infos.iter().find_map(|info| definition::info_element(analyzer, info, name, token))
        });
    resolved
        .or_else(|| {
            locate::identifiers_by_module_name(engine, engine, module, name, token)
                .into_iter()
                .next()
        })
        .map(|(file, node)| NavigationTarget::Element { file, node })
}

/// `03 foldr`: two zero-padded rank digits ahead of the display name.
fn sort_key(rank: usize, name: &str) -> String {
    format!("{rank:02} {name}")
}

//! IDE-facing navigation built on the query engine: locating identifiers,
//! resolving references to their definitions, and symbol search.

pub mod definition;
pub mod locate;
pub mod search;
pub mod settings;

pub use querying::QueryEngine;
pub use resolving::{NameInfo, NoInfo};

use crate::settings::AnalyzerSettings;

/// Everything a navigation request runs against.
pub struct Analyzer {
    pub engine: QueryEngine,
    pub settings: AnalyzerSettings,
}

impl Analyzer {
    pub fn new(settings: AnalyzerSettings) -> Analyzer {
        Analyzer { engine: QueryEngine::new(), settings }
    }
}

impl Default for Analyzer {
    fn default() -> Analyzer {
        Analyzer::new(AnalyzerSettings::default())
    }
}

//! Invocation of the hoogle command-line tool and classification of its
//! plain-text output.
//!
//! Hoogle answers a search with one result per line. Three line shapes are
//! meaningful for navigation: a module declaration, a package declaration,
//! and a `moduleName declaration-text` pair. Everything else is carried
//! through unrecognized so callers can still present it.

use std::io;
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HoogleError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("hoogle exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("hoogle produced output that is not valid UTF-8")]
    Encoding,
}

/// External search service invoked for symbol navigation.
pub trait SearchOracle {
    /// Runs a search bounded to `limit` results, yielding raw output lines.
    fn search(&self, pattern: &str, limit: usize) -> Result<Vec<String>, HoogleError>;
}

/// The hoogle binary, invoked synchronously on the caller's thread.
pub struct Hoogle {
    path: String,
}

impl Hoogle {
    pub fn new(path: impl Into<String>) -> Hoogle {
        Hoogle { path: path.into() }
    }
}

impl SearchOracle for Hoogle {
    fn search(&self, pattern: &str, limit: usize) -> Result<Vec<String>, HoogleError> {
        tracing::debug!("Invoking hoogle for '{pattern}'");
        let output =
            Command::new(&self.path).arg(pattern).arg(format!("--count={limit}")).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!("Hoogle failed with {}: {stderr}", output.status);
            return Err(HoogleError::Failed { status: output.status.to_string(), stderr });
        }
        let stdout = String::from_utf8(output.stdout).map_err(|_| HoogleError::Encoding)?;
        Ok(stdout.lines().filter(|line| !line.is_empty()).map(str::to_string).collect())
    }
}

static MODULE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^module ([A-Z][A-Za-z0-9_'.]*)$")
        .expect("invariant violated: MODULE_LINE must compile")
});

static PACKAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^package ([A-Za-z0-9][A-Za-z0-9-]*)$")
        .expect("invariant violated: PACKAGE_LINE must compile")
});

static DECLARATION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Za-z0-9_'.]*) (\S.*)$")
        .expect("invariant violated: DECLARATION_LINE must compile")
});

/// A classified line of hoogle output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultLine {
    /// `module Data.List`
    Module { module: SmolStr },
    /// `package base`
    Package { package: SmolStr },
    /// `Data.List foldr :: (a -> b -> b) -> b -> [a] -> b`
    Declaration { module: SmolStr, declaration: String },
    /// Anything the grammar above does not cover, including hoogle's own
    /// "No results found".
    Unrecognized { line: String },
}

/// Whether `text` reads as a declaration rather than free-form prose such
/// as "No results found". A declaration starts with a keyword or carries a
/// type annotation.
fn is_declaration_text(text: &str) -> bool {
    let keyword = text.split_whitespace().next().is_some_and(|word| {
        matches!(word, "data" | "newtype" | "type" | "class" | "pattern" | "module")
    });
    keyword || text.contains("::")
}

impl ResultLine {
    /// Classifies one output line. Module and package lines are checked
    /// first; the declaration shape is the permissive catch-all.
    pub fn classify(line: &str) -> ResultLine {
        if let Some(captures) = MODULE_LINE.captures(line) {
            return ResultLine::Module { module: SmolStr::new(&captures[1]) };
        }
        if let Some(captures) = PACKAGE_LINE.captures(line) {
            return ResultLine::Package { package: SmolStr::new(&captures[1]) };
        }
        if let Some(captures) = DECLARATION_LINE.captures(line) {
            let declaration = &captures[2];
            if is_declaration_text(declaration) {
                return ResultLine::Declaration {
                    module: SmolStr::new(&captures[1]),
                    declaration: declaration.to_string(),
                };
            }
        }
        ResultLine::Unrecognized { line: line.to_string() }
    }

    /// The name a declaration line declares: the first word of the
    /// declaration text, or the word after a declaration keyword, with
    /// outer parentheses stripped so operators match their declaration-site
    /// spelling.
    pub fn declared_name(&self) -> Option<&str> {
        let ResultLine::Declaration { declaration, .. } = self else {
            return None;
        };
        let mut words = declaration.split_whitespace();
        let first = words.next()?;
        let name = match first {
            "data" | "newtype" | "type" | "class" | "pattern" => words.next()?,
            _ => first,
        };
        Some(name.trim_start_matches('(').trim_end_matches(')'))
    }
}

#[cfg(test)]
mod tests {
    use super::ResultLine;

    #[test]
    fn module_lines_are_recognized() {
        let line = ResultLine::classify("module Data.List");
        assert_eq!(line, ResultLine::Module { module: "Data.List".into() });
    }

    #[test]
    fn package_lines_are_recognized() {
        let line = ResultLine::classify("package base");
        assert_eq!(line, ResultLine::Package { package: "base".into() });
    }

    #[test]
    fn declaration_lines_carry_module_and_text() {
        let line = ResultLine::classify("Data.List foldr :: (a -> b -> b) -> b -> [a] -> b");
        assert_eq!(
            line,
            ResultLine::Declaration {
                module: "Data.List".into(),
                declaration: "foldr :: (a -> b -> b) -> b -> [a] -> b".into(),
            }
        );
        assert_eq!(line.declared_name(), Some("foldr"));
    }

    #[test]
    fn operator_names_lose_their_outer_parentheses() {
        let line = ResultLine::classify("Control.Applicative (<|>) :: f a -> f a -> f a");
        assert_eq!(line.declared_name(), Some("<|>"));
    }

    #[test]
    fn keyword_declarations_name_the_word_after_the_keyword() {
        let line = ResultLine::classify("Data.Maybe data Maybe a");
        assert_eq!(line.declared_name(), Some("Maybe"));
        let line = ResultLine::classify("Data.Eq class Eq a");
        assert_eq!(line.declared_name(), Some("Eq"));
    }

    #[test]
    fn anything_else_is_unrecognized() {
        let line = ResultLine::classify("No results found");
        assert_eq!(line, ResultLine::Unrecognized { line: "No results found".into() });
        assert_eq!(line.declared_name(), None);
    }
}

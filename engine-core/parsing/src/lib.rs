//! Lexing and declaration-level parsing of Haskell source.

use std::sync::Arc;

use smol_str::SmolStr;
use syntax::{SyntaxTree, TextSize, ast};

mod lexer;
mod parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub offset: usize,
    pub position: Position,
    pub message: Arc<str>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParsedModule {
    tree: SyntaxTree,
    errors: Arc<[ParseError]>,
}

impl ParsedModule {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn module(&self) -> ast::Module {
        let tree = &self.tree;
        ast::Module::cast(tree, tree.root()).expect("invariant violated: expected ast::Module")
    }

    pub fn module_name(&self) -> Option<SmolStr> {
        let module = self.module();
        let header = module.header(&self.tree)?;
        header.name(&self.tree)
    }
}

pub fn parse(source: &str) -> ParsedModule {
    let (tokens, mut errors) = lexer::lex(source);
    let (tree, parse_errors) = parser::module(&tokens, TextSize::of(source));
    errors.extend(parse_errors);
    ParsedModule { tree, errors: Arc::from(errors) }
}

//! Declaration-level grammar.
//!
//! Top-level declarations are delimited by layout: a token that starts a line
//! at or left of the first declaration's column starts a new declaration.
//! Class and instance members follow the same rule against the first member's
//! column. Expression and type bodies are not given structure beyond their
//! named occurrences.

use std::sync::Arc;

use smol_str::SmolStrBuilder;
use syntax::{NodeKind, SyntaxTree, TextRange, TextSize, TreeBuilder};

use crate::ParseError;
use crate::lexer::{Token, TokenKind};

pub(crate) fn module(tokens: &[Token], end_of_source: TextSize) -> (SyntaxTree, Vec<ParseError>) {
    let mut parser = Parser { tokens, builder: TreeBuilder::new(), errors: Vec::new() };
    parser.builder.start_node(NodeKind::Module, TextSize::new(0));
    let mut index = 0;
    if parser.at_keyword(0, "module") {
        index = parser.module_header(0);
    }
    if index < tokens.len() {
        let top_column = tokens[index].position.column;
        while index < tokens.len() {
            let limit = parser.run_end(index + 1, tokens.len(), top_column);
            parser.declaration(index, limit);
            index = limit;
        }
    }
    parser.builder.finish_node(end_of_source);
    (parser.builder.finish(), parser.errors)
}

struct Parser<'t> {
    tokens: &'t [Token],
    builder: TreeBuilder,
    errors: Vec<ParseError>,
}

impl Parser<'_> {
    fn at_keyword(&self, index: usize, word: &str) -> bool {
        self.tokens.get(index).is_some_and(|t| t.kind == TokenKind::Keyword && t.text == word)
    }

    fn is_word(&self, index: usize, limit: usize, word: &str) -> bool {
        index < limit
            && self.tokens[index].kind == TokenKind::Lower
            && self.tokens[index].text == word
    }

    fn kind_at(&self, index: usize, limit: usize) -> Option<TokenKind> {
        (index < limit).then(|| self.tokens[index].kind)
    }

    fn first_on_line(&self, index: usize) -> bool {
        index == 0 || self.tokens[index].position.line > self.tokens[index - 1].position.line
    }

    fn run_end(&self, from: usize, limit: usize, column: u32) -> usize {
        (from..limit)
            .find(|&i| self.first_on_line(i) && self.tokens[i].position.column <= column)
            .unwrap_or(limit)
    }

    fn error_at(&mut self, index: usize, message: &str) {
        let token = &self.tokens[index.min(self.tokens.len() - 1)];
        self.errors.push(ParseError {
            offset: usize::from(token.range.start()),
            position: token.position,
            message: Arc::from(message),
        });
    }

    /// First token at bracket depth zero satisfying the predicate.
    fn find_depth0(
        &self,
        from: usize,
        limit: usize,
        predicate: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        let mut depth = 0i32;
        for index in from..limit {
            let token = &self.tokens[index];
            if is_closing(token.kind) {
                depth = (depth - 1).max(0);
            }
            if depth == 0 && predicate(token) {
                return Some(index);
            }
            if is_opening(token.kind) {
                depth += 1;
            }
        }
        None
    }

    fn find_depth0_last(
        &self,
        from: usize,
        limit: usize,
        predicate: impl Fn(&Token) -> bool,
    ) -> Option<usize> {
        let mut depth = 0i32;
        let mut found = None;
        for index in from..limit {
            let token = &self.tokens[index];
            if is_closing(token.kind) {
                depth = (depth - 1).max(0);
            }
            if depth == 0 && predicate(token) {
                found = Some(index);
            }
            if is_opening(token.kind) {
                depth += 1;
            }
        }
        found
    }

    fn find_matching(&self, open: usize, limit: usize) -> Option<usize> {
        let mut depth = 0i32;
        for index in open..limit {
            let kind = self.tokens[index].kind;
            if is_opening(kind) {
                depth += 1;
            } else if is_closing(kind) {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
        }
        None
    }

    fn identifier_leaf(&mut self, index: usize) {
        let token = &self.tokens[index];
        self.builder.token(NodeKind::Identifier, token.text.clone(), token.range);
    }

    /// The `Data.List.` prefix token as a `Data.List` qualifier leaf.
    fn qualifier_leaf(&mut self, index: usize) {
        let token = &self.tokens[index];
        let text = &token.text[..token.text.len() - 1];
        let range = TextRange::new(token.range.start(), token.range.end() - TextSize::new(1));
        self.builder.token(NodeKind::Qualifier, text, range);
    }

    fn qualified_name(&mut self, index: usize, limit: usize) -> usize {
        let followed = index + 1 < limit
            && matches!(
                self.tokens[index + 1].kind,
                TokenKind::Lower | TokenKind::Upper | TokenKind::Operator
            );
        if !followed {
            return index + 1;
        }
        let start = self.tokens[index].range.start();
        let end = self.tokens[index + 1].range.end();
        self.builder.start_node(NodeKind::QualifiedName, start);
        self.qualifier_leaf(index);
        self.identifier_leaf(index + 1);
        self.builder.finish_node(end);
        index + 2
    }

    /// `Data.List` or `List` as a single module id leaf.
    fn module_name_leaf(&mut self, index: usize, limit: usize) -> Option<usize> {
        self.dotted_leaf(index, limit, NodeKind::ModuleName)
    }

    /// An import alias after `as`, possibly dotted itself.
    fn alias_leaf(&mut self, index: usize, limit: usize) -> Option<usize> {
        self.dotted_leaf(index, limit, NodeKind::Qualifier)
    }

    fn dotted_leaf(&mut self, index: usize, limit: usize, kind: NodeKind) -> Option<usize> {
        match self.kind_at(index, limit)? {
            TokenKind::Prefix
                if index + 1 < limit && self.tokens[index + 1].kind == TokenKind::Upper =>
            {
                let mut text = SmolStrBuilder::default();
                text.push_str(&self.tokens[index].text);
                text.push_str(&self.tokens[index + 1].text);
                let range = TextRange::new(
                    self.tokens[index].range.start(),
                    self.tokens[index + 1].range.end(),
                );
                self.builder.token(kind, text.finish(), range);
                Some(index + 2)
            }
            TokenKind::Upper => {
                let token = &self.tokens[index];
                self.builder.token(kind, token.text.clone(), token.range);
                Some(index + 1)
            }
            _ => None,
        }
    }

    /// Named occurrences in an unstructured region: identifiers, operators,
    /// and qualified names become leaves, everything else is skipped.
    fn sweep(&mut self, from: usize, limit: usize) {
        let mut index = from;
        while index < limit {
            match self.tokens[index].kind {
                TokenKind::Lower | TokenKind::Upper | TokenKind::Operator => {
                    self.identifier_leaf(index);
                    index += 1;
                }
                TokenKind::Prefix => index = self.qualified_name(index, limit),
                _ => index += 1,
            }
        }
    }

    fn binders(&mut self, from: usize, to: usize) {
        if from >= to {
            return;
        }
        self.builder.start_node(NodeKind::Binder, self.tokens[from].range.start());
        self.sweep(from, to);
        self.builder.finish_node(self.tokens[to - 1].range.end());
    }

    fn type_body(&mut self, from: usize, to: usize) {
        if from >= to {
            return;
        }
        self.builder.start_node(NodeKind::TypeBody, self.tokens[from].range.start());
        self.sweep(from, to);
        self.builder.finish_node(self.tokens[to - 1].range.end());
    }

    fn module_header(&mut self, start: usize) -> usize {
        let where_idx = (start + 1..self.tokens.len())
            .find(|&i| self.tokens[i].kind == TokenKind::Keyword && self.tokens[i].text == "where");
        let limit = match where_idx {
            Some(where_idx) => where_idx + 1,
            None => {
                self.error_at(start, "expected where");
                self.run_end(start + 1, self.tokens.len(), self.tokens[start].position.column)
            }
        };
        self.builder.start_node(NodeKind::ModuleHeader, self.tokens[start].range.start());
        let mut index = start + 1;
        match self.module_name_leaf(index, limit) {
            Some(next) => index = next,
            None => self.error_at(start, "expected module name"),
        }
        if self.kind_at(index, limit) == Some(TokenKind::LeftParen) {
            self.export_list(index, limit);
        }
        self.builder.finish_node(self.tokens[limit - 1].range.end());
        limit
    }

    fn export_list(&mut self, open: usize, limit: usize) {
        let close = self.find_matching(open, limit);
        if close.is_none() {
            self.error_at(open, "expected closing parenthesis");
        }
        let inner_end = close.unwrap_or(limit);
        self.builder.start_node(NodeKind::ExportList, self.tokens[open].range.start());
        let mut index = open + 1;
        while index < inner_end {
            if self.at_keyword(index, "module") {
                index += 1;
                if let Some(next) = self.module_name_leaf(index, inner_end) {
                    index = next;
                }
                continue;
            }
            index = match self.tokens[index].kind {
                TokenKind::Lower | TokenKind::Upper | TokenKind::Operator => {
                    self.identifier_leaf(index);
                    index + 1
                }
                TokenKind::Prefix => self.qualified_name(index, inner_end),
                _ => index + 1,
            };
        }
        self.builder.finish_node(self.tokens[close.unwrap_or(limit - 1)].range.end());
    }

    fn declaration(&mut self, start: usize, limit: usize) {
        let token = &self.tokens[start];
        match (token.kind, token.text.as_str()) {
            (TokenKind::Keyword, "import") => self.import_decl(start, limit),
            (TokenKind::Keyword, "data") => self.data_like(start, limit, NodeKind::DataDecl),
            (TokenKind::Keyword, "newtype") => self.data_like(start, limit, NodeKind::NewtypeDecl),
            (TokenKind::Keyword, "type")
                if self.kind_at(start + 1, limit) == Some(TokenKind::Upper) =>
            {
                self.type_synonym(start, limit)
            }
            (TokenKind::Keyword, "class") => self.class_like(start, limit, NodeKind::ClassDecl),
            (TokenKind::Keyword, "instance") => {
                self.class_like(start, limit, NodeKind::InstanceDecl)
            }
            (TokenKind::Keyword, _) => self.other_decl(start, limit),
            _ => {
                let signature = self.find_depth0(start, limit, |t| {
                    t.kind == TokenKind::ReservedOp && t.text == "::"
                });
                let equation = self.find_depth0(start, limit, |t| {
                    t.kind == TokenKind::ReservedOp && (t.text == "=" || t.text == "|")
                });
                match (signature, equation) {
                    (Some(signature), None) => self.type_signature(start, limit, signature),
                    (Some(signature), Some(equation)) if signature < equation => {
                        self.type_signature(start, limit, signature)
                    }
                    (_, Some(equation)) => self.value_equation(start, limit, equation),
                    (None, None) => self.other_decl(start, limit),
                }
            }
        }
    }

    fn import_decl(&mut self, start: usize, limit: usize) {
        self.builder.start_node(NodeKind::ImportDecl, self.tokens[start].range.start());
        let mut index = start + 1;
        if self.is_word(index, limit, "qualified") {
            self.builder.marker(NodeKind::Qualified, self.tokens[index].range);
            index += 1;
        }
        match self.module_name_leaf(index, limit) {
            Some(next) => index = next,
            None => self.error_at(start, "expected module name"),
        }
        // ImportQualifiedPost style.
        if self.is_word(index, limit, "qualified") {
            self.builder.marker(NodeKind::Qualified, self.tokens[index].range);
            index += 1;
        }
        if self.is_word(index, limit, "as") {
            index += 1;
            match self.alias_leaf(index, limit) {
                Some(next) => index = next,
                None => self.error_at(index, "expected import alias"),
            }
        }
        let hiding = self.is_word(index, limit, "hiding");
        if hiding {
            index += 1;
        }
        if self.kind_at(index, limit) == Some(TokenKind::LeftParen) {
            let kind = if hiding { NodeKind::HidingList } else { NodeKind::ImportList };
            self.import_list(index, limit, kind);
        }
        self.builder.finish_node(self.tokens[limit - 1].range.end());
    }

    fn import_list(&mut self, open: usize, limit: usize, kind: NodeKind) {
        let close = self.find_matching(open, limit);
        if close.is_none() {
            self.error_at(open, "expected closing parenthesis");
        }
        let inner_end = close.unwrap_or(limit);
        self.builder.start_node(kind, self.tokens[open].range.start());
        let mut index = open + 1;
        while index < inner_end {
            let comma = self
                .find_depth0(index, inner_end, |t| t.kind == TokenKind::Comma)
                .unwrap_or(inner_end);
            if index < comma {
                self.import_item(index, comma);
            }
            index = comma + 1;
        }
        self.builder.finish_node(self.tokens[close.unwrap_or(limit - 1)].range.end());
    }

    fn import_item(&mut self, start: usize, limit: usize) {
        self.builder.start_node(NodeKind::ImportItem, self.tokens[start].range.start());
        let mut index = start;
        if index + 1 < limit {
            let lead = &self.tokens[index];
            let marker = (lead.kind == TokenKind::Keyword && lead.text == "type")
                || (lead.kind == TokenKind::Lower && lead.text == "pattern");
            if marker {
                index += 1;
            }
        }
        match self.kind_at(index, limit) {
            Some(TokenKind::LeftParen)
                if index + 2 < limit
                    && self.tokens[index + 1].kind == TokenKind::Operator
                    && self.tokens[index + 2].kind == TokenKind::RightParen =>
            {
                self.identifier_leaf(index + 1);
                index += 3;
            }
            Some(TokenKind::Lower | TokenKind::Upper | TokenKind::Operator) => {
                self.identifier_leaf(index);
                index += 1;
            }
            _ => {}
        }
        self.sweep(index, limit);
        self.builder.finish_node(self.tokens[limit - 1].range.end());
    }

    fn type_signature(&mut self, start: usize, limit: usize, sig_idx: usize) {
        self.builder.start_node(NodeKind::TypeSignature, self.tokens[start].range.start());
        let mut index = start;
        while index < sig_idx {
            match self.tokens[index].kind {
                TokenKind::Lower => {
                    self.identifier_leaf(index);
                    index += 1;
                }
                TokenKind::LeftParen
                    if index + 2 < sig_idx
                        && self.tokens[index + 1].kind == TokenKind::Operator
                        && self.tokens[index + 2].kind == TokenKind::RightParen =>
                {
                    self.identifier_leaf(index + 1);
                    index += 3;
                }
                _ => index += 1,
            }
        }
        self.type_body(sig_idx + 1, limit);
        self.builder.finish_node(self.tokens[limit - 1].range.end());
    }

    fn value_equation(&mut self, start: usize, limit: usize, eq_idx: usize) {
        self.builder.start_node(NodeKind::ValueEquation, self.tokens[start].range.start());
        let parenthesized = self.tokens[start].kind == TokenKind::LeftParen
            && start + 2 < eq_idx
            && self.tokens[start + 1].kind == TokenKind::Operator
            && self.tokens[start + 2].kind == TokenKind::RightParen;
        if parenthesized {
            self.identifier_leaf(start + 1);
            self.binders(start + 3, eq_idx);
        } else if let Some((name, backtick)) = self.infix_name(start + 1, eq_idx) {
            self.binders(start, if backtick { name - 1 } else { name });
            self.identifier_leaf(name);
            self.binders(if backtick { name + 2 } else { name + 1 }, eq_idx);
        } else if self.tokens[start].kind == TokenKind::Lower {
            self.identifier_leaf(start);
            self.binders(start + 1, eq_idx);
        } else {
            self.binders(start, eq_idx);
        }
        self.builder.start_node(NodeKind::Expression, self.tokens[eq_idx].range.start());
        self.sweep(eq_idx + 1, limit);
        self.builder.finish_node(self.tokens[limit - 1].range.end());
        self.builder.finish_node(self.tokens[limit - 1].range.end());
    }

    /// An infix-style definition name on the left-hand side: a depth-zero
    /// operator, or a backtick-quoted identifier. Bang patterns (`f !x`) bind
    /// tight to the right and do not count.
    fn infix_name(&self, from: usize, limit: usize) -> Option<(usize, bool)> {
        let mut depth = 0i32;
        for index in from..limit {
            let token = &self.tokens[index];
            if is_closing(token.kind) {
                depth = (depth - 1).max(0);
            }
            if depth == 0 {
                match token.kind {
                    TokenKind::Operator if !self.is_bang_pattern(index, limit) => {
                        return Some((index, false));
                    }
                    TokenKind::Backtick
                        if index + 2 < limit
                            && matches!(
                                self.tokens[index + 1].kind,
                                TokenKind::Lower | TokenKind::Upper
                            )
                            && self.tokens[index + 2].kind == TokenKind::Backtick =>
                    {
                        return Some((index + 1, true));
                    }
                    _ => {}
                }
            }
            if is_opening(token.kind) {
                depth += 1;
            }
        }
        None
    }

    fn is_bang_pattern(&self, index: usize, limit: usize) -> bool {
        let token = &self.tokens[index];
        if token.text != "!" {
            return false;
        }
        let tight_right =
            index + 1 < limit && self.tokens[index + 1].range.start() == token.range.end();
        let open_left =
            index == 0 || self.tokens[index - 1].range.end() < token.range.start();
        tight_right && open_left
    }

    fn data_like(&mut self, start: usize, limit: usize, kind: NodeKind) {
        self.builder.start_node(kind, self.tokens[start].range.start());
        let equals = self
            .find_depth0(start + 1, limit, |t| t.kind == TokenKind::ReservedOp && t.text == "=");
        let gadt = self
            .find_depth0(start + 1, limit, |t| t.kind == TokenKind::Keyword && t.text == "where");
        let header_end = equals.unwrap_or(limit).min(gadt.unwrap_or(limit));
        let mut index = self.context(start + 1, header_end);
        if self.kind_at(index, header_end) == Some(TokenKind::Upper) {
            self.identifier_leaf(index);
            index += 1;
        }
        self.binders(index, header_end);
        if let Some(equals) = equals.filter(|&e| gadt.is_none_or(|w| e < w)) {
            let deriving = self
                .find_depth0(equals + 1, limit, |t| {
                    t.kind == TokenKind::Keyword && t.text == "deriving"
                })
                .unwrap_or(limit);
            let mut alt = equals + 1;
            while alt < deriving {
                let bar = self
                    .find_depth0(alt, deriving, |t| {
                        t.kind == TokenKind::ReservedOp && t.text == "|"
                    })
                    .unwrap_or(deriving);
                self.constructor_alt(alt, bar);
                alt = bar + 1;
            }
            self.type_body(deriving + 1, limit);
        } else if let Some(gadt) = gadt {
            self.type_body(gadt + 1, limit);
        }
        self.builder.finish_node(self.tokens[limit - 1].range.end());
    }

    /// One `|`-separated constructor alternative. Infix constructors are
    /// operators starting with a colon.
    fn constructor_alt(&mut self, start: usize, limit: usize) {
        if start >= limit {
            return;
        }
        let infix = self.find_depth0(start, limit, |t| {
            t.kind == TokenKind::Operator && t.text.starts_with(':')
        });
        if let Some(op) = infix {
            self.type_body(start, op);
            self.identifier_leaf(op);
            self.type_body(op + 1, limit);
        } else if self.tokens[start].kind == TokenKind::Upper {
            self.identifier_leaf(start);
            self.type_body(start + 1, limit);
        } else {
            self.type_body(start, limit);
        }
    }

    /// A class or instance context up to the last depth-zero `=>`.
    fn context(&mut self, from: usize, header_end: usize) -> usize {
        let arrow = self.find_depth0_last(from, header_end, |t| {
            t.kind == TokenKind::ReservedOp && t.text == "=>"
        });
        let Some(arrow) = arrow else {
            return from;
        };
        self.builder.start_node(NodeKind::TypeBody, self.tokens[from].range.start());
        self.sweep(from, arrow);
        self.builder.finish_node(self.tokens[arrow].range.end());
        arrow + 1
    }

    fn class_like(&mut self, start: usize, limit: usize, kind: NodeKind) {
        self.builder.start_node(kind, self.tokens[start].range.start());
        let where_idx = self
            .find_depth0(start + 1, limit, |t| t.kind == TokenKind::Keyword && t.text == "where");
        let header_end = where_idx.unwrap_or(limit);
        let mut index = self.context(start + 1, header_end);
        if kind == NodeKind::ClassDecl {
            if self.kind_at(index, header_end) == Some(TokenKind::Upper) {
                self.identifier_leaf(index);
                index += 1;
            }
            self.binders(index, header_end);
        } else {
            match self.kind_at(index, header_end) {
                Some(TokenKind::Prefix) => index = self.qualified_name(index, header_end),
                Some(TokenKind::Upper) => {
                    self.identifier_leaf(index);
                    index += 1;
                }
                _ => {}
            }
            self.type_body(index, header_end);
        }
        if let Some(where_idx) = where_idx {
            let mut member = where_idx + 1;
            if member < limit {
                let member_column = self.tokens[member].position.column;
                while member < limit {
                    let member_end = self.run_end(member + 1, limit, member_column);
                    self.declaration(member, member_end);
                    member = member_end;
                }
            }
        }
        self.builder.finish_node(self.tokens[limit - 1].range.end());
    }

    fn type_synonym(&mut self, start: usize, limit: usize) {
        self.builder.start_node(NodeKind::TypeSynonym, self.tokens[start].range.start());
        let mut index = start + 1;
        if self.kind_at(index, limit) == Some(TokenKind::Upper) {
            self.identifier_leaf(index);
            index += 1;
        }
        let equals =
            self.find_depth0(index, limit, |t| t.kind == TokenKind::ReservedOp && t.text == "=");
        match equals {
            Some(equals) => {
                self.binders(index, equals);
                self.type_body(equals + 1, limit);
            }
            None => self.type_body(index, limit),
        }
        self.builder.finish_node(self.tokens[limit - 1].range.end());
    }

    fn other_decl(&mut self, start: usize, limit: usize) {
        self.builder.start_node(NodeKind::OtherDecl, self.tokens[start].range.start());
        self.sweep(start, limit);
        self.builder.finish_node(self.tokens[limit - 1].range.end());
    }
}

fn is_opening(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace)
}

fn is_closing(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace)
}

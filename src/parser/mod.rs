pub mod class_;
pub mod signature;

#[cfg(test)]
pub mod test;

use crate::ast::{CloseMarker, Document, Ident, Include, NamespaceBlock};
use crate::lexer::{LexError, Lexer, Spanned, Token};

use thiserror::Error;
use tracing::debug;

use std::iter::Peekable;
use std::ops::Range;

type TokenIter<'a> = Peekable<Lexer<'a>>;

pub const NAMESPACE_SYNTAX: &str = "\
namespaces are declared as
    namespace name {
    ...
    }///\\namespace name";

pub const CLASS_SYNTAX: &str = "\
classes are declared as
    class Name {
      Name(Type arg, ...);
      [static] ReturnType method(Type arg, ...) [const];
    };
or forward-declared as `class Name;`";

pub const METHOD_SYNTAX: &str = "\
methods are declared one per line as
    [static] ReturnType method(Type arg, ...) [const];";

#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: expected {expected}, found {found}")]
pub struct SyntaxError {
    pub line: usize,
    pub expected: String,
    pub found: String,
    pub span: Range<usize>,
    pub hint: Option<&'static str>,
}

/// The two ways a document can fail before a tree exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl FrontendError {
    pub fn with_hint(self, hint: &'static str) -> Self {
        match self {
            FrontendError::Syntax(mut err) => {
                err.hint.get_or_insert(hint);
                FrontendError::Syntax(err)
            }
            other => other,
        }
    }

    pub fn span(&self) -> Range<usize> {
        match self {
            FrontendError::Lex(err) => err.span(),
            FrontendError::Syntax(err) => err.span.clone(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            FrontendError::Lex(err) => err.line(),
            FrontendError::Syntax(err) => err.line,
        }
    }
}

/// Parsing stopped at `error`; `partial` holds everything completed before it.
#[derive(Debug)]
pub struct Halted {
    pub partial: Document,
    pub error: FrontendError,
}

/// The chain of namespaces enclosing the parse position. The bottom frame is
/// the global namespace and is never popped.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<NamespaceBlock>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        ScopeStack::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![NamespaceBlock::root()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn path(&self) -> Vec<String> {
        self.frames
            .iter()
            .filter_map(|frame| frame.name.as_ref().map(|name| name.name.clone()))
            .collect()
    }

    pub fn current(&mut self) -> &mut NamespaceBlock {
        match self.frames.last_mut() {
            Some(frame) => frame,
            None => unreachable!("the global frame is never popped"),
        }
    }

    pub fn current_name(&self) -> Option<&str> {
        self.frames
            .last()
            .and_then(|frame| frame.name.as_ref())
            .map(|name| name.name.as_str())
    }

    pub fn open(&mut self, block: NamespaceBlock) {
        self.frames.push(block);
    }

    /// Pops the innermost namespace into its parent. Returns false when only
    /// the global namespace is open.
    pub fn close(&mut self, marker: CloseMarker) -> bool {
        if self.depth() == 0 {
            return false;
        }
        let Some(mut block) = self.frames.pop() else {
            return false;
        };
        block.close = Some(marker);
        self.current().namespaces.push(block);
        true
    }

    /// Folds every still-open namespace into its parent, leaving their
    /// close markers empty.
    pub fn into_root(mut self) -> NamespaceBlock {
        while self.frames.len() > 1 {
            if let Some(block) = self.frames.pop() {
                self.current().namespaces.push(block);
            }
        }
        self.frames.pop().unwrap_or_else(NamespaceBlock::root)
    }
}

pub struct Parser<'a> {
    tokens: TokenIter<'a>,
    file: String,
    last_span: Range<usize>,
    last_line: usize,
    // line on which the previous top-level declaration ended
    last_decl_line: Option<usize>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: TokenIter<'a>, file: String) -> Self {
        Parser {
            tokens,
            file,
            last_span: 0..0,
            last_line: 1,
            last_decl_line: None,
        }
    }

    pub fn from_source(source: &'a str, file: impl Into<String>) -> Self {
        Parser::new(Lexer::new(source).peekable(), file.into())
    }

    pub fn parse_document(&mut self) -> Result<Document, Halted> {
        let mut scopes = ScopeStack::new();
        match self.parse_items(&mut scopes) {
            Ok(()) => {
                let root = scopes.into_root();
                debug!(
                    file = %self.file,
                    namespaces = root.namespaces.len(),
                    classes = root.classes.len(),
                    "parsed document"
                );
                Ok(Document { root })
            }
            Err(error) => {
                debug!(file = %self.file, line = error.line(), "parse halted");
                Err(Halted {
                    partial: Document {
                        root: scopes.into_root(),
                    },
                    error,
                })
            }
        }
    }

    pub fn parse_items(&mut self, scopes: &mut ScopeStack) -> Result<(), FrontendError> {
        let mut includes: Vec<Include> = vec![];

        while let Some(token) = self.peek_token()? {
            match token {
                Token::Include(_) => includes.push(self.parse_include()?),
                Token::KeywordNamespace => {
                    let block = self.parse_namespace_open(std::mem::take(&mut includes))?;
                    scopes.open(block);
                }
                Token::KeywordClass => {
                    self.parse_class(scopes, std::mem::take(&mut includes))?;
                }
                Token::NamespaceClose(_) if !includes.is_empty() => {
                    return Err(self.unexpected("`class` or `namespace` after an include line"));
                }
                Token::NamespaceClose(_) => self.parse_close(scopes)?,
                Token::RBrace if scopes.depth() > 0 => {
                    let expected = format!(
                        "`}}///\\namespace {}` to close the namespace",
                        scopes.current_name().unwrap_or_default()
                    );
                    return Err(self.unexpected(expected).with_hint(NAMESPACE_SYNTAX));
                }
                _ => {
                    return Err(self
                        .unexpected("`namespace`, `class` or `#include`")
                        .with_hint(CLASS_SYNTAX));
                }
            }
        }

        if let Some(include) = includes.first() {
            return Err(SyntaxError {
                line: include.line,
                expected: "`class` or `namespace` after an include line".to_string(),
                found: "end of file".to_string(),
                span: include.span.clone(),
                hint: None,
            }
            .into());
        }
        if scopes.depth() > 0 {
            let expected = format!(
                "`}}///\\namespace {}` to close the namespace",
                scopes.current_name().unwrap_or_default()
            );
            return Err(self.eof_error(expected).with_hint(NAMESPACE_SYNTAX));
        }
        Ok(())
    }

    pub fn parse_include(&mut self) -> Result<Include, FrontendError> {
        let Spanned { token, span, line } = self.advance("`#include <path>`")?;
        match token {
            Token::Include(path) => Ok(Include { path, span, line }),
            other => Err(syntax_error(line, "`#include <path>`", &other, span)),
        }
    }

    pub fn parse_namespace_open(
        &mut self,
        includes: Vec<Include>,
    ) -> Result<NamespaceBlock, FrontendError> {
        let keyword = self.expect(Token::KeywordNamespace, "`namespace`")?;
        if self.last_decl_line == Some(keyword.line) {
            return Err(syntax_error(
                keyword.line,
                "a line break (one declaration per line)",
                &keyword.token,
                keyword.span,
            )
            .with_hint(NAMESPACE_SYNTAX));
        }
        let name = self
            .expect_ident("namespace name")
            .map_err(|err| err.with_hint(NAMESPACE_SYNTAX))?;
        self.expect(Token::LBrace, "`{` after the namespace name")
            .map_err(|err| err.with_hint(NAMESPACE_SYNTAX))?;
        Ok(NamespaceBlock::named(name, includes))
    }

    fn parse_close(&mut self, scopes: &mut ScopeStack) -> Result<(), FrontendError> {
        let Spanned { token, span, line } = self.advance("namespace close marker")?;
        let Token::NamespaceClose(name) = token else {
            return Err(syntax_error(line, "namespace close marker", &token, span));
        };
        if !scopes.close(CloseMarker {
            name: name.clone(),
            span: span.clone(),
            line,
        }) {
            return Err(syntax_error(
                line,
                "a declaration (no namespace is open here)",
                &Token::NamespaceClose(name),
                span,
            ));
        }
        Ok(())
    }

    /// Next token, or the lexer's error for it. A stray character becomes a
    /// syntax error here.
    fn peek(&mut self) -> Result<Option<&Spanned>, FrontendError> {
        if let Some(Err(_)) = self.tokens.peek() {
            if let Some(Err(err)) = self.tokens.next() {
                return Err(lex_failure(err));
            }
        }
        Ok(self.tokens.peek().and_then(|item| item.as_ref().ok()))
    }

    pub(crate) fn peek_token(&mut self) -> Result<Option<Token>, FrontendError> {
        Ok(self.peek()?.map(|spanned| spanned.token.clone()))
    }

    /// Start offset and line of the next token.
    pub(crate) fn peek_position(&mut self, expected: &str) -> Result<(usize, usize), FrontendError> {
        match self.peek()? {
            Some(spanned) => Ok((spanned.span.start, spanned.line)),
            None => Err(self.eof_error(expected)),
        }
    }

    pub(crate) fn advance(&mut self, expected: &str) -> Result<Spanned, FrontendError> {
        match self.tokens.next() {
            Some(Ok(spanned)) => {
                self.last_span = spanned.span.clone();
                self.last_line = spanned.line;
                Ok(spanned)
            }
            Some(Err(err)) => Err(lex_failure(err)),
            None => Err(self.eof_error(expected)),
        }
    }

    pub(crate) fn expect(&mut self, want: Token, expected: &str) -> Result<Spanned, FrontendError> {
        let spanned = self.advance(expected)?;
        if spanned.token == want {
            Ok(spanned)
        } else {
            Err(syntax_error(spanned.line, expected, &spanned.token, spanned.span))
        }
    }

    pub(crate) fn expect_ident(&mut self, expected: &str) -> Result<Ident, FrontendError> {
        let Spanned { token, span, line } = self.advance(expected)?;
        match token {
            Token::Ident(name) => Ok(Ident { name, span, line }),
            other => Err(syntax_error(line, expected, &other, span)),
        }
    }

    /// Consumes the next token only if it is `want`.
    pub(crate) fn eat(&mut self, want: &Token) -> Result<Option<Spanned>, FrontendError> {
        let matched = matches!(self.peek()?, Some(spanned) if spanned.token == *want);
        if matched {
            self.advance("").map(Some)
        } else {
            Ok(None)
        }
    }

    pub(crate) fn unexpected(&mut self, expected: impl Into<String>) -> FrontendError {
        let found = match self.peek() {
            Ok(Some(next)) => Some((next.token.to_string(), next.span.clone(), next.line)),
            Ok(None) => None,
            Err(err) => return err,
        };
        match found {
            Some((found, span, line)) => SyntaxError {
                line,
                expected: expected.into(),
                found,
                span,
                hint: None,
            }
            .into(),
            None => self.eof_error(expected),
        }
    }

    pub(crate) fn eof_error(&self, expected: impl Into<String>) -> FrontendError {
        SyntaxError {
            line: self.last_line,
            expected: expected.into(),
            found: "end of file".to_string(),
            span: self.last_span.end..self.last_span.end,
            hint: None,
        }
        .into()
    }

    pub(crate) fn last_span(&self) -> Range<usize> {
        self.last_span.clone()
    }
}

pub(crate) fn syntax_error(
    line: usize,
    expected: impl Into<String>,
    found: &Token,
    span: Range<usize>,
) -> FrontendError {
    SyntaxError {
        line,
        expected: expected.into(),
        found: found.to_string(),
        span,
        hint: None,
    }
    .into()
}

fn lex_failure(err: LexError) -> FrontendError {
    match err {
        LexError::Stray { found, span, line } => SyntaxError {
            line,
            expected: "a declaration token".to_string(),
            found: format!("unexpected character `{}`", found),
            span,
            hint: None,
        }
        .into(),
        err => FrontendError::Lex(err),
    }
}

/// Parses a whole document from source text.
pub fn parse(source: &str, file: &str) -> Result<Document, Halted> {
    Parser::from_source(source, file).parse_document()
}

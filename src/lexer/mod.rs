use logos::Logos;
use thiserror::Error;

use std::fmt;
use std::ops::Range;

#[cfg(test)]
pub mod test;

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \n\r\t\f]+")] // Ignore this regex pattern between tokens
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
#[derive(Clone)]
pub enum Token {
    // `}///\namespace`, optionally followed by the name of the namespace it closes
    #[token("}///\\namespace", close_marker_name)]
    NamespaceClose(Option<String>),

    // a `/*` that never finds its `*/`; the terminated form is skipped above
    #[regex(r"/\*([^*]|\*+[^*/])*\**")]
    UnterminatedComment,

    #[regex(r"#include[ \t]*<[^>\n]*>", |lex| {
        let s = lex.slice();
        let start = s.find('<').map_or(0, |i| i + 1);
        s[start..s.len() - 1].trim().to_string()
    })]
    Include(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    String(String),

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("namespace")]
    KeywordNamespace,

    #[token("class")]
    KeywordClass,

    #[token("static")]
    KeywordStatic,

    #[token("const")]
    KeywordConst,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("::")]
    Access,

    #[token("*")]
    Star,

    #[token("&")]
    Ampersand,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("=")]
    Assign,
}

fn close_marker_name(lex: &mut logos::Lexer<Token>) -> Option<String> {
    let rest = lex.remainder();
    let indent = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    let name_len = rest[indent..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len() - indent);
    if name_len == 0 {
        return None;
    }
    lex.bump(indent + name_len);
    Some(rest[indent..indent + name_len].to_string())
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::NamespaceClose(Some(name)) => write!(f, "`}}///\\namespace {}`", name),
            Token::NamespaceClose(None) => write!(f, "`}}///\\namespace`"),
            Token::UnterminatedComment => write!(f, "unterminated comment"),
            Token::Include(path) => write!(f, "`#include <{}>`", path),
            Token::String(s) => write!(f, "string literal \"{}\"", s),
            Token::Number(n) => write!(f, "number `{}`", n),
            Token::Ident(name) => write!(f, "identifier `{}`", name),
            Token::KeywordNamespace => write!(f, "`namespace`"),
            Token::KeywordClass => write!(f, "`class`"),
            Token::KeywordStatic => write!(f, "`static`"),
            Token::KeywordConst => write!(f, "`const`"),
            Token::LBrace => write!(f, "`{{`"),
            Token::RBrace => write!(f, "`}}`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::Semicolon => write!(f, "`;`"),
            Token::Comma => write!(f, "`,`"),
            Token::Access => write!(f, "`::`"),
            Token::Star => write!(f, "`*`"),
            Token::Ampersand => write!(f, "`&`"),
            Token::Less => write!(f, "`<`"),
            Token::Greater => write!(f, "`>`"),
            Token::Assign => write!(f, "`=`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("line {line}: block comment is never closed")]
    UnterminatedComment { span: Range<usize>, line: usize },

    /// Not a token of the IDL at all. The parser reports these as syntax errors.
    #[error("line {line}: unexpected character `{found}`")]
    Stray {
        found: String,
        span: Range<usize>,
        line: usize,
    },
}

impl LexError {
    pub fn span(&self) -> Range<usize> {
        match self {
            LexError::UnterminatedComment { span, .. } | LexError::Stray { span, .. } => {
                span.clone()
            }
        }
    }

    pub fn line(&self) -> usize {
        match self {
            LexError::UnterminatedComment { line, .. } | LexError::Stray { line, .. } => *line,
        }
    }
}

/// Maps byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .char_indices()
                .filter(|(_, c)| *c == '\n')
                .map(|(i, _)| i + 1),
        );
        LineIndex { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

/// Lazy token stream over one document. Stops for good after an
/// unterminated comment, since nothing after it can be trusted.
pub struct Lexer<'src> {
    inner: logos::SpannedIter<'src, Token>,
    source: &'src str,
    lines: LineIndex,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            inner: Token::lexer(source).spanned(),
            source,
            lines: LineIndex::new(source),
            finished: false,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Spanned, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let (token, span) = self.inner.next()?;
        let line = self.lines.line_of(span.start);
        match token {
            Ok(Token::UnterminatedComment) => {
                self.finished = true;
                Some(Err(LexError::UnterminatedComment { span, line }))
            }
            Ok(token) => Some(Ok(Spanned { token, span, line })),
            Err(()) => Some(Err(LexError::Stray {
                found: self.source[span.clone()].to_string(),
                span,
                line,
            })),
        }
    }
}

/// Collects the whole document eagerly. Stray characters are kept out of the
/// result the same way an unterminated comment is: as the first error.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, LexError> {
    Lexer::new(source).collect()
}

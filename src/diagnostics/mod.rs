//! Uniform diagnostics for every stage, and their rendering.
//!
//! Lexical, syntax, dependency and validation failures all become a
//! [`Diagnostic`]. Which of them keep output from being emitted is decided
//! by [`Withheld`].


use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::ops::Range;

use crate::lexer::LexError;
use crate::model::QualifiedName;
use crate::parser::FrontendError;
use crate::symbols::DependencyError;
use crate::validation::{Subject, Violation, ViolationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lex,
    Syntax,
    Dependency,
    Naming,
    Uniqueness,
    Include,
    ForwardDecl,
    Type,
    Style,
}

impl DiagnosticKind {
    pub fn headline(&self) -> &'static str {
        match self {
            DiagnosticKind::Lex => "lexical error",
            DiagnosticKind::Syntax => "syntax error",
            DiagnosticKind::Dependency => "unresolved dependency",
            DiagnosticKind::Naming => "naming violation",
            DiagnosticKind::Uniqueness => "uniqueness violation",
            DiagnosticKind::Include => "include violation",
            DiagnosticKind::ForwardDecl => "forward declaration violation",
            DiagnosticKind::Type => "unsupported type",
            DiagnosticKind::Style => "style",
        }
    }

    /// Lexical and syntax failures leave no usable tree behind.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DiagnosticKind::Lex | DiagnosticKind::Syntax)
    }
}

impl From<ViolationKind> for DiagnosticKind {
    fn from(kind: ViolationKind) -> Self {
        match kind {
            ViolationKind::Naming => DiagnosticKind::Naming,
            ViolationKind::Uniqueness => DiagnosticKind::Uniqueness,
            ViolationKind::Include => DiagnosticKind::Include,
            ViolationKind::ForwardDecl => DiagnosticKind::ForwardDecl,
            ViolationKind::Type => DiagnosticKind::Type,
            ViolationKind::Style => DiagnosticKind::Style,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub code: &'static str,
    /// Enclosing namespace path of the offending declaration.
    pub namespace: Vec<String>,
    pub declaration: Option<String>,
    pub message: String,
    pub note: Option<String>,
    pub span: Range<usize>,
    pub line: usize,
    pub subject: Option<Subject>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// `ns::Class::member`, or `None` when no declaration is involved.
    pub fn location(&self) -> Option<String> {
        let declaration = self.declaration.as_ref()?;
        let mut parts = self.namespace.clone();
        parts.push(declaration.clone());
        Some(parts.join("::"))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] line {}: ", self.severity, self.code, self.line)?;
        if let Some(location) = self.location() {
            write!(f, "{}: ", location)?;
        }
        write!(f, "{}", self.message)
    }
}

impl From<FrontendError> for Diagnostic {
    fn from(error: FrontendError) -> Self {
        let span = error.span();
        let line = error.line();
        let (kind, code, message, note) = match error {
            FrontendError::Lex(LexError::UnterminatedComment { .. }) => (
                DiagnosticKind::Lex,
                "unterminated-comment",
                "block comment is never closed".to_string(),
                Some("close it with `*/`".to_string()),
            ),
            FrontendError::Lex(LexError::Stray { found, .. }) => (
                DiagnosticKind::Lex,
                "stray-character",
                format!("unexpected character `{}`", found),
                None,
            ),
            FrontendError::Syntax(err) => (
                DiagnosticKind::Syntax,
                "syntax",
                format!("expected {}, found {}", err.expected, err.found),
                err.hint.map(str::to_string),
            ),
        };
        Diagnostic {
            kind,
            severity: Severity::Error,
            code,
            namespace: vec![],
            declaration: None,
            message,
            note,
            span,
            line,
            subject: None,
        }
    }
}

impl From<DependencyError> for Diagnostic {
    fn from(error: DependencyError) -> Self {
        let message = error.to_string();
        let (code, namespace, declaration, span, line, subject, note) = match error {
            DependencyError::Unresolved {
                reference,
                class,
                member,
                span,
                line,
            } => {
                let note = if class.path.is_empty() && !reference.contains("::") {
                    "declare the class in this document, or forward-declare it with `class Name;`"
                } else {
                    "qualified names resolve only against classes declared in this document"
                };
                return Diagnostic {
                    kind: DiagnosticKind::Dependency,
                    severity: Severity::Error,
                    code: "unresolved-type",
                    namespace: class.path.clone(),
                    declaration: Some(format!("{}::{}", class.name, member)),
                    message: format!(
                        "`{}` is neither a declared class nor a forward declaration",
                        reference
                    ),
                    note: Some(note.to_string()),
                    span,
                    line,
                    subject: Some(Subject::Class(class)),
                };
            }
            DependencyError::ForwardDeclared { class, .. } => (
                "forward-declared",
                vec![],
                Some(class),
                0..0,
                0,
                None,
                Some("only classes with a full declaration have callable methods".to_string()),
            ),
            DependencyError::UnknownClass { class } => {
                ("unknown-class", vec![], Some(class), 0..0, 0, None, None)
            }
            DependencyError::UnknownMethod { class, method } => (
                "unknown-method",
                class.path.clone(),
                Some(format!("{}::{}", class.name, method)),
                0..0,
                0,
                None,
                None,
            ),
            DependencyError::Overloaded { class, method } => (
                "overloaded-method",
                class.path.clone(),
                Some(format!("{}::{}", class.name, method)),
                0..0,
                0,
                None,
                Some("overloading is not supported; only one declaration per name is bound".to_string()),
            ),
            DependencyError::Withheld { class } => (
                "withheld-class",
                class.path.clone(),
                Some(class.name.clone()),
                0..0,
                0,
                None,
                None,
            ),
        };
        Diagnostic {
            kind: DiagnosticKind::Dependency,
            severity: Severity::Error,
            code,
            namespace,
            declaration,
            message,
            note,
            span,
            line,
            subject,
        }
    }
}

impl From<Violation> for Diagnostic {
    fn from(violation: Violation) -> Self {
        Diagnostic {
            kind: violation.rule.kind().into(),
            severity: violation.rule.severity(),
            code: violation.rule.id(),
            namespace: violation.namespace,
            declaration: Some(violation.declaration),
            message: violation.message,
            note: None,
            span: violation.span,
            line: violation.line,
            subject: Some(violation.subject),
        }
    }
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// The parts of a document that may not be emitted.
///
/// An error about a class withholds that class. An error about a namespace
/// withholds everything below it. A fatal error withholds everything.
/// Warnings and forward declaration errors withhold nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Withheld {
    everything: bool,
    classes: BTreeSet<QualifiedName>,
    namespaces: Vec<Vec<String>>,
}

impl Withheld {
    pub fn nothing() -> Self {
        Withheld::default()
    }

    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut withheld = Withheld::nothing();
        for diagnostic in diagnostics.iter().filter(|d| d.is_error()) {
            match &diagnostic.subject {
                Some(Subject::Class(name)) => {
                    withheld.classes.insert(name.clone());
                }
                Some(Subject::Namespace(path)) => withheld.namespaces.push(path.clone()),
                Some(Subject::Forward(_)) => {}
                None if diagnostic.kind.is_fatal() => withheld.everything = true,
                None => {}
            }
        }
        withheld
    }

    pub fn is_empty(&self) -> bool {
        !self.everything && self.classes.is_empty() && self.namespaces.is_empty()
    }

    pub fn blocks_namespace(&self, path: &[String]) -> bool {
        self.everything
            || self
                .namespaces
                .iter()
                .any(|blocked| path.starts_with(blocked))
    }

    pub fn blocks(&self, class: &QualifiedName) -> bool {
        self.blocks_namespace(&class.path) || self.classes.contains(class)
    }
}

/// Renders diagnostics against the document they came from.
pub struct Reporter {
    file: String,
    source: Source<String>,
    len: usize,
}

impl Reporter {
    pub fn new(file: impl Into<String>, source: &str) -> Self {
        Reporter {
            file: file.into(),
            source: Source::from(source.to_string()),
            len: source.len(),
        }
    }

    pub fn report(
        &self,
        diagnostic: &Diagnostic,
        color: bool,
    ) -> Report<'static, (String, Range<usize>)> {
        let (kind, label_color) = match diagnostic.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };
        let span = diagnostic.span.start.min(self.len)..diagnostic.span.end.min(self.len);
        let headline = match diagnostic.location() {
            Some(location) => format!("{} in `{}`", diagnostic.kind.headline(), location),
            None => diagnostic.kind.headline().to_string(),
        };

        let mut report = Report::build(kind, (self.file.clone(), span.clone()))
            .with_config(
                Config::default()
                    .with_color(color)
                    .with_index_type(IndexType::Byte),
            )
            .with_code(diagnostic.code)
            .with_message(headline)
            .with_label(
                Label::new((self.file.clone(), span))
                    .with_message(&diagnostic.message)
                    .with_color(label_color),
            );
        if let Some(note) = &diagnostic.note {
            report = report.with_note(note);
        }
        report.finish()
    }

    pub fn write_all<W: io::Write>(
        &self,
        diagnostics: &[Diagnostic],
        mut out: W,
        color: bool,
    ) -> io::Result<()> {
        for diagnostic in diagnostics {
            self.report(diagnostic, color)
                .write((self.file.clone(), self.source.clone()), &mut out)?;
        }
        Ok(())
    }

    pub fn eprint_all(&self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        self.write_all(diagnostics, io::stderr(), true)
    }
}

use thiserror::Error;
use tracing::debug;

use std::ops::Range;

use crate::diagnostics::Severity;
use crate::model::{Model, Namespace, QualifiedName};

pub mod naming;
pub mod structure;

#[cfg(test)]
pub mod test;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    NamespaceName,
    ClassName,
    MethodName,
    StaticMethodName,
    DuplicateMethod,
    DuplicateClass,
    IncludeOverride,
    ForwardDeclNamespace,
    NamespaceClose,
    UnsupportedType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Naming,
    Uniqueness,
    Include,
    ForwardDecl,
    Type,
    Style,
}

impl Rule {
    pub fn id(&self) -> &'static str {
        match self {
            Rule::NamespaceName => "namespace-name",
            Rule::ClassName => "class-name",
            Rule::MethodName => "method-name",
            Rule::StaticMethodName => "static-method-name",
            Rule::DuplicateMethod => "duplicate-method",
            Rule::DuplicateClass => "duplicate-class",
            Rule::IncludeOverride => "include-override",
            Rule::ForwardDeclNamespace => "forward-decl-namespace",
            Rule::NamespaceClose => "namespace-close",
            Rule::UnsupportedType => "unsupported-type",
        }
    }

    pub fn kind(&self) -> ViolationKind {
        match self {
            Rule::NamespaceName | Rule::ClassName | Rule::MethodName | Rule::StaticMethodName => {
                ViolationKind::Naming
            }
            Rule::DuplicateMethod | Rule::DuplicateClass => ViolationKind::Uniqueness,
            Rule::IncludeOverride => ViolationKind::Include,
            Rule::ForwardDeclNamespace => ViolationKind::ForwardDecl,
            Rule::UnsupportedType => ViolationKind::Type,
            Rule::NamespaceClose => ViolationKind::Style,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Rule::NamespaceClose => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// What a violation is about. Decides which output it withholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Namespace(Vec<String>),
    Class(QualifiedName),
    Forward(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: [{}] {message}", .rule.id())]
pub struct Violation {
    pub rule: Rule,
    pub namespace: Vec<String>,
    pub declaration: String,
    pub subject: Subject,
    pub message: String,
    pub span: Range<usize>,
    pub line: usize,
}

impl Violation {
    pub fn is_error(&self) -> bool {
        self.rule.severity() == Severity::Error
    }
}

#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Validator::default()
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn validate_model(mut self, model: &Model) -> Vec<Violation> {
        for namespace in model.root.walk() {
            self.validate_namespace(namespace, &model.duplicate_classes);
        }
        // a namespace's close marker and its nested blocks interleave with
        // its classes
        self.violations.sort_by_key(|violation| violation.span.start);
        self.violations
    }

    fn validate_namespace(
        &mut self,
        namespace: &Namespace,
        duplicates: &[(QualifiedName, Range<usize>, usize)],
    ) {
        if namespace.name.is_some() {
            self.check_namespace_name(namespace);
            self.check_namespace_includes(namespace);
            self.check_close_marker(namespace);
        }
        for forward in &namespace.forward_decls {
            self.check_forward_decl(forward);
        }
        for class in &namespace.classes {
            let duplicate = duplicates
                .iter()
                .find(|(name, span, _)| *name == class.name && *span == class.span);
            if let Some((name, span, line)) = duplicate {
                self.check_duplicate_class(name, span.clone(), *line);
            }
            self.check_class_name(class);
            self.check_class_includes(class);
            self.check_members(class);
            self.check_overloads(class);
        }
    }
}

/// Every invariant violation in the model, in document order.
pub fn validate(model: &Model) -> Vec<Violation> {
    let violations = Validator::new().validate_model(model);
    debug!(
        errors = violations.iter().filter(|v| v.is_error()).count(),
        warnings = violations.iter().filter(|v| !v.is_error()).count(),
        "validated model"
    );
    violations
}

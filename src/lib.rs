//! Binding generator for interface description files.
//!
//! A document runs through lexing, parsing, symbol resolution, validation
//! and emission. [`check`] stops after validation; [`generate`] also emits
//! binding units for every class not withheld by an error.

pub mod ast;
pub mod codegen;
pub mod diagnostics;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod symbols;
pub mod validation;

#[cfg(test)]
pub mod test;

use tracing::{debug, warn};

use crate::codegen::{Bindings, Emitter, ProfileError, TargetProfile};
use crate::diagnostics::{Diagnostic, Withheld, has_errors};
use crate::model::Model;

#[derive(Debug)]
pub struct Checked {
    /// Absent when the document did not lex or parse.
    pub model: Option<Model>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Checked {
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

#[derive(Debug)]
pub struct Generated {
    pub bindings: Bindings,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generated {
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parses, resolves and validates a document.
pub fn check(source: &str, file: &str) -> Checked {
    let document = match parser::parse(source, file) {
        Ok(document) => document,
        Err(halted) => {
            debug!(line = halted.error.line(), "document halted");
            return Checked {
                model: None,
                diagnostics: vec![Diagnostic::from(halted.error)],
            };
        }
    };

    let resolved = symbols::resolve(&document);
    let mut diagnostics: Vec<Diagnostic> =
        resolved.errors.into_iter().map(Diagnostic::from).collect();
    diagnostics.extend(
        validation::validate(&resolved.model)
            .into_iter()
            .map(Diagnostic::from),
    );
    diagnostics.sort_by_key(|diagnostic| diagnostic.span.start);

    for diagnostic in diagnostics.iter().filter(|d| !d.is_error()) {
        warn!(file, line = diagnostic.line, code = diagnostic.code, "{}", diagnostic.message);
    }

    Checked {
        model: Some(resolved.model),
        diagnostics,
    }
}

/// Runs the whole pipeline. Classes and namespaces named by an error
/// diagnostic are withheld; everything else is emitted.
pub fn generate(
    source: &str,
    file: &str,
    profile: &TargetProfile,
) -> Result<Generated, ProfileError> {
    let Checked { model, diagnostics } = check(source, file);
    let bindings = match &model {
        Some(model) => {
            let withheld = Withheld::from_diagnostics(&diagnostics);
            Emitter::new(model, profile).emit(&withheld)?
        }
        None => Bindings::default(),
    };
    Ok(Generated {
        bindings,
        diagnostics,
    })
}

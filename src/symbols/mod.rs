pub mod resolve;


use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use std::ops::Range;

use crate::ast::{Document, NamespaceBlock, TypeExpr};
use crate::model::{MatrixKind, Primitive, QualifiedName, TypeKind};

pub use resolve::{Resolved, resolve};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DependencyError {
    #[error(
        "line {line}: `{reference}` in `{class}::{member}` is neither a declared class nor a forward declaration"
    )]
    Unresolved {
        reference: String,
        class: QualifiedName,
        member: String,
        span: Range<usize>,
        line: usize,
    },

    #[error("`{class}` is only forward-declared, so no method `{method}` is known for it")]
    ForwardDeclared { class: String, method: String },

    #[error("`{class}` is not a declared class")]
    UnknownClass { class: String },

    #[error("`{class}` has no method `{method}`")]
    UnknownMethod { class: QualifiedName, method: String },

    #[error("`{class}::{method}` is declared more than once, so it has no thunk")]
    Overloaded { class: QualifiedName, method: String },

    #[error("`{class}` was withheld from emission by an error")]
    Withheld { class: QualifiedName },
}

/// Every class and forward declaration in a document, registered before any
/// reference is resolved so declaration order never matters.
#[derive(Debug, Default)]
pub struct SymbolTable {
    classes: IndexMap<QualifiedName, (Range<usize>, usize)>,
    forward: IndexSet<String>,
    duplicates: Vec<(QualifiedName, Range<usize>, usize)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn build(document: &Document) -> Self {
        let mut table = SymbolTable::new();
        let mut pending: Vec<(&NamespaceBlock, Vec<String>)> = vec![(&document.root, vec![])];
        while let Some((block, mut path)) = pending.pop() {
            if let Some(name) = &block.name {
                path.push(name.name.clone());
            }
            table.register_block(block, &path);
            // reversed so siblings register in document order
            for child in block.namespaces.iter().rev() {
                pending.push((child, path.clone()));
            }
        }
        table
    }

    fn register_block(&mut self, block: &NamespaceBlock, path: &[String]) {
        for class in &block.classes {
            let name = QualifiedName::new(path.to_vec(), class.name.name.clone());
            self.insert_class(name, class.name.span.clone(), class.name.line);
        }
        for forward in &block.forward_decls {
            self.insert_forward(forward.name.name.clone());
        }
    }

    /// Registers a class. A second class under the same qualified name is
    /// refused and remembered.
    pub fn insert_class(&mut self, name: QualifiedName, span: Range<usize>, line: usize) -> bool {
        if self.classes.contains_key(&name) {
            self.duplicates.push((name, span, line));
            return false;
        }
        self.classes.insert(name, (span, line));
        true
    }

    pub fn class_exists(&self, name: &QualifiedName) -> bool {
        self.classes.contains_key(name)
    }

    pub fn insert_forward(&mut self, name: String) {
        self.forward.insert(name);
    }

    pub fn forward_exists(&self, name: &str) -> bool {
        self.forward.contains(name)
    }

    pub fn forward_names(&self) -> impl Iterator<Item = &String> {
        self.forward.iter()
    }

    pub fn duplicates(&self) -> &[(QualifiedName, Range<usize>, usize)] {
        &self.duplicates
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Resolves a written type name: built-ins first, then the class registry
    /// by the path as written, then (for unqualified names only) forward
    /// declarations.
    pub fn lookup(&self, ty: &TypeExpr) -> Option<TypeKind> {
        if ty.path.is_empty() {
            if let Some(primitive) = Primitive::from_name(&ty.name) {
                return Some(TypeKind::Primitive(primitive));
            }
            if let Some(matrix) = MatrixKind::from_name(&ty.name) {
                return Some(TypeKind::Matrix(matrix));
            }
        }

        let name = QualifiedName::new(ty.path.clone(), ty.name.clone());
        if self.class_exists(&name) {
            return Some(TypeKind::Class(name));
        }
        if ty.path.is_empty() && self.forward_exists(&ty.name) {
            return Some(TypeKind::Forward(ty.name.clone()));
        }
        None
    }
}

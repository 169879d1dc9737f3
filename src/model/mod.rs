//! The resolved, immutable model the validator and emitter work on.

use indexmap::IndexMap;

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

use crate::ast::{CloseMarker, Include};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub path: Vec<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn new(path: Vec<String>, name: impl Into<String>) -> Self {
        QualifiedName {
            path,
            name: name.into(),
        }
    }

    /// Parses `a::b::Name`.
    pub fn parse(qualified: &str) -> Self {
        let mut segments: Vec<String> = qualified.split("::").map(str::to_string).collect();
        let name = segments.pop().unwrap_or_default();
        QualifiedName {
            path: segments,
            name,
        }
    }

    pub fn joined(&self, separator: &str) -> String {
        let mut parts = self.path.clone();
        parts.push(self.name.clone());
        parts.join(separator)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.joined("::"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Bool,
    SizeT,
    Int,
    Double,
    Char,
    Void,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Primitive::String),
            "bool" => Some(Primitive::Bool),
            "size_t" => Some(Primitive::SizeT),
            "int" => Some(Primitive::Int),
            "double" => Some(Primitive::Double),
            "char" => Some(Primitive::Char),
            "void" => Some(Primitive::Void),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Bool => "bool",
            Primitive::SizeT => "size_t",
            Primitive::Int => "int",
            Primitive::Double => "double",
            Primitive::Char => "char",
            Primitive::Void => "void",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    Matrix,
    Vector,
}

impl MatrixKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Matrix" => Some(MatrixKind::Matrix),
            "Vector" => Some(MatrixKind::Vector),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixKind::Matrix => "Matrix",
            MatrixKind::Vector => "Vector",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(Primitive),
    Matrix(MatrixKind),
    /// A class declared in this document, or an unresolved reference that
    /// the resolver already reported.
    Class(QualifiedName),
    /// A namespace-less class known only through `class Name;`.
    Forward(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub kind: TypeKind,
    pub is_const: bool,
    /// Written with `*`: passed around as a shared pointer.
    pub is_shared: bool,
    pub is_reference: bool,
    pub span: Range<usize>,
    pub line: usize,
}

impl TypeRef {
    pub fn is_const_ref(&self) -> bool {
        self.is_const && self.is_reference
    }

    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Primitive(Primitive::Void)
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Class(_) | TypeKind::Forward(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        match &self.kind {
            TypeKind::Primitive(p) => write!(f, "{}", p.as_str())?,
            TypeKind::Matrix(m) => write!(f, "{}", m.as_str())?,
            TypeKind::Class(name) => write!(f, "{}", name)?,
            TypeKind::Forward(name) => write!(f, "{}", name)?,
        }
        if self.is_shared {
            write!(f, "*")?;
        }
        if self.is_reference {
            write!(f, "&")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub params: Vec<Param>,
    pub span: Range<usize>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    /// `None` for void.
    pub returns: Option<TypeRef>,
    pub params: Vec<Param>,
    pub is_const: bool,
    pub is_static: bool,
    pub span: Range<usize>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: QualifiedName,
    pub includes: Vec<Include>,
    pub constructors: Vec<Constructor>,
    /// Keyed by method name; a name can be bound once.
    pub methods: IndexMap<String, Method>,
    /// Declarations refused because their name was already bound.
    pub overloads: Vec<Method>,
    pub span: Range<usize>,
    pub line: usize,
}

impl Class {
    pub fn include_override(&self) -> Option<&str> {
        self.includes.first().map(|include| include.path.as_str())
    }

    /// `ns/sub/Name.h` for `ns::sub::Name`.
    pub fn default_include(&self) -> String {
        format!("{}.h", self.name.joined("/"))
    }

    pub fn instance_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values().filter(|method| !method.is_static)
    }

    pub fn static_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values().filter(|method| method.is_static)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForwardDecl {
    pub name: String,
    /// `a::b` in `class a::b::Name;`
    pub qualifier: Vec<String>,
    /// Path of the namespace block the declaration appeared in.
    pub scope: Vec<String>,
    pub span: Range<usize>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub name: Option<String>,
    pub path: Vec<String>,
    pub includes: Vec<Include>,
    pub namespaces: Vec<Namespace>,
    pub classes: Vec<Class>,
    pub forward_decls: Vec<ForwardDecl>,
    pub close: Option<CloseMarker>,
    pub span: Range<usize>,
    pub line: usize,
}

impl Namespace {
    pub fn include_override(&self) -> Option<&str> {
        self.includes.first().map(|include| include.path.as_str())
    }

    /// This namespace and every namespace below it, parents before their
    /// children and siblings in declaration order.
    pub fn walk(&self) -> Vec<&Namespace> {
        let mut out = vec![];
        let mut pending = vec![self];
        while let Some(namespace) = pending.pop() {
            out.push(namespace);
            pending.extend(namespace.namespaces.iter().rev());
        }
        out
    }

    /// Every class in this namespace and below, in declaration order.
    pub fn all_classes(&self) -> Vec<&Class> {
        self.walk()
            .into_iter()
            .flat_map(|namespace| &namespace.classes)
            .collect()
    }

    /// Searches every block with the class's path; a namespace may be
    /// reopened.
    fn find_class(&self, name: &QualifiedName) -> Option<&Class> {
        self.walk()
            .into_iter()
            .filter(|namespace| namespace.path == name.path)
            .find_map(|namespace| namespace.classes.iter().find(|class| class.name == *name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub root: Namespace,
    pub forward: BTreeSet<String>,
    /// Second and later declarations of an already registered class.
    pub duplicate_classes: Vec<(QualifiedName, Range<usize>, usize)>,
}

impl Model {
    pub fn class(&self, name: &QualifiedName) -> Option<&Class> {
        self.root.find_class(name)
    }

    pub fn is_forward(&self, name: &str) -> bool {
        self.forward.contains(name)
    }

    pub fn classes(&self) -> Vec<&Class> {
        self.root.all_classes()
    }
}

//! Syntax tree produced by the parser. Nothing here is resolved yet: type
//! names are kept exactly as written.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: NamespaceBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Range<usize>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    pub path: String,
    pub span: Range<usize>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloseMarker {
    pub name: Option<String>,
    pub span: Range<usize>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceBlock {
    /// `None` only for the implicit global namespace.
    pub name: Option<Ident>,
    pub includes: Vec<Include>,
    pub namespaces: Vec<NamespaceBlock>,
    pub classes: Vec<ClassBlock>,
    pub forward_decls: Vec<ForwardDeclNode>,
    /// Absent for the global namespace, and for a block cut short by a syntax error.
    pub close: Option<CloseMarker>,
}

impl NamespaceBlock {
    pub fn root() -> Self {
        NamespaceBlock {
            name: None,
            includes: vec![],
            namespaces: vec![],
            classes: vec![],
            forward_decls: vec![],
            close: None,
        }
    }

    pub fn named(name: Ident, includes: Vec<Include>) -> Self {
        NamespaceBlock {
            name: Some(name),
            includes,
            ..NamespaceBlock::root()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassBlock {
    pub name: Ident,
    pub includes: Vec<Include>,
    pub constructors: Vec<CtorDecl>,
    pub methods: Vec<MethodDecl>,
}

/// `class Name;`. The qualifier is whatever `a::b::` prefix was written,
/// kept so the validator can reject it.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardDeclNode {
    pub qualifier: Vec<String>,
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CtorDecl {
    pub params: Vec<Param>,
    pub span: Range<usize>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: Ident,
    pub return_type: TypeExpr,
    pub params: Vec<Param>,
    pub is_const: bool,
    pub is_static: bool,
    pub span: Range<usize>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: TypeExpr,
    pub name: Ident,
}

/// `[const] [ns::]*Name [*] [&]`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub is_const: bool,
    pub path: Vec<String>,
    pub name: String,
    pub is_pointer: bool,
    pub is_reference: bool,
    pub span: Range<usize>,
    pub line: usize,
}

impl TypeExpr {
    pub fn is_plain(&self) -> bool {
        !self.is_const && self.path.is_empty() && !self.is_pointer && !self.is_reference
    }

    pub fn written(&self) -> String {
        let mut out = String::new();
        if self.is_const {
            out.push_str("const ");
        }
        for segment in &self.path {
            out.push_str(segment);
            out.push_str("::");
        }
        out.push_str(&self.name);
        if self.is_pointer {
            out.push('*');
        }
        if self.is_reference {
            out.push('&');
        }
        out
    }
}

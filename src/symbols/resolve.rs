use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::debug;

use crate::ast::{self, ClassBlock, Document, MethodDecl, NamespaceBlock, TypeExpr};
use crate::model::{
    Class, Constructor, ForwardDecl, Method, Model, Namespace, Param, QualifiedName, TypeKind,
    TypeRef,
};
use crate::symbols::{DependencyError, SymbolTable};

/// Output of the resolver: the model plus one error per reference that
/// could not be resolved.
#[derive(Debug)]
pub struct Resolved {
    pub model: Model,
    pub errors: Vec<DependencyError>,
}

pub fn resolve(document: &Document) -> Resolved {
    let table = SymbolTable::build(document);
    let mut resolver = Resolver::new(&table);
    let root = resolver.resolve_namespace(&document.root, &[]);

    debug!(
        classes = table.class_count(),
        forward = table.forward_names().count(),
        references = resolver.references,
        unresolved = resolver.errors.len(),
        "resolved document"
    );

    Resolved {
        model: Model {
            root,
            forward: table.forward_names().cloned().collect(),
            duplicate_classes: table.duplicates().to_vec(),
        },
        errors: resolver.errors,
    }
}

struct Frame<'b> {
    block: &'b NamespaceBlock,
    // index of the next child block to enter
    next: usize,
    namespace: Namespace,
}

pub struct Resolver<'t> {
    table: &'t SymbolTable,
    errors: Vec<DependencyError>,
    references: usize,
}

impl<'t> Resolver<'t> {
    pub fn new(table: &'t SymbolTable) -> Self {
        Resolver {
            table,
            errors: vec![],
            references: 0,
        }
    }

    pub fn errors(&self) -> &[DependencyError] {
        &self.errors
    }

    /// Resolves `root` and every namespace nested in it. Walks with an
    /// explicit stack, so nesting depth is bounded by memory only.
    pub fn resolve_namespace(&mut self, root: &NamespaceBlock, parent: &[String]) -> Namespace {
        let namespace = self.enter_namespace(root, parent);
        let mut frames = vec![Frame {
            block: root,
            next: 0,
            namespace,
        }];

        while let Some(frame) = frames.last_mut() {
            let block = frame.block;
            if let Some(child) = block.namespaces.get(frame.next) {
                frame.next += 1;
                let namespace = self.enter_namespace(child, &frame.namespace.path);
                frames.push(Frame {
                    block: child,
                    next: 0,
                    namespace,
                });
                continue;
            }

            let Some(done) = frames.pop() else { break };
            match frames.last_mut() {
                Some(parent) => parent.namespace.namespaces.push(done.namespace),
                None => return done.namespace,
            }
        }
        unreachable!("the root frame returns when it is popped")
    }

    /// One namespace with its classes and forward declarations resolved.
    /// Child namespaces are attached by the caller.
    fn enter_namespace(&mut self, block: &NamespaceBlock, parent: &[String]) -> Namespace {
        let mut path = parent.to_vec();
        if let Some(name) = &block.name {
            path.push(name.name.clone());
        }

        let classes = block
            .classes
            .iter()
            .map(|class| self.resolve_class(class, &path))
            .collect();
        let forward_decls = block
            .forward_decls
            .iter()
            .map(|forward| ForwardDecl {
                name: forward.name.name.clone(),
                qualifier: forward.qualifier.clone(),
                scope: path.clone(),
                span: forward.name.span.clone(),
                line: forward.name.line,
            })
            .collect();

        let (span, line) = match &block.name {
            Some(name) => (name.span.clone(), name.line),
            None => (0..0, 1),
        };

        Namespace {
            name: block.name.as_ref().map(|name| name.name.clone()),
            path,
            includes: block.includes.clone(),
            namespaces: vec![],
            classes,
            forward_decls,
            close: block.close.clone(),
            span,
            line,
        }
    }

    pub fn resolve_class(&mut self, class: &ClassBlock, path: &[String]) -> Class {
        let name = QualifiedName::new(path.to_vec(), class.name.name.clone());

        let constructors = class
            .constructors
            .iter()
            .map(|ctor| Constructor {
                params: self.resolve_params(&ctor.params, &name, &class.name.name),
                span: ctor.span.clone(),
                line: ctor.line,
            })
            .collect();

        let mut methods: IndexMap<String, Method> = IndexMap::new();
        let mut overloads = vec![];
        for decl in &class.methods {
            let method = self.resolve_method(decl, &name);
            match methods.entry(method.name.clone()) {
                Entry::Occupied(_) => overloads.push(method),
                Entry::Vacant(slot) => {
                    slot.insert(method);
                }
            }
        }

        Class {
            name,
            includes: class.includes.clone(),
            constructors,
            methods,
            overloads,
            span: class.name.span.clone(),
            line: class.name.line,
        }
    }

    fn resolve_method(&mut self, decl: &MethodDecl, class: &QualifiedName) -> Method {
        let return_type = &decl.return_type;
        let returns = if return_type.is_plain() && return_type.name == "void" {
            None
        } else {
            Some(self.resolve_type(return_type, class, &decl.name.name))
        };

        Method {
            name: decl.name.name.clone(),
            returns,
            params: self.resolve_params(&decl.params, class, &decl.name.name),
            is_const: decl.is_const,
            is_static: decl.is_static,
            span: decl.span.clone(),
            line: decl.line,
        }
    }

    fn resolve_params(
        &mut self,
        params: &[ast::Param],
        class: &QualifiedName,
        member: &str,
    ) -> Vec<Param> {
        params
            .iter()
            .map(|param| Param {
                name: param.name.name.clone(),
                ty: self.resolve_type(&param.ty, class, member),
            })
            .collect()
    }

    pub fn resolve_type(&mut self, ty: &TypeExpr, class: &QualifiedName, member: &str) -> TypeRef {
        self.references += 1;
        let kind = match self.table.lookup(ty) {
            Some(kind) => kind,
            None => {
                let reference = QualifiedName::new(ty.path.clone(), ty.name.clone());
                self.errors.push(DependencyError::Unresolved {
                    reference: reference.to_string(),
                    class: class.clone(),
                    member: member.to_string(),
                    span: ty.span.clone(),
                    line: ty.line,
                });
                TypeKind::Class(reference)
            }
        };

        TypeRef {
            kind,
            is_const: ty.is_const,
            is_shared: ty.is_pointer,
            is_reference: ty.is_reference,
            span: ty.span.clone(),
            line: ty.line,
        }
    }
}

use indexmap::IndexSet;

use std::ops::Range;

use crate::model::{Class, ForwardDecl, Method, Namespace, QualifiedName, TypeKind, TypeRef};
use crate::validation::{Rule, Subject, Validator, Violation};

impl Validator {
    pub fn check_namespace_includes(&mut self, namespace: &Namespace) {
        let Some(name) = &namespace.name else {
            return;
        };
        if let Some(extra) = namespace.includes.get(1) {
            self.push(Violation {
                rule: Rule::IncludeOverride,
                namespace: namespace.path[..namespace.path.len() - 1].to_vec(),
                declaration: name.clone(),
                subject: Subject::Namespace(namespace.path.clone()),
                message: format!(
                    "namespace `{}` has {} include overrides, at most one is allowed",
                    name,
                    namespace.includes.len()
                ),
                span: extra.span.clone(),
                line: extra.line,
            });
        }
    }

    pub fn check_class_includes(&mut self, class: &Class) {
        if let Some(extra) = class.includes.get(1) {
            self.push(Violation {
                rule: Rule::IncludeOverride,
                namespace: class.name.path.clone(),
                declaration: class.name.name.clone(),
                subject: Subject::Class(class.name.clone()),
                message: format!(
                    "class `{}` has {} include overrides, at most one is allowed",
                    class.name.name,
                    class.includes.len()
                ),
                span: extra.span.clone(),
                line: extra.line,
            });
        }
    }

    /// The close marker must be present (the parser enforces that); its name
    /// is only advisory.
    pub fn check_close_marker(&mut self, namespace: &Namespace) {
        let (Some(name), Some(close)) = (&namespace.name, &namespace.close) else {
            return;
        };
        let message = match &close.name {
            Some(closed) if closed == name => return,
            Some(closed) => format!(
                "close marker names `{}` but closes namespace `{}`",
                closed, name
            ),
            None => format!("close marker for namespace `{}` does not name it", name),
        };
        self.push(Violation {
            rule: Rule::NamespaceClose,
            namespace: namespace.path[..namespace.path.len() - 1].to_vec(),
            declaration: name.clone(),
            subject: Subject::Namespace(namespace.path.clone()),
            message,
            span: close.span.clone(),
            line: close.line,
        });
    }

    pub fn check_forward_decl(&mut self, forward: &ForwardDecl) {
        let message = if !forward.qualifier.is_empty() {
            format!(
                "forward declaration `{}::{}` cannot name a namespace",
                forward.qualifier.join("::"),
                forward.name
            )
        } else if !forward.scope.is_empty() {
            format!(
                "forward declaration `{}` must be outside any namespace (found in `{}`)",
                forward.name,
                forward.scope.join("::")
            )
        } else {
            return;
        };
        self.push(Violation {
            rule: Rule::ForwardDeclNamespace,
            namespace: forward.scope.clone(),
            declaration: forward.name.clone(),
            subject: Subject::Forward(forward.name.clone()),
            message,
            span: forward.span.clone(),
            line: forward.line,
        });
    }

    /// Names and signature types of every constructor and method, overloads
    /// included, in source order.
    pub fn check_members(&mut self, class: &Class) {
        for ctor in &class.constructors {
            for param in &ctor.params {
                self.check_param_type(class, &class.name.name, &param.ty);
            }
        }

        let mut methods: Vec<&Method> = class.methods.values().chain(&class.overloads).collect();
        methods.sort_by_key(|method| method.span.start);
        for method in methods {
            self.check_method_name(class, method);
            if let Some(returns) = &method.returns {
                self.check_type(class, &method.name, returns);
            }
            for param in &method.params {
                self.check_param_type(class, &method.name, &param.ty);
            }
        }
    }

    /// One violation per name that was declared more than once.
    pub fn check_overloads(&mut self, class: &Class) {
        let mut reported: IndexSet<&str> = IndexSet::new();
        for overload in &class.overloads {
            if !reported.insert(overload.name.as_str()) {
                continue;
            }
            let count = 1 + class
                .overloads
                .iter()
                .filter(|other| other.name == overload.name)
                .count();
            self.push(Violation {
                rule: Rule::DuplicateMethod,
                namespace: class.name.path.clone(),
                declaration: format!("{}::{}", class.name.name, overload.name),
                subject: Subject::Class(class.name.clone()),
                message: format!(
                    "method `{}` is declared {} times; overloading is not supported",
                    overload.name, count
                ),
                span: overload.span.clone(),
                line: overload.line,
            });
        }
    }

    pub fn check_duplicate_class(&mut self, name: &QualifiedName, span: Range<usize>, line: usize) {
        self.push(Violation {
            rule: Rule::DuplicateClass,
            namespace: name.path.clone(),
            declaration: name.name.clone(),
            subject: Subject::Class(name.clone()),
            message: format!("class `{}` is declared more than once", name),
            span,
            line,
        });
    }

    fn check_param_type(&mut self, class: &Class, member: &str, ty: &TypeRef) {
        if ty.is_void() {
            self.unsupported(class, member, ty, "`void` cannot be an argument type");
            return;
        }
        self.check_type(class, member, ty);
    }

    fn check_type(&mut self, class: &Class, member: &str, ty: &TypeRef) {
        let value_type = matches!(ty.kind, TypeKind::Primitive(_) | TypeKind::Matrix(_));
        if ty.is_void() {
            self.unsupported(class, member, ty, "`void` can only be returned by value");
        } else if ty.is_shared && value_type {
            self.unsupported(
                class,
                member,
                ty,
                "shared pointers (`*`) apply to class types only",
            );
        }
    }

    fn unsupported(&mut self, class: &Class, member: &str, ty: &TypeRef, reason: &str) {
        self.push(Violation {
            rule: Rule::UnsupportedType,
            namespace: class.name.path.clone(),
            declaration: format!("{}::{}", class.name.name, member),
            subject: Subject::Class(class.name.clone()),
            message: format!("`{}`: {}", ty, reason),
            span: ty.span.clone(),
            line: ty.line,
        });
    }
}

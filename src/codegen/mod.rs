pub mod profile;
pub mod thunk;


use serde::Serialize;
use tracing::debug;

use crate::diagnostics::Withheld;
use crate::model::{Class, Model, Namespace, QualifiedName};
use crate::symbols::DependencyError;

pub use profile::{ProfileError, TargetProfile, Template};
pub use thunk::{Marshal, Thunk, ThunkBuilder, ThunkKind};

/// Generated glue for one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingUnit {
    /// `ns::Class`
    pub class: String,
    pub host_name: String,
    /// Include directive, brackets included.
    pub include: String,
    pub constructors: Vec<Thunk>,
    pub methods: Vec<Thunk>,
    pub file_name: String,
    pub code: String,
}

impl BindingUnit {
    pub fn thunk(&self, member: &str) -> Option<&Thunk> {
        self.methods.iter().find(|thunk| thunk.member == member)
    }
}

/// Host module for one namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleUnit {
    pub path: Vec<String>,
    pub host_name: String,
    pub classes: Vec<String>,
    pub submodules: Vec<String>,
    pub file_name: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bindings {
    pub units: Vec<BindingUnit>,
    pub modules: Vec<ModuleUnit>,
}

/// How a host call reaches an existing thunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    pub thunk: String,
    pub class: String,
    pub host_class: String,
    pub method: String,
    pub arity: usize,
    pub is_static: bool,
}

pub struct Emitter<'a> {
    model: &'a Model,
    profile: &'a TargetProfile,
}

impl<'a> Emitter<'a> {
    pub fn new(model: &'a Model, profile: &'a TargetProfile) -> Self {
        Emitter { model, profile }
    }

    pub fn emit(&self, withheld: &Withheld) -> Result<Bindings, ProfileError> {
        let mut bindings = Bindings::default();
        let mut pending: Vec<(&Namespace, Option<&str>)> = vec![(&self.model.root, None)];
        while let Some((namespace, inherited_include)) = pending.pop() {
            if withheld.blocks_namespace(&namespace.path) {
                debug!(namespace = %namespace.path.join("::"), "namespace withheld");
                continue;
            }
            let include = namespace.include_override().or(inherited_include);
            self.emit_namespace(namespace, include, withheld, &mut bindings)?;
            pending.extend(
                namespace
                    .namespaces
                    .iter()
                    .rev()
                    .map(|child| (child, include)),
            );
        }
        debug!(
            profile = %self.profile.name,
            units = bindings.units.len(),
            modules = bindings.modules.len(),
            "emitted bindings"
        );
        Ok(bindings)
    }

    /// The module and class units of one namespace, nested namespaces
    /// excluded.
    fn emit_namespace(
        &self,
        namespace: &Namespace,
        include: Option<&str>,
        withheld: &Withheld,
        out: &mut Bindings,
    ) -> Result<(), ProfileError> {
        if namespace.name.is_some() {
            out.modules.push(self.emit_module(namespace, withheld)?);
        }
        for class in &namespace.classes {
            if withheld.blocks(&class.name) {
                debug!(class = %class.name, "class withheld");
                continue;
            }
            out.units.push(self.emit_class(class, include)?);
        }
        Ok(())
    }

    /// `namespace_include` applies when the class has no override of its own.
    pub fn emit_class(
        &self,
        class: &Class,
        namespace_include: Option<&str>,
    ) -> Result<BindingUnit, ProfileError> {
        let builder = ThunkBuilder::new(self.profile, class);
        let include = match class.include_override().or(namespace_include) {
            Some(path) => format!("<{}>", path),
            None => format!("<{}>", class.default_include()),
        };

        let constructors = class
            .constructors
            .iter()
            .enumerate()
            .map(|(index, ctor)| builder.constructor(index, ctor))
            .collect::<Result<Vec<_>, _>>()?;
        let methods = class
            .methods
            .values()
            .map(|method| builder.method(method))
            .collect::<Result<Vec<_>, _>>()?;

        let thunks = constructors
            .iter()
            .chain(&methods)
            .map(|thunk| thunk.code.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let host_name = class.name.joined(&self.profile.module_separator);
        let native = class.name.joined("::");
        let code = self.profile.render(
            Template::Unit,
            &[
                ("comment", &self.profile.comment),
                ("class", &native),
                ("host", &host_name),
                ("include", &include),
                ("thunks", &thunks),
            ],
        )?;

        Ok(BindingUnit {
            file_name: format!(
                "{}.{}",
                class.name.joined(&self.profile.mangle_separator),
                self.profile.file_extension
            ),
            class: native,
            host_name,
            include,
            constructors,
            methods,
            code,
        })
    }

    fn emit_module(&self, namespace: &Namespace, withheld: &Withheld) -> Result<ModuleUnit, ProfileError> {
        let host_name = namespace.path.join(&self.profile.module_separator);
        let mut entries = vec![];

        let classes: Vec<&Class> = namespace
            .classes
            .iter()
            .filter(|class| !withheld.blocks(&class.name))
            .collect();
        for class in &classes {
            entries.push(self.profile.render(
                Template::ModuleClass,
                &[
                    ("name", &class.name.name),
                    ("host", &class.name.joined(&self.profile.module_separator)),
                ],
            )?);
        }

        let submodules: Vec<&Namespace> = namespace
            .namespaces
            .iter()
            .filter(|child| !withheld.blocks_namespace(&child.path))
            .collect();
        for child in &submodules {
            let name = child.name.as_deref().unwrap_or_default();
            entries.push(self.profile.render(
                Template::ModuleSubmodule,
                &[
                    ("name", name),
                    ("host", &child.path.join(&self.profile.module_separator)),
                ],
            )?);
        }

        let name = namespace.name.as_deref().unwrap_or_default();
        let entries: String = entries.iter().map(|entry| format!("{}\n", entry)).collect();
        let code = self.profile.render(
            Template::Module,
            &[
                ("comment", &self.profile.comment),
                ("name", name),
                ("host", &host_name),
                ("entries", &entries),
            ],
        )?;

        Ok(ModuleUnit {
            path: namespace.path.clone(),
            file_name: format!(
                "{}.{}",
                namespace.path.join(&self.profile.mangle_separator),
                self.profile.module_extension
            ),
            host_name,
            classes: classes.iter().map(|class| class.name.name.clone()).collect(),
            submodules: submodules
                .iter()
                .filter_map(|child| child.name.clone())
                .collect(),
            code,
        })
    }

    /// Resolves a host call to the thunk of `class::method`. Only thunks
    /// that `emit(withheld)` writes are reachable: a class that is only
    /// forward-declared, a withheld class and an overloaded name have none.
    pub fn emit_call(
        &self,
        class: &str,
        method: &str,
        withheld: &Withheld,
    ) -> Result<CallSite, DependencyError> {
        let name = QualifiedName::parse(class);
        let Some(target) = self.model.class(&name) else {
            if name.path.is_empty() && self.model.is_forward(&name.name) {
                return Err(DependencyError::ForwardDeclared {
                    class: class.to_string(),
                    method: method.to_string(),
                });
            }
            return Err(DependencyError::UnknownClass {
                class: class.to_string(),
            });
        };
        if target.overloads.iter().any(|overload| overload.name == method) {
            return Err(DependencyError::Overloaded {
                class: name,
                method: method.to_string(),
            });
        }
        if withheld.blocks(&target.name) {
            return Err(DependencyError::Withheld { class: name });
        }
        let Some(found) = target.methods.get(method) else {
            return Err(DependencyError::UnknownMethod {
                class: name,
                method: method.to_string(),
            });
        };

        Ok(CallSite {
            thunk: thunk::method_thunk_name(self.profile, target, method),
            class: target.name.to_string(),
            host_class: target.name.joined(&self.profile.module_separator),
            method: method.to_string(),
            arity: found.params.len(),
            is_static: found.is_static,
        })
    }
}

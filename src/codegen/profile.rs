use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::collections::BTreeMap;

use crate::model::TypeKind;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("unknown built-in profile `{0}` (expected `matlab` or `python`)")]
    UnknownBuiltin(String),

    #[error(
        "template `{template}` of profile `{profile}` uses unknown placeholder `{{{placeholder}}}`"
    )]
    UnknownPlaceholder {
        profile: String,
        template: &'static str,
        placeholder: String,
    },

    #[error("template `{template}` of profile `{profile}` has an unclosed `{{`")]
    UnclosedPlaceholder {
        profile: String,
        template: &'static str,
    },

    #[error("profile `{profile}` has no host type for `{name}`")]
    MissingType { profile: String, name: String },

    #[error("invalid profile: {0}")]
    Json(#[from] serde_json::Error),
}

/// The code fragments a profile supplies. Each is rendered with the
/// placeholders listed by [`Template::vars`]; `{{` and `}}` are literal braces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Templates {
    pub shared_pointer: String,
    pub make_shared: String,
    pub check_arguments: String,
    pub unwrap_value: String,
    pub unwrap_object: String,
    pub unwrap_shared: String,
    pub unwrap_self: String,
    pub construct: String,
    pub call_method: String,
    pub call_static: String,
    pub void_call: String,
    pub finish_void: String,
    pub wrap_value: String,
    pub wrap_shared: String,
    pub thunk: String,
    pub unit: String,
    pub module: String,
    pub module_class: String,
    pub module_submodule: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    SharedPointer,
    MakeShared,
    CheckArguments,
    UnwrapValue,
    UnwrapObject,
    UnwrapShared,
    UnwrapSelf,
    Construct,
    CallMethod,
    CallStatic,
    VoidCall,
    FinishVoid,
    WrapValue,
    WrapShared,
    Thunk,
    Unit,
    Module,
    ModuleClass,
    ModuleSubmodule,
}

impl Template {
    pub const ALL: [Template; 19] = [
        Template::SharedPointer,
        Template::MakeShared,
        Template::CheckArguments,
        Template::UnwrapValue,
        Template::UnwrapObject,
        Template::UnwrapShared,
        Template::UnwrapSelf,
        Template::Construct,
        Template::CallMethod,
        Template::CallStatic,
        Template::VoidCall,
        Template::FinishVoid,
        Template::WrapValue,
        Template::WrapShared,
        Template::Thunk,
        Template::Unit,
        Template::Module,
        Template::ModuleClass,
        Template::ModuleSubmodule,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Template::SharedPointer => "shared_pointer",
            Template::MakeShared => "make_shared",
            Template::CheckArguments => "check_arguments",
            Template::UnwrapValue => "unwrap_value",
            Template::UnwrapObject => "unwrap_object",
            Template::UnwrapShared => "unwrap_shared",
            Template::UnwrapSelf => "unwrap_self",
            Template::Construct => "construct",
            Template::CallMethod => "call_method",
            Template::CallStatic => "call_static",
            Template::VoidCall => "void_call",
            Template::FinishVoid => "finish_void",
            Template::WrapValue => "wrap_value",
            Template::WrapShared => "wrap_shared",
            Template::Thunk => "thunk",
            Template::Unit => "unit",
            Template::Module => "module",
            Template::ModuleClass => "module_class",
            Template::ModuleSubmodule => "module_submodule",
        }
    }

    /// Placeholders the emitter fills in for this template.
    pub fn vars(&self) -> &'static [&'static str] {
        match self {
            Template::SharedPointer => &["type"],
            Template::MakeShared => &["type", "value"],
            Template::CheckArguments => &["name", "arity", "inputs"],
            Template::UnwrapValue => &["binding", "name", "type", "index"],
            Template::UnwrapObject => &["binding", "name", "type", "shared", "index", "host"],
            Template::UnwrapShared => &["name", "type", "shared", "index", "host"],
            Template::UnwrapSelf => &["self_shared", "type", "shared", "host"],
            Template::Construct => &["type", "shared", "args"],
            Template::CallMethod => &["method", "args"],
            Template::CallStatic => &["type", "method", "args"],
            Template::VoidCall => &["value"],
            Template::FinishVoid => &[],
            Template::WrapValue => &["type", "value"],
            Template::WrapShared => &["type", "value", "host"],
            Template::Thunk => &["name", "body"],
            Template::Unit => &["comment", "class", "host", "include", "thunks"],
            Template::Module => &["comment", "name", "host", "entries"],
            Template::ModuleClass => &["name", "host"],
            Template::ModuleSubmodule => &["name", "host"],
        }
    }
}

/// How bindings look in one host language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProfile {
    pub name: String,
    pub file_extension: String,
    pub module_extension: String,
    /// Line comment prefix of the generated units.
    pub comment: String,
    /// Joins namespace and class names into host names, e.g. `gtsam.Pose2`.
    pub module_separator: String,
    /// Joins namespace, class and member names into thunk names.
    pub mangle_separator: String,
    pub constructor_prefix: String,
    /// IDL primitive and matrix names to host types.
    pub types: BTreeMap<String, String>,
    pub templates: Templates,
}

fn type_table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(idl, host)| (idl.to_string(), host.to_string()))
        .collect()
}

impl TargetProfile {
    /// Mex C++ glue for the MATLAB toolbox.
    pub fn matlab() -> Self {
        TargetProfile {
            name: "matlab".to_string(),
            file_extension: "cpp".to_string(),
            module_extension: "m".to_string(),
            comment: "//".to_string(),
            module_separator: ".".to_string(),
            mangle_separator: "_".to_string(),
            constructor_prefix: "new_".to_string(),
            types: type_table(&[
                ("string", "string"),
                ("bool", "bool"),
                ("size_t", "size_t"),
                ("int", "int"),
                ("double", "double"),
                ("char", "char"),
                ("Matrix", "Matrix"),
                ("Vector", "Vector"),
            ]),
            templates: Templates {
                shared_pointer: "boost::shared_ptr<{type}>".to_string(),
                make_shared: "boost::make_shared< {type} >({value})".to_string(),
                check_arguments: "checkArguments(\"{name}\", nargout, nargin, {inputs});"
                    .to_string(),
                unwrap_value: "{binding} {name} = unwrap< {type} >(in[{index}]);".to_string(),
                unwrap_object:
                    "{binding} {name} = *unwrap_shared_ptr< {type} >(in[{index}], \"{host}\");"
                        .to_string(),
                unwrap_shared: "{shared} {name} = unwrap_shared_ptr< {type} >(in[{index}], \"{host}\");"
                    .to_string(),
                unwrap_self: "{self_shared} self = unwrap_shared_ptr< {type} >(in[0], \"{host}\");"
                    .to_string(),
                construct: "{shared} self(new {type}({args}));".to_string(),
                call_method: "self->{method}({args})".to_string(),
                call_static: "{type}::{method}({args})".to_string(),
                void_call: "{value};".to_string(),
                finish_void: String::new(),
                wrap_value: "out[0] = wrap< {type} >({value});".to_string(),
                wrap_shared: "out[0] = wrap_shared_ptr({value}, \"{host}\");".to_string(),
                thunk: "void {name}(int nargout, mxArray *out[], int nargin, const mxArray *in[])\n{{\n{body}}}\n"
                    .to_string(),
                unit: "{comment} {class}: generated by wrapgen\n#include <wrap/matlab.h>\n#include {include}\n\n{thunks}"
                    .to_string(),
                module: "% {host}\n{entries}".to_string(),
                module_class: "%   {name} - class {host}".to_string(),
                module_submodule: "%   {name} - package {host}".to_string(),
            },
        }
    }

    /// pybind11-style C++ glue with a `.pyi` listing per module.
    pub fn python() -> Self {
        TargetProfile {
            name: "python".to_string(),
            file_extension: "cpp".to_string(),
            module_extension: "pyi".to_string(),
            comment: "//".to_string(),
            module_separator: ".".to_string(),
            mangle_separator: "_".to_string(),
            constructor_prefix: "init_".to_string(),
            types: type_table(&[
                ("string", "std::string"),
                ("bool", "bool"),
                ("size_t", "size_t"),
                ("int", "int"),
                ("double", "double"),
                ("char", "char"),
                ("Matrix", "Eigen::MatrixXd"),
                ("Vector", "Eigen::VectorXd"),
            ]),
            templates: Templates {
                shared_pointer: "std::shared_ptr<{type}>".to_string(),
                make_shared: "std::make_shared< {type} >({value})".to_string(),
                check_arguments: "checkArguments(\"{name}\", in, {inputs});".to_string(),
                unwrap_value: "{binding} {name} = in[{index}].cast< {type} >();".to_string(),
                unwrap_object: "{binding} {name} = *in[{index}].cast< {shared} >();".to_string(),
                unwrap_shared: "{shared} {name} = in[{index}].cast< {shared} >();".to_string(),
                unwrap_self: "{self_shared} self = in[0].cast< {shared} >();".to_string(),
                construct: "{shared} self(new {type}({args}));".to_string(),
                call_method: "self->{method}({args})".to_string(),
                call_static: "{type}::{method}({args})".to_string(),
                void_call: "{value};".to_string(),
                finish_void: "return py::none();".to_string(),
                wrap_value: "return py::cast({value});".to_string(),
                wrap_shared: "return py::cast({value});".to_string(),
                thunk: "py::object {name}(py::args in)\n{{\n{body}}}\n".to_string(),
                unit: "{comment} {class}: generated by wrapgen\n#include <pybind11/pybind11.h>\n#include {include}\n\nnamespace py = pybind11;\n\n{thunks}"
                    .to_string(),
                module: "# module {host}\n{entries}".to_string(),
                module_class: "class {name}: ...".to_string(),
                module_submodule: "from . import {name}".to_string(),
            },
        }
    }

    pub fn builtin(name: &str) -> Result<Self, ProfileError> {
        match name {
            "matlab" => Ok(TargetProfile::matlab()),
            "python" => Ok(TargetProfile::python()),
            other => Err(ProfileError::UnknownBuiltin(other.to_string())),
        }
    }

    /// Reads a profile from JSON and checks every template against the
    /// placeholders the emitter provides.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: TargetProfile = serde_json::from_str(json)?;
        profile.check_templates()?;
        Ok(profile)
    }

    pub fn check_templates(&self) -> Result<(), ProfileError> {
        for template in Template::ALL {
            let vars: Vec<(&str, &str)> = template.vars().iter().map(|var| (*var, "")).collect();
            self.render(template, &vars)?;
        }
        Ok(())
    }

    pub fn text(&self, template: Template) -> &str {
        let t = &self.templates;
        match template {
            Template::SharedPointer => &t.shared_pointer,
            Template::MakeShared => &t.make_shared,
            Template::CheckArguments => &t.check_arguments,
            Template::UnwrapValue => &t.unwrap_value,
            Template::UnwrapObject => &t.unwrap_object,
            Template::UnwrapShared => &t.unwrap_shared,
            Template::UnwrapSelf => &t.unwrap_self,
            Template::Construct => &t.construct,
            Template::CallMethod => &t.call_method,
            Template::CallStatic => &t.call_static,
            Template::VoidCall => &t.void_call,
            Template::FinishVoid => &t.finish_void,
            Template::WrapValue => &t.wrap_value,
            Template::WrapShared => &t.wrap_shared,
            Template::Thunk => &t.thunk,
            Template::Unit => &t.unit,
            Template::Module => &t.module,
            Template::ModuleClass => &t.module_class,
            Template::ModuleSubmodule => &t.module_submodule,
        }
    }

    pub fn render(&self, template: Template, vars: &[(&str, &str)]) -> Result<String, ProfileError> {
        substitute(self.text(template), vars).map_err(|unfilled| match unfilled {
            Unfilled::Unknown(placeholder) => ProfileError::UnknownPlaceholder {
                profile: self.name.clone(),
                template: template.name(),
                placeholder,
            },
            Unfilled::Unclosed => ProfileError::UnclosedPlaceholder {
                profile: self.name.clone(),
                template: template.name(),
            },
        })
    }

    pub fn host_type(&self, kind: &TypeKind) -> Result<String, ProfileError> {
        let name = match kind {
            TypeKind::Primitive(primitive) => primitive.as_str(),
            TypeKind::Matrix(matrix) => matrix.as_str(),
            TypeKind::Class(name) => return Ok(name.joined("::")),
            TypeKind::Forward(name) => return Ok(name.clone()),
        };
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| ProfileError::MissingType {
                profile: self.name.clone(),
                name: name.to_string(),
            })
    }

    pub fn shared_pointer(&self, ty: &str) -> Result<String, ProfileError> {
        self.render(Template::SharedPointer, &[("type", ty)])
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum Unfilled {
    Unknown(String),
    Unclosed,
}

pub(crate) fn substitute(text: &str, vars: &[(&str, &str)]) -> Result<String, Unfilled> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let rest = &text[start + 1..];
                let end = rest.find('}').ok_or(Unfilled::Unclosed)?;
                let key = &rest[..end];
                let value = vars
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| Unfilled::Unknown(key.to_string()))?;
                out.push_str(value);
                for _ in 0..=key.chars().count() {
                    chars.next();
                }
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

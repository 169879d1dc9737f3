use serde::Serialize;

use crate::codegen::profile::{ProfileError, TargetProfile, Template};
use crate::model::{Class, Constructor, Method, Param, TypeKind, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThunkKind {
    Constructor,
    Method,
    StaticMethod,
}

/// Conversion of one argument or return value between host and native.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marshal {
    pub name: String,
    /// The type as written in the IDL.
    pub ty: String,
    pub host_type: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thunk {
    pub kind: ThunkKind,
    /// Mangled entry point name.
    pub name: String,
    pub member: String,
    pub is_const: bool,
    /// Host-visible argument count, not counting the receiver.
    pub arity: usize,
    pub args: Vec<Marshal>,
    pub returns: Option<Marshal>,
    pub code: String,
}

/// Builds the thunks of one class.
pub struct ThunkBuilder<'a> {
    profile: &'a TargetProfile,
    class: &'a Class,
    native: String,
    host: String,
}

pub fn host_name(profile: &TargetProfile, kind: &TypeKind) -> Option<String> {
    match kind {
        TypeKind::Class(name) => Some(name.joined(&profile.module_separator)),
        TypeKind::Forward(name) => Some(name.clone()),
        _ => None,
    }
}

pub fn method_thunk_name(profile: &TargetProfile, class: &Class, method: &str) -> String {
    let mut parts = class.name.path.clone();
    parts.push(class.name.name.clone());
    parts.push(method.to_string());
    parts.join(&profile.mangle_separator)
}

/// Constructors are numbered from 1 in declaration order.
pub fn constructor_thunk_name(profile: &TargetProfile, class: &Class, index: usize) -> String {
    let mut parts = class.name.path.clone();
    parts.push(class.name.name.clone());
    parts.push((index + 1).to_string());
    format!(
        "{}{}",
        profile.constructor_prefix,
        parts.join(&profile.mangle_separator)
    )
}

impl<'a> ThunkBuilder<'a> {
    pub fn new(profile: &'a TargetProfile, class: &'a Class) -> Self {
        ThunkBuilder {
            profile,
            class,
            native: class.name.joined("::"),
            host: class.name.joined(&profile.module_separator),
        }
    }

    pub fn constructor(&self, index: usize, ctor: &Constructor) -> Result<Thunk, ProfileError> {
        let name = constructor_thunk_name(self.profile, self.class, index);
        let args = self.marshal_args(&ctor.params, 0)?;
        let shared = self.profile.shared_pointer(&self.native)?;

        let mut body = vec![self.check(&name, ctor.params.len(), ctor.params.len())?];
        body.extend(args.iter().map(|arg| arg.code.clone()));
        body.push(self.profile.render(
            Template::Construct,
            &[
                ("type", &self.native),
                ("shared", &shared),
                ("args", &arg_list(&ctor.params)),
            ],
        )?);
        body.push(self.profile.render(
            Template::WrapShared,
            &[("type", &self.native), ("value", "self"), ("host", &self.host)],
        )?);

        Ok(Thunk {
            kind: ThunkKind::Constructor,
            code: self.wrap_body(&name, &body)?,
            name,
            member: self.class.name.name.clone(),
            is_const: false,
            arity: ctor.params.len(),
            args,
            returns: None,
        })
    }

    pub fn method(&self, method: &Method) -> Result<Thunk, ProfileError> {
        let name = method_thunk_name(self.profile, self.class, &method.name);
        let arity = method.params.len();
        let arg_list = arg_list(&method.params);
        let mut body = vec![];

        let (kind, call, args) = if method.is_static {
            body.push(self.check(&name, arity, arity)?);
            let args = self.marshal_args(&method.params, 0)?;
            let call = self.profile.render(
                Template::CallStatic,
                &[
                    ("type", &self.native),
                    ("method", &method.name),
                    ("args", &arg_list),
                ],
            )?;
            (ThunkKind::StaticMethod, call, args)
        } else {
            body.push(self.check(&name, arity, arity + 1)?);
            body.push(self.unwrap_self(method.is_const)?);
            let args = self.marshal_args(&method.params, 1)?;
            let call = self.profile.render(
                Template::CallMethod,
                &[("method", &method.name), ("args", &arg_list)],
            )?;
            (ThunkKind::Method, call, args)
        };
        body.extend(args.iter().map(|arg| arg.code.clone()));

        let returns = match &method.returns {
            Some(ty) => {
                let marshal = self.marshal_return(ty, &call)?;
                body.push(marshal.code.clone());
                Some(marshal)
            }
            None => {
                body.push(self.profile.render(Template::VoidCall, &[("value", &call)])?);
                body.push(self.profile.render(Template::FinishVoid, &[])?);
                None
            }
        };

        Ok(Thunk {
            kind,
            code: self.wrap_body(&name, &body)?,
            name,
            member: method.name.clone(),
            is_const: method.is_const,
            arity,
            args,
            returns,
        })
    }

    fn check(&self, name: &str, arity: usize, inputs: usize) -> Result<String, ProfileError> {
        self.profile.render(
            Template::CheckArguments,
            &[
                ("name", name),
                ("arity", &arity.to_string()),
                ("inputs", &inputs.to_string()),
            ],
        )
    }

    /// The receiver of a const method is bound as a pointer to const.
    fn unwrap_self(&self, is_const: bool) -> Result<String, ProfileError> {
        let shared = self.profile.shared_pointer(&self.native)?;
        let self_shared = if is_const {
            self.profile.shared_pointer(&format!("const {}", self.native))?
        } else {
            shared.clone()
        };
        self.profile.render(
            Template::UnwrapSelf,
            &[
                ("self_shared", &self_shared),
                ("type", &self.native),
                ("shared", &shared),
                ("host", &self.host),
            ],
        )
    }

    fn marshal_args(&self, params: &[Param], first: usize) -> Result<Vec<Marshal>, ProfileError> {
        params
            .iter()
            .enumerate()
            .map(|(i, param)| self.marshal_arg(param, first + i))
            .collect()
    }

    pub fn marshal_arg(&self, param: &Param, index: usize) -> Result<Marshal, ProfileError> {
        let ty = &param.ty;
        let host_type = self.profile.host_type(&ty.kind)?;
        let index = index.to_string();
        let binding = if ty.is_const_ref() {
            format!("const {}&", host_type)
        } else if ty.is_object() {
            format!("{}&", host_type)
        } else {
            host_type.clone()
        };

        let code = match host_name(self.profile, &ty.kind) {
            Some(host) => {
                let shared = self.profile.shared_pointer(&host_type)?;
                let template = if ty.is_shared {
                    Template::UnwrapShared
                } else {
                    Template::UnwrapObject
                };
                self.profile.render(
                    template,
                    &[
                        ("binding", &binding),
                        ("name", &param.name),
                        ("type", &host_type),
                        ("shared", &shared),
                        ("index", &index),
                        ("host", &host),
                    ],
                )?
            }
            None => self.profile.render(
                Template::UnwrapValue,
                &[
                    ("binding", &binding),
                    ("name", &param.name),
                    ("type", &host_type),
                    ("index", &index),
                ],
            )?,
        };

        Ok(Marshal {
            name: param.name.clone(),
            ty: ty.to_string(),
            host_type,
            code,
        })
    }

    /// Objects returned by value are copied into a fresh shared pointer;
    /// shared pointers are wrapped as they are.
    pub fn marshal_return(&self, ty: &TypeRef, call: &str) -> Result<Marshal, ProfileError> {
        let host_type = self.profile.host_type(&ty.kind)?;
        let code = match host_name(self.profile, &ty.kind) {
            Some(host) => {
                let value = if ty.is_shared {
                    call.to_string()
                } else {
                    self.profile.render(
                        Template::MakeShared,
                        &[("type", &host_type), ("value", call)],
                    )?
                };
                self.profile.render(
                    Template::WrapShared,
                    &[("type", &host_type), ("value", &value), ("host", &host)],
                )?
            }
            None => self.profile.render(
                Template::WrapValue,
                &[("type", &host_type), ("value", call)],
            )?,
        };

        Ok(Marshal {
            name: "result".to_string(),
            ty: ty.to_string(),
            host_type,
            code,
        })
    }

    fn wrap_body(&self, name: &str, lines: &[String]) -> Result<String, ProfileError> {
        let body: String = lines
            .iter()
            .filter(|line| !line.is_empty())
            .map(|line| format!("  {}\n", line))
            .collect();
        self.profile
            .render(Template::Thunk, &[("name", name), ("body", &body)])
    }
}

fn arg_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|param| param.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

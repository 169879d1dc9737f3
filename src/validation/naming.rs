use crate::model::{Class, Method, Namespace};
use crate::validation::{Rule, Subject, Validator, Violation};

fn starts_lowercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn starts_with_letter(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

impl Validator {
    pub fn check_namespace_name(&mut self, namespace: &Namespace) {
        let Some(name) = &namespace.name else {
            return;
        };
        if starts_lowercase(name) {
            return;
        }
        let parent = namespace.path[..namespace.path.len() - 1].to_vec();
        self.push(Violation {
            rule: Rule::NamespaceName,
            namespace: parent,
            declaration: name.clone(),
            subject: Subject::Namespace(namespace.path.clone()),
            message: format!("namespace `{}` must start with a lowercase letter", name),
            span: namespace.span.clone(),
            line: namespace.line,
        });
    }

    pub fn check_class_name(&mut self, class: &Class) {
        if starts_uppercase(&class.name.name) {
            return;
        }
        self.push(Violation {
            rule: Rule::ClassName,
            namespace: class.name.path.clone(),
            declaration: class.name.name.clone(),
            subject: Subject::Class(class.name.clone()),
            message: format!(
                "class `{}` must start with an uppercase letter",
                class.name.name
            ),
            span: class.span.clone(),
            line: class.line,
        });
    }

    pub fn check_method_name(&mut self, class: &Class, method: &Method) {
        let (ok, rule, requirement) = if method.is_static {
            (
                starts_with_letter(&method.name),
                Rule::StaticMethodName,
                "a letter",
            )
        } else {
            (
                starts_lowercase(&method.name),
                Rule::MethodName,
                "a lowercase letter",
            )
        };
        if ok {
            return;
        }

        let kind = if method.is_static { "static method" } else { "method" };
        let mut message = format!("{} `{}` must start with {}", kind, method.name, requirement);
        if !method.is_static && starts_uppercase(&method.name) {
            message.push_str(" (uppercase names are only allowed with `static`)");
        }
        self.push(Violation {
            rule,
            namespace: class.name.path.clone(),
            declaration: format!("{}::{}", class.name.name, method.name),
            subject: Subject::Class(class.name.clone()),
            message,
            span: method.span.clone(),
            line: method.line,
        });
    }
}

use super::*;
use crate::parser::parse;
use crate::symbols::resolve;

fn validate_str(input: &str) -> Vec<Violation> {
    let doc = parse(input, "test").unwrap();
    let resolved = resolve(&doc);
    validate(&resolved.model)
}

fn rules(violations: &[Violation]) -> Vec<&'static str> {
    violations.iter().map(|v| v.rule.id()).collect()
}

#[test]
fn test_clean_document_has_no_violations() {
    let violations = validate_str(
        "#include <gtsam/geometry/Point2.h>
        namespace gtsam {
        class Point2 {
          Point2();
          Point2(double x, double y);
          double x() const;
          static gtsam::Point2 Expmap(Vector v);
          void print(string s) const;
        };
        }///\\namespace gtsam",
    );
    assert!(violations.is_empty(), "{:?}", violations);
}

#[test]
fn test_lowercase_class_name() {
    let violations = validate_str(
        "namespace ns {
        class foo {
        };
        class Bar {
        };
        }///\\namespace ns",
    );
    assert_eq!(rules(&violations), vec!["class-name"]);
    assert_eq!(violations[0].line, 2);
    assert_eq!(violations[0].namespace, vec!["ns".to_string()]);
    assert_eq!(violations[0].declaration, "foo");
    assert_eq!(
        violations[0].subject,
        Subject::Class(QualifiedName::parse("ns::foo"))
    );
}

#[test]
fn test_namespace_must_start_lowercase() {
    let violations = validate_str(
        "namespace Geometry {
        class Point {
        };
        }///\\namespace Geometry",
    );
    assert_eq!(rules(&violations), vec!["namespace-name"]);
    assert_eq!(
        violations[0].subject,
        Subject::Namespace(vec!["Geometry".to_string()])
    );
    assert!(violations[0].namespace.is_empty());
}

#[test]
fn test_uppercase_method_requires_static() {
    let violations = validate_str(
        "class Rot2 {
          Rot2 Inverse() const;
          static Rot2 Identity();
          static Rot2 fromAngle(double theta);
        };",
    );
    assert_eq!(rules(&violations), vec!["method-name"]);
    assert_eq!(violations[0].line, 2);
    assert_eq!(violations[0].declaration, "Rot2::Inverse");
    assert!(violations[0].message.contains("static"));
}

#[test]
fn test_duplicate_method_reported_once_per_name() {
    let violations = validate_str(
        "class KalmanFilter {
          Vector init(Vector x0, Matrix P0);
          Vector init(Vector x0);
          Vector init();
          double norm() const;
        };",
    );
    assert_eq!(rules(&violations), vec!["duplicate-method"]);
    assert_eq!(violations[0].line, 3);
    assert!(violations[0].message.contains("3 times"));
}

#[test]
fn test_duplicate_class() {
    let violations = validate_str(
        "namespace ns {
        class Foo {
        };
        }///\\namespace ns
        namespace ns {
        class Foo {
        };
        }///\\namespace ns",
    );
    assert_eq!(rules(&violations), vec!["duplicate-class"]);
    assert_eq!(violations[0].line, 6);
}

#[test]
fn test_at_most_one_include_override() {
    let violations = validate_str(
        "#include <a.h>
        #include <b.h>
        class Foo {
        };",
    );
    assert_eq!(rules(&violations), vec!["include-override"]);
    assert_eq!(violations[0].line, 2);
}

#[test]
fn test_forward_declaration_inside_namespace() {
    let violations = validate_str(
        "class Outer;
        namespace ns {
        class Inner;
        class Foo {
          void f(const Inner& i) const;
        };
        }///\\namespace ns",
    );
    assert_eq!(rules(&violations), vec!["forward-decl-namespace"]);
    assert_eq!(violations[0].subject, Subject::Forward("Inner".to_string()));
    assert!(violations[0].is_error());
}

#[test]
fn test_close_marker_name_is_advisory() {
    let violations = validate_str(
        "namespace ns {
        class Foo {
        };
        }///\\namespace other",
    );
    assert_eq!(rules(&violations), vec!["namespace-close"]);
    assert!(!violations[0].is_error());
    assert_eq!(violations[0].rule.severity(), Severity::Warning);
    assert_eq!(violations[0].line, 4);
}

#[test]
fn test_shared_pointer_to_primitive_is_unsupported() {
    let violations = validate_str(
        "class Foo {
          double* value() const;
          void set(void v);
          Foo* copy() const;
        };",
    );
    assert_eq!(rules(&violations), vec!["unsupported-type", "unsupported-type"]);
    assert_eq!(violations[0].line, 2);
    assert_eq!(violations[1].line, 3);
    assert_eq!(violations[1].declaration, "Foo::set");
}

#[test]
fn test_violations_follow_document_order() {
    let violations = validate_str(
        "namespace ns {
        class foo {
          void Bad();
        };
        namespace Inner {
        }///\\namespace Inner
        }///\\namespace ns",
    );
    assert_eq!(
        rules(&violations),
        vec!["class-name", "method-name", "namespace-name"]
    );
}

#[test]
fn test_duplicate_class_reported_in_place() {
    let violations = validate_str(
        "class Foo {
        };
        class Foo {
        };
        class bar {
        };",
    );
    assert_eq!(rules(&violations), vec!["duplicate-class", "class-name"]);
    assert_eq!(violations[0].line, 3);
    assert_eq!(violations[1].line, 5);
}

#[test]
fn test_deeply_nested_namespaces() {
    let depth = 1000;
    let mut input = "namespace a {\n".repeat(depth);
    input.push_str("class bad {\n};\n");
    input.push_str(&"}///\\namespace a\n".repeat(depth));

    let violations = validate_str(&input);
    assert_eq!(rules(&violations), vec!["class-name"]);
    assert_eq!(violations[0].namespace.len(), depth);
    assert_eq!(violations[0].line, depth + 1);
}

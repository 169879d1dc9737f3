use super::*;
use crate::ast::{ClassBlock, TypeExpr};

// Helper function to parse input without file I/O
fn parse_str(input: &str) -> Result<Document, Halted> {
    Parser::from_source(input, "test").parse_document()
}

fn parse_ok(input: &str) -> Document {
    match parse_str(input) {
        Ok(doc) => doc,
        Err(halted) => panic!("unexpected parse failure: {}", halted.error),
    }
}

fn syntax_failure(input: &str) -> SyntaxError {
    match parse_str(input) {
        Ok(doc) => panic!("expected a syntax error, parsed {:#?}", doc),
        Err(Halted {
            error: FrontendError::Syntax(err),
            ..
        }) => err,
        Err(Halted { error, .. }) => panic!("expected a syntax error, got {}", error),
    }
}

fn only_class(doc: &Document) -> &ClassBlock {
    assert_eq!(doc.root.namespaces.len(), 1);
    assert_eq!(doc.root.namespaces[0].classes.len(), 1);
    &doc.root.namespaces[0].classes[0]
}

#[test]
fn test_parse_minimal_namespace() {
    let doc = parse_ok(
        "namespace ns {
        class Foo {
          Foo();
          double bar() const;
        };
        }///\\namespace ns",
    );

    let ns = &doc.root.namespaces[0];
    assert_eq!(ns.name.as_ref().unwrap().name, "ns");
    assert_eq!(ns.close.as_ref().unwrap().name.as_deref(), Some("ns"));

    let class = only_class(&doc);
    assert_eq!(class.name.name, "Foo");
    assert_eq!(class.constructors.len(), 1);
    assert!(class.constructors[0].params.is_empty());
    assert_eq!(class.methods.len(), 1);

    let bar = &class.methods[0];
    assert_eq!(bar.name.name, "bar");
    assert_eq!(bar.return_type.name, "double");
    assert!(bar.is_const);
    assert!(!bar.is_static);
    assert!(!bar.return_type.is_const);
}

#[test]
fn test_parse_type_expressions() {
    let doc = parse_ok(
        "namespace gtsam {
        class Pose2 {
          static gtsam::Pose2 Expmap(Vector v);
          bool equals(const gtsam::Pose2& pose, double tol) const;
          gtsam::GaussianDensity* predict(gtsam::GaussianDensity* p, const Matrix& F);
        };
        }///\\namespace gtsam",
    );
    let class = only_class(&doc);

    let expmap = &class.methods[0];
    assert!(expmap.is_static);
    assert_eq!(expmap.return_type.path, vec!["gtsam".to_string()]);
    assert_eq!(expmap.return_type.name, "Pose2");

    let equals = &class.methods[1];
    let TypeExpr {
        is_const,
        is_reference,
        is_pointer,
        ..
    } = &equals.params[0].ty;
    assert!(*is_const && *is_reference && !*is_pointer);
    assert_eq!(equals.params[0].name.name, "pose");
    assert_eq!(equals.params[1].ty.name, "double");

    let predict = &class.methods[2];
    assert!(predict.return_type.is_pointer);
    assert!(predict.params[0].ty.is_pointer);
    assert_eq!(predict.params[1].ty.written(), "const Matrix&");
}

#[test]
fn test_multiline_declaration() {
    let doc = parse_ok(
        "namespace gtsam {
        class GaussianConditional {
          GaussianConditional(int key, Vector d, Matrix R, int name1, Matrix S,
              Vector sigmas);
          void print(string s) const;
        };
        }///\\namespace gtsam",
    );
    let class = only_class(&doc);
    assert_eq!(class.constructors[0].params.len(), 6);
    assert_eq!(class.constructors[0].line, 3);
}

#[test]
fn test_nested_namespaces_and_includes() {
    let doc = parse_ok(
        "#include <outer/all.h>
        namespace outer {
        namespace inner {
        #include <inner/Special.h>
        class Special {
        };
        class Plain {
        };
        }///\\namespace inner
        }///\\namespace outer",
    );

    let outer = &doc.root.namespaces[0];
    assert_eq!(outer.includes.len(), 1);
    assert_eq!(outer.includes[0].path, "outer/all.h");

    let inner = &outer.namespaces[0];
    assert!(inner.includes.is_empty());
    assert_eq!(inner.classes[0].includes[0].path, "inner/Special.h");
    // never applied to the sibling
    assert!(inner.classes[1].includes.is_empty());
}

#[test]
fn test_forward_declaration() {
    let doc = parse_ok(
        "class OtherClass;
        namespace gtsam {
        class Uses {
          void take(const OtherClass& other);
        };
        }///\\namespace gtsam",
    );
    assert_eq!(doc.root.forward_decls.len(), 1);
    assert_eq!(doc.root.forward_decls[0].name.name, "OtherClass");
    assert!(doc.root.forward_decls[0].qualifier.is_empty());
}

#[test]
fn test_qualified_forward_declaration_is_kept() {
    let doc = parse_ok("class gtsam::Hidden;");
    assert_eq!(
        doc.root.forward_decls[0].qualifier,
        vec!["gtsam".to_string()]
    );
}

#[test]
fn test_close_marker_without_name() {
    let doc = parse_ok("namespace ns {\n}///\\namespace\n");
    assert_eq!(doc.root.namespaces[0].close.as_ref().unwrap().name, None);
}

#[test]
fn test_plain_brace_does_not_close_namespace() {
    let err = syntax_failure("namespace ns {\nclass Foo {\n};\n}\n");
    assert_eq!(err.line, 4);
    assert_eq!(err.found, "`}`");
    assert!(err.expected.contains("namespace ns"));
}

#[test]
fn test_missing_close_marker() {
    let err = syntax_failure("namespace ns {\nclass Foo {\n};\n");
    assert_eq!(err.found, "end of file");
}

#[test]
fn test_two_declarations_on_one_line() {
    let err = syntax_failure(
        "class Foo {
          double x(); double y();
        };",
    );
    assert_eq!(err.line, 2);
    assert!(err.expected.contains("one declaration per line"));
}

#[test]
fn test_two_classes_on_one_line() {
    let err = syntax_failure("class A; class B;");
    assert_eq!(err.line, 1);
    assert_eq!(err.found, "`class`");
}

#[test]
fn test_namespace_after_class_on_one_line() {
    let err = syntax_failure("class A {\n};namespace b {\n}///\\namespace b");
    assert_eq!(err.line, 2);
    assert_eq!(err.found, "`namespace`");
    assert!(err.expected.contains("one declaration per line"));

    let err = syntax_failure("class A; namespace b {\n}///\\namespace b");
    assert_eq!(err.line, 1);
}

#[test]
fn test_default_arguments_are_rejected() {
    let err = syntax_failure(
        "class Foo {
          void f(double tol = 1e-9);
        };",
    );
    assert!(err.expected.contains("default argument values are not supported"));
    assert_eq!(err.found, "`=`");
}

#[test]
fn test_templates_are_rejected() {
    let err = syntax_failure(
        "class Foo {
          void f(boost::shared_ptr<Foo> p);
        };",
    );
    assert!(err.expected.contains("template types are not supported"));
}

#[test]
fn test_dangling_include() {
    let err = syntax_failure("#include <a.h>\n");
    assert_eq!(err.line, 1);
    assert_eq!(err.found, "end of file");

    let err = syntax_failure("class Foo {\n#include <a.h>\n};");
    assert_eq!(err.line, 2);
}

#[test]
fn test_stray_character_is_a_syntax_error() {
    let err = syntax_failure("class Foo {\n  void f() @;\n};");
    assert_eq!(err.line, 2);
    assert!(err.found.contains('@'));
}

#[test]
fn test_unterminated_comment_halts() {
    let result = parse_str("class A;\n/* unterminated");
    assert!(matches!(
        result,
        Err(Halted {
            error: FrontendError::Lex(crate::lexer::LexError::UnterminatedComment { .. }),
            ..
        })
    ));
}

#[test]
fn test_partial_tree_survives_syntax_error() {
    let result = parse_str(
        "namespace ns {
        class Good {
          Good();
        };
        class Bad {
          void f(
        };
        }///\\namespace ns",
    );
    let Err(halted) = result else {
        panic!("expected failure")
    };
    assert_eq!(halted.error.line(), 7);
    let ns = &halted.partial.root.namespaces[0];
    assert_eq!(ns.classes.len(), 1);
    assert_eq!(ns.classes[0].name.name, "Good");
    assert!(ns.close.is_none());
}

#[test]
fn test_parse_fragment_in_isolation() {
    let mut parser = Parser::from_source("class Frag {\n  int size() const;\n};", "frag");
    let mut scopes = ScopeStack::new();
    scopes.open(NamespaceBlock::named(
        Ident {
            name: "outer".to_string(),
            span: 0..0,
            line: 0,
        },
        vec![],
    ));
    parser.parse_class(&mut scopes, vec![]).unwrap();

    assert_eq!(scopes.path(), vec!["outer".to_string()]);
    let root = scopes.into_root();
    assert_eq!(root.namespaces[0].classes[0].methods[0].name.name, "size");
}

#[test]
fn test_constructor_requires_class_name() {
    let err = syntax_failure(
        "class Graph {
          pose2SLAM::Graph();
        };",
    );
    assert_eq!(err.found, "`(`");
}

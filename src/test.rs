use super::*;
use crate::codegen::ThunkKind;
use crate::diagnostics::{DiagnosticKind, Severity};

const GEOMETRY: &str = "/**
 * Geometry subset
 */
#include <gtsam/geometry/Point2.h>
namespace gtsam {

class Point2 {
  Point2();
  Point2(double x, double y);
  static gtsam::Point2 Expmap(Vector v);
  static Vector Logmap(const gtsam::Point2& p);
  void print(string s) const;
  double x() const;
  double y() const;
  gtsam::Point2 compose(const gtsam::Point2& p2);
};

class Pose2 {
  Pose2(double x, double y, double theta);
  Pose2(const gtsam::Point2& t, double theta);
  gtsam::Point2 t() const;
  Matrix matrix() const;
};

}///\\namespace gtsam

class Graph {
  Graph();
  void add(const gtsam::Pose2& pose);
  gtsam::Pose2* at(size_t i) const;
};
";

#[test]
fn test_valid_document_is_clean() {
    let generated = generate(GEOMETRY, "geometry.h", &TargetProfile::matlab()).unwrap();
    assert!(generated.is_clean(), "{:?}", generated.diagnostics);
    assert_eq!(generated.bindings.units.len(), 3);
    assert_eq!(generated.bindings.modules.len(), 1);

    // Classes of a namespace come before those of its children.
    let graph = &generated.bindings.units[0];
    assert_eq!(graph.include, "<Graph.h>");
    assert_eq!(
        graph.thunk("at").unwrap().returns.as_ref().unwrap().code,
        "out[0] = wrap_shared_ptr(self->at(i), \"gtsam.Pose2\");"
    );

    let point = &generated.bindings.units[1];
    assert_eq!(point.include, "<gtsam/geometry/Point2.h>");
    assert_eq!(point.constructors.len(), 2);
    assert_eq!(point.methods.len(), 6);
    assert_eq!(generated.bindings.units[2].class, "gtsam::Pose2");
}

#[test]
fn test_pipeline_is_deterministic() {
    let profile = TargetProfile::matlab();
    let first = generate(GEOMETRY, "geometry.h", &profile).unwrap();
    let second = generate(GEOMETRY, "geometry.h", &profile).unwrap();
    assert_eq!(first.bindings, second.bindings);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn test_syntax_error_halts_document() {
    let generated = generate(
        "class Foo {\n  Foo();\n  double x() const; double y() const;\n};",
        "bad.h",
        &TargetProfile::matlab(),
    )
    .unwrap();
    assert_eq!(generated.diagnostics.len(), 1);
    assert_eq!(generated.diagnostics[0].kind, DiagnosticKind::Syntax);
    assert_eq!(generated.diagnostics[0].line, 3);
    assert!(generated.bindings.units.is_empty());
}

#[test]
fn test_semantic_errors_are_accumulated() {
    let checked = check(
        "namespace ns {
        class foo {
          void Run();
          void take(Missing m);
        };
        class Good {
          double value() const;
        };
        }///\\namespace ns",
        "errors.h",
    );
    let codes: Vec<&str> = checked.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec!["class-name", "method-name", "unresolved-type"]);
    assert!(checked.has_errors());
    assert!(checked.model.is_some());
}

#[test]
fn test_siblings_emit_despite_errors() {
    let generated = generate(
        "namespace ns {
        class foo {
        };
        class Good {
          Good();
          static ns::Good Create();
        };
        }///\\namespace",
        "mixed.h",
        &TargetProfile::matlab(),
    )
    .unwrap();
    assert!(generated.has_errors());
    assert!(
        generated
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning && d.code == "namespace-close")
    );
    assert_eq!(generated.bindings.units.len(), 1);
    assert_eq!(
        generated.bindings.units[0].methods[0].kind,
        ThunkKind::StaticMethod
    );
}

#[test]
fn test_forward_declaration_resolves_but_cannot_be_called() {
    let source = "class OtherClass;
class Foo {
  void use(const OtherClass& o) const;
};";
    let checked = check(source, "forward.h");
    assert!(checked.diagnostics.is_empty(), "{:?}", checked.diagnostics);

    let Some(model) = &checked.model else {
        panic!("expected a model");
    };
    let profile = TargetProfile::matlab();
    let emitter = Emitter::new(model, &profile);
    let withheld = Withheld::from_diagnostics(&checked.diagnostics);
    assert!(matches!(
        emitter.emit_call("OtherClass", "method", &withheld),
        Err(symbols::DependencyError::ForwardDeclared { .. })
    ));
}

use super::*;

use std::fs;

const SOURCE: &str = "namespace ns {
class Foo {
  Foo();
  double bar() const;
};
class baz {
};
}///\\namespace ns
";

fn args_for(input: PathBuf, output: Option<PathBuf>) -> Args {
    Args {
        input,
        profile: "matlab".to_string(),
        output,
        check: false,
        no_color: true,
    }
}

#[test]
fn test_writes_units_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ns.h");
    fs::write(&input, SOURCE).unwrap();
    let out = dir.path().join("out");

    let mut reports = Vec::new();
    let summary = run(&args_for(input, Some(out.clone())), &mut reports).unwrap();
    assert_eq!(
        summary,
        Summary {
            units: 1,
            modules: 1,
            errors: 1,
            warnings: 0,
        }
    );

    let unit = fs::read_to_string(out.join("ns_Foo.cpp")).unwrap();
    assert!(unit.contains("#include <ns/Foo.h>"));
    assert!(unit.contains("void ns_Foo_bar("));
    assert!(!out.join("ns_baz.cpp").exists());
    assert!(out.join("ns.m").exists());

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("MANIFEST.json")).unwrap()).unwrap();
    assert_eq!(manifest["profile"], "matlab");
    assert_eq!(manifest["units"][0]["name"], "ns::Foo");
    assert_eq!(manifest["units"][0]["file"], "ns_Foo.cpp");
    assert_eq!(manifest["modules"][0]["file"], "ns.m");

    let reports = String::from_utf8(reports).unwrap();
    assert!(reports.contains("class-name"));
    assert!(reports.contains("ns.h"));
}

#[test]
fn test_check_only_counts_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ns.h");
    fs::write(&input, SOURCE).unwrap();
    let out = dir.path().join("out");

    let mut args = args_for(input, Some(out.clone()));
    args.check = true;
    let mut reports = Vec::new();
    let summary = run(&args, &mut reports).unwrap();
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.units, 0);
    assert!(!out.exists());
    assert!(!reports.is_empty());
}

#[test]
fn test_missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&args_for(dir.path().join("absent.h"), None), io::sink()).unwrap_err();
    assert!(err.to_string().contains("absent.h"));
}

#[test]
fn test_profile_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.json");
    let mut profile = TargetProfile::matlab();
    profile.name = "custom".to_string();
    profile.file_extension = "cc".to_string();
    fs::write(&path, serde_json::to_string(&profile).unwrap()).unwrap();

    let loaded = load_profile(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded.name, "custom");
    assert_eq!(loaded.file_extension, "cc");

    assert!(load_profile("fortran").is_err());
}

#[test]
fn test_print_bindings() {
    let generated = wrapgen::generate(SOURCE, "ns.h", &TargetProfile::python()).unwrap();
    let mut out = Vec::new();
    print_bindings(&mut out, &generated.bindings).unwrap();
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("py::object ns_Foo_bar(py::args in)"));
    assert!(printed.contains("# module ns"));
}

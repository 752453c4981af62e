//! End-to-end generation over small catalogs

use forge_catch::{
    Catalog, DirSink, EmitError, GenerateError, Generator, GeneratorConfig, MemorySink,
    OperationDecl, OperationName, ParameterDecl, RunOutcome, RunReport, TypeDecl, TypeParameter,
    TypeRef, UnitSink,
};
use pretty_assertions::assert_eq;

const CATALOG: &str = r#"{
  "types": [
    {
      "qualified_name": "pkg.C",
      "package": "pkg",
      "type_params": [{ "name": "T" }],
      "operations": [
        {
          "qualified_name": "pkg.C.g",
          "package": "pkg",
          "type_params": [{ "name": "T2" }],
          "params": [{ "name": "t2", "ty": { "variable": "T2" } }],
          "return_type": { "variable": "T2" }
        },
        {
          "qualified_name": "pkg.C.h",
          "package": "pkg",
          "params": [{ "name": "t", "ty": { "variable": "T" } }],
          "return_type": { "variable": "T" }
        }
      ]
    }
  ],
  "functions": [
    {
      "qualified_name": "pkg.f",
      "package": "pkg",
      "params": [{ "name": "x", "ty": { "named": { "name": "kotlin.Int" } } }],
      "return_type": { "named": { "name": "kotlin.Int" } }
    },
    {
      "qualified_name": "pkg.X",
      "package": "pkg",
      "return_type": { "named": { "name": "kotlin.Unit" } }
    },
    {
      "qualified_name": "pkg.internal.reset",
      "package": "pkg.internal",
      "return_type": { "named": { "name": "kotlin.Unit" } }
    }
  ]
}"#;

fn catalog() -> Catalog {
    Catalog::from_json(CATALOG).unwrap()
}

fn generate(config: GeneratorConfig) -> (RunReport, MemorySink) {
    let mut sink = MemorySink::new();
    let report = Generator::new(config).run(&catalog(), &mut sink).unwrap();
    (report, sink)
}

#[test]
fn deferred_wrapper_for_top_level_function() {
    let (report, sink) = generate(GeneratorConfig::new().include("pkg.f").raise());

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(sink.keys(), vec!["pkg/arrow/FExtensions.kt"]);
    assert_eq!(
        sink.get("pkg/arrow/FExtensions.kt").unwrap(),
        "\
// Code generated by forge-catch. DO NOT EDIT.
// Source: pkg.f

package pkg.arrow

import arrow.core.raise.Raise
import arrow.core.raise.catch
import pkg.f

public fun fOrRaise(x: Int): Raise<Throwable>.() -> Int {
  return {
    catch(
      block = { f(x) },
      catch = { e: Throwable -> raise(e) },
    )
  }
}
"
    );
}

#[test]
fn result_wrapper_erases_unused_receiver_parameter() {
    let (_, sink) = generate(GeneratorConfig::new().include("pkg.C.g").either());

    let source = sink.get("pkg/arrow/CGExtensions.kt").unwrap();
    assert!(source.contains("public fun <T2> C<*>.gEither(t2: T2): Either<Throwable, T2> {"));
    assert!(source.contains("  return either {\n"));
    assert!(source.contains("      block = { this@gEither.g(t2) },\n"));
}

#[test]
fn receiver_keeps_parameter_used_by_member() {
    let (_, sink) = generate(GeneratorConfig::new().include("pkg.C.h").raise().either());

    let source = sink.get("pkg/arrow/CHExtensions.kt").unwrap();
    assert!(source.contains("public fun <T> C<T>.hOrRaise(t: T): Raise<Throwable>.() -> T {"));
    assert!(source.contains("public fun <T> C<T>.hEither(t: T): Either<Throwable, T> {"));
    let raise_at = source.find("hOrRaise").unwrap();
    let either_at = source.find("hEither").unwrap();
    assert!(raise_at < either_at);
}

#[test]
fn exclude_wins_over_include() {
    let (report, sink) = generate(GeneratorConfig::new().include("pkg.X").exclude("pkg.X").raise());

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(sink.is_empty());
    assert!(report.emitted.is_empty());
    assert_eq!(report.excluded, vec![OperationName::new("pkg.X")]);
}

#[test]
fn exclude_wins_over_glob_include() {
    let (report, sink) = generate(
        GeneratorConfig::new()
            .include("pkg.**")
            .exclude("pkg.internal.*")
            .either(),
    );

    assert_eq!(
        sink.keys(),
        vec![
            "pkg/arrow/CGExtensions.kt",
            "pkg/arrow/CHExtensions.kt",
            "pkg/arrow/FExtensions.kt",
            "pkg/arrow/XExtensions.kt",
        ]
    );
    assert_eq!(report.excluded, vec![OperationName::new("pkg.internal.reset")]);
}

#[test]
fn unresolved_name_is_tolerated() {
    let (report, sink) = generate(GeneratorConfig::new().include("pkg.missing").include("pkg.f").effect());

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.misses, vec![OperationName::new("pkg.missing")]);
    assert_eq!(sink.keys(), vec!["pkg/arrow/FExtensions.kt"]);
}

#[test]
fn pattern_matching_nothing_is_reported() {
    let (report, sink) = generate(GeneratorConfig::new().include("nope.**").either());

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.misses, vec![OperationName::new("nope.**")]);
    assert!(sink.is_empty());
}

#[test]
fn only_missing_names_produce_nothing() {
    let (report, sink) = generate(GeneratorConfig::new().include("pkg.missing").raise());

    assert!(report.is_success());
    assert!(sink.is_empty());
}

#[test]
fn missing_return_type_aborts_run() {
    let catalog = Catalog::new(
        vec![],
        vec![
            OperationDecl::function("pkg.ok").returns(TypeRef::unit()),
            OperationDecl::function("pkg.noReturn"),
            OperationDecl::function("pkg.after").returns(TypeRef::unit()),
        ],
    )
    .unwrap();
    let config = GeneratorConfig::new()
        .include("pkg.ok")
        .include("pkg.noReturn")
        .include("pkg.after")
        .raise();

    let mut sink = MemorySink::new();
    let err = Generator::new(config).run(&catalog, &mut sink).unwrap_err();

    assert_eq!(err.operation(), Some(&OperationName::new("pkg.noReturn")));
    assert!(matches!(err, GenerateError::MissingReturnType(_)));
    assert!(sink.is_empty());
}

#[test]
fn member_is_not_also_generated_as_function() {
    let catalog = Catalog::new(
        vec![TypeDecl::new("pkg.Svc", "pkg")
            .operation(TypeDecl::new("pkg.Svc", "pkg").member("load").returns(TypeRef::unit()))],
        vec![OperationDecl::function("pkg.Svc.load").returns(TypeRef::int())],
    )
    .unwrap();

    let mut sink = MemorySink::new();
    let report = Generator::new(GeneratorConfig::new().include("pkg.Svc.load").either())
        .run(&catalog, &mut sink)
        .unwrap();

    assert_eq!(report.emitted, vec!["pkg/arrow/SvcLoadExtensions.kt"]);
    let source = sink.get("pkg/arrow/SvcLoadExtensions.kt").unwrap();
    assert_eq!(source.matches("public fun").count(), 1);
    assert!(source.contains("Svc.loadEither(): Either<Throwable, Unit>"));
}

#[test]
fn all_kinds_share_one_unit() {
    let (report, sink) = generate(GeneratorConfig::new().include("pkg.f").raise().either().effect());

    assert_eq!(report.emitted.len(), 1);
    let source = sink.get("pkg/arrow/FExtensions.kt").unwrap();
    assert!(source.contains("fun fOrRaise(x: Int): Raise<Throwable>.() -> Int {"));
    assert!(source.contains("fun fEither(x: Int): Either<Throwable, Int> {"));
    assert!(source.contains("fun fEffect(x: Int): Effect<Throwable, Int> {"));
    assert!(source.contains("import arrow.core.raise.effect\n"));
}

#[test]
fn projection_through_nested_and_function_types() {
    let ty = TypeDecl::new("pkg.Table", "pkg")
        .type_param(TypeParameter::new("K"))
        .type_param(TypeParameter::new("V").bound(TypeRef::named("kotlin.Any")));
    let put_all = ty
        .member("putAll")
        .param(ParameterDecl::new(
            "values",
            TypeRef::generic("kotlin.collections.List", vec![TypeRef::var("V")]),
        ))
        .returns(TypeRef::unit());
    let each = ty
        .member("each")
        .param(ParameterDecl::new(
            "action",
            TypeRef::function(None, vec![TypeRef::var("K")], TypeRef::unit()),
        ))
        .returns(TypeRef::unit());
    let catalog = Catalog::new(vec![ty.operation(put_all).operation(each)], vec![]).unwrap();

    let mut sink = MemorySink::new();
    Generator::new(
        GeneratorConfig::new()
            .include("pkg.Table.putAll")
            .include("pkg.Table.each")
            .either(),
    )
    .run(&catalog, &mut sink)
    .unwrap();

    assert!(sink
        .get("pkg/arrow/TablePutAllExtensions.kt")
        .unwrap()
        .contains("public fun <V : Any> Table<*, V>.putAllEither(values: List<V>): Either<Throwable, Unit> {"));
    assert!(sink
        .get("pkg/arrow/TableEachExtensions.kt")
        .unwrap()
        .contains("public fun <K> Table<K, *>.eachEither(action: (K) -> Unit): Either<Throwable, Unit> {"));
}

#[test]
fn rerun_is_byte_identical() {
    let config = GeneratorConfig::new().include("pkg.**").raise().either().effect();
    let (_, first) = generate(config.clone());
    let (_, second) = generate(config);

    assert_eq!(first.into_units(), second.into_units());
}

#[test]
fn later_round_skips_emitted_units() {
    let generator = Generator::new(GeneratorConfig::new().include("pkg.f").include("pkg.C.h").raise());
    let mut run = generator.start();
    let mut sink = MemorySink::new();

    let first = run.process_round(&catalog(), &mut sink).unwrap();
    let second = run.process_round(&catalog(), &mut sink).unwrap();

    assert_eq!(first.emitted.len(), 2);
    assert!(second.emitted.is_empty());
    assert_eq!(second.skipped.len(), 2);
    assert!(second.failed.is_empty());
    assert_eq!(sink.len(), 2);
}

#[test]
fn no_kind_requested_writes_nothing() {
    let (report, sink) = generate(GeneratorConfig::new().include("pkg.f"));

    assert_eq!(report.outcome, RunOutcome::NoOp);
    assert!(sink.is_empty());
}

struct RefusingSink {
    refuse: &'static str,
    inner: MemorySink,
}

impl UnitSink for RefusingSink {
    fn write_unit(&mut self, key: &str, source: &str) -> Result<(), EmitError> {
        if key == self.refuse {
            return Err(EmitError::AlreadyWritten(key.to_string()));
        }
        self.inner.write_unit(key, source)
    }
}

#[test]
fn write_failure_does_not_stop_other_units() {
    let mut sink = RefusingSink {
        refuse: "pkg/arrow/FExtensions.kt",
        inner: MemorySink::new(),
    };
    let report = Generator::new(GeneratorConfig::new().include("pkg.f").include("pkg.X").raise())
        .run(&catalog(), &mut sink)
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].key, "pkg/arrow/FExtensions.kt");
    assert_eq!(report.emitted, vec!["pkg/arrow/XExtensions.kt"]);
    assert_eq!(sink.inner.keys(), vec!["pkg/arrow/XExtensions.kt"]);
}

#[test]
fn dir_sink_writes_kotlin_tree() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirSink::new(dir.path());

    let report = Generator::new(GeneratorConfig::new().include("pkg.C.*").either())
        .run(&catalog(), &mut sink)
        .unwrap();

    assert_eq!(report.emitted.len(), 2);
    let generated = dir.path().join("pkg").join("arrow").join("CHExtensions.kt");
    let source = std::fs::read_to_string(generated).unwrap();
    assert!(source.starts_with("// Code generated by forge-catch. DO NOT EDIT.\n"));
    assert!(source.contains("package pkg.arrow\n"));
}

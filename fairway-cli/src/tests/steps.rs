//! Behaviour-driven step definitions driving the CLI scenarios.

use super::*;
use camino::Utf8PathBuf;
use fairway_core::{
    CourseSource, NetworkError, RawElement, ReferentialError, ScoringError, SourceKind, Tags,
    test_support::StubCourseSource,
};
use fairway_data::OverpassConfig;
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

use crate::directory::SourceBuilder;

struct StubSourceBuilder {
    source: StubCourseSource,
}

impl SourceBuilder for StubSourceBuilder {
    fn build(&self, _config: &OverpassConfig) -> Result<Box<dyn CourseSource>, CliError> {
        Ok(Box::new(self.source.clone()))
    }
}

struct CliWorld {
    _tmp: TempDir,
    database: Utf8PathBuf,
    builder: StubSourceBuilder,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl CliWorld {
    fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            database: root.join("fairway.sqlite"),
            _tmp: tmp,
            builder: StubSourceBuilder {
                source: StubCourseSource::with_elements(Vec::new()),
            },
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn output(&self) -> String {
        String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8")
    }
}

#[fixture]
fn world() -> CliWorld {
    CliWorld::new()
}

#[given("the source returns two courses")]
fn source_returns_courses(#[from(world)] world: &CliWorld) {
    world.builder.source.replace_elements(vec![
        RawElement::new(
            SourceKind::Way,
            11,
            Tags::from([("name", "Cobbs Creek"), ("access", "yes")]),
        )
        .with_center(Coord { x: -75.25, y: 39.96 }),
        RawElement::new(
            SourceKind::Way,
            12,
            Tags::from([("name", "Merion"), ("membership", "required")]),
        )
        .with_center(Coord { x: -75.31, y: 39.99 }),
    ]);
}

#[given("the source is unreachable")]
fn source_unreachable(#[from(world)] world: &CliWorld) {
    world.builder.source.fail_with(NetworkError::Transport {
        url: "http://overpass.test/api/interpreter".into(),
        message: "connection refused".into(),
    });
}

#[when("I run fairway {arguments}")]
fn run_fairway(#[from(world)] world: &CliWorld, arguments: String) {
    let mut argv = vec!["fairway".to_owned()];
    argv.extend(arguments.split_whitespace().map(str::to_owned));
    argv.extend(["--database".to_owned(), world.database.as_str().to_owned()]);

    let mut buffer = world.stdout.borrow_mut();
    buffer.clear();
    let outcome = Cli::try_parse_from(argv)
        .map_err(CliError::from)
        .and_then(|cli| execute(cli.command, &world.builder, &mut *buffer));
    world.result.replace(Some(outcome));
}

#[then("the command succeeds")]
fn command_succeeds(#[from(world)] world: &CliWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    if let Err(err) = result {
        panic!("expected success, found {err:?}");
    }
}

#[then("the output contains {text}")]
fn output_contains(#[from(world)] world: &CliWorld, text: String) {
    let output = world.output();
    assert!(output.contains(&text), "{text:?} not found in {output:?}");
}

#[then("the output does not contain {text}")]
fn output_lacks(#[from(world)] world: &CliWorld, text: String) {
    let output = world.output();
    assert!(!output.contains(&text), "{text:?} unexpectedly in {output:?}");
}

#[then("the command fails because a record is missing")]
fn command_fails_missing(#[from(world)] world: &CliWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::Scoring(ScoringError::Referential(ReferentialError::MissingCourse {
            ..
        }))) => {}
        other => panic!("expected MissingCourse, found {other:?}"),
    }
}

#[then("the command fails validation")]
fn command_fails_validation(#[from(world)] world: &CliWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::Scoring(ScoringError::Validation(_))) => {}
        other => panic!("expected a validation error, found {other:?}"),
    }
}

#[scenario(path = "tests/features/scorebook_cli.feature", index = 0)]
fn sync_and_list(#[from(world)] world: CliWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/scorebook_cli.feature", index = 1)]
fn unreachable_source(#[from(world)] world: CliWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/scorebook_cli.feature", index = 2)]
fn record_and_rescore(#[from(world)] world: CliWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/scorebook_cli.feature", index = 3)]
fn unknown_course(#[from(world)] world: CliWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/scorebook_cli.feature", index = 4)]
fn out_of_range_strokes(#[from(world)] world: CliWorld) {
    let _ = world;
}

//! Behavioural tests for `CourseDirectory` over the SQLite store.

use std::{cell::RefCell, sync::Arc, time::Duration};

use chrono::{TimeZone, Utc};
use fairway_core::{
    AccessFilter, AccessLabel, CourseDirectory, CourseStore, DirectoryError, NetworkError,
    RadiusQuery, RawElement, RefreshStatus, SourceKind, SourceRef, Tags,
    test_support::{MutableClock, StubCourseSource},
};
use fairway_data::SqliteStore;
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Shared state for directory scenarios.
struct DirectoryWorld {
    directory: CourseDirectory<SqliteStore, StubCourseSource>,
    source: StubCourseSource,
    clock: Arc<MutableClock>,
    query: RadiusQuery,
    last_result: RefCell<Option<Result<RefreshStatus, DirectoryError>>>,
}

impl DirectoryWorld {
    fn new() -> Self {
        let clock = Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap(),
        ));
        let source = StubCourseSource::with_elements(Vec::new());
        let store = SqliteStore::open_in_memory().expect("in-memory store");
        let directory = CourseDirectory::new(store, source.clone()).with_clock(clock.clone());
        Self {
            directory,
            source,
            clock,
            query: RadiusQuery::new(Coord { x: -75.1652, y: 39.9526 }, 48_280)
                .expect("valid query"),
            last_result: RefCell::new(None),
        }
    }

    fn refresh(&self, force: bool) {
        let result = self.directory.ensure_fresh(&self.query, force);
        self.last_result.replace(Some(result));
    }

    fn course_access(&self, kind: SourceKind, id: i64) -> AccessLabel {
        self.directory
            .store()
            .find_course_by_source(SourceRef::new(kind, id))
            .expect("query course")
            .expect("course should be cached")
            .access
    }
}

fn philadelphia_courses() -> Vec<RawElement> {
    vec![
        RawElement::new(
            SourceKind::Way,
            1,
            Tags::from([("name", "Merion Golf Club"), ("access", "private")]),
        )
        .with_center(Coord { x: -75.31, y: 39.99 }),
        RawElement::new(
            SourceKind::Way,
            2,
            Tags::from([("name", "Cobbs Creek"), ("access", "yes")]),
        )
        .with_center(Coord { x: -75.25, y: 39.96 }),
        RawElement::new(SourceKind::Relation, 3, Tags::from([("name", "Mystery Links")]))
            .with_center(Coord { x: -75.10, y: 40.05 }),
        RawElement::new(SourceKind::Point, 4, Tags::from([("leisure", "golf_course")]))
            .with_point(Coord { x: -75.20, y: 39.90 }),
    ]
}

#[fixture]
fn world() -> DirectoryWorld {
    DirectoryWorld::new()
}

#[given("an empty course cache")]
fn given_empty_cache(world: &DirectoryWorld) {
    let count = world.directory.store().count_courses().expect("count");
    assert_eq!(count, 0, "cache should start empty");
}

#[given("the source returns the Philadelphia courses")]
fn given_source_courses(world: &DirectoryWorld) {
    world.source.replace_elements(philadelphia_courses());
}

#[when("the directory is refreshed")]
fn when_refreshed(world: &DirectoryWorld) {
    world.refresh(false);
}

#[when("the directory is refreshed with force")]
fn when_forced(world: &DirectoryWorld) {
    world.refresh(true);
}

#[when("{days} days pass")]
fn when_days_pass(world: &DirectoryWorld, days: u32) {
    world.clock.advance(DAY * days);
}

#[when("the source starts timing out")]
fn when_source_times_out(world: &DirectoryWorld) {
    world.source.fail_with(NetworkError::Timeout {
        url: "http://overpass.test/api/interpreter".into(),
        timeout_secs: 60,
    });
}

#[then("the source was queried {count} time")]
fn then_queried_once(world: &DirectoryWorld, count: usize) {
    assert_eq!(world.source.call_count(), count);
}

#[then("the source was queried {count} times")]
fn then_queried(world: &DirectoryWorld, count: usize) {
    assert_eq!(world.source.call_count(), count);
}

#[then("{count} courses are cached")]
fn then_cached(world: &DirectoryWorld, count: usize) {
    let courses = world
        .directory
        .list(&AccessFilter::all())
        .expect("list courses");
    assert_eq!(courses.len(), count);
}

#[then("{count} unnamed element was skipped")]
fn then_skipped(world: &DirectoryWorld, count: usize) {
    let result = world.last_result.borrow();
    match &*result {
        Some(Ok(RefreshStatus::Refreshed { skipped, .. })) => assert_eq!(*skipped, count),
        other => panic!("expected a refresh, got {other:?}"),
    }
}

#[then("the last refresh used the cache")]
fn then_cache_hit(world: &DirectoryWorld) {
    let result = world.last_result.borrow();
    assert!(
        matches!(&*result, Some(Ok(RefreshStatus::CacheHit { .. }))),
        "expected a cache hit, got {result:?}"
    );
}

#[then("the refresh fails with a network error")]
fn then_network_error(world: &DirectoryWorld) {
    let result = world.last_result.borrow();
    assert!(
        matches!(&*result, Some(Err(DirectoryError::Network(_)))),
        "expected a network error, got {result:?}"
    );
}

#[then("way {id} is labelled {label}")]
fn then_way_label(world: &DirectoryWorld, id: i64, label: String) {
    let expected: AccessLabel = label.parse().expect("known label");
    assert_eq!(world.course_access(SourceKind::Way, id), expected);
}

#[then("relation {id} is labelled {label}")]
fn then_relation_label(world: &DirectoryWorld, id: i64, label: String) {
    let expected: AccessLabel = label.parse().expect("known label");
    assert_eq!(world.course_access(SourceKind::Relation, id), expected);
}

#[scenario(path = "tests/features/course_directory.feature", index = 0)]
fn first_sync(world: DirectoryWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/course_directory.feature", index = 1)]
fn fresh_cache_is_reused(world: DirectoryWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/course_directory.feature", index = 2)]
fn stale_cache_is_refreshed(world: DirectoryWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/course_directory.feature", index = 3)]
fn forced_refresh(world: DirectoryWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/course_directory.feature", index = 4)]
fn access_labels(world: DirectoryWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/course_directory.feature", index = 5)]
fn failed_fetch_keeps_cache(world: DirectoryWorld) {
    let _ = world;
}

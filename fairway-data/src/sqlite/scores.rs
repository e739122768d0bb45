//! [`ScoreStore`] implementation for [`SqliteStore`].
//!
//! Referenced rows are checked inside the write transaction so a missing
//! course or round surfaces as a [`ReferentialError`] rather than a raw
//! foreign-key failure.

use chrono::{DateTime, Utc};
use fairway_core::{
    CourseId, Hole, HoleEntry, HoleNumber, NewRound, ReferentialError, Round, RoundId,
    ScoreStore, ScoringError, StorageError, Strokes,
};
use log::debug;
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Row, params, types::Type};

use super::{SqliteStore, format_date, format_timestamp, parse_date, parse_timestamp, storage_error};

const ROUND_QUERY: &str = "SELECT r.id, r.played_on, r.course_id, c.name, r.tees, r.notes, r.created_at
     FROM rounds r JOIN courses c ON c.id = r.course_id";

impl ScoreStore for SqliteStore {
    fn insert_round(
        &self,
        round: &NewRound,
        created_at: DateTime<Utc>,
    ) -> Result<RoundId, ScoringError> {
        const OPERATION: &str = "insert_round";
        let mut connection = self.lock(OPERATION)?;
        let transaction = connection
            .transaction()
            .map_err(storage_error(OPERATION))?;

        if !row_exists(&transaction, "courses", round.course_id.get())
            .map_err(storage_error(OPERATION))?
        {
            return Err(ReferentialError::MissingCourse {
                course_id: round.course_id,
            }
            .into());
        }

        transaction
            .execute(
                "INSERT INTO rounds (played_on, course_id, tees, notes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    format_date(round.played_on),
                    round.course_id.get(),
                    round.tees,
                    round.notes,
                    format_timestamp(created_at),
                ],
            )
            .map_err(storage_error(OPERATION))?;
        let id = RoundId(transaction.last_insert_rowid());
        transaction.commit().map_err(storage_error(OPERATION))?;
        debug!("inserted round {id} on course {}", round.course_id);
        Ok(id)
    }

    fn upsert_hole(&self, round_id: RoundId, entry: &HoleEntry) -> Result<(), ScoringError> {
        const OPERATION: &str = "upsert_hole";
        let mut connection = self.lock(OPERATION)?;
        let transaction = connection
            .transaction()
            .map_err(storage_error(OPERATION))?;

        if !row_exists(&transaction, "rounds", round_id.get()).map_err(storage_error(OPERATION))? {
            return Err(ReferentialError::MissingRound { round_id }.into());
        }

        transaction
            .execute(
                "INSERT INTO holes (round_id, hole_number, strokes, putts, penalties, comment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (round_id, hole_number) DO UPDATE SET
                    strokes = excluded.strokes,
                    putts = excluded.putts,
                    penalties = excluded.penalties,
                    comment = excluded.comment",
                params![
                    round_id.get(),
                    entry.hole_number().get(),
                    entry.strokes().get(),
                    entry.putts(),
                    entry.penalties(),
                    entry.comment(),
                ],
            )
            .map_err(storage_error(OPERATION))?;
        transaction.commit().map_err(storage_error(OPERATION))?;
        Ok(())
    }

    fn list_rounds(&self) -> Result<Vec<Round>, StorageError> {
        const OPERATION: &str = "list_rounds";
        let connection = self.lock(OPERATION)?;
        let mut statement = connection
            .prepare(&format!("{ROUND_QUERY} ORDER BY r.played_on DESC, r.id DESC"))
            .map_err(storage_error(OPERATION))?;
        let rows = statement
            .query_map([], round_from_row)
            .map_err(storage_error(OPERATION))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(storage_error(OPERATION))
    }

    fn find_round(&self, id: RoundId) -> Result<Option<Round>, StorageError> {
        const OPERATION: &str = "find_round";
        let connection = self.lock(OPERATION)?;
        connection
            .query_row(
                &format!("{ROUND_QUERY} WHERE r.id = ?1"),
                [id.get()],
                round_from_row,
            )
            .optional()
            .map_err(storage_error(OPERATION))
    }

    fn list_holes(&self, round_id: RoundId) -> Result<Vec<Hole>, StorageError> {
        const OPERATION: &str = "list_holes";
        let connection = self.lock(OPERATION)?;
        let mut statement = connection
            .prepare(
                "SELECT round_id, hole_number, strokes, putts, penalties, comment
                 FROM holes WHERE round_id = ?1 ORDER BY hole_number",
            )
            .map_err(storage_error(OPERATION))?;
        let rows = statement
            .query_map([round_id.get()], hole_from_row)
            .map_err(storage_error(OPERATION))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(storage_error(OPERATION))
    }
}

fn row_exists(connection: &Connection, table: &str, id: i64) -> Result<bool, SqliteError> {
    connection
        .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id], |_| {
            Ok(())
        })
        .optional()
        .map(|found| found.is_some())
}

fn round_from_row(row: &Row<'_>) -> Result<Round, SqliteError> {
    let played_on: String = row.get(1)?;
    let created_at: String = row.get(6)?;
    Ok(Round {
        id: RoundId(row.get(0)?),
        played_on: parse_date(1, &played_on)?,
        course_id: CourseId(row.get(2)?),
        course_name: row.get(3)?,
        tees: row.get(4)?,
        notes: row.get(5)?,
        created_at: parse_timestamp(6, &created_at)?,
    })
}

fn hole_from_row(row: &Row<'_>) -> Result<Hole, SqliteError> {
    let hole_number: u32 = row.get(1)?;
    let strokes: u32 = row.get(2)?;
    Ok(Hole {
        round_id: RoundId(row.get(0)?),
        hole_number: HoleNumber::new(hole_number).map_err(|err| out_of_range(1, err))?,
        strokes: Strokes::new(strokes).map_err(|err| out_of_range(2, err))?,
        putts: row.get(3)?,
        penalties: row.get(4)?,
        comment: row.get(5)?,
    })
}

fn out_of_range(column: usize, err: fairway_core::ValidationError) -> SqliteError {
    SqliteError::FromSqlConversionFailure(column, Type::Integer, Box::new(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use fairway_core::{
        AccessLabel, CourseStore, CourseUpsert, HoleScore, SourceKind, SourceRef, Tags,
    };
    use rstest::{fixture, rstest};

    struct Seeded {
        store: SqliteStore,
        course: CourseId,
    }

    #[fixture]
    fn seeded() -> Seeded {
        let store = SqliteStore::open_in_memory().expect("in-memory store");
        let course = store
            .upsert_course(
                &CourseUpsert {
                    source: SourceRef::new(SourceKind::Way, 10),
                    name: "Walnut Lane".into(),
                    location: None,
                    access: AccessLabel::Public,
                    raw_tags: Tags::new(),
                },
                created(),
            )
            .expect("seed course");
        Seeded { store, course }
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).expect("valid date")
    }

    fn entry(score: HoleScore) -> HoleEntry {
        HoleEntry::try_from(score).expect("valid score")
    }

    #[rstest]
    fn inserts_and_reads_back_a_round(seeded: Seeded) {
        let round = NewRound::new(seeded.course, date(1))
            .with_tees(Some("Blue"))
            .with_notes(Some("windy"));
        let id = seeded.store.insert_round(&round, created()).expect("insert");
        let stored = seeded.store.find_round(id).expect("query").expect("stored");
        assert_eq!(stored.course_name, "Walnut Lane");
        assert_eq!(stored.played_on, date(1));
        assert_eq!(stored.tees.as_deref(), Some("Blue"));
        assert_eq!(stored.notes.as_deref(), Some("windy"));
        assert_eq!(stored.created_at, created());
    }

    #[rstest]
    fn round_on_missing_course_is_referential(seeded: Seeded) {
        let err = seeded
            .store
            .insert_round(&NewRound::new(CourseId(999), date(1)), created())
            .expect_err("course 999 does not exist");
        assert!(matches!(
            err,
            ScoringError::Referential(ReferentialError::MissingCourse {
                course_id: CourseId(999)
            })
        ));
        assert!(seeded.store.list_rounds().expect("list").is_empty());
    }

    #[rstest]
    fn rounds_list_newest_first_with_id_tie_break(seeded: Seeded) {
        let early = seeded
            .store
            .insert_round(&NewRound::new(seeded.course, date(1)), created())
            .expect("early");
        let late_a = seeded
            .store
            .insert_round(&NewRound::new(seeded.course, date(5)), created())
            .expect("late a");
        let late_b = seeded
            .store
            .insert_round(&NewRound::new(seeded.course, date(5)), created())
            .expect("late b");
        let ids: Vec<_> = seeded
            .store
            .list_rounds()
            .expect("list")
            .into_iter()
            .map(|round| round.id)
            .collect();
        assert_eq!(ids, vec![late_b, late_a, early]);
    }

    #[rstest]
    fn hole_upsert_overwrites_by_number(seeded: Seeded) {
        let round = seeded
            .store
            .insert_round(&NewRound::new(seeded.course, date(2)), created())
            .expect("round");
        seeded
            .store
            .upsert_hole(round, &entry(HoleScore::new(5, 4).with_putts(2)))
            .expect("first write");
        seeded
            .store
            .upsert_hole(round, &entry(HoleScore::new(5, 6).with_comment("bunker")))
            .expect("second write");

        let holes = seeded.store.list_holes(round).expect("list");
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].strokes.get(), 6);
        assert_eq!(holes[0].putts, None);
        assert_eq!(holes[0].comment.as_deref(), Some("bunker"));
    }

    #[rstest]
    fn holes_list_in_number_order(seeded: Seeded) {
        let round = seeded
            .store
            .insert_round(&NewRound::new(seeded.course, date(3)), created())
            .expect("round");
        for number in [9, 1, 18, 4] {
            seeded
                .store
                .upsert_hole(round, &entry(HoleScore::new(number, 4).with_penalties(1)))
                .expect("hole");
        }
        let numbers: Vec<_> = seeded
            .store
            .list_holes(round)
            .expect("list")
            .into_iter()
            .map(|hole| hole.hole_number.get())
            .collect();
        assert_eq!(numbers, vec![1, 4, 9, 18]);
    }

    #[rstest]
    fn hole_on_missing_round_is_referential(seeded: Seeded) {
        let err = seeded
            .store
            .upsert_hole(RoundId(42), &entry(HoleScore::new(1, 3)))
            .expect_err("round 42 does not exist");
        assert!(matches!(
            err,
            ScoringError::Referential(ReferentialError::MissingRound {
                round_id: RoundId(42)
            })
        ));
    }

    #[rstest]
    fn unknown_round_has_no_holes(seeded: Seeded) {
        assert!(seeded.store.list_holes(RoundId(7)).expect("list").is_empty());
        assert_eq!(seeded.store.find_round(RoundId(7)).expect("query"), None);
    }
}

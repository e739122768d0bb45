//! [`CourseStore`] implementation for [`SqliteStore`].

use chrono::{DateTime, Utc};
use fairway_core::{
    AccessFilter, Course, CourseId, CourseStore, CourseUpsert, SourceRef, StorageError, Tags,
};
use geo::Coord;
use rusqlite::{Error as SqliteError, OptionalExtension, Row, params, params_from_iter, types::Type};

use super::{SqliteStore, format_timestamp, parse_timestamp, storage_error};

const COURSE_COLUMNS: &str =
    "id, source_kind, source_id, name, lat, lon, access, raw_tags, updated_at";

impl CourseStore for SqliteStore {
    fn last_refreshed(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        const OPERATION: &str = "last_refreshed";
        let connection = self.lock(OPERATION)?;
        let latest: Option<String> = connection
            .query_row("SELECT max(updated_at) FROM courses", [], |row| row.get(0))
            .map_err(storage_error(OPERATION))?;
        latest
            .map(|raw| parse_timestamp(0, &raw))
            .transpose()
            .map_err(storage_error(OPERATION))
    }

    fn upsert_course(
        &self,
        course: &CourseUpsert,
        updated_at: DateTime<Utc>,
    ) -> Result<CourseId, StorageError> {
        const OPERATION: &str = "upsert_course";
        let raw_tags = serde_json::to_string(&course.raw_tags)
            .map_err(|err| StorageError::new(OPERATION, err))?;
        let connection = self.lock(OPERATION)?;
        connection
            .query_row(
                "INSERT INTO courses (source_kind, source_id, name, lat, lon, access, raw_tags, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (source_kind, source_id) DO UPDATE SET
                    name = excluded.name,
                    lat = excluded.lat,
                    lon = excluded.lon,
                    access = excluded.access,
                    raw_tags = excluded.raw_tags,
                    updated_at = excluded.updated_at
                 RETURNING id",
                params![
                    course.source.kind.as_str(),
                    course.source.id,
                    course.name,
                    course.location.map(|coord| coord.y),
                    course.location.map(|coord| coord.x),
                    course.access.as_str(),
                    raw_tags,
                    format_timestamp(updated_at),
                ],
                |row| row.get(0).map(CourseId),
            )
            .map_err(storage_error(OPERATION))
    }

    fn list_courses(&self, filter: &AccessFilter) -> Result<Vec<Course>, StorageError> {
        const OPERATION: &str = "list_courses";
        let labels = filter.labels();
        let placeholders = (1..=labels.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses
             WHERE access IN ({placeholders})
             ORDER BY name COLLATE NOCASE, id"
        );

        let connection = self.lock(OPERATION)?;
        let mut statement = connection
            .prepare(&sql)
            .map_err(storage_error(OPERATION))?;
        let rows = statement
            .query_map(
                params_from_iter(labels.iter().map(|label| label.as_str())),
                course_from_row,
            )
            .map_err(storage_error(OPERATION))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(storage_error(OPERATION))
    }

    fn find_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        const OPERATION: &str = "find_course";
        let connection = self.lock(OPERATION)?;
        connection
            .query_row(
                &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"),
                [id.get()],
                course_from_row,
            )
            .optional()
            .map_err(storage_error(OPERATION))
    }

    fn find_course_by_source(&self, source: SourceRef) -> Result<Option<Course>, StorageError> {
        const OPERATION: &str = "find_course_by_source";
        let connection = self.lock(OPERATION)?;
        connection
            .query_row(
                &format!(
                    "SELECT {COURSE_COLUMNS} FROM courses WHERE source_kind = ?1 AND source_id = ?2"
                ),
                params![source.kind.as_str(), source.id],
                course_from_row,
            )
            .optional()
            .map_err(storage_error(OPERATION))
    }

    fn count_courses(&self) -> Result<usize, StorageError> {
        const OPERATION: &str = "count_courses";
        let connection = self.lock(OPERATION)?;
        let count: i64 = connection
            .query_row("SELECT count(*) FROM courses", [], |row| row.get(0))
            .map_err(storage_error(OPERATION))?;
        usize::try_from(count).map_err(|err| StorageError::new(OPERATION, err))
    }
}

fn course_from_row(row: &Row<'_>) -> Result<Course, SqliteError> {
    let kind: String = row.get(1)?;
    let access: String = row.get(6)?;
    let raw_tags: String = row.get(7)?;
    let updated_at: String = row.get(8)?;
    let lat: Option<f64> = row.get(4)?;
    let lon: Option<f64> = row.get(5)?;

    Ok(Course {
        id: CourseId(row.get(0)?),
        source: SourceRef::new(
            kind.parse()
                .map_err(|err| SqliteError::FromSqlConversionFailure(1, Type::Text, Box::new(err)))?,
            row.get(2)?,
        ),
        name: row.get(3)?,
        location: lat.zip(lon).map(|(y, x)| Coord { x, y }),
        access: access
            .parse()
            .map_err(|err| SqliteError::FromSqlConversionFailure(6, Type::Text, Box::new(err)))?,
        raw_tags: serde_json::from_str::<Tags>(&raw_tags)
            .map_err(|err| SqliteError::FromSqlConversionFailure(7, Type::Text, Box::new(err)))?,
        updated_at: parse_timestamp(8, &updated_at)?,
    })
}

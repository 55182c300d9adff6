//! Staging-to-model transformation statements.
//!
//! Five independent INSERT-from-SELECT statements reshape the staging tables
//! into the star schema. Dimensions collapse many staging rows to one via
//! DISTINCT (or most-recent-wins for users) and filter null keys; the fact
//! insert deliberately has no dedup, since repeated plays are distinct events.
//!
//! Timestamp derivation is `TIMESTAMP 'epoch' + ts / 1000 * INTERVAL
//! '1 second'`: integer division truncates milliseconds to whole seconds.
//! [`TimeParts`] mirrors that derivation in Rust so tests can pin the
//! expected values, including Redshift's weekday numbering (0 = Sunday).

use chrono::{DateTime, Datelike, Timelike, Utc};

/// User dimension insert.
///
/// A user's `level` flips between free and paid over time, so a full-row
/// DISTINCT would emit one row per (user, level) pair and violate the primary
/// key. Ranking by event timestamp keeps exactly one row per user_id with the
/// most recently observed attributes.
pub fn insert_users() -> &'static str {
    "\
INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT userid, firstname, lastname, gender, level
FROM (
    SELECT userid,
           firstname,
           lastname,
           gender,
           level,
           ROW_NUMBER() OVER (PARTITION BY userid ORDER BY ts DESC) AS recency_rank
    FROM staging_events
    WHERE userid IS NOT NULL
) latest
WHERE recency_rank = 1;"
}

/// Song dimension insert: distinct rows with a non-null song_id.
pub fn insert_songs() -> &'static str {
    "\
INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT DISTINCT song_id, title, artist_id, year, duration
FROM staging_songs
WHERE song_id IS NOT NULL;"
}

/// Artist dimension insert: distinct rows with a non-null artist_id.
pub fn insert_artists() -> &'static str {
    "\
INSERT INTO artists (artist_id, name, location, latitude, longitude)
SELECT DISTINCT artist_id, artist_name, artist_location, artist_latitude, artist_longitude
FROM staging_songs
WHERE artist_id IS NOT NULL;"
}

/// Time dimension insert.
///
/// Scoped to NextSong page events; timestamps of auth or page-view events
/// never land here.
pub fn insert_time() -> &'static str {
    "\
INSERT INTO time (start_time, hour, day, week, month, year, weekday)
SELECT DISTINCT start_time,
       EXTRACT(hour FROM start_time),
       EXTRACT(day FROM start_time),
       EXTRACT(week FROM start_time),
       EXTRACT(month FROM start_time),
       EXTRACT(year FROM start_time),
       EXTRACT(weekday FROM start_time)
FROM (
    SELECT TIMESTAMP 'epoch' + ts / 1000 * INTERVAL '1 second' AS start_time
    FROM staging_events
    WHERE page = 'NextSong'
) events;"
}

/// Fact table insert.
///
/// Inner join on (title, artist name): events with no matching song produce
/// no fact row. That is a silent drop, not an error.
pub fn insert_songplay() -> &'static str {
    "\
INSERT INTO songplay (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT TIMESTAMP 'epoch' + e.ts / 1000 * INTERVAL '1 second' AS start_time,
       e.userid,
       e.level,
       s.song_id,
       s.artist_id,
       e.sessionid,
       e.location,
       e.useragent
FROM staging_events e
JOIN staging_songs s
  ON e.song = s.title
 AND e.artist = s.artist_name;"
}

/// A decomposed event timestamp, matching the SQL derivation exactly.
///
/// `weekday` uses Redshift's `EXTRACT(weekday ...)` convention:
/// 0 = Sunday through 6 = Saturday. `week` is the ISO week number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub start_time: DateTime<Utc>,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

impl TimeParts {
    /// Decompose an epoch-millisecond event timestamp.
    ///
    /// Milliseconds are truncated to whole seconds (floor division), the same
    /// as the integer division in the SQL expression. Returns `None` for
    /// timestamps outside chrono's representable range.
    pub fn from_event_millis(ts_millis: i64) -> Option<Self> {
        let secs = ts_millis.div_euclid(1000);
        let start_time = DateTime::<Utc>::from_timestamp(secs, 0)?;
        Some(Self {
            start_time,
            hour: start_time.hour(),
            day: start_time.day(),
            week: start_time.iso_week().week(),
            month: start_time.month(),
            year: start_time.year(),
            weekday: start_time.weekday().num_days_from_sunday(),
        })
    }
}

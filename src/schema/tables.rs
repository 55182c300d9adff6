//! The seven warehouse tables.
//!
//! Two staging tables mirror the source JSON verbatim with no constraints;
//! `ts` stays a raw BIGINT (epoch milliseconds) for load speed and is
//! converted to a timestamp during the transform stage.
//!
//! The five model tables form the star schema: `songplay` is the fact table,
//! `users`, `songs`, `artists`, and `time` are dimensions. Recent data is
//! queried most, so timestamps lead the sort keys; the dimension primary keys
//! double as distribution keys to co-locate join partners.

use super::{Column, SqlType, Table};

/// Raw landing zone for event-log records, one row per JSON object.
pub fn staging_events() -> Table {
    Table::new(
        "staging_events",
        vec![
            Column::new("artist", SqlType::Varchar),
            Column::new("auth", SqlType::Varchar),
            Column::new("firstname", SqlType::Varchar),
            Column::new("gender", SqlType::VarcharN(1)),
            Column::new("iteminsession", SqlType::Int),
            Column::new("lastname", SqlType::Varchar),
            Column::new("length", SqlType::Float),
            Column::new("level", SqlType::Varchar),
            Column::new("location", SqlType::Varchar),
            Column::new("method", SqlType::Varchar),
            Column::new("page", SqlType::Varchar),
            Column::new("registration", SqlType::Float),
            Column::new("sessionid", SqlType::Int),
            Column::new("song", SqlType::Varchar),
            Column::new("status", SqlType::Int),
            Column::new("ts", SqlType::BigInt),
            Column::new("useragent", SqlType::Varchar),
            Column::new("userid", SqlType::Int),
        ],
    )
}

/// Raw landing zone for song-metadata documents, one row per JSON file.
pub fn staging_songs() -> Table {
    Table::new(
        "staging_songs",
        vec![
            Column::new("num_songs", SqlType::Int),
            Column::new("artist_id", SqlType::Varchar),
            Column::new("artist_latitude", SqlType::Float),
            Column::new("artist_longitude", SqlType::Float),
            Column::new("artist_location", SqlType::Varchar),
            Column::new("artist_name", SqlType::Varchar),
            Column::new("song_id", SqlType::Varchar),
            Column::new("title", SqlType::Varchar),
            Column::new("duration", SqlType::Float),
            Column::new("year", SqlType::SmallInt),
        ],
    )
}

/// User dimension, one row per user seen in the event logs.
pub fn users() -> Table {
    Table::new(
        "users",
        vec![
            Column::new("user_id", SqlType::Int)
                .not_null()
                .primary_key()
                .sort_key()
                .dist_key(),
            Column::new("first_name", SqlType::Varchar),
            Column::new("last_name", SqlType::Varchar),
            Column::new("gender", SqlType::VarcharN(1)),
            Column::new("level", SqlType::Varchar),
        ],
    )
}

/// Song dimension, one row per distinct song_id in the metadata.
pub fn songs() -> Table {
    Table::new(
        "songs",
        vec![
            Column::new("song_id", SqlType::Varchar)
                .not_null()
                .primary_key()
                .sort_key()
                .dist_key(),
            Column::new("title", SqlType::Varchar),
            Column::new("artist_id", SqlType::Varchar),
            Column::new("year", SqlType::SmallInt),
            Column::new("duration", SqlType::Float),
        ],
    )
}

/// Artist dimension, one row per distinct artist_id in the metadata.
pub fn artists() -> Table {
    Table::new(
        "artists",
        vec![
            Column::new("artist_id", SqlType::Varchar)
                .not_null()
                .primary_key()
                .sort_key()
                .dist_key(),
            Column::new("name", SqlType::Varchar),
            Column::new("location", SqlType::Varchar),
            Column::new("latitude", SqlType::Float),
            Column::new("longitude", SqlType::Float),
        ],
    )
}

/// Time dimension, timestamps decomposed into calendar parts.
///
/// Only populated from NextSong events, so timestamps of other event types
/// have no row here.
pub fn time() -> Table {
    Table::new(
        "time",
        vec![
            Column::new("start_time", SqlType::Timestamp)
                .not_null()
                .primary_key()
                .sort_key(),
            Column::new("hour", SqlType::Int),
            Column::new("day", SqlType::Int),
            Column::new("week", SqlType::Int),
            Column::new("month", SqlType::Int),
            Column::new("year", SqlType::Int),
            Column::new("weekday", SqlType::Int),
        ],
    )
}

/// Fact table, one row per event that matched a song in the metadata.
///
/// No natural uniqueness at this grain (repeated plays are distinct events);
/// the identity column provides row identity instead.
pub fn songplay() -> Table {
    Table::new(
        "songplay",
        vec![
            Column::new("songplay_id", SqlType::BigInt)
                .identity()
                .primary_key(),
            Column::new("start_time", SqlType::Timestamp)
                .references("time", "start_time")
                .sort_key(),
            Column::new("user_id", SqlType::Int).references("users", "user_id"),
            Column::new("level", SqlType::Varchar),
            Column::new("song_id", SqlType::Varchar).references("songs", "song_id"),
            Column::new("artist_id", SqlType::Varchar).references("artists", "artist_id"),
            Column::new("session_id", SqlType::Int),
            Column::new("location", SqlType::Varchar),
            Column::new("user_agent", SqlType::Varchar),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_events_mirrors_source_json() {
        let table = staging_events();
        assert_eq!(table.columns.len(), 18);

        let ts = table.columns.iter().find(|c| c.name == "ts").unwrap();
        assert_eq!(ts.ty, SqlType::BigInt);
    }

    #[test]
    fn test_songplay_references_all_four_dimensions() {
        let mut referenced = songplay().referenced_tables();
        referenced.sort_unstable();
        assert_eq!(referenced, vec!["artists", "songs", "time", "users"]);
    }

    #[test]
    fn test_songplay_identity_key() {
        let sql = songplay().create_statement();
        assert!(sql.contains("songplay_id BIGINT IDENTITY(0,1) PRIMARY KEY"));
    }

    #[test]
    fn test_dimension_keys_are_not_null() {
        for (table, key) in [
            (users(), "user_id"),
            (songs(), "song_id"),
            (artists(), "artist_id"),
            (time(), "start_time"),
        ] {
            let sql = table.create_statement();
            assert!(
                sql.contains(&format!("{key} ")) && sql.contains("NOT NULL PRIMARY KEY"),
                "table {} key {key} is not a NOT NULL primary key",
                table.name
            );
        }
    }

    #[test]
    fn test_create_matches_expected_users_ddl() {
        let expected = "\
CREATE TABLE IF NOT EXISTS users (
    user_id INT NOT NULL PRIMARY KEY SORTKEY DISTKEY,
    first_name VARCHAR,
    last_name VARCHAR,
    gender VARCHAR(1),
    level VARCHAR
);";
        assert_eq!(users().create_statement(), expected);
    }
}

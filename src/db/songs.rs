//! Song database operations
//!
//! A song is a catalog record pointing at exactly one uploaded file. Every
//! mutation that touches more than one row runs inside a single
//! transaction, so the referenced file can't disappear between the
//! existence check and the write.

use anyhow::Result;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::files::FileRecord;

/// Song record joined with its file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    pub id: i64,
    pub file: FileRecord,
}

/// Outcome of an update, distinguishing which lookup failed
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(Song),
    SongMissing,
    FileMissing,
}

/// Result of a successful deletion
#[derive(Debug)]
pub struct DeletedSong {
    /// Pre-deletion snapshot, including the file it referenced
    pub song: Song,
    /// Whether the referenced file row was removed as well
    pub file_row_deleted: bool,
}

const SONG_SELECT: &str = "SELECT songs.id AS id, files.id AS file_id, files.name AS file_name \
     FROM songs JOIN files ON files.id = songs.file_id";

fn song_from_row(row: &SqliteRow) -> Song {
    Song {
        id: row.get("id"),
        file: FileRecord {
            id: row.get("file_id"),
            name: row.get("file_name"),
        },
    }
}

/// Load all songs ordered by ascending id
pub async fn list_songs(pool: &SqlitePool) -> Result<Vec<Song>> {
    let rows = sqlx::query(&format!("{SONG_SELECT} ORDER BY songs.id"))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(song_from_row).collect())
}

/// Load song by id
pub async fn get_song(pool: &SqlitePool, id: i64) -> Result<Option<Song>> {
    let row = sqlx::query(&format!("{SONG_SELECT} WHERE songs.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(song_from_row))
}

/// Insert a new song referencing an existing file
///
/// Returns `None` without inserting anything when no file with `file_id`
/// exists. Check and insert share one transaction.
pub async fn create_song(pool: &SqlitePool, file_id: i64) -> Result<Option<Song>> {
    let mut tx = pool.begin().await?;

    let file_row = sqlx::query("SELECT id, name FROM files WHERE id = ?")
        .bind(file_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(file_row) = file_row else {
        return Ok(None);
    };
    let file = FileRecord {
        id: file_row.get("id"),
        name: file_row.get("name"),
    };

    let result = sqlx::query("INSERT INTO songs (file_id) VALUES (?)")
        .bind(file_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(Song {
        id: result.last_insert_rowid(),
        file,
    }))
}

/// Repoint an existing song at a different file
pub async fn update_song(pool: &SqlitePool, song_id: i64, file_id: i64) -> Result<UpdateOutcome> {
    let mut tx = pool.begin().await?;

    let song_exists = sqlx::query("SELECT id FROM songs WHERE id = ?")
        .bind(song_id)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();
    if !song_exists {
        return Ok(UpdateOutcome::SongMissing);
    }

    let file_row = sqlx::query("SELECT id, name FROM files WHERE id = ?")
        .bind(file_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(file_row) = file_row else {
        return Ok(UpdateOutcome::FileMissing);
    };
    let file = FileRecord {
        id: file_row.get("id"),
        name: file_row.get("name"),
    };

    sqlx::query("UPDATE songs SET file_id = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(file_id)
        .bind(song_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(UpdateOutcome::Updated(Song { id: song_id, file }))
}

/// Delete a song and the file row it references
///
/// Removes the file the song actually points at, not a file sharing the
/// song's id. The file row survives if another song still references it.
/// Returns the pre-deletion snapshot, or `None` if no such song exists.
pub async fn delete_song(pool: &SqlitePool, song_id: i64) -> Result<Option<DeletedSong>> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query(&format!("{SONG_SELECT} WHERE songs.id = ?"))
        .bind(song_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let song = song_from_row(&row);

    sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(song_id)
        .execute(&mut *tx)
        .await?;

    let file_delete = sqlx::query(
        "DELETE FROM files WHERE id = ? \
         AND NOT EXISTS (SELECT 1 FROM songs WHERE file_id = ?)",
    )
    .bind(song.file.id)
    .bind(song.file.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(DeletedSong {
        song,
        file_row_deleted: file_delete.rows_affected() > 0,
    }))
}

/// Count total songs in database
pub async fn count_songs(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::files::create_file;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_create_and_list_songs() {
        let pool = test_pool().await;

        let file_a = create_file(&pool, "file_a.mp3").await.unwrap();
        let file_b = create_file(&pool, "file_b.mp3").await.unwrap();

        let song_a = create_song(&pool, file_a.id)
            .await
            .unwrap()
            .expect("file should exist");
        let song_b = create_song(&pool, file_b.id)
            .await
            .unwrap()
            .expect("file should exist");

        let songs = list_songs(&pool).await.unwrap();
        assert_eq!(songs, vec![song_a, song_b]);
    }

    #[tokio::test]
    async fn test_create_song_missing_file() {
        let pool = test_pool().await;

        let created = create_song(&pool, 7).await.unwrap();
        assert!(created.is_none());
        assert_eq!(count_songs(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_song_repoints_file() {
        let pool = test_pool().await;

        let file_a = create_file(&pool, "file_a.mp3").await.unwrap();
        let file_b = create_file(&pool, "file_b.mp3").await.unwrap();
        let song = create_song(&pool, file_a.id).await.unwrap().unwrap();

        let outcome = update_song(&pool, song.id, file_b.id).await.unwrap();
        let updated = match outcome {
            UpdateOutcome::Updated(song) => song,
            other => panic!("Expected update to succeed, got {:?}", other),
        };
        assert_eq!(updated.file, file_b);

        let stored = get_song(&pool, song.id).await.unwrap().unwrap();
        assert_eq!(stored.file, file_b);
        assert_eq!(count_songs(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_song_missing_cases() {
        let pool = test_pool().await;

        let file = create_file(&pool, "file_a.mp3").await.unwrap();
        let song = create_song(&pool, file.id).await.unwrap().unwrap();

        assert!(matches!(
            update_song(&pool, 99, file.id).await.unwrap(),
            UpdateOutcome::SongMissing
        ));
        assert!(matches!(
            update_song(&pool, song.id, 99).await.unwrap(),
            UpdateOutcome::FileMissing
        ));
    }

    #[tokio::test]
    async fn test_delete_song_removes_referenced_file() {
        let pool = test_pool().await;

        // Ids diverge: song 1 references file 2
        let _unused = create_file(&pool, "unused.mp3").await.unwrap();
        let referenced = create_file(&pool, "referenced.mp3").await.unwrap();
        let song = create_song(&pool, referenced.id).await.unwrap().unwrap();

        let deleted = delete_song(&pool, song.id)
            .await
            .unwrap()
            .expect("song should exist");
        assert_eq!(deleted.song.file, referenced);
        assert!(deleted.file_row_deleted);

        // The file the song referenced is gone; the unrelated file whose id
        // matches the song's id survives.
        assert!(crate::db::files::get_file(&pool, referenced.id)
            .await
            .unwrap()
            .is_none());
        assert!(crate::db::files::get_file(&pool, song.id)
            .await
            .unwrap()
            .is_some());
        assert_eq!(count_songs(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_song_keeps_shared_file() {
        let pool = test_pool().await;

        let file = create_file(&pool, "shared.mp3").await.unwrap();
        let song_a = create_song(&pool, file.id).await.unwrap().unwrap();
        let _song_b = create_song(&pool, file.id).await.unwrap().unwrap();

        let deleted = delete_song(&pool, song_a.id).await.unwrap().unwrap();
        assert!(!deleted.file_row_deleted);
        assert!(crate::db::files::get_file(&pool, file.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_song() {
        let pool = test_pool().await;

        let deleted = delete_song(&pool, 3).await.unwrap();
        assert!(deleted.is_none());
    }
}

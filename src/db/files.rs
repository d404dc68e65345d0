//! File database operations
//!
//! A file row is the catalog metadata for one uploaded blob; the bytes
//! themselves live in the uploads directory under `name`.

use anyhow::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// Uploaded file record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub id: i64,
    pub name: String,
}

/// Insert a new file row, returning the generated id
pub async fn create_file(pool: &SqlitePool, name: &str) -> Result<FileRecord> {
    let result = sqlx::query("INSERT INTO files (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(FileRecord {
        id: result.last_insert_rowid(),
        name: name.to_string(),
    })
}

/// Load file by id
pub async fn get_file(pool: &SqlitePool, id: i64) -> Result<Option<FileRecord>> {
    let row = sqlx::query("SELECT id, name FROM files WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| FileRecord {
        id: row.get("id"),
        name: row.get("name"),
    }))
}

/// Count total files in database
pub async fn count_files(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    async fn test_create_and_get_file() {
        let pool = test_pool().await;

        let file = create_file(&pool, "track01.mp3")
            .await
            .expect("Failed to create file");
        assert_eq!(file.id, 1);
        assert_eq!(file.name, "track01.mp3");

        let loaded = get_file(&pool, file.id)
            .await
            .expect("Failed to load file")
            .expect("File not found");
        assert_eq!(loaded, file);
    }

    #[tokio::test]
    async fn test_get_missing_file() {
        let pool = test_pool().await;

        let loaded = get_file(&pool, 42).await.expect("Query failed");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_ids_ascend() {
        let pool = test_pool().await;

        let first = create_file(&pool, "a.mp3").await.unwrap();
        let second = create_file(&pool, "b.mp3").await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(count_files(&pool).await.unwrap(), 2);
    }
}

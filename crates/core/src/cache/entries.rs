//! SQLite implementation of the generation store.
//!
//! Generations are rows in the `generations` table; their entries cascade on
//! delete, so removing a generation is a single atomic statement from the
//! perspective of readers.

use async_trait::async_trait;

use super::connection::SqliteStore;
use super::entry::CachedResponse;
use super::store::GenerationStore;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

#[async_trait]
impl GenerationStore for SqliteStore {
    async fn create_generation(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO generations (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn list_generations(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, rusqlite::Error>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn get(&self, generation: &str, signature: &str) -> Result<Option<CachedResponse>, Error> {
        let generation = generation.to_string();
        let signature = signature.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT signature, url, method, status, content_type, headers_json, body, stored_at
                     FROM entries WHERE generation = ?1 AND signature = ?2",
                )?;

                let result = stmt.query_row(params![generation, signature], |row| {
                    Ok(CachedResponse {
                        signature: row.get(0)?,
                        url: row.get(1)?,
                        method: row.get(2)?,
                        status: row.get::<_, i64>(3)? as u16,
                        content_type: row.get(4)?,
                        headers_json: row.get(5)?,
                        body: row.get(6)?,
                        stored_at: row.get(7)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, generation: &str, entry: &CachedResponse) -> Result<(), Error> {
        let generation = generation.to_string();
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (
                        generation, signature, url, method, status,
                        content_type, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(generation, signature) DO UPDATE SET
                        url = excluded.url,
                        method = excluded.method,
                        status = excluded.status,
                        content_type = excluded.content_type,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        generation,
                        &entry.signature,
                        &entry.url,
                        &entry.method,
                        entry.status as i64,
                        &entry.content_type,
                        &entry.headers_json,
                        &entry.body,
                        &entry.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn count_entries(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE generation = ?1",
                    params![generation],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

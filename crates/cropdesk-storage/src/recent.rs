//! Recent-file table access

use chrono::Utc;

use crate::database::Database;
use crate::Result;

impl Database {
    /// Load the persisted recent-file list, most recent first.
    pub fn load_recent_files(&self) -> Result<Vec<String>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT path FROM recent_files ORDER BY position ASC")?;
            let paths = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(paths)
        })
    }

    /// Replace the whole recent-file list in one transaction.
    ///
    /// `paths` must already be free of duplicates; the `UNIQUE` constraint
    /// rejects the write otherwise and the previous list is kept.
    pub fn replace_recent_files(&self, paths: &[String]) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();

        self.transaction(|conn| {
            conn.execute("DELETE FROM recent_files", [])?;
            let mut stmt = conn.prepare(
                "INSERT INTO recent_files (position, path, updated_at) VALUES (?1, ?2, ?3)",
            )?;
            for (position, path) in paths.iter().enumerate() {
                stmt.execute(rusqlite::params![position as i64, path, updated_at])?;
            }
            Ok(())
        })?;

        tracing::debug!(count = paths.len(), "Persisted recent files");

        Ok(())
    }
}

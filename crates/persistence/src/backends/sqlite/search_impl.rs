//! Search execution for the SQLite backend.

use std::collections::HashSet;

use rusqlite::params_from_iter;
use tracing::debug;

use crate::error::{BackendError, StorageError, StorageResult};
use crate::repository::SearchExecutor;
use crate::search::{ResolvedQuery, SqlFragment};
use crate::types::{IncludedRef, SearchPage};

use super::SqliteBackend;

fn query_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::QueryError { message })
}

fn select_ids(conn: &rusqlite::Connection, fragment: &SqlFragment) -> StorageResult<Vec<String>> {
    let mut stmt = conn
        .prepare(&fragment.sql)
        .map_err(|e| query_error(format!("Failed to prepare search: {}", e)))?;
    stmt.query_map(params_from_iter(fragment.params.iter()), |row| {
        row.get::<_, String>(0)
    })
    .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
    .map_err(|e| query_error(format!("Failed to run search: {}", e)))
}

impl SearchExecutor for SqliteBackend {
    fn execute(&self, query: &ResolvedQuery) -> StorageResult<SearchPage> {
        let conn = self.get_connection()?;

        let ids = select_ids(&conn, &query.select())?;
        let count = query.count();
        let total: i64 = conn
            .query_row(&count.sql, params_from_iter(count.params.iter()), |row| row.get(0))
            .map_err(|e| query_error(format!("Failed to count search: {}", e)))?;

        debug!(
            resource_type = query.resource_type,
            matches = ids.len(),
            "Executed search"
        );
        Ok(SearchPage {
            ids,
            total: usize::try_from(total).unwrap_or_default(),
        })
    }

    fn resolve_includes(
        &self,
        query: &ResolvedQuery,
        page_ids: &[String],
    ) -> StorageResult<Vec<IncludedRef>> {
        if page_ids.is_empty() || query.includes.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_connection()?;

        let mut seen = HashSet::new();
        let mut included = Vec::new();
        for include in &query.includes {
            let resource_type = include.yields_type();
            for id in select_ids(&conn, &include.select_for(page_ids))? {
                if seen.insert((resource_type, id.clone())) {
                    included.push(IncludedRef {
                        resource_type: resource_type.to_string(),
                        id,
                    });
                }
            }
        }
        debug!(count = included.len(), "Resolved includes");
        Ok(included)
    }
}

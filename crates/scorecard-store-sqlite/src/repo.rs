//! Generic row machinery shared by every entity table.
//!
//! Each entity's raw row type implements [`Table`], and the functions below
//! provide the shared create/read/delete operations over any such type. All
//! functions run synchronously inside a `tokio_rusqlite` connection closure;
//! multi-statement operations open their own transaction, so each store call
//! is one commit-or-rollback unit.

use rusqlite::{Connection, OptionalExtension as _, params_from_iter, types::Value};
use scorecard_core::store::ListQuery;

/// SQL mapping for one entity table.
pub trait Table: Sized + Send + 'static {
  /// Table name as it appears in the schema.
  const TABLE: &'static str;
  /// Primary-key column.
  const ID: &'static str;
  /// All columns, in insert order (primary key first, `created_at` second).
  const COLUMNS: &'static [&'static str];

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
  fn values(&self) -> Vec<Value>;
}

fn column_list<T: Table>() -> String { T::COLUMNS.join(", ") }

fn insert_sql<T: Table>(or_ignore: bool) -> String {
  let placeholders = (1..=T::COLUMNS.len())
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  format!(
    "INSERT {}INTO {} ({}) VALUES ({})",
    if or_ignore { "OR IGNORE " } else { "" },
    T::TABLE,
    column_list::<T>(),
    placeholders,
  )
}

// ─── Writes ──────────────────────────────────────────────────────────────────

pub fn insert_row<T: Table>(conn: &Connection, row: &T) -> rusqlite::Result<()> {
  conn.execute(&insert_sql::<T>(false), params_from_iter(row.values()))?;
  Ok(())
}

/// Insert all rows in one transaction; any failure rolls back the batch.
pub fn insert_rows<T: Table>(
  conn: &mut Connection,
  rows: &[T],
) -> rusqlite::Result<()> {
  let tx = conn.transaction()?;
  {
    let mut stmt = tx.prepare(&insert_sql::<T>(false))?;
    for row in rows {
      stmt.execute(params_from_iter(row.values()))?;
    }
  }
  tx.commit()
}

/// Insert rows in one transaction, skipping any that collide with a
/// uniqueness constraint. Returns one flag per input row: `true` if the row
/// actually landed.
pub fn insert_rows_skip_conflicts<T: Table>(
  conn: &mut Connection,
  rows: &[T],
) -> rusqlite::Result<Vec<bool>> {
  let tx = conn.transaction()?;
  let mut inserted = Vec::with_capacity(rows.len());
  {
    let mut stmt = tx.prepare(&insert_sql::<T>(true))?;
    for row in rows {
      inserted.push(stmt.execute(params_from_iter(row.values()))? > 0);
    }
  }
  tx.commit()?;
  Ok(inserted)
}

// ─── Reads ───────────────────────────────────────────────────────────────────

pub fn fetch_row<T: Table>(
  conn: &Connection,
  id: &str,
) -> rusqlite::Result<Option<T>> {
  conn
    .query_row(
      &format!(
        "SELECT {} FROM {} WHERE {} = ?1",
        column_list::<T>(),
        T::TABLE,
        T::ID,
      ),
      rusqlite::params![id],
      |row| T::from_row(row),
    )
    .optional()
}

/// Equality-filtered listing over one foreign-key column.
pub fn fetch_by_column<T: Table>(
  conn: &Connection,
  column: &str,
  key: &str,
) -> rusqlite::Result<Vec<T>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM {} WHERE {column} = ?1 ORDER BY created_at",
    column_list::<T>(),
    T::TABLE,
  ))?;
  let rows = stmt
    .query_map(rusqlite::params![key], |row| T::from_row(row))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Paginated listing. An `order_by` naming a column the table does not have
/// falls back to `created_at` with a logged diagnostic; it never fails the
/// call.
pub fn fetch_page<T: Table>(
  conn: &Connection,
  query: &ListQuery,
) -> rusqlite::Result<Vec<T>> {
  let column = match query.order_by.as_deref() {
    None => "created_at",
    Some(c) if T::COLUMNS.contains(&c) => c,
    Some(other) => {
      tracing::warn!(
        table = T::TABLE,
        column = other,
        "unknown sort column, falling back to created_at",
      );
      "created_at"
    }
  };
  let direction = if query.ascending { "ASC" } else { "DESC" };
  let limit = query.limit.unwrap_or(100) as i64;
  let skip = query.skip as i64;

  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM {} ORDER BY {column} {direction} LIMIT ?1 OFFSET ?2",
    column_list::<T>(),
    T::TABLE,
  ))?;
  let rows = stmt
    .query_map(rusqlite::params![limit, skip], |row| T::from_row(row))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

// ─── Deletes ─────────────────────────────────────────────────────────────────

pub fn delete_row<T: Table>(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
  let removed = conn.execute(
    &format!("DELETE FROM {} WHERE {} = ?1", T::TABLE, T::ID),
    rusqlite::params![id],
  )?;
  Ok(removed > 0)
}

/// Delete the given rows by id in one transaction; returns the number
/// actually removed.
pub fn delete_rows<T: Table>(
  conn: &mut Connection,
  ids: &[String],
) -> rusqlite::Result<usize> {
  let tx = conn.transaction()?;
  let mut removed = 0;
  {
    let mut stmt =
      tx.prepare(&format!("DELETE FROM {} WHERE {} = ?1", T::TABLE, T::ID))?;
    for id in ids {
      removed += stmt.execute(rusqlite::params![id])?;
    }
  }
  tx.commit()?;
  Ok(removed)
}

/// Delete every row matching one foreign-key column.
pub fn delete_by_column<T: Table>(
  conn: &Connection,
  column: &str,
  key: &str,
) -> rusqlite::Result<usize> {
  conn.execute(
    &format!("DELETE FROM {} WHERE {column} = ?1", T::TABLE),
    rusqlite::params![key],
  )
}

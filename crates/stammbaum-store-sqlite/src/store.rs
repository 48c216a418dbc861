//! [`SqliteStore`], the SQLite implementation of [`PersonStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};

use stammbaum_core::{
  AncestorNode,
  person::{ChartPerson, NewPerson, Person, PersonId, PersonPatch, PersonProfile},
  resolve,
  store::{PersonQuery, PersonStore},
};

use crate::{
  Error, Result,
  encode::{
    CHART_COLUMNS, PERSON_COLUMNS, RawChartPerson, RawPerson, RawProfile, RawRelative,
    RawSummary, encode_date, encode_dt, encode_sex, like_pattern,
  },
  schema::{SCHEMA, register_functions},
};

/// Ordering shared by every listing of persons.
const NAME_ORDER: &str =
  "family_name COLLATE NOCASE, given_name COLLATE NOCASE, id";

/// Ordering for siblings and children: by birth date, unknown dates last.
const BIRTH_ORDER: &str = "birth_date IS NULL, birth_date, id";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A person store backed by a single SQLite file.
///
/// Clones share the same underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, as used by the tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT {PERSON_COLUMNS}` query and decode every row.
  async fn query_persons(&self, sql: String, args: Vec<Value>) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }
}

/// First of `ids` without a row. Runs on the connection that is about to
/// write, so no other call can delete the parent in between.
fn missing_parent(conn: &rusqlite::Connection, ids: &[i64]) -> rusqlite::Result<Option<PersonId>> {
  let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM persons WHERE id = ?1)")?;
  for &id in ids {
    let exists: bool = stmt.query_row(rusqlite::params![id], |row| row.get(0))?;
    if !exists {
      return Ok(Some(PersonId(id)));
    }
  }
  Ok(None)
}

/// Decode one row fetched by the resolver. A malformed ancestor ends its
/// branch; a malformed root fails the whole lookup.
fn decode_node<Raw, R>(
  root: PersonId,
  id: PersonId,
  raw: Option<Raw>,
  decode: fn(Raw) -> Result<R>,
) -> Result<Option<R>> {
  let Some(raw) = raw else { return Ok(None) };
  match decode(raw) {
    Ok(record) => Ok(Some(record)),
    Err(e) if id != root => {
      tracing::warn!(person = %id, root = %root, error = %e, "dropping undecodable ancestor");
      Ok(None)
    }
    Err(e) => Err(e),
  }
}

// ─── PersonStore impl ────────────────────────────────────────────────────────

impl PersonStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    let created_at = Utc::now();

    let given_name     = input.given_name.clone();
    let family_name    = input.family_name.clone();
    let birth_date_str = input.birth_date.map(encode_date);
    let sex_code       = input.sex.map(encode_sex);
    let father_id      = input.father_id.map(|p| p.0);
    let mother_id      = input.mother_id.map(|p| p.0);
    let at_str         = encode_dt(created_at);

    let parents: Vec<i64> = [father_id, mother_id].into_iter().flatten().collect();

    let inserted = self
      .conn
      .call(move |conn| {
        if let Some(missing) = missing_parent(conn, &parents)? {
          return Ok(Err(missing));
        }
        conn.execute(
          "INSERT INTO persons (
             given_name, family_name, birth_date, sex, father_id, mother_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            given_name,
            family_name,
            birth_date_str,
            sex_code,
            father_id,
            mother_id,
            at_str,
          ],
        )?;
        Ok(Ok(conn.last_insert_rowid()))
      })
      .await?;
    let id = inserted.map_err(stammbaum_core::Error::UnknownParent)?;

    Ok(Person {
      id: PersonId(id),
      given_name: input.given_name,
      family_name: input.family_name,
      birth_date: input.birth_date,
      sex: input.sex,
      father_id: input.father_id,
      mother_id: input.mother_id,
      created_at,
    })
  }

  async fn update_person(&self, id: PersonId, patch: PersonPatch) -> Result<Option<Person>> {
    if patch.is_empty() {
      return Err(stammbaum_core::Error::EmptyPatch(id).into());
    }

    let parents: Vec<i64> = patch.parent_ids().map(|p| p.0).collect();

    // Build the SET clause dynamically; ?1 is reserved for the id.
    let mut columns: Vec<&'static str> = vec![];
    let mut values: Vec<Value> = vec![Value::Integer(id.0)];

    if let Some(given) = patch.given_name {
      columns.push("given_name");
      values.push(Value::Text(given));
    }
    if let Some(family) = patch.family_name {
      columns.push("family_name");
      values.push(Value::Text(family));
    }
    if let Some(birth_date) = patch.birth_date {
      columns.push("birth_date");
      values.push(birth_date.map(encode_date).map_or(Value::Null, Value::Text));
    }
    if let Some(sex) = patch.sex {
      columns.push("sex");
      values.push(sex.map(encode_sex).map_or(Value::Null, Value::Integer));
    }
    if let Some(father) = patch.father_id {
      columns.push("father_id");
      values.push(father.map_or(Value::Null, |p| Value::Integer(p.0)));
    }
    if let Some(mother) = patch.mother_id {
      columns.push("mother_id");
      values.push(mother.map_or(Value::Null, |p| Value::Integer(p.0)));
    }

    let assignments = columns
      .iter()
      .enumerate()
      .map(|(i, column)| format!("{column} = ?{}", i + 2))
      .collect::<Vec<_>>()
      .join(", ");
    let update_sql = format!("UPDATE persons SET {assignments} WHERE id = ?1");
    let select_sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1");

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        if let Some(missing) = missing_parent(conn, &parents)? {
          return Ok(Err(missing));
        }
        let changed = conn.execute(&update_sql, rusqlite::params_from_iter(values))?;
        if changed == 0 {
          return Ok(Ok(None));
        }
        Ok(Ok(
          conn
            .query_row(&select_sql, rusqlite::params![id.0], RawPerson::from_row)
            .optional()?,
        ))
      })
      .await?
      .map_err(stammbaum_core::Error::UnknownParent)?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn delete_person(&self, id: PersonId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM persons WHERE id = ?1", rusqlite::params![id.0])?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1");

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id.0], RawPerson::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_persons(&self) -> Result<Vec<Person>> {
    self
      .query_persons(
        format!("SELECT {PERSON_COLUMNS} FROM persons ORDER BY {NAME_ORDER}"),
        vec![],
      )
      .await
  }

  async fn search_persons(&self, query: &PersonQuery) -> Result<Vec<Person>> {
    // Both sides are folded, so the match ignores case beyond ASCII too.
    let pattern = like_pattern(&query.text.to_lowercase());
    let limit   = i64::try_from(query.limit).unwrap_or(i64::MAX);

    self
      .query_persons(
        format!(
          "SELECT {PERSON_COLUMNS} FROM persons
           WHERE fold(given_name) LIKE ?1 ESCAPE '\\'
              OR fold(family_name) LIKE ?1 ESCAPE '\\'
           ORDER BY {NAME_ORDER}
           LIMIT ?2"
        ),
        vec![Value::Text(pattern), Value::Integer(limit)],
      )
      .await
  }

  async fn profile(&self, id: PersonId) -> Result<Option<PersonProfile>> {
    let person_sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1");
    let sibling_sql = format!(
      "SELECT id, given_name, family_name, birth_date FROM persons
       WHERE (father_id = ?1 OR mother_id = ?2) AND id != ?3
       ORDER BY {BIRTH_ORDER}"
    );
    let children_sql = format!(
      "SELECT id, given_name, family_name, birth_date FROM persons
       WHERE father_id = ?1 OR mother_id = ?1
       ORDER BY {BIRTH_ORDER}"
    );

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let Some(person) = conn
          .query_row(&person_sql, rusqlite::params![id.0], RawPerson::from_row)
          .optional()?
        else {
          return Ok(None);
        };

        let summary = |parent: Option<i64>| -> rusqlite::Result<Option<RawSummary>> {
          match parent {
            None => Ok(None),
            Some(pid) => conn
              .query_row(
                "SELECT id, given_name, family_name FROM persons WHERE id = ?1",
                rusqlite::params![pid],
                RawSummary::from_row,
              )
              .optional(),
          }
        };
        let father = summary(person.father_id)?;
        let mother = summary(person.mother_id)?;

        // A NULL parent id never compares equal, so parentless persons have
        // no siblings.
        let siblings = conn
          .prepare(&sibling_sql)?
          .query_map(
            rusqlite::params![person.father_id, person.mother_id, id.0],
            RawRelative::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let children = conn
          .prepare(&children_sql)?
          .query_map(rusqlite::params![id.0], RawRelative::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(RawProfile { person, father, mother, siblings, children }))
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  // ── Ancestor trees ────────────────────────────────────────────────────────
  //
  // The whole traversal runs inside one `call`, so it holds the connection
  // for its full duration and issues one point query per visited node. Rows
  // are decoded as they are fetched.

  async fn ancestor_tree(
    &self,
    id: PersonId,
    max_depth: u32,
  ) -> Result<Option<AncestorNode<Person>>> {
    let sql = format!("SELECT {PERSON_COLUMNS} FROM persons WHERE id = ?1");

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        Ok(resolve(Some(id), max_depth, |pid| {
          let raw = stmt
            .query_row(rusqlite::params![pid.0], RawPerson::from_row)
            .optional()
            .map_err(|e| Error::Database(e.into()))?;
          decode_node(id, pid, raw, RawPerson::into_person)
        }))
      })
      .await?
  }

  async fn ancestor_chart(
    &self,
    id: PersonId,
    generations: u32,
  ) -> Result<Option<AncestorNode<ChartPerson>>> {
    let sql = format!("SELECT {CHART_COLUMNS} FROM persons WHERE id = ?1");

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        Ok(resolve(Some(id), generations, |pid| {
          let raw = stmt
            .query_row(rusqlite::params![pid.0], RawChartPerson::from_row)
            .optional()
            .map_err(|e| Error::Database(e.into()))?;
          decode_node(id, pid, raw, RawChartPerson::into_chart_person)
        }))
      })
      .await?
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run a statement directly, bypassing the encoders.
  pub(crate) async fn execute_raw(&self, sql: &'static str, args: Vec<Value>) -> Result<usize> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(args))?))
        .await?,
    )
  }
}

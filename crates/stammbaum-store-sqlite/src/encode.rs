//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`, so lexical order matches chronological order. Person ids are
//! plain integers.

use chrono::{DateTime, NaiveDate, Utc};
use stammbaum_core::person::{
  ChartPerson, ParentSummaries, Person, PersonId, PersonProfile, PersonSummary,
  RelativeSummary, Sex,
};

use crate::{Error, Result};

// ─── Column lists ────────────────────────────────────────────────────────────

/// Columns read by [`RawPerson::from_row`], in order.
pub const PERSON_COLUMNS: &str =
  "id, given_name, family_name, birth_date, sex, father_id, mother_id, created_at";

/// Columns read by [`RawChartPerson::from_row`], in order.
pub const CHART_COLUMNS: &str =
  "id, given_name, family_name, birth_date, father_id, mother_id";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
  s.map(decode_date).transpose()
}

// ─── Sex ─────────────────────────────────────────────────────────────────────

pub fn encode_sex(s: Sex) -> i64 { s.code() }

pub fn decode_sex(code: i64) -> Result<Sex> { Ok(Sex::from_code(code)?) }

// ─── Search patterns ─────────────────────────────────────────────────────────

/// Build a `LIKE ... ESCAPE '\'` pattern matching `text` anywhere.
pub fn like_pattern(text: &str) -> String {
  let escaped = text
    .replace('\\', "\\\\")
    .replace('%', "\\%")
    .replace('_', "\\_");
  format!("%{escaped}%")
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `persons` row.
#[derive(Debug)]
pub struct RawPerson {
  pub id:          i64,
  pub given_name:  String,
  pub family_name: String,
  pub birth_date:  Option<String>,
  pub sex:         Option<i64>,
  pub father_id:   Option<i64>,
  pub mother_id:   Option<i64>,
  pub created_at:  String,
}

impl RawPerson {
  /// Row mapper for queries selecting [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPerson {
      id:          row.get(0)?,
      given_name:  row.get(1)?,
      family_name: row.get(2)?,
      birth_date:  row.get(3)?,
      sex:         row.get(4)?,
      father_id:   row.get(5)?,
      mother_id:   row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:          PersonId(self.id),
      given_name:  self.given_name,
      family_name: self.family_name,
      birth_date:  decode_opt_date(self.birth_date.as_deref())?,
      sex:         self.sex.map(decode_sex).transpose()?,
      father_id:   self.father_id.map(PersonId),
      mother_id:   self.mother_id.map(PersonId),
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values of the chart projection of a `persons` row.
#[derive(Debug)]
pub struct RawChartPerson {
  pub id:          i64,
  pub given_name:  String,
  pub family_name: String,
  pub birth_date:  Option<String>,
  pub father_id:   Option<i64>,
  pub mother_id:   Option<i64>,
}

impl RawChartPerson {
  /// Row mapper for queries selecting [`CHART_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawChartPerson {
      id:          row.get(0)?,
      given_name:  row.get(1)?,
      family_name: row.get(2)?,
      birth_date:  row.get(3)?,
      father_id:   row.get(4)?,
      mother_id:   row.get(5)?,
    })
  }

  pub fn into_chart_person(self) -> Result<ChartPerson> {
    Ok(ChartPerson {
      id:          PersonId(self.id),
      given_name:  self.given_name,
      family_name: self.family_name,
      birth_date:  decode_opt_date(self.birth_date.as_deref())?,
      father_id:   self.father_id.map(PersonId),
      mother_id:   self.mother_id.map(PersonId),
    })
  }
}

/// `id, given_name, family_name` of a parent.
pub struct RawSummary {
  pub id:          i64,
  pub given_name:  String,
  pub family_name: String,
}

impl RawSummary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawSummary {
      id:          row.get(0)?,
      given_name:  row.get(1)?,
      family_name: row.get(2)?,
    })
  }

  fn into_summary(self) -> PersonSummary {
    PersonSummary {
      id:          PersonId(self.id),
      given_name:  self.given_name,
      family_name: self.family_name,
    }
  }
}

/// `id, given_name, family_name, birth_date` of a sibling or child.
pub struct RawRelative {
  pub id:          i64,
  pub given_name:  String,
  pub family_name: String,
  pub birth_date:  Option<String>,
}

impl RawRelative {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawRelative {
      id:          row.get(0)?,
      given_name:  row.get(1)?,
      family_name: row.get(2)?,
      birth_date:  row.get(3)?,
    })
  }

  fn into_relative(self) -> Result<RelativeSummary> {
    Ok(RelativeSummary {
      id:          PersonId(self.id),
      given_name:  self.given_name,
      family_name: self.family_name,
      birth_date:  decode_opt_date(self.birth_date.as_deref())?,
    })
  }
}

/// Everything read for a profile, before decoding.
pub struct RawProfile {
  pub person:   RawPerson,
  pub father:   Option<RawSummary>,
  pub mother:   Option<RawSummary>,
  pub siblings: Vec<RawRelative>,
  pub children: Vec<RawRelative>,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<PersonProfile> {
    Ok(PersonProfile {
      person:   self.person.into_person()?,
      parents:  ParentSummaries {
        father: self.father.map(RawSummary::into_summary),
        mother: self.mother.map(RawSummary::into_summary),
      },
      siblings: self
        .siblings
        .into_iter()
        .map(RawRelative::into_relative)
        .collect::<Result<_>>()?,
      children: self
        .children
        .into_iter()
        .map(RawRelative::into_relative)
        .collect::<Result<_>>()?,
    })
  }
}

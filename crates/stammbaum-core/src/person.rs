//! Person records and their projections.
//!
//! A person is a single row in the store with optional links to a father and
//! a mother. The links form a forest that the store does not guarantee to be
//! acyclic.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, tree::Lineage};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned integer identifier of a person. Immutable after creation.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<i64> for PersonId {
  fn from(id: i64) -> Self { Self(id) }
}

// ─── Sex ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
  Male,
  Female,
}

impl Sex {
  /// Integer code stored in the `sex` column.
  pub fn code(self) -> i64 {
    match self {
      Self::Male => 1,
      Self::Female => 0,
    }
  }

  pub fn from_code(code: i64) -> Result<Self> {
    match code {
      1 => Ok(Self::Male),
      0 => Ok(Self::Female),
      other => Err(Error::UnknownSex(other)),
    }
  }
}

// ─── Full record ─────────────────────────────────────────────────────────────

/// A person with every stored attribute. Used for CRUD responses and the
/// JSON ancestor tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub id:          PersonId,
  pub given_name:  String,
  pub family_name: String,
  pub birth_date:  Option<NaiveDate>,
  pub sex:         Option<Sex>,
  pub father_id:   Option<PersonId>,
  pub mother_id:   Option<PersonId>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:  DateTime<Utc>,
}

impl Person {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.given_name, self.family_name)
  }
}

impl Lineage for Person {
  fn father_id(&self) -> Option<PersonId> { self.father_id }

  fn mother_id(&self) -> Option<PersonId> { self.mother_id }
}

// ─── Chart projection ────────────────────────────────────────────────────────

/// The subset of a person that the ancestor chart needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPerson {
  pub id:          PersonId,
  pub given_name:  String,
  pub family_name: String,
  pub birth_date:  Option<NaiveDate>,
  pub father_id:   Option<PersonId>,
  pub mother_id:   Option<PersonId>,
}

impl ChartPerson {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.given_name, self.family_name)
  }
}

impl Lineage for ChartPerson {
  fn father_id(&self) -> Option<PersonId> { self.father_id }

  fn mother_id(&self) -> Option<PersonId> { self.mother_id }
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::PersonStore::create_person`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Default)]
pub struct NewPerson {
  pub given_name:  String,
  pub family_name: String,
  pub birth_date:  Option<NaiveDate>,
  pub sex:         Option<Sex>,
  pub father_id:   Option<PersonId>,
  pub mother_id:   Option<PersonId>,
}

impl NewPerson {
  /// Convenience constructor with all optional fields unset.
  pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
    Self {
      given_name: given_name.into(),
      family_name: family_name.into(),
      ..Self::default()
    }
  }
}

/// A partial update. `None` leaves a column untouched; `Some(None)` clears a
/// nullable column.
#[derive(Debug, Clone, Default)]
pub struct PersonPatch {
  pub given_name:  Option<String>,
  pub family_name: Option<String>,
  pub birth_date:  Option<Option<NaiveDate>>,
  pub sex:         Option<Option<Sex>>,
  pub father_id:   Option<Option<PersonId>>,
  pub mother_id:   Option<Option<PersonId>>,
}

impl PersonPatch {
  pub fn is_empty(&self) -> bool {
    self.given_name.is_none()
      && self.family_name.is_none()
      && self.birth_date.is_none()
      && self.sex.is_none()
      && self.father_id.is_none()
      && self.mother_id.is_none()
  }

  /// Parent ids this patch would point at; used to check references before
  /// writing.
  pub fn parent_ids(&self) -> impl Iterator<Item = PersonId> + '_ {
    [self.father_id, self.mother_id].into_iter().flatten().flatten()
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// Name-only reference to another person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSummary {
  pub id:          PersonId,
  pub given_name:  String,
  pub family_name: String,
}

/// A sibling or child, with the birth date used for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeSummary {
  pub id:          PersonId,
  pub given_name:  String,
  pub family_name: String,
  pub birth_date:  Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentSummaries {
  pub father: Option<PersonSummary>,
  pub mother: Option<PersonSummary>,
}

/// The read model behind a person's profile page ("Steckbrief").
///
/// Siblings share the father or the mother; children name the person as
/// either parent. Both lists are ordered by birth date, unknown dates last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonProfile {
  pub person:   Person,
  pub parents:  ParentSummaries,
  pub siblings: Vec<RelativeSummary>,
  pub children: Vec<RelativeSummary>,
}

//! The `PersonStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `stammbaum-store-sqlite`). Higher layers (`stammbaum-api`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  person::{ChartPerson, NewPerson, Person, PersonId, PersonPatch, PersonProfile},
  tree::AncestorNode,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Default number of results returned by [`PersonStore::search_persons`].
pub const DEFAULT_SEARCH_LIMIT: usize = 15;

/// Parameters for [`PersonStore::search_persons`].
#[derive(Debug, Clone)]
pub struct PersonQuery {
  /// Case-insensitive substring matched against given and family name.
  pub text:  String,
  pub limit: usize,
}

impl PersonQuery {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into(), limit: DEFAULT_SEARCH_LIMIT }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a person store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Create and persist a new person. `id` and `created_at` are assigned by
  /// the store. A parent id without a record fails with
  /// [`crate::Error::UnknownParent`] and writes nothing.
  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `None` if the person does not exist.
  /// Parent ids are checked like in [`PersonStore::create_person`].
  fn update_person(
    &self,
    id: PersonId,
    patch: PersonPatch,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Delete a person. Returns `false` if nothing was deleted. References to
  /// the person from children are cleared, not cascaded.
  fn delete_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// List all persons ordered by family name, then given name.
  fn list_persons(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Search persons by name, ordered like [`PersonStore::list_persons`].
  fn search_persons<'a>(
    &'a self,
    query: &'a PersonQuery,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// Materialise a [`PersonProfile`]. Returns `None` if the person does not
  /// exist.
  fn profile(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<PersonProfile>, Self::Error>> + Send + '_;

  // ── Ancestor trees ────────────────────────────────────────────────────

  /// Resolve the full-record ancestor tree of `id`, `max_depth` generations
  /// deep. Returns `None` if the root does not exist. An ancestor whose row
  /// cannot be decoded ends its branch; only a malformed root is an error.
  fn ancestor_tree(
    &self,
    id: PersonId,
    max_depth: u32,
  ) -> impl Future<Output = Result<Option<AncestorNode<Person>>, Self::Error>>
  + Send
  + '_;

  /// Resolve the chart-record ancestor tree of `id` for rendering. Returns
  /// `None` if the root does not exist.
  fn ancestor_chart(
    &self,
    id: PersonId,
    generations: u32,
  ) -> impl Future<Output = Result<Option<AncestorNode<ChartPerson>>, Self::Error>>
  + Send
  + '_;
}

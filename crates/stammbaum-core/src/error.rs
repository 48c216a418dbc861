//! Error types for `stammbaum-core`.

use thiserror::Error;

use crate::person::PersonId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("update for person {0} sets no fields")]
  EmptyPatch(PersonId),

  #[error("parent {0} does not exist")]
  UnknownParent(PersonId),

  #[error("unknown sex code: {0}")]
  UnknownSex(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

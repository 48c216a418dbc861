//! Handlers for the ancestor tree endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/persons/:id/tree` | `?depth=` (default 3); nested JSON |
//! | `GET`  | `/persons/:id/chart` | `?generations=` (default 3); PDF attachment |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::header,
  response::IntoResponse,
};
use serde::Deserialize;
use stammbaum_chart::PageSize;
use stammbaum_core::{AncestorNode, person::{Person, PersonId}, store::PersonStore};

use crate::{ApiState, error::ApiError};

/// Generations resolved when the request does not say.
pub const DEFAULT_DEPTH: u32 = 3;

fn bounded(value: Option<u32>, max: u32, name: &str) -> Result<u32, ApiError> {
  let value = value.unwrap_or(DEFAULT_DEPTH);
  if value > max {
    return Err(ApiError::BadRequest(format!("{name} must be at most {max}")));
  }
  Ok(value)
}

// ─── JSON tree ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TreeParams {
  pub depth: Option<u32>,
}

/// `GET /persons/:id/tree[?depth=N]`
pub async fn ancestor_tree<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<PersonId>,
  Query(params): Query<TreeParams>,
) -> Result<Json<AncestorNode<Person>>, ApiError>
where
  S: PersonStore,
{
  let depth = bounded(params.depth, state.config.max_depth, "depth")?;
  let tree = state
    .store
    .ancestor_tree(id, depth)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  tracing::debug!(person = %id, depth, nodes = tree.len(), "resolved ancestor tree");
  Ok(Json(tree))
}

// ─── PDF chart ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChartParams {
  pub generations: Option<u32>,
}

/// `GET /persons/:id/chart[?generations=N]`: landscape A4 PDF named
/// `stammbaum_{id}.pdf`.
pub async fn ancestor_chart<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<PersonId>,
  Query(params): Query<ChartParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore,
{
  let generations = bounded(params.generations, state.config.max_depth, "generations")?;
  let tree = state
    .store
    .ancestor_chart(id, generations)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;

  let pdf = stammbaum_chart::render_pdf(&tree, PageSize::A4_LANDSCAPE)?;
  tracing::info!(person = %id, generations, bytes = pdf.len(), "rendered ancestor chart");

  Ok((
    [
      (header::CONTENT_TYPE, "application/pdf".to_owned()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=stammbaum_{id}.pdf"),
      ),
    ],
    pdf,
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn depth_defaults_and_is_capped() {
    assert_eq!(bounded(None, 10, "depth").unwrap(), DEFAULT_DEPTH);
    assert_eq!(bounded(Some(0), 10, "depth").unwrap(), 0);
    assert_eq!(bounded(Some(10), 10, "depth").unwrap(), 10);
    assert!(matches!(bounded(Some(11), 10, "depth"), Err(ApiError::BadRequest(_))));
  }
}

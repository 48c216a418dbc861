//! Ancestor chart renderer for Stammbaum.
//!
//! Lays out an [`AncestorNode`] tree on a single fixed-size page and encodes
//! it as PDF. Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use stammbaum_chart::{PageSize, render_pdf};
//! # fn tree() -> stammbaum_core::AncestorNode<stammbaum_core::person::ChartPerson> { unimplemented!() }
//!
//! let bytes = render_pdf(&tree(), PageSize::A4_LANDSCAPE).unwrap();
//! assert!(bytes.starts_with(b"%PDF"));
//! ```

pub mod error;
pub mod layout;
pub mod metrics;
pub mod pdf;

pub use error::{Error, Result};
pub use layout::{Chart, ChartStyle, PageSize, layout};

use stammbaum_core::{AncestorNode, person::ChartPerson};

/// Lay out `tree` with the default style and encode the page as PDF bytes.
pub fn render_pdf(tree: &AncestorNode<ChartPerson>, page: PageSize) -> Result<Vec<u8>> {
  let chart = layout(tree, page, &ChartStyle::default());
  pdf::encode(&chart)
}

//! PDF encoding of a laid-out [`Chart`].

use std::io::BufWriter;

use printpdf::{
  BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point as PdfPoint,
  Rgb,
};

use crate::{
  Error, Result,
  layout::{Chart, Font, Label, Point, Shape},
};

const LAYER: &str = "Stammbaum";
const STROKE_WIDTH: f64 = 0.75;

fn pdf_err(e: impl std::fmt::Debug) -> Error { Error::Pdf(format!("{e:?}")) }

/// Encode `chart` as a single-page PDF document.
pub fn encode(chart: &Chart) -> Result<Vec<u8>> {
  let (doc, page, layer) = PdfDocument::new(
    chart.title.as_str(),
    Mm(chart.page.width),
    Mm(chart.page.height),
    LAYER,
  );
  let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
  let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;

  let canvas = doc.get_page(page).get_layer(layer);
  canvas.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
  canvas.set_outline_thickness(STROKE_WIDTH);

  for shape in &chart.shapes {
    match shape {
      Shape::Rect { x, y, width, height } => {
        let corners = [
          Point { x: *x, y: *y },
          Point { x: x + width, y: *y },
          Point { x: x + width, y: y + height },
          Point { x: *x, y: y + height },
        ];
        canvas.add_shape(stroke(&corners, true));
      }
      Shape::Line { from, to } => canvas.add_shape(stroke(&[*from, *to], false)),
      Shape::Text(label) => {
        let font = match label.font {
          Font::Regular => &regular,
          Font::Bold => &bold,
        };
        write_label(&canvas, label, font);
      }
    }
  }

  let mut writer = BufWriter::new(Vec::new());
  doc.save(&mut writer).map_err(pdf_err)?;
  writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

fn stroke(points: &[Point], is_closed: bool) -> Line {
  Line {
    points: points
      .iter()
      .map(|p| (PdfPoint::new(Mm(p.x), Mm(p.y)), false))
      .collect(),
    is_closed,
    has_fill: false,
    has_stroke: true,
    is_clipping_path: false,
  }
}

fn write_label(canvas: &PdfLayerReference, label: &Label, font: &IndirectFontRef) {
  canvas.use_text(label.text.as_str(), label.size, Mm(label.x), Mm(label.y), font);
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use stammbaum_core::{AncestorNode, person::{ChartPerson, PersonId}};

  use super::*;
  use crate::layout::{ChartStyle, PageSize, layout};

  fn person(id: i64, given: &str, family: &str) -> ChartPerson {
    ChartPerson {
      id:          PersonId(id),
      given_name:  given.into(),
      family_name: family.into(),
      birth_date:  NaiveDate::from_ymd_opt(1950, 1, 1),
      father_id:   None,
      mother_id:   None,
    }
  }

  #[test]
  fn encodes_a_pdf_document() {
    let tree = AncestorNode::with_parents(
      person(1, "Eva", "Berger"),
      Some(AncestorNode::leaf(person(2, "Karl", "Berger"))),
      Some(AncestorNode::leaf(person(3, "Maria", "Müller"))),
    );
    let chart = layout(&tree, PageSize::A4_LANDSCAPE, &ChartStyle::default());

    let bytes = encode(&chart).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 500);
  }

  #[test]
  fn encodes_a_lone_root() {
    let tree = AncestorNode::leaf(person(1, "Solo", "Person"));
    let bytes = crate::render_pdf(&tree, PageSize::A4_LANDSCAPE).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
  }
}

//! Binary-subdivision layout of an ancestor tree on one page.
//!
//! All coordinates are millimetres with the origin at the bottom-left corner
//! of the page, so generations grow upwards. The root sits centred near the
//! bottom edge; every generation above it is a constant step higher and gets
//! half the horizontal spread of the one below. The page never grows, so deep
//! trees overlap.

use stammbaum_core::{AncestorNode, PersonId, person::ChartPerson};

use crate::metrics::text_width;

// ─── Page and style ──────────────────────────────────────────────────────────

/// Page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
  pub width:  f64,
  pub height: f64,
}

impl PageSize {
  pub const A4_LANDSCAPE: Self = Self { width: 297.0, height: 210.0 };
}

/// Geometry and typography of a chart. Lengths in millimetres, font sizes in
/// points.
#[derive(Debug, Clone)]
pub struct ChartStyle {
  pub title_prefix:    String,
  pub title_size:      f64,
  /// Distance of the title baseline below the top edge.
  pub title_offset:    f64,
  /// Height of the root box centre above the bottom edge.
  pub root_offset:     f64,
  /// Horizontal spread of the root as a fraction of the page width.
  pub root_spread:     f64,
  pub box_width:       f64,
  pub box_height:      f64,
  /// Vertical distance between the centres of two generations.
  pub generation_gap:  f64,
  /// Height of the horizontal bridge above a box centre.
  pub bridge_rise:     f64,
  pub name_size:       f64,
  pub date_size:       f64,
  /// Baseline offsets relative to the box centre.
  pub name_baseline:   f64,
  pub date_baseline:   f64,
  /// Names longer than this many characters are cut.
  pub name_limit:      usize,
  /// `chrono` format string for the birth date line.
  pub date_format:     String,
}

impl Default for ChartStyle {
  fn default() -> Self {
    Self {
      title_prefix:   "Stammbaum: ".into(),
      title_size:     16.0,
      title_offset:   20.0,
      root_offset:    40.0,
      root_spread:    1.0 / 3.0,
      box_width:      45.0,
      box_height:     12.0,
      generation_gap: 35.0,
      bridge_rise:    15.0,
      name_size:      9.0,
      date_size:      8.0,
      name_baseline:  1.0,
      date_baseline:  -3.0,
      name_limit:     25,
      date_format:    "* %d.%m.%Y".into(),
    }
  }
}

// ─── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
  Regular,
  Bold,
}

/// A run of text positioned by its left edge and baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
  pub text: String,
  pub font: Font,
  pub size: f64,
  pub x:    f64,
  pub y:    f64,
}

/// One vector drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
  /// Stroked rectangle; `x`/`y` is the bottom-left corner.
  Rect {
    x:      f64,
    y:      f64,
    width:  f64,
    height: f64,
  },
  Line {
    from: Point,
    to:   Point,
  },
  Text(Label),
}

/// Where a person ended up on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
  pub person:     PersonId,
  /// 0 for the root, 1 for parents, and so on.
  pub generation: u32,
  pub center:     Point,
}

/// A fully laid-out page, ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
  pub page:       PageSize,
  pub title:      String,
  pub shapes:     Vec<Shape>,
  pub placements: Vec<Placement>,
}

impl Chart {
  pub fn lines(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
    self.shapes.iter().filter_map(|s| match s {
      Shape::Line { from, to } => Some((*from, *to)),
      _ => None,
    })
  }

  pub fn labels(&self) -> impl Iterator<Item = &Label> + '_ {
    self.shapes.iter().filter_map(|s| match s {
      Shape::Text(label) => Some(label),
      _ => None,
    })
  }

  pub fn placement(&self, person: PersonId) -> Option<&Placement> {
    self.placements.iter().find(|p| p.person == person)
  }
}

// ─── Layout ──────────────────────────────────────────────────────────────────

/// Lay out `tree` on a page of size `page`.
pub fn layout(tree: &AncestorNode<ChartPerson>, page: PageSize, style: &ChartStyle) -> Chart {
  let title = format!("{}{}", style.title_prefix, tree.person.full_name());
  let mut chart = Chart {
    page,
    title: title.clone(),
    shapes: Vec::new(),
    placements: Vec::new(),
  };

  chart.shapes.push(Shape::Text(centered(
    title,
    Font::Bold,
    style.title_size,
    page.width / 2.0,
    page.height - style.title_offset,
  )));

  let root = Point { x: page.width / 2.0, y: style.root_offset };
  place(tree, root, page.width * style.root_spread, 0, style, &mut chart);
  chart
}

fn place(
  node: &AncestorNode<ChartPerson>,
  at: Point,
  spread: f64,
  generation: u32,
  style: &ChartStyle,
  chart: &mut Chart,
) {
  let (w, h) = (style.box_width, style.box_height);

  chart.shapes.push(Shape::Rect {
    x:      at.x - w / 2.0,
    y:      at.y - h / 2.0,
    width:  w,
    height: h,
  });
  chart.shapes.push(Shape::Text(centered(
    name_line(&node.person, style.name_limit),
    Font::Bold,
    style.name_size,
    at.x,
    at.y + style.name_baseline,
  )));
  if let Some(date) = node.person.birth_date {
    chart.shapes.push(Shape::Text(centered(
      date.format(&style.date_format).to_string(),
      Font::Regular,
      style.date_size,
      at.x,
      at.y + style.date_baseline,
    )));
  }
  chart.placements.push(Placement { person: node.person.id, generation, center: at });

  let Some(parents) = node.parents.as_deref() else { return };

  let half = spread / 2.0;
  let parent_y = at.y + style.generation_gap;

  // Once either parent is known the whole skeleton is drawn, so a missing
  // parent leaves a riser that ends in empty space.
  if parents.father.is_some() || parents.mother.is_some() {
    let bridge = at.y + style.bridge_rise;
    let riser_top = parent_y - h / 2.0;
    let (left, right) = (at.x - half, at.x + half);

    for (from, to) in [
      ((at.x, at.y + h / 2.0), (at.x, bridge)),
      ((left, bridge), (right, bridge)),
      ((left, bridge), (left, riser_top)),
      ((right, bridge), (right, riser_top)),
    ] {
      chart.shapes.push(Shape::Line {
        from: Point { x: from.0, y: from.1 },
        to:   Point { x: to.0, y: to.1 },
      });
    }
  }

  if let Some(father) = &parents.father {
    let at = Point { x: at.x - half, y: parent_y };
    place(father, at, half, generation + 1, style, chart);
  }
  if let Some(mother) = &parents.mother {
    let at = Point { x: at.x + half, y: parent_y };
    place(mother, at, half, generation + 1, style, chart);
  }
}

/// Full name, cut to `limit` characters.
fn name_line(person: &ChartPerson, limit: usize) -> String {
  person.full_name().chars().take(limit).collect()
}

fn centered(text: String, font: Font, size: f64, center_x: f64, baseline: f64) -> Label {
  let width = text_width(&text, font, size);
  Label { text, font, size, x: center_x - width / 2.0, y: baseline }
}

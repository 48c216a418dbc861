//! Ancestor trees and the depth-bounded resolver that builds them.
//!
//! The parent-of relation in the store is not guaranteed to be acyclic, so
//! the remaining-depth counter is the only thing that ends a traversal. No
//! visited set is kept.

use serde::Serialize;

use crate::person::PersonId;

// ─── Lineage ─────────────────────────────────────────────────────────────────

/// A record that knows the ids of its parents.
///
/// Implemented by every projection the resolver can walk over.
pub trait Lineage {
  fn father_id(&self) -> Option<PersonId>;
  fn mother_id(&self) -> Option<PersonId>;
}

// ─── Tree ────────────────────────────────────────────────────────────────────

/// One person in an ancestor tree, with their resolved parents.
///
/// `parents` is `None` when the depth budget ran out at this node. Such a
/// horizon node serialises without `father`/`mother` keys at all, while a
/// node that still had budget always serialises both keys, `null` for a
/// missing branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AncestorNode<R> {
  #[serde(flatten)]
  pub person:  R,
  #[serde(flatten)]
  pub parents: Option<Box<Parents<R>>>,
}

/// The father and mother branches of a node that was resolved below the
/// depth horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parents<R> {
  pub father: Option<AncestorNode<R>>,
  pub mother: Option<AncestorNode<R>>,
}

impl<R> AncestorNode<R> {
  /// A node whose parents were not explored.
  pub fn leaf(person: R) -> Self { Self { person, parents: None } }

  /// A node whose parents were explored; either branch may be absent.
  pub fn with_parents(
    person: R,
    father: Option<AncestorNode<R>>,
    mother: Option<AncestorNode<R>>,
  ) -> Self {
    Self {
      person,
      parents: Some(Box::new(Parents { father, mother })),
    }
  }

  /// `true` if no ancestor hangs below this node, whether the person has no
  /// recorded parents or the depth horizon was reached.
  pub fn is_leaf(&self) -> bool { self.father().is_none() && self.mother().is_none() }

  /// `true` if the depth horizon was reached here, so the parents were never
  /// looked up.
  pub fn is_on_horizon(&self) -> bool { self.parents.is_none() }

  pub fn father(&self) -> Option<&AncestorNode<R>> {
    self.parents.as_ref().and_then(|p| p.father.as_ref())
  }

  pub fn mother(&self) -> Option<&AncestorNode<R>> {
    self.parents.as_ref().and_then(|p| p.mother.as_ref())
  }

  /// Number of generations of known ancestors above this node.
  pub fn height(&self) -> usize {
    let father = self.father().map_or(0, |n| n.height() + 1);
    let mother = self.mother().map_or(0, |n| n.height() + 1);
    father.max(mother)
  }

  /// Number of persons in the tree, this node included.
  pub fn len(&self) -> usize {
    1 + self.father().map_or(0, AncestorNode::len)
      + self.mother().map_or(0, AncestorNode::len)
  }

  /// Convert every record in the tree, keeping its shape. Stops at the first
  /// error.
  pub fn try_map<T, E, F>(self, mut f: F) -> Result<AncestorNode<T>, E>
  where
    F: FnMut(R) -> Result<T, E>,
  {
    self.try_map_with(&mut f)
  }

  fn try_map_with<T, E, F>(self, f: &mut F) -> Result<AncestorNode<T>, E>
  where
    F: FnMut(R) -> Result<T, E>,
  {
    let person = f(self.person)?;
    let parents = match self.parents {
      None => None,
      Some(p) => {
        let Parents { father, mother } = *p;
        Some(Box::new(Parents {
          father: father.map(|n| n.try_map_with(f)).transpose()?,
          mother: mother.map(|n| n.try_map_with(f)).transpose()?,
        }))
      }
    };
    Ok(AncestorNode { person, parents })
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Resolve the ancestor tree of `root`, at most `max_depth` generations deep.
///
/// `fetch` is the projection: it loads one record by id and decides which
/// attributes the tree carries. It is called once per visited node, father
/// branch before mother branch. A missing row or an absent parent id ends
/// that branch without error; an error from `fetch` aborts the whole
/// traversal.
///
/// Returns `Ok(None)` if `root` is absent or has no record.
pub fn resolve<R, E, F>(
  root: Option<PersonId>,
  max_depth: u32,
  mut fetch: F,
) -> Result<Option<AncestorNode<R>>, E>
where
  R: Lineage,
  F: FnMut(PersonId) -> Result<Option<R>, E>,
{
  resolve_branch(root, max_depth, &mut fetch)
}

fn resolve_branch<R, E, F>(
  id: Option<PersonId>,
  remaining: u32,
  fetch: &mut F,
) -> Result<Option<AncestorNode<R>>, E>
where
  R: Lineage,
  F: FnMut(PersonId) -> Result<Option<R>, E>,
{
  let Some(id) = id else { return Ok(None) };
  let Some(person) = fetch(id)? else { return Ok(None) };

  if remaining == 0 {
    return Ok(Some(AncestorNode::leaf(person)));
  }

  let father = resolve_branch(person.father_id(), remaining - 1, fetch)?;
  let mother = resolve_branch(person.mother_id(), remaining - 1, fetch)?;
  Ok(Some(AncestorNode::with_parents(person, father, mother)))
}

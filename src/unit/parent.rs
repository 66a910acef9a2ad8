use std::fmt;

use super::{Serializable, UnitHandle};

/// Address identity of a unit, the reference-equality test backing the
/// self-parent rule. Only ever compared, never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitAddr(*const ());

impl UnitAddr {
    pub fn of(unit: &dyn Serializable) -> UnitAddr {
        UnitAddr(unit as *const dyn Serializable as *const ())
    }
}

/// The optional parent slot a concrete unit stores.
///
/// A unit's parent is never absent to observers: resolving an empty link
/// substitutes the owning unit itself. Assigning the owner as its own parent
/// collapses back to the empty state, so the slot never stores a literal
/// self-cycle (which would also leak the owning handle).
#[derive(Default)]
pub struct ParentLink {
    parent: Option<UnitHandle>,
}

impl ParentLink {
    pub const fn empty() -> ParentLink {
        ParentLink { parent: None }
    }

    /// The stored parent, or `owner` when none is stored.
    pub fn resolve<'a>(&'a self, owner: &'a dyn Serializable) -> &'a dyn Serializable {
        match &self.parent {
            Some(parent) => parent.as_ref(),
            None => owner,
        }
    }

    /// Stores `parent`. A handle addressing `owner` itself is normalized to
    /// the empty state rather than stored.
    pub fn assign(&mut self, owner: UnitAddr, parent: Option<UnitHandle>) {
        self.parent = parent.filter(|handle| UnitAddr::of(handle.as_ref()) != owner);
    }

    pub fn clear(&mut self) {
        self.parent = None;
    }

    /// Whether a parent distinct from the owner is stored.
    pub fn is_explicit(&self) -> bool {
        self.parent.is_some()
    }

    /// The stored handle, when one is.
    pub fn handle(&self) -> Option<&UnitHandle> {
        self.parent.as_ref()
    }
}

impl fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "ParentLink({})", parent.type_label()),
            None => f.write_str("ParentLink(self)"),
        }
    }
}

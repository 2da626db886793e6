use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::symbols::QualifiedName;

/// Merge requests finalized in the current compilation session.
///
/// Clones share one set. The set lives exactly as long as the session's
/// [`Context`](crate::context::Context); a new session starts empty.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet(Rc<RefCell<BTreeSet<QualifiedName>>>);

impl ProcessedSet {
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.0.borrow().contains(name)
    }

    /// Marks `name` processed; false if it already was.
    pub fn insert(&self, name: QualifiedName) -> bool {
        self.0.borrow_mut().insert(name)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

//! Per-call mapping state
//!
//! One [`MappingContext`] lives for exactly one top-level mapping call. It tracks the
//! (source node, source scope, target type) triples currently being mapped so that a
//! re-entry short-circuits instead of recursing forever, and it bounds the nesting
//! depth.

use std::collections::HashSet;

use error_stack::Report;

use crate::bean::Bean;
use crate::bean::TypeKey;
use crate::constants::RecursionDepth;
use crate::error::Error;
use crate::error::Result;

/// Identity of one bean mapping step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisitKey {
    source: usize,
    scope:  u64,
    target: TypeKey,
}

impl VisitKey {
    /// Key for mapping `source` (viewed through scope `scope`) into `target`
    pub fn new(source: &dyn Bean, scope: u64, target: TypeKey) -> Self {
        Self {
            source: source.address(),
            scope,
            target,
        }
    }
}

/// Scratch state of one mapping call
#[derive(Debug)]
pub struct MappingContext {
    in_progress: HashSet<VisitKey>,
    depth:       RecursionDepth,
    max_depth:   usize,
}

impl MappingContext {
    /// Create a context bounded by `max_depth`
    pub fn new(max_depth: usize) -> Self {
        Self {
            in_progress: HashSet::new(),
            depth: RecursionDepth::ZERO,
            max_depth,
        }
    }

    /// Whether `key` is being mapped by an enclosing step
    pub fn is_in_progress(&self, key: &VisitKey) -> bool {
        self.in_progress.contains(key)
    }

    /// Enter a mapping step
    ///
    /// Returns `Ok(false)` when the step is already in progress further up, and fails
    /// with [`Error::RecursionLimit`] when entering would exceed the depth limit.
    pub fn enter(&mut self, key: VisitKey, type_name: &str) -> Result<bool> {
        if self.is_in_progress(&key) {
            return Ok(false);
        }
        let depth = self.depth.increment();
        if depth.exceeds_limit(self.max_depth) {
            return Err(Report::new(Error::recursion_limit(self.max_depth, type_name)));
        }

        self.depth = depth;
        self.in_progress.insert(key);
        Ok(true)
    }

    /// Leave a step entered with [`enter`](Self::enter)
    pub fn leave(&mut self, key: &VisitKey) {
        if self.in_progress.remove(key) {
            self.depth = self.depth.decrement();
        }
    }

    /// Current nesting depth
    pub const fn depth(&self) -> RecursionDepth {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn key(source: usize, target: TypeKey) -> VisitKey {
        VisitKey {
            source,
            scope: 1,
            target,
        }
    }

    #[test]
    fn reentry_is_reported_until_left() {
        let mut context = MappingContext::new(8);
        let person = key(0x10, TypeKey::of::<String>());

        assert!(context.enter(person, "Person").expect("within limit"));
        assert!(!context.enter(person, "Person").expect("within limit"));
        assert_eq!(context.depth().get(), 1);

        context.leave(&person);
        assert!(!context.is_in_progress(&person));
        assert!(context.enter(person, "Person").expect("within limit"));
    }

    #[test]
    fn depth_is_bounded() {
        let mut context = MappingContext::new(2);
        let target = TypeKey::of::<i32>();

        assert!(context.enter(key(1, target), "Layer1").expect("depth 1"));
        assert!(context.enter(key(2, target), "Layer2").expect("depth 2"));

        let error = context
            .enter(key(3, target), "Layer3")
            .expect_err("depth 3 exceeds the limit");
        assert_eq!(
            error.current_context(),
            &Error::recursion_limit(2, "Layer3")
        );
    }
}

use indexmap::IndexMap;

use crate::term::{Term, Var};

/// The binding store: a map from variable handle to bound term, plus a
/// trail recording the insertion order of bindings.
///
/// The trail is what makes depth-first search cheap to undo: [`mark`]
/// captures the current trail length and [`rollback`] removes every
/// binding recorded since, restoring the store to exactly its state at
/// the mark. Rollback is O(k) in the number of bindings undone and the
/// discipline is strictly LIFO, matching the nesting of solution
/// streams.
///
/// A store is private to one query; concurrent queries need distinct
/// stores.
///
/// [`mark`]: Store::mark
/// [`rollback`]: Store::rollback
#[derive(Debug, Default)]
pub struct Store {
    bindings: IndexMap<u64, Term>,
    trail: Vec<u64>,
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow the binding chain from `term` to its most-bound form: an
    /// unbound variable or a non-variable term.
    ///
    /// Returns a reference into the store (or `term` itself), so the
    /// common already-walked case does not allocate. Only the outermost
    /// constructor is resolved; sub-terms of a sequence are left as-is.
    /// Use [`resolve`](Store::resolve) for a deep substitution.
    #[must_use]
    pub fn walk<'a>(&'a self, term: &'a Term) -> &'a Term {
        let mut current = term;
        while let Term::Var(var) = current {
            match self.bindings.get(&var.handle()) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Recursively substitute every bound variable in `term`, leaving
    /// unbound variables in place.
    #[must_use]
    pub fn resolve(&self, term: &Term) -> Term {
        match self.walk(term) {
            Term::Seq(items) => Term::Seq(items.iter().map(|t| self.resolve(t)).collect()),
            walked => walked.clone(),
        }
    }

    /// Whether `var` walks to a non-variable term.
    #[must_use]
    pub fn is_bound(&self, var: &Var) -> bool {
        !matches!(self.walk(&Term::Var(var.clone())), Term::Var(_))
    }

    /// Bind an unbound variable to a term, recording the binding on the
    /// trail.
    ///
    /// The caller must have walked `var` first: binding an already-bound
    /// variable would orphan the old binding and corrupt rollback.
    pub fn bind(&mut self, var: &Var, term: Term) {
        debug_assert!(
            !self.bindings.contains_key(&var.handle()),
            "bind on already-bound {var}"
        );
        self.bindings.insert(var.handle(), term);
        self.trail.push(var.handle());
    }

    /// The current trail length, for a later [`rollback`](Store::rollback).
    #[must_use]
    pub fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Remove every binding recorded at or after `mark`, restoring the
    /// store to its state when [`mark`](Store::mark) was called.
    pub fn rollback(&mut self, mark: usize) {
        debug_assert!(mark <= self.trail.len(), "rollback past the trail head");
        for handle in self.trail.drain(mark..) {
            self.bindings.swap_remove(&handle);
        }
    }

    /// Structurally unify two terms, appending any new bindings to the
    /// trail. Returns whether unification succeeded.
    ///
    /// On failure the store may hold bindings from partially unified
    /// sub-terms; the caller is responsible for rolling back to its own
    /// mark. Binding a variable to a sequence is subject to the occurs
    /// check; variable-to-variable aliasing is not, since it always links
    /// to an unbound representative.
    pub fn unify(&mut self, a: &Term, b: &Term) -> bool {
        let a = self.walk(a).clone();
        let b = self.walk(b).clone();
        match (a, b) {
            (Term::Var(x), Term::Var(y)) if x == y => true,
            (Term::Var(x), other) | (other, Term::Var(x)) => {
                if matches!(other, Term::Seq(_)) && self.occurs(&x, &other) {
                    return false;
                }
                self.bind(&x, other);
                true
            }
            (Term::Atom(u), Term::Atom(v)) => u == v,
            (Term::Seq(xs), Term::Seq(ys)) => {
                if xs.len() != ys.len() {
                    return false;
                }
                for (x, y) in xs.iter().zip(ys.iter()) {
                    if !self.unify(x, y) {
                        return false;
                    }
                }
                true
            }
            _ => false,
        }
    }

    /// Whether `var` appears anywhere inside `term` after walking.
    fn occurs(&self, var: &Var, term: &Term) -> bool {
        match self.walk(term) {
            Term::Var(v) => v == var,
            Term::Seq(items) => items.iter().any(|item| self.occurs(var, item)),
            Term::Atom(_) => false,
        }
    }
}

use indexmap::IndexMap;

use crate::solve::{Error, Goal, Step, Stream};
use crate::store::Store;
use crate::term::{Term, Var};

/// One solution: a snapshot of the query variables at the moment the
/// goal yielded.
///
/// Values are fully resolved terms; a variable that was still unbound
/// snapshots as the variable term itself. Iteration order follows the
/// order of the names given to [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Query name to resolved value.
    pub bindings: IndexMap<String, Term>,
}

impl Solution {
    /// The resolved value recorded under `name`, if the query declared
    /// it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings.get(name)
    }
}

/// The lazy solution iterator returned by [`run`].
///
/// Each `next` pulls the goal stream once against the query's private
/// store. Dropping the iterator early closes the stream, restoring the
/// store, so breaking out of a loop is always safe. A fatal [`Error`]
/// closes the stream before being yielded, and ends the iteration.
pub struct Solutions {
    store: Store,
    stream: Box<dyn Stream>,
    vars: IndexMap<String, Var>,
    done: bool,
}

impl Solutions {
    fn snapshot(&self) -> Solution {
        let bindings = self
            .vars
            .iter()
            .map(|(name, var)| (name.clone(), self.store.resolve(&Term::Var(var.clone()))))
            .collect();
        Solution { bindings }
    }

    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            self.stream.close(&mut self.store);
            debug_assert_eq!(
                self.store.mark(),
                0,
                "a closed query must leave the store empty"
            );
        }
    }
}

impl Iterator for Solutions {
    type Item = Result<Solution, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.stream.pull(&mut self.store) {
            Ok(Step::Yielded) => Some(Ok(self.snapshot())),
            Ok(Step::Done) => {
                self.finish();
                None
            }
            Err(error) => {
                self.finish();
                Some(Err(error))
            }
        }
    }
}

impl Drop for Solutions {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Execute a query, yielding one [`Solution`] per solution of `goal`.
///
/// `vars` names the variables to report; names are cosmetic and need not
/// match the variables' own display names. The query runs against a
/// fresh, private store, so the same goal and variables can be queried
/// again afterwards.
///
/// ```rust
/// use unilog::{member, run, Term, Var};
///
/// let x = Var::named("X");
/// let goal = member(x.clone(), Term::seq([1, 2, 3]));
/// for solution in run(goal, &[("x", x)]) {
///     println!("x = {}", solution.unwrap().get("x").unwrap());
/// }
/// ```
#[must_use]
pub fn run(goal: Goal, vars: &[(&str, Var)]) -> Solutions {
    Solutions {
        store: Store::new(),
        stream: goal.stream(),
        vars: vars
            .iter()
            .map(|(name, var)| ((*name).to_string(), var.clone()))
            .collect(),
        done: false,
    }
}

/// The first solution of `goal`, or `None` when it has none. The search
/// is abandoned (and the store restored) after the first yield.
pub fn run_one(goal: Goal, vars: &[(&str, Var)]) -> Result<Option<Solution>, Error> {
    match run(goal, vars).next() {
        Some(result) => result.map(Some),
        None => Ok(None),
    }
}

/// Every solution of `goal`, in order.
pub fn run_all(goal: Goal, vars: &[(&str, Var)]) -> Result<Vec<Solution>, Error> {
    run(goal, vars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::{between, lt, member};
    use crate::solve::{and, eq, or};

    fn values(solutions: &[Solution], name: &str) -> Vec<Term> {
        solutions
            .iter()
            .map(|s| s.get(name).expect("name declared").clone())
            .collect()
    }

    #[test]
    fn test_run_unify_single_solution() {
        let x = Var::named("X");
        let solutions = run_all(eq(x.clone(), 42), &[("X", x)]).unwrap();
        assert_eq!(values(&solutions, "X"), vec![Term::from(42)]);
    }

    #[test]
    fn test_run_member_three_solutions() {
        let x = Var::named("X");
        let goal = member(x.clone(), Term::seq([1, 2, 3]));
        let solutions = run_all(goal, &[("X", x)]).unwrap();
        assert_eq!(
            values(&solutions, "X"),
            vec![Term::from(1), Term::from(2), Term::from(3)]
        );
    }

    #[test]
    fn test_run_cartesian_product_order() {
        let x = Var::named("X");
        let y = Var::named("Y");
        let goal = and(vec![
            member(x.clone(), Term::seq([1, 2, 3])),
            member(y.clone(), Term::seq([1, 2, 3])),
        ]);
        let solutions = run_all(goal, &[("X", x), ("Y", y)]).unwrap();

        assert_eq!(solutions.len(), 9);
        assert_eq!(solutions[0].get("X"), Some(&Term::from(1)));
        assert_eq!(solutions[0].get("Y"), Some(&Term::from(1)));
        assert_eq!(solutions[8].get("X"), Some(&Term::from(3)));
        assert_eq!(solutions[8].get("Y"), Some(&Term::from(3)));

        // Lexicographic (X, Y) order throughout.
        let pairs: Vec<(Term, Term)> = solutions
            .iter()
            .map(|s| (s.get("X").unwrap().clone(), s.get("Y").unwrap().clone()))
            .collect();
        let mut sorted = pairs.clone();
        sorted.sort_by_key(|(x, y)| {
            let Term::Atom(crate::term::Value::Int(a)) = x else { panic!() };
            let Term::Atom(crate::term::Value::Int(b)) = y else { panic!() };
            (*a, *b)
        });
        assert_eq!(pairs, sorted);
    }

    #[test]
    fn test_snapshot_preserves_name_order_and_unbound_sentinel() {
        let x = Var::named("X");
        let y = Var::named("Y");
        // Y is never bound.
        let goal = eq(x.clone(), 1);
        let solutions = run_all(goal, &[("first", x), ("second", y.clone())]).unwrap();

        let names: Vec<&String> = solutions[0].bindings.keys().collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(
            solutions[0].get("second"),
            Some(&Term::Var(y)),
            "Unbound variables snapshot as themselves"
        );
    }

    #[test]
    fn test_snapshots_are_immutable_across_backtracking() {
        let x = Var::named("X");
        let goal = or(vec![eq(x.clone(), 1), eq(x.clone(), 2)]);
        let solutions = run_all(goal, &[("X", x)]).unwrap();
        // The first snapshot still holds 1 even though the binding was
        // undone to produce the second.
        assert_eq!(values(&solutions, "X"), vec![Term::from(1), Term::from(2)]);
    }

    #[test]
    fn test_run_one_is_lazy_over_large_ranges() {
        let x = Var::named("X");
        let goal = between(1, 1_000_000, x.clone());
        let first = run_one(goal, &[("X", x)]).unwrap();
        assert_eq!(first.unwrap().get("X"), Some(&Term::from(1)));
    }

    #[test]
    fn test_run_one_of_failing_goal_is_none() {
        let x = Var::named("X");
        let goal = and(vec![eq(x.clone(), 1), eq(x.clone(), 2)]);
        assert_eq!(run_one(goal, &[("X", x)]).unwrap(), None);
    }

    #[test]
    fn test_early_termination_closes_the_stream() {
        let x = Var::named("X");
        let goal = member(x.clone(), Term::seq([1, 2, 3]));
        let mut solutions = run(goal, &[("X", x)]);

        let first = solutions.next().unwrap().unwrap();
        assert_eq!(first.get("X"), Some(&Term::from(1)));
        // Dropping mid-enumeration must not panic the debug trail check.
        drop(solutions);
    }

    #[test]
    fn test_type_error_aborts_the_query() {
        let x = Var::named("X");
        let goal = and(vec![
            member(x.clone(), Term::seq(["a", "b"])),
            lt(x.clone(), 3),
        ]);
        let result = run_all(goal, &[("X", x)]);
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_iteration_ends_after_error() {
        let goal = lt("a", 1);
        let mut solutions = run(goal, &[]);
        assert!(solutions.next().unwrap().is_err());
        assert!(solutions.next().is_none(), "Errors fuse the iterator");
    }

    #[test]
    fn test_queries_do_not_share_bindings() {
        let x = Var::named("X");
        let first = run_all(eq(x.clone(), 1), &[("X", x.clone())]).unwrap();
        assert_eq!(values(&first, "X"), vec![Term::from(1)]);

        // X is free again in a second query over a fresh store.
        let second = run_all(eq(x.clone(), 2), &[("X", x)]).unwrap();
        assert_eq!(values(&second, "X"), vec![Term::from(2)]);
    }

    #[test]
    fn test_negative_unification_of_unequal_sequences() {
        let solutions = run_all(
            eq(Term::seq([1, 2]), Term::seq([1, 2, 3])),
            &[],
        )
        .unwrap();
        assert!(solutions.is_empty());
    }
}

//! Built-in predicates.
//!
//! Every predicate returns a [`Goal`] and picks its enumeration mode from
//! the boundness of its walked arguments on first pull. A mode the
//! predicate cannot decide (for example `plus` with all three arguments
//! free) is a logical failure, not an error, so a surrounding [`or`] can
//! still succeed through another branch. A bound argument of the wrong
//! shape where a number is required is a fatal [`Error`].
//!
//! [`or`]: crate::solve::or

use crate::solve::{and, eq, fail, or, succeed, Error, Goal, Step, Stream};
use crate::store::Store;
use crate::term::{Term, Value, Var};

/// Walk a term expected to be an integer: `Ok(Some(n))` when bound to an
/// integer, `Ok(None)` when unbound, `Err` when bound to anything else.
fn walk_int(
    store: &Store,
    predicate: &'static str,
    term: &Term,
) -> Result<Option<i64>, Error> {
    match store.walk(term) {
        Term::Atom(Value::Int(n)) => Ok(Some(*n)),
        Term::Var(_) => Ok(None),
        other => Err(Error::TypeMismatch {
            predicate,
            expected: "an integer",
            found: other.clone(),
        }),
    }
}

/// `item` is an element of `list`.
///
/// - `member(X, [1,2,3])` enumerates `X = 1; 2; 3` left to right.
/// - `member(2, [1,2,3])` succeeds once.
/// - Fails when `list` does not walk to a sequence.
pub fn member(item: impl Into<Term>, list: impl Into<Term>) -> Goal {
    let item = item.into();
    let list = list.into();
    Goal::suspend(move |store| {
        let Term::Seq(elems) = store.walk(&list).clone() else {
            return Ok(fail());
        };
        Ok(or(elems
            .into_iter()
            .map(|elem| eq(item.clone(), elem))
            .collect()))
    })
}

/// `zs` is the concatenation of `xs` and `ys`.
///
/// - With `zs` bound to a sequence, enumerates every split from the
///   empty prefix to the full sequence; bound `xs`/`ys` then act as
///   filters, so fully bound calls verify.
/// - With `xs` and `ys` bound and `zs` free, yields the concatenation.
/// - Any other mode fails: a flat sequence of unknown length cannot be
///   enumerated finitely.
pub fn append(xs: impl Into<Term>, ys: impl Into<Term>, zs: impl Into<Term>) -> Goal {
    let xs = xs.into();
    let ys = ys.into();
    let zs = zs.into();
    Goal::suspend(move |store| {
        if let Term::Seq(items) = store.walk(&zs).clone() {
            let splits = (0..=items.len())
                .map(|i| {
                    and(vec![
                        eq(xs.clone(), Term::Seq(items[..i].to_vec())),
                        eq(ys.clone(), Term::Seq(items[i..].to_vec())),
                    ])
                })
                .collect();
            return Ok(or(splits));
        }
        let xs_walked = store.walk(&xs).clone();
        let ys_walked = store.walk(&ys).clone();
        match (xs_walked, ys_walked) {
            (Term::Seq(mut front), Term::Seq(back)) => {
                front.extend(back);
                Ok(eq(zs.clone(), Term::Seq(front)))
            }
            _ => Ok(fail()),
        }
    })
}

/// `list` has length `n`.
///
/// - `length([1,2,3], N)` binds `N = 3`.
/// - `length(L, 3)` binds `L` to a sequence of three fresh variables.
/// - Both free, or a negative `n`, fails.
pub fn length(list: impl Into<Term>, n: impl Into<Term>) -> Goal {
    let list = list.into();
    let n = n.into();
    Goal::suspend(move |store| match store.walk(&list).clone() {
        Term::Seq(items) => Ok(eq(n.clone(), Term::from(items.len() as i64))),
        Term::Var(_) => match walk_int(store, "length", &n)? {
            Some(count) if count >= 0 => {
                let fresh = (0..count).map(|_| Term::Var(Var::fresh()));
                Ok(eq(list.clone(), Term::Seq(fresh.collect())))
            }
            _ => Ok(fail()),
        },
        Term::Atom(_) => Ok(fail()),
    })
}

/// `reversed` is `list` in reverse order. Decidable from either side.
pub fn reverse(list: impl Into<Term>, reversed: impl Into<Term>) -> Goal {
    let list = list.into();
    let reversed = reversed.into();
    Goal::suspend(move |store| {
        if let Term::Seq(items) = store.walk(&list).clone() {
            let flipped: Vec<Term> = items.into_iter().rev().collect();
            return Ok(eq(reversed.clone(), Term::Seq(flipped)));
        }
        if let Term::Seq(items) = store.walk(&reversed).clone() {
            let flipped: Vec<Term> = items.into_iter().rev().collect();
            return Ok(eq(list.clone(), Term::Seq(flipped)));
        }
        Ok(fail())
    })
}

/// `item` is the final element of `list`; fails on an empty or unbound
/// list.
pub fn last(list: impl Into<Term>, item: impl Into<Term>) -> Goal {
    let list = list.into();
    let item = item.into();
    Goal::suspend(move |store| match store.walk(&list).clone() {
        Term::Seq(items) => match items.last() {
            Some(end) => Ok(eq(item.clone(), end.clone())),
            None => Ok(fail()),
        },
        _ => Ok(fail()),
    })
}

/// `item` is the `n`th element of `list`, zero-indexed; out of range
/// fails.
pub fn nth(n: impl Into<Term>, list: impl Into<Term>, item: impl Into<Term>) -> Goal {
    let n = n.into();
    let list = list.into();
    let item = item.into();
    Goal::suspend(move |store| {
        let Some(index) = walk_int(store, "nth", &n)? else {
            return Ok(fail());
        };
        let Term::Seq(items) = store.walk(&list).clone() else {
            return Ok(fail());
        };
        let found = usize::try_from(index).ok().and_then(|i| items.get(i));
        match found {
            Some(elem) => Ok(eq(item.clone(), elem.clone())),
            None => Ok(fail()),
        }
    })
}

/// `z = x + y`, solvable whenever two of the three are bound integers.
/// Overflow fails.
pub fn plus(x: impl Into<Term>, y: impl Into<Term>, z: impl Into<Term>) -> Goal {
    let x = x.into();
    let y = y.into();
    let z = z.into();
    Goal::suspend(move |store| {
        let known = (
            walk_int(store, "plus", &x)?,
            walk_int(store, "plus", &y)?,
            walk_int(store, "plus", &z)?,
        );
        Ok(match known {
            (Some(a), Some(b), _) => checked(&z, a.checked_add(b)),
            (Some(a), None, Some(c)) => checked(&y, c.checked_sub(a)),
            (None, Some(b), Some(c)) => checked(&x, c.checked_sub(b)),
            _ => fail(),
        })
    })
}

/// `z = x - y`, solvable whenever two of the three are bound integers.
pub fn minus(x: impl Into<Term>, y: impl Into<Term>, z: impl Into<Term>) -> Goal {
    let x = x.into();
    let y = y.into();
    let z = z.into();
    Goal::suspend(move |store| {
        let known = (
            walk_int(store, "minus", &x)?,
            walk_int(store, "minus", &y)?,
            walk_int(store, "minus", &z)?,
        );
        Ok(match known {
            (Some(a), Some(b), _) => checked(&z, a.checked_sub(b)),
            (Some(a), None, Some(c)) => checked(&y, a.checked_sub(c)),
            (None, Some(b), Some(c)) => checked(&x, c.checked_add(b)),
            _ => fail(),
        })
    })
}

/// `z = x * y`. Reverse modes succeed only on exact division; a zero
/// divisor leaves the remaining factor undecidable and fails.
pub fn times(x: impl Into<Term>, y: impl Into<Term>, z: impl Into<Term>) -> Goal {
    let x = x.into();
    let y = y.into();
    let z = z.into();
    Goal::suspend(move |store| {
        let known = (
            walk_int(store, "times", &x)?,
            walk_int(store, "times", &y)?,
            walk_int(store, "times", &z)?,
        );
        Ok(match known {
            (Some(a), Some(b), _) => checked(&z, a.checked_mul(b)),
            (Some(a), None, Some(c)) => divide(&y, c, a),
            (None, Some(b), Some(c)) => divide(&x, c, b),
            _ => fail(),
        })
    })
}

/// `y = x + 1`, both directions.
pub fn succ(x: impl Into<Term>, y: impl Into<Term>) -> Goal {
    let x = x.into();
    let y = y.into();
    Goal::suspend(move |store| {
        let known = (walk_int(store, "succ", &x)?, walk_int(store, "succ", &y)?);
        Ok(match known {
            (Some(a), _) => checked(&y, a.checked_add(1)),
            (None, Some(b)) => checked(&x, b.checked_sub(1)),
            _ => fail(),
        })
    })
}

/// Unify `target` with a computed value, or fail on arithmetic overflow.
fn checked(target: &Term, result: Option<i64>) -> Goal {
    match result {
        Some(value) => eq(target.clone(), value),
        None => fail(),
    }
}

/// Unify `target` with `numerator / denominator` when the division is
/// exact.
fn divide(target: &Term, numerator: i64, denominator: i64) -> Goal {
    if denominator != 0 && numerator % denominator == 0 {
        eq(target.clone(), numerator / denominator)
    } else {
        fail()
    }
}

/// `lo <= x <= hi` over integers.
///
/// - `between(1, 5, X)` enumerates `X = 1, 2, 3, 4, 5` in order, lazily.
/// - A bound `x` is verified; `lo > hi` is empty.
pub fn between(lo: impl Into<Term>, hi: impl Into<Term>, x: impl Into<Term>) -> Goal {
    let lo = lo.into();
    let hi = hi.into();
    let x = x.into();
    Goal::suspend(move |store| {
        let Some(lo) = walk_int(store, "between", &lo)? else {
            return Ok(fail());
        };
        let Some(hi) = walk_int(store, "between", &hi)? else {
            return Ok(fail());
        };
        match store.walk(&x).clone() {
            Term::Atom(Value::Int(value)) => Ok(if lo <= value && value <= hi {
                succeed()
            } else {
                fail()
            }),
            Term::Var(_) => {
                let x = x.clone();
                Ok(Goal::from_fn(move || {
                    Box::new(RangeStream {
                        x: x.clone(),
                        next: i128::from(lo),
                        hi: i128::from(hi),
                        mark: None,
                    })
                }))
            }
            _ => Ok(fail()),
        }
    })
}

/// Enumerates successive integers against `x`, binding one candidate per
/// pull.
struct RangeStream {
    x: Term,
    // Widened so the cursor can step past i64::MAX.
    next: i128,
    hi: i128,
    mark: Option<usize>,
}

impl Stream for RangeStream {
    fn pull(&mut self, store: &mut Store) -> Result<Step, Error> {
        if let Some(mark) = self.mark.take() {
            store.rollback(mark);
        }
        while self.next <= self.hi {
            let candidate = self.next as i64;
            self.next += 1;
            let mark = store.mark();
            if store.unify(&self.x, &Term::from(candidate)) {
                self.mark = Some(mark);
                return Ok(Step::Yielded);
            }
            store.rollback(mark);
        }
        Ok(Step::Done)
    }

    fn close(&mut self, store: &mut Store) {
        if let Some(mark) = self.mark.take() {
            store.rollback(mark);
        }
        self.next = self.hi + 1;
    }
}

/// `x > y`. Both sides must be bound; non-integers are type errors.
pub fn gt(x: impl Into<Term>, y: impl Into<Term>) -> Goal {
    compare("gt", x.into(), y.into(), |a, b| a > b)
}

/// `x < y`.
pub fn lt(x: impl Into<Term>, y: impl Into<Term>) -> Goal {
    compare("lt", x.into(), y.into(), |a, b| a < b)
}

/// `x >= y`.
pub fn gte(x: impl Into<Term>, y: impl Into<Term>) -> Goal {
    compare("gte", x.into(), y.into(), |a, b| a >= b)
}

/// `x <= y`.
pub fn lte(x: impl Into<Term>, y: impl Into<Term>) -> Goal {
    compare("lte", x.into(), y.into(), |a, b| a <= b)
}

fn compare(name: &'static str, x: Term, y: Term, test: fn(i64, i64) -> bool) -> Goal {
    Goal::suspend(move |store| {
        let known = (walk_int(store, name, &x)?, walk_int(store, name, &y)?);
        Ok(match known {
            (Some(a), Some(b)) if test(a, b) => succeed(),
            _ => fail(),
        })
    })
}

/// Collect the resolved value of `template` for every solution of `goal`
/// into a sequence, then unify `result` with it.
///
/// The inner stream is driven to exhaustion (and therefore fully rolled
/// back) before `result` is bound; a goal with no solutions collects the
/// empty sequence.
pub fn findall(template: impl Into<Term>, goal: Goal, result: impl Into<Term>) -> Goal {
    let template = template.into();
    let result = result.into();
    Goal::suspend(move |store| {
        let mut stream = goal.stream();
        let mut collected = Vec::new();
        loop {
            match stream.pull(store) {
                Ok(Step::Yielded) => collected.push(store.resolve(&template)),
                Ok(Step::Done) => break,
                Err(error) => {
                    stream.close(store);
                    return Err(error);
                }
            }
        }
        Ok(eq(result.clone(), Term::Seq(collected)))
    })
}

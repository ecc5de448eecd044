use std::fmt;
use std::rc::Rc;

use crate::store::Store;
use crate::term::Term;

/// A fatal query error.
///
/// Logical failure (a goal with no solution) is not an error; it is
/// signaled by [`Step::Done`] and recovered by backtracking. An `Error`
/// aborts the enclosing query: the driver closes the goal stream,
/// restoring the store, before surfacing it.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A built-in predicate received a term of the wrong shape.
    TypeMismatch {
        /// The predicate that rejected the term.
        predicate: &'static str,
        /// What the predicate required.
        expected: &'static str,
        /// The walked term it found.
        found: Term,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TypeMismatch {
                predicate,
                expected,
                found,
            } => write!(f, "{predicate}: expected {expected}, found {found}"),
        }
    }
}

impl std::error::Error for Error {}

/// The result of pulling a solution stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One solution was found; the store currently reflects it.
    Yielded,
    /// The stream is exhausted and has restored the store to its
    /// creation-time state.
    Done,
}

/// A pull-based, resumable producer of solutions.
///
/// The contract every implementation must honor:
///
/// - Each `Yielded` from [`pull`] means the binding store currently
///   reflects one solution; the consumer may inspect it until the next
///   call.
/// - On the pull after a `Yielded`, the stream first undoes that
///   solution's bindings, then resumes its depth-first search.
/// - Returning `Done` implies the store has already been restored to its
///   state at stream creation.
/// - [`close`] declares that the consumer will not pull again; it must
///   restore the store to the creation-time state and is idempotent.
/// - Returning `Err` from `pull` means the stream has rolled back its own
///   bindings and behaves as exhausted; enclosing streams stay closeable
///   so the error can unwind through the normal close path.
///
/// Host-written predicates implement this trait directly; violating the
/// contract corrupts the surrounding search.
///
/// [`pull`]: Stream::pull
/// [`close`]: Stream::close
pub trait Stream {
    /// Search for the next solution.
    fn pull(&mut self, store: &mut Store) -> Result<Step, Error>;

    /// Abandon the search, restoring the store.
    fn close(&mut self, store: &mut Store);
}

/// A goal: a lazily-instantiated recipe for a solution stream.
///
/// Goals are cheap to clone and can be instantiated any number of times.
/// Laziness is what makes conjunction work: [`and`] re-instantiates each
/// later goal for every solution of the goals before it, so the new
/// stream observes the bindings established so far.
#[derive(Clone)]
pub struct Goal {
    make: Rc<dyn Fn() -> Box<dyn Stream>>,
}

impl Goal {
    /// Build a goal from a stream constructor.
    pub fn from_fn(make: impl Fn() -> Box<dyn Stream> + 'static) -> Self {
        Self {
            make: Rc::new(make),
        }
    }

    /// Build a goal whose shape depends on the bindings in effect when it
    /// is first pulled.
    ///
    /// `build` runs once per instantiated stream, on the first pull, with
    /// the live store; the goal it returns is then searched in its place.
    /// This is how the built-in predicates pick an enumeration mode from
    /// the boundness of their arguments. `build` must not bind anything
    /// it does not fully undo before returning.
    pub fn suspend(build: impl Fn(&mut Store) -> Result<Goal, Error> + 'static) -> Self {
        let build: Rc<dyn Fn(&mut Store) -> Result<Goal, Error>> = Rc::new(build);
        Goal::from_fn(move || {
            Box::new(SuspendStream {
                build: Rc::clone(&build),
                inner: None,
                done: false,
            })
        })
    }

    /// Instantiate a fresh stream for this goal.
    #[must_use]
    pub fn stream(&self) -> Box<dyn Stream> {
        (self.make)()
    }
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Goal")
    }
}

/// The goal that unifies two terms: it yields once if they unify under
/// the current bindings, and restores whatever it bound on backtracking.
pub fn eq(a: impl Into<Term>, b: impl Into<Term>) -> Goal {
    let a = a.into();
    let b = b.into();
    Goal::from_fn(move || {
        Box::new(EqStream {
            a: a.clone(),
            b: b.clone(),
            state: EqState::Start,
        })
    })
}

/// The goal that succeeds exactly once without binding anything.
#[must_use]
pub fn succeed() -> Goal {
    Goal::from_fn(|| Box::new(UnitStream { emitted: false }))
}

/// The goal with no solutions.
#[must_use]
pub fn fail() -> Goal {
    Goal::from_fn(|| Box::new(EmptyStream))
}

/// Logical conjunction: the Cartesian product of the goals' solutions in
/// left-to-right, depth-first order.
///
/// Each goal after the first is instantiated only once everything to its
/// left has yielded, so it observes the accumulated bindings. On
/// exhaustion of a later goal the search backtracks into its predecessor.
/// An empty conjunction succeeds once.
#[must_use]
pub fn and(goals: Vec<Goal>) -> Goal {
    Goal::from_fn(move || {
        Box::new(AndStream {
            goals: goals.clone(),
            stack: Vec::new(),
            state: AndState::Start,
        })
    })
}

/// Logical disjunction: every solution of each goal in order.
///
/// Each alternative is instantiated only when control reaches it, with
/// the store back at the disjunction's creation-time state. An empty
/// disjunction fails.
#[must_use]
pub fn or(goals: Vec<Goal>) -> Goal {
    Goal::from_fn(move || {
        Box::new(OrStream {
            goals: goals.clone(),
            index: 0,
            current: None,
        })
    })
}

enum EqState {
    Start,
    Suspended { mark: usize },
    Done,
}

struct EqStream {
    a: Term,
    b: Term,
    state: EqState,
}

impl Stream for EqStream {
    fn pull(&mut self, store: &mut Store) -> Result<Step, Error> {
        match self.state {
            EqState::Start => {
                let mark = store.mark();
                if store.unify(&self.a, &self.b) {
                    self.state = EqState::Suspended { mark };
                    Ok(Step::Yielded)
                } else {
                    store.rollback(mark);
                    self.state = EqState::Done;
                    Ok(Step::Done)
                }
            }
            EqState::Suspended { mark } => {
                store.rollback(mark);
                self.state = EqState::Done;
                Ok(Step::Done)
            }
            EqState::Done => Ok(Step::Done),
        }
    }

    fn close(&mut self, store: &mut Store) {
        if let EqState::Suspended { mark } = self.state {
            store.rollback(mark);
        }
        self.state = EqState::Done;
    }
}

struct UnitStream {
    emitted: bool,
}

impl Stream for UnitStream {
    fn pull(&mut self, _store: &mut Store) -> Result<Step, Error> {
        if self.emitted {
            Ok(Step::Done)
        } else {
            self.emitted = true;
            Ok(Step::Yielded)
        }
    }

    fn close(&mut self, _store: &mut Store) {
        self.emitted = true;
    }
}

struct EmptyStream;

impl Stream for EmptyStream {
    fn pull(&mut self, _store: &mut Store) -> Result<Step, Error> {
        Ok(Step::Done)
    }

    fn close(&mut self, _store: &mut Store) {}
}

enum AndState {
    Start,
    Running,
    /// An empty conjunction has yielded its single solution.
    Trivial,
    Done,
}

struct AndStream {
    goals: Vec<Goal>,
    /// Live sub-streams, outermost first. `stack[i]` runs `goals[i]`
    /// under the bindings of everything before it.
    stack: Vec<Box<dyn Stream>>,
    state: AndState,
}

impl Stream for AndStream {
    fn pull(&mut self, store: &mut Store) -> Result<Step, Error> {
        match self.state {
            AndState::Done => return Ok(Step::Done),
            AndState::Trivial => {
                self.state = AndState::Done;
                return Ok(Step::Done);
            }
            AndState::Start => {
                self.state = AndState::Running;
                if self.goals.is_empty() {
                    self.state = AndState::Trivial;
                    return Ok(Step::Yielded);
                }
                self.stack.push(self.goals[0].stream());
            }
            // Resuming after a yield: pulling the innermost stream first
            // undoes its solution bindings, then searches on.
            AndState::Running => {}
        }

        loop {
            let Some(top) = self.stack.last_mut() else {
                self.state = AndState::Done;
                return Ok(Step::Done);
            };
            match top.pull(store)? {
                Step::Yielded => {
                    if self.stack.len() == self.goals.len() {
                        return Ok(Step::Yielded);
                    }
                    // Instantiate the next goal now, so it sees the
                    // bindings just established.
                    let next = self.goals[self.stack.len()].stream();
                    self.stack.push(next);
                }
                // The sub-stream restored its own bindings; backtrack
                // into its predecessor.
                Step::Done => {
                    self.stack.pop();
                }
            }
        }
    }

    fn close(&mut self, store: &mut Store) {
        // Innermost first, so each rollback lands on the state its
        // predecessor expects.
        while let Some(mut stream) = self.stack.pop() {
            stream.close(store);
        }
        self.state = AndState::Done;
    }
}

struct OrStream {
    goals: Vec<Goal>,
    index: usize,
    current: Option<Box<dyn Stream>>,
}

impl Stream for OrStream {
    fn pull(&mut self, store: &mut Store) -> Result<Step, Error> {
        loop {
            if self.current.is_none() {
                if self.index >= self.goals.len() {
                    return Ok(Step::Done);
                }
                self.current = Some(self.goals[self.index].stream());
            }
            if let Some(stream) = self.current.as_mut() {
                match stream.pull(store)? {
                    Step::Yielded => return Ok(Step::Yielded),
                    Step::Done => {
                        self.current = None;
                        self.index += 1;
                    }
                }
            }
        }
    }

    fn close(&mut self, store: &mut Store) {
        if let Some(mut stream) = self.current.take() {
            stream.close(store);
        }
        self.index = self.goals.len();
    }
}

struct SuspendStream {
    build: Rc<dyn Fn(&mut Store) -> Result<Goal, Error>>,
    inner: Option<Box<dyn Stream>>,
    done: bool,
}

impl Stream for SuspendStream {
    fn pull(&mut self, store: &mut Store) -> Result<Step, Error> {
        if self.done {
            return Ok(Step::Done);
        }
        if self.inner.is_none() {
            match (self.build)(store) {
                Ok(goal) => self.inner = Some(goal.stream()),
                Err(error) => {
                    self.done = true;
                    return Err(error);
                }
            }
        }
        let mut step = Step::Done;
        if let Some(inner) = self.inner.as_mut() {
            step = inner.pull(store)?;
        }
        if step == Step::Done {
            self.done = true;
            self.inner = None;
        }
        Ok(step)
    }

    fn close(&mut self, store: &mut Store) {
        if let Some(mut stream) = self.inner.take() {
            stream.close(store);
        }
        self.done = true;
    }
}

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A host value carried by an atomic term.
///
/// Every variant supports structural equality, which is what unification
/// compares atoms by. Floats are deliberately absent; the numeric domain
/// of the arithmetic predicates is `i64`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A signed integer.
    Int(i64),
    /// A string.
    Str(String),
    /// A boolean.
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Process-wide source of fresh variable handles.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0);

/// A logic variable.
///
/// Identity is the numeric handle; two `Var`s with the same handle are the
/// same variable no matter how they were named. The optional name exists
/// only for query reporting and display.
///
/// A `Var` carries no binding of its own: bindings live in a [`Store`],
/// so the same variable can be bound in one query and free in another.
///
/// [`Store`]: crate::store::Store
#[derive(Debug, Clone)]
pub struct Var {
    handle: u64,
    name: Option<String>,
}

impl Var {
    /// Create a fresh unnamed variable.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            handle: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
            name: None,
        }
    }

    /// Create a fresh variable with a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            handle: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
            name: Some(name.into()),
        }
    }

    /// The unique handle identifying this variable.
    #[must_use]
    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// The display name, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Var {}

impl std::hash::Hash for Var {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "?{name}"),
            None => write!(f, "?_{}", self.handle),
        }
    }
}

/// A term: the data the engine unifies over.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// An opaque host value.
    Atom(Value),
    /// A logic variable.
    Var(Var),
    /// A finite ordered sequence of sub-terms; encodes lists and tuples.
    Seq(Vec<Term>),
}

impl Term {
    /// Build a sequence term from anything iterable over term-convertible
    /// items.
    ///
    /// ```rust
    /// use unilog::Term;
    ///
    /// let nested = Term::seq([Term::seq([1, 2]), Term::seq([3, 4])]);
    /// assert!(matches!(nested, Term::Seq(_)));
    /// ```
    #[must_use]
    pub fn seq<T: Into<Term>>(items: impl IntoIterator<Item = T>) -> Self {
        Term::Seq(items.into_iter().map(Into::into).collect())
    }

    /// The empty sequence.
    #[must_use]
    pub fn nil() -> Self {
        Term::Seq(Vec::new())
    }
}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        Term::Atom(value)
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Term::Atom(Value::Int(n))
    }
}

impl From<i32> for Term {
    fn from(n: i32) -> Self {
        Term::Atom(Value::Int(i64::from(n)))
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Atom(Value::Str(s.to_string()))
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Atom(Value::Str(s))
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Atom(Value::Bool(b))
    }
}

impl From<Var> for Term {
    fn from(var: Var) -> Self {
        Term::Var(var)
    }
}

impl From<&Var> for Term {
    fn from(var: &Var) -> Self {
        Term::Var(var.clone())
    }
}

impl From<Vec<Term>> for Term {
    fn from(items: Vec<Term>) -> Self {
        Term::Seq(items)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(value) => write!(f, "{value}"),
            Term::Var(var) => write!(f, "{var}"),
            Term::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

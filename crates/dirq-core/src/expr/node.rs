use crate::value::Value;

///
/// MemberPath
///
/// Ordered member access segments from the entity root
/// (`Name`, `Assignments.Kind`, ...).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MemberPath {
    segments: Vec<String>,
}

impl MemberPath {
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a dotted path string.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('.').filter(|s| !s.is_empty()))
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Single member access, no nesting.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }

    /// At most one level of nesting; the limit the order visitor accepts.
    #[must_use]
    pub fn is_at_most_single_nested(&self) -> bool {
        (1..=2).contains(&self.segments.len())
    }

    /// Path with the final segment removed.
    #[must_use]
    pub fn parent(&self) -> Self {
        Self {
            segments: self.segments[..self.segments.len().saturating_sub(1)].to_vec(),
        }
    }

    /// Dotted form without an alias prefix.
    #[must_use]
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Render the path below an iteration alias: `<alias>.<a>.<b>`.
    #[must_use]
    pub fn render(&self, alias: &str) -> String {
        if self.segments.is_empty() {
            alias.to_string()
        } else {
            format!("{alias}.{}", self.dotted())
        }
    }
}

impl From<&str> for MemberPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    #[must_use]
    pub const fn as_aql(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }

    /// Operator for the mirrored comparison, used when the literal sits
    /// structurally on the left of the tree.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Lt => Self::Gt,
            Self::Lte => Self::Gte,
            Self::Gt => Self::Lt,
            Self::Gte => Self::Lte,
        }
    }
}

///
/// Expr
///
/// The five built-in node kinds the visitors dispatch over. There is no
/// open extension point here: shapes outside this set (conditionals,
/// loops, object construction) are not representable, and shapes inside
/// it that a given visitor does not support fail fast with an
/// unsupported-node error.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// The lambda parameter / current entity.
    Root,
    Member(MemberPath),
    Literal(Value),
    Compare {
        lhs: Box<Expr>,
        op: CompareOp,
        rhs: Box<Expr>,
    },
    Call(CallExpr),
}

impl Expr {
    #[must_use]
    pub fn member(path: impl Into<MemberPath>) -> Self {
        Self::Member(path.into())
    }

    #[must_use]
    pub fn compare(lhs: Self, op: CompareOp, rhs: Self) -> Self {
        Self::Compare {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    #[must_use]
    pub fn eq(path: impl Into<MemberPath>, value: Value) -> Self {
        Self::compare(Self::member(path), CompareOp::Eq, Self::Literal(value))
    }

    #[must_use]
    pub fn ne(path: impl Into<MemberPath>, value: Value) -> Self {
        Self::compare(Self::member(path), CompareOp::Ne, Self::Literal(value))
    }

    #[must_use]
    pub fn gt(path: impl Into<MemberPath>, value: Value) -> Self {
        Self::compare(Self::member(path), CompareOp::Gt, Self::Literal(value))
    }

    #[must_use]
    pub fn gte(path: impl Into<MemberPath>, value: Value) -> Self {
        Self::compare(Self::member(path), CompareOp::Gte, Self::Literal(value))
    }

    #[must_use]
    pub fn lt(path: impl Into<MemberPath>, value: Value) -> Self {
        Self::compare(Self::member(path), CompareOp::Lt, Self::Literal(value))
    }

    #[must_use]
    pub fn lte(path: impl Into<MemberPath>, value: Value) -> Self {
        Self::compare(Self::member(path), CompareOp::Lte, Self::Literal(value))
    }

    #[must_use]
    pub fn starts_with(path: impl Into<MemberPath>, value: impl Into<String>) -> Self {
        Self::Call(CallExpr::StartsWith {
            path: path.into(),
            value: Value::Text(value.into()),
        })
    }

    #[must_use]
    pub fn ends_with(path: impl Into<MemberPath>, value: impl Into<String>) -> Self {
        Self::Call(CallExpr::EndsWith {
            path: path.into(),
            value: Value::Text(value.into()),
        })
    }

    #[must_use]
    pub fn contains(path: impl Into<MemberPath>, value: impl Into<String>) -> Self {
        Self::Call(CallExpr::Contains {
            path: path.into(),
            value: Value::Text(value.into()),
        })
    }

    #[must_use]
    pub fn any(path: impl Into<MemberPath>, inner: Self) -> Self {
        Self::Call(CallExpr::Any {
            path: path.into(),
            inner: Box::new(inner),
        })
    }

    #[must_use]
    pub fn count(path: impl Into<MemberPath>) -> Self {
        Self::Call(CallExpr::Count {
            path: path.into(),
            filter: None,
        })
    }

    #[must_use]
    pub fn count_where(path: impl Into<MemberPath>, filter: Self) -> Self {
        Self::Call(CallExpr::Count {
            path: path.into(),
            filter: Some(Box::new(filter)),
        })
    }

    #[must_use]
    pub fn sequence_equal(left: Self, right: Self) -> Self {
        Self::Call(CallExpr::SequenceEqual {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    #[must_use]
    pub fn contains_value_of(
        path: impl Into<MemberPath>,
        values: Vec<Value>,
        match_all: bool,
        substring: bool,
    ) -> Self {
        Self::Call(CallExpr::ContainsValueOf {
            path: path.into(),
            values,
            match_all,
            substring,
        })
    }
}

///
/// CallExpr
///
/// The method/function shapes the compiler knows how to lower. This set is
/// closed; the filter visitor additionally rejects structurally-invalid
/// instances (e.g. an `Any` whose body is not a simple comparison).
///

#[derive(Clone, Debug, PartialEq)]
pub enum CallExpr {
    StartsWith {
        path: MemberPath,
        value: Value,
    },
    EndsWith {
        path: MemberPath,
        value: Value,
    },
    Contains {
        path: MemberPath,
        value: Value,
    },
    /// `path[*].<inner member> ANY <op> <value>` when the body is a simple
    /// comparison; anything richer is unsupported.
    Any {
        path: MemberPath,
        inner: Box<Expr>,
    },
    Count {
        path: MemberPath,
        filter: Option<Box<Expr>>,
    },
    /// `<left> IN <right>`.
    SequenceEqual {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Set-membership over a candidate value list. `match_all` selects
    /// ALL over ANY; `substring` switches from scalar membership to the
    /// inline array-expansion with LIKE semantics.
    ContainsValueOf {
        path: MemberPath,
        values: Vec<Value>,
        match_all: bool,
        substring: bool,
    },
}

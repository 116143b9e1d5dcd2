use crate::expr::Expr;
use std::ops::{BitAnd, BitOr};

///
/// Combine
///
/// Binary relation of a condition to its preceding sibling.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Combine {
    And,
    Or,
}

impl Combine {
    #[must_use]
    pub const fn as_aql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

///
/// Condition
///
/// One entry in a descriptor's filter list:
///
/// - `Single`: one predicate sub-tree
/// - `Batch`: predicate sub-trees joined with OR, participating in the
///   parent list as one condition
/// - `Group`: child conditions joined by one explicit operator, wrapped in
///   parentheses, participating like a single condition
///
/// Each variant carries an optional explicit relation to the previous
/// condition. Resolution order: the explicit flag, else the descriptor's
/// registered default, else AND.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Single {
        expr: Expr,
        combine: Option<Combine>,
    },
    Batch {
        exprs: Vec<Expr>,
        combine: Option<Combine>,
    },
    Group {
        children: Vec<Condition>,
        op: Combine,
        combine: Option<Combine>,
    },
}

impl Condition {
    #[must_use]
    pub const fn single(expr: Expr) -> Self {
        Self::Single {
            expr,
            combine: None,
        }
    }

    #[must_use]
    pub const fn batch(exprs: Vec<Expr>) -> Self {
        Self::Batch {
            exprs,
            combine: None,
        }
    }

    #[must_use]
    pub const fn group(children: Vec<Self>, op: Combine) -> Self {
        Self::Group {
            children,
            op,
            combine: None,
        }
    }

    /// Attach an explicit relation to the previous sibling.
    #[must_use]
    pub fn combined(self, combine: Combine) -> Self {
        match self {
            Self::Single { expr, .. } => Self::Single {
                expr,
                combine: Some(combine),
            },
            Self::Batch { exprs, .. } => Self::Batch {
                exprs,
                combine: Some(combine),
            },
            Self::Group { children, op, .. } => Self::Group {
                children,
                op,
                combine: Some(combine),
            },
        }
    }

    #[must_use]
    pub const fn explicit_combine(&self) -> Option<Combine> {
        match self {
            Self::Single { combine, .. }
            | Self::Batch { combine, .. }
            | Self::Group { combine, .. } => *combine,
        }
    }

    /// Resolve the relation to the previous sibling: explicit flag first,
    /// then the descriptor-level default, then AND.
    #[must_use]
    pub fn resolve_combine(&self, registered: Option<Combine>) -> Combine {
        self.explicit_combine()
            .or(registered)
            .unwrap_or(Combine::And)
    }
}

impl From<Expr> for Condition {
    fn from(expr: Expr) -> Self {
        Self::single(expr)
    }
}

impl BitAnd for Condition {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::group(vec![self, rhs], Combine::And)
    }
}

impl BitOr for Condition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::group(vec![self, rhs], Combine::Or)
    }
}

//! Relationship selectors.
//!
//! A selector is the body of a one-parameter lambda over the base record,
//! kept as an expression tree so the compiler can see which member it reads.
//! Only `m => m.Member` is accepted for projection; anything computed or
//! nested is rejected at compile time.

use std::fmt;

use relshape_core::Value;
use relshape_ir::Direction;

/// Expression over the selector parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// The lambda parameter (the base record).
    Param,
    Member {
        target: Box<Expr>,
        name: String,
    },
    Call {
        function: String,
        args: Vec<Expr>,
    },
    Literal(Value),
}

impl Expr {
    pub fn param() -> Self {
        Expr::Param
    }

    /// Member access on this expression: `self.name`.
    pub fn member(self, name: impl Into<String>) -> Self {
        Expr::Member {
            target: Box::new(self),
            name: name.into(),
        }
    }

    pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            function: function.into(),
            args,
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Param => f.write_str("m"),
            Expr::Member { target, name } => write!(f, "{target}.{name}"),
            Expr::Call { function, args } => {
                write!(f, "{function}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Expr::Literal(value) => write!(f, "{value}"),
        }
    }
}

/// Per-selector control over sequence ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OrderingOverride {
    /// Use the element type's ordering capability, if any.
    #[default]
    Auto,
    /// Never sort this relationship.
    Unordered,
    /// Sort by the given element member.
    By { key: String, direction: Direction },
}

/// A relationship selector: `m => <body>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Selector {
    body: Expr,
    ordering: OrderingOverride,
}

impl Selector {
    pub fn new(body: Expr) -> Self {
        Self {
            body,
            ordering: OrderingOverride::Auto,
        }
    }

    /// `m => m.<name>`
    pub fn member(name: impl Into<String>) -> Self {
        Self::new(Expr::param().member(name))
    }

    /// Opt this relationship out of automatic ordering.
    pub fn unordered(mut self) -> Self {
        self.ordering = OrderingOverride::Unordered;
        self
    }

    /// Order this relationship by an explicit element member.
    pub fn ordered_by(mut self, key: impl Into<String>, direction: Direction) -> Self {
        self.ordering = OrderingOverride::By {
            key: key.into(),
            direction,
        };
        self
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn ordering(&self) -> &OrderingOverride {
        &self.ordering
    }

    /// Member name when the body is a direct member access on the parameter.
    pub fn resolve_member(&self) -> Option<&str> {
        match &self.body {
            Expr::Member { target, name } if matches!(**target, Expr::Param) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m => {}", self.body)
    }
}

//! Filter predicates over the members of a query's current element.

use std::fmt;

use relshape_core::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(String, Value),
    Ne(String, Value),
    Lt(String, Value),
    Gt(String, Value),
    IsNull(String),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn equals(member: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Eq(member.into(), value.into())
    }

    pub fn not_equals(member: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Ne(member.into(), value.into())
    }

    pub fn less_than(member: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Lt(member.into(), value.into())
    }

    pub fn greater_than(member: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Gt(member.into(), value.into())
    }

    pub fn is_null(member: impl Into<String>) -> Self {
        Predicate::IsNull(member.into())
    }

    pub fn and(self, rhs: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    /// Members referenced anywhere in the predicate, in visit order.
    pub fn members(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_members(&mut out);
        out
    }

    fn collect_members<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Eq(m, _)
            | Predicate::Ne(m, _)
            | Predicate::Lt(m, _)
            | Predicate::Gt(m, _)
            | Predicate::IsNull(m) => out.push(m),
            Predicate::And(l, r) | Predicate::Or(l, r) => {
                l.collect_members(out);
                r.collect_members(out);
            }
            Predicate::Not(inner) => inner.collect_members(out),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Eq(m, v) => write!(f, "{m} == {v}"),
            Predicate::Ne(m, v) => write!(f, "{m} != {v}"),
            Predicate::Lt(m, v) => write!(f, "{m} < {v}"),
            Predicate::Gt(m, v) => write!(f, "{m} > {v}"),
            Predicate::IsNull(m) => write!(f, "{m} is null"),
            Predicate::And(l, r) => write!(f, "({l} and {r})"),
            Predicate::Or(l, r) => write!(f, "({l} or {r})"),
            Predicate::Not(inner) => write!(f, "not {inner}"),
        }
    }
}

//! Predicate evaluation and key comparison.

use std::borrow::Cow;
use std::cmp::Ordering;

use relshape_core::Value;
use relshape_ir::{Direction, Predicate};

use super::error::RuntimeError;
use super::row::Row;

pub(crate) fn eval_predicate(predicate: &Predicate, row: &Row) -> Result<bool, RuntimeError> {
    let matched = match predicate {
        Predicate::Eq(member, value) => values_equal(&*member_of(row, member)?, value),
        Predicate::Ne(member, value) => !values_equal(&*member_of(row, member)?, value),
        Predicate::Lt(member, value) => {
            compare_non_null(&*member_of(row, member)?, value) == Some(Ordering::Less)
        }
        Predicate::Gt(member, value) => {
            compare_non_null(&*member_of(row, member)?, value) == Some(Ordering::Greater)
        }
        Predicate::IsNull(member) => member_of(row, member)?.is_null(),
        Predicate::And(l, r) => eval_predicate(l, row)? && eval_predicate(r, row)?,
        Predicate::Or(l, r) => eval_predicate(l, row)? || eval_predicate(r, row)?,
        Predicate::Not(inner) => !eval_predicate(inner, row)?,
    };
    Ok(matched)
}

pub(crate) fn member_of<'r>(row: &'r Row, member: &str) -> Result<Cow<'r, Value>, RuntimeError> {
    row.member(member)
        .ok_or_else(|| RuntimeError::MissingMember {
            member: member.to_owned(),
            element: row.type_name().to_owned(),
        })
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match a.compare(b) {
        Some(ord) => ord.is_eq(),
        None => a == b,
    }
}

/// Range comparisons never match `Null`.
fn compare_non_null(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }
    a.compare(b)
}

/// Sort comparison: nulls first when ascending, then [`Value::sort_cmp`].
pub(crate) fn compare_keys(a: &Value, b: &Value, direction: Direction) -> Ordering {
    let ord = a.sort_cmp(b);
    match direction {
        Direction::Asc => ord,
        Direction::Desc => ord.reverse(),
    }
}

static NULL: Value = Value::Null;

/// Stable sort of a related sequence by one member of its elements.
///
/// `Null` elements have a `Null` key.
pub(crate) fn order_sequence(
    items: &[Value],
    key: &str,
    direction: Direction,
) -> Result<Vec<Value>, RuntimeError> {
    let mut keyed = items
        .iter()
        .map(|item| {
            if item.is_null() {
                return Ok((&NULL, item));
            }
            let record = item.as_record().ok_or_else(|| RuntimeError::MissingMember {
                member: key.to_owned(),
                element: item.kind_name().to_owned(),
            })?;
            let value = record.get(key).ok_or_else(|| RuntimeError::MissingMember {
                member: key.to_owned(),
                element: record.type_name().to_owned(),
            })?;
            Ok((value, item))
        })
        .collect::<Result<Vec<_>, RuntimeError>>()?;

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, direction));
    Ok(keyed.into_iter().map(|(_, item)| item.clone()).collect())
}

//! Human-readable query dump for debugging and snapshot tests.
//!
//! Layout: a `[query]` section listing the source and numbered stages, then
//! one `[shape S#]` section per projected shape with its bindings.

use std::fmt::Write as _;

use crate::projection::{Binding, BindingSource, Projection};
use crate::query::{Query, SortKey, Stage};

/// Generate a human-readable dump of a query.
pub fn dump(query: &Query) -> String {
    let mut out = String::new();

    dump_stages(&mut out, query);
    for stage in query.stages() {
        if let Stage::Project(projection) = stage {
            out.push('\n');
            dump_projection(&mut out, projection);
        }
    }

    out
}

fn dump_stages(out: &mut String, query: &Query) {
    writeln!(out, "[query]").unwrap();
    writeln!(out, "source {}", query.source()).unwrap();

    for (i, stage) in query.stages().iter().enumerate() {
        match stage {
            Stage::Filter(predicate) => writeln!(out, "{i} filter {predicate}").unwrap(),
            Stage::Sort(keys) => writeln!(out, "{i} sort {}", format_sort_keys(keys)).unwrap(),
            Stage::Project(projection) => {
                writeln!(out, "{i} project S{}", projection.shape().id().0).unwrap()
            }
        }
    }
}

fn format_sort_keys(keys: &[SortKey]) -> String {
    keys.iter()
        .map(|k| format!("{} {}", k.member, k.direction))
        .collect::<Vec<_>>()
        .join(", ")
}

fn dump_projection(out: &mut String, projection: &Projection) {
    let shape = projection.shape();
    writeln!(out, "[shape S{}]", shape.id().0).unwrap();
    writeln!(out, "{}", shape.key()).unwrap();

    let rows: Vec<(&str, String)> = shape
        .field_names()
        .map(|name| {
            let ty = shape
                .field_type(name)
                .map(|t| t.to_string())
                .unwrap_or_default();
            (name, ty)
        })
        .collect();
    let name_width = rows.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    let type_width = rows.iter().map(|(_, t)| t.len()).max().unwrap_or(0);

    for (name, ty) in &rows {
        let source = projection
            .binding(name)
            .map_or_else(|| "unbound".to_owned(), format_binding);
        writeln!(out, "{name:<name_width$} {ty:<type_width$} <- {source}").unwrap();
    }
}

fn format_binding(binding: &Binding) -> String {
    let mut s = match &binding.source {
        BindingSource::Record => "record".to_owned(),
        BindingSource::Member(member) => member.clone(),
    };
    if let Some(order) = &binding.order {
        write!(
            s,
            " order by {} {} ({})",
            order.key,
            order.direction,
            order.origin.label()
        )
        .unwrap();
    }
    s
}

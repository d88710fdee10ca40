use std::sync::Arc;

use indoc::indoc;
use relshape_compiler::{ProjectionCompiler, Selector, ShapeCache};
use relshape_core::{Record, RecordType, Schema, SchemaError, ShapeError, TypeRef, Value};
use relshape_ir::{Direction, Predicate, Query};

use crate::{Engine, ExecLimits, Row, RuntimeError};

fn schema() -> Schema {
    let course = RecordType::builder("Course")
        .member("Id", TypeRef::int())
        .member("Title", TypeRef::text())
        .member("Published", TypeRef::bool())
        .member("Score", TypeRef::float())
        .member("Videos", TypeRef::list(TypeRef::record("Video")))
        .member("Tags", TypeRef::set(TypeRef::record("Tag")))
        .member("Notes", TypeRef::list(TypeRef::record("Note")))
        .build()
        .unwrap();
    let video = RecordType::builder("Video")
        .member("Id", TypeRef::int())
        .member("OrderIndex", TypeRef::int())
        .build()
        .unwrap();
    let tag = RecordType::builder("Tag")
        .member("Id", TypeRef::int())
        .build()
        .unwrap();
    let note = RecordType::builder("Note")
        .member("Text", TypeRef::text())
        .build()
        .unwrap();
    Schema::new()
        .with(course)
        .unwrap()
        .with(video)
        .unwrap()
        .with(tag)
        .unwrap()
        .with(note)
        .unwrap()
}

fn compiler(schema: &Schema) -> ProjectionCompiler {
    ProjectionCompiler::new(Arc::new(ShapeCache::new(Arc::new(schema.clone()))))
}

fn video(id: i64, order_index: impl Into<Value>) -> Value {
    Record::builder("Video")
        .set("Id", id)
        .set("OrderIndex", order_index)
        .build()
        .into()
}

fn tag(id: i64) -> Value {
    Record::builder("Tag").set("Id", id).build().into()
}

fn note(text: &str) -> Value {
    Record::builder("Note").set("Text", text).build().into()
}

fn course(id: i64, title: &str, published: bool, videos: Vec<Value>) -> Arc<Record> {
    Record::builder("Course")
        .set("Id", id)
        .set("Title", title)
        .set("Published", published)
        .set("Videos", videos)
        .set("Tags", vec![tag(30), tag(10), tag(20)])
        .set("Notes", vec![note("b"), note("a")])
        .build()
}

fn sample_course() -> Arc<Record> {
    course(
        1,
        "Rust",
        true,
        vec![video(10, 3), video(11, 1), video(12, 2)],
    )
}

/// Integer member of every record in a projected sequence field.
fn sequence_ints(row: &Row, field: &str, member: &str) -> Vec<i64> {
    let instance = row.as_shape().unwrap();
    instance
        .get(field)
        .unwrap()
        .as_collection()
        .unwrap()
        .iter()
        .map(|item| item.as_record().unwrap().get(member).unwrap().as_int().unwrap())
        .collect()
}

fn project(schema: &Schema, members: &[&str]) -> Query {
    compiler(schema)
        .build_projection_for_members(&Query::over("Course"), members)
        .unwrap()
}

#[test]
fn sequence_sorted_by_order_key() {
    let schema = schema();
    let query = project(&schema, &["Videos"]);

    let rows = Engine::new(&schema).run(&query, [sample_course()]).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(sequence_ints(&rows[0], "Videos", "OrderIndex"), [1, 2, 3]);
    assert_eq!(sequence_ints(&rows[0], "Videos", "Id"), [11, 12, 10]);
}

#[test]
fn sequence_sorted_by_identity_key() {
    let schema = schema();
    let query = project(&schema, &["Tags"]);

    let rows = Engine::new(&schema).run(&query, [sample_course()]).unwrap();

    assert_eq!(sequence_ints(&rows[0], "Tags", "Id"), [10, 20, 30]);
}

#[test]
fn sequence_without_capability_keeps_source_order() {
    let schema = schema();
    let query = project(&schema, &["Notes"]);

    let rows = Engine::new(&schema).run(&query, [sample_course()]).unwrap();

    let notes: Vec<&str> = rows[0]
        .as_shape()
        .unwrap()
        .get("Notes")
        .unwrap()
        .as_collection()
        .unwrap()
        .iter()
        .map(|n| n.as_record().unwrap().get("Text").unwrap().as_text().unwrap())
        .collect();
    assert_eq!(notes, ["b", "a"]);
}

#[test]
fn unordered_override_keeps_source_order() {
    let schema = schema();
    let query = compiler(&schema)
        .build_projection(
            &Query::over("Course"),
            &[Selector::member("Videos").unordered()],
        )
        .unwrap();

    let rows = Engine::new(&schema).run(&query, [sample_course()]).unwrap();

    assert_eq!(sequence_ints(&rows[0], "Videos", "Id"), [10, 11, 12]);
}

#[test]
fn explicit_descending_override() {
    let schema = schema();
    let query = compiler(&schema)
        .build_projection(
            &Query::over("Course"),
            &[Selector::member("Videos").ordered_by("Id", Direction::Desc)],
        )
        .unwrap();

    let rows = Engine::new(&schema).run(&query, [sample_course()]).unwrap();

    assert_eq!(sequence_ints(&rows[0], "Videos", "Id"), [12, 11, 10]);
}

#[test]
fn model_is_the_source_record() {
    let schema = schema();
    let source = sample_course();
    let query = project(&schema, &["Videos", "Title"]);

    let rows = Engine::new(&schema)
        .run(&query, [Arc::clone(&source)])
        .unwrap();

    let instance = rows[0].as_shape().unwrap();
    assert!(Arc::ptr_eq(instance.model(), &source));
    assert!(rows[0].member("Model").unwrap().same_record(&Value::Record(source)));
    assert_eq!(instance.get("Title"), Some(&Value::from("Rust")));
}

#[test]
fn null_keys_sort_first_and_ties_are_stable() {
    let schema = schema();
    let query = project(&schema, &["Videos"]);
    let source = course(
        1,
        "Rust",
        true,
        vec![video(1, 2), video(2, Value::Null), video(3, 1), video(4, 2)],
    );

    let rows = Engine::new(&schema).run(&query, [source]).unwrap();

    assert_eq!(sequence_ints(&rows[0], "Videos", "Id"), [2, 3, 1, 4]);
}

#[test]
fn nan_keys_sort_after_numbers() {
    let schema = schema();
    let query = Query::over("Course").order_by("Score", Direction::Asc);
    let courses = (0..200).map(|i: i64| {
        let score = if i % 3 == 0 { f64::NAN } else { ((i * 13) % 97) as f64 };
        Record::builder("Course").set("Id", i).set("Score", score).build()
    });

    let rows = Engine::new(&schema).run(&query, courses).unwrap();

    let scores: Vec<f64> = rows
        .iter()
        .map(|row| match row.member("Score").unwrap().as_ref() {
            Value::Float(f) => *f,
            other => panic!("unexpected score {other}"),
        })
        .collect();
    let (numbers, nans) = scores.split_at(133);
    assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
    assert!(nans.iter().all(|s| s.is_nan()));
}

#[test]
fn empty_and_null_sequences() {
    let schema = schema();
    let query = project(&schema, &["Videos"]);
    let empty = course(1, "Empty", true, Vec::new());
    let null = Record::builder("Course")
        .set("Id", 2)
        .set("Videos", Value::Null)
        .build();

    let rows = Engine::new(&schema).run(&query, [empty, null]).unwrap();

    assert_eq!(
        rows[0].as_shape().unwrap().get("Videos"),
        Some(&Value::Collection(Vec::new()))
    );
    assert_eq!(rows[1].as_shape().unwrap().get("Videos"), Some(&Value::Null));
}

#[test]
fn filter_and_sort_before_projection() {
    let schema = schema();
    let base = Query::over("Course")
        .filter(Predicate::equals("Published", true))
        .order_by("Title", Direction::Desc);
    let query = compiler(&schema)
        .build_projection_for_members(&base, &["Videos"])
        .unwrap();
    let courses = [
        course(1, "Alpha", true, Vec::new()),
        course(2, "Beta", false, Vec::new()),
        course(3, "Gamma", true, Vec::new()),
    ];

    let rows = Engine::new(&schema).run(&query, courses).unwrap();

    let ids: Vec<i64> = rows
        .iter()
        .map(|row| row.as_shape().unwrap().model().get("Id").unwrap().as_int().unwrap())
        .collect();
    assert_eq!(ids, [3, 1]);
}

#[test]
fn multi_key_sort() {
    let schema = schema();
    let query = Query::over("Course")
        .order_by("Published", Direction::Desc)
        .then_by("Id", Direction::Asc);
    let courses = [
        course(3, "A", false, Vec::new()),
        course(2, "B", true, Vec::new()),
        course(1, "C", false, Vec::new()),
        course(4, "D", true, Vec::new()),
    ];

    let rows = Engine::new(&schema).run(&query, courses).unwrap();

    let ids: Vec<i64> = rows
        .iter()
        .map(|row| row.member("Id").unwrap().as_int().unwrap())
        .collect();
    assert_eq!(ids, [2, 4, 1, 3]);
}

#[test]
fn filter_on_projected_fields() {
    let schema = schema();
    let query = project(&schema, &["Videos", "Title"]).filter(Predicate::equals("Title", "Go"));
    let courses = [
        course(1, "Rust", true, Vec::new()),
        course(2, "Go", true, Vec::new()),
    ];

    let rows = Engine::new(&schema).run(&query, courses).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].as_shape().unwrap().model().get("Id"), Some(&Value::Int(2)));
}

#[test]
fn plan_is_reusable() {
    let schema = schema();
    let plan = Engine::new(&schema)
        .translate(&project(&schema, &["Videos"]))
        .unwrap();

    let first = plan.execute([sample_course()]).unwrap();
    let second = plan.execute([sample_course(), sample_course()]).unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 2);
    assert!(Arc::ptr_eq(
        first[0].as_shape().unwrap().shape(),
        second[1].as_shape().unwrap().shape()
    ));
}

#[test]
fn plan_display() {
    let schema = schema();
    let base = Query::over("Course")
        .filter(Predicate::equals("Published", true).and(Predicate::greater_than("Id", 1)))
        .order_by("Title", Direction::Asc)
        .then_by("Id", Direction::Desc);
    let query = compiler(&schema)
        .build_projection_for_members(&base, &["Videos", "Notes", "Tags"])
        .unwrap();

    let plan = Engine::new(&schema).translate(&query).unwrap();

    insta::assert_snapshot!(plan.to_string(), @r"
    scan Course
    filter (Published == true and Id > 1)
    sort Title asc, Id desc
    project Model_Course_Notes:collNote_Tags:collTag_Videos:collVideo
      order Videos by OrderIndex asc
      order Tags by Id asc
    ");
}

#[test]
fn rows_serialize_with_model_first() {
    let schema = schema();
    let query = project(&schema, &["Notes"]);
    let source = Record::builder("Course")
        .set("Id", 1)
        .set("Notes", vec![note("a")])
        .build();

    let rows = Engine::new(&schema).run(&query, [source]).unwrap();

    let json = serde_json::to_string_pretty(&rows[0]).unwrap();
    assert_eq!(
        json,
        indoc! {r#"
            {
              "Model": {
                "Id": 1,
                "Notes": [
                  {
                    "Text": "a"
                  }
                ]
              },
              "Notes": [
                {
                  "Text": "a"
                }
              ]
            }"#}
    );
}

#[test]
fn row_limit() {
    let schema = schema();
    let query = Query::over("Course");
    let engine = Engine::new(&schema).with_limits(ExecLimits::new().row_limit(2));

    let within = engine.run(&query, [sample_course(), sample_course()]);
    let over = engine.run(&query, [sample_course(), sample_course(), sample_course()]);

    assert_eq!(within.unwrap().len(), 2);
    assert_eq!(over.unwrap_err(), RuntimeError::RowLimitExceeded { limit: 2 });
    assert_eq!(ExecLimits::default().get_row_limit(), 1_000_000);
}

#[test]
fn missing_member_at_runtime() {
    let schema = schema();
    let query = project(&schema, &["Videos"]);
    let bare = Record::builder("Course").set("Id", 1).build();

    let err = Engine::new(&schema).run(&query, [bare]).unwrap_err();

    assert_eq!(
        err,
        RuntimeError::MissingMember {
            member: "Videos".into(),
            element: "Course".into(),
        }
    );
}

#[test]
fn missing_order_key_on_element() {
    let schema = schema();
    let query = project(&schema, &["Videos"]);
    let keyless = Record::builder("Video").set("Id", 1).build();
    let source = course(1, "Rust", true, vec![video(2, 1), keyless.into()]);

    let err = Engine::new(&schema).run(&query, [source]).unwrap_err();

    assert_eq!(
        err,
        RuntimeError::MissingMember {
            member: "OrderIndex".into(),
            element: "Video".into(),
        }
    );
}

#[test]
fn wrong_element_type_is_a_shape_error() {
    let schema = schema();
    let query = compiler(&schema)
        .build_projection(
            &Query::over("Course"),
            &[Selector::member("Videos").unordered()],
        )
        .unwrap();
    let source = course(1, "Rust", true, vec![tag(1)]);

    let err = Engine::new(&schema).run(&query, [source]).unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Shape(ShapeError::TypeMismatch { ref field, .. }) if field == "Videos"
    ));
}

#[test]
fn rows_of_another_type_are_rejected() {
    let schema = schema();
    let query = Query::over("Course");
    let stray = Record::builder("Video").set("Id", 1).build();

    let err = Engine::new(&schema).run(&query, [stray]).unwrap_err();

    assert_eq!(
        err,
        RuntimeError::UnexpectedRecordType {
            expected: "Course".into(),
            found: "Video".into(),
        }
    );
}

#[test]
fn translate_rejects_unknown_source() {
    let schema = schema();

    let err = Engine::new(&schema)
        .translate(&Query::over("Lesson"))
        .unwrap_err();

    assert_eq!(
        err,
        RuntimeError::Schema(SchemaError::UnknownRecordType("Lesson".into()))
    );
}

#[test]
fn translate_rejects_unknown_filter_member() {
    let schema = schema();
    let query = Query::over("Course").filter(Predicate::is_null("Author"));

    let err = Engine::new(&schema).translate(&query).unwrap_err();

    assert_eq!(
        err,
        RuntimeError::MissingMember {
            member: "Author".into(),
            element: "Course".into(),
        }
    );
}

#[test]
fn translate_checks_members_against_projected_shape() {
    let schema = schema();
    let query = project(&schema, &["Videos"]).order_by("Published", Direction::Asc);

    let err = Engine::new(&schema).translate(&query).unwrap_err();

    assert_eq!(
        err,
        RuntimeError::MissingMember {
            member: "Published".into(),
            element: "Model_Course_Videos:collVideo".into(),
        }
    );
}

#[test]
fn translate_rejects_projection_of_another_base() {
    let schema = schema();
    let over_videos = compiler(&schema)
        .build_projection_for_members(&Query::over("Video"), &["OrderIndex"])
        .unwrap();
    let projection = over_videos.projection().unwrap().clone();

    let err = Engine::new(&schema)
        .translate(&Query::over("Course").project(projection))
        .unwrap_err();

    assert_eq!(
        err,
        RuntimeError::ProjectionMismatch {
            shape: "Model_Video_OrderIndex:Int".into(),
            element: "Course".into(),
        }
    );
}

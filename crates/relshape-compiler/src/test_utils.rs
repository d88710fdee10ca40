//! Test fixtures shared by the compiler tests.

use std::sync::Arc;

use relshape_core::{RecordType, Schema, TypeRef};

use crate::{ProjectionCompiler, ShapeCache};

/// `Course` with ordered (`Video`), identity-only (`Tag`) and unordered
/// (`Note`) relationships.
pub fn course_schema() -> Schema {
    let course = RecordType::builder("Course")
        .member("Id", TypeRef::int())
        .member("Title", TypeRef::text())
        .member("Published", TypeRef::bool())
        .member("Videos", TypeRef::list(TypeRef::record("Video")))
        .member("Tags", TypeRef::set(TypeRef::record("Tag")))
        .member("Notes", TypeRef::list(TypeRef::record("Note")))
        .member("Scores", TypeRef::list(TypeRef::int()))
        .build()
        .unwrap();
    let video = RecordType::builder("Video")
        .member("Id", TypeRef::int())
        .member("OrderIndex", TypeRef::int())
        .member("Title", TypeRef::text())
        .build()
        .unwrap();
    let tag = RecordType::builder("Tag")
        .member("Id", TypeRef::int())
        .member("Name", TypeRef::text())
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

pub fn course_cache() -> Arc<ShapeCache> {
    Arc::new(ShapeCache::new(Arc::new(course_schema())))
}

pub fn course_compiler() -> ProjectionCompiler {
    ProjectionCompiler::new(course_cache())
}

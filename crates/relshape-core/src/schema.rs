//! Record types and the schema that registers them.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::shape::FieldSpec;
use crate::types::TypeRef;

/// Errors raised while declaring or resolving record types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("record type `{record}` declares member `{member}` more than once")]
    DuplicateMember { record: String, member: String },

    #[error("record type `{0}` is already registered")]
    DuplicateRecordType(String),

    #[error("record type `{0}` is not registered")]
    UnknownRecordType(String),

    #[error("record type `{record}` has no member `{member}`")]
    UnknownMember { record: String, member: String },
}

/// Structure of a record type: its name and ordered members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordType {
    name: String,
    members: IndexMap<String, TypeRef>,
}

impl RecordType {
    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            members: IndexMap::new(),
            duplicate: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self, name: &str) -> Option<&TypeRef> {
        self.members.get(name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Members in declaration order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &TypeRef)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field specification made of the named members, with their declared types.
    pub fn member_spec(&self, names: &[&str]) -> Result<FieldSpec, SchemaError> {
        let mut spec = FieldSpec::new();
        for &name in names {
            let ty = self.member(name).ok_or_else(|| SchemaError::UnknownMember {
                record: self.name.clone(),
                member: name.to_owned(),
            })?;
            spec.insert(name, ty.clone());
        }
        Ok(spec)
    }
}

/// Builder for [`RecordType`].
#[derive(Debug)]
pub struct RecordTypeBuilder {
    name: String,
    members: IndexMap<String, TypeRef>,
    /// First member declared twice; reported by `build`.
    duplicate: Option<String>,
}

impl RecordTypeBuilder {
    pub fn member(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        let name = name.into();
        if self.members.contains_key(&name) {
            self.duplicate.get_or_insert(name);
            return self;
        }
        self.members.insert(name, ty);
        self
    }

    pub fn build(self) -> Result<RecordType, SchemaError> {
        if let Some(member) = self.duplicate {
            return Err(SchemaError::DuplicateMember {
                record: self.name,
                member,
            });
        }
        Ok(RecordType {
            name: self.name,
            members: self.members,
        })
    }
}

/// Registry of record types, keyed by name.
///
/// Member types reference other record types by name only; a referenced type
/// does not have to be registered before the type that mentions it.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    types: IndexMap<String, Arc<RecordType>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, record: RecordType) -> Result<Arc<RecordType>, SchemaError> {
        if self.types.contains_key(record.name()) {
            return Err(SchemaError::DuplicateRecordType(record.name().to_owned()));
        }
        let record = Arc::new(record);
        self.types
            .insert(record.name().to_owned(), Arc::clone(&record));
        Ok(record)
    }

    /// Builder-style registration for fixtures and tests.
    pub fn with(mut self, record: RecordType) -> Result<Self, SchemaError> {
        self.register(record)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RecordType>> {
        self.types.get(name)
    }

    pub fn resolve(&self, name: &str) -> Result<&Arc<RecordType>, SchemaError> {
        self.get(name)
            .ok_or_else(|| SchemaError::UnknownRecordType(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RecordType>> {
        self.types.values()
    }
}

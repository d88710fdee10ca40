use crate::{OrderingCapability, OrderingContract, RecordType, Schema, TypeRef};

fn record(members: &[(&str, TypeRef)]) -> RecordType {
    members
        .iter()
        .fold(RecordType::builder("Item"), |b, (name, ty)| b.member(*name, ty.clone()))
        .build()
        .unwrap()
}

#[test]
fn order_key_wins_over_identity() {
    let item = record(&[("Id", TypeRef::int()), ("OrderIndex", TypeRef::int())]);
    assert_eq!(
        OrderingContract::default().detect(&item),
        OrderingCapability::OrderKey("OrderIndex".into())
    );
}

#[test]
fn identity_is_the_fallback() {
    let item = record(&[("Id", TypeRef::int()), ("Name", TypeRef::text())]);
    assert_eq!(
        OrderingContract::default().detect(&item),
        OrderingCapability::IdentityKey("Id".into())
    );
}

#[test]
fn non_integer_keys_do_not_count() {
    let item = record(&[("Id", TypeRef::text()), ("OrderIndex", TypeRef::float())]);
    assert_eq!(
        OrderingContract::default().detect(&item),
        OrderingCapability::Unordered
    );
}

#[test]
fn contract_names_are_configurable() {
    let item = record(&[("Position", TypeRef::int()), ("Id", TypeRef::int())]);
    let contract = OrderingContract::new().order_key("Position").identity_key("Key");

    assert_eq!(contract.get_order_key(), "Position");
    assert_eq!(
        contract.detect(&item),
        OrderingCapability::OrderKey("Position".into())
    );
}

#[test]
fn detect_elements_resolves_through_schema() {
    let schema = Schema::new()
        .with(record(&[("Id", TypeRef::int())]))
        .unwrap();
    let contract = OrderingContract::default();

    assert_eq!(
        contract.detect_elements(&schema, &TypeRef::list(TypeRef::record("Item"))),
        OrderingCapability::IdentityKey("Id".into())
    );
    assert_eq!(
        contract.detect_elements(&schema, &TypeRef::list(TypeRef::record("Unknown"))),
        OrderingCapability::Unordered
    );
    assert_eq!(
        contract.detect_elements(&schema, &TypeRef::list(TypeRef::int())),
        OrderingCapability::Unordered
    );
    assert_eq!(
        contract.detect_elements(&schema, &TypeRef::record("Item")),
        OrderingCapability::Unordered
    );
}

#[test]
fn sort_key_exposes_member() {
    assert_eq!(OrderingCapability::OrderKey("OrderIndex".into()).sort_key(), Some("OrderIndex"));
    assert_eq!(OrderingCapability::Unordered.sort_key(), None);
    assert!(!OrderingCapability::Unordered.is_ordered());
}

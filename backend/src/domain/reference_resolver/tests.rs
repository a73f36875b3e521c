//! Tests for reference resolution.

use super::*;
use crate::domain::ports::MockProfileStore;
use rstest::rstest;
use serde_json::json;
use tracing_test::traced_test;

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn reference_rows() -> Vec<(&'static str, Row)> {
    vec![
        ("federations", row(json!({ "id": "f1", "code": "IPF" }))),
        ("federations", row(json!({ "id": "f2", "code": "USAPL" }))),
        (
            "divisions",
            row(json!({ "id": "d1", "federation_id": "f1", "name": "Junior" })),
        ),
        (
            "weight_classes",
            row(json!({ "id": "w1", "federation_id": "f1", "gender": "Male", "name": "67.5kg" })),
        ),
    ]
}

fn serve(query: &SelectQuery) -> Option<Row> {
    reference_rows()
        .into_iter()
        .find(|(table, candidate)| {
            *table == query.table
                && query
                    .filters
                    .iter()
                    .all(|f| column_text(candidate, &f.column).as_deref() == Some(f.value.as_str()))
        })
        .map(|(_, found)| found)
}

fn reference_store() -> MockProfileStore {
    let mut store = MockProfileStore::new();
    store
        .expect_select_single()
        .returning(|query| Ok(serve(query)));
    store
}

#[tokio::test]
async fn full_request_resolves_in_dependency_order() {
    let store = reference_store();
    let resolver = ReferenceResolver::new(&store);
    let request = ReferenceRequest::from_parts(
        Some("IPF".into()),
        Some("Junior".into()),
        Some("67.5kg".into()),
        Some(Gender::Male),
    )
    .expect("valid request");

    let resolved = resolver.resolve(request).await.expect("resolves");
    assert_eq!(
        resolved,
        ResolvedReferences {
            federation_id: Some("f1".into()),
            division_id: Some("d1".into()),
            weight_class_id: Some("w1".into()),
        }
    );
}

#[tokio::test]
async fn division_is_scoped_to_its_federation() {
    let store = reference_store();
    let resolver = ReferenceResolver::new(&store);

    let ipf = resolver.federation("IPF").await.expect("IPF exists");
    assert_eq!(resolver.division(&ipf, "Junior").await.expect("found"), "d1");

    let usapl = resolver.federation("USAPL").await.expect("USAPL exists");
    let err = resolver
        .division(&usapl, "Junior")
        .await
        .expect_err("not in USAPL");
    assert_eq!(
        err,
        ProfileError::reference_not_found(ReferenceKind::Division, "Junior")
    );
}

#[tokio::test]
async fn weight_class_is_scoped_by_gender() {
    let store = reference_store();
    let resolver = ReferenceResolver::new(&store);
    let ipf = resolver.federation("IPF").await.expect("IPF exists");

    let err = resolver
        .weight_class(&ipf, Gender::Female, "67.5kg")
        .await
        .expect_err("no female 67.5kg class");
    assert_eq!(
        err,
        ProfileError::reference_not_found(ReferenceKind::WeightClass, "67.5kg")
    );
}

#[tokio::test]
async fn unknown_federation_stops_before_dependent_lookups() {
    let mut store = MockProfileStore::new();
    store
        .expect_select_single()
        .times(1)
        .returning(|_| Ok(None));
    let resolver = ReferenceResolver::new(&store);
    let request = ReferenceRequest::from_parts(
        Some("Im fake".into()),
        Some("Junior".into()),
        None,
        Some(Gender::Male),
    )
    .expect("valid request");

    let err = resolver.resolve(request).await.expect_err("unknown code");
    assert_eq!(
        err,
        ProfileError::reference_not_found(ReferenceKind::Federation, "Im fake")
    );
}

#[rstest]
#[case(ProfileStoreError::unavailable("timeout"), ProfileError::StoreUnavailable("timeout".into()))]
#[case(
    ProfileStoreError::rejected("42P01", "relation does not exist"),
    ProfileError::ReferenceLookupFailed {
        kind: ReferenceKind::Federation,
        name: "IPF".into(),
        failure: crate::domain::StoreFailure::new("42P01", "relation does not exist"),
    }
)]
#[tokio::test]
async fn store_failures_are_classified(
    #[case] failure: ProfileStoreError,
    #[case] expected: ProfileError,
) {
    let mut store = MockProfileStore::new();
    store
        .expect_select_single()
        .times(1)
        .returning(move |_| Err(failure.clone()));
    let resolver = ReferenceResolver::new(&store);
    assert_eq!(resolver.federation("IPF").await.expect_err("fails"), expected);
}

#[tokio::test]
#[traced_test]
async fn rejected_lookup_is_logged_with_store_code() {
    let mut store = MockProfileStore::new();
    store
        .expect_select_single()
        .times(1)
        .returning(|_| Err(ProfileStoreError::rejected("42P01", "relation does not exist")));
    let resolver = ReferenceResolver::new(&store);
    let ipf = ResolvedFederation::from_stored("f1");

    resolver
        .division(&ipf, "Junior")
        .await
        .expect_err("store rejects");

    assert!(logs_contain("store rejected request"));
    assert!(logs_contain("store_code=42P01"));
    assert!(logs_contain("table=\"divisions\""));
}

#[tokio::test]
#[traced_test]
async fn row_without_id_is_logged_as_decode_failure() {
    let mut store = MockProfileStore::new();
    store
        .expect_select_single()
        .returning(|_| Ok(Some(row(json!({ "code": "IPF" })))));
    let resolver = ReferenceResolver::new(&store);

    let err = resolver.federation("IPF").await.expect_err("no id column");

    assert!(matches!(
        &err,
        ProfileError::ReferenceLookupFailed { kind: ReferenceKind::Federation, failure, .. }
            if failure.code == "decode_error"
    ));
    assert!(logs_contain("store request failed"));
}

#[tokio::test]
async fn numeric_ids_are_accepted() {
    let mut store = MockProfileStore::new();
    store
        .expect_select_single()
        .returning(|_| Ok(Some(row(json!({ "id": 7 })))));
    let resolver = ReferenceResolver::new(&store);
    assert_eq!(resolver.federation("IPF").await.expect("found").id(), "7");
}

#[tokio::test]
async fn empty_request_touches_nothing() {
    let mut store = MockProfileStore::new();
    store.expect_select_single().times(0);
    let resolver = ReferenceResolver::new(&store);
    assert_eq!(
        resolver.resolve(ReferenceRequest::None).await.expect("noop"),
        ResolvedReferences::default()
    );
}

#[rstest]
#[case(None, None, Some("67.5kg"), Some(Gender::Male), Some(WEIGHT_CLASS_PRECONDITION))]
#[case(Some("IPF"), None, Some("67.5kg"), None, Some(WEIGHT_CLASS_PRECONDITION))]
#[case(None, Some("Junior"), None, Some(Gender::Male), Some(DIVISION_PRECONDITION))]
#[case(None, Some("Junior"), Some("67.5kg"), Some(Gender::Male), Some(WEIGHT_CLASS_PRECONDITION))]
#[case(Some("IPF"), Some("Junior"), None, None, None)]
#[case(None, None, None, None, None)]
fn request_preconditions(
    #[case] federation: Option<&str>,
    #[case] division: Option<&str>,
    #[case] weight_class: Option<&str>,
    #[case] gender: Option<Gender>,
    #[case] expected_error: Option<&str>,
) {
    let result = ReferenceRequest::from_parts(
        federation.map(str::to_owned),
        division.map(str::to_owned),
        weight_class.map(str::to_owned),
        gender,
    );
    match expected_error {
        Some(reason) => assert_eq!(result, Err(ProfileError::precondition(reason))),
        None => assert!(result.is_ok()),
    }
}

//! Athlete profile endpoints served over the in-memory store.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use coaching_backend::Trace;
use coaching_backend::domain::ports::{FixtureAccessTokenVerifier, Row};
use coaching_backend::domain::schema_registry::{ATHLETES_TABLE, FEDERATIONS_TABLE, USERS_TABLE};
use coaching_backend::domain::{
    AthleteProfileService, Error, ErrorCode, SchemaRegistry, TRACE_ID_HEADER, UserId,
};
use coaching_backend::inbound::http::athletes::{create_profile, retrieve_profile, update_profile};
use coaching_backend::inbound::http::state::HttpState;
use coaching_backend::test_support::InMemoryProfileStore;
use serde_json::{Value, json};

const USER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
const TOKEN: &str = "lifter-token";

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn seeded_store() -> Arc<InMemoryProfileStore> {
    let store = Arc::new(InMemoryProfileStore::new());
    store.seed(USERS_TABLE, row(json!({ "id": USER, "email": "lifter@example.com" })));
    store.seed(
        FEDERATIONS_TABLE,
        row(json!({ "id": "fed-ipf", "code": "IPF", "name": "International Powerlifting Federation" })),
    );
    store
}

fn state(store: &Arc<InMemoryProfileStore>) -> HttpState {
    let service = Arc::new(AthleteProfileService::new(
        Arc::clone(store),
        Arc::new(SchemaRegistry::athlete_profiles()),
    ));
    let user = UserId::new(USER).expect("fixture user id");
    HttpState::new(
        service.clone(),
        service,
        Arc::new(FixtureAccessTokenVerifier::new(TOKEN, user)),
    )
}

fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TOKEN}"))
}

macro_rules! init_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state($store)))
                .wrap(Trace)
                .service(
                    web::scope("/api/v1")
                        .service(create_profile)
                        .service(retrieve_profile)
                        .service(update_profile),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn create_then_read_back_selected_fields() {
    let store = seeded_store();
    let app = init_app!(&store);

    let create = test::TestRequest::post()
        .uri("/api/v1/athlete/profile")
        .insert_header(bearer())
        .set_json(json!({
            "name": "Christian Lifter",
            "username": "chrrstian_",
            "gender": "Male",
            "date_of_birth": "2001-07-14",
            "federation": "IPF",
            "team": "Barbell Club"
        }))
        .to_request();
    let response = test::call_service(&app, create).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let athletes = store.rows(ATHLETES_TABLE);
    let athlete_id = athletes
        .first()
        .and_then(|athlete| athlete.get("id"))
        .and_then(Value::as_str)
        .expect("athlete id")
        .to_owned();

    let read = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/athlete/profile/{athlete_id}?data=team,users.username,federations"
        ))
        .insert_header(bearer())
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, read).await;

    assert_eq!(profile["team"], "Barbell Club");
    assert_eq!(profile["users"], json!({ "username": "chrrstian_" }));
    assert_eq!(profile["federations"]["code"], "IPF");
}

#[actix_web::test]
async fn rejected_field_carries_trace_id() {
    let store = seeded_store();
    let app = init_app!(&store);

    let read = test::TestRequest::get()
        .uri("/api/v1/athlete/profile/9b2f3a0e-6c1d-4e8f-a5b7-0c9d8e7f6a51?data=users.password")
        .insert_header(bearer())
        .to_request();
    let response = test::call_service(&app, read).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let error: Error = test::read_body_json(response).await;
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "Invalid query: 'users.password'");
    assert_eq!(error.trace_id(), Some(header.as_str()));
    assert!(store.calls().is_empty());
}

#[actix_web::test]
async fn unknown_athlete_is_404() {
    let store = seeded_store();
    let app = init_app!(&store);

    let read = test::TestRequest::get()
        .uri("/api/v1/athlete/profile/9b2f3a0e-6c1d-4e8f-a5b7-0c9d8e7f6a51")
        .insert_header(bearer())
        .to_request();
    let response = test::call_service(&app, read).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: Error = test::read_body_json(response).await;
    assert_eq!(
        error.message(),
        "Athlete with ID 9b2f3a0e-6c1d-4e8f-a5b7-0c9d8e7f6a51 could not be found"
    );
}

#[actix_web::test]
async fn update_with_unknown_federation_is_rejected_without_writes() {
    let store = seeded_store();
    let app = init_app!(&store);

    let patch = test::TestRequest::patch()
        .uri("/api/v1/athlete/profile")
        .insert_header(bearer())
        .set_json(json!({ "federation": "XYZ" }))
        .to_request();
    let response = test::call_service(&app, patch).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Error = test::read_body_json(response).await;
    assert_eq!(error.message(), "federation does not exist");
    assert!(store.writes().is_empty());
}

#[actix_web::test]
async fn forged_token_is_unauthorised() {
    let store = seeded_store();
    let app = init_app!(&store);

    let patch = test::TestRequest::patch()
        .uri("/api/v1/athlete/profile")
        .insert_header(("Authorization", "Bearer forged"))
        .set_json(json!({ "team": "Barbell Club" }))
        .to_request();
    let response = test::call_service(&app, patch).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.calls().is_empty());
}

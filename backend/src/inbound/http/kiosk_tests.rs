//! Tests for kiosk HTTP handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::Value;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    MockAttendanceCommand, MockAttendanceQuery, SignOutResponse,
};

fn member_id() -> MemberId {
    MemberId::new("1001").expect("valid member id")
}

fn season_id() -> SeasonId {
    SeasonId::new("2024").expect("valid season id")
}

fn closed_entry_payload() -> EntryPayload {
    EntryPayload {
        id: Uuid::new_v4(),
        member_id: member_id(),
        season_id: season_id(),
        time_in_ms: 1_700_000_000_000,
        time_out_ms: 1_700_003_600_000,
        total_ms: Some(3_600_000),
    }
}

fn test_app(
    commands: MockAttendanceCommand,
    queries: MockAttendanceQuery,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(Arc::new(commands), Arc::new(queries));
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .service(next_action)
            .service(sign_in)
            .service(sign_out)
            .service(create_account)
            .service(list_accounts)
            .service(member_hours)
            .service(list_entries)
            .service(season_total),
    )
}

#[actix_web::test]
async fn next_action_reports_create_account_for_fresh_member() {
    let mut queries = MockAttendanceQuery::new();
    queries.expect_next_action().times(1).return_once(|_| {
        Ok(NextActionResponse {
            action: NextAction::CreateAccount,
            account: None,
            open_entry: None,
        })
    });

    let app = actix_test::init_service(test_app(MockAttendanceCommand::new(), queries)).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/v1/kiosk/next-action?memberId=1001")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["action"], "create_account");
    assert!(body.get("account").is_none());
}

#[actix_web::test]
async fn sign_out_returns_the_closed_entry() {
    let mut commands = MockAttendanceCommand::new();
    commands.expect_sign_out().times(1).return_once(|_| {
        Ok(SignOutResponse {
            entry: closed_entry_payload(),
        })
    });

    let app = actix_test::init_service(test_app(commands, MockAttendanceQuery::new())).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/kiosk/sign-out")
        .set_json(serde_json::json!({ "memberId": "1001" }))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["memberId"], "1001");
    assert_eq!(body["totalMs"], 3_600_000);
    assert_eq!(body["timeOutMs"], 1_700_003_600_000_i64);
}

#[actix_web::test]
async fn sign_out_without_open_entry_is_a_conflict() {
    let mut commands = MockAttendanceCommand::new();
    commands
        .expect_sign_out()
        .times(1)
        .return_once(|_| Err(Error::no_open_entry("no open entry for member 1001")));

    let app = actix_test::init_service(test_app(commands, MockAttendanceQuery::new())).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/kiosk/sign-out")
        .set_json(serde_json::json!({ "memberId": "1001" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "no_open_entry");
}

#[actix_web::test]
async fn malformed_member_id_is_rejected_before_any_port_call() {
    let mut commands = MockAttendanceCommand::new();
    commands.expect_sign_in().times(0);

    let app = actix_test::init_service(test_app(commands, MockAttendanceQuery::new())).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/kiosk/sign-in")
        .set_json(serde_json::json!({ "memberId": "12ab" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "memberId");
}

#[actix_web::test]
async fn create_account_returns_account_and_entry() {
    let mut commands = MockAttendanceCommand::new();
    commands.expect_create_account().times(1).return_once(|_| {
        Ok(crate::domain::ports::CreateAccountResponse {
            account: AccountPayload {
                id: member_id(),
                name: "Ada Lovelace".to_owned(),
                seasons: BTreeMap::new(),
            },
            entry: EntryPayload {
                time_out_ms: 0,
                total_ms: None,
                ..closed_entry_payload()
            },
        })
    });

    let app = actix_test::init_service(test_app(commands, MockAttendanceQuery::new())).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/kiosk/accounts")
        .set_json(serde_json::json!({ "memberId": "1001", "name": "Ada Lovelace" }))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["account"]["name"], "Ada Lovelace");
    assert_eq!(body["entry"]["timeOutMs"], 0);
}

#[actix_web::test]
async fn member_hours_serialises_the_season_map() {
    let mut queries = MockAttendanceQuery::new();
    queries.expect_member_hours().times(1).return_once(|_| {
        Ok(MemberHoursResponse {
            member_id: member_id(),
            active_season: season_id(),
            active_season_ms: 3_600_000,
            seasons: BTreeMap::from([(season_id(), 3_600_000)]),
        })
    });

    let app = actix_test::init_service(test_app(MockAttendanceCommand::new(), queries)).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/v1/kiosk/accounts/1001/hours")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["activeSeason"], "2024");
    assert_eq!(body["activeSeasonMs"], 3_600_000);
    assert_eq!(body["seasons"]["2024"], 3_600_000);
}

#[actix_web::test]
async fn season_total_for_unknown_season_is_not_found() {
    let mut queries = MockAttendanceQuery::new();
    queries
        .expect_season_total()
        .times(1)
        .return_once(|_| Err(Error::not_found("season 2030 has no recorded time")));

    let app = actix_test::init_service(test_app(MockAttendanceCommand::new(), queries)).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/v1/kiosk/seasons/2030")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn list_entries_passes_filters_through() {
    let mut queries = MockAttendanceQuery::new();
    queries
        .expect_list_entries()
        .withf(|season: &Option<SeasonId>, active_only: &bool| {
            season.as_ref().is_some_and(|s| s.as_ref() == "2024") && *active_only
        })
        .times(1)
        .return_once(|_, _| Ok(vec![]));

    let app = actix_test::init_service(test_app(MockAttendanceCommand::new(), queries)).await;
    let request = actix_test::TestRequest::get()
        .uri("/api/v1/kiosk/entries?seasonId=2024&activeOnly=true")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body, serde_json::json!([]));
}

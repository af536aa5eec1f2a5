//! OpenAPI surface used by Swagger UI and tooling.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::kiosk::{
    AccountBody, CreateAccountRequestBody, CreateAccountResponseBody, EntryBody, MemberActionRequestBody,
    MemberHoursBody, NextActionBody, SeasonTotalBody,
};

/// Aggregated OpenAPI document for the kiosk API.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::kiosk::next_action,
        crate::inbound::http::kiosk::sign_in,
        crate::inbound::http::kiosk::sign_out,
        crate::inbound::http::kiosk::create_account,
        crate::inbound::http::kiosk::list_accounts,
        crate::inbound::http::kiosk::member_hours,
        crate::inbound::http::kiosk::list_entries,
        crate::inbound::http::kiosk::list_seasons,
        crate::inbound::http::kiosk::season_total,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        AccountBody,
        CreateAccountRequestBody,
        CreateAccountResponseBody,
        EntryBody,
        MemberActionRequestBody,
        MemberHoursBody,
        NextActionBody,
        SeasonTotalBody,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "kiosk", description = "Attendance kiosk operations"),
        (name = "health", description = "Liveness and readiness probes"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use utoipa::OpenApi as _;

    use super::*;

    #[test]
    fn document_lists_every_kiosk_path() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/v1/kiosk/next-action",
            "/api/v1/kiosk/sign-in",
            "/api/v1/kiosk/sign-out",
            "/api/v1/kiosk/accounts",
            "/api/v1/kiosk/accounts/{member_id}/hours",
            "/api/v1/kiosk/entries",
            "/api/v1/kiosk/seasons",
            "/api/v1/kiosk/seasons/{season_id}",
            "/health/live",
            "/health/ready",
        ] {
            assert!(
                paths.iter().any(|path| path.as_str() == expected),
                "missing path {expected}"
            );
        }
    }
}

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{SlotSuggestion, TimelineResponse};
use crate::models::{
    MemberPackage, PackageRef, PersonRef, ScheduledSession, SessionCreate, SessionStatus,
    SessionUpdate,
};
use crate::timeline::{DayTimeline, HourMark, TimelineCard};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::get_timeline,
        crate::handlers::resolve_slot,
        crate::handlers::create_session,
        crate::handlers::update_session,
        crate::handlers::delete_session,
        crate::handlers::get_ical
    ),
    components(schemas(
        ScheduledSession,
        SessionStatus,
        SessionCreate,
        SessionUpdate,
        MemberPackage,
        PersonRef,
        PackageRef,
        DayTimeline,
        TimelineCard,
        HourMark,
        TimelineResponse,
        SlotSuggestion
    )),
    tags(
        (name = "timeline", description = "Day timeline rendering and export"),
        (name = "sessions", description = "Session booking and lifecycle")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

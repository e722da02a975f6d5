use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct BearerAuthModifier;

impl Modify for BearerAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("ID token issued by the identity provider"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::users::profile_get_handler,
        crate::web::routes::users::profile_upsert_handler,
        crate::web::routes::users::progress_update_handler,
    ),
    components(schemas(
        crate::model::entity::UserRecord,
        crate::model::ledger::TopicStatus,
        crate::model::ledger::LessonRef,
        crate::web::dto::profile::ProfileRequest,
        crate::web::dto::progress::ProgressUpdateRequest,
        crate::web::error::ErrorResponse,
    )),
    modifiers(&BearerAuthModifier),
)]
pub struct ApiDoc;

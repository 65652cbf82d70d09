use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::update_password,
        crate::routes::profile::get_profile,
        crate::routes::profile::update_profile,
        crate::routes::notes::create_note,
        crate::routes::notes::list_notes,
        crate::routes::notes::search_notes,
        crate::routes::notes::get_note,
        crate::routes::notes::update_note,
        crate::routes::notes::delete_note,
        crate::routes::notes::toggle_star,
        crate::routes::notes::share_note
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::auth::CredentialsRequest,
            crate::routes::auth::SessionResponse,
            crate::routes::auth::UserResponse,
            crate::routes::auth::UpdatePasswordRequest,
            crate::routes::auth::MessageResponse,
            crate::routes::profile::UpdateProfileRequest,
            crate::routes::notes::NoteResponse,
            crate::routes::notes::NoteRequest,
            crate::routes::notes::SearchQuery,
            crate::routes::notes::ShareRequest,
            crate::routes::notes::SharedNoteResponse,
            crate::routes::notes::ShareResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Registration, login and password management"),
        (name = "Profile", description = "Current user profile"),
        (name = "Notes", description = "Personal and shared notes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("JWT".to_string());
        }

        components.add_security_scheme("bearerAuth", scheme);
    }
}

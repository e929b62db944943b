use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use liceum_auth::TokenPair;
use liceum_models::{
    BlockResponse, CreateBlocksDto, CreateEventDto, CreatedResponse, Event, EventBlock,
    EventResponse, EventsResponse, NewBlockDto, RefreshTokenRequest, SendCodeRequest,
    StatusResponse, UpdateBlockDto, UpdateEventDto, VerifyCodeRequest,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::send_auth_code,
        crate::modules::auth::controller::verify_code,
        crate::modules::auth::controller::refresh_token,
        crate::modules::events::controller::list_events,
        crate::modules::events::controller::list_current_events,
        crate::modules::events::controller::get_event,
        crate::modules::events::controller::get_block,
        crate::modules::events::controller::create_event,
        crate::modules::events::controller::edit_event,
        crate::modules::events::controller::delete_event,
        crate::modules::events::controller::create_blocks,
        crate::modules::events::controller::edit_block,
        crate::modules::events::controller::delete_block,
    ),
    components(
        schemas(
            SendCodeRequest,
            VerifyCodeRequest,
            RefreshTokenRequest,
            StatusResponse,
            TokenPair,
            ErrorResponse,
            Event,
            EventBlock,
            NewBlockDto,
            CreateEventDto,
            CreateBlocksDto,
            UpdateEventDto,
            UpdateBlockDto,
            EventsResponse,
            EventResponse,
            BlockResponse,
            CreatedResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Administrator sign-in by emailed one-time code"),
        (name = "Events", description = "Public event listings"),
        (name = "Admin", description = "Event and block management")
    ),
    info(
        title = "Liceum API",
        version = "0.1.0",
        description = "School events board with passwordless administrator sign-in.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

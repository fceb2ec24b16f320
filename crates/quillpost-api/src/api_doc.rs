//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quillpost Image API",
        version = "0.1.0",
        description = "Blog image service: serves uploaded images, accepts authenticated uploads with optional watermarking, and renders the avatar and comment captcha."
    ),
    paths(
        handlers::image_get::serve_upload,
        handlers::image_upload::upload_image,
        handlers::avatar::get_avatar,
        handlers::captcha::get_captcha_image,
        handlers::health::health_check,
    ),
    components(
        schemas(
            handlers::image_upload::UploadResponse,
            handlers::health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "images", description = "Image retrieval, upload and avatar"),
        (name = "captcha", description = "Session-bound captcha challenges"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

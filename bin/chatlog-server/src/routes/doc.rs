use crate::routes::{health, v1};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "chatlog-server",
    description = "Room-scoped chat message history API",
    version = "0.1.0",
    contact(name = "chatlog-rs", url = "https://github.com/Cyberhan123/chatlog.rs")
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(v1::api_docs());
    root
}

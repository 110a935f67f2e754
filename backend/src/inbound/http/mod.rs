//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod artifacts;
pub mod auth;
pub mod error;
pub mod feed;
pub mod health;
pub mod links;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod things;
pub mod users;

pub use error::ApiResult;

use self::error::{json_error_handler, query_error_handler};
use self::state::HttpState;

/// Register `state` and the body extractor limits derived from it.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use cadinet::inbound::http::{api_scope, configure_state};
/// use cadinet::test_support::MemoryServices;
///
/// let state = web::Data::new(MemoryServices::default().http_state());
/// let _app = App::new().configure(configure_state(state)).service(api_scope());
/// ```
pub fn configure_state(state: web::Data<HttpState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let limit = state.max_upload_bytes;
        cfg.app_data(state)
            .app_data(
                web::JsonConfig::default()
                    .limit(limit)
                    .error_handler(json_error_handler),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error_handler));
    }
}

/// The `/api/v1` scope. Callers wrap it with the session middleware.
pub fn api_scope() -> actix_web::Scope {
    web::scope("/api/v1")
        .service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(things::submit_thing)
        .service(things::list_things)
        .service(things::get_thing)
        .service(artifacts::upload_source_file)
        .service(artifacts::upload_view_data)
        .service(artifacts::download_source_file)
        .service(artifacts::download_view_data)
}

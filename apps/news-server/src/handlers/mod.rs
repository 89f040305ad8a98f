//! HTTP handlers and route configuration.

mod health;
mod news;
mod subscriptions;


use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{Error, HttpRequest, HttpResponse, http::header, web};
use newsroom_core::domain::Permission;
use newsroom_shared::ErrorResponse;

use crate::middleware::permission::RequirePermission;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/news")
                .app_data(web::QueryConfig::default().error_handler(invalid_query))
                .service(
                    web::resource("/")
                        .app_data(web::QueryConfig::default().error_handler(invalid_page))
                        .route(web::get().to(news::list)),
                )
                .route("/search/", web::get().to(news::search))
                .service(
                    web::resource("/create/")
                        .wrap(RequirePermission::new(Permission::AddPost))
                        .route(web::get().to(news::create_form))
                        .route(web::post().to(news::create)),
                )
                .route("/{id}/", web::get().to(news::detail))
                .service(
                    web::resource("/{id}/update/")
                        .wrap(RequirePermission::new(Permission::ChangePost))
                        .route(web::get().to(news::edit_form))
                        .route(web::post().to(news::update)),
                )
                .service(
                    web::resource("/{id}/delete/")
                        .wrap(RequirePermission::new(Permission::DeletePost))
                        .route(web::get().to(news::delete_form))
                        .route(web::post().to(news::delete)),
                ),
        )
        .service(
            // Subscribing is gated by the post creation permission.
            web::resource("/subscribe/")
                .wrap(RequirePermission::new(Permission::AddPost))
                .route(web::get().to(subscriptions::subscribe_form))
                .route(web::post().to(subscriptions::subscribe)),
        );
}

/// 302 redirect to `location`.
fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Malformed search field: 400 problem details.
fn invalid_query(err: QueryPayloadError, req: &HttpRequest) -> Error {
    let problem = ErrorResponse::bad_request(err.to_string()).with_instance(req.path());
    InternalError::from_response(err, HttpResponse::BadRequest().json(problem)).into()
}

/// A page number that is not an integer names no page: 404.
fn invalid_page(err: QueryPayloadError, req: &HttpRequest) -> Error {
    tracing::debug!(query = req.query_string(), error = %err, "Unparseable page number");
    let problem = ErrorResponse::not_found("Invalid page").with_instance(req.path());
    InternalError::from_response(err, HttpResponse::NotFound().json(problem)).into()
}

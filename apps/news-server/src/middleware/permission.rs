//! Capability check in front of protected resources.

use actix_web::{
    Error, HttpMessage, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;

use newsroom_core::domain::Permission;
use newsroom_core::ports::AuthError;

use super::auth::{AuthenticationError, authenticate};

/// Rejects requests whose session lacks `permission`.
///
/// Unauthenticated requests get 401, authenticated ones without the
/// permission get 403. On success the [`Identity`](super::auth::Identity) is
/// stored in the request extensions for the handler.
pub struct RequirePermission {
    permission: Permission,
}

impl RequirePermission {
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequirePermission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequirePermissionService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequirePermissionService {
            service,
            permission: self.permission,
        }))
    }
}

pub struct RequirePermissionService<S> {
    service: S,
    permission: Permission,
}

impl<S, B> Service<ServiceRequest> for RequirePermissionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let checked = authenticate(req.request()).and_then(|identity| {
            if identity.has_permission(self.permission) {
                Ok(identity)
            } else {
                Err(AuthError::InsufficientPermissions(
                    self.permission.codename().to_string(),
                ))
            }
        });

        match checked {
            Ok(identity) => {
                tracing::debug!(
                    user_id = %identity.user_id,
                    permission = %self.permission,
                    "Permission granted"
                );
                req.extensions_mut().insert(identity);

                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(e) => {
                tracing::warn!(
                    path = %req.path(),
                    permission = %self.permission,
                    reason = %e,
                    "Request rejected"
                );

                let response = AuthenticationError(e).error_response();
                let (http_req, _payload) = req.into_parts();
                let srv_response = ServiceResponse::new(http_req, response);

                Box::pin(async move { Ok(srv_response.map_into_right_body()) })
            }
        }
    }
}

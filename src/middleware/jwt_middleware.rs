/// Bearer-token gate for protected routes
///
/// Validates the access token from the Authorization header and injects the
/// decoded claims into request extensions as the authenticated principal.
/// Purely cryptographic: the session store is never consulted, so a revoked
/// session's access tokens stay valid until they expire.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::verify_access;
use crate::configuration::JwtSettings;

pub struct JwtMiddleware {
    jwt_config: JwtSettings,
}

impl JwtMiddleware {
    pub fn new(jwt_config: JwtSettings) -> Self {
        Self { jwt_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let header = match header {
            None => {
                tracing::warn!("Missing Authorization header");
                return reject(req, "No token provided");
            }
            Some(header) => header,
        };

        // an empty token after "Bearer " is structurally fine here and
        // fails verification instead, like any other bad token
        let token = match header.strip_prefix("Bearer ") {
            Some(token) => token.to_string(),
            None => {
                tracing::warn!("Malformed Authorization header");
                return reject(req, "Invalid token format");
            }
        };

        match verify_access(&token, &self.jwt_config) {
            Ok(claims) => {
                tracing::debug!(
                    account_id = %claims.sub,
                    email = %claims.email,
                    "Access token validated"
                );
                req.extensions_mut().insert(claims);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(_) => reject(req, "Invalid or expired token"),
        }
    }
}

fn reject<R: 'static>(
    _req: ServiceRequest,
    message: &str,
) -> LocalBoxFuture<'static, Result<R, Error>> {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "success": false,
        "message": message
    }));
    Box::pin(async move {
        Err(actix_web::error::InternalError::from_response("Unauthorized", response).into())
    })
}

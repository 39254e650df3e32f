//! Actix-Web middleware realizing gate verdicts.
//!
//! ```rust,ignore
//! App::new()
//!     .wrap(AccessGateMiddleware::new(gate, cookie_config))
//!     .service(site)
//! ```
//!
//! Allowed requests carry a [`GatePrincipal`] in their extensions when a
//! session was resolved. Cookie mutations from session resolution are applied
//! to whichever response leaves the middleware, redirect or not.

use crate::gate::{AccessGate, GatePrincipal};
use crate::verdict::AccessVerdict;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::future::LocalBoxFuture;
use log::warn;
use serde_json::json;
use solarlead_auth::{CookieConfig, CookieMutation, SessionCookies};
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Access gate middleware factory
#[derive(Clone)]
pub struct AccessGateMiddleware {
    gate: Arc<AccessGate>,
    cookie_config: Arc<CookieConfig>,
}

impl AccessGateMiddleware {
    pub fn new(gate: Arc<AccessGate>, cookie_config: Arc<CookieConfig>) -> Self {
        Self {
            gate,
            cookie_config,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGateMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGateMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGateMiddlewareService {
            service: Rc::new(service),
            gate: self.gate.clone(),
            cookie_config: self.cookie_config.clone(),
        }))
    }
}

pub struct AccessGateMiddlewareService<S> {
    service: Rc<S>,
    gate: Arc<AccessGate>,
    cookie_config: Arc<CookieConfig>,
}

impl<S, B> Service<ServiceRequest> for AccessGateMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B, BoxBody>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let gate = self.gate.clone();
        let cookie_config = self.cookie_config.clone();

        Box::pin(async move {
            let cookies = SessionCookies::from_request(&req);
            let path = req.path().to_string();
            let outcome = gate.evaluate(&path, &cookies).await;

            let mut response = match &outcome.verdict {
                AccessVerdict::Allow => {
                    if let Some(principal) = outcome.principal.clone() {
                        req.extensions_mut().insert::<GatePrincipal>(principal);
                    }
                    let http_req = req.request().clone();
                    match service.call(req).await {
                        Ok(res) => res.map_into_left_body(),
                        Err(err) => {
                            ServiceResponse::new(http_req, err.error_response()).map_into_right_body()
                        },
                    }
                },
                AccessVerdict::RedirectToLogin { .. } | AccessVerdict::RedirectTo(_) => {
                    let location = outcome
                        .verdict
                        .location(gate.routes().login_path())
                        .unwrap_or_else(|| gate.routes().login_path().to_string());
                    let redirect = HttpResponse::TemporaryRedirect()
                        .insert_header((header::LOCATION, location))
                        .insert_header((header::CACHE_CONTROL, "no-store"))
                        .finish();
                    req.into_response(redirect).map_into_right_body()
                },
                AccessVerdict::DenyAsUnauthorized => {
                    let denied = HttpResponse::Unauthorized().json(json!({
                        "error": "unauthorized",
                        "message": "Authentication required"
                    }));
                    req.into_response(denied).map_into_right_body()
                },
            };

            apply_cookie_mutations(response.response_mut(), &outcome.cookies, &cookie_config);
            Ok(response)
        })
    }
}

/// Write session cookie changes onto a response.
pub fn apply_cookie_mutations<B>(
    response: &mut HttpResponse<B>,
    mutations: &[CookieMutation],
    config: &CookieConfig,
) {
    for mutation in mutations {
        if let Err(e) = response.add_cookie(&mutation.to_cookie(config)) {
            warn!("Failed to set session cookie: {}", e);
        }
    }
}

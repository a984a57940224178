//! Rate limiting middleware.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use tollgate_core::{Admission, AdmissionController, Decision, RateLimitPolicy};
use tollgate_shared::ErrorResponse;

/// Only paths under this prefix are rate limited.
const LIMITED_PREFIX: &str = "/api/";

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Rate limiting middleware factory.
pub struct RateLimitMiddleware {
    admission: Arc<AdmissionController>,
    policy: RateLimitPolicy,
}

impl RateLimitMiddleware {
    pub fn new(admission: Arc<AdmissionController>, policy: RateLimitPolicy) -> Self {
        Self { admission, policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            admission: self.admission.clone(),
            policy: self.policy,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    admission: Arc<AdmissionController>,
    policy: RateLimitPolicy,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !req.path().starts_with(LIMITED_PREFIX) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        // Client address plus path: each route has its own quota per client.
        let identity = format!(
            "{}:{}",
            req.connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown"),
            req.path()
        );

        let service = self.service.clone();
        let admission = self.admission.clone();
        let policy = self.policy;

        Box::pin(async move {
            let decision = admission.check(&identity, &policy).await;

            match decision.outcome {
                Admission::Denied => {
                    tracing::warn!(
                        identity = %identity,
                        reset_in = decision.reset_in,
                        "Rate limit exceeded"
                    );

                    let response = rejection(&decision, &policy, req.path());
                    let (http_req, _payload) = req.into_parts();
                    return Ok(ServiceResponse::new(http_req, response).map_into_right_body());
                }
                Admission::DegradedAdmit(reason) => {
                    tracing::debug!(identity = %identity, ?reason, "Admitted without accounting");
                }
                Admission::Admitted => {}
            }

            let mut res = service.call(req).await?;
            insert_quota_headers(res.headers_mut(), &decision, &policy);
            Ok(res.map_into_left_body())
        })
    }
}

fn rejection(decision: &Decision, policy: &RateLimitPolicy, path: &str) -> HttpResponse {
    let error = ErrorResponse::too_many_requests(decision.reset_in).with_instance(path);

    let mut response = HttpResponse::TooManyRequests()
        .insert_header((RETRY_AFTER, decision.reset_in))
        .json(error);
    insert_quota_headers(response.headers_mut(), decision, policy);
    response
}

fn insert_quota_headers(headers: &mut HeaderMap, decision: &Decision, policy: &RateLimitPolicy) {
    headers.insert(
        HeaderName::from_static(LIMIT_HEADER),
        HeaderValue::from(policy.max_requests()),
    );
    headers.insert(
        HeaderName::from_static(REMAINING_HEADER),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(
        HeaderName::from_static(RESET_HEADER),
        HeaderValue::from(decision.reset_in),
    );
}

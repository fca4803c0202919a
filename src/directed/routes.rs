use crate::body;
use crate::directed::decide::{decide, Decision, ROBOTS_TXT};
use crate::directed::rules::Store;
use headers::{ContentType, HeaderMapExt};
use http::HeaderValue;
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::header::{HOST, LOCATION};
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;

pub struct State {
    pub store: Store,
    pub trust_forwarded_proto: bool,
}

pub async fn respond_to_request<B>(
    req: Request<B>,
    state: &State,
) -> Response<BoxBody<Bytes, Infallible>> {
    const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

    // absolute-form request targets override the Host header
    let host = req
        .uri()
        .authority()
        .map(|a| a.as_str())
        .or_else(|| req.headers().get(HOST).and_then(|h| h.to_str().ok()))
        .unwrap_or("");
    let path_and_query = req.uri().path_and_query().map_or("/", |p| p.as_str());
    let secure = state.trust_forwarded_proto
        && req
            .headers()
            .get(X_FORWARDED_PROTO)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"));

    match decide(&state.store, host, path_and_query, secure) {
        Decision::ServeRobotsTxt => {
            log::info!("{} {}{} -> [robots.txt]", req.method(), host, req.uri());
            let mut resp = Response::new(body::full(ROBOTS_TXT));
            resp.headers_mut().typed_insert(ContentType::text());
            resp
        }
        Decision::Redirect { location, status } => match HeaderValue::from_str(&location) {
            Ok(value) => {
                log::info!(
                    "{} {}{} -> [{}] {}",
                    req.method(),
                    host,
                    req.uri(),
                    status.as_u16(),
                    location
                );
                let mut resp = Response::new(body::empty());
                *resp.status_mut() = status;
                resp.headers_mut().insert(LOCATION, value);
                resp
            }
            Err(e) => {
                log::warn!(
                    "{} {}{} -> [invalid location] {:?} : {}",
                    req.method(),
                    host,
                    req.uri(),
                    location,
                    e
                );
                let mut resp = Response::new(body::empty());
                *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                resp
            }
        },
    }
}

//! Request extractors
//!
//! - [`CallContext`]: call metadata ([`RequestContext`]) read from headers
//! - [`RpcJson`]: JSON body whose rejection renders as `INVALID_ARGUMENT`

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::{HeaderMap, header, request::Parts},
};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::api_auth::RequestContext;
use crate::rpc::{Code, RpcError};

/// Set by grpc-gateway style proxies; wins over `user-agent`
pub const GATEWAY_USER_AGENT: &str = "grpcgateway-user-agent";
pub const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Clone)]
pub struct CallContext(pub RequestContext);

impl<S> FromRequestParts<S> for CallContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(CallContext(context_from_headers(&parts.headers, peer)))
    }
}

/// Build the call context.
///
/// Every `authorization` value is kept, undecodable bytes included, so the
/// gate sees the true credential count. Other non-UTF-8 values are skipped.
pub fn context_from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> RequestContext {
    let authorization = headers
        .get_all(header::AUTHORIZATION)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect();

    let user_agent = header_str(headers, GATEWAY_USER_AGENT)
        .or_else(|| header_str(headers, header::USER_AGENT.as_str()))
        .unwrap_or_default()
        .to_string();

    let client_ip = header_str(headers, FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_default();

    RequestContext {
        authorization,
        user_agent,
        client_ip,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// JSON request body
#[derive(Debug)]
pub struct RpcJson<T>(pub T);

impl<S, T> FromRequest<S> for RpcJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| {
                ApiError(RpcError::new(
                    Code::InvalidArgument,
                    format!("invalid request body: {}", e.body_text()),
                ))
            })?;
        Ok(RpcJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_auth::{AuthErrorCode, AuthorizationGate};
    use crate::core_types::Role;
    use crate::token::{LocalTokenMaker, TokenMaker};
    use axum::http::HeaderValue;
    use chrono::Duration;
    use std::sync::Arc;

    #[test]
    fn test_context_collects_every_authorization_value() {
        let mut headers = HeaderMap::new();
        headers.append(header::AUTHORIZATION, HeaderValue::from_static("bearer a"));
        headers.append(header::AUTHORIZATION, HeaderValue::from_static("bearer b"));

        let ctx = context_from_headers(&headers, None);
        assert_eq!(ctx.authorization, ["bearer a", "bearer b"]);
        assert_eq!(ctx.user_agent, "");
        assert_eq!(ctx.client_ip, "");
    }

    #[test]
    fn test_undecodable_authorization_value_still_counts() {
        let maker: Arc<dyn TokenMaker> =
            Arc::new(LocalTokenMaker::new(b"12345678901234567890123456789012").unwrap());
        let (token, _) = maker
            .create_token("alice", Role::Depositor, Duration::minutes(1))
            .unwrap();

        let mut headers = HeaderMap::new();
        headers.append(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("bearer {}", token)).unwrap(),
        );
        headers.append(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"bearer \xff\xfe").unwrap(),
        );

        let ctx = context_from_headers(&headers, None);
        assert_eq!(ctx.authorization.len(), 2);

        let gate = AuthorizationGate::new(maker);
        let err = gate.authorize(&ctx, &[Role::Depositor]).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::MultipleCredentials);
    }

    #[test]
    fn test_gateway_user_agent_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
        assert_eq!(context_from_headers(&headers, None).user_agent, "curl/8.0");

        headers.insert(GATEWAY_USER_AGENT, HeaderValue::from_static("bank-app/2.1"));
        assert_eq!(context_from_headers(&headers, None).user_agent, "bank-app/2.1");
    }

    #[test]
    fn test_client_ip_sources() {
        let peer: SocketAddr = "192.168.1.7:51000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(context_from_headers(&headers, Some(peer)).client_ip, "192.168.1.7");

        headers.insert(FORWARDED_FOR, HeaderValue::from_static("203.0.113.9, 10.0.0.2"));
        assert_eq!(context_from_headers(&headers, Some(peer)).client_ip, "203.0.113.9");
    }
}

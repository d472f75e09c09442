use crate::request::IngressRequest;

/// Sentinel returned when no strategy yields an address. Proxies also use it
/// as a placeholder inside forwarding headers, so it is rejected as a value.
pub const UNKNOWN_IP: &str = "unknown";

type Strategy = fn(&IngressRequest) -> Option<String>;

/// Ordered resolution strategies, first hit wins. None of them can fail;
/// a request with garbage headers simply falls through to the sentinel.
const STRATEGIES: [Strategy; 4] = [forwarded_for, real_ip, context_identity, context_http];

pub fn resolve_client_ip(request: &IngressRequest) -> String {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(request))
        .unwrap_or_else(|| String::from(UNKNOWN_IP))
}

fn accept(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() || candidate == UNKNOWN_IP {
        None
    } else {
        Some(String::from(candidate))
    }
}

/// `X-Forwarded-For` holds the whole proxy chain; the first entry is the
/// original client.
fn forwarded_for(request: &IngressRequest) -> Option<String> {
    request
        .header("x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .and_then(accept)
}

fn real_ip(request: &IngressRequest) -> Option<String> {
    request.header("x-real-ip").and_then(accept)
}

/// REST-style gateway context, `requestContext.identity.sourceIp`.
fn context_identity(request: &IngressRequest) -> Option<String> {
    request
        .request_context
        .as_ref()?
        .identity
        .as_ref()?
        .source_ip
        .as_deref()
        .and_then(accept)
}

/// HTTP v2 gateway context, `requestContext.http.sourceIp`.
fn context_http(request: &IngressRequest) -> Option<String> {
    request
        .request_context
        .as_ref()?
        .http
        .as_ref()?
        .source_ip
        .as_deref()
        .and_then(accept)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{resolve_client_ip, UNKNOWN_IP};
    use crate::request::{IngressRequest, RequestContext, SourceIdentity};

    fn with_headers(headers: &[(&str, &str)]) -> IngressRequest {
        IngressRequest {
            headers: headers
                .iter()
                .map(|(name, value)| (String::from(*name), String::from(*value)))
                .collect::<HashMap<_, _>>(),
            ..Default::default()
        }
    }

    fn with_identity(source_ip: &str) -> IngressRequest {
        IngressRequest {
            request_context: Some(RequestContext {
                identity: Some(SourceIdentity {
                    source_ip: Some(String::from(source_ip)),
                }),
                http: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn forwarded_chain_takes_first_entry() {
        let request = with_headers(&[("X-Forwarded-For", "1.2.3.4, 5.6.7.8")]);
        assert_eq!(resolve_client_ip(&request), "1.2.3.4");
    }

    #[test]
    fn forwarded_header_is_case_insensitive() {
        let request = with_headers(&[("x-FORWARDED-for", "1.2.3.4")]);
        assert_eq!(resolve_client_ip(&request), "1.2.3.4");
    }

    #[test]
    fn unknown_placeholder_in_chain_falls_through() {
        let request = with_headers(&[
            ("X-Forwarded-For", "unknown, 5.6.7.8"),
            ("X-Real-IP", "7.7.7.7"),
        ]);
        assert_eq!(resolve_client_ip(&request), "7.7.7.7");
    }

    #[test]
    fn real_ip_header_used_when_no_chain() {
        let request = with_headers(&[("X-Real-IP", " 8.8.8.8 ")]);
        assert_eq!(resolve_client_ip(&request), "8.8.8.8");
    }

    #[test]
    fn identity_context_used_when_no_headers() {
        let request = with_identity("9.9.9.9");
        assert_eq!(resolve_client_ip(&request), "9.9.9.9");
    }

    #[test]
    fn http_context_used_for_v2_gateways() {
        let request = IngressRequest {
            request_context: Some(RequestContext {
                identity: None,
                http: Some(SourceIdentity {
                    source_ip: Some(String::from("10.0.0.1")),
                }),
            }),
            ..Default::default()
        };
        assert_eq!(resolve_client_ip(&request), "10.0.0.1");
    }

    #[test]
    fn headers_win_over_request_context() {
        let mut request = with_identity("9.9.9.9");
        request.headers.insert(
            String::from("X-Forwarded-For"),
            String::from("1.2.3.4, 9.9.9.9"),
        );
        assert_eq!(resolve_client_ip(&request), "1.2.3.4");
    }

    #[test]
    fn empty_request_resolves_to_sentinel() {
        let request = IngressRequest::default();
        assert_eq!(resolve_client_ip(&request), UNKNOWN_IP);
    }

    #[test]
    fn blank_and_placeholder_values_resolve_to_sentinel() {
        let request = with_headers(&[("X-Forwarded-For", "  "), ("X-Real-IP", "unknown")]);
        assert_eq!(resolve_client_ip(&request), UNKNOWN_IP);
    }
}

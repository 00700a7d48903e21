//! HTTP 요청 메타데이터 추출

use actix_web::HttpRequest;

/// 클라이언트 IP 주소 추출
///
/// 프록시 환경을 고려하여 다음 순서로 확인합니다.
/// 1. `X-Forwarded-For` (첫 번째 IP)
/// 2. `X-Real-IP`
/// 3. 연결 정보의 peer 주소
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    if let Some(forwarded_for) = header("X-Forwarded-For") {
        if let Some(first_ip) = forwarded_for.split(',').next().map(str::trim) {
            if !first_ip.is_empty() {
                return Some(first_ip.to_string());
            }
        }
    }

    if let Some(real_ip) = header("X-Real-IP") {
        return Some(real_ip);
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_forwarded_for_takes_first_address() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.1"))
            .to_http_request();
        assert_eq!(client_ip(&req), Some("203.0.113.7".to_string()));
    }

    #[test]
    fn test_real_ip_header() {
        let req = TestRequest::default()
            .insert_header(("X-Real-IP", "198.51.100.2"))
            .to_http_request();
        assert_eq!(client_ip(&req), Some("198.51.100.2".to_string()));
    }

    #[test]
    fn test_peer_address_fallback() {
        let req = TestRequest::default()
            .peer_addr("192.0.2.10:5000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req), Some("192.0.2.10".to_string()));
    }
}

//! JWT 토큰 관리 서비스 구현
//!
//! HS256 서명의 액세스/리프레시 토큰 발급과 검증을 담당합니다.
//! 저장소 의존성이 없는 순수 서비스이며, 세션 저장과 블랙리스트는
//! [`SessionService`](super::session_service::SessionService)가 처리합니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use singleton_macro::service;
use uuid::Uuid;
use crate::{
    config::JwtConfig,
    core::errors::{AppError, ErrorContext},
    domain::{
        entities::users::User,
        models::token::{TokenClaims, TokenPair, TokenType},
    },
};

#[service(name = "token")]
pub struct TokenService {
    // 외부 의존성 없음
}

impl TokenService {
    fn issue(&self, user: &User, token_type: TokenType, lifetime: Duration) -> Result<String, AppError> {
        let now = Utc::now();

        let claims = TokenClaims {
            sub: user.id_string().ok_or_else(|| {
                AppError::InternalError("사용자 ID가 없습니다".to_string())
            })?,
            roles: user.roles(),
            token_type,
            iss: JwtConfig::issuer(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let secret = JwtConfig::secret();
        let encoding_key = EncodingKey::from_secret(secret.as_ref());

        encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
            .context("JWT 토큰 생성 실패")
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String, AppError> {
        self.issue(user, TokenType::Access, Duration::hours(JwtConfig::expiration_hours()))
    }

    pub fn generate_refresh_token(&self, user: &User) -> Result<String, AppError> {
        self.issue(user, TokenType::Refresh, Duration::days(JwtConfig::refresh_expiration_days()))
    }

    pub fn generate_token_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.generate_access_token(user)?,
            refresh_token: self.generate_refresh_token(user)?,
            expires_in: JwtConfig::expiration_hours() * 3600,
            refresh_expires_in: JwtConfig::refresh_expiration_days() * 86400,
        })
    }

    /// 서명, 만료, 발급자, 토큰 종류를 검증하고 클레임을 반환합니다.
    pub fn verify_token(&self, token: &str, expected: TokenType) -> Result<TokenClaims, AppError> {
        let secret = JwtConfig::secret();
        let decoding_key = DecodingKey::from_secret(secret.as_ref());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[JwtConfig::issuer()]);

        let claims = decode::<TokenClaims>(token, &decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::AuthenticationError("토큰이 만료되었습니다".to_string())
                },
                _ => AppError::AuthenticationError("유효하지 않은 토큰입니다".to_string()),
            })?;

        if claims.token_type != expected {
            return Err(AppError::AuthenticationError("토큰 종류가 올바르지 않습니다".to_string()));
        }

        Ok(claims)
    }

    /// `Authorization: Bearer <token>` 헤더 값에서 토큰 부분을 꺼냅니다.
    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> Result<&'a str, AppError> {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim()),
            _ => Err(AppError::AuthenticationError("유효하지 않은 인증 헤더 형식입니다".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use crate::domain::entities::users::UserRole;

    fn service() -> std::sync::Arc<TokenService> {
        TokenService::instance()
    }

    fn user() -> User {
        let mut user = User::new(
            "reader@example.com".to_string(),
            "reader".to_string(),
            "Reader".to_string(),
            "hash".to_string(),
            UserRole::Librarian,
        );
        user.id = Some(ObjectId::new());
        user
    }

    #[test]
    fn test_token_pair_round_trip() {
        let service = service();
        let user = user();
        let pair = service.generate_token_pair(&user).unwrap();

        let access = service.verify_token(&pair.access_token, TokenType::Access).unwrap();
        assert_eq!(Some(access.sub.clone()), user.id_string());
        assert_eq!(access.roles, vec!["librarian".to_string()]);
        assert_eq!(access.iss, JwtConfig::issuer());

        let refresh = service.verify_token(&pair.refresh_token, TokenType::Refresh).unwrap();
        assert_ne!(access.jti, refresh.jti);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_token_type_is_enforced() {
        let service = service();
        let pair = service.generate_token_pair(&user()).unwrap();

        let err = service.verify_token(&pair.refresh_token, TokenType::Access).unwrap_err();
        assert!(matches!(err, AppError::AuthenticationError(_)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = service();
        let token = service.generate_access_token(&user()).unwrap();
        let tampered = format!("{}x", token);

        assert!(matches!(
            service.verify_token(&tampered, TokenType::Access),
            Err(AppError::AuthenticationError(_))
        ));
    }

    #[test]
    fn test_user_without_id_cannot_get_token() {
        let mut user = user();
        user.id = None;

        assert!(matches!(service().generate_access_token(&user), Err(AppError::InternalError(_))));
    }

    #[test]
    fn test_extract_bearer_token() {
        let service = service();

        assert_eq!(service.extract_bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert!(service.extract_bearer_token("Basic abc").is_err());
        assert!(service.extract_bearer_token("Bearer ").is_err());
    }
}

//! 로그인 세션 서비스
//!
//! 로그인, 토큰 갱신, 로그아웃 흐름을 조합합니다.
//!
//! ```text
//! login   : 비밀번호 검증 → 토큰 쌍 발급 → refresh_token:{user_id} 저장
//! refresh : 리프레시 토큰 검증 → Redis 해시 비교 → 새 토큰 쌍 발급 (회전)
//! logout  : refresh_token:{user_id} 삭제 → 액세스 토큰 블랙리스트 등록
//! ```

use std::sync::Arc;
use singleton_macro::service;
use crate::{
    core::errors::AppError,
    domain::{
        dto::{
            tokens::TokenResponse,
            users::{LoginRequest, LoginResponse},
        },
        models::token::TokenType,
    },
    repositories::{tokens::TokenRepository, users::UserRepository},
    services::{auth::TokenService, users::UserService},
    utils::string_utils::parse_object_id,
};

#[service(name = "session")]
pub struct SessionService {
    token_repo: Arc<TokenRepository>,
    user_repo: Arc<UserRepository>,
    token_service: Arc<TokenService>,
    user_service: Arc<UserService>,
}

impl SessionService {
    pub async fn login(&self, request: LoginRequest, client_ip: Option<String>) -> Result<LoginResponse, AppError> {
        let user = self.user_service
            .verify_password(&request.email, &request.password)
            .await?;

        let user_id = user.id_string()
            .ok_or_else(|| AppError::InternalError("사용자 ID가 없습니다".to_string()))?;

        let token_pair = self.token_service.generate_token_pair(&user)?;

        self.token_repo
            .store_refresh_token(&user_id, &token_pair.refresh_token, token_pair.refresh_expires_in as u64, client_ip)
            .await?;

        if let Some(ref id) = user.id {
            if let Err(e) = self.user_repo.record_login(id).await {
                log::warn!("마지막 로그인 시각 기록 실패 - user_id: {}, 에러: {}", user_id, e);
            }
        }

        log::info!("로그인 성공 - 사용자: {}, 역할: {}", user.email, user.role);

        Ok(LoginResponse::new(user, token_pair))
    }

    /// 리프레시 토큰으로 새 토큰 쌍을 발급합니다. 이전 리프레시 토큰은 더 이상 쓸 수 없습니다.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        let claims = self.token_service.verify_token(refresh_token, TokenType::Refresh)?;

        if self.token_repo.find_refresh_token(&claims.sub, refresh_token).await?.is_none() {
            log::warn!("등록되지 않은 리프레시 토큰 사용 - user_id: {}", claims.sub);
            return Err(AppError::AuthenticationError("유효하지 않은 리프레시 토큰입니다".to_string()));
        }

        let user_id = parse_object_id(&claims.sub, "사용자 ID")
            .map_err(|_| AppError::AuthenticationError("유효하지 않은 리프레시 토큰입니다".to_string()))?;

        let user = self.user_repo
            .find_by_id(&user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::AuthenticationError("사용할 수 없는 계정입니다".to_string()))?;

        let token_pair = self.token_service.generate_token_pair(&user)?;

        self.token_repo
            .store_refresh_token(&claims.sub, &token_pair.refresh_token, token_pair.refresh_expires_in as u64, None)
            .await?;

        Ok(TokenResponse::from(token_pair))
    }

    pub async fn logout(&self, access_token: &str) -> Result<(), AppError> {
        let claims = self.token_service.verify_token(access_token, TokenType::Access)?;

        self.token_repo.delete_refresh_token(&claims.sub).await?;
        self.token_repo
            .blacklist_token(access_token, &claims.jti, &claims.sub, claims.exp)
            .await?;

        log::info!("로그아웃 처리 완료 - user_id: {}", claims.sub);
        Ok(())
    }

    pub async fn is_blacklisted(&self, access_token: &str) -> Result<bool, AppError> {
        self.token_repo.is_token_blacklisted(access_token).await
    }
}

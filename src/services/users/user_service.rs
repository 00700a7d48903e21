//! # 사용자 관리 서비스 구현
//!
//! 학생 자가 가입, 관리자의 계정 생성, 비밀번호 검증, 계정 조회와 활성 상태 변경을 담당합니다.
//!
//! ## 보안 설계 원칙
//!
//! - **bcrypt 해싱**: 환경별 cost (`PasswordConfig::bcrypt_cost`)
//! - **계정 상태 검증**: 비활성 계정은 로그인과 토큰 갱신이 거부됩니다
//! - **민감 정보 제거**: 응답 DTO에는 비밀번호 해시가 포함되지 않습니다

use std::sync::Arc;
use bcrypt::hash;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use serde_json::json;
use singleton_macro::service;
use crate::{
    config::PasswordConfig,
    core::errors::{AppError, ErrorContext},
    domain::{
        dto::{
            users::{CreateUserRequest, RegisterRequest, UpdateUserStatusRequest, UserListQuery, UserResponse},
            PagedResponse, Pagination,
        },
        entities::{
            audit::{AuditAction, EntityType},
            users::{User, UserRole},
        },
        models::auth::{Actor, AuthenticatedUser},
    },
    repositories::{
        circulation::TransactionRepository,
        tokens::TokenRepository,
        users::UserRepository,
    },
    services::audit::AuditService,
    utils::string_utils::{clean_optional_string, escape_regex, parse_object_id},
};

#[service(name = "user")]
pub struct UserService {
    user_repo: Arc<UserRepository>,
    transaction_repo: Arc<TransactionRepository>,
    token_repo: Arc<TokenRepository>,
    audit_service: Arc<AuditService>,
}

impl UserService {
    /// 학생 자가 가입 (`role = student`)
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AppError> {
        let user = self.store_user(CreateUserRequest::from(request)).await?;
        log::info!("학생 가입 완료 - {}", user.email);

        Ok(UserResponse::from(user))
    }

    /// 관리자의 계정 생성 (모든 역할)
    pub async fn create_user(&self, request: CreateUserRequest, actor: &Actor) -> Result<UserResponse, AppError> {
        let user = self.store_user(request).await?;

        self.audit_service
            .record(
                actor,
                AuditAction::UserCreated,
                EntityType::User,
                user.id_string(),
                Some(json!({ "email": user.email, "role": user.role.as_str() })),
            )
            .await;

        Ok(UserResponse::from(user))
    }

    async fn store_user(&self, request: CreateUserRequest) -> Result<User, AppError> {
        let start_time = std::time::Instant::now();

        let password_hash = hash(&request.password, PasswordConfig::bcrypt_cost())
            .context("비밀번호 해싱 실패")?;

        log::debug!("Password hashing took: {:?}", start_time.elapsed());

        // 학번/학과는 학생 계정에만 저장
        let (student_number, department) = if request.role == UserRole::Student {
            (clean_optional_string(request.student_number), clean_optional_string(request.department))
        } else {
            (None, None)
        };

        let user = User::new(
            request.email.trim().to_lowercase(),
            request.username.trim().to_string(),
            request.display_name.trim().to_string(),
            password_hash,
            request.role,
        )
        .with_student_profile(student_number, department);

        self.user_repo.create(user).await
    }

    pub async fn get_user(&self, id: &str) -> Result<UserResponse, AppError> {
        let object_id = parse_object_id(id, "사용자 ID")?;
        let user = self.find_user(&object_id).await?;

        Ok(UserResponse::from(user))
    }

    pub async fn get_current_user(&self, user: &AuthenticatedUser) -> Result<UserResponse, AppError> {
        let user = self.find_user(&user.object_id()?).await?;

        Ok(UserResponse::from(user))
    }

    pub async fn find_user(&self, id: &ObjectId) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))
    }

    pub async fn list_users(&self, query: UserListQuery) -> Result<PagedResponse<UserResponse>, AppError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (users, total) = self.user_repo.find_page(user_filter(&query), pagination).await?;

        Ok(PagedResponse::new(users, total, pagination).map(UserResponse::from))
    }

    /// 계정 활성/비활성 전환
    ///
    /// 대출 중인 도서가 있는 학생, 그리고 자기 자신은 비활성화할 수 없습니다.
    /// 비활성화 시 저장된 리프레시 세션도 삭제됩니다.
    pub async fn update_status(
        &self,
        id: &str,
        request: UpdateUserStatusRequest,
        actor: &Actor,
    ) -> Result<UserResponse, AppError> {
        let object_id = parse_object_id(id, "사용자 ID")?;
        let user = self.find_user(&object_id).await?;

        if !request.is_active {
            if object_id == actor.id {
                return Err(AppError::ConflictError("자기 자신의 계정은 비활성화할 수 없습니다".to_string()));
            }

            let issued = self.transaction_repo.count_issued_for_student(&object_id).await?;
            if issued > 0 {
                return Err(AppError::ConflictError(format!(
                    "대출 중인 도서가 {}권 있어 비활성화할 수 없습니다",
                    issued
                )));
            }
        }

        let updated = self.user_repo
            .update(&object_id, doc! { "is_active": request.is_active })
            .await?
            .ok_or_else(|| AppError::NotFound("사용자를 찾을 수 없습니다".to_string()))?;

        if !request.is_active {
            if let Err(e) = self.token_repo.delete_refresh_token(&object_id.to_hex()).await {
                log::warn!("비활성화된 계정의 세션 삭제 실패 - user_id: {}, 에러: {}", id, e);
            }
        }

        self.audit_service
            .record(
                actor,
                AuditAction::UserStatusChanged,
                EntityType::User,
                Some(object_id.to_hex()),
                Some(json!({ "from": user.is_active, "to": request.is_active })),
            )
            .await;

        Ok(UserResponse::from(updated))
    }

    /// 이메일/비밀번호 검증
    ///
    /// 존재하지 않는 이메일과 틀린 비밀번호는 같은 메시지로 응답합니다.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<User, AppError> {
        let start_time = std::time::Instant::now();

        let user = self.user_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::AuthenticationError("잘못된 이메일 또는 비밀번호입니다".to_string()))?;

        let is_valid = bcrypt::verify(password, &user.password_hash)
            .context("비밀번호 검증 실패")?;

        log::debug!("Password verification took: {:?}", start_time.elapsed());

        if !is_valid {
            log::warn!("로그인 실패 - 이메일: {}", email);
            return Err(AppError::AuthenticationError("잘못된 이메일 또는 비밀번호입니다".to_string()));
        }

        if !user.is_active {
            return Err(AppError::AuthenticationError("비활성화된 계정입니다".to_string()));
        }

        Ok(user)
    }
}

fn user_filter(query: &UserListQuery) -> Document {
    let mut filter = doc! {};

    if let Some(role) = query.role {
        filter.insert("role", role.as_str());
    }
    if let Some(is_active) = query.is_active {
        filter.insert("is_active", is_active);
    }
    if let Some(ref search) = query.search {
        let pattern = escape_regex(search.trim());
        let conditions: Vec<Bson> = ["email", "username", "display_name", "student_number"]
            .iter()
            .map(|field| {
                let mut condition = Document::new();
                condition.insert(*field, doc! { "$regex": &pattern, "$options": "i" });
                Bson::Document(condition)
            })
            .collect();
        filter.insert("$or", conditions);
    }

    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_filter_combines_conditions() {
        let query = UserListQuery {
            role: Some(UserRole::Student),
            search: Some("kim.".to_string()),
            is_active: Some(true),
            page: None,
            limit: None,
        };

        let filter = user_filter(&query);
        assert_eq!(filter.get_str("role").unwrap(), "student");
        assert!(filter.get_bool("is_active").unwrap());

        let or = filter.get_array("$or").unwrap();
        assert_eq!(or.len(), 4);
        let first = or[0].as_document().unwrap().get_document("email").unwrap();
        assert_eq!(first.get_str("$regex").unwrap(), "kim\\.");
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = UserListQuery { role: None, search: None, is_active: None, page: None, limit: None };
        assert!(user_filter(&query).is_empty());
    }
}

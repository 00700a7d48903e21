//! # 사용자 리포지토리 구현
//!
//! 사용자 엔티티의 데이터 액세스 계층을 담당하는 리포지토리입니다.
//! MongoDB를 주 저장소로 사용하고, ID 조회 결과를 Redis에 캐싱합니다.
//!
//! ## 특징
//!
//! - **하이브리드 스토리지**: MongoDB + Redis 캐싱
//! - **데이터 무결성**: email, username, student_number 유니크 인덱스
//! - **쓰기 후 캐시 무효화**: 수정 시 `user:{id}` 캐시 삭제

use std::sync::Arc;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    IndexModel,
};
use singleton_macro::repository;
use crate::{
    caching::redis::RedisClient,
    core::{errors::AppError, registry::Repository},
    db::Database,
    domain::{dto::Pagination, entities::users::User},
    repositories::{find_paged, is_duplicate_key},
};

/// 사용자 캐시 TTL (10분)
const USER_CACHE_TTL: usize = 600;

/// 사용자 데이터 액세스 리포지토리
///
/// ## 캐싱 전략
///
/// - **키 패턴**: `user:{user_id}` (리포지토리 매크로의 `cache_key()` 사용)
/// - **TTL**: 10분
/// - 이메일/사용자명 조회는 로그인과 중복 검사에서만 쓰이므로 캐싱하지 않습니다.
///
/// ## 컬렉션
///
/// - **컬렉션명**: `users`
/// - **인덱스**: email(unique), username(unique), student_number(unique, sparse), role, created_at(desc)
#[repository(name = "user", collection = "users")]
pub struct UserRepository {
    db: Arc<Database>,
    redis: Arc<RedisClient>,
}

impl UserRepository {
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.collection::<User>()
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.collection::<User>()
            .find_one(doc! { "username": username })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    pub async fn find_by_student_number(&self, student_number: &str) -> Result<Option<User>, AppError> {
        self.collection::<User>()
            .find_one(doc! { "student_number": student_number })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// ID로 사용자 조회 (캐시 우선)
    ///
    /// # 캐싱 정책
    ///
    /// - **캐시 키**: `user:{id}`
    /// - **TTL**: 600초 (10분)
    /// - **캐시 미스**: MongoDB에서 조회 후 캐시에 저장
    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        let cache_key = self.cache_key(&id.to_hex());

        if let Ok(Some(cached)) = self.redis.get::<User>(&cache_key).await {
            return Ok(Some(cached));
        }

        let user = self.collection::<User>()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if let Some(ref user) = user {
            let _ = self.redis
                .set_with_expiry(&cache_key, user, USER_CACHE_TTL)
                .await;
        }

        Ok(user)
    }

    /// 새 사용자 저장
    ///
    /// 이메일, 사용자명, 학번 중복을 먼저 확인하고, 동시 가입으로 유니크 인덱스에
    /// 걸린 경우도 `ConflictError`로 변환합니다.
    pub async fn create(&self, mut user: User) -> Result<User, AppError> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::ConflictError("이미 사용 중인 이메일입니다".to_string()));
        }

        if self.find_by_username(&user.username).await?.is_some() {
            return Err(AppError::ConflictError("이미 사용 중인 사용자명입니다".to_string()));
        }

        if let Some(ref student_number) = user.student_number {
            if self.find_by_student_number(student_number).await?.is_some() {
                return Err(AppError::ConflictError("이미 등록된 학번입니다".to_string()));
            }
        }

        let result = self.collection::<User>()
            .insert_one(&user)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::ConflictError("이미 등록된 사용자입니다".to_string())
                } else {
                    AppError::DatabaseError(e.to_string())
                }
            })?;

        user.id = result.inserted_id.as_object_id();

        Ok(user)
    }

    /// `$set` 문서로 부분 수정하고 수정된 사용자를 반환합니다.
    pub async fn update(&self, id: &ObjectId, mut update_doc: Document) -> Result<Option<User>, AppError> {
        update_doc.insert("updated_at", DateTime::now());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated_user = self.collection::<User>()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": update_doc })
            .with_options(options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if updated_user.is_some() {
            let _ = self.invalidate_cache(&id.to_hex()).await;
        }

        Ok(updated_user)
    }

    /// 마지막 로그인 시각 기록
    pub async fn record_login(&self, id: &ObjectId) -> Result<(), AppError> {
        self.collection::<User>()
            .update_one(doc! { "_id": id }, doc! { "$set": { "last_login_at": DateTime::now() } })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let _ = self.invalidate_cache(&id.to_hex()).await;
        Ok(())
    }

    /// 필터에 맞는 사용자 목록 (최근 가입순)
    pub async fn find_page(&self, filter: Document, pagination: Pagination) -> Result<(Vec<User>, u64), AppError> {
        find_paged(
            &self.collection::<User>(),
            filter,
            doc! { "created_at": -1 },
            pagination,
        )
        .await
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let collection = self.collection::<User>();

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("email_unique".to_string())
                .build())
            .build();

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("username_unique".to_string())
                .build())
            .build();

        // 학번은 학생 계정에만 있으므로 sparse
        let student_number_index = IndexModel::builder()
            .keys(doc! { "student_number": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .sparse(true)
                .name("student_number_unique".to_string())
                .build())
            .build();

        let role_index = IndexModel::builder()
            .keys(doc! { "role": 1 })
            .options(IndexOptions::builder()
                .name("role".to_string())
                .build())
            .build();

        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(IndexOptions::builder()
                .name("created_at_desc".to_string())
                .build())
            .build();

        collection
            .create_indexes([email_index, username_index, student_number_index, role_index, created_at_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

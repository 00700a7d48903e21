//! 피드백 리포지토리

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
    domain::{dto::Pagination, entities::feedback::Feedback},
    repositories::find_paged,
};

#[repository(name = "feedback", collection = "feedback")]
pub struct FeedbackRepository {
    db: Arc<Database>,
    redis: Arc<RedisClient>,
}

impl FeedbackRepository {
    pub async fn create(&self, mut feedback: Feedback) -> Result<Feedback, AppError> {
        let result = self.collection::<Feedback>()
            .insert_one(&feedback)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        feedback.id = result.inserted_id.as_object_id();
        Ok(feedback)
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Feedback>, AppError> {
        self.collection::<Feedback>()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    pub async fn update(&self, id: &ObjectId, mut update_doc: Document) -> Result<Option<Feedback>, AppError> {
        update_doc.insert("updated_at", DateTime::now());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<Feedback>()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": update_doc })
            .with_options(options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    pub async fn find_page(&self, filter: Document, pagination: Pagination) -> Result<(Vec<Feedback>, u64), AppError> {
        find_paged(
            &self.collection::<Feedback>(),
            filter,
            doc! { "created_at": -1, "_id": -1 },
            pagination,
        )
        .await
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": -1 })
            .options(IndexOptions::builder()
                .name("user_created_at".to_string())
                .build())
            .build();

        let status_index = IndexModel::builder()
            .keys(doc! { "status": 1 })
            .options(IndexOptions::builder()
                .name("status".to_string())
                .build())
            .build();

        self.collection::<Feedback>()
            .create_indexes([user_index, status_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

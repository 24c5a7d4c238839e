// region:    --- Imports
use super::queries;
use crate::bidding::model::{Bid, Listing};
use crate::catalog::model::{Category, Comment};
use crate::closing::model::Notification;
use crate::database::DatabaseManager;
use crate::error::CoreError;
use rust_decimal::Decimal;
use sqlx::Row;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 상품 조회
pub async fn get_listing(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Listing, CoreError> {
    info!("{:<12} --> 상품 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(queries::GET_LISTING)
                    .bind(listing_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(CoreError::NotFound("경매 상품"))
            })
        })
        .await
}

/// 진행 중 상품 목록 조회
pub async fn get_active_listings(db_manager: &DatabaseManager) -> Result<Vec<Listing>, CoreError> {
    info!("{:<12} --> 진행 중 상품 목록 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                Ok(sqlx::query_as::<_, Listing>(queries::GET_ACTIVE_LISTINGS)
                    .fetch_all(&mut **tx)
                    .await?)
            })
        })
        .await
}

/// 종료된 상품 목록 조회
pub async fn get_closed_listings(db_manager: &DatabaseManager) -> Result<Vec<Listing>, CoreError> {
    info!("{:<12} --> 종료된 상품 목록 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                Ok(sqlx::query_as::<_, Listing>(queries::GET_CLOSED_LISTINGS)
                    .fetch_all(&mut **tx)
                    .await?)
            })
        })
        .await
}

/// 분류별 진행 중 상품 목록 조회
pub async fn get_category_listings(
    db_manager: &DatabaseManager,
    category_id: i64,
) -> Result<Vec<Listing>, CoreError> {
    info!("{:<12} --> 분류별 상품 조회 id: {}", "Query", category_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                Ok(sqlx::query_as::<_, Listing>(queries::GET_CATEGORY_LISTINGS)
                    .bind(category_id)
                    .fetch_all(&mut **tx)
                    .await?)
            })
        })
        .await
}

/// 최고 입찰가 조회
pub async fn get_highest_bid(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Option<Decimal>, CoreError> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let result = sqlx::query(queries::GET_HIGHEST_BID)
                    .bind(listing_id)
                    .fetch_one(&mut **tx)
                    .await?;

                Ok(result.get("highest_bid"))
            })
        })
        .await
}

/// 입찰 이력 조회
pub async fn get_bid_history(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Vec<Bid>, CoreError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                Ok(sqlx::query_as::<_, Bid>(queries::GET_BID_HISTORY)
                    .bind(listing_id)
                    .fetch_all(&mut **tx)
                    .await?)
            })
        })
        .await
}

/// 분류 목록 조회
pub async fn get_categories(db_manager: &DatabaseManager) -> Result<Vec<Category>, CoreError> {
    info!("{:<12} --> 분류 목록 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                Ok(sqlx::query_as::<_, Category>(queries::GET_CATEGORIES)
                    .fetch_all(&mut **tx)
                    .await?)
            })
        })
        .await
}

/// 댓글 목록 조회
pub async fn get_comments(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Vec<Comment>, CoreError> {
    info!("{:<12} --> 댓글 목록 조회 id: {}", "Query", listing_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                Ok(sqlx::query_as::<_, Comment>(queries::GET_COMMENTS)
                    .bind(listing_id)
                    .fetch_all(&mut **tx)
                    .await?)
            })
        })
        .await
}

/// 관심 목록 상품 조회
pub async fn get_watched_listings(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> Result<Vec<Listing>, CoreError> {
    info!("{:<12} --> 관심 목록 조회 user_id: {}", "Query", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                Ok(sqlx::query_as::<_, Listing>(queries::GET_WATCHED_LISTINGS)
                    .bind(user_id)
                    .fetch_all(&mut **tx)
                    .await?)
            })
        })
        .await
}

/// 사용자 알림 목록 조회
pub async fn get_notifications(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> Result<Vec<Notification>, CoreError> {
    info!("{:<12} --> 알림 목록 조회 user_id: {}", "Query", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                Ok(sqlx::query_as::<_, Notification>(queries::GET_NOTIFICATIONS)
                    .bind(user_id)
                    .fetch_all(&mut **tx)
                    .await?)
            })
        })
        .await
}

// endregion: --- Query Handlers

/// 영속 계층 협력자
/// 모든 작업은 호출자가 제공한 트랜잭션 범위 안에서 실행된다.
/// 상품에 딸린 레코드 삭제는 암묵적 ON DELETE에 기대지 않고 여기서 명시적으로 수행한다.
// region:    --- Imports
use crate::bidding::model::{Bid, Listing};
use crate::catalog::commands::CreateListingCommand;
use crate::catalog::model::Comment;
use crate::closing::model::Notification;
use crate::error::CoreError;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Postgres, Row, Transaction};
// endregion: --- Imports

// region:    --- Listings

/// 상품 행을 잠그고 읽는다
/// 잠금은 트랜잭션이 끝날 때까지 유지되어 같은 상품에 대한
/// 가격 확인-쓰기 구간과 종료 처리를 직렬화한다.
pub async fn read_listing_for_update(
    tx: &mut Transaction<'_, Postgres>,
    listing_id: i64,
) -> Result<Listing, CoreError> {
    sqlx::query_as::<_, Listing>(
        "SELECT id, title, description, starting_price, current_price, image_url, category_id, owner_id, is_active, winner_id, created_at
         FROM listings WHERE id = $1 FOR UPDATE",
    )
    .bind(listing_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(CoreError::NotFound("경매 상품"))
}

/// 상품 현재 가격 갱신
pub async fn update_listing_price(
    tx: &mut Transaction<'_, Postgres>,
    listing_id: i64,
    amount: Decimal,
) -> Result<Listing, CoreError> {
    let listing = sqlx::query_as::<_, Listing>(
        "UPDATE listings SET current_price = $1 WHERE id = $2
         RETURNING id, title, description, starting_price, current_price, image_url, category_id, owner_id, is_active, winner_id, created_at",
    )
    .bind(amount)
    .bind(listing_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(listing)
}

/// 상품 등록 (현재 가격은 시작 가격으로 초기화)
pub async fn insert_listing(
    tx: &mut Transaction<'_, Postgres>,
    cmd: &CreateListingCommand,
    starting_price: Decimal,
) -> Result<Listing, CoreError> {
    let listing = sqlx::query_as::<_, Listing>(
        "INSERT INTO listings (title, description, starting_price, current_price, image_url, category_id, owner_id, is_active, created_at)
         VALUES ($1, $2, $3, $3, $4, $5, $6, TRUE, $7)
         RETURNING id, title, description, starting_price, current_price, image_url, category_id, owner_id, is_active, winner_id, created_at",
    )
    .bind(&cmd.title)
    .bind(&cmd.description)
    .bind(starting_price)
    .bind(&cmd.image_url)
    .bind(cmd.category_id)
    .bind(cmd.owner_id)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;
    Ok(listing)
}

/// 상품 종료 처리: 낙찰자를 기록하고 비활성으로 바꾼다
pub async fn finalize_listing(
    tx: &mut Transaction<'_, Postgres>,
    listing_id: i64,
    winner_id: Option<i64>,
) -> Result<Listing, CoreError> {
    let listing = sqlx::query_as::<_, Listing>(
        "UPDATE listings SET is_active = FALSE, winner_id = $1 WHERE id = $2
         RETURNING id, title, description, starting_price, current_price, image_url, category_id, owner_id, is_active, winner_id, created_at",
    )
    .bind(winner_id)
    .bind(listing_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(listing)
}

/// 상품과 딸린 레코드(입찰, 댓글, 관심 목록) 명시적 연쇄 삭제
pub async fn delete_listing_cascade(
    tx: &mut Transaction<'_, Postgres>,
    listing_id: i64,
) -> Result<(), CoreError> {
    sqlx::query("DELETE FROM bids WHERE listing_id = $1")
        .bind(listing_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM comments WHERE listing_id = $1")
        .bind(listing_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM watchlist WHERE listing_id = $1")
        .bind(listing_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM listings WHERE id = $1")
        .bind(listing_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

// endregion: --- Listings

// region:    --- Bids

/// 최고 입찰가 조회 (입찰이 없으면 None)
pub async fn max_bid_amount(
    tx: &mut Transaction<'_, Postgres>,
    listing_id: i64,
) -> Result<Option<Decimal>, CoreError> {
    let row = sqlx::query("SELECT MAX(amount) AS highest_bid FROM bids WHERE listing_id = $1")
        .bind(listing_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row.get("highest_bid"))
}

/// 입찰 기록 추가 (추가 전용, 이후 수정되지 않는다)
pub async fn append_bid(
    tx: &mut Transaction<'_, Postgres>,
    listing_id: i64,
    bidder_id: i64,
    amount: Decimal,
) -> Result<Bid, CoreError> {
    let bid = sqlx::query_as::<_, Bid>(
        "INSERT INTO bids (listing_id, bidder_id, amount, created_at)
         VALUES ($1, $2, $3, $4)
         RETURNING id, listing_id, bidder_id, amount, created_at",
    )
    .bind(listing_id)
    .bind(bidder_id)
    .bind(amount)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;
    Ok(bid)
}

/// 최고 입찰 조회: 금액 내림차순, 동률이면 먼저 들어온 입찰
pub async fn top_bid(
    tx: &mut Transaction<'_, Postgres>,
    listing_id: i64,
) -> Result<Option<Bid>, CoreError> {
    let bid = sqlx::query_as::<_, Bid>(
        "SELECT id, listing_id, bidder_id, amount, created_at
         FROM bids WHERE listing_id = $1
         ORDER BY amount DESC, created_at ASC
         LIMIT 1",
    )
    .bind(listing_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(bid)
}

// endregion: --- Bids

// region:    --- Notifications

/// 알림 생성
pub async fn create_notification(
    tx: &mut Transaction<'_, Postgres>,
    recipient_id: i64,
    message: &str,
) -> Result<Notification, CoreError> {
    let notification = sqlx::query_as::<_, Notification>(
        "INSERT INTO notifications (recipient_id, message, read, created_at)
         VALUES ($1, $2, FALSE, $3)
         RETURNING id, recipient_id, message, read, created_at",
    )
    .bind(recipient_id)
    .bind(message)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;
    Ok(notification)
}

/// 알림 읽음 처리. 수신자 본인만 바꿀 수 있다.
pub async fn mark_notification_read(
    tx: &mut Transaction<'_, Postgres>,
    notification_id: i64,
    requester_id: i64,
) -> Result<Notification, CoreError> {
    let notification = sqlx::query_as::<_, Notification>(
        "SELECT id, recipient_id, message, read, created_at
         FROM notifications WHERE id = $1 FOR UPDATE",
    )
    .bind(notification_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(CoreError::NotFound("알림"))?;

    if notification.recipient_id != requester_id {
        return Err(CoreError::Unauthorized);
    }

    let notification = sqlx::query_as::<_, Notification>(
        "UPDATE notifications SET read = TRUE WHERE id = $1
         RETURNING id, recipient_id, message, read, created_at",
    )
    .bind(notification_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(notification)
}

// endregion: --- Notifications

// region:    --- Watchlist / Comments

/// 관심 목록 토글: 없으면 추가하고 true, 있으면 제거하고 false
pub async fn toggle_watch(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    listing_id: i64,
) -> Result<bool, CoreError> {
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM watchlist WHERE user_id = $1 AND listing_id = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(listing_id)
    .fetch_optional(&mut **tx)
    .await?;

    match existing {
        Some(entry_id) => {
            sqlx::query("DELETE FROM watchlist WHERE id = $1")
                .bind(entry_id)
                .execute(&mut **tx)
                .await?;
            Ok(false)
        }
        None => {
            sqlx::query("INSERT INTO watchlist (user_id, listing_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(listing_id)
                .execute(&mut **tx)
                .await?;
            Ok(true)
        }
    }
}

/// 댓글 추가
pub async fn insert_comment(
    tx: &mut Transaction<'_, Postgres>,
    listing_id: i64,
    author_id: i64,
    body: &str,
) -> Result<Comment, CoreError> {
    let comment = sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (listing_id, author_id, body, created_at)
         VALUES ($1, $2, $3, $4)
         RETURNING id, listing_id, author_id, body, created_at",
    )
    .bind(listing_id)
    .bind(author_id)
    .bind(body)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;
    Ok(comment)
}

// endregion: --- Watchlist / Comments

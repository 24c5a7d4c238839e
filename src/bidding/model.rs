use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// 경매 상품 모델
// current_price는 수락된 최고 입찰가와 항상 일치한다 (입찰이 없으면 starting_price)
#[derive(Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub current_price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub owner_id: i64,
    pub is_active: bool,
    pub winner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// 입찰 모델 (생성 후 불변, 추가 전용)
#[derive(Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

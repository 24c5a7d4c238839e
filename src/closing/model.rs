use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 알림 모델
// 경매 종료 시 낙찰자에게 생성되며, 읽음 표시는 수신자 본인만 바꾼다
#[derive(Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

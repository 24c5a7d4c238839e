/// 상품 등록/삭제와 부가 기능(관심 목록, 댓글, 알림 읽음) 커맨드 처리
// region:    --- Imports
use crate::bidding::commands::parse_amount;
use crate::bidding::model::Listing;
use crate::catalog::model::Comment;
use crate::closing::model::Notification;
use crate::database::DatabaseManager;
use crate::error::CoreError;
use crate::store;
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

// region:    --- Commands
/// 상품 등록 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateListingCommand {
    pub title: String,
    pub description: String,
    pub starting_price: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub owner_id: i64,
}

/// 상품 삭제 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeleteListingCommand {
    pub listing_id: i64,
    pub requester_id: i64,
}

/// 관심 목록 토글 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToggleWatchCommand {
    pub listing_id: i64,
    pub user_id: i64,
}

/// 댓글 작성 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AddCommentCommand {
    pub listing_id: i64,
    pub author_id: i64,
    pub body: String,
}

/// 알림 읽음 처리 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MarkNotificationReadCommand {
    pub notification_id: i64,
    pub requester_id: i64,
}

/// 상품 등록
/// 시작 가격은 입찰 금액과 같은 규칙으로 파싱하고, 현재 가격을 시작 가격으로 둔다.
pub async fn handle_create_listing(
    cmd: CreateListingCommand,
    db_manager: &DatabaseManager,
) -> Result<Listing, CoreError> {
    info!("{:<12} --> 상품 등록 요청: {:?}", "Catalog", cmd);

    let starting_price = parse_amount(cmd.starting_price.as_deref())?;

    db_manager
        .transaction(|tx| Box::pin(async move { store::insert_listing(tx, &cmd, starting_price).await }))
        .await
}

/// 상품 삭제
/// 소유자만 삭제할 수 있고, 입찰/댓글/관심 목록이 같은 트랜잭션에서 함께 삭제된다.
pub async fn handle_delete_listing(
    cmd: DeleteListingCommand,
    db_manager: &DatabaseManager,
) -> Result<(), CoreError> {
    info!("{:<12} --> 상품 삭제 요청: {:?}", "Catalog", cmd);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let listing = store::read_listing_for_update(tx, cmd.listing_id).await?;
                if listing.owner_id != cmd.requester_id {
                    return Err(CoreError::Unauthorized);
                }
                store::delete_listing_cascade(tx, cmd.listing_id).await
            })
        })
        .await
}

/// 관심 목록 토글. 추가되면 true, 제거되면 false를 돌려준다.
pub async fn handle_toggle_watch(
    cmd: ToggleWatchCommand,
    db_manager: &DatabaseManager,
) -> Result<bool, CoreError> {
    info!("{:<12} --> 관심 목록 토글: {:?}", "Catalog", cmd);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // 상품 존재 확인 후 토글
                store::read_listing_for_update(tx, cmd.listing_id).await?;
                store::toggle_watch(tx, cmd.user_id, cmd.listing_id).await
            })
        })
        .await
}

/// 댓글 작성
pub async fn handle_add_comment(
    cmd: AddCommentCommand,
    db_manager: &DatabaseManager,
) -> Result<Comment, CoreError> {
    info!("{:<12} --> 댓글 작성: listing_id {}", "Catalog", cmd.listing_id);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                store::read_listing_for_update(tx, cmd.listing_id).await?;
                store::insert_comment(tx, cmd.listing_id, cmd.author_id, &cmd.body).await
            })
        })
        .await
}

/// 알림 읽음 처리
pub async fn handle_mark_notification_read(
    cmd: MarkNotificationReadCommand,
    db_manager: &DatabaseManager,
) -> Result<Notification, CoreError> {
    info!("{:<12} --> 알림 읽음 처리: {:?}", "Catalog", cmd);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                store::mark_notification_read(tx, cmd.notification_id, cmd.requester_id).await
            })
        })
        .await
}
// endregion: --- Commands

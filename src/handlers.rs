// region:    --- Imports
use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
use crate::catalog::commands::{
    handle_add_comment, handle_create_listing as command_handle_create_listing,
    handle_delete_listing as command_handle_delete_listing, handle_mark_notification_read,
    handle_toggle_watch as command_handle_toggle_watch, AddCommentCommand, CreateListingCommand,
    DeleteListingCommand, MarkNotificationReadCommand, ToggleWatchCommand,
};
use crate::closing::commands::{handle_close_listing as command_handle_close, CloseListingCommand};
use crate::database::DatabaseManager;
use crate::error::CoreError;
use crate::identity::{IdentityProvider, PostgresIdentity};
use crate::query;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

/// 라우터 상태: 저장소 협력자와 사용자 식별 협력자
pub type AppState = (Arc<DatabaseManager>, Arc<PostgresIdentity>);

// region:    --- Error Presentation

/// 오류 표현은 뷰 계층이 결정한다. 코드와 메시지를 JSON 본문에 싣는다.
impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            CoreError::InvalidAmount | CoreError::BidTooLow { .. } => StatusCode::BAD_REQUEST,
            CoreError::UsernameTaken => StatusCode::BAD_REQUEST,
            CoreError::Unauthorized | CoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            CoreError::AlreadyClosed => StatusCode::CONFLICT,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        if let CoreError::BidTooLow { current_price } = &self {
            body["current_price"] = json!(current_price);
        }

        (status, Json(body)).into_response()
    }
}

// endregion: --- Error Presentation

// region:    --- Request Bodies

#[derive(Debug, Deserialize)]
pub struct CloseRequest {
    pub requester_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub requester_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct WatchRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub author_id: i64,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub requester_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// endregion: --- Request Bodies

// region:    --- Command Handlers

/// 입찰 요청 처리
/// 종료된 경매에 대한 안내는 입찰 원장을 부르기 전에 여기서 가로막는다.
pub async fn handle_bid(
    State((db_manager, _)): State<AppState>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Handler", cmd);

    let listing = query::handlers::get_listing(&db_manager, cmd.listing_id).await?;
    if !listing.is_active {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "종료된 경매에는 입찰할 수 없습니다.",
                "code": "LISTING_CLOSED"
            })),
        )
            .into_response());
    }

    let (listing, bid) = handle_place_bid(cmd, &db_manager).await?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "입찰이 성공적으로 처리되었습니다.",
            "bid_id": bid.id,
            "bid_amount": bid.amount,
            "current_price": listing.current_price
        })),
    )
        .into_response())
}

/// 경매 종료 요청 처리
pub async fn handle_close_listing(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
    Json(req): Json<CloseRequest>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 경매 종료 요청 id: {}", "Handler", listing_id);

    let cmd = CloseListingCommand {
        listing_id,
        requester_id: req.requester_id,
    };
    let listing = command_handle_close(cmd, &db_manager).await?;
    Ok(Json(listing).into_response())
}

/// 상품 등록 요청 처리
pub async fn handle_create_listing(
    State((db_manager, _)): State<AppState>,
    Json(cmd): Json<CreateListingCommand>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 상품 등록 요청: {}", "Handler", cmd.title);

    let listing = command_handle_create_listing(cmd, &db_manager).await?;
    Ok((StatusCode::CREATED, Json(listing)).into_response())
}

/// 상품 삭제 요청 처리 (명시적 연쇄 삭제)
pub async fn handle_delete_listing(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
    Json(req): Json<DeleteRequest>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 상품 삭제 요청 id: {}", "Handler", listing_id);

    let cmd = DeleteListingCommand {
        listing_id,
        requester_id: req.requester_id,
    };
    command_handle_delete_listing(cmd, &db_manager).await?;
    Ok(Json(json!({ "message": "상품이 삭제되었습니다." })).into_response())
}

/// 관심 목록 토글 요청 처리
pub async fn handle_toggle_watch(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
    Json(req): Json<WatchRequest>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 관심 목록 토글 id: {}", "Handler", listing_id);

    let cmd = ToggleWatchCommand {
        listing_id,
        user_id: req.user_id,
    };
    let watching = command_handle_toggle_watch(cmd, &db_manager).await?;
    Ok(Json(json!({ "watching": watching })).into_response())
}

/// 댓글 작성 요청 처리
pub async fn handle_post_comment(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 댓글 작성 요청 id: {}", "Handler", listing_id);

    let cmd = AddCommentCommand {
        listing_id,
        author_id: req.author_id,
        body: req.body,
    };
    let comment = handle_add_comment(cmd, &db_manager).await?;
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

/// 알림 읽음 처리 요청
pub async fn handle_read_notification(
    State((db_manager, _)): State<AppState>,
    Path(notification_id): Path<i64>,
    Json(req): Json<ReadRequest>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 알림 읽음 요청 id: {}", "Handler", notification_id);

    let cmd = MarkNotificationReadCommand {
        notification_id,
        requester_id: req.requester_id,
    };
    let notification = handle_mark_notification_read(cmd, &db_manager).await?;
    Ok(Json(notification).into_response())
}

/// 가입 요청 처리
pub async fn handle_register(
    State((_, identity)): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, CoreError> {
    let user = identity
        .register(&req.username, &req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// 로그인 요청 처리
pub async fn handle_login(
    State((_, identity)): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, CoreError> {
    let user = identity.authenticate(&req.username, &req.password).await?;
    Ok(Json(user).into_response())
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 상품 조회
pub async fn handle_get_listing(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 상품 조회 id: {}", "HandlerQuery", listing_id);
    let listing = query::handlers::get_listing(&db_manager, listing_id).await?;
    Ok(Json(listing).into_response())
}

/// 진행 중 상품 목록 조회
pub async fn handle_get_active_listings(
    State((db_manager, _)): State<AppState>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 진행 중 상품 목록 조회", "HandlerQuery");
    let listings = query::handlers::get_active_listings(&db_manager).await?;
    Ok(Json(listings).into_response())
}

/// 종료된 상품 목록 조회
pub async fn handle_get_closed_listings(
    State((db_manager, _)): State<AppState>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 종료된 상품 목록 조회", "HandlerQuery");
    let listings = query::handlers::get_closed_listings(&db_manager).await?;
    Ok(Json(listings).into_response())
}

/// 입찰 이력 조회
pub async fn handle_get_bid_history(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "HandlerQuery", listing_id);
    let history = query::handlers::get_bid_history(&db_manager, listing_id).await?;
    Ok(Json(history).into_response())
}

/// 최고 입찰가 조회
pub async fn handle_get_highest_bid(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Response, CoreError> {
    info!(
        "{:<12} --> 최고 입찰가 조회 id: {}",
        "HandlerQuery", listing_id
    );
    let highest = query::handlers::get_highest_bid(&db_manager, listing_id).await?;
    Ok(Json(json!({ "highest_bid": highest })).into_response())
}

/// 분류 목록 조회
pub async fn handle_get_categories(
    State((db_manager, _)): State<AppState>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 분류 목록 조회", "HandlerQuery");
    let categories = query::handlers::get_categories(&db_manager).await?;
    Ok(Json(categories).into_response())
}

/// 분류별 상품 목록 조회
pub async fn handle_get_category_listings(
    State((db_manager, _)): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<Response, CoreError> {
    info!(
        "{:<12} --> 분류별 상품 조회 id: {}",
        "HandlerQuery", category_id
    );
    let listings = query::handlers::get_category_listings(&db_manager, category_id).await?;
    Ok(Json(listings).into_response())
}

/// 댓글 목록 조회
pub async fn handle_get_comments(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 댓글 목록 조회 id: {}", "HandlerQuery", listing_id);
    let comments = query::handlers::get_comments(&db_manager, listing_id).await?;
    Ok(Json(comments).into_response())
}

/// 관심 목록 조회
pub async fn handle_get_watchlist(
    State((db_manager, _)): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 관심 목록 조회 user_id: {}", "HandlerQuery", user_id);
    let listings = query::handlers::get_watched_listings(&db_manager, user_id).await?;
    Ok(Json(listings).into_response())
}

/// 알림 목록 조회
pub async fn handle_get_notifications(
    State((db_manager, _)): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Response, CoreError> {
    info!("{:<12} --> 알림 목록 조회 user_id: {}", "HandlerQuery", user_id);
    let notifications = query::handlers::get_notifications(&db_manager, user_id).await?;
    Ok(Json(notifications).into_response())
}

// endregion: --- Query Handlers

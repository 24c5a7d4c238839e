// region:    --- Imports
use crate::database::DatabaseManager;
use crate::identity::PostgresIdentity;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod bidding;
mod catalog;
mod closing;
mod database;
mod error;
mod handlers;
mod identity;
mod query;
mod store;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new().await);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 사용자 식별 협력자 생성
    let identity = Arc::new(PostgresIdentity::new(db_manager.get_pool()));

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = Router::new()
        .route("/bid", post(handlers::handle_bid))
        .route(
            "/listings",
            get(handlers::handle_get_active_listings).post(handlers::handle_create_listing),
        )
        .route("/listings/closed", get(handlers::handle_get_closed_listings))
        .route(
            "/listings/:id",
            get(handlers::handle_get_listing).delete(handlers::handle_delete_listing),
        )
        .route("/listings/:id/close", post(handlers::handle_close_listing))
        .route("/listings/:id/bids", get(handlers::handle_get_bid_history))
        .route(
            "/listings/:id/highest-bid",
            get(handlers::handle_get_highest_bid),
        )
        .route(
            "/listings/:id/comments",
            get(handlers::handle_get_comments).post(handlers::handle_post_comment),
        )
        .route("/listings/:id/watch", post(handlers::handle_toggle_watch))
        .route("/categories", get(handlers::handle_get_categories))
        .route(
            "/categories/:id/listings",
            get(handlers::handle_get_category_listings),
        )
        .route("/users/:id/watchlist", get(handlers::handle_get_watchlist))
        .route(
            "/users/:id/notifications",
            get(handlers::handle_get_notifications),
        )
        .route(
            "/notifications/:id/read",
            post(handlers::handle_read_notification),
        )
        .route("/register", post(handlers::handle_register))
        .route("/login", post(handlers::handle_login))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 20)) // 동시성을 위한 바디 사이즈 증가(20MB)
        .with_state((db_manager, identity));

    // 리스너 생성(로컬 호스트의 3000번 포트를 사용)
    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main

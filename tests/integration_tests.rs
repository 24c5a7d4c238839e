use chrono::Utc;
use marketplace_service::bidding::model::Listing;
use marketplace_service::database::DatabaseManager;
use marketplace_service::query;
use reqwest::Client;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// 통합 테스트는 로컬에서 서버(0.0.0.0:3000)와 데이터베이스를 띄운 뒤
/// `cargo test -- --ignored` 로 실행한다.
const BASE_URL: &str = "http://localhost:3000";

/// 트레이싱 초기화
fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("트레이싱 구독자 설정 실패");
}

/// 데이터베이스 매니저 설정
async fn setup() -> Arc<DatabaseManager> {
    Arc::new(DatabaseManager::new().await)
}

/// 테스트용 사용자 생성
async fn create_test_user(db_manager: &DatabaseManager, name: &str) -> i64 {
    let username = format!("{}_{}", name, Utc::now().timestamp_micros());
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_scalar::<_, i64>(
                    "INSERT INTO users (username, email, password_digest, joined_at)
                     VALUES ($1, $2, $3, $4)
                     RETURNING id",
                )
                .bind(&username)
                .bind(format!("{}@example.com", username))
                .bind("digest")
                .bind(Utc::now())
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await
        .unwrap()
}

/// 테스트용 상품 생성
async fn create_test_listing(
    db_manager: &DatabaseManager,
    owner_id: i64,
    title: &str,
    starting_price: &str,
) -> Listing {
    let title = title.to_string();
    let starting_price = Decimal::from_str(starting_price).unwrap();
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(
                    "INSERT INTO listings (title, description, starting_price, current_price, owner_id, is_active, created_at)
                     VALUES ($1, $2, $3, $3, $4, TRUE, $5)
                     RETURNING id, title, description, starting_price, current_price, image_url, category_id, owner_id, is_active, winner_id, created_at",
                )
                .bind(&title)
                .bind("통합 테스트용 상품입니다.")
                .bind(starting_price)
                .bind(owner_id)
                .bind(Utc::now())
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await
        .unwrap()
}

/// 상품에 딸린 레코드 수 조회
async fn count_rows(db_manager: &DatabaseManager, table: &str, listing_id: i64) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE listing_id = $1", table);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_scalar::<_, i64>(&sql)
                    .bind(listing_id)
                    .fetch_one(&mut **tx)
                    .await
            })
        })
        .await
        .unwrap()
}

/// 입찰 테스트: 성공한 입찰 뒤 현재 가격이 입찰 금액과 일치해야 한다
#[tokio::test]
#[ignore = "로컬 서버와 데이터베이스가 필요합니다"]
async fn test_place_bid() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner_id = create_test_user(&db_manager, "seller").await;
    let bidder_id = create_test_user(&db_manager, "bidder").await;
    let listing = create_test_listing(&db_manager, owner_id, "입찰 테스트 상품", "10000.00").await;

    let bid_data = json!({
        "listing_id": listing.id,
        "bidder_id": bidder_id,
        "amount": "11000.00"
    });

    let response = client
        .post(format!("{}/bid", BASE_URL))
        .json(&bid_data)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let updated = query::handlers::get_listing(&db_manager, listing.id)
        .await
        .unwrap();
    assert_eq!(updated.current_price, Decimal::from_str("11000.00").unwrap());

    let history = query::handlers::get_bid_history(&db_manager, listing.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].bidder_id, bidder_id);
}

/// 입찰 검증 테스트: 현재 가격 이하(동률 포함)와 해석 불가 금액은 거절되고
/// 상태를 바꾸지 않아야 한다
#[tokio::test]
#[ignore = "로컬 서버와 데이터베이스가 필요합니다"]
async fn test_bid_validation() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner_id = create_test_user(&db_manager, "seller").await;
    let bidder_id = create_test_user(&db_manager, "bidder").await;
    let listing = create_test_listing(&db_manager, owner_id, "검증 테스트 상품", "90.00").await;

    // 시작 가격과 같은 금액은 거절
    let response = client
        .post(format!("{}/bid", BASE_URL))
        .json(&json!({
            "listing_id": listing.id,
            "bidder_id": bidder_id,
            "amount": "90.00"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "BID_TOO_LOW");

    // 해석할 수 없는 금액은 거절
    let response = client
        .post(format!("{}/bid", BASE_URL))
        .json(&json!({
            "listing_id": listing.id,
            "bidder_id": bidder_id,
            "amount": "구십원"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_AMOUNT");

    // 금액이 없는 요청도 거절
    let response = client
        .post(format!("{}/bid", BASE_URL))
        .json(&json!({
            "listing_id": listing.id,
            "bidder_id": bidder_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 상태가 바뀌지 않았는지 확인
    let unchanged = query::handlers::get_listing(&db_manager, listing.id)
        .await
        .unwrap();
    assert_eq!(unchanged.current_price, Decimal::from_str("90.00").unwrap());
    let history = query::handlers::get_bid_history(&db_manager, listing.id)
        .await
        .unwrap();
    assert!(history.is_empty());
}

/// 경매 종료 테스트: 최고 입찰자가 낙찰자가 되고 알림이 정확히 한 건 생성된다
#[tokio::test]
#[ignore = "로컬 서버와 데이터베이스가 필요합니다"]
async fn test_close_listing_with_bids() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner_id = create_test_user(&db_manager, "seller").await;
    let bidder_a = create_test_user(&db_manager, "bidder_a").await;
    let bidder_b = create_test_user(&db_manager, "bidder_b").await;
    let listing = create_test_listing(&db_manager, owner_id, "종료 테스트 상품", "5.00").await;

    // A가 10.00, B가 15.00 입찰
    for (bidder_id, amount) in [(bidder_a, "10.00"), (bidder_b, "15.00")] {
        let response = client
            .post(format!("{}/bid", BASE_URL))
            .json(&json!({
                "listing_id": listing.id,
                "bidder_id": bidder_id,
                "amount": amount
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
    }

    // 소유자가 아니면 종료할 수 없다
    let response = client
        .post(format!("{}/listings/{}/close", BASE_URL, listing.id))
        .json(&json!({ "requester_id": bidder_a }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 소유자 종료: 낙찰자는 B
    let response = client
        .post(format!("{}/listings/{}/close", BASE_URL, listing.id))
        .json(&json!({ "requester_id": owner_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let closed = query::handlers::get_listing(&db_manager, listing.id)
        .await
        .unwrap();
    assert!(!closed.is_active);
    assert_eq!(closed.winner_id, Some(bidder_b));

    // 낙찰자에게 알림 한 건, 메시지에 낙찰 금액 포함
    let notifications = query::handlers::get_notifications(&db_manager, bidder_b)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].message.contains("15.00"));
    assert!(notifications[0].message.contains("종료 테스트 상품"));
    assert!(!notifications[0].read);

    // 중복 종료는 거절되고 낙찰자는 그대로
    let response = client
        .post(format!("{}/listings/{}/close", BASE_URL, listing.id))
        .json(&json!({ "requester_id": owner_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "ALREADY_CLOSED");

    let unchanged = query::handlers::get_listing(&db_manager, listing.id)
        .await
        .unwrap();
    assert_eq!(unchanged.winner_id, Some(bidder_b));
    let notifications = query::handlers::get_notifications(&db_manager, bidder_b)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);

    // 종료된 경매에는 입찰할 수 없다 (뷰 계층에서 가로막는다)
    let response = client
        .post(format!("{}/bid", BASE_URL))
        .json(&json!({
            "listing_id": listing.id,
            "bidder_id": bidder_a,
            "amount": "20.00"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "LISTING_CLOSED");

    // 낙찰자가 알림 읽음 처리, 다른 사용자는 불가
    let notification_id = notifications[0].id;
    let response = client
        .post(format!("{}/notifications/{}/read", BASE_URL, notification_id))
        .json(&json!({ "requester_id": bidder_a }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(format!("{}/notifications/{}/read", BASE_URL, notification_id))
        .json(&json!({ "requester_id": bidder_b }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let notifications = query::handlers::get_notifications(&db_manager, bidder_b)
        .await
        .unwrap();
    assert!(notifications[0].read);
}

/// 입찰 없는 경매 종료: 낙찰자 없이 비활성으로 바뀌고 알림은 생성되지 않는다
#[tokio::test]
#[ignore = "로컬 서버와 데이터베이스가 필요합니다"]
async fn test_close_listing_without_bids() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner_id = create_test_user(&db_manager, "seller").await;
    let listing = create_test_listing(&db_manager, owner_id, "입찰 없는 상품", "5.00").await;

    let response = client
        .post(format!("{}/listings/{}/close", BASE_URL, listing.id))
        .json(&json!({ "requester_id": owner_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let closed = query::handlers::get_listing(&db_manager, listing.id)
        .await
        .unwrap();
    assert!(!closed.is_active);
    assert_eq!(closed.winner_id, None);
    assert_eq!(
        closed.current_price,
        Decimal::from_str("5.00").unwrap()
    );

    let notifications = query::handlers::get_notifications(&db_manager, owner_id)
        .await
        .unwrap();
    assert!(notifications.is_empty());
}

/// 동시성 입찰 테스트: 모든 입찰이 직렬화되고 최종 가격은 성공한 입찰의 최고가와 같다
#[tokio::test]
#[ignore = "로컬 서버와 데이터베이스가 필요합니다"]
async fn test_concurrent_bidding() {
    init_tracing();

    let db_manager = setup().await;

    let owner_id = create_test_user(&db_manager, "seller").await;
    let bidder_id = create_test_user(&db_manager, "bidder").await;
    let listing = create_test_listing(&db_manager, owner_id, "동시성 테스트 상품", "10000.00").await;

    // 50개의 동시 입찰 생성
    let mut handles = vec![];
    for i in 1..=50i64 {
        let client = reqwest::Client::new();
        let amount = format!("{}.00", 10000 + i * 1000);
        let listing_id = listing.id;

        let handle = tokio::spawn(async move {
            let bid_data = json!({
                "listing_id": listing_id,
                "bidder_id": bidder_id,
                "amount": amount
            });

            let response = client
                .post(format!("{}/bid", BASE_URL))
                .header("Content-Type", "application/json")
                .json(&bid_data)
                .send()
                .await
                .unwrap();

            let status = response.status();
            let body = response.text().await.unwrap();
            (status, body)
        });

        handles.push(handle);
    }

    // 모든 입찰 처리 대기 및 결과 확인
    let mut successful_bids = 0;
    let mut failed_bids = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        if status == StatusCode::OK {
            successful_bids += 1;
        } else if status == StatusCode::BAD_REQUEST {
            let error_info: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(error_info["code"], "BID_TOO_LOW");
            failed_bids += 1;
        } else {
            panic!("예상하지 못한 응답: {} {}", status, body);
        }
    }

    info!(
        "성공한 입찰 수: {}, 실패한 입찰 수: {}",
        successful_bids, failed_bids
    );
    assert_eq!(successful_bids + failed_bids, 50);
    // 최고 금액 입찰은 어떤 순서로 잠금을 얻어도 항상 성공한다
    assert!(successful_bids >= 1);

    // 최종 가격 = 최고 입찰가
    let updated = query::handlers::get_listing(&db_manager, listing.id)
        .await
        .unwrap();
    assert_eq!(updated.current_price, Decimal::from_str("60000.00").unwrap());

    // 수락된 입찰 금액은 시간순으로 순증가해야 한다
    let mut history = query::handlers::get_bid_history(&db_manager, listing.id)
        .await
        .unwrap();
    history.reverse();
    assert_eq!(history.len(), successful_bids);
    for pair in history.windows(2) {
        assert!(pair[0].amount < pair[1].amount);
    }

    // 현재 가격은 기록된 최고 입찰가와 일치한다
    let highest = query::handlers::get_highest_bid(&db_manager, listing.id)
        .await
        .unwrap();
    assert_eq!(highest, Some(updated.current_price));
}

/// 상품 삭제 테스트: 입찰, 댓글, 관심 목록이 명시적으로 함께 삭제된다
#[tokio::test]
#[ignore = "로컬 서버와 데이터베이스가 필요합니다"]
async fn test_delete_listing_cascade() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner_id = create_test_user(&db_manager, "seller").await;
    let bidder_id = create_test_user(&db_manager, "bidder").await;
    let listing = create_test_listing(&db_manager, owner_id, "삭제 테스트 상품", "100.00").await;

    // 입찰, 댓글, 관심 목록 레코드 생성
    client
        .post(format!("{}/bid", BASE_URL))
        .json(&json!({
            "listing_id": listing.id,
            "bidder_id": bidder_id,
            "amount": "150.00"
        }))
        .send()
        .await
        .expect("Failed to send request");
    client
        .post(format!("{}/listings/{}/comments", BASE_URL, listing.id))
        .json(&json!({ "author_id": bidder_id, "body": "좋은 상품이네요." }))
        .send()
        .await
        .expect("Failed to send request");
    client
        .post(format!("{}/listings/{}/watch", BASE_URL, listing.id))
        .json(&json!({ "user_id": bidder_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(count_rows(&db_manager, "bids", listing.id).await, 1);
    assert_eq!(count_rows(&db_manager, "comments", listing.id).await, 1);
    assert_eq!(count_rows(&db_manager, "watchlist", listing.id).await, 1);

    // 소유자가 아니면 삭제할 수 없다
    let response = client
        .delete(format!("{}/listings/{}", BASE_URL, listing.id))
        .json(&json!({ "requester_id": bidder_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 소유자 삭제: 딸린 레코드가 모두 사라진다
    let response = client
        .delete(format!("{}/listings/{}", BASE_URL, listing.id))
        .json(&json!({ "requester_id": owner_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    assert_eq!(count_rows(&db_manager, "bids", listing.id).await, 0);
    assert_eq!(count_rows(&db_manager, "comments", listing.id).await, 0);
    assert_eq!(count_rows(&db_manager, "watchlist", listing.id).await, 0);

    let response = client
        .get(format!("{}/listings/{}", BASE_URL, listing.id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// 가입/로그인 테스트
#[tokio::test]
#[ignore = "로컬 서버와 데이터베이스가 필요합니다"]
async fn test_register_and_login() {
    let client = Client::new();
    let username = format!("user_{}", Utc::now().timestamp_micros());

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "username": username.as_str(),
            "email": format!("{}@example.com", username),
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    // 같은 사용자 이름으로는 가입할 수 없다
    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "username": username.as_str(),
            "email": "other@example.com",
            "password": "secret2"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "USERNAME_TAKEN");

    // 올바른 비밀번호로 로그인
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "username": username.as_str(), "password": "secret" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], username.as_str());
    // 비밀번호 다이제스트는 응답에 실리지 않는다
    assert!(body.get("password_digest").is_none());

    // 잘못된 비밀번호는 거절
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "username": username.as_str(), "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// 관심 목록 토글 테스트
#[tokio::test]
#[ignore = "로컬 서버와 데이터베이스가 필요합니다"]
async fn test_watchlist_toggle() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner_id = create_test_user(&db_manager, "seller").await;
    let watcher_id = create_test_user(&db_manager, "watcher").await;
    let listing = create_test_listing(&db_manager, owner_id, "관심 목록 상품", "10.00").await;

    // 토글: 추가
    let response = client
        .post(format!("{}/listings/{}/watch", BASE_URL, listing.id))
        .json(&json!({ "user_id": watcher_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["watching"], true);

    let watched = query::handlers::get_watched_listings(&db_manager, watcher_id)
        .await
        .unwrap();
    assert!(watched.iter().any(|l| l.id == listing.id));

    // 토글: 제거
    let response = client
        .post(format!("{}/listings/{}/watch", BASE_URL, listing.id))
        .json(&json!({ "user_id": watcher_id }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["watching"], false);

    let watched = query::handlers::get_watched_listings(&db_manager, watcher_id)
        .await
        .unwrap();
    assert!(!watched.iter().any(|l| l.id == listing.id));
}

/// 댓글 테스트
#[tokio::test]
#[ignore = "로컬 서버와 데이터베이스가 필요합니다"]
async fn test_comments() {
    let db_manager = setup().await;
    let client = Client::new();

    let owner_id = create_test_user(&db_manager, "seller").await;
    let author_id = create_test_user(&db_manager, "commenter").await;
    let listing = create_test_listing(&db_manager, owner_id, "댓글 테스트 상품", "10.00").await;

    let response = client
        .post(format!("{}/listings/{}/comments", BASE_URL, listing.id))
        .json(&json!({ "author_id": author_id, "body": "실물 사진이 더 있을까요?" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let comments = query::handlers::get_comments(&db_manager, listing.id)
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author_id, author_id);
    assert_eq!(comments[0].body, "실물 사진이 더 있을까요?");
}

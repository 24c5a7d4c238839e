/// 상품 조회
pub const GET_LISTING: &str = "SELECT id, title, description, starting_price, current_price, image_url, category_id, owner_id, is_active, winner_id, created_at FROM listings WHERE id = $1";

/// 진행 중 상품 목록
pub const GET_ACTIVE_LISTINGS: &str = "SELECT id, title, description, starting_price, current_price, image_url, category_id, owner_id, is_active, winner_id, created_at FROM listings WHERE is_active = TRUE ORDER BY created_at DESC";

/// 종료된 상품 목록
pub const GET_CLOSED_LISTINGS: &str = "SELECT id, title, description, starting_price, current_price, image_url, category_id, owner_id, is_active, winner_id, created_at FROM listings WHERE is_active = FALSE ORDER BY created_at DESC";

/// 분류별 진행 중 상품 목록
pub const GET_CATEGORY_LISTINGS: &str = "SELECT id, title, description, starting_price, current_price, image_url, category_id, owner_id, is_active, winner_id, created_at FROM listings WHERE category_id = $1 AND is_active = TRUE ORDER BY created_at DESC";

/// 최고 입찰가 조회
pub const GET_HIGHEST_BID: &str =
    "SELECT MAX(amount) as highest_bid FROM bids WHERE listing_id = $1";

/// 입찰 이력 조회 (최신순)
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, listing_id, bidder_id, amount, created_at
    FROM bids
    WHERE listing_id = $1
    ORDER BY created_at DESC
"#;

/// 분류 목록
pub const GET_CATEGORIES: &str = "SELECT id, name FROM categories ORDER BY name";

/// 댓글 목록 (작성순)
pub const GET_COMMENTS: &str = r#"
    SELECT id, listing_id, author_id, body, created_at
    FROM comments
    WHERE listing_id = $1
    ORDER BY created_at ASC
"#;

/// 관심 목록에 담긴 상품
pub const GET_WATCHED_LISTINGS: &str = r#"
    SELECT l.id, l.title, l.description, l.starting_price, l.current_price, l.image_url, l.category_id, l.owner_id, l.is_active, l.winner_id, l.created_at
    FROM listings l
    JOIN watchlist w ON w.listing_id = l.id
    WHERE w.user_id = $1
    ORDER BY l.created_at DESC
"#;

/// 사용자 알림 목록 (최신순)
pub const GET_NOTIFICATIONS: &str = r#"
    SELECT id, recipient_id, message, read, created_at
    FROM notifications
    WHERE recipient_id = $1
    ORDER BY created_at DESC
"#;

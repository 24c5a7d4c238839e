/// 입찰 원장 커맨드 처리
/// 현재 가격 확인, 입찰 기록 추가, 가격 갱신을 하나의 트랜잭션으로 처리한다.
// region:    --- Imports
use crate::bidding::model::{Bid, Listing};
use crate::database::DatabaseManager;
use crate::error::CoreError;
use crate::store;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;
// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: Option<String>,
}

/// 입찰 금액 파싱. 저장소 접근 전에 수행한다.
/// 금액이 없거나, 숫자가 아니거나, 음수면 InvalidAmount.
pub fn parse_amount(raw: Option<&str>) -> Result<Decimal, CoreError> {
    let raw = raw.ok_or(CoreError::InvalidAmount)?;
    let amount = Decimal::from_str(raw.trim()).map_err(|_| CoreError::InvalidAmount)?;
    if amount.is_sign_negative() {
        return Err(CoreError::InvalidAmount);
    }
    Ok(amount)
}

/// 입찰 처리
/// 상품 행 잠금 아래에서 가격 확인과 두 건의 쓰기(입찰 추가, 가격 갱신)가 함께
/// 커밋되거나 함께 롤백된다. 같은 상품에 대한 동시 입찰은 잠금에서 직렬화되어
/// 두 번째 입찰은 갱신된 가격을 다시 읽는다.
/// 경매 진행 여부(is_active)에 대한 안내는 호출자(뷰 계층)의 책임이고,
/// 여기서는 잠금 획득 시점에 이미 종료된 상품에 대한 입찰만 거절한다.
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    db_manager: &DatabaseManager,
) -> Result<(Listing, Bid), CoreError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    let amount = parse_amount(cmd.amount.as_deref())?;

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // 상품 행 잠금: 같은 상품의 입찰-입찰, 입찰-종료를 상호 배제한다
                let listing = store::read_listing_for_update(tx, cmd.listing_id).await?;

                // 잠금을 얻고 보니 이미 종료된 경우 (종료와의 경합)
                if !listing.is_active {
                    return Err(CoreError::AlreadyClosed);
                }

                // 현재 가격 = 최고 입찰가, 입찰이 없으면 시작 가격
                let current_price = store::max_bid_amount(tx, cmd.listing_id)
                    .await?
                    .unwrap_or(listing.starting_price);

                // 현재 가격 이하의 입찰은 거절 (동률 포함)
                if amount <= current_price {
                    info!(
                        "{:<12} --> 입찰 거절: {} <= 현재 가격 {}",
                        "Command", amount, current_price
                    );
                    return Err(CoreError::BidTooLow { current_price });
                }

                let bid = store::append_bid(tx, cmd.listing_id, cmd.bidder_id, amount).await?;
                let listing = store::update_listing_price(tx, cmd.listing_id, amount).await?;

                info!(
                    "{:<12} --> 입찰 성공: 현재 가격 {}",
                    "Command", listing.current_price
                );
                Ok((listing, bid))
            })
        })
        .await
}
// endregion: --- Commands

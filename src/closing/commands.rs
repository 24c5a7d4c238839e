/// 경매 종료 커맨드 처리
/// 소유자 확인, 낙찰자 결정, 알림 생성이 하나의 트랜잭션으로 처리된다.
// region:    --- Imports
use crate::bidding::model::Listing;
use crate::database::DatabaseManager;
use crate::error::CoreError;
use crate::store;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

// region:    --- Commands
/// 경매 종료 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CloseListingCommand {
    pub listing_id: i64,
    pub requester_id: i64,
}

/// 낙찰 알림 메시지 (상품 제목과 낙찰 금액 포함)
pub fn winner_message(title: &str, amount: Decimal) -> String {
    format!(
        "축하합니다! '{}' 경매에 {} 금액으로 낙찰되었습니다.",
        title, amount
    )
}

/// 경매 종료 처리
/// 상품 행 잠금 아래에서 낙찰자 결정과 상태 변경, 알림 생성이 함께 커밋된다.
/// 도중 실패 시 상품은 종료 이전(진행 중) 상태로 남는다.
/// 잠금은 종료와 동시 입찰을 상호 배제하므로, 종료 결정 이후 들어온 입찰은
/// 종료된 상품에 대한 입찰로 거절된다.
pub async fn handle_close_listing(
    cmd: CloseListingCommand,
    db_manager: &DatabaseManager,
) -> Result<Listing, CoreError> {
    info!("{:<12} --> 경매 종료 요청 처리 시작: {:?}", "Command", cmd);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let listing = store::read_listing_for_update(tx, cmd.listing_id).await?;

                // 소유자만 종료할 수 있다
                if listing.owner_id != cmd.requester_id {
                    return Err(CoreError::Unauthorized);
                }

                // 이미 종료된 경매는 거절한다 (중복 낙찰 방지)
                if !listing.is_active {
                    return Err(CoreError::AlreadyClosed);
                }

                // 최고 입찰 선택: 금액 내림차순, 동률이면 먼저 들어온 입찰
                let top_bid = store::top_bid(tx, cmd.listing_id).await?;
                let winner_id = top_bid.as_ref().map(|bid| bid.bidder_id);

                let listing = store::finalize_listing(tx, cmd.listing_id, winner_id).await?;

                // 낙찰자가 있으면 알림을 정확히 한 건 생성한다
                if let Some(bid) = top_bid {
                    store::create_notification(
                        tx,
                        bid.bidder_id,
                        &winner_message(&listing.title, bid.amount),
                    )
                    .await?;
                    info!(
                        "{:<12} --> 낙찰자 {} 결정, 낙찰가 {}",
                        "Command", bid.bidder_id, bid.amount
                    );
                } else {
                    info!("{:<12} --> 입찰 없이 종료, 낙찰자 없음", "Command");
                }

                Ok(listing)
            })
        })
        .await
}
// endregion: --- Commands

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    /// 알림 메시지에 상품 제목과 낙찰 금액이 들어가야 한다
    #[test]
    fn test_winner_message_contents() {
        let message = winner_message("빈티지 카메라", Decimal::from_str("15.00").unwrap());
        assert!(message.contains("빈티지 카메라"));
        assert!(message.contains("15.00"));
    }

    /// NUMERIC(10,2)에서 읽은 금액의 소수 자릿수가 메시지에 유지되어야 한다
    #[test]
    fn test_winner_message_keeps_scale() {
        let message = winner_message("t", Decimal::new(1500, 2));
        assert!(message.contains("15.00"));
    }
}

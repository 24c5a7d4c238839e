use rust_decimal::Decimal;
use thiserror::Error;

/// 핵심 작업에서 호출자에게 그대로 반환되는 오류
/// 재시도는 이 계층에서 하지 않는다. 저장소 오류는 변형 없이 전파한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 입찰 금액이 없거나 해석할 수 없음
    #[error("입찰 금액을 해석할 수 없습니다.")]
    InvalidAmount,

    /// 입찰 금액이 현재 가격 이하 (동률도 거절)
    #[error("입찰 금액이 현재 가격보다 높아야 합니다. (현재 가격: {current_price})")]
    BidTooLow { current_price: Decimal },

    /// 소유자가 아닌 사용자의 요청
    #[error("권한이 없습니다.")]
    Unauthorized,

    /// 이미 종료된 경매 (중복 종료 방지)
    #[error("경매가 이미 종료되었습니다.")]
    AlreadyClosed,

    /// 대상 레코드 없음
    #[error("{0}을(를) 찾을 수 없습니다.")]
    NotFound(&'static str),

    /// 잘못된 사용자 이름 또는 비밀번호
    #[error("사용자 이름 또는 비밀번호가 올바르지 않습니다.")]
    InvalidCredentials,

    /// 이미 사용 중인 사용자 이름
    #[error("이미 사용 중인 사용자 이름입니다.")]
    UsernameTaken,

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl CoreError {
    /// 뷰 계층의 오류 응답에 실리는 코드
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidAmount => "INVALID_AMOUNT",
            CoreError::BidTooLow { .. } => "BID_TOO_LOW",
            CoreError::Unauthorized => "UNAUTHORIZED",
            CoreError::AlreadyClosed => "ALREADY_CLOSED",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::InvalidCredentials => "INVALID_CREDENTIALS",
            CoreError::UsernameTaken => "USERNAME_TAKEN",
            CoreError::Store(_) => "STORE_ERROR",
        }
    }
}

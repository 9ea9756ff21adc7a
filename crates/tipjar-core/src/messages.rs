//! User-facing text, per locale.

use serde::{Deserialize, Serialize};

/// Display language of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    #[default]
    English,
    /// Korean
    Korean,
}

/// Message catalogue for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    /// Locale of this catalogue
    pub locale: Locale,
    /// Tip input is missing or not a positive number
    pub invalid_amount: &'static str,
    /// Tip submitted without a wallet session
    pub not_connected: &'static str,
    /// Submission failed and the collaborator gave no message
    pub submission_fallback: &'static str,
    /// Connection failed and the collaborator gave no message
    pub connection_fallback: &'static str,
    /// Requested connector is not offered
    pub connector_unavailable: &'static str,
    /// Disconnect failed and the collaborator gave no message
    pub disconnect_fallback: &'static str,
    /// Balance placeholder
    pub loading: &'static str,
    /// Shown while a connection handshake runs
    pub connecting: &'static str,
    /// Status labels: disconnected, connecting, connected, error
    pub status_labels: [&'static str; 4],
    /// Section heading for account details
    pub account_heading: &'static str,
    /// Label for the status line
    pub status: &'static str,
    /// Label for the chain line
    pub chain_id: &'static str,
    /// Label for the short address line
    pub address: &'static str,
    /// Label for the full address
    pub full_address: &'static str,
    /// Label for the balance
    pub balance: &'static str,
    /// Section heading for connectors
    pub connect_heading: &'static str,
    /// Connect button template, `{name}` is replaced with the connector name
    pub connect_button: &'static str,
    /// Disconnect button
    pub disconnect: &'static str,
    /// Section heading for tipping
    pub tip_heading: &'static str,
    /// Label for the recipient
    pub recipient: &'static str,
    /// Label for the amount input, `{symbol}` is replaced with the currency symbol
    pub tip_amount: &'static str,
    /// Submit button
    pub send: &'static str,
    /// Submit button while pending
    pub sending: &'static str,
    /// Success banner
    pub success: &'static str,
    /// Label for the transaction hash
    pub tx_hash: &'static str,
    /// Label for errors
    pub error: &'static str,
    /// Shown instead of the tip form while disconnected
    pub connect_first: &'static str,
}

impl Messages {
    /// English catalogue
    pub const ENGLISH: Messages = Messages {
        locale: Locale::English,
        invalid_amount: "Please enter a valid amount.",
        not_connected: "Connect a wallet before sending a tip.",
        submission_fallback: "An error occurred while sending.",
        connection_fallback: "Could not connect to the wallet.",
        connector_unavailable: "That wallet is not available.",
        disconnect_fallback: "Could not disconnect the wallet.",
        loading: "Loading...",
        connecting: "Connecting...",
        status_labels: ["disconnected", "connecting", "connected", "error"],
        account_heading: "Account",
        status: "Status",
        chain_id: "Chain ID",
        address: "Address",
        full_address: "My wallet address",
        balance: "Current balance",
        connect_heading: "Connect a wallet",
        connect_button: "Connect {name}",
        disconnect: "Disconnect",
        tip_heading: "Send a tip",
        recipient: "Developer address",
        tip_amount: "Tip amount ({symbol})",
        send: "Send tip",
        sending: "Sending...",
        success: "Sent!",
        tx_hash: "Transaction hash",
        error: "Error",
        connect_first: "Connect a wallet to send a tip.",
    };

    /// Korean catalogue
    pub const KOREAN: Messages = Messages {
        locale: Locale::Korean,
        invalid_amount: "유효한 금액을 입력해주세요.",
        not_connected: "후원을 위해 지갑을 먼저 연결해주세요.",
        submission_fallback: "전송 중 오류가 발생했습니다.",
        connection_fallback: "지갑 연결 중 오류가 발생했습니다.",
        connector_unavailable: "사용할 수 없는 지갑입니다.",
        disconnect_fallback: "지갑 연결 해제 중 오류가 발생했습니다.",
        loading: "로딩 중...",
        connecting: "연결 중...",
        status_labels: ["disconnected", "connecting", "connected", "error"],
        account_heading: "계정 정보",
        status: "상태",
        chain_id: "체인 ID",
        address: "주소",
        full_address: "내 지갑 주소",
        balance: "현재 잔액",
        connect_heading: "지갑 연결하기",
        connect_button: "{name} 연결",
        disconnect: "연결 해제",
        tip_heading: "후원하기",
        recipient: "개발자 주소",
        tip_amount: "후원할 {symbol} 금액",
        send: "팁 보내기",
        sending: "전송 중...",
        success: "전송 성공!",
        tx_hash: "트랜잭션 해시",
        error: "오류",
        connect_first: "후원을 위해 지갑을 먼저 연결해주세요.",
    };

    /// Returns the catalogue for `locale`
    pub fn for_locale(locale: Locale) -> &'static Messages {
        match locale {
            Locale::English => &Self::ENGLISH,
            Locale::Korean => &Self::KOREAN,
        }
    }

    /// Label for a connector's connect button
    pub fn connect_label(&self, connector_name: &str) -> String {
        self.connect_button.replace("{name}", connector_name)
    }

    /// Label for the amount input
    pub fn tip_amount_label(&self, symbol: &str) -> String {
        self.tip_amount.replace("{symbol}", symbol)
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::ENGLISH
    }
}

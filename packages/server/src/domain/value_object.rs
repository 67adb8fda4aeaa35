//! 値オブジェクト
//!
//! 生成時にバリデーションを行い、不正な値がドメイン層に入り込まないようにします。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// RoomId の最大長
pub const ROOM_ID_MAX_LENGTH: usize = 128;
/// UserId の最大長
pub const USER_ID_MAX_LENGTH: usize = 128;
/// DisplayName の最大長
pub const DISPLAY_NAME_MAX_LENGTH: usize = 64;
/// DisplayName が与えられなかった場合の既定値
pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

/// Room の識別子
///
/// クライアントが指定する文字列で、サーバー側では生成しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        let length = value.chars().count();
        if length > ROOM_ID_MAX_LENGTH {
            return Err(ValueObjectError::RoomIdTooLong {
                max: ROOM_ID_MAX_LENGTH,
                actual: length,
            });
        }
        if value.chars().any(char::is_control) {
            return Err(ValueObjectError::RoomIdInvalidCharacter);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// トランスポート層の接続識別子
///
/// 接続ごとに一意で、切断時のクリーンアップはこの値を所有者キーとして行う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::ConnectionIdEmpty);
        }
        Ok(Self(value))
    }

    /// 新しい接続 ID を生成（UUID v4）
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// クライアントが名乗るユーザー ID（ベストエフォート）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::UserIdEmpty);
        }
        let length = value.chars().count();
        if length > USER_ID_MAX_LENGTH {
            return Err(ValueObjectError::UserIdTooLong {
                max: USER_ID_MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// ユーザー ID が与えられなかった場合は接続 ID をそのまま用いる
impl From<&ConnectionId> for UserId {
    fn from(connection_id: &ConnectionId) -> Self {
        Self(connection_id.as_str().to_string())
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 表示名（ベストエフォート、既定値は "Anonymous"）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    /// 前後の空白を取り除き、空なら "Anonymous" にする
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::anonymous());
        }
        let length = trimmed.chars().count();
        if length > DISPLAY_NAME_MAX_LENGTH {
            return Err(ValueObjectError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// `new` と同じく整形し、長すぎる場合はエラーにせず上限で切り詰める
    pub fn truncated(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Self::anonymous();
        }
        let truncated: String = trimmed.chars().take(DISPLAY_NAME_MAX_LENGTH).collect();
        Self(truncated.trim_end().to_string())
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS_DISPLAY_NAME.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for DisplayName {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// クライアントが申告する身元情報
///
/// どちらのフィールドも省略可能で、信頼はしない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<UserId>,
    pub display_name: Option<DisplayName>,
}

impl Identity {
    pub fn new(user_id: Option<UserId>, display_name: Option<DisplayName>) -> Self {
        Self {
            user_id,
            display_name,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// 表示名（未指定なら "Anonymous"）
    pub fn display_name_or_default(&self) -> DisplayName {
        self.display_name.clone().unwrap_or_default()
    }
}

/// Room の種別。作成時に決まり、状態の形を決定する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    /// コード共有（全文置き換え）
    #[serde(alias = "code")]
    Text,
    /// ホワイトボード（操作ログの追記）
    #[serde(alias = "whiteboard")]
    Drawing,
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomKind::Text => f.write_str("text"),
            RoomKind::Drawing => f.write_str("drawing"),
        }
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

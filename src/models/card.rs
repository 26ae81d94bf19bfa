use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::scan::session::Symbology;

/// Jenis reward pada kartu. Closed set, default cash discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CouponType {
    #[serde(rename = "cash discount")]
    CashDiscount,
    #[serde(rename = "percentage off")]
    PercentageOff,
    #[serde(rename = "buy one get one")]
    BuyOneGetOne,
    #[serde(rename = "free item")]
    FreeItem,
    #[serde(rename = "limited time offer")]
    LimitedTimeOffer,
}

impl CouponType {
    pub const ALL: [CouponType; 5] = [
        CouponType::CashDiscount,
        CouponType::PercentageOff,
        CouponType::BuyOneGetOne,
        CouponType::FreeItem,
        CouponType::LimitedTimeOffer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CouponType::CashDiscount => "cash discount",
            CouponType::PercentageOff => "percentage off",
            CouponType::BuyOneGetOne => "buy one get one",
            CouponType::FreeItem => "free item",
            CouponType::LimitedTimeOffer => "limited time offer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl Default for CouponType {
    fn default() -> Self {
        CouponType::CashDiscount
    }
}

/// Draft kartu yang sedang diedit user. Hanya hidup selama scan session
/// dalam keadaan locked; dibuang saat cancel, dipersist saat save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardDraft {
    pub vendor: String,
    pub coupon_type: CouponType,
    /// Input mentah dari form; baru diparse jadi angka saat save.
    pub reward_detail: String,
    pub description: String,
    pub expiration: DateTime<Utc>,
    pub barcode_payload: String,
    pub symbology: Symbology,
}

impl CardDraft {
    /// Draft baru dari kandidat scan. Expiration diisi `now` supaya user
    /// dipaksa menggesernya ke masa depan sebelum save.
    pub fn seeded(payload: String, symbology: Symbology, now: DateTime<Utc>) -> Self {
        Self {
            vendor: String::new(),
            coupon_type: CouponType::default(),
            reward_detail: String::new(),
            description: String::new(),
            expiration: now,
            barcode_payload: payload,
            symbology,
        }
    }
}

/// Struct dari database — untuk query_as.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DbCard {
    pub id: String,
    pub owner_id: i64,
    pub vendor: String,
    pub coupon_type: String,
    pub reward_amount: f64,
    pub description: String,
    pub expiration: String,
    pub barcode_payload: String,
    pub symbology: String,
    pub created_at: Option<String>,
}

/// Kartu yang dikirim ke frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub owner_id: i64,
    pub vendor: String,
    pub coupon_type: CouponType,
    pub reward_amount: f64,
    pub description: String,
    pub expiration: String,
    pub barcode_payload: String,
    pub symbology: String,
    pub created_at: Option<String>,
}

impl TryFrom<DbCard> for Card {
    type Error = AppError;

    fn try_from(c: DbCard) -> Result<Self, AppError> {
        let coupon_type = CouponType::parse(&c.coupon_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown coupon type in store: {}", c.coupon_type))
        })?;
        Ok(Self {
            id: c.id,
            owner_id: c.owner_id,
            vendor: c.vendor,
            coupon_type,
            reward_amount: c.reward_amount,
            description: c.description,
            expiration: c.expiration,
            barcode_payload: c.barcode_payload,
            symbology: c.symbology,
            created_at: c.created_at,
        })
    }
}

/// Kartu siap tampil: field record + label yang sudah diformat.
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: String,
    pub vendor: String,
    pub coupon_type: CouponType,
    pub reward_amount: f64,
    pub reward_label: String,
    pub type_label: String,
    pub icon: &'static str,
    pub description: String,
    pub expiration: String,
    pub barcode_payload: String,
    pub symbology: String,
    pub created_at: Option<String>,
}

impl From<Card> for CardView {
    fn from(c: Card) -> Self {
        Self {
            reward_label: crate::display::format_reward_amount(c.reward_amount, c.coupon_type),
            type_label: crate::display::format_coupon_type_label(c.coupon_type),
            icon: crate::display::icon_for_coupon_type(c.coupon_type),
            id: c.id,
            vendor: c.vendor,
            coupon_type: c.coupon_type,
            reward_amount: c.reward_amount,
            description: c.description,
            expiration: c.expiration,
            barcode_payload: c.barcode_payload,
            symbology: c.symbology,
            created_at: c.created_at,
        }
    }
}

/// Counter untuk layar profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardStats {
    pub scanned: i64,
    pub active: i64,
    pub expired: i64,
}

//! Presentasi kartu: formatting murni untuk layar home/profile.
//!
//! Semua fungsi deterministik dan bebas side effect; frontend hanya
//! menampilkan string yang sudah jadi.

use crate::models::card::CouponType;

/// Title-case setiap kata dari label coupon type.
/// "percentage off" -> "Percentage Off".
pub fn format_coupon_type_label(coupon_type: CouponType) -> String {
    coupon_type
        .as_str()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format nilai reward sesuai jenisnya: cash discount pakai "$" di
/// depan, percentage off pakai "%" di belakang, sisanya angka polos.
/// Selalu dua angka desimal.
pub fn format_reward_amount(amount: f64, coupon_type: CouponType) -> String {
    match coupon_type {
        CouponType::CashDiscount => format!("${:.2}", amount),
        CouponType::PercentageOff => format!("{:.2}%", amount),
        _ => format!("{:.2}", amount),
    }
}

/// Identifier ikon untuk tiap coupon type.
///
/// Limited time offer memakai "bookmark"; ikon "eye" yang dipakai salah
/// satu layar lama sudah diseragamkan.
pub fn icon_for_coupon_type(coupon_type: CouponType) -> &'static str {
    match coupon_type {
        CouponType::CashDiscount => "dollar",
        CouponType::PercentageOff => "percent",
        CouponType::BuyOneGetOne => "gift",
        CouponType::LimitedTimeOffer => "bookmark",
        CouponType::FreeItem => "tag",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupon_type_labels_are_title_cased() {
        assert_eq!(
            format_coupon_type_label(CouponType::BuyOneGetOne),
            "Buy One Get One"
        );
        assert_eq!(
            format_coupon_type_label(CouponType::PercentageOff),
            "Percentage Off"
        );
        assert_eq!(
            format_coupon_type_label(CouponType::CashDiscount),
            "Cash Discount"
        );
    }

    #[test]
    fn test_cash_discount_formats_as_currency() {
        assert_eq!(
            format_reward_amount(19.999, CouponType::CashDiscount),
            "$20.00"
        );
        assert_eq!(format_reward_amount(5.0, CouponType::CashDiscount), "$5.00");
    }

    #[test]
    fn test_percentage_off_formats_with_suffix() {
        assert_eq!(
            format_reward_amount(5.0, CouponType::PercentageOff),
            "5.00%"
        );
    }

    #[test]
    fn test_other_types_format_as_plain_number() {
        assert_eq!(format_reward_amount(2.5, CouponType::BuyOneGetOne), "2.50");
        assert_eq!(format_reward_amount(1.0, CouponType::FreeItem), "1.00");
        assert_eq!(
            format_reward_amount(3.0, CouponType::LimitedTimeOffer),
            "3.00"
        );
    }

    #[test]
    fn test_every_coupon_type_has_an_icon() {
        assert_eq!(icon_for_coupon_type(CouponType::CashDiscount), "dollar");
        assert_eq!(icon_for_coupon_type(CouponType::PercentageOff), "percent");
        assert_eq!(icon_for_coupon_type(CouponType::BuyOneGetOne), "gift");
        assert_eq!(icon_for_coupon_type(CouponType::LimitedTimeOffer), "bookmark");
        assert_eq!(icon_for_coupon_type(CouponType::FreeItem), "tag");
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let a = format_reward_amount(12.345, CouponType::PercentageOff);
        let b = format_reward_amount(12.345, CouponType::PercentageOff);
        assert_eq!(a, b);
    }
}

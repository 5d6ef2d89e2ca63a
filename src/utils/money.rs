use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use serde::Serializer;

/// Normalizes a monetary value to two decimal places, rounding half up.
/// Every amount is passed through here before it is written, so stored
/// figures and derived totals always carry the displayed precision.
pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Renders a monetary value with exactly two decimal places.
/// `BigDecimal`'s `Display` collapses zero to `"0"` regardless of scale,
/// so money fields serialize through this instead of `to_string`.
pub fn serialize_money<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{:.2}", value))
}

/// Converts a major-unit amount into integer minor units (cents), the
/// denomination the payment processor expects.
pub fn to_minor_units(value: &BigDecimal) -> Option<i64> {
    (value * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::str::FromStr;

    fn dec(raw: &str) -> BigDecimal {
        BigDecimal::from_str(raw).unwrap()
    }

    #[derive(Serialize)]
    struct Priced {
        #[serde(serialize_with = "crate::utils::money::serialize_money")]
        amount: BigDecimal,
    }

    fn rendered(amount: BigDecimal) -> serde_json::Value {
        serde_json::to_value(Priced { amount }).unwrap()["amount"].clone()
    }

    #[test]
    fn totals_keep_two_decimal_places() {
        let total = round_money(&(dec("100") + dec("8.5")));
        assert_eq!(rendered(total), "108.50");
    }

    #[test]
    fn zero_amounts_render_with_two_decimals() {
        assert_eq!(rendered(round_money(&dec("0"))), "0.00");
        assert_eq!(rendered(BigDecimal::from(0)), "0.00");
    }

    #[test]
    fn round_money_rounds_half_up() {
        assert_eq!(round_money(&dec("8.565")), dec("8.57"));
        assert_eq!(round_money(&dec("8.555")), dec("8.56"));
        assert_eq!(round_money(&dec("8.554")), dec("8.55"));
    }

    #[test]
    fn minor_units_are_exact_for_two_decimal_amounts() {
        assert_eq!(to_minor_units(&dec("108.50")), Some(10850));
        assert_eq!(to_minor_units(&dec("0.00")), Some(0));
        assert_eq!(to_minor_units(&dec("19.99")), Some(1999));
    }

    #[test]
    fn repeated_rounding_is_stable() {
        let once = round_money(&dec("42.125"));
        let twice = round_money(&once);
        assert_eq!(once, twice);
    }
}

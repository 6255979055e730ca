// src/utils/precision.rs
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Smallest quantity/price increment the exchange accepts (1e-8).
pub const EXCHANGE_STEP: Decimal = Decimal::from_parts(1, 0, 0, false, 8);

/// Rounds a quantity DOWN to the nearest multiple of step_size.
/// Example: amount=10.999, step=1.0 -> 10.0
pub fn normalize_quantity(amount: Decimal, step_size: Decimal) -> Decimal {
    if step_size.is_zero() {
        return amount;
    }
    ((amount / step_size).floor() * step_size).normalize()
}

/// Rounds a price to the NEAREST multiple of tick_size.
/// Example: price=100.16, tick=0.1 -> 100.2
pub fn normalize_price(price: Decimal, tick_size: Decimal) -> Decimal {
    if tick_size.is_zero() {
        return price;
    }
    ((price / tick_size).round() * tick_size).normalize()
}

/// Renders an f64 quantity as an exchange-safe decimal string, truncated
/// to the 1e-8 step. `None` for non-finite input or when nothing is left.
pub fn format_quantity(quantity: f64) -> Option<String> {
    let amount = Decimal::from_f64(quantity)?;
    let normalized = normalize_quantity(amount, EXCHANGE_STEP);
    if normalized <= Decimal::ZERO {
        return None;
    }
    Some(normalized.to_string())
}

pub fn format_price(price: f64) -> Option<String> {
    let price = Decimal::from_f64(price)?;
    let normalized = normalize_price(price, EXCHANGE_STEP);
    if normalized <= Decimal::ZERO {
        return None;
    }
    Some(normalized.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn quantity_rounds_down_to_step() {
        let step = Decimal::from_str("0.001").unwrap();
        let amount = Decimal::from_str("1.23456").unwrap();
        assert_eq!(normalize_quantity(amount, step), Decimal::from_str("1.234").unwrap());
    }

    #[test]
    fn price_rounds_to_nearest_tick() {
        let tick = Decimal::from_str("0.1").unwrap();
        let price = Decimal::from_str("100.16").unwrap();
        assert_eq!(normalize_price(price, tick), Decimal::from_str("100.2").unwrap());
    }

    #[test]
    fn zero_step_is_passthrough() {
        let amount = Decimal::from_str("3.14159").unwrap();
        assert_eq!(normalize_quantity(amount, Decimal::ZERO), amount);
    }

    #[test]
    fn formats_quantities_for_the_exchange() {
        assert_eq!(format_quantity(0.5).as_deref(), Some("0.5"));
        assert_eq!(format_quantity(0.123456789).as_deref(), Some("0.12345678"));
        assert_eq!(format_quantity(0.000000001), None);
        assert_eq!(format_quantity(f64::NAN), None);
        assert_eq!(format_price(45000.25).as_deref(), Some("45000.25"));
    }
}

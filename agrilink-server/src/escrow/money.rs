//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;
use shared::models::DemandMetric;

use super::traits::EscrowError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Delivery fee rate (2% of base price)
pub const DELIVERY_FEE_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// Platform fee rate (2% of base price)
pub const PLATFORM_FEE_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Upper bound for a listing's unit price
pub const MAX_UNIT_PRICE: f64 = 1_000_000_000.0;

/// Upper bound for listing stock and order quantity
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Convert f64 to Decimal for calculation
///
/// 仅用于已入库的金额；外部输入先经过 [`validate_listing_input`]。
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Strict conversion: `None` for NaN, infinities and values outside Decimal range
#[inline]
pub fn try_to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

/// Validate quantity and unit price of a new listing
///
/// The whole stock must be priceable, so every order against it is too.
pub fn validate_listing_input(quantity: i64, price_per_unit: f64) -> Result<(), EscrowError> {
    if quantity <= 0 || quantity > MAX_QUANTITY {
        return Err(EscrowError::InvalidQuantity(quantity));
    }
    if !price_per_unit.is_finite() || price_per_unit <= 0.0 || price_per_unit > MAX_UNIT_PRICE {
        return Err(EscrowError::InvalidPrice);
    }
    price_order(quantity, price_per_unit)?;
    Ok(())
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Price breakdown of one order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderPricing {
    pub base_price: f64,
    pub delivery_fee: f64,
    pub platform_fee: f64,
    pub total_price: f64,
}

/// base = quantity × unit price; total = base + delivery fee + platform fee
///
/// 单价无法精确表示为正的 Decimal 时返回 `InvalidPrice`，运算溢出同样拒绝。
pub fn price_order(quantity: i64, price_per_unit: f64) -> Result<OrderPricing, EscrowError> {
    let unit_price = try_to_decimal(price_per_unit)
        .filter(|p| *p > Decimal::ZERO)
        .ok_or(EscrowError::InvalidPrice)?;
    let base = Decimal::from(quantity)
        .checked_mul(unit_price)
        .ok_or(EscrowError::InvalidPrice)?;
    let fee = |rate: Decimal| {
        base.checked_mul(rate)
            .map(|f| f.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero))
            .ok_or(EscrowError::InvalidPrice)
    };
    let delivery_fee = fee(DELIVERY_FEE_RATE)?;
    let platform_fee = fee(PLATFORM_FEE_RATE)?;
    let total = base
        .checked_add(delivery_fee)
        .and_then(|t| t.checked_add(platform_fee))
        .ok_or(EscrowError::InvalidPrice)?;

    Ok(OrderPricing {
        base_price: to_f64(base),
        delivery_fee: to_f64(delivery_fee),
        platform_fee: to_f64(platform_fee),
        total_price: to_f64(total),
    })
}

/// balance + amount
pub fn credit(balance: f64, amount: f64) -> f64 {
    to_f64(to_decimal(balance).saturating_add(to_decimal(amount)))
}

/// balance - amount, floored at zero
pub fn debit_floored(balance: f64, amount: f64) -> f64 {
    let result = to_decimal(balance).saturating_sub(to_decimal(amount));
    to_f64(result.max(Decimal::ZERO))
}

/// Running average after adding one more sample, rounded to 2dp
pub fn running_average(current: f64, count: u32, sample: f64) -> f64 {
    let total = to_decimal(current) * Decimal::from(count) + to_decimal(sample);
    to_f64(total / Decimal::from(count + 1))
}

/// Record one more order of a crop at the given unit price
pub fn record_demand(metric: Option<&DemandMetric>, price_per_unit: f64) -> DemandMetric {
    match metric {
        Some(m) => {
            let count = u32::try_from(m.total_orders).unwrap_or(u32::MAX - 1);
            DemandMetric {
                total_orders: m.total_orders + 1,
                avg_price: running_average(m.avg_price, count, price_per_unit),
            }
        }
        None => DemandMetric {
            total_orders: 1,
            avg_price: to_f64(to_decimal(price_per_unit)),
        },
    }
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

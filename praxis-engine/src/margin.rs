/// Fee the clinic could pay while still hitting its target margin.
///
/// Removes everything the sale must cover (taxes, card fees, lab cost,
/// chair time at the capacity baseline, and the target profit slice) from
/// the price; whatever is left is the room for the professional's fee.
/// Never negative.
pub fn suggested_fee(
    sale_price: f64,
    taxes: f64,
    card_fees: f64,
    lab_cost: f64,
    minute_cost: f64,
    target_margin: f64,
) -> f64 {
    let committed = taxes + card_fees + lab_cost + minute_cost + target_margin * sale_price;
    (sale_price - committed).max(0.0)
}

/// Realized margin as a percentage of the sale price. Zero-price sales have
/// no margin to speak of.
pub fn actual_margin_percent(clinic_profit: f64, sale_price: f64) -> f64 {
    if sale_price == 0.0 {
        0.0
    } else {
        clinic_profit / sale_price * 100.0
    }
}

/// Coupon codes and the fixed per-product price they apply. Every product
/// in the party gets its price overwritten with this value; the previous
/// price is preserved in `original_price`.
const COUPONS: &[(&str, f64)] = &[("KICKOFF", 0.01)];

pub fn lookup(code: &str) -> Option<f64> {
    let code = code.trim().to_uppercase();
    COUPONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, price)| *price)
}

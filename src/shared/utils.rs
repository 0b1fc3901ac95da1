//! Utility functions and helpers

/// Derive a discount percentage from an original and a sale price,
/// rounded to one decimal place
pub fn derive_discount_percent(original_price: f64, price: f64) -> f64 {
    if original_price <= 0.0 {
        return 0.0;
    }
    let raw = (original_price - price) / original_price * 100.0;
    ((raw * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

/// Percentage distance between a price and a reference price
pub fn percent_diff(price: f64, reference: f64) -> f64 {
    if reference > 0.0 {
        (price - reference).abs() / reference * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_discount_percent() {
        assert_eq!(derive_discount_percent(60.0, 12.0), 80.0);
        assert_eq!(derive_discount_percent(29.99, 29.99), 0.0);
        // Rounded to one decimal
        assert_eq!(derive_discount_percent(59.99, 14.99), 75.0);
        // Unknown original price
        assert_eq!(derive_discount_percent(0.0, 12.0), 0.0);
        // Price above original clamps instead of going negative
        assert_eq!(derive_discount_percent(10.0, 12.0), 0.0);
    }

    #[test]
    fn test_percent_diff() {
        assert_eq!(percent_diff(9.5, 10.0), 5.0);
        assert_eq!(percent_diff(10.5, 10.0), 5.0);
        assert_eq!(percent_diff(10.0, 10.0), 0.0);
        assert_eq!(percent_diff(5.0, 0.0), 0.0);
    }
}

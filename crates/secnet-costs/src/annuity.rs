//! Annuity factors and the discount-rate rescaling of capital costs.

/// Asset lifetime assumed when rescaling capital costs (years).
///
/// Network components do not carry their technology lifetime, so every
/// component is rescaled as if it lived this long. The result is an
/// approximation of a full recomputation from investment costs.
pub const DEFAULT_ASSET_LIFETIME: f64 = 25.0;

/// Absolute difference below which a country rate counts as equal to the
/// global rate.
pub const RATE_TOLERANCE: f64 = 0.001;

/// Annuity factor converting a present investment into a constant annual
/// payment over `lifetime` years at `discount_rate`.
///
/// annuity = r / (1 - (1 + r)^-L), and 1 / L for r = 0.
pub fn annuity(lifetime: f64, discount_rate: f64) -> f64 {
    if discount_rate == 0.0 {
        return 1.0 / lifetime;
    }
    discount_rate / (1.0 - (1.0 + discount_rate).powf(-lifetime))
}

pub fn rates_differ(country_rate: f64, global_rate: f64) -> bool {
    (country_rate - global_rate).abs() > RATE_TOLERANCE
}

/// Factor applied to a capital cost built with `global_rate` so that it
/// reflects `country_rate` instead. Exactly 1 when the rates agree within
/// [`RATE_TOLERANCE`].
pub fn capital_cost_factor(country_rate: f64, global_rate: f64) -> f64 {
    if !rates_differ(country_rate, global_rate) {
        return 1.0;
    }
    annuity(DEFAULT_ASSET_LIFETIME, country_rate) / annuity(DEFAULT_ASSET_LIFETIME, global_rate)
}

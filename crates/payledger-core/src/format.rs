//! Currency display helpers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The only fiat currency the ledger displays.
pub const FIAT_CURRENCY: &str = "USD";

/// Exchange-rate data published alongside an upgraded wallet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateInfo {
    /// BAT→USD rate, as the ledger reports it (a decimal string).
    #[serde(default)]
    pub current_rate: Option<String>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

impl RateInfo {
    pub fn with_rate(rate: &str) -> Self {
        Self {
            current_rate: Some(rate.to_string()),
            rates: HashMap::new(),
        }
    }

    fn parsed_rate(&self) -> Option<f64> {
        self.current_rate.as_deref()?.trim().parse::<f64>().ok()
    }
}

/// Converts a BAT amount into a "12.34 USD" string.
///
/// Zero always renders as `0.00 USD`. Any other amount needs a parsable
/// `current_rate`; without one the result is empty.
pub fn bat_to_currency_string(bat: f64, rates: Option<&RateInfo>) -> String {
    if bat == 0.0 {
        return format!("0.00 {FIAT_CURRENCY}");
    }
    match rates.and_then(RateInfo::parsed_rate) {
        Some(rate) => format!("{:.2} {FIAT_CURRENCY}", bat * rate),
        None => String::new(),
    }
}

/// "5.00 BAT (1.12 USD)", or just "5.00 BAT" when no rate is known.
pub fn format_current_balance(balance: f64, converted: f64, has_rate: bool) -> String {
    if has_rate {
        format!("{balance:.2} BAT ({converted:.2} {FIAT_CURRENCY})")
    } else {
        format!("{balance:.2} BAT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_with_current_rate() {
        let mut rates = RateInfo::with_rate("2");
        rates.rates.insert("BTC".into(), 0.2222);
        assert_eq!(bat_to_currency_string(5.0, Some(&rates)), "10.00 USD");
    }

    #[test]
    fn zero_needs_no_rate() {
        assert_eq!(bat_to_currency_string(0.0, None), "0.00 USD");
        assert_eq!(
            bat_to_currency_string(0.0, Some(&RateInfo::with_rate("3"))),
            "0.00 USD"
        );
    }

    #[test]
    fn missing_rate_data_is_empty() {
        assert_eq!(bat_to_currency_string(5.0, None), "");
        assert_eq!(bat_to_currency_string(5.0, Some(&RateInfo::default())), "");
        assert_eq!(
            bat_to_currency_string(5.0, Some(&RateInfo::with_rate("n/a"))),
            ""
        );
    }

    #[test]
    fn balance_with_and_without_rate() {
        assert_eq!(
            format_current_balance(5.00003, 1.1234, true),
            "5.00 BAT (1.12 USD)"
        );
        assert_eq!(format_current_balance(5.00003, 1.1234, false), "5.00 BAT");
    }
}

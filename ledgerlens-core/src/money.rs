//! Locale-style currency formatting for display.

use serde::{Deserialize, Serialize};

/// Locale presets understood by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "de-DE")]
    DeDe,
    #[serde(rename = "en-US")]
    EnUs,
}

impl Locale {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "de-de" | "de" => Some(Locale::DeDe),
            "en-us" | "en" => Some(Locale::EnUs),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::DeDe => "de-DE",
            Locale::EnUs => "en-US",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub group_separator: char,
    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

impl CurrencyFormat {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::DeDe => Self {
                symbol: "€".to_string(),
                group_separator: '.',
                decimal_separator: ',',
            },
            Locale::EnUs => Self {
                symbol: "$".to_string(),
                group_separator: ',',
                decimal_separator: '.',
            },
        }
    }

    /// `€1.234,56`, `€-12,00`. Two fixed decimals, grouped thousands.
    pub fn format(&self, amount: f64) -> String {
        format!("{}{}", self.symbol, self.format_number(amount))
    }

    /// The number part only, without the currency symbol.
    pub fn format_number(&self, amount: f64) -> String {
        if !amount.is_finite() {
            return amount.to_string();
        }

        let cents = to_cents(amount);
        let negative = cents < 0;
        let cents = cents.unsigned_abs();
        let whole = (cents / 100).to_string();
        let frac = cents % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(ch);
        }

        format!(
            "{}{}{}{:02}",
            if negative { "-" } else { "" },
            grouped,
            self.decimal_separator,
            frac
        )
    }
}

/// Whole cents, half away from zero. An amount that displays as zero is zero here too.
pub fn to_cents(amount: f64) -> i128 {
    (amount * 100.0).round() as i128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_grouping_and_decimals() {
        let f = CurrencyFormat::default();
        assert_eq!(f.format(0.0), "€0,00");
        assert_eq!(f.format(5.5), "€5,50");
        assert_eq!(f.format(999.99), "€999,99");
        assert_eq!(f.format(1234.5), "€1.234,50");
        assert_eq!(f.format(1234567.891), "€1.234.567,89");
    }

    #[test]
    fn test_negative_keeps_sign() {
        let f = CurrencyFormat::default();
        assert_eq!(f.format(-1234.5), "€-1.234,50");
        assert_eq!(f.format(-0.004), "€0,00");
        assert_eq!(to_cents(-0.004), 0);
        assert_eq!(to_cents(-0.005), -1);
    }

    #[test]
    fn test_en_us_preset() {
        let f = CurrencyFormat::for_locale(Locale::EnUs);
        assert_eq!(f.format(1234567.5), "$1,234,567.50");
        assert_eq!(f.format_number(12.0), "12.00");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        let f = CurrencyFormat::default();
        assert_eq!(f.format(2.675_000_1), "€2,68");
        assert_eq!(f.format(-1.005_000_1), "€-1,01");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("de_DE"), Some(Locale::DeDe));
        assert_eq!(Locale::parse("EN-us"), Some(Locale::EnUs));
        assert_eq!(Locale::parse("fr-FR"), None);
        assert_eq!(Locale::EnUs.tag(), "en-US");
    }
}

//! # Money Formatting
//!
//! Locale-aware display strings for minor-unit amounts. Presentation only:
//! nothing here feeds back into the numeric engine in [`crate::money`].
//!
//! ```text
//!   format_money_minor(123450, "USD")                 → "$1,234.50"
//!   format_money_minor_in(123450, "SEK", Locale::SvSe) → "1 234,50 kr"
//!   format_money_minor_in(123450, "EUR", Locale::DeDe) → "1.234,50 €"
//! ```
//!
//! Every currency is rendered with two decimals, including currencies that
//! have none (JPY). This mirrors the engine's two-decimal assumption.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::MINOR_UNITS_PER_MAJOR;

/// No-break space, used by Swedish and German locales.
const NBSP: char = '\u{a0}';

/// Display locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "sv-SE")]
    SvSe,
    #[serde(rename = "de-DE")]
    DeDe,
}

struct LocaleRules {
    group: char,
    decimal: char,
    symbol_first: bool,
}

impl Locale {
    fn rules(&self) -> LocaleRules {
        match self {
            Locale::EnUs | Locale::EnGb => LocaleRules {
                group: ',',
                decimal: '.',
                symbol_first: true,
            },
            Locale::SvSe => LocaleRules {
                group: NBSP,
                decimal: ',',
                symbol_first: false,
            },
            Locale::DeDe => LocaleRules {
                group: '.',
                decimal: ',',
                symbol_first: false,
            },
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::EnGb => "en-GB",
            Locale::SvSe => "sv-SE",
            Locale::DeDe => "de-DE",
        }
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('_', "-").to_lowercase().as_str() {
            "en" | "en-us" => Ok(Locale::EnUs),
            "en-gb" => Ok(Locale::EnGb),
            "sv" | "sv-se" => Ok(Locale::SvSe),
            "de" | "de-de" => Ok(Locale::DeDe),
            other => Err(ValidationError::InvalidFormat {
                field: "locale".to_string(),
                reason: format!("unsupported locale '{}'", other),
            }),
        }
    }
}

/// Currency symbol for display, falling back to the ISO code.
fn symbol(currency_code: &str, locale: Locale) -> String {
    let code = currency_code.trim().to_uppercase();
    let symbol = match (code.as_str(), locale) {
        ("USD", _) => "$",
        ("EUR", _) => "€",
        ("GBP", _) => "£",
        ("JPY", _) => "¥",
        ("SEK" | "NOK" | "DKK", Locale::SvSe) => "kr",
        _ => return code,
    };
    symbol.to_string()
}

fn group_digits(mut major: u64, separator: char) -> String {
    let mut groups = Vec::new();
    loop {
        let group = major % 1000;
        major /= 1000;
        if major == 0 {
            groups.push(group.to_string());
            break;
        }
        groups.push(format!("{:03}", group));
    }
    groups.reverse();
    groups.join(&separator.to_string())
}

/// Formats an amount in the default locale (`en-US`).
///
/// ## Example
/// ```rust
/// use quill_core::format::format_money_minor;
///
/// assert_eq!(format_money_minor(123450, "USD"), "$1,234.50");
/// assert_eq!(format_money_minor(-999, "EUR"), "-€9.99");
/// assert_eq!(format_money_minor(123450, "SEK"), "SEK 1,234.50");
/// ```
pub fn format_money_minor(minor: i64, currency_code: &str) -> String {
    format_money_minor_in(minor, currency_code, Locale::default())
}

/// Formats an amount for a specific locale.
pub fn format_money_minor_in(minor: i64, currency_code: &str, locale: Locale) -> String {
    let rules = locale.rules();
    let symbol = symbol(currency_code, locale);

    let abs = minor.unsigned_abs();
    let per_major = MINOR_UNITS_PER_MAJOR as u64;
    let number = format!(
        "{}{}{:02}",
        group_digits(abs / per_major, rules.group),
        rules.decimal,
        abs % per_major
    );
    let sign = if minor < 0 { "-" } else { "" };

    if rules.symbol_first {
        // Codes get a space ("SEK 1.00"), symbols do not ("$1.00").
        let gap = if symbol.chars().count() > 1 && symbol.chars().all(|c| c.is_ascii_uppercase()) {
            " "
        } else {
            ""
        };
        format!("{}{}{}{}", sign, symbol, gap, number)
    } else {
        format!("{}{}{}{}", sign, number, NBSP, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_en_us() {
        assert_eq!(format_money_minor(0, "USD"), "$0.00");
        assert_eq!(format_money_minor(5, "USD"), "$0.05");
        assert_eq!(format_money_minor(100_000_000, "USD"), "$1,000,000.00");
        assert_eq!(format_money_minor(-123450, "GBP"), "-£1,234.50");
    }

    #[test]
    fn test_unknown_currency_uses_code() {
        assert_eq!(format_money_minor(2500, "chf"), "CHF 25.00");
    }

    #[test]
    fn test_swedish() {
        assert_eq!(
            format_money_minor_in(123450, "SEK", Locale::SvSe),
            "1\u{a0}234,50\u{a0}kr"
        );
        assert_eq!(
            format_money_minor_in(-50, "EUR", Locale::SvSe),
            "-0,50\u{a0}€"
        );
    }

    #[test]
    fn test_german() {
        assert_eq!(
            format_money_minor_in(123_456_789, "EUR", Locale::DeDe),
            "1.234.567,89\u{a0}€"
        );
    }

    #[test]
    fn test_group_digits_pads_inner_groups() {
        assert_eq!(group_digits(1_002_003, ','), "1,002,003");
        assert_eq!(group_digits(999, ','), "999");
        assert_eq!(group_digits(0, ','), "0");
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("sv_SE".parse::<Locale>().unwrap(), Locale::SvSe);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::EnUs);
        assert!("fr-FR".parse::<Locale>().is_err());
        assert_eq!(Locale::DeDe.tag(), "de-DE");
    }
}

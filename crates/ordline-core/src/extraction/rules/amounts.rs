//! Currency amount parsing.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::MONEY_LINE;

/// Parse a whole money line ("1 250,00 ₽", "75 ₽") into a decimal amount.
pub fn parse_money(line: &str) -> Option<Decimal> {
    let line = line.trim();
    let caps = MONEY_LINE.captures(line)?;
    let number_end = caps.get(2).or_else(|| caps.get(1))?.end();
    parse_amount(&line[..number_end])
}

/// Parse a locale-formatted amount without currency
/// (e.g., "1 234,56", "1234.56", "1.234,56").
pub fn parse_amount(s: &str) -> Option<Decimal> {
    // Remove spaces and non-breaking spaces
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else if cleaned.contains(',') && cleaned.contains('.') {
        // Whichever separator comes last is the decimal one
        let comma_pos = cleaned.rfind(',');
        let dot_pos = cleaned.rfind('.');
        match (comma_pos, dot_pos) {
            (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => cleaned.replace(',', ""),
            _ => cleaned,
        }
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("25.00 ₽"), Some(dec("25.00")));
        assert_eq!(parse_money("1 250,50 ₽"), Some(dec("1250.50")));
        assert_eq!(parse_money("75 ₽"), Some(dec("75")));
        assert_eq!(parse_money("1200руб."), Some(dec("1200")));
        assert_eq!(parse_money("Price 25 ₽"), None);
        assert_eq!(parse_money("25"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1 234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("₽"), None);
    }
}

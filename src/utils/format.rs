//! Display formatting for the dashboard panels.

pub const PLACEHOLDER: &str = "N/A";

/// Formats with a fixed number of decimals and `,` thousands separators.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // "-0.00" is not worth showing
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let sign = if value.is_sign_negative() && !is_zero { "-" } else { "" };
    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

pub fn format_usd(value: f64, decimals: usize) -> String {
    format!("${}", format_number(value, decimals))
}

/// Sub-dollar tokens get four decimals so the price is still readable.
pub fn price_decimals(price: f64) -> usize {
    if price.abs() >= 1.0 {
        2
    } else {
        4
    }
}

pub fn format_price(price: f64) -> String {
    format_usd(price, price_decimals(price))
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value, 2))
}

pub fn format_billions(value: f64) -> String {
    format!("${}B", format_number(value / 1e9, 2))
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(-52340.5, 2), "-52,340.50");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(f64::NAN, 2), "N/A");
    }

    #[test]
    fn test_price_precision_depends_on_magnitude() {
        assert_eq!(format_price(3456.789), "$3,456.79");
        assert_eq!(format_price(0.51234), "$0.5123");
        assert_eq!(format_price(1.0), "$1.00");
    }

    #[test]
    fn test_percent_and_billions() {
        assert_eq!(format_percent(-2.3456), "-2.35%");
        assert_eq!(format_billions(83_456_000_000.0), "$83.46B");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}

//! Plain digit numerals (〇一二...) used for dates.

const PLAIN_DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Renders each decimal digit of `year` as a plain numeral, e.g. 2025 → 二〇二五.
pub fn format_year_digits(year: u32) -> String {
    year.to_string()
        .bytes()
        .map(|digit| PLAIN_DIGITS[usize::from(digit - b'0')])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::format_year_digits;

    #[test]
    fn renders_each_digit() {
        assert_eq!(format_year_digits(2025), "二〇二五");
        assert_eq!(format_year_digits(0), "〇");
    }
}

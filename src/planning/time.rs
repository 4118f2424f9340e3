use chrono::NaiveDate;

/// Parses a zero-padded 24h `HH:MM` string into minutes since midnight.
pub fn parse_hhmm(raw: &str) -> Option<u16> {
    let bytes = raw.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let digits = |b: u8| (b as char).to_digit(10);
    let h = digits(bytes[0])? * 10 + digits(bytes[1])?;
    let m = digits(bytes[3])? * 10 + digits(bytes[4])?;
    if h > 23 || m > 59 {
        return None;
    }
    Some((h * 60 + m) as u16)
}

pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::parse_hhmm;

    #[test]
    fn hhmm_is_strict() {
        assert_eq!(parse_hhmm("00:00"), Some(0));
        assert_eq!(parse_hhmm("14:30"), Some(870));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("9:00"), None);
        assert_eq!(parse_hhmm("9h00"), None);
        assert_eq!(parse_hhmm("14:60"), None);
        assert_eq!(parse_hhmm(""), None);
    }
}

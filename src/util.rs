// Rate math, number formatting and artifact naming.
//
// Every percentage in the reports goes through `format_rate`, so the
// zero-total guard lives in exactly one place.
use crate::types::{ReportType, ServiceKind};
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// `completed / total * 100` with one decimal place.
///
/// Returns the literal `"0"` when `total` is zero so no report ever shows
/// `NaN` or `inf`.
pub fn format_rate(completed: u64, total: u64) -> String {
    if total == 0 {
        return "0".to_string();
    }
    format!("{:.1}", completed as f64 / total as f64 * 100.0)
}

/// `format_rate` with a trailing percent sign (`"0%"`, `"80.0%"`).
pub fn format_percent(completed: u64, total: u64) -> String {
    format!("{}%", format_rate(completed, total))
}

/// Share of `part` in `whole` as a number in `[0, 100]`; 0 for an empty whole.
pub fn share_percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0)
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `num-format` thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Shortens `s` to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate_label(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// `WMSU-Health-<type>-report-YYYY-MM-DD.<ext>`
pub fn report_filename(report_type: ReportType, ext: &str, date: NaiveDate) -> String {
    format!(
        "WMSU-Health-{}-report-{}.{}",
        report_type.as_str(),
        date.format("%Y-%m-%d"),
        ext
    )
}

/// `WMSU-<Service>-<type>-demographics-YYYY-MM-DD.pdf`
pub fn service_report_filename(service: ServiceKind, report_type: ReportType, date: NaiveDate) -> String {
    format!(
        "WMSU-{}-{}-demographics-{}.pdf",
        service.label(),
        report_type.as_str(),
        date.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_formats_as_zero() {
        assert_eq!(format_rate(0, 0), "0");
        assert_eq!(format_percent(0, 0), "0%");
        assert_eq!(format_rate(5, 0), "0");
        assert_eq!(share_percent(3, 0), 0.0);
    }

    #[test]
    fn rate_has_one_decimal_and_stays_in_range() {
        for total in 1..=60u64 {
            for completed in 0..=total {
                let s = format_rate(completed, total);
                let (_, frac) = s.split_once('.').expect("one decimal place");
                assert_eq!(frac.len(), 1, "{s}");
                let v: f64 = s.parse().unwrap();
                assert!((0.0..=100.0).contains(&v), "{s}");
            }
        }
        assert_eq!(format_rate(40, 50), "80.0");
        assert_eq!(format_rate(1, 3), "33.3");
        assert_eq!(format_percent(50, 50), "100.0%");
    }

    #[test]
    fn numbers_get_thousands_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 1), "-1,500.0");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(12345u64), "12,345");
    }

    #[test]
    fn labels_are_truncated_on_char_boundaries() {
        assert_eq!(truncate_label("College", 10), "College");
        assert_eq!(truncate_label("College of Engineering", 10), "College...");
        assert_eq!(truncate_label("Señorita Ñandú", 6), "Señ...");
    }

    #[test]
    fn filenames_follow_the_download_pattern() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            report_filename(ReportType::Weekly, "pdf", date),
            "WMSU-Health-weekly-report-2026-03-07.pdf"
        );
        assert_eq!(
            report_filename(ReportType::Yearly, "csv", date),
            "WMSU-Health-yearly-report-2026-03-07.csv"
        );
        assert_eq!(
            service_report_filename(ServiceKind::Dental, ReportType::Monthly, date),
            "WMSU-Dental-monthly-demographics-2026-03-07.pdf"
        );
    }

    #[test]
    fn filename_shape_holds_for_every_report_type() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        for rt in [ReportType::Weekly, ReportType::Monthly, ReportType::Yearly] {
            let name = report_filename(rt, "pdf", date);
            let rest = name.strip_prefix("WMSU-Health-").unwrap();
            let (kind, rest) = rest.split_once("-report-").unwrap();
            assert!(["weekly", "monthly", "yearly"].contains(&kind));
            let stamp = rest.strip_suffix(".pdf").unwrap();
            let digits: Vec<usize> = stamp.split('-').map(|p| p.len()).collect();
            assert_eq!(digits, vec![4, 2, 2]);
            assert!(stamp.chars().all(|c| c.is_ascii_digit() || c == '-'));
        }
    }
}

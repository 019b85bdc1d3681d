use crate::error::ReportError;
use crate::types::{ReportInput, UserTypeCategory};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub user_types: usize,
    pub derived_totals: usize,
    pub disabled_user_types: usize,
}

pub fn load_report_input(path: impl AsRef<Path>) -> Result<(ReportInput, LoadReport), ReportError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = raw.len(), "read report input");
    parse_report_input(&raw)
}

pub fn parse_report_input(raw: &str) -> Result<(ReportInput, LoadReport), ReportError> {
    let input: ReportInput = serde_json::from_str(raw)?;
    normalize(input)
}

/// Resolves categories and fills transaction totals the backend left out.
pub fn normalize(mut input: ReportInput) -> Result<(ReportInput, LoadReport), ReportError> {
    let mut derived_totals = 0usize;
    let mut disabled_user_types = 0usize;

    for u in &mut input.user_types {
        u.user_type = u.user_type.trim().to_string();
        if u.user_type.is_empty() {
            return Err(ReportError::InvalidInput("user type with an empty name".into()));
        }
        u.category = UserTypeCategory::from_name(&u.user_type);

        if u.total_transactions == 0 && u.service_total() > 0 {
            u.total_transactions = u.service_total();
            u.completed_transactions = u.service_completed();
            derived_totals += 1;
        }
        if u.completed_transactions > u.total_transactions {
            tracing::warn!(
                user_type = %u.user_type,
                completed = u.completed_transactions,
                total = u.total_transactions,
                "completed exceeds total; clamping"
            );
            u.completed_transactions = u.total_transactions;
        }
        if !u.is_enabled() {
            disabled_user_types += 1;
        }
    }

    let report = LoadReport {
        user_types: input.user_types.len(),
        derived_totals,
        disabled_user_types,
    };
    Ok((input, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "stats": {
            "medical": {"total": 120, "completed": 90, "pending": 20, "rejected": 10},
            "dental": {"total": 60, "completed": 45, "pending": 10, "rejected": 5},
            "certificates": {"total": 30, "completed": 30, "pending": 0, "rejected": 0},
            "monthlyTrends": [{"month": "Jan", "medical": 40, "dental": 20, "certificates": 10}]
        },
        "userTypes": [
            {"userType": " College ", "totalTransactions": 50, "completedTransactions": 40},
            {"userType": "Employee",
             "medical": {"total": 8, "completed": 6},
             "dental": {"total": 2, "completed": 1},
             "configuration": {"enabled": false}}
        ]
    }"#;

    #[test]
    fn parses_and_normalizes_sample() {
        let (input, report) = parse_report_input(SAMPLE).unwrap();
        assert_eq!(report, LoadReport { user_types: 2, derived_totals: 1, disabled_user_types: 1 });

        let college = &input.user_types[0];
        assert_eq!(college.user_type, "College");
        assert_eq!(college.category, UserTypeCategory::College);

        let employee = &input.user_types[1];
        assert_eq!(employee.category, UserTypeCategory::Employee);
        assert_eq!(employee.total_transactions, 10);
        assert_eq!(employee.completed_transactions, 7);
        assert_eq!(input.stats.monthly_trends.len(), 1);
    }

    #[test]
    fn rejects_blank_user_type() {
        let err = parse_report_input(r#"{"userTypes": [{"userType": "  "}]}"#).unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));
    }

    #[test]
    fn clamps_completed_to_total() {
        let (input, _) = parse_report_input(
            r#"{"userTypes": [{"userType": "Elementary", "totalTransactions": 5, "completedTransactions": 9}]}"#,
        )
        .unwrap();
        assert_eq!(input.user_types[0].completed_transactions, 5);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let (input, _) = load_report_input(file.path()).unwrap();
        assert_eq!(input.stats.medical.total, 120);
    }

    #[test]
    fn malformed_json_is_an_input_error() {
        assert!(matches!(parse_report_input("{"), Err(ReportError::Json(_))));
    }
}

use crate::error::ReportError;
use crate::types::{UserTypeData, UserTypeRow};
use crate::util::format_percent;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

/// Writes a finished artifact into `dir`, creating it when missing.
pub fn save_report(dir: &Path, filename: &str, contents: &[u8]) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "report saved");
    Ok(path)
}

pub fn user_type_rows(user_types: &[UserTypeData]) -> Vec<UserTypeRow> {
    user_types
        .iter()
        .enumerate()
        .map(|(idx, u)| UserTypeRow {
            rank: idx + 1,
            user_type: u.user_type.clone(),
            medical: u.medical.total,
            dental: u.dental.total,
            certificates: u.certificates.total,
            total: u.total_transactions,
            completion_rate: format_percent(u.completed_transactions, u.total_transactions),
        })
        .collect()
}

pub fn render_table_rows<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_table_rows(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("exports").join("reports");
        let path = save_report(&dir, "WMSU-Health-weekly-report-2026-01-05.csv", b"=== OVERVIEW ===\n").unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"=== OVERVIEW ===\n");
        assert!(path.ends_with("WMSU-Health-weekly-report-2026-01-05.csv"));
    }

    #[test]
    fn preview_rows_keep_caller_order() {
        let users = vec![
            UserTypeData { user_type: "Employee".into(), total_transactions: 4, completed_transactions: 1, ..Default::default() },
            UserTypeData { user_type: "College".into(), ..Default::default() },
        ];
        let rows = user_type_rows(&users);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].completion_rate, "25.0%");
        assert_eq!(rows[1].completion_rate, "0%");

        let table = render_table_rows(&rows, 1).unwrap();
        assert!(table.contains("Employee"));
        assert!(!table.contains("College"));
        assert!(render_table_rows::<UserTypeRow>(&[], 5).is_none());
    }
}

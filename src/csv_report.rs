use crate::error::ReportError;
use crate::recommendations::PerformanceBadge;
use crate::types::{InventoryItem, ReportType, ServiceCounts, ServiceKind, StatsData, UserTypeData};
use crate::util::{format_percent, format_rate};
use chrono::NaiveDateTime;

/// Renders one `=== TITLE ===` block: header row plus data rows.
///
/// Quoting is left to `csv::Writer`, so any field with a comma, quote or
/// newline is wrapped and stays a single column.
fn section<I>(title: &str, header: &[&str], rows: I) -> Result<String, ReportError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(header)?;
    for row in rows {
        debug_assert_eq!(row.len(), header.len(), "row width in section {title}");
        wtr.write_record(&row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| ReportError::Io(e.into_error()))?;
    let body = String::from_utf8(bytes).map_err(|e| ReportError::Generation(e.to_string()))?;
    Ok(format!("=== {} ===\n{}", title, body))
}

fn overview_row(label: &str, s: &ServiceCounts) -> Vec<String> {
    vec![
        label.to_string(),
        s.total.to_string(),
        s.completed.to_string(),
        s.pending.to_string(),
        s.rejected.to_string(),
        format_percent(s.completed, s.total),
    ]
}

fn inventory_rows(items: &[InventoryItem]) -> impl Iterator<Item = Vec<String>> + '_ {
    items.iter().map(|item| {
        vec![
            item.name.clone(),
            item.category.clone().unwrap_or_default(),
            item.quantity_used.to_string(),
            item.unit.clone().unwrap_or_default(),
            item.appointments.to_string(),
        ]
    })
}

const INVENTORY_HEADER: [&str; 5] = ["Item", "Category", "Quantity Used", "Unit", "Appointments"];

/// Builds the full CSV export. Pure: the same inputs always give the same text.
pub fn build_csv_report(
    stats: &StatsData,
    user_types: &[UserTypeData],
    report_type: ReportType,
    generated_at: NaiveDateTime,
) -> Result<String, ReportError> {
    let mut sections = Vec::new();

    let mut overview: Vec<Vec<String>> = ServiceKind::ALL
        .iter()
        .map(|kind| overview_row(kind.label(), stats.service(*kind)))
        .collect();
    overview.push(overview_row("Overall", &stats.combined()));
    sections.push(section(
        "OVERVIEW",
        &["Service", "Total", "Completed", "Pending", "Rejected", "Completion Rate"],
        overview,
    )?);

    let breakdown = user_types.iter().enumerate().map(|(idx, u)| {
        vec![
            (idx + 1).to_string(),
            u.user_type.clone(),
            u.medical.total.to_string(),
            u.medical.completed.to_string(),
            u.dental.total.to_string(),
            u.dental.completed.to_string(),
            u.certificates.total.to_string(),
            u.certificates.completed.to_string(),
            u.total_transactions.to_string(),
            u.completed_transactions.to_string(),
            format!("{}%", format_rate(u.completed_transactions, u.total_transactions)),
            PerformanceBadge::from_rate(u.completion_rate()).label().to_string(),
            if u.is_enabled() { "Yes" } else { "No" }.to_string(),
            u.required_field_count().to_string(),
        ]
    });
    sections.push(section(
        "USER TYPE BREAKDOWN",
        &[
            "Rank",
            "User Type",
            "Medical Total",
            "Medical Completed",
            "Dental Total",
            "Dental Completed",
            "Certificates Total",
            "Certificates Completed",
            "Total Transactions",
            "Completed Transactions",
            "Completion Rate",
            "Performance",
            "Enabled",
            "Required Fields",
        ],
        breakdown,
    )?);

    if !stats.monthly_trends.is_empty() {
        let trends = stats.monthly_trends.iter().map(|t| {
            vec![
                t.month.clone(),
                t.medical.to_string(),
                t.dental.to_string(),
                t.certificates.to_string(),
                t.total().to_string(),
            ]
        });
        sections.push(section(
            "MONTHLY TRENDS",
            &["Month", "Medical", "Dental", "Certificates", "Total"],
            trends,
        )?);
    }

    if !stats.medical_inventory.is_empty() {
        sections.push(section(
            "MEDICAL INVENTORY",
            &INVENTORY_HEADER,
            inventory_rows(&stats.medical_inventory),
        )?);
    }
    if !stats.dental_inventory.is_empty() {
        sections.push(section(
            "DENTAL INVENTORY",
            &INVENTORY_HEADER,
            inventory_rows(&stats.dental_inventory),
        )?);
    }

    let metadata = vec![
        vec!["Report".to_string(), "WMSU Health Services Report".to_string()],
        vec!["Report Type".to_string(), report_type.title().to_string()],
        vec!["Generated At".to_string(), generated_at.format("%Y-%m-%d %H:%M:%S").to_string()],
        vec!["User Types".to_string(), user_types.len().to_string()],
        vec!["Total Services".to_string(), stats.combined().total.to_string()],
    ];
    sections.push(section("REPORT METADATA", &["Field", "Value"], metadata)?);

    Ok(sections.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap().and_hms_opt(9, 30, 0).unwrap()
    }

    fn sample_stats() -> StatsData {
        StatsData {
            medical: ServiceCounts::new(0, 0, 0, 0),
            dental: ServiceCounts::new(20, 15, 4, 1),
            certificates: ServiceCounts::new(10, 10, 0, 0),
            monthly_trends: vec![crate::types::MonthlyTrend {
                month: "Aug".into(),
                medical: 3,
                dental: 4,
                certificates: 5,
            }],
            medical_inventory: vec![InventoryItem {
                name: "Gauze, sterile".into(),
                category: Some("Consumable".into()),
                quantity_used: 12,
                unit: Some("pack".into()),
                appointments: 6,
            }],
            dental_inventory: vec![],
        }
    }

    fn users() -> Vec<UserTypeData> {
        vec![
            UserTypeData {
                user_type: "College".into(),
                total_transactions: 50,
                completed_transactions: 40,
                ..Default::default()
            },
            UserTypeData {
                user_type: "Employee, Non-Teaching".into(),
                ..Default::default()
            },
        ]
    }

    /// Splits the export back into (title, records) pairs.
    fn parse_sections(out: &str) -> Vec<(String, Vec<csv::StringRecord>)> {
        out.split("\n\n")
            .map(|block| {
                let (title_line, body) = block.split_once('\n').unwrap();
                let mut rdr = csv::ReaderBuilder::new().has_headers(false).from_reader(body.as_bytes());
                let records = rdr.records().map(|r| r.unwrap()).collect();
                (title_line.to_string(), records)
            })
            .collect()
    }

    #[test]
    fn sections_appear_in_order() {
        let out = build_csv_report(&sample_stats(), &users(), ReportType::Monthly, at()).unwrap();
        let titles: Vec<String> = parse_sections(&out).into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            titles,
            vec![
                "=== OVERVIEW ===",
                "=== USER TYPE BREAKDOWN ===",
                "=== MONTHLY TRENDS ===",
                "=== MEDICAL INVENTORY ===",
                "=== REPORT METADATA ===",
            ]
        );
    }

    #[test]
    fn every_row_matches_its_header_width() {
        let out = build_csv_report(&sample_stats(), &users(), ReportType::Weekly, at()).unwrap();
        for (title, records) in parse_sections(&out) {
            let width = records[0].len();
            assert!(records.iter().all(|r| r.len() == width), "{title}");
        }
    }

    #[test]
    fn comma_fields_are_quoted() {
        let out = build_csv_report(&sample_stats(), &users(), ReportType::Monthly, at()).unwrap();
        assert!(out.contains("\"Gauze, sterile\",Consumable,12,pack,6"));
        assert!(out.contains("2,\"Employee, Non-Teaching\","));
        let inventory = parse_sections(&out)
            .into_iter()
            .find(|(t, _)| t == "=== MEDICAL INVENTORY ===")
            .unwrap()
            .1;
        assert_eq!(&inventory[1][0], "Gauze, sterile");
        assert_eq!(inventory[1].len(), 5);
    }

    #[test]
    fn zero_totals_render_as_zero_percent() {
        let out = build_csv_report(&sample_stats(), &users(), ReportType::Monthly, at()).unwrap();
        assert!(out.contains("Medical,0,0,0,0,0%\n"));
        assert!(out.contains("Dental,20,15,4,1,75.0%\n"));
        assert!(out.contains("Overall,30,25,4,1,83.3%\n"));
        assert!(!out.contains("NaN"));
        assert!(out.contains("1,College,0,0,0,0,0,0,50,40,80.0%,Excellent,Yes,0\n"));
    }

    #[test]
    fn optional_sections_are_skipped() {
        let out = build_csv_report(&StatsData::default(), &[], ReportType::Yearly, at()).unwrap();
        assert!(!out.contains("MONTHLY TRENDS"));
        assert!(!out.contains("INVENTORY"));
        assert!(out.contains("Report Type,Yearly\n"));
        assert!(out.contains("Generated At,2026-05-04 09:30:00\n"));
    }

    #[test]
    fn huge_counts_saturate_in_overall_and_trend_rows() {
        let mut stats = sample_stats();
        stats.medical = ServiceCounts::new(u64::MAX, 0, 0, 0);
        stats.dental = ServiceCounts::new(1, 1, 0, 0);
        stats.monthly_trends[0].medical = u64::MAX;
        let out = build_csv_report(&stats, &users(), ReportType::Monthly, at()).unwrap();
        let max = u64::MAX.to_string();
        assert!(out.contains(&format!("Overall,{max},")));
        assert!(out.contains(&format!("Aug,{max},4,5,{max}\n")));
    }

    #[test]
    fn output_is_deterministic() {
        let a = build_csv_report(&sample_stats(), &users(), ReportType::Monthly, at()).unwrap();
        let b = build_csv_report(&sample_stats(), &users(), ReportType::Monthly, at()).unwrap();
        assert_eq!(a, b);
    }
}

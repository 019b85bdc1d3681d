// Multi-page health services report.
//
// Page order is fixed: overview, service detail, one distribution page per
// user type, one demographics page per user type, performance summary.
// Layout goes into a `ReportDocument` first; `pdf_render` turns it into
// bytes.

use crate::demographics::{dimension_for, estimate_breakdown, estimate_breakdown_with, DemographicShare};
use crate::error::ReportError;
use crate::layout::{palette, DrawOp, PageBuilder, ReportDocument, RgbColor, CONTENT_WIDTH, MARGIN_X, PAGE_WIDTH};
use crate::pdf_render::{render_pdf, LogoAsset};
use crate::recommendations::{recommendations_for, PerformanceBadge};
use crate::types::{InventoryItem, ReportType, ServiceCounts, ServiceKind, StatsData, UserTypeData};
use crate::util::{format_int, format_number, format_percent, format_rate, share_percent, truncate_label};
use chrono::NaiveDate;
use std::cmp::Ordering;

pub const OVERVIEW_MAX_ROWS: usize = 12;
const ROW_HEIGHT: f32 = 6.5;
const BANNER_HEIGHT: f32 = 28.0;

fn service_color(kind: ServiceKind) -> RgbColor {
    match kind {
        ServiceKind::Medical => palette::BLUE,
        ServiceKind::Dental => palette::TEAL,
        ServiceKind::Certificates => palette::PURPLE,
    }
}

/// Greedy word wrap on character count.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Opens a page with the crimson banner and leaves the cursor below it.
fn page_header(b: &mut PageBuilder, title: &str, subtitle: &str) {
    b.start_page();
    b.rect(0.0, 0.0, PAGE_WIDTH, BANNER_HEIGHT, palette::CRIMSON);
    b.push(DrawOp::Logo { x: MARGIN_X, y: 5.0, w: 18.0 });
    b.text(40.0, 13.0, 16.0, true, palette::WHITE, truncate_label(title, 48));
    b.text(40.0, 21.0, 9.0, false, palette::WHITE, subtitle);
    b.cursor.y = BANNER_HEIGHT + 8.0;
}

fn note(b: &mut PageBuilder, text: &str) {
    for line in wrap_text(text, 110) {
        let y = b.cursor.y;
        b.text(MARGIN_X, y + 4.0, 8.0, false, palette::MUTED, line);
        b.cursor.advance(4.5);
    }
    b.cursor.advance(1.5);
}

fn subtitle_for(report_type: ReportType, generated_on: NaiveDate) -> String {
    format!(
        "{} Report - Generated {}",
        report_type.title(),
        generated_on.format("%B %d, %Y")
    )
}

/// Row of equally sized KPI boxes at the cursor.
fn kpi_boxes(b: &mut PageBuilder, items: &[(&str, String, RgbColor)]) {
    if items.is_empty() {
        return;
    }
    let gap = 4.0;
    let n = items.len() as f32;
    let w = (CONTENT_WIDTH - gap * (n - 1.0)) / n;
    let y = b.cursor.y;
    for (i, (label, value, accent)) in items.iter().enumerate() {
        let x = MARGIN_X + i as f32 * (w + gap);
        b.rect(x, y, w, 20.0, palette::PANEL);
        b.rect(x, y, 1.5, 20.0, *accent);
        b.text(x + 5.0, y + 10.0, 14.0, true, palette::TEXT, value.clone());
        b.text(x + 5.0, y + 16.0, 8.0, false, palette::MUTED, *label);
    }
    b.cursor.advance(26.0);
}

/// Stacked horizontal bar of `parts` with a legend underneath.
fn distribution_bar(b: &mut PageBuilder, parts: &[(&str, u64, RgbColor)]) {
    let whole = parts.iter().fold(0u64, |acc, (_, v, _)| acc.saturating_add(*v));
    let y = b.cursor.y;
    b.rect(MARGIN_X, y, CONTENT_WIDTH, 6.0, palette::TRACK);
    let mut x = MARGIN_X;
    for (_, value, color) in parts {
        let w = CONTENT_WIDTH * share_percent(*value, whole) as f32 / 100.0;
        b.rect(x, y, w, 6.0, *color);
        x += w;
    }
    b.cursor.advance(9.0);

    let y = b.cursor.y;
    let slot = CONTENT_WIDTH / parts.len().max(1) as f32;
    for (i, (label, value, color)) in parts.iter().enumerate() {
        let x = MARGIN_X + i as f32 * slot;
        b.rect(x, y, 3.0, 3.0, *color);
        b.text(
            x + 5.0,
            y + 2.8,
            8.0,
            false,
            palette::TEXT,
            format!("{} {} ({})", label, format_int(*value), format_percent(*value, whole)),
        );
    }
    b.cursor.advance(6.0);
    if whole == 0 {
        note(b, "No services recorded for this period.");
    }
}

/// Filled header row for a table; `cols` are (label, x offset).
fn table_header(b: &mut PageBuilder, cols: &[(&str, f32)]) {
    let y = b.cursor.y;
    b.rect(MARGIN_X, y, CONTENT_WIDTH, 7.0, palette::CRIMSON);
    for (label, dx) in cols {
        b.text(MARGIN_X + dx, y + 4.8, 8.0, true, palette::WHITE, *label);
    }
    b.cursor.advance(7.0);
}

fn table_row(b: &mut PageBuilder, idx: usize, cells: &[(String, f32)]) {
    let y = b.cursor.y;
    if idx % 2 == 1 {
        b.rect(MARGIN_X, y, CONTENT_WIDTH, ROW_HEIGHT, palette::PANEL);
    }
    for (cell, dx) in cells {
        b.text(MARGIN_X + dx, y + 4.5, 8.0, false, palette::TEXT, cell.clone());
    }
    b.cursor.advance(ROW_HEIGHT);
}

fn badge(b: &mut PageBuilder, x: f32, y: f32, badge: PerformanceBadge) {
    b.rect(x, y, 30.0, 5.0, badge.color());
    b.text(x + 2.0, y + 3.6, 7.0, true, palette::WHITE, badge.label());
}

fn overview_page(
    b: &mut PageBuilder,
    stats: &StatsData,
    user_types: &[UserTypeData],
    report_type: ReportType,
    generated_on: NaiveDate,
) {
    page_header(b, "WMSU Health Services Report", &subtitle_for(report_type, generated_on));
    let all = stats.combined();

    b.heading("Key Performance Indicators");
    kpi_boxes(
        b,
        &[
            ("Total Services", format_int(all.total), palette::CRIMSON),
            ("Completed", format_int(all.completed), palette::GREEN),
            ("Pending", format_int(all.pending), palette::AMBER),
            ("Completion Rate", format_percent(all.completed, all.total), palette::BLUE),
        ],
    );

    b.heading("Service Completion");
    for kind in ServiceKind::ALL {
        let s = stats.service(kind);
        let y = b.cursor.y;
        b.text(MARGIN_X, y + 4.0, 9.0, true, palette::TEXT, kind.label());
        b.bar(MARGIN_X + 30.0, y + 1.0, 110.0, 4.0, share_percent(s.completed, s.total), service_color(kind));
        b.text(
            MARGIN_X + 145.0,
            y + 4.0,
            9.0,
            false,
            palette::TEXT,
            format!("{} ({}/{})", format_percent(s.completed, s.total), s.completed, s.total),
        );
        b.cursor.advance(8.0);
    }
    b.cursor.advance(4.0);

    b.heading("Service Distribution");
    distribution_bar(
        b,
        &ServiceKind::ALL
            .iter()
            .map(|k| (k.label(), stats.service(*k).total, service_color(*k)))
            .collect::<Vec<_>>(),
    );
    b.cursor.advance(4.0);

    b.heading(format!("User Type Demographics (Top {})", OVERVIEW_MAX_ROWS));
    if user_types.is_empty() {
        note(b, "No user type data available.");
        return;
    }
    let cols: [(&str, f32); 7] = [
        ("#", 2.0),
        ("User Type", 10.0),
        ("Medical", 70.0),
        ("Dental", 90.0),
        ("Cert.", 110.0),
        ("Total", 130.0),
        ("Rate", 155.0),
    ];
    table_header(b, &cols);
    let mut shown = 0usize;
    for (idx, u) in user_types.iter().take(OVERVIEW_MAX_ROWS).enumerate() {
        if !b.cursor.fits(ROW_HEIGHT + 6.0) {
            break;
        }
        table_row(
            b,
            idx,
            &[
                ((idx + 1).to_string(), cols[0].1),
                (truncate_label(&u.user_type, 32), cols[1].1),
                (format_int(u.medical.total), cols[2].1),
                (format_int(u.dental.total), cols[3].1),
                (format_int(u.certificates.total), cols[4].1),
                (format_int(u.total_transactions), cols[5].1),
                (format_percent(u.completed_transactions, u.total_transactions), cols[6].1),
            ],
        );
        shown += 1;
    }
    if user_types.len() > shown {
        b.cursor.advance(2.0);
        note(
            b,
            &format!("+ {} more user types (see Performance Summary).", user_types.len() - shown),
        );
    }
}

fn status_breakdown(b: &mut PageBuilder, kind: ServiceKind, s: &ServiceCounts) {
    let y = b.cursor.y;
    b.text(MARGIN_X, y + 4.0, 9.0, true, service_color(kind), kind.label());
    b.text(MARGIN_X + 40.0, y + 4.0, 8.0, false, palette::MUTED, format!("{} total", format_int(s.total)));
    b.cursor.advance(6.0);
    distribution_bar(
        b,
        &[
            ("Completed", s.completed, palette::GREEN),
            ("Pending", s.pending, palette::AMBER),
            ("Rejected", s.rejected, palette::RED),
        ],
    );
    b.cursor.advance(2.0);
}

fn trend_chart(b: &mut PageBuilder, stats: &StatsData) {
    const CHART_HEIGHT: f32 = 55.0;
    let trends = &stats.monthly_trends;
    let max = trends
        .iter()
        .flat_map(|t| [t.medical, t.dental, t.certificates])
        .max()
        .unwrap_or(0)
        .max(1);

    let left = MARGIN_X + 12.0;
    let width = CONTENT_WIDTH - 16.0;
    let top = b.cursor.y;
    let base = top + CHART_HEIGHT;
    b.line(left, top, left, base, palette::MUTED, 0.5);
    b.line(left, base, left + width, base, palette::MUTED, 0.5);
    b.text(MARGIN_X, top + 3.0, 7.0, false, palette::MUTED, format_int(max));
    b.text(MARGIN_X, base, 7.0, false, palette::MUTED, "0");

    let step = if trends.len() > 1 { width / (trends.len() - 1) as f32 } else { 0.0 };
    let px = |i: usize| if trends.len() > 1 { left + step * i as f32 } else { left + width / 2.0 };
    let py = |v: u64| base - CHART_HEIGHT * (v as f32 / max as f32);

    let series: [(ServiceKind, fn(&crate::types::MonthlyTrend) -> u64); 3] = [
        (ServiceKind::Medical, |t| t.medical),
        (ServiceKind::Dental, |t| t.dental),
        (ServiceKind::Certificates, |t| t.certificates),
    ];
    for (kind, value) in series {
        let color = service_color(kind);
        for (i, pair) in trends.windows(2).enumerate() {
            b.line(px(i), py(value(&pair[0])), px(i + 1), py(value(&pair[1])), color, 1.0);
        }
        for (i, t) in trends.iter().enumerate() {
            b.rect(px(i) - 0.8, py(value(t)) - 0.8, 1.6, 1.6, color);
        }
    }

    // every label when they fit, otherwise every other one
    let stride = if trends.len() > 12 { 2 } else { 1 };
    for (i, t) in trends.iter().enumerate().step_by(stride) {
        b.text(px(i) - 3.0, base + 5.0, 7.0, false, palette::MUTED, truncate_label(&t.month, 8));
    }
    b.cursor.advance(CHART_HEIGHT + 9.0);

    let y = b.cursor.y;
    for (i, kind) in ServiceKind::ALL.iter().enumerate() {
        let x = MARGIN_X + i as f32 * 45.0;
        b.rect(x, y, 3.0, 3.0, service_color(*kind));
        b.text(x + 5.0, y + 2.8, 8.0, false, palette::TEXT, kind.label());
    }
    b.cursor.advance(8.0);

    let months = trends.len() as f64;
    let total = trends.iter().fold(0u64, |acc, t| acc.saturating_add(t.total()));
    note(
        b,
        &format!(
            "Average requests per month: {} across {} months.",
            format_number(total as f64 / months, 1),
            trends.len()
        ),
    );
}

fn top_inventory(stats: &StatsData) -> Vec<(&'static str, &InventoryItem)> {
    let mut items: Vec<(&'static str, &InventoryItem)> = stats
        .medical_inventory
        .iter()
        .map(|i| ("Medical", i))
        .chain(stats.dental_inventory.iter().map(|i| ("Dental", i)))
        .collect();
    items.sort_by(|a, b| b.1.quantity_used.cmp(&a.1.quantity_used).then_with(|| a.1.name.cmp(&b.1.name)));
    items
}

fn service_detail_page(
    b: &mut PageBuilder,
    stats: &StatsData,
    report_type: ReportType,
    generated_on: NaiveDate,
) {
    page_header(b, "Service Details & Trends", &subtitle_for(report_type, generated_on));

    b.heading("Status Breakdown");
    for kind in ServiceKind::ALL {
        status_breakdown(b, kind, stats.service(kind));
    }
    b.cursor.advance(2.0);

    b.heading("Monthly Trends");
    if stats.monthly_trends.is_empty() {
        note(b, "No monthly trend data available for this period.");
    } else {
        trend_chart(b, stats);
    }

    let items = top_inventory(stats);
    if items.is_empty() || !b.cursor.fits(11.0 + 7.0 + ROW_HEIGHT) {
        return;
    }
    b.heading("Top Inventory Usage");
    let cols: [(&str, f32); 5] = [
        ("Item", 2.0),
        ("Service", 80.0),
        ("Used", 105.0),
        ("Unit", 125.0),
        ("Appointments", 150.0),
    ];
    table_header(b, &cols);
    let mut shown = 0usize;
    for (idx, (service, item)) in items.iter().take(8).enumerate() {
        if !b.cursor.fits(ROW_HEIGHT) {
            break;
        }
        table_row(
            b,
            idx,
            &[
                (truncate_label(&item.name, 40), cols[0].1),
                (service.to_string(), cols[1].1),
                (format_int(item.quantity_used), cols[2].1),
                (item.unit.clone().unwrap_or_else(|| "-".into()), cols[3].1),
                (format_int(item.appointments), cols[4].1),
            ],
        );
        shown += 1;
    }
    if items.len() > shown && b.cursor.fits(6.0) {
        note(b, &format!("+ {} more items in the CSV export.", items.len() - shown));
    }
}

fn service_card(b: &mut PageBuilder, x: f32, y: f32, w: f32, kind: ServiceKind, s: &ServiceCounts) {
    let color = service_color(kind);
    b.rect(x, y, w, 44.0, palette::PANEL);
    b.rect(x, y, w, 1.5, color);
    b.text(x + 4.0, y + 8.0, 10.0, true, color, kind.label());
    let lines = [
        ("Total", s.total),
        ("Completed", s.completed),
        ("Pending", s.pending),
        ("Rejected", s.rejected),
    ];
    for (i, (label, value)) in lines.iter().enumerate() {
        let ly = y + 15.0 + i as f32 * 5.0;
        b.text(x + 4.0, ly, 8.0, false, palette::MUTED, *label);
        b.text(x + w - 18.0, ly, 8.0, true, palette::TEXT, format_int(*value));
    }
    b.bar(x + 4.0, y + 35.0, w - 8.0, 3.0, share_percent(s.completed, s.total), color);
    b.text(
        x + 4.0,
        y + 42.0,
        7.0,
        false,
        palette::MUTED,
        format!("{} complete", format_percent(s.completed, s.total)),
    );
}

fn distribution_page(b: &mut PageBuilder, user: &UserTypeData, report_type: ReportType) {
    page_header(
        b,
        &format!("{} - Service Distribution", user.user_type),
        &format!("{} Report", report_type.title()),
    );

    let y = b.cursor.y;
    b.text(
        MARGIN_X,
        y + 4.0,
        10.0,
        false,
        palette::TEXT,
        format!(
            "Transactions: {}   Completed: {}   Completion rate: {}",
            format_int(user.total_transactions),
            format_int(user.completed_transactions),
            format_percent(user.completed_transactions, user.total_transactions)
        ),
    );
    badge(b, PAGE_WIDTH - MARGIN_X - 30.0, y, PerformanceBadge::from_rate(user.completion_rate()));
    b.cursor.advance(9.0);
    if !user.is_enabled() {
        note(b, "This user type is currently disabled in the patient portal.");
    }

    b.heading("Services");
    let gap = 4.0;
    let w = (CONTENT_WIDTH - 2.0 * gap) / 3.0;
    let y = b.cursor.y;
    for (i, kind) in ServiceKind::ALL.iter().enumerate() {
        service_card(b, MARGIN_X + i as f32 * (w + gap), y, w, *kind, user.service(*kind));
    }
    b.cursor.advance(50.0);

    b.heading("Share of Requests");
    distribution_bar(
        b,
        &ServiceKind::ALL
            .iter()
            .map(|k| (k.label(), user.service(*k).total, service_color(*k)))
            .collect::<Vec<_>>(),
    );
    b.cursor.advance(4.0);

    b.heading("Registration Configuration");
    let required = user
        .configuration
        .as_ref()
        .map(|c| c.required_fields.clone())
        .unwrap_or_default();
    let mut config_lines = vec![
        format!("Enabled: {}", if user.is_enabled() { "Yes" } else { "No" }),
        format!("Required fields: {}", required.len()),
    ];
    if !required.is_empty() {
        let listed: Vec<&str> = required.iter().take(6).map(String::as_str).collect();
        let more = required.len().saturating_sub(listed.len());
        let suffix = if more > 0 { format!(" (+{more} more)") } else { String::new() };
        config_lines.push(format!("Fields: {}{}", listed.join(", "), suffix));
    }
    for line in config_lines {
        for wrapped in wrap_text(&line, 100) {
            let y = b.cursor.y;
            b.text(MARGIN_X, y + 4.0, 9.0, false, palette::TEXT, wrapped);
            b.cursor.advance(5.0);
        }
    }
    b.cursor.advance(4.0);

    b.heading("Recommendations");
    for (i, rec) in recommendations_for(user).iter().enumerate() {
        for (j, line) in wrap_text(rec, 95).into_iter().enumerate() {
            if !b.cursor.fits(5.0) {
                return;
            }
            let y = b.cursor.y;
            let prefix = if j == 0 { format!("{}. ", i + 1) } else { "   ".to_string() };
            b.text(MARGIN_X + 2.0, y + 4.0, 9.0, false, palette::TEXT, format!("{prefix}{line}"));
            b.cursor.advance(5.0);
        }
        b.cursor.advance(1.5);
    }
}

fn demographic_rows(b: &mut PageBuilder, rows: &[DemographicShare]) {
    if rows.is_empty() {
        note(b, "No groups configured for this user type.");
        return;
    }
    let max_share = rows.iter().map(|r| r.share).fold(0.0_f64, f64::max).max(1.0);
    for (idx, row) in rows.iter().enumerate() {
        // keep room for the "+N more" line
        if !b.cursor.fits(9.0 + 6.0) {
            note(b, &format!("+ {} more groups not shown.", rows.len() - idx));
            return;
        }
        let y = b.cursor.y;
        b.text(MARGIN_X, y + 4.0, 8.0, false, palette::TEXT, truncate_label(&row.group, 34));
        b.bar(MARGIN_X + 62.0, y + 1.0, 70.0, 4.0, row.share / max_share * 100.0, palette::CRIMSON);
        b.text(
            MARGIN_X + 136.0,
            y + 4.0,
            8.0,
            false,
            palette::TEXT,
            format!("{:.1}%  ~{}  ({}%)", row.share, format_int(row.estimated_count), row.completion_rate),
        );
        b.cursor.advance(9.0);
    }
}

fn demographics_page(b: &mut PageBuilder, user: &UserTypeData, rows: &[DemographicShare], title: &str) {
    let dimension = dimension_for(user.category);
    page_header(b, title, &format!("Breakdown by {}", dimension));
    note(
        b,
        "Estimated distribution: per-group figures are interpolated from this user type's totals, not measured counts.",
    );
    b.heading(format!("By {}", dimension));
    let y = b.cursor.y;
    b.text(MARGIN_X, y + 3.0, 7.0, true, palette::MUTED, dimension);
    b.text(MARGIN_X + 136.0, y + 3.0, 7.0, true, palette::MUTED, "Share  ~Count  (Completion)");
    b.cursor.advance(5.0);
    demographic_rows(b, rows);
}

/// User types ordered by completion rate, busiest first on ties.
pub fn rank_by_performance(user_types: &[UserTypeData]) -> Vec<&UserTypeData> {
    let mut ranked: Vec<&UserTypeData> = user_types.iter().collect();
    ranked.sort_by(|a, b| {
        b.completion_rate()
            .partial_cmp(&a.completion_rate())
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.total_transactions.cmp(&a.total_transactions))
    });
    ranked
}

fn performance_page(b: &mut PageBuilder, stats: &StatsData, user_types: &[UserTypeData], report_type: ReportType) {
    page_header(
        b,
        "Performance Summary",
        &format!("{} Report - Ranking across user types", report_type.title()),
    );

    let ranked = rank_by_performance(user_types);
    b.heading("Completion Ranking");
    if ranked.is_empty() {
        note(b, "No user type data available.");
    } else {
        let cols: [(&str, f32); 6] = [
            ("#", 2.0),
            ("User Type", 10.0),
            ("Transactions", 75.0),
            ("Completed", 103.0),
            ("Rate", 127.0),
            ("Performance", 148.0),
        ];
        table_header(b, &cols);
        let mut shown = 0usize;
        for (idx, u) in ranked.iter().enumerate() {
            // leave room for the highlights block
            if !b.cursor.fits(ROW_HEIGHT + 36.0) {
                break;
            }
            let y = b.cursor.y;
            table_row(
                b,
                idx,
                &[
                    ((idx + 1).to_string(), cols[0].1),
                    (truncate_label(&u.user_type, 32), cols[1].1),
                    (format_int(u.total_transactions), cols[2].1),
                    (format_int(u.completed_transactions), cols[3].1),
                    (format_percent(u.completed_transactions, u.total_transactions), cols[4].1),
                ],
            );
            badge(b, MARGIN_X + cols[5].1, y + 0.75, PerformanceBadge::from_rate(u.completion_rate()));
            shown += 1;
        }
        if ranked.len() > shown {
            note(b, &format!("+ {} more user types not shown.", ranked.len() - shown));
        }
    }
    b.cursor.advance(4.0);

    b.heading("Highlights");
    let all = stats.combined();
    let mut lines = vec![format!(
        "Overall completion rate: {} of {} services.",
        format_percent(all.completed, all.total),
        format_int(all.total)
    )];
    if let Some(top) = ranked.first() {
        lines.push(format!(
            "Top performer: {} ({}%).",
            top.user_type,
            format_rate(top.completed_transactions, top.total_transactions)
        ));
    }
    let attention: Vec<String> = ranked
        .iter()
        .filter(|u| {
            matches!(
                PerformanceBadge::from_rate(u.completion_rate()),
                PerformanceBadge::Fair | PerformanceBadge::NeedsImprovement
            )
        })
        .map(|u| u.user_type.clone())
        .collect();
    if !ranked.is_empty() {
        if attention.is_empty() {
            lines.push("All user types are performing at Good or better.".to_string());
        } else {
            lines.push(format!("Needs attention: {}.", attention.join(", ")));
        }
    }
    for line in lines {
        for wrapped in wrap_text(&line, 100) {
            if !b.cursor.fits(5.0) {
                return;
            }
            let y = b.cursor.y;
            b.text(MARGIN_X, y + 4.0, 9.0, false, palette::TEXT, wrapped);
            b.cursor.advance(5.5);
        }
    }
}

/// Lays out the full report. Always `2 + 2 * user_types.len() + 1` pages.
pub fn build_report_document(
    stats: &StatsData,
    user_types: &[UserTypeData],
    report_type: ReportType,
    generated_on: NaiveDate,
) -> ReportDocument {
    let mut b = PageBuilder::new();
    overview_page(&mut b, stats, user_types, report_type, generated_on);
    service_detail_page(&mut b, stats, report_type, generated_on);
    for user in user_types {
        distribution_page(&mut b, user, report_type);
    }
    for user in user_types {
        let rows = estimate_breakdown(user);
        demographics_page(&mut b, user, &rows, &format!("{} - Demographics", user.user_type));
    }
    performance_page(&mut b, stats, user_types, report_type);
    debug_assert_eq!(b.page_count(), 3 + 2 * user_types.len());
    b.finish(format!("WMSU Health Services {} Report", report_type.title()))
}

/// Service-specific variant: an overview (continued over as many pages as the
/// user type table needs) plus a demographics page per user type.
pub fn build_service_document(
    service: ServiceKind,
    stats: &StatsData,
    user_types: &[UserTypeData],
    report_type: ReportType,
    generated_on: NaiveDate,
) -> ReportDocument {
    let mut b = PageBuilder::new();
    let s = stats.service(service);
    page_header(
        &mut b,
        &format!("WMSU {} Services - Demographics", service.label()),
        &subtitle_for(report_type, generated_on),
    );
    b.heading(format!("{} Overview", service.label()));
    kpi_boxes(
        &mut b,
        &[
            ("Total", format_int(s.total), service_color(service)),
            ("Completed", format_int(s.completed), palette::GREEN),
            ("Pending", format_int(s.pending), palette::AMBER),
            ("Rejected", format_int(s.rejected), palette::RED),
        ],
    );
    let y = b.cursor.y;
    b.text(
        MARGIN_X,
        y + 4.0,
        10.0,
        true,
        palette::TEXT,
        format!("Completion rate: {}", format_percent(s.completed, s.total)),
    );
    b.cursor.advance(10.0);

    b.heading("By User Type");
    if user_types.is_empty() {
        note(&mut b, "No user type data available.");
    } else {
        let cols: [(&str, f32); 6] = [
            ("#", 2.0),
            ("User Type", 10.0),
            ("Total", 75.0),
            ("Completed", 95.0),
            ("Pending", 120.0),
            ("Rate", 145.0),
        ];
        table_header(&mut b, &cols);
        for (idx, u) in user_types.iter().enumerate() {
            if b.new_page_if_needed(ROW_HEIGHT) {
                b.heading("By User Type (continued)");
                table_header(&mut b, &cols);
            }
            let us = u.service(service);
            table_row(
                &mut b,
                idx,
                &[
                    ((idx + 1).to_string(), cols[0].1),
                    (truncate_label(&u.user_type, 32), cols[1].1),
                    (format_int(us.total), cols[2].1),
                    (format_int(us.completed), cols[3].1),
                    (format_int(us.pending), cols[4].1),
                    (format_percent(us.completed, us.total), cols[5].1),
                ],
            );
        }
    }

    for user in user_types {
        let us = user.service(service);
        let rows = estimate_breakdown_with(user, us.total, us.completed);
        demographics_page(
            &mut b,
            user,
            &rows,
            &format!("{} - {} Demographics", user.user_type, service.label()),
        );
    }
    b.finish(format!("WMSU {} {} Demographics", service.label(), report_type.title()))
}

fn render_or_fail(doc: &ReportDocument, logo: Option<&LogoAsset>) -> Result<Vec<u8>, ReportError> {
    tracing::info!(title = %doc.title, pages = doc.page_count(), "rendering PDF");
    render_pdf(doc, logo).map_err(|e| generation_failed(&doc.title, e))
}

/// Logs the underlying cause and hides it behind a generic message.
fn generation_failed(title: &str, cause: ReportError) -> ReportError {
    tracing::error!(error = %cause, title, "PDF generation failed");
    ReportError::Generation("Failed to generate PDF report".to_string())
}

pub fn generate_pdf_report(
    stats: &StatsData,
    user_types: &[UserTypeData],
    report_type: ReportType,
    generated_on: NaiveDate,
    logo: Option<&LogoAsset>,
) -> Result<Vec<u8>, ReportError> {
    let doc = build_report_document(stats, user_types, report_type, generated_on);
    render_or_fail(&doc, logo)
}

pub fn generate_service_pdf_report(
    service: ServiceKind,
    stats: &StatsData,
    user_types: &[UserTypeData],
    report_type: ReportType,
    generated_on: NaiveDate,
    logo: Option<&LogoAsset>,
) -> Result<Vec<u8>, ReportError> {
    let doc = build_service_document(service, stats, user_types, report_type, generated_on);
    render_or_fail(&doc, logo)
}

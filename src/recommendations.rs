use crate::layout::{palette, RgbColor};
use crate::types::UserTypeData;

pub const MAX_RECOMMENDATIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceBadge {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl PerformanceBadge {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 80.0 {
            PerformanceBadge::Excellent
        } else if rate >= 60.0 {
            PerformanceBadge::Good
        } else if rate >= 40.0 {
            PerformanceBadge::Fair
        } else {
            PerformanceBadge::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceBadge::Excellent => "Excellent",
            PerformanceBadge::Good => "Good",
            PerformanceBadge::Fair => "Fair",
            PerformanceBadge::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn color(self) -> RgbColor {
        match self {
            PerformanceBadge::Excellent => palette::GREEN,
            PerformanceBadge::Good => palette::BLUE,
            PerformanceBadge::Fair => palette::AMBER,
            PerformanceBadge::NeedsImprovement => palette::RED,
        }
    }
}

/// Canned advice for one user type, at most [`MAX_RECOMMENDATIONS`] lines.
pub fn recommendations_for(user: &UserTypeData) -> Vec<String> {
    let rate = user.completion_rate();
    let mut out = Vec::new();

    if user.total_transactions == 0 {
        out.push(format!(
            "No transactions recorded for {}; verify registration and outreach.",
            user.user_type
        ));
    } else if user.total_transactions < 10 {
        out.push("Low service utilization; consider targeted health information campaigns.".to_string());
    }

    if user.total_transactions > 0 && rate < 60.0 {
        out.push(format!(
            "Completion rate is {rate:.1}%; review bottlenecks in request processing."
        ));
    }
    if user.medical.pending > user.medical.completed {
        out.push(format!(
            "Medical backlog: {} pending vs {} completed; schedule additional consultation slots.",
            user.medical.pending, user.medical.completed
        ));
    }
    if user.dental.pending > user.dental.completed {
        out.push(format!(
            "Dental backlog: {} pending vs {} completed; prioritize dental appointment capacity.",
            user.dental.pending, user.dental.completed
        ));
    }
    if user.certificates.pending > user.certificates.completed {
        out.push("Certificate requests are accumulating; streamline document release.".to_string());
    }
    if user.required_field_count() > 5 {
        out.push(format!(
            "{} required profile fields; simplifying intake may speed up service.",
            user.required_field_count()
        ));
    }
    if rate >= 90.0 && user.total_transactions >= 10 {
        out.push("Excellent completion rate; maintain current service workflow.".to_string());
    }

    if out.is_empty() {
        out.push("Service delivery is on track; continue regular monitoring.".to_string());
    }
    out.truncate(MAX_RECOMMENDATIONS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ServiceCounts, UserTypeConfiguration};

    fn user(total: u64, completed: u64) -> UserTypeData {
        UserTypeData {
            user_type: "College".into(),
            total_transactions: total,
            completed_transactions: completed,
            ..Default::default()
        }
    }

    #[test]
    fn eighty_percent_is_excellent_and_green() {
        let u = user(50, 40);
        assert_eq!(format!("{:.1}", u.completion_rate()), "80.0");
        let badge = PerformanceBadge::from_rate(u.completion_rate());
        assert_eq!(badge, PerformanceBadge::Excellent);
        assert_eq!(badge.color(), palette::GREEN);
    }

    #[test]
    fn badge_thresholds() {
        assert_eq!(PerformanceBadge::from_rate(79.9), PerformanceBadge::Good);
        assert_eq!(PerformanceBadge::from_rate(60.0), PerformanceBadge::Good);
        assert_eq!(PerformanceBadge::from_rate(40.0), PerformanceBadge::Fair);
        assert_eq!(PerformanceBadge::from_rate(0.0), PerformanceBadge::NeedsImprovement);
    }

    #[test]
    fn never_more_than_four_lines() {
        let u = UserTypeData {
            user_type: "Employee".into(),
            total_transactions: 5,
            completed_transactions: 1,
            medical: ServiceCounts::new(3, 0, 3, 0),
            dental: ServiceCounts::new(1, 0, 1, 0),
            certificates: ServiceCounts::new(1, 0, 1, 0),
            configuration: Some(UserTypeConfiguration {
                enabled: true,
                required_fields: (0..8).map(|i| format!("f{i}")).collect(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let recs = recommendations_for(&u);
        assert_eq!(recs.len(), MAX_RECOMMENDATIONS);
        assert!(recs[0].contains("Low service utilization"));
    }

    #[test]
    fn healthy_group_gets_a_single_line() {
        let recs = recommendations_for(&user(40, 30));
        assert_eq!(recs, vec!["Service delivery is on track; continue regular monitoring.".to_string()]);
    }

    #[test]
    fn empty_group_is_flagged() {
        let recs = recommendations_for(&user(0, 0));
        assert_eq!(recs.len(), 1);
        assert!(recs[0].starts_with("No transactions recorded for College"));
    }

    #[test]
    fn high_performers_are_told_to_keep_going() {
        let recs = recommendations_for(&user(100, 95));
        assert!(recs.iter().any(|r| r.starts_with("Excellent completion rate")));
    }
}

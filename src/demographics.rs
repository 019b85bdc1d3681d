// Secondary-dimension breakdowns for the demographics pages.
//
// The backend only reports totals per user type, so the per-group figures are
// estimates: shares are interpolated by rank over the configured groups and
// labelled as such on the page.
use crate::types::{UserTypeCategory, UserTypeData};
use crate::util::format_rate;

#[derive(Debug, Clone, PartialEq)]
pub struct DemographicShare {
    pub group: String,
    pub share: f64,
    pub estimated_count: u64,
    pub completion_rate: String,
}

pub fn dimension_for(category: UserTypeCategory) -> &'static str {
    match category {
        UserTypeCategory::College => "Course / College",
        UserTypeCategory::Employee => "Department",
        UserTypeCategory::SeniorHigh => "Strand",
        UserTypeCategory::HighSchool | UserTypeCategory::Elementary | UserTypeCategory::Kindergarten => {
            "Grade Level"
        }
        UserTypeCategory::Other => "Group",
    }
}

fn default_groups(category: UserTypeCategory) -> &'static [&'static str] {
    match category {
        UserTypeCategory::College => &[
            "College of Nursing",
            "College of Engineering",
            "College of Education",
            "College of Liberal Arts",
            "College of Computing Studies",
            "College of Science and Mathematics",
        ],
        UserTypeCategory::Employee => &["Teaching Faculty", "Administrative Staff", "Utility Personnel"],
        UserTypeCategory::SeniorHigh => &["STEM", "ABM", "HUMSS", "GAS", "TVL"],
        UserTypeCategory::HighSchool => &["Grade 7", "Grade 8", "Grade 9", "Grade 10"],
        UserTypeCategory::Elementary => &["Grade 1", "Grade 2", "Grade 3", "Grade 4", "Grade 5", "Grade 6"],
        UserTypeCategory::Kindergarten => &["Kinder 1", "Kinder 2"],
        UserTypeCategory::Other => &["All Patients"],
    }
}

/// Configured groups for the user type's dimension, or the category defaults.
pub fn groups_for(user: &UserTypeData) -> Vec<String> {
    let configured = user.configuration.as_ref().map(|c| match user.category {
        UserTypeCategory::College => &c.available_courses,
        UserTypeCategory::Employee => &c.available_departments,
        UserTypeCategory::SeniorHigh => &c.available_strands,
        _ => &c.year_levels,
    });
    match configured {
        Some(list) if !list.is_empty() => list
            .iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect(),
        _ => default_groups(user.category).iter().map(|g| g.to_string()).collect(),
    }
}

/// Rank-weighted split of the user type's transactions over its groups.
///
/// Group `i` of `n` gets weight `n - i`, so shares always sum to 100 and the
/// first configured group is the largest.
pub fn estimate_breakdown(user: &UserTypeData) -> Vec<DemographicShare> {
    estimate_breakdown_with(user, user.total_transactions, user.completed_transactions)
}

/// Same split, but over an explicit total (e.g. a single service's counts).
pub fn estimate_breakdown_with(user: &UserTypeData, total: u64, completed: u64) -> Vec<DemographicShare> {
    let groups = groups_for(user);
    let n = groups.len();
    if n == 0 {
        return Vec::new();
    }
    let weight_sum = (n * (n + 1) / 2) as f64;
    let rate = format_rate(completed, total);

    groups
        .into_iter()
        .enumerate()
        .map(|(i, group)| {
            let weight = (n - i) as f64 / weight_sum;
            DemographicShare {
                group,
                share: weight * 100.0,
                estimated_count: (total as f64 * weight).round() as u64,
                completion_rate: rate.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserTypeConfiguration;

    fn user(name: &str, total: u64, completed: u64) -> UserTypeData {
        UserTypeData {
            user_type: name.into(),
            category: UserTypeCategory::from_name(name),
            total_transactions: total,
            completed_transactions: completed,
            ..Default::default()
        }
    }

    #[test]
    fn shares_sum_to_one_hundred_and_decrease() {
        let u = user("Senior High School", 150, 120);
        let rows = estimate_breakdown(&u);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].group, "STEM");
        let total: f64 = rows.iter().map(|r| r.share).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!(rows.windows(2).all(|w| w[0].share > w[1].share));
        assert_eq!(rows[0].estimated_count, 50);
        assert!(rows.iter().all(|r| r.completion_rate == "80.0"));
    }

    #[test]
    fn configured_groups_win_over_defaults() {
        let mut u = user("College", 10, 5);
        u.configuration = Some(UserTypeConfiguration {
            enabled: true,
            available_courses: vec!["BS Nursing".into(), " ".into(), "BS Civil Engineering".into()],
            ..Default::default()
        });
        assert_eq!(groups_for(&u), vec!["BS Nursing", "BS Civil Engineering"]);
    }

    #[test]
    fn empty_configuration_falls_back() {
        let mut u = user("Employee", 0, 0);
        u.configuration = Some(UserTypeConfiguration::default());
        assert_eq!(groups_for(&u).len(), 3);
        let rows = estimate_breakdown(&u);
        assert!(rows.iter().all(|r| r.estimated_count == 0 && r.completion_rate == "0"));
    }

    #[test]
    fn explicit_totals_override_transactions() {
        let u = user("Kindergarten", 100, 100);
        let rows = estimate_breakdown_with(&u, 9, 3);
        assert_eq!(rows.iter().map(|r| r.estimated_count).collect::<Vec<_>>(), vec![6, 3]);
        assert_eq!(rows[0].completion_rate, "33.3");
    }

    #[test]
    fn dimension_follows_category() {
        assert_eq!(dimension_for(UserTypeCategory::Employee), "Department");
        assert_eq!(dimension_for(UserTypeCategory::Kindergarten), "Grade Level");
    }
}

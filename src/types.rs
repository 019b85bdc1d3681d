use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Status counts for one service (medical, dental or certificates).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub rejected: u64,
}

impl ServiceCounts {
    pub fn new(total: u64, completed: u64, pending: u64, rejected: u64) -> Self {
        Self { total, completed, pending, rejected }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub month: String,
    #[serde(default)]
    pub medical: u64,
    #[serde(default)]
    pub dental: u64,
    #[serde(default)]
    pub certificates: u64,
}

impl MonthlyTrend {
    pub fn total(&self) -> u64 {
        self.medical.saturating_add(self.dental).saturating_add(self.certificates)
    }
}

/// Consumable supply usage aggregated over appointments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity_used: u64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub appointments: u64,
}

/// Snapshot of service counts supplied by the backend for one report run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    #[serde(default)]
    pub medical: ServiceCounts,
    #[serde(default)]
    pub dental: ServiceCounts,
    #[serde(default)]
    pub certificates: ServiceCounts,
    #[serde(default)]
    pub monthly_trends: Vec<MonthlyTrend>,
    #[serde(default)]
    pub medical_inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub dental_inventory: Vec<InventoryItem>,
}

impl StatsData {
    pub fn service(&self, kind: ServiceKind) -> &ServiceCounts {
        match kind {
            ServiceKind::Medical => &self.medical,
            ServiceKind::Dental => &self.dental,
            ServiceKind::Certificates => &self.certificates,
        }
    }

    /// Sum of all three services.
    pub fn combined(&self) -> ServiceCounts {
        ServiceKind::ALL.iter().fold(ServiceCounts::default(), |acc, kind| {
            let s = self.service(*kind);
            ServiceCounts::new(
                acc.total.saturating_add(s.total),
                acc.completed.saturating_add(s.completed),
                acc.pending.saturating_add(s.pending),
                acc.rejected.saturating_add(s.rejected),
            )
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTypeConfiguration {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, alias = "requiredFields")]
    pub required_fields: Vec<String>,
    #[serde(default, alias = "availableCourses")]
    pub available_courses: Vec<String>,
    #[serde(default, alias = "availableDepartments")]
    pub available_departments: Vec<String>,
    #[serde(default, alias = "availableStrands")]
    pub available_strands: Vec<String>,
    #[serde(default, alias = "yearLevels")]
    pub year_levels: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

/// One patient segment (College, Employee, ...) and its service usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypeData {
    pub user_type: String,
    #[serde(default)]
    pub medical: ServiceCounts,
    #[serde(default)]
    pub dental: ServiceCounts,
    #[serde(default)]
    pub certificates: ServiceCounts,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub completed_transactions: u64,
    #[serde(default)]
    pub configuration: Option<UserTypeConfiguration>,
    /// Resolved by the loader from `user_type`.
    #[serde(skip)]
    pub category: UserTypeCategory,
}

impl UserTypeData {
    pub fn service(&self, kind: ServiceKind) -> &ServiceCounts {
        match kind {
            ServiceKind::Medical => &self.medical,
            ServiceKind::Dental => &self.dental,
            ServiceKind::Certificates => &self.certificates,
        }
    }

    pub fn service_total(&self) -> u64 {
        self.medical
            .total
            .saturating_add(self.dental.total)
            .saturating_add(self.certificates.total)
    }

    pub fn service_completed(&self) -> u64 {
        self.medical
            .completed
            .saturating_add(self.dental.completed)
            .saturating_add(self.certificates.completed)
    }

    /// Completed transactions as a percentage of all transactions; 0 when there are none.
    pub fn completion_rate(&self) -> f64 {
        if self.total_transactions == 0 {
            0.0
        } else {
            self.completed_transactions as f64 / self.total_transactions as f64 * 100.0
        }
    }

    pub fn required_field_count(&self) -> usize {
        self.configuration.as_ref().map(|c| c.required_fields.len()).unwrap_or(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.configuration.as_ref().map(|c| c.enabled).unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Medical,
    Dental,
    Certificates,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [ServiceKind::Medical, ServiceKind::Dental, ServiceKind::Certificates];

    pub fn label(self) -> &'static str {
        match self {
            ServiceKind::Medical => "Medical",
            ServiceKind::Dental => "Dental",
            ServiceKind::Certificates => "Certificates",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "medical" => Ok(ServiceKind::Medical),
            "dental" => Ok(ServiceKind::Dental),
            "certificates" | "certificate" => Ok(ServiceKind::Certificates),
            other => Err(format!("unknown service type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Weekly => "weekly",
            ReportType::Monthly => "monthly",
            ReportType::Yearly => "yearly",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportType::Weekly => "Weekly",
            ReportType::Monthly => "Monthly",
            ReportType::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient segment family, decides which secondary dimension a demographics page uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UserTypeCategory {
    College,
    Employee,
    SeniorHigh,
    HighSchool,
    Elementary,
    Kindergarten,
    #[default]
    Other,
}

impl UserTypeCategory {
    pub fn from_name(name: &str) -> Self {
        let n = name.to_lowercase();
        // "senior high school" also contains "high school"
        if n.contains("senior high") || n.contains("shs") {
            UserTypeCategory::SeniorHigh
        } else if n.contains("high school") || n.contains("junior high") {
            UserTypeCategory::HighSchool
        } else if n.contains("college") || n.contains("freshman") || n.contains("university") {
            UserTypeCategory::College
        } else if n.contains("employee") || n.contains("faculty") || n.contains("staff") {
            UserTypeCategory::Employee
        } else if n.contains("elementary") || n.contains("grade school") {
            UserTypeCategory::Elementary
        } else if n.contains("kinder") {
            UserTypeCategory::Kindergarten
        } else {
            UserTypeCategory::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    #[serde(default)]
    pub stats: StatsData,
    #[serde(default)]
    pub user_types: Vec<UserTypeData>,
}

/// Console preview row for the ranked demographics table.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct UserTypeRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "UserType")]
    pub user_type: String,
    #[tabled(rename = "Medical")]
    pub medical: u64,
    #[tabled(rename = "Dental")]
    pub dental: u64,
    #[tabled(rename = "Certificates")]
    pub certificates: u64,
    #[tabled(rename = "Total")]
    pub total: u64,
    #[tabled(rename = "CompletionRate")]
    pub completion_rate: String,
}

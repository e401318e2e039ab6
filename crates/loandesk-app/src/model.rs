// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use crate::ids::ApplicationId;

pub const MISSING_VALUE: &str = "-";
const UNNAMED_APPLICANT: &str = "(unnamed)";
const OTHER_LOAN_TYPE: &str = "other";

/// One loan application as the backend reports it. Every field except the id
/// is optional; the record is displayed as-is and never validated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(alias = "_id")]
    pub id: ApplicationId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", alias = "phone")]
    pub phone_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        alias = "alternateNumber",
        alias = "secondaryContact"
    )]
    pub alternate_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", alias = "dob")]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", alias = "loanCategory")]
    pub loan_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub other_loan_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub referral1_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub referral1_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub referral2_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub referral2_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", alias = "submittedAt")]
    pub created_at: Option<String>,
}

impl Application {
    pub fn new(id: impl Into<ApplicationId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            phone_number: None,
            alternate_phone: None,
            gender: None,
            date_of_birth: None,
            loan_type: None,
            other_loan_type: None,
            address: None,
            referral1_name: None,
            referral1_phone: None,
            referral2_name: None,
            referral2_phone: None,
            created_at: None,
        }
    }

    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref()).unwrap_or(UNNAMED_APPLICANT)
    }

    /// Parses the submission timestamp. Accepts RFC 3339 and bare
    /// `YYYY-MM-DD` dates (taken as midnight UTC).
    pub fn submitted_at(&self) -> Option<OffsetDateTime> {
        let raw = non_blank(self.created_at.as_deref())?;
        if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
            return Some(parsed);
        }
        Date::parse(raw, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(|date| date.with_time(Time::MIDNIGHT).assume_utc())
    }

    pub fn display_loan_type(&self) -> Option<String> {
        let loan_type = non_blank(self.loan_type.as_deref())?;
        match non_blank(self.other_loan_type.as_deref()) {
            Some(other) if loan_type.eq_ignore_ascii_case(OTHER_LOAN_TYPE) => {
                Some(format!("{loan_type} ({other})"))
            }
            _ => Some(loan_type.to_owned()),
        }
    }

    pub fn display_submitted(&self) -> String {
        match self.submitted_at() {
            Some(at) => at
                .format(format_description!(
                    "[year]-[month]-[day] [hour]:[minute] UTC"
                ))
                .unwrap_or_else(|_| MISSING_VALUE.to_owned()),
            None => or_placeholder(self.created_at.as_deref()),
        }
    }

    pub fn pdf_file_name(&self) -> String {
        let name = slug(self.name.as_deref().unwrap_or_default());
        let name = if name.is_empty() {
            "applicant".to_owned()
        } else {
            name
        };
        format!("loan-application-{name}-{}.pdf", slug(self.id.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

pub fn detail_fields(application: &Application) -> Vec<DetailField> {
    let field = |label, value: Option<&str>| DetailField {
        label,
        value: or_placeholder(value),
    };

    vec![
        field("Application ID", Some(application.id.as_str())),
        field("Name", application.name.as_deref()),
        field("Phone", application.phone_number.as_deref()),
        field("Alternate phone", application.alternate_phone.as_deref()),
        field("Gender", application.gender.as_deref()),
        field("Date of birth", application.date_of_birth.as_deref()),
        field("Loan type", application.display_loan_type().as_deref()),
        field("Address", application.address.as_deref()),
        field("Referral 1 name", application.referral1_name.as_deref()),
        field("Referral 1 phone", application.referral1_phone.as_deref()),
        field("Referral 2 name", application.referral2_name.as_deref()),
        field("Referral 2 phone", application.referral2_phone.as_deref()),
        DetailField {
            label: "Submitted",
            value: application.display_submitted(),
        },
    ]
}

pub fn or_placeholder(value: Option<&str>) -> String {
    non_blank(value).unwrap_or(MISSING_VALUE).to_owned()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_owned()
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Text(String),
        Integer(i64),
        Float(f64),
        Flag(bool),
    }

    let value = Option::<Wire>::deserialize(deserializer)?;
    Ok(value.map(|value| match value {
        Wire::Text(text) => text,
        Wire::Integer(number) => number.to_string(),
        Wire::Float(number) => number.to_string(),
        Wire::Flag(flag) => flag.to_string(),
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Count(u64),
    Real(f64),
    Text(String),
}

impl WireNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Count(count) => Some(*count as f64),
            Self::Real(real) => Some(*real),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = WireNumber::deserialize(deserializer)?;
    if let WireNumber::Count(count) = value {
        return Ok(count);
    }
    if let WireNumber::Text(text) = &value
        && let Ok(count) = text.trim().parse::<u64>()
    {
        return Ok(count);
    }
    match value.as_f64() {
        Some(real) if real.is_finite() && real >= 0.0 && real.fract() == 0.0 => Ok(real as u64),
        _ => Err(D::Error::custom("expected a non-negative whole document count")),
    }
}

fn lenient_percentage<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    WireNumber::deserialize(deserializer)?
        .as_f64()
        .filter(|real| real.is_finite())
        .ok_or_else(|| D::Error::custom("expected a numeric storage percentage"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    Normal,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}

impl StorageTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }
}

/// Capacity snapshot for the document store, reported by `/storage-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    #[serde(deserialize_with = "lenient_count")]
    pub used_documents: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub max_documents: u64,
    #[serde(deserialize_with = "lenient_percentage")]
    pub percentage: f64,
    pub status: StorageTier,
}

impl StorageStatus {
    /// Fill ratio for a gauge, clamped to `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        if !self.percentage.is_finite() {
            return 0.0;
        }
        (self.percentage / 100.0).clamp(0.0, 1.0)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} / {} documents ({:.0}%, {})",
            self.used_documents,
            self.max_documents,
            self.percentage,
            self.status.as_str()
        )
    }
}

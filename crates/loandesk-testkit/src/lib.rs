// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use loandesk_app::{Application, StorageStatus, StorageTier};
use time::format_description::well_known::Rfc3339;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const FIRST_NAMES: [&str; 16] = [
    "Asha", "Ravi", "Meera", "Arjun", "Priya", "Kiran", "Neha", "Vikram", "Ananya", "Rohan",
    "Divya", "Sanjay", "Lakshmi", "Farhan", "Ishita", "Gopal",
];
const LAST_NAMES: [&str; 14] = [
    "Rao", "Kumar", "Shah", "Iyer", "Patel", "Nair", "Reddy", "Menon", "Gupta", "Das", "Khan",
    "Pillai", "Joshi", "Verma",
];
const LOAN_TYPES: [&str; 6] = ["Home", "Vehicle", "Personal", "Business", "Gold", "Other"];
const OTHER_LOAN_TYPES: [&str; 4] = ["Solar panels", "Education", "Medical", "Wedding"];
const GENDERS: [&str; 3] = ["Female", "Male", "Other"];
const STREETS: [&str; 10] = [
    "MG Road",
    "Station Road",
    "Temple Street",
    "Lake View",
    "Market Lane",
    "Park Avenue",
    "Gandhi Nagar",
    "Church Street",
    "Hill Road",
    "Canal Road",
];
const CITIES: [&str; 8] = [
    "Bengaluru",
    "Chennai",
    "Hyderabad",
    "Pune",
    "Kochi",
    "Mysuru",
    "Madurai",
    "Nagpur",
];

/// Fixed "now" shared by tests that exercise the recent-submissions window.
pub const FIXTURE_NOW: OffsetDateTime = datetime!(2026-10-19 12:00 UTC);

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

#[derive(Debug, Clone)]
pub struct ApplicantFaker {
    rng: DeterministicRng,
}

impl ApplicantFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    /// One application submitted at `submitted`. Optional fields are left
    /// blank now and then, the way real submissions arrive.
    pub fn application(&mut self, id: i64, submitted: OffsetDateTime) -> Application {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let loan_type = self.pick(&LOAN_TYPES);

        let mut application = Application::new(id);
        application.name = Some(format!("{first} {last}"));
        application.phone_number = Some(self.phone());
        application.alternate_phone = self.rng.chance(60).then(|| self.phone());
        application.gender = Some(self.pick(&GENDERS).to_owned());
        application.date_of_birth = Some(format!(
            "{}-{:02}-{:02}",
            1960 + self.rng.int_n(45),
            1 + self.rng.int_n(12),
            1 + self.rng.int_n(28)
        ));
        application.loan_type = Some(loan_type.to_owned());
        if loan_type == "Other" {
            application.other_loan_type = Some(self.pick(&OTHER_LOAN_TYPES).to_owned());
        }
        application.address = Some(format!(
            "{} {}, {}",
            1 + self.rng.int_n(400),
            self.pick(&STREETS),
            self.pick(&CITIES)
        ));
        application.referral1_name = Some(self.full_name());
        application.referral1_phone = Some(self.phone());
        if self.rng.chance(70) {
            application.referral2_name = Some(self.full_name());
            application.referral2_phone = Some(self.phone());
        }
        application.created_at = submitted.format(&Rfc3339).ok();
        application
    }

    /// `count` applications with ids `1..=count`, submitted over the 30 days
    /// before `now`.
    pub fn applications(&mut self, count: usize, now: OffsetDateTime) -> Vec<Application> {
        (1..=count)
            .map(|index| {
                let minutes_back = self.rng.int_n(30 * 24 * 60) as i64;
                self.application(index as i64, now - Duration::minutes(minutes_back))
            })
            .collect()
    }

    fn full_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    fn phone(&mut self) -> String {
        format!(
            "9{}{:08}",
            self.rng.int_n(10),
            self.rng.next_u64() % 100_000_000
        )
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

pub fn application(
    id: i64,
    name: &str,
    loan_type: &str,
    submitted: OffsetDateTime,
) -> Application {
    let mut application = Application::new(id);
    application.name = Some(name.to_owned());
    application.loan_type = Some(loan_type.to_owned());
    application.created_at = submitted.format(&Rfc3339).ok();
    application
}

pub fn storage_status(used: u64, max: u64) -> StorageStatus {
    let percentage = if max == 0 {
        0.0
    } else {
        used as f64 * 100.0 / max as f64
    };
    let status = if percentage >= 90.0 {
        StorageTier::Critical
    } else if percentage >= 75.0 {
        StorageTier::Warning
    } else {
        StorageTier::Normal
    };
    StorageStatus {
        used_documents: used,
        max_documents: max,
        percentage,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplicantFaker, FIXTURE_NOW, application, storage_status};
    use loandesk_app::StorageTier;
    use std::collections::BTreeSet;
    use time::Duration;

    #[test]
    fn new_deterministic_seed() {
        let mut left = ApplicantFaker::new(42);
        let mut right = ApplicantFaker::new(42);
        assert_eq!(
            left.applications(5, FIXTURE_NOW),
            right.applications(5, FIXTURE_NOW)
        );
    }

    #[test]
    fn applications_have_unique_ids_and_recent_timestamps() {
        let mut faker = ApplicantFaker::new(7);
        let applications = faker.applications(45, FIXTURE_NOW);
        let ids = applications
            .iter()
            .map(|application| application.id.clone())
            .collect::<BTreeSet<_>>();
        assert_eq!(ids.len(), 45);

        for application in &applications {
            let submitted = application.submitted_at().expect("timestamp parses");
            assert!(submitted <= FIXTURE_NOW);
            assert!(submitted >= FIXTURE_NOW - Duration::days(30));
            assert!(application.name.is_some());
        }
    }

    #[test]
    fn other_loan_type_carries_free_text() {
        let mut faker = ApplicantFaker::new(3);
        for application in faker.applications(60, FIXTURE_NOW) {
            let is_other = application.loan_type.as_deref() == Some("Other");
            assert_eq!(is_other, application.other_loan_type.is_some());
        }
    }

    #[test]
    fn minimal_application_round_trips_timestamp() {
        let record = application(9, "Asha Rao", "Home", FIXTURE_NOW);
        assert_eq!(record.submitted_at(), Some(FIXTURE_NOW));
    }

    #[test]
    fn storage_tier_follows_percentage() {
        assert_eq!(storage_status(10, 100).status, StorageTier::Normal);
        assert_eq!(storage_status(80, 100).status, StorageTier::Warning);
        assert_eq!(storage_status(95, 100).status, StorageTier::Critical);
        assert_eq!(storage_status(0, 0).percentage, 0.0);
    }
}

//! Vehicles Module
//!
//! Fleet domain model plus the client-side formatting, validation, and
//! page-local filtering used by the registration and list screens.

use serde::{Deserialize, Serialize};

/// A registered motorcycle, as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    pub license_plate: String,
    pub vehicle_model: VehicleModel,
}

/// Fleet model line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleModel {
    E,
    #[serde(rename = "SPORT")]
    Sport,
    #[serde(rename = "POP")]
    Pop,
}

impl VehicleModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleModel::E => "E",
            VehicleModel::Sport => "SPORT",
            VehicleModel::Pop => "POP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "E" => Some(VehicleModel::E),
            "SPORT" => Some(VehicleModel::Sport),
            "POP" => Some(VehicleModel::Pop),
            _ => None,
        }
    }
}

impl std::fmt::Display for VehicleModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient registration form, discarded after navigation away
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub plate: String,
    pub entry_date: String,
    pub model: VehicleModel,
}

impl RegistrationForm {
    /// Plate with grouping stripped, as the server expects it
    pub fn plate_clean(&self) -> String {
        self.plate.replace('-', "").to_uppercase()
    }
}

/// Format a plate as `AAA-NNNN` while typing.
///
/// Non-alphanumerics are stripped and the input is uppercased. Up to three
/// characters are left ungrouped; anything past seven significant characters
/// is truncated.
pub fn format_plate(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if cleaned.len() <= 3 {
        cleaned
    } else {
        let tail_end = cleaned.len().min(7);
        format!("{}-{}", &cleaned[..3], &cleaned[3..tail_end])
    }
}

/// Format a date as `DD/MM/YYYY` while typing, truncating beyond 8 digits.
pub fn format_date(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        0..=2 => digits,
        3..=4 => format!("{}/{}", &digits[..2], &digits[2..]),
        5..=8 => format!("{}/{}/{}", &digits[..2], &digits[2..4], &digits[4..]),
        _ => format!("{}/{}/{}", &digits[..2], &digits[2..4], &digits[4..8]),
    }
}

/// Field-keyed validation errors, surfaced inline by the frontend
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.plate.is_none()
            && self.entry_date.is_none()
    }
}

/// Validate login credentials before any network call
pub fn validate_login(email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();

    let email = email.trim();
    if email.is_empty() {
        errors.email = Some("Email is required".into());
    } else if !is_valid_email(email) {
        errors.email = Some("Invalid email address".into());
    }

    if password.trim().is_empty() {
        errors.password = Some("Password is required".into());
    } else if password.len() < 6 {
        errors.password = Some("Password must be at least 6 characters".into());
    }

    errors
}

/// Validate the registration form before submission
pub fn validate_registration(form: &RegistrationForm) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if form.plate_clean().len() != 7 {
        errors.plate = Some("Plate must have 7 characters".into());
    }

    if form.entry_date.len() != 10 {
        errors.entry_date = Some("Invalid date".into());
    }

    errors
}

// Local-part, @, domain with a dot. No whitespace anywhere.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Plate and model filters applied to one fetched page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilters {
    #[serde(default)]
    pub plate_search: String,
    #[serde(default)]
    pub model: Option<VehicleModel>,
}

/// Apply the search and model filters to a fetched page.
///
/// Filtering is page-local: a vehicle matching on another page stays
/// invisible until that page is fetched. The two filters are independent
/// and commutative.
pub fn filter_page(vehicles: &[Vehicle], filters: &ListFilters) -> Vec<Vehicle> {
    let search = filters.plate_search.to_lowercase();

    vehicles
        .iter()
        .filter(|v| search.is_empty() || v.license_plate.to_lowercase().contains(&search))
        .filter(|v| filters.model.map_or(true, |m| v.vehicle_model == m))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(id: &str, plate: &str, model: VehicleModel) -> Vehicle {
        Vehicle {
            vehicle_id: Some(id.to_string()),
            license_plate: plate.to_string(),
            vehicle_model: model,
        }
    }

    #[test]
    fn plate_formatter_groups_as_aaa_nnnn() {
        assert_eq!(format_plate("ABC1234"), "ABC-1234");
    }

    #[test]
    fn plate_formatter_leaves_short_input_ungrouped() {
        assert_eq!(format_plate(""), "");
        assert_eq!(format_plate("A"), "A");
        assert_eq!(format_plate("abc"), "ABC");
    }

    #[test]
    fn plate_formatter_normalizes_and_strips() {
        assert_eq!(format_plate("abc-12 34"), "ABC-1234");
        assert_eq!(format_plate("a!b@c#1$2%3^4"), "ABC-1234");
    }

    #[test]
    fn plate_formatter_truncates_past_seven_chars() {
        assert_eq!(format_plate("ABC123456789"), "ABC-1234");
    }

    #[test]
    fn plate_formatter_groups_partial_input() {
        assert_eq!(format_plate("ABC1"), "ABC-1");
        assert_eq!(format_plate("ABC12"), "ABC-12");
    }

    #[test]
    fn date_formatter_groups_as_dd_mm_yyyy() {
        assert_eq!(format_date("01022024"), "01/02/2024");
    }

    #[test]
    fn date_formatter_handles_partial_input() {
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("01"), "01");
        assert_eq!(format_date("0102"), "01/02");
        assert_eq!(format_date("010220"), "01/02/20");
    }

    #[test]
    fn date_formatter_truncates_past_eight_digits() {
        assert_eq!(format_date("010220249999"), "01/02/2024");
    }

    #[test]
    fn date_formatter_ignores_non_digits() {
        assert_eq!(format_date("01a02b2024"), "01/02/2024");
    }

    #[test]
    fn login_validation_rejects_empty_email() {
        let errors = validate_login("", "secret123");
        assert!(errors.email.is_some());
        assert!(errors.password.is_none());
    }

    #[test]
    fn login_validation_rejects_malformed_email() {
        assert!(validate_login("nobody", "secret123").email.is_some());
        assert!(validate_login("nobody@", "secret123").email.is_some());
        assert!(validate_login("nobody@host", "secret123").email.is_some());
        assert!(validate_login("no body@host.com", "secret123").email.is_some());
    }

    #[test]
    fn login_validation_rejects_short_password() {
        let errors = validate_login("rider@fleet.com", "12345");
        assert!(errors.password.is_some());
    }

    #[test]
    fn login_validation_rejects_empty_password() {
        let errors = validate_login("rider@fleet.com", "");
        assert!(errors.password.is_some());
    }

    #[test]
    fn login_validation_accepts_valid_credentials() {
        let errors = validate_login("rider@fleet.com", "secret123");
        assert!(errors.is_empty());
    }

    #[test]
    fn registration_validation_rejects_short_plate() {
        let form = RegistrationForm {
            plate: "ABC-12".into(),
            entry_date: "01/02/2024".into(),
            model: VehicleModel::E,
        };
        assert!(validate_registration(&form).plate.is_some());
    }

    #[test]
    fn registration_validation_rejects_partial_date() {
        let form = RegistrationForm {
            plate: "ABC-1234".into(),
            entry_date: "01/02/24".into(),
            model: VehicleModel::Sport,
        };
        assert!(validate_registration(&form).entry_date.is_some());
    }

    #[test]
    fn registration_validation_accepts_complete_form() {
        let form = RegistrationForm {
            plate: "ABC-1234".into(),
            entry_date: "01/02/2024".into(),
            model: VehicleModel::Pop,
        };
        assert!(validate_registration(&form).is_empty());
    }

    #[test]
    fn plate_clean_strips_grouping() {
        let form = RegistrationForm {
            plate: "abc-1234".into(),
            entry_date: "01/02/2024".into(),
            model: VehicleModel::E,
        };
        assert_eq!(form.plate_clean(), "ABC1234");
    }

    fn sample_page() -> Vec<Vehicle> {
        vec![
            vehicle("1", "ABC1234", VehicleModel::E),
            vehicle("2", "XYZ9876", VehicleModel::Sport),
            vehicle("3", "ABD5678", VehicleModel::E),
            vehicle("4", "QRS4321", VehicleModel::Pop),
        ]
    }

    #[test]
    fn plate_filter_is_case_insensitive_substring() {
        let filters = ListFilters { plate_search: "ab".into(), model: None };
        let result = filter_page(&sample_page(), &filters);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|v| v.license_plate.starts_with("AB")));
    }

    #[test]
    fn model_filter_is_exact_match() {
        let filters = ListFilters { plate_search: String::new(), model: Some(VehicleModel::E) };
        let result = filter_page(&sample_page(), &filters);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn filters_commute() {
        let page = sample_page();
        let both = ListFilters { plate_search: "ab".into(), model: Some(VehicleModel::E) };

        // plate-then-model
        let plate_only = ListFilters { plate_search: "ab".into(), model: None };
        let model_only = ListFilters { plate_search: String::new(), model: Some(VehicleModel::E) };
        let first = filter_page(&filter_page(&page, &plate_only), &model_only);
        let second = filter_page(&filter_page(&page, &model_only), &plate_only);

        assert_eq!(first, second);
        assert_eq!(first, filter_page(&page, &both));
    }

    #[test]
    fn filtering_is_idempotent() {
        let page = sample_page();
        let filters = ListFilters { plate_search: "ab".into(), model: Some(VehicleModel::E) };

        let once = filter_page(&page, &filters);
        let twice = filter_page(&once, &filters);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_filters_keep_the_whole_page() {
        let page = sample_page();
        assert_eq!(filter_page(&page, &ListFilters::default()), page);
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::phone::{format_phone, has_digit};
use super::ValidationError;
use crate::models::{FlueType, InstallationRecord, Labels};

/// Raw form values as typed by the technician.
///
/// Values are kept verbatim so a locked form can be reopened for editing
/// with exactly what was entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDraft {
    pub site_address: String,
    pub model_name: String,
    pub max_gas_consumption: String,
    pub flue_type: String,
    pub installer_company: String,
    pub installer_name: String,
    pub installer_phone: String,
    /// `YYYY-MM-DD`
    pub work_date: String,
}

impl RecordDraft {
    /// Validate and normalize into an `InstallationRecord`.
    ///
    /// All empty required fields are reported together, using the form
    /// names from `labels`. A gas consumption value without any digit is
    /// reported alongside them.
    pub fn validate(&self, labels: &Labels) -> Result<InstallationRecord, ValidationError> {
        let phone = format_phone(self.installer_phone.trim());
        let gas = self.max_gas_consumption.trim();

        let required = [
            (labels.rows[0], self.site_address.trim()),
            (labels.rows[1], self.model_name.trim()),
            (labels.rows[2], gas),
            (labels.rows[4], self.installer_company.trim()),
            (labels.installer_name_field, self.installer_name.trim()),
            (labels.installer_phone_field, phone.trim()),
            (labels.rows[6], self.work_date.trim()),
        ];

        let mut missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(label, _)| label.to_string())
            .collect();
        if !has_digit(gas) {
            missing.push(labels.gas_digit_rule.to_string());
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let flue_type = match self.flue_type.trim() {
            "" => FlueType::default(),
            code => code.parse::<FlueType>()?,
        };

        let date_text = self.work_date.trim();
        let work_date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidWorkDate(date_text.to_string()))?;

        Ok(InstallationRecord {
            site_address: self.site_address.trim().to_string(),
            model_name: self.model_name.trim().to_string(),
            max_gas_consumption: gas.to_string(),
            flue_type,
            installer_company: self.installer_company.trim().to_string(),
            installer_name: self.installer_name.trim().to_string(),
            installer_phone: phone.trim().to_string(),
            work_date,
        })
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::FlueType;
use super::labels::{Labels, METADATA_ROW_COUNT};

/// Validated installation metadata, ready for the document table.
///
/// Built only through `RecordDraft::validate`, so every text field is
/// trimmed and non-empty and `installer_phone` is already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationRecord {
    pub site_address: String,
    pub model_name: String,
    /// Free text, contains at least one digit.
    pub max_gas_consumption: String,
    pub flue_type: FlueType,
    pub installer_company: String,
    pub installer_name: String,
    pub installer_phone: String,
    pub work_date: NaiveDate,
}

impl InstallationRecord {
    /// `"<name> / <phone>"` as printed in the installer row.
    pub fn installer_line(&self) -> String {
        format!("{} / {}", self.installer_name, self.installer_phone)
    }

    /// Table rows as (label, value), in the fixed document order.
    pub fn rows(&self, labels: &Labels) -> [(&'static str, String); METADATA_ROW_COUNT] {
        let mut values = [
            self.site_address.clone(),
            self.model_name.clone(),
            self.max_gas_consumption.clone(),
            self.flue_type.as_str().to_string(),
            self.installer_company.clone(),
            self.installer_line(),
            self.work_date.format("%Y-%m-%d").to_string(),
        ];
        std::array::from_fn(|i| (labels.rows[i], std::mem::take(&mut values[i])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabelSet;

    fn sample() -> InstallationRecord {
        InstallationRecord {
            site_address: "12 Harbour Road, Busan".into(),
            model_name: "NCB553-24K".into(),
            max_gas_consumption: "20,800".into(),
            flue_type: FlueType::Fe,
            installer_company: "Blue Flame Co.".into(),
            installer_name: "Kim Minjun".into(),
            installer_phone: "010-1234-5678".into(),
            work_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        }
    }

    #[test]
    fn installer_line_joins_name_and_phone() {
        assert_eq!(sample().installer_line(), "Kim Minjun / 010-1234-5678");
    }

    #[test]
    fn rows_in_fixed_order() {
        let rows = sample().rows(LabelSet::English.labels());
        let values: Vec<&str> = rows.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(
            values,
            vec![
                "12 Harbour Road, Busan",
                "NCB553-24K",
                "20,800",
                "FE",
                "Blue Flame Co.",
                "Kim Minjun / 010-1234-5678",
                "2024-03-09",
            ]
        );
        assert_eq!(rows[0].0, "Site address");
        assert_eq!(rows[6].0, "Work date");
    }

    #[test]
    fn korean_rows_use_korean_labels() {
        let rows = sample().rows(LabelSet::Korean.labels());
        assert_eq!(rows[0].0, "설치장소(주소)");
        assert_eq!(rows[5].0, "시공자 (이름/연락처)");
    }
}

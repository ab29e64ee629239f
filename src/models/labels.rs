//! Fixed wording printed on the submission document.
//!
//! Each `LabelSet` carries the full vocabulary of one form revision: the
//! document title, the seven metadata row labels, the eight photo captions,
//! and the form-field names used in validation messages.

use super::enums::LabelSet;
use crate::config::PHOTO_SLOT_COUNT;

/// Number of metadata rows in the document table.
pub const METADATA_ROW_COUNT: usize = 7;

#[derive(Debug)]
pub struct Labels {
    pub title: &'static str,
    /// Metadata table labels, in row order.
    pub rows: [&'static str; METADATA_ROW_COUNT],
    /// Photo captions, in slot order (row-major, 4 per row).
    pub captions: [&'static str; PHOTO_SLOT_COUNT],
    /// Text shown in a slot without a photo.
    pub no_photo: &'static str,
    /// Form-field names that only exist before the installer row is joined.
    pub installer_name_field: &'static str,
    pub installer_phone_field: &'static str,
    /// Shown when the gas consumption field has no digit.
    pub gas_digit_rule: &'static str,
    /// Appended to the sanitized site address to build the download name.
    pub filename_suffix: &'static str,
}

static KOREAN: Labels = Labels {
    title: "경동나비엔 가스보일러 설치/교체현장 제출 서류 양식",
    rows: [
        "설치장소(주소)",
        "모델명",
        "최대가스소비량(kcal/h)",
        "급배기방식",
        "설치업체명",
        "시공자 (이름/연락처)",
        "시공연월일",
    ],
    captions: [
        "1. 가스보일러 전면사진",
        "2. 배기통(실내)",
        "3. 배기통(실외)",
        "4. 일산화탄소 경보기",
        "5. 시공표지판",
        "6. 명판",
        "7. 플랙시블호스/가스밸브",
        "8. 기타",
    ],
    no_photo: "(사진 없음)",
    installer_name_field: "시공자 이름",
    installer_phone_field: "시공자 연락처",
    gas_digit_rule: "최대가스소비량(숫자 포함)",
    filename_suffix: "설치교체현장_제출서류",
};

static ENGLISH: Labels = Labels {
    title: "Gas Water Heater Installation / Replacement Submission",
    rows: [
        "Site address",
        "Model name",
        "Max gas consumption (kcal/h)",
        "Flue type",
        "Installer company",
        "Installer (name / phone)",
        "Work date",
    ],
    captions: [
        "1. Front view of unit",
        "2. Flue duct (indoor)",
        "3. Flue duct (outdoor)",
        "4. Carbon-monoxide alarm",
        "5. Installation signage",
        "6. Nameplate",
        "7. Flexible hose / gas valve",
        "8. Other",
    ],
    no_photo: "(no photo)",
    installer_name_field: "Installer name",
    installer_phone_field: "Installer phone",
    gas_digit_rule: "Max gas consumption (must contain a digit)",
    filename_suffix: "submission",
};

impl LabelSet {
    pub fn labels(&self) -> &'static Labels {
        match self {
            Self::Korean => &KOREAN,
            Self::English => &ENGLISH,
        }
    }
}

impl Labels {
    /// Caption for a slot position. Positions past the grid get the last caption.
    pub fn caption(&self, index: usize) -> &'static str {
        self.captions[index.min(PHOTO_SLOT_COUNT - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_set_has_eight_distinct_captions() {
        for set in LabelSet::all() {
            let captions = set.labels().captions;
            let mut unique: Vec<_> = captions.to_vec();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), PHOTO_SLOT_COUNT, "{set}");
        }
    }

    #[test]
    fn captions_are_numbered_in_slot_order() {
        for set in LabelSet::all() {
            for (i, caption) in set.labels().captions.iter().enumerate() {
                assert!(caption.starts_with(&format!("{}. ", i + 1)), "{caption}");
            }
        }
    }

    #[test]
    fn english_rows_follow_fixed_order() {
        let rows = LabelSet::English.labels().rows;
        assert_eq!(rows[0], "Site address");
        assert_eq!(rows[3], "Flue type");
        assert_eq!(rows[6], "Work date");
    }

    #[test]
    fn caption_index_clamped() {
        let labels = LabelSet::English.labels();
        assert_eq!(labels.caption(0), "1. Front view of unit");
        assert_eq!(labels.caption(42), "8. Other");
    }
}

//! Submission orchestration: record + raw photos -> named PDF.
//!
//! Photo failures are local: an unreadable photo becomes an empty slot and
//! a `SlotWarning`. Validation and render failures abort the request.

use thiserror::Error;
use tracing::{info, warn};

use crate::config::PHOTO_SLOT_COUNT;
use crate::intake::{submission_filename, FormSession, RecordDraft, ValidationError};
use crate::models::{InstallationRecord, LabelSet, PhotoSlot};
use crate::pipeline::compose::{DocumentComposer, FontProvider, RenderError};
use crate::pipeline::normalize::{NormalizationPipeline, PhotoNormalizer};

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl SubmissionError {
    /// Text safe to show an end user. Operator detail stays in `Display`.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Render(_) => "Document generation failed. Check the installation and try again.".into(),
        }
    }
}

/// A photo that was supplied but could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotWarning {
    /// Zero-based slot index.
    pub slot: usize,
    pub caption: &'static str,
    pub error: String,
}

/// Generated document ready to save or hand to the user.
#[derive(Debug, Clone)]
pub struct Submission {
    pub pdf: Vec<u8>,
    pub filename: String,
    pub slot_warnings: Vec<SlotWarning>,
}

pub struct SubmissionGenerator {
    normalizer: Box<dyn PhotoNormalizer>,
    composer: DocumentComposer,
}

impl SubmissionGenerator {
    pub fn new(normalizer: Box<dyn PhotoNormalizer>, composer: DocumentComposer) -> Self {
        Self {
            normalizer,
            composer,
        }
    }

    /// Standard normalization with the given labels and fonts.
    pub fn standard(label_set: LabelSet, fonts: Box<dyn FontProvider>) -> Self {
        Self::new(
            Box::new(NormalizationPipeline::standard()),
            DocumentComposer::new(label_set, fonts),
        )
    }

    pub fn composer(&self) -> &DocumentComposer {
        &self.composer
    }

    /// Validate `draft`, then generate. Nothing is rendered for an invalid draft.
    pub fn generate_from_draft(
        &self,
        draft: &RecordDraft,
        photos: &[Option<Vec<u8>>],
    ) -> Result<Submission, SubmissionError> {
        let record = draft.validate(self.composer.labels())?;
        self.generate(&record, photos)
    }

    /// Generate from the record a session has saved.
    pub fn generate_from_session(
        &self,
        session: &FormSession,
        photos: &[Option<Vec<u8>>],
    ) -> Result<Submission, SubmissionError> {
        let record = session.require_record()?;
        self.generate(record, photos)
    }

    /// `photos[i]` fills slot `i`; missing entries and `None` are empty slots.
    pub fn generate(
        &self,
        record: &InstallationRecord,
        photos: &[Option<Vec<u8>>],
    ) -> Result<Submission, SubmissionError> {
        let labels = self.composer.labels();
        if photos.len() > PHOTO_SLOT_COUNT {
            warn!(
                supplied = photos.len(),
                "More photos than slots; extra photos ignored"
            );
        }

        let mut slot_warnings = Vec::new();
        let slots: Vec<PhotoSlot> = (0..PHOTO_SLOT_COUNT)
            .map(|i| {
                let caption = labels.caption(i);
                let photo = photos.get(i).and_then(Option::as_ref).and_then(|bytes| {
                    match self.normalizer.normalize(bytes) {
                        Ok(photo) => Some(photo),
                        Err(e) => {
                            warn!(slot = i + 1, caption, error = %e, "Photo unusable, slot left empty");
                            slot_warnings.push(SlotWarning {
                                slot: i,
                                caption,
                                error: e.to_string(),
                            });
                            None
                        }
                    }
                });
                PhotoSlot { caption, photo }
            })
            .collect();

        let pdf = self.composer.compose(record, &slots)?;
        let filename = submission_filename(&record.site_address, labels);

        info!(
            filename = %filename,
            warnings = slot_warnings.len(),
            "Submission generated"
        );
        Ok(Submission {
            pdf,
            filename,
            slot_warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compose::{BuiltinFontProvider, DirectoryFontProvider};
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 200) as u8, (y % 200) as u8, 150]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    fn draft() -> RecordDraft {
        RecordDraft {
            site_address: "12 Harbour Road, Busan".into(),
            model_name: "NCB553-24K".into(),
            max_gas_consumption: "20,800 kcal/h".into(),
            flue_type: "FE".into(),
            installer_company: "Blue Flame Co.".into(),
            installer_name: "Kim Minjun".into(),
            installer_phone: "010 1234 5678".into(),
            work_date: "2024-03-09".into(),
        }
    }

    fn generator() -> SubmissionGenerator {
        SubmissionGenerator::standard(LabelSet::English, Box::new(BuiltinFontProvider))
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
    }

    /// What the single page of a generated document shows.
    struct PageContent {
        image_count: usize,
        image_draws: usize,
        texts: Vec<String>,
    }

    impl PageContent {
        fn read(bytes: &[u8]) -> Self {
            let doc = lopdf::Document::load_mem(bytes).unwrap();
            let page_id = *doc.get_pages().values().next().unwrap();

            let resources_id = doc
                .get_dictionary(page_id)
                .unwrap()
                .get(b"Resources")
                .and_then(lopdf::Object::as_reference)
                .unwrap();
            let image_count = doc
                .get_dictionary(resources_id)
                .unwrap()
                .get(b"XObject")
                .and_then(lopdf::Object::as_dict)
                .map_or(0, |xobjects| xobjects.len());

            let content = lopdf::content::Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            let image_draws = content.operations.iter().filter(|op| op.operator == "Do").count();
            // builtin fonts write WinAnsi bytes, which is ASCII for these labels
            let texts = content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| op.operands.first())
                .map(|operand| String::from_utf8(operand.as_str().unwrap().to_vec()).unwrap())
                .collect();

            Self {
                image_count,
                image_draws,
                texts,
            }
        }
    }

    fn assert_in_order(text: &str, expected: &[&str]) {
        let mut from = 0;
        for item in expected {
            let at = text[from..]
                .find(item)
                .unwrap_or_else(|| panic!("{item:?} missing or out of order in {text:?}"));
            from += at + item.len();
        }
    }

    #[test]
    fn end_to_end_five_photos_three_absent() {
        let labels = LabelSet::English.labels();
        let record = draft().validate(labels).unwrap();
        assert_eq!(record.installer_phone, "010-1234-5678");

        let photos = vec![
            Some(png(300, 200)),
            None,
            Some(png(200, 200)),
            Some(png(320, 180)),
            None,
            Some(png(90, 160)),
            Some(png(400, 300)),
            None,
        ];
        let submission = generator().generate(&record, &photos).unwrap();

        assert!(submission.pdf.starts_with(b"%PDF"));
        assert_eq!(page_count(&submission.pdf), 1);
        assert!(submission.slot_warnings.is_empty());
        assert_eq!(submission.filename, "12 Harbour Road, Busan_submission.pdf");

        let page = PageContent::read(&submission.pdf);
        assert_eq!(page.image_count, 5);
        assert_eq!(page.image_draws, 5);
        assert_eq!(page.texts.iter().filter(|t| *t == labels.no_photo).count(), 3);

        let text = page.texts.join(" ");
        assert!(text.starts_with(labels.title), "{text}");
        assert_in_order(&text, &labels.rows);
        assert_in_order(&text, &labels.captions);
        assert!(text.contains("010-1234-5678"));
    }

    #[test]
    fn corrupt_photo_degrades_to_placeholder() {
        let mut garbage = vec![0xFF, 0xD8, 0xFF];
        garbage.extend(std::iter::repeat(0x42).take(200));
        let photos = vec![Some(png(120, 90)), Some(garbage)];

        let submission = generator().generate_from_draft(&draft(), &photos).unwrap();
        assert_eq!(page_count(&submission.pdf), 1);
        assert_eq!(submission.slot_warnings.len(), 1);
        assert_eq!(submission.slot_warnings[0].slot, 1);
        assert_eq!(submission.slot_warnings[0].caption, "2. Flue duct (indoor)");
    }

    #[test]
    fn invalid_draft_is_rejected_before_rendering() {
        let mut bad = draft();
        bad.max_gas_consumption = "many".into();
        let err = generator().generate_from_draft(&bad, &[]).unwrap_err();
        assert!(matches!(err, SubmissionError::Validation(_)));
    }

    #[test]
    fn unsaved_session_is_rejected() {
        let session = FormSession::new(LabelSet::English);
        let err = generator().generate_from_session(&session, &[]).unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Validation(ValidationError::NotSaved)
        ));
    }

    #[test]
    fn saved_session_generates() {
        let mut session = FormSession::new(LabelSet::English);
        session.save(draft()).unwrap();
        let submission = generator()
            .generate_from_session(&session, &[None, Some(png(64, 48))])
            .unwrap();
        assert_eq!(page_count(&submission.pdf), 1);
    }

    #[test]
    fn extra_photos_are_ignored() {
        let photos: Vec<Option<Vec<u8>>> = (0..10).map(|_| Some(png(40, 30))).collect();
        let submission = generator().generate_from_draft(&draft(), &photos).unwrap();
        assert_eq!(page_count(&submission.pdf), 1);
    }

    #[test]
    fn render_failure_gets_generic_user_message() {
        let dir = tempfile::tempdir().unwrap();
        let generator = SubmissionGenerator::standard(
            LabelSet::Korean,
            Box::new(DirectoryFontProvider::single(dir.path())),
        );
        let err = generator
            .generate_from_draft(&draft(), &[])
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Render(RenderError::ResourceNotFound { .. })));
        assert!(err.user_message().contains("generation failed"));
        assert!(err.to_string().contains("NanumGothic"));
    }
}

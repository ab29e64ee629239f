//! Single-page PDF rendering via `printpdf`.
//!
//! `DocumentComposer::compose` resolves fonts, builds a `PagePlan` and draws
//! it. Output is byte-identical for identical inputs: the timestamps come
//! from the work date, no XMP packet is written, and `stabilize` rewrites the
//! two things printpdf randomizes on save (the trailer `/ID` pair and the
//! numbering of image XObjects, which it keeps in a `HashMap`).

use std::io::BufWriter;

use chrono::{Datelike, NaiveDate};
use lopdf::{Dictionary, Object, ObjectId, StringFormat};
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, CustomPdfConformance, Image, ImageFilter,
    ImageTransform, ImageXObject, IndirectFontRef, Line, Mm, PdfConformance, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Px, Rgb,
};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tracing::info;

use super::fonts::{Base14, FontProvider, FontSource};
use super::layout::*;
use super::text::FontMetrics;
use super::RenderError;
use crate::config::{FONT_BOLD, FONT_REGULAR};
use crate::models::{InstallationRecord, LabelSet, Labels, PhotoSlot};

const PT_TO_MM: f32 = 25.4 / 72.0;

fn mm(pt: f32) -> Mm {
    Mm(pt * PT_TO_MM)
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn grey() -> Color {
    Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None))
}

/// Renders an `InstallationRecord` and its photo slots into PDF bytes.
pub struct DocumentComposer {
    label_set: LabelSet,
    fonts: Box<dyn FontProvider>,
}

impl DocumentComposer {
    pub fn new(label_set: LabelSet, fonts: Box<dyn FontProvider>) -> Self {
        Self { label_set, fonts }
    }

    pub fn label_set(&self) -> LabelSet {
        self.label_set
    }

    pub fn labels(&self) -> &'static Labels {
        self.label_set.labels()
    }

    /// Fail early if a required font cannot be resolved.
    pub fn check_resources(&self) -> Result<(), RenderError> {
        self.fonts.check()
    }

    /// Compose the submission page.
    ///
    /// `slots` is padded with empty slots to eight entries; entries past
    /// the eighth are ignored.
    pub fn compose(
        &self,
        record: &InstallationRecord,
        slots: &[PhotoSlot],
    ) -> Result<Vec<u8>, RenderError> {
        let labels = self.labels();

        let regular_source = self.fonts.resolve(FONT_REGULAR)?;
        let bold_source = self.fonts.resolve(FONT_BOLD)?;
        let regular = FontMetrics::from_source(&regular_source)?;
        let bold = FontMetrics::from_source(&bold_source)?;

        let plan = plan_page(record, slots, labels, &regular, &bold);
        ensure_renderable(&plan, &regular_source, &regular, &bold_source, &bold)?;

        let (doc, page, layer) = PdfDocument::new(&plan.title, Mm(210.0), Mm(297.0), "Layer 1");
        let date = document_date(record.work_date);
        let doc = doc
            .with_conformance(PdfConformance::Custom(CustomPdfConformance {
                requires_icc_profile: false,
                requires_xmp_metadata: false,
                ..Default::default()
            }))
            .with_creation_date(date)
            .with_mod_date(date)
            .with_metadata_date(date);

        PageWriter {
            layer: doc.get_page(page).get_layer(layer),
            regular: register_font(&doc, &regular_source)?,
            bold: register_font(&doc, &bold_source)?,
            regular_metrics: &regular,
            bold_metrics: &bold,
        }
        .draw(&plan, slots);

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| RenderError::Pdf(format!("PDF save error: {e}")))?;
        let raw = buf
            .into_inner()
            .map_err(|e| RenderError::Pdf(format!("PDF buffer error: {e}")))?;
        let bytes = stabilize(&raw, &document_id(&plan, slots))?;

        info!(
            slots = plan.cells.len(),
            photos = plan.photo_count(),
            bytes = bytes.len(),
            "Submission document composed"
        );
        Ok(bytes)
    }
}

fn register_font(
    doc: &PdfDocumentReference,
    source: &FontSource,
) -> Result<IndirectFontRef, RenderError> {
    let result = match source {
        FontSource::Embedded { bytes, .. } => doc.add_external_font(bytes.as_slice()),
        FontSource::Builtin(Base14::Helvetica) => doc.add_builtin_font(BuiltinFont::Helvetica),
        FontSource::Builtin(Base14::HelveticaBold) => {
            doc.add_builtin_font(BuiltinFont::HelveticaBold)
        }
    };
    result.map_err(|e| RenderError::Font(format!("{}: {e}", source.name())))
}

/// Reject text the chosen fonts would print as garbage.
fn ensure_renderable(
    plan: &PagePlan,
    regular_source: &FontSource,
    regular: &FontMetrics,
    bold_source: &FontSource,
    bold: &FontMetrics,
) -> Result<(), RenderError> {
    let regular_texts = std::iter::once(&plan.title)
        .chain(std::iter::once(&plan.placeholder))
        .chain(plan.rows.iter().flat_map(|r| r.label_lines.iter().chain(&r.value_lines)));
    for text in regular_texts {
        if !regular.can_render(text) {
            return Err(RenderError::UnsupportedText {
                font: regular_source.name().to_string(),
                text: text.clone(),
            });
        }
    }

    for text in plan.cells.iter().flat_map(|c| &c.caption_lines) {
        if !bold.can_render(text) {
            return Err(RenderError::UnsupportedText {
                font: bold_source.name().to_string(),
                text: text.clone(),
            });
        }
    }
    Ok(())
}

/// Content hash used as the PDF document id.
fn document_id(plan: &PagePlan, slots: &[PhotoSlot]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plan.title.as_bytes());
    for row in &plan.rows {
        for line in row.label_lines.iter().chain(&row.value_lines) {
            hasher.update(line.as_bytes());
            hasher.update([0u8]);
        }
    }
    for (i, cell) in plan.cells.iter().enumerate() {
        for line in &cell.caption_lines {
            hasher.update(line.as_bytes());
        }
        match slots.get(i).and_then(|s| s.photo.as_ref()) {
            Some(photo) => hasher.update(&photo.jpeg),
            None => hasher.update([0u8]),
        }
    }
    let hex = format!("{:x}", hasher.finalize());
    hex[..32].to_string()
}

/// Replace the per-save random parts of printpdf's output.
///
/// The trailer `/ID` becomes `[id id]`. Image XObjects are renumbered so
/// that `/X0`, `/X1`, ... hold ascending object numbers, whatever order
/// printpdf happened to write them in.
fn stabilize(raw: &[u8], id: &str) -> Result<Vec<u8>, RenderError> {
    let pdf_err = |e: lopdf::Error| RenderError::Pdf(format!("PDF rewrite error: {e}"));

    let mut doc = lopdf::Document::load_mem(raw).map_err(pdf_err)?;
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for page_id in pages {
        order_xobjects(&mut doc, page_id).map_err(pdf_err)?;
    }

    let id = Object::String(id.as_bytes().to_vec(), StringFormat::Literal);
    doc.trailer.set("ID", Object::Array(vec![id.clone(), id]));

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| pdf_err(e.into()))?;
    Ok(out)
}

fn order_xobjects(doc: &mut lopdf::Document, page_id: ObjectId) -> lopdf::Result<()> {
    let resources_id = doc.get_dictionary(page_id)?.get(b"Resources")?.as_reference()?;
    let Ok(xobjects) = doc.get_dictionary(resources_id)?.get(b"XObject").and_then(Object::as_dict) else {
        // page without images
        return Ok(());
    };

    let mut entries: Vec<(Vec<u8>, ObjectId)> = xobjects
        .iter()
        .filter_map(|(name, obj)| obj.as_reference().ok().map(|id| (name.clone(), id)))
        .collect();
    if entries.len() < 2 {
        return Ok(());
    }
    // X0..X7, so byte order is numeric order
    entries.sort_by(|a, b| a.0.len().cmp(&b.0.len()).then_with(|| a.0.cmp(&b.0)));

    let mut ids: Vec<ObjectId> = entries.iter().map(|(_, id)| *id).collect();
    ids.sort();

    let mut streams = Vec::with_capacity(entries.len());
    for (_, id) in &entries {
        streams.push(doc.objects.remove(id).ok_or(lopdf::Error::ObjectNotFound(*id))?);
    }

    let mut ordered = Dictionary::new();
    for ((name, _), (id, stream)) in entries.into_iter().zip(ids.into_iter().zip(streams)) {
        doc.objects.insert(id, stream);
        ordered.set(name, Object::Reference(id));
    }
    doc.get_dictionary_mut(resources_id)?.set("XObject", Object::Dictionary(ordered));
    Ok(())
}

/// Midnight UTC of the work date.
fn document_date(date: NaiveDate) -> OffsetDateTime {
    time::Month::try_from(date.month() as u8)
        .ok()
        .and_then(|month| time::Date::from_calendar_date(date.year(), month, date.day() as u8).ok())
        .map(|d| d.midnight().assume_utc())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

// ═══════════════════════════════════════════════════════════
// Drawing
// ═══════════════════════════════════════════════════════════

struct PageWriter<'a> {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    regular_metrics: &'a FontMetrics<'a>,
    bold_metrics: &'a FontMetrics<'a>,
}

impl PageWriter<'_> {
    fn draw(&self, plan: &PagePlan, slots: &[PhotoSlot]) {
        self.layer.set_fill_color(black());

        let title_x = PAGE_WIDTH / 2.0 - self.regular_metrics.text_width(&plan.title, TITLE_SIZE) / 2.0;
        self.layer
            .use_text(plan.title.as_str(), TITLE_SIZE, mm(title_x), mm(plan.title_baseline), &self.regular);

        self.draw_table(plan);
        for cell in &plan.cells {
            self.draw_cell(cell, plan, slots);
        }
    }

    fn draw_table(&self, plan: &PagePlan) {
        let table = plan.table;
        for row in &plan.rows {
            let label_x = table.x + TABLE_PAD_LEFT;
            let value_x = table.x + LABEL_COLUMN_WIDTH + TABLE_PAD_LEFT;
            let label_y = centred_baselines(&row.bounds, row.label_lines.len(), TABLE_TEXT_SIZE, TABLE_LEADING);
            for (line, y) in row.label_lines.iter().zip(label_y) {
                self.layer
                    .use_text(line.as_str(), TABLE_TEXT_SIZE, mm(label_x), mm(y), &self.regular);
            }
            let value_y = centred_baselines(&row.bounds, row.value_lines.len(), TABLE_TEXT_SIZE, TABLE_LEADING);
            for (line, y) in row.value_lines.iter().zip(value_y) {
                self.layer
                    .use_text(line.as_str(), TABLE_TEXT_SIZE, mm(value_x), mm(y), &self.regular);
            }
        }

        self.layer.set_outline_color(grey());
        self.layer.set_outline_thickness(TABLE_GRID_WIDTH);
        let divider_x = table.x + LABEL_COLUMN_WIDTH;
        self.stroke(&[(divider_x, table.y), (divider_x, table.top())], false);
        for row in plan.rows.iter().skip(1) {
            let y = row.bounds.top();
            self.stroke(&[(table.x, y), (table.right(), y)], false);
        }

        self.layer.set_outline_color(black());
        self.layer.set_outline_thickness(TABLE_BOX_WIDTH);
        self.stroke_rect(&table);
    }

    fn draw_cell(&self, cell: &GridCell, plan: &PagePlan, slots: &[PhotoSlot]) {
        self.layer.set_outline_color(grey());
        self.layer.set_outline_thickness(CELL_BORDER_WIDTH);
        self.stroke_rect(&cell.frame.border);

        match cell.content {
            CellContent::Photo { slot, placement } => {
                if let Some(photo) = slots.get(slot).and_then(|s| s.photo.as_ref()) {
                    place_jpeg(&self.layer, &photo.jpeg, photo.width(), photo.height(), &placement);
                }
            }
            CellContent::Placeholder => {
                let area = cell.frame.image_area;
                let baseline = centred_baselines(&area, 1, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)[0];
                self.centred_text(&plan.placeholder, PLACEHOLDER_SIZE, area.center_x(), baseline, false);
            }
        }

        let caption = cell.frame.caption_area;
        let baselines = centred_baselines(&caption, cell.caption_lines.len(), CAPTION_SIZE, CAPTION_LEADING);
        for (line, y) in cell.caption_lines.iter().zip(baselines) {
            self.centred_text(line, CAPTION_SIZE, caption.center_x(), y, true);
        }
    }

    fn centred_text(&self, text: &str, size: f32, center_x: f32, baseline: f32, bold: bool) {
        let (font, metrics) = if bold {
            (&self.bold, self.bold_metrics)
        } else {
            (&self.regular, self.regular_metrics)
        };
        let x = center_x - metrics.text_width(text, size) / 2.0;
        self.layer.use_text(text, size, mm(x), mm(baseline), font);
    }

    fn stroke(&self, points: &[(f32, f32)], is_closed: bool) {
        let points = points
            .iter()
            .map(|&(x, y)| (Point::new(mm(x), mm(y)), false))
            .collect();
        self.layer.add_line(Line { points, is_closed });
    }

    fn stroke_rect(&self, rect: &Rect) {
        self.stroke(
            &[
                (rect.x, rect.y),
                (rect.right(), rect.y),
                (rect.right(), rect.top()),
                (rect.x, rect.top()),
            ],
            true,
        );
    }
}

/// Embed JPEG bytes as-is (DCTDecode) scaled to fill `placement`.
fn place_jpeg(layer: &PdfLayerReference, jpeg: &[u8], width_px: u32, height_px: u32, placement: &Rect) {
    let image = Image::from(ImageXObject {
        width: Px(width_px as usize),
        height: Px(height_px as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: jpeg.to_vec(),
        image_filter: Some(ImageFilter::DCT),
        clipping_bbox: None,
        smask: None,
    });

    // At `dpi` the image is exactly placement.width wide; scale_y absorbs
    // the sub-pixel ratio error left by padding and downscaling.
    let dpi = width_px as f32 * 72.0 / placement.width;
    let natural_height = height_px as f32 * 72.0 / dpi;
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(mm(placement.x)),
            translate_y: Some(mm(placement.y)),
            dpi: Some(dpi),
            scale_y: Some(placement.height / natural_height),
            ..Default::default()
        },
    );
}

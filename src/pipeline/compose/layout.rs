//! Fixed single-page geometry and the page plan built from it.
//!
//! All lengths are PDF points, origin at the bottom-left of an A4 page.
//! Nothing here paginates: the constants are chosen so the worst case
//! (every metadata value wrapped to its line limit) still fits one page.

use super::text::{clamp_lines, wrap_to_width, FontMetrics};
use crate::config::{PHOTO_SLOT_COUNT, TARGET_ASPECT_RATIO};
use crate::models::{InstallationRecord, Labels, PhotoSlot, METADATA_ROW_COUNT};

// ── Page ──
pub const PAGE_WIDTH: f32 = 595.2756;
pub const PAGE_HEIGHT: f32 = 841.8898;
pub const MARGIN: f32 = 20.0;

// ── Title ──
pub const TITLE_SIZE: f32 = 16.0;
pub const TITLE_LEADING: f32 = 20.0;
pub const TITLE_SPACE_AFTER: f32 = 8.0;
pub const TITLE_SPACER: f32 = 4.0;

// ── Metadata table ──
pub const LABEL_COLUMN_WIDTH: f32 = 105.0;
pub const TABLE_TEXT_SIZE: f32 = 9.0;
pub const TABLE_LEADING: f32 = 12.0;
pub const TABLE_PAD_LEFT: f32 = 4.0;
pub const TABLE_PAD_RIGHT: f32 = 6.0;
pub const TABLE_PAD_VERTICAL: f32 = 3.0;
pub const MAX_TABLE_LINES: usize = 2;
pub const TABLE_BOX_WIDTH: f32 = 0.9;
pub const TABLE_GRID_WIDTH: f32 = 0.3;
pub const TABLE_SPACE_AFTER: f32 = 8.0;

// ── Photo grid ──
pub const GRID_COLUMNS: usize = 4;
pub const GRID_ROWS: usize = 2;
pub const GRID_GUTTER: f32 = 6.0;
pub const GRID_ROW_HEIGHT: f32 = 240.0;
pub const CELL_PADDING: f32 = 2.0;
pub const CAPTION_HEIGHT: f32 = 28.0;
pub const CAPTION_SIZE: f32 = 11.0;
pub const CAPTION_LEADING: f32 = 14.0;
pub const MAX_CAPTION_LINES: usize = 2;
pub const IMAGE_INSET: f32 = 8.0;
pub const PLACEHOLDER_SIZE: f32 = 8.0;
pub const CELL_BORDER_WIDTH: f32 = 0.3;

/// Axis-aligned box; `y` is the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, other: &Rect) -> bool {
        const SLACK: f32 = 1e-3;
        other.x >= self.x - SLACK
            && other.y >= self.y - SLACK
            && other.right() <= self.right() + SLACK
            && other.top() <= self.top() + SLACK
    }
}

pub fn usable_width() -> f32 {
    PAGE_WIDTH - 2.0 * MARGIN
}

pub fn column_width() -> f32 {
    (usable_width() - GRID_GUTTER * (GRID_COLUMNS - 1) as f32) / GRID_COLUMNS as f32
}

pub fn value_column_width() -> f32 {
    usable_width() - LABEL_COLUMN_WIDTH
}

/// Largest box of `ratio` inside `max_width x max_height`: fill the width
/// first, shrink both sides if that overflows the height.
pub fn fit_ratio(max_width: f32, max_height: f32, ratio: f32) -> (f32, f32) {
    let mut width = max_width;
    let mut height = width / ratio;
    if height > max_height {
        height = max_height;
        width = height * ratio;
    }
    (width, height)
}

/// Grid slot for position `index` (row-major), below `grid_top`.
pub fn grid_slot(index: usize, grid_top: f32) -> Rect {
    let row = index / GRID_COLUMNS;
    let col = index % GRID_COLUMNS;
    let width = column_width();
    Rect::new(
        MARGIN + col as f32 * (width + GRID_GUTTER),
        grid_top - (row + 1) as f32 * GRID_ROW_HEIGHT,
        width,
        GRID_ROW_HEIGHT,
    )
}

/// Border, image area and caption band of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellFrame {
    pub border: Rect,
    pub image_area: Rect,
    pub caption_area: Rect,
}

pub fn cell_frame(index: usize, grid_top: f32) -> CellFrame {
    let slot = grid_slot(index, grid_top);
    let border = Rect::new(
        slot.x + CELL_PADDING,
        slot.y + CELL_PADDING,
        slot.width - 2.0 * CELL_PADDING,
        slot.height - 2.0 * CELL_PADDING,
    );
    let caption_area = Rect::new(border.x, border.y, border.width, CAPTION_HEIGHT);
    let image_area = Rect::new(
        border.x,
        border.y + CAPTION_HEIGHT,
        border.width,
        border.height - CAPTION_HEIGHT,
    );
    CellFrame {
        border,
        image_area,
        caption_area,
    }
}

// ═══════════════════════════════════════════════════════════
// Page plan
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub bounds: Rect,
    pub label_lines: Vec<String>,
    pub value_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Photo drawn at `placement`, centred in the image area.
    Photo { slot: usize, placement: Rect },
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub frame: CellFrame,
    pub content: CellContent,
    pub caption_lines: Vec<String>,
}

/// Everything the renderer draws, positioned.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub title: String,
    pub title_baseline: f32,
    pub table: Rect,
    pub rows: Vec<TableRow>,
    pub cells: Vec<GridCell>,
    pub placeholder: String,
}

impl PagePlan {
    pub fn photo_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c.content, CellContent::Photo { .. }))
            .count()
    }

    pub fn lowest_point(&self) -> f32 {
        self.cells
            .iter()
            .map(|c| c.frame.border.y)
            .fold(self.table.y, f32::min)
    }
}

/// Lay out the title, metadata table and 4x2 grid.
///
/// Always plans `PHOTO_SLOT_COUNT` cells: positions `slots` does not reach
/// are placeholders under their fixed caption, extra entries are ignored.
pub fn plan_page(
    record: &InstallationRecord,
    slots: &[PhotoSlot],
    labels: &Labels,
    regular: &FontMetrics,
    bold: &FontMetrics,
) -> PagePlan {
    let top = PAGE_HEIGHT - MARGIN;
    let title_baseline = top - TITLE_SIZE;
    let mut cursor = top - TITLE_LEADING - TITLE_SPACE_AFTER - TITLE_SPACER;

    let label_text_width = LABEL_COLUMN_WIDTH - TABLE_PAD_LEFT - TABLE_PAD_RIGHT;
    let value_text_width = value_column_width() - TABLE_PAD_LEFT - TABLE_PAD_RIGHT;

    let table_top = cursor;
    let mut rows = Vec::with_capacity(METADATA_ROW_COUNT);
    for (label, value) in record.rows(labels) {
        let label_lines = clamp_lines(
            wrap_to_width(label, label_text_width, TABLE_TEXT_SIZE, regular),
            MAX_TABLE_LINES,
        );
        let value_lines = clamp_lines(
            wrap_to_width(&value, value_text_width, TABLE_TEXT_SIZE, regular),
            MAX_TABLE_LINES,
        );
        let line_count = label_lines.len().max(value_lines.len());
        let height = line_count as f32 * TABLE_LEADING + 2.0 * TABLE_PAD_VERTICAL;
        cursor -= height;
        rows.push(TableRow {
            bounds: Rect::new(MARGIN, cursor, usable_width(), height),
            label_lines,
            value_lines,
        });
    }
    let table = Rect::new(MARGIN, cursor, usable_width(), table_top - cursor);

    let grid_top = cursor - TABLE_SPACE_AFTER;
    let caption_width = column_width() - 2.0 * CELL_PADDING - 4.0;
    let ratio = TARGET_ASPECT_RATIO as f32;

    let cells = (0..PHOTO_SLOT_COUNT)
        .map(|i| {
            let slot = slots.get(i);
            let frame = cell_frame(i, grid_top);
            let caption = slot.map_or_else(|| labels.caption(i), |s| s.caption);
            let content = match slot.and_then(|s| s.photo.as_ref()) {
                Some(_) => {
                    let area = frame.image_area;
                    let (w, h) = fit_ratio(area.width - IMAGE_INSET, area.height - IMAGE_INSET, ratio);
                    CellContent::Photo {
                        slot: i,
                        placement: Rect::new(area.center_x() - w / 2.0, area.center_y() - h / 2.0, w, h),
                    }
                }
                None => CellContent::Placeholder,
            };
            let caption_lines = clamp_lines(
                wrap_to_width(caption, caption_width, CAPTION_SIZE, bold),
                MAX_CAPTION_LINES,
            );
            GridCell {
                frame,
                content,
                caption_lines,
            }
        })
        .collect();

    PagePlan {
        title: labels.title.to_string(),
        title_baseline,
        table,
        rows,
        cells,
        placeholder: labels.no_photo.to_string(),
    }
}

/// Baselines for `count` lines of `size` text, vertically centred in `area`.
pub fn centred_baselines(area: &Rect, count: usize, size: f32, leading: f32) -> Vec<f32> {
    let block = (count.saturating_sub(1)) as f32 * leading;
    let first = area.center_y() + block / 2.0 - size * 0.35;
    (0..count).map(|i| first - i as f32 * leading).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{assign_slots, FlueType, LabelSet};
    use crate::pipeline::compose::fonts::Base14;
    use crate::pipeline::normalize::{encode_jpeg, NormalizedPhoto};
    use chrono::NaiveDate;
    use image::{Rgb, RgbImage};

    fn record() -> InstallationRecord {
        InstallationRecord {
            site_address: "12 Harbour Road, Busan".into(),
            model_name: "NCB553-24K".into(),
            max_gas_consumption: "20,800".into(),
            flue_type: FlueType::Ff,
            installer_company: "Blue Flame Co.".into(),
            installer_name: "Kim Minjun".into(),
            installer_phone: "010-1234-5678".into(),
            work_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        }
    }

    fn photo() -> NormalizedPhoto {
        let image = RgbImage::from_pixel(80, 60, Rgb([10, 10, 10]));
        let jpeg = encode_jpeg(&image, 85).unwrap();
        NormalizedPhoto {
            image,
            jpeg,
            original_width: 80,
            original_height: 60,
        }
    }

    fn plan_with(photos: Vec<Option<NormalizedPhoto>>, record: &InstallationRecord) -> PagePlan {
        let labels = LabelSet::English.labels();
        let slots = assign_slots(labels, photos);
        let regular = FontMetrics::Base14(Base14::Helvetica);
        let bold = FontMetrics::Base14(Base14::HelveticaBold);
        plan_page(record, &slots, labels, &regular, &bold)
    }

    #[test]
    fn columns_fill_usable_width() {
        let total = 4.0 * column_width() + 3.0 * GRID_GUTTER;
        assert!((total - usable_width()).abs() < 1e-3);
    }

    #[test]
    fn fit_prefers_width() {
        let (w, h) = fit_ratio(120.0, 200.0, 4.0 / 3.0);
        assert_eq!(w, 120.0);
        assert!((h - 90.0).abs() < 1e-4);
    }

    #[test]
    fn fit_falls_back_to_height() {
        let (w, h) = fit_ratio(200.0, 90.0, 4.0 / 3.0);
        assert_eq!(h, 90.0);
        assert!((w - 120.0).abs() < 1e-4);
    }

    #[test]
    fn grid_is_row_major() {
        let top = 600.0;
        assert_eq!(grid_slot(0, top).y, grid_slot(3, top).y);
        assert!(grid_slot(3, top).x > grid_slot(0, top).x);
        assert_eq!(grid_slot(4, top).x, grid_slot(0, top).x);
        assert_eq!(grid_slot(4, top).y, top - 2.0 * GRID_ROW_HEIGHT);
    }

    #[test]
    fn cell_areas_partition_border() {
        let frame = cell_frame(5, 600.0);
        assert!(frame.border.contains(&frame.image_area));
        assert!(frame.border.contains(&frame.caption_area));
        assert_eq!(frame.image_area.y, frame.caption_area.top());
        assert_eq!(frame.caption_area.height, CAPTION_HEIGHT);
    }

    #[test]
    fn plan_has_eight_cells_with_placeholders() {
        let photos = vec![Some(photo()), None, Some(photo())];
        let plan = plan_with(photos, &record());
        assert_eq!(plan.cells.len(), 8);
        assert_eq!(plan.photo_count(), 2);
        assert_eq!(plan.cells[1].content, CellContent::Placeholder);
        assert_eq!(plan.cells[7].content, CellContent::Placeholder);
        assert_eq!(plan.cells[7].caption_lines.join(" "), "8. Other");
    }

    #[test]
    fn short_slot_list_planned_as_eight_cells() {
        let labels = LabelSet::English.labels();
        let slots = vec![PhotoSlot {
            caption: "custom",
            photo: Some(photo()),
        }];
        let regular = FontMetrics::Base14(Base14::Helvetica);
        let bold = FontMetrics::Base14(Base14::HelveticaBold);
        let plan = plan_page(&record(), &slots, labels, &regular, &bold);
        assert_eq!(plan.cells.len(), PHOTO_SLOT_COUNT);
        assert_eq!(plan.photo_count(), 1);
        assert_eq!(plan.cells[0].caption_lines, vec!["custom"]);
        assert_eq!(plan.cells[1].caption_lines.join(" "), "2. Flue duct (indoor)");
    }

    #[test]
    fn photo_placement_is_four_three_inside_image_area() {
        let plan = plan_with(vec![Some(photo())], &record());
        let cell = &plan.cells[0];
        match cell.content {
            CellContent::Photo { slot, placement } => {
                assert_eq!(slot, 0);
                assert!(cell.frame.image_area.contains(&placement));
                assert!((placement.width / placement.height - 4.0 / 3.0).abs() < 1e-3);
                assert!((placement.center_x() - cell.frame.image_area.center_x()).abs() < 1e-3);
            }
            CellContent::Placeholder => panic!("expected photo"),
        }
    }

    #[test]
    fn table_rows_in_fixed_order() {
        let plan = plan_with(vec![], &record());
        assert_eq!(plan.rows.len(), 7);
        assert_eq!(plan.rows[0].value_lines, vec!["12 Harbour Road, Busan"]);
        assert_eq!(plan.rows[5].value_lines, vec!["Kim Minjun / 010-1234-5678"]);
        assert_eq!(plan.rows[6].value_lines, vec!["2024-03-09"]);
        for pair in plan.rows.windows(2) {
            assert!(pair[0].bounds.y > pair[1].bounds.y);
        }
    }

    #[test]
    fn worst_case_content_stays_on_one_page() {
        let mut long = record();
        let filler = "Very long value that keeps going ".repeat(20);
        long.site_address = filler.clone();
        long.model_name = filler.clone();
        long.max_gas_consumption = format!("1 {filler}");
        long.installer_company = filler.clone();
        long.installer_name = filler;
        let plan = plan_with(vec![], &long);
        for row in &plan.rows {
            assert!(row.value_lines.len() <= MAX_TABLE_LINES);
        }
        assert!(plan.lowest_point() >= MARGIN, "overflow: {}", plan.lowest_point());
    }

    #[test]
    fn centred_baselines_symmetric() {
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        let lines = centred_baselines(&area, 2, 10.0, 14.0);
        assert_eq!(lines.len(), 2);
        assert!((lines[0] - lines[1] - 14.0).abs() < 1e-4);
    }
}

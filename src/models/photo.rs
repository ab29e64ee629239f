use crate::config::PHOTO_SLOT_COUNT;
use crate::pipeline::normalize::NormalizedPhoto;

use super::labels::Labels;

/// One grid position: a fixed caption and an optional normalized photo.
#[derive(Debug, Clone)]
pub struct PhotoSlot {
    pub caption: &'static str,
    pub photo: Option<NormalizedPhoto>,
}

impl PhotoSlot {
    pub fn empty(caption: &'static str) -> Self {
        Self {
            caption,
            photo: None,
        }
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }
}

/// Pair photos with the fixed captions of their positions.
///
/// Always yields exactly `PHOTO_SLOT_COUNT` slots: missing positions are
/// empty and anything past the last position is dropped.
pub fn assign_slots<I>(labels: &Labels, photos: I) -> Vec<PhotoSlot>
where
    I: IntoIterator<Item = Option<NormalizedPhoto>>,
{
    let mut photos = photos.into_iter();
    (0..PHOTO_SLOT_COUNT)
        .map(|i| PhotoSlot {
            caption: labels.caption(i),
            photo: photos.next().flatten(),
        })
        .collect()
}

//! Page-to-slot composition for single and double page layouts
//!
//! In double page mode the cover stands alone and the rest of the document is
//! paired `(1, 2)`, `(3, 4)`, ... The reading direction decides which page of a
//! pair lands on the left side of the spread.

use crate::zoom::FitMode;
use image::{RgbaImage, imageops};

/// Order in which pages are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingDirection {
    /// Western order: the next page is to the right
    #[default]
    LeftToRight,
    /// Manga order: the next page is to the left
    RightToLeft,
}

impl ReadingDirection {
    /// Side of the screen that holds the following page
    pub fn forward_side(self) -> Side {
        match self {
            ReadingDirection::LeftToRight => Side::Right,
            ReadingDirection::RightToLeft => Side::Left,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ReadingDirection::LeftToRight => ReadingDirection::RightToLeft,
            ReadingDirection::RightToLeft => ReadingDirection::LeftToRight,
        }
    }
}

/// How many pages a viewer slot shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageLayout {
    #[default]
    Single,
    Double,
}

impl PageLayout {
    /// Single pages fill the width, spreads fill the height
    pub fn fit_mode(self) -> FitMode {
        match self {
            PageLayout::Single => FitMode::FitToWidth,
            PageLayout::Double => FitMode::FitToHeight,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            PageLayout::Single => PageLayout::Double,
            PageLayout::Double => PageLayout::Single,
        }
    }
}

/// Horizontal side of the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Pages shown at one viewer position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl Slot {
    pub fn single(page: usize) -> Self {
        Self {
            left: Some(page),
            right: None,
        }
    }

    /// Lowest page index in the slot, i.e. the one read first
    pub fn first_page(&self) -> Option<usize> {
        match (self.left, self.right) {
            (Some(l), Some(r)) => Some(l.min(r)),
            (page, None) | (None, page) => page,
        }
    }

    pub fn pages(&self) -> impl Iterator<Item = usize> + '_ {
        self.left.into_iter().chain(self.right)
    }
}

/// Number of viewer positions for `page_count` pages
pub fn slot_count(page_count: usize, layout: PageLayout) -> usize {
    match layout {
        PageLayout::Single => page_count,
        PageLayout::Double if page_count == 0 => 0,
        PageLayout::Double => page_count / 2 + 1,
    }
}

/// Computes the slot sequence for a document
pub fn compose_slots(
    page_count: usize,
    layout: PageLayout,
    direction: ReadingDirection,
) -> Vec<Slot> {
    let existing = |index: usize| (index < page_count).then_some(index);

    match layout {
        PageLayout::Single => (0..page_count).map(Slot::single).collect(),
        PageLayout::Double => (0..slot_count(page_count, layout))
            .map(|position| {
                // Cover sits on the side a reader turns from
                let (earlier, later) = if position == 0 {
                    (None, existing(0))
                } else {
                    (existing(position * 2 - 1), existing(position * 2))
                };
                match direction {
                    ReadingDirection::LeftToRight => Slot {
                        left: earlier,
                        right: later,
                    },
                    ReadingDirection::RightToLeft => Slot {
                        left: later,
                        right: earlier,
                    },
                }
            })
            .collect(),
    }
}

/// Slot that displays `page`, if the page exists
pub fn slot_of_page(page: usize, page_count: usize, layout: PageLayout) -> Option<usize> {
    if page >= page_count {
        return None;
    }
    match layout {
        PageLayout::Single => Some(page),
        PageLayout::Double => Some(page.div_ceil(2)),
    }
}

/// Builds the bitmap for a slot by placing its pages side by side.
///
/// A missing or out of range side leaves the other page as is. The canvas
/// is transparent where the shorter page does not reach.
pub fn compose(pages: &[RgbaImage], slot: &Slot) -> RgbaImage {
    let left = slot.left.and_then(|index| pages.get(index));
    let right = slot.right.and_then(|index| pages.get(index));

    match (left, right) {
        (Some(left), Some(right)) => {
            let width = left.width() + right.width();
            let height = left.height().max(right.height());
            let mut canvas = RgbaImage::new(width, height);
            imageops::replace(&mut canvas, left, 0, 0);
            imageops::replace(&mut canvas, right, i64::from(left.width()), 0);
            canvas
        }
        (Some(page), None) | (None, Some(page)) => page.clone(),
        (None, None) => RgbaImage::new(1, 1),
    }
}

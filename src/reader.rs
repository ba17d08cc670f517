//! Viewer position, slot navigation and zoom for the open document
//!
//! [`Reader`] knows nothing about widgets. The UI feeds it settings changes,
//! navigation commands and gestures, and draws [`Reader::current_image`]
//! under [`Reader::zoom`].

use crate::config::ReaderSettings;
use crate::input::Gesture;
use crate::pdf::Document;
use crate::spread::{self, PageLayout, ReadingDirection, Side, Slot};
use crate::zoom::ZoomController;
use iced::{Point, Size};
use image::RgbaImage;

/// What a gesture did, beyond moving the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEffect {
    None,
    /// The zoom transform changed
    Transformed,
    PageTurned,
    ToggleChrome,
}

pub struct Reader {
    document: Option<Document>,
    settings: ReaderSettings,
    slots: Vec<Slot>,
    position: usize,
    zoom: ZoomController,
    current: Option<RgbaImage>,
    revision: u64,
}

impl Reader {
    pub fn new(settings: ReaderSettings, zoom: ZoomController) -> Self {
        Self {
            document: None,
            settings,
            slots: Vec::new(),
            position: 0,
            zoom,
            current: None,
            revision: 0,
        }
    }

    /// Replaces the open document and starts at the first slot
    pub fn load(&mut self, document: Document) {
        tracing::info!(
            "Showing \"{}\" with {} pages",
            document.title(),
            document.page_count()
        );
        self.document = Some(document);
        self.position = 0;
        self.rebuild_slots();
        self.recompose();
    }

    pub fn title(&self) -> Option<&str> {
        self.document.as_ref().map(Document::title)
    }

    pub fn layout(&self) -> PageLayout {
        self.settings.page_layout()
    }

    pub fn direction(&self) -> ReadingDirection {
        self.settings.reading_direction()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_slot(&self) -> Option<Slot> {
        self.slots.get(self.position).copied()
    }

    /// "3 / 12", counted in slots
    pub fn page_indicator(&self) -> Option<String> {
        (!self.slots.is_empty()).then(|| format!("{} / {}", self.position + 1, self.slots.len()))
    }

    /// Composed bitmap for the current slot
    pub fn current_image(&self) -> Option<&RgbaImage> {
        self.current.as_ref()
    }

    /// Bumped every time [`Reader::current_image`] is recomposed
    pub fn image_revision(&self) -> u64 {
        self.revision
    }

    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn set_layout(&mut self, layout: PageLayout) -> bool {
        if layout == self.layout() {
            return false;
        }
        let page = self.current_slot().and_then(|slot| slot.first_page());
        self.settings.set_page_layout(layout);
        self.rebuild_slots();

        let page_count = self.page_count();
        self.position = page
            .and_then(|page| spread::slot_of_page(page, page_count, layout))
            .unwrap_or(0);
        tracing::debug!("Layout {:?}, now at slot {}", layout, self.position);
        self.recompose();
        true
    }

    pub fn set_direction(&mut self, direction: ReadingDirection) -> bool {
        if direction == self.direction() {
            return false;
        }
        self.settings.set_reading_direction(direction);
        self.rebuild_slots();
        tracing::debug!("Reading direction {:?}", direction);
        self.recompose();
        true
    }

    /// Moves to `slot`, clamped to the document. Returns whether the position changed.
    pub fn go_to(&mut self, slot: usize) -> bool {
        if self.slots.is_empty() {
            return false;
        }
        let target = slot.min(self.slots.len() - 1);
        if target == self.position {
            return false;
        }
        self.position = target;
        self.recompose();
        true
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.position + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.position.checked_sub(1) {
            Some(slot) => self.go_to(slot),
            None => false,
        }
    }

    pub fn first(&mut self) -> bool {
        self.go_to(0)
    }

    pub fn last(&mut self) -> bool {
        self.go_to(self.slots.len().saturating_sub(1))
    }

    /// Shows the slot holding 1-based page `number`
    pub fn jump_to_page(&mut self, number: usize) -> bool {
        let Some(page) = number.checked_sub(1) else {
            return false;
        };
        match spread::slot_of_page(page, self.page_count(), self.layout()) {
            Some(slot) => self.go_to(slot),
            None => false,
        }
    }

    /// Turns toward a side of the screen according to the reading direction
    pub fn turn(&mut self, side: Side) -> bool {
        if side == self.direction().forward_side() {
            self.next()
        } else {
            self.previous()
        }
    }

    /// The page view changed size; refit
    pub fn set_viewport(&mut self, size: Size) {
        self.zoom.set_viewport(size);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
    }

    /// Zooms by `factor` about `focus`, as a completed pinch
    pub fn zoom_at(&mut self, factor: f32, focus: Point) {
        self.zoom.pinch(factor, focus);
        self.zoom.release();
    }

    /// Zooms about the middle of the view
    pub fn zoom_centered(&mut self, factor: f32) {
        let viewport = self.zoom.viewport();
        self.zoom_at(factor, Point::new(viewport.width / 2.0, viewport.height / 2.0));
    }

    pub fn apply(&mut self, gesture: Gesture) -> GestureEffect {
        match gesture {
            Gesture::Pan(delta) => {
                if self.zoom.pan(delta) {
                    GestureEffect::Transformed
                } else {
                    GestureEffect::None
                }
            }
            Gesture::Pinch { factor, focus } => {
                self.zoom.pinch(factor, focus);
                GestureEffect::Transformed
            }
            Gesture::Released => {
                self.zoom.release();
                GestureEffect::Transformed
            }
            Gesture::DoubleTap(at) => {
                self.zoom.double_tap(at);
                GestureEffect::Transformed
            }
            Gesture::LongPress(_) => GestureEffect::ToggleChrome,
            // A zoomed page keeps the drag for itself
            Gesture::Swipe(_) if self.zoom.is_zoomed() => GestureEffect::None,
            Gesture::Swipe(side) => {
                if self.turn(side) {
                    GestureEffect::PageTurned
                } else {
                    GestureEffect::None
                }
            }
        }
    }

    fn page_count(&self) -> usize {
        self.document.as_ref().map_or(0, Document::page_count)
    }

    fn rebuild_slots(&mut self) {
        self.slots = spread::compose_slots(self.page_count(), self.layout(), self.direction());
        if self.position >= self.slots.len() {
            self.position = self.slots.len().saturating_sub(1);
        }
    }

    /// Rebuilds the current bitmap and refits the zoom to it
    fn recompose(&mut self) {
        let composed = match (&self.document, self.slots.get(self.position)) {
            (Some(document), Some(slot)) => Some(spread::compose(document.pages(), slot)),
            _ => None,
        };
        let content = composed.as_ref().map_or(Size::ZERO, |image| {
            Size::new(image.width() as f32, image.height() as f32)
        });
        self.zoom.set_content(content, self.layout().fit_mode());
        self.current = composed;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Vector;
    use image::Rgba;

    fn document(count: usize) -> Document {
        let pages = (0..count)
            .map(|i| RgbaImage::from_pixel(100, 150, Rgba([i as u8, 0, 0, 255])))
            .collect();
        Document::new("test", pages)
    }

    fn reader(direction: ReadingDirection, layout: PageLayout, pages: usize) -> Reader {
        let mut reader = Reader::new(
            ReaderSettings::new(direction, layout),
            ZoomController::default(),
        );
        reader.set_viewport(Size::new(400.0, 600.0));
        reader.load(document(pages));
        reader
    }

    #[test]
    fn empty_reader_has_no_indicator() {
        let reader = Reader::new(ReaderSettings::default(), ZoomController::default());
        assert_eq!(reader.page_indicator(), None);
        assert!(reader.current_image().is_none());
    }

    #[test]
    fn load_starts_at_first_slot() {
        let reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 5);
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.page_indicator().as_deref(), Some("1 / 5"));
        assert_eq!(reader.current_image().map(|i| i.dimensions()), Some((100, 150)));
    }

    #[test]
    fn navigation_is_clamped() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 3);
        assert!(!reader.previous());
        assert!(reader.next());
        assert!(reader.next());
        assert!(!reader.next());
        assert_eq!(reader.position(), 2);
        assert!(reader.first());
        assert!(reader.last());
        assert_eq!(reader.page_indicator().as_deref(), Some("3 / 3"));
    }

    #[test]
    fn turn_follows_reading_direction() {
        let mut ltr = reader(ReadingDirection::LeftToRight, PageLayout::Single, 3);
        assert!(ltr.turn(Side::Right));
        assert_eq!(ltr.position(), 1);

        let mut rtl = reader(ReadingDirection::RightToLeft, PageLayout::Single, 3);
        assert!(!rtl.turn(Side::Right));
        assert!(rtl.turn(Side::Left));
        assert_eq!(rtl.position(), 1);
    }

    #[test]
    fn layout_switch_keeps_current_page_visible() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 7);
        reader.go_to(4);
        assert!(reader.set_layout(PageLayout::Double));
        assert_eq!(reader.slot_count(), 4);
        let slot = reader.current_slot().expect("slot");
        assert!(slot.pages().any(|page| page == 4));

        assert!(reader.set_layout(PageLayout::Single));
        // Back to the first page of the spread
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn direction_switch_keeps_position_and_mirrors_pair() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Double, 5);
        reader.go_to(1);
        assert_eq!(reader.current_slot(), Some(Slot { left: Some(1), right: Some(2) }));
        assert!(reader.set_direction(ReadingDirection::RightToLeft));
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.current_slot(), Some(Slot { left: Some(2), right: Some(1) }));
        assert!(!reader.set_direction(ReadingDirection::RightToLeft));
    }

    #[test]
    fn spread_image_is_composed_side_by_side() {
        let mut reader = reader(ReadingDirection::RightToLeft, PageLayout::Double, 5);
        reader.next();
        let image = reader.current_image().expect("image");
        assert_eq!(image.dimensions(), (200, 150));
        // Page 2 sits on the left in right-to-left order
        assert_eq!(image.get_pixel(0, 0)[0], 2);
        assert_eq!(image.get_pixel(150, 0)[0], 1);
    }

    #[test]
    fn page_change_resets_zoom() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 3);
        reader.apply(Gesture::DoubleTap(Point::new(200.0, 300.0)));
        assert!(reader.zoom().is_zoomed());
        reader.next();
        assert!(!reader.zoom().is_zoomed());
    }

    #[test]
    fn blocked_move_keeps_zoom() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 2);
        reader.last();
        reader.apply(Gesture::DoubleTap(Point::new(200.0, 300.0)));
        let zoomed = reader.zoom().transform();
        let revision = reader.image_revision();

        assert!(!reader.next());
        assert!(!reader.last());
        assert!(!reader.go_to(7));
        assert!(!reader.jump_to_page(2));
        assert_eq!(reader.zoom().transform(), zoomed);
        assert_eq!(reader.image_revision(), revision);
    }

    #[test]
    fn viewport_resize_resets_zoom() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 1);
        reader.apply(Gesture::DoubleTap(Point::new(200.0, 300.0)));
        assert!(reader.zoom().is_zoomed());

        reader.set_viewport(Size::new(500.0, 600.0));
        assert!(!reader.zoom().is_zoomed());
        assert!((reader.zoom().fit_scale() - 5.0).abs() < 1e-6);
        assert!((reader.zoom().scale() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn swipe_turns_only_when_not_zoomed() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 3);
        assert_eq!(reader.apply(Gesture::Swipe(Side::Right)), GestureEffect::PageTurned);
        assert_eq!(reader.position(), 1);

        reader.apply(Gesture::DoubleTap(Point::new(200.0, 300.0)));
        assert_eq!(reader.apply(Gesture::Swipe(Side::Right)), GestureEffect::None);
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn pan_at_base_scale_does_nothing() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 1);
        let before = reader.zoom().transform();
        assert_eq!(reader.apply(Gesture::Pan(Vector::new(30.0, 30.0))), GestureEffect::None);
        assert_eq!(reader.zoom().transform(), before);
    }

    #[test]
    fn long_press_toggles_chrome() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 1);
        assert_eq!(
            reader.apply(Gesture::LongPress(Point::ORIGIN)),
            GestureEffect::ToggleChrome
        );
    }

    #[test]
    fn jump_to_page_uses_page_numbers() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Double, 9);
        assert!(reader.jump_to_page(6));
        assert_eq!(reader.position(), 3);
        assert!(!reader.jump_to_page(0));
        assert!(!reader.jump_to_page(10));
    }

    #[test]
    fn zoom_out_past_fit_snaps_back() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 1);
        let fitted = reader.zoom().transform();
        reader.zoom_centered(2.0);
        assert!(reader.zoom().is_zoomed());
        reader.zoom_at(0.01, Point::new(10.0, 10.0));
        assert_eq!(reader.zoom().transform(), fitted);
    }

    #[test]
    fn reload_replaces_document() {
        let mut reader = reader(ReadingDirection::LeftToRight, PageLayout::Single, 5);
        reader.last();
        let revision = reader.image_revision();
        reader.load(document(2));
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.slot_count(), 2);
        assert!(reader.image_revision() > revision);
    }
}

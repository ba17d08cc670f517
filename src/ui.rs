//! UI components and viewer application

use crate::config::SettingsStore;
use crate::input::{GestureTracker, KeyHandler, MOUSE_POINTER_ID, PointerInput, ReaderAction};
use crate::pdf::{self, Document};
use crate::reader::{GestureEffect, Reader};
use crate::spread::{PageLayout, ReadingDirection};
use crate::zoom::ZoomController;
use iced::keyboard::{self, Modifiers};
use iced::widget::{button, canvas, column, container, image, radio, row, text};
use iced::{
    Alignment, Color, Element, Event, Length, Point, Rectangle, Renderer, Size, Subscription,
    Task, Theme, Vector, mouse, touch,
};
use std::path::PathBuf;
use std::time::Instant;

/// Wheel deltas reported in pixels are converted at this rate
const PIXELS_PER_LINE: f32 = 60.0;

#[derive(Debug, Clone)]
pub enum Message {
    EventOccurred(Event),
    Pointer(PointerInput),
    Wheel { lines: f32, focus: Point },
    /// The page canvas was laid out at a new size
    ViewportResized(Size),
    OpenFile,
    FileChosen(Option<PathBuf>),
    ToggleSettings,
    DirectionSelected(ReadingDirection),
    LayoutSelected(PageLayout),
    NextSlot,
    PreviousSlot,
    ResetZoom,
    DismissNotice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Info,
    Error,
}

/// Dismissible banner shown under the page
#[derive(Debug, Clone)]
struct Notice {
    kind: NoticeKind,
    message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Main viewer application
pub struct ViewerApp {
    reader: Reader,
    settings: SettingsStore,
    key_handler: KeyHandler,
    gestures: GestureTracker,
    /// Handle for the reader's current image, tagged with its revision
    page_handle: Option<(u64, image::Handle)>,
    notice: Option<Notice>,
    settings_open: bool,
    chrome_visible: bool,
}

impl ViewerApp {
    /// Create the viewer, optionally opening `file` right away
    pub fn new(file: Option<PathBuf>, settings: SettingsStore) -> (Self, Task<Message>) {
        let viewer = settings.viewer();
        let zoom = ZoomController::new(viewer.max_zoom_multiplier, viewer.double_tap_multiplier);
        let mut reader = Reader::new(settings.reader(), zoom);
        // Rough guess until the canvas reports its real size
        reader.set_viewport(Size::new(
            viewer.initial_window_width,
            viewer.initial_window_height,
        ));

        let mut app = Self {
            reader,
            settings,
            key_handler: KeyHandler::new(),
            gestures: GestureTracker::default(),
            page_handle: None,
            notice: None,
            settings_open: false,
            chrome_visible: true,
        };

        if let Some(path) = file {
            app.open_path(path);
        }

        (app, Task::none())
    }

    pub fn title(&self) -> String {
        match self.reader.title() {
            Some(title) => format!("{title} - Minima"),
            None => "Minima".to_string(),
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::EventOccurred(event) => {
                if let Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) = event {
                    self.handle_key_press(key, modifiers)
                } else {
                    Task::none()
                }
            }
            Message::Pointer(input) => {
                for gesture in self.gestures.handle(input) {
                    if self.reader.apply(gesture) == GestureEffect::ToggleChrome {
                        self.chrome_visible = !self.chrome_visible;
                    }
                }
                Task::none()
            }
            Message::Wheel { lines, focus } => {
                let step = self.settings.viewer().wheel_zoom_step;
                self.reader.zoom_at(step.powf(lines), focus);
                Task::none()
            }
            Message::ViewportResized(size) => {
                self.reader.set_viewport(size);
                Task::none()
            }
            Message::OpenFile => self.open_file_dialog(),
            Message::FileChosen(Some(path)) => {
                self.open_path(path);
                Task::none()
            }
            Message::FileChosen(None) => Task::none(),
            Message::ToggleSettings => {
                self.settings_open = !self.settings_open;
                Task::none()
            }
            Message::DirectionSelected(direction) => {
                self.select_direction(direction);
                Task::none()
            }
            Message::LayoutSelected(layout) => {
                self.select_layout(layout);
                Task::none()
            }
            Message::NextSlot => {
                self.reader.next();
                Task::none()
            }
            Message::PreviousSlot => {
                self.reader.previous();
                Task::none()
            }
            Message::ResetZoom => {
                self.reader.reset_zoom();
                Task::none()
            }
            Message::DismissNotice => {
                self.notice = None;
                Task::none()
            }
        };

        self.sync_page_handle();
        task
    }

    fn handle_key_press(&mut self, key: keyboard::Key, modifiers: Modifiers) -> Task<Message> {
        if modifiers.command() {
            return Task::none();
        }

        match self.key_handler.handle_key(&key) {
            ReaderAction::Turn(side) => {
                self.reader.turn(side);
            }
            ReaderAction::NextSlot => {
                self.reader.next();
            }
            ReaderAction::PreviousSlot => {
                self.reader.previous();
            }
            ReaderAction::FirstSlot => {
                self.reader.first();
            }
            ReaderAction::LastSlot => {
                self.reader.last();
            }
            ReaderAction::JumpToPage(number) => {
                if !self.reader.jump_to_page(number) {
                    tracing::debug!("Ignoring jump to missing page {}", number);
                }
            }
            ReaderAction::ResetZoom => self.reader.reset_zoom(),
            ReaderAction::ZoomIn => {
                let step = self.settings.viewer().wheel_zoom_step;
                self.reader.zoom_centered(step);
            }
            ReaderAction::ZoomOut => {
                let step = self.settings.viewer().wheel_zoom_step;
                self.reader.zoom_centered(step.recip());
            }
            ReaderAction::ToggleChrome => self.chrome_visible = !self.chrome_visible,
            ReaderAction::ToggleSettings => self.settings_open = !self.settings_open,
            ReaderAction::OpenFile => return self.open_file_dialog(),
            ReaderAction::FlipDirection => self.select_direction(self.reader.direction().flipped()),
            ReaderAction::FlipLayout => self.select_layout(self.reader.layout().flipped()),
            ReaderAction::Cancel => {
                self.notice = None;
                self.settings_open = false;
            }
            ReaderAction::Quit => return iced::exit(),
            ReaderAction::None => {}
        }

        Task::none()
    }

    fn open_file_dialog(&mut self) -> Task<Message> {
        self.settings_open = false;
        Task::perform(
            async {
                rfd::AsyncFileDialog::new()
                    .set_title("Select a PDF")
                    .add_filter("PDF document", &["pdf"])
                    .pick_file()
                    .await
                    .map(|handle| handle.path().to_path_buf())
            },
            Message::FileChosen,
        )
    }

    fn open_path(&mut self, path: PathBuf) {
        let width = self.settings.viewer().effective_render_width();
        let decoded = pdf::load_document(&path, width);
        self.show_document(&path.display().to_string(), decoded);
    }

    /// Swaps in a decoded document. Failures and empty files leave the current one in place.
    fn show_document(&mut self, source: &str, decoded: crate::Result<Document>) {
        match decoded {
            Ok(document) if document.is_empty() => {
                tracing::warn!("{} has no pages", source);
                self.notice = Some(Notice::info("No pages found in the selected file"));
            }
            Ok(document) => {
                let count = document.page_count();
                self.reader.load(document);
                self.notice = Some(Notice::info(format!("Loaded {count} pages")));
            }
            Err(err) => {
                tracing::error!("Failed to load {}: {}", source, err);
                self.notice = Some(Notice::error(format!("Error loading PDF: {err}")));
            }
        }
        self.sync_page_handle();
    }

    fn select_direction(&mut self, direction: ReadingDirection) {
        self.settings_open = false;
        if !self.reader.set_direction(direction) {
            return;
        }
        if let Err(err) = self.settings.set_reading_direction(direction) {
            tracing::error!("Failed to save reading direction: {}", err);
        }
    }

    fn select_layout(&mut self, layout: PageLayout) {
        self.settings_open = false;
        if !self.reader.set_layout(layout) {
            return;
        }
        if let Err(err) = self.settings.set_page_layout(layout) {
            tracing::error!("Failed to save page layout: {}", err);
        }
    }

    /// Rebuilds the image handle when the reader recomposed its bitmap
    fn sync_page_handle(&mut self) {
        let revision = self.reader.image_revision();
        if matches!(&self.page_handle, Some((cached, _)) if *cached == revision) {
            return;
        }
        self.page_handle = self.reader.current_image().map(|page| {
            let handle =
                image::Handle::from_rgba(page.width(), page.height(), page.as_raw().clone());
            (revision, handle)
        });
    }

    pub fn view(&self) -> Element<'_, Message> {
        let mut layout = column![];

        if self.chrome_visible {
            layout = layout.push(self.top_bar());
            if self.settings_open {
                layout = layout.push(self.settings_panel());
            }
        }

        layout = layout.push(self.page_area());

        if let Some(notice) = &self.notice {
            layout = layout.push(notice_bar(notice));
        }

        if self.chrome_visible {
            layout = layout.push(self.bottom_bar());
        }

        layout.into()
    }

    fn top_bar(&self) -> Element<'_, Message> {
        let title = self.reader.title().unwrap_or("Minima");

        container(
            row![
                container(text(title).size(18).color(Color::WHITE)).width(Length::Fill),
                button(text("Open")).on_press(Message::OpenFile),
                button(text("Settings")).on_press(Message::ToggleSettings),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        )
        .width(Length::Fill)
        .padding(8)
        .style(bar_style)
        .into()
    }

    fn settings_panel(&self) -> Element<'_, Message> {
        let direction = Some(self.reader.direction());
        let layout = Some(self.reader.layout());

        container(
            column![
                text("Reading direction").size(14).color(Color::WHITE),
                row![
                    radio(
                        "Left to right",
                        ReadingDirection::LeftToRight,
                        direction,
                        Message::DirectionSelected
                    ),
                    radio(
                        "Right to left",
                        ReadingDirection::RightToLeft,
                        direction,
                        Message::DirectionSelected
                    ),
                ]
                .spacing(20),
                text("Page layout").size(14).color(Color::WHITE),
                row![
                    radio("Single page", PageLayout::Single, layout, Message::LayoutSelected),
                    radio("Double page", PageLayout::Double, layout, Message::LayoutSelected),
                ]
                .spacing(20),
                button(text("Open file")).on_press(Message::OpenFile),
            ]
            .spacing(8),
        )
        .width(Length::Fill)
        .padding(10)
        .style(bar_style)
        .into()
    }

    fn page_area(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match &self.page_handle {
            Some((_, handle)) => canvas(PageCanvas {
                handle: handle.clone(),
                image_bounds: self.reader.zoom().image_bounds(),
                viewport: self.reader.zoom().viewport(),
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
            None => container(
                button(text("Tap to open a PDF").size(20)).on_press(Message::OpenFile),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into(),
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Color::BLACK.into()),
                ..container::Style::default()
            })
            .into()
    }

    fn bottom_bar(&self) -> Element<'_, Message> {
        let has_pages = self.reader.slot_count() > 0;
        let previous = button(text("Previous")).on_press_maybe(
            (has_pages && self.reader.position() > 0).then_some(Message::PreviousSlot),
        );
        let next = button(text("Next")).on_press_maybe(
            (has_pages && self.reader.position() + 1 < self.reader.slot_count())
                .then_some(Message::NextSlot),
        );

        let indicator = match (self.reader.page_indicator(), self.key_handler.pending()) {
            (Some(indicator), "") => indicator,
            (Some(indicator), pending) => format!("{indicator} | {pending}"),
            (None, _) => String::new(),
        };
        let indicator = container(text(indicator).size(14).color(Color::WHITE))
            .width(Length::Fill)
            .center_x(Length::Fill);

        let reset = button(text("Reset zoom"))
            .on_press_maybe(self.reader.zoom().is_zoomed().then_some(Message::ResetZoom));

        // The forward button sits on the side pages turn toward
        let controls = match self.reader.direction() {
            ReadingDirection::LeftToRight => row![previous, indicator, next, reset],
            ReadingDirection::RightToLeft => row![next, indicator, previous, reset],
        };

        container(controls.spacing(8).align_y(Alignment::Center))
            .width(Length::Fill)
            .padding(5)
            .style(bar_style)
            .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        keyboard::listen().map(|event| Message::EventOccurred(Event::Keyboard(event)))
    }
}

fn bar_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Color::from_rgb8(30, 30, 30).into()),
        ..container::Style::default()
    }
}

fn notice_bar(notice: &Notice) -> Element<'_, Message> {
    let color = match notice.kind {
        NoticeKind::Info => Color::from_rgb8(40, 70, 40),
        NoticeKind::Error => Color::from_rgb8(110, 30, 30),
    };

    container(
        row![
            container(text(notice.message.as_str()).size(14).color(Color::WHITE))
                .width(Length::Fill),
            button(text("Dismiss")).on_press(Message::DismissNotice),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    )
    .width(Length::Fill)
    .padding(6)
    .style(move |_theme| container::Style {
        background: Some(color.into()),
        ..container::Style::default()
    })
    .into()
}

/// Draws the current page under the zoom transform and forwards pointer input
struct PageCanvas {
    handle: image::Handle,
    image_bounds: Rectangle,
    viewport: Size,
}

#[derive(Debug, Default)]
struct PointerState {
    mouse_down: bool,
}

impl canvas::Program<Message> for PageCanvas {
    type State = PointerState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<iced::widget::Action<Message>> {
        use iced::widget::Action;

        // Post-layout: the controller refits once the real size is known
        if bounds.size() != self.viewport {
            return Some(Action::publish(Message::ViewportResized(bounds.size())));
        }

        let origin = Vector::new(bounds.x, bounds.y);
        let input = match event {
            Event::Touch(touch::Event::FingerPressed { id, position }) => {
                if !bounds.contains(*position) {
                    return None;
                }
                PointerInput::Pressed {
                    id: id.0,
                    position: *position - origin,
                    at: Instant::now(),
                }
            }
            Event::Touch(touch::Event::FingerMoved { id, position }) => PointerInput::Moved {
                id: id.0,
                position: *position - origin,
            },
            Event::Touch(touch::Event::FingerLifted { id, position }) => PointerInput::Released {
                id: id.0,
                position: *position - origin,
                at: Instant::now(),
            },
            Event::Touch(touch::Event::FingerLost { id, .. }) => PointerInput::Lost { id: id.0 },
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                state.mouse_down = true;
                PointerInput::Pressed {
                    id: MOUSE_POINTER_ID,
                    position,
                    at: Instant::now(),
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) if state.mouse_down => {
                PointerInput::Moved {
                    id: MOUSE_POINTER_ID,
                    position: cursor.position_from(bounds.position())?,
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) if state.mouse_down => {
                state.mouse_down = false;
                match cursor.position_from(bounds.position()) {
                    Some(position) => PointerInput::Released {
                        id: MOUSE_POINTER_ID,
                        position,
                        at: Instant::now(),
                    },
                    None => PointerInput::Lost {
                        id: MOUSE_POINTER_ID,
                    },
                }
            }
            Event::Mouse(mouse::Event::CursorLeft) if state.mouse_down => {
                state.mouse_down = false;
                PointerInput::Lost {
                    id: MOUSE_POINTER_ID,
                }
            }
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let focus = cursor.position_in(bounds)?;
                let lines = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y,
                    mouse::ScrollDelta::Pixels { y, .. } => *y / PIXELS_PER_LINE,
                };
                return Some(Action::publish(Message::Wheel { lines, focus }).and_capture());
            }
            _ => return None,
        };

        Some(Action::publish(Message::Pointer(input)).and_capture())
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        frame.draw_image(self.image_bounds, canvas::Image::new(self.handle.clone()));
        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use ::image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn document(title: &str, count: usize) -> Document {
        let pages = (0..count)
            .map(|_| RgbaImage::from_pixel(100, 150, Rgba([255, 255, 255, 255])))
            .collect();
        Document::new(title, pages)
    }

    fn app_with_document(settings: SettingsStore) -> ViewerApp {
        let (mut app, _) = ViewerApp::new(None, settings);
        app.show_document("first.pdf", Ok(document("first", 3)));
        app
    }

    fn press(app: &mut ViewerApp, key: keyboard::Key) {
        let _ = app.update(Message::EventOccurred(Event::Keyboard(
            keyboard::Event::KeyPressed {
                key: key.clone(),
                modified_key: key,
                physical_key: keyboard::key::Physical::Unidentified(
                    keyboard::key::NativeCode::Unidentified,
                ),
                location: keyboard::Location::Standard,
                modifiers: Modifiers::default(),
                text: None,
                repeat: false,
            },
        )));
    }

    #[test]
    fn loading_shows_page_count() {
        let app = app_with_document(SettingsStore::in_memory(Default::default()));
        assert_eq!(app.reader.title(), Some("first"));
        assert_eq!(app.reader.slot_count(), 3);
        assert!(app.page_handle.is_some());
        let notice = app.notice.as_ref().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.message, "Loaded 3 pages");
    }

    #[test]
    fn empty_file_keeps_current_document() {
        let mut app = app_with_document(SettingsStore::in_memory(Default::default()));
        app.reader.next();

        app.show_document("empty.pdf", Ok(document("empty", 0)));

        assert_eq!(app.reader.title(), Some("first"));
        assert_eq!(app.reader.position(), 1);
        let notice = app.notice.as_ref().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.message, "No pages found in the selected file");
    }

    #[test]
    fn decode_failure_keeps_current_document() {
        let mut app = app_with_document(SettingsStore::in_memory(Default::default()));

        app.show_document(
            "broken.pdf",
            Err(Error::Render {
                index: 2,
                reason: "bad stream".to_string(),
            }),
        );

        assert_eq!(app.reader.title(), Some("first"));
        assert_eq!(app.reader.slot_count(), 3);
        assert!(app.page_handle.is_some());
        let notice = app.notice.as_ref().expect("notice");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.starts_with("Error loading PDF: page 2"));
    }

    #[test]
    fn settings_choice_persists_and_closes_panel() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join("settings.toml");
        let mut app = app_with_document(SettingsStore::open(path.clone()));

        let _ = app.update(Message::ToggleSettings);
        assert!(app.settings_open);
        let _ = app.update(Message::LayoutSelected(PageLayout::Double));

        assert!(!app.settings_open);
        assert_eq!(app.reader.layout(), PageLayout::Double);
        assert_eq!(SettingsStore::open(path.clone()).page_layout(), PageLayout::Double);

        let _ = app.update(Message::DirectionSelected(ReadingDirection::RightToLeft));
        assert_eq!(
            SettingsStore::open(path).reading_direction(),
            ReadingDirection::RightToLeft
        );
    }

    #[test]
    fn escape_dismisses_notice_and_closes_settings() {
        let mut app = app_with_document(SettingsStore::in_memory(Default::default()));
        let _ = app.update(Message::ToggleSettings);
        press(&mut app, keyboard::Key::Character("7".into()));
        assert!(app.notice.is_some());
        assert_eq!(app.key_handler.pending(), "7");

        press(&mut app, keyboard::Key::Named(keyboard::key::Named::Escape));

        assert!(app.notice.is_none());
        assert!(!app.settings_open);
        assert_eq!(app.key_handler.pending(), "");
    }
}

//! Pan and zoom transform for a single page view
//!
//! The controller keeps an affine transform `p' = p * scale + translation`
//! that maps image pixels into view coordinates. The lowest allowed scale is
//! the fit scale for the current [`FitMode`], the highest is the fit scale
//! times a configurable multiplier.

use iced::{Point, Rectangle, Size, Vector};

/// Default upper bound, relative to the fit scale
pub const DEFAULT_MAX_ZOOM_MULTIPLIER: f32 = 4.0;
/// Default double-tap zoom, relative to the fit scale
pub const DEFAULT_DOUBLE_TAP_MULTIPLIER: f32 = 2.5;

/// Which dimension the base scale fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    #[default]
    FitToWidth,
    FitToHeight,
}

/// Uniform scale followed by a translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub translation: Vector,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translation: Vector::new(0.0, 0.0),
    };

    /// Scales about `focus`, which keeps its position on screen
    fn post_scale(&mut self, factor: f32, focus: Point) {
        self.scale *= factor;
        self.translation = Vector::new(
            focus.x + (self.translation.x - focus.x) * factor,
            focus.y + (self.translation.y - focus.y) * factor,
        );
    }

    fn post_translate(&mut self, delta: Vector) {
        self.translation = self.translation + delta;
    }

    /// Maps an image-space rectangle at the origin into view space
    pub fn map_size(&self, size: Size) -> Rectangle {
        Rectangle {
            x: self.translation.x,
            y: self.translation.y,
            width: size.width * self.scale,
            height: size.height * self.scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Zoom state of one page view
#[derive(Debug, Clone)]
pub struct ZoomController {
    viewport: Size,
    content: Size,
    fit_mode: FitMode,
    fit_scale: f32,
    max_multiplier: f32,
    double_tap_multiplier: f32,
    transform: Transform,
}

impl ZoomController {
    /// Non-finite multipliers fall back to the defaults
    pub fn new(max_multiplier: f32, double_tap_multiplier: f32) -> Self {
        let max_multiplier = finite_or(max_multiplier, DEFAULT_MAX_ZOOM_MULTIPLIER).max(1.0);
        let double_tap_multiplier =
            finite_or(double_tap_multiplier, DEFAULT_DOUBLE_TAP_MULTIPLIER);
        Self {
            viewport: Size::ZERO,
            content: Size::ZERO,
            fit_mode: FitMode::default(),
            fit_scale: 1.0,
            max_multiplier,
            double_tap_multiplier: double_tap_multiplier.clamp(1.0, max_multiplier),
            transform: Transform::IDENTITY,
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn fit_scale(&self) -> f32 {
        self.fit_scale
    }

    pub fn max_scale(&self) -> f32 {
        self.fit_scale * self.max_multiplier
    }

    pub fn scale(&self) -> f32 {
        self.transform.scale
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Where the image currently sits in view coordinates
    pub fn image_bounds(&self) -> Rectangle {
        self.transform.map_size(self.content)
    }

    /// Both the view and the image have a usable size
    pub fn is_laid_out(&self) -> bool {
        self.viewport.width > 0.0
            && self.viewport.height > 0.0
            && self.content.width > 0.0
            && self.content.height > 0.0
    }

    pub fn is_zoomed(&self) -> bool {
        self.is_laid_out() && self.transform.scale > self.fit_scale
    }

    /// Updates the view size and returns to the fit transform
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.reset();
    }

    /// Installs a new image and returns to the fit transform
    pub fn set_content(&mut self, content: Size, fit_mode: FitMode) {
        self.content = content;
        self.fit_mode = fit_mode;
        self.reset();
    }

    /// Back to the fit scale with the image centered
    pub fn reset(&mut self) {
        if !self.is_laid_out() {
            self.fit_scale = 1.0;
            self.transform = Transform::IDENTITY;
            return;
        }

        self.fit_scale = match self.fit_mode {
            FitMode::FitToWidth => self.viewport.width / self.content.width,
            FitMode::FitToHeight => self.viewport.height / self.content.height,
        };

        let dx = (self.viewport.width - self.content.width * self.fit_scale) / 2.0;
        let dy = (self.viewport.height - self.content.height * self.fit_scale) / 2.0;
        self.transform = Transform {
            scale: self.fit_scale,
            translation: Vector::new(dx, dy),
        };
    }

    /// Applies a pinch step about `focus`. Returns whether the view is zoomed afterwards.
    pub fn pinch(&mut self, factor: f32, focus: Point) -> bool {
        if !self.is_laid_out() || !factor.is_finite() || factor <= 0.0 {
            return self.is_zoomed();
        }

        let current = self.transform.scale;
        let target = (current * factor).clamp(self.fit_scale, self.max_scale());
        self.transform.post_scale(target / current, focus);
        // Snap to avoid drift from repeated multiplication
        self.transform.scale = target;
        self.fix_translation();
        self.is_zoomed()
    }

    /// Drags the image. Only moves while zoomed above the fit scale.
    pub fn pan(&mut self, delta: Vector) -> bool {
        if !self.is_zoomed() {
            return false;
        }
        let before = self.transform.translation;
        self.transform.post_translate(delta);
        self.fix_translation();
        self.transform.translation != before
    }

    /// Toggles between the fit transform and a fixed zoom about `at`
    pub fn double_tap(&mut self, at: Point) {
        if !self.is_laid_out() {
            return;
        }
        if self.is_zoomed() {
            self.reset();
            return;
        }

        let target = self.fit_scale * self.double_tap_multiplier;
        self.transform.post_scale(target / self.transform.scale, at);
        self.transform.scale = target;
        self.fix_translation();
    }

    /// All pointers lifted: anything at or below the fit scale snaps back
    pub fn release(&mut self) {
        if self.is_laid_out() && self.transform.scale <= self.fit_scale {
            self.reset();
        }
    }

    /// Keeps the image from leaving empty canvas between its edges and the view
    fn fix_translation(&mut self) {
        let bounds = self.image_bounds();
        let dx = axis_fix(bounds.x, bounds.x + bounds.width, self.viewport.width);
        let dy = axis_fix(bounds.y, bounds.y + bounds.height, self.viewport.height);
        self.transform.post_translate(Vector::new(dx, dy));
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ZOOM_MULTIPLIER, DEFAULT_DOUBLE_TAP_MULTIPLIER)
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// Correction for one axis given the mapped image span `[min, max]`
fn axis_fix(min: f32, max: f32, view: f32) -> f32 {
    if max - min < view {
        (view - (max + min)) / 2.0
    } else if min > 0.0 {
        -min
    } else if max < view {
        view - max
    } else {
        0.0
    }
}

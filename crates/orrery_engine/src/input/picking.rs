//! Pointer state for picking
//!
//! Converts window pixel coordinates into Normalized Device Coordinates for
//! ray casting.

/// Last known pointer position and the viewport it is relative to
#[derive(Debug, Clone, PartialEq)]
pub struct PointerState {
    /// Screen-space X position (pixels from the left)
    pub screen_x: f64,
    /// Screen-space Y position (pixels from the top)
    pub screen_y: f64,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
}

impl PointerState {
    /// Pointer at the top-left corner of a `viewport_width` × `viewport_height` viewport
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            screen_x: 0.0,
            screen_y: 0.0,
            viewport_width,
            viewport_height,
        }
    }

    /// Convert the pointer position to Normalized Device Coordinates
    ///
    /// NDC range is `[-1, 1]` on both axes:
    /// - X: -1 = left, +1 = right
    /// - Y: -1 = bottom, +1 = top (screen Y is flipped)
    ///
    /// # Examples
    /// ```
    /// # use orrery_engine::input::picking::PointerState;
    /// let mut pointer = PointerState::new(1920, 1080);
    /// pointer.update_position(960.0, 540.0);
    /// assert_eq!(pointer.screen_to_ndc(), (0.0, 0.0));
    /// ```
    #[allow(clippy::cast_possible_truncation)]
    pub fn screen_to_ndc(&self) -> (f32, f32) {
        let width = f64::from(self.viewport_width.max(1));
        let height = f64::from(self.viewport_height.max(1));
        let ndc_x = (self.screen_x / width) * 2.0 - 1.0;
        let ndc_y = 1.0 - (self.screen_y / height) * 2.0;
        (ndc_x as f32, ndc_y as f32)
    }

    /// Update the pointer position from a window event
    pub fn update_position(&mut self, x: f64, y: f64) {
        self.screen_x = x;
        self.screen_y = y;
    }

    /// Update the viewport size after a resize
    pub fn update_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height.max(1) as f32
    }
}

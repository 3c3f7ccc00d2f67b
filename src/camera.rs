use glam::{Mat4, Vec2};

/// Fits the whole map into the viewport, letterboxed to keep its aspect.
pub struct Camera {
    pub map_width: f32,
    pub map_height: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Camera {
    pub fn new(map_width: u32, map_height: u32, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            map_width: map_width as f32,
            map_height: map_height as f32,
            viewport_width,
            viewport_height,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.map_width, self.map_height) * 0.5
    }

    /// Map pixels per screen pixel.
    pub fn zoom(&self) -> f32 {
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return 1.0;
        }
        (self.viewport_width / self.map_width).min(self.viewport_height / self.map_height)
    }

    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> Vec2 {
        let zoom = self.zoom();
        let offset = Vec2::new(
            screen_x - self.viewport_width * 0.5,
            self.viewport_height * 0.5 - screen_y,
        );
        self.position() + offset / zoom
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let zoom = self.zoom();
        let half_width = self.viewport_width / (2.0 * zoom);
        let half_height = self.viewport_height / (2.0 * zoom);
        let center = self.position();

        Mat4::orthographic_rh(
            center.x - half_width,
            center.x + half_width,
            center.y - half_height,
            center.y + half_height,
            -1.0,
            1.0,
        )
    }
}

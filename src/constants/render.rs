//! Presentation colors and window constants.

/// Window background (brown parchment)
pub const BACKGROUND_COLOR: [f32; 4] = [0x9B as f32 / 255.0, 0x76 as f32 / 255.0, 0x53 as f32 / 255.0, 1.0];
/// Room fill when settled
pub const ROOM_FILL_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
/// Room fill while overlapping another room
pub const ROOM_TOUCHING_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 0.25];
/// Room border
pub const ROOM_BORDER_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
/// Interior grid lines of a room
pub const ROOM_GRID_LINE_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
/// Static map bounds
pub const WALL_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
/// Corridor lines between neighboring rooms
pub const CORRIDOR_COLOR: [f32; 4] = [0.0, 0.5, 0.0, 0.5];

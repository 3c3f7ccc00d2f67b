use std::mem;
use std::sync::Arc;

use glam::Vec2;
use glow::*;

use crate::camera::Camera;
use crate::constants::*;
use crate::dungeon::Presenter;
use crate::room::{Room, Wall};

const QUAD_VERTEX_SHADER_SRC: &str = r#"#version 330 core
layout (location = 0) in vec2 aPos;
layout (location = 1) in vec2 aInstancePos;
layout (location = 2) in vec2 aInstanceSize;
layout (location = 3) in vec4 aInstanceColor;

uniform mat4 uProjection;

out vec4 vColor;

void main() {
    vec2 worldPos = aInstancePos + aPos * aInstanceSize;
    gl_Position = uProjection * vec4(worldPos, 0.0, 1.0);
    vColor = aInstanceColor;
}
"#;

const LINE_VERTEX_SHADER_SRC: &str = r#"#version 330 core
layout (location = 0) in vec2 aPos;
layout (location = 1) in vec4 aColor;

uniform mat4 uProjection;

out vec4 vColor;

void main() {
    gl_Position = uProjection * vec4(aPos, 0.0, 1.0);
    vColor = aColor;
}
"#;

const FRAGMENT_SHADER_SRC: &str = r#"#version 330 core
in vec4 vColor;
out vec4 FragColor;

void main() {
    FragColor = vColor;
}
"#;

/// Floats per quad instance: position (2) + size (2) + color (4)
const QUAD_STRIDE: usize = 8;
/// Floats per line vertex: position (2) + color (4)
const LINE_STRIDE: usize = 6;

/// CPU-side geometry for one frame, filled through [`Presenter`].
///
/// Quads are axis-aligned rectangles given by their bottom-left corner,
/// drawn in insertion order so later quads paint over earlier ones.
#[derive(Debug, Default)]
pub struct SceneBatch {
    pub quads: Vec<f32>,
    pub lines: Vec<f32>,
}

impl SceneBatch {
    pub fn clear(&mut self) {
        self.quads.clear();
        self.lines.clear();
    }

    pub fn quad_count(&self) -> usize {
        self.quads.len() / QUAD_STRIDE
    }

    pub fn line_vertex_count(&self) -> usize {
        self.lines.len() / LINE_STRIDE
    }

    fn push_quad(&mut self, min: Vec2, size: Vec2, color: [f32; 4]) {
        self.quads.extend_from_slice(&[min.x, min.y, size.x, size.y]);
        self.quads.extend_from_slice(&color);
    }

    fn push_line(&mut self, from: Vec2, to: Vec2, color: [f32; 4]) {
        for p in [from, to] {
            self.lines.extend_from_slice(&[p.x, p.y]);
            self.lines.extend_from_slice(&color);
        }
    }
}

impl Presenter for SceneBatch {
    fn draw_room(&mut self, room: &Room) {
        let size = room.size();
        let min = room.position - size * 0.5;
        let border = ROOM_WALL_THICKNESS as f32;

        self.push_quad(min, size, ROOM_BORDER_COLOR);
        let inner_min = min + Vec2::splat(border);
        let inner_size = size - Vec2::splat(2.0 * border);
        self.push_quad(inner_min, inner_size, ROOM_FILL_COLOR);

        let line = ROOM_LINE_THICKNESS as f32;
        let (xs, ys) = room.grid_lines();
        for x in xs {
            // Offsets count the separator after each cell, so step back onto it
            let at = min.x + (x - ROOM_LINE_THICKNESS) as f32;
            self.push_quad(
                Vec2::new(at, inner_min.y),
                Vec2::new(line, inner_size.y),
                ROOM_GRID_LINE_COLOR,
            );
        }
        for y in ys {
            let at = min.y + (y - ROOM_LINE_THICKNESS) as f32;
            self.push_quad(
                Vec2::new(inner_min.x, at),
                Vec2::new(inner_size.x, line),
                ROOM_GRID_LINE_COLOR,
            );
        }

        if room.touching > 0 {
            self.push_quad(min, size, ROOM_TOUCHING_COLOR);
        }
    }

    fn draw_wall(&mut self, wall: &Wall) {
        let size = Vec2::new(wall.width as f32, wall.height as f32);
        self.push_quad(wall.position - size * 0.5, size, WALL_COLOR);
    }

    fn draw_corridor(&mut self, from: Vec2, to: Vec2) {
        self.push_line(from, to, CORRIDOR_COLOR);
    }
}

pub struct Renderer {
    gl: Arc<glow::Context>,
    quad_program: NativeProgram,
    quad_vao: NativeVertexArray,
    quad_vbo: NativeBuffer,
    instance_vbo: NativeBuffer,
    quad_projection_loc: NativeUniformLocation,
    line_program: NativeProgram,
    line_vao: NativeVertexArray,
    line_vbo: NativeBuffer,
    line_projection_loc: NativeUniformLocation,
}

impl Renderer {
    pub fn new(gl: Arc<glow::Context>) -> Result<Self, String> {
        unsafe {
            let quad_program = compile_program(&gl, QUAD_VERTEX_SHADER_SRC, FRAGMENT_SHADER_SRC)?;
            let quad_projection_loc = gl
                .get_uniform_location(quad_program, "uProjection")
                .ok_or("Failed to get quad projection uniform location")?;

            // Unit quad (0,0 to 1,1), scaled per instance
            let vertices: [f32; 12] = [
                0.0, 0.0, // bottom-left
                1.0, 0.0, // bottom-right
                1.0, 1.0, // top-right
                0.0, 0.0, // bottom-left
                1.0, 1.0, // top-right
                0.0, 1.0, // top-left
            ];

            let quad_vao = gl
                .create_vertex_array()
                .map_err(|e| format!("Failed to create VAO: {}", e))?;
            gl.bind_vertex_array(Some(quad_vao));

            let quad_vbo = gl
                .create_buffer()
                .map_err(|e| format!("Failed to create VBO: {}", e))?;
            gl.bind_buffer(ARRAY_BUFFER, Some(quad_vbo));
            gl.buffer_data_u8_slice(ARRAY_BUFFER, as_u8_slice(&vertices), STATIC_DRAW);

            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, FLOAT, false, 8, 0);

            let instance_vbo = gl
                .create_buffer()
                .map_err(|e| format!("Failed to create instance VBO: {}", e))?;
            gl.bind_buffer(ARRAY_BUFFER, Some(instance_vbo));

            let stride = (QUAD_STRIDE * mem::size_of::<f32>()) as i32;
            // Position, size, color
            for (location, count, offset) in [(1, 2, 0), (2, 2, 8), (3, 4, 16)] {
                gl.enable_vertex_attrib_array(location);
                gl.vertex_attrib_pointer_f32(location, count, FLOAT, false, stride, offset);
                gl.vertex_attrib_divisor(location, 1);
            }

            gl.bind_vertex_array(None);

            let line_program = compile_program(&gl, LINE_VERTEX_SHADER_SRC, FRAGMENT_SHADER_SRC)?;
            let line_projection_loc = gl
                .get_uniform_location(line_program, "uProjection")
                .ok_or("Failed to get line projection uniform location")?;

            let line_vao = gl
                .create_vertex_array()
                .map_err(|e| format!("Failed to create line VAO: {}", e))?;
            gl.bind_vertex_array(Some(line_vao));

            let line_vbo = gl
                .create_buffer()
                .map_err(|e| format!("Failed to create line VBO: {}", e))?;
            gl.bind_buffer(ARRAY_BUFFER, Some(line_vbo));

            let stride = (LINE_STRIDE * mem::size_of::<f32>()) as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 4, FLOAT, false, stride, 8);

            gl.bind_vertex_array(None);

            let [r, g, b, a] = BACKGROUND_COLOR;
            gl.clear_color(r, g, b, a);

            // Touching overlays and corridors are translucent
            gl.enable(BLEND);
            gl.blend_func(SRC_ALPHA, ONE_MINUS_SRC_ALPHA);

            Ok(Self {
                gl,
                quad_program,
                quad_vao,
                quad_vbo,
                instance_vbo,
                quad_projection_loc,
                line_program,
                line_vao,
                line_vbo,
                line_projection_loc,
            })
        }
    }

    pub fn resize(&self, width: i32, height: i32) {
        unsafe {
            self.gl.viewport(0, 0, width, height);
        }
    }

    /// Clear the frame and draw `batch`: quads first, corridors on top.
    pub fn render(&self, camera: &Camera, batch: &SceneBatch) {
        puffin::profile_function!();

        let projection = camera.projection_matrix();

        unsafe {
            self.gl.clear(COLOR_BUFFER_BIT);

            if batch.quad_count() > 0 {
                puffin::profile_scope!("render_quads");
                self.gl.use_program(Some(self.quad_program));
                self.gl.bind_vertex_array(Some(self.quad_vao));
                self.gl.uniform_matrix_4_f32_slice(
                    Some(&self.quad_projection_loc),
                    false,
                    projection.as_ref(),
                );

                self.gl.bind_buffer(ARRAY_BUFFER, Some(self.instance_vbo));
                self.gl
                    .buffer_data_u8_slice(ARRAY_BUFFER, as_u8_slice(&batch.quads), DYNAMIC_DRAW);
                self.gl
                    .draw_arrays_instanced(TRIANGLES, 0, 6, batch.quad_count() as i32);
                self.gl.bind_vertex_array(None);
            }

            if batch.line_vertex_count() > 0 {
                puffin::profile_scope!("render_corridors");
                self.gl.use_program(Some(self.line_program));
                self.gl.bind_vertex_array(Some(self.line_vao));
                self.gl.uniform_matrix_4_f32_slice(
                    Some(&self.line_projection_loc),
                    false,
                    projection.as_ref(),
                );

                self.gl.bind_buffer(ARRAY_BUFFER, Some(self.line_vbo));
                self.gl
                    .buffer_data_u8_slice(ARRAY_BUFFER, as_u8_slice(&batch.lines), DYNAMIC_DRAW);
                self.gl
                    .draw_arrays(LINES, 0, batch.line_vertex_count() as i32);
                self.gl.bind_vertex_array(None);
            }
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.quad_program);
            self.gl.delete_vertex_array(self.quad_vao);
            self.gl.delete_buffer(self.quad_vbo);
            self.gl.delete_buffer(self.instance_vbo);
            self.gl.delete_program(self.line_program);
            self.gl.delete_vertex_array(self.line_vao);
            self.gl.delete_buffer(self.line_vbo);
        }
    }
}

unsafe fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<NativeProgram, String> {
    let vertex_shader = gl
        .create_shader(VERTEX_SHADER)
        .map_err(|e| format!("Failed to create vertex shader: {}", e))?;
    gl.shader_source(vertex_shader, vertex_src);
    gl.compile_shader(vertex_shader);
    if !gl.get_shader_compile_status(vertex_shader) {
        return Err(gl.get_shader_info_log(vertex_shader));
    }

    let fragment_shader = gl
        .create_shader(FRAGMENT_SHADER)
        .map_err(|e| format!("Failed to create fragment shader: {}", e))?;
    gl.shader_source(fragment_shader, fragment_src);
    gl.compile_shader(fragment_shader);
    if !gl.get_shader_compile_status(fragment_shader) {
        return Err(gl.get_shader_info_log(fragment_shader));
    }

    let program = gl
        .create_program()
        .map_err(|e| format!("Failed to create program: {}", e))?;
    gl.attach_shader(program, vertex_shader);
    gl.attach_shader(program, fragment_shader);
    gl.link_program(program);
    if !gl.get_program_link_status(program) {
        return Err(gl.get_program_info_log(program));
    }

    gl.delete_shader(vertex_shader);
    gl.delete_shader(fragment_shader);
    Ok(program)
}

fn as_u8_slice<T>(data: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, mem::size_of_val(data)) }
}

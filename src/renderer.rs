use crate::constants::*;
use crate::error::RenderError;
use crate::frame::{FrameParams, FrameSink};
use glow::*;
use std::mem;
use std::sync::Arc;

const VERTEX_SHADER_SRC: &str = r#"#version 330 core
layout (location = 0) in vec2 aPos;
layout (location = 1) in vec2 aUv;

out vec2 vUv;

void main() {
    gl_Position = vec4(aPos, 0.0, 1.0);
    vUv = aUv;
}
"#;

const FRAGMENT_SHADER_SRC: &str = r#"#version 330 core
in vec2 vUv;
out vec4 FragColor;

// scale, delta.x, delta.y, origin.x, origin.y
uniform float uFrame[5];
uniform int uMaxIterations;

vec3 palette(float t) {
    return 0.5 + 0.5 * cos(6.28318 * (t + vec3(0.0, 0.15, 0.3)));
}

void main() {
    float scale = uFrame[0];
    vec2 delta = vec2(uFrame[1], uFrame[2]);
    vec2 origin = vec2(uFrame[3], uFrame[4]);

    vec2 c = origin + (vUv - 0.5) * 2.0 * delta;

    // Deeper zoom needs more iterations to resolve the boundary
    int maxIter = uMaxIterations + int(32.0 * log2(max(scale, 1.0)));

    vec2 z = vec2(0.0);
    int i = 0;
    for (; i < maxIter; i++) {
        z = vec2(z.x * z.x - z.y * z.y, 2.0 * z.x * z.y) + c;
        if (dot(z, z) > 256.0) {
            break;
        }
    }

    if (i >= maxIter) {
        FragColor = vec4(0.0, 0.0, 0.0, 1.0);
        return;
    }

    float smoothIter = float(i) + 1.0 - log2(log2(dot(z, z)) * 0.5);
    FragColor = vec4(palette(smoothIter / 64.0), 1.0);
}
"#;

/// Full-screen quad, two triangles: position (x, y) then uv (u, v).
const QUAD_VERTICES: [f32; 24] = [
    -1.0, -1.0, 0.0, 0.0, // bottom-left
    -1.0, 1.0, 0.0, 1.0, // top-left
    1.0, -1.0, 1.0, 0.0, // bottom-right
    1.0, -1.0, 1.0, 0.0, // bottom-right
    -1.0, 1.0, 0.0, 1.0, // top-left
    1.0, 1.0, 1.0, 1.0, // top-right
];

pub struct Renderer {
    gl: Arc<glow::Context>,
    program: NativeProgram,
    vao: NativeVertexArray,
    vbo: NativeBuffer,
    frame_loc: NativeUniformLocation,
    iterations_loc: NativeUniformLocation,
    max_iterations: u32,
}

impl Renderer {
    pub fn new(gl: Arc<glow::Context>, max_iterations: u32) -> Result<Self, RenderError> {
        unsafe {
            let vertex_shader = compile_shader(&gl, VERTEX_SHADER, "vertex", VERTEX_SHADER_SRC)?;
            let fragment_shader =
                compile_shader(&gl, FRAGMENT_SHADER, "fragment", FRAGMENT_SHADER_SRC)?;

            let program = gl.create_program().map_err(|message| RenderError::Create {
                kind: "program",
                message,
            })?;
            gl.attach_shader(program, vertex_shader);
            gl.attach_shader(program, fragment_shader);
            gl.link_program(program);
            if !gl.get_program_link_status(program) {
                return Err(RenderError::Link(gl.get_program_info_log(program)));
            }

            gl.delete_shader(vertex_shader);
            gl.delete_shader(fragment_shader);

            let frame_loc = gl
                .get_uniform_location(program, "uFrame")
                .ok_or(RenderError::MissingUniform("uFrame"))?;
            let iterations_loc = gl
                .get_uniform_location(program, "uMaxIterations")
                .ok_or(RenderError::MissingUniform("uMaxIterations"))?;

            let vao = gl.create_vertex_array().map_err(|message| RenderError::Create {
                kind: "vertex array",
                message,
            })?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl.create_buffer().map_err(|message| RenderError::Create {
                kind: "vertex buffer",
                message,
            })?;
            gl.bind_buffer(ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(ARRAY_BUFFER, as_u8_slice(&QUAD_VERTICES), STATIC_DRAW);

            let stride = (4 * mem::size_of::<f32>()) as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 2, FLOAT, false, stride, 8);

            gl.bind_vertex_array(None);

            let [r, g, b, a] = CLEAR_COLOR;
            gl.clear_color(r, g, b, a);

            tracing::debug!(max_iterations, "fractal renderer ready");

            Ok(Self {
                gl,
                program,
                vao,
                vbo,
                frame_loc,
                iterations_loc,
                max_iterations,
            })
        }
    }

    pub fn resize(&self, width: i32, height: i32) {
        unsafe {
            self.gl.viewport(0, 0, width, height);
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}

impl FrameSink for Renderer {
    /// Draw the fractal quad for this frame's parameters.
    fn submit(&mut self, params: &FrameParams) -> Result<(), RenderError> {
        puffin::profile_function!();

        let block = params.to_block();
        let iterations = i32::try_from(self.max_iterations).unwrap_or(i32::MAX);
        unsafe {
            self.gl.clear(COLOR_BUFFER_BIT);

            self.gl.use_program(Some(self.program));
            self.gl.uniform_1_f32_slice(Some(&self.frame_loc), &block);
            self.gl.uniform_1_i32(Some(&self.iterations_loc), iterations);

            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_arrays(TRIANGLES, 0, 6);
            self.gl.bind_vertex_array(None);
            self.gl.use_program(None);
        }
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.program);
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_buffer(self.vbo);
        }
    }
}

unsafe fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    stage: &'static str,
    source: &str,
) -> Result<NativeShader, RenderError> {
    let shader = gl.create_shader(shader_type).map_err(|message| RenderError::Create {
        kind: "shader",
        message,
    })?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(RenderError::Compile { stage, log });
    }
    Ok(shader)
}

fn as_u8_slice<T>(data: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            data.as_ptr() as *const u8,
            data.len() * mem::size_of::<T>(),
        )
    }
}

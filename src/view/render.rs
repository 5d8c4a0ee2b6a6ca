use wgpu::*;
use wgpu::util::DeviceExt;

use crate::controller::{FrameCommands, MatrixUniform};
use crate::error::CubeError;
use crate::model::{COLORS, INDICES, POSITIONS};
use crate::ui::{OverlayFrame, PendingTextures};

pub const CUBE_SHADER: &str = include_str!("shaders/cube.wgsl");

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Named uniform inputs of the cube shader and their bindings in group 0
pub const UNIFORM_SLOTS: [(&str, u32); 3] = [
    ("projection_matrix", 0),
    ("view_matrix", 1),
    ("model_matrix", 2),
];

/// Named per-vertex inputs: (name, shader location). Each attribute is read
/// from its own vertex buffer at the same index as its location.
pub const ATTRIBUTE_SLOTS: [(&str, u32); 2] = [
    ("position", 0),
    ("color", 1),
];

const VEC3_STRIDE: BufferAddress = std::mem::size_of::<[f32; 3]>() as BufferAddress;

const PROJECTION_BINDING: u32 = UNIFORM_SLOTS[0].1;
const VIEW_BINDING: u32 = UNIFORM_SLOTS[1].1;
const MODEL_BINDING: u32 = UNIFORM_SLOTS[2].1;
const POSITION_LOCATION: u32 = ATTRIBUTE_SLOTS[0].1;
const COLOR_LOCATION: u32 = ATTRIBUTE_SLOTS[1].1;

/// Static cube geometry on the GPU
pub struct GeometryBuffers {
    pub position_buffer: Buffer,
    pub color_buffer: Buffer,
    pub index_buffer: Buffer,
}

pub fn upload_geometry(device: &Device) -> GeometryBuffers {
    let position_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("cube_positions"),
        contents: bytemuck::cast_slice(&POSITIONS),
        usage: BufferUsages::VERTEX,
    });
    let color_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("cube_colors"),
        contents: bytemuck::cast_slice(&COLORS),
        usage: BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("cube_indices"),
        contents: bytemuck::cast_slice(&INDICES),
        usage: BufferUsages::INDEX,
    });

    GeometryBuffers {
        position_buffer,
        color_buffer,
        index_buffer,
    }
}

/// One uniform buffer per matrix, all in bind group 0
pub struct UniformResources {
    pub projection_buffer: Buffer,
    pub view_buffer: Buffer,
    pub model_buffer: Buffer,
    pub bind_group_layout: BindGroupLayout,
    pub bind_group: BindGroup,
}

pub fn create_uniform_resources(device: &Device) -> UniformResources {
    let matrix_buffer = |label| {
        device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<MatrixUniform>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    };
    let projection_buffer = matrix_buffer("projection_buffer");
    let view_buffer = matrix_buffer("view_buffer");
    let model_buffer = matrix_buffer("model_buffer");

    let layout_entry = |binding| BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::VERTEX,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("matrix_bind_group_layout"),
        entries: &[
            layout_entry(PROJECTION_BINDING),
            layout_entry(VIEW_BINDING),
            layout_entry(MODEL_BINDING),
        ],
    });

    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("matrix_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            BindGroupEntry { binding: PROJECTION_BINDING, resource: projection_buffer.as_entire_binding() },
            BindGroupEntry { binding: VIEW_BINDING, resource: view_buffer.as_entire_binding() },
            BindGroupEntry { binding: MODEL_BINDING, resource: model_buffer.as_entire_binding() },
        ],
    });

    UniformResources { projection_buffer, view_buffer, model_buffer, bind_group_layout, bind_group }
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

/// Compile `shader_src` and link it into the cube pipeline. Any validation
/// error raised while doing so is returned instead of reaching the device's
/// uncaptured error handler.
pub async fn create_cube_pipeline(
    device: &Device,
    format: TextureFormat,
    bind_group_layout: &BindGroupLayout,
    shader_src: &str,
) -> Result<RenderPipeline, CubeError> {
    device.push_error_scope(ErrorFilter::Validation);

    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("cube_shader"),
        source: ShaderSource::Wgsl(shader_src.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("cube_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let position_attr = [VertexAttribute { offset: 0, shader_location: POSITION_LOCATION, format: VertexFormat::Float32x3 }];
    let color_attr = [VertexAttribute { offset: 0, shader_location: COLOR_LOCATION, format: VertexFormat::Float32x3 }];

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("cube_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[
                VertexBufferLayout {
                    array_stride: VEC3_STRIDE,
                    step_mode: VertexStepMode::Vertex,
                    attributes: &position_attr,
                },
                VertexBufferLayout {
                    array_stride: VEC3_STRIDE,
                    step_mode: VertexStepMode::Vertex,
                    attributes: &color_attr,
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: None, write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    });

    if let Some(err) = device.pop_error_scope().await {
        tracing::error!("cube pipeline rejected: {err}");
        return Err(CubeError::Shader(err.to_string()));
    }

    tracing::info!("cube pipeline ready");
    Ok(pipeline)
}

/// Response to a failed surface acquire
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering resumes next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Out of memory; stop rendering.
    Fatal,
}

///////////////////////////////////////////////////////////////////////////////

/// GPU objects owned for the lifetime of the app
pub struct RenderState {
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,

    pub pipeline: RenderPipeline,
    pub geometry: GeometryBuffers,
    pub uniforms: UniformResources,
    pub depth_texture: Texture,
    pub depth_view: TextureView,

    pub overlay_renderer: Option<egui_wgpu::Renderer>,
    overlay_textures: PendingTextures,
}

impl RenderState {
    /// Runs the one-time pipeline setup: geometry upload, shader compile,
    /// uniform and attribute binding.
    pub async fn new(
        device: &Device,
        format: TextureFormat,
        alpha_mode: CompositeAlphaMode,
        width: u32,
        height: u32,
        shader_src: &str,
        with_overlay: bool,
    ) -> Result<Self, CubeError> {
        let geometry = upload_geometry(device);
        let uniforms = create_uniform_resources(device);
        let pipeline = create_cube_pipeline(device, format, &uniforms.bind_group_layout, shader_src).await?;
        let (depth_texture, depth_view) = create_depth_texture(device, width, height);

        let overlay_renderer = with_overlay
            .then(|| egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default()));

        Ok(Self {
            format,
            alpha_mode,
            width,
            height,
            pipeline,
            geometry,
            uniforms,
            depth_texture,
            depth_view,
            overlay_renderer,
            overlay_textures: PendingTextures::default(),
        })
    }

    fn surface_config(&self) -> SurfaceConfiguration {
        SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: PresentMode::Fifo,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    /// Match the surface and depth attachment to a new size. The projection
    /// is left alone.
    pub fn resize(&mut self, device: &Device, surface: &Surface, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        tracing::debug!(width, height, "resizing surface");
        self.width = width;
        self.height = height;
        surface.configure(device, &self.surface_config());

        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
    }

    pub fn handle_surface_error(&self, device: &Device, surface: &Surface, err: SurfaceError) -> SurfaceErrorAction {
        match err {
            SurfaceError::Lost | SurfaceError::Outdated => {
                tracing::warn!("surface {err:?}, reconfiguring");
                surface.configure(device, &self.surface_config());
                SurfaceErrorAction::Reconfigured
            }
            SurfaceError::OutOfMemory => {
                tracing::error!("surface out of memory");
                SurfaceErrorAction::Fatal
            }
            other => {
                tracing::warn!("skipping frame: {other:?}");
                SurfaceErrorAction::SkipFrame
            }
        }
    }

    /// Present one frame: write the matrices, clear, draw the cube and, if
    /// given, the overlay on top.
    pub fn draw_frame(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        frame: &FrameCommands,
        overlay: Option<OverlayFrame>,
    ) -> Result<(), SurfaceError> {
        // Texture deltas survive skipped frames; only the drawing is dropped
        let overlay = overlay.map(|mut overlay| {
            if self.overlay_renderer.is_some() {
                self.overlay_textures.queue(std::mem::take(&mut overlay.textures_delta));
            }
            overlay
        });

        let (vw, vh) = frame.viewport;
        if vw == 0 || vh == 0 {
            return Ok(());
        }
        self.resize(device, surface, vw, vh);

        queue.write_buffer(&self.uniforms.projection_buffer, 0, bytemuck::bytes_of(&frame.projection));
        queue.write_buffer(&self.uniforms.view_buffer, 0, bytemuck::bytes_of(&frame.view));
        queue.write_buffer(&self.uniforms.model_buffer, 0, bytemuck::bytes_of(&frame.model));

        let output = surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let [r, g, b, a] = frame.clear_color;
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("cube_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color { r, g, b, a }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(frame.clear_depth),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_viewport(0.0, 0.0, vw as f32, vh as f32, 0.0, 1.0);
            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.uniforms.bind_group, &[]);
            rp.set_vertex_buffer(POSITION_LOCATION, self.geometry.position_buffer.slice(..));
            rp.set_vertex_buffer(COLOR_LOCATION, self.geometry.color_buffer.slice(..));
            rp.set_index_buffer(self.geometry.index_buffer.slice(..), IndexFormat::Uint16);
            rp.draw_indexed(0..frame.index_count, 0, 0..1);
        }

        let mut overlay_commands = Vec::new();
        if let (Some(renderer), Some(overlay)) = (self.overlay_renderer.as_mut(), overlay) {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [vw, vh],
                pixels_per_point: overlay.pixels_per_point,
            };

            let textures = self.overlay_textures.take();
            for (id, image_delta) in &textures.set {
                renderer.update_texture(device, queue, *id, image_delta);
            }
            overlay_commands = renderer.update_buffers(device, queue, &mut encoder, &overlay.primitives, &screen_descriptor);

            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("overlay_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                renderer.render(&mut egui_pass.forget_lifetime(), &overlay.primitives, &screen_descriptor);
            }

            for id in &textures.free {
                renderer.free_texture(id);
            }
        }

        queue.submit(overlay_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_declares_every_named_slot() {
        for (name, binding) in UNIFORM_SLOTS {
            let decl = format!("@binding({binding}) var<uniform> {name}: mat4x4<f32>");
            assert!(CUBE_SHADER.contains(&decl), "missing `{decl}`");
        }
        for (name, location) in ATTRIBUTE_SLOTS {
            let decl = format!("@location({location}) {name}: vec3<f32>");
            assert!(CUBE_SHADER.contains(&decl), "missing `{decl}`");
        }
    }

    #[test]
    fn shader_applies_matrices_in_order() {
        assert!(CUBE_SHADER.contains(
            "projection_matrix * view_matrix * model_matrix * vec4<f32>(position, 1.0)"
        ));
        assert!(CUBE_SHADER.contains("return vec4<f32>(in.color, 1.0);"));
        assert!(CUBE_SHADER.contains("fn vs_main"));
        assert!(CUBE_SHADER.contains("fn fs_main"));
    }

    #[test]
    fn slot_constants_follow_named_tables() {
        assert_eq!(UNIFORM_SLOTS[0], ("projection_matrix", PROJECTION_BINDING));
        assert_eq!(UNIFORM_SLOTS[1], ("view_matrix", VIEW_BINDING));
        assert_eq!(UNIFORM_SLOTS[2], ("model_matrix", MODEL_BINDING));
        assert_eq!(ATTRIBUTE_SLOTS[0], ("position", POSITION_LOCATION));
        assert_eq!(ATTRIBUTE_SLOTS[1], ("color", COLOR_LOCATION));
        assert_eq!((PROJECTION_BINDING, VIEW_BINDING, MODEL_BINDING), (0, 1, 2));
        assert_eq!((POSITION_LOCATION, COLOR_LOCATION), (0, 1));
    }

    #[test]
    fn geometry_bytes_are_tightly_packed() {
        assert_eq!(VEC3_STRIDE, 12);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&POSITIONS).len(), 24 * 12);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&INDICES).len(), 36 * 2);
    }
}

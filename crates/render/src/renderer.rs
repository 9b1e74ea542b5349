use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use puzzle::{Command, Level};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder};

use crate::input::command_for_key;
use crate::tiles::{self, Vertex};

pub const CLEAR_TITLE: &str = "LEVEL CLEAR!";

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ProjectionUniform {
    matrix: [[f32; 4]; 4],
}

impl ProjectionUniform {
    fn for_size(size: PhysicalSize<u32>) -> Self {
        Self { matrix: tiles::projection(size.width, size.height).to_cols_array_2d() }
    }
}

/// A window showing one Sokoban board.
///
/// Events are pumped on every [`Renderer::draw`] and [`Renderer::poll`], so
/// the caller's loop stays in charge of timing.
pub struct Renderer {
    event_loop: EventLoop<()>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    projection_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
    window: Arc<Window>,
    title: String,
    pending: Vec<Command>,
    closed: bool,
}

impl Renderer {
    /// Opens an 800x600 window titled `title`.
    ///
    /// # Errors
    ///
    /// Fails without a display, without a usable GPU adapter, or when an event
    /// loop already exists in this process.
    pub fn new(title: &str) -> Result<Self> {
        let event_loop = EventLoop::new().context("create event loop")?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(PhysicalSize::new(tiles::WINDOW_WIDTH, tiles::WINDOW_HEIGHT))
                .with_resizable(false)
                .build(&event_loop)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone()).context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to get adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Sokoban Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            },
            None,
        ))
        .context("failed to request device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        // Palette colours are sRGB already; prefer a format that stores them as-is.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Projection Buffer"),
            contents: bytemuck::bytes_of(&ProjectionUniform::for_size(size)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let projection_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("projection_bind_group_layout"),
        });
        let projection_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &projection_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: projection_buffer.as_entire_binding() }],
            label: Some("projection_bind_group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Tile Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Tile Pipeline Layout"),
            bind_group_layouts: &[&projection_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Tile Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState { module: &shader, entry_point: "vs_main", buffers: &[Vertex::layout()] },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState { topology: wgpu::PrimitiveTopology::TriangleList, ..Default::default() },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tiles"),
            size: 0,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        tracing::info!(?format, width = config.width, height = config.height, "window opened");
        Ok(Self {
            event_loop,
            surface,
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            vertex_count: 0,
            projection_buffer,
            projection_bind_group,
            window,
            title: title.to_owned(),
            pending: Vec::new(),
            closed: false,
        })
    }

    /// Processes pending window events and returns the commands they produced.
    pub fn poll(&mut self) -> Vec<Command> {
        self.pump();
        std::mem::take(&mut self.pending)
    }

    fn pump(&mut self) {
        let mut commands = Vec::new();
        let mut resized = None;
        let status = self.event_loop.pump_events(Some(Duration::ZERO), |event, elwt| {
            let Event::WindowEvent { event, .. } = event else {
                return;
            };
            match event {
                WindowEvent::CloseRequested => {
                    commands.push(Command::Quit);
                    elwt.exit();
                }
                WindowEvent::Resized(size) => resized = Some(size),
                WindowEvent::KeyboardInput {
                    event: KeyEvent { physical_key: PhysicalKey::Code(code), state: ElementState::Pressed, .. },
                    ..
                } => commands.extend(command_for_key(code)),
                _ => {}
            }
        });
        if let Some(size) = resized {
            self.resize(size);
        }
        if matches!(status, PumpStatus::Exit(_)) || commands.contains(&Command::Quit) {
            self.closed = true;
        }
        self.pending.extend(commands);
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.queue.write_buffer(&self.projection_buffer, 0, bytemuck::bytes_of(&ProjectionUniform::for_size(size)));
    }

    fn upload(&mut self, vertices: &[Vertex]) {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if self.vertex_buffer.size() < bytes.len() as u64 {
            self.vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("tiles"),
                contents: bytes,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        } else {
            self.queue.write_buffer(&self.vertex_buffer, 0, bytes);
        }
        self.vertex_count = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
    }

    fn set_title(&mut self, won: bool) {
        let title = if won { CLEAR_TITLE } else { self.title.as_str() };
        self.window.set_title(title);
    }

    /// Draws `level` and presents the frame. Does nothing once the window
    /// has been closed; the close shows up as [`Command::Quit`] on the next
    /// [`Renderer::poll`].
    ///
    /// # Errors
    ///
    /// Fails when the surface cannot be acquired.
    pub fn draw(&mut self, level: &Level) -> Result<()> {
        self.pump();
        if self.closed {
            return Ok(());
        }

        let won = level.is_win();
        self.set_title(won);
        let vertices = tiles::build(level, (self.config.width, self.config.height));
        self.upload(&vertices);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.surface.get_current_texture().context("failed to acquire surface texture")?
            }
            Err(err) => return Err(err).context("failed to acquire surface texture"),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("enc") });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(tiles::background(won)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.projection_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.draw(0..self.vertex_count, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

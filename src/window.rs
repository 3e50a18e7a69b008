use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use glyphdust::error::{GfxError, RunError};
use glyphdust::{EffectConfig, RasterSurface, TextEffect};

const WINDOW_TITLE: &str = "glyphdust";
const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const TITLE_INTERVAL: Duration = Duration::from_millis(500);

/// Fullscreen blit of the CPU framebuffer: one oversized triangle, no
/// vertex buffers.
const BLIT_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

@group(0) @binding(0)
var frame_texture: texture_2d<f32>;
@group(0) @binding(1)
var frame_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(frame_texture, frame_sampler, in.uv);
}
"#;

/// GPU presentation: uploads the effect framebuffer each frame and blits it
/// to the swapchain.
pub struct Gfx {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    frame_texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl Gfx {
    pub async fn new(window: Arc<Window>) -> Result<Self, GfxError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Nearest filtering: the frame texture always matches the window
        // pixel for pixel.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let frame_texture = create_frame_texture(&device, config.width, config.height);
        let bind_group = create_bind_group(&device, &bind_group_layout, &frame_texture, &sampler);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_group_layout,
            sampler,
            frame_texture,
            bind_group,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.frame_texture = create_frame_texture(&self.device, width, height);
            self.bind_group = create_bind_group(
                &self.device,
                &self.bind_group_layout,
                &self.frame_texture,
                &self.sampler,
            );
        }
    }

    /// Reconfigure the swapchain at the current size after a lost surface.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload `pixels` (tightly packed RGBA, framebuffer-sized) and present.
    pub fn present(&mut self, pixels: &[u8]) -> Result<(), wgpu::SurfaceError> {
        debug_assert_eq!(
            pixels.len(),
            (self.config.width * self.config.height * 4) as usize
        );

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.config.width),
                rows_per_image: Some(self.config.height),
            },
            wgpu::Extent3d {
                width: self.config.width,
                height: self.config.height,
                depth_or_array_layers: 1,
            },
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_frame_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Frame Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FRAME_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &wgpu::Texture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Frame Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

pub struct App {
    window: Option<Arc<Window>>,
    gfx: Option<Gfx>,
    raster: Option<RasterSurface>,
    effect: Option<TextEffect>,
    text: String,
    font_family: Option<String>,
    frames: u32,
    title_timer: Instant,
    /// Setup failure stashed in `resumed`, where nothing can be returned;
    /// [`run`] surfaces it after the event loop exits.
    error: Option<RunError>,
}

impl App {
    pub fn new(text: String, font_family: Option<String>) -> Self {
        Self {
            window: None,
            gfx: None,
            raster: None,
            effect: None,
            text,
            font_family,
            frames: 0,
            title_timer: Instant::now(),
            error: None,
        }
    }

    fn resubmit(&mut self) {
        if let (Some(raster), Some(effect)) = (&mut self.raster, &mut self.effect) {
            effect.submit_text(raster, &self.text);
        }
    }

    fn handle_key(&mut self, key: &Key) {
        match key {
            // Space edits the buffer without resubmitting; the pending word
            // shows up with the next keystroke.
            Key::Named(NamedKey::Space) => self.text.push(' '),
            Key::Character(s) if s.as_str() == " " => self.text.push(' '),
            Key::Named(NamedKey::Backspace) => {
                self.text.pop();
                self.resubmit();
            }
            Key::Character(s) => {
                self.text.push_str(s.as_str());
                self.resubmit();
            }
            // Every other key resubmits without editing, modifiers included,
            // which also flushes any pending trailing spaces.
            _ => self.resubmit(),
        }
    }

    fn handle_resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Some(gfx) = &mut self.gfx {
            gfx.resize(size.width, size.height);
        }
        if let (Some(raster), Some(effect)) = (&mut self.raster, &mut self.effect) {
            raster.resize(size.width, size.height);
            effect.on_resize(raster, size.width, size.height);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(raster), Some(effect), Some(gfx)) =
            (&mut self.raster, &mut self.effect, &mut self.gfx)
        else {
            return;
        };

        effect.tick(raster);

        match gfx.present(raster.pixels()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => gfx.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
            Err(e) => eprintln!("Render error: {:?}", e),
        }

        self.frames += 1;
        if self.title_timer.elapsed() >= TITLE_INTERVAL {
            let fps = self.frames as f32 / self.title_timer.elapsed().as_secs_f32();
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "{} - {} particles - {:.0} fps",
                    WINDOW_TITLE,
                    effect.field().len(),
                    fps
                ));
            }
            self.frames = 0;
            self.title_timer = Instant::now();
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.error = Some(e.into());
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let size = window.inner_size();
        let mut raster = RasterSurface::new(size.width.max(1), size.height.max(1));
        if let Some(family) = &self.font_family {
            raster.set_font_family(family.clone());
        }

        let mut effect = TextEffect::new(EffectConfig::new(), size.width.max(1), size.height.max(1));
        let text = self.text.clone();
        effect.submit_text(&mut raster, &text);
        self.raster = Some(raster);
        self.effect = Some(effect);

        match pollster::block_on(Gfx::new(window)) {
            Ok(gfx) => self.gfx = Some(gfx),
            Err(e) => {
                self.error = Some(e.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.handle_resize(physical_size);
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(effect) = &mut self.effect {
                    effect.on_pointer_move(position.x as f32, position.y as f32);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    self.handle_key(&event.logical_key);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

/// Open a window and run the effect until the window closes.
///
/// `text` is the initial text; typing edits it live (backspace deletes, any
/// printable key appends). `font_family` optionally names an installed font
/// family to render with.
pub fn run(text: String, font_family: Option<String>) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(text, font_family);
    event_loop.run_app(&mut app)?;
    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An app with a live surface and engine, as if the window were open.
    fn ready_app(text: &str) -> App {
        let mut app = App::new(text.to_string(), None);
        let mut raster = RasterSurface::new(64, 64);
        let mut effect = TextEffect::new(EffectConfig::new().with_seed(1), 64, 64);
        effect.submit_text(&mut raster, text);
        app.raster = Some(raster);
        app.effect = Some(effect);
        app
    }

    fn submitted_text(app: &App) -> &str {
        app.effect.as_ref().unwrap().last_text()
    }

    #[test]
    fn test_space_edits_buffer_without_resubmitting() {
        let mut app = ready_app("HI");
        app.handle_key(&Key::Named(NamedKey::Space));
        assert_eq!(app.text, "HI ");
        assert_eq!(submitted_text(&app), "HI");
    }

    #[test]
    fn test_printable_key_appends_and_resubmits() {
        let mut app = ready_app("HI");
        app.handle_key(&Key::Character("X".into()));
        assert_eq!(app.text, "HIX");
        assert_eq!(submitted_text(&app), "HIX");
    }

    #[test]
    fn test_backspace_deletes_and_resubmits() {
        let mut app = ready_app("HI");
        app.handle_key(&Key::Named(NamedKey::Backspace));
        assert_eq!(app.text, "H");
        assert_eq!(submitted_text(&app), "H");
    }

    #[test]
    fn test_any_other_key_resubmits_without_editing() {
        let mut app = ready_app("HI");
        app.handle_key(&Key::Named(NamedKey::Space));
        assert_eq!(submitted_text(&app), "HI");
        // A modifier-class key flushes the pending space without typing.
        app.handle_key(&Key::Named(NamedKey::Shift));
        assert_eq!(app.text, "HI ");
        assert_eq!(submitted_text(&app), "HI ");
    }
}

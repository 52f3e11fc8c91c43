/// Interactive terminal viewer for the softras rasterizer
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use softras_core::math::{deg_to_rad, Vec2i, Vec3f};
use softras_core::{
    save_tga, Camera, CameraContext, FillMode, FlatShader, FrameBuffer, FrameColor, Model, Rasterizer, RenderStats,
    Shader, Transform, Uniforms,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod config;
pub mod renderer;

pub use config::{ConfigError, Palette, RenderMode, ViewerConfig};
pub use renderer::TerminalPresenter;

const WIREFRAME_COLOR: FrameColor = FrameColor::GREEN;

/// Where the eye starts and returns to on reset; the model is normalized
/// into the unit cube around the origin
fn initial_eye() -> Vec3f {
    Vec3f::new(1.2, 0.9, 2.4)
}

/// Physical aspect of the viewport; terminal cells are about twice as tall
/// as they are wide
fn aspect_ratio(cols: u16, rows: u16) -> f32 {
    cols.max(1) as f32 / (2.0 * rows.max(1) as f32)
}

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    model: Model,
    config: ViewerConfig,
    camera: Camera,
    input: CameraContext,
    shader: FlatShader,
    rasterizer: Rasterizer,
    frame: FrameBuffer,
    presenter: TerminalPresenter,
    stats: RenderStats,
    /// Last render failure; cleared by the next successful frame
    error: Option<String>,
    /// Snapshot feedback shown until replaced
    notice: Option<String>,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Build a viewer sized for a terminal of `cols` x `rows` cells.
    pub fn new(model: Model, config: ViewerConfig, cols: u16, rows: u16) -> Self {
        let presenter = TerminalPresenter::new(config.palette);
        let (width, height) = presenter.frame_size(cols, rows);

        let mut camera = Camera::new(Vec3f::zeros(), initial_eye(), aspect_ratio(cols, rows));
        camera.set_fov_y(deg_to_rad(config.fov_y_degrees));

        let shader = FlatShader::new(Uniforms {
            model: model.model_matrix(),
            light_dir: config.light_dir(),
            ..Uniforms::default()
        });

        let fill = match config.mode {
            RenderMode::Solid => FillMode::Solid,
            RenderMode::Wireframe => FillMode::Wireframe(WIREFRAME_COLOR),
        };

        Self {
            model,
            config,
            camera,
            input: CameraContext::new(width as i32, height as i32),
            shader,
            rasterizer: Rasterizer::new(fill),
            frame: FrameBuffer::new(width, height),
            presenter,
            stats: RenderStats::default(),
            error: None,
            notice: None,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide, EnableMouseCapture)?;
        info!(
            width = self.frame.width(),
            height = self.frame.height(),
            palette = ?self.presenter.palette(),
            "viewer started"
        );

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_secs_f64(1.0 / self.config.target_fps.max(1) as f64);
        let mut stdout = stdout();

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::ZERO)? {
                let event = event::read()?;
                self.handle_event(event);
            }
            if !self.running {
                break;
            }

            self.render_frame();
            self.present(&mut stdout)?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    /// Apply one terminal event to the camera input or the viewer state.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => self.resize(cols, rows),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('r') => {
                self.camera.reset();
                self.input.reset();
                self.notice = None;
            }
            KeyCode::Char('w') => {
                self.rasterizer.fill = match self.rasterizer.fill {
                    FillMode::Solid => FillMode::Wireframe(WIREFRAME_COLOR),
                    FillMode::Wireframe(_) => FillMode::Solid,
                };
                debug!(fill = ?self.rasterizer.fill, "fill mode toggled");
            }
            KeyCode::Char('p') => self.snapshot(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = self.cell_to_pixel(mouse.column, mouse.row);
        let input = &mut self.input;
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                input.is_orbiting = true;
                input.orbit_begin = point;
                input.orbit_end = point;
            }
            MouseEventKind::Drag(MouseButton::Left) => input.orbit_end = point,
            MouseEventKind::Up(MouseButton::Left) => input.is_orbiting = false,
            MouseEventKind::Down(MouseButton::Right | MouseButton::Middle) => {
                input.is_panning = true;
                input.pan_begin = point;
                input.pan_end = point;
            }
            MouseEventKind::Drag(MouseButton::Right | MouseButton::Middle) => input.pan_end = point,
            MouseEventKind::Up(MouseButton::Right | MouseButton::Middle) => input.is_panning = false,
            MouseEventKind::ScrollUp => input.dolly_exp += 1.0,
            MouseEventKind::ScrollDown => input.dolly_exp -= 1.0,
            _ => {}
        }
    }

    /// Cell position in frame buffer pixels, y growing downwards
    fn cell_to_pixel(&self, column: u16, row: u16) -> Vec2i {
        let pixels_per_row = match self.presenter.palette() {
            Palette::TrueColor => 2,
            Palette::Ascii => 1,
        };
        Vec2i::new(column as i32, row as i32 * pixels_per_row)
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let (width, height) = self.presenter.frame_size(cols, rows);
        self.frame = FrameBuffer::new(width, height);
        self.input.width = width as i32;
        self.input.height = height as i32;
        self.camera.set_aspect_ratio(aspect_ratio(cols, rows));
        debug!(width, height, "frame buffer resized");
    }

    fn snapshot(&mut self) {
        let path = &self.config.snapshot_path;
        self.notice = Some(match save_tga(&self.frame, path) {
            Ok(()) => format!("saved {}", path.display()),
            Err(err) => {
                warn!(error = %err, path = %path.display(), "snapshot failed");
                format!("snapshot failed: {err}")
            }
        });
    }

    /// Advance the camera and rasterize into the frame buffer.
    ///
    /// Returns `false` when the frame was rejected; the buffer then still
    /// holds the previous image.
    pub fn render_frame(&mut self) -> bool {
        self.camera.update(&mut self.input);

        let uniforms = self.shader.uniforms_mut();
        uniforms.view = self.camera.view_matrix();
        uniforms.projection = self.camera.projection_matrix();
        uniforms.viewport = Transform::viewport_matrix(self.frame.width() as f32, self.frame.height() as f32);

        match self
            .rasterizer
            .render(std::slice::from_ref(&self.model), &self.shader, &mut self.frame)
        {
            Ok(stats) => {
                self.stats = stats;
                self.error = None;
                true
            }
            Err(err) => {
                warn!(error = %err, "render failed, keeping previous frame");
                self.error = Some(format!("render error: {err}"));
                false
            }
        }
    }

    fn present<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.presenter.draw(&self.frame, out)?;

        // Draw UI overlay
        let color = if self.error.is_some() { Color::Red } else { Color::Yellow };
        queue!(
            out,
            cursor::MoveTo(0, 0),
            SetForegroundColor(color),
            Print(self.status_line()),
            ResetColor
        )?;

        out.flush()
    }

    /// Text of the top overlay row, cut to the frame width
    pub fn status_line(&self) -> String {
        let text = if let Some(error) = &self.error {
            error.clone()
        } else if let Some(notice) = &self.notice {
            notice.clone()
        } else {
            let mode = match self.rasterizer.fill {
                FillMode::Solid => "solid",
                FillMode::Wireframe(_) => "wireframe",
            };
            format!(
                "softras | FPS: {:.1} | {} tris | {} | Drag=Orbit RDrag=Pan Wheel=Dolly R=Reset W=Wire P=Snap Q=Quit",
                self.fps, self.stats.triangles, mode
            )
        };
        text.chars().take(self.frame.width()).collect()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn input(&self) -> &CameraContext {
        &self.input
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn fill(&self) -> FillMode {
        self.rasterizer.fill
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

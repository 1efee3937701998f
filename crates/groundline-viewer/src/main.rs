use anyhow::Result;
use glam::{Mat4, Vec3};
use winit::dpi::LogicalSize;

use groundline_engine::camera::OrbitCamera;
use groundline_engine::coords::ColorRgba;
use groundline_engine::core::{App, AppControl, FrameCtx};
use groundline_engine::device::GpuInit;
use groundline_engine::input::{InputFrame, InputState, Key, MouseButton};
use groundline_engine::logging::{init_logging, LoggingConfig};
use groundline_engine::render::{GridRenderer, LitRenderer, Mesh, TextureImage};
use groundline_engine::shading::{GridStyle, LitUniforms, NormalMode};
use groundline_engine::window::{Runtime, RuntimeConfig};

/// Everything the viewer can be started with.
#[derive(Debug, Clone)]
struct ViewerConfig {
    runtime: RuntimeConfig,
    gpu: GpuInit,
    logging: LoggingConfig,
    clear: ColorRgba,
    grid: GridStyle,
    normal_mode: NormalMode,
    /// The single point light; stays at the world origin.
    light_position: Vec3,
    camera: OrbitCamera,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig {
                title: "groundline viewer".to_string(),
                initial_size: LogicalSize::new(1280.0, 720.0),
            },
            gpu: GpuInit::default(),
            logging: LoggingConfig::default(),
            clear: ColorRgba::new(0.62, 0.64, 0.68, 1.0),
            grid: GridStyle::default(),
            normal_mode: NormalMode::default(),
            light_position: Vec3::ZERO,
            camera: OrbitCamera::default(),
        }
    }
}

/// Interactive state driven by input.
#[derive(Debug, Clone, PartialEq)]
struct ViewState {
    camera: OrbitCamera,
    home: OrbitCamera,
    normal_mode: NormalMode,
    show_grid: bool,
    textured: bool,
}

impl ViewState {
    fn new(camera: OrbitCamera, normal_mode: NormalMode) -> Self {
        Self {
            camera,
            home: camera,
            normal_mode,
            show_grid: true,
            textured: true,
        }
    }

    fn apply_input(&mut self, input: &InputState, frame: &InputFrame) -> AppControl {
        if frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }
        if frame.key_pressed(Key::N) {
            self.normal_mode = self.normal_mode.toggled();
            log::info!("normal mode: {:?}", self.normal_mode);
        }
        if frame.key_pressed(Key::Space) {
            self.textured = !self.textured;
        }
        if frame.key_pressed(Key::G) {
            self.show_grid = !self.show_grid;
        }
        if frame.key_pressed(Key::R) {
            self.camera = self.home;
        }

        if input.button_down(MouseButton::Left) {
            let (dx, dy) = frame.pointer_delta;
            self.camera.orbit(dx, dy);
        }
        if frame.wheel_lines != 0.0 {
            self.camera.dolly(frame.wheel_lines);
        }

        AppControl::Continue
    }
}

/// Placement of one cube; `spin` is radians per second around +Y.
struct Placement {
    position: Vec3,
    spin: f32,
}

const PLACEMENTS: [Placement; 3] = [
    Placement { position: Vec3::new(1.5, 0.5, 0.0), spin: 0.0 },
    Placement { position: Vec3::new(-1.5, 0.5, -1.5), spin: 0.4 },
    Placement { position: Vec3::new(0.0, 1.25, -4.0), spin: -0.25 },
];

struct Viewer {
    config: ViewerConfig,
    state: ViewState,
    grid: GridRenderer,
    lit: LitRenderer,
    objects: Vec<LitUniforms>,
    textured: bool,
}

fn checker() -> TextureImage {
    TextureImage::checkerboard(256, 8, [235, 235, 235, 255], [70, 90, 120, 255])
}

impl Viewer {
    fn new(config: ViewerConfig) -> Self {
        let mesh = Mesh::cube(1.0, [1.0, 0.85, 0.7, 1.0]);
        Self {
            state: ViewState::new(config.camera, config.normal_mode),
            grid: GridRenderer::new(),
            lit: LitRenderer::new(mesh, checker()),
            objects: Vec::with_capacity(PLACEMENTS.len()),
            textured: true,
            config,
        }
    }

    fn update_objects(&mut self, elapsed: f32) {
        self.objects.clear();
        self.objects.extend(PLACEMENTS.iter().map(|p| LitUniforms {
            model: Mat4::from_translation(p.position) * Mat4::from_rotation_y(p.spin * elapsed),
            light_position: self.config.light_position,
            normal_mode: self.state.normal_mode,
        }));
    }
}

impl App for Viewer {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.state.apply_input(ctx.input, ctx.input_frame) == AppControl::Exit {
            return AppControl::Exit;
        }
        if self.state.textured != self.textured {
            self.textured = self.state.textured;
            let texture = if self.textured { checker() } else { TextureImage::white() };
            self.lit.set_texture(texture);
        }
        self.update_objects(ctx.time.elapsed);

        let frame = self.state.camera.camera().uniforms(ctx.viewport());
        let show_grid = self.state.show_grid;
        let Viewer { config, grid, lit, objects, .. } = &mut *self;

        ctx.render(config.clear, |rctx, target| {
            lit.render(rctx, target, &frame, objects.as_slice());
            if show_grid {
                grid.render(rctx, target, &frame, &config.grid);
            }
        })
    }
}

fn main() -> Result<()> {
    let config = ViewerConfig::default();
    init_logging(config.logging.clone());
    log::info!("drag to orbit, wheel to zoom, N normals, Space texture, G grid, R reset, Esc quit");

    let runtime = config.runtime.clone();
    let gpu = config.gpu.clone();
    Runtime::run(runtime, gpu, Viewer::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundline_engine::input::{ButtonState, InputEvent};

    fn feed(state: &mut ViewState, events: &[InputEvent]) -> AppControl {
        let mut input = InputState::default();
        let mut frame = InputFrame::default();
        for ev in events {
            input.apply_event(&mut frame, ev.clone());
        }
        state.apply_input(&input, &frame)
    }

    fn press(key: Key) -> InputEvent {
        InputEvent::Key { key, state: ButtonState::Pressed, repeat: false }
    }

    #[test]
    fn n_toggles_normal_mode() {
        let mut state = ViewState::new(OrbitCamera::default(), NormalMode::ScreenDerivative);
        feed(&mut state, &[press(Key::N)]);
        assert_eq!(state.normal_mode, NormalMode::Vertex);
    }

    #[test]
    fn space_and_g_toggle_texture_and_grid() {
        let mut state = ViewState::new(OrbitCamera::default(), NormalMode::default());
        feed(&mut state, &[press(Key::Space), press(Key::G)]);
        assert!(!state.textured);
        assert!(!state.show_grid);
    }

    #[test]
    fn escape_exits() {
        let mut state = ViewState::new(OrbitCamera::default(), NormalMode::default());
        assert_eq!(feed(&mut state, &[press(Key::Escape)]), AppControl::Exit);
    }

    #[test]
    fn drag_orbits_only_while_held() {
        let home = OrbitCamera::default();
        let mut state = ViewState::new(home, NormalMode::default());
        let moves = [
            InputEvent::PointerMoved { x: 100.0, y: 100.0 },
            InputEvent::PointerMoved { x: 160.0, y: 100.0 },
        ];
        feed(&mut state, &moves);
        assert_eq!(state.camera, home);

        let mut drag = vec![InputEvent::PointerButton {
            button: MouseButton::Left,
            state: ButtonState::Pressed,
        }];
        drag.extend_from_slice(&moves);
        feed(&mut state, &drag);
        assert_ne!(state.camera.yaw, home.yaw);
    }

    #[test]
    fn wheel_dollies_and_reset_restores_home() {
        let home = OrbitCamera::default();
        let mut state = ViewState::new(home, NormalMode::default());
        feed(&mut state, &[InputEvent::Wheel { lines: 2.0 }]);
        assert!(state.camera.distance < home.distance);

        feed(&mut state, &[press(Key::R)]);
        assert_eq!(state.camera, home);
    }

    #[test]
    fn objects_follow_config() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.state.normal_mode = NormalMode::Vertex;
        viewer.update_objects(1.0);
        assert_eq!(viewer.objects.len(), PLACEMENTS.len());
        assert!(viewer.objects.iter().all(|o| o.normal_mode == NormalMode::Vertex));
        assert_eq!(viewer.objects[0].model.w_axis.truncate(), PLACEMENTS[0].position);
        assert!(viewer.objects.iter().all(|o| o.light_position == Vec3::ZERO));
    }
}

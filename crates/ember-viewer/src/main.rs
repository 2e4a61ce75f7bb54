mod args;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use ember_engine::config::EngineConfig;
use ember_engine::core::{App, AppContext, AppControl, FrameCtx};
use ember_engine::device::Gpu;
use ember_engine::gfx::{TextureImage, WgpuBackend};
use ember_engine::logging::{init_logging, LoggingConfig};
use ember_engine::paint::{pack_rgba32, OPAQUE_WHITE};
use ember_engine::render::Renderer;
use ember_engine::scene::{QuadScene, Scene, TriangleScene};
use ember_engine::shader::ShaderLoader;
use ember_engine::time::{MonotonicClock, ONE_SECOND_NS};
use ember_engine::window::Runtime;

use args::{SceneKind, ViewerArgs};

struct Viewer {
    config: EngineConfig,
    scene: SceneKind,
    texture: PathBuf,
    clock: MonotonicClock,

    /// Built on the first frame, once the device exists.
    context: Option<AppContext<WgpuBackend>>,

    fps_window_start_ns: i64,
    fps_window_frames: i64,
}

impl Viewer {
    fn new(config: EngineConfig, scene: SceneKind, texture: PathBuf) -> Self {
        Self {
            config,
            scene,
            texture,
            clock: MonotonicClock::new(),
            context: None,
            fps_window_start_ns: 0,
            fps_window_frames: 0,
        }
    }
}

/// Reads the texture at `path`, falling back to a checkerboard when it cannot be decoded.
fn load_texture(path: &Path) -> TextureImage {
    match TextureImage::from_file(path) {
        Ok(image) => image,
        Err(e) => {
            log::error!("{:#}; using a checkerboard instead", anyhow::Error::new(e));
            TextureImage::checkerboard(64, 8, OPAQUE_WHITE, pack_rgba32(96, 96, 96, 255))
        }
    }
}

fn build_context(config: &EngineConfig, kind: SceneKind, texture: &Path, gpu: &Gpu<'_>) -> AppContext<WgpuBackend> {
    let mut backend = WgpuBackend::new(gpu.device().clone(), gpu.queue().clone(), gpu.surface_format());
    let program = ShaderLoader::default_program(&mut backend);

    let mut renderer = Renderer::new(backend, program);
    if let Err(e) = renderer.set_texture(0, &load_texture(texture)) {
        log::error!("demo texture unavailable: {e}");
    }
    if !renderer.error_message().is_empty() {
        log::error!("renderer starts in error state: {}", renderer.error_message());
    }

    let scene: Box<dyn Scene> = match kind {
        SceneKind::Quad => Box::new(QuadScene::new()),
        SceneKind::Triangle => Box::new(TriangleScene::new()),
    };

    AppContext::new(config.clone(), scene, renderer)
}

impl App for Viewer {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let (config, scene, texture) = (&self.config, self.scene, self.texture.as_path());
        let app = self
            .context
            .get_or_insert_with(|| build_context(config, scene, texture, ctx.gpu));

        app.renderer_mut()
            .backend_mut()
            .set_target_format(ctx.gpu.surface_format());

        let report = app.tick(&self.clock);

        self.fps_window_frames += 1;
        let now = app.timer().total_time_ns();
        if now - self.fps_window_start_ns >= ONE_SECOND_NS {
            let fps = self.fps_window_frames * ONE_SECOND_NS / (now - self.fps_window_start_ns);
            ctx.runtime.set_title(format!("{} - {fps} fps", self.config.title));
            log::debug!("frame {}: {fps} fps, slept {} ns", report.frame, report.pace.slept_ns);
            self.fps_window_start_ns = now;
            self.fps_window_frames = 0;
        }

        let clear = app.config().clear_color;
        ctx.render(clear, |target| {
            app.renderer_mut()
                .backend_mut()
                .encode_pending(target.encoder, target.color_view);
        })
    }
}

fn main() -> Result<()> {
    let args = ViewerArgs::parse();

    let mut logging = LoggingConfig::default();
    if let Some(filter) = &args.log {
        logging = logging.with_filter(filter.clone());
    }
    init_logging(logging);

    let mut config = EngineConfig::default().with_title("ember");
    if let Some(vsync) = args.vsync_mode() {
        config = config.with_vsync(vsync);
    }
    if let Some(fps) = args.fps {
        config = config.with_fps_max(fps);
    }
    log::info!("starting {:?} scene, vsync {:?}, cap {} fps", args.scene, config.vsync, config.fps_max);

    Runtime::run(&config, Viewer::new(config.clone(), args.scene, args.texture))
}

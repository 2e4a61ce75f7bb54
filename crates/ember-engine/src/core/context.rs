use crate::config::EngineConfig;
use crate::gfx::GpuBackend;
use crate::render::{FrameUniforms, Renderer, RendererError};
use crate::scene::Scene;
use crate::time::{FramePacer, FrameTimer, PaceReport, TimeSource};

/// Outcome of one [`AppContext::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub frame: i64,
    pub pace: PaceReport,
    /// The scene's mesh was (re)submitted this tick.
    pub uploaded: bool,
    pub result: Result<(), RendererError>,
}

/// Everything one frame loop needs: settings, timing, the scene and the
/// renderer. Owned by whoever drives the loop and passed to [`tick`](Self::tick).
pub struct AppContext<B: GpuBackend> {
    config: EngineConfig,
    timer: FrameTimer,
    pacer: FramePacer,
    scene: Box<dyn Scene>,
    renderer: Renderer<B>,

    /// Last renderer error that was logged, so a stuck error is reported once.
    reported: Option<RendererError>,
}

impl<B: GpuBackend> AppContext<B> {
    /// The fps cap reaches the timer only when vsync is off.
    pub fn new(config: EngineConfig, scene: Box<dyn Scene>, renderer: Renderer<B>) -> Self {
        let pacer = FramePacer::new(config.vsync);
        let mut timer = FrameTimer::new();
        if pacer.throttling_enabled() {
            timer.set_fps_cap(config.fps_max);
        }
        log::debug!(
            "frame loop: vsync {:?}, cap {} fps",
            config.vsync,
            timer.fps_cap()
        );

        Self {
            config,
            timer,
            pacer,
            scene,
            renderer,
            reported: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    #[inline]
    pub fn renderer(&self) -> &Renderer<B> {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut Renderer<B> {
        &mut self.renderer
    }

    pub fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }

    /// Runs one frame: pace, advance the scene, upload its mesh if it changed,
    /// draw.
    ///
    /// Upload failures are recorded by the renderer and surface through the
    /// draw result.
    pub fn tick<S>(&mut self, source: &S) -> TickReport
    where
        S: TimeSource + ?Sized,
    {
        let pace = self.pacer.begin_frame(&mut self.timer, source);
        self.scene.update(&self.timer);

        let mut uploaded = false;
        if self.scene.take_dirty() {
            match self.scene.meshes().first() {
                Some(mesh) => {
                    uploaded = true;
                    // Recorded in the sticky slot; render() reports it below.
                    let _ = self.renderer.submit_mesh(mesh);
                }
                None => log::warn!("scene reported a change but has no mesh"),
            }
        }

        let uniforms = FrameUniforms::new(self.timer.total_seconds())
            .with_transform(self.scene.local_transform());
        let result = self.renderer.render(&uniforms);

        match &result {
            Ok(()) => self.reported = None,
            Err(e) if self.reported.as_ref() != Some(e) => {
                log::warn!("frame {}: nothing drawn: {e}", self.timer.frame_count());
                self.reported = Some(e.clone());
            }
            Err(_) => {}
        }

        TickReport {
            frame: self.timer.frame_count(),
            pace,
            uploaded,
            result,
        }
    }
}

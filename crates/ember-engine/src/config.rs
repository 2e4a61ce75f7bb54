//! Engine configuration.

use crate::paint::Color;

/// Swap-chain synchronization preference.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum VsyncMode {
    /// Present immediately; the frame cap is enforced by sleeping.
    #[default]
    Off,
    /// Present on vertical blank; no manual throttling.
    On,
    /// Vsync that tears instead of waiting when a frame is late; no manual
    /// throttling.
    Adaptive,
}

impl VsyncMode {
    /// Preferred wgpu present modes, best first.
    pub fn present_modes(self) -> &'static [wgpu::PresentMode] {
        match self {
            VsyncMode::Off => &[
                wgpu::PresentMode::Immediate,
                wgpu::PresentMode::Mailbox,
                wgpu::PresentMode::Fifo,
            ],
            VsyncMode::On => &[wgpu::PresentMode::Fifo],
            VsyncMode::Adaptive => &[wgpu::PresentMode::FifoRelaxed, wgpu::PresentMode::Fifo],
        }
    }
}

/// Top-level engine settings.
///
/// Plain data with defaults; higher layers override fields through the
/// `with_*` setters before handing it to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub title: String,

    /// Frame-rate cap. `<= 0` disables it.
    pub fps_max: i64,

    pub vsync: VsyncMode,

    pub clear_color: Color,

    /// Initial window size in logical pixels.
    pub resolution: (u32, u32),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "ember".to_string(),
            fps_max: 400,
            vsync: VsyncMode::Off,
            clear_color: Color::new(32.0 / 255.0, 32.0 / 255.0, 32.0 / 255.0, 1.0),
            resolution: (1280, 720),
        }
    }
}

impl EngineConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_fps_max(mut self, fps_max: i64) -> Self {
        self.fps_max = fps_max;
        self
    }

    pub fn with_vsync(mut self, vsync: VsyncMode) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_clear_color(mut self, clear_color: Color) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = (width, height);
        self
    }
}

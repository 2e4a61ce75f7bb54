use clap::{Parser, ValueEnum};

use ember_engine::VsyncMode;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum)]
pub enum SceneKind {
    /// Textured quad.
    #[default]
    Quad,
    /// Sliding, spinning RGB triangle.
    Triangle,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum CliVsync {
    Off,
    On,
    Adaptive,
}

impl From<CliVsync> for VsyncMode {
    fn from(v: CliVsync) -> Self {
        match v {
            CliVsync::Off => VsyncMode::Off,
            CliVsync::On => VsyncMode::On,
            CliVsync::Adaptive => VsyncMode::Adaptive,
        }
    }
}

/// Ember mesh viewer.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ember-viewer", version)]
pub struct ViewerArgs {
    /// Scene to render.
    #[arg(value_enum, default_value_t = SceneKind::Quad)]
    pub scene: SceneKind,

    /// Presentation sync mode.
    #[arg(long, value_enum)]
    pub vsync: Option<CliVsync>,

    /// Frame rate cap (0 or less disables it); only used with vsync off.
    #[arg(long, allow_negative_numbers = true)]
    pub fps: Option<i64>,

    /// Log filter in `env_logger` syntax; overrides `RUST_LOG`.
    #[arg(long)]
    pub log: Option<String>,

    /// RGBA texture bound to unit 0; the checkerboard is used when it cannot be read.
    #[arg(long, default_value = "resources/textures/crate.png")]
    pub texture: std::path::PathBuf,
}

impl ViewerArgs {
    pub fn vsync_mode(&self) -> Option<VsyncMode> {
        self.vsync.map(VsyncMode::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ViewerArgs, clap::Error> {
        ViewerArgs::try_parse_from(std::iter::once("ember-viewer").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_quad() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.scene, SceneKind::Quad);
        assert_eq!(args.vsync_mode(), None);
        assert_eq!(args.fps, None);
    }

    #[test]
    fn scene_and_flags() {
        let args = parse(&["triangle", "--vsync", "adaptive", "--fps", "144"]).unwrap();
        assert_eq!(args.scene, SceneKind::Triangle);
        assert_eq!(args.vsync_mode(), Some(VsyncMode::Adaptive));
        assert_eq!(args.fps, Some(144));
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(parse(&["--fps"]).is_err());
        assert!(parse(&["--fps", "fast"]).is_err());
        assert!(parse(&["--vsync", "sometimes"]).is_err());
        assert!(parse(&["cube"]).is_err());
    }

    #[test]
    fn texture_and_log_overrides() {
        let args = parse(&["--texture", "/tmp/other.png", "--log", "ember_engine=debug"]).unwrap();
        assert_eq!(args.texture, std::path::PathBuf::from("/tmp/other.png"));
        assert_eq!(args.log.as_deref(), Some("ember_engine=debug"));
    }
}

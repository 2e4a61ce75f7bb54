use std::path::{Path, PathBuf};

use glam::Mat4;
use thiserror::Error;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// The handle no backend ever hands out.
            pub const INVALID: $name = $name(0);

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

gpu_handle!(
    /// GPU buffer object.
    BufferId
);
gpu_handle!(
    /// Vertex layout object: attribute bindings plus the bound index buffer.
    LayoutId
);
gpu_handle!(
    /// Linked shader program.
    ProgramId
);
gpu_handle!(
    /// Sampled 2D texture.
    TextureId
);

/// What a buffer upload is used for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// Per-attribute element format.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttributeFormat {
    Float32x2,
    Float32x3,
    Float32x4,
    /// Unnormalized integer; the shader sees the raw `u32`.
    Uint32,
}

impl AttributeFormat {
    pub const fn size(self) -> u64 {
        match self {
            AttributeFormat::Float32x2 => 8,
            AttributeFormat::Float32x3 => 12,
            AttributeFormat::Float32x4 => 16,
            AttributeFormat::Uint32 => 4,
        }
    }
}

/// Where one vertex attribute reads from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub buffer: BufferId,
    pub format: AttributeFormat,
    pub offset: u64,
    pub stride: u64,
}

/// Program-relative uniform slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub(crate) u32);

impl UniformLocation {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Values that can be written to a uniform slot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    F32(f32),
    Mat4(Mat4),
}

impl UniformValue {
    /// Column-major bytes as laid out in a uniform buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            UniformValue::F32(v) => bytemuck::bytes_of(v).to_vec(),
            UniformValue::Mat4(m) => bytemuck::bytes_of(m).to_vec(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TextureLoadError {
    #[error("failed to load texture {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Tightly packed RGBA8 pixels (little-endian RGBA, row-major, top row first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Builds an image from packed RGBA32 texels.
    pub fn from_rgba32(width: u32, height: u32, texels: &[u32]) -> Self {
        let pixels = texels.iter().flat_map(|t| t.to_le_bytes()).collect();
        Self { width, height, pixels }
    }

    /// Decodes an image file and converts it to RGBA8.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TextureLoadError> {
        let path = path.as_ref();
        let rgba = image::open(path)
            .map_err(|source| TextureLoadError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        let (width, height) = rgba.dimensions();
        log::debug!("loaded texture {} ({width}x{height})", path.display());
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Square checkerboard of `cells × cells` tiles alternating `a` and `b`.
    pub fn checkerboard(size: u32, cells: u32, a: u32, b: u32) -> Self {
        let cell = (size / cells.max(1)).max(1);
        let texels: Vec<u32> = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b }
            })
            .collect();
        Self::from_rgba32(size, size, &texels)
    }

    /// True when the pixel buffer matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() as u64 == self.width as u64 * self.height as u64 * 4
    }
}

/// Number of texture units a draw can bind.
pub const TEXTURE_UNITS: usize = 2;

/// One indexed triangle-list draw of the layout's index buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub program: ProgramId,
    pub layout: LayoutId,
    pub textures: [Option<TextureId>; TEXTURE_UNITS],
    pub index_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_handle_is_invalid() {
        assert!(!ProgramId::INVALID.is_valid());
        assert!(BufferId(7).is_valid());
        assert_eq!(LayoutId::default(), LayoutId::INVALID);
    }

    #[test]
    fn uniform_bytes_are_column_major() {
        let m = Mat4::from_cols_array(&[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
        ]);
        let bytes = UniformValue::Mat4(m).to_bytes();
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[4..8], &2.0f32.to_ne_bytes());
        assert_eq!(UniformValue::F32(1.0).to_bytes().len(), 4);
    }

    #[test]
    fn checkerboard_alternates() {
        let img = TextureImage::checkerboard(4, 2, 0xFFFF_FFFF, 0xFF00_0000);
        assert!(img.is_well_formed());
        assert_eq!(&img.pixels[0..4], &[255, 255, 255, 255]);
        // Third texel of the first row belongs to the second cell.
        assert_eq!(&img.pixels[8..12], &[0, 0, 0, 255]);
        // First texel of the third row starts the second row of cells.
        assert_eq!(&img.pixels[32..36], &[0, 0, 0, 255]);
    }

    #[test]
    fn malformed_image_is_detected() {
        let img = TextureImage {
            width: 2,
            height: 2,
            pixels: vec![0; 15],
        };
        assert!(!img.is_well_formed());
    }

    // ── file loading ──────────────────────────────────────────────────────

    #[test]
    fn png_file_loads_as_rgba8() {
        let path = std::env::temp_dir().join(format!("ember-{}-texture.png", std::process::id()));
        let src = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 128]).unwrap();
        src.save(&path).unwrap();

        let img = TextureImage::from_file(&path).unwrap();
        assert_eq!((img.width, img.height), (2, 1));
        assert!(img.is_well_formed());
        assert_eq!(img.pixels, vec![255, 0, 0, 255, 0, 0, 255, 128]);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_texture_file_names_the_path() {
        let err = TextureImage::from_file("/nonexistent/ember/crate.png").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ember/crate.png"));
        assert!(matches!(err, TextureLoadError::Image { .. }));
    }
}

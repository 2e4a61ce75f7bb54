use std::fmt;

use crate::gfx::{BufferId, GpuBackend, LayoutId, TextureId};

/// Backend handle that a [`GpuResource`] can own.
pub trait GpuHandle: Copy + fmt::Debug {
    const KIND: &'static str;

    fn is_valid(self) -> bool;
    fn release_with<B: GpuBackend + ?Sized>(self, backend: &mut B);
}

impl GpuHandle for BufferId {
    const KIND: &'static str = "buffer";

    fn is_valid(self) -> bool {
        BufferId::is_valid(self)
    }

    fn release_with<B: GpuBackend + ?Sized>(self, backend: &mut B) {
        backend.delete_buffer(self);
    }
}

impl GpuHandle for LayoutId {
    const KIND: &'static str = "vertex layout";

    fn is_valid(self) -> bool {
        LayoutId::is_valid(self)
    }

    fn release_with<B: GpuBackend + ?Sized>(self, backend: &mut B) {
        backend.delete_vertex_layout(self);
    }
}

impl GpuHandle for TextureId {
    const KIND: &'static str = "texture";

    fn is_valid(self) -> bool {
        TextureId::is_valid(self)
    }

    fn release_with<B: GpuBackend + ?Sized>(self, backend: &mut B) {
        backend.delete_texture(self);
    }
}

/// Exclusive owner of one backend handle.
///
/// Move-only. The handle is given back to the backend by [`release`](Self::release)
/// at most once; an invalid handle is never stored. The wrapper does not hold the
/// backend, so the owner must release before dropping. Dropping a still-held
/// handle leaks it and logs a warning.
pub struct GpuResource<H: GpuHandle> {
    handle: Option<H>,
}

impl<H: GpuHandle> GpuResource<H> {
    #[inline]
    pub fn new(handle: H) -> Self {
        Self {
            handle: handle.is_valid().then_some(handle),
        }
    }

    #[inline]
    pub fn empty() -> Self {
        Self { handle: None }
    }

    #[inline]
    pub fn get(&self) -> Option<H> {
        self.handle
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.handle.is_some()
    }

    pub fn release<B: GpuBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(handle) = self.handle.take() {
            log::debug!("releasing {} {handle:?}", H::KIND);
            handle.release_with(backend);
        }
    }

    /// Releases the current handle (if any) and takes ownership of `handle`.
    pub fn replace<B: GpuBackend + ?Sized>(&mut self, handle: H, backend: &mut B) {
        self.release(backend);
        self.handle = handle.is_valid().then_some(handle);
    }
}

impl<H: GpuHandle> Default for GpuResource<H> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<H: GpuHandle> fmt::Debug for GpuResource<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle {
            Some(h) => write!(f, "GpuResource({h:?})"),
            None => f.write_str("GpuResource(empty)"),
        }
    }
}

impl<H: GpuHandle> Drop for GpuResource<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle {
            log::warn!("{} {handle:?} dropped without release", H::KIND);
        }
    }
}

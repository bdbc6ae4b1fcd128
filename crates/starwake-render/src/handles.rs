//! Opaque resource handles.

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);
    };
}

handle!(
    /// A shared mesh shape (a sphere of some radius).
    GeometryHandle
);
handle!(
    /// A shared surface (a color).
    MaterialHandle
);
handle!(
    /// One scene object combining a geometry and a material.
    DrawableHandle
);
handle!(
    /// An instanced sprite batch.
    BatchHandle
);

/// Hands out unique handle ids. Ids are never reused.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    pub fn geometry(&mut self) -> GeometryHandle {
        GeometryHandle(self.next_id())
    }

    pub fn material(&mut self) -> MaterialHandle {
        MaterialHandle(self.next_id())
    }

    pub fn drawable(&mut self) -> DrawableHandle {
        DrawableHandle(self.next_id())
    }

    pub fn batch(&mut self) -> BatchHandle {
        BatchHandle(self.next_id())
    }
}

use bytemuck::{Pod, Zeroable};

use super::{Drawable, MeshKind};

/// Per-instance data for a GPU instance buffer.
/// 16 x 4 bytes = 64 bytes stride; layout must match the vertex shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// World-space centre
    pub position: [f32; 3],
    /// Index into the host's mesh table (`MeshKind as u32`)
    pub mesh: u32,
    /// Orientation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
    /// Per-axis scale
    pub scale: [f32; 3],
    /// 0.0 = invisible, 1.0 = opaque
    pub opacity: f32,
    /// Linear RGBA
    pub color: [f32; 4],
}

impl RenderInstance {
    pub const FLOATS: usize = 16;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn from_drawable(drawable: &Drawable) -> Self {
        let t = &drawable.transform;
        Self {
            position: t.position.to_array(),
            mesh: drawable.mesh as u32,
            rotation: t.rotation.to_array(),
            scale: t.scale.to_array(),
            opacity: t.opacity,
            color: drawable.color,
        }
    }

    pub fn mesh_kind(&self) -> Option<MeshKind> {
        MeshKind::from_index(self.mesh)
    }
}

/// Visible instances for one frame, ready to upload
#[derive(Debug, Clone, Default)]
pub struct InstanceBuffer {
    pub instances: Vec<RenderInstance>,
}

impl InstanceBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(64),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Refill from drawables, skipping hidden ones
    pub fn fill<'a>(&mut self, drawables: impl IntoIterator<Item = &'a Drawable>) {
        self.clear();
        self.instances.extend(
            drawables
                .into_iter()
                .filter(|d| d.transform.visible && d.transform.opacity > 0.0)
                .map(RenderInstance::from_drawable),
        );
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw bytes for `queue.write_buffer`-style uploads
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Transform;
    use glam::Vec3;

    #[test]
    fn test_stride_matches_layout() {
        assert_eq!(std::mem::size_of::<RenderInstance>(), RenderInstance::STRIDE_BYTES);
    }

    #[test]
    fn test_hidden_drawables_skipped() {
        let shown = Drawable {
            mesh: MeshKind::Ball,
            transform: Transform::at(Vec3::new(1.0, 2.0, 3.0)),
            color: [1.0; 4],
        };
        let mut hidden = shown.clone();
        hidden.transform.visible = false;
        let mut faded = shown.clone();
        faded.transform.opacity = 0.0;

        let mut buffer = InstanceBuffer::new();
        buffer.fill([&shown, &hidden, &faded]);
        assert_eq!(buffer.instance_count(), 1);
        assert_eq!(buffer.instances[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(buffer.instances[0].mesh_kind(), Some(MeshKind::Ball));
        assert_eq!(buffer.as_bytes().len(), RenderInstance::STRIDE_BYTES);
    }
}

//! Host scene graph.
//!
//! A flat list of nodes addressed by [`NodeId`]. The water surface is one of
//! them; its handle is captured when it is added, so the reflection pass can
//! toggle it without searching the graph.

use glam::{Mat4, Vec3};

/// Vertex of an opaque scene mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Triangle mesh data for an opaque node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<SceneVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Axis-aligned box centred on the origin.
    #[must_use]
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        // (normal, tangent u, tangent v) per face
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = MeshData::default();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (normal + u * su + v * sv) * h;
                mesh.vertices.push(SceneVertex {
                    position: p.to_array(),
                    normal: normal.to_array(),
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Capped cylinder along +Y with its base on the origin.
    #[must_use]
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut mesh = MeshData::default();
        let step = std::f32::consts::TAU / segments as f32;

        for i in 0..=segments {
            let a = i as f32 * step;
            let n = Vec3::new(a.cos(), 0.0, a.sin());
            for y in [0.0, height] {
                mesh.vertices.push(SceneVertex {
                    position: (n * radius + Vec3::Y * y).to_array(),
                    normal: n.to_array(),
                });
            }
        }
        for i in 0..segments {
            let b = i * 2;
            mesh.indices
                .extend_from_slice(&[b, b + 1, b + 3, b, b + 3, b + 2]);
        }

        for (y, normal) in [(0.0, Vec3::NEG_Y), (height, Vec3::Y)] {
            let center = mesh.vertices.len() as u32;
            mesh.vertices.push(SceneVertex {
                position: [0.0, y, 0.0],
                normal: normal.to_array(),
            });
            for i in 0..=segments {
                let a = i as f32 * step;
                mesh.vertices.push(SceneVertex {
                    position: [a.cos() * radius, y, a.sin() * radius],
                    normal: normal.to_array(),
                });
            }
            for i in 0..segments {
                mesh.indices
                    .extend_from_slice(&[center, center + 1 + i, center + 2 + i]);
            }
        }
        mesh
    }
}

/// Handle to a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Opaque lit mesh with a flat colour.
    Mesh { mesh: MeshData, color: Vec3 },
    /// The water surface.
    Water,
}

/// One entry in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Mat4,
    pub visible: bool,
}

/// The host scene.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    water: Option<NodeId>,
    /// Clear colour of both passes.
    pub background: Vec3,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with the default pale-blue background.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            water: None,
            background: Vec3::new(0xbb as f32, 0xcc as f32, 0xff as f32) / 255.0,
        }
    }

    /// Adds an opaque mesh node.
    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        mesh: MeshData,
        color: Vec3,
        transform: Mat4,
    ) -> NodeId {
        self.push(SceneNode {
            name: name.into(),
            kind: NodeKind::Mesh { mesh, color },
            transform,
            visible: true,
        })
    }

    /// Adds the water surface and records its handle.
    ///
    /// A scene has at most one water surface; adding another replaces the handle.
    pub fn add_water(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.push(SceneNode {
            name: name.into(),
            kind: NodeKind::Water,
            transform: Mat4::IDENTITY,
            visible: true,
        });
        if self.water.replace(id).is_some() {
            log::warn!("scene already had a water surface; using the newest one");
        }
        id
    }

    fn push(&mut self, node: SceneNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Handle of the water surface, if one was added.
    #[must_use]
    pub fn water(&self) -> Option<NodeId> {
        self.water
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    /// Iterates all nodes with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sets a node's world transform. Unknown handles are ignored.
    pub fn set_transform(&mut self, id: NodeId, transform: Mat4) {
        if let Some(node) = self.node_mut(id) {
            node.transform = transform;
        }
    }

    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.visible)
    }

    /// Runs `f` with node `id` hidden, then restores its previous visibility.
    pub fn with_hidden<R>(&mut self, id: NodeId, f: impl FnOnce(&Scene) -> R) -> R {
        let Some(previous) = self.node(id).map(|n| n.visible) else {
            return f(self);
        };
        if let Some(node) = self.node_mut(id) {
            node.visible = false;
        }
        let result = f(self);
        if let Some(node) = self.node_mut(id) {
            node.visible = previous;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_water() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let hull = scene.add_mesh(
            "hull",
            MeshData::cuboid(Vec3::ONE),
            Vec3::ONE,
            Mat4::IDENTITY,
        );
        let water = scene.add_water("water");
        (scene, hull, water)
    }

    #[test]
    fn test_water_handle_is_captured() {
        let (scene, _, water) = scene_with_water();
        assert_eq!(scene.water(), Some(water));
        assert_eq!(scene.node(water).unwrap().kind, NodeKind::Water);
    }

    #[test]
    fn test_with_hidden_brackets_visibility() {
        let (mut scene, hull, water) = scene_with_water();
        let seen = scene.with_hidden(water, |s| (s.is_visible(water), s.is_visible(hull)));
        assert_eq!(seen, (false, true));
        assert!(scene.is_visible(water));
    }

    #[test]
    fn test_with_hidden_restores_prior_hidden_state() {
        let (mut scene, _, water) = scene_with_water();
        scene.node_mut(water).unwrap().visible = false;
        scene.with_hidden(water, |_| ());
        assert!(!scene.is_visible(water));
    }

    #[test]
    fn test_cuboid_counts() {
        let mesh = MeshData::cuboid(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        let max_y = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        assert!((max_y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cylinder_indices_in_range() {
        let mesh = MeshData::cylinder(0.5, 2.0, 12);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        assert_eq!(mesh.indices.len() % 3, 0);
    }
}

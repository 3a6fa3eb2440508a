//! The demo scene: a small boat, a few buoys and pier posts around the water.

use glam::{Mat4, Vec3};
use mirrorwater_core::{FloatingBody, WaveSimulationState};
use mirrorwater_render::{MeshData, NodeId, Scene};

/// A scene node carried by a floating body.
#[derive(Debug, Clone)]
struct Rider {
    node: NodeId,
    body: FloatingBody,
    /// Offset from the body's frame to the node's mesh origin.
    local: Mat4,
}

/// Host scene with the water node handle captured at construction.
#[derive(Debug, Clone)]
pub struct DemoScene {
    pub scene: Scene,
    water: NodeId,
    hull: NodeId,
    riders: Vec<Rider>,
}

impl Default for DemoScene {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoScene {
    #[must_use]
    pub fn new() -> Self {
        let mut scene = Scene::new();

        // static pier posts standing in the water
        let post = MeshData::cylinder(0.12, 3.0, 16);
        for (x, z) in [(6.0, -1.0), (6.0, 1.5), (6.0, 4.0)] {
            scene.add_mesh(
                "pier post",
                post.clone(),
                Vec3::new(0.36, 0.25, 0.16),
                Mat4::from_translation(Vec3::new(x, -0.5, z)),
            );
        }

        let boat = FloatingBody {
            tilt_response: 0.8,
            ..FloatingBody::new(Vec3::new(0.0, 0.18, 0.0))
        };
        let hull = scene.add_mesh(
            "hull",
            MeshData::cuboid(Vec3::new(1.1, 0.22, 0.45)),
            Vec3::new(0.92, 0.92, 0.88),
            Mat4::IDENTITY,
        );
        let cabin = scene.add_mesh(
            "cabin",
            MeshData::cuboid(Vec3::new(0.35, 0.18, 0.3)),
            Vec3::new(0.2, 0.3, 0.45),
            Mat4::IDENTITY,
        );
        let mast = scene.add_mesh(
            "mast",
            MeshData::cylinder(0.04, 2.2, 12),
            Vec3::new(0.55, 0.4, 0.25),
            Mat4::IDENTITY,
        );

        let mut riders = vec![
            Rider {
                node: hull,
                body: boat.clone(),
                local: Mat4::IDENTITY,
            },
            Rider {
                node: cabin,
                body: boat.clone(),
                local: Mat4::from_translation(Vec3::new(-0.2, 0.4, 0.0)),
            },
            Rider {
                node: mast,
                body: boat,
                local: Mat4::from_translation(Vec3::new(0.35, 0.22, 0.0)),
            },
        ];

        let buoy = MeshData::cylinder(0.25, 0.6, 20);
        for (anchor, color) in [
            (Vec3::new(-4.0, -0.2, 2.5), Vec3::new(0.9, 0.15, 0.1)),
            (Vec3::new(3.0, -0.2, -4.0), Vec3::new(0.95, 0.8, 0.1)),
            (Vec3::new(-2.5, -0.2, -5.0), Vec3::new(0.9, 0.15, 0.1)),
        ] {
            let node = scene.add_mesh("buoy", buoy.clone(), color, Mat4::IDENTITY);
            riders.push(Rider {
                node,
                body: FloatingBody {
                    float_amplitude: 1.4,
                    ..FloatingBody::new(anchor)
                },
                local: Mat4::IDENTITY,
            });
        }

        let water = scene.add_water("water");

        Self {
            scene,
            water,
            hull,
            riders,
        }
    }

    /// Handle of the water surface node.
    pub fn water(&self) -> NodeId {
        self.water
    }

    pub fn hull(&self) -> NodeId {
        self.hull
    }

    /// Moves every floating node to its pose on the current wave state.
    pub fn update(&mut self, simulation: &WaveSimulationState) {
        for rider in &self.riders {
            let transform = rider.body.transform(simulation) * rider.local;
            self.scene.set_transform(rider.node, transform);
        }
    }
}

//! Single owner of the generated solids currently attached to the scene.

use bevy::prelude::*;

use crate::render::FootprintSolid;

/// Marks a renderable footprint solid. Bounds and fitting only look at
/// entities carrying this component.
#[derive(Component, Clone, Debug)]
pub struct FootprintMesh {
    pub record_id: String,
}

/// One attached solid: the entity plus the assets it owns.
pub struct SceneMesh {
    pub entity: Entity,
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaceStats {
    pub retired: usize,
    pub attached: usize,
}

/// Tracks the solids from the most recent batch. The world only holds the
/// entities; mesh and material lifetimes are managed here.
#[derive(Resource, Default)]
pub struct SceneMeshRegistry {
    meshes: Vec<SceneMesh>,
}

impl SceneMeshRegistry {
    /// Retire every solid from the previous call, then attach `solids`.
    /// Requires `Assets<Mesh>` and `Assets<StandardMaterial>` in the world.
    pub fn replace(&mut self, world: &mut World, solids: Vec<FootprintSolid>) -> ReplaceStats {
        let retired = self.retire_all(world);
        let attached = solids.len();
        self.meshes.reserve(attached);
        for solid in solids {
            let scene_mesh = attach(world, solid);
            self.meshes.push(scene_mesh);
        }
        ReplaceStats { retired, attached }
    }

    pub fn clear(&mut self, world: &mut World) -> usize {
        self.retire_all(world)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.meshes.iter().map(|m| m.entity)
    }

    fn retire_all(&mut self, world: &mut World) -> usize {
        let retired = std::mem::take(&mut self.meshes);
        for scene_mesh in &retired {
            if !world.despawn(scene_mesh.entity) {
                debug!("registry: entity {} was already gone", scene_mesh.entity);
            }
        }
        let mut meshes = world.resource_mut::<Assets<Mesh>>();
        for scene_mesh in &retired {
            meshes.remove(&scene_mesh.mesh);
        }
        let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
        for scene_mesh in &retired {
            materials.remove(&scene_mesh.material);
        }
        retired.len()
    }
}

fn attach(world: &mut World, solid: FootprintSolid) -> SceneMesh {
    let mesh = world.resource_mut::<Assets<Mesh>>().add(solid.mesh);
    let material = world
        .resource_mut::<Assets<StandardMaterial>>()
        .add(solid.material);
    let entity = world
        .spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            solid.transform,
            GlobalTransform::from(solid.transform),
            FootprintMesh {
                record_id: solid.record_id,
            },
        ))
        .id();
    SceneMesh {
        entity,
        mesh,
        material,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let mut world = World::new();
        world.init_resource::<Assets<Mesh>>();
        world.init_resource::<Assets<StandardMaterial>>();
        world
    }

    fn solid(id: &str) -> FootprintSolid {
        FootprintSolid {
            record_id: id.to_string(),
            mesh: Mesh::from(Cuboid::new(1.0, 1.0, 1.0)),
            material: StandardMaterial::default(),
            transform: Transform::from_xyz(1.0, 0.0, 2.0),
        }
    }

    fn attached_ids(world: &mut World) -> Vec<String> {
        let mut ids: Vec<String> = world
            .query::<&FootprintMesh>()
            .iter(world)
            .map(|m| m.record_id.clone())
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn replace_twice_keeps_only_second_set() {
        let mut world = world();
        let mut registry = SceneMeshRegistry::default();

        let first = registry.replace(&mut world, vec![solid("a"), solid("b"), solid("c")]);
        assert_eq!(first, ReplaceStats { retired: 0, attached: 3 });
        let first_entities: Vec<Entity> = registry.entities().collect();

        let second = registry.replace(&mut world, vec![solid("d"), solid("e")]);
        assert_eq!(second, ReplaceStats { retired: 3, attached: 2 });

        assert_eq!(attached_ids(&mut world), vec!["d", "e"]);
        assert_eq!(registry.len(), 2);
        for entity in first_entities {
            assert!(!world.entities().contains(entity));
        }
        assert_eq!(world.resource::<Assets<Mesh>>().len(), 2);
        assert_eq!(world.resource::<Assets<StandardMaterial>>().len(), 2);
    }

    #[test]
    fn clear_releases_everything() {
        let mut world = world();
        let mut registry = SceneMeshRegistry::default();
        registry.replace(&mut world, vec![solid("a")]);

        assert_eq!(registry.clear(&mut world), 1);
        assert!(registry.is_empty());
        assert!(attached_ids(&mut world).is_empty());
        assert!(world.resource::<Assets<Mesh>>().is_empty());
    }

    #[test]
    fn attached_solids_carry_world_placement() {
        let mut world = world();
        let mut registry = SceneMeshRegistry::default();
        registry.replace(&mut world, vec![solid("a")]);

        let entity = registry.entities().next().unwrap();
        let global = world.get::<GlobalTransform>(entity).unwrap();
        assert_eq!(global.translation(), Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn externally_despawned_entity_does_not_break_replace() {
        let mut world = world();
        let mut registry = SceneMeshRegistry::default();
        registry.replace(&mut world, vec![solid("a")]);
        let entity = registry.entities().next().unwrap();
        world.despawn(entity);

        let stats = registry.replace(&mut world, vec![solid("b")]);
        assert_eq!(stats.retired, 1);
        assert_eq!(attached_ids(&mut world), vec!["b"]);
    }
}

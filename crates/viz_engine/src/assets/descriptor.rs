//! Declarative model description
//!
//! A model descriptor carries everything needed to build one placed model
//! subtree: a name, a placement transform, and a list of meshes with
//! optional pick identifiers. Descriptors are plain serializable data;
//! [`instantiate`] turns a validated descriptor into scene nodes.

use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::{Quaternion, Unit};
use serde::{Deserialize, Serialize};

use crate::assets::DescriptorError;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::render::mesh::{Mesh, Vertex};
use crate::render::program::{ProgramDescriptor, SharedProgramRegistry};
use crate::render::surface::PickId;
use crate::scene::mesh_node::MeshNode;
use crate::scene::renderable::node_ref;
use crate::scene::transform_node::TransformNode;

/// Normal assigned to vertices when a mesh ships none
const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Placement of a model in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformDescriptor {
    /// Translation in scene units
    pub translation: [f32; 3],
    /// Rotation quaternion as `[x, y, z, w]`
    pub rotation: [f32; 4],
}

impl TransformDescriptor {
    /// Identity placement
    pub fn identity() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Convert into an engine transform
    pub fn to_transform(&self) -> Transform {
        let [x, y, z, w] = self.rotation;
        // Zero-length rotations are rejected by validation.
        let rotation = Unit::try_new(Quaternion::new(w, x, y, z), f32::EPSILON)
            .unwrap_or_else(Quat::identity);
        let [tx, ty, tz] = self.translation;
        Transform::from_parts(Vec3::new(tx, ty, tz), rotation)
    }
}

impl Default for TransformDescriptor {
    fn default() -> Self {
        Self::identity()
    }
}

/// One mesh of a model
///
/// Positions and normals are parallel arrays; `normals` may be omitted
/// entirely, in which case every vertex gets a default normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDescriptor {
    /// Mesh name, for logs and diagnostics
    pub name: String,
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, empty or one per position
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices into `positions`
    pub indices: Vec<u32>,
    /// Identifier for pick rendering, if this mesh is hit-testable
    #[serde(default)]
    pub pick_id: Option<u32>,
}

impl MeshDescriptor {
    /// Convert into renderable mesh data
    pub fn to_mesh(&self) -> Mesh {
        let vertices = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let normal = self.normals.get(i).copied().unwrap_or(DEFAULT_NORMAL);
                Vertex::new(*position, normal)
            })
            .collect();
        Mesh::new(vertices, self.indices.clone())
    }

    fn validate(&self) -> Result<(), DescriptorError> {
        if self.positions.is_empty() {
            return Err(DescriptorError::Validation(format!(
                "mesh '{}' has no vertices",
                self.name
            )));
        }
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(DescriptorError::Validation(format!(
                "mesh '{}' has {} normals for {} positions",
                self.name,
                self.normals.len(),
                self.positions.len()
            )));
        }
        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return Err(DescriptorError::Validation(format!(
                "mesh '{}' index count {} is not a positive multiple of three",
                self.name,
                self.indices.len()
            )));
        }
        if let Some(index) = self
            .indices
            .iter()
            .find(|&&index| index as usize >= self.positions.len())
        {
            return Err(DescriptorError::Validation(format!(
                "mesh '{}' index {} is out of bounds for {} vertices",
                self.name,
                index,
                self.positions.len()
            )));
        }
        Ok(())
    }
}

/// Complete description of one placeable model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model name, used as the identity in update events and logs
    pub name: String,
    /// Placement of the model root
    #[serde(default)]
    pub transform: TransformDescriptor,
    /// Meshes making up the model
    pub meshes: Vec<MeshDescriptor>,
}

impl ModelDescriptor {
    /// Check that the descriptor describes a buildable model
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::Validation("model name is empty".into()));
        }

        let [x, y, z, w] = self.transform.rotation;
        if x * x + y * y + z * z + w * w <= f32::EPSILON {
            return Err(DescriptorError::Validation(format!(
                "model '{}' has a zero-length rotation",
                self.name
            )));
        }

        if self.meshes.is_empty() {
            return Err(DescriptorError::Validation(format!(
                "model '{}' has no meshes",
                self.name
            )));
        }
        for mesh in &self.meshes {
            mesh.validate()?;
        }
        Ok(())
    }
}

/// Build the scene subtree for a model descriptor
///
/// Validates first and leaves the scene untouched on failure. The
/// returned transform node holds one mesh node per descriptor mesh, all
/// sharing the standard mesh program through the given registry. Programs
/// are compiled lazily on first render, so instantiation itself needs no
/// surface.
pub fn instantiate(
    descriptor: &ModelDescriptor,
    registry: &SharedProgramRegistry,
) -> Result<Rc<RefCell<TransformNode>>, DescriptorError> {
    descriptor.validate()?;

    let mut root = TransformNode::with_transform(descriptor.transform.to_transform());
    for mesh in &descriptor.meshes {
        let mut node = MeshNode::new(
            mesh.to_mesh(),
            ProgramDescriptor::standard_mesh(),
            registry.clone(),
        );
        if let Some(id) = mesh.pick_id {
            node = node.with_pick_id(PickId(id));
        }
        root.add(node_ref(node));
    }

    log::debug!(
        "Instantiated model '{}' with {} mesh node(s)",
        descriptor.name,
        descriptor.meshes.len()
    );
    Ok(Rc::new(RefCell::new(root)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::render::program::ProgramRegistry;
    use crate::render::recording::{RecordingSurface, SurfaceOp};
    use crate::scene::renderable::Renderable;

    fn triangle(name: &str) -> MeshDescriptor {
        MeshDescriptor {
            name: name.to_string(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
            pick_id: None,
        }
    }

    fn sample_model() -> ModelDescriptor {
        ModelDescriptor {
            name: "probe".to_string(),
            transform: TransformDescriptor {
                translation: [1.0, 2.0, 3.0],
                rotation: [0.0, 0.0, 0.0, 1.0],
            },
            meshes: vec![triangle("body"), triangle("tip")],
        }
    }

    #[test]
    fn test_instantiate_builds_one_mesh_node_per_mesh() {
        let registry = ProgramRegistry::new_shared();
        let mut surface = RecordingSurface::new(640, 480);

        let root = instantiate(&sample_model(), &registry).unwrap();
        assert_eq!(root.borrow().len(), 2);

        root.borrow_mut().render(&mut surface).unwrap();

        let mesh_draws = surface
            .ops()
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Mesh { .. }))
            .count();
        assert_eq!(mesh_draws, 2);
        // Both nodes share one compiled program through the registry.
        assert_eq!(registry.borrow().live_count(), 1);
    }

    #[test]
    fn test_instantiate_applies_the_placement() {
        let registry = ProgramRegistry::new_shared();
        let root = instantiate(&sample_model(), &registry).unwrap();

        let translation = root.borrow().translation();
        assert_relative_eq!(translation, Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn test_pick_ids_reach_the_pick_pass() {
        let registry = ProgramRegistry::new_shared();
        let mut surface = RecordingSurface::new(640, 480);
        let mut model = sample_model();
        model.meshes[0].pick_id = Some(9);

        let root = instantiate(&model, &registry).unwrap();
        root.borrow_mut().render(&mut surface).unwrap();
        surface.clear_ops();
        root.borrow_mut()
            .as_pickable()
            .unwrap()
            .render_pickable(&mut surface)
            .unwrap();

        let picks: Vec<Option<PickId>> = surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Mesh { pick, .. } => Some(*pick),
                _ => None,
            })
            .collect();
        assert_eq!(picks, vec![Some(PickId(9))]);
    }

    #[test]
    fn test_missing_normals_take_the_default() {
        let mut mesh = triangle("flat");
        mesh.normals.clear();

        let built = mesh.to_mesh();

        assert!(built
            .vertices
            .iter()
            .all(|vertex| vertex.normal == DEFAULT_NORMAL));
    }

    #[test]
    fn test_validation_rejects_empty_model() {
        let model = ModelDescriptor {
            name: "empty".to_string(),
            transform: TransformDescriptor::identity(),
            meshes: Vec::new(),
        };

        assert!(matches!(
            model.validate(),
            Err(DescriptorError::Validation(_))
        ));
    }

    #[test]
    fn test_validation_rejects_out_of_bounds_index() {
        let mut model = sample_model();
        model.meshes[0].indices = vec![0, 1, 3];

        assert!(matches!(
            model.validate(),
            Err(DescriptorError::Validation(_))
        ));
    }

    #[test]
    fn test_validation_rejects_normal_count_mismatch() {
        let mut model = sample_model();
        model.meshes[0].normals.pop();

        assert!(matches!(
            model.validate(),
            Err(DescriptorError::Validation(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_rotation() {
        let mut model = sample_model();
        model.transform.rotation = [0.0; 4];

        assert!(matches!(
            model.validate(),
            Err(DescriptorError::Validation(_))
        ));
    }

    #[test]
    fn test_instantiate_surfaces_validation_errors() {
        let registry = ProgramRegistry::new_shared();
        let mut model = sample_model();
        model.meshes.clear();

        assert!(instantiate(&model, &registry).is_err());
        assert_eq!(registry.borrow().live_count(), 0);
    }
}

//! RON model descriptor loading
//!
//! Reads [`ModelDescriptor`] files from disk or from in-memory text.
//! Parsing and validation happen up front, so an error never leaves a
//! half-built model anywhere.

use std::path::Path;

use crate::assets::descriptor::ModelDescriptor;
use crate::assets::DescriptorError;

/// Loader for RON model descriptor files
pub struct DescriptorLoader;

impl DescriptorLoader {
    /// Load and validate a model descriptor from a RON file
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ModelDescriptor, DescriptorError> {
        let path = path.as_ref();
        log::debug!("Loading model descriptor from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        Self::parse_model(&contents)
    }

    /// Parse and validate a model descriptor from RON text
    pub fn parse_model(source: &str) -> Result<ModelDescriptor, DescriptorError> {
        let descriptor: ModelDescriptor =
            ron::from_str(source).map_err(|error| DescriptorError::Parse(error.to_string()))?;
        descriptor.validate()?;

        log::info!(
            "Loaded model '{}': {} mesh(es), {} triangles",
            descriptor.name,
            descriptor.meshes.len(),
            descriptor
                .meshes
                .iter()
                .map(|mesh| mesh.indices.len() / 3)
                .sum::<usize>()
        );
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"
        (
            name: "probe",
            transform: (
                translation: (0.0, 1.0, -2.0),
                rotation: (0.0, 0.0, 0.0, 1.0),
            ),
            meshes: [
                (
                    name: "tip",
                    positions: [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)],
                    normals: [(0.0, 0.0, 1.0), (0.0, 0.0, 1.0), (0.0, 0.0, 1.0)],
                    indices: [0, 1, 2],
                    pick_id: Some(4),
                ),
            ],
        )
    "#;

    #[test]
    fn test_parse_well_formed_descriptor() {
        let descriptor = DescriptorLoader::parse_model(WELL_FORMED).unwrap();

        assert_eq!(descriptor.name, "probe");
        assert_eq!(descriptor.meshes.len(), 1);
        assert_eq!(descriptor.meshes[0].pick_id, Some(4));
        assert_eq!(descriptor.transform.translation, [0.0, 1.0, -2.0]);
    }

    #[test]
    fn test_optional_fields_may_be_omitted() {
        let source = r#"
            (
                name: "flat",
                meshes: [
                    (
                        name: "tri",
                        positions: [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)],
                        indices: [0, 1, 2],
                    ),
                ],
            )
        "#;

        let descriptor = DescriptorLoader::parse_model(source).unwrap();

        assert!(descriptor.meshes[0].normals.is_empty());
        assert_eq!(descriptor.meshes[0].pick_id, None);
        assert_eq!(descriptor.transform.rotation, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_malformed_text_is_a_parse_error() {
        let result = DescriptorLoader::parse_model("(name: \"broken\"");

        assert!(matches!(result, Err(DescriptorError::Parse(_))));
    }

    #[test]
    fn test_parseable_but_unusable_descriptor_is_a_validation_error() {
        let source = r#"(name: "hollow", meshes: [])"#;

        let result = DescriptorLoader::parse_model(source);

        assert!(matches!(result, Err(DescriptorError::Validation(_))));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = DescriptorLoader::load_model("/nonexistent/model.ron");

        assert!(matches!(result, Err(DescriptorError::Io(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "viz_engine_loader_{}.ron",
            std::process::id()
        ));
        std::fs::write(&path, WELL_FORMED).unwrap();

        let descriptor = DescriptorLoader::load_model(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(descriptor.name, "probe");
    }
}

//! Precomputed 3D preview dataset attached to a thing.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Rejection;

/// Camera position the preview opens with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Triangle mesh with an initial camera position.
///
/// Deserialise only after the payload has passed the `view_data` schema;
/// the schema reports shape errors with a precise path, serde does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ViewData {
    pub camera: Camera,
    #[schema(value_type = Vec<Vec<f64>>)]
    pub vertices: Vec<[f64; 3]>,
    #[schema(value_type = Vec<Vec<u64>>)]
    pub facets: Vec<[u64; 3]>,
}

impl ViewData {
    /// Require every facet to reference an existing vertex.
    pub fn check_facet_indices(&self) -> Result<(), Rejection> {
        let vertex_count = self.vertices.len() as u64;
        for (facet_index, facet) in self.facets.iter().enumerate() {
            let out_of_range = facet
                .iter()
                .enumerate()
                .find(|(_, vertex)| **vertex >= vertex_count);
            if let Some((position, vertex)) = out_of_range {
                return Err(Rejection::invalid(
                    format!("/facets/{facet_index}/{position}"),
                    "vertex_out_of_range",
                    format!(
                        "/facets/{facet_index}/{position} references vertex {vertex} but only {vertex_count} vertices exist"
                    ),
                ));
            }
        }
        Ok(())
    }
}

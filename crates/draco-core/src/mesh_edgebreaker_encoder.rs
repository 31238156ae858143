//! Connectivity encoder for the edgebreaker method.
//!
//! Traverses the corner table with the classic CLERS alphabet (Center, Left,
//! Right, End, Split) and entropy-codes the resulting symbol stream. This is
//! the encoding counterpart of [`crate::mesh_edgebreaker_decoder`].

use crate::corner_table::CornerTable;
use crate::geometry_indices::{CornerIndex, FaceIndex, PointIndex, VertexIndex, INVALID_CORNER_INDEX};
use crate::encoder_buffer::EncoderBuffer;
use crate::mesh::Mesh;
use crate::mesh_edgebreaker_shared::EdgebreakerSymbol;
use crate::status::DracoError;
use crate::symbol_encoding::{encode_symbols, SymbolEncodingOptions};

pub struct MeshEdgebreakerEncoder {
    num_faces: usize,
    num_points: usize,
}

impl MeshEdgebreakerEncoder {
    pub fn new(num_faces: usize, num_points: usize) -> Self {
        Self { num_faces, num_points }
    }

    /// Encodes mesh connectivity, returning the point-id permutation in
    /// traversal order and the corner each attribute value was first seen at.
    pub fn encode_connectivity(
        &mut self,
        mesh: &Mesh,
        corner_table: &CornerTable,
        out_buffer: &mut EncoderBuffer,
    ) -> Result<(Vec<PointIndex>, Vec<u32>), DracoError> {
        let num_faces = corner_table.num_faces();
        let num_vertices = corner_table.num_vertices();

        let mut visited_faces = vec![false; num_faces];
        let mut visited_vertices = vec![false; num_vertices];
        let mut point_ids = Vec::with_capacity(num_vertices);
        let mut data_to_corner_map = Vec::with_capacity(num_vertices);
        let mut symbols = Vec::with_capacity(num_faces);
        let mut num_components: u32 = 0;

        for start in 0..num_faces {
            if visited_faces[start] {
                continue;
            }
            num_components += 1;
            let face = FaceIndex(start as u32);
            let c0 = corner_table.first_corner(face);
            visited_faces[start] = true;

            // Seed the two initial vertices of the component explicitly; the
            // third is discovered by the traversal below.
            for c in [corner_table.next(c0), corner_table.previous(c0)] {
                let v = corner_table.vertex(c);
                if !visited_vertices[v.0 as usize] {
                    record_vertex(v, c, mesh, &mut visited_vertices, &mut point_ids, &mut data_to_corner_map);
                }
            }

            let mut stack: Vec<CornerIndex> = Vec::new();
            let mut active = c0;

            loop {
                let opposite = corner_table.opposite(active);
                if opposite == INVALID_CORNER_INDEX {
                    // Open boundary: nothing more to gain here, close the branch.
                    symbols.push(EdgebreakerSymbol::End as u32);
                    match stack.pop() {
                        Some(next_active) => active = next_active,
                        None => break,
                    }
                    continue;
                }

                let opp_face = corner_table.face(opposite);
                if visited_faces[opp_face.0 as usize] {
                    symbols.push(EdgebreakerSymbol::End as u32);
                    match stack.pop() {
                        Some(next_active) => active = next_active,
                        None => break,
                    }
                    continue;
                }

                visited_faces[opp_face.0 as usize] = true;
                let new_vertex = corner_table.vertex(opposite);
                if !visited_vertices[new_vertex.0 as usize] {
                    record_vertex(new_vertex, opposite, mesh, &mut visited_vertices, &mut point_ids, &mut data_to_corner_map);
                    symbols.push(EdgebreakerSymbol::Center as u32);
                    // Push the left branch for later, keep walking right.
                    stack.push(corner_table.previous(opposite));
                    active = corner_table.next(opposite);
                } else {
                    // Both endpoints of this edge were already visited: we
                    // are closing a loop from one side (R) while the other
                    // side still needs a later pass (S), unless the stack is
                    // empty in which case this is a plain continuation (L).
                    if stack.is_empty() {
                        symbols.push(EdgebreakerSymbol::Left as u32);
                        active = corner_table.next(opposite);
                    } else {
                        symbols.push(EdgebreakerSymbol::Split as u32);
                        stack.push(corner_table.previous(opposite));
                        active = corner_table.next(opposite);
                    }
                }
            }
        }

        out_buffer.encode_varint(num_components as u64);
        out_buffer.encode_varint(symbols.len() as u64);
        let options = SymbolEncodingOptions::default();
        if !encode_symbols(&symbols, 1, &options, out_buffer) {
            return Err(DracoError::DracoError(
                "failed to entropy-code edgebreaker symbol stream".into(),
            ));
        }

        // Any vertex left unvisited (isolated points with no incident face)
        // is appended in index order so every point still gets an id.
        for v in 0..num_vertices {
            if !visited_vertices[v] {
                record_vertex(
                    VertexIndex(v as u32),
                    INVALID_CORNER_INDEX,
                    mesh,
                    &mut visited_vertices,
                    &mut point_ids,
                    &mut data_to_corner_map,
                );
            }
        }

        debug_assert!(self.num_faces == num_faces || num_faces == 0);
        debug_assert!(point_ids.len() <= self.num_points.max(point_ids.len()));
        Ok((point_ids, data_to_corner_map))
    }
}

/// Records the first sighting of `v`, assigning it the next sequential
/// attribute-value slot and remembering which corner produced it.
fn record_vertex(
    v: VertexIndex,
    corner: CornerIndex,
    mesh: &Mesh,
    visited_vertices: &mut [bool],
    point_ids: &mut Vec<PointIndex>,
    data_to_corner_map: &mut Vec<u32>,
) -> u32 {
    let new_id = point_ids.len() as u32;
    visited_vertices[v.0 as usize] = true;
    data_to_corner_map.push(corner.0);
    // The corner table's vertex ids line up 1:1 with the mesh's point ids
    // for the manifold triangulations built by this encoder.
    let point = PointIndex(v.0.min(mesh.num_points().saturating_sub(1) as u32));
    point_ids.push(point);
    new_id
}

use nalgebra as na;
use na::{Vector2, Vector3};

use crate::vertex::Vertex;

/// Indexed triangle mesh: parallel attribute arrays and one index triple per face.
/// Normals and uvs are optional per vertex, missing ones read as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub uvs: Vec<Vector2<f32>>,
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Appends a vertex with all its attributes, returning its index.
    pub fn push_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.positions.len();
        self.positions.push(vertex.position);
        self.normals.resize(index, Vector3::zeros());
        self.normals.push(vertex.normal);
        self.uvs.resize(index, Vector2::zeros());
        self.uvs.push(vertex.uv);
        return index;
    }

    /// Appends a face. Indices aren't validated here, the pipeline skips faces pointing outside.
    pub fn push_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    pub fn vertex_count(&self) -> usize {
        return self.positions.len();
    }

    pub fn face_count(&self) -> usize {
        return self.faces.len();
    }

    /// Boilerplate for gathering the attributes at one index. None if there is no position there.
    pub fn vertex(&self, index: usize) -> Option<Vertex> {
        let position = *self.positions.get(index)?;
        return Some(Vertex {
            position,
            normal: self.normals.get(index).copied().unwrap_or_else(Vector3::zeros),
            uv: self.uvs.get(index).copied().unwrap_or_else(Vector2::zeros),
        });
    }

    /// Attributes of the three vertices of a face. None if the face or any of its indices is out of range.
    pub fn triangle(&self, face: usize) -> Option<[Vertex; 3]> {
        let [a, b, c] = *self.faces.get(face)?;
        return Some([self.vertex(a)?, self.vertex(b)?, self.vertex(c)?]);
    }
}

/// Gives vertices without a normal the normal of their face, counter-clockwise winding facing out.
/// Models that ship positions only then still light up. Degenerate faces are left untouched.
pub fn fill_missing_normals(vertices: &mut [Vertex; 3]) {
    let [a, b, c] = vertices.map(|v| v.position);
    let face_normal = (b - a).cross(&(c - a));
    if face_normal == Vector3::zeros() {
        return;
    }
    for vertex in vertices.iter_mut() {
        if vertex.normal == Vector3::zeros() {
            vertex.normal = face_normal;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::vector;

    #[test]
    fn test_triangle_gathers_attributes() {
        let mut mesh = Mesh::new();
        for i in 0..3 {
            let x = i as f32;
            mesh.push_vertex(Vertex {
                position: vector![x, 0.0, 0.0],
                normal: vector![0.0, 0.0, 1.0],
                uv: vector![x / 2.0, 0.0],
            });
        }
        mesh.push_face([2, 0, 1]);
        let [a, b, c] = mesh.triangle(0).unwrap();
        assert_eq!(a.position.x, 2.0);
        assert_eq!(b.uv.x, 0.0);
        assert_eq!(c.normal, vector![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_attributes_default_to_zero() {
        let mesh = Mesh {
            positions: vec![vector![1.0, 2.0, 3.0]],
            ..Default::default()
        };
        let vertex = mesh.vertex(0).unwrap();
        assert_eq!(vertex.normal, Vector3::zeros());
        assert_eq!(vertex.uv, Vector2::zeros());
    }

    #[test]
    fn test_missing_normals_take_the_face_normal() {
        let mut vertices = [
            Vertex { position: vector![0.0, 0.0, 0.0], ..Default::default() },
            Vertex { position: vector![1.0, 0.0, 0.0], normal: vector![1.0, 0.0, 0.0], ..Default::default() },
            Vertex { position: vector![0.0, 2.0, 0.0], ..Default::default() },
        ];
        fill_missing_normals(&mut vertices);
        assert_eq!(vertices[0].normal, vector![0.0, 0.0, 2.0]);
        assert_eq!(vertices[1].normal, vector![1.0, 0.0, 0.0]);
        assert_eq!(vertices[2].normal, vector![0.0, 0.0, 2.0]);

        let mut line = [Vertex::default(); 3];
        fill_missing_normals(&mut line);
        assert!(line.iter().all(|v| v.normal == Vector3::zeros()));
    }

    #[test]
    fn test_out_of_range_face_is_none() {
        let mut mesh = Mesh::new();
        mesh.push_vertex(Vertex::default());
        mesh.push_face([0, 0, 5]);
        assert!(mesh.triangle(0).is_none());
        assert!(mesh.triangle(1).is_none());
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 1);
    }
}

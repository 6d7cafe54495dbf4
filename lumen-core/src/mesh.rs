use crate::bounds::Bounds3f;
use crate::ray::Ray;
use crate::sampling::{uniform_sample_triangle, Distribution1D};
use crate::{Normal3f, Point2f, Point3f, Vector3f};

/// Indexed triangle mesh. Normals and texture coordinates are optional;
/// faces fall back to the geometric normal and zero uv.
#[derive(Debug)]
pub struct TriangleMesh {
    pub positions: Vec<Point3f>,
    pub normals: Vec<Normal3f>,
    pub uvs: Vec<Point2f>,
    /// Flat index triples, one per face.
    pub indices: Vec<u32>,
}

/// Point sampled uniformly over the mesh surface.
#[derive(Debug, Copy, Clone)]
pub struct MeshPointSample {
    pub p: Point3f,
    pub n: Normal3f,
    pub uv: Point2f,
    /// Density in the area measure.
    pub pdf: f32,
}

impl TriangleMesh {
    pub fn new(
        positions: Vec<Point3f>,
        normals: Vec<Normal3f>,
        uvs: Vec<Point2f>,
        indices: Vec<u32>,
    ) -> TriangleMesh {
        assert_eq!(indices.len() % 3, 0);
        if !normals.is_empty() {
            assert_eq!(normals.len(), positions.len());
        }
        if !uvs.is_empty() {
            assert_eq!(uvs.len(), positions.len());
        }
        TriangleMesh {
            positions,
            normals,
            uvs,
            indices,
        }
    }

    pub fn n_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangle(&self, face: usize) -> (Point3f, Point3f, Point3f) {
        let i0 = self.indices[3 * face] as usize;
        let i1 = self.indices[3 * face + 1] as usize;
        let i2 = self.indices[3 * face + 2] as usize;
        (self.positions[i0], self.positions[i1], self.positions[i2])
    }

    pub fn face_area(&self, face: usize) -> f32 {
        let (p0, p1, p2) = self.triangle(face);
        0.5 * (p1 - p0).cross(&(p2 - p0)).length()
    }

    pub fn area(&self) -> f32 {
        (0..self.n_triangles()).map(|f| self.face_area(f)).sum()
    }

    pub fn face_bounds(&self, face: usize) -> Bounds3f {
        let (p0, p1, p2) = self.triangle(face);
        Bounds3f::from_points(&p0, &p1).union_point(&p2)
    }

    /// Geometric (face) normal.
    pub fn face_normal(&self, face: usize) -> Normal3f {
        let (p0, p1, p2) = self.triangle(face);
        Normal3f::from((p1 - p0).cross(&(p2 - p0)).normalize())
    }

    /// Shading normal at barycentric coordinates (b1, b2) on `face`.
    pub fn shading_normal(&self, face: usize, b1: f32, b2: f32) -> Normal3f {
        if self.normals.is_empty() {
            return self.face_normal(face);
        }
        let i0 = self.indices[3 * face] as usize;
        let i1 = self.indices[3 * face + 1] as usize;
        let i2 = self.indices[3 * face + 2] as usize;
        let b0 = 1.0 - b1 - b2;
        let n = self.normals[i0].to_vector() * b0
            + self.normals[i1].to_vector() * b1
            + self.normals[i2].to_vector() * b2;
        if n.length_squared() == 0.0 {
            self.face_normal(face)
        } else {
            Normal3f::from(n.normalize())
        }
    }

    pub fn uv(&self, face: usize, b1: f32, b2: f32) -> Point2f {
        if self.uvs.is_empty() {
            return Point2f::new(0.0, 0.0);
        }
        let i0 = self.indices[3 * face] as usize;
        let i1 = self.indices[3 * face + 1] as usize;
        let i2 = self.indices[3 * face + 2] as usize;
        let b0 = 1.0 - b1 - b2;
        Point2f::new(
            self.uvs[i0].x * b0 + self.uvs[i1].x * b1 + self.uvs[i2].x * b2,
            self.uvs[i0].y * b0 + self.uvs[i1].y * b1 + self.uvs[i2].y * b2,
        )
    }

    pub fn point_at(&self, face: usize, b1: f32, b2: f32) -> Point3f {
        let (p0, p1, p2) = self.triangle(face);
        p0 + (p1 - p0) * b1 + (p2 - p0) * b2
    }

    /// Area-weighted face distribution for uniform surface sampling.
    pub fn area_distribution(&self) -> Distribution1D {
        let areas: Vec<f32> = (0..self.n_triangles()).map(|f| self.face_area(f)).collect();
        Distribution1D::new(&areas[..])
    }

    /// Sample a point uniformly over the surface with the given face
    /// distribution; density is 1/area in the area measure.
    pub fn sample_point(
        &self,
        dist: &Distribution1D,
        u_face: f32,
        u1: f32,
        u2: f32,
    ) -> MeshPointSample {
        let (face, face_pdf) = dist.sample_discrete(u_face);
        let b = uniform_sample_triangle(u1, u2);
        let area = self.face_area(face);
        let pdf = if area > 0.0 { face_pdf / area } else { 0.0 };

        MeshPointSample {
            p: self.point_at(face, b.x, b.y),
            n: self.shading_normal(face, b.x, b.y),
            uv: self.uv(face, b.x, b.y),
            pdf,
        }
    }

    /// Möller–Trumbore ray/triangle intersection over [tmin, tmax].
    /// Returns (t, b1, b2).
    pub fn intersect_face(
        &self,
        face: usize,
        ray: &Ray,
        tmin: f32,
        tmax: f32,
    ) -> Option<(f32, f32, f32)> {
        let (p0, p1, p2) = self.triangle(face);
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let pv = ray.d.cross(&e2);
        let det = e1.dot(&pv);
        if det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;
        let tv: Vector3f = ray.o - p0;
        let b1 = tv.dot(&pv) * inv_det;
        if !(0.0..=1.0).contains(&b1) {
            return None;
        }
        let qv = tv.cross(&e1);
        let b2 = ray.d.dot(&qv) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }
        let t = e2.dot(&qv) * inv_det;
        if t < tmin || t > tmax {
            return None;
        }

        Some((t, b1, b2))
    }
}

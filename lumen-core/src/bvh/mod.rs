use std::sync::Arc;

use log::info;

use crate::bounds::Bounds3f;
use crate::mesh::TriangleMesh;
use crate::ray::Ray;

const MAX_TRIS_PER_LEAF: usize = 4;

/// Reference to one triangle of one primitive's mesh.
#[derive(Debug, Copy, Clone)]
pub struct TriangleRef {
    pub primitive: usize,
    pub mesh: usize,
    pub face: usize,
}

#[derive(Debug, Copy, Clone)]
pub struct BvhHit {
    pub t: f32,
    pub b1: f32,
    pub b2: f32,
    pub primitive: usize,
    pub mesh: usize,
    pub face: usize,
}

#[derive(Debug)]
enum BvhNode {
    Leaf {
        bounds: Bounds3f,
        first: usize,
        count: usize,
    },
    /// The left child is the next node in the array.
    Interior {
        bounds: Bounds3f,
        right_child: usize,
        axis: usize,
    },
}

impl BvhNode {
    fn bounds(&self) -> &Bounds3f {
        match self {
            BvhNode::Leaf { bounds, .. } => bounds,
            BvhNode::Interior { bounds, .. } => bounds,
        }
    }
}

/// Median-split bounding volume hierarchy over the scene's triangle
/// soup. Build once, queried concurrently during rendering.
#[derive(Debug)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    tris: Vec<TriangleRef>,
    meshes: Vec<Arc<TriangleMesh>>,
}

impl Bvh {
    pub fn build(meshes: Vec<Arc<TriangleMesh>>, mut tris: Vec<TriangleRef>) -> Bvh {
        let mut nodes = Vec::new();
        if !tris.is_empty() {
            let n = tris.len();
            build_recursive(&meshes, &mut tris, 0, n, &mut nodes);
        }
        info!(
            "Built BVH: {} triangles, {} nodes",
            tris.len(),
            nodes.len()
        );

        Bvh {
            nodes,
            tris,
            meshes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    pub fn world_bounds(&self) -> Bounds3f {
        self.nodes
            .first()
            .map(|n| *n.bounds())
            .unwrap_or_else(Bounds3f::empty)
    }

    /// Closest hit over [tmin, tmax].
    pub fn intersect(&self, ray: &Ray, tmin: f32, tmax: f32) -> Option<BvhHit> {
        let mut closest: Option<BvhHit> = None;
        let mut t_far = tmax;
        self.traverse(ray, tmin, tmax, |bvh, leaf_first, leaf_count| {
            for i in leaf_first..leaf_first + leaf_count {
                let tri = bvh.tris[i];
                let mesh = &bvh.meshes[tri.mesh];
                if let Some((t, b1, b2)) = mesh.intersect_face(tri.face, ray, tmin, t_far) {
                    t_far = t;
                    closest = Some(BvhHit {
                        t,
                        b1,
                        b2,
                        primitive: tri.primitive,
                        mesh: tri.mesh,
                        face: tri.face,
                    });
                }
            }
            // Keep looking for closer hits.
            (false, t_far)
        });

        closest
    }

    /// Any-hit predicate over [tmin, tmax].
    pub fn intersect_p(&self, ray: &Ray, tmin: f32, tmax: f32) -> bool {
        let mut hit = false;
        self.traverse(ray, tmin, tmax, |bvh, leaf_first, leaf_count| {
            for i in leaf_first..leaf_first + leaf_count {
                let tri = bvh.tris[i];
                let mesh = &bvh.meshes[tri.mesh];
                if mesh.intersect_face(tri.face, ray, tmin, tmax).is_some() {
                    hit = true;
                    return (true, tmax);
                }
            }
            (false, tmax)
        });

        hit
    }

    /// Shared traversal skeleton; the callback processes a leaf and
    /// returns (stop, new tmax).
    fn traverse<F>(&self, ray: &Ray, tmin: f32, tmax: f32, mut visit_leaf: F)
    where
        F: FnMut(&Bvh, usize, usize) -> (bool, f32),
    {
        if self.nodes.is_empty() {
            return;
        }
        let mut t_far = tmax;
        let neg_dir = [ray.d.x < 0.0, ray.d.y < 0.0, ray.d.z < 0.0];
        let mut stack = Vec::with_capacity(64);
        stack.push(0usize);
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if node.bounds().intersect_p(ray, tmin, t_far).is_none() {
                continue;
            }
            match *node {
                BvhNode::Leaf { first, count, .. } => {
                    let (stop, new_tmax) = visit_leaf(self, first, count);
                    if stop {
                        return;
                    }
                    t_far = t_far.min(new_tmax);
                }
                BvhNode::Interior {
                    right_child, axis, ..
                } => {
                    // Visit the near child first.
                    if neg_dir[axis] {
                        stack.push(node_idx + 1);
                        stack.push(right_child);
                    } else {
                        stack.push(right_child);
                        stack.push(node_idx + 1);
                    }
                }
            }
        }
    }
}

fn tri_bounds(meshes: &[Arc<TriangleMesh>], tri: &TriangleRef) -> Bounds3f {
    meshes[tri.mesh].face_bounds(tri.face)
}

fn build_recursive(
    meshes: &[Arc<TriangleMesh>],
    tris: &mut [TriangleRef],
    first: usize,
    count: usize,
    nodes: &mut Vec<BvhNode>,
) -> usize {
    let bounds = tris[first..first + count]
        .iter()
        .fold(Bounds3f::empty(), |b, t| b.union(&tri_bounds(meshes, t)));

    if count <= MAX_TRIS_PER_LEAF {
        nodes.push(BvhNode::Leaf {
            bounds,
            first,
            count,
        });
        return nodes.len() - 1;
    }

    let centroid_bounds = tris[first..first + count]
        .iter()
        .fold(Bounds3f::empty(), |b, t| {
            b.union_point(&tri_bounds(meshes, t).centroid())
        });
    let axis = centroid_bounds.maximum_extent();
    if centroid_bounds.diagonal()[axis] == 0.0 {
        // Degenerate spread; give up on splitting.
        nodes.push(BvhNode::Leaf {
            bounds,
            first,
            count,
        });
        return nodes.len() - 1;
    }

    tris[first..first + count].sort_by(|a, b| {
        let ca = tri_bounds(meshes, a).centroid()[axis];
        let cb = tri_bounds(meshes, b).centroid()[axis];
        ca.partial_cmp(&cb).unwrap()
    });
    let mid = count / 2;

    let node_idx = nodes.len();
    nodes.push(BvhNode::Interior {
        bounds,
        right_child: 0, // patched below
        axis,
    });
    build_recursive(meshes, tris, first, mid, nodes);
    let right = build_recursive(meshes, tris, first + mid, count - mid, nodes);
    if let BvhNode::Interior {
        ref mut right_child,
        ..
    } = nodes[node_idx]
    {
        *right_child = right;
    }

    node_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point3f, Vector3f};
    use rand::{Rng as _, SeedableRng};

    fn random_soup(n: usize, seed: u64) -> Arc<TriangleMesh> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        for i in 0..n {
            let base = Point3f::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let e1 = Vector3f::new(rng.gen_range(-0.2..0.2), rng.gen_range(-0.2..0.2), 0.05);
            let e2 = Vector3f::new(0.05, rng.gen_range(-0.2..0.2), rng.gen_range(-0.2..0.2));
            positions.push(base);
            positions.push(base + e1);
            positions.push(base + e2);
            indices.extend_from_slice(&[3 * i as u32, 3 * i as u32 + 1, 3 * i as u32 + 2]);
        }
        Arc::new(TriangleMesh::new(positions, vec![], vec![], indices))
    }

    #[test]
    fn test_matches_brute_force() {
        let mesh = random_soup(200, 99);
        let refs: Vec<TriangleRef> = (0..mesh.n_triangles())
            .map(|face| TriangleRef {
                primitive: 0,
                mesh: 0,
                face,
            })
            .collect();
        let bvh = Bvh::build(vec![Arc::clone(&mesh)], refs);

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let o = Point3f::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
            );
            let d = Vector3f::new(
                rng.gen_range(-1.0..1.0f32),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if d.length_squared() < 1e-6 {
                continue;
            }
            let ray = Ray::new(o, d.normalize());

            let brute = (0..mesh.n_triangles())
                .filter_map(|f| mesh.intersect_face(f, &ray, 0.0, f32::INFINITY))
                .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
            let fast = bvh.intersect(&ray, 0.0, f32::INFINITY);

            match (brute, fast) {
                (None, None) => {}
                (Some((t, _, _)), Some(hit)) => {
                    assert!((t - hit.t).abs() < 1e-5, "t mismatch: {} vs {}", t, hit.t)
                }
                (a, b) => panic!("hit disagreement: {:?} vs {:?}", a, b.map(|h| h.t)),
            }
            assert_eq!(brute.is_some(), bvh.intersect_p(&ray, 0.0, f32::INFINITY));
        }
    }
}

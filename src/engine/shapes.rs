// Procedural target geometry.
//
// The interesting collections (logos, glyphs) arrive from external loaders as
// raw outlines; these two generators cover the built-in volumetric themes: a
// spiral winding over a sphere, and an icosphere whose triangles each become
// one small closed path.

use std::collections::HashMap;

use glam::Vec3;

/// One closed spiral winding over a sphere of `radius`, densely enough that
/// the vertices can be adopted directly as a pre-spaced follow path. Both
/// hemispheres are traced, the return pass phase-shifted half a turn so the
/// loop closes on itself instead of doubling back along the same track.
pub fn archimedean_sphere(samples: usize, radius: f32, turns: usize) -> Vec<Vec3> {
    let half = (samples / 2).max(2);
    let skip = (360.0 * turns as f32 / half as f32) as i32;

    let mut out = Vec::with_capacity(half * 2);

    let sample = |i: usize, phase: f32| -> Vec3 {
        let j = (i as i32 * skip) as f32;
        let h = i as f32 / (half as f32 / 2.0) - 1.0;
        let theta = h.clamp(-1.0, 1.0).acos();
        let fatness = theta.sin();
        Vec3::new(
            h * radius,
            (j.to_radians() + phase).cos() * radius * fatness,
            (j.to_radians() + phase).sin() * radius * fatness,
        )
    };

    for i in 0..half {
        out.push(sample(i, 0.0));
    }
    for i in (1..half).rev() {
        out.push(sample(i, std::f32::consts::PI));
    }

    out
}

// ============================================================================
// ICOSPHERE
// ============================================================================

/// Canonical key for an undirected edge: always (min, max), so (a,b) and
/// (b,a) share one midpoint.
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Unit icosahedron: 12 vertices, 20 triangular faces.
fn icosahedron() -> (Vec<Vec3>, Vec<[usize; 3]>) {
    // Golden-ratio rectangles.
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let positions: Vec<Vec3> = [
        (-1.0, t, 0.0), (1.0, t, 0.0), (-1.0, -t, 0.0), (1.0, -t, 0.0),
        (0.0, -1.0, t), (0.0, 1.0, t), (0.0, -1.0, -t), (0.0, 1.0, -t),
        (t, 0.0, -1.0), (t, 0.0, 1.0), (-t, 0.0, -1.0), (-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vec3::new(x, y, z).normalize())
    .collect();

    let faces = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 3],
    ];

    (positions, faces)
}

/// One level of midpoint subdivision: every triangle splits into four, new
/// vertices pushed back onto the unit sphere. Midpoints are cached per edge
/// so shared edges stay shared.
fn subdivide_triangles(
    positions: &mut Vec<Vec3>,
    faces: &[[usize; 3]],
) -> Vec<[usize; 3]> {
    let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
    let mut out = Vec::with_capacity(faces.len() * 4);

    for &[a, b, c] in faces {
        let mut midpoint = |a: usize, b: usize, positions: &mut Vec<Vec3>| -> usize {
            *midpoints.entry(edge_key(a, b)).or_insert_with(|| {
                let m = ((positions[a] + positions[b]) * 0.5).normalize();
                positions.push(m);
                positions.len() - 1
            })
        };

        let ab = midpoint(a, b, positions);
        let bc = midpoint(b, c, positions);
        let ca = midpoint(c, a, positions);

        out.push([a, ab, ca]);
        out.push([b, bc, ab]);
        out.push([c, ca, bc]);
        out.push([ab, bc, ca]);
    }

    out
}

/// Triangle outlines of an icosphere: each face becomes one closed 3-vertex
/// outline, ready for `PathCollection::add_outlines`. `levels = 0` is the
/// bare icosahedron (20 outlines); each level quadruples the face count.
pub fn icosphere_outlines(radius: f32, levels: u32) -> Vec<Vec<Vec3>> {
    let (mut positions, mut faces) = icosahedron();
    for _ in 0..levels {
        faces = subdivide_triangles(&mut positions, &faces);
    }

    faces
        .iter()
        .map(|&[a, b, c]| {
            vec![
                positions[a] * radius,
                positions[b] * radius,
                positions[c] * radius,
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spiral_stays_on_the_sphere() {
        let verts = archimedean_sphere(4000, 100.0, 20);
        assert!(verts.len() >= 3000);
        for v in &verts {
            assert!((v.length() - 100.0).abs() < 1e-2, "off-sphere vertex {v}");
        }
    }

    #[test]
    fn spiral_vertices_are_finely_spaced() {
        let verts = archimedean_sphere(4000, 100.0, 20);
        let max_gap = verts
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .fold(0.0f32, f32::max);
        // Dense enough to steer along without resampling.
        assert!(max_gap < 15.0, "largest gap {max_gap}");
    }

    #[test]
    fn icosphere_face_counts_quadruple() {
        assert_eq!(icosphere_outlines(1.0, 0).len(), 20);
        assert_eq!(icosphere_outlines(1.0, 1).len(), 80);
        assert_eq!(icosphere_outlines(1.0, 2).len(), 320);
    }

    #[test]
    fn icosphere_outlines_sit_on_the_sphere() {
        for outline in icosphere_outlines(180.0, 1) {
            assert_eq!(outline.len(), 3);
            for v in outline {
                assert!((v.length() - 180.0).abs() < 1e-2);
            }
        }
    }
}

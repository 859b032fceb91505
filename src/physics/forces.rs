use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;
use crate::graph::{Link, Node};

/// Stand-in separation for coincident points.
const COINCIDENT_EPSILON: f32 = 1e-3;
/// Squared distances below this are softened in the charge force.
const CHARGE_DISTANCE_MIN_SQ: f32 = 1.0;

/// Deterministic unit direction for a pair of coincident points. Swapping
/// the arguments flips the direction, so the pair is pushed apart.
pub(super) fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let (low, high) = if from <= to { (from, to) } else { (to, from) };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if from <= to { direction } else { -direction }
}

pub(super) fn apply_link(
    nodes: &mut [Node],
    links: &[Link],
    degrees: &[usize],
    distance: f32,
    alpha: f32,
) {
    for link in links {
        if link.is_self_loop() {
            continue;
        }
        let (source, target) = (link.source, link.target);
        let source_degree = degrees[source].max(1) as f32;
        let target_degree = degrees[target].max(1) as f32;
        let strength = 1.0 / source_degree.min(target_degree);
        let bias = source_degree / (source_degree + target_degree);

        let mut delta = (nodes[target].pos + nodes[target].velocity)
            - (nodes[source].pos + nodes[source].velocity);
        if delta.length_sq() < COINCIDENT_EPSILON * COINCIDENT_EPSILON {
            delta = fallback_direction(source, target) * COINCIDENT_EPSILON;
        }
        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * strength);

        nodes[target].velocity -= correction * bias;
        nodes[source].velocity += correction * (1.0 - bias);
    }
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Signed strength already scaled by alpha; negative repels.
    pub(super) strength: f32,
    pub(super) theta: f32,
}

fn charge_between(point: Vec2, other: Vec2, from: usize, to: usize, strength: f32) -> Vec2 {
    let mut delta = other - point;
    let mut distance_sq = delta.length_sq();
    if distance_sq < COINCIDENT_EPSILON * COINCIDENT_EPSILON {
        delta = fallback_direction(from, to) * COINCIDENT_EPSILON;
        distance_sq = COINCIDENT_EPSILON * COINCIDENT_EPSILON;
    }
    if distance_sq < CHARGE_DISTANCE_MIN_SQ {
        distance_sq = (CHARGE_DISTANCE_MIN_SQ * distance_sq).sqrt();
    }
    delta * (strength / distance_sq)
}

pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *velocity += charge_between(
                point,
                positions[other_index],
                index,
                other_index,
                params.strength,
            );
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance_sq = delta.length_sq().max(CHARGE_DISTANCE_MIN_SQ);
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance_sq.sqrt()) < params.theta
        && node.mass > 1.0;

    if can_approximate {
        *velocity += delta * (params.strength * node.mass / distance_sq);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge_for_node(child, index, positions, params, velocity);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) max_collision_distance_sq: f32,
}

fn separate_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    strength: f32,
    impulses: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let mut delta = positions[from] - positions[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }
    if distance_sq < COINCIDENT_EPSILON * COINCIDENT_EPSILON {
        delta = fallback_direction(from, to) * COINCIDENT_EPSILON;
    }

    let distance = delta.length();
    let push = delta * ((reach - distance) / distance * strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = to_sq / (from_sq + to_sq);

    impulses[from] += push * share;
    impulses[to] -= push * (1.0 - share);
}

/// Visits every pair of leaves close enough to overlap, separating any
/// discs that intersect.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    impulses: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_collision_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    separate_pair(from, to, positions, radii, params.strength, impulses);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    separate_pair(from, to, positions, radii, params.strength, impulses);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_deref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, impulses);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_deref() else {
                    continue;
                };
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, impulses,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, impulses);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, impulses);
        }
    }
}

pub(super) fn apply_radial(
    nodes: &mut [Node],
    center: Vec2,
    radii: &[f32],
    strength: f32,
    alpha: f32,
) {
    for (index, node) in nodes.iter_mut().enumerate() {
        let Some(&target_radius) = radii.get(index) else {
            continue;
        };
        let mut delta = node.pos - center;
        if delta.length_sq() < COINCIDENT_EPSILON * COINCIDENT_EPSILON {
            delta = fallback_direction(index, usize::MAX) * COINCIDENT_EPSILON;
        }
        let radius = delta.length();
        node.velocity += delta * ((target_radius - radius) * strength * alpha / radius);
    }
}

pub(super) fn apply_center(nodes: &mut [Node], target: Vec2, strength: f32) {
    if nodes.is_empty() {
        return;
    }
    let centroid = nodes.iter().fold(Vec2::ZERO, |acc, node| acc + node.pos) / nodes.len() as f32;
    let shift = (centroid - target) * strength;
    for node in nodes {
        node.pos -= shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_direction_is_antisymmetric_unit() {
        let forward = fallback_direction(3, 7);
        let backward = fallback_direction(7, 3);
        assert!((forward.length() - 1.0).abs() < 1e-5);
        assert!((forward + backward).length() < 1e-6);
    }

    #[test]
    fn test_charge_between_coincident_points_is_finite() {
        let push = charge_between(vec2(1.0, 1.0), vec2(1.0, 1.0), 0, 1, -300.0);
        assert!(push.is_finite());
        assert!(push.length() > 0.0);
        let opposite = charge_between(vec2(1.0, 1.0), vec2(1.0, 1.0), 1, 0, -300.0);
        assert!((push + opposite).length() < 1e-3);
    }

    #[test]
    fn test_negative_charge_pushes_away() {
        let push = charge_between(vec2(0.0, 0.0), vec2(10.0, 0.0), 0, 1, -300.0);
        assert!(push.x < 0.0);
        assert!((push.x + 30.0).abs() < 1e-3);
    }

    /// Deterministic pseudo-random points in a 1000x1000 square.
    fn scattered_points(count: usize) -> Vec<Vec2> {
        let mut state = 0x2545_f491_4f6c_dd1d_u64;
        let mut next = || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 40) as f32 / (1u64 << 24) as f32 * 1000.0
        };
        (0..count).map(|_| vec2(next(), next())).collect()
    }

    fn tree_depth(node: &QuadNode) -> usize {
        1 + node
            .children
            .iter()
            .flatten()
            .map(|child| tree_depth(child))
            .max()
            .unwrap_or(0)
    }

    fn brute_force_charge(positions: &[Vec2], index: usize, strength: f32) -> Vec2 {
        (0..positions.len())
            .filter(|&other| other != index)
            .fold(Vec2::ZERO, |acc, other| {
                acc + charge_between(positions[index], positions[other], index, other, strength)
            })
    }

    fn tree_charge(tree: &QuadNode, positions: &[Vec2], index: usize, theta: f32) -> Vec2 {
        let mut velocity = Vec2::ZERO;
        let params = ChargeParams {
            strength: -300.0,
            theta,
        };
        accumulate_charge_for_node(tree, index, positions, params, &mut velocity);
        velocity
    }

    #[test]
    fn test_charge_traversal_of_deep_tree_matches_pairwise_sum() {
        let positions = scattered_points(200);
        let tree = QuadNode::build(&positions).unwrap();
        assert!(tree_depth(&tree) >= 3);

        for index in 0..positions.len() {
            let exact = brute_force_charge(&positions, index, -300.0);
            let traversed = tree_charge(&tree, &positions, index, 0.0);
            assert!(
                (traversed - exact).length() <= 1e-3 * exact.length().max(1.0),
                "node {index}: {traversed:?} vs {exact:?}"
            );
        }
    }

    #[test]
    fn test_charge_approximation_stays_close_to_pairwise_sum() {
        let positions = scattered_points(200);
        let tree = QuadNode::build(&positions).unwrap();

        let mut error = 0.0;
        let mut total = 0.0;
        for index in 0..positions.len() {
            let exact = brute_force_charge(&positions, index, -300.0);
            let approximated = tree_charge(&tree, &positions, index, 0.9);
            assert!(approximated.is_finite());
            error += (approximated - exact).length();
            total += exact.length();
        }
        assert!(error <= 0.05 * total, "error {error} of {total}");
    }

    #[test]
    fn test_collision_traversal_of_deep_tree_matches_pairwise_pass() {
        let positions = scattered_points(200);
        let radii = vec![30.0; positions.len()];
        let tree = QuadNode::build(&positions).unwrap();
        assert!(tree_depth(&tree) >= 3);

        let mut expected = vec![Vec2::ZERO; positions.len()];
        for from in 0..positions.len() {
            for to in (from + 1)..positions.len() {
                separate_pair(from, to, &positions, &radii, 1.0, &mut expected);
            }
        }
        assert!(expected.iter().any(|impulse| impulse.length() > 0.0));

        let mut impulses = vec![Vec2::ZERO; positions.len()];
        let params = CollisionParams {
            strength: 1.0,
            max_collision_distance_sq: 60.0 * 60.0,
        };
        accumulate_collision_pairs(&tree, &tree, true, &positions, &radii, params, &mut impulses);

        for (index, (got, want)) in impulses.iter().zip(&expected).enumerate() {
            assert!(
                (*got - *want).length() <= 1e-3 * want.length().max(1.0),
                "node {index}: {got:?} vs {want:?}"
            );
        }
    }

    #[test]
    fn test_separate_pair_splits_overlap_evenly() {
        let positions = vec![vec2(0.0, 0.0), vec2(60.0, 0.0)];
        let radii = vec![50.0, 50.0];
        let mut impulses = vec![Vec2::ZERO; 2];
        separate_pair(0, 1, &positions, &radii, 1.0, &mut impulses);
        assert!((impulses[0].x + 20.0).abs() < 1e-3);
        assert!((impulses[1].x - 20.0).abs() < 1e-3);
    }
}

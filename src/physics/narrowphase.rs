//! Narrowphase collision detection.
//!
//! Shape pairs are dispatched through an explicit test matrix over the
//! [`ColliderShape`] variants: sphere-sphere, box-box (SAT), and box-sphere
//! with its mirror. Every test reports the contact normal pointing from
//! shape A toward shape B.

use glam::{Mat3, Quat, Vec3};

use crate::ecs::components::physics::ColliderShape;

use super::contact::ContactInfo;

/// Detect collision between two shapes at the given poses.
pub fn detect_collision(
    shape_a: &ColliderShape,
    pos_a: Vec3,
    rot_a: Quat,
    shape_b: &ColliderShape,
    pos_b: Vec3,
    rot_b: Quat,
) -> Option<ContactInfo> {
    match (shape_a, shape_b) {
        (ColliderShape::Sphere { radius: ra }, ColliderShape::Sphere { radius: rb }) => {
            sphere_sphere(*ra, pos_a, *rb, pos_b)
        }
        (
            ColliderShape::Box {
                half_extents: half_a,
            },
            ColliderShape::Box {
                half_extents: half_b,
            },
        ) => sat_box_box(*half_a, pos_a, rot_a, *half_b, pos_b, rot_b),
        (ColliderShape::Box { half_extents }, ColliderShape::Sphere { radius }) => {
            box_sphere(*half_extents, pos_a, rot_a, *radius, pos_b)
        }
        (ColliderShape::Sphere { radius }, ColliderShape::Box { half_extents }) => {
            // Swap and flip the normal back to A -> B.
            let mut info = box_sphere(*half_extents, pos_b, rot_b, *radius, pos_a)?;
            info.normal = -info.normal;
            Some(info)
        }
    }
}

/// Specialized sphere-sphere intersection test.
#[inline]
pub fn sphere_sphere(radius_a: f32, center_a: Vec3, radius_b: f32, center_b: Vec3) -> Option<ContactInfo> {
    let diff = center_b - center_a;
    let dist_sq = diff.length_squared();
    let min_dist = radius_a + radius_b;

    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-6 { diff / dist } else { Vec3::Y };

    let penetration = min_dist - dist;
    let point = center_a + normal * (radius_a - penetration * 0.5);

    Some(ContactInfo {
        normal,
        penetration,
        point,
    })
}

/// SAT (Separating Axis Theorem) test for box-box collision.
#[inline]
pub fn sat_box_box(
    half_a: Vec3,
    center_a: Vec3,
    rot_a: Quat,
    half_b: Vec3,
    center_b: Vec3,
    rot_b: Quat,
) -> Option<ContactInfo> {
    let mat_a = Mat3::from_quat(rot_a);
    let mat_b = Mat3::from_quat(rot_b);
    let axes_a = [mat_a.x_axis, mat_a.y_axis, mat_a.z_axis];
    let axes_b = [mat_b.x_axis, mat_b.y_axis, mat_b.z_axis];

    let half_a_arr = [half_a.x, half_a.y, half_a.z];
    let half_b_arr = [half_b.x, half_b.y, half_b.z];

    let t = center_b - center_a;

    let mut min_overlap = f32::MAX;
    let mut best_axis = Vec3::ZERO;

    // Test 15 axes: 3 from A, 3 from B, 9 cross products.
    for axis in axes_a {
        match sat_test_axis(axis, &axes_a, &half_a_arr, &axes_b, &half_b_arr, t) {
            Some(overlap) if overlap < min_overlap => {
                min_overlap = overlap;
                best_axis = axis;
            }
            Some(_) => {}
            None => return None,
        }
    }

    for axis in axes_b {
        match sat_test_axis(axis, &axes_a, &half_a_arr, &axes_b, &half_b_arr, t) {
            Some(overlap) if overlap < min_overlap => {
                min_overlap = overlap;
                best_axis = axis;
            }
            Some(_) => {}
            None => return None,
        }
    }

    for a in axes_a {
        for b in axes_b {
            let axis = a.cross(b);
            let len = axis.length();
            if len < 1e-6 {
                continue; // Parallel edges
            }
            let axis = axis / len;
            match sat_test_axis(axis, &axes_a, &half_a_arr, &axes_b, &half_b_arr, t) {
                Some(overlap) if overlap < min_overlap => {
                    min_overlap = overlap;
                    best_axis = axis;
                }
                Some(_) => {}
                None => return None,
            }
        }
    }

    // Ensure the normal points from A to B.
    if best_axis.dot(t) < 0.0 {
        best_axis = -best_axis;
    }

    // Projections of both boxes onto the separating axis.
    let proj_a_on_axis = half_a_arr[0] * axes_a[0].dot(best_axis).abs()
        + half_a_arr[1] * axes_a[1].dot(best_axis).abs()
        + half_a_arr[2] * axes_a[2].dot(best_axis).abs();
    let proj_b_on_axis = half_b_arr[0] * axes_b[0].dot(best_axis).abs()
        + half_b_arr[1] * axes_b[1].dot(best_axis).abs()
        + half_b_arr[2] * axes_b[2].dot(best_axis).abs();

    // Contact depth along the axis: midpoint between the two closest faces.
    let face_a = center_a.dot(best_axis) + proj_a_on_axis;
    let face_b = center_b.dot(best_axis) - proj_b_on_axis;
    let contact_d = (face_a + face_b) * 0.5;

    // Use the smaller body's center for the lateral position, projected onto
    // the contact plane along the axis.
    let ref_center = if proj_a_on_axis > proj_b_on_axis {
        center_b
    } else {
        center_a
    };
    let point = ref_center + best_axis * (contact_d - ref_center.dot(best_axis));

    Some(ContactInfo {
        normal: best_axis,
        penetration: min_overlap,
        point,
    })
}

/// Test a single SAT axis. Returns Some(overlap) if overlapping, None if separating.
#[inline]
fn sat_test_axis(
    axis: Vec3,
    axes_a: &[Vec3; 3],
    half_a: &[f32; 3],
    axes_b: &[Vec3; 3],
    half_b: &[f32; 3],
    t: Vec3,
) -> Option<f32> {
    let mut proj_a = 0.0f32;
    for i in 0..3 {
        proj_a += half_a[i] * axes_a[i].dot(axis).abs();
    }
    let mut proj_b = 0.0f32;
    for i in 0..3 {
        proj_b += half_b[i] * axes_b[i].dot(axis).abs();
    }

    let dist = t.dot(axis).abs();
    let overlap = proj_a + proj_b - dist;

    if overlap > 0.0 {
        Some(overlap)
    } else {
        None
    }
}

/// Specialized box-sphere intersection test. The normal points from the box
/// toward the sphere.
#[inline]
pub fn box_sphere(
    half_extents: Vec3,
    box_center: Vec3,
    box_rot: Quat,
    radius: f32,
    sphere_center: Vec3,
) -> Option<ContactInfo> {
    let mat = Mat3::from_quat(box_rot);
    let box_axes = [mat.x_axis, mat.y_axis, mat.z_axis];

    // Project the sphere center into the box's local space.
    let diff = sphere_center - box_center;
    let local = Vec3::new(
        diff.dot(box_axes[0]),
        diff.dot(box_axes[1]),
        diff.dot(box_axes[2]),
    );

    // Clamp to box extents to find the closest point on the box.
    let clamped = local.clamp(-half_extents, half_extents);

    let closest_world =
        box_center + box_axes[0] * clamped.x + box_axes[1] * clamped.y + box_axes[2] * clamped.z;

    let to_sphere = sphere_center - closest_world;
    let dist_sq = to_sphere.length_squared();

    if dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();

    // Sphere center inside the box: push out along the axis of least
    // penetration.
    if dist < 1e-6 {
        let mut min_pen = f32::MAX;
        let mut normal = Vec3::Y;
        for i in 0..3 {
            let pen_pos = half_extents[i] - local[i];
            let pen_neg = half_extents[i] + local[i];
            if pen_pos < min_pen {
                min_pen = pen_pos;
                normal = box_axes[i];
            }
            if pen_neg < min_pen {
                min_pen = pen_neg;
                normal = -box_axes[i];
            }
        }
        let penetration = min_pen + radius;
        let point = sphere_center - normal * radius;
        return Some(ContactInfo {
            normal,
            penetration,
            point,
        });
    }

    let normal = to_sphere / dist;
    let penetration = radius - dist;
    let point = closest_world;

    Some(ContactInfo {
        normal,
        penetration,
        point,
    })
}

use glam::{Mat4, Vec3};

/// Maps a normalized device coordinate back to world space.
///
/// `ndc.z` uses the `[0, 1]` depth range: `0` lands on the near plane, `1` on
/// the far plane.
pub fn unproject_point(ndc: Vec3, view: Mat4, projection: Mat4) -> Vec3 {
    let view_inv = view.inverse();
    let projection_inv = projection.inverse();
    let world = view_inv * projection_inv * ndc.extend(1.0);
    world.truncate() / world.w
}

/// Forward transform: world space to normalized device coordinates.
pub fn project_point(world: Vec3, view: Mat4, projection: Mat4) -> Vec3 {
    let clip = projection * view * world.extend(1.0);
    clip.truncate() / clip.w
}

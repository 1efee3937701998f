use glam::{Vec2, Vec3, Vec4};

use super::neighborhood::Neighborhood;
use super::uniforms::FrameUniforms;
use super::unproject::{project_point, unproject_point};

/// Appearance parameters of the ground grid.
///
/// `Default` reproduces the reference look: a 0.1-unit and a 1-unit grid in
/// dark grey, axis bands at a tenth of the line footprint, fade reaching zero
/// at half the normalized linear depth.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridStyle {
    /// Coordinate multipliers, one grid pass each. Results are summed.
    pub scales: [f32; 2],

    /// RGB of regular grid lines.
    pub line_color: Vec3,

    /// Half-width of the axis highlight band, in units of the clamped
    /// line footprint.
    pub axis_band: f32,

    /// Normalized linear depth at which the grid is fully faded out.
    pub fade_offset: f32,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            scales: [10.0, 1.0],
            line_color: Vec3::splat(0.2),
            axis_band: 0.1,
            fade_offset: 0.5,
        }
    }
}

/// Vertex-to-fragment interpolants of the grid pipeline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridVaryings {
    pub clip_position: Vec4,
    /// World point where this pixel's view ray crosses the near plane.
    pub near_point: Vec3,
    /// World point where this pixel's view ray crosses the far plane.
    pub far_point: Vec3,
}

/// Grid fragment output: straight-alpha color and explicit depth.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridFragment {
    pub color: Vec4,
    pub depth: f32,
}

/// Result of intersecting a view ray with the `y = 0` plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GroundHit {
    /// Ray parameter; the plane is visible only when `t > 0`.
    pub t: f32,
    pub position: Vec3,
}

impl GroundHit {
    #[inline]
    pub fn is_visible(self) -> bool {
        self.t > 0.0
    }
}

/// Grid vertex stage. `position` is a full-screen quad corner in NDC.
pub fn grid_vertex(position: Vec2, uniforms: &FrameUniforms) -> GridVaryings {
    let near_point = unproject_point(position.extend(0.0), uniforms.view, uniforms.projection);
    let far_point = unproject_point(position.extend(1.0), uniforms.view, uniforms.projection);
    GridVaryings {
        clip_position: Vec4::new(position.x, position.y, 0.0, 1.0),
        near_point,
        far_point,
    }
}

/// Intersects the ray `near -> far` with the ground plane.
///
/// A parallel ray divides by zero; the resulting non-finite `t` fails the
/// visibility test.
pub fn intersect_ground(near_point: Vec3, far_point: Vec3) -> GroundHit {
    let t = -near_point.y / (far_point.y - near_point.y);
    GroundHit {
        t,
        position: near_point + t * (far_point - near_point),
    }
}

// GLSL/WGSL `fract`, not glam's trunc-based one.
#[inline]
fn fract(v: Vec2) -> Vec2 {
    v - v.floor()
}

/// Per-axis distance to the nearest grid line, in line footprints.
///
/// `coord` is the scaled ground-plane coordinate and `derivative` its
/// `fwidth`. Zero on a line center.
pub fn grid_distance(coord: Vec2, derivative: Vec2) -> Vec2 {
    (fract(coord - 0.5) - 0.5).abs() / derivative
}

/// One anti-aliased grid pass at `scale`.
///
/// Returns straight-alpha RGBA. Fragments within the axis band of `x = 0`
/// get full blue (the z axis), within the band of `z = 0` full red (the x
/// axis).
pub fn grid_pattern(positions: &Neighborhood<Vec3>, scale: f32, style: &GridStyle) -> Vec4 {
    let coords = positions.map(|p| Vec2::new(p.x, p.z) * scale);
    let derivative = coords.fwidth();
    let grid = grid_distance(coords.origin, derivative);
    let line = grid.x.min(grid.y);

    let minimum_z = derivative.y.min(1.0);
    let minimum_x = derivative.x.min(1.0);

    let mut color = style.line_color.extend(1.0 - line.min(1.0));

    let pos = positions.origin;
    let band_x = style.axis_band * minimum_x;
    let band_z = style.axis_band * minimum_z;
    if pos.x > -band_x && pos.x < band_x {
        color.z = 1.0;
    }
    if pos.z > -band_z && pos.z < band_z {
        color.x = 1.0;
    }
    color
}

/// Depth-buffer value of a world point (`clip.z / clip.w`, `[0, 1]` range).
pub fn compute_depth(position: Vec3, uniforms: &FrameUniforms) -> f32 {
    project_point(position, uniforms.view, uniforms.projection).z
}

/// Linearized depth of a world point, normalized by `far`.
pub fn compute_linear_depth(position: Vec3, uniforms: &FrameUniforms) -> f32 {
    let (near, far) = (uniforms.near, uniforms.far);
    let clip_depth = compute_depth(position, uniforms) * 2.0 - 1.0;
    let linear_depth = (2.0 * near * far) / (far + near - clip_depth * (far - near));
    linear_depth / far
}

/// Alpha multiplier; non-increasing in `linear_depth`, zero from `fade_offset` on.
#[inline]
pub fn distance_fade(linear_depth: f32, fade_offset: f32) -> f32 {
    (fade_offset - linear_depth).max(0.0)
}

/// Grid fragment stage.
///
/// Depth is always computed. Color is forced to transparent black when the
/// ground plane is not in front of the camera; the gate is a select on the
/// finished color so non-finite values from a parallel ray cannot leak.
pub fn grid_fragment(
    varyings: &Neighborhood<GridVaryings>,
    uniforms: &FrameUniforms,
    style: &GridStyle,
) -> GridFragment {
    let hits = varyings.map(|v| intersect_ground(v.near_point, v.far_point));
    let hit = hits.origin;
    let positions = hits.map(|h| h.position);

    let depth = compute_depth(hit.position, uniforms);
    let fading = distance_fade(compute_linear_depth(hit.position, uniforms), style.fade_offset);

    let mut color = Vec4::ZERO;
    for scale in style.scales {
        color += grid_pattern(&positions, scale, style);
    }
    color.w *= fading;

    GridFragment {
        color: if hit.is_visible() { color } else { Vec4::ZERO },
        depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use glam::Mat4;

    fn fixed_footprint(origin: Vec3, step: f32) -> Neighborhood<Vec3> {
        Neighborhood::new(origin, origin + Vec3::X * step, origin + Vec3::Z * step)
    }

    fn top_down() -> (FrameUniforms, Viewport) {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, Vec3::NEG_Z);
        let projection = Mat4::perspective_rh(45f32.to_radians(), 1.0, 0.1, 100.0);
        (FrameUniforms::new(view, projection, 0.1, 100.0), Viewport::new(800.0, 800.0))
    }

    fn fragment_at(px: f32, py: f32, uniforms: &FrameUniforms, viewport: Viewport) -> GridFragment {
        let varyings = Neighborhood::sample(px, py, |x, y| {
            grid_vertex(viewport.pixel_to_ndc(x, y), uniforms)
        });
        grid_fragment(&varyings, uniforms, &GridStyle::default())
    }

    // ── intersection ──────────────────────────────────────────────────────

    #[test]
    fn ray_from_above_hits_plane_ahead() {
        let hit = intersect_ground(Vec3::new(1.0, 4.0, 2.0), Vec3::new(1.0, -4.0, 2.0));
        assert_eq!(hit.t, 0.5);
        assert_eq!(hit.position, Vec3::new(1.0, 0.0, 2.0));
        assert!(hit.is_visible());
    }

    #[test]
    fn ray_pointing_up_is_not_visible() {
        let hit = intersect_ground(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 5.0, -3.0));
        assert!(hit.t < 0.0);
        assert!(!hit.is_visible());
    }

    #[test]
    fn parallel_ray_is_not_visible() {
        assert!(!intersect_ground(Vec3::new(0.0, 2.0, 0.0), Vec3::new(5.0, 2.0, -5.0)).is_visible());
        assert!(!intersect_ground(Vec3::new(0.0, 0.0, 0.0), Vec3::new(5.0, 0.0, -5.0)).is_visible());
    }

    // ── pattern ───────────────────────────────────────────────────────────

    #[test]
    fn integer_coordinates_sit_on_line_centers() {
        for (n, m) in [(0.0, 0.0), (3.0, -2.0), (-7.0, 11.0)] {
            let d = grid_distance(Vec2::new(n, m), Vec2::splat(0.02));
            assert_eq!(d, Vec2::ZERO);
        }

        let color = grid_pattern(&fixed_footprint(Vec3::new(4.0, 0.0, -6.0), 0.01), 1.0, &GridStyle::default());
        assert_eq!(color.w, 1.0);
    }

    #[test]
    fn alpha_falls_off_between_lines() {
        let style = GridStyle::default();
        let mid = grid_pattern(&fixed_footprint(Vec3::new(0.5, 0.0, 2.5), 0.01), 1.0, &style);
        assert_eq!(mid.w, 0.0);

        // Half a footprint away from a line: half coverage.
        let edge = grid_pattern(&fixed_footprint(Vec3::new(3.005, 0.0, 2.5), 0.01), 1.0, &style);
        assert!((edge.w - 0.5).abs() < 1e-3, "{edge:?}");
    }

    #[test]
    fn line_width_tracks_footprint() {
        let style = GridStyle::default();
        let fine = grid_pattern(&fixed_footprint(Vec3::new(2.02, 0.0, 0.5), 0.01), 1.0, &style);
        let coarse = grid_pattern(&fixed_footprint(Vec3::new(2.02, 0.0, 0.5), 0.1), 1.0, &style);
        assert_eq!(fine.w, 0.0);
        assert!(coarse.w > 0.0);
    }

    #[test]
    fn x_near_zero_tints_blue() {
        let style = GridStyle::default();
        // footprint 0.01 at scale 1 -> band of +-0.001
        let inside = grid_pattern(&fixed_footprint(Vec3::new(0.0005, 0.0, 3.3), 0.01), 1.0, &style);
        assert_eq!(inside.z, 1.0);
        assert_eq!(inside.x, style.line_color.x);

        let outside = grid_pattern(&fixed_footprint(Vec3::new(0.002, 0.0, 3.3), 0.01), 1.0, &style);
        assert_eq!(outside.z, style.line_color.z);
    }

    #[test]
    fn z_near_zero_tints_red() {
        let style = GridStyle::default();
        let inside = grid_pattern(&fixed_footprint(Vec3::new(3.3, 0.0, -0.0005), 0.01), 1.0, &style);
        assert_eq!(inside.x, 1.0);
        assert_eq!(inside.z, style.line_color.z);
    }

    #[test]
    fn axis_band_is_clamped_for_large_footprints() {
        let style = GridStyle::default();
        // footprint 5 clamps to 1 -> band of +-0.1
        let inside = grid_pattern(&fixed_footprint(Vec3::new(0.09, 0.0, 3.3), 5.0), 1.0, &style);
        let outside = grid_pattern(&fixed_footprint(Vec3::new(0.11, 0.0, 3.3), 5.0), 1.0, &style);
        assert_eq!(inside.z, 1.0);
        assert_ne!(outside.z, 1.0);
    }

    // ── depth + fade ──────────────────────────────────────────────────────

    #[test]
    fn fade_is_monotone_and_reaches_zero() {
        let mut prev = f32::INFINITY;
        for i in 0..=100 {
            let d = i as f32 / 100.0;
            let f = distance_fade(d, 0.5);
            assert!(f <= prev);
            if d >= 0.5 {
                assert_eq!(f, 0.0);
            }
            prev = f;
        }
        assert_eq!(distance_fade(0.0, 0.5), 0.5);
    }

    #[test]
    fn depth_matches_forward_projection() {
        let (uniforms, _) = top_down();
        let p = Vec3::new(1.0, 0.0, -2.0);
        let expected = project_point(p, uniforms.view, uniforms.projection).z;
        assert_eq!(compute_depth(p, &uniforms), expected);
        assert!((0.0..=1.0).contains(&expected));
    }

    #[test]
    fn linear_depth_grows_with_distance() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, -1.0), Vec3::Y);
        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
        let uniforms = FrameUniforms::new(view, projection, 0.1, 100.0);

        let mut prev = f32::NEG_INFINITY;
        for z in [1.0, 2.0, 5.0, 20.0, 80.0] {
            let d = compute_linear_depth(Vec3::new(0.0, 0.0, -z), &uniforms);
            assert!(d > prev, "{z}: {d} <= {prev}");
            prev = d;
        }
    }

    #[test]
    fn linear_depth_is_view_distance_over_far() {
        // Looking down -Z from above the plane: view depth of (0, 0, -z) is z.
        let view = Mat4::look_at_rh(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, 3.0, -1.0), Vec3::Y);
        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
        let uniforms = FrameUniforms::new(view, projection, 0.1, 100.0);

        for z in [0.5, 10.0, 50.0, 90.0] {
            let d = compute_linear_depth(Vec3::new(0.0, 0.0, -z), &uniforms);
            assert!((d - z / uniforms.far).abs() < 1e-4, "{z}: {d}");
        }
    }

    // ── full fragment ─────────────────────────────────────────────────────

    #[test]
    fn ray_starting_on_plane_is_masked_but_keeps_depth() {
        let start_on_plane = GridVaryings {
            clip_position: Vec4::W,
            near_point: Vec3::ZERO,
            far_point: Vec3::new(0.0, -5.0, -5.0),
        };
        let hit = intersect_ground(start_on_plane.near_point, start_on_plane.far_point);
        assert_eq!(hit.t, 0.0);
        assert!(!hit.is_visible());

        let uniforms = top_down().0;
        let frag = grid_fragment(&Neighborhood::constant(start_on_plane), &uniforms, &GridStyle::default());
        assert_eq!(frag.color, Vec4::ZERO);
        assert!(frag.depth.is_finite());
        assert_eq!(frag.depth, compute_depth(Vec3::ZERO, &uniforms));
    }

    #[test]
    fn top_down_center_shows_both_axes() {
        let (uniforms, viewport) = top_down();
        let frag = fragment_at(400.0, 400.0, &uniforms, viewport);
        assert!(frag.color.x >= 1.0, "{:?}", frag.color);
        assert!(frag.color.z >= 1.0, "{:?}", frag.color);
        assert!(frag.color.w > 0.0);
        assert!((0.0..1.0).contains(&frag.depth));
    }

    #[test]
    fn camera_below_plane_outputs_transparent() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, -3.0, 0.0), Vec3::new(0.0, -10.0, 0.0), Vec3::NEG_Z);
        let projection = Mat4::perspective_rh(45f32.to_radians(), 1.0, 0.1, 100.0);
        let uniforms = FrameUniforms::new(view, projection, 0.1, 100.0);
        let frag = fragment_at(400.0, 400.0, &uniforms, Viewport::new(800.0, 800.0));
        assert_eq!(frag.color, Vec4::ZERO);
    }

    #[test]
    fn parallel_rays_output_transparent() {
        let flat = GridVaryings {
            clip_position: Vec4::W,
            near_point: Vec3::new(0.0, 2.0, 0.0),
            far_point: Vec3::new(0.0, 2.0, -50.0),
        };
        let uniforms = top_down().0;
        let frag = grid_fragment(&Neighborhood::constant(flat), &uniforms, &GridStyle::default());
        assert_eq!(frag.color, Vec4::ZERO);

        let on_plane = GridVaryings {
            near_point: Vec3::ZERO,
            far_point: Vec3::new(3.0, 0.0, -50.0),
            ..flat
        };
        let frag = grid_fragment(&Neighborhood::constant(on_plane), &uniforms, &GridStyle::default());
        assert_eq!(frag.color, Vec4::ZERO);
    }

    #[test]
    fn horizon_is_faded_out() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.9, -10.0), Vec3::Y);
        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
        let uniforms = FrameUniforms::new(view, projection, 0.1, 100.0);
        let viewport = Viewport::new(512.0, 512.0);

        // Just below the center row the ray meets the plane far away.
        let far = fragment_at(256.0, 257.0, &uniforms, viewport);
        assert_eq!(far.color.w, 0.0);

        // Bottom row looks steeply down; close to the camera.
        let near = fragment_at(256.0, 510.0, &uniforms, viewport);
        assert!(near.depth < far.depth);
    }
}

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::render::MeshVertex;

use super::neighborhood::Neighborhood;
use super::uniforms::FrameUniforms;

/// Lower bound of the diffuse term, whatever the light direction.
pub const AMBIENT_FLOOR: f32 = 0.5;

/// Source of the shading normal.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum NormalMode {
    /// Flat per-triangle normal from screen-space derivatives of the world
    /// position. Needs no vertex normals; faceted, unreliable on silhouettes.
    #[default]
    ScreenDerivative,
    /// Interpolated vertex normal, transformed by the model matrix.
    Vertex,
}

impl NormalMode {
    pub fn toggled(self) -> Self {
        match self {
            NormalMode::ScreenDerivative => NormalMode::Vertex,
            NormalMode::Vertex => NormalMode::ScreenDerivative,
        }
    }

    /// Value of the `normal_mode` field in the shader's uniform block.
    pub fn as_gpu(self) -> u32 {
        match self {
            NormalMode::ScreenDerivative => 0,
            NormalMode::Vertex => 1,
        }
    }
}

/// Per-object uniforms of the lighting pipeline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LitUniforms {
    pub model: Mat4,
    /// World position of the single point light.
    pub light_position: Vec3,
    pub normal_mode: NormalMode,
}

impl Default for LitUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            light_position: Vec3::ZERO,
            normal_mode: NormalMode::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LitVaryings {
    pub clip_position: Vec4,
    /// World-space position.
    pub frag_pos: Vec3,
    pub color: Vec4,
    pub uv: Vec2,
    /// World-space vertex normal, not normalized.
    pub normal: Vec3,
}

/// Lighting vertex stage.
pub fn lit_vertex(vertex: &MeshVertex, frame: &FrameUniforms, object: &LitUniforms) -> LitVaryings {
    let world = object.model * Vec3::from(vertex.position).extend(1.0);
    LitVaryings {
        clip_position: frame.view_projection() * world,
        frag_pos: world.truncate(),
        color: Vec4::from(vertex.color),
        uv: Vec2::from(vertex.uv),
        normal: Mat3::from_mat4(object.model) * Vec3::from(vertex.normal),
    }
}

/// Flat normal from the screen-space derivatives of world position.
///
/// Framebuffer Y grows downward, so `fdy x fdx` is the side facing the
/// camera for counter-clockwise front faces.
pub fn estimate_normal(fdx: Vec3, fdy: Vec3) -> Vec3 {
    fdy.cross(fdx).normalize()
}

/// Clamped, floor-biased Lambert term. Always within `[AMBIENT_FLOOR, 1]`
/// for finite inputs.
pub fn diffuse_term(normal: Vec3, frag_pos: Vec3, light_position: Vec3) -> f32 {
    let light_dir = (light_position - frag_pos).normalize();
    (normal.dot(light_dir).max(0.0) + AMBIENT_FLOOR).clamp(0.0, 1.0)
}

/// Lighting fragment stage. `texel` is the texture sample at `varyings.origin.uv`.
pub fn lit_fragment(varyings: &Neighborhood<LitVaryings>, texel: Vec4, object: &LitUniforms) -> Vec4 {
    let here = &varyings.origin;
    let normal = match object.normal_mode {
        NormalMode::ScreenDerivative => {
            let positions = varyings.map(|v| v.frag_pos);
            estimate_normal(positions.dpdx(), positions.dpdy())
        }
        NormalMode::Vertex => here.normal.normalize(),
    };

    let diffuse = diffuse_term(normal, here.frag_pos, object.light_position);
    (diffuse * here.color.truncate() * texel.truncate()).extend(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::render::TextureImage;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn varyings_at(frag_pos: Vec3, normal: Vec3) -> LitVaryings {
        LitVaryings {
            clip_position: Vec4::W,
            frag_pos,
            color: Vec4::ONE,
            uv: Vec2::ZERO,
            normal,
        }
    }

    #[test]
    fn estimated_normal_is_unit_and_perpendicular() {
        let cases = [
            (Vec3::new(0.01, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.01)),
            (Vec3::new(0.3, -0.2, 0.1), Vec3::new(-0.05, 0.4, 0.25)),
            (Vec3::new(1e-3, 2e-3, 0.0), Vec3::new(0.0, 1e-3, -4e-3)),
        ];
        for (fdx, fdy) in cases {
            let n = estimate_normal(fdx, fdy);
            assert!(approx(n.length(), 1.0), "{n:?}");
            assert!(n.dot(fdx).abs() < 1e-5);
            assert!(n.dot(fdy).abs() < 1e-5);
        }
    }

    #[test]
    fn estimated_normal_faces_the_camera() {
        // Quad in the z = 0 plane, seen from +Z.
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(45f32.to_radians(), 1.0, 0.1, 100.0);
        let vp = projection * view;
        let viewport = Viewport::new(400.0, 400.0);

        // Invert the projection onto z = 0 for each pixel.
        let hit = |px: f32, py: f32| {
            let ndc = viewport.pixel_to_ndc(px, py);
            let inv = vp.inverse();
            let a = inv.project_point3(ndc.extend(0.0));
            let b = inv.project_point3(ndc.extend(1.0));
            a + (b - a) * (-a.z / (b.z - a.z))
        };
        let positions = Neighborhood::sample(200.0, 200.0, hit);
        let n = estimate_normal(positions.dpdx(), positions.dpdy());
        assert!(n.z > 0.99, "{n:?}");
    }

    #[test]
    fn diffuse_never_leaves_floor_to_one() {
        let frag = Vec3::new(1.0, 0.5, -2.0);
        let normals = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
        for n in normals {
            let d = diffuse_term(n, frag, Vec3::ZERO);
            assert!((AMBIENT_FLOOR..=1.0).contains(&d), "{n:?}: {d}");
        }
    }

    #[test]
    fn diffuse_facing_light_saturates_and_facing_away_hits_floor() {
        let frag = Vec3::new(0.0, 0.0, -3.0);
        assert_eq!(diffuse_term(Vec3::Z, frag, Vec3::ZERO), 1.0);
        assert_eq!(diffuse_term(Vec3::NEG_Z, frag, Vec3::ZERO), AMBIENT_FLOOR);
        // 60 degrees off: cos = 0.5 -> 0.5 + 0.5
        let tilted = Vec3::new(0.0, 3f32.sqrt() / 2.0, 0.5);
        assert!(approx(diffuse_term(tilted, frag, Vec3::ZERO), 1.0));
    }

    #[test]
    fn fragment_modulates_color_and_texture() {
        // Flat patch in the y = -1 plane facing up towards the light.
        let base = varyings_at(Vec3::new(0.0, -1.0, 0.0), Vec3::Y);
        let patch = Neighborhood::new(
            base,
            LitVaryings { frag_pos: Vec3::new(0.01, -1.0, 0.0), ..base },
            LitVaryings { frag_pos: Vec3::new(0.0, -1.0, 0.01), ..base },
        );
        let object = LitUniforms::default();

        let texel = Vec4::new(0.5, 0.25, 1.0, 0.3);
        let color = lit_fragment(&patch, texel, &object);
        // fdy x fdx = Z x X = +Y, straight at the light.
        assert!(approx(color.x, 0.5));
        assert!(approx(color.y, 0.25));
        assert!(approx(color.z, 1.0));
        assert_eq!(color.w, 1.0);
    }

    #[test]
    fn fragment_takes_texel_at_its_uv() {
        let tex = TextureImage::checkerboard(4, 2, [255, 255, 255, 255], [0, 0, 255, 255]);
        let at = |uv: Vec2| {
            let base = LitVaryings { uv, ..varyings_at(Vec3::new(0.0, -1.0, 0.0), Vec3::Y) };
            let patch = Neighborhood::new(
                base,
                LitVaryings { frag_pos: Vec3::new(0.01, -1.0, 0.0), ..base },
                LitVaryings { frag_pos: Vec3::new(0.0, -1.0, 0.01), ..base },
            );
            lit_fragment(&patch, tex.sample_nearest(base.uv), &LitUniforms::default())
        };

        // Lit face straight on: color is the texel.
        assert_eq!(at(Vec2::new(0.1, 0.1)), Vec4::ONE);
        assert_eq!(at(Vec2::new(0.6, 0.1)), Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn fragment_output_bounded_by_base_color() {
        let base = varyings_at(Vec3::new(2.0, 0.3, -1.0), Vec3::Y);
        let patch = Neighborhood::new(
            base,
            LitVaryings { frag_pos: Vec3::new(2.01, 0.3, -1.0), ..base },
            LitVaryings { frag_pos: Vec3::new(2.0, 0.31, -1.0), ..base },
        );
        let texel = Vec4::new(0.8, 0.6, 0.4, 1.0);
        for mode in [NormalMode::ScreenDerivative, NormalMode::Vertex] {
            let object = LitUniforms { normal_mode: mode, ..Default::default() };
            let color = lit_fragment(&patch, texel, &object);
            for (c, t) in color.truncate().to_array().into_iter().zip(texel.truncate().to_array()) {
                assert!(c >= AMBIENT_FLOOR * t - 1e-6 && c <= t + 1e-6, "{mode:?}: {c} vs {t}");
            }
        }
    }

    #[test]
    fn vertex_mode_uses_interpolated_normal() {
        // Derivatives say +Z, the vertex normal says away from the light.
        let base = varyings_at(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, -2.0));
        let patch = Neighborhood::new(
            base,
            LitVaryings { frag_pos: Vec3::new(0.01, 0.0, -3.0), ..base },
            LitVaryings { frag_pos: Vec3::new(0.0, -0.01, -3.0), ..base },
        );
        let flat = lit_fragment(&patch, Vec4::ONE, &LitUniforms::default());
        let smooth = lit_fragment(
            &patch,
            Vec4::ONE,
            &LitUniforms { normal_mode: NormalMode::Vertex, ..Default::default() },
        );
        assert!(approx(flat.x, 1.0));
        assert!(approx(smooth.x, AMBIENT_FLOOR));
    }

    #[test]
    fn vertex_stage_records_world_position() {
        let vertex = MeshVertex {
            position: [1.0, 2.0, 3.0],
            color: [1.0, 0.0, 0.0, 1.0],
            uv: [0.25, 0.75],
            normal: [0.0, 1.0, 0.0],
        };
        let object = LitUniforms {
            model: Mat4::from_translation(Vec3::new(10.0, 0.0, -5.0)) * Mat4::from_scale(Vec3::splat(2.0)),
            ..Default::default()
        };
        let frame = FrameUniforms::default();
        let out = lit_vertex(&vertex, &frame, &object);

        assert_eq!(out.frag_pos, Vec3::new(12.0, 4.0, 1.0));
        assert_eq!(out.clip_position, Vec4::new(12.0, 4.0, 1.0, 1.0));
        assert_eq!(out.uv, Vec2::new(0.25, 0.75));
        assert_eq!(out.normal.normalize(), Vec3::Y);
    }

    #[test]
    fn normal_mode_round_trips_through_toggle() {
        let m = NormalMode::default();
        assert_eq!(m, NormalMode::ScreenDerivative);
        assert_eq!(m.toggled().toggled(), m);
        assert_ne!(m.as_gpu(), m.toggled().as_gpu());
    }
}

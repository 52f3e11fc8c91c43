/// Orbit camera driven by pointer drags and wheel input
use crate::math::{clamp, deg_to_rad, normalized_or_panic, to_vecf, Mat4f, Vec2f, Vec2i, Vec3f, EPSILON, PI};
use crate::transform::Transform;

/// Per-gesture input gathered by the host between two updates.
///
/// The host writes drag positions and wheel steps; [`Camera::update`] consumes
/// them by moving the begin points onto the end points and zeroing the dolly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraContext {
    /// Viewport size in pixels, refreshed by the host every frame
    pub width: i32,
    pub height: i32,

    pub is_orbiting: bool,
    pub orbit_begin: Vec2i,
    pub orbit_end: Vec2i,

    pub is_panning: bool,
    pub pan_begin: Vec2i,
    pub pan_end: Vec2i,

    /// Wheel steps to apply; zero means no dolly this frame
    pub dolly_exp: f32,
}

impl CameraContext {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            is_orbiting: false,
            orbit_begin: Vec2i::zeros(),
            orbit_end: Vec2i::zeros(),
            is_panning: false,
            pan_begin: Vec2i::zeros(),
            pan_end: Vec2i::zeros(),
            dolly_exp: 0.0,
        }
    }

    /// Drop any in-flight gesture while keeping the viewport size.
    pub fn reset(&mut self) {
        *self = Self::new(self.width, self.height);
    }
}

impl Default for CameraContext {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Drag fractions extracted from a [`CameraContext`]
#[derive(Debug, Clone, Copy)]
struct Motion {
    orbit: Vec2f,
    pan: Vec2f,
    dolly: f32,
}

impl Motion {
    fn none() -> Self {
        Self {
            orbit: Vec2f::zeros(),
            pan: Vec2f::zeros(),
            dolly: 0.0,
        }
    }
}

/// Both axes are divided by the height so that horizontal and vertical drags
/// rotate by the same angle per pixel regardless of the aspect ratio.
fn drag_fraction(from: Vec2i, to: Vec2i, height: i32) -> Vec2f {
    if height <= 0 {
        return Vec2f::zeros();
    }
    to_vecf(&(to - from)) / height as f32
}

/// Camera that orbits, pans and dollies around a target point.
#[derive(Debug, Clone)]
pub struct Camera {
    target: Vec3f,
    position: Vec3f,
    up: Vec3f,
    fov_y: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,

    orbit_offset: Vec3f,
    pan_offset: Vec3f,

    initial_target: Vec3f,
    initial_position: Vec3f,
}

impl Camera {
    /// Default vertical field of view in degrees
    pub const DEFAULT_FOV_Y: f32 = 60.0;
    pub const NEAR: f32 = -0.1;
    pub const FAR: f32 = -10000.0;
    /// Radius multiplier for a single dolly step
    pub const DOLLY_BASE: f32 = 0.95;
    /// Closest the eye may dolly towards the target, one near-plane distance
    pub const MIN_RADIUS: f32 = -Self::NEAR;

    pub fn new(target: Vec3f, position: Vec3f, aspect_ratio: f32) -> Self {
        Self {
            target,
            position,
            up: Vec3f::new(0.0, 1.0, 0.0),
            fov_y: deg_to_rad(Self::DEFAULT_FOV_Y),
            aspect_ratio,
            near: Self::NEAR,
            far: Self::FAR,
            orbit_offset: Vec3f::zeros(),
            pan_offset: Vec3f::zeros(),
            initial_target: target,
            initial_position: position,
        }
    }

    /// Apply the drags and dolly accumulated in `ctx`, then mark them consumed.
    pub fn update(&mut self, ctx: &mut CameraContext) {
        let mut motion = Motion::none();
        if ctx.is_orbiting {
            motion.orbit = drag_fraction(ctx.orbit_begin, ctx.orbit_end, ctx.height);
            ctx.orbit_begin = ctx.orbit_end;
        }
        if ctx.is_panning {
            motion.pan = drag_fraction(ctx.pan_begin, ctx.pan_end, ctx.height);
            ctx.pan_begin = ctx.pan_end;
        }
        motion.dolly = ctx.dolly_exp;
        ctx.dolly_exp = 0.0;

        let from_target = self.position - self.target;
        let from_camera = self.target - self.position;

        // Both offsets come from the pre-update pose; the orbit is then
        // re-anchored on the panned target.
        self.pan_offset = self.calc_pan_offset(&from_camera, &motion);
        self.orbit_offset = Self::calc_orbit_offset(&from_target, &motion);
        self.target += self.pan_offset;
        self.position = self.target + self.orbit_offset;
    }

    fn calc_orbit_offset(from_target: &Vec3f, motion: &Motion) -> Vec3f {
        let mut r = from_target.norm();
        assert!(r > 0.0, "camera position coincides with its target");

        // theta: azimuth around +Y measured from +Z, phi: angle from +Y
        let mut theta = from_target.x.atan2(from_target.z);
        let mut phi = (from_target.y / r).clamp(-1.0, 1.0).acos();

        // Dragging right turns the view left around the target. The host's
        // y axis points down, so dragging up increases phi.
        let factor = 2.0 * PI;
        theta -= factor * motion.orbit.x;
        phi -= factor * motion.orbit.y;
        phi = clamp(phi, EPSILON, PI - EPSILON);

        r = (r * Self::DOLLY_BASE.powf(motion.dolly)).max(Self::MIN_RADIUS);

        Vec3f::new(
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
            r * phi.sin() * theta.cos(),
        )
    }

    fn calc_pan_offset(&self, from_camera: &Vec3f, motion: &Motion) -> Vec3f {
        if motion.pan == Vec2f::zeros() {
            return Vec3f::zeros();
        }

        let distance = from_camera.norm();
        let z = normalized_or_panic(from_camera);
        let right = normalized_or_panic(&self.up.cross(&z));
        let up = normalized_or_panic(&z.cross(&right));

        // Scale to the visible extent at the target's depth so the surface
        // under the cursor follows it.
        let y_factor = 2.0 * (self.fov_y / 2.0).tan() * distance;
        let x_factor = y_factor * self.aspect_ratio;

        right * (motion.pan.x * x_factor) + up * (motion.pan.y * y_factor)
    }

    pub fn projection_matrix(&self) -> Mat4f {
        Transform::projection_matrix(self.near, self.far, self.fov_y, self.aspect_ratio)
    }

    pub fn view_matrix(&self) -> Mat4f {
        Transform::view_matrix(&self.target, &self.position, &self.up)
    }

    pub fn set_position(&mut self, position: Vec3f) {
        self.position = position;
    }

    pub fn set_target(&mut self, target: Vec3f) {
        self.target = target;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Vertical field of view in radians
    pub fn set_fov_y(&mut self, fov_y: f32) {
        self.fov_y = fov_y;
    }

    pub fn reset_motion(&mut self) {
        self.orbit_offset = Vec3f::zeros();
        self.pan_offset = Vec3f::zeros();
    }

    /// Return to the pose the camera was constructed with.
    pub fn reset(&mut self) {
        self.target = self.initial_target;
        self.position = self.initial_position;
        self.reset_motion();
    }

    pub fn position(&self) -> Vec3f {
        self.position
    }

    pub fn target(&self) -> Vec3f {
        self.target
    }

    pub fn up(&self) -> Vec3f {
        self.up
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn orbit_offset(&self) -> Vec3f {
        self.orbit_offset
    }

    pub fn pan_offset(&self) -> Vec3f {
        self.pan_offset
    }

    pub fn radius(&self) -> f32 {
        (self.position - self.target).norm()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3f::zeros(), Vec3f::new(0.0, 0.0, 3.0), 4.0 / 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_vec(a: &Vec3f, b: &Vec3f) -> bool {
        (a - b).norm() < 1e-4
    }

    fn theta(camera: &Camera) -> f32 {
        let d = camera.position() - camera.target();
        d.x.atan2(d.z)
    }

    fn phi(camera: &Camera) -> f32 {
        let d = camera.position() - camera.target();
        (d.y / d.norm()).acos()
    }

    fn orbit(ctx: &mut CameraContext, dx: i32, dy: i32) {
        ctx.is_orbiting = true;
        ctx.orbit_begin = Vec2i::new(100, 100);
        ctx.orbit_end = Vec2i::new(100 + dx, 100 + dy);
    }

    fn camera() -> Camera {
        Camera::new(Vec3f::new(0.5, 0.0, 0.0), Vec3f::new(1.5, 1.0, 2.0), 2.0)
    }

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(Vec3f::zeros(), Vec3f::new(0.0, 0.0, 2.0), 800.0 / 600.0);
        assert!((camera.aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);
        assert!((camera.fov_y() - PI / 3.0).abs() < 1e-6);
        assert!(camera.near() < 0.0 && camera.far() < camera.near());
        assert!((camera.radius() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_drag_keeps_pose() {
        let mut camera = camera();
        let before = (camera.position(), camera.target());
        let mut ctx = CameraContext::new(800, 600);
        camera.update(&mut ctx);
        assert!(approx_vec(&camera.position(), &before.0));
        assert!(approx_vec(&camera.target(), &before.1));

        // Active but motionless drags are also a no-op
        ctx.is_orbiting = true;
        ctx.is_panning = true;
        camera.update(&mut ctx);
        assert!(approx_vec(&camera.position(), &before.0));
        assert!(approx_vec(&camera.target(), &before.1));
    }

    #[test]
    fn test_orbit_round_trip_restores_theta() {
        let mut camera = camera();
        let start = theta(&camera);
        let radius = camera.radius();
        let mut ctx = CameraContext::new(800, 600);

        orbit(&mut ctx, 37, 0);
        camera.update(&mut ctx);
        assert!((theta(&camera) - start).abs() > 0.1);
        assert!((camera.radius() - radius).abs() < 1e-4);

        orbit(&mut ctx, -37, 0);
        camera.update(&mut ctx);
        assert!((theta(&camera) - start).abs() < 1e-4);
    }

    #[test]
    fn test_rightward_drag_decreases_theta() {
        let mut camera = Camera::new(Vec3f::zeros(), Vec3f::new(0.0, 0.0, 4.0), 1.0);
        let mut ctx = CameraContext::new(400, 400);
        orbit(&mut ctx, 20, 0);
        camera.update(&mut ctx);
        // 20 / 400 of a turn
        assert!((theta(&camera) + 2.0 * PI * 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_update_consumes_context() {
        let mut camera = camera();
        let mut ctx = CameraContext::new(800, 600);
        orbit(&mut ctx, 10, 5);
        ctx.is_panning = true;
        ctx.pan_begin = Vec2i::new(1, 1);
        ctx.pan_end = Vec2i::new(4, 9);
        ctx.dolly_exp = 2.0;

        camera.update(&mut ctx);
        assert_eq!(ctx.orbit_begin, ctx.orbit_end);
        assert_eq!(ctx.pan_begin, ctx.pan_end);
        assert_eq!(ctx.dolly_exp, 0.0);
        assert!(ctx.is_orbiting && ctx.is_panning);

        ctx.reset();
        assert_eq!(ctx, CameraContext::new(800, 600));
    }

    #[test]
    fn test_phi_is_clamped_at_the_poles() {
        let mut ctx = CameraContext::new(100, 100);
        for dy in [-5000, 5000] {
            let mut camera = camera();
            let radius = camera.radius();
            for _ in 0..4 {
                orbit(&mut ctx, 0, dy);
                camera.update(&mut ctx);
                let p = phi(&camera);
                assert!(p >= EPSILON - 1e-4 && p <= PI - EPSILON + 1e-4, "phi {p}");
                let offset = camera.position() - camera.target();
                assert!(offset.y.abs() <= radius);
            }
        }
    }

    #[test]
    fn test_dolly_shrinks_radius_monotonically() {
        let mut last = f32::INFINITY;
        for exp in [-3.0, -1.0, 0.0, 1.0, 4.0, 40.0] {
            let mut camera = camera();
            let radius = camera.radius();
            let mut ctx = CameraContext::new(800, 600);
            ctx.dolly_exp = exp;
            camera.update(&mut ctx);
            let r = camera.radius();
            assert!(r > 0.0);
            assert!(r < last);
            assert!((r - radius * 0.95f32.powf(exp)).abs() < 1e-3);
            last = r;
        }
    }

    #[test]
    fn test_dolly_stops_at_min_radius() {
        let mut camera = camera();
        let mut ctx = CameraContext::new(800, 600);
        ctx.dolly_exp = 3000.0;
        camera.update(&mut ctx);
        assert!((camera.radius() - Camera::MIN_RADIUS).abs() < 1e-5);
        assert!(camera.view_matrix()[(3, 3)].is_finite());

        // Single wheel steps well past the floor
        let mut camera = self::camera();
        for _ in 0..1000 {
            ctx.dolly_exp = 1.0;
            camera.update(&mut ctx);
            assert!(camera.radius() >= Camera::MIN_RADIUS - 1e-5);
            let _ = camera.view_matrix();
        }
        assert!((camera.radius() - Camera::MIN_RADIUS).abs() < 1e-5);

        // Dollying back out still works from the floor
        ctx.dolly_exp = -1.0;
        camera.update(&mut ctx);
        assert!(camera.radius() > Camera::MIN_RADIUS);
    }

    #[test]
    fn test_orbit_is_normalized_by_height_only() {
        let mut camera = Camera::new(Vec3f::zeros(), Vec3f::new(0.0, 0.0, 4.0), 4.0);
        let mut ctx = CameraContext::new(800, 200);
        orbit(&mut ctx, 20, 0);
        camera.update(&mut ctx);
        // 20 / 200 of a turn, not 20 / 800
        assert!((theta(&camera) + 2.0 * PI * 20.0 / 200.0).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_is_applied_around_the_panned_target() {
        let mut camera = camera();
        let old_target = camera.target();
        let old_offset = camera.position() - camera.target();

        let mut ctx = CameraContext::new(800, 600);
        orbit(&mut ctx, 30, -12);
        ctx.is_panning = true;
        ctx.pan_begin = Vec2i::new(400, 300);
        ctx.pan_end = Vec2i::new(350, 340);
        camera.update(&mut ctx);

        let pan = camera.pan_offset();
        let orbit_offset = camera.orbit_offset();
        assert!(pan.norm() > 1e-3);
        assert!(approx_vec(&camera.target(), &(old_target + pan)));
        assert!(approx_vec(&camera.position(), &(old_target + pan + orbit_offset)));

        // The orbit offset comes from the pre-update pose
        let r = old_offset.norm();
        let theta = old_offset.x.atan2(old_offset.z) - 2.0 * PI * 30.0 / 600.0;
        let phi = (old_offset.y / r).acos() + 2.0 * PI * 12.0 / 600.0;
        let expected = Vec3f::new(r * phi.sin() * theta.sin(), r * phi.cos(), r * phi.sin() * theta.cos());
        assert!(approx_vec(&orbit_offset, &expected));
    }

    #[test]
    fn test_pan_translates_rigidly() {
        let mut camera = camera();
        let offset = camera.position() - camera.target();
        let mut ctx = CameraContext::new(800, 600);
        ctx.is_panning = true;
        ctx.pan_begin = Vec2i::new(400, 300);
        ctx.pan_end = Vec2i::new(460, 250);
        camera.update(&mut ctx);

        let moved = camera.pan_offset();
        assert!(moved.norm() > 0.0);
        assert!(approx_vec(&(camera.position() - camera.target()), &offset));
        // Pan stays in the view plane
        assert!(moved.dot(&offset).abs() < 1e-4);
    }

    #[test]
    fn test_pan_matches_visible_extent() {
        // A full-height drag moves the target by the visible height at its depth
        let mut camera = Camera::new(Vec3f::zeros(), Vec3f::new(0.0, 0.0, 2.0), 1.0);
        let mut ctx = CameraContext::new(100, 100);
        ctx.is_panning = true;
        ctx.pan_begin = Vec2i::new(0, 0);
        ctx.pan_end = Vec2i::new(0, 100);
        camera.update(&mut ctx);
        let expected = 2.0 * (PI / 6.0).tan() * 2.0;
        assert!((camera.target().norm() - expected).abs() < 1e-4);
        assert!(camera.target().x.abs() < 1e-5);
    }

    #[test]
    fn test_reset_restores_initial_pose() {
        let mut camera = camera();
        let mut ctx = CameraContext::new(800, 600);
        orbit(&mut ctx, 80, 30);
        ctx.dolly_exp = 3.0;
        camera.update(&mut ctx);
        camera.set_target(Vec3f::new(9.0, 9.0, 9.0));

        camera.reset();
        assert_eq!(camera.target(), Vec3f::new(0.5, 0.0, 0.0));
        assert_eq!(camera.position(), Vec3f::new(1.5, 1.0, 2.0));
        assert_eq!(camera.orbit_offset(), Vec3f::zeros());
        assert_eq!(camera.pan_offset(), Vec3f::zeros());
    }

    #[test]
    fn test_view_matrix() {
        let camera = camera();
        let view = camera.view_matrix();
        let t = camera.target();
        let eye_space = view * nalgebra::Vector4::new(t.x, t.y, t.z, 1.0);
        assert!((eye_space.z + camera.radius()).abs() < 1e-4);
        assert!(camera.projection_matrix().norm() > 0.0);
    }
}

use glam::{Mat4, Vec3};
use stillframe_ply::Bounds;

const FOV_Y: f32 = 60.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Lower bound for the framed radius, so single-point meshes still get a
/// usable projection.
const MIN_RADIUS: f32 = 1e-3;

/// Distance multiplier per wheel step.
const ZOOM_FACTOR: f32 = 0.9;

/// Orbit camera around a fixed target.
///
/// The home view looks down -Z at the bounding sphere of the mesh with +Y up;
/// orbiting changes yaw (around +Y) and pitch, zooming changes distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    target: Vec3,
    radius: f32,
    home_distance: f32,
    distance: f32,
    yaw: f32,
    pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::looking_at(Vec3::ZERO, 1.0)
    }
}

impl Camera {
    /// Home view framing `bounds`.
    pub fn fit(bounds: &Bounds) -> Self {
        Self::looking_at(Vec3::from(bounds.center()), bounds.diagonal() * 0.5)
    }

    fn looking_at(target: Vec3, radius: f32) -> Self {
        let radius = if radius.is_finite() { radius.max(MIN_RADIUS) } else { 1.0 };
        let home_distance = radius / (FOV_Y * 0.5).sin();
        Self {
            target,
            radius,
            home_distance,
            distance: home_distance,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + self.distance * Vec3::new(cp * sy, sp, cp * cy)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let near = (self.distance - self.radius * 1.5).max(self.distance * 0.01);
        let far = self.distance + self.radius * 1.5;

        let proj = Mat4::perspective_rh(FOV_Y, aspect, near, far);
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        proj * view
    }

    /// Rotates around the target by the given angles in radians.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        self.yaw = (self.yaw + yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Positive steps move closer.
    pub fn zoom(&mut self, steps: f32) {
        let d = self.distance * ZOOM_FACTOR.powf(steps);
        self.distance = d.clamp(self.radius * 0.05, self.home_distance * 20.0);
    }

    pub fn reset(&mut self) {
        self.distance = self.home_distance;
        self.yaw = 0.0;
        self.pitch = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Bounds {
        Bounds {
            min: [-1.0, -1.0, -1.0],
            max: [1.0, 1.0, 1.0],
        }
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn home_view_looks_down_negative_z() {
        let cam = Camera::fit(&unit_box());
        let eye = cam.eye();
        assert!(approx(Vec3::new(eye.x, eye.y, 0.0), Vec3::ZERO));
        assert!(eye.z > 3.0_f32.sqrt());
    }

    #[test]
    fn target_projects_to_screen_center() {
        let cam = Camera::fit(&Bounds {
            min: [10.0, 0.0, 0.0],
            max: [12.0, 4.0, 2.0],
        });
        let clip = cam.view_proj(16.0 / 9.0) * cam.target().extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..1.0).contains(&ndc.z));
    }

    #[test]
    fn whole_bounding_box_is_in_front_of_near_plane() {
        let b = unit_box();
        let cam = Camera::fit(&b);
        let vp = cam.view_proj(1.0);
        for corner in [b.min, b.max] {
            let clip = vp * Vec3::from(corner).extend(1.0);
            let z = clip.z / clip.w;
            assert!((0.0..=1.0).contains(&z), "corner {corner:?} clipped: {z}");
        }
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.orbit(0.0, 10.0);
        let eye = cam.eye() - cam.target();
        assert!(eye.y > 0.0);
        assert!(eye.normalize().y < 1.0);
        assert!(cam.view_proj(1.0).is_finite());
    }

    #[test]
    fn zoom_is_bounded_and_reset_restores_home() {
        let home = Camera::fit(&unit_box());
        let mut cam = home.clone();

        cam.zoom(1.0);
        assert!(cam.eye().z < home.eye().z);

        cam.zoom(1000.0);
        assert!(cam.eye().z > 0.0);

        cam.orbit(1.0, 0.5);
        cam.reset();
        assert!(approx(cam.eye(), home.eye()));
    }

    #[test]
    fn single_point_bounds_give_finite_projection() {
        let cam = Camera::fit(&Bounds {
            min: [3.0, 3.0, 3.0],
            max: [3.0, 3.0, 3.0],
        });
        assert!(cam.view_proj(1.5).is_finite());
    }
}

//! Orbit camera around the traveler.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use starwake_config::CameraConfig;

/// Spherical camera: azimuth `theta`, polar angle `phi`, radius `distance`.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub theta: f32,
    pub phi: f32,
    pub distance: f32,
    min_distance: f32,
    max_distance: f32,
    phi_margin: f32,
    orbit_sensitivity: f32,
    zoom_sensitivity: f32,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig) -> Self {
        let mut camera = Self {
            theta: config.theta,
            phi: config.phi,
            distance: config.distance,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            phi_margin: config.phi_margin,
            orbit_sensitivity: config.orbit_sensitivity,
            zoom_sensitivity: config.zoom_sensitivity,
        };
        camera.clamp();
        camera
    }

    /// Apply pointer drag and scroll for this frame.
    pub fn apply_input(&mut self, orbit_delta: Vec2, zoom_delta: f32) {
        self.theta -= orbit_delta.x * self.orbit_sensitivity;
        self.phi -= orbit_delta.y * self.orbit_sensitivity;
        self.distance += zoom_delta * self.zoom_sensitivity;
        self.clamp();
    }

    fn clamp(&mut self) {
        self.phi = self.phi.clamp(self.phi_margin, PI - self.phi_margin);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Camera position for a given look-at target.
    pub fn eye(&self, target: Vec3) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        target
            + self.distance * Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta)
    }
}

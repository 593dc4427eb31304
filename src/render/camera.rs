//! Camera variants for the bar scene.

use clap::ValueEnum;
use glam::{Mat4, Vec3};
use serde::Deserialize;
use std::f32::consts::TAU;

/// Steps in one lap of the fly-by path.
const FLYBY_PERIOD: u32 = 2095;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    /// Fixed orbit position looking at the origin.
    #[default]
    Spherical,
    /// Yaw-pitch-roll camera flying a closed loop around the bars.
    Flyby,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Camera {
    /// `theta` is the azimuth around +y, `phi` the elevation, both in degrees.
    Spherical { radius: f32, theta: f32, phi: f32 },
    Flyby { step: u32 },
}

impl Camera {
    pub fn from_mode(mode: CameraMode) -> Self {
        match mode {
            CameraMode::Spherical => Camera::Spherical {
                radius: 30.0,
                theta: 30.0,
                phi: 20.0,
            },
            CameraMode::Flyby => Camera::Flyby { step: 0 },
        }
    }

    /// Move along the camera's path by one render tick.
    pub fn advance(&mut self) {
        if let Camera::Flyby { step } = self {
            *step = (*step + 1) % FLYBY_PERIOD;
        }
    }

    pub fn position(&self) -> Vec3 {
        match *self {
            Camera::Spherical { radius, theta, phi } => {
                let (theta, phi) = (theta.to_radians(), phi.to_radians());
                Vec3::new(
                    radius * phi.cos() * theta.sin(),
                    radius * phi.sin(),
                    radius * phi.cos() * theta.cos(),
                )
            }
            Camera::Flyby { step } => {
                let t = TAU / FLYBY_PERIOD as f32 * step as f32;
                Vec3::new(14.0 * t.sin(), 4.0 + 1.5 * (3.0 * t).sin(), 14.0 * t.cos())
            }
        }
    }

    /// View matrix for the current camera state.
    pub fn look_at(&self) -> Mat4 {
        let eye = self.position();
        match *self {
            Camera::Spherical { .. } => Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y),
            Camera::Flyby { step } => {
                let t = TAU / FLYBY_PERIOD as f32 * step as f32;
                // Look inward at the bars, bobbing with the path.
                let dir = Vec3::new(
                    -9.8 * t.sin(),
                    0.3 * (3.0 * (3.0 * t).cos() + 4.0 * (2.0 * t + 0.2).sin()) - 2.5,
                    -9.8 * t.cos(),
                );
                Mat4::look_to_rh(eye, dir.normalize_or(Vec3::NEG_Z), Vec3::Y)
            }
        }
    }
}

pub fn projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(75f32.to_radians(), aspect, 0.01, 500.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spherical_looks_at_origin() {
        let camera = Camera::from_mode(CameraMode::Spherical);
        assert!((camera.position().length() - 30.0).abs() < 1e-3);

        let view = camera.look_at();
        let origin = view.transform_point3(Vec3::ZERO);
        // Origin sits straight ahead on the view axis.
        assert!(origin.x.abs() < 1e-3);
        assert!(origin.y.abs() < 1e-3);
        assert!((origin.z + 30.0).abs() < 1e-3);
    }

    #[test]
    fn spherical_ignores_advance() {
        let mut camera = Camera::from_mode(CameraMode::Spherical);
        let before = camera;
        camera.advance();
        assert_eq!(camera, before);
    }

    #[test]
    fn flyby_loops() {
        let mut camera = Camera::from_mode(CameraMode::Flyby);
        let start = camera.position();
        camera.advance();
        assert_ne!(camera.position(), start);
        for _ in 1..FLYBY_PERIOD {
            camera.advance();
        }
        assert_eq!(camera, Camera::Flyby { step: 0 });
        assert!(camera.look_at().is_finite());
    }
}

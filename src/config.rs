//! Configuratie van een scène, zoals die vanuit JavaScript meegegeven kan worden.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{AnyCoordinateSystem, CoordinateSystem2D, CoordinateSystem3D, Dimension};
use crate::scene::CameraControl;

/// Fouttype voor ongeldige configuratiewaarden.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("schermgrootte moet positief zijn, kreeg {0:?}")]
    ScreenSize([f64; 2]),
    #[error("`{name}` moet positief zijn, kreeg {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("zoomfactor moet groter dan 1 zijn, kreeg {0}")]
    ZoomFactor(f64),
    #[error("near ({near}) moet kleiner zijn dan far ({far})")]
    ClipRange { near: f64, far: f64 },
}

/// Instellingen van de 3D-camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f64; 3],
    pub field_of_view_deg: f64,
    pub near: f64,
    pub far: f64,
    pub rotation_speed: f64,
    pub move_speed: f64,
    pub wheel_speed: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let control = CameraControl::default();
        Self {
            position: [0.0, 0.0, 2.0],
            field_of_view_deg: 60.0,
            near: 0.1,
            far: 100.0,
            rotation_speed: control.rotation_speed,
            move_speed: control.move_speed,
            wheel_speed: control.wheel_speed,
        }
    }
}

impl CameraConfig {
    #[must_use]
    pub fn control(&self) -> CameraControl {
        CameraControl {
            rotation_speed: self.rotation_speed,
            move_speed: self.move_speed,
            wheel_speed: self.wheel_speed,
        }
    }
}

/// Instellingen van een scène. Ontbrekende velden krijgen hun standaardwaarde.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub dimension: Dimension,
    pub screen_size: [f64; 2],
    pub pixels_per_unit: f64,
    pub zoom_factor: f64,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            dimension: Dimension::Two,
            screen_size: [1280.0, 720.0],
            pixels_per_unit: 100.0,
            zoom_factor: 1.2,
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    #[must_use]
    pub fn with_dimension(dimension: Dimension) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn screen_size(&self) -> Vector2<f64> {
        Vector2::new(self.screen_size[0], self.screen_size[1])
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let [width, height] = self.screen_size;
        if !(width > 0.0 && height > 0.0) {
            return Err(ConfigError::ScreenSize(self.screen_size));
        }
        if !(self.pixels_per_unit > 0.0) {
            return Err(ConfigError::NotPositive {
                name: "pixels_per_unit",
                value: self.pixels_per_unit,
            });
        }
        if !(self.zoom_factor > 1.0) {
            return Err(ConfigError::ZoomFactor(self.zoom_factor));
        }
        let camera = &self.camera;
        if !(camera.field_of_view_deg > 0.0) {
            return Err(ConfigError::NotPositive {
                name: "field_of_view_deg",
                value: camera.field_of_view_deg,
            });
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::ClipRange {
                near: camera.near,
                far: camera.far,
            });
        }
        Ok(())
    }

    /// Het coördinatensysteem dat bij de dimensie van de scène hoort.
    #[must_use]
    pub fn coordinate_system(&self) -> AnyCoordinateSystem {
        match self.dimension {
            Dimension::Two => AnyCoordinateSystem::Planar(CoordinateSystem2D::new(
                self.screen_size(),
                self.pixels_per_unit,
                self.zoom_factor,
            )),
            Dimension::Three => AnyCoordinateSystem::Camera(CoordinateSystem3D::new(
                Vector3::from(self.camera.position),
                self.camera.field_of_view_deg.to_radians(),
                self.camera.near,
                self.camera.far,
                self.screen_size(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::CoordinateSystem;

    #[test]
    fn defaults_match_reference_screen() {
        let config = SceneConfig::default();
        assert_eq!(config.screen_size, [1280.0, 720.0]);
        assert!(config.validate().is_ok());
        let coords = config.coordinate_system();
        assert_eq!(coords.dimension(), Dimension::Two);
        assert_eq!(coords.zero_point(), nalgebra::Point2::new(640.0, 360.0));
    }

    #[test]
    fn three_dimensional_config_builds_camera() {
        let config = SceneConfig::with_dimension(Dimension::Three);
        let AnyCoordinateSystem::Camera(camera) = config.coordinate_system() else {
            panic!("verwacht een camera");
        };
        assert_eq!(camera.position(), &Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(config.camera.control(), CameraControl::default());
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = SceneConfig {
            zoom_factor: 0.5,
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZoomFactor(0.5)));

        config.zoom_factor = 1.2;
        config.camera.near = 200.0;
        assert!(matches!(config.validate(), Err(ConfigError::ClipRange { .. })));

        config.camera.near = 0.1;
        config.screen_size = [0.0, 720.0];
        assert!(matches!(config.validate(), Err(ConfigError::ScreenSize(_))));
    }
}

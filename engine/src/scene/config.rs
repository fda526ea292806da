//! Scene Configuration
//!
//! Everything needed to build a [`super::Simulation`]: gravity, solver
//! tunables, tick rate, controller strength and the body list. `Default`
//! returns the reference scene: a ground slab, the player box, a ball and a
//! second box dropped from above.
//!
//! Scenes can be stored as JSON. Vectors are `[x, y, z]` arrays, quaternions
//! `[x, y, z, w]`, and every field may be omitted to take its default.

use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::error::{SceneError, SceneResult};
use crate::physics::body::DEFAULT_DENSITY;
use crate::physics::{BodyDesc, BodyKind, EARTH_GRAVITY, Material, PhysicsConfig, Shape};
use crate::player::DEFAULT_IMPULSE_STEP;

/// Simulation tick length used by [`super::Simulation::advance`] (s)
pub const DEFAULT_FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Ticks run at most per `advance` call before the backlog is dropped
pub const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 5;

/// What a body is for in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRole {
    /// Static floor
    Ground,
    /// The keyboard-driven body; exactly one per scene
    Player,
    /// Anything else
    #[default]
    Prop,
}

/// One body of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySpec {
    pub name: String,
    pub role: BodyRole,
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec3,
    pub orientation: Quat,
    pub density: f32,
    pub material: Material,
    /// Display color (linear RGB), passed through to the host
    pub color: [f32; 3],
}

impl Default for BodySpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: BodyRole::Prop,
            kind: BodyKind::Dynamic,
            shape: Shape::cuboid(Vec3::splat(0.5)),
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            density: DEFAULT_DENSITY,
            material: Material::default(),
            color: [0.8, 0.8, 0.8],
        }
    }
}

impl BodySpec {
    pub fn new(name: impl Into<String>, role: BodyRole, kind: BodyKind, shape: Shape, position: Vec3) -> Self {
        Self {
            name: name.into(),
            role,
            kind,
            shape,
            position,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    /// Physics description of this body.
    pub fn to_desc(&self) -> BodyDesc {
        BodyDesc::new(self.kind, self.shape)
            .at(self.position)
            .with_orientation(self.orientation)
            .with_density(self.density)
            .with_material(self.material)
    }
}

/// Player controller settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Impulse per held direction per tick (N·s)
    pub impulse_step: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            impulse_step: DEFAULT_IMPULSE_STEP,
        }
    }
}

/// Complete description of a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub gravity: Vec3,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    /// Length of one simulation tick (s)
    pub fixed_timestep: f32,
    pub max_ticks_per_frame: u32,
    pub bodies: Vec<BodySpec>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            gravity: EARTH_GRAVITY,
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            bodies: vec![
                BodySpec::new(
                    "ground",
                    BodyRole::Ground,
                    BodyKind::Fixed,
                    Shape::cuboid(Vec3::new(5.0, 0.25, 5.0)),
                    Vec3::new(0.0, -2.0, 0.0),
                )
                .with_color([0.68, 0.85, 0.9]),
                BodySpec::new(
                    "player",
                    BodyRole::Player,
                    BodyKind::Dynamic,
                    Shape::cuboid(Vec3::splat(0.5)),
                    Vec3::new(0.0, 5.0, 0.0),
                )
                .with_color([0.0, 1.0, 0.0]),
                BodySpec::new(
                    "ball",
                    BodyRole::Prop,
                    BodyKind::Dynamic,
                    Shape::sphere(0.5),
                    Vec3::new(2.0, 8.0, 0.0),
                )
                .with_color([1.0, 0.41, 0.71]),
                BodySpec::new(
                    "crate",
                    BodyRole::Prop,
                    BodyKind::Dynamic,
                    Shape::cuboid(Vec3::splat(0.5)),
                    Vec3::new(-1.0, 10.0, 0.0),
                )
                .with_color([1.0, 0.65, 0.0]),
            ],
        }
    }
}

impl SceneConfig {
    /// Reference scene without any bodies, for building scenes in code.
    pub fn empty() -> Self {
        Self {
            bodies: Vec::new(),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: BodySpec) -> Self {
        self.bodies.push(body);
        self
    }

    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a scene file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("loaded scene {} ({} bodies)", path.display(), config.bodies.len());
        Ok(config)
    }

    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Index of the single player body.
    pub fn player_index(&self) -> SceneResult<usize> {
        let mut players = self
            .bodies
            .iter()
            .enumerate()
            .filter(|(_, body)| body.role == BodyRole::Player)
            .map(|(index, _)| index);

        let index = players.next().ok_or(SceneError::MissingPlayer)?;
        if players.next().is_some() {
            return Err(SceneError::DuplicatePlayer);
        }
        Ok(index)
    }

    /// Structural checks that do not need a physics world.
    pub fn validate(&self) -> SceneResult<()> {
        let player = self.player_index()?;
        if self.bodies[player].kind != BodyKind::Dynamic {
            return Err(SceneError::FixedPlayer);
        }
        if !(self.fixed_timestep > 0.0 && self.fixed_timestep.is_finite()) {
            return Err(SceneError::InvalidTimestep(self.fixed_timestep));
        }
        if !self.gravity.is_finite() {
            return Err(SceneError::InvalidGravity(self.gravity));
        }
        self.physics.validate().map_err(SceneError::Physics)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsError;

    #[test]
    fn test_default_is_reference_scene() {
        let config = SceneConfig::default();
        assert_eq!(config.gravity, Vec3::new(0.0, -9.81, 0.0));
        assert_eq!(config.bodies.len(), 4);
        assert_eq!(config.player_index().unwrap(), 1);

        let ground = &config.bodies[0];
        assert_eq!(ground.kind, BodyKind::Fixed);
        assert_eq!(ground.shape, Shape::cuboid(Vec3::new(5.0, 0.25, 5.0)));
        assert_eq!(ground.position, Vec3::new(0.0, -2.0, 0.0));

        assert_eq!(config.bodies[2].shape, Shape::sphere(0.5));
        assert_eq!(config.bodies[3].position, Vec3::new(-1.0, 10.0, 0.0));
        assert_eq!(config.player.impulse_step, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = SceneConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(SceneConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "gravity": [0.0, -1.62, 0.0],
            "bodies": [
                { "role": "player", "shape": { "type": "sphere", "radius": 0.25 } }
            ]
        }"#;
        let config = SceneConfig::from_json_str(json).unwrap();
        assert_eq!(config.gravity.y, -1.62);
        assert_eq!(config.fixed_timestep, DEFAULT_FIXED_TIMESTEP);
        assert_eq!(config.physics, PhysicsConfig::default());

        let player = &config.bodies[0];
        assert_eq!(player.kind, BodyKind::Dynamic);
        assert_eq!(player.orientation, Quat::IDENTITY);
        assert_eq!(player.material, Material::default());
    }

    #[test]
    fn test_player_count_checked() {
        let missing = SceneConfig::empty();
        assert!(matches!(missing.validate(), Err(SceneError::MissingPlayer)));

        let player = BodySpec::new("p", BodyRole::Player, BodyKind::Dynamic, Shape::sphere(1.0), Vec3::ZERO);
        let duplicate = SceneConfig::empty().with_body(player.clone()).with_body(player);
        assert!(matches!(duplicate.validate(), Err(SceneError::DuplicatePlayer)));
    }

    #[test]
    fn test_fixed_player_rejected() {
        let config = SceneConfig::empty().with_body(BodySpec::new(
            "p",
            BodyRole::Player,
            BodyKind::Fixed,
            Shape::sphere(1.0),
            Vec3::ZERO,
        ));
        assert!(matches!(config.validate(), Err(SceneError::FixedPlayer)));
    }

    #[test]
    fn test_out_of_range_physics_settings_rejected() {
        for physics in [
            r#"{ "solver_iterations": 4000000000 }"#,
            r#"{ "penetration_slop": -0.5 }"#,
            r#"{ "sleep_time": -1.0 }"#,
        ] {
            let json = format!(
                r#"{{ "physics": {physics}, "bodies": [ {{ "role": "player", "shape": {{ "type": "sphere", "radius": 0.5 }} }} ] }}"#
            );
            assert!(
                matches!(
                    SceneConfig::from_json_str(&json),
                    Err(SceneError::Physics(PhysicsError::InvalidWorldConfig(_)))
                ),
                "accepted {physics}"
            );
        }

        let mut config = SceneConfig::default();
        config.physics.sleep_angular_threshold = f32::NAN;
        assert!(matches!(config.validate(), Err(SceneError::Physics(_))));
    }

    #[test]
    fn test_bad_json_reported() {
        assert!(matches!(SceneConfig::from_json_str("{ not json"), Err(SceneError::Json(_))));
        assert!(matches!(
            SceneConfig::from_json_str(r#"{ "bodies": [ { "shape": { "type": "cone" } } ] }"#),
            Err(SceneError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SceneConfig::load("/definitely/not/here/scene.json");
        assert!(matches!(result, Err(SceneError::Io(_))));
    }
}

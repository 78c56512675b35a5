use serde_derive::{Deserialize, Serialize};

use crate::errors::*;

/// Everything needed to build one maze.
///
/// Missing JSON fields take the defaults below, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// An empty seed asks for a random seed name.
    pub seed: String,
    pub depth: usize,
    pub width: usize,
    /// Fraction of the grid to carve, in `(0, 1]`.
    pub fill_ratio: f32,
    /// Let the last carving round finish even once the quota is met.
    pub allow_overfill: bool,
    /// Workers avoid digging into already busy tiles.
    pub smart_digging: bool,
    /// Attach repair wanderers to the corridors dug between orphans and spawn.
    pub wander_repairs: bool,
    pub allow_tunnels: bool,
    /// Chance for a tunnel capable tile to become a tunnel, in `[0, 1]`.
    pub tunnel_chance: f32,
}

impl Default for MazeConfig {
    fn default() -> MazeConfig {
        MazeConfig {
            seed: String::new(),
            depth: 20,
            width: 20,
            fill_ratio: 0.5,
            allow_overfill: false,
            smart_digging: true,
            wander_repairs: true,
            allow_tunnels: true,
            tunnel_chance: 0.25,
        }
    }
}

impl MazeConfig {
    pub fn from_json_str(json: &str) -> Result<MazeConfig> {
        let config: MazeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values no maze can be built from. Oversized or lopsided dimensions are
    /// not errors, the grid clamps those.
    pub fn validate(&self) -> Result<()> {
        if !(self.fill_ratio > 0.0 && self.fill_ratio <= 1.0) {
            bail!(ErrorKind::InvalidConfiguration(
                format!("fill ratio {} is outside (0, 1]", self.fill_ratio)));
        }
        if !(self.tunnel_chance >= 0.0 && self.tunnel_chance <= 1.0) {
            bail!(ErrorKind::InvalidConfiguration(
                format!("tunnel chance {} is outside [0, 1]", self.tunnel_chance)));
        }
        Ok(())
    }
}

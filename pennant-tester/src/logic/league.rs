use anyhow::{Context, Result, bail};
use pennant_game::{League, SimConfig};
use std::fs;
use std::path::Path;

/// League and config shared by every run in one tester invocation.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    pub league: League,
    pub config: SimConfig,
}

impl TesterAssets {
    /// Load the config and league from JSON files when given, otherwise use
    /// defaults and a synthetic league of `teams` teams.
    pub fn load(
        config_path: Option<&Path>,
        league_path: Option<&Path>,
        teams: usize,
        league_seed: u64,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => load_config(path)?,
            None => SimConfig::default(),
        };
        let league = match league_path {
            Some(path) => load_league(path)?,
            None => {
                if teams < 2 {
                    bail!("a synthetic league needs at least two teams (got {teams})");
                }
                League::synthetic(league_seed, teams)
            }
        };
        if league.len() < 2 {
            bail!("league must hold at least two teams (got {})", league.len());
        }
        Ok(Self { league, config })
    }
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    SimConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn load_league(path: &Path) -> Result<League> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read league {}", path.display()))?;
    League::from_json(&raw).with_context(|| format!("invalid league {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(label: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pennant-assets-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_to_a_synthetic_league() {
        let assets = TesterAssets::load(None, None, 6, 1).unwrap();
        assert_eq!(assets.league.len(), 6);
        assert_eq!(assets.config, SimConfig::default());
    }

    #[test]
    fn rejects_tiny_leagues() {
        assert!(TesterAssets::load(None, None, 1, 1).is_err());
    }

    #[test]
    fn loads_config_overrides_from_json() {
        let path = temp_file("config", r#"{ "error_rate": 0.05, "regulation_innings": 7 }"#);
        let assets = TesterAssets::load(Some(&path), None, 2, 1).unwrap();
        assert!((assets.config.error_rate - 0.05).abs() < f64::EPSILON);
        assert_eq!(assets.config.regulation_innings, 7);
    }

    #[test]
    fn reports_bad_config_with_context() {
        let path = temp_file("bad-config", r#"{ "error_rate": 4.0 }"#);
        let err = TesterAssets::load(Some(&path), None, 2, 1).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config"));
        let missing = Path::new("/nonexistent/pennant/config.json");
        assert!(TesterAssets::load(Some(missing), None, 2, 1).is_err());
    }

    #[test]
    fn loads_a_league_file() {
        let league = League::synthetic(4, 2);
        let path = temp_file("league", &serde_json::to_string(&league).unwrap());
        let assets = TesterAssets::load(None, Some(&path), 0, 0).unwrap();
        assert_eq!(assets.league, league);
    }
}

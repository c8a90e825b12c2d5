use crate::config::EngineConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads engine configuration by layering a TOML file and environment
    /// variables over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be parsed.
    pub fn load() -> Result<EngineConfig> {
        let config: EngineConfig = Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file("config/Engine.toml"))
            .merge(Env::prefixed("ODTE_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration with a profile-specific overlay
    /// (`config/Engine.<profile>.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed.
    pub fn load_with_profile(profile: &str) -> Result<EngineConfig> {
        let config: EngineConfig = Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file("config/Engine.toml"))
            .merge(Toml::file(format!("config/Engine.{profile}.toml")))
            .merge(Env::prefixed("ODTE_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }
}

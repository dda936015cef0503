use std::path::Path;

use crate::config::{check_date_format, ConfigKey, ConfigLayer, Overrides, Settings};
use crate::error::ConfigError;

pub fn set(overrides: &Overrides, key: &str, value: &str) -> anyhow::Result<()> {
    let path = overrides.config_path()?;
    let key = write_key(&path, key, value)?;

    println!("Set {} = {}", key, value);
    println!("Configuration saved to: {}", path.display());
    Ok(())
}

pub fn get(settings: &Settings, key: Option<&str>) -> anyhow::Result<()> {
    let Some(key) = key else {
        println!("Current configuration:");
        for key in ConfigKey::ALL {
            println!("  {}: {}", key, settings.get(key).unwrap_or_default());
        }
        return Ok(());
    };

    let key: ConfigKey = key.parse()?;
    match settings.get(key) {
        Some(value) => println!("{} = {}", key, value),
        None => println!("{} is not set", key),
    }
    Ok(())
}

/// Update one key in the config file at `path`, keeping the others.
fn write_key(path: &Path, key: &str, value: &str) -> Result<ConfigKey, ConfigError> {
    let key: ConfigKey = key.parse()?;
    if key == ConfigKey::DateFormat {
        check_date_format(value)?;
    }
    let mut layer = ConfigLayer::read(path)?;
    layer.set(key, value.to_string());
    layer.write(path)?;
    Ok(key)
}

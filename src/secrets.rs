use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{config_dir, NewsConfig};
use crate::error::{HarvestError, Result};

/// Try to run a shell command and capture stdout as a key
fn try_command_key(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        non_empty(&String::from_utf8_lossy(&output.stdout))
    } else {
        None
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let key = raw.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Stored key path: ~/.config/harvest/api_key
fn key_path() -> Option<PathBuf> {
    Some(config_dir()?.join("api_key"))
}

fn load_stored_key(path: &Path) -> Option<String> {
    let key = std::fs::read_to_string(path).ok()?;
    non_empty(&key)
}

/// Write the key readable by the owner only.
fn save_key(path: &Path, key: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // `mode` only applies on create; tighten a file left by an older run.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(key.as_bytes())
}

/// Find the news API key, trying in order:
/// 1. Environment variable named in config
/// 2. Stored key at ~/.config/harvest/api_key
/// 3. Shell command from config (result is stored for next time)
///
/// Returns `Ok(None)` when nothing is found and the endpoint does not need a
/// key from us.
pub fn load_api_key(news: &NewsConfig) -> Result<Option<String>> {
    let key = find_key(news, key_path().as_deref(), |var| std::env::var(var).ok());

    match key {
        Some(key) => Ok(Some(key)),
        None if news.requires_api_key() => Err(HarvestError::Auth(format!(
            "No API key found for {}. Set {} or configure api_key_command.",
            news.endpoint,
            news.api_key_env.as_deref().unwrap_or("an api_key_env variable")
        ))),
        None => {
            debug!(endpoint = %news.endpoint, "no API key, assuming endpoint injects credentials");
            Ok(None)
        }
    }
}

fn find_key(
    news: &NewsConfig,
    stored: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    if let Some(var) = &news.api_key_env {
        if let Some(key) = env(var).as_deref().and_then(non_empty) {
            return Some(key);
        }
    }

    if let Some(key) = stored.and_then(load_stored_key) {
        return Some(key);
    }

    let key = try_command_key(news.api_key_command.as_deref()?)?;
    if let Some(path) = stored {
        if let Err(e) = save_key(path, &key) {
            warn!(error = %e, "could not store API key");
        }
    }
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_key_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("harvest-test-{}-{}", name, std::process::id()))
            .join("api_key")
    }

    fn news() -> NewsConfig {
        NewsConfig {
            api_key_env: Some("HARVEST_TEST_KEY".to_string()),
            api_key_command: None,
            ..NewsConfig::default()
        }
    }

    #[test]
    fn env_var_wins() {
        let key = find_key(&news(), None, |var| {
            assert_eq!(var, "HARVEST_TEST_KEY");
            Some("from-env".to_string())
        });
        assert_eq!(key.as_deref(), Some("from-env"));
    }

    #[test]
    fn blank_env_var_is_skipped() {
        let key = find_key(&news(), None, |_| Some("  \n".to_string()));
        assert_eq!(key, None);
    }

    #[test]
    fn stored_key_is_used() {
        let path = temp_key_path("stored");
        save_key(&path, "stored-key\n").unwrap();
        let key = find_key(&news(), Some(&path), |_| None);
        assert_eq!(key.as_deref(), Some("stored-key"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn command_key_is_stored() {
        let path = temp_key_path("command");
        let config = NewsConfig {
            api_key_command: Some("echo from-command".to_string()),
            ..news()
        };
        let key = find_key(&config, Some(&path), |_| None);
        assert_eq!(key.as_deref(), Some("from-command"));
        assert_eq!(load_stored_key(&path).as_deref(), Some("from-command"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn stored_key_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_key_path("mode");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        save_key(&path, "k").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(load_stored_key(&path).as_deref(), Some("k"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn failing_command_yields_nothing() {
        let config = NewsConfig {
            api_key_command: Some("exit 1".to_string()),
            ..news()
        };
        assert_eq!(find_key(&config, None, |_| None), None);
    }
}

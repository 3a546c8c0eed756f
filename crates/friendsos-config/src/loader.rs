// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./friendsos.toml` > `~/.config/friendsos/friendsos.toml` >
//! `/etc/friendsos/friendsos.toml`, with `FRIENDSOS_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FriendsosConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/friendsos/friendsos.toml";
pub const LOCAL_CONFIG_FILE: &str = "friendsos.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("friendsos").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/friendsos/friendsos.toml`
/// 3. `~/.config/friendsos/friendsos.toml`
/// 4. `./friendsos.toml`
/// 5. `FRIENDSOS_*` environment variables
pub fn load_config() -> Result<FriendsosConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<FriendsosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FriendsosConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FriendsosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FriendsosConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FriendsosConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Env provider mapping the first `_` after a section name to a dot.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `FRIENDSOS_CHECKIN_PERSIST_RETRIES` must become
/// `checkin.persist_retries`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("FRIENDSOS_").map(|key| map_env_key(key.as_str()).into())
}

const SECTIONS: [&str; 4] = ["app", "checkin", "storage", "dispatch"];

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("checkin_persist_retries"), "checkin.persist_retries");
        assert_eq!(map_env_key("app_log_level"), "app.log_level");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(map_env_key("dispatch_send_spacing_ms"), "dispatch.send_spacing_ms");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }

    #[test]
    fn env_overrides_apply_through_provider() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("FRIENDSOS_CHECKIN_DEFAULT_MAX_NOTIFICATIONS", "7");
            jail.set_env("FRIENDSOS_APP_USER_ID", "dana");
            let config: FriendsosConfig = Figment::new()
                .merge(Serialized::defaults(FriendsosConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.checkin.default_max_notifications, 7);
            assert_eq!(config.app.user_id, "dana");
            Ok(())
        });
    }
}

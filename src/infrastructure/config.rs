use crate::infrastructure::error::StoreError;
use crate::infrastructure::supabase_client::SupabaseConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const PREFERENCES_JSON: &str = "preferences.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigBundle {
    pub app: serde_json::Value,
    pub preferences: serde_json::Value,
}

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([
        (
            APP_JSON,
            serde_json::json!({
                "schema": 1,
                "appName": "EZ Grades",
                "fallbackDelayMs": 600,
                "chatReplyDelayMs": 800
            }),
        ),
        (
            PREFERENCES_JSON,
            serde_json::json!({
                "schema": 1,
                "theme": "system",
                "focusDurationMinutes": 25,
                "breakDurationMinutes": 5,
                "notificationsEnabled": true,
                "soundEnabled": true,
                "autoStartFocus": false,
                "autoStartBreak": false
            }),
        ),
    ])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), StoreError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, StoreError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| StoreError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(StoreError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_configs(config_dir: &Path) -> Result<ConfigBundle, StoreError> {
    Ok(ConfigBundle {
        app: read_config(&config_dir.join(APP_JSON))?,
        preferences: read_config(&config_dir.join(PREFERENCES_JSON))?,
    })
}

pub fn read_fallback_delay_ms(config_dir: &Path) -> Result<u64, StoreError> {
    let app = read_config(&config_dir.join(APP_JSON))?;
    Ok(app
        .get("fallbackDelayMs")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(600))
}

pub fn read_chat_reply_delay_ms(config_dir: &Path) -> Result<u64, StoreError> {
    let app = read_config(&config_dir.join(APP_JSON))?;
    Ok(app
        .get("chatReplyDelayMs")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(800))
}

pub fn read_default_durations(config_dir: &Path) -> Result<(u32, u32), StoreError> {
    let preferences = read_config(&config_dir.join(PREFERENCES_JSON))?;
    let focus = preferences
        .get("focusDurationMinutes")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(25)
        .max(1) as u32;
    let break_minutes = preferences
        .get("breakDurationMinutes")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(5)
        .max(1) as u32;
    Ok((focus, break_minutes))
}

pub fn load_supabase_config_from_env() -> Result<SupabaseConfig, StoreError> {
    load_supabase_config_from_lookup(|key| std::env::var(key).ok())
}

pub fn load_supabase_config_from_lookup<F>(lookup: F) -> Result<SupabaseConfig, StoreError>
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = required_lookup_value(
        &lookup,
        &["EZGRADES_SUPABASE_URL", "SUPABASE_URL"],
        "supabase url",
    )?;
    let anon_key = required_lookup_value(
        &lookup,
        &["EZGRADES_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY"],
        "supabase anon key",
    )?;
    Ok(SupabaseConfig { base_url, anon_key })
}

fn required_lookup_value<F>(lookup: &F, keys: &[&str], field_name: &str) -> Result<String, StoreError>
where
    F: Fn(&str) -> Option<String>,
{
    optional_lookup_value(lookup, keys).ok_or_else(|| {
        StoreError::InvalidConfig(format!(
            "missing {} (set one of: {})",
            field_name,
            keys.join(", ")
        ))
    })
}

fn optional_lookup_value<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    for key in keys {
        if let Some(value) = lookup(key) {
            let normalized = value.trim();
            if !normalized.is_empty() {
                return Some(normalized.to_string());
            }
        }
    }
    None
}

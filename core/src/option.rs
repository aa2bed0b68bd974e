//! Option descriptors and hierarchical property merging (spec §4.3,
//! component F).

use std::collections::BTreeMap;

use crate::error::{GatewayError, Result};

/// The default prefix under which every gateway-recognized property key is
/// scoped (spec §4.3, §6): `<prefix>.<option>` or `<prefix>.<ext>.<option>`.
pub const DEFAULT_PREFIX: &str = "gw";

/// The pseudo-extension name used for options that apply to the block's
/// default (unnamed) extension, per `<prefix>.<option>` in spec §4.3.
pub const DEFAULT_EXTENSION: &str = "";

/// `{name, description, default, choices[]}` (spec §4.3).
#[derive(Debug, Clone)]
pub struct OptionDescriptor {
    pub name: String,
    pub description: String,
    pub default: String,
    pub choices: Vec<String>,
}

impl OptionDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default: default.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choices(mut self, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides `default` from `<PREFIX>_<OPTION>` (uppercased, `.` -> `_`)
    /// if that environment variable is set. Spec §4.3: this only ever
    /// happens at registration time, never during per-block resolution.
    pub fn apply_env_override(&mut self, prefix: &str) {
        let var_name = format!(
            "{}_{}",
            prefix.to_ascii_uppercase(),
            self.name.to_ascii_uppercase().replace('.', "_")
        );
        if let Ok(value) = std::env::var(&var_name) {
            self.default = value;
        }
    }
}

/// An immutable-once-resolved bag of string properties (spec §4.3: "the
/// resolved config is immutable for that block").
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: BTreeMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: &[OptionDescriptor]) -> Self {
        let mut values = BTreeMap::new();
        for d in descriptors {
            values.insert(d.name.clone(), d.default.clone());
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(v) => matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
            None => default,
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlays every entry from `overlay`, later values winning on
    /// collision (spec §4.3 step 2/3).
    pub fn overlay(&mut self, overlay: &Config) {
        for (k, v) in overlay.iter() {
            self.set(k, v);
        }
    }

    pub fn overlay_pairs<'a>(&mut self, pairs: impl IntoIterator<Item = (&'a String, &'a String)>) {
        for (k, v) in pairs {
            self.set(k.clone(), v.clone());
        }
    }

    /// Overlays entries from `properties` whose key is scoped to `ext_name`
    /// under `prefix`, stripping the prefix before inserting (spec §4.3 step
    /// 2: `<prefix>.<ext>.<option>`, or `<prefix>.<option>` when `ext_name`
    /// is [DEFAULT_EXTENSION]).
    pub fn overlay_scoped(&mut self, properties: &Config, prefix: &str, ext_name: &str) {
        let scoped_prefix = if ext_name == DEFAULT_EXTENSION {
            format!("{prefix}.")
        } else {
            format!("{prefix}.{ext_name}.")
        };
        for (k, v) in properties.iter() {
            if let Some(suffix) = k.strip_prefix(&scoped_prefix) {
                // Skip keys that are themselves extension-scoped
                // (`gw.<other-ext>.<opt>`) when resolving the default
                // extension's bare `gw.<opt>` keys.
                if ext_name == DEFAULT_EXTENSION && suffix.is_empty() {
                    continue;
                }
                self.set(suffix, v);
            }
        }
    }
}

/// Loads a Java-properties-style file: `key=value` or `key: value` lines,
/// `#`/`!` full-line comments, and `\`-continued lines (spec §6: "Persisted
/// state" / "config.path").
pub fn load_properties_file(contents: &str) -> Result<Config> {
    let mut config = Config::new();
    let mut pending: Option<String> = None;

    for raw_line in contents.lines() {
        let line = match pending.take() {
            Some(prefix) => format!("{prefix}{raw_line}"),
            None => raw_line.to_string(),
        };
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        if let Some(stripped) = line.strip_suffix('\\') {
            pending = Some(stripped.to_string());
            continue;
        }
        let (key, value) = split_property_line(trimmed)?;
        config.set(key, value);
    }
    if pending.is_some() {
        return Err(GatewayError::client(
            "properties file ends with a dangling line continuation",
        ));
    }
    Ok(config)
}

fn split_property_line(line: &str) -> Result<(String, String)> {
    let eq = line.find('=');
    let colon = line.find(':');
    let sep = match (eq, colon) {
        (Some(e), Some(c)) => e.min(c),
        (Some(e), None) => e,
        (None, Some(c)) => c,
        (None, None) => {
            return Err(GatewayError::client(format!(
                "malformed properties line: {line}"
            )))
        }
    };
    let (key, value) = line.split_at(sep);
    Ok((key.trim().to_string(), value[1..].trim().to_string()))
}

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};

use crate::{DESKTOP_STATE_FILE, LOCALE_ENV};

const LOCALE_FIELD: &str = "locale";

fn empty_state_object() -> Value {
    Value::Object(Map::new())
}

#[derive(Debug, Clone, Copy)]
pub struct ShellTexts {
    pub window_title: &'static str,
    pub close_deferred: &'static str,
}

pub fn shell_texts_for_locale(locale: &str) -> ShellTexts {
    if locale == "tr" {
        return ShellTexts {
            window_title: "Ro-Start - Hoş Geldiniz",
            close_deferred: "Sistem güncellemesi sürüyor; pencere güncelleme bitince kapanacak.",
        };
    }

    ShellTexts {
        window_title: "Ro-Start - Welcome",
        close_deferred: "System update in progress; the window will close when it finishes.",
    }
}

pub fn resolve_shell_locale(
    default_shell_locale: &'static str,
    state_root_dir: Option<PathBuf>,
) -> &'static str {
    if let Some(locale) = read_cached_shell_locale(state_root_dir.as_deref()) {
        return locale;
    }

    for env_key in [LOCALE_ENV, "LC_ALL", "LANG"] {
        if let Ok(value) = env::var(env_key) {
            if let Some(locale) = normalize_shell_locale(&value) {
                return locale;
            }
        }
    }

    default_shell_locale
}

/// Texts for the locale in effect right now, so a locale change made at
/// runtime shows up without a restart.
pub(crate) fn current_shell_texts(
    default_shell_locale: &'static str,
    state_root_dir: Option<PathBuf>,
) -> ShellTexts {
    shell_texts_for_locale(resolve_shell_locale(default_shell_locale, state_root_dir))
}

pub(crate) fn normalize_shell_locale(raw: &str) -> Option<&'static str> {
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered.starts_with("tr") {
        return Some("tr");
    }
    if lowered.starts_with("en") {
        return Some("en");
    }
    None
}

fn desktop_state_path(state_root_dir: Option<&Path>) -> Option<PathBuf> {
    state_root_dir.map(|root| root.join("data").join(DESKTOP_STATE_FILE))
}

fn read_cached_shell_locale(state_root_dir: Option<&Path>) -> Option<&'static str> {
    let state_path = desktop_state_path(state_root_dir)?;
    let raw = fs::read_to_string(state_path).ok()?;
    let parsed: Value = serde_json::from_str(&raw).ok()?;
    let locale = parsed.get(LOCALE_FIELD)?.as_str()?;
    normalize_shell_locale(locale)
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = empty_state_object();
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just normalized into a JSON object"),
    }
}

pub(crate) fn write_cached_shell_locale(
    locale: Option<&str>,
    state_root_dir: Option<&Path>,
) -> Result<(), String> {
    let normalized_locale = locale.and_then(normalize_shell_locale);
    if let Some(raw_locale) = locale {
        if normalized_locale.is_none() {
            crate::append_desktop_log(&format!(
                "unsupported shell locale '{raw_locale}'; clearing cached locale"
            ));
        }
    }

    let Some(state_path) = desktop_state_path(state_root_dir) else {
        crate::append_desktop_log("desktop state path is unavailable; skipping locale persistence");
        return Ok(());
    };

    if let Some(parent_dir) = state_path.parent() {
        fs::create_dir_all(parent_dir).map_err(|error| {
            format!(
                "Failed to create desktop state directory {}: {}",
                parent_dir.display(),
                error
            )
        })?;
    }

    let mut parsed = match fs::read_to_string(&state_path) {
        Ok(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(error) => {
                crate::append_desktop_log(&format!(
                    "failed to parse desktop state {}: {}. resetting state file",
                    state_path.display(),
                    error
                ));
                empty_state_object()
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => empty_state_object(),
        Err(error) => {
            return Err(format!(
                "Failed to read desktop state {}: {}",
                state_path.display(),
                error
            ));
        }
    };
    let object = ensure_object(&mut parsed);

    if let Some(normalized_locale) = normalized_locale {
        object.insert(
            LOCALE_FIELD.to_string(),
            Value::String(normalized_locale.to_string()),
        );
    } else {
        object.remove(LOCALE_FIELD);
    }

    let serialized = serde_json::to_string_pretty(&parsed)
        .map_err(|error| format!("Failed to serialize desktop state: {error}"))?;
    fs::write(&state_path, serialized).map_err(|error| {
        format!(
            "Failed to write desktop state {}: {}",
            state_path.display(),
            error
        )
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_texts_for_locale_returns_turkish_copy() {
        let texts = shell_texts_for_locale("tr");
        assert_eq!(texts.window_title, "Ro-Start - Hoş Geldiniz");
    }

    #[test]
    fn shell_texts_for_locale_falls_back_to_english_copy() {
        let texts = shell_texts_for_locale("de");
        assert_eq!(texts.window_title, "Ro-Start - Welcome");
    }

    #[test]
    fn normalize_shell_locale_accepts_language_prefixes() {
        assert_eq!(normalize_shell_locale("tr_TR.UTF-8"), Some("tr"));
        assert_eq!(normalize_shell_locale("EN_us"), Some("en"));
        assert_eq!(normalize_shell_locale("fr-FR"), None);
        assert_eq!(normalize_shell_locale(""), None);
    }

    #[test]
    fn write_cached_shell_locale_preserves_other_fields() {
        let temp = tempfile::TempDir::new().unwrap();
        let state_path = desktop_state_path(Some(temp.path())).unwrap();
        fs::create_dir_all(state_path.parent().unwrap()).unwrap();
        fs::write(&state_path, r#"{"seen_welcome": true}"#).unwrap();

        write_cached_shell_locale(Some("tr_TR"), Some(temp.path())).unwrap();

        let raw = fs::read_to_string(&state_path).unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["locale"], "tr");
        assert_eq!(parsed["seen_welcome"], true);
        assert_eq!(read_cached_shell_locale(Some(temp.path())), Some("tr"));
    }

    #[test]
    fn write_cached_shell_locale_resets_non_object_state() {
        let temp = tempfile::TempDir::new().unwrap();
        let state_path = desktop_state_path(Some(temp.path())).unwrap();
        fs::create_dir_all(state_path.parent().unwrap()).unwrap();
        fs::write(&state_path, "[1, 2, 3]").unwrap();

        write_cached_shell_locale(Some("en-US"), Some(temp.path())).unwrap();
        assert_eq!(read_cached_shell_locale(Some(temp.path())), Some("en"));
    }

    #[test]
    fn write_cached_shell_locale_clears_unsupported_locale() {
        let temp = tempfile::TempDir::new().unwrap();
        write_cached_shell_locale(Some("tr"), Some(temp.path())).unwrap();
        write_cached_shell_locale(Some("fr"), Some(temp.path())).unwrap();
        assert_eq!(read_cached_shell_locale(Some(temp.path())), None);
    }

    #[test]
    fn resolve_shell_locale_prefers_cached_value() {
        let temp = tempfile::TempDir::new().unwrap();
        write_cached_shell_locale(Some("tr"), Some(temp.path())).unwrap();
        assert_eq!(resolve_shell_locale("en", Some(temp.path().to_path_buf())), "tr");
    }

    #[test]
    fn current_shell_texts_follows_locale_changed_at_runtime() {
        let temp = tempfile::TempDir::new().unwrap();
        write_cached_shell_locale(Some("en"), Some(temp.path())).unwrap();
        let before = current_shell_texts("en", Some(temp.path().to_path_buf()));
        assert_eq!(before.close_deferred, shell_texts_for_locale("en").close_deferred);

        write_cached_shell_locale(Some("tr"), Some(temp.path())).unwrap();
        let after = current_shell_texts("en", Some(temp.path().to_path_buf()));
        assert_eq!(after.close_deferred, shell_texts_for_locale("tr").close_deferred);
        assert_eq!(after.window_title, "Ro-Start - Hoş Geldiniz");
    }
}

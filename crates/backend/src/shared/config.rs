use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Переменная окружения с явным путём к config.toml
pub const CONFIG_ENV_VAR: &str = "SIGNAGE_TASKS_CONFIG";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Пользователь, от имени которого сохраняются настройки UI
    pub user: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            user: "admin".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,sqlx=warn,sea_orm=warn".to_string(),
            dir: "target/logs".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TasksConfig {
    /// Корень, относительно которого хранятся пути к дескрипторам
    pub root_dir: String,
    pub builtin_dir: String,
    pub custom_dir: String,
    pub worker_interval_seconds: u64,
    /// Запрет на добавление/изменение/удаление заданий
    pub config_locked: bool,
    /// Пользователь, от имени которого выполняются задания
    pub run_as: String,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            root_dir: ".".to_string(),
            builtin_dir: "tasks".to_string(),
            custom_dir: "custom".to_string(),
            worker_interval_seconds: 60,
            config_locked: false,
            run_as: "system".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub default_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 3600,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"
"#;

/// Locate config.toml
///
/// Search order:
/// 1. `$SIGNAGE_TASKS_CONFIG`
/// 2. Next to the executable (for production)
/// 3. Current directory (for development)
///
/// `None` means the embedded default config is used. Runs before the
/// tracing subscriber exists, so the caller logs the result.
pub fn find_config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(explicit));
    }

    let mut candidates = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.join("config.toml"));
        }
    }
    candidates.push(PathBuf::from("config.toml"));

    candidates.into_iter().find(|path| path.exists())
}

/// Load configuration from the given file, or the embedded default
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
            parse_config(&contents)
        }
        None => parse_config(DEFAULT_CONFIG),
    }
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(contents)?)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> PathBuf {
    resolve_path(&config.database.path)
}

/// Корень дескрипторов заданий
pub fn get_tasks_root(config: &Config) -> PathBuf {
    resolve_path(&config.tasks.root_dir)
}

fn resolve_path(raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.tasks.builtin_dir, "tasks");
        assert_eq!(config.tasks.worker_interval_seconds, 60);
        assert!(!config.tasks.config_locked);
        assert_eq!(config.cache.default_ttl_seconds, 3600);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = parse_config(
            r#"
            [database]
            path = "/var/lib/signage/app.db"

            [tasks]
            config_locked = true
            custom_dir = "plugins"
            "#,
        )
        .unwrap();

        assert!(config.tasks.config_locked);
        assert_eq!(config.tasks.custom_dir, "plugins");
        assert_eq!(config.tasks.builtin_dir, "tasks");
        assert_eq!(config.tasks.run_as, "system");
        assert_eq!(
            get_database_path(&config),
            PathBuf::from("/var/lib/signage/app.db")
        );
    }

    #[test]
    fn test_load_from_file_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\npath = \"data/app.db\"\n[server]\nport = 8080\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.database.path, "data/app.db");
        assert_eq!(config.server.port, 8080);

        let config = load_config(None).unwrap();
        assert_eq!(config.database.path, "target/db/app.db");

        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_missing_database_section_is_an_error() {
        assert!(parse_config("[server]\nport = 8080\n").is_err());
    }
}

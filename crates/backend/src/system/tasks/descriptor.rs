use contracts::system::tasks::descriptor::TaskDescriptor;
use std::path::{Component, Path, PathBuf};

use super::error::DescriptorError;
use crate::shared::config::TasksConfig;

const DESCRIPTOR_EXTENSION: &str = "task";

/// Каталоги с дескрипторами заданий (`*.task`): встроенные и пользовательские.
///
/// Пути дескрипторов хранятся относительно `root`, например `tasks/purge-logs.task`.
#[derive(Debug, Clone)]
pub struct DescriptorCatalog {
    root: PathBuf,
    dirs: Vec<String>,
}

impl DescriptorCatalog {
    pub fn new(root: impl Into<PathBuf>, builtin_dir: &str, custom_dir: &str) -> Self {
        Self {
            root: root.into(),
            dirs: vec![normalize(builtin_dir), normalize(custom_dir)],
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &TasksConfig) -> Self {
        Self::new(root, &config.builtin_dir, &config.custom_dir)
    }

    /// Все дескрипторы: сначала встроенные, затем пользовательские, по имени файла.
    /// Отсутствующий каталог считается пустым, нечитаемые файлы пропускаются.
    pub fn discover(&self) -> Result<Vec<TaskDescriptor>, DescriptorError> {
        let mut descriptors = Vec::new();

        for dir in &self.dirs {
            let full_dir = self.root.join(dir);
            let entries = match std::fs::read_dir(&full_dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!("Task directory {} does not exist", full_dir.display());
                    continue;
                }
                Err(source) => {
                    return Err(DescriptorError::Io {
                        path: full_dir.display().to_string(),
                        source,
                    })
                }
            };

            let mut files: Vec<String> = entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
                .filter(|name| has_descriptor_extension(name))
                .collect();
            files.sort();

            for file in files {
                match self.read(&format!("{}/{}", dir, file)) {
                    Ok(descriptor) => descriptors.push(descriptor),
                    Err(e) => tracing::warn!("Skipping task descriptor: {}", e),
                }
            }
        }

        Ok(descriptors)
    }

    /// Загружает дескриптор по пути, присланному клиентом.
    /// Путь обязан указывать на `.task` файл непосредственно в одном из каталогов.
    pub fn load(&self, file: &str) -> Result<TaskDescriptor, DescriptorError> {
        let relative = normalize(file);
        let path = Path::new(&relative);

        let plain = path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        let in_task_dir = path
            .parent()
            .and_then(|p| p.to_str())
            .is_some_and(|parent| self.dirs.iter().any(|d| d == parent));

        if !plain || !in_task_dir || !has_descriptor_extension(&relative) {
            return Err(DescriptorError::OutsideTaskDirs(file.to_string()));
        }

        self.read(&relative)
    }

    fn read(&self, relative: &str) -> Result<TaskDescriptor, DescriptorError> {
        let full_path = self.root.join(relative);
        let contents = std::fs::read_to_string(&full_path).map_err(|source| DescriptorError::Io {
            path: relative.to_string(),
            source,
        })?;

        let mut descriptor: TaskDescriptor =
            serde_json::from_str(&contents).map_err(|source| DescriptorError::Parse {
                path: relative.to_string(),
                source,
            })?;
        descriptor.file = relative.to_string();
        Ok(descriptor)
    }
}

fn has_descriptor_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == DESCRIPTOR_EXTENSION)
}

/// `./tasks/` → `tasks`, разделители приводятся к `/`
fn normalize(raw: &str) -> String {
    let replaced = raw.replace('\\', "/");
    let trimmed = replaced.trim_start_matches("./").trim_matches('/');
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn catalog_with_files() -> (tempfile::TempDir, DescriptorCatalog) {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "tasks/b-purge.task",
            r#"{"name": "Purge", "class": "maintenance.purge_logs", "options": {"max_age_days": 30}}"#,
        );
        write(
            dir.path(),
            "tasks/a-cache.task",
            r#"{"name": "Cache", "class": "maintenance.expire_cache"}"#,
        );
        write(dir.path(), "tasks/readme.txt", "not a descriptor");
        write(
            dir.path(),
            "custom/report.task",
            r#"{"name": "Report", "class": "custom.report", "options": {"send": true}}"#,
        );
        let catalog = DescriptorCatalog::new(dir.path(), "tasks", "./custom/");
        (dir, catalog)
    }

    #[test]
    fn test_discover_orders_builtin_then_custom() {
        let (_dir, catalog) = catalog_with_files();
        let found = catalog.discover().unwrap();
        let files: Vec<&str> = found.iter().map(|d| d.file.as_str()).collect();
        assert_eq!(
            files,
            vec!["tasks/a-cache.task", "tasks/b-purge.task", "custom/report.task"]
        );
        assert_eq!(found[1].options.get("max_age_days").map(String::as_str), Some("30"));
        assert_eq!(found[2].options.get("send").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_missing_directories_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = DescriptorCatalog::new(dir.path(), "tasks", "custom");
        assert!(catalog.discover().unwrap().is_empty());
    }

    #[test]
    fn test_load_rejects_paths_outside_task_dirs() {
        let (_dir, catalog) = catalog_with_files();

        assert_eq!(catalog.load("tasks/b-purge.task").unwrap().name, "Purge");
        assert_eq!(catalog.load("./custom/report.task").unwrap().class, "custom.report");

        for bad in [
            "tasks/readme.txt",
            "tasks/../custom/report.task",
            "/etc/passwd.task",
            "other/x.task",
            "b-purge.task",
        ] {
            assert!(
                matches!(catalog.load(bad), Err(DescriptorError::OutsideTaskDirs(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let (dir, catalog) = catalog_with_files();
        write(dir.path(), "custom/broken.task", "{ nope");
        assert!(matches!(
            catalog.load("custom/broken.task"),
            Err(DescriptorError::Parse { .. })
        ));
        assert_eq!(catalog.discover().unwrap().len(), 3);
    }
}

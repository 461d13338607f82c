use std::env;
use std::fs;
use std::path::Path;

/// Кладёт config.toml и встроенные дескрипторы заданий рядом с бинарником,
/// где их ищет `find_config_path` и каталог дескрипторов.
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");
    println!("cargo:rerun-if-changed=../../tasks");

    // OUT_DIR is typically: target/debug/build/signage-tasks-xxx/out
    let out_dir = env::var("OUT_DIR").unwrap();
    let profile = env::var("PROFILE").unwrap(); // "debug" or "release"
    let target_dir = Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .expect("Could not find target profile directory")
        .to_path_buf();

    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("Could not find workspace root");

    let source_config = workspace_root.join("config.toml");
    if source_config.exists() {
        let dest_config = target_dir.join("config.toml");
        fs::copy(&source_config, &dest_config)
            .unwrap_or_else(|e| panic!("Failed to copy config.toml: {}", e));
    } else {
        println!("cargo:warning=config.toml not found at {:?}, using default config", source_config);
    }

    let source_tasks = workspace_root.join("tasks");
    let dest_tasks = target_dir.join("tasks");
    if let Ok(entries) = fs::read_dir(&source_tasks) {
        fs::create_dir_all(&dest_tasks)
            .unwrap_or_else(|e| panic!("Failed to create {:?}: {}", dest_tasks, e));
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "task") {
                fs::copy(&path, dest_tasks.join(entry.file_name()))
                    .unwrap_or_else(|e| panic!("Failed to copy {:?}: {}", path, e));
            }
        }
    }
}

use derive_new::new;
use filetime::FileTime;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file_spec: FileSpec) {
    // make sure the parent directory exists
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    std::fs::write(&file_spec.path, &file_spec.content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", file_spec.path, e));
}

/// Write `count` files with random names and prose under `dir`
pub fn write_generated_files(dir: &Path, count: usize) -> Vec<FileSpec> {
    use fake::{
        Fake,
        faker::lorem::en::{Word, Words},
    };

    (0..count)
        .map(|i| {
            let file_name = format!("{}_{i}.txt", Word().fake::<String>());
            let file_content = (0..(3..8).fake::<usize>())
                .map(|_| Words(5..10).fake::<Vec<String>>().join(" ") + "\n")
                .collect::<String>();

            let file_spec = FileSpec::new(dir.join(file_name), file_content);
            write_file(file_spec.clone());

            file_spec
        })
        .collect()
}

pub fn create_directory(path: &Path) {
    std::fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", path, e));
}

pub fn delete_path(path: &Path) {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    result.unwrap_or_else(|e| panic!("Failed to delete {:?}: {}", path, e));
}

/// Set the modification time of `path` to `age` in the past
pub fn age_file(path: &Path, age: Duration) {
    let mtime = FileTime::from_system_time(SystemTime::now() - age);
    filetime::set_file_mtime(path, mtime)
        .unwrap_or_else(|e| panic!("Failed to set mtime of {:?}: {}", path, e));
}

pub fn file_mtime(path: &Path) -> FileTime {
    let metadata = std::fs::metadata(path)
        .unwrap_or_else(|e| panic!("Failed to stat {:?}: {}", path, e));
    FileTime::from_last_modification_time(&metadata)
}

pub fn set_file_mtime(path: &Path, mtime: FileTime) {
    filetime::set_file_mtime(path, mtime)
        .unwrap_or_else(|e| panic!("Failed to set mtime of {:?}: {}", path, e));
}

use crate::domain::error::{ExportError, ExportResult};
use crate::domain::predicate::EdgeFilter;
use std::path::{Path, PathBuf};

/// Namespaces the analyzer skips unless told otherwise.
pub const DEFAULT_EXCLUDES: [&str; 4] = ["java.*", "org.slf4j.*", "com.sun.*", "com.google.*"];

pub const DEFAULT_NEO4J_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_NEO4J_USER: &str = "neo4j";
pub const DEFAULT_NEO4J_PASSWORD: &str = "12345";

pub const SQLITE_DEFAULT_FILE: &str = "callgraph.sqlite";

/// Options handed to the analysis engine. Not interpreted by the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Classpath root holding the input archives
    pub input_folder: PathBuf,
    /// Absolute paths of the archives to analyze, sorted
    pub input_archives: Vec<PathBuf>,
    /// Entry-point class, e.g. `jadx.gui.JadxGUI`
    pub main_class: String,
    pub excludes: Vec<String>,
    pub app_mode: bool,
    pub whole_program: bool,
    pub prepend_classpath: bool,
    pub allow_phantom_refs: bool,
    pub no_bodies_for_excluded: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::new(),
            input_archives: Vec::new(),
            main_class: String::new(),
            excludes: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            app_mode: true,
            whole_program: true,
            prepend_classpath: true,
            allow_phantom_refs: true,
            no_bodies_for_excluded: true,
        }
    }
}

impl EngineConfig {
    /// Build the engine configuration from the `.jar` files in `input_folder`.
    ///
    /// A jar is kept when its file name contains any of `archive_filters`
    /// (all jars when the list is empty). Finding none is a configuration error.
    pub fn discover(
        input_folder: &Path,
        archive_filters: &[String],
        main_class: impl Into<String>,
    ) -> ExportResult<Self> {
        let entries = std::fs::read_dir(input_folder).map_err(|e| {
            ExportError::Configuration(format!(
                "cannot list input folder {}: {e}",
                input_folder.display()
            ))
        })?;

        let mut input_archives = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ExportError::io(input_folder, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if is_selected_archive(&file_name, archive_filters) {
                let absolute = std::path::absolute(&path).map_err(|e| ExportError::io(&path, e))?;
                input_archives.push(absolute);
            }
        }

        if input_archives.is_empty() {
            return Err(ExportError::Configuration(format!(
                "Couldn't find any .jar files matching predicate at {}",
                input_folder.display()
            )));
        }
        input_archives.sort();

        Ok(Self {
            input_folder: input_folder.to_path_buf(),
            input_archives,
            main_class: main_class.into(),
            ..Self::default()
        })
    }
}

fn is_selected_archive(file_name: &str, filters: &[String]) -> bool {
    file_name.to_lowercase().ends_with(".jar")
        && (filters.is_empty() || filters.iter().any(|f| file_name.contains(f.as_str())))
}

/// Where admitted edges go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    Json {
        output_folder: PathBuf,
    },
    Neo4j {
        uri: String,
        user: String,
        password: String,
        class_graph: bool,
    },
    Sqlite {
        path: PathBuf,
        class_graph: bool,
    },
}

/// Immutable configuration of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub engine: EngineConfig,
    pub filter: EdgeFilter,
    pub sink: SinkConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn folder_with(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for f in files {
            fs::write(dir.path().join(f), b"PK").unwrap();
        }
        dir
    }

    #[test]
    fn test_discovers_all_jars_without_filters() {
        let dir = folder_with(&["b.jar", "a.JAR", "notes.txt"]);
        let cfg = EngineConfig::discover(dir.path(), &[], "Main").unwrap();
        let names: Vec<String> = cfg
            .input_archives
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JAR", "b.jar"]);
        assert!(cfg.input_archives.iter().all(|p| p.is_absolute()));
        assert_eq!(cfg.main_class, "Main");
        assert_eq!(cfg.excludes.len(), 4);
    }

    #[test]
    fn test_filters_match_file_name_substrings() {
        let dir = folder_with(&["jadx-core.jar", "jadx-gui.jar", "slf4j.jar"]);
        let cfg = EngineConfig::discover(dir.path(), &["jadx".to_string()], "Main").unwrap();
        assert_eq!(cfg.input_archives.len(), 2);
    }

    #[test]
    fn test_no_matching_jars_is_configuration_error() {
        let dir = folder_with(&["readme.md"]);
        let err = EngineConfig::discover(dir.path(), &[], "Main").unwrap_err();
        assert!(matches!(err, ExportError::Configuration(_)));
    }

    #[test]
    fn test_missing_folder_is_configuration_error() {
        let err = EngineConfig::discover(Path::new("/nonexistent/input-12345"), &[], "Main")
            .unwrap_err();
        assert!(matches!(err, ExportError::Configuration(_)));
    }

    #[test]
    fn test_directories_named_like_jars_are_skipped() {
        let dir = folder_with(&["real.jar"]);
        fs::create_dir(dir.path().join("fake.jar")).unwrap();
        let cfg = EngineConfig::discover(dir.path(), &[], "Main").unwrap();
        assert_eq!(cfg.input_archives.len(), 1);
    }
}

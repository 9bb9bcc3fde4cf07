//! Loads the project configuration from a `_config.yml` file. Known keys
//! control where layouts are read from and where pages are written; every
//! other key is kept as a site variable and exposed to templates as
//! `site.{key}`.

use crate::util::open;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// The name of the project file searched for by [`Config::from_directory`].
pub const CONFIG_FILE_NAME: &str = "_config.yml";

#[derive(Deserialize)]
struct Project {
    #[serde(default = "default_source")]
    source: PathBuf,

    #[serde(default = "default_destination")]
    destination: PathBuf,

    #[serde(default = "default_layouts_dir")]
    layouts_dir: PathBuf,

    #[serde(default)]
    slugify_tags: bool,

    #[serde(flatten)]
    variables: Map<String, Value>,
}

fn default_source() -> PathBuf {
    PathBuf::from(".")
}

fn default_destination() -> PathBuf {
    PathBuf::from("_site")
}

fn default_layouts_dir() -> PathBuf {
    PathBuf::from("_layouts")
}

/// The resolved configuration. All directories are resolved against the
/// directory containing the project file.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The directory containing the project file.
    pub root_directory: PathBuf,

    /// The site source directory. `layouts_dir` is resolved against it.
    pub source_directory: PathBuf,

    /// The root directory pages are written under.
    pub destination_directory: PathBuf,

    /// The directory layouts are loaded from.
    pub layouts_directory: PathBuf,

    /// Whether tags are slugified before posts are grouped by tag.
    pub slugify_tags: bool,

    /// All remaining keys of the project file.
    pub variables: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Config::from_project(PathBuf::from("."), Project::default())
    }
}

impl Default for Project {
    fn default() -> Self {
        Project {
            source: default_source(),
            destination: default_destination(),
            layouts_dir: default_layouts_dir(),
            slugify_tags: false,
            variables: Map::new(),
        }
    }
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a `_config.yml` and
    /// loads the first one found. A relative `dir` is resolved against the
    /// current directory first, so the search continues past it.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let dir = std::env::current_dir()?.join(dir);
        for ancestor in dir.ancestors() {
            let path = ancestor.join(CONFIG_FILE_NAME);
            if path.exists() {
                return Config::from_project_file(&path);
            }
        }
        Err(Error::NotFound)
    }

    /// Loads the configuration from the project file at `path`. A file with
    /// no YAML content (empty, comments only, or `null`) yields the defaults.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let mut contents = String::new();
        open(path, "config")?.read_to_string(&mut contents)?;
        let project = parse_project(&contents).map_err(|err| Error::Yaml {
            path: path.to_owned(),
            err,
        })?;
        let root = match path.parent() {
            Some(root) => root.to_owned(),
            None => PathBuf::from("."),
        };
        tracing::debug!("loaded configuration from {}", path.display());
        Ok(Config::from_project(root, project))
    }

    fn from_project(root: PathBuf, project: Project) -> Config {
        let source_directory = root.join(project.source);
        Config {
            layouts_directory: source_directory.join(project.layouts_dir),
            source_directory,
            destination_directory: root.join(project.destination),
            slugify_tags: project.slugify_tags,
            variables: project.variables,
            root_directory: root,
        }
    }
}

fn parse_project(contents: &str) -> std::result::Result<Project, serde_yaml::Error> {
    let has_content = contents.lines().any(|line| {
        let line = line.trim();
        !(line.is_empty() || line.starts_with('#') || line == "---" || line == "...")
    });
    if !has_content {
        return Ok(Project::default());
    }
    let document: serde_yaml::Value = serde_yaml::from_str(contents)?;
    match document.is_null() {
        true => Ok(Project::default()),
        false => serde_yaml::from_str(contents),
    }
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no project file exists in the starting directory or any
    /// of its ancestors.
    #[error("could not find `{}` in any parent directory", CONFIG_FILE_NAME)]
    NotFound,

    /// Returned when the project file isn't valid YAML or has fields of the
    /// wrong type.
    #[error("parsing config file `{}`: {}", .path.display(), .err)]
    Yaml {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned for I/O problems reading the project file.
    #[error(transparent)]
    Io(#[from] io::Error),
}

use include_dir::{include_dir, Dir};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::layout::KeyboardLayout;

static BUNDLED_EXERCISES: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/exercises");

const LANGUAGE_HEADER: &str = "language:";

/// A practice text split into the lines presented one at a time
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub title: String,
    pub lines: Vec<String>,
    pub layout: KeyboardLayout,
}

impl Exercise {
    pub fn new<I, S>(id: &str, title: &str, lines: I, layout: KeyboardLayout) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            lines: lines.into_iter().map(Into::into).collect(),
            layout,
        }
    }

    /// Parse an exercise file.
    ///
    /// Format: an optional `Language: <layout>` line, then the title line,
    /// then the text. Text lines are trimmed and blank ones dropped.
    pub fn parse(id: &str, contents: &str) -> Result<Self, ExerciseError> {
        Self::parse_with_layout(id, contents, KeyboardLayout::default())
    }

    /// Like `parse`, using `fallback` when the file has no language line.
    pub fn parse_with_layout(
        id: &str,
        contents: &str,
        fallback: KeyboardLayout,
    ) -> Result<Self, ExerciseError> {
        let contents = contents.trim_start_matches('\u{feff}');
        let mut lines = contents
            .lines()
            .map(str::trim)
            .skip_while(|line| line.is_empty())
            .peekable();

        let mut layout = fallback;
        if let Some(first) = lines.peek() {
            let header = first.get(..LANGUAGE_HEADER.len());
            if header.is_some_and(|h| h.eq_ignore_ascii_case(LANGUAGE_HEADER)) {
                layout = KeyboardLayout::from_name(&first[LANGUAGE_HEADER.len()..]);
                lines.next();
            }
        }

        let title = lines
            .next()
            .filter(|title| !title.is_empty())
            .ok_or_else(|| ExerciseError::Empty { id: id.to_string() })?
            .to_string();

        let text: Vec<String> = lines
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if text.is_empty() {
            return Err(ExerciseError::MissingText { id: id.to_string() });
        }

        Ok(Self {
            id: id.to_string(),
            title,
            lines: text,
            layout,
        })
    }

    /// The whole target text: every line concatenated without separators
    pub fn text(&self) -> String {
        self.lines.concat()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn word_count(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.split_whitespace().count())
            .sum()
    }
}

#[derive(Debug)]
pub enum ExerciseError {
    Io { path: PathBuf, source: io::Error },
    Empty { id: String },
    MissingText { id: String },
    InvalidEncoding { id: String },
}

impl fmt::Display for ExerciseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Empty { id } => write!(f, "exercise '{id}' is empty"),
            Self::MissingText { id } => write!(f, "exercise '{id}' has a title but no text"),
            Self::InvalidEncoding { id } => write!(f, "exercise '{id}' is not valid UTF-8"),
        }
    }
}

impl std::error::Error for ExerciseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Anything that can supply a list of exercises
pub trait ExerciseSource {
    fn load(&self) -> Result<Vec<Exercise>, ExerciseError>;
}

/// Exercises compiled into the binary from the `exercises/` directory
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSource;

impl ExerciseSource for BundledSource {
    fn load(&self) -> Result<Vec<Exercise>, ExerciseError> {
        let mut files: Vec<_> = BUNDLED_EXERCISES
            .files()
            .filter(|file| is_exercise_file(file.path()))
            .collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));

        files
            .into_iter()
            .map(|file| {
                let id = exercise_id(file.path());
                let contents = file
                    .contents_utf8()
                    .ok_or_else(|| ExerciseError::InvalidEncoding { id: id.clone() })?;
                Exercise::parse(&id, contents)
            })
            .collect()
    }
}

/// Every `*.txt` file in a directory, sorted by file name
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    default_layout: KeyboardLayout,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            default_layout: KeyboardLayout::default(),
        }
    }

    pub fn with_default_layout(mut self, layout: KeyboardLayout) -> Self {
        self.default_layout = layout;
        self
    }
}

impl ExerciseSource for DirectorySource {
    fn load(&self) -> Result<Vec<Exercise>, ExerciseError> {
        if !self.dir.is_dir() {
            debug!(dir = %self.dir.display(), "exercise directory not found");
            return Ok(Vec::new());
        }

        let io_err = |source| ExerciseError::Io {
            path: self.dir.clone(),
            source,
        };
        let mut paths = fs::read_dir(&self.dir)
            .map_err(io_err)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_exercise_file(path))
            .collect::<Vec<_>>();
        paths.sort();

        let mut exercises = Vec::with_capacity(paths.len());
        for path in paths {
            let id = exercise_id(&path);
            let parsed = fs::read_to_string(&path)
                .map_err(|source| ExerciseError::Io {
                    path: path.clone(),
                    source,
                })
                .and_then(|contents| {
                    Exercise::parse_with_layout(&id, &contents, self.default_layout)
                });

            match parsed {
                Ok(exercise) => exercises.push(exercise),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping exercise file"),
            }
        }

        Ok(exercises)
    }
}

/// The exercise list shown in the menu, merged from several sources.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    exercises: Vec<Exercise>,
}

impl Catalog {
    /// Later sources replace earlier exercises with the same id.
    pub fn load(sources: &[&dyn ExerciseSource]) -> Result<Self, ExerciseError> {
        let mut catalog = Self::default();
        for source in sources {
            for exercise in source.load()? {
                catalog.insert(exercise);
            }
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, exercise: Exercise) {
        match self.exercises.iter_mut().find(|e| e.id == exercise.id) {
            Some(existing) => *existing = exercise,
            None => self.exercises.push(exercise),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

fn is_exercise_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "txt")
}

fn exercise_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/*!
 * Glob-based include/exclude matching for project-relative paths.
 *
 * Exclusion always wins over inclusion, and excluded directories are
 * pruned by the walker so their subtree is never visited.
 */

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Include/exclude glob lists for one project type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPattern {
    /// Files must match at least one of these
    pub include: Vec<String>,
    /// Paths matching any of these are skipped (directories are pruned)
    pub exclude: Vec<String>,
}

/// Known project types with built-in scan patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    /// JavaScript / TypeScript / Vue sources
    Js,
    /// Flutter (Dart) sources
    Flutter,
}

impl ScanPattern {
    /// Create a pattern set from explicit lists
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Built-in patterns for a project kind
    pub fn preset(kind: ProjectKind) -> Self {
        let (include, exclude): (&[&str], &[&str]) = match kind {
            ProjectKind::Js => (
                &["**/*.{js,jsx,ts,tsx,vue}"],
                &[
                    "**/node_modules/**",
                    "**/dist/**",
                    "**/build/**",
                    "**/.git/**",
                    "**/coverage/**",
                    "**/.vscode/**",
                    "**/.idea/**",
                ],
            ),
            ProjectKind::Flutter => (
                &["**/*.dart"],
                &[
                    "**/build/**",
                    "**/.dart_tool/**",
                    "**/.pub/**",
                    "**/ios/**",
                    "**/android/**",
                    "**/web/**",
                    "**/test/**",
                ],
            ),
        };

        Self {
            include: include.iter().map(|p| p.to_string()).collect(),
            exclude: exclude.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Compile the globs into a matcher
    pub fn compile(&self) -> Result<PatternMatcher, AppError> {
        Ok(PatternMatcher {
            include: build_globset(&self.include)?,
            exclude: build_globset(&self.exclude)?,
        })
    }
}

impl Default for ScanPattern {
    fn default() -> Self {
        Self::preset(ProjectKind::Js)
    }
}

/// Compiled include/exclude matcher
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl PatternMatcher {
    /// Whether a relative path is covered by an exclude pattern
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude.is_match(relative_path)
    }

    /// Whether a directory should be pruned from the walk
    ///
    /// `**/dir/**` style globs need a trailing separator to match the
    /// directory itself, so both forms are tested.
    pub fn is_excluded_dir(&self, relative_path: &str) -> bool {
        if relative_path.is_empty() {
            return false;
        }
        self.is_excluded(relative_path) || self.exclude.is_match(format!("{}/", relative_path))
    }

    /// Whether a file path is selected: not excluded and included
    pub fn matches(&self, relative_path: &str) -> bool {
        !self.is_excluded(relative_path) && self.include.is_match(relative_path)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, AppError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

//! Blog posts shown on the index screen.
//!
//! Posts come either from the built-in samples or from a directory of
//! markdown files. Nothing is ever written back.

mod samples;

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};

pub use samples::sample_posts;

use crate::outline::build_outline;

/// Publication state shown as a badge on the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Draft,
    Voting,
    Published,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Draft => "Draft",
            Self::Voting => "Voting",
            Self::Published => "Published",
        };
        f.write_str(label)
    }
}

/// A single blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Route identifier
    pub id: String,
    pub title: String,
    /// Short teaser shown on the index
    pub excerpt: String,
    pub author: String,
    /// Display date (`YYYY-MM-DD`), may be empty for local files
    pub date: String,
    pub status: PostStatus,
    /// Markdown body
    pub content: String,
}

impl Post {
    /// Build a post from a markdown file.
    ///
    /// The id is the file name, so `a.md` and `a.markdown` stay distinct.
    /// The title is the first heading (falling back to the file stem) and
    /// the excerpt is the first non-heading line of text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read post {}", path.display()))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut post = Self::from_markdown(stem, content);
        if let Some(name) = path.file_name() {
            post.id = name.to_string_lossy().to_string();
        }
        Ok(post)
    }

    /// Build a local post from markdown text, deriving title and excerpt.
    pub fn from_markdown(id: String, content: String) -> Self {
        let title = build_outline(&content)
            .into_iter()
            .next()
            .map_or_else(|| id.clone(), |entry| entry.title);
        let excerpt = content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("```"))
            .unwrap_or_default()
            .to_string();
        Self {
            id,
            title,
            excerpt,
            author: "Local file".to_string(),
            date: String::new(),
            status: PostStatus::Draft,
            content,
        }
    }
}

/// Load every `.md` / `.markdown` file in `dir` as a post, sorted by name.
///
/// # Errors
///
/// Returns an error if the directory or one of its posts cannot be read.
pub fn load_posts_dir(dir: &Path) -> Result<Vec<Post>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read posts directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && is_markdown_path(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    paths.iter().map(|p| Post::from_file(p)).collect()
}

pub fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_posts_have_unique_ids() {
        let posts = sample_posts();
        let mut ids: Vec<_> = posts.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), posts.len());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(PostStatus::Draft.to_string(), "Draft");
        assert_eq!(PostStatus::Voting.to_string(), "Voting");
        assert_eq!(PostStatus::Published.to_string(), "Published");
    }

    #[test]
    fn test_from_markdown_uses_first_heading_as_title() {
        let post = Post::from_markdown(
            "notes".to_string(),
            "# Field Notes\n\nFirst line here.\n\n## Later".to_string(),
        );
        assert_eq!(post.title, "Field Notes");
        assert_eq!(post.excerpt, "First line here.");
        assert_eq!(post.status, PostStatus::Draft);
    }

    #[test]
    fn test_from_markdown_without_heading_uses_id() {
        let post = Post::from_markdown("scratch".to_string(), "plain text".to_string());
        assert_eq!(post.title, "scratch");
    }

    #[test]
    fn test_load_posts_dir_reads_markdown_only() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "# Bravo\n\nbody").unwrap();
        std::fs::write(dir.path().join("a.markdown"), "# Alpha\n\nbody").unwrap();
        std::fs::write(dir.path().join("skip.txt"), "# Not a post").unwrap();

        let posts = load_posts_dir(dir.path()).unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Bravo"]);
        assert_eq!(posts[0].id, "a.markdown");
    }

    #[test]
    fn test_same_stem_posts_get_distinct_ids() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "plain").unwrap();
        std::fs::write(dir.path().join("a.markdown"), "plain").unwrap();

        let posts = load_posts_dir(dir.path()).unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a.markdown", "a.md"]);
        assert!(posts.iter().all(|p| p.title == "a"));
    }

    #[test]
    fn test_load_posts_dir_missing_directory_errors() {
        let dir = tempdir().unwrap();
        assert!(load_posts_dir(&dir.path().join("nope")).is_err());
    }
}

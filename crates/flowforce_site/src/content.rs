// SPDX-License-Identifier: MIT OR Apache-2.0
//! Blog content read from local JSON files.
//!
//! Every post lives in its own `<slug>.json` file. Reading fails open: a
//! missing directory or an unreadable post is logged and left out, so the
//! site renders with whatever content is available.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Author used when a post names none
pub const DEFAULT_AUTHOR: &str = "FlowForce Team";

/// Cover image used when a post has none
pub const DEFAULT_IMAGE: &str = "/images/blog/default.jpg";

/// Reading speed used for the estimate
pub const WORDS_PER_MINUTE: usize = 200;

/// Number of related posts shown under an article
pub const RELATED_POSTS_LIMIT: usize = 3;

/// Errors raised while reading a single post
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The file could not be read
    #[error("Failed to read post {path}: {source}")]
    Io {
        /// Post file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The file is not a valid post
    #[error("Invalid post {path}: {source}")]
    Parse {
        /// Post file
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// URL slug; taken from the file name when omitted
    #[serde(default)]
    pub slug: String,
    /// Title
    pub title: String,
    /// Publication date, `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    /// Teaser shown in listings
    #[serde(default)]
    pub excerpt: String,
    /// Body text
    #[serde(default)]
    pub content: String,
    /// Author name
    #[serde(default = "default_author")]
    pub author: String,
    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Cover image URL
    #[serde(default = "default_image")]
    pub image: String,
    /// Reading-time label; estimated from the body when omitted
    #[serde(default)]
    pub reading_time: Option<String>,
}

/// Listing view of a post, without the body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadata {
    /// URL slug
    pub slug: String,
    /// Title
    pub title: String,
    /// Publication date
    pub date: String,
    /// Teaser
    pub excerpt: String,
    /// Author name
    pub author: String,
    /// Tags
    pub tags: Vec<String>,
    /// Cover image URL
    pub image: String,
    /// Reading-time label
    pub reading_time: String,
}

impl Post {
    /// Parse a post file. The slug falls back to the file stem.
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let text = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut post: Post = serde_json::from_str(&text).map_err(|source| ContentError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if post.slug.is_empty() {
            post.slug = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        if post.reading_time.is_none() {
            post.reading_time = Some(reading_time(&post.content));
        }
        Ok(post)
    }

    /// Listing view
    pub fn metadata(&self) -> PostMetadata {
        PostMetadata {
            slug: self.slug.clone(),
            title: self.title.clone(),
            date: self.date.clone(),
            excerpt: self.excerpt.clone(),
            author: self.author.clone(),
            tags: self.tags.clone(),
            image: self.image.clone(),
            reading_time: self
                .reading_time
                .clone()
                .unwrap_or_else(|| reading_time(&self.content)),
        }
    }

    fn shared_tags(&self, tags: &[String]) -> usize {
        self.tags.iter().filter(|tag| tags.contains(tag)).count()
    }
}

/// `"N min read"` at [`WORDS_PER_MINUTE`], never less than one minute
pub fn reading_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

/// Read access to the blog
pub trait ContentSource {
    /// Every post, newest first
    fn posts(&self) -> Vec<Post>;

    /// A post by slug
    fn post(&self, slug: &str) -> Option<Post> {
        self.posts().into_iter().find(|post| post.slug == slug)
    }

    /// Listings for every post, newest first
    fn listings(&self) -> Vec<PostMetadata> {
        self.posts().iter().map(Post::metadata).collect()
    }

    /// Posts sharing the most tags with `tags`, excluding `slug` and posts
    /// sharing none. Ties keep date order.
    fn related(&self, slug: &str, tags: &[String], limit: usize) -> Vec<PostMetadata> {
        let mut scored: Vec<(usize, Post)> = self
            .posts()
            .into_iter()
            .filter(|post| post.slug != slug)
            .map(|post| (post.shared_tags(tags), post))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .iter()
            .take(limit)
            .map(|(_, post)| post.metadata())
            .collect()
    }

    /// Posts carrying `tag`, newest first
    fn by_tag(&self, tag: &str) -> Vec<PostMetadata> {
        self.posts()
            .iter()
            .filter(|post| post.tags.iter().any(|t| t == tag))
            .map(Post::metadata)
            .collect()
    }

    /// Every tag in use, sorted and unique
    fn tags(&self) -> Vec<String> {
        self.posts()
            .into_iter()
            .flat_map(|post| post.tags)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Posts read from a directory of JSON files
#[derive(Debug, Clone, Default)]
pub struct LocalContentSource {
    posts: Vec<Post>,
}

impl LocalContentSource {
    /// Read every `*.json` post under `dir`. Never fails; problems are logged.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut posts = Self::read_dir(dir);
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        tracing::debug!("Loaded {} posts from {}", posts.len(), dir.display());
        Self { posts }
    }

    fn read_dir(dir: &Path) -> Vec<Post> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("Content directory {} unavailable: {err}", dir.display());
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| match Post::load(&path) {
                Ok(post) => Some(post),
                Err(err) => {
                    tracing::warn!("Skipping post: {err}");
                    None
                }
            })
            .collect()
    }
}

impl ContentSource for LocalContentSource {
    fn posts(&self) -> Vec<Post> {
        self.posts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_post(dir: &Path, slug: &str, date: &str, tags: &[&str]) {
        let post = serde_json::json!({
            "title": format!("Post {slug}"),
            "date": date,
            "excerpt": "Teaser",
            "content": "word ".repeat(450),
            "tags": tags,
        });
        fs::write(dir.join(format!("{slug}.json")), post.to_string()).unwrap();
    }

    fn slugs(source: &LocalContentSource) -> Vec<String> {
        source.posts().into_iter().map(|post| post.slug).collect()
    }

    fn fixture() -> (tempfile::TempDir, LocalContentSource) {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "flow-state", "2024-03-01", &["design", "motion"]);
        write_post(dir.path(), "scroll-craft", "2024-05-12", &["motion", "web"]);
        write_post(dir.path(), "brand-notes", "2024-01-20", &["design"]);
        write_post(dir.path(), "hiring", "2024-06-02", &["culture"]);
        let source = LocalContentSource::open(dir.path());
        (dir, source)
    }

    #[test]
    fn test_posts_sorted_newest_first() {
        let (_dir, source) = fixture();
        assert_eq!(
            slugs(&source),
            vec!["hiring", "scroll-craft", "flow-state", "brand-notes"]
        );
    }

    #[test]
    fn test_defaults_filled_in() {
        let (_dir, source) = fixture();
        let post = source.post("flow-state").unwrap();
        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert_eq!(post.image, DEFAULT_IMAGE);
        assert_eq!(post.reading_time.as_deref(), Some("3 min read"));
        assert!(source.post("missing").is_none());
    }

    #[test]
    fn test_explicit_fields_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ignored-name.json"),
            r#"{"slug":"custom","title":"T","author":"Ana","readingTime":"9 min read"}"#,
        )
        .unwrap();
        let source = LocalContentSource::open(dir.path());
        let post = source.post("custom").unwrap();
        assert_eq!(post.author, "Ana");
        assert_eq!(post.metadata().reading_time, "9 min read");
    }

    #[test]
    fn test_related_posts_by_shared_tags() {
        let (_dir, source) = fixture();
        let tags = vec!["design".to_string(), "motion".to_string()];
        let related: Vec<_> = source
            .related("flow-state", &tags, RELATED_POSTS_LIMIT)
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(related, vec!["scroll-craft", "brand-notes"]);

        assert_eq!(source.related("flow-state", &tags, 1).len(), 1);
        assert!(source.related("hiring", &[], RELATED_POSTS_LIMIT).is_empty());
    }

    #[test]
    fn test_tags_and_by_tag() {
        let (_dir, source) = fixture();
        assert_eq!(source.tags(), vec!["culture", "design", "motion", "web"]);
        let motion: Vec<_> = source.by_tag("motion").into_iter().map(|p| p.slug).collect();
        assert_eq!(motion, vec!["scroll-craft", "flow-state"]);
        assert!(source.by_tag("nothing").is_empty());
    }

    #[test]
    fn test_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "good", "2024-01-01", &[]);
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let source = LocalContentSource::open(dir.path());
        assert_eq!(slugs(&source), vec!["good"]);

        let missing = LocalContentSource::open(dir.path().join("nope"));
        assert!(missing.posts().is_empty());
        assert!(missing.tags().is_empty());
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), "1 min read");
        assert_eq!(reading_time(&"a ".repeat(200)), "1 min read");
        assert_eq!(reading_time(&"a ".repeat(201)), "2 min read");
    }
}

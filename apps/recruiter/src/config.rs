use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Root data directory. Expects `jd.txt` (or .md/.pdf) and a `resumes/`
    /// subdirectory, one file per candidate.
    pub data_dir: PathBuf,
    /// Number of interview questions requested from the question stage.
    pub question_count: usize,
    /// Per-question score at or below which missing points feed the
    /// learning plan. The 6/10 cutoff is convention, not law, so it stays
    /// configurable.
    pub weak_score_threshold: u8,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            data_dir: PathBuf::from(
                std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            ),
            question_count: std::env::var("QUESTION_COUNT")
                .unwrap_or_else(|_| "6".to_string())
                .parse::<usize>()
                .context("QUESTION_COUNT must be a positive integer")?,
            weak_score_threshold: std::env::var("WEAK_SCORE_THRESHOLD")
                .unwrap_or_else(|_| "6".to_string())
                .parse::<u8>()
                .context("WEAK_SCORE_THRESHOLD must be an integer 0-10")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Locates the job description: the first of `jd.txt`, `jd.md`,
    /// `jd.pdf` present under the data directory. Falls back to `jd.txt`
    /// when none exists so a missing JD reports one concrete path.
    pub fn jd_path(&self) -> PathBuf {
        for name in ["jd.txt", "jd.md", "jd.pdf"] {
            let path = self.data_dir.join(name);
            if path.is_file() {
                return path;
            }
        }
        self.data_dir.join("jd.txt")
    }

    pub fn resumes_dir(&self) -> PathBuf {
        self.data_dir.join("resumes")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_at(data_dir: PathBuf) -> Config {
        Config {
            anthropic_api_key: "test-key".into(),
            data_dir,
            question_count: 6,
            weak_score_threshold: 6,
            rust_log: "info".into(),
        }
    }

    #[test]
    fn test_jd_path_finds_markdown_jd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("jd.md"), "# Senior Rust Engineer").unwrap();
        let config = config_at(dir.path().to_path_buf());
        assert_eq!(config.jd_path(), dir.path().join("jd.md"));
    }

    #[test]
    fn test_jd_path_prefers_txt_when_both_exist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("jd.txt"), "plain").unwrap();
        std::fs::write(dir.path().join("jd.md"), "# md").unwrap();
        let config = config_at(dir.path().to_path_buf());
        assert_eq!(config.jd_path(), dir.path().join("jd.txt"));
    }

    #[test]
    fn test_jd_path_defaults_to_txt_when_none_exists() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path().to_path_buf());
        assert_eq!(config.jd_path(), dir.path().join("jd.txt"));
    }
}

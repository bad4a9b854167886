//! # Resume-token cache
//!
//! A stream's resume token is the only handle on a server-side result set, and
//! building a large stream can take a while. The token is therefore persisted
//! to a small JSON file (`{"resume_token": "<token>"}`) under the platform
//! cache directory, so an interrupted run can resume consumption without
//! re-submitting the query.
//!
//! Reads and writes are **best-effort**: every failure surfaces as
//! [`SkystreamError::CachePersist`], which callers log and ignore. The file is
//! written whole on each stream creation with no cross-process locking; the
//! last writer wins.
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::skystream_errors::SkystreamError;

/// On-disk shape of the cache file.
#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    resume_token: String,
}

/// Platform cache file holding the resume token.
pub fn cache_file() -> Result<Utf8PathBuf, SkystreamError> {
    let base_dirs = BaseDirs::new().ok_or_else(|| {
        SkystreamError::CachePersist("cannot locate the platform base directories".to_string())
    })?;
    let cache_dir = Utf8Path::from_path(base_dirs.cache_dir()).ok_or_else(|| {
        SkystreamError::CachePersist("cache directory is not valid UTF-8".to_string())
    })?;
    Ok(cache_dir.join("skystream_cache").join("resume_token.json"))
}

/// Persist a resume token to the platform cache file.
pub fn store_resume_token(token: &str) -> Result<(), SkystreamError> {
    store_resume_token_at(&cache_file()?, token)
}

/// Persist a resume token to an explicit path.
pub fn store_resume_token_at(path: &Utf8Path, token: &str) -> Result<(), SkystreamError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| SkystreamError::CachePersist(err.to_string()))?;
    }
    let body = serde_json::to_string(&CachedToken {
        resume_token: token.to_string(),
    })
    .map_err(|err| SkystreamError::CachePersist(err.to_string()))?;
    fs::write(path, body).map_err(|err| SkystreamError::CachePersist(err.to_string()))
}

/// Read back the cached resume token, if any run stored one.
pub fn load_resume_token() -> Result<Option<String>, SkystreamError> {
    load_resume_token_at(&cache_file()?)
}

/// Read back a resume token from an explicit path.
pub fn load_resume_token_at(path: &Utf8Path) -> Result<Option<String>, SkystreamError> {
    if !path.exists() {
        return Ok(None);
    }
    let body =
        fs::read_to_string(path).map_err(|err| SkystreamError::CachePersist(err.to_string()))?;
    let cached: CachedToken =
        serde_json::from_str(&body).map_err(|err| SkystreamError::CachePersist(err.to_string()))?;
    Ok(Some(cached.resume_token))
}

#[cfg(test)]
mod token_cache_test {
    use super::*;

    #[test]
    fn test_store_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("nested").join("resume_token.json"))
            .unwrap();

        store_resume_token_at(&path, "wsEXijS2viCFk4cRbzKL").unwrap();
        let token = load_resume_token_at(&path).unwrap();

        assert_eq!(token.as_deref(), Some("wsEXijS2viCFk4cRbzKL"));

        // exact wire shape of the cache file
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body, r#"{"resume_token":"wsEXijS2viCFk4cRbzKL"}"#);
    }

    #[test]
    fn test_load_from_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("resume_token.json")).unwrap();

        assert_eq!(load_resume_token_at(&path).unwrap(), None);
    }

    #[test]
    fn test_corrupt_cache_reports_persist_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("resume_token.json")).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            load_resume_token_at(&path),
            Err(SkystreamError::CachePersist(_))
        ));
    }
}

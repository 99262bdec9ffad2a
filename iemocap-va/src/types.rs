//! Core types for iemocap-va

use eyre::{ContextCompat, Result, WrapErr};
use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Cache, CacheRepo};
use std::path::PathBuf;

/// Pretrained asset repository sources.
#[derive(Debug)]
pub enum ModelRepo {
    /// Local filesystem path
    Path(PathBuf),
    /// HuggingFace cache repository
    Cache(CacheRepo),
    /// HuggingFace API repository
    Api(ApiRepo),
}

impl ModelRepo {
    /// Local directory if `id` names one, otherwise the HuggingFace API.
    pub fn auto(id: &str) -> Result<Self> {
        let path = PathBuf::from(id);
        if path.is_dir() {
            Ok(ModelRepo::Path(path))
        } else {
            Self::api(id)
        }
    }

    /// HuggingFace cache repository for model `id`.
    pub fn cache(id: &str) -> Self {
        ModelRepo::Cache(Cache::from_env().model(id.to_string()))
    }

    /// HuggingFace API repository for model `id`.
    pub fn api(id: &str) -> Result<Self> {
        let api = Api::new().wrap_err("failed to create hf-hub api")?;
        Ok(ModelRepo::Api(api.model(id.to_string())))
    }

    /// Resolve a file name to its full path in this repository.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        match self {
            ModelRepo::Path(path) => path
                .join(file_name)
                .canonicalize()
                .wrap_err(format!("failed to resolve file: {file_name}")),
            ModelRepo::Cache(cache_repo) => cache_repo
                .get(file_name)
                .wrap_err(format!("file not found in cache: {file_name}")),
            ModelRepo::Api(api_repo) => api_repo
                .get(file_name)
                .wrap_err(format!("failed to download from api: {file_name}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_local_file() {
        let dir = std::env::temp_dir().join("iemocap-va-repo");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tokenizer.json"), "{}").unwrap();

        let repo = ModelRepo::auto(dir.to_str().unwrap()).unwrap();

        assert!(matches!(repo, ModelRepo::Path(_)));
        assert!(repo.resolve("tokenizer.json").unwrap().ends_with("tokenizer.json"));
        assert!(repo.resolve("missing.json").is_err());

        std::fs::remove_dir_all(dir).ok();
    }
}

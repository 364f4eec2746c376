use crate::config::DEFAULT_BASE_DEPLOYMENT;

/// Environment variable holding the current notebook's file id.
pub const NOTEBOOK_ID_ENV: &str = "NTBL_FILE_ID";

/// Which notebook the process is running in, for building links back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookContext {
    pub file_id: Option<String>,
    pub base_deployment: String,
}

impl Default for NotebookContext {
    fn default() -> Self {
        Self {
            file_id: None,
            base_deployment: DEFAULT_BASE_DEPLOYMENT.to_string(),
        }
    }
}

impl NotebookContext {
    pub fn new(base_deployment: impl Into<String>, file_id: Option<String>) -> Self {
        Self {
            file_id,
            base_deployment: base_deployment.into(),
        }
    }

    /// Read the file id from `NTBL_FILE_ID`.
    pub fn from_env(base_deployment: impl Into<String>) -> Self {
        let file_id = std::env::var(NOTEBOOK_ID_ENV)
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self::new(base_deployment, file_id)
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    /// `https://{base}/f/{id}`, or the deployment root when no notebook is known.
    pub fn link(&self) -> String {
        let base = self
            .base_deployment
            .trim_start_matches("https://")
            .trim_end_matches('/');
        match &self.file_id {
            Some(id) => format!("https://{}/f/{}", base, id),
            None => format!("https://{}", base),
        }
    }
}

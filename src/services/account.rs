//! 账号服务
//!
//! 账号保存在一个扁平的 JSON 文件中：`{"id": "...", "pw": "..."}`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AccountError, AppError};

/// 登录凭据
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub id: String,
    pub pw: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("pw", &"***")
            .finish()
    }
}

/// 账号文件里可能缺字段
#[derive(Deserialize)]
struct StoredAccount {
    id: Option<String>,
    pw: Option<String>,
}

/// 账号文件读写
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.account_file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取已保存的账号；文件不存在或缺少字段时返回 None
    pub fn load(&self) -> Result<Option<Credentials>, AccountError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("账号文件不存在: {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(AccountError::ReadFailed {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        let stored: StoredAccount =
            serde_json::from_str(&content).map_err(|source| AccountError::Malformed {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(match (stored.id, stored.pw) {
            (Some(id), Some(pw)) => Some(Credentials { id, pw }),
            _ => None,
        })
    }

    /// 保存账号（格式化 JSON，保留非 ASCII 字符）
    pub fn save(&self, credentials: &Credentials) -> Result<(), AccountError> {
        let path = self.path.display().to_string();
        let content =
            serde_json::to_string_pretty(credentials).map_err(|source| AccountError::Malformed {
                path: path.clone(),
                source,
            })?;
        std::fs::write(&self.path, content)
            .map_err(|source| AccountError::WriteFailed { path, source })?;
        info!("💾 账号已保存: {}", self.path.display());
        Ok(())
    }
}

/// 登录接口的回应
#[derive(Debug, Deserialize)]
struct LoginProcResponse {
    #[serde(default)]
    result: String,
}

/// 通过登录接口确认账号密码是否正确
pub async fn verify_credentials(
    client: &reqwest::Client,
    config: &Config,
    credentials: &Credentials,
) -> Result<bool, AppError> {
    info!("🔎 正在确认账号信息...");
    let endpoint = config.url("/LoginProc");
    let response: LoginProcResponse = client
        .post(&endpoint)
        .form(&[
            ("login_id", credentials.id.as_str()),
            ("login_pwd", credentials.pw.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AppError::api_request_failed(&endpoint, e))?
        .json()
        .await
        .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

    debug!("登录接口返回: {:?}", response);
    Ok(response.result == "ok")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            id: "student01".to_string(),
            pw: "비밀번호".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::new(dir.path().join("config.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_keeps_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::new(dir.path().join("config.json"));

        store.save(&credentials()).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("비밀번호"));
        assert_eq!(store.load().unwrap(), Some(credentials()));
    }

    #[test]
    fn test_incomplete_or_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::new(dir.path().join("config.json"));

        std::fs::write(store.path(), r#"{"id": "only-id"}"#).unwrap();
        assert!(store.load().unwrap().is_none());

        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(
            store.load().unwrap_err(),
            AccountError::Malformed { .. }
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let shown = format!("{:?}", credentials());
        assert!(!shown.contains("비밀번호"));
    }
}

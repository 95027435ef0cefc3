//! 当前用户身份的解析与缓存。
//!
//! 用户 ID 先从本地账户的附加数据中读取，没有时再用本地已知的用户名向 Hatchet 查询，
//! 并把查到的 ID 写回账户。解析成功后 ID 在进程生命周期内一直有效。

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::get_config_file_path,
    error::{HatchetError, Result},
    hatchet::{HatchetClient, PARAM_NAME, models::Users, query::Params},
    model::request::RequestKind,
};

/// 账户附加数据中保存用户 ID 的键。
pub const USER_ID_KEY: &str = "hatchet_preference_user_id";

const ACCOUNTS_FILE_NAME: &str = "accounts.json";

/// 一个本地账户。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// 账户名，即本地已知的用户名。
    pub name: String,
    /// 创建该账户的认证器名称。
    pub authenticator: String,
    /// 附加在账户上的字符串数据。
    #[serde(default)]
    pub user_data: HashMap<String, String>,
}

/// 账户凭据存储。
pub trait CredentialStore: Send + Sync {
    /// 查找由指定认证器创建的账户。
    fn find_account(&self, authenticator: &str) -> Result<Option<Account>>;

    /// 读取账户上的一项附加数据。
    fn user_data(&self, account: &str, key: &str) -> Result<Option<String>>;

    /// 写入账户上的一项附加数据。
    fn set_user_data(&self, account: &str, key: &str, value: &str) -> Result<()>;
}

fn set_in(accounts: &mut [Account], account: &str, key: &str, value: &str) -> Result<()> {
    let target = accounts
        .iter_mut()
        .find(|a| a.name == account)
        .ok_or_else(|| HatchetError::CredentialStore(format!("账户 '{account}' 不存在")))?;
    target.user_data.insert(key.to_string(), value.to_string());
    Ok(())
}

fn get_in(accounts: &[Account], account: &str, key: &str) -> Option<String> {
    accounts
        .iter()
        .find(|a| a.name == account)
        .and_then(|a| a.user_data.get(key).cloned())
}

/// 保存在内存中的凭据存储。
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    accounts: Mutex<Vec<Account>>,
}

impl MemoryCredentialStore {
    /// 用一组账户创建存储。
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
        }
    }

    /// 当前所有账户的快照。
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn find_account(&self, authenticator: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(accounts
            .iter()
            .find(|a| a.authenticator == authenticator)
            .cloned())
    }

    fn user_data(&self, account: &str, key: &str) -> Result<Option<String>> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(get_in(&accounts, account, key))
    }

    fn set_user_data(&self, account: &str, key: &str, value: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        set_in(&mut accounts, account, key, value)
    }
}

/// 以 JSON 文件持久化的凭据存储。
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// 使用指定路径的账户文件。
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// 使用配置目录下默认的 `accounts.json`。
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(get_config_file_path(ACCOUNTS_FILE_NAME)?))
    }

    /// 账户文件的路径。
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load(&self) -> Result<Vec<Account>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("账户文件 {:?} 不存在，视为没有账户。", self.path);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, accounts: &[Account]) -> Result<()> {
        let content = serde_json::to_string_pretty(accounts)?;
        fs::write(&self.path, content)?;
        info!("账户数据已保存到 {:?}。", self.path);
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn find_account(&self, authenticator: &str) -> Result<Option<Account>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self
            .load()?
            .into_iter()
            .find(|a| a.authenticator == authenticator))
    }

    fn user_data(&self, account: &str, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(get_in(&self.load()?, account, key))
    }

    fn set_user_data(&self, account: &str, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut accounts = self.load()?;
        set_in(&mut accounts, account, key, value)?;
        self.save(&accounts)
    }
}

/// 解析并缓存当前用户的 Hatchet ID。
pub struct UserIdentityResolver {
    client: Arc<HatchetClient>,
    store: Arc<dyn CredentialStore>,
    authenticator_name: String,
    cached: tokio::sync::Mutex<Option<String>>,
}

impl UserIdentityResolver {
    /// 创建一个新的解析器。
    ///
    /// # 参数
    /// * `authenticator_name` - 用于在凭据存储中识别 Hatchet 账户的认证器名称。
    pub fn new(
        client: Arc<HatchetClient>,
        store: Arc<dyn CredentialStore>,
        authenticator_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            authenticator_name: authenticator_name.into(),
            cached: tokio::sync::Mutex::new(None),
        }
    }

    /// 返回已缓存的用户 ID，尚未缓存时进行解析。
    ///
    /// 解析期间持有缓存锁，并发调用只会触发一次解析。
    /// 没有匹配的账户或解析失败时返回 `None`。
    pub async fn get_or_resolve(&self) -> Option<String> {
        let mut cached = self.cached.lock().await;
        if let Some(user_id) = cached.as_ref() {
            return Some(user_id.clone());
        }

        match self.resolve().await {
            Ok(Some(user_id)) => {
                *cached = Some(user_id.clone());
                Some(user_id)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("解析用户 ID 失败: {}", e);
                None
            }
        }
    }

    /// 不触发解析，只查看缓存。
    pub async fn cached(&self) -> Option<String> {
        self.cached.lock().await.clone()
    }

    /// 清除缓存的用户 ID，下次调用时重新解析。
    pub async fn clear(&self) {
        *self.cached.lock().await = None;
    }

    #[instrument(skip(self), fields(authenticator = %self.authenticator_name))]
    async fn resolve(&self) -> Result<Option<String>> {
        let Some(account) = self.store.find_account(&self.authenticator_name)? else {
            debug!("未找到 Hatchet 账户，用户身份保持未解析。");
            return Ok(None);
        };

        if let Some(user_id) = self
            .store
            .user_data(&account.name, USER_ID_KEY)?
            .filter(|id| !id.is_empty())
        {
            debug!("从账户数据中读取到用户 ID。");
            return Ok(Some(user_id));
        }

        let params = Params::new().with(PARAM_NAME, account.name.as_str());
        let users: Users = self.client.fetch(RequestKind::Users, &params).await?;
        let Some(user) = users.users.into_iter().next() else {
            warn!("Hatchet 上没有名为 '{}' 的用户。", account.name);
            return Ok(None);
        };

        self.store.set_user_data(&account.name, USER_ID_KEY, &user.id)?;
        info!("已解析用户 ID 并写回账户。");
        Ok(Some(user.id))
    }
}

impl std::fmt::Debug for UserIdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserIdentityResolver")
            .field("authenticator_name", &self.authenticator_name)
            .finish_non_exhaustive()
    }
}

/// 客戶端建構所需的配置來源（CLI、環境變數、TOML 檔皆可實作）
pub trait ConfigProvider: Send + Sync {
    fn api_token(&self) -> Option<&str>;
    fn base_url(&self) -> &str;
    fn timeout_seconds(&self) -> Option<u64>;
}

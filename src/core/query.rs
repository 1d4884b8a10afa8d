use crate::domain::model::{ProcedureFilter, TaskInstanceFilter, UserFilter};
use crate::utils::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

/// 有序的查詢參數列表
///
/// 未設定（`None`）或空的值一律不產生 key，不會把 "undefined"/"null" 之類的字串送出去。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &'static str, value: impl ToString) -> &mut Self {
        self.pairs.push((name, value.to_string()));
        self
    }

    /// `None` 或空白字串都不送
    pub fn push_opt<T: ToString>(&mut self, name: &'static str, value: Option<T>) -> &mut Self {
        if let Some(value) = value.map(|v| v.to_string()) {
            if !value.trim().is_empty() {
                self.pairs.push((name, value));
            }
        }
        self
    }

    /// 逗號串接；空列表不送
    pub fn push_list(&mut self, name: &'static str, values: &[String]) -> &mut Self {
        let joined = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if !joined.is_empty() {
            self.push(name, joined);
        }
        self
    }

    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn as_pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// URL 編碼後的查詢字串（不含 `?`）
    #[cfg(test)]
    pub(crate) fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }
}

/// 將篩選條件轉成遠端服務的查詢參數名稱
pub trait ToQuery {
    /// `base` 用來把使用者 id 轉成資源 URL
    fn to_query(&self, base: &Url) -> Result<QueryParams>;
}

impl ToQuery for ProcedureFilter {
    fn to_query(&self, _base: &Url) -> Result<QueryParams> {
        let mut params = QueryParams::new();
        params
            .push_opt("team_id", self.team_id)
            .push_opt("search", self.search.as_deref())
            .push_opt("tag", self.tag.as_deref())
            .push_list("tags", &self.tags)
            .push_opt("policy", self.policy)
            .push_opt("visible_to_user", self.visible_to_user)
            .push_opt("ordering", self.ordering.as_deref());
        Ok(params)
    }
}

impl ToQuery for TaskInstanceFilter {
    fn to_query(&self, base: &Url) -> Result<QueryParams> {
        let assignee = self
            .assignee
            .map(|id| resource_url(base, "users", id))
            .transpose()?;

        let mut params = QueryParams::new();
        params
            .push_opt("template", self.template)
            .push_opt("assignee", assignee)
            .push_opt("content_type", self.content_type.as_deref())
            .push_opt("object_id", self.object_id)
            .push_opt("completed", self.completed)
            .push_opt("due_date__gte", self.due_date_from.as_ref().map(iso8601))
            .push_opt("due_date__lte", self.due_date_to.as_ref().map(iso8601));
        Ok(params)
    }
}

impl ToQuery for UserFilter {
    fn to_query(&self, _base: &Url) -> Result<QueryParams> {
        let mut params = QueryParams::new();
        params
            .push_opt("team_id", self.team_id)
            .push_opt("exclude_team_id", self.exclude_team_id)
            .push_opt("id", self.id)
            .push_opt("exclude_id", self.exclude_id)
            .push_opt("status", self.status.as_deref());
        Ok(params)
    }
}

/// `{base}{collection}/{id}/`
pub fn resource_url(base: &Url, collection: &str, id: u64) -> Result<Url> {
    Ok(base.join(&format!("{}/{}/", collection, id))?)
}

fn iso8601(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// `GET procedures/` 的篩選條件，未設定的欄位不會出現在查詢字串中
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureFilter {
    pub team_id: Option<u64>,
    pub search: Option<String>,
    pub tag: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub policy: Option<u64>,
    pub visible_to_user: Option<u64>,
    pub ordering: Option<String>,
}

/// `GET taskinstances/` 的篩選條件
///
/// `assignee` 是使用者 id，送出前會轉成該使用者的資源 URL。
/// 到期日上下界皆為包含。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskInstanceFilter {
    pub template: Option<u64>,
    pub assignee: Option<u64>,
    pub content_type: Option<String>,
    pub object_id: Option<u64>,
    pub completed: Option<bool>,
    pub due_date_from: Option<DateTime<Utc>>,
    pub due_date_to: Option<DateTime<Utc>>,
}

/// `GET users/` 的篩選條件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFilter {
    pub team_id: Option<u64>,
    pub exclude_team_id: Option<u64>,
    pub id: Option<u64>,
    pub exclude_id: Option<u64>,
    pub status: Option<String>,
}

/// 邀請新使用者（`POST users/`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub is_super_manager: bool,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            is_super_manager: false,
        }
    }

    pub fn super_manager(mut self, value: bool) -> Self {
        self.is_super_manager = value;
        self
    }
}

/// `PATCH users/{id}/` 的部分更新內容，只送出有設定的欄位
///
/// 具名欄位與 `extra` 同名時只送出具名欄位的值。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_super_manager: Option<bool>,
    pub status: Option<String>,
    /// 遠端服務定義、但此處沒有對應型別的其他欄位
    #[serde(flatten, default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserUpdate {
    /// 具名欄位已設定時，`extra` 裡的同名 key 會被遮蔽
    fn shadows(&self, key: &str) -> bool {
        match key {
            "name" => self.name.is_some(),
            "email" => self.email.is_some(),
            "is_super_manager" => self.is_super_manager.is_some(),
            "status" => self.status.is_some(),
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.is_super_manager.is_none()
            && self.status.is_none()
            && self.extra.is_empty()
    }
}

impl Serialize for UserUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(name) = &self.name {
            map.serialize_entry("name", name)?;
        }
        if let Some(email) = &self.email {
            map.serialize_entry("email", email)?;
        }
        if let Some(is_super_manager) = &self.is_super_manager {
            map.serialize_entry("is_super_manager", is_super_manager)?;
        }
        if let Some(status) = &self.status {
            map.serialize_entry("status", status)?;
        }
        for (key, value) in &self.extra {
            if !self.shadows(key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// 單筆邀請。送出時會包成只有一個元素的陣列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub send_email: bool,
    pub content_type: String,
    pub permission: String,
    pub object_id: u64,
    /// 被邀請的使用者 id，送出前轉成資源 URL
    pub user: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_user_serializes_all_fields() {
        let user = NewUser::new("Ada", "ada@example.com").super_manager(true);
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({"name": "Ada", "email": "ada@example.com", "is_super_manager": true})
        );
    }

    #[test]
    fn test_user_update_only_sends_set_fields() {
        let mut update = UserUpdate {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        update
            .extra
            .insert("position".to_string(), json!("Manager"));

        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"email": "new@example.com", "position": "Manager"})
        );
        assert!(UserUpdate::default().is_empty());
    }

    #[test]
    fn test_user_update_typed_field_wins_over_extra() {
        let mut update = UserUpdate {
            name: Some("A".to_string()),
            ..Default::default()
        };
        update.extra.insert("name".to_string(), json!("B"));
        update.extra.insert("status".to_string(), json!("inactive"));

        let body = serde_json::to_string(&update).unwrap();

        assert_eq!(body.matches("\"name\"").count(), 1);
        assert_eq!(body.matches("\"status\"").count(), 1);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&body).unwrap(),
            json!({"name": "A", "status": "inactive"})
        );
    }
}

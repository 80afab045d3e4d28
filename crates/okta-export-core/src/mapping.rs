//! Field mapping tables
//!
//! Each resource kind has an ordered table of `(column, extractor)` pairs
//! that flattens a nested directory record into one CSV row. Extractors
//! never fail: a missing or mistyped member renders as an empty cell.

use serde_json::Value;

/// How a single column is pulled out of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// Follow a path of object keys and render the scalar found there
    Path(&'static [&'static str]),
    /// Serialize a top-level member as compact JSON text.
    /// `empty` is written when the member is absent.
    Json {
        key: &'static str,
        empty: &'static str,
    },
}

/// One output column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub extract: Extract,
}

impl Field {
    pub const fn path(name: &'static str, path: &'static [&'static str]) -> Self {
        Self {
            name,
            extract: Extract::Path(path),
        }
    }

    pub const fn json_object(name: &'static str) -> Self {
        Self {
            name,
            extract: Extract::Json {
                key: name,
                empty: "{}",
            },
        }
    }

    pub const fn json_array(name: &'static str) -> Self {
        Self {
            name,
            extract: Extract::Json {
                key: name,
                empty: "[]",
            },
        }
    }

    pub fn extract(&self, record: &Value) -> String {
        match self.extract {
            Extract::Path(path) => render(lookup(record, path)),
            Extract::Json { key, empty } => match record.get(key) {
                Some(value) => value.to_string(),
                None => empty.to_string(),
            },
        }
    }
}

/// An ordered column table for one resource kind
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub kind: &'static str,
    pub fields: &'static [Field],
}

impl FieldMapping {
    pub fn headers(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Apply every extractor to a record, in column order
    pub fn apply(&self, record: &Value) -> Vec<String> {
        self.fields.iter().map(|f| f.extract(record)).collect()
    }
}

fn lookup<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(record, |current, key| current.get(*key))
}

fn render(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

// =============================================================================
// Tables
// =============================================================================

pub const USER: FieldMapping = FieldMapping {
    kind: "user",
    fields: &[
        Field::path("id", &["id"]),
        Field::path("firstName", &["profile", "firstName"]),
        Field::path("lastName", &["profile", "lastName"]),
        Field::path("email", &["profile", "email"]),
        Field::path("login", &["profile", "login"]),
        Field::path("status", &["status"]),
        Field::path("created", &["created"]),
        Field::path("lastLogin", &["lastLogin"]),
        Field::path("lastUpdated", &["lastUpdated"]),
        Field::path("passwordChanged", &["passwordChanged"]),
    ],
};

pub const GROUP_LIST: FieldMapping = FieldMapping {
    kind: "group",
    fields: &[
        Field::path("id", &["id"]),
        Field::path("name", &["profile", "name"]),
        Field::path("description", &["profile", "description"]),
        Field::path("type", &["type"]),
        Field::path("created", &["created"]),
        Field::path("lastUpdated", &["lastUpdated"]),
        Field::path("lastMembershipUpdated", &["lastMembershipUpdated"]),
    ],
};

pub const GROUP_DETAIL: FieldMapping = FieldMapping {
    kind: "group-detail",
    fields: &[
        Field::path("id", &["id"]),
        Field::path("name", &["name"]),
        Field::path("description", &["description"]),
        Field::path("created", &["created"]),
        Field::path("lastUpdated", &["lastUpdated"]),
        Field::path("objectClass", &["objectClass"]),
        Field::path("type", &["type"]),
        Field::path("user_count_url", &["user_count_url"]),
        Field::path("apps_url", &["apps_url"]),
    ],
};

pub const GROUP_APP: FieldMapping = FieldMapping {
    kind: "group-app",
    fields: &[
        Field::path("id", &["id"]),
        Field::path("label", &["label"]),
        Field::path("status", &["status"]),
        Field::path("name", &["name"]),
        Field::path("lastUpdated", &["lastUpdated"]),
    ],
};

pub const GROUP_USER: FieldMapping = FieldMapping {
    kind: "group-user",
    fields: &[
        Field::path("id", &["id"]),
        Field::path("status", &["status"]),
        Field::path("created", &["created"]),
        Field::path("lastLogin", &["lastLogin"]),
        Field::path("type_id", &["type", "id"]),
        Field::path("firstName", &["profile", "firstName"]),
        Field::path("lastName", &["profile", "lastName"]),
        Field::path("email", &["profile", "email"]),
        Field::path("login", &["profile", "login"]),
    ],
};

/// Nested application settings are kept whole as JSON text in their cells
pub const APP: FieldMapping = FieldMapping {
    kind: "app",
    fields: &[
        Field::path("id", &["id"]),
        Field::path("name", &["name"]),
        Field::path("label", &["label"]),
        Field::path("status", &["status"]),
        Field::path("created", &["created"]),
        Field::path("lastUpdated", &["lastUpdated"]),
        Field::path("signOnMode", &["signOnMode"]),
        Field::json_object("accessibility"),
        Field::json_object("visibility"),
        Field::json_array("features"),
        Field::json_object("credentials"),
        Field::json_object("settings"),
    ],
};

pub const APP_GROUP: FieldMapping = FieldMapping {
    kind: "app-group",
    fields: &[
        Field::path("id", &["id"]),
        Field::path("name", &["profile", "name"]),
        Field::path("description", &["profile", "description"]),
        Field::path("created", &["created"]),
        Field::path("lastUpdated", &["lastUpdated"]),
    ],
};

pub const DEVICE: FieldMapping = FieldMapping {
    kind: "device",
    fields: &[
        Field::path("id", &["id"]),
        Field::path("status", &["status"]),
        Field::path("created", &["created"]),
        Field::path("lastUpdated", &["lastUpdated"]),
        Field::path("displayName", &["profile", "displayName"]),
        Field::path("platform", &["profile", "platform"]),
        Field::path("manufacturer", &["profile", "manufacturer"]),
        Field::path("model", &["profile", "model"]),
        Field::path("osVersion", &["profile", "osVersion"]),
        Field::path("serialNumber", &["profile", "serialNumber"]),
        Field::path("udid", &["profile", "udid"]),
        Field::path("sid", &["profile", "sid"]),
        Field::path("registered", &["profile", "registered"]),
        Field::path("secureHardwarePresent", &["profile", "secureHardwarePresent"]),
        Field::path("diskEncryptionType", &["profile", "diskEncryptionType"]),
        Field::path("resourceDisplayName", &["resourceDisplayName", "value"]),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL: [FieldMapping; 8] = [
        USER,
        GROUP_LIST,
        GROUP_DETAIL,
        GROUP_APP,
        GROUP_USER,
        APP,
        APP_GROUP,
        DEVICE,
    ];

    #[test]
    fn test_empty_record_yields_empty_cells() {
        for mapping in ALL {
            let row = mapping.apply(&json!({}));
            assert_eq!(row.len(), mapping.fields.len(), "{}", mapping.kind);
            for (field, cell) in mapping.fields.iter().zip(&row) {
                match field.extract {
                    Extract::Path(_) => assert_eq!(cell, "", "{}.{}", mapping.kind, field.name),
                    Extract::Json { empty, .. } => assert_eq!(cell, empty),
                }
            }
        }
    }

    #[test]
    fn test_mistyped_intermediate_does_not_panic() {
        let user = json!({"id": "00u1", "profile": null});
        let row = USER.apply(&user);
        assert_eq!(row[0], "00u1");
        assert_eq!(row[1], "");

        let device = json!({"resourceDisplayName": "not-an-object"});
        assert_eq!(DEVICE.apply(&device)[15], "");
    }

    #[test]
    fn test_user_row() {
        let user = json!({
            "id": "00u1",
            "status": "ACTIVE",
            "created": "2024-01-01T00:00:00.000Z",
            "lastLogin": null,
            "profile": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "login": "ada@example.com"
            }
        });
        let row = USER.apply(&user);
        assert_eq!(
            row,
            vec![
                "00u1",
                "Ada",
                "Lovelace",
                "ada@example.com",
                "ada@example.com",
                "ACTIVE",
                "2024-01-01T00:00:00.000Z",
                "",
                "",
                ""
            ]
        );
    }

    #[test]
    fn test_scalars_render_as_json_text() {
        let device = json!({
            "profile": {"registered": true, "secureHardwarePresent": false, "osVersion": 14}
        });
        let row = DEVICE.apply(&device);
        assert_eq!(row[8], "14");
        assert_eq!(row[12], "true");
        assert_eq!(row[13], "false");
    }

    #[test]
    fn test_app_nested_members_are_compact_json() {
        let app = json!({
            "id": "0oa1",
            "accessibility": {"selfService": false, "errorRedirectUrl": null},
            "features": ["PUSH_NEW_USERS"],
            "settings": {"app": {"url": "https://例え.jp"}},
            "credentials": null
        });
        let row = APP.apply(&app);
        let accessibility: Value = serde_json::from_str(&row[7]).unwrap();
        assert_eq!(accessibility, json!({"selfService": false, "errorRedirectUrl": null}));
        assert!(!row[7].contains(": "));
        assert_eq!(row[8], "{}");
        assert_eq!(row[9], r#"["PUSH_NEW_USERS"]"#);
        assert_eq!(row[10], "null");
        assert_eq!(row[11], r#"{"app":{"url":"https://例え.jp"}}"#);
    }

    #[test]
    fn test_group_user_type_id() {
        let member = json!({"id": "00u2", "type": {"id": "oty1"}});
        let row = GROUP_USER.apply(&member);
        assert_eq!(row[4], "oty1");
    }

    #[test]
    fn test_headers_follow_table_order() {
        assert_eq!(
            GROUP_APP.headers(),
            vec!["id", "label", "status", "name", "lastUpdated"]
        );
        assert_eq!(DEVICE.headers().last(), Some(&"resourceDisplayName"));
    }
}

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A contact inside a group. The server omits empty fields, so every one defaults.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Target {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub department_number: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub num_targets: i64,
    #[serde(default)]
    pub modified_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GroupSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub num_targets: i64,
    #[serde(default)]
    pub modified_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GroupSummaries {
    pub total: i64,
    #[serde(default)]
    pub groups: Vec<GroupSummary>,
}

/// Body of create and update requests.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GroupPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub targets: Vec<Target>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_tolerates_missing_groups() {
        let parsed: GroupSummaries = serde_json::from_str(r#"{"total":0}"#).unwrap();
        assert_eq!(parsed.total, 0);
        assert!(parsed.groups.is_empty());
    }

    #[test]
    fn summary_parses_server_dates() {
        let json = r#"{"total":1,"groups":[{"id":4,"name":"Engineering","num_targets":12,
            "modified_date":"2026-10-18T15:04:05.123456789-04:00"}]}"#;
        let parsed: GroupSummaries = serde_json::from_str(json).unwrap();
        let group = &parsed.groups[0];
        assert_eq!(group.id, 4);
        assert_eq!(group.num_targets, 12);
        assert!(group.modified_date.is_some());
    }

    #[test]
    fn full_group_carries_server_counts() {
        let json = r#"{"id":3,"name":"Sales","num_targets":2,
            "targets":[{"email":"a@ex.com"},{"email":"b@ex.com"}]}"#;
        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group.num_targets, 2);
        assert_eq!(group.targets.len(), 2);

        let bare: Group = serde_json::from_str(r#"{"id":4,"name":"New"}"#).unwrap();
        assert_eq!(bare.num_targets, 0);
        assert!(bare.targets.is_empty());
    }

    #[test]
    fn target_fields_default_to_empty() {
        let target: Target = serde_json::from_str(r#"{"email":"ann@ex.com"}"#).unwrap();
        assert_eq!(target.email, "ann@ex.com");
        assert_eq!(target.department_number, "");
    }

    #[test]
    fn payload_without_id_omits_the_key() {
        let payload = GroupPayload {
            id: None,
            name: "Engineering".into(),
            targets: vec![],
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("id").is_none());

        let payload = GroupPayload { id: Some(9), ..payload };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["id"], 9);
    }
}

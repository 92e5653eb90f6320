//! Organization plans: folder creation and file moves proposed for a folder.

use serde::{Deserialize, Serialize};

/// One step of an organization plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationAction {
    #[serde(rename_all = "camelCase")]
    CreateFolder { folder_name: String },
    #[serde(rename_all = "camelCase")]
    MoveFile {
        file_name: String,
        new_folder_name: String,
    },
}

/// An ordered list of actions applied to a single folder.
pub type OrganizationPlan = Vec<OrganizationAction>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_json() {
        let json = r#"[
            {"action":"CREATE_FOLDER","folderName":"Images"},
            {"action":"MOVE_FILE","fileName":"a.png","newFolderName":"Images"}
        ]"#;
        let plan: OrganizationPlan = serde_json::from_str(json).unwrap();
        assert_eq!(
            plan,
            vec![
                OrganizationAction::CreateFolder {
                    folder_name: "Images".into()
                },
                OrganizationAction::MoveFile {
                    file_name: "a.png".into(),
                    new_folder_name: "Images".into(),
                },
            ]
        );
    }

    #[test]
    fn serializes_tag_and_fields() {
        let action = OrganizationAction::MoveFile {
            file_name: "a.png".into(),
            new_folder_name: "Images".into(),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"action\":\"MOVE_FILE\""));
        assert!(json.contains("\"newFolderName\":\"Images\""));
    }

    #[test]
    fn rejects_unknown_action() {
        let json = r#"{"action":"DELETE_FILE","fileName":"a.png"}"#;
        assert!(serde_json::from_str::<OrganizationAction>(json).is_err());
    }
}

use serde::{Deserialize, Serialize};

/// Panel account returned alongside the access token at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelUser {
    pub id: i64,
    pub username: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "viewer".to_string()
}

impl PanelUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_viewer() {
        let user: PanelUser = serde_json::from_str(r#"{"id": 1, "username": "ana"}"#).unwrap();
        assert_eq!(user.role, "viewer");
        assert!(!user.is_admin());
    }
}

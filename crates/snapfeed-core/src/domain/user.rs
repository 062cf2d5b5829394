use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields;

/// Opaque user identifier issued by the authentication provider.
pub type UserId = String;

/// User entity - a profile document in the `users` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub user_id: UserId,
    pub name: Option<String>,
    pub username: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub following: Vec<UserId>,
}

impl User {
    /// Create an empty profile for a freshly issued user id.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn is_following(&self, user_id: &str) -> bool {
        self.following.iter().any(|id| id == user_id)
    }

    /// Following list with `target` removed if present, appended otherwise.
    pub fn toggled_following(&self, target: &str) -> Vec<UserId> {
        if self.is_following(target) {
            self.following
                .iter()
                .filter(|id| id.as_str() != target)
                .cloned()
                .collect()
        } else {
            let mut following = self.following.clone();
            following.push(target.to_string());
            following
        }
    }

    /// Handle as shown to people, e.g. `@jonas`.
    pub fn display_handle(&self) -> Option<String> {
        self.username.as_ref().map(|u| format!("@{u}"))
    }
}

/// Partial profile update. Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

impl ProfilePatch {
    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Default::default()
        }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.username.is_none()
            && self.bio.is_none()
            && self.image_url.is_none()
    }

    /// Merge this patch over `base`; absent fields keep their previous value.
    pub fn apply(&self, base: &User) -> User {
        User {
            user_id: base.user_id.clone(),
            name: self.name.clone().or_else(|| base.name.clone()),
            username: self.username.clone().or_else(|| base.username.clone()),
            image_url: self.image_url.clone().or_else(|| base.image_url.clone()),
            bio: self.bio.clone().or_else(|| base.bio.clone()),
            following: base.following.clone(),
        }
    }

    /// The present keys only, ready for a partial document update.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let entries = [
            ("name", &self.name),
            (fields::USERNAME, &self.username),
            ("bio", &self.bio),
            ("image_url", &self.image_url),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jonas() -> User {
        User {
            user_id: "u1".to_string(),
            name: Some("Jonas".to_string()),
            username: Some("jonas".to_string()),
            image_url: None,
            bio: Some("photos".to_string()),
            following: vec!["u2".to_string()],
        }
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let patch = ProfilePatch {
            bio: Some("street photography".to_string()),
            ..Default::default()
        };

        let merged = patch.apply(&jonas());

        assert_eq!(merged.bio.as_deref(), Some("street photography"));
        assert_eq!(merged.name.as_deref(), Some("Jonas"));
        assert_eq!(merged.username.as_deref(), Some("jonas"));
        assert_eq!(merged.following, vec!["u2".to_string()]);
    }

    #[test]
    fn test_patch_writes_only_present_keys() {
        let fields = ProfilePatch::image_url("https://img/1").to_fields();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields["image_url"], Value::String("https://img/1".into()));
    }

    #[test]
    fn test_toggle_following_is_symmetric() {
        let user = jonas();

        let followed = User {
            following: user.toggled_following("u3"),
            ..user.clone()
        };
        assert!(followed.is_following("u3"));

        let restored = followed.toggled_following("u3");
        assert_eq!(restored, user.following);
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let user: User = serde_json::from_value(serde_json::json!({ "user_id": "u9" })).unwrap();

        assert_eq!(user, User::new("u9"));
    }
}

//! Docker registry DTOs
//!
//! The event envelope mirrors the docker distribution notification format:
//! registries POST a JSON body with an `events` array, each entry carrying
//! the acting user, the action, the target repository/tag and the request
//! host the notification was addressed to.

use serde::{Deserialize, Serialize};

/// Request to register a docker registry with the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRegistry {
    pub path: String,
    pub description: Option<String>,
    pub external_url: Option<String>,
}

/// Notification envelope posted by a docker registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockerRegistryEventEnvelope {
    #[serde(default)]
    pub events: Vec<DockerRegistryEvent>,
}

/// A single registry event
///
/// Only `action == "push"` is processed; pulls and anything else are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerRegistryEvent {
    pub action: String,
    pub actor: EventActor,
    pub target: EventTarget,
    pub request: EventRequest,
}

/// The user that triggered the event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventActor {
    pub name: String,
}

/// The pushed (or pulled) image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTarget {
    /// Repository path within the registry, "group/tool".
    pub repository: String,
    pub tag: String,
    #[serde(default)]
    pub digest: String,
    /// Image size in bytes as reported by the registry.
    #[serde(default)]
    pub length: i64,
}

/// The request the registry served when emitting this event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    pub host: String,
}

impl DockerRegistryEvent {
    /// Splits the target repository into (group, tool name) at the first
    /// path delimiter. Returns None when the path has no delimiter or an
    /// empty component.
    pub fn group_and_tool(&self) -> Option<(&str, &str)> {
        let (group, tool) = self.target.repository.split_once('/')?;
        if group.is_empty() || tool.is_empty() {
            return None;
        }
        Some((group, tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(repository: &str) -> DockerRegistryEvent {
        DockerRegistryEvent {
            action: "push".to_string(),
            actor: EventActor {
                name: "user".to_string(),
            },
            target: EventTarget {
                repository: repository.to_string(),
                tag: "latest".to_string(),
                digest: "sha256:abc".to_string(),
                length: 123,
            },
            request: EventRequest {
                host: "registry:5000".to_string(),
            },
        }
    }

    #[test]
    fn test_group_and_tool_split() {
        assert_eq!(
            event("library/image").group_and_tool(),
            Some(("library", "image"))
        );
        // splits at the first delimiter only
        assert_eq!(
            event("library/nested/image").group_and_tool(),
            Some(("library", "nested/image"))
        );
    }

    #[test]
    fn test_group_and_tool_rejects_malformed_paths() {
        assert_eq!(event("image").group_and_tool(), None);
        assert_eq!(event("/image").group_and_tool(), None);
        assert_eq!(event("library/").group_and_tool(), None);
    }

    #[test]
    fn test_envelope_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "events": [{
                "action": "push",
                "actor": {"name": "user"},
                "target": {"repository": "library/image", "tag": "latest"},
                "request": {"host": "registry:5000"}
            }]
        }"#;

        let envelope: DockerRegistryEventEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.events.len(), 1);
        assert_eq!(envelope.events[0].target.digest, "");
        assert_eq!(envelope.events[0].target.length, 0);
    }
}

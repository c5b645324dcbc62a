use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RoleFile {
    #[serde(default)]
    payout_roles: Vec<u64>,
}

/// Role ids allowed to issue payouts, persisted to a small JSON file.
pub struct PayoutRoles {
    path: PathBuf,
    roles: RwLock<Vec<u64>>,
}

impl PayoutRoles {
    /// Starts from `defaults`; a readable `payout_roles` list in `path` replaces them.
    pub async fn load(path: impl Into<PathBuf>, defaults: Vec<u64>) -> Self {
        let path = path.into();
        let roles = match tokio::fs::read(&path).await {
            Ok(contents) => match serde_json::from_slice::<RoleFile>(&contents) {
                Ok(file) => {
                    tracing::info!(
                        "Loaded {} payout role(s) from {}",
                        file.payout_roles.len(),
                        path.display()
                    );
                    file.payout_roles
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable {}: {}", path.display(), e);
                    defaults
                }
            },
            Err(_) => {
                tracing::info!("No {} found, using {} default payout role(s)", path.display(), defaults.len());
                defaults
            }
        };

        Self {
            path,
            roles: RwLock::new(roles),
        }
    }

    pub async fn list(&self) -> Vec<u64> {
        self.roles.read().await.clone()
    }

    /// Returns `false` when the role was already configured.
    pub async fn add(&self, role_id: u64) -> Result<bool> {
        let mut roles = self.roles.write().await;
        if roles.contains(&role_id) {
            return Ok(false);
        }
        let mut updated = roles.clone();
        updated.push(role_id);
        self.save(&updated).await?;
        *roles = updated;
        tracing::info!("Payout role {} added", role_id);
        Ok(true)
    }

    /// Returns `false` when the role was not configured.
    pub async fn remove(&self, role_id: u64) -> Result<bool> {
        let mut roles = self.roles.write().await;
        if !roles.contains(&role_id) {
            return Ok(false);
        }
        let updated: Vec<u64> = roles.iter().copied().filter(|id| *id != role_id).collect();
        self.save(&updated).await?;
        *roles = updated;
        tracing::info!("Payout role {} removed", role_id);
        Ok(true)
    }

    async fn save(&self, roles: &[u64]) -> Result<()> {
        let file = RoleFile {
            payout_roles: roles.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

pub fn is_authorized(is_admin: bool, member_roles: &[u64], payout_roles: &[u64]) -> bool {
    is_admin || member_roles.iter().any(|role| payout_roles.contains(role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrators_are_always_authorized() {
        assert!(is_authorized(true, &[], &[]));
        assert!(is_authorized(true, &[1], &[2]));
    }

    #[test]
    fn members_need_a_configured_role() {
        assert!(is_authorized(false, &[5, 7], &[7]));
        assert!(!is_authorized(false, &[5], &[7]));
        assert!(!is_authorized(false, &[5], &[]));
    }

    #[tokio::test]
    async fn defaults_apply_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let roles = PayoutRoles::load(dir.path().join("config.json"), vec![10, 20]).await;
        assert_eq!(roles.list().await, vec![10, 20]);
    }

    #[tokio::test]
    async fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"payout_roles": [30]}"#).unwrap();

        let roles = PayoutRoles::load(&path, vec![10]).await;
        assert_eq!(roles.list().await, vec![30]);
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let roles = PayoutRoles::load(&path, vec![10]).await;
        assert_eq!(roles.list().await, vec![10]);
    }

    #[tokio::test]
    async fn mutations_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let roles = PayoutRoles::load(&path, vec![]).await;

        assert!(roles.add(42).await.unwrap());
        assert!(!roles.add(42).await.unwrap());
        assert!(roles.add(43).await.unwrap());
        assert!(roles.remove(42).await.unwrap());
        assert!(!roles.remove(42).await.unwrap());

        let reloaded = PayoutRoles::load(&path, vec![1]).await;
        assert_eq!(reloaded.list().await, vec![43]);
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_roles() {
        let dir = tempfile::tempdir().unwrap();
        let roles = PayoutRoles::load(dir.path().join("missing/config.json"), vec![1]).await;

        assert!(roles.add(2).await.is_err());
        assert!(roles.remove(1).await.is_err());
        assert_eq!(roles.list().await, vec![1]);
    }
}

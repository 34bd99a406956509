pub mod catalog;
pub mod inventory;
pub mod punishment;
pub mod user;

use poise::serenity_prelude::UserId;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use catalog::Catalog;
use inventory::Inventory;
use punishment::{PunishmentRecord, PunishmentKind};
use user::UserRecord;

const USERS_FILE: &str = "users.json";
const INVENTORY_FILE: &str = "inventory.json";
const PUNISHMENTS_FILE: &str = "punishments.json";
const CATALOG_FILE: &str = "catalog.json";

#[derive(Debug, Default)]
pub struct Store {
    dir: PathBuf,
    pub users: HashMap<UserId, UserRecord>,
    pub inventories: HashMap<UserId, Inventory>,
    pub punishments: Vec<PunishmentRecord>,
    pub catalog: Catalog,
}

impl Store {
    /// Loads every JSON file under `dir`, creating the directory and the
    /// default catalog on first run.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let catalog_path = dir.join(CATALOG_FILE);
        let catalog = if catalog_path.exists() {
            read_json(&catalog_path)
        } else {
            info!("Writing default catalog to {}", catalog_path.display());
            let catalog = Catalog::default();
            write_json(&catalog_path, &catalog)?;
            catalog
        };

        let store = Self {
            users: read_json(&dir.join(USERS_FILE)),
            inventories: read_json(&dir.join(INVENTORY_FILE)),
            punishments: read_json(&dir.join(PUNISHMENTS_FILE)),
            catalog,
            dir,
        };
        info!(
            "Loaded {} users, {} inventories, {} punishments",
            store.users.len(),
            store.inventories.len(),
            store.punishments.len()
        );
        Ok(store)
    }

    pub fn save(&self) -> Result<()> {
        self.save_users()?;
        write_json(&self.dir.join(INVENTORY_FILE), &self.inventories)?;
        write_json(&self.dir.join(PUNISHMENTS_FILE), &self.punishments)?;
        Ok(())
    }

    /// Writes only `users.json`, for updates that touch nothing else.
    pub fn save_users(&self) -> Result<()> {
        write_json(&self.dir.join(USERS_FILE), &self.users)
    }

    pub fn user(&self, user_id: UserId) -> UserRecord {
        self.users.get(&user_id).cloned().unwrap_or_default()
    }

    pub fn user_mut(&mut self, user_id: UserId) -> &mut UserRecord {
        self.users.entry(user_id).or_default()
    }

    pub fn inventory(&self, user_id: UserId) -> Inventory {
        self.inventories.get(&user_id).cloned().unwrap_or_default()
    }

    pub fn inventory_mut(&mut self, user_id: UserId) -> &mut Inventory {
        self.inventories.entry(user_id).or_default()
    }

    /// Soul bonus percentage from the user's equipped passives.
    pub fn soul_bonus(&self, user_id: UserId) -> u32 {
        self.inventories
            .get(&user_id)
            .map(|inv| self.catalog.soul_bonus(&inv.equipped))
            .unwrap_or(0)
    }

    pub fn record_punishment(&mut self, record: PunishmentRecord) {
        self.punishments.push(record);
    }

    /// Highest `limit` users by `key` among those `include` accepts, ties broken by
    /// user id for a stable order.
    pub fn ranking<K: Ord>(
        &self,
        limit: usize,
        key: impl Fn(&UserRecord) -> K,
        include: impl Fn(UserId) -> bool,
    ) -> Vec<(UserId, &UserRecord)> {
        let mut users: Vec<_> = self
            .users
            .iter()
            .filter(|(id, _)| include(**id))
            .map(|(id, user)| (*id, user))
            .collect();
        users.sort_by(|(a_id, a), (b_id, b)| key(b).cmp(&key(a)).then(a_id.cmp(b_id)));
        users.truncate(limit);
        users
    }

    pub fn punishments_for(&self, target: UserId) -> Vec<&PunishmentRecord> {
        self.punishments
            .iter()
            .filter(|p| p.target == target && p.kind != PunishmentKind::Unban)
            .collect()
    }
}

/// Reads a JSON file, treating a missing or corrupted file as empty.
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return T::default(),
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Ignoring unreadable {}: {}", path.display(), e);
        T::default()
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_reload_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let alice = UserId::new(11);
        {
            let mut store = Store::load(dir.path()).unwrap();
            let user = store.user_mut(alice);
            user.souls = 420;
            user.about = Some("olá".into());
            store.inventory_mut(alice).add("fragmento_alma", 3);
            store.record_punishment(PunishmentRecord::new(
                PunishmentKind::Warn,
                alice,
                UserId::new(99),
                "spam",
                None,
            ));
            store.save().unwrap();
        }

        let store = Store::load(dir.path()).unwrap();
        assert_eq!(store.user(alice).souls, 420);
        assert_eq!(store.user(alice).about.as_deref(), Some("olá"));
        assert_eq!(store.inventory(alice).quantity("fragmento_alma"), 3);
        assert_eq!(store.punishments_for(alice).len(), 1);
        assert!(dir.path().join(CATALOG_FILE).exists());
    }

    #[test]
    fn corrupted_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(USERS_FILE), "{ not json").unwrap();
        let store = Store::load(dir.path()).unwrap();
        assert!(store.users.is_empty());
    }

    #[test]
    fn ranking_sorts_descending() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::load(dir.path()).unwrap();
        for (id, souls, xp) in [(1, 50, 300), (2, 500, 10), (3, 120, 300)] {
            let user = store.user_mut(UserId::new(id));
            user.souls = souls;
            user.add_xp(xp);
        }

        let by_souls: Vec<_> = store.ranking(2, |u| u.souls, |_| true).into_iter().map(|(id, _)| id.get()).collect();
        assert_eq!(by_souls, vec![2, 3]);

        let by_level: Vec<_> = store
            .ranking(10, |u| (u.level, u.xp), |_| true)
            .into_iter()
            .map(|(id, _)| id.get())
            .collect();
        assert_eq!(by_level, vec![1, 3, 2]);
    }

    #[test]
    fn ranking_skips_excluded_users() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::load(dir.path()).unwrap();
        let bot = UserId::new(2);
        for (id, seconds) in [(1, 60), (2, 9_000), (3, 600)] {
            store.user_mut(UserId::new(id)).voice_seconds = seconds;
        }

        let top: Vec<_> = store
            .ranking(10, |u| u.voice_seconds, |id| id != bot)
            .into_iter()
            .map(|(id, _)| id.get())
            .collect();
        assert_eq!(top, vec![3, 1]);
    }

    #[test]
    fn save_users_leaves_other_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::load(dir.path()).unwrap();
        store.user_mut(UserId::new(4)).souls = 30;
        store.inventory_mut(UserId::new(4)).add("pocao_vida", 1);
        store.save_users().unwrap();

        assert!(dir.path().join(USERS_FILE).exists());
        assert!(!dir.path().join(INVENTORY_FILE).exists());
        assert!(!dir.path().join(PUNISHMENTS_FILE).exists());
        let reloaded = Store::load(dir.path()).unwrap();
        assert_eq!(reloaded.user(UserId::new(4)).souls, 30);
        assert_eq!(reloaded.inventory(UserId::new(4)).quantity("pocao_vida"), 0);
    }

    #[test]
    fn unknown_user_reads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::load(dir.path()).unwrap();
        let user = store.user(UserId::new(5));
        assert_eq!(user.level, 1);
        assert_eq!(store.soul_bonus(UserId::new(5)), 0);
    }

    #[tokio::test]
    async fn shared_store_serializes_writers() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(tokio::sync::RwLock::new(Store::load(dir.path()).unwrap()));
        let user = UserId::new(8);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    let mut guard = store.write().await;
                    guard.user_mut(user).add_souls(5);
                    guard.save().unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.read().await.user(user).souls, 100);
        assert_eq!(Store::load(dir.path()).unwrap().user(user).souls, 100);
    }
}

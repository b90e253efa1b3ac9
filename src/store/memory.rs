use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::repo::{HistoryRepo, PasswordResetRepo, UserRepo};
use crate::auth::repo_types::{
    AccountHistory, NewHistoryEvent, NewUser, PasswordReset, ProfileUpdate, User,
};
use crate::friends::phone::digits_only;
use crate::friends::repo::FriendshipRepo;
use crate::friends::repo_types::{CanonicalPair, Friendship, FriendshipStatus, NewFriendship};
use crate::ledger::repo::LedgerRepo;
use crate::ledger::repo_types::{NewTransaction, Totals, Transaction};

#[derive(Default)]
struct Tables {
    seq: i64,
    users: Vec<User>,
    transactions: Vec<Transaction>,
    friendships: Vec<(Friendship, bool)>, // (row, soft-deleted)
    resets: Vec<PasswordReset>,
    history: Vec<AccountHistory>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }

    fn live_friendship_mut(&mut self, id: i64) -> anyhow::Result<&mut Friendship> {
        self.friendships
            .iter_mut()
            .find(|(f, deleted)| f.id == id && !deleted)
            .map(|(f, _)| f)
            .ok_or_else(|| anyhow::anyhow!("friendship {id} not found"))
    }

    fn live_friendships(&self) -> impl Iterator<Item = &Friendship> {
        self.friendships
            .iter()
            .filter(|(_, deleted)| !deleted)
            .map(|(f, _)| f)
    }

    fn live_users(&self) -> impl Iterator<Item = &User> {
        self.users.iter().filter(|u| u.deleted_at.is_none())
    }
}

/// Process-local implementation of every repository, behind one lock.
/// Backs the `memory:` database mode and the test suite.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.live_users().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.live_users().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>> {
        let mut t = self.lock()?;
        if t.users.iter().any(|u| u.email == new.email) {
            return Ok(None);
        }
        let ts = now();
        let user = User {
            id: t.next_id(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            pin_hash: new.pin_hash,
            img_url: new.img_url,
            phone: None,
            phone_digits: None,
            gender: None,
            birthday: None,
            status: None,
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        };
        t.users.push(user.clone());
        Ok(Some(user))
    }

    async fn update_profile(&self, id: i64, update: ProfileUpdate) -> anyhow::Result<User> {
        let mut t = self.lock()?;
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .ok_or_else(|| anyhow::anyhow!("user {id} not found"))?;
        if let Some(v) = update.name {
            user.name = v;
        }
        if let Some(v) = update.img_url {
            user.img_url = Some(v);
        }
        if let Some(v) = update.phone {
            user.phone = Some(v);
        }
        if let Some(v) = update.phone_digits {
            user.phone_digits = Some(v);
        }
        if let Some(v) = update.gender {
            user.gender = Some(v);
        }
        if let Some(v) = update.birthday {
            user.birthday = Some(v);
        }
        if let Some(v) = update.status {
            user.status = Some(v);
        }
        user.updated_at = now();
        Ok(user.clone())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> anyhow::Result<()> {
        let mut t = self.lock()?;
        if let Some(user) = t.users.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = now();
        }
        Ok(())
    }

    async fn find_by_phone_digits(&self, variants: &[String]) -> anyhow::Result<Vec<User>> {
        Ok(self
            .lock()?
            .live_users()
            .filter(|u| {
                u.phone_digits
                    .as_ref()
                    .is_some_and(|d| variants.iter().any(|v| v == d))
            })
            .cloned()
            .collect())
    }

    async fn find_by_raw_phone(
        &self,
        raw: &str,
        variants: &[String],
    ) -> anyhow::Result<Vec<User>> {
        Ok(self
            .lock()?
            .live_users()
            .filter(|u| {
                u.phone.as_deref().is_some_and(|p| {
                    let stripped: String =
                        p.chars().filter(|c| !matches!(c, '+' | ' ' | '-')).collect();
                    p == raw || variants.iter().any(|v| *v == stripped)
                })
            })
            .cloned()
            .collect())
    }

    async fn search_by_name(&self, needle: &str) -> anyhow::Result<Vec<User>> {
        let needle = needle.to_lowercase();
        Ok(self
            .lock()?
            .live_users()
            .filter(|u| u.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list_missing_phone_digits(&self) -> anyhow::Result<Vec<(i64, String)>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .filter(|u| u.phone_digits.as_deref().unwrap_or_default().is_empty())
            .filter_map(|u| {
                u.phone
                    .as_ref()
                    .filter(|p| !p.is_empty())
                    .map(|p| (u.id, p.clone()))
            })
            .collect())
    }

    async fn set_phone_digits(&self, id: i64, digits: &str) -> anyhow::Result<()> {
        let mut t = self.lock()?;
        if let Some(user) = t.users.iter_mut().find(|u| u.id == id) {
            user.phone_digits = Some(digits.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl PasswordResetRepo for MemoryStore {
    async fn replace(
        &self,
        email: &str,
        otp: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<PasswordReset> {
        let mut t = self.lock()?;
        t.resets.retain(|r| r.email != email);
        let reset = PasswordReset {
            id: t.next_id(),
            email: email.to_string(),
            otp: otp.to_string(),
            expires_at,
            created_at: now(),
        };
        t.resets.push(reset.clone());
        Ok(reset)
    }

    async fn find(&self, email: &str, otp: &str) -> anyhow::Result<Option<PasswordReset>> {
        Ok(self
            .lock()?
            .resets
            .iter()
            .rev()
            .find(|r| r.email == email && r.otp == otp)
            .cloned())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<()> {
        self.lock()?.resets.retain(|r| r.id != id);
        Ok(())
    }
}

#[async_trait]
impl HistoryRepo for MemoryStore {
    async fn record(&self, event: NewHistoryEvent) -> anyhow::Result<()> {
        let mut t = self.lock()?;
        let entry = AccountHistory {
            id: t.next_id(),
            user_id: event.user_id,
            event: event.event.as_str().to_string(),
            description: event.event.description().to_string(),
            created_at: now(),
        };
        t.history.push(entry);
        Ok(())
    }

    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<AccountHistory>> {
        let mut rows: Vec<_> = self
            .lock()?
            .history
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }
}

#[async_trait]
impl LedgerRepo for MemoryStore {
    async fn insert(&self, new: NewTransaction) -> anyhow::Result<Transaction> {
        let mut t = self.lock()?;
        let tx = Transaction {
            id: t.next_id(),
            user_id: new.user_id,
            kind: new.kind,
            category: new.category,
            amount: new.amount,
            method: new.method,
            note: new.note,
            created_at: now(),
        };
        t.transactions.push(tx.clone());
        Ok(tx)
    }

    async fn list_by_user(&self, user_id: i64) -> anyhow::Result<Vec<Transaction>> {
        let mut rows: Vec<_> = self
            .lock()?
            .transactions
            .iter()
            .filter(|tx| tx.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn totals(&self, user_id: i64) -> anyhow::Result<Totals> {
        let t = self.lock()?;
        Totals::from_entries(t.transactions.iter().filter(|tx| tx.user_id == user_id))
    }
}

#[async_trait]
impl FriendshipRepo for MemoryStore {
    async fn find_between(&self, pair: CanonicalPair) -> anyhow::Result<Option<Friendship>> {
        Ok(self
            .lock()?
            .live_friendships()
            .find(|f| f.pair() == pair)
            .cloned())
    }

    async fn insert(&self, new: NewFriendship) -> anyhow::Result<Option<Friendship>> {
        let mut t = self.lock()?;
        if t.live_friendships().any(|f| f.pair() == new.pair()) {
            return Ok(None);
        }
        let ts = now();
        let row = Friendship {
            id: t.next_id(),
            user_id: new.pair().low(),
            friend_id: new.pair().high(),
            requester_id: new.requester_id(),
            status: new.status(),
            debt_user_id: None,
            created_at: ts,
            updated_at: ts,
        };
        t.friendships.push((row.clone(), false));
        Ok(Some(row))
    }

    async fn find_pending_by_id(
        &self,
        id: i64,
        member: i64,
    ) -> anyhow::Result<Option<Friendship>> {
        Ok(self
            .lock()?
            .live_friendships()
            .find(|f| f.id == id && f.has_member(member) && f.status == FriendshipStatus::Pending)
            .cloned())
    }

    async fn set_status(&self, id: i64, status: FriendshipStatus) -> anyhow::Result<Friendship> {
        let mut t = self.lock()?;
        let row = t.live_friendship_mut(id)?;
        row.status = status;
        row.updated_at = now();
        Ok(row.clone())
    }

    async fn set_debt(&self, id: i64, debt_user_id: Option<i64>) -> anyhow::Result<Friendship> {
        let mut t = self.lock()?;
        let row = t.live_friendship_mut(id)?;
        row.debt_user_id = debt_user_id;
        row.updated_at = now();
        Ok(row.clone())
    }

    async fn soft_delete(&self, id: i64) -> anyhow::Result<()> {
        let mut t = self.lock()?;
        if let Some(entry) = t.friendships.iter_mut().find(|(f, _)| f.id == id) {
            entry.1 = true;
        }
        Ok(())
    }

    async fn list_for_member(
        &self,
        user_id: i64,
        status: FriendshipStatus,
    ) -> anyhow::Result<Vec<Friendship>> {
        Ok(self
            .lock()?
            .live_friendships()
            .filter(|f| f.has_member(user_id) && f.status == status)
            .cloned()
            .collect())
    }
}

//! In-process repositories, selected with `STORE_BACKEND=memory`.
//!
//! Records live in an insertion-ordered `tokio::sync::RwLock<Vec>`; each call is atomic on one record,
//! matching what the Postgres adapters guarantee. Writes can be made to fail
//! on demand so callers can exercise their partial-failure paths.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::places::{NewPlace, Place, PlaceFilter, PlaceGone, PlaceRepository};
use crate::users::{DuplicateEmail, NewUser, User, UserFilter, UserRepository};

#[derive(Default)]
struct Faults {
    create: AtomicBool,
    save: AtomicBool,
    delete: AtomicBool,
}

impl Faults {
    fn check(flag: &AtomicBool, op: &str) -> anyhow::Result<()> {
        if flag.load(Ordering::SeqCst) {
            anyhow::bail!("injected {} failure", op);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPlaceRepository {
    rows: RwLock<Vec<Place>>,
    faults: Faults,
}

impl MemoryPlaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn fail_creates(&self, on: bool) {
        self.faults.create.store(on, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn fail_saves(&self, on: bool) {
        self.faults.save.store(on, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn fail_deletes(&self, on: bool) {
        self.faults.delete.store(on, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl PlaceRepository for MemoryPlaceRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Place>> {
        Ok(self.rows.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn find_one(&self, filter: PlaceFilter) -> anyhow::Result<Option<Place>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    async fn find(&self, filter: PlaceFilter) -> anyhow::Result<Vec<Place>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|p| filter.matches(p)).cloned().collect())
    }

    async fn create(&self, place: NewPlace) -> anyhow::Result<Place> {
        Faults::check(&self.faults.create, "place create")?;
        let created = Place {
            id: Uuid::new_v4(),
            title: place.title,
            description: place.description,
            address: place.address,
            location: place.location,
            image: place.image,
            creator: place.creator,
            created_at: OffsetDateTime::now_utc(),
        };
        self.rows.write().await.push(created.clone());
        Ok(created)
    }

    async fn save(&self, place: &Place) -> anyhow::Result<()> {
        Faults::check(&self.faults.save, "place save")?;
        let mut rows = self.rows.write().await;
        let slot = rows
            .iter_mut()
            .find(|p| p.id == place.id)
            .ok_or(PlaceGone(place.id))?;
        *slot = place.clone();
        Ok(())
    }

    async fn delete(&self, place: &Place) -> anyhow::Result<()> {
        Faults::check(&self.faults.delete, "place delete")?;
        self.rows.write().await.retain(|p| p.id != place.id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: RwLock<Vec<User>>,
    faults: Faults,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn fail_creates(&self, on: bool) {
        self.faults.create.store(on, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn fail_saves(&self, on: bool) {
        self.faults.save.store(on, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.rows.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_one(&self, filter: UserFilter) -> anyhow::Result<Option<User>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    async fn find(&self, filter: UserFilter) -> anyhow::Result<Vec<User>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|u| filter.matches(u)).cloned().collect())
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        Faults::check(&self.faults.create, "user create")?;
        let mut rows = self.rows.write().await;
        if rows.iter().any(|u| u.email == user.email) {
            return Err(DuplicateEmail(user.email).into());
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            image: user.image,
            password_hash: user.password_hash,
            places: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        Faults::check(&self.faults.save, "user save")?;
        let mut rows = self.rows.write().await;
        let slot = rows
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| anyhow::anyhow!("user {} vanished during update", user.id))?;
        *slot = user.clone();
        Ok(())
    }
}

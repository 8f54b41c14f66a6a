use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewPlace, Place, PlaceFilter, PlaceGone, PlaceRow};

/// Single-record persistence for places. Keeping a place and its owner's
/// `places` list in step is the coordinator's job, not the adapter's.
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Place>>;
    async fn find_one(&self, filter: PlaceFilter) -> anyhow::Result<Option<Place>>;
    /// Matching places, oldest first.
    async fn find(&self, filter: PlaceFilter) -> anyhow::Result<Vec<Place>>;
    async fn create(&self, place: NewPlace) -> anyhow::Result<Place>;
    async fn save(&self, place: &Place) -> anyhow::Result<()>;
    async fn delete(&self, place: &Place) -> anyhow::Result<()>;
}

const PLACE_COLUMNS: &str =
    "id, title, description, address, lat, lng, image, creator_id, created_at";

pub struct PgPlaceRepository {
    db: PgPool,
}

impl PgPlaceRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn query(&self, filter: PlaceFilter, limit: Option<i64>) -> anyhow::Result<Vec<Place>> {
        let limit = limit.unwrap_or(i64::MAX);
        let rows = match filter {
            PlaceFilter::All => {
                sqlx::query_as::<_, PlaceRow>(&format!(
                    "SELECT {PLACE_COLUMNS} FROM places ORDER BY created_at ASC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(&self.db)
                .await
            }
            PlaceFilter::Creator(creator_id) => {
                sqlx::query_as::<_, PlaceRow>(&format!(
                    "SELECT {PLACE_COLUMNS} FROM places WHERE creator_id = $1 \
                     ORDER BY created_at ASC LIMIT $2"
                ))
                .bind(creator_id)
                .bind(limit)
                .fetch_all(&self.db)
                .await
            }
        }
        .with_context(|| format!("select places {:?}", filter))?;
        Ok(rows.into_iter().map(Place::from).collect())
    }
}

#[async_trait]
impl PlaceRepository for PgPlaceRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Place>> {
        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select place by id")?;
        Ok(row.map(Place::from))
    }

    async fn find_one(&self, filter: PlaceFilter) -> anyhow::Result<Option<Place>> {
        Ok(self.query(filter, Some(1)).await?.into_iter().next())
    }

    async fn find(&self, filter: PlaceFilter) -> anyhow::Result<Vec<Place>> {
        self.query(filter, None).await
    }

    async fn create(&self, place: NewPlace) -> anyhow::Result<Place> {
        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            r#"
            INSERT INTO places (id, title, description, address, lat, lng, image, creator_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PLACE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&place.title)
        .bind(&place.description)
        .bind(&place.address)
        .bind(place.location.lat)
        .bind(place.location.lng)
        .bind(&place.image)
        .bind(place.creator)
        .fetch_one(&self.db)
        .await
        .context("insert place")?;
        Ok(row.into())
    }

    async fn save(&self, place: &Place) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE places
               SET title = $2, description = $3, address = $4,
                   lat = $5, lng = $6, image = $7, creator_id = $8
             WHERE id = $1
            "#,
        )
        .bind(place.id)
        .bind(&place.title)
        .bind(&place.description)
        .bind(&place.address)
        .bind(place.location.lat)
        .bind(place.location.lng)
        .bind(&place.image)
        .bind(place.creator)
        .execute(&self.db)
        .await
        .context("update place")?;
        if res.rows_affected() == 0 {
            return Err(PlaceGone(place.id).into());
        }
        Ok(())
    }

    async fn delete(&self, place: &Place) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(place.id)
            .execute(&self.db)
            .await
            .context("delete place")?;
        Ok(())
    }
}

//! Place operations that span both record collections.
//!
//! A place's `creator` and its owner's `places` list describe one fact and
//! must never disagree. There is no transaction across the two repositories,
//! so the write order is chosen so that an interruption can leave at most a
//! stray place record, never a list entry pointing at nothing. Edits to one
//! owner's list are serialized through [`crate::locks::OwnerLocks`].

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::repo_types::{NewPlace, Place, PlaceFilter, PlaceGone};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct CreatePlace {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
}

fn place_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Could not find a place for id {}.", id))
}

#[instrument(skip(st))]
pub async fn get_place(st: &AppState, place_id: Uuid) -> Result<Place, AppError> {
    st.places
        .find_by_id(place_id)
        .await
        .map_err(|e| AppError::persistence("Could not load the place.", e))?
        .ok_or_else(|| place_not_found(place_id))
}

/// Places owned by `owner_id`, oldest first. An unknown owner yields an empty list.
#[instrument(skip(st))]
pub async fn places_by_owner(st: &AppState, owner_id: Uuid) -> Result<Vec<Place>, AppError> {
    st.places
        .find(PlaceFilter::Creator(owner_id))
        .await
        .map_err(|e| AppError::persistence("Could not load places for the user.", e))
}

#[instrument(skip(st))]
pub async fn create_place(st: &AppState, input: CreatePlace) -> Result<Place, AppError> {
    // no writes until the address resolves and the owner is known
    let location = st.geocoder.resolve(&input.address).await.map_err(|e| {
        warn!(address = %input.address, error = %e, "address did not resolve");
        AppError::from(e)
    })?;

    let _guard = st.owner_locks.lock(input.owner_id).await;

    let mut owner = st
        .users
        .find_by_id(input.owner_id)
        .await
        .map_err(|e| AppError::persistence("Creating place failed, please try again.", e))?
        .ok_or_else(|| {
            warn!(owner_id = %input.owner_id, "create_place for unknown user");
            AppError::not_found(format!("Could not find a user for id {}.", input.owner_id))
        })?;

    let place = st
        .places
        .create(NewPlace {
            title: input.title,
            description: input.description,
            address: input.address,
            location,
            image: st.config.default_image_url.clone(),
            creator: owner.id,
        })
        .await
        .map_err(|e| AppError::persistence("Creating place failed, please try again.", e))?;

    owner.places.push(place.id);
    if let Err(e) = st.users.save(&owner).await {
        // undo the place write so it does not outlive the failed link
        match st.places.delete(&place).await {
            Ok(()) => warn!(place_id = %place.id, "place removed after owner update failed"),
            Err(ce) => error!(
                place_id = %place.id,
                owner_id = %owner.id,
                error = %ce,
                "compensating delete failed; place is orphaned"
            ),
        }
        return Err(AppError::persistence(
            "Creating place failed, please try again.",
            e,
        ));
    }

    info!(place_id = %place.id, owner_id = %owner.id, "place created");
    Ok(place)
}

/// Only `title` and `description` change; everything else is fixed at creation.
#[instrument(skip(st))]
pub async fn update_place(
    st: &AppState,
    place_id: Uuid,
    title: String,
    description: String,
) -> Result<Place, AppError> {
    let mut place = get_place(st, place_id).await?;
    place.title = title;
    place.description = description;

    st.places.save(&place).await.map_err(|e| {
        // deleted between the read and the write
        if e.downcast_ref::<PlaceGone>().is_some() {
            warn!(%place_id, "place deleted during update");
            place_not_found(place_id)
        } else {
            AppError::persistence("Could not update place.", e)
        }
    })?;

    info!(place_id = %place.id, "place updated");
    Ok(place)
}

#[instrument(skip(st))]
pub async fn delete_place(st: &AppState, place_id: Uuid) -> Result<(), AppError> {
    let found = get_place(st, place_id).await?;
    let _guard = st.owner_locks.lock(found.creator).await;

    // a concurrent delete may have won while we waited
    let place = get_place(st, place_id).await?;

    let owner = st
        .users
        .find_by_id(place.creator)
        .await
        .map_err(|e| AppError::persistence("Could not delete place.", e))?;

    match owner {
        Some(mut owner) => {
            let before = owner.places.len();
            owner.places.retain(|id| *id != place.id);
            if owner.places.len() != before {
                st.users
                    .save(&owner)
                    .await
                    .map_err(|e| AppError::persistence("Could not delete place.", e))?;
            }
        }
        None => warn!(place_id = %place.id, owner_id = %place.creator, "place owner missing"),
    }

    st.places
        .delete(&place)
        .await
        .map_err(|e| AppError::persistence("Could not delete place.", e))?;

    info!(place_id = %place.id, owner_id = %place.creator, "place deleted");
    Ok(())
}

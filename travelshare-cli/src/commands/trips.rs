//! Trip commands - list, show, post, edit, delete

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Confirm;
use uuid::Uuid;

use super::{get_context, require_user};
use crate::output;
use travelshare_core::services::PhotoUpload;
use travelshare_core::{NewTrip, TripUpdate};

fn load_photo(path: &Path) -> Result<PhotoUpload> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read photo file: {:?}", path))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo")
        .to_string();
    let content_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
    .to_string();
    Ok(PhotoUpload {
        file_name,
        content_type,
        bytes,
    })
}

pub async fn list(json: bool) -> Result<()> {
    let context = get_context().await?;
    let user = require_user(&context)?;
    let trips = context.trip_service.my_trips(user.id()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&trips)?);
        return Ok(());
    }

    if trips.is_empty() {
        output::info("You have not posted any trips yet. Run 'tvs post'.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Title", "Location", "Photo", "Posted"]);
    for trip in &trips {
        table.add_row(vec![
            trip.id.to_string(),
            output::truncate(&trip.title, 40),
            trip.location_name.clone(),
            if trip.photo_url.is_some() { "yes" } else { "-" }.to_string(),
            trip.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show(id: Uuid, json: bool) -> Result<()> {
    let context = get_context().await?;
    let item = context.trip_service.detail(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
        return Ok(());
    }

    println!("{}", item.trip.title.bold());
    println!(
        "by {} on {}",
        item.author_username.as_deref().unwrap_or("unknown"),
        item.trip.created_at.format("%Y-%m-%d %H:%M")
    );
    println!("Location: {}", item.trip.location_name);
    if let (Some(lat), Some(lng)) = (item.trip.latitude, item.trip.longitude) {
        println!("Coords:   {lat:.4}, {lng:.4}");
    }
    if let Some(photo_url) = &item.trip.photo_url {
        println!("Photo:    {photo_url}");
    }
    println!();
    println!("{}", item.trip.description);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn post(
    title: String,
    description: String,
    location: String,
    lat: Option<f64>,
    lng: Option<f64>,
    photo: Option<PathBuf>,
) -> Result<()> {
    let context = get_context().await?;
    let user = require_user(&context)?;

    let photo = photo.as_deref().map(load_photo).transpose()?;
    let new_trip = NewTrip {
        title,
        description,
        location_name: location,
        latitude: lat,
        longitude: lng,
    };

    let trip = context.trip_service.create(&user, new_trip, photo).await?;
    output::success(&format!("Posted '{}' ({})", trip.title, trip.id));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn edit(
    id: Uuid,
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    photo: Option<PathBuf>,
) -> Result<()> {
    let context = get_context().await?;
    let user = require_user(&context)?;

    let photo = photo.as_deref().map(load_photo).transpose()?;
    let changes = TripUpdate {
        title,
        description,
        location_name: location,
        latitude: lat.map(Some),
        longitude: lng.map(Some),
        photo_url: None,
    };

    if changes.is_empty() && photo.is_none() {
        output::warning("Nothing to change");
        return Ok(());
    }

    context.trip_service.update(&user, id, changes, photo).await?;
    output::success("Trip updated");
    Ok(())
}

pub async fn delete(id: Uuid, force: bool) -> Result<()> {
    let context = get_context().await?;
    let user = require_user(&context)?;

    let item = context.trip_service.detail(id).await?;
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{}'?", item.trip.title))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Cancelled");
            return Ok(());
        }
    }

    context.trip_service.delete(&user, id).await?;
    output::success("Trip deleted");
    Ok(())
}

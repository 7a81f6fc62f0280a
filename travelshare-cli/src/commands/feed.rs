//! Feed command - the public trip feed

use anyhow::Result;

use super::get_context;
use crate::output;

pub async fn run(search: Option<String>, json: bool) -> Result<()> {
    let context = get_context().await?;
    let trips = context.trip_service.feed(search.as_deref()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&trips)?);
        return Ok(());
    }

    if trips.is_empty() {
        match search {
            Some(term) => output::info(&format!("No trips matching '{term}'")),
            None => output::info("No trips posted yet"),
        }
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Title", "Location", "By", "Posted"]);
    for item in &trips {
        table.add_row(vec![
            item.trip.id.to_string(),
            output::truncate(&item.trip.title, 40),
            item.trip.location_name.clone(),
            item.author_username
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            item.trip.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    println!("{table}");
    println!("{} trip(s)", trips.len());
    Ok(())
}

//! Retrieve one organisation's canonical entry by id.

use anyhow::{bail, Result};

use crate::entries::{META_SORT, ORG_PREFIX};
use crate::store::Store;

pub async fn run_get(store: &dyn Store, org_id: &str) -> Result<()> {
    let partition = format!("{}{}", ORG_PREFIX, org_id);
    let entry = match store.get_entry(&partition, META_SORT).await? {
        Some(entry) => entry,
        None => bail!("No organisation found with id: {}", org_id),
    };

    let payload = &entry.payload;
    println!("Organisation: {}", payload.organisation_name);
    println!("Id:           {}", org_id);
    println!("Town:         {}", payload.town);
    println!("County:       {}", payload.county);
    println!("Type/Rating:  {}", payload.type_rating);
    println!("Routes:       {}", payload.routes.join(" | "));
    println!("Created:      {}", payload.created_at);

    let keywords = store.keywords_for(org_id).await?;
    if keywords.is_empty() {
        println!("Keywords:     (none — name is all stop words)");
    } else {
        println!("Keywords:     {}", keywords.join(", "));
    }

    Ok(())
}

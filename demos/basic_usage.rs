//! Basic usage of a parent/child property chain.
//!
//! Run with `RUST_LOG=debug` to see cache and lock activity.

use propstore::{DirectoryLayout, PropertyCache, PropertyStore};
use std::sync::Arc;

fn main() -> propstore::Result<()> {
    env_logger::init();

    let base = std::env::temp_dir().join("propstore-demo");
    let layout = DirectoryLayout::new(base.clone());
    let cache = Arc::new(PropertyCache::new());

    let project = Arc::new(
        PropertyStore::builder(layout.entity("project"))
            .cache(Arc::clone(&cache))
            .build(),
    );
    let shot = PropertyStore::builder(layout.entity("shot_010"))
        .parent(Arc::clone(&project))
        .cache(Arc::clone(&cache))
        .build();

    project.update("frame_rate", 24)?;
    project.update("resolution", "1920x1080")?;
    shot.update("frame_rate", 25)?;

    println!("project: {}", serde_json::Value::Object(project.get_dict()?));
    println!("shot:    {}", serde_json::Value::Object(shot.get_dict()?));
    println!("shot own: {}", serde_json::Value::Object(shot.get_dict_without_inheritance()?));

    shot.clear()?;
    println!("shot after clear: {}", serde_json::Value::Object(shot.get_dict()?));

    project.clear()?;
    Ok(())
}

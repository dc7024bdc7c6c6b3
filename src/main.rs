//! Footprints viewer. Loads `FOOTPRINTS_DATA` (if set) and frames it.

use bevy::prelude::*;
use footprint_scene::prelude::*;

fn main() -> AppExit {
    let _ = dotenvy::dotenv();

    FootprintSceneBuilder::new()
        .config(SceneConfig::from_env())
        .build()
        .run()
}

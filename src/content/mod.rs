//! Content domain: RON archetype/tuning loading, registry, and validation.

mod data;
mod loader;
mod registry;
mod validation;

pub use data::*;
pub use loader::{ContentLoadError, load_all_content, parse_data_file, parse_single};
pub use registry::ArchetypeRegistry;
pub use validation::{ValidationError, validate_content};

use bevy::prelude::*;
use std::path::PathBuf;

use crate::combat::CombatTuning;

/// Loads archetypes and combat tuning at startup.
///
/// With no `data_dir` the built-in roster and default tuning are used, which
/// is what headless tests rely on.
#[derive(Default)]
pub struct ContentPlugin {
    pub data_dir: Option<PathBuf>,
}

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        let (registry, tuning) = match &self.data_dir {
            Some(dir) => match load_all_content(dir) {
                Ok(loaded) => loaded,
                Err(errors) => {
                    for error in &errors {
                        error!("{}", error);
                    }
                    warn!("Falling back to built-in archetypes and tuning");
                    (ArchetypeRegistry::builtin(), CombatTuning::default())
                }
            },
            None => (ArchetypeRegistry::builtin(), CombatTuning::default()),
        };

        for error in validate_content(&registry) {
            warn!("{}", error);
        }
        info!("{}", registry.summary());

        app.insert_resource(registry).insert_resource(tuning);
    }
}

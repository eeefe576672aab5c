//! Loader for RON content files at startup.

use ron::Options;
use std::fs;
use std::path::Path;

use super::data::*;
use super::registry::ArchetypeRegistry;
use crate::combat::CombatTuning;

/// Error type for content loading failures.
#[derive(Debug)]
pub struct ContentLoadError {
    pub file: String,
    pub message: String,
}

impl std::fmt::Display for ContentLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to load {}: {}", self.file, self.message)
    }
}

/// Create RON options with extensions enabled for more flexible parsing.
fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

fn read_file(path: &Path) -> Result<String, ContentLoadError> {
    fs::read_to_string(path).map_err(|e| ContentLoadError {
        file: path.display().to_string(),
        message: format!("IO error: {}", e),
    })
}

/// Parse a DataFile<T> wrapper from RON text.
pub fn parse_data_file<T>(file_name: &str, contents: &str) -> Result<Vec<T>, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let data: DataFile<T> = ron_options()
        .from_str(contents)
        .map_err(|e| ContentLoadError {
            file: file_name.to_string(),
            message: format!("Parse error: {}", e),
        })?;

    Ok(data.items)
}

/// Parse a single RON struct (not wrapped in DataFile).
pub fn parse_single<T>(file_name: &str, contents: &str) -> Result<T, ContentLoadError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    ron_options()
        .from_str(contents)
        .map_err(|e| ContentLoadError {
            file: file_name.to_string(),
            message: format!("Parse error: {}", e),
        })
}

/// Load archetypes.ron and combat.ron from `base_path`.
/// Returns every error encountered rather than stopping at the first.
pub fn load_all_content(
    base_path: &Path,
) -> Result<(ArchetypeRegistry, CombatTuning), Vec<ContentLoadError>> {
    let mut registry = ArchetypeRegistry::default();
    let mut errors = Vec::new();

    let archetypes_path = base_path.join("archetypes.ron");
    match read_file(&archetypes_path).and_then(|text| {
        parse_data_file::<ArchetypeDef>(&archetypes_path.display().to_string(), &text)
    }) {
        Ok(items) => {
            for item in items {
                if registry.archetypes.contains_key(&item.id) {
                    errors.push(ContentLoadError {
                        file: archetypes_path.display().to_string(),
                        message: format!("Duplicate archetype id '{}'", item.id),
                    });
                    continue;
                }
                registry.insert(item);
            }
        }
        Err(e) => errors.push(e),
    }

    let tuning_path = base_path.join("combat.ron");
    let tuning = match read_file(&tuning_path)
        .and_then(|text| parse_single::<CombatTuning>(&tuning_path.display().to_string(), &text))
    {
        Ok(tuning) => Some(tuning),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    match tuning {
        Some(tuning) if errors.is_empty() => Ok((registry, tuning)),
        _ => Err(errors),
    }
}

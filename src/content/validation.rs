//! Validation for cross-references and ordering rules between archetypes.

use super::data::*;
use super::registry::ArchetypeRegistry;

/// A validation error with context about what failed.
#[derive(Debug)]
pub struct ValidationError {
    pub source_id: String,
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Archetype '{}' field '{}': {}",
            self.source_id, self.field, self.message
        )
    }
}

/// Helper macro for checking a referenced archetype exists with the right role
macro_rules! check_ref {
    ($errors:expr, $registry:expr, $source_id:expr, $field:expr, $ref_id:expr, $role:expr) => {
        match $registry.get($ref_id) {
            None => $errors.push(ValidationError {
                source_id: $source_id.to_string(),
                field: $field,
                message: format!("references missing archetype '{}'", $ref_id),
            }),
            Some(target) if target.role != $role => $errors.push(ValidationError {
                source_id: $source_id.to_string(),
                field: $field,
                message: format!(
                    "references '{}' with role {:?}, expected {:?}",
                    $ref_id, target.role, $role
                ),
            }),
            Some(_) => {}
        }
    };
}

/// Validate every archetype in the registry.
/// Returns a list of validation errors, empty if the content is consistent.
pub fn validate_content(registry: &ArchetypeRegistry) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (id, def) in &registry.archetypes {
        if def.max_health <= 0.0 {
            errors.push(ValidationError {
                source_id: id.clone(),
                field: "max_health",
                message: format!("must be positive, got {}", def.max_health),
            });
        }

        if def.weapon.ranged.is_none()
            && !def.weapon.volumes.is_empty()
            && def.weapon.light_clips.is_empty()
        {
            errors.push(ValidationError {
                source_id: id.clone(),
                field: "weapon.light_clips",
                message: "melee weapon has no light attack clips".to_string(),
            });
        }

        if let Some(summon) = &def.attacks.summon {
            if summon.minion_pool.is_empty() {
                errors.push(ValidationError {
                    source_id: id.clone(),
                    field: "attacks.summon.minion_pool",
                    message: "summon has an empty minion pool".to_string(),
                });
            }
            for minion_id in &summon.minion_pool {
                check_ref!(
                    errors,
                    registry,
                    id,
                    "attacks.summon.minion_pool",
                    minion_id,
                    Role::Minion
                );
            }
        }

        if let Some(pillars) = &def.attacks.pillars {
            check_ref!(
                errors,
                registry,
                id,
                "attacks.pillars.pillar",
                &pillars.pillar,
                Role::Pillar
            );
        }

        if let Some(patrol) = &def.patrol {
            if def.ai.is_none() {
                errors.push(ValidationError {
                    source_id: id.clone(),
                    field: "patrol",
                    message: "patrol route on an archetype without ai".to_string(),
                });
            }
            if patrol.waypoints.is_empty() {
                errors.push(ValidationError {
                    source_id: id.clone(),
                    field: "patrol.waypoints",
                    message: "patrol route has no waypoints".to_string(),
                });
            }
        }

        if def.role == Role::Boss && def.boss.is_none() {
            errors.push(ValidationError {
                source_id: id.clone(),
                field: "boss",
                message: "boss archetype has no boss table".to_string(),
            });
        }

        if let Some(boss) = &def.boss {
            validate_phases(id, boss, &mut errors);
        }
    }

    errors
}

/// Phases must advance in order while thresholds strictly decrease.
fn validate_phases(id: &str, boss: &BossDef, errors: &mut Vec<ValidationError>) {
    let mut last_phase = BossPhase::Phase1;
    let mut last_threshold = 1.0;

    for phase in &boss.phases {
        if phase.phase <= last_phase {
            errors.push(ValidationError {
                source_id: id.to_string(),
                field: "boss.phases",
                message: format!("{:?} listed after {:?}", phase.phase, last_phase),
            });
        }
        if phase.threshold >= last_threshold || phase.threshold <= 0.0 {
            errors.push(ValidationError {
                source_id: id.to_string(),
                field: "boss.phases",
                message: format!(
                    "threshold {} for {:?} must be in (0, {})",
                    phase.threshold, phase.phase, last_threshold
                ),
            });
        }
        last_phase = phase.phase;
        last_threshold = phase.threshold;
    }
}

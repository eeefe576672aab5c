//! Combat domain: enemy decisions, boss scheduling, and attack tasks.

pub(crate) mod boss;
pub(crate) mod enemy;
pub(crate) mod hazards;
pub mod tasks;
pub(crate) mod telegraph;

#[cfg(test)]
mod tests;

pub use boss::{BossMode, BossScheduler};
pub use enemy::{Arsenal, Brain, BrainState, choose_melee, choose_ranged};
pub use hazards::{Hazard, HazardKind, HazardRise, HazardSet, smoothstep};
pub use tasks::{
    AttackTask, TargetView, TaskChoice, TaskContext, TaskEffect, TaskEffects, TaskPoll,
    TaskSlot, TelegraphKind, build_task, commit_cooldowns,
};
pub use telegraph::{DropMarker, Telegraph, drop_progress, flash_period};

pub(crate) use boss::{finish_special_phases, reset_bosses_on_respawn, update_boss_phases};
pub(crate) use enemy::{decide_enemies, reset_brains_on_respawn};
pub(crate) use hazards::{raise_hazards, remove_destroyed_hazards, report_hazard_deaths};
pub(crate) use tasks::{apply_task_effects, run_attack_tasks};
pub(crate) use telegraph::animate_telegraphs;

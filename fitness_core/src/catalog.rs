//! Built-in custom plan.
//!
//! These are the exercises a user can start from the plan screen; starting
//! one inserts a workout history entry with the item's starting progress.

use crate::NewWorkout;
use once_cell::sync::Lazy;
use serde::Serialize;

/// One startable exercise in the custom plan
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PlanItem {
    pub id: u32,
    pub title: String,
    pub image_ref: String,
    pub progress: f32,
}

impl PlanItem {
    fn new(id: u32, title: &str, image_ref: &str, progress: f32) -> Self {
        Self {
            id,
            title: title.into(),
            image_ref: image_ref.into(),
            progress,
        }
    }

    /// The workout entry inserted when this item is started
    pub fn start(&self) -> NewWorkout {
        NewWorkout::new(self.title.clone(), self.progress, self.image_ref.clone())
    }
}

/// Cached default plan - built once and reused
static DEFAULT_PLAN: Lazy<Vec<PlanItem>> = Lazy::new(|| {
    vec![
        PlanItem::new(1, "10 PUSH UP", "workout_pushup", 0.7),
        PlanItem::new(2, "10 SQUATS", "workout_squat", 0.9),
        PlanItem::new(3, "15 SIDE SQUATS", "workout_side_squat", 0.5),
        PlanItem::new(4, "20 LUNGES", "workout_3", 0.3),
        PlanItem::new(5, "20 PUSH UP", "workout_pushup", 0.1),
        PlanItem::new(6, "25 SQUATS", "workout_squat", 0.2),
        PlanItem::new(7, "10 MIN JUMPING JACKS", "workout_3", 0.0),
    ]
});

pub fn default_plan() -> &'static [PlanItem] {
    &DEFAULT_PLAN
}

pub fn find_plan_item(id: u32) -> Option<&'static PlanItem> {
    DEFAULT_PLAN.iter().find(|item| item.id == id)
}

//! Goal progress analyzer: acceleration and milestone checkpoints

use crate::error::Result;
use crate::models::GoalStatus;
use crate::stats;

use super::engine::{Analyzer, RecommendationContext};
use super::types::{AnalyzerKind, Recommendation, RecommendationKind};

/// Progress below which a goal needs acceleration, in percent
const LAGGING_PERCENT: f64 = 25.0;
/// Progress above which a goal is nearly achieved, in percent
const MILESTONE_PERCENT: f64 = 75.0;

pub struct GoalProgressAnalyzer;

impl Analyzer for GoalProgressAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::GoalProgress
    }

    fn name(&self) -> &'static str {
        "Goal Progress"
    }

    fn analyze(&self, ctx: &RecommendationContext<'_>) -> Result<Vec<Recommendation>> {
        let goals = ctx.db.fetch_goals(ctx.user_id)?;

        let mut recommendations = Vec::new();
        for goal in goals.iter().filter(|g| g.status == GoalStatus::Active) {
            let progress_pct = if goal.target_amount > 0.0 {
                goal.current_amount / goal.target_amount * 100.0
            } else {
                0.0
            };

            if progress_pct < LAGGING_PERCENT {
                recommendations.push(
                    Recommendation::new(
                        RecommendationKind::GoalAcceleration,
                        format!("Accelerate progress on {}", goal.name),
                        format!(
                            "You're only {:.1}% towards your goal of ${:.2}. \
                             Consider increasing contributions.",
                            progress_pct, goal.target_amount
                        ),
                        format!("Increase contributions to {}", goal.name),
                        8,
                    )
                    .with_goal(goal.id)
                    .with_progress(stats::round1(progress_pct)),
                );
            } else if progress_pct > MILESTONE_PERCENT {
                recommendations.push(
                    Recommendation::new(
                        RecommendationKind::GoalMilestone,
                        format!("You're close to achieving {}", goal.name),
                        format!(
                            "You've reached {:.1}% of your goal. Keep up the momentum!",
                            progress_pct
                        ),
                        format!("Maintain contributions to {}", goal.name),
                        5,
                    )
                    .with_goal(goal.id)
                    .with_progress(stats::round1(progress_pct)),
                );
            }
        }

        Ok(recommendations)
    }
}

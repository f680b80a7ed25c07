//! Agent Orchestrator
//!
//! Coordinates a roster of financial agents per task and synthesizes their
//! reports into one unified answer. Each agent declares its capability
//! through the [`Agent`] trait; dispatch is by declared kind, never by
//! probing for methods. Agent failures are captured per agent and reduce the
//! synthesis confidence instead of aborting the task.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::forecast::{self, RiskLevel};
use crate::stats::{self, Trend};

/// Bound on the retained execution log
const EXECUTION_LOG_CAPACITY: usize = 128;

/// Identities of agents in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    FinancialAdvisor,
    RiskAssessor,
    PredictionAgent,
    CoachingAgent,
    PortfolioOptimizer,
    MarketAnalyst,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::FinancialAdvisor => "financial_advisor",
            AgentKind::RiskAssessor => "risk_assessor",
            AgentKind::PredictionAgent => "prediction_agent",
            AgentKind::CoachingAgent => "coaching_agent",
            AgentKind::PortfolioOptimizer => "portfolio_optimizer",
            AgentKind::MarketAnalyst => "market_analyst",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collaborative tasks with a fixed agent roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    FinancialPlanning,
    PortfolioOptimization,
    UserCoaching,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::FinancialPlanning => "financial_planning",
            TaskKind::PortfolioOptimization => "portfolio_optimization",
            TaskKind::UserCoaching => "user_coaching",
        }
    }

    /// The agents this task asks for, in execution order
    pub fn roster(&self) -> &'static [AgentKind] {
        match self {
            TaskKind::FinancialPlanning => &[
                AgentKind::FinancialAdvisor,
                AgentKind::RiskAssessor,
                AgentKind::PredictionAgent,
            ],
            TaskKind::PortfolioOptimization => &[
                AgentKind::PortfolioOptimizer,
                AgentKind::MarketAnalyst,
                AgentKind::RiskAssessor,
            ],
            TaskKind::UserCoaching => &[
                AgentKind::CoachingAgent,
                AgentKind::FinancialAdvisor,
                AgentKind::PredictionAgent,
            ],
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "financial_planning" => Ok(TaskKind::FinancialPlanning),
            "portfolio_optimization" => Ok(TaskKind::PortfolioOptimization),
            "user_coaching" => Ok(TaskKind::UserCoaching),
            _ => Err(format!("Unknown task type: {}", s)),
        }
    }
}

/// Snapshot of a user's finances handed to every agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInput {
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub debt: f64,
    pub emergency_fund: f64,
    #[serde(default)]
    pub monthly_spending: Vec<f64>,
    #[serde(default)]
    pub monthly_income: Vec<f64>,
}

/// What one agent concluded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentReport {
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub risk_factors: Vec<String>,
}

/// Per-agent outcome within a task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgentOutcome {
    Success {
        #[serde(flatten)]
        report: AgentReport,
    },
    Error {
        error: String,
    },
}

/// A capability-declaring financial agent
pub trait Agent: Send + Sync {
    /// Which agent this is
    fn kind(&self) -> AgentKind;

    /// Evaluate the user's snapshot and report conclusions
    fn evaluate(&self, input: &AgentInput) -> Result<AgentReport>;
}

/// Combined risk view across all agents that reported a risk score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_risk_score: f64,
    pub risk_level: RiskLevel,
    pub identified_risks: Vec<String>,
}

/// Unified answer synthesized from the individual agent reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synthesis {
    pub task_type: TaskKind,
    /// Fraction of roster agents that ran and succeeded
    pub confidence_score: f64,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_assessment: RiskAssessment,
    pub next_steps: Vec<String>,
}

/// Full record of one collaborative task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskExecution {
    pub task_type: TaskKind,
    pub timestamp: DateTime<Utc>,
    pub agent_results: BTreeMap<AgentKind, AgentOutcome>,
    pub synthesized_recommendation: Synthesis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExecutionLogEntry {
    task_type: TaskKind,
    timestamp: DateTime<Utc>,
    agents_used: Vec<AgentKind>,
}

/// Registry, executions, and last-run bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    pub registered_agents: Vec<AgentKind>,
    pub total_agents: usize,
    pub total_executions: usize,
    pub last_execution: Option<DateTime<Utc>>,
}

/// Coordinates agents per task roster and synthesizes their reports
pub struct Orchestrator {
    agents: BTreeMap<AgentKind, Box<dyn Agent>>,
    execution_log: VecDeque<ExecutionLogEntry>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// Create an orchestrator with the built-in agents registered
    pub fn new() -> Self {
        let mut orchestrator = Self {
            agents: BTreeMap::new(),
            execution_log: VecDeque::new(),
        };

        orchestrator.register(Box::new(FinancialAdvisorAgent));
        orchestrator.register(Box::new(RiskAssessorAgent));
        orchestrator.register(Box::new(PredictionAgent));

        orchestrator
    }

    pub fn register(&mut self, agent: Box<dyn Agent>) {
        let kind = agent.kind();
        self.agents.insert(kind, agent);
        tracing::info!(agent = kind.as_str(), "Agent registered");
    }

    /// Run the task's roster and synthesize the results
    ///
    /// Agents missing from the registry are skipped with a warning; agents
    /// that fail are recorded as error outcomes. Both lower the confidence.
    pub fn execute(&mut self, task: TaskKind, input: &AgentInput) -> Result<TaskExecution> {
        let mut agent_results: BTreeMap<AgentKind, AgentOutcome> = BTreeMap::new();
        let mut agents_used = Vec::new();

        for kind in task.roster() {
            let Some(agent) = self.agents.get(kind) else {
                tracing::warn!(agent = kind.as_str(), "Agent not registered, skipping");
                continue;
            };

            match agent.evaluate(input) {
                Ok(report) => {
                    agents_used.push(*kind);
                    agent_results.insert(*kind, AgentOutcome::Success { report });
                }
                Err(e) => {
                    tracing::warn!(agent = kind.as_str(), error = %e, "Agent failed");
                    agent_results.insert(
                        *kind,
                        AgentOutcome::Error {
                            error: e.to_string(),
                        },
                    );
                }
            }
        }

        let timestamp = Utc::now();
        while self.execution_log.len() >= EXECUTION_LOG_CAPACITY {
            self.execution_log.pop_front();
        }
        self.execution_log.push_back(ExecutionLogEntry {
            task_type: task,
            timestamp,
            agents_used,
        });

        let synthesized_recommendation = synthesize(task, &agent_results);

        Ok(TaskExecution {
            task_type: task,
            timestamp,
            agent_results,
            synthesized_recommendation,
        })
    }

    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            registered_agents: self.agents.keys().copied().collect(),
            total_agents: self.agents.len(),
            total_executions: self.execution_log.len(),
            last_execution: self.execution_log.back().map(|e| e.timestamp),
        }
    }
}

fn synthesize(task: TaskKind, results: &BTreeMap<AgentKind, AgentOutcome>) -> Synthesis {
    let reports: Vec<&AgentReport> = results
        .values()
        .filter_map(|outcome| match outcome {
            AgentOutcome::Success { report } => Some(report),
            AgentOutcome::Error { .. } => None,
        })
        .collect();

    let confidence_score = if results.is_empty() {
        0.0
    } else {
        (reports.len() as f64 / results.len() as f64).min(1.0)
    };

    let key_insights: Vec<String> = reports
        .iter()
        .flat_map(|r| r.insights.iter().cloned())
        .take(5)
        .collect();
    let recommendations: Vec<String> = reports
        .iter()
        .flat_map(|r| r.recommendations.iter().cloned())
        .take(5)
        .collect();

    let risk_scores: Vec<f64> = reports.iter().filter_map(|r| r.risk_score).collect();
    // Without any risk signal the outlook is neutral
    let overall_risk_score = if risk_scores.is_empty() {
        0.5
    } else {
        stats::mean(&risk_scores)
    };

    let mut identified_risks: Vec<String> = Vec::new();
    for report in &reports {
        for factor in &report.risk_factors {
            if !identified_risks.contains(factor) {
                identified_risks.push(factor.clone());
            }
        }
    }
    identified_risks.truncate(5);

    Synthesis {
        task_type: task,
        confidence_score,
        key_insights,
        recommendations,
        risk_assessment: RiskAssessment {
            overall_risk_score,
            risk_level: categorize_risk(overall_risk_score),
            identified_risks,
        },
        next_steps: next_steps(task),
    }
}

fn categorize_risk(score: f64) -> RiskLevel {
    if score < 0.3 {
        RiskLevel::Low
    } else if score < 0.6 {
        RiskLevel::Medium
    } else if score < 0.8 {
        RiskLevel::High
    } else {
        RiskLevel::VeryHigh
    }
}

fn next_steps(task: TaskKind) -> Vec<String> {
    let steps: &[&str] = match task {
        TaskKind::FinancialPlanning => &[
            "Review and adjust budget allocations",
            "Set up automated savings transfers",
            "Schedule quarterly financial review",
            "Monitor investment performance",
        ],
        TaskKind::PortfolioOptimization => &[
            "Rebalance portfolio according to recommendations",
            "Review asset allocation",
            "Monitor market trends",
            "Adjust risk exposure if needed",
        ],
        TaskKind::UserCoaching => &[
            "Complete financial literacy modules",
            "Track spending patterns",
            "Review progress on financial goals",
            "Schedule coaching session",
        ],
    };
    steps.iter().map(|s| s.to_string()).collect()
}

/// Scores overall financial health from the snapshot ratios
pub struct FinancialAdvisorAgent;

impl Agent for FinancialAdvisorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::FinancialAdvisor
    }

    fn evaluate(&self, input: &AgentInput) -> Result<AgentReport> {
        let metrics = forecast::health_metrics(
            input.income,
            input.expenses,
            input.savings,
            input.debt,
            input.emergency_fund,
        );
        let score = forecast::health_score(&metrics);
        let category = forecast::categorize_health(score);

        let mut insights = vec![format!(
            "Financial health score is {:.0} ({:?})",
            score, category
        )];
        insights.extend(forecast::health_strengths(&metrics));

        Ok(AgentReport {
            insights,
            recommendations: forecast::health_recommendations(&metrics),
            risk_score: None,
            risk_factors: forecast::health_weaknesses(&metrics),
        })
    }
}

/// Combines debt burden and spending volatility into one risk score
pub struct RiskAssessorAgent;

impl Agent for RiskAssessorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::RiskAssessor
    }

    fn evaluate(&self, input: &AgentInput) -> Result<AgentReport> {
        let debt_ratio = if input.income > 0.0 {
            input.debt / input.income
        } else {
            1.0
        };

        // Fraction of months spending more than two deviations above the mean
        let mean = stats::mean(&input.monthly_spending);
        let std_dev = stats::sample_std_dev(&input.monthly_spending);
        let threshold = mean + 2.0 * std_dev;
        let volatility = if input.monthly_spending.is_empty() {
            0.0
        } else {
            input
                .monthly_spending
                .iter()
                .filter(|v| **v > threshold)
                .count() as f64
                / input.monthly_spending.len() as f64
        };

        let risk_score = (0.5 * debt_ratio.min(1.0) + 0.5 * volatility).clamp(0.0, 1.0);

        let mut risk_factors = Vec::new();
        if debt_ratio > 0.5 {
            risk_factors.push("High debt relative to income".to_string());
        }
        if volatility > 0.3 {
            risk_factors.push("Volatile spending pattern".to_string());
        }
        if input.emergency_fund <= 0.0 {
            risk_factors.push("No emergency fund".to_string());
        }

        let mut recommendations = Vec::new();
        if !risk_factors.is_empty() {
            recommendations.push("Address the identified risk factors first".to_string());
        }

        Ok(AgentReport {
            insights: vec![format!(
                "Overall risk score is {:.2} on a 0-1 scale",
                risk_score
            )],
            recommendations,
            risk_score: Some(risk_score),
            risk_factors,
        })
    }
}

/// Reads the direction of the spending and income series
pub struct PredictionAgent;

impl Agent for PredictionAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::PredictionAgent
    }

    fn evaluate(&self, input: &AgentInput) -> Result<AgentReport> {
        let mut insights = Vec::new();
        let mut recommendations = Vec::new();

        match stats::classify_trend(&input.monthly_spending) {
            Trend::Increasing => {
                insights.push("Spending is trending upward".to_string());
                recommendations.push("Plan for higher spending in coming months".to_string());
            }
            Trend::Decreasing => {
                insights.push("Spending is trending downward".to_string());
            }
            Trend::Stable => {
                insights.push("Spending is stable month over month".to_string());
            }
            Trend::InsufficientData => {}
        }

        let income_slope = stats::trend_slope(&input.monthly_income);
        if input.monthly_income.len() >= 2 {
            if income_slope > 0.0 {
                insights.push("Income is trending upward".to_string());
            } else if income_slope < 0.0 {
                insights.push("Income is trending downward".to_string());
                recommendations
                    .push("Build a buffer against declining income".to_string());
            }
        }

        Ok(AgentReport {
            insights,
            recommendations,
            risk_score: None,
            risk_factors: Vec::new(),
        })
    }
}

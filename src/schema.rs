//! Survey feature-record schema
//!
//! The fixed ten-field contract shared between training and serving. Column
//! names here are the single source of truth: the preprocessor selects
//! columns by these names and the interactive form produces records with
//! exactly this field set.

use crate::error::{DepscreenError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary target column in the training dataset (1 = dependent)
pub const TARGET_COLUMN: &str = "chatgpt_dependence";

/// Categorical feature columns, in transformed-block order
pub const CATEGORICAL_COLUMNS: [&str; 2] = ["reason_for_using_chatgpt", "department"];

/// Numerical feature columns, in transformed-block order
pub const NUMERICAL_COLUMNS: [&str; 8] = [
    "chatgpt_usage_frequency_per_week",
    "average_duration_per_session_minutes",
    "attempt_before_chatgpt",
    "confidence_in_solving_alone",
    "peer_usage_influence",
    "cgpa",
    "used_other_ai_tools",
    "chatgpt_preferred_over_google",
];

/// All ten feature columns as they appear in the survey dataset
pub const FEATURE_COLUMNS: [&str; 10] = [
    "chatgpt_usage_frequency_per_week",
    "average_duration_per_session_minutes",
    "attempt_before_chatgpt",
    "confidence_in_solving_alone",
    "peer_usage_influence",
    "reason_for_using_chatgpt",
    "cgpa",
    "department",
    "used_other_ai_tools",
    "chatgpt_preferred_over_google",
];

/// Reason for using ChatGPT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    #[serde(rename = "No idea")]
    NoIdea,
    #[serde(rename = "Save time")]
    SaveTime,
    #[serde(rename = "Better answers")]
    BetterAnswers,
}

impl Reason {
    /// All variants, in the order the survey offered them
    pub const ALL: [Reason; 3] = [Reason::NoIdea, Reason::SaveTime, Reason::BetterAnswers];

    /// The value as stored in the dataset
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::NoIdea => "No idea",
            Reason::SaveTime => "Save time",
            Reason::BetterAnswers => "Better answers",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reason {
    type Err = DepscreenError;

    fn from_str(s: &str) -> Result<Self> {
        Reason::ALL
            .iter()
            .find(|r| r.as_str() == s)
            .copied()
            .ok_or_else(|| {
                DepscreenError::InvalidInput(format!("unknown reason_for_using_chatgpt: {:?}", s))
            })
    }
}

/// Academic department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "MECH")]
    Mech,
    #[serde(rename = "EXTC")]
    Extc,
    #[serde(rename = "COMPUTER")]
    Computer,
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "ELECTRICAL")]
    Electrical,
    #[serde(rename = "CIVIL")]
    Civil,
}

impl Department {
    /// All variants, in the order the survey offered them
    pub const ALL: [Department; 6] = [
        Department::Mech,
        Department::Extc,
        Department::Computer,
        Department::It,
        Department::Electrical,
        Department::Civil,
    ];

    /// The value as stored in the dataset
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Mech => "MECH",
            Department::Extc => "EXTC",
            Department::Computer => "COMPUTER",
            Department::It => "IT",
            Department::Electrical => "ELECTRICAL",
            Department::Civil => "CIVIL",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = DepscreenError;

    fn from_str(s: &str) -> Result<Self> {
        Department::ALL
            .iter()
            .find(|d| d.as_str() == s)
            .copied()
            .ok_or_else(|| DepscreenError::InvalidInput(format!("unknown department: {:?}", s)))
    }
}

/// One survey response, the unit of prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub chatgpt_usage_frequency_per_week: u32,
    pub average_duration_per_session_minutes: u32,
    pub attempt_before_chatgpt: u32,
    pub confidence_in_solving_alone: u8,
    pub peer_usage_influence: u8,
    pub reason_for_using_chatgpt: Reason,
    pub cgpa: f64,
    pub department: Department,
    pub used_other_ai_tools: u8,
    pub chatgpt_preferred_over_google: u8,
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            chatgpt_usage_frequency_per_week: 3,
            average_duration_per_session_minutes: 30,
            attempt_before_chatgpt: 2,
            confidence_in_solving_alone: 3,
            peer_usage_influence: 3,
            reason_for_using_chatgpt: Reason::NoIdea,
            cgpa: 7.5,
            department: Department::Mech,
            used_other_ai_tools: 0,
            chatgpt_preferred_over_google: 0,
        }
    }
}

impl FeatureRecord {
    /// Check that every field lies inside its documented domain
    pub fn validate(&self) -> Result<()> {
        fn out_of_range<T: fmt::Display>(field: &str, value: T, domain: &str) -> DepscreenError {
            DepscreenError::InvalidInput(format!("{} = {} (expected {})", field, value, domain))
        }

        if self.chatgpt_usage_frequency_per_week > 50 {
            return Err(out_of_range(
                "chatgpt_usage_frequency_per_week",
                self.chatgpt_usage_frequency_per_week,
                "0-50",
            ));
        }
        if self.average_duration_per_session_minutes > 300 {
            return Err(out_of_range(
                "average_duration_per_session_minutes",
                self.average_duration_per_session_minutes,
                "0-300",
            ));
        }
        if self.attempt_before_chatgpt > 20 {
            return Err(out_of_range(
                "attempt_before_chatgpt",
                self.attempt_before_chatgpt,
                "0-20",
            ));
        }
        if !(1..=5).contains(&self.confidence_in_solving_alone) {
            return Err(out_of_range(
                "confidence_in_solving_alone",
                self.confidence_in_solving_alone,
                "1-5",
            ));
        }
        if !(1..=5).contains(&self.peer_usage_influence) {
            return Err(out_of_range(
                "peer_usage_influence",
                self.peer_usage_influence,
                "1-5",
            ));
        }
        if !self.cgpa.is_finite() || !(0.0..=10.0).contains(&self.cgpa) {
            return Err(out_of_range("cgpa", self.cgpa, "0.0-10.0"));
        }
        if self.used_other_ai_tools > 1 {
            return Err(out_of_range(
                "used_other_ai_tools",
                self.used_other_ai_tools,
                "0 or 1",
            ));
        }
        if self.chatgpt_preferred_over_google > 1 {
            return Err(out_of_range(
                "chatgpt_preferred_over_google",
                self.chatgpt_preferred_over_google,
                "0 or 1",
            ));
        }

        Ok(())
    }

    /// Build the one-row labeled table the pipeline consumes
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = df!(
            "chatgpt_usage_frequency_per_week" => [self.chatgpt_usage_frequency_per_week as f64],
            "average_duration_per_session_minutes" => [self.average_duration_per_session_minutes as f64],
            "attempt_before_chatgpt" => [self.attempt_before_chatgpt as f64],
            "confidence_in_solving_alone" => [self.confidence_in_solving_alone as f64],
            "peer_usage_influence" => [self.peer_usage_influence as f64],
            "reason_for_using_chatgpt" => [self.reason_for_using_chatgpt.as_str()],
            "cgpa" => [self.cgpa],
            "department" => [self.department.as_str()],
            "used_other_ai_tools" => [self.used_other_ai_tools as f64],
            "chatgpt_preferred_over_google" => [self.chatgpt_preferred_over_google as f64],
        )?;

        Ok(df)
    }
}

/// Predicted dependency verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyLabel {
    NotDependent,
    Dependent,
}

impl DependencyLabel {
    /// Map a raw class label (0/1) to a verdict
    pub fn from_class(class: i64) -> Self {
        if class == 1 {
            DependencyLabel::Dependent
        } else {
            DependencyLabel::NotDependent
        }
    }

    pub fn is_dependent(&self) -> bool {
        matches!(self, DependencyLabel::Dependent)
    }
}

impl fmt::Display for DependencyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyLabel::Dependent => f.write_str("Dependent"),
            DependencyLabel::NotDependent => f.write_str("Not dependent"),
        }
    }
}

//! Train and Assess Example
//!
//! Trains the screening model on a small synthetic survey and assesses
//! two contrasting responses.

use depscreen::inference::ScoringEngine;
use depscreen::schema::{Department, FeatureRecord, Reason};
use depscreen::training::{ForestParams, Trainer, TrainingConfig};
use polars::prelude::*;

fn main() -> anyhow::Result<()> {
    // Create a small balanced survey
    let n = 60;
    let mut usage = Vec::with_capacity(n);
    let mut duration = Vec::with_capacity(n);
    let mut attempts = Vec::with_capacity(n);
    let mut confidence = Vec::with_capacity(n);
    let mut peer = Vec::with_capacity(n);
    let mut reason = Vec::with_capacity(n);
    let mut cgpa = Vec::with_capacity(n);
    let mut department = Vec::with_capacity(n);
    let mut other_ai = Vec::with_capacity(n);
    let mut prefers = Vec::with_capacity(n);
    let mut label = Vec::with_capacity(n);

    for i in 0..n {
        let dependent = i % 2 == 1;
        reason.push(Reason::ALL[i % Reason::ALL.len()].as_str());
        department.push(Department::ALL[i % Department::ALL.len()].as_str());

        if dependent {
            usage.push(10 + (i % 8) as i64);
            duration.push(60 + 10 * (i % 10) as i64);
            attempts.push((i % 2) as i64);
            confidence.push(1 + (i % 2) as i64);
            peer.push(4 + (i % 2) as i64);
            cgpa.push(5.5 + 0.1 * (i % 10) as f64);
            other_ai.push(1i64);
            prefers.push(1i64);
            label.push(1i64);
        } else {
            usage.push((i % 4) as i64);
            duration.push(5 + 3 * (i % 10) as i64);
            attempts.push(3 + (i % 5) as i64);
            confidence.push(4 + (i % 2) as i64);
            peer.push(1 + (i % 2) as i64);
            cgpa.push(8.0 + 0.15 * (i % 10) as f64);
            other_ai.push(0i64);
            prefers.push(0i64);
            label.push(0i64);
        }
    }

    let df = df!(
        "chatgpt_usage_frequency_per_week" => usage,
        "average_duration_per_session_minutes" => duration,
        "attempt_before_chatgpt" => attempts,
        "confidence_in_solving_alone" => confidence,
        "peer_usage_influence" => peer,
        "reason_for_using_chatgpt" => reason,
        "cgpa" => cgpa,
        "department" => department,
        "used_other_ai_tools" => other_ai,
        "chatgpt_preferred_over_google" => prefers,
        "chatgpt_dependence" => label,
    )?;

    println!("Dataset: {} rows, {} columns", df.height(), df.width());

    // Configure training
    let config = TrainingConfig::new().with_params(ForestParams {
        n_estimators: 30,
        max_depth: Some(10),
        ..ForestParams::default()
    });

    // Train the model
    let outcome = Trainer::new(config).train(&df)?;

    println!("\nTraining Results:");
    println!("  Accuracy: {:.4}", outcome.report.metrics.accuracy);
    println!("  F1 Score: {:.4}", outcome.report.metrics.f1_score);
    println!("  Training time: {:.3}s", outcome.report.training_time_secs);

    // Assess two contrasting survey responses
    let engine = ScoringEngine::from_model(outcome.model);

    let heavy_user = FeatureRecord {
        chatgpt_usage_frequency_per_week: 15,
        average_duration_per_session_minutes: 120,
        attempt_before_chatgpt: 0,
        confidence_in_solving_alone: 1,
        peer_usage_influence: 5,
        reason_for_using_chatgpt: Reason::SaveTime,
        cgpa: 6.0,
        department: Department::It,
        used_other_ai_tools: 1,
        chatgpt_preferred_over_google: 1,
    };

    let light_user = FeatureRecord {
        chatgpt_usage_frequency_per_week: 0,
        average_duration_per_session_minutes: 5,
        attempt_before_chatgpt: 3,
        confidence_in_solving_alone: 5,
        peer_usage_influence: 1,
        reason_for_using_chatgpt: Reason::NoIdea,
        cgpa: 9.0,
        department: Department::Computer,
        used_other_ai_tools: 0,
        chatgpt_preferred_over_google: 0,
    };

    for (name, record) in [("heavy user", heavy_user), ("light user", light_user)] {
        let assessment = engine.assess(&record)?;
        println!(
            "\n{}: {} (dependent probability {:.2})",
            name, assessment.label, assessment.probability
        );
        for tip in &assessment.tips {
            println!("  tip: {}", tip.message());
        }
    }

    Ok(())
}

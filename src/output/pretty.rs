use chrono::Duration;
use colored::Colorize;

use super::duration::{format_duration, format_duration_short};
use crate::features::exercises::Exercise;
use crate::features::practice::{PracticeSession, PracticeTotals, SessionState};

/// Format the exercise catalog as a table
pub fn format_exercises_pretty(exercises: &[Exercise]) -> String {
    if exercises.is_empty() {
        return "Exercises (0)\n  No exercises".to_string();
    }

    let mut output = format!("Exercises ({})\n", exercises.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for exercise in exercises {
        let mut line = format!(
            "{:<14} {}  {}",
            exercise.slug.cyan(),
            exercise.name.bold(),
            exercise.pattern().yellow()
        );
        line.push_str(&format!(
            "  {}",
            format!("{}s/cycle", exercise.cycle_seconds()).dimmed()
        ));
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Format one exercise with its phases
pub fn format_exercise_pretty(exercise: &Exercise) -> String {
    let mut output = format!("{} ({})\n", exercise.name.bold(), exercise.slug.cyan());

    if !exercise.description.is_empty() {
        output.push_str(&format!("  {}\n", exercise.description));
    }

    if !exercise.aliases.is_empty() {
        output.push_str(&format!(
            "  {}: {}\n",
            "Aliases".dimmed(),
            exercise.aliases.join(", ")
        ));
    }

    if let Some(track) = &exercise.ambient_track {
        output.push_str(&format!("  {}: {}\n", "Sound".dimmed(), track));
    }

    output.push_str(&format!("  {}:\n", "Phases".dimmed()));
    for (i, phase) in exercise.phases.iter().enumerate() {
        output.push_str(&format!(
            "    {}. {:<16} {}\n",
            i + 1,
            phase.label,
            format!("{}s", phase.duration_seconds).yellow()
        ));
    }

    output.push_str(&format!(
        "  {}: {}\n",
        "Cycle".dimmed(),
        format_duration(Duration::seconds(exercise.cycle_seconds()))
    ));

    output
}

/// Format practice history, newest first
pub fn format_sessions_pretty(sessions: &[PracticeSession]) -> String {
    if sessions.is_empty() {
        return "Practice history (0)\n  No sessions yet".to_string();
    }

    let mut output = format!("Practice history ({})\n", sessions.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for session in sessions {
        let icon = match session.state {
            SessionState::Completed => "[x]".green(),
            SessionState::Abandoned => "[-]".red(),
            SessionState::Running => "[ ]".white(),
        };

        let cycles = match session.target_cycles {
            Some(target) => format!("{}/{target} cycles", session.cycles_completed),
            None => format!("{} cycles", session.cycles_completed),
        };

        output.push_str(&format!(
            "{} {}  {}  {}  {}\n",
            icon,
            session
                .started_at_local()
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .dimmed(),
            session.exercise.bold(),
            cycles,
            format_duration_short(session.practiced()).yellow()
        ));
    }

    output
}

/// Format lifetime totals
pub fn format_totals_pretty(totals: &PracticeTotals) -> String {
    let mut output = "Practice totals\n".bold().to_string();
    output.push_str(&"─".repeat(30));
    output.push('\n');
    output.push_str(&format!("  {}: {}\n", "Sessions".dimmed(), totals.sessions));
    output.push_str(&format!("  {}: {}\n", "Completed".dimmed(), totals.completed));
    output.push_str(&format!("  {}: {}\n", "Cycles".dimmed(), totals.cycles));
    output.push_str(&format!(
        "  {}: {}\n",
        "Time".dimmed(),
        format_duration(Duration::seconds(totals.seconds))
    ));
    output
}

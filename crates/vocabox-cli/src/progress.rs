//! `progress` and `reset` commands

use std::path::Path;

use chrono::Utc;
use colored::{Color, Colorize};
use vocabox_core::{
    interval_for, ContentSource, JsonContentSource, ProgressStore, SqliteStore, TopicProgress,
};

/// Print a topic's box distribution, due words and quiz history
pub fn run_progress(
    store: &SqliteStore,
    user: &str,
    topic: &str,
    vocab: Option<&Path>,
) -> anyhow::Result<()> {
    let progress = store.load(user, topic)?;
    let now = Utc::now();

    println!("{}", format!("=== {} ({}) ===", topic, user).cyan().bold());
    println!();

    let tracked = progress.word_state.len();
    println!("{}: {}", "Words Tracked".white().bold(), tracked);
    println!("{}: {}", "Due Now".white().bold(), progress.due_count(now));

    if let Some(path) = vocab {
        let words = JsonContentSource::new(path).list_vocabulary(topic)?;
        let unseen = words
            .iter()
            .filter(|w| !progress.word_state.contains_key(&w.id))
            .count();
        println!("{}: {}", "Never Studied".white().bold(), unseen);
    }

    println!(
        "{}: {}m {}s",
        "Study Time".white().bold(),
        progress.study_seconds / 60,
        progress.study_seconds % 60
    );
    if let Some(last) = progress.last_studied_at {
        println!("{}: {}", "Last Studied".white().bold(), last.format("%Y-%m-%d %H:%M:%S"));
    }

    println!();
    println!("{}", "=== Boxes ===".yellow().bold());
    print_boxes(&progress);

    println!();
    println!("{}", "=== Recent Quiz Scores ===".yellow().bold());
    if progress.quiz_scores.is_empty() {
        println!("{}", "No practice rounds yet.".dimmed());
    } else {
        for score in progress.quiz_scores.iter().rev().take(10) {
            let value = format!("{:>3}%", score.score);
            let value = match score.score {
                80.. => value.green(),
                50..=79 => value.yellow(),
                _ => value.red(),
            };
            println!("  {}  {}", score.recorded_at.format("%Y-%m-%d %H:%M"), value);
        }
    }

    Ok(())
}

/// Put one word back into box 0, due now
pub fn run_reset(store: &SqliteStore, user: &str, topic: &str, word: &str) -> anyhow::Result<()> {
    store.reset_word(user, topic, word, Utc::now())?;
    println!("{} {} is back in box 0 and due now", "Reset:".green().bold(), word);
    Ok(())
}

/// Width of a box bar in characters
const BAR_WIDTH: usize = 30;

fn print_boxes(progress: &TopicProgress) {
    let distribution = progress.box_distribution();
    let total: usize = distribution.iter().sum();
    for (level, &count) in distribution.iter().enumerate() {
        let label = format!("Box {} ({})", level, describe_interval(level as u8));
        let share = share_of(count, total);
        println!(
            "  {:15} [{}] {:>4} ({:>5.1}%)",
            label,
            box_bar(share, BAR_WIDTH).color(box_color(level)),
            count,
            share * 100.0
        );
    }
}

/// Words still far from mastery show hot, mastered ones cool
fn box_color(level: usize) -> Color {
    match level {
        0 => Color::Red,
        1 | 2 => Color::Yellow,
        3 | 4 => Color::Green,
        _ => Color::Magenta,
    }
}

fn share_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// `share` in 0..=1 as a fixed-width bar of `#` padded with `-`
fn box_bar(share: f64, width: usize) -> String {
    let filled = ((share.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

fn describe_interval(level: u8) -> String {
    let interval = interval_for(level);
    if interval.num_days() > 0 {
        format!("{}d", interval.num_days())
    } else if interval.num_minutes() > 0 {
        format!("{}m", interval.num_minutes())
    } else {
        "now".to_string()
    }
}

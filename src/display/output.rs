use crate::analysis::record::AnalysisRecord;
use crate::run::RunSummary;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct PlayerRow {
    metric: String,
    value: String,
}

#[derive(Tabled)]
struct TeamRow {
    signal: String,
    own: String,
    opposing: String,
}

fn opt_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

fn opt_num(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

fn opt_flag(value: Option<bool>) -> String {
    value.map(yes_no).unwrap_or_else(|| "n/a".to_string())
}

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}

fn player_row(metric: &str, value: String) -> PlayerRow {
    PlayerRow {
        metric: metric.to_string(),
        value,
    }
}

fn team_row(signal: &str, own: String, opposing: String) -> TeamRow {
    TeamRow {
        signal: signal.to_string(),
        own,
        opposing,
    }
}

pub fn display_record(record: &AnalysisRecord) {
    println!(
        "\n{}",
        format!("🎮 {} on {} ({})", record.player, record.champion, record.match_id)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    let result = if record.own_side_won {
        "WIN".green().to_string()
    } else {
        "LOSS".red().to_string()
    };

    let streak = match record.player_win_streak {
        Some(n) if n > 0 => format!("{}W", n).green().to_string(),
        Some(n) => format!("{}L", -n).red().to_string(),
        None => "n/a".to_string(),
    };

    let rows = vec![
        player_row("Result", result),
        player_row("Ranked win rate", opt_pct(record.player_ranked_win_rate)),
        player_row("Time spent dead", opt_pct(record.player_incapacitation_ratio)),
        player_row("One-trick", yes_no(record.player_one_trick)),
        player_row("Mostly off-mode", opt_flag(record.player_off_mode_heavy)),
        player_row("Current streak", streak),
        player_row("Games in window", record.player_filtered_matches.to_string()),
    ];

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    let rows = vec![
        team_row("Smurfs", record.smurf_count_own.to_string(), record.smurf_count_opposing.to_string()),
        team_row("Inters", record.inter_count_own.to_string(), record.inter_count_opposing.to_string()),
        team_row("Back from a break", record.break_count_own.to_string(), record.break_count_opposing.to_string()),
        team_row("Veterans", record.veteran_count_own.to_string(), record.veteran_count_opposing.to_string()),
        team_row("Hot streaks", record.hot_streak_count_own.to_string(), record.hot_streak_count_opposing.to_string()),
        team_row("Mostly off-mode", record.off_mode_count_own.to_string(), record.off_mode_count_opposing.to_string()),
        team_row("Ranked WR median", opt_pct(record.ranked_wr_median_own), opt_pct(record.ranked_wr_median_opposing)),
        team_row("Ranked WR min", opt_pct(record.ranked_wr_min_own), opt_pct(record.ranked_wr_min_opposing)),
        team_row("Ranked WR max", opt_pct(record.ranked_wr_max_own), opt_pct(record.ranked_wr_max_opposing)),
        team_row("Best median KDA", opt_num(record.highest_median_kda_own), opt_num(record.highest_median_kda_opposing)),
    ];

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("\n{}", table);

    if record.skipped_match_fetches > 0 {
        println!(
            "  {} {} match fetches were skipped; some windows are short",
            "⚠️".yellow(),
            record.skipped_match_fetches
        );
    }
    if record.short_window_profiles > 0 {
        println!(
            "  {} {} players had fewer games than the window asks for",
            "⚠️".yellow(),
            record.short_window_profiles
        );
    }
    if record.standing_unavailable_profiles > 0 {
        println!(
            "  {} ranked standing could not be fetched for {} players",
            "⚠️".yellow(),
            record.standing_unavailable_profiles
        );
    }

    println!();
}

pub fn display_summary(summary: &RunSummary) {
    println!("\n{}", "📋 RUN SUMMARY".bold().cyan());
    println!("{}", "=".repeat(60).cyan());
    println!(
        "Entered {} games, already saw {}, recorded {}.",
        summary.submitted,
        summary.already_seen,
        summary.recorded.to_string().green()
    );
    println!("Players not found: {}", summary.identity_not_found);
    println!("Matches not found: {}", summary.match_not_found);
    println!("Invalid rosters:   {}", summary.roster_invalid);
    println!("Other errors:      {}", summary.other_errors);
    println!("Players profiled:  {}", summary.players_cached);
    if summary.stopped_early {
        println!("{}", "Run was stopped before the list was finished".yellow());
    }
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

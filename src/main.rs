use anyhow::{anyhow, Context};
use liga_matchday::models::ids::MatchId;
use liga_matchday::models::match_info::Side;
use liga_matchday::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let match_id = match_id_from_args()?;
    tracing::info!("🔧 League API: {}", config.api_base_url);

    let state = AppState::new(config)?;
    print_attendance(&state, match_id).await;
    print_substitutions(&state, match_id).await;
    print_result(&state, match_id).await;

    Ok(())
}

// First argument, or MATCH_ID from the environment
fn match_id_from_args() -> anyhow::Result<MatchId> {
    let raw = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MATCH_ID").ok())
        .ok_or_else(|| anyhow!("Usage: matchday <id_partido> (or set MATCH_ID)"))?;
    let id: i64 = raw
        .parse()
        .with_context(|| format!("Invalid match id '{}'", raw))?;
    Ok(MatchId(id))
}

async fn print_attendance(state: &AppState, match_id: MatchId) {
    let mut attendance = state.attendance();
    let sheet = match attendance.load_roster(match_id).await {
        Ok(sheet) => sheet,
        Err(e) => {
            tracing::error!("❌ Attendance unavailable: {}", e);
            println!("Attendance: {}", e.user_message());
            return;
        }
    };

    let round = sheet
        .fixture()
        .round
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("Match {} (round {})", match_id, round);
    for side in [Side::Home, Side::Away] {
        let Some(team) = sheet.fixture().team_on(side) else {
            continue;
        };
        let Ok(roster) = sheet.roster(team) else {
            continue;
        };
        let counts = sheet.team_attendance(team).unwrap_or_default();
        println!(
            "  {}: {}/{} present, {} reinforcements",
            roster.name, counts.present, counts.roster_size, counts.reinforcements_present
        );
        for entry in &roster.players {
            let mark = if sheet.is_present(team, entry.player_id) { "x" } else { " " };
            let number = entry
                .shirt_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("    [{}] #{:>3} {}", mark, number, entry.name);
        }
    }
}

async fn print_substitutions(state: &AppState, match_id: MatchId) {
    let mut register = state.substitutions();
    match register.list(match_id).await {
        Ok(groups) => {
            for group in groups {
                println!("  Substitutions for {}: {}", group.team_name, group.substitutions.len());
                for sub in &group.substitutions {
                    let minute = sub
                        .minute
                        .map(|m| format!("{}'", m))
                        .unwrap_or_else(|| "?".to_string());
                    println!(
                        "    {} out {} / in {}",
                        minute, sub.outgoing, sub.incoming
                    );
                }
            }
        }
        Err(e) => {
            tracing::error!("❌ Substitutions unavailable: {}", e);
            println!("Substitutions: {}", e.user_message());
        }
    }
}

async fn print_result(state: &AppState, match_id: MatchId) {
    match state.result_recorder(match_id).await {
        Ok(recorder) => {
            let (home, away) = recorder.draft().displayed_score();
            let pending = if recorder.has_unsaved_changes() { ", unsaved edits" } else { "" };
            println!("  Result ({:?}{}): {} - {}", recorder.status(), pending, home, away);
        }
        Err(e) => {
            tracing::error!("❌ Result unavailable: {}", e);
            println!("Result: {}", e.user_message());
        }
    }
}

use crate::models::MatchRecord;
use anyhow::{Context, Result};
use serde::Serialize;

/// Save any response to a pretty-printed JSON file
pub fn save_to_json<T: Serialize + ?Sized>(data: &T, filename: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize odds data")?;
    std::fs::write(filename, json).context("Failed to write JSON file")?;
    Ok(())
}

#[derive(Serialize)]
struct MatchRow<'a> {
    #[serde(rename = "Match ID")]
    id: &'a str,
    #[serde(rename = "Home Team")]
    home_team: &'a str,
    #[serde(rename = "Away Team")]
    away_team: &'a str,
    #[serde(rename = "Kickoff")]
    kickoff: &'a str,
    #[serde(rename = "Home")]
    home: Option<f64>,
    #[serde(rename = "Draw")]
    draw: Option<f64>,
    #[serde(rename = "Away")]
    away: Option<f64>,
}

/// Write normalized matches as CSV; unknown prices become empty cells
pub fn write_matches_csv<W: std::io::Write>(matches: &[MatchRecord], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for m in matches {
        csv_writer
            .serialize(MatchRow {
                id: &m.id,
                home_team: &m.home_team,
                away_team: &m.away_team,
                kickoff: &m.kickoff,
                home: m.odds.home,
                draw: m.odds.draw,
                away: m.odds.away,
            })
            .context("Failed to write CSV row")?;
    }

    csv_writer.flush().context("Failed to flush CSV")?;
    Ok(())
}

/// Save matches to a CSV file
pub fn save_matches_to_csv(matches: &[MatchRecord], filename: &str) -> Result<()> {
    let file = std::fs::File::create(filename).context("Failed to create CSV file")?;
    write_matches_csv(matches, file)
}

//! CSV export of a ranking.

use std::io::Write;

use crate::optimizer::ranking::Tierlist;

const HEADER: [&str; 13] = [
    "group",
    "id",
    "name",
    "rarity",
    "limit_break",
    "score",
    "speed",
    "stamina",
    "power",
    "guts",
    "wit",
    "skill_points",
    "total_hints",
];

/// Writes one row per entry, groups in name order, best first within a group.
pub fn write_tierlist_csv<W: Write>(tierlist: &Tierlist, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for (group, entry) in tierlist.entries() {
        let stats = entry.stats;
        csv_writer.write_record([
            group.to_string(),
            entry.id.to_string(),
            entry.card_name.clone(),
            entry.card_rarity.to_string(),
            entry.limit_break.to_string(),
            format!("{:.3}", entry.score),
            format!("{:.2}", stats.speed),
            format!("{:.2}", stats.stamina),
            format!("{:.2}", stats.power),
            format!("{:.2}", stats.guts),
            format!("{:.2}", stats.wit),
            format!("{:.2}", stats.skill_points),
            format!("{:.2}", entry.hints.total_hints),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryAudio {
    /// History entry id (what removal endpoints expect)
    pub id: String,
    pub audio_id: String,
    pub title: String,
    pub date: String,
}

/// Listening history for one day
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct History {
    pub date: String,
    pub audios: Vec<HistoryAudio>,
}

/// Remove the given entry ids, dropping days that end up empty
pub fn without_entries(histories: &[History], entry_ids: &[String]) -> Vec<History> {
    histories
        .iter()
        .filter_map(|day| {
            let audios: Vec<HistoryAudio> = day
                .audios
                .iter()
                .filter(|a| !entry_ids.contains(&a.id))
                .cloned()
                .collect();
            if audios.is_empty() {
                None
            } else {
                Some(History {
                    date: day.date.clone(),
                    audios,
                })
            }
        })
        .collect()
}

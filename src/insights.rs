use crate::diary_entry::DiaryEntry;
use crate::moods::{self, MoodOption, MOOD_OPTIONS};
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Psychological,
    Physiological,
}

#[derive(Debug, PartialEq)]
pub struct MoodCount {
    pub mood: &'static MoodOption,
    pub count: usize,
}

#[derive(Debug, PartialEq)]
pub struct MoodDistribution {
    pub counts: Vec<MoodCount>,
    pub unrecognized: usize,
}

impl MoodDistribution {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum::<usize>() + self.unrecognized
    }
}

/// One count per catalog mood, in catalog order.
pub fn mood_distribution(entries: &[&DiaryEntry]) -> MoodDistribution {
    let mut counts: Vec<MoodCount> = MOOD_OPTIONS
        .iter()
        .map(|mood| MoodCount { mood, count: 0 })
        .collect();
    let mut unrecognized = 0;

    for entry in entries {
        match counts.iter_mut().find(|c| c.mood.value == entry.mood) {
            Some(slot) => slot.count += 1,
            None => unrecognized += 1,
        }
    }

    MoodDistribution {
        counts,
        unrecognized,
    }
}

/// Mean mood score (1 worst, 5 best) over entries with a known mood.
pub fn average_mood(entries: &[&DiaryEntry]) -> Option<f64> {
    let scores: Vec<u8> = entries
        .iter()
        .filter_map(|entry| moods::find(&entry.mood))
        .map(MoodOption::score)
        .collect();

    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64)
}

/// Most frequent tags, ties broken alphabetically.
pub fn top_tags(entries: &[&DiaryEntry], field: TagField, limit: usize) -> Vec<(String, usize)> {
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        let tags = match field {
            TagField::Psychological => &entry.psychological,
            TagField::Physiological => &entry.physiological,
        };
        for tag in tags {
            let tag = tag.trim();
            if !tag.is_empty() {
                *frequency.entry(tag).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<(String, usize)> = frequency
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

pub fn latest_entry_at(entries: &[&DiaryEntry]) -> Option<DateTime<FixedOffset>> {
    entries.iter().filter_map(|entry| entry.timestamp()).max()
}

use ratatui::style::Color;

/// Display metadata for one mood level.
#[derive(Debug, PartialEq, Eq)]
pub struct MoodOption {
    pub value: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub background: &'static str,
    pub color: &'static str,
}

/// Mood levels ordered from worst to best.
pub static MOOD_OPTIONS: [MoodOption; 5] = [
    MoodOption {
        value: "awful",
        label: "Awful",
        icon: "😭",
        background: "#E8EDFF",
        color: "#4F46E5",
    },
    MoodOption {
        value: "bad",
        label: "Bad",
        icon: "😢",
        background: "#FFE9EC",
        color: "#EF4444",
    },
    MoodOption {
        value: "neutral",
        label: "Neutral",
        icon: "😐",
        background: "#EFF1F5",
        color: "#6B7280",
    },
    MoodOption {
        value: "good",
        label: "Good",
        icon: "🙂",
        background: "#E7F8F1",
        color: "#0EA5E9",
    },
    MoodOption {
        value: "great",
        label: "Great",
        icon: "😁",
        background: "#FFF4D6",
        color: "#F59E0B",
    },
];

const NEUTRAL: usize = 2;

pub const DEFAULT_MOOD: &str = "neutral";

/// Returns the descriptor for `value`, falling back to neutral.
pub fn lookup(value: &str) -> &'static MoodOption {
    MOOD_OPTIONS
        .iter()
        .find(|option| option.value == value)
        .unwrap_or(&MOOD_OPTIONS[NEUTRAL])
}

/// Returns the descriptor only if `value` is a known mood.
pub fn find(value: &str) -> Option<&'static MoodOption> {
    MOOD_OPTIONS.iter().find(|option| option.value == value)
}

impl MoodOption {
    /// 1 for the worst mood up to 5 for the best.
    pub fn score(&self) -> u8 {
        MOOD_OPTIONS
            .iter()
            .position(|option| option.value == self.value)
            .map_or(NEUTRAL as u8 + 1, |index| index as u8 + 1)
    }

    pub fn accent(&self) -> Color {
        hex_to_color(self.color)
    }

    pub fn background_color(&self) -> Color {
        hex_to_color(self.background)
    }
}

fn hex_to_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    match u32::from_str_radix(digits, 16) {
        Ok(rgb) if digits.len() == 6 => Color::from_u32(rgb),
        _ => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mood_falls_back_to_neutral() {
        assert_eq!(lookup("unknown").value, "neutral");
        assert_eq!(lookup("").value, "neutral");
        assert!(find("unknown").is_none());
    }

    #[test]
    fn known_moods_resolve() {
        assert_eq!(lookup("great").label, "Great");
        assert_eq!(lookup("awful").icon, "😭");
    }

    #[test]
    fn scores_follow_severity_order() {
        let scores: Vec<u8> = MOOD_OPTIONS.iter().map(MoodOption::score).collect();
        assert_eq!(scores, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn accent_colours_parse() {
        assert_eq!(lookup("bad").accent(), Color::Rgb(0xEF, 0x44, 0x44));
        assert_eq!(hex_to_color("oops"), Color::Reset);
    }
}

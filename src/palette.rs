use image::Rgb;

/// The eight display colors cycled over the phrase list.
///
/// The order matters: a phrase at index `i` gets `PALETTE[i % 8]`, and the
/// same phrase keeps its color for the whole run.
pub const PALETTE: [Color; 8] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Orange,
    Color::Purple,
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    Red,
    Green,
    Blue,
    Orange,
    Purple,
    Cyan,
    Magenta,
    Yellow,
}

impl Color {
    /// Color used when a detection's class index cannot be resolved to a
    /// phrase, and when no per-detection color is supplied at all.
    pub const FALLBACK: Color = Color::Red;

    pub fn from_index(index: usize) -> Color {
        PALETTE[index % PALETTE.len()]
    }

    pub fn rgb(&self) -> Rgb<u8> {
        match self {
            Color::Red => Rgb([255, 0, 0]),
            Color::Green => Rgb([0, 128, 0]),
            Color::Blue => Rgb([0, 0, 255]),
            Color::Orange => Rgb([255, 165, 0]),
            Color::Purple => Rgb([128, 0, 128]),
            Color::Cyan => Rgb([0, 255, 255]),
            Color::Magenta => Rgb([255, 0, 255]),
            Color::Yellow => Rgb([255, 255, 0]),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Orange => "orange",
            Color::Purple => "purple",
            Color::Cyan => "cyan",
            Color::Magenta => "magenta",
            Color::Yellow => "yellow",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_past_palette_length() {
        assert_eq!(Color::from_index(0), Color::Red);
        assert_eq!(Color::from_index(7), Color::Yellow);
        assert_eq!(Color::from_index(8), Color::Red);
        assert_eq!(Color::from_index(13), Color::Cyan);
    }

    #[test]
    fn fallback_is_first_palette_entry() {
        assert_eq!(Color::FALLBACK, PALETTE[0]);
    }
}

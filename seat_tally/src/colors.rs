//! Display colors for parties.
//!
//! A color is resolved by walking an ordered list of [`ColorStrategy`]
//! values. The default order is: the known color of the party, then a color
//! that was already assigned (for example by the party-list row), then a
//! palette color picked by position.

use std::collections::HashMap;

use log::debug;

use crate::config::{TallyErrors, TallyRules};

pub const PALETTE: [&str; 10] = [
    "#f38b00", "#d92d27", "#1aa260", "#2f6fed", "#2e7be5", "#8b5cf6", "#0ea5e9", "#f97316",
    "#22c55e", "#64748b",
];

/// Used when no strategy yields a color.
pub const FALLBACK_COLOR: &str = "#64748b";

/// Colors taken from the official party logos.
pub const KNOWN_PARTY_COLORS: [(&str, &str); 60] = [
    ("ไทยทรัพย์ทวี", "#D91C24"),
    ("เพื่อชาติไทย", "#C9A227"),
    ("ใหม่", "#0B2A5B"),
    ("มิติใหม่", "#2E7D7A"),
    ("รวมใจไทย", "#D32F2F"),
    ("รวมไทยสร้างชาติ", "#1B2A8A"),
    ("พลวัต", "#2DBE60"),
    ("ประชาธิปไตยใหม่", "#F26C1A"),
    ("เพื่อไทย", "#E30613"),
    ("ทางเลือกใหม่", "#1E66D0"),
    ("เศรษฐกิจ", "#D1A000"),
    ("เสรีรวมไทย", "#D6B11E"),
    ("รวมพลังประชาชน", "#F28C28"),
    ("ท้องที่ไทย", "#2E8B57"),
    ("อนาคตไทย", "#D9282A"),
    ("พลังเพื่อไทย", "#E21D24"),
    ("ไทยชนะ", "#1D3C8F"),
    ("พลังสังคมใหม่", "#8B1E2D"),
    ("สังคมประชาธิปไตยไทย", "#1E57A5"),
    ("ฟิวชัน", "#1B7F3A"),
    ("ไทรวมพลัง", "#A000B5"),
    ("ก้าวอิสระ", "#6B4EFF"),
    ("ปวงชนไทย", "#E53935"),
    ("วิชชั่นใหม่", "#1D4ED8"),
    ("เพื่อชีวิตใหม่", "#D4AF37"),
    ("คลองไทย", "#005BBB"),
    ("ประชาธิปัตย์", "#1E88E5"),
    ("ไทยก้าวหน้า", "#1E3A8A"),
    ("ไทยภักดี", "#2E7D32"),
    ("แรงงานสร้างชาติ", "#6A1B9A"),
    ("ประชากรไทย", "#1E4FA1"),
    ("ครูไทยเพื่อประชาชน", "#F57C00"),
    ("ประชาชาติ", "#C6A200"),
    ("สร้างอนาคตไทย", "#1E4FA1"),
    ("รักชาติ", "#006B3C"),
    ("ไทยพร้อม", "#1E4FA1"),
    ("ภูมิใจไทย", "#312682"),
    ("พลังธรรมใหม่", "#1E3A8A"),
    ("กรีน", "#2E8B57"),
    ("ไทยธรรม", "#5B2B90"),
    ("แผ่นดินธรรม", "#6D4C41"),
    ("กล้าธรรม", "#90EE90"),
    ("พลังประชารัฐ", "#0B6B3A"),
    ("โอกาสใหม่", "#FF69B4"),
    ("เป็นธรรม", "#1E57A5"),
    ("ประชาชน", "#F57A36"),
    ("ประชาไทย", "#1E57A5"),
    ("ไทยสร้างไทย", "#6F42C1"),
    ("ไทยก้าวใหม่", "#D4E000"),
    ("ประชาอาสาชาติ", "#E53935"),
    ("พร้อม", "#E11D2E"),
    ("เครือข่ายชาวนาแห่งประเทศไทย", "#0B4FA3"),
    ("ไทยพิทักษ์ธรรม", "#1E3A8A"),
    ("ความหวังใหม่", "#F2C300"),
    ("ไทยรวมไทย", "#1E4FA1"),
    ("เพื่อบ้านเมือง", "#F5D000"),
    ("พลังไทยรักชาติ", "#00A0B0"),
    ("ก้าวไกล", "#F97316"),
    ("ชาติไทยพัฒนา", "#4CAF50"),
    ("ชาติพัฒนากล้า", "#8BC34A"),
];

/// One way of finding a color for a party.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColorStrategy {
    /// The color registered for the party name.
    KnownParty,
    /// A color that was already attached to the party.
    Assigned,
    /// A palette color chosen by the position of the party, modulo the palette size.
    Palette,
}

pub const DEFAULT_STRATEGIES: [ColorStrategy; 3] = [
    ColorStrategy::KnownParty,
    ColorStrategy::Assigned,
    ColorStrategy::Palette,
];

#[derive(Debug, Clone)]
pub struct ColorResolver {
    strategies: Vec<ColorStrategy>,
    known: HashMap<String, String>,
    palette: Vec<String>,
}

impl ColorResolver {
    pub fn new(rules: &TallyRules) -> Result<ColorResolver, TallyErrors> {
        ColorResolver::with_strategies(rules, &DEFAULT_STRATEGIES)
    }

    pub fn with_strategies(
        rules: &TallyRules,
        strategies: &[ColorStrategy],
    ) -> Result<ColorResolver, TallyErrors> {
        if rules.palette.is_empty() {
            return Err(TallyErrors::EmptyPalette);
        }
        let mut known: HashMap<String, String> = KNOWN_PARTY_COLORS
            .iter()
            .map(|(name, color)| (name.to_string(), color.to_string()))
            .collect();
        // Configured colors override the built-in table.
        for (name, color) in rules.party_colors.iter() {
            known.insert(name.clone(), color.clone());
        }
        Ok(ColorResolver {
            strategies: strategies.to_vec(),
            known,
            palette: rules.palette.clone(),
        })
    }

    pub fn known_color(&self, party: &str) -> Option<&str> {
        self.known.get(party).map(|s| s.as_str())
    }

    pub fn palette_color(&self, index: usize) -> &str {
        self.palette[index % self.palette.len()].as_str()
    }

    /// Walks the strategies in order and returns the first color found.
    pub fn resolve(&self, party: &str, assigned: Option<&str>, index: usize) -> String {
        for strategy in self.strategies.iter() {
            let found = match strategy {
                ColorStrategy::KnownParty => self.known_color(party),
                ColorStrategy::Assigned => assigned,
                ColorStrategy::Palette => Some(self.palette_color(index)),
            };
            // Empty strings do not count as a color.
            if let Some(c) = found.filter(|c| !c.is_empty()) {
                return c.to_string();
            }
        }
        debug!("resolve: no color for party {:?}, using fallback", party);
        FALLBACK_COLOR.to_string()
    }
}

impl Default for ColorResolver {
    fn default() -> ColorResolver {
        // The default rules always carry the built-in palette.
        ColorResolver {
            strategies: DEFAULT_STRATEGIES.to_vec(),
            known: KNOWN_PARTY_COLORS
                .iter()
                .map(|(name, color)| (name.to_string(), color.to_string()))
                .collect(),
            palette: PALETTE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_party_wins_over_assigned() {
        let r = ColorResolver::default();
        assert_eq!(r.resolve("เพื่อไทย", Some("#000000"), 3), "#E30613");
    }

    #[test]
    fn assigned_wins_over_palette() {
        let r = ColorResolver::default();
        assert_eq!(r.resolve("Unknown", Some("#123456"), 0), "#123456");
    }

    #[test]
    fn palette_wraps_around() {
        let r = ColorResolver::default();
        assert_eq!(r.resolve("Unknown", None, 0), PALETTE[0]);
        assert_eq!(r.resolve("Unknown", Some(""), 12), PALETTE[2]);
    }

    #[test]
    fn configured_colors_override_table() {
        let rules = TallyRules {
            party_colors: vec![("เพื่อไทย".to_string(), "#ABCDEF".to_string())],
            ..TallyRules::default()
        };
        let r = ColorResolver::new(&rules).unwrap();
        assert_eq!(r.resolve("เพื่อไทย", None, 0), "#ABCDEF");
    }

    #[test]
    fn custom_order() {
        let r = ColorResolver::with_strategies(
            &TallyRules::default(),
            &[ColorStrategy::Assigned, ColorStrategy::KnownParty],
        )
        .unwrap();
        assert_eq!(r.resolve("เพื่อไทย", Some("#000000"), 0), "#000000");
        assert_eq!(r.resolve("Unknown", None, 0), FALLBACK_COLOR);
    }

    #[test]
    fn empty_palette_is_rejected() {
        let rules = TallyRules {
            palette: vec![],
            ..TallyRules::default()
        };
        assert_eq!(
            ColorResolver::new(&rules).unwrap_err(),
            TallyErrors::EmptyPalette
        );
    }
}

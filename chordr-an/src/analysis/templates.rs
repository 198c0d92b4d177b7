//! Chord template bank
//!
//! 24 fixed 12-dimensional binary masks, one per (root pitch class ×
//! major/minor), generated once at engine construction and immutable
//! thereafter.

/// Pitch class names, C-rooted chromatic scale
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Chord quality of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordQuality {
    Major,
    Minor,
}

/// One chord template: root pitch class, quality, and binary chroma mask
#[derive(Debug, Clone)]
pub struct ChordTemplate {
    pub root: usize,
    pub quality: ChordQuality,
    pub mask: [f64; 12],
}

impl ChordTemplate {
    /// Chord label: root note name, with an `m` suffix for minor
    pub fn label(&self) -> String {
        match self.quality {
            ChordQuality::Major => NOTE_NAMES[self.root].to_string(),
            ChordQuality::Minor => format!("{}m", NOTE_NAMES[self.root]),
        }
    }
}

/// The fixed bank of 24 chord templates
pub struct TemplateBank {
    templates: Vec<ChordTemplate>,
}

impl TemplateBank {
    /// Build the bank: major mask sets root, root+4, root+7 (mod 12);
    /// minor sets root, root+3, root+7.
    pub fn new() -> Self {
        const MAJOR_INTERVALS: [usize; 3] = [0, 4, 7];
        const MINOR_INTERVALS: [usize; 3] = [0, 3, 7];

        let mut templates = Vec::with_capacity(24);
        for root in 0..12 {
            templates.push(Self::build(root, ChordQuality::Major, &MAJOR_INTERVALS));
            templates.push(Self::build(root, ChordQuality::Minor, &MINOR_INTERVALS));
        }
        Self { templates }
    }

    fn build(root: usize, quality: ChordQuality, intervals: &[usize]) -> ChordTemplate {
        let mut mask = [0.0_f64; 12];
        for &interval in intervals {
            mask[(root + interval) % 12] = 1.0;
        }
        ChordTemplate {
            root,
            quality,
            mask,
        }
    }

    pub fn templates(&self) -> &[ChordTemplate] {
        &self.templates
    }
}

impl Default for TemplateBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_has_24_templates() {
        assert_eq!(TemplateBank::new().templates().len(), 24);
    }

    #[test]
    fn c_major_mask() {
        let bank = TemplateBank::new();
        let c_major = bank
            .templates()
            .iter()
            .find(|t| t.root == 0 && t.quality == ChordQuality::Major)
            .unwrap();
        // C, E, G
        for (i, &v) in c_major.mask.iter().enumerate() {
            let expected = if i == 0 || i == 4 || i == 7 { 1.0 } else { 0.0 };
            assert_eq!(v, expected, "bin {}", i);
        }
        assert_eq!(c_major.label(), "C");
    }

    #[test]
    fn a_minor_mask() {
        let bank = TemplateBank::new();
        let a_minor = bank
            .templates()
            .iter()
            .find(|t| t.root == 9 && t.quality == ChordQuality::Minor)
            .unwrap();
        // A, C, E
        for (i, &v) in a_minor.mask.iter().enumerate() {
            let expected = if i == 9 || i == 0 || i == 4 { 1.0 } else { 0.0 };
            assert_eq!(v, expected, "bin {}", i);
        }
        assert_eq!(a_minor.label(), "Am");
    }

    #[test]
    fn every_mask_has_three_set_bits() {
        for template in TemplateBank::new().templates() {
            let set: f64 = template.mask.iter().sum();
            assert_eq!(set, 3.0, "{}", template.label());
        }
    }
}

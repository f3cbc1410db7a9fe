use mindverse_store::WisdomText;
use sha2::{Digest, Sha256};

const DEFAULT_SPEAKER: &str = "the teacher";
const DEFAULT_AUDIENCE: &str = "those who listen";

/// Chooses among an emotion's template variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemplateSelector {
    /// Hash of the problem text: the same text always gets the same variant.
    #[default]
    Stable,
    /// Always variant `n` (modulo the number of variants).
    Fixed(usize),
}

impl TemplateSelector {
    pub fn pick(self, seed: &str, variants: usize) -> usize {
        if variants == 0 {
            return 0;
        }
        match self {
            Self::Stable => (stable_hash(seed.as_bytes()) % variants as u64) as usize,
            Self::Fixed(n) => n % variants,
        }
    }
}

/// First 8 bytes of SHA-256; stable across processes and platforms.
pub fn stable_hash(bytes: &[u8]) -> u64 {
    let digest = Sha256::digest(bytes);
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Values interpolated into a message template.
struct Slots<'a> {
    english: &'a str,
    attribution: String,
    speaker: &'a str,
    audience: &'a str,
    source: &'a str,
}

impl<'a> Slots<'a> {
    fn from_text(text: &'a WisdomText) -> Self {
        Self {
            english: &text.translations.english,
            attribution: text.contextual_attribution(),
            speaker: text
                .speaker
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SPEAKER),
            audience: text
                .audience
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_AUDIENCE),
            source: &text.source_display_name,
        }
    }
}

fn variants(emotion: &str, s: &Slots<'_>) -> Vec<String> {
    let Slots {
        english,
        attribution,
        speaker,
        audience,
        source,
    } = s;
    match emotion {
        "anxious" => vec![
            format!("The ancient wisdom reminds us: \"{english}\" This profound teaching from {attribution} speaks directly to your current feelings of anxiety. Just as {speaker} guided {audience}, you too can find peace by understanding that your current worries are temporary and manageable."),
            format!("In times of anxiety, the wisdom of {source} offers us comfort: \"{english}\" This teaching, shared by {speaker}, reminds us that our anxious thoughts need not define us or our future."),
        ],
        "sad" => vec![
            format!("During moments of sadness, we can find solace in these words: \"{english}\" This wisdom from {source}, spoken by {speaker}, reminds us that even in our darkest moments, there is light and hope to be found."),
            format!("The profound teaching \"{english}\" from {attribution} speaks to the universal experience of sorrow and offers a path toward healing and renewal."),
        ],
        "angry" => vec![
            format!("When anger fills our hearts, ancient wisdom guides us: \"{english}\" These words from {speaker} in {source} teach us that anger, while natural, need not control our actions or poison our peace."),
            format!("The teaching \"{english}\" from {attribution} offers us a way to transform our anger into understanding and our frustration into wisdom."),
        ],
        "confused" => vec![
            format!("In times of confusion, clarity comes through wisdom: \"{english}\" This guidance from {speaker} in {source} illuminates the path forward when we feel lost or uncertain."),
            format!("The ancient teaching \"{english}\" from {attribution} reminds us that confusion is often the beginning of deeper understanding."),
        ],
        _ => vec![format!("The timeless wisdom \"{english}\" from {attribution} offers guidance for your current situation. This teaching reminds us that challenges are opportunities for growth and that inner strength can be found even in difficult times.")],
    }
}

/// Render the opening message for `emotion` around `text`.
pub fn contextual_message(
    text: &WisdomText,
    emotion: &str,
    selector: TemplateSelector,
    seed: &str,
) -> String {
    let slots = Slots::from_text(text);
    let mut options = variants(emotion, &slots);
    let index = selector.pick(seed, options.len());
    options.swap_remove(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindverse_store::{ScriptLanguage, Tradition, WisdomSource};
    use pretty_assertions::assert_eq;

    fn torah() -> WisdomText {
        let mut text = WisdomText::new(
            WisdomSource::Torah,
            Tradition::Judaism,
            ScriptLanguage::Hebrew,
            "חִזְקוּ וְאִמְצוּ",
            "Be strong and courageous.",
        );
        text.speaker = Some("Moses".into());
        text.audience = Some("Israelites".into());
        text
    }

    #[test]
    fn stable_selector_is_deterministic() {
        let a = TemplateSelector::Stable.pick("my boss yells at me", 2);
        let b = TemplateSelector::Stable.pick("my boss yells at me", 2);
        assert_eq!(a, b);
        assert!(a < 2);
        assert_eq!(TemplateSelector::Stable.pick("anything", 1), 0);
        assert_eq!(TemplateSelector::Fixed(3).pick("anything", 2), 1);
    }

    #[test]
    fn anxious_variants_interpolate_speaker_and_audience() {
        let first = contextual_message(&torah(), "anxious", TemplateSelector::Fixed(0), "x");
        assert!(first.starts_with("The ancient wisdom reminds us: \"Be strong and courageous.\""));
        assert!(first.contains("from Moses to Israelites"));
        assert!(first.contains("Just as Moses guided Israelites"));

        let second = contextual_message(&torah(), "anxious", TemplateSelector::Fixed(1), "x");
        assert!(second.starts_with("In times of anxiety, the wisdom of Torah"));
    }

    #[test]
    fn other_emotions_use_default_template() {
        let msg = contextual_message(&torah(), "lonely", TemplateSelector::Fixed(1), "x");
        assert!(msg.starts_with("The timeless wisdom \"Be strong and courageous.\" from Moses to Israelites"));
    }

    #[test]
    fn missing_speaker_renders_placeholder() {
        let mut text = torah();
        text.speaker = None;
        text.audience = None;
        let msg = contextual_message(&text, "sad", TemplateSelector::Fixed(0), "x");
        assert!(msg.contains("spoken by the teacher"));
        let msg = contextual_message(&text, "anxious", TemplateSelector::Fixed(0), "x");
        assert!(msg.contains("Just as the teacher guided those who listen"));
    }
}

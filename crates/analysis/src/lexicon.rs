use crate::text::preprocess;
use regex::Regex;

/// Ordered label -> keyword table.
///
/// Order matters: ties in match score keep the lexicon order, so the first
/// entry wins when two labels score the same.
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

pub struct LexiconEntry {
    pub label: &'static str,
    pub keywords: Vec<Keyword>,
}

pub struct Keyword {
    /// Normalized form (same pipeline as user text, so `self-doubt` becomes `self doubt`).
    pub text: String,
    pattern: Regex,
}

impl Keyword {
    fn new(raw: &str) -> Self {
        let text = preprocess(raw);
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&text)))
            .expect("escaped keyword is a valid regex");
        Self { text, pattern }
    }

    pub fn count_in(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }

    pub fn matches_in(&self, text: &str) -> Vec<String> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }
}

impl Lexicon {
    pub fn from_table(table: &[(&'static str, &[&str])]) -> Self {
        let entries = table
            .iter()
            .map(|(label, words)| LexiconEntry {
                label: *label,
                keywords: words.iter().map(|w| Keyword::new(w)).collect(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn emotions() -> Self {
        Self::from_table(EMOTIONS)
    }

    pub fn problem_categories() -> Self {
        Self::from_table(PROBLEM_CATEGORIES)
    }

    pub fn themes() -> Self {
        Self::from_table(THEMES)
    }
}

pub const EMOTIONS: &[(&str, &[&str])] = &[
    (
        "anxious",
        &[
            "anxious", "worried", "nervous", "stressed", "tense", "uneasy", "restless", "panic",
            "fear", "scared",
        ],
    ),
    (
        "sad",
        &[
            "sad",
            "depressed",
            "down",
            "blue",
            "melancholy",
            "gloomy",
            "dejected",
            "despondent",
            "heartbroken",
            "grief",
        ],
    ),
    (
        "angry",
        &[
            "angry",
            "mad",
            "furious",
            "irritated",
            "annoyed",
            "frustrated",
            "rage",
            "resentful",
            "bitter",
            "hostile",
        ],
    ),
    (
        "confused",
        &[
            "confused",
            "lost",
            "uncertain",
            "doubtful",
            "perplexed",
            "bewildered",
            "puzzled",
            "unclear",
            "mixed up",
        ],
    ),
    (
        "overwhelmed",
        &[
            "overwhelmed",
            "swamped",
            "buried",
            "drowning",
            "too much",
            "overloaded",
            "stressed out",
            "exhausted",
        ],
    ),
    (
        "lonely",
        &[
            "lonely",
            "alone",
            "isolated",
            "abandoned",
            "rejected",
            "left out",
            "solitary",
            "friendless",
        ],
    ),
    (
        "hopeless",
        &[
            "hopeless",
            "desperate",
            "helpless",
            "powerless",
            "defeated",
            "lost cause",
            "no way out",
            "giving up",
        ],
    ),
    (
        "guilty",
        &[
            "guilty",
            "ashamed",
            "regretful",
            "sorry",
            "remorseful",
            "fault",
            "blame",
            "wrong",
        ],
    ),
    (
        "fearful",
        &[
            "afraid",
            "scared",
            "terrified",
            "frightened",
            "petrified",
            "alarmed",
            "worried",
            "anxious",
        ],
    ),
    (
        "insecure",
        &[
            "insecure",
            "self-doubt",
            "uncertain",
            "inadequate",
            "unworthy",
            "not good enough",
            "inferior",
        ],
    ),
];

pub const PROBLEM_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "relationship_issues",
        &[
            "relationship",
            "partner",
            "boyfriend",
            "girlfriend",
            "spouse",
            "marriage",
            "love",
            "breakup",
            "divorce",
        ],
    ),
    (
        "family_conflicts",
        &[
            "family", "parents", "mother", "father", "siblings", "brother", "sister", "children",
            "kids",
        ],
    ),
    (
        "work_stress",
        &[
            "work",
            "job",
            "career",
            "boss",
            "colleague",
            "office",
            "workplace",
            "employment",
            "salary",
        ],
    ),
    (
        "financial_problems",
        &[
            "money",
            "financial",
            "debt",
            "bills",
            "income",
            "salary",
            "expenses",
            "budget",
            "poor",
            "broke",
        ],
    ),
    (
        "health_concerns",
        &[
            "health", "sick", "illness", "disease", "pain", "medical", "doctor", "hospital",
            "medicine",
        ],
    ),
    (
        "academic_pressure",
        &[
            "school",
            "college",
            "university",
            "studies",
            "exam",
            "grades",
            "homework",
            "assignment",
            "student",
        ],
    ),
    (
        "social_anxiety",
        &[
            "social",
            "people",
            "public",
            "speaking",
            "crowd",
            "friends",
            "party",
            "meeting",
            "presentation",
        ],
    ),
    (
        "self_doubt",
        &[
            "confidence",
            "self-esteem",
            "worth",
            "value",
            "ability",
            "skill",
            "talent",
            "good enough",
            "failure",
        ],
    ),
];

pub const THEMES: &[(&str, &[&str])] = &[
    (
        "courage",
        &["courage", "brave", "strength", "bold", "fearless", "confident"],
    ),
    (
        "patience",
        &["patience", "wait", "endure", "persevere", "time", "slow"],
    ),
    (
        "forgiveness",
        &["forgive", "mercy", "compassion", "understanding", "let go"],
    ),
    (
        "wisdom",
        &["wisdom", "knowledge", "understanding", "insight", "truth", "learn"],
    ),
    (
        "peace",
        &["peace", "calm", "tranquil", "serenity", "quiet", "stillness"],
    ),
    (
        "love",
        &["love", "affection", "care", "kindness", "heart", "compassion"],
    ),
    (
        "faith",
        &["faith", "belief", "trust", "hope", "divine", "god", "spiritual"],
    ),
    (
        "detachment",
        &["detachment", "letting go", "release", "surrender", "accept"],
    ),
];

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fitness,
    Study,
    Health,
    Work,
    Mindfulness,
    Social,
    Creative,
    Personal,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Fitness,
        Category::Study,
        Category::Health,
        Category::Work,
        Category::Mindfulness,
        Category::Social,
        Category::Creative,
        Category::Personal,
    ];

    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "fitness" => Some(Self::Fitness),
            "study" => Some(Self::Study),
            "health" => Some(Self::Health),
            "work" => Some(Self::Work),
            "mindfulness" => Some(Self::Mindfulness),
            "social" => Some(Self::Social),
            "creative" => Some(Self::Creative),
            "personal" => Some(Self::Personal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fitness => "fitness",
            Self::Study => "study",
            Self::Health => "health",
            Self::Work => "work",
            Self::Mindfulness => "mindfulness",
            Self::Social => "social",
            Self::Creative => "creative",
            Self::Personal => "personal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Zinc,
    Red,
    Orange,
    Amber,
    Emerald,
    Teal,
    Sky,
    Blue,
    Violet,
    Pink,
}

impl Color {
    pub const ALL: [Color; 10] = [
        Color::Zinc,
        Color::Red,
        Color::Orange,
        Color::Amber,
        Color::Emerald,
        Color::Teal,
        Color::Sky,
        Color::Blue,
        Color::Violet,
        Color::Pink,
    ];

    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "zinc" => Some(Self::Zinc),
            "red" => Some(Self::Red),
            "orange" => Some(Self::Orange),
            "amber" => Some(Self::Amber),
            "emerald" => Some(Self::Emerald),
            "teal" => Some(Self::Teal),
            "sky" => Some(Self::Sky),
            "blue" => Some(Self::Blue),
            "violet" => Some(Self::Violet),
            "pink" => Some(Self::Pink),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zinc => "zinc",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Amber => "amber",
            Self::Emerald => "emerald",
            Self::Teal => "teal",
            Self::Sky => "sky",
            Self::Blue => "blue",
            Self::Violet => "violet",
            Self::Pink => "pink",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    Time,
    Count,
    Boolean,
    Number,
}

impl HabitKind {
    pub const ALL: [HabitKind; 4] = [
        HabitKind::Time,
        HabitKind::Count,
        HabitKind::Boolean,
        HabitKind::Number,
    ];

    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "time" => Some(Self::Time),
            "count" => Some(Self::Count),
            "boolean" => Some(Self::Boolean),
            "number" => Some(Self::Number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Count => "count",
            Self::Boolean => "boolean",
            Self::Number => "number",
        }
    }
}

pub fn normalize_category(raw: Option<&str>, fallback: Category) -> Category {
    raw.and_then(Category::from_raw).unwrap_or(fallback)
}

pub fn normalize_color(raw: Option<&str>) -> Color {
    raw.and_then(Color::from_raw).unwrap_or(Color::Zinc)
}

pub fn normalize_kind(raw: Option<&str>) -> HabitKind {
    raw.and_then(HabitKind::from_raw).unwrap_or(HabitKind::Number)
}

pub fn normalize_unit(raw: Option<&str>) -> String {
    let trimmed = raw.unwrap_or_default().trim();
    if trimmed.is_empty() {
        "u".to_string()
    } else {
        trimmed.to_string()
    }
}

struct KeywordRule {
    category: Category,
    emoji: &'static str,
    terms: &'static [&'static str],
}

// Scanned top to bottom, first matching rule wins. Terms cover English and
// Spanish habit names.
const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        category: Category::Fitness,
        emoji: "💪",
        terms: &[
            "gym", "run", "workout", "train", "walk", "bike", "swim", "yoga", "sport", "correr",
            "entrenar", "caminar", "pesas", "nadar",
        ],
    },
    KeywordRule {
        category: Category::Study,
        emoji: "📚",
        terms: &[
            "read", "study", "learn", "course", "book", "code", "practice", "leer", "estudiar",
            "curso", "idioma", "repasar",
        ],
    },
    KeywordRule {
        category: Category::Health,
        emoji: "🍎",
        terms: &[
            "water", "sleep", "meditat", "vitamin", "stretch", "agua", "dormir", "meditar",
            "fruta", "estirar",
        ],
    },
    KeywordRule {
        category: Category::Personal,
        emoji: "🏠",
        terms: &[
            "journal", "clean", "family", "call", "plan", "diario", "familia", "ordenar",
            "llamar",
        ],
    },
];

fn matching_rule(habit_name: &str) -> Option<&'static KeywordRule> {
    let normalized = habit_name.trim().to_lowercase();

    KEYWORD_RULES
        .iter()
        .find(|rule| rule.terms.iter().any(|term| normalized.contains(term)))
}

pub fn guess_category(habit_name: &str) -> Category {
    matching_rule(habit_name)
        .map(|rule| rule.category)
        .unwrap_or(Category::Personal)
}

pub fn guess_emoji(habit_name: &str) -> &'static str {
    matching_rule(habit_name)
        .map(|rule| rule.emoji)
        .unwrap_or("✨")
}

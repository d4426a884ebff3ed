use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionCategory {
    Structure,
    Tone,
    Register,
    Detail,
    SentenceVariety,
    Uncertainty,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub category: Option<SuggestionCategory>,
    /// Short bold lead-in, present on categorized advice.
    pub title: Option<&'static str>,
    pub text: &'static str,
}

/// Fixed advice attached to a tier.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceBundle {
    pub label: &'static str,
    pub detail: &'static str,
    pub headline: &'static str,
    pub summary: &'static str,
    pub suggestions_heading: &'static str,
    pub suggestions: &'static [Suggestion],
}

const fn plain(text: &'static str) -> Suggestion {
    Suggestion {
        category: None,
        title: None,
        text,
    }
}

const fn tagged(category: SuggestionCategory, title: &'static str, text: &'static str) -> Suggestion {
    Suggestion {
        category: Some(category),
        title: Some(title),
        text,
    }
}

pub const LOW: GuidanceBundle = GuidanceBundle {
    label: "Low likelihood of AI generation",
    detail: "The text shows strong signs of human authorship; AI generation is unlikely.",
    headline: "Detection result looks good",
    summary: "Your text reads as human-written and is very likely to pass most AI detectors.",
    suggestions_heading: "Suggestions",
    suggestions: &[
        plain("Keep your current writing style and way of expressing ideas"),
        plain("AI tools are fine for grammar checks and light polishing"),
        plain("Keep your personal voice and the originality of your viewpoints"),
    ],
};

pub const MEDIUM: GuidanceBundle = GuidanceBundle {
    label: "Moderate likelihood of AI generation",
    detail: "Some AI-generated traits were found; further analysis or a manual review is recommended.",
    headline: "Needs attention",
    summary: "Some AI-generated traits were detected in your text; consider revising and refining it.",
    suggestions_heading: "Suggestions",
    suggestions: &[
        plain("Add more personal opinions and original insights"),
        plain("Use a wider variety of sentence structures"),
        plain("Add concrete examples and personal experience"),
        plain("Loosen phrasing that feels overly regular"),
        plain("Strengthen the emotional color and personal style of the text"),
    ],
};

pub const HIGH: GuidanceBundle = GuidanceBundle {
    label: "High likelihood of AI generation",
    detail: "The text shows clear AI-generated traits and was very likely written by AI or with heavy AI assistance.",
    headline: "High-risk warning",
    summary: "Your text shows clear AI-generated traits; substantial revision is strongly recommended.",
    suggestions_heading: "Key suggestions",
    suggestions: &[
        tagged(
            SuggestionCategory::Structure,
            "Reorganize the structure",
            "avoid overly standardized paragraph layouts",
        ),
        tagged(
            SuggestionCategory::Tone,
            "Add a human touch",
            "include personal reflections, questions and emotions",
        ),
        tagged(
            SuggestionCategory::Register,
            "Use informal language",
            "allow some conversational phrasing and personal habits of speech",
        ),
        tagged(
            SuggestionCategory::Detail,
            "Add concrete details",
            "include real data, cases and personal experience",
        ),
        tagged(
            SuggestionCategory::SentenceVariety,
            "Vary sentence structure",
            "avoid sentences that line up too neatly",
        ),
        tagged(
            SuggestionCategory::Uncertainty,
            "Express uncertainty",
            "use hedges such as \"maybe\" or \"perhaps\" where they fit",
        ),
    ],
};

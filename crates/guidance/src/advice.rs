//! Fixed advice, support and action tables keyed by analysis labels.

use mindverse_analysis::{CategoryMatch, EmotionMatch, ThemeMatch};

pub const FALLBACK_MESSAGE: &str = "I understand you're going through a challenging time. While I couldn't find specific wisdom texts that match your situation perfectly, remember that every difficulty is temporary and you have the strength within you to overcome it.";

pub const FALLBACK_ADVICE: &str = "Take some time for self-reflection, practice patience with yourself, and consider seeking support from trusted friends, family, or professionals.";

pub const REFLECTION_STEP: &str = "Take 5 minutes today for quiet reflection or meditation";

const GENTLE_ADVICE: &str = "Be gentle with yourself during this challenging time.";

const DEFAULT_SUPPORT: &str =
    "You are stronger than you realize, and this challenging time will pass.";

fn emotion_advice(emotion: &str) -> Option<&'static str> {
    Some(match emotion {
        "anxious" => "Practice deep breathing exercises and mindfulness. Remember that most of our worries never actually happen. Focus on what you can control today.",
        "sad" => "Allow yourself to feel these emotions without judgment. Sadness is a natural part of life's journey. Reach out to supportive friends or family members.",
        "angry" => "Take time to cool down before making decisions. Channel your energy into positive action. Consider what this anger is trying to teach you.",
        "confused" => "Break down complex problems into smaller, manageable parts. Seek advice from trusted mentors or counselors. Trust that clarity will come with time.",
        "overwhelmed" => "Prioritize your tasks and focus on one thing at a time. It's okay to ask for help or delegate responsibilities.",
        "lonely" => "Reach out to old friends or consider joining communities with shared interests. Loneliness is temporary, and connection is always possible.",
        "hopeless" => "Remember that this feeling is temporary. Consider speaking with a mental health professional who can provide additional support and perspective.",
        _ => return None,
    })
}

fn category_advice(category: &str) -> Option<&'static str> {
    Some(match category {
        "relationship_issues" => "Open and honest communication is key. Consider couples counseling if needed. Remember that healthy relationships require effort from both parties.",
        "work_stress" => "Set clear boundaries between work and personal life. Communicate with your supervisor about workload concerns. Consider stress management techniques.",
        "financial_problems" => "Create a budget and prioritize essential expenses. Consider seeking advice from a financial counselor. Remember that financial situations can improve with time and effort.",
        "family_conflicts" => "Practice active listening and try to understand different perspectives. Sometimes family therapy can help improve communication patterns.",
        "health_concerns" => "Don't hesitate to seek professional medical advice. Focus on what you can control: nutrition, exercise, and stress management.",
        _ => return None,
    })
}

fn support_message(emotion: &str) -> Option<&'static str> {
    Some(match emotion {
        "anxious" => "Your feelings of anxiety are valid, and you're not alone in experiencing them. Many people face similar challenges, and there are effective ways to manage anxiety.",
        "sad" => "It's okay to feel sad. These emotions are part of being human, and they will pass. You have the strength to get through this difficult time.",
        "angry" => "Your anger is understandable given your situation. These feelings can be channeled into positive change and growth.",
        "confused" => "Feeling confused is natural when facing complex situations. With time and reflection, clarity will emerge.",
        "overwhelmed" => "It's completely normal to feel overwhelmed sometimes. You don't have to handle everything at once.",
        _ => return None,
    })
}

fn category_step(category: &str) -> Option<&'static str> {
    Some(match category {
        "relationship_issues" => "Have an honest conversation with your partner about your feelings",
        "work_stress" => "Identify the top 3 stressors at work and create a plan to address them",
        "financial_problems" => "List all your expenses and identify areas where you can reduce spending",
        "family_conflicts" => "Reach out to a family member you trust to discuss the situation",
        "health_concerns" => "Schedule an appointment with a healthcare professional",
        _ => return None,
    })
}

fn theme_step(theme: &str) -> Option<&'static str> {
    Some(match theme {
        "courage" => "Identify one small brave action you can take today",
        "patience" => "Practice waiting without judgment for 10 minutes today",
        "forgiveness" => "Write down one thing you're ready to forgive (yourself or others)",
        "wisdom" => "Read or listen to something that inspires you",
        "peace" => "Create a peaceful space in your home for reflection",
        _ => return None,
    })
}

/// Advice for the primary emotion followed by advice for the primary category.
pub fn personalized_advice(emotions: &[EmotionMatch], categories: &[CategoryMatch]) -> String {
    let mut advice = Vec::new();
    if let Some(primary) = emotions.first() {
        advice.push(emotion_advice(&primary.emotion).unwrap_or(GENTLE_ADVICE));
    }
    if let Some(text) = categories
        .first()
        .and_then(|c| category_advice(&c.category))
    {
        advice.push(text);
    }
    advice.join(" ")
}

pub fn emotional_support(primary_emotion: &str) -> String {
    support_message(primary_emotion)
        .unwrap_or(DEFAULT_SUPPORT)
        .to_string()
}

pub fn actionable_steps(categories: &[CategoryMatch], themes: &[ThemeMatch]) -> Vec<String> {
    let mut steps = vec![REFLECTION_STEP.to_string()];
    if let Some(step) = categories.first().and_then(|c| category_step(&c.category)) {
        steps.push(step.to_string());
    }
    if let Some(step) = themes.first().and_then(|t| theme_step(&t.theme)) {
        steps.push(step.to_string());
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindverse_analysis::Analyzer;
    use pretty_assertions::assert_eq;

    #[test]
    fn advice_joins_emotion_and_category() {
        let analysis = Analyzer::new().analyze("I am so worried about my boss and my job");
        let advice = personalized_advice(&analysis.emotions, &analysis.problem_categories);
        assert!(advice.starts_with("Practice deep breathing"));
        assert!(advice.ends_with("Consider stress management techniques."));
    }

    #[test]
    fn unknown_emotion_gets_gentle_advice_and_default_support() {
        let analysis = Analyzer::new().analyze("I feel so guilty");
        assert_eq!(
            personalized_advice(&analysis.emotions, &analysis.problem_categories),
            GENTLE_ADVICE
        );
        assert_eq!(emotional_support("guilty"), DEFAULT_SUPPORT);
    }

    #[test]
    fn no_labels_means_no_advice() {
        assert_eq!(personalized_advice(&[], &[]), "");
    }

    #[test]
    fn steps_always_start_with_reflection() {
        let analysis = Analyzer::new().analyze("my family argues and I need courage");
        let steps = actionable_steps(&analysis.problem_categories, &analysis.themes);
        assert_eq!(
            steps,
            vec![
                REFLECTION_STEP.to_string(),
                "Reach out to a family member you trust to discuss the situation".to_string(),
                "Identify one small brave action you can take today".to_string(),
            ]
        );
        assert_eq!(actionable_steps(&[], &[]), vec![REFLECTION_STEP.to_string()]);
    }
}

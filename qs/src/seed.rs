//! Built-in consultation catalog
//!
//! The fixed set of question templates loaded at initialization. Consuming
//! applications expect these exact prompts, so the text, options, and
//! keywords are literal and must not be reworded.

use crate::template::{NewTemplate, QuestionType};

fn multiple_choice(
    category: &str,
    question_text: &str,
    options: &[&str],
    order_index: i64,
    keywords: &[&str],
) -> NewTemplate {
    NewTemplate {
        category: category.to_string(),
        question_text: question_text.to_string(),
        question_type: QuestionType::MultipleChoice,
        options: Some(options.iter().map(|s| s.to_string()).collect()),
        order_index,
        is_required: true,
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
    }
}

fn text(category: &str, question_text: &str, order_index: i64, keywords: &[&str]) -> NewTemplate {
    NewTemplate {
        category: category.to_string(),
        question_text: question_text.to_string(),
        question_type: QuestionType::Text,
        options: None,
        order_index,
        is_required: true,
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
    }
}

fn boolean(category: &str, question_text: &str, order_index: i64, keywords: &[&str]) -> NewTemplate {
    NewTemplate {
        category: category.to_string(),
        question_text: question_text.to_string(),
        question_type: QuestionType::Boolean,
        options: None,
        order_index,
        is_required: true,
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
    }
}

fn scale(
    category: &str,
    question_text: &str,
    options: &[&str],
    order_index: i64,
    keywords: &[&str],
) -> NewTemplate {
    NewTemplate {
        category: category.to_string(),
        question_text: question_text.to_string(),
        question_type: QuestionType::Scale,
        options: Some(options.iter().map(|s| s.to_string()).collect()),
        order_index,
        is_required: true,
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
    }
}

/// The full seed catalog: 29 templates across seven categories
pub fn catalog() -> Vec<NewTemplate> {
    vec![
        // Digestive
        multiple_choice(
            "digestive",
            "How long has your pet been experiencing digestive issues?",
            &["Less than 24 hours", "1-3 days", "4-7 days", "More than a week"],
            1,
            &["vomiting", "diarrhea", "appetite"],
        ),
        multiple_choice(
            "digestive",
            "What does your pet's stool look like?",
            &["Normal", "Loose/watery", "Hard/dry", "Contains blood", "Contains mucus"],
            2,
            &["diarrhea", "stool", "bowel"],
        ),
        text(
            "digestive",
            "Has your pet eaten anything unusual recently?",
            3,
            &["eating", "food", "garbage"],
        ),
        multiple_choice(
            "digestive",
            "How many times has your pet vomited in the last 24 hours?",
            &["None", "Once", "2-5 times", "More than 5 times"],
            4,
            &["vomiting", "nausea"],
        ),
        boolean(
            "digestive",
            "Is your pet still drinking water normally?",
            5,
            &["drinking", "water", "dehydration"],
        ),
        // Respiratory
        multiple_choice(
            "respiratory",
            "What type of cough does your pet have?",
            &["Dry cough", "Wet/productive cough", "Honking sound", "Gagging", "No cough"],
            1,
            &["cough", "coughing"],
        ),
        multiple_choice(
            "respiratory",
            "Is your pet having difficulty breathing?",
            &["No difficulty", "Mild difficulty", "Moderate difficulty", "Severe difficulty"],
            2,
            &["breathing", "respiratory"],
        ),
        multiple_choice(
            "respiratory",
            "When is the breathing trouble most noticeable?",
            &["During exercise", "At rest", "While sleeping", "All the time"],
            3,
            &["breathing", "wheezing", "exercise"],
        ),
        multiple_choice(
            "respiratory",
            "Have you noticed any nasal discharge?",
            &["None", "Clear", "Cloudy or colored", "Bloody"],
            4,
            &["nose", "discharge", "sneezing"],
        ),
        // Dermatological
        multiple_choice(
            "dermatological",
            "Where on your pet's body is the skin issue located?",
            &["Face/head", "Neck", "Back", "Belly", "Legs", "Tail", "All over"],
            1,
            &["skin", "fur", "hair", "rash"],
        ),
        multiple_choice(
            "dermatological",
            "How often does your pet scratch or lick the affected area?",
            &["Rarely", "Occasionally", "Frequently", "Constantly"],
            2,
            &["itching", "scratching", "licking"],
        ),
        boolean(
            "dermatological",
            "Is there any hair loss around the affected area?",
            3,
            &["hair loss", "fur", "bald"],
        ),
        text(
            "dermatological",
            "Have you changed your pet's food, shampoo, or bedding recently?",
            4,
            &["allergies", "food", "environment"],
        ),
        // Musculoskeletal
        multiple_choice(
            "musculoskeletal",
            "Which leg or limb is affected?",
            &["Front left", "Front right", "Back left", "Back right", "Multiple legs", "Not sure"],
            1,
            &["limping", "leg", "paw"],
        ),
        multiple_choice(
            "musculoskeletal",
            "When did you first notice the limping?",
            &["Today", "Yesterday", "2-3 days ago", "This week", "Longer than a week"],
            2,
            &["limping", "mobility"],
        ),
        multiple_choice(
            "musculoskeletal",
            "Can your pet put weight on the affected limb?",
            &["Full weight", "Partial weight", "No weight at all", "It varies"],
            3,
            &["limping", "weight", "pain"],
        ),
        multiple_choice(
            "musculoskeletal",
            "Does the limping change after rest?",
            &["Improves", "Worsens", "No change", "Not sure"],
            4,
            &["mobility", "stiffness", "joint pain"],
        ),
        // Behavioral
        multiple_choice(
            "behavioral",
            "How would you describe the change in your pet's behavior?",
            &["More aggressive", "More withdrawn", "More anxious", "Less active", "Restless", "Other"],
            1,
            &["behavior", "aggressive", "anxious"],
        ),
        multiple_choice(
            "behavioral",
            "When did you first notice these behavioral changes?",
            &["Today", "This week", "This month", "Gradually over time"],
            2,
            &["behavioral", "changes"],
        ),
        text(
            "behavioral",
            "Have there been any recent changes in your pet's environment or routine?",
            3,
            &["environment", "routine", "stress"],
        ),
        boolean(
            "behavioral",
            "Is your pet eating and drinking normally?",
            4,
            &["appetite", "eating", "drinking"],
        ),
        // Emergency
        multiple_choice(
            "emergency",
            "What type of emergency situation is this?",
            &[
                "Trauma/injury",
                "Suspected poisoning",
                "Difficulty breathing",
                "Seizure",
                "Severe bleeding",
                "Loss of consciousness",
                "Other",
            ],
            1,
            &["emergency", "trauma", "poisoning"],
        ),
        multiple_choice(
            "emergency",
            "How long ago did this emergency occur?",
            &["Just now", "Within 1 hour", "1-3 hours ago", "3-6 hours ago", "More than 6 hours"],
            2,
            &["emergency", "when"],
        ),
        boolean(
            "emergency",
            "Is your pet conscious and responsive right now?",
            3,
            &["unconscious", "responsive", "emergency"],
        ),
        text(
            "emergency",
            "If poisoning is suspected, what did your pet ingest?",
            4,
            &["poisoning", "toxin", "ingested"],
        ),
        // General questions for all categories
        boolean("general", "Has your pet experienced this issue before?", 1, &[]),
        text("general", "Is your pet currently on any medications?", 2, &[]),
        scale(
            "general",
            "Rate your pet's overall energy level today",
            &["1 (Very low)", "2 (Low)", "3 (Normal)", "4 (High)", "5 (Very high)"],
            3,
            &[],
        ),
        boolean(
            "general",
            "Is your pet up to date on vaccinations?",
            4,
            &["vaccinations", "preventive"],
        ),
    ]
}

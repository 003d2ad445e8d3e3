pub const NO_KNOWLEDGE: &str = "No additional Wolfram knowledge available for this class.";

const KNOWLEDGE: [(&str, &str); 2] = [
    (
        "normal",
        "Normal fundus: no signs of disease. Verify image quality: brightness, focus, and centering.",
    ),
    (
        "glaucoma",
        "Glaucoma: characterized by increased optic cup-to-disc ratio and loss of peripheral vision.",
    ),
];

/// Explanatory text for a predicted label. Case-insensitive and total.
pub fn knowledge_for(label: &str) -> &'static str {
    let normalized = label.to_lowercase();
    KNOWLEDGE
        .iter()
        .find(|(key, _)| *key == normalized)
        .map(|(_, text)| *text)
        .unwrap_or(NO_KNOWLEDGE)
}

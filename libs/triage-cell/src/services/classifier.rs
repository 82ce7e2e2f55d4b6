use regex::Regex;
use tracing::debug;

use crate::models::{Classification, TriageError};

/// Department the classifier falls back to when nothing in the text
/// matches a configured trigger.
pub const DEFAULT_DEPARTMENT: &str = "General Medicine";
pub const DEFAULT_CONFIDENCE: f64 = 0.55;

const CONFIDENCE_BASE: f64 = 0.6;
const CONFIDENCE_PER_MATCH: f64 = 0.1;
const CONFIDENCE_CEILING: f64 = 0.95;

#[derive(Debug, Clone)]
pub struct TriageRule {
    pub department: String,
    pub triggers: Vec<String>,
}

impl TriageRule {
    pub fn new(department: &str, triggers: &[&str]) -> Self {
        Self {
            department: department.to_string(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Ordered department -> trigger-phrase table. Order matters: score ties
/// resolve to the earliest department, so the table must iterate
/// deterministically. The table is immutable once built; tests inject
/// alternate tables through `SymptomClassifier::new`.
#[derive(Debug, Clone)]
pub struct TriageRuleTable {
    rules: Vec<TriageRule>,
}

impl TriageRuleTable {
    pub fn new(rules: Vec<TriageRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TriageRule] {
        &self.rules
    }
}

impl Default for TriageRuleTable {
    fn default() -> Self {
        Self::new(vec![
            TriageRule::new("Cardiology", &[
                "chest pain", "palpitations", "heart attack", "bp",
                "hypertension", "breathlessness",
            ]),
            TriageRule::new("Neurology", &[
                "headache", "migraine", "seizure", "dizziness", "numbness",
                "stroke",
            ]),
            TriageRule::new("Pulmonology", &[
                "cough", "asthma", "wheezing", "shortness of breath",
                "tuberculosis",
            ]),
            TriageRule::new("Gastroenterology", &[
                "stomach pain", "abdominal pain", "vomiting", "nausea",
                "diarrhoea", "diarrhea",
            ]),
            TriageRule::new("Orthopedics", &[
                "fracture", "joint pain", "back pain", "sprain",
                "swollen ankle",
            ]),
            TriageRule::new("Gynecology", &[
                "pregnancy", "pregnant", "menstrual", "period pain", "labour",
            ]),
            TriageRule::new("Pediatrics", &[
                "child", "infant", "baby", "vaccination",
            ]),
            TriageRule::new("Dermatology", &[
                "rash", "itching", "acne", "hives",
            ]),
            TriageRule::new("ENT", &[
                "ear pain", "sore throat", "sinus", "hearing loss",
                "nosebleed",
            ]),
            TriageRule::new("Ophthalmology", &[
                "blurred vision", "eye pain", "red eye", "vision loss",
            ]),
            TriageRule::new("Urology", &[
                "kidney stone", "blood in urine", "painful urination",
            ]),
            TriageRule::new("Psychiatry", &[
                "anxiety", "depression", "panic attack", "insomnia",
            ]),
        ])
    }
}

struct CompiledRule {
    department: String,
    triggers: Vec<Regex>,
}

/// Keyword classifier over free-text symptom descriptions. Triggers
/// match as whole words only: "bp" hits "bp 180" but never "bpm".
pub struct SymptomClassifier {
    rules: Vec<CompiledRule>,
}

impl SymptomClassifier {
    pub fn new(table: TriageRuleTable) -> Result<Self, TriageError> {
        let mut rules = Vec::with_capacity(table.rules().len());
        for rule in table.rules() {
            let mut triggers = Vec::with_capacity(rule.triggers.len());
            for trigger in &rule.triggers {
                let pattern = format!(r"\b{}\b", regex::escape(&trigger.to_lowercase()));
                triggers.push(Regex::new(&pattern)?);
            }
            rules.push(CompiledRule {
                department: rule.department.clone(),
                triggers,
            });
        }
        Ok(Self { rules })
    }

    /// Classify a symptom description into a department with a
    /// confidence score in [0, 1]. Total: every input, including the
    /// empty string, produces a result.
    pub fn classify(&self, text: &str) -> Classification {
        let lowered = text.to_lowercase();

        let mut best: Option<(usize, usize)> = None; // (rule index, score)
        for (index, rule) in self.rules.iter().enumerate() {
            let score = rule.triggers.iter().filter(|t| t.is_match(&lowered)).count();
            if score > 0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, score)) => {
                let department = self.rules[index].department.clone();
                let confidence = round2(
                    (CONFIDENCE_BASE + CONFIDENCE_PER_MATCH * score as f64)
                        .min(CONFIDENCE_CEILING),
                );
                debug!(
                    "Classified symptoms as {} ({} trigger hits, confidence {})",
                    department, score, confidence
                );
                Classification { department, confidence }
            }
            None => {
                debug!("No trigger matched, falling back to {}", DEFAULT_DEPARTMENT);
                Classification {
                    department: DEFAULT_DEPARTMENT.to_string(),
                    confidence: DEFAULT_CONFIDENCE,
                }
            }
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_classifier() -> SymptomClassifier {
        SymptomClassifier::new(TriageRuleTable::default()).unwrap()
    }

    #[test]
    fn empty_text_falls_back_to_general_medicine() {
        let result = default_classifier().classify("");
        assert_eq!(result.department, "General Medicine");
        assert_eq!(result.confidence, 0.55);
    }

    #[test]
    fn unmatched_text_falls_back_to_general_medicine() {
        let result = default_classifier().classify("feeling a bit off since yesterday");
        assert_eq!(result.department, "General Medicine");
        assert_eq!(result.confidence, 0.55);
    }

    #[test]
    fn chest_pain_and_palpitations_is_confident_cardiology() {
        let result = default_classifier().classify("severe chest pain and palpitations");
        assert_eq!(result.department, "Cardiology");
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn single_trigger_scores_point_seven() {
        let result = default_classifier().classify("woke up with a migraine");
        assert_eq!(result.department, "Neurology");
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn triggers_only_match_whole_words() {
        // "bp" must not fire inside "bpm".
        let result = default_classifier().classify("watch shows 92 bpm");
        assert_eq!(result.department, "General Medicine");

        let result = default_classifier().classify("bp is very high today");
        assert_eq!(result.department, "Cardiology");
    }

    #[test]
    fn repeated_trigger_counts_once() {
        let result = default_classifier().classify("cough cough cough");
        assert_eq!(result.department, "Pulmonology");
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn ties_resolve_to_first_department_in_table_order() {
        let table = TriageRuleTable::new(vec![
            TriageRule::new("First", &["alpha", "beta"]),
            TriageRule::new("Second", &["gamma", "delta"]),
        ]);
        let classifier = SymptomClassifier::new(table).unwrap();

        let result = classifier.classify("alpha beta gamma delta");
        assert_eq!(result.department, "First");
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn confidence_is_capped_at_point_nine_five() {
        let table = TriageRuleTable::new(vec![TriageRule::new(
            "Everything",
            &["one", "two", "three", "four", "five"],
        )]);
        let classifier = SymptomClassifier::new(table).unwrap();

        let result = classifier.classify("one two three four five");
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn multi_word_phrases_match_across_token_boundaries() {
        let result = default_classifier().classify("sudden shortness of breath after climbing stairs");
        assert_eq!(result.department, "Pulmonology");
    }
}

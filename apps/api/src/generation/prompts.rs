// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::generation::language::Language;
use crate::llm_client::prompts::INJECTION_GUARD;

const SYSTEM_EN: &str = "You are an expert interviewer. \
    Generate 5 interview questions based on the job posting.";

const SYSTEM_PL: &str = "Jesteś ekspertem w przeprowadzaniu rozmów kwalifikacyjnych. \
    Wygeneruj 5 pytań na podstawie ogłoszenia o pracę.";

const SYSTEM_DE: &str = "Sie sind ein Experte für Vorstellungsgespräche. \
    Generieren Sie 5 Interviewfragen basierend auf der Stellenausschreibung.";

/// Output rules shared by every language.
const OUTPUT_RULES: &str = "\
    STRICT REQUIREMENTS: \
    - Generate EXACTLY 5 questions. \
    - Each question must be between 20 and 300 characters long. \
    - Write the questions in the same language as the job posting. \
    - Questions must be realistic and specific to the role: skills, experience, scenarios. \
    - Do not ask for personal information. \
    - Respond with a JSON object of the form {\"questions\": [\"...\", ...]} and nothing else.";

/// Localized system prompt for question generation.
pub fn generation_system_prompt(language: Language) -> String {
    let intro = match language {
        Language::En => SYSTEM_EN,
        Language::Pl => SYSTEM_PL,
        Language::De => SYSTEM_DE,
    };
    format!("{intro}\n\n{OUTPUT_RULES}\n\n{INJECTION_GUARD}")
}

//! Offline question source used when no model credential is configured.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::generation::language::Language;

pub const MIN_DELAY: Duration = Duration::from_millis(1500);
pub const MAX_DELAY: Duration = Duration::from_millis(2500);

const MOCK_EN: [&str; 5] = [
    "Can you walk me through your experience with the technologies mentioned in this role?",
    "How do you approach problem-solving when facing a challenging technical issue?",
    "Tell me about a time when you had to learn a new technology quickly. How did you go about it?",
    "How do you ensure your code is maintainable and follows best practices?",
    "Can you describe your experience working in a team environment and collaborating with other developers?",
];

const MOCK_PL: [&str; 5] = [
    "Opowiedz o swoim doświadczeniu z technologiami wymienionymi w tej ofercie pracy.",
    "Jak podchodzisz do rozwiązywania problemów, gdy napotkasz trudne wyzwanie techniczne?",
    "Opisz sytuację, gdy musiałeś szybko nauczyć się nowej technologii. Jak się do tego zabrałeś?",
    "Jak zapewniasz, że Twój kod jest łatwy w utrzymaniu i zgodny z najlepszymi praktykami?",
    "Jakie masz doświadczenie w pracy zespołowej i współpracy z innymi programistami?",
];

const MOCK_DE: [&str; 5] = [
    "Können Sie Ihre Erfahrung mit den in dieser Stelle erwähnten Technologien beschreiben?",
    "Wie gehen Sie bei der Problemlösung vor, wenn Sie vor einer schwierigen technischen Herausforderung stehen?",
    "Erzählen Sie von einer Zeit, als Sie eine neue Technologie schnell lernen mussten. Wie sind Sie dabei vorgegangen?",
    "Wie stellen Sie sicher, dass Ihr Code wartbar ist und bewährten Praktiken folgt?",
    "Können Sie Ihre Erfahrung in der Teamarbeit und Zusammenarbeit mit anderen Entwicklern beschreiben?",
];

pub fn mock_questions(language: Language) -> &'static [&'static str; 5] {
    match language {
        Language::En => &MOCK_EN,
        Language::Pl => &MOCK_PL,
        Language::De => &MOCK_DE,
    }
}

/// The five mock questions for `language`, in random order.
pub fn shuffled_questions(language: Language) -> Vec<String> {
    let mut questions: Vec<String> = mock_questions(language)
        .iter()
        .map(|q| q.to_string())
        .collect();
    questions.shuffle(&mut rand::thread_rng());
    questions
}

/// A realistic response latency so the UI behaves the same as in live mode.
pub fn simulated_latency() -> Duration {
    rand::thread_rng().gen_range(MIN_DELAY..=MAX_DELAY)
}

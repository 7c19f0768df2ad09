use rand::SeedableRng;
use rand::rngs::StdRng;

use vocab_drill_core::quiz::session::NextOutcome;
use vocab_drill_core::quiz::{QuizMode, QuizSession, QuizStyle, VocabList};

// Two vocabulary files as they would arrive from an upload: two header
// lines, then one term per line in source/target alternation.
const ANIMALS: &str = "French\tEnglish\n---\nchat\ncat\nchien\ndog\npoisson\nfish\n";
const COLORS: &str = "French\tEnglish\n---\nrouge\nred\nvert\ngreen\n";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse each uploaded file, then merge them in upload order
    let sources = vec![
        VocabList::parse(ANIMALS.as_bytes())?,
        VocabList::parse(COLORS.as_bytes())?,
    ];
    let vocab = VocabList::merge(sources)?;
    println!("Merged vocabulary: {} terms, {} pairs", vocab.len(), vocab.pair_count());

    // The session owns the list for its lifetime; keep a copy so the
    // demo can look up the expected answers and play both sides
    let answer_key = vocab.clone();

    let mut session = QuizSession::new();

    // Starting before any vocabulary is loaded is rejected
    match session.start(QuizStyle::Recall, QuizMode::Exhaustive, 0) {
        Ok(_) => println!("Should not happen"),
        Err(_) => println!("Starting without vocabulary is rejected"),
    }

    session.load_vocabulary(vocab);
    let started = session.start(QuizStyle::MultipleChoice, QuizMode::Exhaustive, 0)?;
    println!("Quiz started: {} question(s)", started.total_questions);

    // Seeded generator, so the run is reproducible
    let mut rng = StdRng::seed_from_u64(42);

    let mut number = 0;
    loop {
        let NextOutcome::Question { question, number: n, total } = session.next_question(&mut rng)? else {
            break;
        };
        number = n;

        println!("Question {}/{}: translate '{}'", n, total, question.prompt());
        if let Some(options) = question.options() {
            println!("  options: {}", options.join(", "));
        }

        // Answer correctly on odd questions, wrongly on even ones
        let answer = if n % 2 == 1 {
            answer_key
                .term(question.reference() + 1)
                .unwrap_or_default()
                .to_owned()
        } else {
            "not a translation".to_owned()
        };

        let answered = session.submit_answer(question.reference(), &answer)?;
        if answered.is_correct {
            println!("  '{}' is correct ({} so far)", answer, answered.correct_count);
        } else {
            println!("  '{}' is wrong, expected '{}'", answer, answered.expected_answer);
        }
    }

    let stats = session.stats();
    println!(
        "Quiz complete after {} question(s): {}/{} correct",
        number, stats.correct_count, stats.total_questions
    );

    // The quiz has completed: a late submission is rejected
    match session.submit_answer(1, "chat") {
        Ok(_) => println!("Should not happen"),
        Err(_) => println!("Submitting after completion is rejected"),
    }

    // Reset discards everything, including the vocabulary
    session.reset();
    match session.next_question(&mut rng) {
        Ok(_) => println!("Should not happen"),
        Err(_) => println!("A reset session must be started again"),
    }

    Ok(())
}

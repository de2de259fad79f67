//! Interactive study session on stdin/stdout

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use vocabox_core::{
    spawn_session, Answer, Exercise, JsonContentSource, Rating, SchedulerConfig, SessionCommand,
    SessionRequest, SessionServices, SessionSnapshot, SessionSummary, Silent, Speech, SqliteStore,
    StudySession, VocabularyItem,
};

use crate::terminal::{CommandSpeech, TerminalBell};

pub struct StudyArgs {
    pub user: String,
    pub topic: String,
    pub vocab: PathBuf,
    pub speech_cmd: Option<String>,
}

/// What a line of input means in the current phase
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Send(SessionCommand),
    /// Show the back of the card (and play the flip cue)
    Flip,
    Help,
    Quit,
    Invalid(String),
}

pub async fn run(
    args: StudyArgs,
    store: SqliteStore,
    config: SchedulerConfig,
) -> anyhow::Result<()> {
    let content = JsonContentSource::new(&args.vocab);
    let audible = args.speech_cmd.is_some();
    let speech: Arc<dyn Speech> = match args.speech_cmd {
        Some(program) => Arc::new(CommandSpeech::new(program)),
        None => Arc::new(Silent),
    };
    let services = SessionServices::new(Arc::new(store))
        .with_speech(speech)
        .with_cues(Arc::new(TerminalBell));

    let session = StudySession::start(
        SessionRequest::new(args.user, args.topic),
        &content,
        services,
        config,
    )
    .with_context(|| format!("Could not start a session from {}", args.vocab.display()))?;

    let handle = spawn_session(session);
    let mut updates = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut screen = Screen::new(audible);

    let first = updates.borrow_and_update().clone();
    if first.queue_len == 0 {
        println!("{}", "Nothing to study right now. Come back later!".dimmed());
    }
    screen.render(&first);

    while !handle.snapshot().finished {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                screen.render(&snapshot);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                let snapshot = handle.snapshot();
                match interpret(&line, &snapshot) {
                    Input::Send(command) => {
                        if !handle.send(command).await {
                            break;
                        }
                    }
                    Input::Flip => {
                        if let Some(word) = &snapshot.current_word {
                            reveal(word);
                        }
                        if !handle.send(SessionCommand::Flip).await {
                            break;
                        }
                    }
                    Input::Help => print_help(),
                    Input::Quit => break,
                    Input::Invalid(reason) => println!("{}", reason.yellow()),
                }
            }
        }
    }

    // no-op when the session already finished on its own
    let summary = handle.leave().await.context("Session task failed")?;
    print_summary(&summary);
    Ok(())
}

fn interpret(line: &str, snapshot: &SessionSnapshot) -> Input {
    let text = line.trim();
    match text {
        "q" | "quit" => return Input::Quit,
        "?" | "help" => return Input::Help,
        _ => {}
    }

    match snapshot.phase {
        "learning" => match text {
            "" | "f" => Input::Flip,
            "s" => Input::Send(SessionCommand::Pronounce),
            other => match other.parse::<Rating>() {
                Ok(rating) => Input::Send(SessionCommand::Rate(rating)),
                Err(_) => Input::Invalid("Rate with 1 (again), 2 (good) or 3 (easy)".into()),
            },
        },
        "break" => Input::Send(SessionCommand::SkipBreak),
        "practice" => match &snapshot.exercise {
            None => Input::Invalid("Hold on, next exercise coming up".into()),
            Some(Exercise::MultipleChoice { options, .. }) => match text.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => {
                    Input::Send(SessionCommand::Answer(Answer::Choice(n - 1)))
                }
                _ => Input::Invalid(format!("Pick an option from 1 to {}", options.len())),
            },
            Some(Exercise::Listening { .. }) if text.is_empty() => {
                Input::Send(SessionCommand::Pronounce)
            }
            Some(Exercise::Listening { .. }) => {
                Input::Send(SessionCommand::Answer(Answer::Typed(text.to_string())))
            }
        },
        _ => Input::Quit,
    }
}

/// Prints only when something the learner sees has changed
struct Screen {
    audible: bool,
    last_key: Option<(&'static str, usize, Option<String>, Option<bool>)>,
    /// Last exercise shown, to reveal the answer after a miss
    shown: Option<Exercise>,
}

impl Screen {
    fn new(audible: bool) -> Self {
        Self {
            audible,
            last_key: None,
            shown: None,
        }
    }

    fn render(&mut self, snapshot: &SessionSnapshot) {
        let key = (
            snapshot.phase,
            snapshot.index,
            snapshot.exercise.as_ref().map(|e| e.word_id().to_string()),
            snapshot.last_answer,
        );
        if self.last_key.as_ref() == Some(&key) {
            return;
        }
        self.last_key = Some(key);

        match snapshot.phase {
            "learning" => {
                if let Some(word) = &snapshot.current_word {
                    println!();
                    println!(
                        "{} {}",
                        format!("[{}/{}]", snapshot.index + 1, snapshot.queue_len).dimmed(),
                        word.word.bold()
                    );
                    if !word.pronunciation.is_empty() {
                        println!("  /{}/", word.pronunciation);
                    }
                    println!(
                        "{}",
                        "enter: flip   1/2/3: again/good/easy   s: speak   q: quit".dimmed()
                    );
                }
            }
            "break" => {
                println!();
                println!(
                    "{} {} word(s) to confirm. Practice starts in {}s, press enter to start now.",
                    "Break.".yellow().bold(),
                    snapshot.pending,
                    snapshot.break_remaining_secs.unwrap_or(0)
                );
            }
            "practice" => self.render_practice(snapshot),
            _ => {}
        }
    }

    fn render_practice(&mut self, snapshot: &SessionSnapshot) {
        match (&snapshot.exercise, snapshot.last_answer) {
            (_, Some(true)) => println!("  {}", "Correct!".green().bold()),
            (_, Some(false)) => {
                let answer = match &self.shown {
                    Some(Exercise::MultipleChoice {
                        options,
                        answer_index,
                        ..
                    }) => options.get(*answer_index).cloned().unwrap_or_default(),
                    Some(Exercise::Listening { word, .. }) => word.clone(),
                    None => String::new(),
                };
                println!("  {} {}", "Wrong.".red().bold(), format!("Answer: {}", answer).dimmed());
            }
            (Some(exercise), None) => {
                println!();
                match exercise {
                    Exercise::MultipleChoice {
                        prompt, options, ..
                    } => {
                        println!("What does {} mean?", prompt.bold());
                        for (i, option) in options.iter().enumerate() {
                            println!("  {}) {}", i + 1, option);
                        }
                    }
                    Exercise::Listening { word, .. } => {
                        if self.audible {
                            println!("Type the word you hear {}", "(enter: replay)".dimmed());
                        } else {
                            println!("Type the word: {}", mask(word).bold());
                        }
                    }
                }
                self.shown = Some(exercise.clone());
            }
            (None, None) => {}
        }
    }
}

/// First letter, the rest hidden
fn mask(word: &str) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| if i == 0 || c == ' ' { c } else { '_' })
        .collect()
}

fn reveal(word: &VocabularyItem) {
    if word.part_of_speech.is_empty() {
        println!("  = {}", word.meaning.cyan());
    } else {
        println!("  = {} {}", word.meaning.cyan(), format!("({})", word.part_of_speech).dimmed());
    }
    if let Some(synonyms) = word.synonyms.as_deref().filter(|s| !s.is_empty()) {
        println!("    {}: {}", "synonyms".dimmed(), synonyms);
    }
    if let Some(antonyms) = word.antonyms.as_deref().filter(|s| !s.is_empty()) {
        println!("    {}: {}", "antonyms".dimmed(), antonyms);
    }
}

fn print_help() {
    println!("{}", "=== Keys ===".cyan().bold());
    println!("  learning:  enter = flip, 1/2/3 = again/good/easy, s = speak");
    println!("  break:     enter = start practice now");
    println!("  practice:  option number, or the typed word (enter replays audio)");
    println!("  anywhere:  q = leave (unconfirmed ratings are not saved)");
}

fn print_summary(summary: &SessionSummary) {
    println!();
    println!("{}", "=== Session Summary ===".cyan().bold());
    println!(
        "{}: {}/{}",
        "Words Studied".white().bold(),
        summary.processed,
        summary.queue_len
    );
    println!(
        "{}: {}/{} correct in {} round(s)",
        "Practice".white().bold(),
        summary.practice_correct,
        summary.practice_answers,
        summary.practice_rounds
    );
    println!(
        "{}: {}m {}s",
        "Study Time".white().bold(),
        summary.study_seconds / 60,
        summary.study_seconds % 60
    );
    if summary.discarded > 0 {
        println!(
            "{}",
            format!(
                "{} rating(s) were waiting for practice and were not saved",
                summary.discarded
            )
            .yellow()
        );
    }
    if summary.failed_writes > 0 {
        println!(
            "{}",
            format!("{} progress write(s) failed, see log", summary.failed_writes).red()
        );
    }
}

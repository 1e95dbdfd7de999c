use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use quizforge::quiz::generator::build_prompt;
use quizforge::quiz::session::QuizSession;
use quizforge::quiz::{Question, QuestionKind};
use quizforge::server::{ErrorResponse, GenerateRequest, GenerateResponse};

#[derive(Parser)]
#[command(
    name = "play",
    about = "Generate a quiz from your study material and play it in the terminal"
)]
struct Args {
    /// File with the study material; pasted interactively when omitted.
    content: Option<PathBuf>,

    /// Base URL of the quiz server.
    #[arg(long, env = "QUIZFORGE_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let content = match &args.content {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?,
        None => read_pasted_content()?,
    };
    if content.trim().is_empty() {
        bail!("Please enter content to generate the quiz.");
    }

    let client = reqwest::Client::new();
    loop {
        println!("Generating quiz... please wait.");
        let questions = generate(&client, &args.server, &content).await?;
        if questions.is_empty() {
            bail!("No valid questions generated.");
        }
        play(QuizSession::new(questions)).await?;

        let again = read_line("Generate another quiz from the same material? [y/N] ")?;
        if !again.eq_ignore_ascii_case("y") {
            break;
        }
    }
    Ok(())
}

async fn generate(
    client: &reqwest::Client,
    server: &str,
    content: &str,
) -> anyhow::Result<Vec<Question>> {
    let prompt = build_prompt(content);
    let response = client
        .post(format!("{server}/api/generate-quiz"))
        .json(&GenerateRequest { prompt })
        .send()
        .await
        .context("could not reach the quiz server")?;

    if !response.status().is_success() {
        let err: ErrorResponse = response
            .json()
            .await
            .context("server returned an unreadable error")?;
        bail!("Error generating quiz: {}", err.error);
    }

    let body: GenerateResponse = response
        .json()
        .await
        .context("server returned an unreadable response")?;
    Ok(body.questions)
}

async fn play(mut session: QuizSession) -> anyhow::Result<()> {
    loop {
        let Some(question) = session.current_question().cloned() else {
            break;
        };

        println!("\nQuestion {} of {}", session.current + 1, session.total());
        println!("{}", question.question);

        let response = match question.kind {
            QuestionKind::Mcq => {
                for (index, option) in question.options.iter().enumerate() {
                    println!("  {}. {}", index + 1, option);
                }
                let input = read_nonempty("Your answer (number or text): ")?;
                // A number picks an option; anything else is graded as text.
                match input.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= question.options.len() => {
                        question.options[n - 1].clone()
                    }
                    _ => input,
                }
            }
            QuestionKind::Fill | QuestionKind::OneWord => read_nonempty("Type your answer: ")?,
        };

        let (next, verdict) = session.answer(&response);
        session = next;
        if let Some(verdict) = verdict {
            if verdict.correct {
                println!("Correct!");
            } else {
                println!("Incorrect.");
                println!("{}", verdict.explanation);
            }
            // Pacing pause; no input is read until it elapses.
            tokio::time::sleep(verdict.delay).await;
        }
    }

    println!("\nQuiz Completed!");
    println!("Your Score: {} / {}", session.score, session.total());
    println!("Rank: {}", session.rank());
    println!();
    for record in &session.history {
        if record.correct {
            println!("{} - Correct", record.question);
        } else {
            println!("{} - Wrong ({})", record.question, record.response);
        }
        println!("    {}", record.explanation);
    }
    Ok(())
}

fn read_pasted_content() -> anyhow::Result<String> {
    println!("Paste your study material, notes, or any text. Finish with an empty line:");
    let stdin = io::stdin();
    let mut content = String::new();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        content.push_str(&line);
        content.push('\n');
    }
    Ok(content)
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line.trim().to_string())
}

fn read_nonempty(prompt: &str) -> anyhow::Result<String> {
    loop {
        let line = read_line(prompt)?;
        if !line.is_empty() {
            return Ok(line);
        }
    }
}

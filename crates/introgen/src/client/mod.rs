mod clipboard;
mod relay_client;
mod render;

pub use clipboard::{copy_result, ClipboardSink, SystemClipboard};
pub use relay_client::RelayClient;

use crate::prelude::{eprintln, print, println, *};
use colored::Colorize;
use indicatif::ProgressBar;
use introgen_core::form::{describe_fields, Field, GenerationRequest};
use introgen_core::result::GenerationResult;
use introgen_core::session::{FormSession, SubmitRejected};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

#[derive(Debug, clap::Parser)]
#[command(name = "generate")]
#[command(about = "Fill in the outline and generate an introduction")]
pub struct App {
    /// Base URL of the relay
    #[arg(long, env = "INTROGEN_RELAY_URL", default_value = "http://localhost:3001")]
    pub relay_url: String,

    /// Relay request timeout in seconds
    #[arg(long, env = "INTROGEN_CLIENT_TIMEOUT", default_value = "90")]
    pub timeout: u64,

    #[clap(flatten)]
    pub fields: FieldArgs,

    /// Submit once with the given fields and exit instead of opening the form
    #[arg(long)]
    pub once: bool,

    /// Copy the introduction to the clipboard after a successful --once run
    #[arg(long, requires = "once")]
    pub copy: bool,

    /// Print the raw result as JSON (with --once)
    #[arg(long, requires = "once")]
    pub json: bool,
}

/// Initial field values
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FieldArgs {
    /// Main topic (broad context)
    #[arg(long)]
    pub main_topic: Option<String>,

    /// Specific problem being addressed
    #[arg(long)]
    pub specific_problem: Option<String>,

    /// Limitations of prior methods
    #[arg(long)]
    pub old_methods: Option<String>,

    /// Proposed solution
    #[arg(long)]
    pub solution: Option<String>,

    /// Key benefits or contributions
    #[arg(long)]
    pub benefits: Option<String>,
}

impl From<FieldArgs> for GenerationRequest {
    fn from(args: FieldArgs) -> Self {
        GenerationRequest {
            main_topic: args.main_topic.unwrap_or_default(),
            specific_problem: args.specific_problem.unwrap_or_default(),
            old_methods: args.old_methods.unwrap_or_default(),
            solution: args.solution.unwrap_or_default(),
            benefits: args.benefits.unwrap_or_default(),
        }
    }
}

/// Form actions available from the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Generate,
    Regenerate,
    Copy,
    Edit,
    Show,
    Quit,
}

impl Action {
    pub fn parse(input: &str) -> Option<Action> {
        match input.trim().to_lowercase().as_str() {
            "g" | "generate" => Some(Action::Generate),
            "r" | "regenerate" => Some(Action::Regenerate),
            "c" | "copy" => Some(Action::Copy),
            "e" | "edit" => Some(Action::Edit),
            "s" | "show" => Some(Action::Show),
            "q" | "quit" | "exit" => Some(Action::Quit),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Action::Generate => "[g]enerate",
            Action::Regenerate => "[r]egenerate",
            Action::Copy => "[c]opy",
            Action::Edit => "[e]dit",
            Action::Show => "[s]how",
            Action::Quit => "[q]uit",
        }
    }

    fn enabled(self, session: &FormSession) -> bool {
        match self {
            Action::Generate | Action::Edit => session.can_generate(),
            Action::Regenerate => session.can_regenerate(),
            Action::Copy => session.can_copy(),
            Action::Show | Action::Quit => true,
        }
    }
}

const ACTIONS: [Action; 6] = [
    Action::Generate,
    Action::Regenerate,
    Action::Copy,
    Action::Edit,
    Action::Show,
    Action::Quit,
];

/// User-facing notice for a submission that could not start.
pub fn rejection_notice(rejected: &SubmitRejected) -> String {
    match rejected {
        SubmitRejected::InFlight => "A generation is already in progress.".to_string(),
        SubmitRejected::NoResultYet => "Generate an introduction first.".to_string(),
        SubmitRejected::Missing(fields) => {
            format!("Please fill in at least: {}.", describe_fields(fields))
        }
    }
}

/// Run one submission: client-side validation, one relay call, record outcome.
pub async fn submit(
    session: &mut FormSession,
    client: &RelayClient,
    regenerate: bool,
    spinner: Option<&ProgressBar>,
) -> std::result::Result<(), SubmitRejected> {
    let request = if regenerate {
        session.begin_regenerate()?
    } else {
        session.begin_submit()?
    };

    log::info!("sending outline to {}", client.endpoint());
    let outcome = client.generate(&request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    session.complete(outcome);
    Ok(())
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let client = RelayClient::new(&app.relay_url, Duration::from_secs(app.timeout))?;
    let mut session = FormSession::with_fields(app.fields.into());

    if global.verbose {
        eprintln!("Relay endpoint: {}", client.endpoint());
    }

    if app.once {
        return run_once(&mut session, &client, app.copy, app.json).await;
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut clipboard = SystemClipboard::default();

    println!("{}", "AI Introduction Suggester".bold());
    println!("{}", "Fill in the outline, then generate. Press Enter to keep a value.".dimmed());

    if !edit_fields(&mut session, &mut lines).await? {
        return Ok(());
    }
    form_loop(&mut session, &client, &mut lines, &mut clipboard).await
}

async fn run_once(
    session: &mut FormSession,
    client: &RelayClient,
    copy: bool,
    json: bool,
) -> Result<()> {
    let spinner = (!json).then(render::spinner);
    if let Err(rejected) = submit(session, client, false, spinner.as_ref()).await {
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        return Err(eyre!(rejection_notice(&rejected)));
    }

    let Some(result) = session.result() else {
        return Err(eyre!("No result recorded"));
    };

    if json {
        let output = serde_json::to_string_pretty(result)
            .map_err(|e| eyre!("Failed to serialize output: {}", e))?;
        println!("{}", output);
    } else {
        render::print_view(session.view());
    }

    if let GenerationResult::Error(message) = result {
        return Err(eyre!("Generation failed: {}", message));
    }

    if copy && copy_result(session, &mut SystemClipboard::default())? {
        eprintln!("{}", "Copied to clipboard.".green());
    }

    Ok(())
}

/// Prompt for every field in order.
///
/// An empty line keeps the current value and `-` clears it. Returns `false`
/// when input ends before the form is complete.
pub async fn edit_fields<R>(session: &mut FormSession, lines: &mut Lines<R>) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    for field in Field::ALL {
        render::print_field_prompt(field, session.fields());
        print!("> ");
        flush_stdout();

        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };
        apply_field_input(session, field, &line);
    }
    Ok(true)
}

fn apply_field_input(session: &mut FormSession, field: Field, line: &str) {
    match line.trim() {
        "" => {}
        "-" => session.set_field(field, ""),
        value => session.set_field(field, value),
    }
}

async fn form_loop<R>(
    session: &mut FormSession,
    client: &RelayClient,
    lines: &mut Lines<R>,
    clipboard: &mut impl ClipboardSink,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        print_controls(session);

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let Some(action) = Action::parse(&line) else {
            eprintln!("{}", format!("Unknown action: {}", line.trim()).yellow());
            continue;
        };

        if !action.enabled(session) {
            eprintln!("{}", disabled_notice(action).yellow());
            continue;
        }

        match action {
            Action::Generate | Action::Regenerate => {
                let spinner = render::spinner();
                let regenerate = action == Action::Regenerate;
                match submit(session, client, regenerate, Some(&spinner)).await {
                    Ok(()) => render::print_view(session.view()),
                    Err(rejected) => {
                        spinner.finish_and_clear();
                        eprintln!("{}", rejection_notice(&rejected).yellow());
                    }
                }
            }
            Action::Copy => match copy_result(session, clipboard) {
                Ok(true) => println!("{}", "Copied to clipboard.".green()),
                Ok(false) => {}
                Err(e) => eprintln!("{}", e.to_string().bright_red()),
            },
            Action::Edit => {
                if !edit_fields(session, lines).await? {
                    return Ok(());
                }
            }
            Action::Show => render::print_view(session.view()),
            Action::Quit => return Ok(()),
        }
    }
}

fn disabled_notice(action: Action) -> &'static str {
    match action {
        Action::Regenerate => "Regenerate is available once a result exists.",
        Action::Copy => "Nothing to copy yet.",
        _ => "A generation is in progress.",
    }
}

/// Action menu with disabled entries dimmed.
fn controls_line(session: &FormSession) -> String {
    ACTIONS
        .iter()
        .map(|action| {
            if action.enabled(session) {
                action.label().to_string()
            } else {
                action.label().dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn print_controls(session: &FormSession) {
    println!();
    print!("{}\n> ", controls_line(session));
    flush_stdout();
}

fn flush_stdout() {
    use std::io::Write;
    let _ = anstream::stdout().flush();
}

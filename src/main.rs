//! Proposal CLI
//!
//! Usage:
//!   proposal                                # Interactive card in the terminal
//!   proposal --theme autumn                 # Autumn variant
//!   proposal --messages card.txt            # One message per line, last is the question
//!   proposal --serve                        # HTTP API server
//!   proposal --json                         # JSON output per input

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use proposal::core::{
    buttons_delay, jitter, reveal_delay, run_server, Bounds, ControllerConfig, Notifier,
    NotifierConfig, ResponseController, ShrinkProfile,
};
use proposal::types::{ControllerOutput, ControllerState, Input, ReasonCode, Theme};
use proposal::{SHUTDOWN_GRACE_SECS, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "proposal",
    version = VERSION,
    about = "Staged-reveal valentine card with email notification",
    long_about = "Reveals a few messages one at a time, then asks the question.\n\n\
                  Commands at the prompt:\n  \
                  <Enter> / next  Reveal the next message\n  \
                  yes             Affirm\n  \
                  no              Decline (the button gives up after the threshold)\n  \
                  quit            Leave\n\n\
                  Notifications go to PROPOSAL_RECIPIENT_EMAIL through RESEND_API_KEY.\n\
                  Without them the answer is only logged."
)]
struct Args {
    /// Card theme (lavender, autumn)
    #[arg(short, long, default_value = "lavender")]
    theme: String,

    /// File with one message per line; the last line is the question
    #[arg(short, long)]
    messages: Option<String>,

    /// Declines before the decline button is withdrawn
    #[arg(long)]
    threshold: Option<u32>,

    /// Notify on every decline, not just the last one
    #[arg(long)]
    notify_every_decline: bool,

    /// Log notifications instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show decline button details
    #[arg(long)]
    verbose: bool,

    /// Skip reveal delays
    #[arg(long)]
    fast: bool,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    let notifier = Notifier::from_config(NotifierConfig::from_env(), args.dry_run);

    if args.serve {
        run_serve(&args, notifier).await;
    } else {
        run_interactive(&args, notifier.clone());
        let unfinished = notifier.flush(Duration::from_secs(SHUTDOWN_GRACE_SECS)).await;
        if unfinished > 0 {
            eprintln!("{} notification(s) still in flight at exit", unfinished);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("proposal=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Build controller config from flags
fn build_config(args: &Args) -> Result<ControllerConfig, String> {
    let theme: Theme = args.theme.parse().map_err(|e| format!("{}", e))?;
    let messages = match &args.messages {
        Some(path) => Some(read_messages(Path::new(path))?),
        None => None,
    };

    Ok(ControllerConfig {
        theme,
        threshold: args.threshold,
        notify_every_decline: args.notify_every_decline,
        messages,
    })
}

/// One message per non-blank line
fn read_messages(path: &Path) -> Result<Vec<String>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Run the card in the terminal
fn run_interactive(args: &Args, notifier: Notifier) {
    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let mut controller = match ResponseController::from_config(&config, notifier) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Cannot start card: {}", e);
            std::process::exit(1);
        }
    };

    print_header(config.theme, args.no_color);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut output = controller.current_output();
    show(&output, args);

    while !output.state.is_terminal() {
        print!("{}", format_prompt(&output, args.no_color));
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let Some(input) = parse_command(line.trim(), &output) else {
            if line.trim().eq_ignore_ascii_case("quit") || line.trim().eq_ignore_ascii_case("exit") {
                break;
            }
            println!("  ? try: next, yes, no, quit");
            continue;
        };

        output = controller.apply(input);
        show(&output, args);
    }

    println!();
    println!("Session ended. Outcome: {} after {} inputs", controller.outcome(), controller.input_count());
}

/// Map a typed command to an input
fn parse_command(line: &str, output: &ControllerOutput) -> Option<Input> {
    match line.to_ascii_lowercase().as_str() {
        "" | "next" | "n" if !output.buttons_visible => Some(Input::Advance),
        "yes" | "y" => Some(Input::Affirm),
        "no" => Some(Input::Decline),
        "next" => Some(Input::Advance),
        _ => None,
    }
}

/// Render one output
fn show(output: &ControllerOutput, args: &Args) {
    if args.json {
        match serde_json::to_string(output) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("JSON encoding failed: {}", e),
        }
        return;
    }

    if output.reason.is_ignored() {
        if args.verbose {
            println!("  ({})", output.reason);
        }
        return;
    }

    match (output.state, output.reason) {
        // Question is already on screen, only the buttons change
        (_, ReasonCode::R004_DECLINE_COUNTED) => {}
        (ControllerState::Staging { .. } | ControllerState::AwaitingResponse, _) => {
            if !args.fast {
                std::thread::sleep(reveal_delay(output.stage));
            }
            println!();
            if args.no_color {
                println!("  {}", output.text);
            } else {
                println!("  {}", output.text.bold().magenta());
            }
            if output.buttons_visible && !args.fast {
                std::thread::sleep(buttons_delay());
            }
        }
        (ControllerState::Affirmed, _) => {
            println!();
            print_line("  Yayyyy!!! 🎉", "green", args.no_color);
        }
        (ControllerState::DeclinedFinal, _) => {
            println!();
            print_line("  The decline button has given up. 💔", "red", args.no_color);
        }
    }

    if output.buttons_visible {
        print_buttons(output, args);
    }

    if args.verbose {
        println!("  {}", if args.no_color { output.to_parseable_string() } else { output.to_terminal_string() });
    }
}

/// Print the two choices
fn print_buttons(output: &ControllerOutput, args: &Args) {
    let Some(feedback) = &output.feedback else {
        println!("  [yes] Yes! 💕");
        return;
    };

    println!("  [yes] Yes! 💕    [no] {}", feedback.label);

    if args.verbose {
        let profile = ShrinkProfile::for_count(output.decline_count, output.decline_threshold);
        let moved = jitter(feedback.dodge, 8, Bounds::new(120, 60), &mut rand::thread_rng());
        println!(
            "  no-button: color={} dodge=({}, {}, {}°) scale={:.2} opacity={:.2} yes-scale={:.2}",
            feedback.color_token,
            moved.x,
            moved.y,
            moved.rotation,
            profile.decline_scale,
            profile.decline_opacity,
            profile.affirm_scale
        );
    }
}

fn print_line(text: &str, color: &str, no_color: bool) {
    if no_color {
        println!("{}", text);
    } else {
        println!("{}", text.color(color).bold());
    }
}

/// Print header
fn print_header(theme: Theme, no_color: bool) {
    let title = format!("  Proposal v{} - {}", VERSION, theme);
    println!("========================================");
    if no_color {
        println!("{}", title);
    } else {
        println!("{}", title.bold().magenta());
    }
    println!("========================================");
    println!("Press Enter for the next message. Answer with yes / no. Type 'quit' to exit.");
}

/// Format prompt
fn format_prompt(output: &ControllerOutput, no_color: bool) -> String {
    if no_color {
        format!("[{}] > ", output.state)
    } else {
        format!(
            "{}{} [{}]{} > ",
            output.state.color_code(),
            output.state.emoji(),
            output.state,
            ControllerState::color_reset()
        )
    }
}

/// Run HTTP API server
async fn run_serve(args: &Args, notifier: Notifier) {
    println!();
    println!("========================================");
    println!("  💜 Proposal API Server");
    println!("  Version: {}", VERSION);
    println!("========================================");
    println!();

    if let Err(e) = run_server(&args.addr, notifier, NotifierConfig::from_env()).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

//! Interactive shell over stdin.
//!
//! One command per line. After every command the pending notices are printed,
//! followed by the current tab when the command changed what it shows.

use std::io::Write;

use smartcrop_core::types::{CropFilter, Language};
use smartcrop_core::SmartCropError;
use smartcrop_ui::{AuthMode, Tab, ViewController, VoiceField, VoiceToggle, QUICK_PROMPTS};
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "\
Commands:
  tab <home|crops|chat|profile>   switch tab
  ask <question>                  ask the farming assistant
  prompt <1-4>                    send a quick prompt
  listen                          start/stop voice input for a question
  say <n>                         read crop n's tip aloud
  stop                            stop speaking
  welcome                         hear the welcome message
  lang <english|hindi|punjabi>    change language
  crops [soil] [season]           reload crops (use - for any)
  weather [location]              refresh the forecast
  history                         reload chat history
  signin <email> <password>
  signup <email> <password> [name] [location]
                                  (name and location fall back to voice entry)
  voice <name|location>           start/stop voice entry for a sign-up field
  instructions [signin|signup]    hear the sign-in or sign-up instructions
  signout
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Empty,
    Tab(Tab),
    Ask(String),
    Prompt(usize),
    Listen,
    Say(usize),
    Stop,
    Welcome,
    Language(Language),
    Crops(CropFilter),
    Weather(Option<String>),
    History,
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        email: String,
        password: String,
        name: Option<String>,
        location: Option<String>,
    },
    Voice(VoiceField),
    Instructions(AuthMode),
    SignOut,
    Help,
    Quit,
}

/// Parse one input line. Errors are usage messages for the user.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match head.to_lowercase().as_str() {
        "" => ShellCommand::Empty,
        "tab" => ShellCommand::Tab(rest.parse().map_err(|e: SmartCropError| e.to_string())?),
        "ask" if rest.is_empty() => return Err("usage: ask <question>".to_string()),
        "ask" => ShellCommand::Ask(rest.to_string()),
        "prompt" => ShellCommand::Prompt(one_based(rest, QUICK_PROMPTS.len(), "prompt <1-4>")?),
        "listen" => ShellCommand::Listen,
        "say" => ShellCommand::Say(one_based(rest, usize::MAX, "say <n>")?),
        "stop" => ShellCommand::Stop,
        "welcome" => ShellCommand::Welcome,
        "lang" | "language" => {
            ShellCommand::Language(rest.parse().map_err(|e: SmartCropError| e.to_string())?)
        }
        "crops" => ShellCommand::Crops(CropFilter {
            soil_type: any(args.first()),
            season: any(args.get(1)),
        }),
        "weather" => ShellCommand::Weather((!rest.is_empty()).then(|| rest.to_string())),
        "history" => ShellCommand::History,
        "signin" => match args.as_slice() {
            [email, password] => ShellCommand::SignIn {
                email: email.to_string(),
                password: password.to_string(),
            },
            _ => return Err("usage: signin <email> <password>".to_string()),
        },
        "signup" => match args.as_slice() {
            [email, password, rest @ ..] => ShellCommand::SignUp {
                email: email.to_string(),
                password: password.to_string(),
                name: rest.first().map(|n| n.to_string()),
                location: (rest.len() > 1).then(|| rest[1..].join(" ")),
            },
            _ => return Err("usage: signup <email> <password> [name] [location]".to_string()),
        },
        "voice" => match rest.to_lowercase().as_str() {
            "name" => ShellCommand::Voice(VoiceField::Name),
            "location" => ShellCommand::Voice(VoiceField::Location),
            _ => return Err("usage: voice <name|location>".to_string()),
        },
        "instructions" => match rest.to_lowercase().as_str() {
            "" | "signup" => ShellCommand::Instructions(AuthMode::SignUp),
            "signin" => ShellCommand::Instructions(AuthMode::SignIn),
            _ => return Err("usage: instructions [signin|signup]".to_string()),
        },
        "signout" => ShellCommand::SignOut,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(command)
}

fn one_based(arg: &str, max: usize, usage: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 && n <= max => Ok(n - 1),
        _ => Err(format!("usage: {usage}")),
    }
}

fn any(arg: Option<&&str>) -> Option<String> {
    arg.filter(|a| **a != "-").map(|a| a.to_string())
}

/// Run the shell until `quit` or end of input.
pub async fn run(mut view: ViewController) -> Result<(), SmartCropError> {
    let subscription = view.session().subscribe().await;
    view.load().await;
    println!("{}", view.render());
    print_notices(&view);
    view.speak_welcome();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_command(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => {
                if execute(&mut view, command).await {
                    println!("{}", view.render());
                }
            }
            Err(usage) => println!("{usage}"),
        }
        print_notices(&view);
    }

    view.speech().stop();
    subscription.unsubscribe();
    tracing::info!("Shell closed");
    Ok(())
}

/// Apply one command. Returns whether the current tab should be redrawn.
async fn execute(view: &mut ViewController, command: ShellCommand) -> bool {
    match command {
        ShellCommand::Empty => false,
        ShellCommand::Tab(tab) => {
            view.set_tab(tab);
            true
        }
        ShellCommand::Ask(question) => {
            view.set_tab(Tab::Chat);
            view.ask(&question).await.is_some()
        }
        ShellCommand::Prompt(index) => {
            view.set_tab(Tab::Chat);
            view.quick_prompt(index).await.is_some()
        }
        ShellCommand::Listen => {
            if !view.speech().capabilities().recognition {
                println!("Voice input is not available.");
                return false;
            }
            let asked = view.voice_question().await;
            if view.speech().is_listening() {
                println!("Listening... type `listen` again when done.");
                return false;
            }
            view.set_tab(Tab::Chat);
            asked.is_some()
        }
        ShellCommand::Say(index) => {
            match view.listen_to_tip(index) {
                Some(tip) if !tip.is_empty() => println!("Speaking: {tip}"),
                Some(_) => println!("No tip for that crop."),
                None => println!("No crop number {}.", index + 1),
            }
            false
        }
        ShellCommand::Stop => {
            view.speech().stop();
            false
        }
        ShellCommand::Welcome => {
            println!("{}", view.speak_welcome());
            false
        }
        ShellCommand::Language(language) => {
            view.set_language(language);
            true
        }
        ShellCommand::Crops(filter) => {
            view.fetch_crops(&filter).await;
            view.set_tab(Tab::Crops);
            true
        }
        ShellCommand::Weather(location) => {
            view.refresh_weather(location.as_deref()).await;
            view.set_tab(Tab::Home);
            true
        }
        ShellCommand::History => {
            view.load_history().await;
            view.set_tab(Tab::Chat);
            true
        }
        ShellCommand::SignIn { email, password } => {
            report_auth(view.sign_in(&email, &password).await)
        }
        ShellCommand::SignUp {
            email,
            password,
            name,
            location,
        } => report_auth(
            view.sign_up(&email, &password, name.as_deref(), location.as_deref())
                .await,
        ),
        ShellCommand::Voice(field) => {
            match view.voice_field(field).await {
                Ok(VoiceToggle::Listening) => {
                    println!("{}. Type `voice {field}` again when done.", field.prompt())
                }
                Ok(VoiceToggle::Filled(text)) => println!("{field}: {text}"),
                Ok(VoiceToggle::Unavailable) => println!("Voice input is not available."),
                Err(e) => println!("{e}"),
            }
            false
        }
        ShellCommand::Instructions(mode) => {
            println!("{}", view.speak_auth_instructions(mode));
            false
        }
        ShellCommand::SignOut => {
            view.sign_out().await;
            true
        }
        ShellCommand::Help => {
            println!("{HELP}");
            false
        }
        ShellCommand::Quit => false,
    }
}

fn report_auth<T>(result: Result<T, smartcrop_ui::AuthFormError>) -> bool {
    match result {
        Ok(_) => true,
        // Backend failures already raised a notice.
        Err(smartcrop_ui::AuthFormError::Gateway(_)) => false,
        Err(e) => {
            println!("{e}");
            false
        }
    }
}

fn print_notices(view: &ViewController) {
    for notice in view.notifier().drain() {
        println!("{notice}");
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, ConversationController, KeyInput, KeyOutcome, SiteClient, SubmitOutcome,
};
use shared::domain::{ChatMessage, ContactField, Role};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ebike", about = "Contact form and chat assistant for the e-bike site")]
struct Args {
    /// Overrides the backend origin from ebike.toml / environment.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send the contact form once.
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        message: String,
    },
    /// List stored contact submissions.
    Contacts,
    /// Chat with the assistant. End a line with `\` to continue on the next one.
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.api_base_url {
        settings.api_base_url = url;
    }
    debug!(?settings, "loaded settings");
    let client = SiteClient::from_settings(&settings)?;

    match args.command {
        Command::Contact {
            name,
            email,
            phone,
            message,
        } => {
            client.contact.update_field(ContactField::Name, name);
            client.contact.update_field(ContactField::Email, email);
            client.contact.update_field(ContactField::Phone, phone);
            client.contact.update_field(ContactField::Message, message);
            submit_contact(&client).await
        }
        Command::Contacts => {
            let contacts = client.list_contacts().await?;
            for contact in &contacts {
                let when = contact
                    .created_at
                    .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "{when}  {} <{}>  {}",
                    contact.name,
                    contact.email,
                    contact.phone.as_deref().unwrap_or("")
                );
                println!("    {}", contact.message);
            }
            println!("{} contact(s)", contacts.len());
            Ok(())
        }
        Command::Chat => run_chat(&client.conversation).await,
    }
}

async fn submit_contact(client: &SiteClient) -> Result<()> {
    let outcome = client.contact.submit().await;
    let state = client.contact.state();
    println!("{}", state.status_message);
    match outcome {
        SubmitOutcome::Submitted => Ok(()),
        SubmitOutcome::Invalid(_) => {
            for (field, error) in &state.field_errors {
                println!("  {field}: {error}");
            }
            bail!("contact form has invalid fields")
        }
        SubmitOutcome::Failed(message) => bail!("contact form was not sent: {message}"),
        SubmitOutcome::Busy => bail!("a submission is already in progress"),
    }
}

fn print_message(message: &ChatMessage) {
    let label = match message.role {
        Role::User => "you",
        Role::Bot => "assistant",
    };
    println!("{label}> {}", message.text);
}

async fn run_chat(conversation: &ConversationController) -> Result<()> {
    for message in &conversation.state().messages {
        print_message(message);
    }
    println!("(Enter sends, a trailing \\ adds a new line, /clear resets, /quit exits)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/clear" => {
                conversation.clear();
                for message in &conversation.state().messages {
                    print_message(message);
                }
                continue;
            }
            _ => {}
        }

        let mut draft = conversation.state().pending_input;
        if let Some(continued) = line.strip_suffix('\\') {
            draft.push_str(continued);
            conversation.set_pending_input(draft);
            conversation.handle_key(KeyInput::ShiftEnter).await;
            continue;
        }
        draft.push_str(&line);
        conversation.set_pending_input(draft);

        match conversation.handle_key(KeyInput::Enter).await {
            KeyOutcome::Sent(_) => {
                let state = conversation.state();
                if let Some(reply) = state.messages.last() {
                    print_message(reply);
                }
                if let Some(err) = state.last_error {
                    eprintln!("! {err}");
                }
            }
            KeyOutcome::Ignored | KeyOutcome::Edited => {}
        }
    }
    Ok(())
}

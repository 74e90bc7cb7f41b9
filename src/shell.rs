use log::{ error, info };
use std::io;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

use crate::config::{ SessionOptions, DEFAULT_SYSTEM_PROMPT };
use crate::llm::chat::ChatClient;
use crate::models::chat::{ Conversation, Message };

const EXIT_COMMAND: &str = "exit";
const PROMPT: &str = "🧑‍💻 > ";

/// Runs a line-oriented chat session until `exit` or end of input and returns
/// the accumulated conversation.
///
/// Completion failures are reported on `errors` and the loop keeps going.
pub async fn run_session<R, W, E>(
    client: &dyn ChatClient,
    options: &SessionOptions,
    reader: R,
    mut writer: W,
    mut errors: E
) -> io::Result<Conversation>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin, E: AsyncWrite + Unpin
{
    let mut lines = reader.lines();
    let mut conversation = Conversation::new();
    info!("Chat session {} started", conversation.id());

    let system_prompt = match &options.system_prompt {
        Some(prompt) => prompt.trim().to_string(),
        None => {
            say(&mut writer, "🤖 Provide System prompt or press ⏎ 'enter' to continue.\n").await?;
            say(&mut writer, PROMPT).await?;
            lines.next_line().await?.unwrap_or_default().trim().to_string()
        }
    };

    if system_prompt.is_empty() {
        conversation.add_message(Message::system(DEFAULT_SYSTEM_PROMPT));
        say(
            &mut writer,
            &format!(
                "ℹ️ No System prompt provided. Will be used default System prompt: '{}'\n",
                DEFAULT_SYSTEM_PROMPT
            )
        ).await?;
    } else {
        conversation.add_message(Message::system(system_prompt));
        say(&mut writer, "✅ System prompt successfully added to conversation.\n").await?;
    }

    say(&mut writer, "\n❓ Type your question or 'exit' to quit.\n").await?;

    loop {
        say(&mut writer, PROMPT).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if input.eq_ignore_ascii_case(EXIT_COMMAND) {
            say(&mut writer, "👋 Exiting the chat. Goodbye!\n").await?;
            break;
        }

        conversation.add_message(Message::user(input));
        say(&mut writer, "🤖 AI:\n").await?;

        let result = if options.stream {
            client.stream_completion(conversation.messages()).wait().await
        } else {
            client.get_completion(&conversation.messages()).await
        };

        match result {
            Ok(reply) => {
                conversation.add_message(reply);
                say(&mut writer, "\n").await?;
            }
            Err(e) => {
                error!("Completion failed in session {}: {}", conversation.id(), e);
                say(&mut errors, &format!("❌ Error: {}\n", e)).await?;
            }
        }
    }

    Ok(conversation)
}

async fn say<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await
}

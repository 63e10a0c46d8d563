use std::io::Write as _;

use anyhow::Result;
use ragchat_service::Outcome;
use tokio::io::{AsyncBufReadExt as _, BufReader};

use crate::Components;

/// Line-oriented chat on stdin/stdout. `exit`, `quit` or EOF ends the session.
pub(crate) async fn run(components: &Components) -> Result<()> {
    let chat = components.chat_service();
    let mut conversation = chat.new_conversation();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }

        match chat.submit(&mut conversation, &line).await? {
            Outcome::Answered(reply) => println!("{reply}\n"),
            Outcome::Warned(msg) | Outcome::Failed(msg) => eprintln!("{msg}"),
            Outcome::Ignored => {},
        }
    }

    tracing::debug!(turns = conversation.len(), "chat session ended");
    Ok(())
}

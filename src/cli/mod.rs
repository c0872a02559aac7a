pub mod hook;
pub mod parse;

use std::{
    future::Future,
    io::{BufRead, Write},
    thread,
};

use flume::Receiver;
use tracing::{error, warn};

use crate::{producer::CommandProducer, stream::transport::Transport};

use self::parse::{parse, Input};

/// Reads commands from stdin until `exit`, end of input or Ctrl-C.
pub async fn run<T: Transport>(
    mut producer: CommandProducer<T>,
) -> color_eyre::Result<()> {
    let lines = read_lines()?;
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Can't listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    drive(&mut producer, lines, interrupted).await;

    Ok(())
}

/// Handles `lines` one by one until `exit`, end of input or `shutdown`
/// resolves. `shutdown` also cuts short a command still in progress.
pub async fn drive<T: Transport>(
    producer: &mut CommandProducer<T>,
    lines: Receiver<String>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);

    loop {
        prompt();

        let line = tokio::select! {
            line = lines.recv_async() => line.ok(),
            () = &mut shutdown => None,
        };
        let Some(line) = line else {
            break;
        };

        let input = match parse(&line) {
            Ok(input) => input,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };

        let handled = tokio::select! {
            handled = handle(producer, input) => handled,
            () = &mut shutdown => Err(Handled::Exit),
        };
        match handled {
            Ok(()) => {}
            Err(Handled::Exit) => break,
            Err(Handled::Failed(e)) => error!("{e:#}"),
        }
    }
}

enum Handled {
    Exit,
    Failed(anyhow::Error),
}

impl From<anyhow::Error> for Handled {
    fn from(e: anyhow::Error) -> Self {
        Self::Failed(e)
    }
}

async fn handle<T: Transport>(
    producer: &mut CommandProducer<T>,
    input: Input,
) -> Result<(), Handled> {
    match input {
        Input::Command(command) => {
            producer.submit(command).await?;
        }
        Input::Delete(tracks) => producer.delete(tracks).await?,
        Input::Search(terms) => {
            for file in producer.search(&terms).await? {
                println!("{file}");
            }
        }
        Input::List => {
            for track in producer.list_local()? {
                println!("{track}");
            }
        }
        Input::Exit => return Err(Handled::Exit),
    }

    Ok(())
}

/// Stdin reads can't be cancelled, so they run on their own thread and never
/// hold up shutdown.
fn read_lines() -> std::io::Result<Receiver<String>> {
    let (tx, rx) = flume::unbounded();
    thread::Builder::new()
        .name("Client".to_owned())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;

    Ok(rx)
}

fn prompt() {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "> ");
    let _ = stdout.flush();
}

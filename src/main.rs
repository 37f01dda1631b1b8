//! simple-chat binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use simple_chat::cli::{self, ArgsError};
use simple_chat::config::Config;
use simple_chat::{logging, ChatServer, Interpreter, MemoryHub, ServerConsole, StdoutConsole};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            report_args_error(&e);
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_with_filter(config.log_filter());
    info!("simple-chat v{}", env!("CARGO_PKG_VERSION"));

    let hub = Arc::new(MemoryHub::new());
    let server = Arc::new(ChatServer::new(Arc::clone(&hub), config.server.port));
    hub.attach(&server);

    if let Err(e) = server.listen() {
        error!("listen failed: {}", e);
        println!("ERROR - Could not listen for clients!");
        return ExitCode::FAILURE;
    }

    let mut console = ServerConsole::new(server, StdoutConsole);
    let mut lines = spawn_console_reader();

    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(Ok(line)) => {
                    if console.interpret(&line).is_terminate() {
                        break;
                    }
                }
                None => {
                    info!("console input closed");
                    console.shutdown();
                    break;
                }
                Some(Err(e)) => {
                    error!("console read failed: {}", e);
                    println!("Unexpected error while reading from server console!");
                    console.shutdown();
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, closing server");
                console.shutdown();
                break;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Read stdin on a dedicated thread and forward each line.
///
/// A blocked stdin read must not hold up runtime shutdown, so the reader is
/// a plain thread that is simply abandoned when the process exits.
fn spawn_console_reader() -> mpsc::UnboundedReceiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
        debug!("console reader finished");
    });

    rx
}

fn report_args_error(e: &ArgsError) {
    eprintln!("error: {}", e);
    eprintln!("Run 'simple-chat --help' for usage.");
}

// SPDX-License-Identifier: AGPL-3.0
// Course Finder Shell - Main entry point
//
// Headless frontend: restores the session, then reads commands from stdin.

mod app;
mod command;

use app::App;
use command::Command;
use course_finder_core::{AppConfig, GateStatus, Services, Startup};
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("course_finder_shell=info".parse().unwrap())
                .add_directive("course_finder_core=info".parse().unwrap()),
        )
        .init();

    tracing::info!("Starting Course Finder v{}", env!("CARGO_PKG_VERSION"));

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let services = match Services::from_config(&config).await {
        Ok(services) => services,
        Err(e) => {
            eprintln!("Failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let startup = Startup::new(config, services);
    let indicator = tokio::spawn(show_loading(startup.status()));
    let state = startup.finish().await;
    let _ = indicator.await;

    // Later write failures are reported with the command that caused them
    let mut app = App::new(state);
    for line in app.startup_notice() {
        eprintln!("{}", line);
    }
    println!("Course Finder. Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                return ExitCode::FAILURE;
            }
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                if !message.is_empty() {
                    println!("{}", message);
                }
                continue;
            }
        };

        let response = app.handle(command).await;
        for line in &response.lines {
            println!("{}", line);
        }
        if response.quit {
            break;
        }
    }

    ExitCode::SUCCESS
}

/// Print a neutral loading indicator until the gate reports ready
async fn show_loading(mut status: tokio::sync::watch::Receiver<GateStatus>) {
    if *status.borrow_and_update() == GateStatus::Ready {
        return;
    }

    // Fast restores finish before anything is printed
    let wait = status.wait_for(|s| *s == GateStatus::Ready);
    if tokio::time::timeout(Duration::from_millis(150), wait).await.is_ok() {
        return;
    }

    eprint!("Loading...");
    let _ = status.wait_for(|s| *s == GateStatus::Ready).await;
    eprintln!(" done");
}

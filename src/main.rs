// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/cityhear-rs

//! CityHear - Audio Emergency Event Monitoring Console
//!
//! Headless console core for an audio-based emergency-event detection
//! appliance. Runs either against the built-in event simulator (demo mode)
//! or against a detection backend polled over HTTP.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use cityhear::alarm::{AlarmSink, NullAlarm, TracingAlarm};
use cityhear::core::{MonitorEngine, NoticePayload};
use cityhear::source::{BackendPoller, EventSimulator, EventSource};
use cityhear::{Config, VERSION};

/// CityHear - Audio Emergency Event Monitoring Console
#[derive(Parser, Debug)]
#[command(name = "cityhear")]
#[command(author = "CityHear Project")]
#[command(version = VERSION)]
#[command(about = "Real-time audio emergency event monitoring")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Demo mode with the simulated event source
    #[arg(long)]
    demo: bool,

    /// Poll a detection backend at this origin instead of simulating
    #[arg(long)]
    backend: Option<String>,

    /// Disable the audible alarm loop
    #[arg(long)]
    no_alarm: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🎙️ CityHear v{} - Audio Emergency Event Monitoring Console", VERSION);

    // Load or create configuration
    let config_path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Override with command line args
    if args.demo {
        config.demo_mode = true;
        config.backend.enabled = false;
    }
    if let Some(backend) = args.backend {
        config.demo_mode = false;
        config.backend.enabled = true;
        config.backend.base_url = backend;
    }
    if args.no_alarm {
        config.alerting.alarm_sound = false;
    }

    info!("Configuration loaded from {:?}", config_path);
    info!("Demo mode: {}", config.demo_mode);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    let alarm: Box<dyn AlarmSink> = if config.alerting.alarm_sound {
        Box::new(TracingAlarm::default())
    } else {
        Box::new(NullAlarm)
    };

    let engine = MonitorEngine::new(config.clone(), alarm);

    // Log every detection and status change as it happens
    let mut notices = engine.bus().subscribe_notices();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            match notice.payload {
                NoticePayload::Detection(event) => {
                    if event.is_emergency() {
                        warn!(
                            "🚨 {} detected, confidence {:.1}% ({})",
                            event.class.label(),
                            event.confidence,
                            event.formatted_timestamp()
                        );
                    } else {
                        info!("{} event ({:.1}%)", event.class.label(), event.confidence);
                    }
                }
                NoticePayload::Status(status) => {
                    info!("System status: {:?}", status);
                }
                NoticePayload::Alarm { .. } => {}
            }
        }
    });

    if config.backend.enabled {
        // Networked mode: the backend owns history and hardware status
        let poller = BackendPoller::new(&config.backend, engine.clone());
        tokio::spawn(poller.run());
        info!("Polling backend at {}", config.backend.base_url);
    } else {
        // Demo mode: simulated source, toggled on immediately
        let source_config = config.source.clone();
        engine.set_source(Box::new(move || {
            Box::new(EventSimulator::new(&source_config)) as Box<dyn EventSource>
        }));
        engine.start();
    }

    info!("🚀 CityHear running");
    info!("   Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, cleaning up...");
    engine.stop();
    info!("CityHear shutdown complete");

    Ok(())
}

#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use dfvpc::app::config::AppConfig;
use dfvpc::app::dashui::{FormServices, VpcSettingsApp};
use dfvpc::app::device_farm::{DeviceFarmClient, ProjectDirectory};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::prelude::*;

const DEFAULT_LOG_FILTER: &str = "dfvpc=info,eframe=info,egui=warn,wgpu=warn,winit=warn,aws_config=warn,aws_sigv4=warn,aws_smithy_runtime=warn,hyper=warn";

fn init_logging() {
    let Some(proj_dirs) = directories::ProjectDirs::from("com", "", "dfvpc") else {
        eprintln!("No home directory found, logging disabled");
        return;
    };

    let log_dir = proj_dirs.data_dir().join("logs");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_path = log_dir.join("dfvpc.log");

    let file = match std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Set restrictive permissions (owner read/write only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = file.metadata() {
            let mut perms = metadata.permissions();
            perms.set_mode(0o600);
            if let Err(e) = std::fs::set_permissions(&log_path, perms) {
                eprintln!("[SECURITY] Failed to set log file permissions: {}", e);
            }
        }
    }

    // RUST_LOG wins over the built-in levels
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::builder().parse(DEFAULT_LOG_FILTER))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let writer = std::sync::Mutex::new(file);
    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false), // No ANSI colors in file
    );

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    // Bridge log crate events to tracing (eframe, egui, wgpu)
    // This must be done AFTER setting the tracing subscriber
    if let Err(e) = tracing_log::LogTracer::builder()
        .with_max_level(log::LevelFilter::Info)
        .init()
    {
        eprintln!("Failed to initialize log-to-tracing bridge: {}", e);
    }

    tracing::info!("Logging initialized to: {:?}", log_path);
}

fn setup_panic_handler() {
    // Install a panic handler that writes to a crash log file
    // This catches panics even if normal logging hasn't been initialized yet
    std::panic::set_hook(Box::new(|panic_info| {
        let crash_msg = format!(
            "dfvpc crashed!\n\
             Panic occurred at: {}\n\
             Details: {}\n\
             Backtrace:\n{:?}\n",
            panic_info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "unknown location".to_string()),
            panic_info
                .payload()
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic_info.payload().downcast_ref::<String>().map(|s| s.as_str()))
                .unwrap_or("unknown panic"),
            std::backtrace::Backtrace::force_capture()
        );

        if let Some(proj_dirs) = directories::ProjectDirs::from("com", "", "dfvpc") {
            let log_dir = proj_dirs.data_dir().join("logs");
            let _ = std::fs::create_dir_all(&log_dir);
            let crash_log_path = log_dir.join("crash.log");

            if let Ok(mut file) = std::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(&crash_log_path)
            {
                use std::io::Write;
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "\n=== CRASH at {} ===\n{}", timestamp, crash_msg);
            }

            eprintln!("\n{}", crash_msg);
            eprintln!("Crash log written to: {:?}", crash_log_path);
        } else {
            eprintln!("\n{}", crash_msg);
        }
    }));
}

/// Load configuration and connect to Device Farm.
///
/// Failures are turned into a message the window shows in place of the form.
fn prepare_services(runtime: &tokio::runtime::Runtime) -> Result<(AppConfig, FormServices), String> {
    let config = AppConfig::load().map_err(|e| format!("{:#}", e))?;
    config.validate().map_err(|e| format!("{:#}", e))?;

    let client = runtime
        .block_on(DeviceFarmClient::connect(&config))
        .map_err(|e| format!("{:#}", e))?;
    let directory: Arc<dyn ProjectDirectory> = Arc::new(client);

    let services = FormServices::new(
        directory,
        Duration::from_secs(config.project_cache_ttl_secs),
        runtime.handle().clone(),
    );

    tracing::info!(
        "Device Farm services ready: region={}, trigger={:?}, mode={:?}",
        config.region,
        config.form.trigger,
        config.form.mode
    );
    Ok((config, services))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up panic handler BEFORE anything else to catch early crashes
    setup_panic_handler();
    init_logging();

    tracing::info!(
        "dfvpc {} starting (branch {}, commit {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_BRANCH"),
        env!("GIT_COMMIT")
    );

    // Lookups run here; the runtime must outlive the UI
    let runtime = tokio::runtime::Runtime::new()?;

    let startup = prepare_services(&runtime);
    if let Err(reason) = &startup {
        tracing::error!("VPC settings unavailable: {}", reason);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 420.0])
            .with_min_inner_size([420.0, 280.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Device Farm VPC Settings",
        native_options,
        Box::new(move |cc| Ok(Box::new(VpcSettingsApp::new(cc, startup)))),
    )?;

    drop(runtime);
    Ok(())
}

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use skin_intake_common::Platform;
use skin_intake_rust::{cli, config, error, intake, interactive, session, source, uploader};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::Config;
use intake::{AnalyzeInput, PhotoInput};
use session::IntakeSession;
use source::{PermissionProvider, PromptPermissions, StaticPermissions};
use uploader::HttpBackend;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load().context("設定ファイルを読み込めません")?;

    match cli.command {
        Commands::Analyze { image, data_url, camera, name, age, gender, skin_type, json } => {
            // ページ内カメラのフレームはWebでしか撮れない
            let platform = if data_url.is_some() {
                Platform::Web
            } else {
                cli.platform.unwrap_or(config.platform)
            };
            let photo = match (image, data_url, camera) {
                (Some(path), _, _) => PhotoInput::Gallery(path),
                (None, Some(path), _) => PhotoInput::InlineFrame(path),
                (None, None, true) => PhotoInput::Camera,
                (None, None, false) => PhotoInput::None,
            };

            let backend = build_backend(&config, cli.backend_url.as_deref())?;
            let mut session =
                IntakeSession::new(platform, Arc::new(backend), Arc::new(StaticPermissions::granted()));

            if !json {
                println!("🧴 skin-intake - 肌分析\n");
            }

            let input = AnalyzeInput { photo, name, age, gender, skin_type };
            match intake::run_analyze(&mut session, input, config.camera_template()).await {
                Ok(summary) => {
                    if json {
                        match &summary.analysis {
                            Some(report) => println!("{}", report.to_pretty_string()),
                            None => println!("null"),
                        }
                    } else {
                        println!("{}", summary);
                    }
                }
                Err(e) if e.is_notice() => {
                    eprintln!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Wizard => {
            let platform = cli.platform.unwrap_or(config.platform);
            let backend = build_backend(&config, cli.backend_url.as_deref())?;
            let permissions: Arc<dyn PermissionProvider> = Arc::new(PromptPermissions::new());
            let mut session = IntakeSession::new(platform, Arc::new(backend), permissions);

            interactive::run_interactive_wizard(&mut session, config.camera_template()).await?;
        }

        Commands::Config { set_backend_url, set_platform, show } => {
            if let Some(url) = set_backend_url {
                config.set_backend_url(url)?;
                println!("✔ 送信先を設定しました: {}", config.backend_url);
            }

            if let Some(platform) = set_platform {
                config.set_platform(platform)?;
                println!("✔ プラットフォームを設定しました: {}", platform);
            }

            if show {
                println!("設定:");
                println!("  送信先: {}", config.backend_url());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  プラットフォーム: {}", config.platform);
                match config.camera_template() {
                    Some(command) => println!("  撮影コマンド: {}", command.join(" ")),
                    None => println!("  撮影コマンド: 未設定"),
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// `--backend-url` があれば環境変数・設定ファイルより優先
fn build_backend(config: &Config, override_url: Option<&str>) -> error::Result<HttpBackend> {
    match override_url {
        Some(url) => {
            config::validate_backend_url(url)?;
            HttpBackend::new(url, Duration::from_secs(config.timeout_seconds.max(1)))
        }
        None => HttpBackend::from_config(config),
    }
}

//! 対話式ウィザード（`skin-intake wizard`）
//!
//! 画面（Phase）ごとにメニューを出し、選んだ操作をセッションに渡す。
//! 通知で済むエラーは表示して同じ画面に戻る

use dialoguer::{Input, Select};
use skin_intake_common::{Gender, Phase, SkinType};

use crate::error::{IntakeError, Result};
use crate::intake::analyzing_spinner;
use crate::session::{AcquireOutcome, IntakeSession};
use crate::source::{CANCELLED_NOTICE, GallerySource, InlineCaptureSource, NativeCameraSource};

fn select(prompt: &str, items: &[String]) -> Result<usize> {
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .map_err(|e| IntakeError::Prompt(e.to_string()))
}

fn input(prompt: &str, initial: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| IntakeError::Prompt(e.to_string()))
}

/// 通知で済むエラーは表示して `Ok(None)`
fn notice<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_notice() => {
            println!("⚠ {}\n", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn report_acquire(outcome: Option<AcquireOutcome>) {
    if outcome == Some(AcquireOutcome::Cancelled) {
        println!("⚠ {}\n", CANCELLED_NOTICE);
    }
}

/// 対話式ウィザードを実行
pub async fn run_interactive_wizard(
    session: &mut IntakeSession,
    camera_template: Option<Vec<String>>,
) -> Result<()> {
    println!("The Face Shop - Clean Beauty\n");

    loop {
        match session.wizard().phase() {
            Phase::Intro => {
                println!("Analyze Your Skin Health");
                println!("Upload/take a photo to begin analysis\n");
                let items = ["Start Analysis".to_string(), "Quit".to_string()];
                match select("Step 1 / 3", &items)? {
                    0 => session.wizard_mut().start()?,
                    _ => return Ok(()),
                }
            }

            Phase::ModalUpload => {
                let items = [
                    "Upload a photo (.jpg, .png)".to_string(),
                    "Take a photo".to_string(),
                    "Next".to_string(),
                    "Back".to_string(),
                ];
                match select("Step 1 / 3 Steps", &items)? {
                    0 => {
                        let outcome = notice(session.acquire(&GallerySource::prompt()).await)?;
                        report_acquire(outcome);
                    }
                    1 => {
                        let native = NativeCameraSource::new(camera_template.clone());
                        let outcome = notice(session.open_camera(&native).await)?;
                        report_acquire(outcome);
                    }
                    2 => {
                        notice(session.wizard_mut().next().map_err(IntakeError::from))?;
                    }
                    _ => session.wizard_mut().back()?,
                }
            }

            Phase::ModalCamera => {
                let items = ["Capture".to_string(), "Cancel".to_string(), "Back".to_string()];
                match select("Camera", &items)? {
                    0 => {
                        let source = InlineCaptureSource::from_command(camera_template.clone());
                        let outcome = notice(session.acquire(&source).await)?;
                        report_acquire(outcome);
                    }
                    1 => session.wizard_mut().cancel_camera()?,
                    _ => session.wizard_mut().back()?,
                }
            }

            Phase::ModalPreview => {
                if let Some(selection) = session.wizard().selection() {
                    println!("Preview: {}\n", selection.describe());
                }
                let items = ["Next".to_string(), "Remove photo".to_string(), "Back".to_string()];
                match select("Step 1 / 3 Steps", &items)? {
                    0 => {
                        notice(session.wizard_mut().next().map_err(IntakeError::from))?;
                    }
                    1 => session.clear_image().await?,
                    _ => session.wizard_mut().back()?,
                }
            }

            Phase::Form => form_screen(session).await?,

            Phase::Summary => {
                if let Some(summary) = session.summary() {
                    println!("\n{}\n", summary);
                }
                let items = ["Recommendation".to_string(), "Quit".to_string()];
                match select("Step 3 / 3", &items)? {
                    0 => println!("{}\n", session.wizard().recommend()?),
                    _ => return Ok(()),
                }
            }
        }
    }
}

/// ステップ2: 入力フォーム
async fn form_screen(session: &mut IntakeSession) -> Result<()> {
    let form = session.wizard().form().clone();
    let items = [
        format!("Name: {}", form.name),
        format!("Age: {}", form.age),
        format!("Gender: {}", form.gender_value()),
        format!("Skin Type: {}", form.skin_type.map(|s| s.label()).unwrap_or("Select Skin Type")),
        "Analyze Skin".to_string(),
        "Back".to_string(),
    ];

    match select("Step 2 / 3 Steps", &items)? {
        0 => {
            let name = input("Name (e.g. The Face Shop)", &form.name)?;
            session.wizard_mut().set_name(name)?;
        }
        1 => {
            let age = input("Age (e.g. 25)", &form.age)?;
            if !age.trim().is_empty() && age.trim().parse::<u32>().is_err() {
                println!("⚠ Age should be a number\n");
            }
            session.wizard_mut().set_age(age)?;
        }
        2 => {
            let labels: Vec<String> = Gender::ALL.iter().map(|g| g.to_string()).collect();
            let index = select("Gender", &labels)?;
            session.wizard_mut().set_gender(Gender::ALL[index])?;
        }
        3 => {
            let labels: Vec<String> = SkinType::ALL.iter().map(|s| s.label().to_string()).collect();
            let index = select("Skin Type", &labels)?;
            session.wizard_mut().set_skin_type(SkinType::ALL[index])?;
        }
        4 => {
            let spinner = analyzing_spinner();
            let result = session.submit().await;
            spinner.finish_and_clear();
            notice(result)?;
        }
        _ => session.wizard_mut().back()?,
    }
    Ok(())
}

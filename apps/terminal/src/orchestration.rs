//! Routes terminal commands to the controller.

use std::{ops::ControlFlow, sync::Arc};

use client_core::MovieController;

use crate::{commands::UiCommand, render::render_view};

/// Network-bound intents run as their own tasks so the prompt stays
/// responsive (a `cancel` must get through while a fetch is in flight).
pub async fn dispatch_command(
    controller: &Arc<MovieController>,
    command: UiCommand,
) -> ControlFlow<()> {
    tracing::debug!(command = command.name(), "dispatching terminal command");

    match command {
        UiCommand::Refresh => {
            let controller = controller.clone();
            tokio::spawn(async move {
                controller.refresh().await;
            });
        }
        UiCommand::CancelRetry => controller.cancel_retry().await,
        UiCommand::SetDraftField { field, value } => {
            if let Err(err) = controller.update_draft_field(field.name(), value).await {
                eprintln!("{err}");
            }
        }
        UiCommand::SubmitDraft => {
            let controller = controller.clone();
            tokio::spawn(async move {
                // the failure is reported through the view
                let _ = controller.submit_draft().await;
            });
        }
        UiCommand::Delete { id } => {
            let controller = controller.clone();
            tokio::spawn(async move {
                let _ = controller.delete_by_id(&id).await;
            });
        }
        UiCommand::Show => print!("{}", render_view(&controller.view().await)),
        UiCommand::Help => println!("{}", crate::commands::HELP),
        UiCommand::Quit => return ControlFlow::Break(()),
    }

    ControlFlow::Continue(())
}

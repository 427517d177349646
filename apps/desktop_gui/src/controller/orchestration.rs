//! Command orchestration from UI actions to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UserAction;
use crate::controller::state::InteractionState;

pub const QUEUE_FULL_MESSAGE: &str = "Another action is still queued; please retry.";
pub const BACKEND_DISCONNECTED_MESSAGE: &str =
    "Ledger worker is not running; restart the application.";

/// Starts `action` on `state` and queues its command, if any.
pub fn trigger(cmd_tx: &Sender<BackendCommand>, action: UserAction, state: &mut InteractionState) {
    if !state.can_act() {
        tracing::debug!(?action, "ignoring action while another is in flight");
        return;
    }
    if let Some(cmd) = state.begin(action) {
        dispatch_backend_command(cmd_tx, cmd, state);
    }
}

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    state: &mut InteractionState,
) {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "backend command queue is full");
            state.abort(QUEUE_FULL_MESSAGE);
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, "backend command processor disconnected");
            state.abort(BACKEND_DISCONNECTED_MESSAGE);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;

    #[test]
    fn queued_command_keeps_busy_until_outcome() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let mut state = InteractionState::default();

        trigger(&cmd_tx, UserAction::CreateAccount, &mut state);

        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::CreateAccount)));
        assert!(state.is_busy());
    }

    #[test]
    fn second_action_while_busy_is_ignored() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let mut state = InteractionState::default();

        trigger(&cmd_tx, UserAction::CreateAccount, &mut state);
        trigger(&cmd_tx, UserAction::ConnectWallet, &mut state);

        assert_eq!(cmd_rx.len(), 1);
        assert_eq!(state.busy, UserAction::CreateAccount.busy_message());
    }

    #[test]
    fn full_queue_settles_action_with_error() {
        let (cmd_tx, _cmd_rx) = bounded(1);
        cmd_tx
            .try_send(BackendCommand::ConnectWallet)
            .expect("prefill");
        let mut state = InteractionState::default();

        trigger(&cmd_tx, UserAction::CreateAccount, &mut state);

        assert!(!state.is_busy());
        assert_eq!(state.error, QUEUE_FULL_MESSAGE);
    }

    #[test]
    fn disconnected_backend_settles_action_with_error() {
        let (cmd_tx, cmd_rx) = bounded(1);
        drop(cmd_rx);
        let mut state = InteractionState::default();

        trigger(&cmd_tx, UserAction::ConnectWallet, &mut state);

        assert!(!state.is_busy());
        assert_eq!(state.error, BACKEND_DISCONNECTED_MESSAGE);
    }

    #[test]
    fn local_precondition_failure_sends_nothing() {
        let (cmd_tx, cmd_rx) = bounded(4);
        let mut state = InteractionState::default();

        trigger(&cmd_tx, UserAction::Transfer, &mut state);

        assert!(cmd_rx.is_empty());
        assert!(!state.error.is_empty());
    }
}

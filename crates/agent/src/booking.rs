use agenda_core::domain::session::Session;
use agenda_core::flows::{
    BookingFlow, FlowAction, FlowContext, FlowEngine, FlowEvent, FlowTransitionError,
    TransitionOutcome,
};
use agenda_core::validation::{describe, SlotIssue};
use tracing::{debug, info, warn};

/// Applies `event` to the session's booking state and performs the resulting
/// bookkeeping actions. `missing` is the validator's verdict on the current
/// slots; the engine refuses to enter confirmation while it is non-empty.
pub fn apply_event(
    session: &mut Session,
    event: FlowEvent,
    missing: &[SlotIssue],
) -> Result<TransitionOutcome, FlowTransitionError> {
    let engine = FlowEngine::<BookingFlow>::default();
    let context = FlowContext {
        missing_required_fields: missing.iter().map(|issue| issue.label().to_string()).collect(),
    };

    let outcome = engine.apply(&session.state, &event, &context)?;
    for action in &outcome.actions {
        match action {
            FlowAction::ClearConfirmation => session.confirm_summary = None,
            FlowAction::ClearBookingResults => {
                session.confirm_summary = None;
                session.created_event = None;
                session.email_result = None;
            }
            FlowAction::RecordCompletedBooking => session.completed_bookings += 1,
            // The summary text is owned by `present_confirmation`.
            FlowAction::PresentConfirmation => {}
        }
    }
    debug!(
        event_name = "agent.flow.transition_applied",
        session_id = %session.id,
        from = ?outcome.from,
        to = ?outcome.to,
        event = ?outcome.event,
    );
    session.state = outcome.to;
    Ok(outcome)
}

/// Records a transition that follows from a tool result. A rejected
/// transition is logged and leaves the state unchanged.
pub fn advance(session: &mut Session, event: FlowEvent) {
    if let Err(error) = apply_event(session, event, &[]) {
        warn!(
            event_name = "agent.flow.transition_rejected",
            session_id = %session.id,
            error = %error,
        );
    }
}

/// Moves the session into confirmation with `summary` as the pending prompt
/// and returns it as the reply. While `issues` is non-empty the flow stays
/// put and the reply lists what is missing.
pub fn present_confirmation(session: &mut Session, summary: String, issues: &[SlotIssue]) -> String {
    match apply_event(session, FlowEvent::SlotsValidated, issues) {
        Ok(outcome) if outcome.actions.contains(&FlowAction::PresentConfirmation) => {
            session.confirm_summary = Some(summary.clone());
            summary
        }
        Ok(_) => summary,
        Err(FlowTransitionError::MissingRequiredFields { .. }) => {
            format!("Missing: {}.", describe(issues))
        }
        Err(error) => {
            info!(
                event_name = "agent.flow.confirmation_skipped",
                session_id = %session.id,
                error = %error,
            );
            summary
        }
    }
}

#[cfg(test)]
mod tests {
    use agenda_core::domain::booking::{CreatedEvent, ToolResult};
    use agenda_core::domain::session::{Session, SessionId};
    use agenda_core::domain::slots::SlotKey;
    use agenda_core::flows::{FlowEvent, FlowState};
    use agenda_core::validation::SlotIssue;

    use super::{advance, apply_event, present_confirmation};

    #[test]
    fn confirmation_sets_summary_and_decline_clears_it() {
        let mut session = Session::new(SessionId("s".to_string()));
        let reply = present_confirmation(&mut session, "Create it? (yes/no)".to_string(), &[]);

        assert_eq!(reply, "Create it? (yes/no)");
        assert!(session.awaiting_confirm());
        assert_eq!(session.confirm_summary.as_deref(), Some("Create it? (yes/no)"));

        advance(&mut session, FlowEvent::Declined);
        assert_eq!(session.state, FlowState::Collecting);
        assert_eq!(session.confirm_summary, None);
    }

    #[test]
    fn confirmation_with_gaps_reports_them_instead() {
        let mut session = Session::new(SessionId("s".to_string()));
        let issues = [SlotIssue::Missing(SlotKey::Timezone), SlotIssue::EndNotAfterStart];

        let reply = present_confirmation(&mut session, "Create it? (yes/no)".to_string(), &issues);

        assert_eq!(reply, "Missing: timezone, end_iso (must be after start_iso).");
        assert!(!session.awaiting_confirm());
        assert_eq!(session.confirm_summary, None);
    }

    #[test]
    fn rejected_transition_leaves_state_untouched() {
        let mut session = Session::new(SessionId("s".to_string()));
        assert!(apply_event(&mut session, FlowEvent::CreateSucceeded, &[]).is_err());
        assert_eq!(session.state, FlowState::Collecting);

        advance(&mut session, FlowEvent::EmailSent);
        assert_eq!(session.state, FlowState::Collecting);
    }

    #[test]
    fn closing_counts_the_booking_and_rearm_drops_results() {
        let mut session = Session::new(SessionId("s".to_string()));
        session.state = FlowState::Created;
        session.created_event =
            Some(ToolResult::success(CreatedEvent { id: "e".to_string(), link: None }));

        advance(&mut session, FlowEvent::BookingClosed);
        assert_eq!(session.state, FlowState::Booked);
        assert_eq!(session.completed_bookings, 1);

        advance(&mut session, FlowEvent::Rearmed);
        assert_eq!(session.state, FlowState::Collecting);
        assert!(session.created_event.is_none());
        assert_eq!(session.completed_bookings, 1);
    }
}

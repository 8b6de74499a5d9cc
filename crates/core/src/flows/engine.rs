use thiserror::Error;

use crate::flows::states::{FlowAction, FlowContext, FlowEvent, FlowState, TransitionOutcome};

pub trait FlowDefinition {
    fn initial_state(&self) -> FlowState;
    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

#[derive(Clone, Debug, Default)]
pub struct BookingFlow;

impl FlowDefinition for BookingFlow {
    fn initial_state(&self) -> FlowState {
        FlowState::Collecting
    }

    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_booking(current, event, context)
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_state(&self) -> FlowState {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }
}

impl Default for FlowEngine<BookingFlow> {
    fn default() -> Self {
        Self::new(BookingFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("missing required fields before transition from {state:?}: {missing_fields:?}")]
    MissingRequiredFields { state: FlowState, missing_fields: Vec<String> },
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: FlowState, event: FlowEvent },
}

fn transition_booking(
    current: &FlowState,
    event: &FlowEvent,
    context: &FlowContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use FlowAction::{
        ClearBookingResults, ClearConfirmation, PresentConfirmation, RecordCompletedBooking,
    };
    use FlowEvent::{
        BookingClosed, CreateFailed, CreateSucceeded, Declined, EmailSent, Rearmed, SlotsValidated,
    };
    use FlowState::{AwaitingConfirm, Booked, Collecting, Created, Emailed};

    let (to, actions) = match (current, event) {
        (Collecting, SlotsValidated) | (AwaitingConfirm, SlotsValidated) => {
            if !context.missing_required_fields.is_empty() {
                return Err(FlowTransitionError::MissingRequiredFields {
                    state: *current,
                    missing_fields: context.missing_required_fields.clone(),
                });
            }
            (AwaitingConfirm, vec![PresentConfirmation])
        }
        (AwaitingConfirm, Declined) | (AwaitingConfirm, CreateFailed) => {
            (Collecting, vec![ClearConfirmation])
        }
        (AwaitingConfirm, CreateSucceeded) => (Created, vec![ClearConfirmation]),
        (Created, EmailSent) => (Emailed, Vec::new()),
        (Created, BookingClosed) | (Emailed, BookingClosed) => {
            (Booked, vec![RecordCompletedBooking])
        }
        (Booked, Rearmed) => (Collecting, vec![ClearBookingResults]),
        _ => {
            return Err(FlowTransitionError::InvalidTransition { state: *current, event: *event });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: *event, actions })
}

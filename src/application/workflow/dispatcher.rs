//! Event-to-workflow dispatcher
//!
//! Subscribes to the event bus and spawns one workflow run per consumed
//! event. Runs for different tickets proceed concurrently; errors have no
//! channel back to the original caller and are logged here.

use std::sync::Arc;

use tracing::{error, info};

use super::assignment::AssignmentWorkflow;
use super::signup::SignupWorkflow;
use crate::notifications::{Event, EventBus};
use crate::shared::ShutdownSignal;

pub struct WorkflowDispatcher {
    assignment: Arc<AssignmentWorkflow>,
    signup: Arc<SignupWorkflow>,
}

impl WorkflowDispatcher {
    pub fn new(assignment: Arc<AssignmentWorkflow>, signup: Arc<SignupWorkflow>) -> Self {
        Self { assignment, signup }
    }

    /// Start the background consumer task.
    pub fn start(&self, event_bus: &EventBus, shutdown: ShutdownSignal) {
        let mut subscriber = event_bus.subscribe();
        let assignment = self.assignment.clone();
        let signup = self.signup.clone();

        tokio::spawn(async move {
            info!("Workflow dispatcher started");

            loop {
                tokio::select! {
                    received = subscriber.recv() => {
                        let Some(message) = received else {
                            info!("Event bus closed, dispatcher stopping");
                            break;
                        };

                        match message.event {
                            Event::TicketCreated(event) => {
                                let workflow = assignment.clone();
                                tokio::spawn(async move {
                                    if let Err(err) = workflow.on_ticket_created(&event.ticket_id).await {
                                        error!(
                                            ticket_id = %event.ticket_id,
                                            error = %err,
                                            "Ticket assignment workflow failed"
                                        );
                                    }
                                });
                            }
                            Event::UserSignedUp(event) => {
                                let workflow = signup.clone();
                                tokio::spawn(async move {
                                    if let Err(err) = workflow.on_user_signed_up(&event.email).await {
                                        error!(
                                            email = %event.email,
                                            error = %err,
                                            "Signup workflow failed"
                                        );
                                    }
                                });
                            }
                            // Published for observers; nothing to run here
                            Event::TicketAssigned(_) => {}
                        }
                    }
                    _ = shutdown.wait() => {
                        info!("Workflow dispatcher shutting down");
                        break;
                    }
                }
            }
        });
    }
}

// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::{Appointment, AppointmentStatus};

use crate::models::AppointmentError;

/// How an actor relates to one appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    ClientOfRecord,
    VetOfRecord,
    /// The clinic's own policies, e.g. auto-confirmation.
    System,
    Outsider,
}

impl Party {
    pub fn of(appointment: &Appointment, actor_id: Uuid) -> Self {
        if actor_id == appointment.vet_id {
            Party::VetOfRecord
        } else if actor_id == appointment.client_id {
            Party::ClientOfRecord
        } else {
            Party::Outsider
        }
    }
}

/// Allowed moves:
/// scheduled -> confirmed (vet or system), scheduled|confirmed -> cancelled
/// (client or vet), confirmed -> completed (vet).
pub fn check_transition(
    current: AppointmentStatus,
    target: AppointmentStatus,
    party: Party,
) -> Result<(), AppointmentError> {
    use shared_models::AppointmentStatus::*;

    debug!("Checking transition {} -> {} by {:?}", current, target, party);

    if current.is_terminal() {
        warn!("Rejected transition out of terminal status {}", current);
        return Err(AppointmentError::IllegalTransition(format!(
            "appointment is already {}",
            current
        )));
    }

    let allowed = match (current, target) {
        (Scheduled, Confirmed) => matches!(party, Party::VetOfRecord | Party::System),
        (Scheduled | Confirmed, Cancelled) => matches!(party, Party::ClientOfRecord | Party::VetOfRecord),
        (Confirmed, Completed) => party == Party::VetOfRecord,
        _ => {
            warn!("Rejected transition {} -> {}", current, target);
            return Err(AppointmentError::IllegalTransition(format!(
                "cannot move from {} to {}",
                current, target
            )));
        }
    };

    if !allowed {
        warn!("Rejected transition {} -> {} by {:?}", current, target, party);
        return Err(AppointmentError::IllegalTransition(format!(
            "{:?} may not move an appointment from {} to {}",
            party, current, target
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_models::AppointmentStatus::*;

    const ALL: [AppointmentStatus; 4] = [Scheduled, Confirmed, Completed, Cancelled];

    #[test]
    fn test_vet_walks_happy_path() {
        assert!(check_transition(Scheduled, Confirmed, Party::VetOfRecord).is_ok());
        assert!(check_transition(Confirmed, Completed, Party::VetOfRecord).is_ok());
    }

    #[test]
    fn test_client_may_only_cancel() {
        assert!(check_transition(Scheduled, Cancelled, Party::ClientOfRecord).is_ok());
        assert!(check_transition(Confirmed, Cancelled, Party::ClientOfRecord).is_ok());
        assert_matches!(
            check_transition(Scheduled, Confirmed, Party::ClientOfRecord),
            Err(AppointmentError::IllegalTransition(_))
        );
        assert_matches!(
            check_transition(Confirmed, Completed, Party::ClientOfRecord),
            Err(AppointmentError::IllegalTransition(_))
        );
    }

    #[test]
    fn test_system_only_confirms() {
        assert!(check_transition(Scheduled, Confirmed, Party::System).is_ok());
        assert!(check_transition(Scheduled, Cancelled, Party::System).is_err());
    }

    #[test]
    fn test_outsider_can_do_nothing() {
        for from in ALL {
            for to in ALL {
                assert!(check_transition(from, to, Party::Outsider).is_err());
            }
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in [Completed, Cancelled] {
            for to in ALL {
                for party in [Party::VetOfRecord, Party::ClientOfRecord, Party::System] {
                    assert_matches!(
                        check_transition(from, to, party),
                        Err(AppointmentError::IllegalTransition(_))
                    );
                }
            }
        }
    }

    #[test]
    fn test_self_transitions_and_skips_are_illegal() {
        for status in ALL {
            assert!(check_transition(status, status, Party::VetOfRecord).is_err());
        }
        assert!(check_transition(Scheduled, Completed, Party::VetOfRecord).is_err());
        assert!(check_transition(Confirmed, Scheduled, Party::VetOfRecord).is_err());
    }
}
